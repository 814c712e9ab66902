// Copyright 2025-present Harry Tummalacherla
// SPDX-License-Identifier: Apache-2.0

//! repfind CLI: build, match against, and inspect suffix indexes.

use std::io::Write;
use std::process::ExitCode;

use clap::Parser;

use repfind::alphabet::Alphabet;
use repfind::binary::{write_index, Index, IndexName, WriteOptions};
use repfind::cli::{Cli, Commands, IndexArgs, InspectArgs, MatchArgs};
use repfind::encseq::builder::build_encoded_sequence;
use repfind::encseq::builder::SatChoice;
use repfind::encseq::StorageVariant;
use repfind::error::{Error, Result};
use repfind::fasta::FastaSource;
use repfind::logger::Logger;
use repfind::repfind::{run_match, ExtendMode, MatchOptions};
use repfind::sfx::SortStrategy;

/// Invariant failures get their own exit code.
const EXIT_PROGRAMMING_ERROR: u8 = 3;

fn main() -> ExitCode {
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Index(args) => run_index(args),
        Commands::Match(args) => run_match_command(args),
        Commands::Inspect(args) => run_inspect(args),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("repfind: {}", err);
            match err {
                Error::Invariant { .. } => ExitCode::from(EXIT_PROGRAMMING_ERROR),
                _ => ExitCode::FAILURE,
            }
        }
    }
}

fn run_index(args: IndexArgs) -> Result<()> {
    let mut stderr = std::io::stderr();
    let logger = Logger::new(args.verbose, &mut stderr);
    let alphabet = if args.protein {
        Alphabet::protein()
    } else {
        Alphabet::dna()
    };
    let sat = match args.sat.as_deref() {
        None => SatChoice::Auto,
        Some(name) => match StorageVariant::from_name(name) {
            Some(variant) => SatChoice::Force(variant),
            None => {
                return Err(Error::misuse(format!(
                    "illegal argument \"{}\" to option --sat",
                    name
                )))
            }
        },
    };

    #[cfg(feature = "parallel")]
    let progress = {
        let bar = indicatif::ProgressBar::new_spinner();
        bar.set_message("reading input...");
        bar.enable_steady_tick(std::time::Duration::from_millis(80));
        bar
    };
    let mut source = FastaSource::open(&args.db, &alphabet)?;
    #[cfg(feature = "parallel")]
    progress.set_message("encoding...");
    let files = source.files().to_vec();
    let descriptions = source.descriptions().to_vec();
    let enc = build_encoded_sequence(&mut source, alphabet, sat, &files)?;
    #[cfg(feature = "parallel")]
    progress.set_message("sorting suffixes...");

    if let Some(prefixlength) = args.prefixlength {
        repfind::prefixlen::check_prefix_length(
            enc.alphabet().num_chars(),
            enc.len(),
            prefixlength,
            true,
        )?;
    }
    let options = WriteOptions {
        prefixlength: args.prefixlength,
        numofparts: args.parts,
        strategy: SortStrategy {
            diffcover: args.diffcover,
            ..SortStrategy::default()
        },
        with_lcp: !args.no_lcp,
        with_bwt: args.bwt,
        with_bck: args.bck,
        pbt_depth: args.pbt_depth,
    };
    let name = IndexName::new(&args.indexname);
    let stats = write_index(&enc, &descriptions, &name, &options, &logger)?;
    #[cfg(feature = "parallel")]
    progress.finish_with_message(format!("{} suffixes sorted", stats.emitted));
    #[cfg(not(feature = "parallel"))]
    let _ = stats;
    Ok(())
}

fn run_match_command(args: MatchArgs) -> Result<()> {
    let mut stderr = std::io::stderr();
    let logger = Logger::new(args.verbose, &mut stderr);
    // -r without an explicit -f turns the forward search off
    let forward = args.forward || !args.reverse;
    let opts = MatchOptions {
        leastlength: args.leastlength,
        seedlength: args.seedlength,
        forward,
        reverse: args.reverse,
        spm: args.spm,
        extend: if args.extendxdrop {
            ExtendMode::Xdrop
        } else if args.extendgreedy {
            ExtendMode::Greedy
        } else {
            ExtendMode::None
        },
        errorpercentage: args.errorpercentage,
        maxalilendiff: args.maxalilendiff,
        samples: args.samples,
        scan: args.scan,
        queries: args.queries,
    };
    let name = IndexName::new(&args.indexname);
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    run_match(&name, &opts, &mut out, &logger)?;
    out.flush()?;
    Ok(())
}

fn run_inspect(args: InspectArgs) -> Result<()> {
    let name = IndexName::new(&args.indexname);
    let index = Index::load(&name, false)?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    #[cfg(feature = "serde_json")]
    if args.json {
        #[derive(serde::Serialize)]
        struct Inventory<'a> {
            variant: &'a str,
            totallength: u64,
            numofsequences: u64,
            specialcharacters: u64,
            prefixlength: u64,
            longest: u64,
            maxbranchdepth: u64,
            largelcpvalues: u64,
            files: Vec<FileEntry>,
        }
        #[derive(serde::Serialize)]
        struct FileEntry {
            suffix: String,
            bytes: u64,
        }
        let files = inventory(&name);
        let report = Inventory {
            variant: index.enc.variant().name(),
            totallength: index.prj.totallength,
            numofsequences: index.prj.numofsequences,
            specialcharacters: index.prj.specialcharacters,
            prefixlength: index.prj.prefixlength,
            longest: index.prj.longest,
            maxbranchdepth: index.prj.maxbranchdepth,
            largelcpvalues: index.prj.largelcpvalues,
            files: files
                .into_iter()
                .map(|(suffix, bytes)| FileEntry { suffix, bytes })
                .collect(),
        };
        let rendered = serde_json::to_string_pretty(&report)
            .map_err(|err| Error::format(format!("cannot render inventory: {}", err)))?;
        writeln!(out, "{}", rendered)?;
        return Ok(());
    }

    writeln!(out, "index     {}", name.base().display())?;
    writeln!(out, "variant   {}", index.enc.variant().name())?;
    write!(out, "{}", index.prj.to_text())?;
    for (suffix, bytes) in inventory(&name) {
        writeln!(out, "file .{}  {} bytes", suffix, bytes)?;
    }
    Ok(())
}

/// Existing index files and their sizes.
fn inventory(name: &IndexName) -> Vec<(String, u64)> {
    ["esq", "al1", "prj", "ssp", "des", "sds", "suf", "lcp", "llv", "bwt", "bck", "pbt"]
        .iter()
        .filter_map(|ext| {
            let path = name.suffixed(ext);
            path.metadata()
                .ok()
                .map(|meta| (ext.to_string(), meta.len()))
        })
        .collect()
}
