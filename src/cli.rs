// Copyright 2025-present Harry Tummalacherla
// SPDX-License-Identifier: Apache-2.0

//! Command-line definitions for the `repfind` binary.
//!
//! ```bash
//! # Build an index from FASTA input
//! repfind index --db genome.fna -i mygenome --bck
//!
//! # Report maximal repeats of length >= 30
//! repfind match -i mygenome -l 30
//!
//! # Greedy-extended seeds at 10% error
//! repfind match -i mygenome --seedlength 14 --extendgreedy --err 10
//!
//! # Inspect the manifest
//! repfind inspect -i mygenome --json
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "repfind",
    about = "Compact encoded-sequence store with sorted-suffix and maximal-pair indexing",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Encode sequences and build the sorted-suffix index files.
    Index(IndexArgs),
    /// Report maximal repeats, overlaps or query matches.
    Match(MatchArgs),
    /// Print an index's manifest and file inventory.
    Inspect(InspectArgs),
}

#[derive(Args)]
pub struct IndexArgs {
    /// Input FASTA files.
    #[arg(long = "db", required = true, num_args = 1..)]
    pub db: Vec<PathBuf>,

    /// Index name (directory + base name).
    #[arg(short = 'i', long = "ii")]
    pub indexname: PathBuf,

    /// Use the protein alphabet instead of DNA.
    #[arg(long)]
    pub protein: bool,

    /// Storage variant (direct, bytecompress, bit, uchar, ushort,
    /// uint32); picked by size when absent.
    #[arg(long)]
    pub sat: Option<String>,

    /// Bucket prefix length; recommended length when absent.
    #[arg(long = "pl")]
    pub prefixlength: Option<u32>,

    /// Split the suffix array into this many memory-bounded parts.
    #[arg(long, default_value_t = 1)]
    pub parts: u32,

    /// Difference-cover modulus (power of two up to 32768).
    #[arg(long = "dc")]
    pub diffcover: Option<u32>,

    /// Skip the LCP tables (.lcp/.llv), which are written by default.
    #[arg(long = "no-lcp")]
    pub no_lcp: bool,

    /// Write the Burrows-Wheeler transform (.bwt).
    #[arg(long)]
    pub bwt: bool,

    /// Write the bucket table (.bck).
    #[arg(long)]
    pub bck: bool,

    /// Write the matching-bound table (.pbt) for this depth.
    #[arg(long = "pbt")]
    pub pbt_depth: Option<u32>,

    /// Be verbose.
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

#[derive(Args)]
pub struct MatchArgs {
    /// Input index.
    #[arg(short = 'i', long = "ii")]
    pub indexname: PathBuf,

    /// Minimum length of reported matches.
    #[arg(short = 'l')]
    pub leastlength: Option<u32>,

    /// Compute maximal forward repeats.
    #[arg(short = 'f', long)]
    pub forward: bool,

    /// Compute maximal reverse matches.
    #[arg(short = 'r', long)]
    pub reverse: bool,

    /// Minimum seed length for the extenders.
    #[arg(long)]
    pub seedlength: Option<u32>,

    /// Error percentage limit for extended matches.
    #[arg(long = "err", default_value_t = 10)]
    pub errorpercentage: u64,

    /// Trimming threshold of the greedy extender.
    #[arg(long, default_value_t = 30)]
    pub maxalilendiff: u64,

    /// Extend seeds to both sides with the x-drop algorithm.
    #[arg(long, conflicts_with = "extendgreedy")]
    pub extendxdrop: bool,

    /// Extend seeds to both sides with the trimmed greedy algorithm.
    #[arg(long)]
    pub extendgreedy: bool,

    /// Run the sampled cross-check with this many samples.
    #[arg(long, default_value_t = 0, conflicts_with_all = ["queries", "spm"])]
    pub samples: u64,

    /// Report suffix-prefix overlaps instead of repeats.
    #[arg(long, conflicts_with_all = ["reverse", "queries"])]
    pub spm: bool,

    /// Load the index into memory instead of mapping it.
    #[arg(long, conflicts_with = "queries")]
    pub scan: bool,

    /// Query FASTA files.
    #[arg(short = 'q', num_args = 1.., conflicts_with = "reverse")]
    pub queries: Vec<PathBuf>,

    /// Be verbose.
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

#[derive(Args)]
pub struct InspectArgs {
    /// Input index.
    #[arg(short = 'i', long = "ii")]
    pub indexname: PathBuf,

    /// Emit JSON instead of text.
    #[cfg(feature = "serde_json")]
    #[arg(long)]
    pub json: bool,
}
