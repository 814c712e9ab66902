// Copyright 2025-present Harry Tummalacherla
// SPDX-License-Identifier: Apache-2.0

//! The on-disk index family.
//!
//! An index is a set of files sharing a base name:
//!
//! | suffix | contents |
//! |--------|----------|
//! | `.esq` | encoded sequence image |
//! | `.al1` | alphabet definition (text) |
//! | `.prj` | key=value manifest, the compatibility gate |
//! | `.ssp` | sequence-separator positions |
//! | `.des` / `.sds` | sequence descriptions and their offsets |
//! | `.suf` | sorted suffix positions |
//! | `.lcp` / `.llv` | LCP bytes and large-value exceptions |
//! | `.bwt` | Burrows-Wheeler transform bytes |
//! | `.bck` | bucket table (left borders + specials counts) |
//! | `.pbt` | precomputed short-depth matching bounds |
//!
//! [`write_index`] drives the writer path end to end and removes the
//! partial output when anything fails; [`Index::load`] is the reader
//! path, mapping (or, under `--scan`, buffer-loading) the binary files
//! after the manifest has accepted them.

pub mod esq;
pub mod mmap;
pub mod outtables;
pub mod prj;

use std::path::{Path, PathBuf};

use crate::encseq::EncodedSequence;
use crate::error::{Error, Result};
use crate::logger::Logger;
use crate::pckbucket;
use crate::sfx::{SortStrategy, Suffixer};
use crate::types::Readmode;

use esq::Backing;
use outtables::{EsaOutputs, EsaStats};
use prj::{DbFile, Prj};

/// Directory + base name of an index.
#[derive(Debug, Clone)]
pub struct IndexName {
    base: PathBuf,
}

impl IndexName {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        IndexName { base: base.into() }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    /// `<base>.<ext>`
    pub fn suffixed(&self, ext: &str) -> PathBuf {
        let mut name = self.base.as_os_str().to_os_string();
        name.push(".");
        name.push(ext);
        PathBuf::from(name)
    }
}

/// Writer-path options.
#[derive(Debug, Clone)]
pub struct WriteOptions {
    pub prefixlength: Option<u32>,
    pub numofparts: u32,
    pub strategy: SortStrategy,
    pub with_lcp: bool,
    pub with_bwt: bool,
    pub with_bck: bool,
    /// Depth of the precomputed matching-bound table, if wanted.
    pub pbt_depth: Option<u32>,
}

impl Default for WriteOptions {
    fn default() -> Self {
        WriteOptions {
            prefixlength: None,
            numofparts: 1,
            strategy: SortStrategy::default(),
            with_lcp: true,
            with_bwt: false,
            with_bck: false,
            pbt_depth: None,
        }
    }
}

/// Build and persist the complete index. On failure every file this
/// call created is removed before the error propagates.
pub fn write_index(
    enc: &EncodedSequence,
    descriptions: &[String],
    name: &IndexName,
    options: &WriteOptions,
    logger: &Logger<'_>,
) -> Result<EsaStats> {
    let mut created: Vec<PathBuf> = Vec::new();
    let result = write_index_inner(enc, descriptions, name, options, logger, &mut created);
    if result.is_err() {
        for path in created {
            let _ = std::fs::remove_file(path);
        }
    }
    result
}

fn write_index_inner(
    enc: &EncodedSequence,
    descriptions: &[String],
    name: &IndexName,
    options: &WriteOptions,
    logger: &Logger<'_>,
    created: &mut Vec<PathBuf>,
) -> Result<EsaStats> {
    let track = |path: PathBuf, created: &mut Vec<PathBuf>| -> PathBuf {
        created.push(path.clone());
        path
    };

    let esq_path = track(name.suffixed("esq"), created);
    enc.write_image(&esq_path)?;
    let al1_path = track(name.suffixed("al1"), created);
    std::fs::write(&al1_path, enc.alphabet().to_al1())?;
    let ssp_path = track(name.suffixed("ssp"), created);
    outtables::write_ssp(&ssp_path, enc.separator_positions())?;
    let des_path = track(name.suffixed("des"), created);
    let sds_path = track(name.suffixed("sds"), created);
    outtables::write_descriptions(&des_path, &sds_path, descriptions)?;

    let mut strategy = options.strategy;
    strategy.with_lcp = options.with_lcp;
    let mut suffixer = Suffixer::new(
        enc,
        options.prefixlength,
        options.numofparts,
        strategy,
        logger,
    )?;

    let suf_path = track(name.suffixed("suf"), created);
    let lcp_path = name.suffixed("lcp");
    let llv_path = name.suffixed("llv");
    let bwt_path = name.suffixed("bwt");
    if options.with_lcp {
        created.push(lcp_path.clone());
        created.push(llv_path.clone());
    }
    if options.with_bwt {
        created.push(bwt_path.clone());
    }
    let mut sink = EsaOutputs::create(
        enc,
        &suf_path,
        options.with_lcp.then_some((lcp_path.as_path(), llv_path.as_path())),
        options.with_bwt.then_some(bwt_path.as_path()),
    )?;
    suffixer.run(&mut sink)?;
    let stats = sink.finish()?;

    if options.with_bck {
        let bck_path = track(name.suffixed("bck"), created);
        suffixer.bcktab().write_bck(&bck_path)?;
    }
    if let Some(depth) = options.pbt_depth {
        let pbt_path = track(name.suffixed("pbt"), created);
        let store = outtables::SuftabStore::open(&suf_path, false)?;
        let table = pckbucket::PckBucketTable::build(enc, &store, depth)?;
        table.write(&pbt_path)?;
    }

    let info = enc.special_info();
    let mut manifest = Prj::for_this_build(Readmode::Forward);
    manifest.totallength = enc.len() as u64;
    manifest.specialcharacters = info.special_characters;
    manifest.specialranges = info.special_ranges;
    manifest.realspecialranges = info.real_special_ranges;
    manifest.lengthofspecialprefix = info.length_of_special_prefix;
    manifest.lengthofspecialsuffix = info.length_of_special_suffix;
    manifest.numofsequences = enc.num_sequences();
    manifest.numofdbsequences = enc.num_sequences();
    manifest.longest = stats.longest;
    manifest.prefixlength = suffixer.prefixlength() as u64;
    manifest.largelcpvalues = stats.largelcpvalues;
    manifest.maxbranchdepth = stats.maxbranchdepth;
    manifest.dbfiles = enc
        .file_names()
        .iter()
        .zip(enc.file_lengths())
        .map(|(name, lengths)| DbFile {
            name: name.clone(),
            length: lengths.raw,
            effective_length: lengths.effective,
        })
        .collect();
    let prj_path = track(name.suffixed("prj"), created);
    manifest.write(&prj_path)?;
    Ok(stats)
}

/// A loaded index: manifest plus encoded sequence. The sorted-suffix
/// stream is opened separately ([`crate::esa::EsaReader`]).
pub struct Index {
    pub name: IndexName,
    pub prj: Prj,
    pub enc: EncodedSequence,
}

impl Index {
    /// `scan` loads the binary files into memory instead of mapping
    /// them.
    pub fn load(name: &IndexName, scan: bool) -> Result<Self> {
        let manifest = Prj::read(&name.suffixed("prj"))?;
        let alphabet_text = std::fs::read_to_string(name.suffixed("al1"))?;
        let alphabet = crate::alphabet::Alphabet::from_al1(&alphabet_text)?;
        let ssp = if manifest.numofsequences > 1 {
            outtables::read_ssp(&name.suffixed("ssp"))?
        } else {
            Vec::new()
        };
        let esq_path = name.suffixed("esq");
        let backing = if scan {
            Backing::read(&esq_path)?
        } else {
            Backing::map(&esq_path)?
        };
        let enc = EncodedSequence::from_image(backing, alphabet, ssp)?;
        if enc.len() as u64 != manifest.totallength {
            return Err(Error::format(
                "encoded sequence and manifest disagree on the total length",
            ));
        }
        Ok(Index {
            name: name.clone(),
            prj: manifest,
            enc,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alphabet::Alphabet;
    use crate::encseq::builder::{build_from_symbols, SatChoice};
    use crate::encseq::StorageVariant;
    use crate::testing;

    fn write_sample(dir: &Path, text: &str, options: &WriteOptions) -> IndexName {
        let name = IndexName::new(dir.join("idx"));
        let enc = build_from_symbols(
            &testing::dna_symbols(text),
            Alphabet::dna(),
            SatChoice::Auto,
        )
        .unwrap();
        write_index(
            &enc,
            &["first".to_string(), "second".to_string()],
            &name,
            options,
            &Logger::quiet(),
        )
        .unwrap();
        name
    }

    #[test]
    fn write_then_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let text = "acgtacgt?acg|ttgcatgca";
        let name = write_sample(dir.path(), text, &WriteOptions::default());
        for scan in [false, true] {
            let index = Index::load(&name, scan).unwrap();
            assert_eq!(index.enc.len() as usize, text.len());
            assert_eq!(index.prj.numofsequences, 2);
            let expect = testing::dna_symbols(text);
            for (pos, &symbol) in expect.iter().enumerate() {
                assert_eq!(index.enc.symbol_at(pos as crate::types::Pos), symbol);
            }
        }
    }

    #[test]
    fn loader_refuses_a_doctored_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let name = write_sample(dir.path(), "acgtacgt", &WriteOptions::default());
        let prj_path = name.suffixed("prj");
        let text = std::fs::read_to_string(&prj_path).unwrap();
        let flipped = if text.contains("littleendian=1") {
            text.replace("littleendian=1", "littleendian=0")
        } else {
            text.replace("littleendian=0", "littleendian=1")
        };
        std::fs::write(&prj_path, flipped).unwrap();
        assert!(Index::load(&name, false).is_err());
    }

    #[test]
    fn optional_outputs_appear_on_request() {
        let dir = tempfile::tempdir().unwrap();
        let options = WriteOptions {
            with_bwt: true,
            with_bck: true,
            pbt_depth: Some(2),
            ..WriteOptions::default()
        };
        let name = write_sample(dir.path(), "acgtacgtacgtacgt", &options);
        for ext in ["esq", "al1", "prj", "ssp", "des", "sds", "suf", "lcp", "llv", "bwt", "bck", "pbt"] {
            assert!(name.suffixed(ext).exists(), "missing .{}", ext);
        }
    }

    #[test]
    fn variant_survives_the_disk_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        for (text, _expect) in [
            ("acgtacgtacgtacgt", StorageVariant::BitAccess),
            ("acgt?acgtacgtacg", StorageVariant::RangesU32),
        ] {
            let name = IndexName::new(dir.path().join(format!("v{}", text.len())));
            let enc = build_from_symbols(
                &testing::dna_symbols(text),
                Alphabet::dna(),
                SatChoice::Auto,
            )
            .unwrap();
            let variant = enc.variant();
            write_index(&enc, &[], &name, &WriteOptions::default(), &Logger::quiet()).unwrap();
            let index = Index::load(&name, false).unwrap();
            assert_eq!(index.enc.variant(), variant);
        }
    }
}
