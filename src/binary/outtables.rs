// Copyright 2025-present Harry Tummalacherla
// SPDX-License-Identifier: Apache-2.0

//! The sorted-suffix output family: `.suf`, `.lcp`, `.llv`, `.bwt`,
//! `.ssp`, `.des`, `.sds`.
//!
//! [`EsaOutputs`] plugs into the sorter as its sink and writes the
//! tables in lockstep with the sorted stream: one `Pos` per suffix, one
//! LCP byte per adjacent pair (value 255 escapes to an exception entry
//! in `.llv`), one BWT byte per suffix. LCP values are computed against
//! the previous suffix at emission time, never buffered past the pair.
//!
//! On failure the partially written tables are useless; the index
//! writer removes them (a sorter error invalidates `.suf` and `.lcp`
//! wholesale).

use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;

use crate::alphabet::UNDEF;
use crate::encseq::EncodedSequence;
use crate::error::{Error, Result};
use crate::sfx::SuffixSink;
use crate::types::Pos;

use super::esq::Backing;

/// The byte value in `.lcp` that redirects to the exception file.
pub const LCP_ESCAPE: u8 = 255;

/// Statistics the sorter run leaves behind for the manifest.
#[derive(Debug, Clone, Copy, Default)]
pub struct EsaStats {
    /// Rank of suffix 0.
    pub longest: u64,
    pub maxbranchdepth: u64,
    pub largelcpvalues: u64,
    pub emitted: u64,
}

/// Streaming writer for `.suf` and optionally `.lcp`/`.llv`/`.bwt`.
pub struct EsaOutputs<'a> {
    enc: &'a EncodedSequence,
    suf: BufWriter<File>,
    lcp: Option<(BufWriter<File>, BufWriter<File>)>,
    bwt: Option<BufWriter<File>>,
    prev_suffix: Option<Pos>,
    rank: u64,
    stats: EsaStats,
}

impl<'a> EsaOutputs<'a> {
    pub fn create(
        enc: &'a EncodedSequence,
        suf_path: &Path,
        lcp_paths: Option<(&Path, &Path)>,
        bwt_path: Option<&Path>,
    ) -> Result<Self> {
        let suf = BufWriter::new(File::create(suf_path)?);
        let lcp = match lcp_paths {
            Some((lcp_path, llv_path)) => Some((
                BufWriter::new(File::create(lcp_path)?),
                BufWriter::new(File::create(llv_path)?),
            )),
            None => None,
        };
        let bwt = match bwt_path {
            Some(path) => Some(BufWriter::new(File::create(path)?)),
            None => None,
        };
        Ok(EsaOutputs {
            enc,
            suf,
            lcp,
            bwt,
            prev_suffix: None,
            rank: 0,
            stats: EsaStats::default(),
        })
    }

    /// Flush everything and return the run statistics.
    pub fn finish(mut self) -> Result<EsaStats> {
        self.suf.flush()?;
        if let Some((mut lcp, mut llv)) = self.lcp.take() {
            lcp.flush()?;
            llv.flush()?;
        }
        if let Some(mut bwt) = self.bwt.take() {
            bwt.flush()?;
        }
        self.stats.emitted = self.rank;
        Ok(self.stats)
    }
}

impl SuffixSink for EsaOutputs<'_> {
    fn emit(&mut self, suffixes: &[Pos]) -> Result<()> {
        for &suffix in suffixes {
            self.suf.write_all(&(suffix as u64).to_ne_bytes())?;
            if suffix == 0 {
                self.stats.longest = self.rank;
            }
            if let Some((lcp, llv)) = &mut self.lcp {
                let value = match self.prev_suffix {
                    None => 0,
                    Some(prev) => {
                        self.enc.compare_suffixes(false, prev, suffix, 0, None).1
                    }
                };
                self.stats.maxbranchdepth = self.stats.maxbranchdepth.max(value as u64);
                if value as u64 >= LCP_ESCAPE as u64 {
                    lcp.write_all(&[LCP_ESCAPE])?;
                    llv.write_all(&self.rank.to_ne_bytes())?;
                    llv.write_all(&(value as u64).to_ne_bytes())?;
                    self.stats.largelcpvalues += 1;
                } else {
                    lcp.write_all(&[value as u8])?;
                }
            }
            if let Some(bwt) = &mut self.bwt {
                let byte = if suffix == 0 {
                    UNDEF
                } else {
                    self.enc.symbol_at(suffix - 1)
                };
                bwt.write_all(&[byte])?;
            }
            self.prev_suffix = Some(suffix);
            self.rank += 1;
        }
        Ok(())
    }
}

// ============================================================================
// READERS
// ============================================================================

/// Random access to `.suf`, mapped or buffered.
pub struct SuftabStore {
    backing: Backing,
    len: usize,
}

/// Anything that can hand out suffix-array entries by rank.
pub trait SuftabAccess {
    fn len(&self) -> usize;
    fn get(&self, idx: usize) -> Pos;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SuftabStore {
    /// `scan` loads the file into memory instead of mapping it.
    pub fn open(path: &Path, scan: bool) -> Result<Self> {
        let backing = if scan {
            Backing::read(path)?
        } else {
            Backing::map(path)?
        };
        let bytes = backing.bytes().len();
        if bytes % 8 != 0 {
            return Err(Error::format("suffix-array file is not a table of u64"));
        }
        Ok(SuftabStore {
            len: bytes / 8,
            backing,
        })
    }
}

impl SuftabAccess for SuftabStore {
    fn len(&self) -> usize {
        self.len
    }

    fn get(&self, idx: usize) -> Pos {
        super::esq::read_u64_at(self.backing.bytes(), idx * 8) as Pos
    }
}

impl SuftabAccess for Vec<Pos> {
    fn len(&self) -> usize {
        self.as_slice().len()
    }

    fn get(&self, idx: usize) -> Pos {
        self[idx]
    }
}

impl SuftabAccess for &[Pos] {
    fn len(&self) -> usize {
        (**self).len()
    }

    fn get(&self, idx: usize) -> Pos {
        self[idx]
    }
}

/// Sequential LCP values from `.lcp` + `.llv`.
pub struct LcpReader {
    bytes: Vec<u8>,
    exceptions: Vec<(u64, u64)>,
    next: usize,
    next_exception: usize,
}

impl LcpReader {
    pub fn open(lcp_path: &Path, llv_path: &Path) -> Result<Self> {
        let bytes = std::fs::read(lcp_path)?;
        let mut raw = Vec::new();
        File::open(llv_path)?.read_to_end(&mut raw)?;
        if raw.len() % 16 != 0 {
            return Err(Error::format("lcp exception file is not a pair table"));
        }
        let exceptions = raw
            .chunks_exact(16)
            .map(|chunk| {
                (
                    u64::from_ne_bytes(chunk[..8].try_into().unwrap()),
                    u64::from_ne_bytes(chunk[8..].try_into().unwrap()),
                )
            })
            .collect();
        Ok(LcpReader {
            bytes,
            exceptions,
            next: 0,
            next_exception: 0,
        })
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl Iterator for LcpReader {
    type Item = Result<Pos>;

    fn next(&mut self) -> Option<Result<Pos>> {
        let byte = *self.bytes.get(self.next)?;
        let rank = self.next as u64;
        self.next += 1;
        if byte != LCP_ESCAPE {
            return Some(Ok(byte as Pos));
        }
        match self.exceptions.get(self.next_exception) {
            Some(&(position, value)) if position == rank => {
                self.next_exception += 1;
                Some(Ok(value as Pos))
            }
            _ => Some(Err(Error::format(format!(
                "missing lcp exception for rank {}",
                rank
            )))),
        }
    }
}

// ============================================================================
// SIDE TABLES
// ============================================================================

/// `.ssp`: separator positions, one `Pos` each.
pub fn write_ssp(path: &Path, separators: &[Pos]) -> Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    for &sep in separators {
        out.write_all(&(sep as u64).to_ne_bytes())?;
    }
    out.flush()?;
    Ok(())
}

pub fn read_ssp(path: &Path) -> Result<Vec<Pos>> {
    let bytes = std::fs::read(path)?;
    if bytes.len() % 8 != 0 {
        return Err(Error::format("separator-position file is not a table of u64"));
    }
    Ok(bytes
        .chunks_exact(8)
        .map(|chunk| u64::from_ne_bytes(chunk.try_into().unwrap()) as Pos)
        .collect())
}

/// `.des` + `.sds`: newline-joined descriptions and their start
/// offsets.
pub fn write_descriptions(des_path: &Path, sds_path: &Path, descriptions: &[String]) -> Result<()> {
    let mut des = BufWriter::new(File::create(des_path)?);
    let mut sds = BufWriter::new(File::create(sds_path)?);
    let mut offset = 0u64;
    for (idx, description) in descriptions.iter().enumerate() {
        sds.write_all(&offset.to_ne_bytes())?;
        des.write_all(description.as_bytes())?;
        offset += description.len() as u64;
        if idx + 1 < descriptions.len() {
            des.write_all(b"\n")?;
            offset += 1;
        }
    }
    des.flush()?;
    sds.flush()?;
    Ok(())
}

pub fn read_descriptions(des_path: &Path, sds_path: &Path) -> Result<Vec<String>> {
    let des = std::fs::read_to_string(des_path)?;
    let sds = std::fs::read(sds_path)?;
    if sds.len() % 8 != 0 {
        return Err(Error::format("description-offset file is not a table of u64"));
    }
    let count = sds.len() / 8;
    if count == 0 {
        return Ok(Vec::new());
    }
    Ok(des.split('\n').map(str::to_string).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alphabet::Alphabet;
    use crate::encseq::builder::{build_from_symbols, SatChoice};
    use crate::logger::Logger;
    use crate::sfx::{sort_suffixes, SortStrategy, Suffixer, VecSink};
    use crate::testing;

    #[test]
    fn streamed_tables_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let enc = build_from_symbols(
            &testing::dna_symbols("acgtacgt?acgt|ttacg"),
            Alphabet::dna(),
            SatChoice::Auto,
        )
        .unwrap();
        let suf_path = dir.path().join("x.suf");
        let lcp_path = dir.path().join("x.lcp");
        let llv_path = dir.path().join("x.llv");
        let bwt_path = dir.path().join("x.bwt");

        let strategy = SortStrategy {
            with_lcp: true,
            ..SortStrategy::default()
        };
        let mut suffixer =
            Suffixer::new(&enc, Some(2), 1, strategy, &Logger::quiet()).unwrap();
        let mut sink = EsaOutputs::create(
            &enc,
            &suf_path,
            Some((&lcp_path, &llv_path)),
            Some(&bwt_path),
        )
        .unwrap();
        suffixer.run(&mut sink).unwrap();
        let stats = sink.finish().unwrap();
        assert_eq!(stats.emitted, enc.len() as u64);

        let expect = sort_suffixes(&enc, Some(2), SortStrategy::default(), &Logger::quiet())
            .unwrap();
        let store = SuftabStore::open(&suf_path, false).unwrap();
        assert_eq!(store.len(), expect.len());
        let got: Vec<Pos> = (0..store.len()).map(|idx| store.get(idx)).collect();
        assert_eq!(got, expect);
        assert_eq!(store.get(stats.longest as usize), 0);

        let lcps: Vec<Pos> = LcpReader::open(&lcp_path, &llv_path)
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(lcps, testing::naive_lcp_array(&enc, &expect));

        let bwt = std::fs::read(&bwt_path).unwrap();
        for (rank, &suffix) in expect.iter().enumerate() {
            let want = if suffix == 0 {
                UNDEF
            } else {
                enc.symbol_at(suffix - 1)
            };
            assert_eq!(bwt[rank], want, "rank {}", rank);
        }
    }

    #[test]
    fn large_lcp_values_escape_to_the_exception_file() {
        let dir = tempfile::tempdir().unwrap();
        // 300 repeated 'a's: adjacent sorted suffixes reach lcp 299
        let symbols = vec![0u8; 300];
        let enc = build_from_symbols(&symbols, Alphabet::dna(), SatChoice::Auto).unwrap();
        let suf_path = dir.path().join("x.suf");
        let lcp_path = dir.path().join("x.lcp");
        let llv_path = dir.path().join("x.llv");
        let strategy = SortStrategy {
            with_lcp: true,
            ..SortStrategy::default()
        };
        let mut suffixer =
            Suffixer::new(&enc, Some(2), 1, strategy, &Logger::quiet()).unwrap();
        let mut sink =
            EsaOutputs::create(&enc, &suf_path, Some((&lcp_path, &llv_path)), None).unwrap();
        suffixer.run(&mut sink).unwrap();
        let stats = sink.finish().unwrap();
        assert_eq!(stats.maxbranchdepth, 299);
        assert!(stats.largelcpvalues > 0);

        let lcps: Vec<Pos> = LcpReader::open(&lcp_path, &llv_path)
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();
        // suffixes sorted shortest first: adjacent ranks i-1 and i hold
        // suffixes of lengths i and i+1, sharing exactly i symbols
        for (idx, &lcp) in lcps.iter().enumerate() {
            assert_eq!(lcp as usize, idx);
        }
    }

    #[test]
    fn description_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let des = dir.path().join("x.des");
        let sds = dir.path().join("x.sds");
        let descriptions = vec![
            "chr1 primary".to_string(),
            "".to_string(),
            "plasmid".to_string(),
        ];
        write_descriptions(&des, &sds, &descriptions).unwrap();
        assert_eq!(read_descriptions(&des, &sds).unwrap(), descriptions);
    }

    #[test]
    fn ssp_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x.ssp");
        write_ssp(&path, &[3, 17, 44]).unwrap();
        assert_eq!(read_ssp(&path).unwrap(), vec![3, 17, 44]);
    }

    #[test]
    fn vec_sink_collects() {
        let mut sink = VecSink::default();
        sink.emit(&[5, 6]).unwrap();
        sink.emit(&[7]).unwrap();
        assert_eq!(sink.suffixes, vec![5, 6, 7]);
    }
}
