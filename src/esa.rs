// Copyright 2025-present Harry Tummalacherla
// SPDX-License-Identifier: Apache-2.0

//! Sequential access to the sorted-suffix and LCP tables of an on-disk
//! index — the stream the maximal-pair enumerator consumes. The `.suf`
//! table is memory-mapped by default; under `--scan` both tables are
//! buffer-loaded instead.

use crate::binary::outtables::{LcpReader, SuftabAccess, SuftabStore};
use crate::binary::IndexName;
use crate::error::Result;
use crate::types::Pos;

/// A streaming (suffix, lcp) pair source over an index.
pub struct EsaReader {
    suftab: SuftabStore,
    lcp: LcpReader,
    rank: usize,
}

impl EsaReader {
    pub fn open(name: &IndexName, scan: bool) -> Result<Self> {
        let suftab = SuftabStore::open(&name.suffixed("suf"), scan)?;
        let lcp = LcpReader::open(&name.suffixed("lcp"), &name.suffixed("llv"))?;
        Ok(EsaReader {
            suftab,
            lcp,
            rank: 0,
        })
    }

    pub fn len(&self) -> usize {
        self.suftab.len()
    }

    pub fn is_empty(&self) -> bool {
        self.suftab.is_empty()
    }

    /// Random access to the underlying suffix array (used by the
    /// query matcher; the sweep itself streams).
    pub fn suftab(&self) -> &SuftabStore {
        &self.suftab
    }
}

impl Iterator for EsaReader {
    type Item = Result<(Pos, Pos)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.rank >= self.suftab.len() {
            return None;
        }
        let suffix = self.suftab.get(self.rank);
        let lcp = match self.lcp.next() {
            Some(Ok(lcp)) => lcp,
            Some(Err(err)) => return Some(Err(err)),
            None => {
                return Some(Err(crate::error::Error::format(
                    "lcp table shorter than the suffix array",
                )))
            }
        };
        self.rank += 1;
        Some(Ok((suffix, lcp)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alphabet::Alphabet;
    use crate::binary::{write_index, WriteOptions};
    use crate::encseq::builder::{build_from_symbols, SatChoice};
    use crate::logger::Logger;
    use crate::maxpairs::MaxPairsSweep;
    use crate::testing;

    #[test]
    fn stream_feeds_the_sweep_like_memory_tables() {
        let dir = tempfile::tempdir().unwrap();
        let text = "gattacagattaca|acgtgattaca";
        let enc = build_from_symbols(
            &testing::dna_symbols(text),
            Alphabet::dna(),
            SatChoice::Auto,
        )
        .unwrap();
        let name = IndexName::new(dir.path().join("idx"));
        write_index(&enc, &[], &name, &WriteOptions::default(), &Logger::quiet()).unwrap();

        for scan in [false, true] {
            let reader = EsaReader::open(&name, scan).unwrap();
            let mut sweep = MaxPairsSweep::new(&enc, 4).unwrap();
            let mut pairs = Vec::new();
            {
                let mut sink = |a, b, len| {
                    pairs.push((a, b, len));
                    Ok(())
                };
                for item in reader {
                    let (suffix, lcp) = item.unwrap();
                    sweep.push(suffix, lcp, &mut sink).unwrap();
                }
                sweep.finish(&mut sink).unwrap();
            }
            pairs.sort_unstable();
            assert_eq!(pairs, testing::naive_maximal_pairs(&enc, 4), "scan {}", scan);
        }
    }
}
