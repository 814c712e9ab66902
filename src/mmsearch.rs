// Copyright 2025-present Harry Tummalacherla
// SPDX-License-Identifier: Apache-2.0

//! Maximal exact matches of a query against the sorted index.
//!
//! For every query offset, a binary search over the suffix array finds
//! the suffixes sharing the seed-length prefix; each one is extended to
//! the full common length and reported if it cannot be extended one
//! position to the left (a match that can is found again at the
//! previous offset, so only the left-maximal occurrence survives).
//! Matches are right-maximal by construction — the reported length is
//! the entire common prefix.

use crate::alphabet;
use crate::binary::outtables::SuftabAccess;
use crate::encseq::EncodedSequence;
use crate::error::Result;
use crate::types::Pos;

/// Called per maximal match: `(db_position, query_offset, length)`.
pub type MatchSink<'s> = dyn FnMut(Pos, usize, usize) -> Result<()> + 's;

pub struct MmSearcher<'a, S: SuftabAccess> {
    enc: &'a EncodedSequence,
    suftab: &'a S,
}

impl<'a, S: SuftabAccess> MmSearcher<'a, S> {
    pub fn new(enc: &'a EncodedSequence, suftab: &'a S) -> Self {
        MmSearcher { enc, suftab }
    }

    /// Does the suffix sort before, within, or after the block of
    /// suffixes starting with `pattern`? `Equal` means "starts with".
    fn cmp_suffix_pattern(&self, suffix: Pos, pattern: &[u8]) -> std::cmp::Ordering {
        use std::cmp::Ordering;
        for (off, &want) in pattern.iter().enumerate() {
            let pos = suffix + off as Pos;
            if pos >= self.enc.len() {
                // the suffix ran out: it sorts before every completion
                return Ordering::Less;
            }
            let symbol = self.enc.symbol_at(pos);
            if alphabet::is_special(symbol) {
                // specials sort after the whole alphabet
                return Ordering::Greater;
            }
            match symbol.cmp(&want) {
                Ordering::Equal => {}
                order => return order,
            }
        }
        Ordering::Equal
    }

    /// Suffix-array interval of suffixes starting with `pattern`
    /// (alphabet codes only).
    pub fn bounds(&self, pattern: &[u8]) -> std::ops::Range<usize> {
        use std::cmp::Ordering;
        let len = self.suftab.len();
        let lower = partition_point(len, |rank| {
            self.cmp_suffix_pattern(self.suftab.get(rank), pattern) == Ordering::Less
        });
        let upper = partition_point(len, |rank| {
            self.cmp_suffix_pattern(self.suftab.get(rank), pattern) != Ordering::Greater
        });
        lower..upper
    }

    /// Common prefix length of the db suffix and the query suffix.
    fn match_length(&self, suffix: Pos, query: &[u8], qpos: usize) -> usize {
        let mut len = 0usize;
        loop {
            let db_pos = suffix + len as Pos;
            let Some(&q_sym) = query.get(qpos + len) else {
                return len;
            };
            if db_pos >= self.enc.len() || alphabet::is_special(q_sym) {
                return len;
            }
            let db_sym = self.enc.symbol_at(db_pos);
            if alphabet::is_special(db_sym) || db_sym != q_sym {
                return len;
            }
            len += 1;
        }
    }

    fn left_maximal(&self, suffix: Pos, query: &[u8], qpos: usize) -> bool {
        if qpos == 0 || suffix == 0 {
            return true;
        }
        let db_left = self.enc.symbol_at(suffix - 1);
        let q_left = query[qpos - 1];
        alphabet::is_special(db_left) || alphabet::is_special(q_left) || db_left != q_left
    }

    /// All maximal matches of `query` with length ≥ `min_length`.
    pub fn enumerate_matches(
        &self,
        query: &[u8],
        min_length: usize,
        sink: &mut MatchSink<'_>,
    ) -> Result<()> {
        debug_assert!(min_length >= 1);
        if query.len() < min_length {
            return Ok(());
        }
        for qpos in 0..=query.len() - min_length {
            let seed = &query[qpos..qpos + min_length];
            if seed.iter().any(|&symbol| alphabet::is_special(symbol)) {
                continue;
            }
            for rank in self.bounds(seed) {
                let suffix = self.suftab.get(rank);
                if !self.left_maximal(suffix, query, qpos) {
                    continue;
                }
                let len = self.match_length(suffix, query, qpos);
                debug_assert!(len >= min_length);
                sink(suffix, qpos, len)?;
            }
        }
        Ok(())
    }
}

fn partition_point(len: usize, mut pred: impl FnMut(usize) -> bool) -> usize {
    let mut lo = 0usize;
    let mut hi = len;
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        if pred(mid) {
            lo = mid + 1;
        } else {
            hi = mid;
        }
    }
    lo
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alphabet::Alphabet;
    use crate::encseq::builder::{build_from_symbols, SatChoice};
    use crate::logger::Logger;
    use crate::sfx::{sort_suffixes, SortStrategy};
    use crate::testing;

    fn searcher_fixture(text: &str) -> (EncodedSequence, Vec<Pos>) {
        let enc = build_from_symbols(
            &testing::dna_symbols(text),
            Alphabet::dna(),
            SatChoice::Auto,
        )
        .unwrap();
        let suftab =
            sort_suffixes(&enc, Some(2), SortStrategy::default(), &Logger::quiet()).unwrap();
        (enc, suftab)
    }

    fn naive_matches(
        enc: &EncodedSequence,
        query: &[u8],
        min_length: usize,
    ) -> Vec<(Pos, usize, usize)> {
        let mut matches = Vec::new();
        for db in 0..enc.len() {
            for qpos in 0..query.len() {
                let mut len = 0usize;
                loop {
                    let db_pos = db + len as Pos;
                    if db_pos >= enc.len() || qpos + len >= query.len() {
                        break;
                    }
                    let a = enc.symbol_at(db_pos);
                    let b = query[qpos + len];
                    if alphabet::is_special(a) || alphabet::is_special(b) || a != b {
                        break;
                    }
                    len += 1;
                }
                if len < min_length {
                    continue;
                }
                let left_max = qpos == 0 || db == 0 || {
                    let la = enc.symbol_at(db - 1);
                    let lb = query[qpos - 1];
                    alphabet::is_special(la) || alphabet::is_special(lb) || la != lb
                };
                if left_max {
                    matches.push((db, qpos, len));
                }
            }
        }
        matches.sort_unstable();
        matches
    }

    #[test]
    fn matches_equal_the_quadratic_reference() {
        let (enc, suftab) = searcher_fixture("gattacagatta?cagacca|ttgacatta");
        let searcher = MmSearcher::new(&enc, &suftab);
        for query_text in ["gatta", "ttaca", "acagatt", "gggg", "catta?gatta"] {
            let query = testing::dna_symbols(query_text);
            for min_length in [2usize, 3, 4] {
                let mut got = Vec::new();
                searcher
                    .enumerate_matches(&query, min_length, &mut |db, qpos, len| {
                        got.push((db, qpos, len));
                        Ok(())
                    })
                    .unwrap();
                got.sort_unstable();
                assert_eq!(
                    got,
                    naive_matches(&enc, &query, min_length),
                    "query {:?} L {}",
                    query_text,
                    min_length
                );
            }
        }
    }

    #[test]
    fn bounds_are_the_prefix_interval() {
        let (enc, suftab) = searcher_fixture("acgtacgtacgt");
        let searcher = MmSearcher::new(&enc, &suftab);
        let bounds = searcher.bounds(&testing::dna_symbols("ac"));
        for rank in bounds.clone() {
            let suffix = suftab[rank];
            assert_eq!(enc.symbol_at(suffix), 0);
            assert_eq!(enc.symbol_at(suffix + 1), 1);
        }
        // every other rank must not start with "ac"
        for rank in 0..suftab.len() {
            if !bounds.contains(&rank) {
                let suffix = suftab[rank];
                let starts_with = suffix + 1 < enc.len()
                    && enc.symbol_at(suffix) == 0
                    && enc.symbol_at(suffix + 1) == 1;
                assert!(!starts_with, "rank {}", rank);
            }
        }
    }
}
