// Copyright 2025-present Harry Tummalacherla
// SPDX-License-Identifier: Apache-2.0

//! Naive reference implementations for tests.
//!
//! Everything here is quadratic-or-worse on purpose: small, obviously
//! correct code the real pipeline is checked against. Compiled into the
//! library so the integration tests can share it, but not part of the
//! public API surface proper.

use std::cmp::Ordering;

use crate::alphabet::{self, Alphabet};
use crate::encseq::{EncodedSequence, SuffixSym};
use crate::types::Pos;

/// Encode a DNA test literal: `?` is a wildcard, `|` a separator.
pub fn dna_symbols(text: &str) -> Vec<u8> {
    let alpha = Alphabet::dna();
    text.bytes()
        .map(|ch| match ch {
            b'?' => alphabet::WILDCARD,
            b'|' => alphabet::SEPARATOR,
            ch => alpha
                .encode(ch)
                .unwrap_or_else(|| panic!("bad test symbol {:?}", ch as char)),
        })
        .collect()
}

/// Compare two suffixes symbol-by-symbol under the extended alphabet:
/// end-of-data smallest, specials greater than alphabet symbols and
/// ranked among themselves by descending position.
pub fn naive_compare(enc: &EncodedSequence, a: Pos, b: Pos) -> Ordering {
    if a == b {
        return Ordering::Equal;
    }
    let mut depth = 0;
    loop {
        let sa = enc.suffix_sym(a, depth, false);
        let sb = enc.suffix_sym(b, depth, false);
        match sa.cmp(&sb) {
            Ordering::Equal => {
                debug_assert!(sa != SuffixSym::End);
                depth += 1;
            }
            order => return order,
        }
    }
}

/// All suffix start positions, sorted by [`naive_compare`].
pub fn naive_sorted_suffixes(enc: &EncodedSequence) -> Vec<Pos> {
    let mut suffixes: Vec<Pos> = (0..enc.len()).collect();
    suffixes.sort_by(|&a, &b| naive_compare(enc, a, b));
    suffixes
}

/// Plain longest common prefix of two suffixes: alphabet symbols match
/// by code, specials and the data end never match anything.
pub fn naive_lcp_of(enc: &EncodedSequence, a: Pos, b: Pos) -> Pos {
    let mut lcp = 0;
    loop {
        let sa = enc.suffix_sym(a, lcp, false);
        let sb = enc.suffix_sym(b, lcp, false);
        match (sa, sb) {
            (SuffixSym::Alph(x), SuffixSym::Alph(y)) if x == y => lcp += 1,
            _ => return lcp,
        }
    }
}

/// LCP values for adjacent entries of a sorted suffix array; index 0 is
/// 0 by convention.
pub fn naive_lcp_array(enc: &EncodedSequence, suftab: &[Pos]) -> Vec<Pos> {
    let mut lcps = vec![0 as Pos; suftab.len()];
    for idx in 1..suftab.len() {
        lcps[idx] = naive_lcp_of(enc, suftab[idx - 1], suftab[idx]);
    }
    lcps
}

/// The left-context symbol used for maximality checks: the alphabet
/// code before the position, or `None` for position 0 and for special
/// left neighbours (which never equal anything).
fn left_context(enc: &EncodedSequence, pos: Pos) -> Option<u8> {
    if pos == 0 {
        return None;
    }
    let symbol = enc.symbol_at(pos - 1);
    if alphabet::is_special(symbol) {
        None
    } else {
        Some(symbol)
    }
}

/// Quadratic maximal-pair enumeration: all `(pos1, pos2, len)` with
/// `pos1 < pos2`, common prefix of exactly `len >= min_length`, and
/// differing (or absent) left contexts.
pub fn naive_maximal_pairs(enc: &EncodedSequence, min_length: Pos) -> Vec<(Pos, Pos, Pos)> {
    let mut pairs = Vec::new();
    for pos1 in 0..enc.len() {
        for pos2 in pos1 + 1..enc.len() {
            let len = naive_lcp_of(enc, pos1, pos2);
            if len < min_length {
                continue;
            }
            let left1 = left_context(enc, pos1);
            let left2 = left_context(enc, pos2);
            let left_maximal = match (left1, left2) {
                (Some(a), Some(b)) => a != b,
                _ => true,
            };
            if left_maximal {
                pairs.push((pos1, pos2, len));
            }
        }
    }
    pairs.sort_unstable();
    pairs
}
