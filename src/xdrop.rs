// Copyright 2025-present Harry Tummalacherla
// SPDX-License-Identifier: Apache-2.0

//! X-drop seed extension.
//!
//! Scores an alignment frontier antidiagonal by antidiagonal and stops
//! once no cell scores within `below` of the running best. Scores are
//! signed machine words: match > 0, the three edit scores ≤ 0. The
//! caller extends right on forward suffixes and left on reversed
//! prefixes (pass `forward = false` to index both sequences from their
//! ends).
//!
//! The returned best records how far each sequence was consumed and the
//! score there; the distance of the extended match is recomputed by the
//! greedy unit-edit routine, the frontier does not track it.

use crate::alphabet;
use crate::types::Pos;

/// Match must be positive, the rest non-positive.
#[derive(Debug, Clone, Copy)]
pub struct XdropScores {
    pub mat: i64,
    pub mis: i64,
    pub ins: i64,
    pub del: i64,
}

impl XdropScores {
    /// Self-match defaults (compatible with the greedy extender).
    pub fn self_match() -> Self {
        XdropScores {
            mat: 2,
            mis: -1,
            ins: -2,
            del: -2,
        }
    }

    /// Query-match defaults.
    pub fn query_match() -> Self {
        XdropScores {
            mat: 2,
            mis: -2,
            ins: -3,
            del: -3,
        }
    }
}

/// Default `below` threshold.
pub const XDROP_BELOW_DEFAULT: i64 = 5;

/// Best frontier cell: `ivalue` symbols of u and `jvalue` of v.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct XdropBest {
    pub ivalue: Pos,
    pub jvalue: Pos,
    pub score: i64,
}

const NEG_INF: i64 = i64::MIN / 4;

#[inline]
fn sym_at(seq: &[u8], forward: bool, idx: usize) -> u8 {
    if forward {
        seq[idx]
    } else {
        seq[seq.len() - 1 - idx]
    }
}

#[inline]
fn syms_match(a: u8, b: u8) -> bool {
    a == b && !alphabet::is_special(a)
}

/// Extend from the implicit seed edge over `useq` × `vseq`.
pub fn evaluate_xdrop(
    useq: &[u8],
    vseq: &[u8],
    forward: bool,
    scores: &XdropScores,
    below: i64,
) -> XdropBest {
    debug_assert!(scores.mat > 0 && scores.mis <= 0 && scores.ins <= 0 && scores.del <= 0);
    debug_assert!(below >= 0);
    let ulen = useq.len();
    let vlen = vseq.len();
    let mut best = XdropBest::default();
    if ulen == 0 || vlen == 0 {
        return best;
    }
    // prev[k], cur[k] over diagonals k = j - i, shifted by ulen
    let width = ulen + vlen + 1;
    let mut two_back = vec![NEG_INF; width];
    let mut one_back = vec![NEG_INF; width];
    let mut current = vec![NEG_INF; width];
    let origin = ulen;
    // antidiagonal 0 is the single cell (0, 0) with score 0
    one_back[origin] = 0;
    let mut best_score = 0i64;
    for d in 1..=ulen + vlen {
        let mut alive = false;
        let k_lo = if d > ulen { d - ulen } else { 0 };
        let k_hi = d.min(vlen);
        // j runs over the v-consumption of the cell; i = d - j
        for j in k_lo..=k_hi {
            let i = d - j;
            let k = origin + j - i;
            let diag = if i > 0 && j > 0 {
                let step = if syms_match(sym_at(useq, forward, i - 1), sym_at(vseq, forward, j - 1))
                {
                    scores.mat
                } else {
                    scores.mis
                };
                two_back[k].saturating_add(step)
            } else {
                NEG_INF
            };
            let gap_v = if j > 0 {
                one_back[k - 1].saturating_add(scores.ins)
            } else {
                NEG_INF
            };
            let gap_u = if i > 0 {
                one_back[k + 1].saturating_add(scores.del)
            } else {
                NEG_INF
            };
            let score = diag.max(gap_v).max(gap_u);
            if score <= NEG_INF || score < best_score - below {
                current[k] = NEG_INF;
                continue;
            }
            current[k] = score;
            alive = true;
            // ties keep the earlier, shorter best
            if score > best_score {
                best_score = score;
                best = XdropBest {
                    ivalue: i as Pos,
                    jvalue: j as Pos,
                    score,
                };
            }
        }
        if !alive {
            break;
        }
        std::mem::swap(&mut two_back, &mut one_back);
        std::mem::swap(&mut one_back, &mut current);
        current.fill(NEG_INF);
    }
    best
}
