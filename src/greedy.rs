// Copyright 2025-present Harry Tummalacherla
// SPDX-License-Identifier: Apache-2.0

//! Trimmed greedy edit-distance extension, and the plain greedy unit
//! distance.
//!
//! The extender advances a front of diagonals, one error generation at
//! a time: every live diagonal slides along its exact matches, then the
//! next generation is derived by mismatch / insertion / deletion
//! transitions. Two mechanisms keep the front narrow:
//!
//! - **trimming**: diagonals whose aligned length falls more than
//!   `maxalilendiff` behind the best are dropped;
//! - **polishing**: a fixed-width history bitmask records the last
//!   alignment columns per diagonal (1 = match); only states whose
//!   history carries at least `minmatchnum` matches may become the
//!   reported optimum, so the extension never ends in a noisy tail.
//!
//! The mask starts all-ones: the seed the caller extends from is a run
//! of matches.

use crate::alphabet;
use crate::types::Pos;

/// Polishing and trimming parameters.
#[derive(Debug, Clone, Copy)]
pub struct GreedyParams {
    /// History width in alignment columns, at most 64.
    pub history: u32,
    /// Minimum matches within the history for an eligible end point.
    pub minmatchnum: u32,
    /// Trimming distance.
    pub maxalilendiff: u64,
}

impl Default for GreedyParams {
    fn default() -> Self {
        // 55% of a 60-column history
        GreedyParams {
            history: 60,
            minmatchnum: 60 * 55 / 100,
            maxalilendiff: 30,
        }
    }
}

impl GreedyParams {
    pub fn with_maxalilendiff(maxalilendiff: u64) -> Self {
        GreedyParams {
            maxalilendiff,
            ..GreedyParams::default()
        }
    }
}

/// The best polished front cell of one extension side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PolishedPoint {
    /// Symbols consumed of the first sequence.
    pub row: Pos,
    /// row + column.
    pub alignedlen: Pos,
    pub distance: Pos,
}

#[derive(Debug, Clone, Copy)]
struct Cell {
    row: usize,
    hist: u64,
}

#[inline]
fn syms_match(a: u8, b: u8) -> bool {
    a == b && !alphabet::is_special(a)
}

#[inline]
fn sym_at(seq: &[u8], forward: bool, idx: usize) -> u8 {
    if forward {
        seq[idx]
    } else {
        seq[seq.len() - 1 - idx]
    }
}

/// Extend over `useq` × `vseq` (from the ends when `forward` is
/// false). Termination: a diagonal dies when it reaches either
/// sequence end or is trimmed; the front is finished when no diagonal
/// is left.
pub fn front_prune_extend(
    useq: &[u8],
    vseq: &[u8],
    forward: bool,
    params: &GreedyParams,
) -> PolishedPoint {
    debug_assert!(params.history >= 1 && params.history <= 64);
    debug_assert!(params.minmatchnum <= params.history);
    let ulen = useq.len();
    let vlen = vseq.len();
    let mut best = PolishedPoint::default();
    if ulen == 0 || vlen == 0 {
        return best;
    }
    let hist_mask: u64 = if params.history == 64 {
        !0
    } else {
        (1u64 << params.history) - 1
    };

    let slide = |mut cell: Cell, k: i64| -> Cell {
        loop {
            let col = (cell.row as i64 + k) as usize;
            if cell.row >= ulen || col >= vlen {
                return cell;
            }
            if !syms_match(sym_at(useq, forward, cell.row), sym_at(vseq, forward, col)) {
                return cell;
            }
            cell.row += 1;
            cell.hist = (cell.hist << 1) | 1;
        }
    };
    let polish = |cell: &Cell, k: i64, distance: Pos, best: &mut PolishedPoint| {
        let alignedlen = (2 * cell.row as i64 + k) as Pos;
        if (cell.hist & hist_mask).count_ones() >= params.minmatchnum && alignedlen > best.alignedlen
        {
            *best = PolishedPoint {
                row: cell.row as Pos,
                alignedlen,
                distance,
            };
        }
    };
    let exhausted =
        |cell: &Cell, k: i64| cell.row >= ulen || (cell.row as i64 + k) as usize >= vlen;

    // generation 0: diagonal 0
    let mut lo: i64 = 0;
    let mut front: Vec<Option<Cell>> = vec![Some(slide(Cell { row: 0, hist: !0 }, 0))];
    {
        let cell = front[0].as_ref().unwrap();
        polish(cell, 0, 0, &mut best);
        if exhausted(cell, 0) {
            return best;
        }
    }

    let mut distance: Pos = 0;
    loop {
        distance += 1;
        let new_lo = lo - 1;
        let mut next: Vec<Option<Cell>> = vec![None; front.len() + 2];
        for (slot, target) in next.iter_mut().enumerate() {
            let k = new_lo + slot as i64;
            if k <= -(ulen as i64) || k >= vlen as i64 {
                continue;
            }
            // an edit consumes row+1/col+1 (mismatch), col+1
            // (insertion) or row+1 (deletion)
            let mut candidate: Option<Cell> = None;
            let mut consider = |row: usize, hist: u64| {
                if row <= ulen && (row as i64 + k) >= 0 && (row as i64 + k) <= vlen as i64 {
                    if candidate.map_or(true, |cur| row > cur.row) {
                        candidate = Some(Cell {
                            row,
                            hist: hist << 1,
                        });
                    }
                }
            };
            let prev_at = |pk: i64| -> Option<Cell> {
                let idx = pk - lo;
                if idx < 0 || idx as usize >= front.len() {
                    None
                } else {
                    front[idx as usize]
                }
            };
            if let Some(prev) = prev_at(k) {
                consider(prev.row + 1, prev.hist); // mismatch
            }
            if let Some(prev) = prev_at(k + 1) {
                consider(prev.row + 1, prev.hist); // deletion in v
            }
            if let Some(prev) = prev_at(k - 1) {
                consider(prev.row, prev.hist); // insertion in v
            }
            let Some(cell) = candidate else { continue };
            let cell = slide(cell, k);
            polish(&cell, k, distance, &mut best);
            if !exhausted(&cell, k) {
                *target = Some(cell);
            }
        }
        lo = new_lo;
        front = next;
        // trim diagonals too far behind the best aligned length
        let best_aligned = front
            .iter()
            .enumerate()
            .filter_map(|(slot, cell)| {
                cell.map(|c| 2 * c.row as i64 + (lo + slot as i64))
            })
            .max();
        let Some(best_aligned) = best_aligned else {
            return best;
        };
        for (slot, entry) in front.iter_mut().enumerate() {
            if let Some(cell) = entry {
                let aligned = 2 * cell.row as i64 + (lo + slot as i64);
                if aligned + (params.maxalilendiff as i64) < best_aligned {
                    *entry = None;
                }
            }
        }
        if front.iter().all(Option::is_none) {
            return best;
        }
    }
}

/// Plain greedy unit edit distance between two whole sequences
/// (Ukkonen's furthest-reaching fronts, no trimming).
pub fn greedy_unit_distance(useq: &[u8], vseq: &[u8]) -> Pos {
    let ulen = useq.len();
    let vlen = vseq.len();
    let target_k = vlen as i64 - ulen as i64;
    let slide = |mut row: usize, k: i64| -> usize {
        loop {
            let col = (row as i64 + k) as usize;
            if row >= ulen || col >= vlen || !syms_match(useq[row], vseq[col]) {
                return row;
            }
            row += 1;
        }
    };
    // front[d] holds rows for diagonals -d..=d
    let mut front: Vec<i64> = vec![slide(0, 0) as i64];
    if target_k == 0 && front[0] as usize == ulen {
        return 0;
    }
    let mut lo: i64 = 0;
    let mut distance: Pos = 0;
    loop {
        distance += 1;
        let new_lo = lo - 1;
        let mut next = vec![-1i64; front.len() + 2];
        for (slot, value) in next.iter_mut().enumerate() {
            let k = new_lo + slot as i64;
            if k < -(ulen as i64) || k > vlen as i64 {
                continue;
            }
            let prev_at = |pk: i64| -> i64 {
                let idx = pk - lo;
                if idx < 0 || idx as usize >= front.len() {
                    -1
                } else {
                    front[idx as usize]
                }
            };
            let mut row = prev_at(k) + 1; // mismatch
            row = row.max(prev_at(k + 1) + 1); // deletion
            row = row.max(prev_at(k - 1)); // insertion
            if row < 0 {
                continue;
            }
            let row = (row as usize).min(ulen);
            let col = row as i64 + k;
            if col < 0 || col > vlen as i64 {
                continue;
            }
            *value = slide(row, k) as i64;
        }
        lo = new_lo;
        front = next;
        let idx = target_k - lo;
        if idx >= 0 && (idx as usize) < front.len() && front[idx as usize] as usize >= ulen {
            return distance;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dna(text: &str) -> Vec<u8> {
        crate::testing::dna_symbols(text)
    }

    #[test]
    fn unit_distance_basics() {
        assert_eq!(greedy_unit_distance(&dna("acgt"), &dna("acgt")), 0);
        assert_eq!(greedy_unit_distance(&dna("acgt"), &dna("aggt")), 1);
        assert_eq!(greedy_unit_distance(&dna("acgt"), &dna("act")), 1);
        assert_eq!(greedy_unit_distance(&dna("acgt"), &dna("aacgt")), 1);
        assert_eq!(greedy_unit_distance(&dna("aaaa"), &dna("tttt")), 4);
        assert_eq!(greedy_unit_distance(&dna("a"), &dna("")), 1);
        assert_eq!(greedy_unit_distance(&dna(""), &dna("")), 0);
    }

    #[test]
    fn unit_distance_counts_wildcard_columns() {
        // a wildcard matches nothing, not even itself
        assert_eq!(greedy_unit_distance(&dna("a?gt"), &dna("a?gt")), 1);
    }

    #[test]
    fn perfect_extension_consumes_everything() {
        let seq = dna("acgtacgtacgtacgtacgt");
        let point = front_prune_extend(&seq, &seq, true, &GreedyParams::default());
        assert_eq!(point.row as usize, seq.len());
        assert_eq!(point.alignedlen as usize, 2 * seq.len());
        assert_eq!(point.distance, 0);
    }

    #[test]
    fn scattered_mismatches_are_absorbed() {
        // identical 50-mers with two mismatches in one copy
        let useq = dna("acgtacgtacgtacgtacgtacgtacgtacgtacgtacgtacgtacgtac");
        let mut vseq = useq.clone();
        vseq[10] = 3 - vseq[10];
        vseq[30] = 3 - vseq[30];
        let point = front_prune_extend(&useq, &vseq, true, &GreedyParams::default());
        assert_eq!(point.distance, 2);
        assert_eq!(point.row as usize, useq.len());
        assert_eq!(point.alignedlen as usize, 2 * useq.len());
    }

    #[test]
    fn polishing_cuts_off_a_noisy_tail() {
        // 20 clean matches, then pure noise: the history window lets a
        // few noise columns through (the seed counts as matches), then
        // the match quota fails and the best point freezes
        let mut useq = dna("acgtacgtacgtacgtacgt");
        let mut vseq = useq.clone();
        useq.extend(dna("aaaaaaaaaaaaaaaaaaaa"));
        vseq.extend(dna("gggggggggggggggggggg"));
        let params = GreedyParams {
            history: 16,
            minmatchnum: 12,
            maxalilendiff: 30,
        };
        let point = front_prune_extend(&useq, &vseq, true, &params);
        // 16-wide history with quota 12 tolerates exactly 4 noise
        // columns past the clean prefix
        assert_eq!(point.row, 24);
        assert_eq!(point.alignedlen, 48);
        assert_eq!(point.distance, 4);
    }

    #[test]
    fn extension_is_symmetric_for_mirrored_input() {
        // the right extension of (u, v) equals the left extension of
        // the reversed sequences
        let useq = dna("acgtacctacgtaagtacgt");
        let vseq = dna("acgtacgtacgtacgtaact");
        let params = GreedyParams::default();
        let right = front_prune_extend(&useq, &vseq, true, &params);
        let rev_u: Vec<u8> = useq.iter().rev().copied().collect();
        let rev_v: Vec<u8> = vseq.iter().rev().copied().collect();
        let left = front_prune_extend(&rev_u, &rev_v, false, &params);
        assert_eq!(right, left);
    }

    #[test]
    fn pure_noise_yields_only_a_short_stub() {
        // nothing matches: the seeded history admits two noise columns,
        // then the quota fails; the caller's error-rate filter is what
        // rejects stubs like this one
        let point = front_prune_extend(
            &dna("aaaaaaaaaa"),
            &dna("gggggggggg"),
            true,
            &GreedyParams {
                history: 8,
                minmatchnum: 6,
                maxalilendiff: 4,
            },
        );
        assert_eq!(
            point,
            PolishedPoint {
                row: 2,
                alignedlen: 4,
                distance: 2
            }
        );
    }
}
