// Copyright 2025-present Harry Tummalacherla
// SPDX-License-Identifier: Apache-2.0

//! The copy-sort shortcut.
//!
//! With a single part, no LCP request and k ≥ 2, most buckets need no
//! comparison sorting at all: once the suffixes starting with character
//! class d are in sorted order, walking them and looking one position to
//! the left derives every subbucket (c, d) — appending startpos−1 to
//! (c, d) preserves order because prepending a common character is
//! monotone. Only the "hard" subbuckets (chosen per class-processing
//! order, always excluding the (c, c) diagonals) are sorted the normal
//! way; the diagonal of the class being walked fills itself, the walk
//! frontier extending as derived entries land in it.
//!
//! Classes are processed in ascending size order, so the hard work
//! concentrates in the small classes.
//!
//! Two local conventions matter here: suffixes cut short by the end of
//! the data sort *before* their bucket (nothing derives the final
//! suffix, so the class-0 walk frontier starts one slot later when the
//! last symbol is plain), and suffixes running into a special sort
//! *after* it (their left neighbours re-derive them in place).

use crate::alphabet;
use crate::bcktab::Bcktab;
use crate::encseq::EncodedSequence;
use crate::types::{Code, Pos};

pub struct CopySort {
    sigma: usize,
    /// Subbucket (c, d) start, flat c·σ+d.
    sub_start: Vec<Pos>,
    /// Subbucket (c, d) end; for d = σ-1 this excludes the class-tail
    /// suffixes whose second symbol is special.
    sub_end: Vec<Pos>,
    /// Class end including the tail.
    class_end: Vec<Pos>,
    hardwork: Vec<bool>,
    /// Classes in ascending size order.
    order: Vec<usize>,
    /// Bucket code → two-symbol prefix: code / σ^(k-2).
    expand_div: Code,
    /// The class of the underivable final suffix, if the data ends in a
    /// plain symbol.
    last_symbol_class: Option<usize>,
}

impl CopySort {
    /// Requires post-insertion borders and k ≥ 2. `total_nonspecial` is
    /// the number of bucket-covered suffixes.
    pub fn new(enc: &EncodedSequence, bcktab: &Bcktab, total_nonspecial: Pos) -> Self {
        let sigma = bcktab.numofchars() as usize;
        let k = bcktab.prefixlength();
        debug_assert!(k >= 2);
        let expand_div = bcktab.basepower(k - 2);

        let mut tail_backs = vec![0 as Pos; sigma];
        for range in enc.special_ranges(true) {
            if range.start > 0 {
                let left = enc.symbol_at(range.start - 1);
                if !alphabet::is_special(left) {
                    tail_backs[left as usize] += 1;
                }
            }
        }

        let two_start = |c: usize, d: usize| -> Pos {
            bcktab.left_border(bcktab.pad_code_min((c * sigma + d) as Code, 2))
        };
        let mut sub_start = vec![0 as Pos; sigma * sigma];
        let mut sub_end = vec![0 as Pos; sigma * sigma];
        let mut class_end = vec![0 as Pos; sigma];
        for c in 0..sigma {
            class_end[c] = if c + 1 < sigma {
                two_start(c + 1, 0)
            } else {
                total_nonspecial
            };
            for d in 0..sigma {
                sub_start[c * sigma + d] = two_start(c, d);
                sub_end[c * sigma + d] = if d + 1 < sigma {
                    two_start(c, d + 1)
                } else {
                    class_end[c] - tail_backs[c]
                };
            }
        }

        let mut order: Vec<usize> = (0..sigma).collect();
        let class_size = |c: usize| -> Pos {
            let start = if c == 0 { 0 } else { class_end[c - 1] };
            class_end[c] - start
        };
        order.sort_by_key(|&c| class_size(c));

        // simulate the processing order to find the hard subbuckets
        let mut hardwork = vec![false; sigma * sigma];
        let mut sub_sorted: Vec<bool> = (0..sigma * sigma)
            .map(|idx| sub_start[idx] >= sub_end[idx])
            .collect();
        for &source in &order {
            for second in 0..sigma {
                let idx = source * sigma + second;
                if !sub_sorted[idx] && second != source {
                    hardwork[idx] = true;
                    sub_sorted[idx] = true;
                }
            }
            for c in 0..sigma {
                sub_sorted[c * sigma + source] = true;
            }
        }

        let last_symbol_class = {
            let last = enc.symbol_at(enc.len() - 1);
            if alphabet::is_special(last) {
                None
            } else {
                Some(last as usize)
            }
        };

        CopySort {
            sigma,
            sub_start,
            sub_end,
            class_end,
            hardwork,
            order,
            expand_div,
            last_symbol_class,
        }
    }

    /// Must this bucket be sorted the normal way?
    pub fn is_hard_bucket(&self, code: Code) -> bool {
        self.hardwork[(code / self.expand_div) as usize]
    }

    fn class_start(&self, c: usize) -> Pos {
        if c == 0 {
            0
        } else {
            self.class_end[c - 1]
        }
    }

    /// Derive every non-hard subbucket. `suftab` covers the whole
    /// bucket-sorted range; hard buckets are already sorted.
    pub fn derive(&self, enc: &EncodedSequence, suftab: &mut [Pos]) {
        let sigma = self.sigma;
        let mut super_sorted = vec![false; sigma];
        let mut target = vec![0i64; sigma];
        for &source in &self.order {
            let diag = source * sigma + source;
            // forward: class start up to the (self-extending) diagonal
            if self.class_start(source) < self.sub_start[diag]
                || self.last_symbol_class == Some(source)
            {
                for c in 0..sigma {
                    target[c] = self.sub_start[c * sigma + source] as i64;
                }
                if source == 0 {
                    if let Some(last_class) = self.last_symbol_class {
                        // nothing derives the final suffix; it is
                        // pre-placed at the head of (last, 0)
                        target[last_class] += 1;
                    }
                }
                let mut idx = self.class_start(source) as i64;
                while idx < target[source] {
                    let startpos = suftab[idx as usize];
                    if startpos > 0 {
                        let left = enc.symbol_at(startpos - 1);
                        if !alphabet::is_special(left) && !super_sorted[left as usize] {
                            suftab[target[left as usize] as usize] = startpos - 1;
                            target[left as usize] += 1;
                        }
                    }
                    idx += 1;
                }
            }
            // backward: class end down to the diagonal
            if self.sub_end[diag] < self.class_end[source] {
                for c in 0..sigma {
                    target[c] = self.sub_end[c * sigma + source] as i64 - 1;
                }
                let mut idx = self.class_end[source] as i64 - 1;
                while idx > target[source] {
                    let startpos = suftab[idx as usize];
                    if startpos > 0 {
                        let left = enc.symbol_at(startpos - 1);
                        if !alphabet::is_special(left) && !super_sorted[left as usize] {
                            suftab[target[left as usize] as usize] = startpos - 1;
                            target[left as usize] -= 1;
                        }
                    }
                    idx -= 1;
                }
            }
            super_sorted[source] = true;
        }
    }
}
