// Copyright 2025-present Harry Tummalacherla
// SPDX-License-Identifier: Apache-2.0

//! Difference-cover sampling: O(1) suffix comparison beyond depth v.
//!
//! A difference cover D modulo v has, for every residue r, two members
//! d, d' with d − d' ≡ r (mod v). The sampler sorts the suffixes whose
//! positions hit D mod v ("sample positions") to depth v by the usual
//! bucket + refinement pipeline, then repeatedly doubles the sorted
//! depth by rank comparison until the sample is totally ordered. After
//! that, any two suffixes a and b can be compared in constant time: the
//! δ function yields an offset below v at which *both* a+δ and b+δ are
//! sample positions, so their ranks decide.
//!
//! Covers are tabulated for v ∈ {1, 2, 4, ..., 32768}: the sets up to
//! v = 256 are the hand-found minima, the larger ones follow the
//! Colbourn-Ling construction (whose block sizes 6r+4 give exactly the
//! known-smallest sizes 28, 40, 58, 82, 112, 160, 226).

use std::cmp::Ordering;
use std::collections::VecDeque;

use crate::bcktab::Bcktab;
use crate::encseq::EncodedSequence;
use crate::error::{Error, Result};
use crate::log;
use crate::logger::Logger;
use crate::prefixlen;
use crate::sfx::bentsedg::{self, CollectResolver, SortEnv};
use crate::sfx::{KmerScanner, SortCounters, SortStrategy, WindowClass};
use crate::types::Pos;

/// The tabulated modulus values.
pub const TABULATED_VS: [u32; 16] = [
    1, 2, 4, 8, 16, 32, 64, 128, 256, 512, 1024, 2048, 4096, 8192, 16384, 32768,
];

/// Colbourn-Ling cover: five arithmetic blocks sized r+1, r+1, 2r+1,
/// r+1, r with steps 1, 2r+1, 4r+3, 2r+2, 1.
fn colbourn_ling(r: u32) -> Vec<u32> {
    let mut cover: Vec<u32> = (0..=r).collect();
    for j in 1..=r + 1 {
        cover.push((2 * r + 1) * j);
    }
    let mut base = (2 * r + 1) * (r + 1);
    for j in 1..=2 * r + 1 {
        cover.push(base + (4 * r + 3) * j);
    }
    base += (4 * r + 3) * (2 * r + 1);
    for j in 1..=r + 1 {
        cover.push(base + (2 * r + 2) * j);
    }
    base += (2 * r + 2) * (r + 1);
    for j in 1..=r {
        cover.push(base + j);
    }
    cover
}

/// The smallest known cover for a tabulated v, `None` otherwise.
pub fn cover_for(v: u32) -> Option<Vec<u32>> {
    match v {
        1 => Some(vec![0]),
        2 => Some(vec![0, 1]),
        4 => Some(vec![0, 1, 2]),
        8 => Some(vec![0, 1, 2, 4]),
        16 => Some(vec![0, 1, 2, 5, 8]),
        32 => Some(vec![0, 1, 2, 3, 7, 11, 19]),
        64 => Some(vec![0, 1, 2, 5, 14, 16, 34, 42, 59]),
        128 => Some(vec![0, 1, 3, 7, 17, 40, 55, 64, 75, 85, 104, 109, 117]),
        256 => Some(vec![
            0, 1, 3, 7, 12, 20, 30, 44, 65, 80, 89, 96, 114, 122, 128, 150, 196, 197, 201, 219,
        ]),
        512 => Some(colbourn_ling(4)),
        1024 => Some(colbourn_ling(6)),
        2048 => Some(colbourn_ling(9)),
        4096 => Some(colbourn_ling(13)),
        8192 => Some(colbourn_ling(18)),
        16384 => Some(colbourn_ling(26)),
        32768 => Some(colbourn_ling(37)),
        _ => None,
    }
}

/// The sampler. Borrows the encoded sequence for its lifetime.
pub struct DifferenceCover<'a> {
    enc: &'a EncodedSequence,
    v: u32,
    vmask: u64,
    /// Per residue: in the cover?
    in_cover: Vec<bool>,
    /// Per residue d_j of the cover: j · step (the μ packing base);
    /// undefined residues hold u64::MAX.
    rank_base: Vec<u64>,
    /// Per residue d: the cover member δ-computation picks.
    diff2pos: Vec<u32>,
    step: u64,
    /// Sample rank per μ slot.
    inverse: Vec<Pos>,
}

impl<'a> DifferenceCover<'a> {
    /// Build the sampler and sort its sample. `outer_prefixlength` caps
    /// the bucket depth used for the sample sort.
    pub fn build(
        v: u32,
        enc: &'a EncodedSequence,
        outer_prefixlength: u32,
        logger: &Logger<'_>,
    ) -> Result<Self> {
        let Some(cover) = cover_for(v) else {
            return Err(Error::misuse(format!(
                "difference cover modulo {} is not tabulated; pick one of {:?}",
                v, TABULATED_VS
            )));
        };
        if v < outer_prefixlength {
            return Err(Error::misuse(format!(
                "difference cover modulo {} is too small for prefix length {}",
                v, outer_prefixlength
            )));
        }
        let total = enc.len();
        let step = total as u64 / v as u64 + 1;
        let mut in_cover = vec![false; v as usize];
        let mut rank_base = vec![u64::MAX; v as usize];
        for (j, &d) in cover.iter().enumerate() {
            in_cover[d as usize] = true;
            rank_base[d as usize] = j as u64 * step;
        }
        let mut diff2pos = vec![0u32; v as usize];
        for &di in cover.iter().rev() {
            for &dj in cover.iter() {
                diff2pos[(dj.wrapping_sub(di) & (v - 1)) as usize] = di;
            }
        }
        let mut dcov = DifferenceCover {
            enc,
            v,
            vmask: (v - 1) as u64,
            in_cover,
            rank_base,
            diff2pos,
            step,
            inverse: vec![0; (step as usize) * cover.len()],
        };
        dcov.sort_sample(outer_prefixlength, logger)?;
        Ok(dcov)
    }

    pub fn v(&self) -> u32 {
        self.v
    }

    #[inline]
    fn residue(&self, pos: Pos) -> usize {
        (pos as u64 & self.vmask) as usize
    }

    /// Is `pos` a sample position?
    #[inline]
    pub fn is_sample(&self, pos: Pos) -> bool {
        self.in_cover[self.residue(pos)]
    }

    /// The μ packing: sample position → dense slot.
    #[inline]
    fn mu(&self, pos: Pos) -> usize {
        debug_assert!(self.is_sample(pos));
        (self.rank_base[self.residue(pos)] + pos as u64 / self.v as u64) as usize
    }

    #[inline]
    fn set_rank(&mut self, pos: Pos, rank: Pos) {
        let slot = self.mu(pos);
        self.inverse[slot] = rank;
    }

    /// The δ function: an offset below v such that both `a + δ` and
    /// `b + δ` are sample positions.
    #[inline]
    pub fn delta(&self, a: Pos, b: Pos) -> u32 {
        let d = self.diff2pos[((b as u64).wrapping_sub(a as u64) & self.vmask) as usize];
        ((d as u64).wrapping_sub(a as u64) & self.vmask) as u32
    }

    /// Total-order comparison of two suffixes, O(v)-bounded: at most δ
    /// direct symbol comparisons, then one rank lookup.
    pub fn compare(&self, a: Pos, b: Pos) -> Ordering {
        if a == b {
            return Ordering::Equal;
        }
        let delta = self.delta(a, b) as Pos;
        if delta > 0 {
            let (ord, _) = self.enc.compare_suffixes(false, a, b, 0, Some(delta));
            if ord != Ordering::Equal {
                return ord;
            }
        }
        // both a+δ and b+δ are sample positions at most one past the end
        self.inverse[self.mu(a + delta)].cmp(&self.inverse[self.mu(b + delta)])
    }

    // ------------------------------------------------------------------
    // sample construction
    // ------------------------------------------------------------------

    fn sort_sample(&mut self, outer_prefixlength: u32, logger: &Logger<'_>) -> Result<()> {
        let enc = self.enc;
        let total = enc.len();
        let sigma = enc.alphabet().num_chars();

        // the empty suffix participates when N is a sample position
        let empty_sampled = self.is_sample(total);

        let sample_k = prefixlen::recommended_prefix_length(sigma, total, true)
            .min(outer_prefixlength)
            .min(self.v);
        let mut bcktab = Bcktab::new(sigma, sample_k, total, true)?;

        // counting pass over the sample positions
        let mut special_first = 0u64;
        for (pos, class) in KmerScanner::new(enc, sample_k) {
            if !self.is_sample(pos) {
                continue;
            }
            match class {
                WindowClass::Full(code) => bcktab.add_code(code),
                WindowClass::SpecialInside { prefix_index, partial } => {
                    let code = bcktab.pad_code_max(partial, prefix_index);
                    bcktab.add_code(code);
                    bcktab.update_specials(code, prefix_index);
                }
                WindowClass::Truncated { prefix_index, partial } => {
                    bcktab.add_code(bcktab.pad_code_min(partial, prefix_index));
                }
                WindowClass::SpecialFirst => special_first += 1,
            }
        }
        let sums = bcktab.prefix_sum();
        let covered = sums.num_suffixes;
        log!(
            logger,
            "difference cover modulo {}: {} sample positions, prefix length {}",
            self.v,
            covered as u64 + special_first + empty_sampled as u64,
            sample_k
        );

        // the sorted sample: [empty][bucket-covered][special-first desc]
        let head = empty_sampled as usize;
        let mut sample =
            vec![0 as Pos; head + covered as usize + special_first as usize];
        if empty_sampled {
            sample[0] = total;
        }

        // insertion: tail partitions, then plain windows, then truncated
        let mut backs: Vec<(u32, Pos)> = Vec::new();
        let mut fronts: Vec<(u32, Pos)> = Vec::new();
        for (pos, class) in KmerScanner::new(enc, sample_k) {
            if !self.is_sample(pos) {
                continue;
            }
            if let WindowClass::SpecialInside { prefix_index, .. } = class {
                backs.push((prefix_index, pos));
            } else if let WindowClass::Truncated { prefix_index, .. } = class {
                fronts.push((prefix_index, pos));
            }
        }
        backs.sort_unstable();
        let classify = |pos: Pos| -> WindowClass {
            // re-derive the window class of one position
            KmerScanner::classify_at(enc, sample_k, pos)
        };
        for &(prefix_index, pos) in &backs {
            let WindowClass::SpecialInside { partial, .. } = classify(pos) else {
                unreachable!()
            };
            let code = bcktab.pad_code_max(partial, prefix_index);
            let slot = bcktab.insertion_index(code);
            sample[head + slot as usize] = pos;
        }
        for (pos, class) in KmerScanner::new(enc, sample_k) {
            if !self.is_sample(pos) {
                continue;
            }
            if let WindowClass::Full(code) = class {
                let slot = bcktab.insertion_index(code);
                sample[head + slot as usize] = pos;
            }
        }
        fronts.sort_unstable_by(|a, b| b.cmp(a));
        for &(prefix_index, pos) in &fronts {
            let WindowClass::Truncated { partial, .. } = classify(pos) else {
                unreachable!()
            };
            let code = bcktab.pad_code_min(partial, prefix_index);
            let slot = bcktab.insertion_index(code);
            sample[head + slot as usize] = pos;
        }
        // special-first sample positions, descending
        {
            let mut next = head + covered as usize;
            for range in enc.special_ranges(false) {
                let mut pos = range.end;
                while pos > range.start {
                    pos -= 1;
                    if self.is_sample(pos) {
                        sample[next] = pos;
                        next += 1;
                    }
                }
            }
            debug_assert_eq!(next, sample.len());
        }

        // per-bucket refinement to depth v, queuing ambiguous ranges
        let strategy = SortStrategy {
            sort_max_depth: Some(self.v as Pos),
            ..SortStrategy::default()
        };
        let env = SortEnv { enc, strategy };
        let mut counters = SortCounters::default();
        let mut first_generation: Vec<(Pos, Pos)> = Vec::new();
        let front_in = |code: u64, fronts: &[(u32, Pos)]| -> Pos {
            fronts
                .iter()
                .filter(|&&(prefix_index, pos)| {
                    let WindowClass::Truncated { partial, .. } = classify(pos) else {
                        return false;
                    };
                    bcktab.pad_code_min(partial, prefix_index) == code
                })
                .count() as Pos
        };
        for code in 0..bcktab.numofallcodes() {
            let spec = bcktab.bounds_in_part(code, bcktab.numofallcodes() - 1, covered);
            let front = front_in(code, &fronts);
            let sortable = spec.width - spec.specials - front;
            if sortable > 1 {
                let lo = head + (spec.left + front) as usize;
                let hi = lo + sortable as usize;
                let mut resolver = CollectResolver {
                    ranges: &mut first_generation,
                };
                bentsedg::sort_bucket(
                    &env,
                    &mut sample[lo..hi],
                    lo as Pos,
                    sample_k as Pos,
                    &mut resolver,
                    &mut counters,
                );
            }
        }

        // initial inverse ranks: position → index, ambiguous ranges
        // anchored at their leftmost slot
        for idx in 0..sample.len() {
            self.set_rank(sample[idx], idx as Pos);
        }
        for &(offset, width) in &first_generation {
            for idx in offset..offset + width {
                self.set_rank(sample[idx as usize], offset);
            }
        }

        // rank doubling over the queue of unsorted ranges
        let mut queue: VecDeque<(Pos, Pos, Pos)> = first_generation
            .iter()
            .map(|&(offset, width)| (offset, width, self.v as Pos))
            .collect();
        let mut max_queued = queue.len();
        let mut keys: Vec<(Pos, Pos)> = Vec::new();
        while let Some((offset, width, depth)) = queue.pop_front() {
            keys.clear();
            for idx in offset..offset + width {
                let pos = sample[idx as usize];
                keys.push((self.inverse[self.mu(pos + depth)], pos));
            }
            keys.sort_unstable();
            for (slot, &(_, pos)) in keys.iter().enumerate() {
                sample[offset as usize + slot] = pos;
            }
            let mut range_start = 0usize;
            for idx in 1..=keys.len() {
                if idx == keys.len() || keys[idx].0 != keys[range_start].0 {
                    let lo = offset + range_start as Pos;
                    let sub_width = idx as Pos - range_start as Pos;
                    if sub_width > 1 {
                        for member in lo..lo + sub_width {
                            self.set_rank(sample[member as usize], lo);
                        }
                        queue.push_back((lo, sub_width, depth * 2));
                        max_queued = max_queued.max(queue.len());
                    } else {
                        self.set_rank(sample[lo as usize], lo);
                    }
                    range_start = idx;
                }
            }
        }
        log!(logger, "max queue size {}", max_queued);
        Ok(())
    }
}
