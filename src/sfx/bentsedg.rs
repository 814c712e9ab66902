// Copyright 2025-present Harry Tummalacherla
// SPDX-License-Identifier: Apache-2.0

//! Per-bucket refinement.
//!
//! Buckets arrive sharing their first k symbols; this module sorts them
//! the rest of the way with a strategy ladder:
//!
//! - width ≤ `max_insertion_sort` (3): insertion sort, symbol compare;
//! - width ≤ `max_blindtrie_sort` (1000): blind-trie sort;
//! - width ≤ `max_counting_sort` (4000): counting sort on the symbol at
//!   the current depth, recursing per class;
//! - otherwise: ternary (three-way) partitioning with a median-of-three
//!   pivot, recursing into the smaller sides first.
//!
//! In depth-bounded mode (`sort_max_depth` set, used under the
//! difference-cover accelerator) refinement partitions ternary all the
//! way; a range still ambiguous at the depth bound is handed to the
//! [`RangeResolver`] instead of being refined further.

use std::cmp::Ordering;

use crate::encseq::{EncodedSequence, SuffixSym};
use crate::types::Pos;

use super::blindtrie;
use super::{SortCounters, SortStrategy};

/// What to do with a range that is still unsorted at the depth bound.
pub trait RangeResolver {
    /// `abs_offset` is the absolute suffix-array offset of `slice[0]`.
    fn resolve(
        &mut self,
        env: &SortEnv<'_>,
        slice: &mut [Pos],
        abs_offset: Pos,
        depth: Pos,
        counters: &mut SortCounters,
    );
}

/// Depth-unbounded sorting never resolves.
#[derive(Clone, Copy)]
pub struct NoResolver;

impl RangeResolver for NoResolver {
    fn resolve(
        &mut self,
        _env: &SortEnv<'_>,
        _slice: &mut [Pos],
        _abs_offset: Pos,
        _depth: Pos,
        _counters: &mut SortCounters,
    ) {
        unreachable!("depth bound hit without a resolver");
    }
}

/// Queue the range for a later pass (difference-cover sample building).
pub struct CollectResolver<'a> {
    pub ranges: &'a mut Vec<(Pos, Pos)>,
}

impl RangeResolver for CollectResolver<'_> {
    fn resolve(
        &mut self,
        _env: &SortEnv<'_>,
        slice: &mut [Pos],
        abs_offset: Pos,
        _depth: Pos,
        _counters: &mut SortCounters,
    ) {
        self.ranges.push((abs_offset, slice.len() as Pos));
    }
}

/// Read-only sorting environment shared by every bucket of a run.
pub struct SortEnv<'a> {
    pub enc: &'a EncodedSequence,
    pub strategy: SortStrategy,
}

impl SortEnv<'_> {
    #[inline]
    fn sym(&self, suffix: Pos, depth: Pos) -> SuffixSym {
        self.enc.suffix_sym(suffix, depth, false)
    }

    #[inline]
    fn compare(&self, a: Pos, b: Pos, depth: Pos, counters: &mut SortCounters) -> Ordering {
        counters.suffix_comparisons += 1;
        self.enc.compare_suffixes(false, a, b, depth, None).0
    }
}

/// Sort one bucket whose suffixes share `depth` leading symbols.
pub fn sort_bucket<R: RangeResolver>(
    env: &SortEnv<'_>,
    slice: &mut [Pos],
    abs_offset: Pos,
    depth: Pos,
    resolver: &mut R,
    counters: &mut SortCounters,
) {
    if slice.len() < 2 {
        return;
    }
    if env.strategy.sort_max_depth.is_some() {
        ternary_bounded(env, slice, abs_offset, depth, resolver, counters);
    } else {
        refine(env, slice, depth, counters);
    }
}

/// The unbounded strategy ladder.
fn refine(env: &SortEnv<'_>, slice: &mut [Pos], depth: Pos, counters: &mut SortCounters) {
    if slice.len() < 2 {
        return;
    }
    let width = slice.len() as Pos;
    if width <= env.strategy.max_insertion_sort {
        insertion_sort(env, slice, depth, counters);
    } else if width <= env.strategy.max_blindtrie_sort {
        blindtrie::sort(env.enc, slice, depth, counters);
    } else if width <= env.strategy.max_counting_sort {
        counting_sort(env, slice, depth, counters);
    } else {
        ternary_unbounded(env, slice, depth, counters);
    }
}

fn insertion_sort(env: &SortEnv<'_>, slice: &mut [Pos], depth: Pos, counters: &mut SortCounters) {
    for idx in 1..slice.len() {
        let mut cur = idx;
        while cur > 0
            && env.compare(slice[cur], slice[cur - 1], depth, counters) == Ordering::Less
        {
            slice.swap(cur, cur - 1);
            cur -= 1;
        }
    }
}

/// Distribute by the symbol class at `depth`, recurse per alphabet
/// class. End-of-data sorts first, specials last (mutually ordered by
/// the position rule, so they need one key sort, not a recursion).
fn counting_sort(env: &SortEnv<'_>, slice: &mut [Pos], depth: Pos, counters: &mut SortCounters) {
    let sigma = env.enc.alphabet().num_chars() as usize;
    // class 0 = end, 1..=sigma = alphabet, sigma+1 = special
    let class = |sym: SuffixSym| -> usize {
        match sym {
            SuffixSym::End => 0,
            SuffixSym::Alph(code) => 1 + code as usize,
            SuffixSym::Special(_) => sigma + 1,
        }
    };
    let mut counts = vec![0usize; sigma + 2];
    for &suffix in slice.iter() {
        counts[class(env.sym(suffix, depth))] += 1;
    }
    let mut starts = vec![0usize; sigma + 2];
    let mut acc = 0;
    for (idx, &count) in counts.iter().enumerate() {
        starts[idx] = acc;
        acc += count;
    }
    let mut scratch = vec![0 as Pos; slice.len()];
    let mut write = starts.clone();
    for &suffix in slice.iter() {
        let cls = class(env.sym(suffix, depth));
        scratch[write[cls]] = suffix;
        write[cls] += 1;
    }
    slice.copy_from_slice(&scratch);
    // specials: descending special position == ascending suffix order
    let special_start = starts[sigma + 1];
    slice[special_start..].sort_unstable_by(|&a, &b| (b + depth).cmp(&(a + depth)));
    for cls in 1..=sigma {
        let lo = starts[cls];
        let hi = starts[cls] + counts[cls];
        if hi - lo > 1 {
            refine(env, &mut slice[lo..hi], depth + 1, counters);
        }
    }
}

/// Median-of-three pivot choice on the symbol at `depth`.
fn pivot_sym(env: &SortEnv<'_>, slice: &[Pos], depth: Pos) -> SuffixSym {
    let first = env.sym(slice[0], depth);
    let mid = env.sym(slice[slice.len() / 2], depth);
    let last = env.sym(slice[slice.len() - 1], depth);
    // median of three
    if (first <= mid) == (mid <= last) {
        mid
    } else if (mid <= first) == (first <= last) {
        first
    } else {
        last
    }
}

/// Three-way partition by the symbol at `depth`. Returns the bounds of
/// the equal band.
fn partition3(
    env: &SortEnv<'_>,
    slice: &mut [Pos],
    depth: Pos,
    pivot: SuffixSym,
) -> (usize, usize) {
    let mut lt = 0usize;
    let mut idx = 0usize;
    let mut gt = slice.len();
    while idx < gt {
        match env.sym(slice[idx], depth).cmp(&pivot) {
            Ordering::Less => {
                slice.swap(lt, idx);
                lt += 1;
                idx += 1;
            }
            Ordering::Greater => {
                gt -= 1;
                slice.swap(idx, gt);
            }
            Ordering::Equal => idx += 1,
        }
    }
    (lt, gt)
}

fn ternary_unbounded(env: &SortEnv<'_>, slice: &mut [Pos], depth: Pos, counters: &mut SortCounters) {
    let mut slice = slice;
    let mut depth = depth;
    loop {
        if slice.len() < 2 {
            return;
        }
        if slice.len() as Pos <= env.strategy.max_counting_sort {
            // dropped below the ladder threshold while recursing
            refine(env, slice, depth, counters);
            return;
        }
        let pivot = pivot_sym(env, slice, depth);
        let (lt, gt) = partition3(env, slice, depth, pivot);
        let (low, rest) = slice.split_at_mut(lt);
        let (mid, high) = rest.split_at_mut(gt - lt);
        ternary_unbounded(env, low, depth, counters);
        ternary_unbounded(env, high, depth, counters);
        // the equal band shares one more symbol; specials and end are
        // unique keys, so a non-alphabet band is width ≤ 1
        if matches!(pivot, SuffixSym::Alph(_)) {
            slice = mid;
            depth += 1;
        } else {
            return;
        }
    }
}

/// Depth-bounded ternary partitioning; ambiguous-at-bound ranges go to
/// the resolver.
fn ternary_bounded<R: RangeResolver>(
    env: &SortEnv<'_>,
    slice: &mut [Pos],
    abs_offset: Pos,
    depth: Pos,
    resolver: &mut R,
    counters: &mut SortCounters,
) {
    if slice.len() < 2 {
        return;
    }
    let maxdepth = env
        .strategy
        .sort_max_depth
        .expect("bounded sort without a depth bound");
    if depth >= maxdepth {
        resolver.resolve(env, slice, abs_offset, depth, counters);
        return;
    }
    let pivot = pivot_sym(env, slice, depth);
    let (lt, gt) = partition3(env, slice, depth, pivot);
    let (low, rest) = slice.split_at_mut(lt);
    let (mid, high) = rest.split_at_mut(gt - lt);
    ternary_bounded(env, low, abs_offset, depth, resolver, counters);
    if matches!(pivot, SuffixSym::Alph(_)) {
        ternary_bounded(
            env,
            mid,
            abs_offset + lt as Pos,
            depth + 1,
            resolver,
            counters,
        );
    }
    ternary_bounded(
        env,
        high,
        abs_offset + gt as Pos,
        depth,
        resolver,
        counters,
    );
}
