// Copyright 2025-present Harry Tummalacherla
// SPDX-License-Identifier: Apache-2.0

//! Side index over the positions of wildcard / separator runs.
//!
//! The 2-bit payload has no room for the special symbols, so the ranges
//! variants keep them in three parallel tables: for every stored run, its
//! start offset within a fixed-size page, its length minus one, and — per
//! page — the cumulative number of runs ended on or before that page.
//! Three width variants (u8 / u16 / u32 offsets, page sizes 2^8 / 2^16 /
//! 2^32) trade table width against page count; the builder's size
//! heuristic picks one.
//!
//! Invariants:
//! - every stored run lies entirely within one page (maximal runs that
//!   would cross a boundary are split when the table is built);
//! - stored runs are disjoint, in ascending position order;
//! - the sum of all run lengths equals the total-specials counter;
//! - `endsubs[p]` equals the number of runs contained in pages `0..=p`.

use crate::types::Pos;

/// A maximal run of special positions, half-open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecialRange {
    pub start: Pos,
    pub end: Pos,
}

impl SpecialRange {
    pub fn len(&self) -> Pos {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

/// Storage width of the per-run tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeWidth {
    U8,
    U16,
    U32,
}

impl RangeWidth {
    /// Page size in positions.
    pub fn page(self) -> u64 {
        match self {
            RangeWidth::U8 => 1 << 8,
            RangeWidth::U16 => 1 << 16,
            RangeWidth::U32 => 1 << 32,
        }
    }

    /// Bytes per stored cell.
    pub fn cell_bytes(self) -> usize {
        match self {
            RangeWidth::U8 => 1,
            RangeWidth::U16 => 2,
            RangeWidth::U32 => 4,
        }
    }

    /// Number of pages covering `total` positions.
    pub fn page_count(self, total: Pos) -> usize {
        (total as u64 / self.page()) as usize + 1
    }

    /// How many stored runs `maximal_runs` split into under this width.
    pub fn split_count(self, maximal_runs: &[SpecialRange]) -> u64 {
        let page = self.page();
        let mut count = 0u64;
        for range in maximal_runs {
            let first_page = range.start as u64 / page;
            let last_page = (range.end as u64 - 1) / page;
            count += last_page - first_page + 1;
        }
        count
    }
}

/// The three tables for one chosen width.
#[derive(Debug, Clone)]
pub struct RangeTables {
    width: RangeWidth,
    /// Run start offsets within their page, ascending globally.
    offsets: Vec<u64>,
    /// Run lengths minus one.
    lens: Vec<u64>,
    /// Cumulative run count per page.
    endsubs: Vec<u64>,
    total: Pos,
}

impl RangeTables {
    /// Split `maximal_runs` at page boundaries and build the tables.
    pub fn build(width: RangeWidth, maximal_runs: &[SpecialRange], total: Pos) -> Self {
        let page = width.page();
        let mut offsets = Vec::new();
        let mut lens = Vec::new();
        let mut per_page = vec![0u64; width.page_count(total)];
        for range in maximal_runs {
            debug_assert!(!range.is_empty());
            let mut start = range.start as u64;
            let end = range.end as u64;
            while start < end {
                let page_num = start / page;
                let piece_end = end.min((page_num + 1) * page);
                offsets.push(start % page);
                lens.push(piece_end - start - 1);
                per_page[page_num as usize] += 1;
                start = piece_end;
            }
        }
        let mut endsubs = per_page;
        for idx in 1..endsubs.len() {
            endsubs[idx] += endsubs[idx - 1];
        }
        RangeTables {
            width,
            offsets,
            lens,
            endsubs,
            total,
        }
    }

    /// Reassemble from raw table cells (reader path). `offsets` and
    /// `lens` are the stored cells widened to u64.
    pub fn from_raw(
        width: RangeWidth,
        offsets: Vec<u64>,
        lens: Vec<u64>,
        endsubs: Vec<u64>,
        total: Pos,
    ) -> Self {
        RangeTables {
            width,
            offsets,
            lens,
            endsubs,
            total,
        }
    }

    pub fn width(&self) -> RangeWidth {
        self.width
    }

    pub fn num_ranges(&self) -> usize {
        self.offsets.len()
    }

    pub fn offsets(&self) -> &[u64] {
        &self.offsets
    }

    pub fn lens(&self) -> &[u64] {
        &self.lens
    }

    pub fn endsubs(&self) -> &[u64] {
        &self.endsubs
    }

    /// Sum of all stored run lengths.
    pub fn total_specials(&self) -> Pos {
        self.lens.iter().map(|l| l + 1).sum::<u64>() as Pos
    }

    /// Page containing stored run `idx`.
    fn page_of(&self, idx: usize) -> usize {
        self.endsubs.partition_point(|&cum| cum <= idx as u64)
    }

    /// Absolute coordinates of stored run `idx`.
    pub fn stored_range(&self, idx: usize) -> SpecialRange {
        let page = self.page_of(idx) as u64 * self.width.page();
        SpecialRange {
            start: (page + self.offsets[idx]) as Pos,
            end: (page + self.offsets[idx] + self.lens[idx] + 1) as Pos,
        }
    }

    /// Index of the first stored run ending after `pos`, or
    /// `num_ranges()` if every run ends at or before `pos`.
    fn first_ending_after(&self, pos: Pos) -> usize {
        let mut lo = 0usize;
        let mut hi = self.num_ranges();
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            if self.stored_range(mid).end <= pos {
                lo = mid + 1;
            } else {
                hi = mid;
            }
        }
        lo
    }

    /// Smallest special position `>= pos`, or `total` if there is none.
    pub fn stop_forward(&self, pos: Pos) -> Pos {
        let idx = self.first_ending_after(pos);
        if idx == self.num_ranges() {
            return self.total;
        }
        let range = self.stored_range(idx);
        if range.start > pos {
            range.start
        } else {
            pos
        }
    }

    /// One past the largest special position `<= pos`, or 0 if none.
    pub fn stop_backward(&self, pos: Pos) -> Pos {
        // last stored run starting at or before pos
        let mut lo = 0usize;
        let mut hi = self.num_ranges();
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            if self.stored_range(mid).start <= pos {
                lo = mid + 1;
            } else {
                hi = mid;
            }
        }
        if lo == 0 {
            return 0;
        }
        let range = self.stored_range(lo - 1);
        if range.end > pos {
            pos + 1
        } else {
            range.end
        }
    }

    /// True iff any position in `[from, from+len)` is special.
    pub fn contains_special(&self, from: Pos, len: Pos) -> bool {
        len > 0 && self.stop_forward(from) < from + len
    }

    /// Maximal (merged) ranges in ascending or descending order.
    pub fn iter(&self, forward: bool) -> MergedRangeIter<'_> {
        MergedRangeIter {
            tables: self,
            next: if forward { 0 } else { self.num_ranges() },
            forward,
        }
    }

    /// Amortised-O(1) stop-position cursor for monotone scans.
    pub fn cursor(&self, startpos: Pos, forward: bool) -> StopCursor<'_> {
        let idx = if forward {
            self.first_ending_after(startpos)
        } else {
            let mut lo = 0usize;
            let mut hi = self.num_ranges();
            while lo < hi {
                let mid = lo + (hi - lo) / 2;
                if self.stored_range(mid).start <= startpos {
                    lo = mid + 1;
                } else {
                    hi = mid;
                }
            }
            lo
        };
        StopCursor {
            tables: self,
            idx,
            forward,
        }
    }
}

/// Iterator over maximal special ranges; adjacent stored pieces that abut
/// (page-boundary splits) are merged on the fly.
pub struct MergedRangeIter<'a> {
    tables: &'a RangeTables,
    next: usize,
    forward: bool,
}

impl Iterator for MergedRangeIter<'_> {
    type Item = SpecialRange;

    fn next(&mut self) -> Option<SpecialRange> {
        if self.forward {
            if self.next >= self.tables.num_ranges() {
                return None;
            }
            let mut range = self.tables.stored_range(self.next);
            self.next += 1;
            while self.next < self.tables.num_ranges() {
                let follow = self.tables.stored_range(self.next);
                if follow.start == range.end {
                    range.end = follow.end;
                    self.next += 1;
                } else {
                    break;
                }
            }
            Some(range)
        } else {
            if self.next == 0 {
                return None;
            }
            self.next -= 1;
            let mut range = self.tables.stored_range(self.next);
            while self.next > 0 {
                let before = self.tables.stored_range(self.next - 1);
                if before.end == range.start {
                    range.start = before.start;
                    self.next -= 1;
                } else {
                    break;
                }
            }
            Some(range)
        }
    }
}

/// Sequential stop-position lookup; `pos` arguments must advance
/// monotonically in the cursor's direction.
pub struct StopCursor<'a> {
    tables: &'a RangeTables,
    /// Forward: index of the candidate run (first ending after the last
    /// queried pos). Backward: one past the candidate run.
    idx: usize,
    forward: bool,
}

impl StopCursor<'_> {
    /// Same contract as [`RangeTables::stop_forward`].
    pub fn stop_forward(&mut self, pos: Pos) -> Pos {
        debug_assert!(self.forward);
        while self.idx < self.tables.num_ranges() {
            let range = self.tables.stored_range(self.idx);
            if range.end <= pos {
                self.idx += 1;
                continue;
            }
            return if range.start > pos { range.start } else { pos };
        }
        self.tables.total
    }

    /// Same contract as [`RangeTables::stop_backward`].
    pub fn stop_backward(&mut self, pos: Pos) -> Pos {
        debug_assert!(!self.forward);
        while self.idx > 0 {
            let range = self.tables.stored_range(self.idx - 1);
            if range.start > pos {
                self.idx -= 1;
                continue;
            }
            return if range.end > pos { pos + 1 } else { range.end };
        }
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn runs(pairs: &[(u64, u64)]) -> Vec<SpecialRange> {
        pairs
            .iter()
            .map(|&(start, end)| SpecialRange {
                start: start as Pos,
                end: end as Pos,
            })
            .collect()
    }

    #[test]
    fn build_splits_at_page_boundaries() {
        // u8 pages are 256 wide; a run crossing 256 splits in two
        let tables = RangeTables::build(RangeWidth::U8, &runs(&[(250, 260), (300, 301)]), 1000);
        assert_eq!(tables.num_ranges(), 3);
        assert_eq!(
            tables.stored_range(0),
            SpecialRange { start: 250, end: 256 }
        );
        assert_eq!(
            tables.stored_range(1),
            SpecialRange { start: 256, end: 260 }
        );
        assert_eq!(
            tables.stored_range(2),
            SpecialRange { start: 300, end: 301 }
        );
        assert_eq!(tables.total_specials(), 11);
        assert_eq!(tables.endsubs(), &[1, 2, 2, 2]);
    }

    #[test]
    fn split_count_matches_build() {
        let maximal = runs(&[(0, 5), (250, 600), (777, 778)]);
        for width in [RangeWidth::U8, RangeWidth::U16, RangeWidth::U32] {
            let tables = RangeTables::build(width, &maximal, 1000);
            assert_eq!(width.split_count(&maximal), tables.num_ranges() as u64);
        }
    }

    #[test]
    fn stop_positions() {
        let tables = RangeTables::build(RangeWidth::U8, &runs(&[(10, 12), (20, 21)]), 30);
        assert_eq!(tables.stop_forward(0), 10);
        assert_eq!(tables.stop_forward(10), 10);
        assert_eq!(tables.stop_forward(11), 11);
        assert_eq!(tables.stop_forward(12), 20);
        assert_eq!(tables.stop_forward(21), 30);
        assert_eq!(tables.stop_backward(29), 21);
        assert_eq!(tables.stop_backward(20), 21);
        assert_eq!(tables.stop_backward(19), 12);
        assert_eq!(tables.stop_backward(11), 12);
        assert_eq!(tables.stop_backward(10), 11);
        assert_eq!(tables.stop_backward(9), 0);
    }

    #[test]
    fn merged_iteration_rejoins_page_splits() {
        let maximal = runs(&[(250, 260), (300, 302)]);
        let tables = RangeTables::build(RangeWidth::U8, &maximal, 1000);
        let fwd: Vec<_> = tables.iter(true).collect();
        assert_eq!(fwd, maximal);
        let mut bwd: Vec<_> = tables.iter(false).collect();
        bwd.reverse();
        assert_eq!(bwd, maximal);
    }

    #[test]
    fn cursor_agrees_with_random_access() {
        let maximal = runs(&[(3, 8), (255, 257), (511, 520), (600, 601)]);
        let tables = RangeTables::build(RangeWidth::U8, &maximal, 700);
        let mut cursor = tables.cursor(0, true);
        for pos in 0..700u64 {
            assert_eq!(
                cursor.stop_forward(pos as Pos),
                tables.stop_forward(pos as Pos),
                "fwd at {}",
                pos
            );
        }
        let mut cursor = tables.cursor(699, false);
        for pos in (0..700u64).rev() {
            assert_eq!(
                cursor.stop_backward(pos as Pos),
                tables.stop_backward(pos as Pos),
                "bwd at {}",
                pos
            );
        }
    }

    #[test]
    fn contains_special_spans() {
        let tables = RangeTables::build(RangeWidth::U16, &runs(&[(100, 105)]), 1000);
        assert!(!tables.contains_special(0, 100));
        assert!(tables.contains_special(0, 101));
        assert!(tables.contains_special(104, 1));
        assert!(!tables.contains_special(105, 500));
        assert!(!tables.contains_special(50, 0));
    }
}
