// Copyright 2025-present Harry Tummalacherla
// SPDX-License-Identifier: Apache-2.0

//! The suffix sorter.
//!
//! Pipeline, per part of the suffix array:
//!
//! 1. **Count.** One scan over the encoded sequence classifies every
//!    position's k-window (plain, special-interrupted, end-truncated,
//!    or starting on a special) and counts it into the bucket table.
//! 2. **Insert.** After the prefix-sum pass, a second scan writes each
//!    suffix into its bucket, right to left: the special-interrupted
//!    windows first (they occupy the bucket tails), the plain windows,
//!    and finally the end-truncated ones (bucket heads).
//! 3. **Refine.** Each bucket is sorted by the strategy ladder in
//!    [`bentsedg`], or derived wholesale by the copy-sort shortcut, or
//!    cut off at depth v and finished by the difference-cover
//!    comparator.
//!
//! Suffixes whose *first* symbol is special are appended after the last
//! part in descending position order (among specials the smaller
//! position is the greater suffix). The optional parallel level sorts
//! the buckets of one part as independent tasks over disjoint slices.

pub mod bentsedg;
pub mod blindtrie;
pub mod copysort;

use std::collections::VecDeque;
use std::path::PathBuf;

use crate::alphabet;
use crate::bcktab::Bcktab;
use crate::diffcov::DifferenceCover;
use crate::encseq::{EncodedSequence, EncseqReader};
use crate::error::{Error, Result};
use crate::log;
use crate::logger::Logger;
use crate::parts::SuftabParts;
use crate::prefixlen;
use crate::types::{Code, Pos, Readmode};

use bentsedg::{RangeResolver, SortEnv};
use copysort::CopySort;

/// Tuning knobs of the refinement ladder.
#[derive(Debug, Clone, Copy)]
pub struct SortStrategy {
    pub max_insertion_sort: Pos,
    pub max_blindtrie_sort: Pos,
    pub max_counting_sort: Pos,
    /// Stop refining at this depth and hand the range to the resolver
    /// (set internally when a difference cover is active).
    pub sort_max_depth: Option<Pos>,
    /// Difference-cover modulus; enables the O(1) deep comparator.
    pub diffcover: Option<u32>,
    /// Allow the copy-sort shortcut when its preconditions hold.
    pub use_copysort: bool,
    /// An LCP consumer is attached (disables copy-sort per the
    /// shortcut's preconditions).
    pub with_lcp: bool,
}

impl Default for SortStrategy {
    fn default() -> Self {
        SortStrategy {
            max_insertion_sort: 3,
            max_blindtrie_sort: 1000,
            max_counting_sort: 4000,
            sort_max_depth: None,
            diffcover: None,
            use_copysort: true,
            with_lcp: false,
        }
    }
}

/// Session-scoped monotonic counters, surfaced by a debug hook only.
#[derive(Debug, Clone, Copy, Default)]
pub struct SortCounters {
    pub suffix_comparisons: u64,
    pub maxdepth_resolutions: u64,
}

impl SortCounters {
    fn absorb(&mut self, other: SortCounters) {
        self.suffix_comparisons += other.suffix_comparisons;
        self.maxdepth_resolutions += other.maxdepth_resolutions;
    }
}

// ============================================================================
// WINDOW CLASSIFICATION
// ============================================================================

/// What the k-window starting at a position looks like.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowClass {
    /// k plain symbols; the full k-mer code.
    Full(Code),
    /// `prefix_index` plain symbols, then a wildcard or separator.
    SpecialInside { prefix_index: u32, partial: Code },
    /// `prefix_index` plain symbols, then the end of the data.
    Truncated { prefix_index: u32, partial: Code },
    /// The position itself is special.
    SpecialFirst,
}

/// One pass over all positions yielding `(position, WindowClass)`,
/// amortised O(1) per position.
pub struct KmerScanner<'a> {
    enc: &'a EncodedSequence,
    k: u32,
    sigma: Code,
    top_power: Code,
    reader: EncseqReader<'a>,
    next_read: Pos,
    buf: VecDeque<u8>,
    specials: VecDeque<Pos>,
    pos: Pos,
    /// Code and first symbol of the previous window, when it was a
    /// clean full window (enables the O(1) roll).
    prev_code: Code,
    prev_first: u8,
    prev_valid: bool,
}

impl<'a> KmerScanner<'a> {
    pub fn new(enc: &'a EncodedSequence, k: u32) -> Self {
        debug_assert!(k >= 1);
        let sigma = enc.alphabet().num_chars() as Code;
        KmerScanner {
            enc,
            k,
            sigma,
            top_power: sigma.pow(k - 1),
            reader: enc.reader(Readmode::Forward, 0),
            next_read: 0,
            buf: VecDeque::with_capacity(k as usize),
            specials: VecDeque::new(),
            pos: 0,
            prev_code: 0,
            prev_first: 0,
            prev_valid: false,
        }
    }

    /// Classify a single position without a scan (O(k)).
    pub fn classify_at(enc: &EncodedSequence, k: u32, pos: Pos) -> WindowClass {
        let sigma = enc.alphabet().num_chars() as Code;
        let mut partial: Code = 0;
        for off in 0..k as Pos {
            if pos + off >= enc.len() {
                return WindowClass::Truncated {
                    prefix_index: off as u32,
                    partial,
                };
            }
            let symbol = enc.symbol_at(pos + off);
            if alphabet::is_special(symbol) {
                return if off == 0 {
                    WindowClass::SpecialFirst
                } else {
                    WindowClass::SpecialInside {
                        prefix_index: off as u32,
                        partial,
                    }
                };
            }
            partial = partial * sigma + symbol as Code;
        }
        WindowClass::Full(partial)
    }

    fn horner(&self, len: usize) -> Code {
        let mut code: Code = 0;
        for idx in 0..len {
            code = code * self.sigma + self.buf[idx] as Code;
        }
        code
    }
}

impl Iterator for KmerScanner<'_> {
    type Item = (Pos, WindowClass);

    fn next(&mut self) -> Option<(Pos, WindowClass)> {
        let total = self.enc.len();
        if self.pos >= total {
            return None;
        }
        while self.next_read < total && (self.buf.len() as u32) < self.k {
            let symbol = self.reader.sequential_char_at(self.next_read);
            if alphabet::is_special(symbol) {
                self.specials.push_back(self.next_read);
            }
            self.buf.push_back(symbol);
            self.next_read += 1;
        }
        let class = match self.specials.front().copied() {
            Some(boundary) if boundary == self.pos => {
                self.prev_valid = false;
                WindowClass::SpecialFirst
            }
            Some(boundary) => {
                self.prev_valid = false;
                let prefix_index = (boundary - self.pos) as u32;
                WindowClass::SpecialInside {
                    prefix_index,
                    partial: self.horner(prefix_index as usize),
                }
            }
            None => {
                if self.buf.len() as u32 == self.k {
                    // roll the previous clean window forward, or start
                    // over with a Horner evaluation
                    let code = if self.prev_valid {
                        (self.prev_code - self.prev_first as Code * self.top_power) * self.sigma
                            + *self.buf.back().unwrap() as Code
                    } else {
                        self.horner(self.k as usize)
                    };
                    self.prev_code = code;
                    self.prev_first = self.buf[0];
                    self.prev_valid = true;
                    WindowClass::Full(code)
                } else {
                    self.prev_valid = false;
                    WindowClass::Truncated {
                        prefix_index: self.buf.len() as u32,
                        partial: self.horner(self.buf.len()),
                    }
                }
            }
        };
        let yielded = self.pos;
        // slide the window
        self.buf.pop_front();
        if self.specials.front() == Some(&self.pos) {
            self.specials.pop_front();
        }
        self.pos += 1;
        Some((yielded, class))
    }
}

// ============================================================================
// OUTPUT SINK
// ============================================================================

/// Receives the sorted suffixes as a stream of slices in final order.
pub trait SuffixSink {
    fn emit(&mut self, suffixes: &[Pos]) -> Result<()>;
}

/// Collects everything in memory.
#[derive(Default)]
pub struct VecSink {
    pub suffixes: Vec<Pos>,
}

impl SuffixSink for VecSink {
    fn emit(&mut self, suffixes: &[Pos]) -> Result<()> {
        self.suffixes.extend_from_slice(suffixes);
        Ok(())
    }
}

// ============================================================================
// DRIVER
// ============================================================================

enum DriverResolver<'d, 'e> {
    None,
    Dcov(&'d DifferenceCover<'e>),
}

impl RangeResolver for DriverResolver<'_, '_> {
    fn resolve(
        &mut self,
        _env: &SortEnv<'_>,
        slice: &mut [Pos],
        _abs_offset: Pos,
        _depth: Pos,
        counters: &mut SortCounters,
    ) {
        match self {
            DriverResolver::None => unreachable!("depth bound without a difference cover"),
            DriverResolver::Dcov(dcov) => {
                counters.maxdepth_resolutions += 1;
                slice.sort_unstable_by(|&a, &b| dcov.compare(a, b));
            }
        }
    }
}

/// The sorter session. Owns the bucket table, the part table and the
/// difference-cover sampler; borrows the encoded sequence.
pub struct Suffixer<'a> {
    enc: &'a EncodedSequence,
    prefixlength: u32,
    strategy: SortStrategy,
    bcktab: Bcktab,
    parts: SuftabParts,
    dcov: Option<DifferenceCover<'a>>,
    counters: SortCounters,
    /// End-truncated suffixes: (padded code, prefix_index, position).
    fronts: Vec<(Code, u32, Pos)>,
    spill_dir: PathBuf,
}

impl<'a> Suffixer<'a> {
    /// Count the whole input and lay out the parts. `prefixlength`
    /// `None` picks the recommended k for the input size.
    pub fn new(
        enc: &'a EncodedSequence,
        prefixlength: Option<u32>,
        numofparts: u32,
        mut strategy: SortStrategy,
        logger: &Logger<'_>,
    ) -> Result<Self> {
        let sigma = enc.alphabet().num_chars();
        if sigma < 2 {
            return Err(Error::misuse("cannot sort over a one-letter alphabet"));
        }
        // an explicit k only needs to be representable here; the space
        // budget check guards the user-facing option, not the library
        let k = prefixlength
            .unwrap_or_else(|| prefixlen::recommended_prefix_length(sigma, enc.len(), true));
        let dcov = match strategy.diffcover {
            Some(v) => {
                let dcov = DifferenceCover::build(v, enc, k, logger)?;
                strategy.sort_max_depth = Some(v as Pos);
                Some(dcov)
            }
            None => {
                if strategy.sort_max_depth.is_some() {
                    return Err(Error::misuse(
                        "a sort depth bound requires a difference cover to finish the ordering",
                    ));
                }
                None
            }
        };

        let mut bcktab = Bcktab::new(sigma, k, enc.len(), true)?;
        let mut fronts = Vec::new();
        for (pos, class) in KmerScanner::new(enc, k) {
            match class {
                WindowClass::Full(code) => bcktab.add_code(code),
                WindowClass::SpecialInside { prefix_index, partial } => {
                    let code = bcktab.pad_code_max(partial, prefix_index);
                    bcktab.add_code(code);
                    bcktab.update_specials(code, prefix_index);
                }
                WindowClass::Truncated { prefix_index, partial } => {
                    let code = bcktab.pad_code_min(partial, prefix_index);
                    bcktab.add_code(code);
                    fronts.push((code, prefix_index, pos));
                }
                WindowClass::SpecialFirst => {}
            }
        }
        let sums = bcktab.prefix_sum();
        debug_assert_eq!(
            sums.num_suffixes as u64,
            enc.len() as u64 - enc.special_info().special_characters
        );
        let parts = SuftabParts::new(numofparts, &bcktab, sums.num_suffixes);
        log!(
            logger,
            "prefix length {}, {} buckets, {} part(s), largest width {}",
            k,
            bcktab.numofallcodes(),
            parts.num_parts(),
            parts.largest_width()
        );
        for part in 0..parts.num_parts() {
            log!(logger, "widthofpart[{}]={}", part, parts.width(part));
        }
        let spill_dir = std::env::temp_dir();
        let mut suffixer = Suffixer {
            enc,
            prefixlength: k,
            strategy,
            bcktab,
            parts,
            dcov,
            counters: SortCounters::default(),
            fronts,
            spill_dir,
        };
        if suffixer.parts.num_parts() > 1 {
            let dir = suffixer.spill_dir.clone();
            suffixer.bcktab.spill_borders(&dir)?;
        }
        Ok(suffixer)
    }

    pub fn prefixlength(&self) -> u32 {
        self.prefixlength
    }

    /// Debug hook for the comparison counters.
    pub fn counters(&self) -> SortCounters {
        self.counters
    }

    pub fn bcktab(&self) -> &Bcktab {
        &self.bcktab
    }

    fn front_count(&self, code: Code) -> Pos {
        self.fronts.iter().filter(|&&(c, _, _)| c == code).count() as Pos
    }

    /// Sort everything, streaming the result into `sink` in final
    /// order.
    pub fn run(&mut self, sink: &mut dyn SuffixSink) -> Result<()> {
        let copysort_eligible = self.parts.num_parts() == 1
            && !self.strategy.with_lcp
            && self.prefixlength >= 2
            && self.strategy.use_copysort
            && self.strategy.diffcover.is_none();

        for part in 0..self.parts.num_parts() {
            self.run_part(part, copysort_eligible, sink)?;
        }
        // suffixes starting on a special, descending position
        let mut tail = Vec::new();
        for range in self.enc.special_ranges(false) {
            let mut pos = range.end;
            while pos > range.start {
                pos -= 1;
                tail.push(pos);
            }
        }
        sink.emit(&tail)?;
        Ok(())
    }

    fn run_part(
        &mut self,
        part: u32,
        copysort_eligible: bool,
        sink: &mut dyn SuffixSink,
    ) -> Result<()> {
        let mincode = self.parts.min_code(part);
        let maxcode = self.parts.max_code(part);
        let offset = self.parts.suftab_offset(part);
        let width = self.parts.width(part);
        let part_end = self.parts.end_offset(part);
        self.bcktab.map_part(mincode, maxcode)?;

        let mut suftab: Vec<Pos> = Vec::new();
        crate::error::try_reserve(&mut suftab, width as usize, "suffix sort space")?;
        suftab.resize(width as usize, 0);

        // tail partitions first: reverse final order is ascending
        // (prefix_index, position)
        let mut backs: Vec<(u32, Pos, Code)> = Vec::new();
        for (pos, class) in KmerScanner::new(self.enc, self.prefixlength) {
            if let WindowClass::SpecialInside { prefix_index, partial } = class {
                let code = self.bcktab.pad_code_max(partial, prefix_index);
                if code >= mincode && code <= maxcode {
                    backs.push((prefix_index, pos, code));
                }
            }
        }
        backs.sort_unstable();
        for &(_, pos, code) in &backs {
            let slot = self.bcktab.insertion_index(code);
            suftab[(slot - offset) as usize] = pos;
        }
        drop(backs);

        // plain windows
        for (pos, class) in KmerScanner::new(self.enc, self.prefixlength) {
            if let WindowClass::Full(code) = class {
                if code >= mincode && code <= maxcode {
                    let slot = self.bcktab.insertion_index(code);
                    suftab[(slot - offset) as usize] = pos;
                }
            }
        }

        // head partitions last: reverse final order is descending
        // prefix_index
        let mut part_fronts: Vec<(u32, Code, Pos)> = self
            .fronts
            .iter()
            .filter(|&&(code, _, _)| code >= mincode && code <= maxcode)
            .map(|&(code, prefix_index, pos)| (prefix_index, code, pos))
            .collect();
        part_fronts.sort_unstable_by(|a, b| b.cmp(a));
        for &(_, code, pos) in &part_fronts {
            let slot = self.bcktab.insertion_index(code);
            suftab[(slot - offset) as usize] = pos;
        }

        // refine
        let copysort = if copysort_eligible {
            Some(CopySort::new(self.enc, &self.bcktab, self.parts.num_suffixes()))
        } else {
            None
        };
        let env = SortEnv {
            enc: self.enc,
            strategy: self.strategy,
        };
        let mut jobs: Vec<(usize, usize)> = Vec::new();
        for code in mincode..=maxcode {
            let spec = self.bcktab.bounds_in_part(code, maxcode, part_end);
            if spec.width <= 1 {
                continue;
            }
            let front = self.front_count(code);
            let sortable = spec.width - spec.specials - front;
            if sortable <= 1 {
                continue;
            }
            if let Some(cs) = &copysort {
                if !cs.is_hard_bucket(code) {
                    continue;
                }
            }
            let lo = (spec.left + front - offset) as usize;
            jobs.push((lo, sortable as usize));
        }
        self.sort_jobs(&env, &mut suftab, &jobs);
        if let Some(cs) = &copysort {
            cs.derive(self.enc, &mut suftab);
        }
        self.bcktab.unmap_part()?;
        sink.emit(&suftab)?;
        Ok(())
    }

    /// Sort the collected bucket jobs, in parallel when the feature and
    /// the job count allow it.
    fn sort_jobs(&mut self, env: &SortEnv<'_>, suftab: &mut [Pos], jobs: &[(usize, usize)]) {
        let depth = self.prefixlength as Pos;
        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            if jobs.len() > 1 {
                // carve disjoint job slices out of the part
                let mut slices: Vec<(&mut [Pos], Pos)> = Vec::with_capacity(jobs.len());
                let mut rest: &mut [Pos] = suftab;
                let mut consumed = 0usize;
                for &(lo, len) in jobs {
                    let taken = std::mem::take(&mut rest);
                    let (_, tail) = taken.split_at_mut(lo - consumed);
                    let (job, tail) = tail.split_at_mut(len);
                    slices.push((job, lo as Pos));
                    rest = tail;
                    consumed = lo + len;
                }
                let dcov = self.dcov.as_ref();
                let merged = slices
                    .into_par_iter()
                    .map(|(slice, abs)| {
                        let mut counters = SortCounters::default();
                        let mut resolver = match dcov {
                            Some(dcov) => DriverResolver::Dcov(dcov),
                            None => DriverResolver::None,
                        };
                        bentsedg::sort_bucket(env, slice, abs, depth, &mut resolver, &mut counters);
                        counters
                    })
                    .reduce(SortCounters::default, |mut a, b| {
                        a.absorb(b);
                        a
                    });
                self.counters.absorb(merged);
                return;
            }
        }
        let mut counters = SortCounters::default();
        let mut resolver = match self.dcov.as_ref() {
            Some(dcov) => DriverResolver::Dcov(dcov),
            None => DriverResolver::None,
        };
        for &(lo, len) in jobs {
            bentsedg::sort_bucket(
                env,
                &mut suftab[lo..lo + len],
                lo as Pos,
                depth,
                &mut resolver,
                &mut counters,
            );
        }
        self.counters.absorb(counters);
    }
}

/// One-call in-memory sort (single part).
pub fn sort_suffixes(
    enc: &EncodedSequence,
    prefixlength: Option<u32>,
    strategy: SortStrategy,
    logger: &Logger<'_>,
) -> Result<Vec<Pos>> {
    let mut suffixer = Suffixer::new(enc, prefixlength, 1, strategy, logger)?;
    let mut sink = VecSink::default();
    suffixer.run(&mut sink)?;
    Ok(sink.suffixes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alphabet::Alphabet;
    use crate::encseq::builder::{build_from_symbols, SatChoice};
    use crate::testing;

    fn dna(text: &str) -> Vec<u8> {
        testing::dna_symbols(text)
    }

    fn enc_of(text: &str) -> EncodedSequence {
        build_from_symbols(&dna(text), Alphabet::dna(), SatChoice::Auto).unwrap()
    }

    #[test]
    fn scanner_classes_match_point_classification() {
        for text in [
            "acgtacgt",
            "??acg?t|acgt???a?",
            "a",
            "acg",
            "tttt?",
            "|acgt|",
        ] {
            let enc = enc_of(text);
            for k in 1..=4u32 {
                let scanned: Vec<_> = KmerScanner::new(&enc, k).collect();
                assert_eq!(scanned.len() as Pos, enc.len());
                for &(pos, class) in &scanned {
                    assert_eq!(
                        class,
                        KmerScanner::classify_at(&enc, k, pos),
                        "text {:?} k {} pos {}",
                        text,
                        k,
                        pos
                    );
                }
            }
        }
    }

    fn check_sorted(text: &str, prefixlength: Option<u32>, strategy: SortStrategy) {
        let enc = enc_of(text);
        let got = sort_suffixes(&enc, prefixlength, strategy, &Logger::quiet()).unwrap();
        let expect = testing::naive_sorted_suffixes(&enc);
        assert_eq!(
            got, expect,
            "text {:?} k {:?} strategy {:?}",
            text, prefixlength, strategy
        );
    }

    #[test]
    fn the_all_a_input_sorts_shortest_first() {
        // AAAA: sorted suffixes are 3, 2, 1, 0
        let enc = enc_of("aaaa");
        let got = sort_suffixes(
            &enc,
            Some(2),
            SortStrategy::default(),
            &Logger::quiet(),
        )
        .unwrap();
        assert_eq!(got, vec![3, 2, 1, 0]);
    }

    #[test]
    fn sorts_match_the_naive_reference() {
        for text in [
            "acgtacgtacgt",
            "gattacagattaca",
            "acgt?acgt|tgca?",
            "??aa??aa??",
            "ttttttttttttttttt",
            "acgtgtcaagcttgcatgcaacgtactg",
            "a|c|g|t",
            "ac",
        ] {
            for k in [1u32, 2, 3] {
                check_sorted(text, Some(k), SortStrategy::default());
            }
            check_sorted(text, None, SortStrategy::default());
        }
    }

    #[test]
    fn copysort_and_plain_sort_agree() {
        for text in [
            "acgtacgtacgtacgtacgt",
            "aaaaaaaaaa",
            "acaacaacaacaaca",
            "gtgtgtgtacacacac?ggg|ttaacc",
            "tacagtacagtacagtaca",
        ] {
            let enc = enc_of(text);
            let with = sort_suffixes(
                &enc,
                Some(2),
                SortStrategy {
                    use_copysort: true,
                    ..SortStrategy::default()
                },
                &Logger::quiet(),
            )
            .unwrap();
            let without = sort_suffixes(
                &enc,
                Some(2),
                SortStrategy {
                    use_copysort: false,
                    ..SortStrategy::default()
                },
                &Logger::quiet(),
            )
            .unwrap();
            assert_eq!(with, without, "text {:?}", text);
            assert_eq!(with, testing::naive_sorted_suffixes(&enc), "text {:?}", text);
        }
    }

    #[test]
    fn multi_part_runs_equal_single_part() {
        let text = "acgtgtcaagcttgcatgca?acgtactgacgtacgtggttaacc|acgtacgtaacctggatc";
        let enc = enc_of(text);
        let single =
            sort_suffixes(&enc, Some(2), SortStrategy::default(), &Logger::quiet()).unwrap();
        for numofparts in [2u32, 3, 5] {
            let mut suffixer = Suffixer::new(
                &enc,
                Some(2),
                numofparts,
                SortStrategy::default(),
                &Logger::quiet(),
            )
            .unwrap();
            let mut sink = VecSink::default();
            suffixer.run(&mut sink).unwrap();
            assert_eq!(sink.suffixes, single, "parts {}", numofparts);
        }
    }

    #[test]
    fn diffcover_assisted_sort_matches() {
        for text in [
            "acgtacgtacgtacgtacgtacgtacgtacgt",
            "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa",
            "acaacaacaacaacaacaacaacaacaacaa?ggttaacc",
        ] {
            let enc = enc_of(text);
            let plain =
                sort_suffixes(&enc, Some(2), SortStrategy::default(), &Logger::quiet()).unwrap();
            for v in [8u32, 16, 32] {
                let assisted = sort_suffixes(
                    &enc,
                    Some(2),
                    SortStrategy {
                        diffcover: Some(v),
                        ..SortStrategy::default()
                    },
                    &Logger::quiet(),
                )
                .unwrap();
                assert_eq!(assisted, plain, "text {:?} v {}", text, v);
            }
        }
    }

    #[test]
    fn counters_observe_work() {
        let enc = enc_of("acgtacgtacgtacgtaacctg");
        let mut suffixer =
            Suffixer::new(&enc, Some(1), 1, SortStrategy::default(), &Logger::quiet()).unwrap();
        let mut sink = VecSink::default();
        suffixer.run(&mut sink).unwrap();
        assert!(suffixer.counters().suffix_comparisons > 0);
    }

    #[test]
    fn one_letter_alphabet_is_misuse() {
        let enc = build_from_symbols(&[0, 0, 0], Alphabet::plain(b"x"), SatChoice::Auto).unwrap();
        assert!(Suffixer::new(&enc, Some(1), 1, SortStrategy::default(), &Logger::quiet()).is_err());
    }
}
