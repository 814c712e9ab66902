// Copyright 2025-present Harry Tummalacherla
// SPDX-License-Identifier: Apache-2.0

//! Maximal exact pairs from a sorted-suffix / LCP stream.
//!
//! The sweep keeps a stack of LCP-interval frames, one per pending
//! common-prefix depth, each holding the suffix positions seen below
//! it, bucketed by their left-context symbol. When the LCP drops, the
//! deepest frame merges into its parent; at that moment every pair of
//! one merged and one already-present position shares a prefix of
//! exactly the parent depth, so the pairs of length ≥ L fall out with
//! no re-comparison. Only pairs whose left contexts differ survive —
//! anything else could be extended one position to the left. Position 0
//! and positions preceded by a wildcard or separator have no equal left
//! context and pair with everything, including each other.

use itertools::Itertools;

use crate::alphabet;
use crate::encseq::EncodedSequence;
use crate::error::{Error, Result};
use crate::types::Pos;

/// Called once per maximal pair, smaller position first.
pub type PairSink<'s> = dyn FnMut(Pos, Pos, Pos) -> Result<()> + 's;

struct Frame {
    lcp: Pos,
    /// One bucket per left-context symbol, plus the trailing
    /// pairs-with-everything bucket (begin-of-sequence or special
    /// left neighbour).
    groups: Vec<Vec<Pos>>,
}

impl Frame {
    fn new(lcp: Pos, num_groups: usize) -> Self {
        Frame {
            lcp,
            groups: vec![Vec::new(); num_groups],
        }
    }

    fn absorb(&mut self, other: Frame) {
        for (mine, theirs) in self.groups.iter_mut().zip(other.groups) {
            mine.extend(theirs);
        }
    }
}

/// The sweep state. Feed it `(suffix, lcp_with_previous)` in sorted
/// order and finish with [`MaxPairsSweep::finish`].
pub struct MaxPairsSweep<'a> {
    enc: &'a EncodedSequence,
    min_length: Pos,
    num_groups: usize,
    stack: Vec<Frame>,
    /// The previously pushed suffix: a deeper interval opening with the
    /// current suffix starts at its left neighbour, which then belongs
    /// to the new frame.
    last_suffix: Option<Pos>,
}

impl<'a> MaxPairsSweep<'a> {
    pub fn new(enc: &'a EncodedSequence, min_length: Pos) -> Result<Self> {
        if min_length == 0 {
            return Err(Error::misuse("minimum pair length must be positive"));
        }
        let num_groups = enc.alphabet().num_chars() as usize + 1;
        Ok(MaxPairsSweep {
            enc,
            min_length,
            num_groups,
            stack: vec![Frame::new(0, num_groups)],
            last_suffix: None,
        })
    }

    fn group_of(&self, pos: Pos) -> usize {
        if pos == 0 {
            return self.num_groups - 1;
        }
        let left = self.enc.symbol_at(pos - 1);
        if alphabet::is_special(left) {
            self.num_groups - 1
        } else {
            left as usize
        }
    }

    /// Collapse the stack down to depth `lcp`, merging and emitting.
    fn reduce_to(&mut self, lcp: Pos, sink: &mut PairSink<'_>) -> Result<()> {
        while self.stack.last().map_or(false, |top| top.lcp > lcp) {
            let child = self.stack.pop().expect("sentinel frame missing");
            let below = self.stack.last().map_or(0, |f| f.lcp);
            let depth = below.max(lcp);
            if depth > below {
                self.stack.push(Frame::new(depth, self.num_groups));
            }
            if depth >= self.min_length {
                let top = self.stack.last().expect("sentinel frame missing");
                emit_cross(self.num_groups, top, &child.groups, depth, sink)?;
            }
            self.stack
                .last_mut()
                .expect("sentinel frame missing")
                .absorb(child);
        }
        Ok(())
    }

    /// Feed the next sorted suffix; `lcp` is its common-prefix length
    /// with the previous one (0 for the first).
    pub fn push(&mut self, suffix: Pos, lcp: Pos, sink: &mut PairSink<'_>) -> Result<()> {
        self.reduce_to(lcp, sink)?;
        let top_lcp = self.stack.last().map_or(0, |f| f.lcp);
        if top_lcp < lcp {
            // the interval of depth `lcp` starts at the previous
            // suffix: pull it out of the shallower frame
            let prev = self
                .last_suffix
                .expect("a positive lcp requires a previous suffix");
            let prev_group = self.group_of(prev);
            let top = self.stack.last_mut().expect("sentinel frame missing");
            let moved = top.groups[prev_group].pop();
            debug_assert_eq!(moved, Some(prev));
            let mut frame = Frame::new(lcp, self.num_groups);
            frame.groups[prev_group].push(prev);
            self.stack.push(frame);
        }
        let group = self.group_of(suffix);
        if lcp >= self.min_length {
            let unique = self.num_groups - 1;
            let top = self.stack.last().expect("sentinel frame missing");
            for ga in 0..self.num_groups {
                if ga == group && ga != unique {
                    continue;
                }
                for &a in &top.groups[ga] {
                    let (lo, hi) = if a < suffix { (a, suffix) } else { (suffix, a) };
                    sink(lo, hi, lcp)?;
                }
            }
        }
        self.stack
            .last_mut()
            .expect("sentinel frame missing")
            .groups[group]
            .push(suffix);
        self.last_suffix = Some(suffix);
        Ok(())
    }

    /// Drain the stack after the last suffix.
    pub fn finish(&mut self, sink: &mut PairSink<'_>) -> Result<()> {
        self.reduce_to(0, sink)
    }
}

/// Pairs between an accumulated frame and an incoming group set, all of
/// length `len`. The last group pairs with everything, the others only
/// across.
fn emit_cross(
    num_groups: usize,
    acc: &Frame,
    incoming: &[Vec<Pos>],
    len: Pos,
    sink: &mut PairSink<'_>,
) -> Result<()> {
    let unique = num_groups - 1;
    for (ga, gb) in (0..num_groups).cartesian_product(0..num_groups) {
        if ga == gb && ga != unique {
            continue;
        }
        for &a in &acc.groups[ga] {
            for &b in &incoming[gb] {
                let (lo, hi) = if a < b { (a, b) } else { (b, a) };
                sink(lo, hi, len)?;
            }
        }
    }
    Ok(())
}

/// Sweep a complete in-memory suffix array and LCP table.
pub fn enumerate_maxpairs(
    enc: &EncodedSequence,
    suftab: &[Pos],
    lcptab: &[Pos],
    min_length: Pos,
    sink: &mut PairSink<'_>,
) -> Result<()> {
    debug_assert_eq!(suftab.len(), lcptab.len());
    let mut sweep = MaxPairsSweep::new(enc, min_length)?;
    for (idx, (&suffix, &lcp)) in suftab.iter().zip(lcptab).enumerate() {
        sweep.push(suffix, if idx == 0 { 0 } else { lcp }, sink)?;
    }
    sweep.finish(sink)
}
