// Copyright 2025-present Harry Tummalacherla
// SPDX-License-Identifier: Apache-2.0

//! Blind-trie sorting for mid-sized buckets.
//!
//! Suffixes are inserted into a compacted trie whose internal nodes
//! store only a depth and one branching symbol per edge. Insertion
//! descends "blindly" (matching edge symbols without verifying skipped
//! stretches), compares the new suffix against one leaf of the reached
//! subtree to learn the true longest common prefix, and then splices a
//! node at that depth. An in-order walk of the finished trie yields the
//! bucket in sorted order.
//!
//! Edge symbols are [`SuffixSym`]s, so end-of-data and the
//! position-ranked specials order themselves like everywhere else.

use crate::encseq::{EncodedSequence, SuffixSym};
use crate::types::Pos;

use super::SortCounters;

const LEAF_DEPTH: Pos = Pos::MAX;

enum Node {
    Leaf {
        suffix: Pos,
    },
    Internal {
        depth: Pos,
        /// Children sorted by edge symbol.
        children: Vec<(SuffixSym, usize)>,
    },
}

impl Node {
    fn depth(&self) -> Pos {
        match self {
            Node::Leaf { .. } => LEAF_DEPTH,
            Node::Internal { depth, .. } => *depth,
        }
    }
}

struct BlindTrie<'a> {
    enc: &'a EncodedSequence,
    nodes: Vec<Node>,
    root: usize,
}

impl<'a> BlindTrie<'a> {
    fn new(enc: &'a EncodedSequence, first_suffix: Pos, capacity: usize) -> Self {
        let mut nodes = Vec::with_capacity(2 * capacity);
        nodes.push(Node::Leaf {
            suffix: first_suffix,
        });
        BlindTrie {
            enc,
            nodes,
            root: 0,
        }
    }

    #[inline]
    fn sym(&self, suffix: Pos, depth: Pos) -> SuffixSym {
        self.enc.suffix_sym(suffix, depth, false)
    }

    /// Follow matching edges to any leaf of the subtree the new suffix
    /// blindly belongs to.
    fn blind_descend(&self, suffix: Pos) -> Pos {
        let mut cur = self.root;
        loop {
            match &self.nodes[cur] {
                Node::Leaf { suffix: leaf } => return *leaf,
                Node::Internal { depth, children } => {
                    let key = self.sym(suffix, *depth);
                    cur = match children.binary_search_by(|(edge, _)| edge.cmp(&key)) {
                        Ok(idx) => children[idx].1,
                        Err(_) => children[0].1,
                    };
                }
            }
        }
    }

    fn new_leaf(&mut self, suffix: Pos) -> usize {
        self.nodes.push(Node::Leaf { suffix });
        self.nodes.len() - 1
    }

    /// A fresh internal node at `depth` with two ordered children.
    fn new_fork(&mut self, depth: Pos, a: (SuffixSym, usize), b: (SuffixSym, usize)) -> usize {
        debug_assert!(a.0 != b.0);
        let children = if a.0 < b.0 { vec![a, b] } else { vec![b, a] };
        self.nodes.push(Node::Internal { depth, children });
        self.nodes.len() - 1
    }

    fn insert(&mut self, suffix: Pos, counters: &mut SortCounters) {
        let witness = self.blind_descend(suffix);
        counters.suffix_comparisons += 1;
        let (_, lcp) = self.enc.compare_suffixes(false, suffix, witness, 0, None);
        let new_key = self.sym(suffix, lcp);
        let old_key = self.sym(witness, lcp);

        if self.nodes[self.root].depth() > lcp {
            let old_root = self.root;
            let leaf = self.new_leaf(suffix);
            self.root = self.new_fork(lcp, (old_key, old_root), (new_key, leaf));
            return;
        }
        let mut cur = self.root;
        loop {
            let cur_depth = self.nodes[cur].depth();
            debug_assert!(cur_depth <= lcp);
            if cur_depth == lcp {
                // the true branch point is this node
                let leaf = self.new_leaf(suffix);
                let Node::Internal { children, .. } = &mut self.nodes[cur] else {
                    unreachable!()
                };
                let slot = children
                    .binary_search_by(|(edge, _)| edge.cmp(&new_key))
                    .expect_err("edge for a diverging symbol already exists");
                let Node::Internal { children, .. } = &mut self.nodes[cur] else {
                    unreachable!()
                };
                children.insert(slot, (new_key, leaf));
                return;
            }
            // descend along the (present by construction) matching edge
            let step_key = self.sym(suffix, cur_depth);
            let Node::Internal { children, .. } = &self.nodes[cur] else {
                unreachable!()
            };
            let edge_idx = children
                .binary_search_by(|(edge, _)| edge.cmp(&step_key))
                .expect("matching edge vanished during re-descend");
            let child = children[edge_idx].1;
            if self.nodes[child].depth() > lcp {
                // splice a fork into this edge
                let leaf = self.new_leaf(suffix);
                let fork = self.new_fork(lcp, (old_key, child), (new_key, leaf));
                let Node::Internal { children, .. } = &mut self.nodes[cur] else {
                    unreachable!()
                };
                children[edge_idx].1 = fork;
                return;
            }
            cur = child;
        }
    }

    /// In-order leaf collection into `out`.
    fn write_sorted(&self, out: &mut [Pos]) {
        let mut next = 0usize;
        let mut stack = vec![self.root];
        while let Some(cur) = stack.pop() {
            match &self.nodes[cur] {
                Node::Leaf { suffix } => {
                    out[next] = *suffix;
                    next += 1;
                }
                Node::Internal { children, .. } => {
                    for &(_, child) in children.iter().rev() {
                        stack.push(child);
                    }
                }
            }
        }
        debug_assert_eq!(next, out.len());
    }
}

/// Sort a bucket of suffixes sharing `_depth` leading symbols.
pub fn sort(enc: &EncodedSequence, slice: &mut [Pos], _depth: Pos, counters: &mut SortCounters) {
    if slice.len() < 2 {
        return;
    }
    let mut trie = BlindTrie::new(enc, slice[0], slice.len());
    for &suffix in slice[1..].iter() {
        trie.insert(suffix, counters);
    }
    trie.write_sorted(slice);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alphabet::Alphabet;
    use crate::encseq::builder::{build_from_symbols, SatChoice};

    fn symbols(text: &str) -> Vec<u8> {
        let alpha = Alphabet::dna();
        text.bytes()
            .map(|ch| match ch {
                b'?' => crate::alphabet::WILDCARD,
                b'|' => crate::alphabet::SEPARATOR,
                ch => alpha.encode(ch).unwrap(),
            })
            .collect()
    }

    fn check(text: &str) {
        let enc = build_from_symbols(&symbols(text), Alphabet::dna(), SatChoice::Auto).unwrap();
        let mut got: Vec<Pos> = (0..enc.len()).collect();
        let mut counters = SortCounters::default();
        sort(&enc, &mut got, 0, &mut counters);
        let mut expect: Vec<Pos> = (0..enc.len()).collect();
        expect.sort_by(|&a, &b| enc.compare_suffixes(false, a, b, 0, None).0);
        assert_eq!(got, expect, "text {:?}", text);
    }

    #[test]
    fn sorts_like_the_direct_comparator() {
        for text in [
            "acgt",
            "aaaaaaaaaaa",
            "ctactacta", // banana-style degenerate repeats
            "acgtacgtacgtacgt",
            "tgca?tgca?tgca",
            "ac|ac|ac",
            "?a?a?a?",
            "gattacagattacagattaca",
        ] {
            check(text);
        }
    }

    #[test]
    fn sorts_a_shuffled_bucket() {
        let enc = build_from_symbols(
            &symbols("acgtacgttacgtgacgttacga"),
            Alphabet::dna(),
            SatChoice::Auto,
        )
        .unwrap();
        // an adversarial insertion order
        let mut got: Vec<Pos> = (0..enc.len()).rev().collect();
        let mut counters = SortCounters::default();
        sort(&enc, &mut got, 0, &mut counters);
        let mut expect: Vec<Pos> = (0..enc.len()).collect();
        expect.sort_by(|&a, &b| enc.compare_suffixes(false, a, b, 0, None).0);
        assert_eq!(got, expect);
    }

    #[test]
    fn single_and_empty_buckets_are_untouched() {
        let enc = build_from_symbols(&symbols("acgt"), Alphabet::dna(), SatChoice::Auto).unwrap();
        let mut counters = SortCounters::default();
        let mut empty: [Pos; 0] = [];
        sort(&enc, &mut empty, 0, &mut counters);
        let mut one = [2 as Pos];
        sort(&enc, &mut one, 0, &mut counters);
        assert_eq!(one, [2]);
    }
}
