// Copyright 2025-present Harry Tummalacherla
// SPDX-License-Identifier: Apache-2.0

//! Precomputed short-depth matching bounds (`.pbt`).
//!
//! For every symbol string up to a fixed depth, the suffix-array
//! interval of the suffixes beginning with it. A matcher probing short
//! patterns reads its start interval here instead of binary-searching;
//! anything longer continues from the stored bounds.
//!
//! The table covers the complete σ-ary trie of depths 1..=maxdepth in
//! one flat array: depth q occupies σ^q nodes starting at offset
//! (σ^q − σ) / (σ − 1).

use std::io::Write;
use std::path::Path;

use crate::alphabet;
use crate::binary::outtables::SuftabAccess;
use crate::encseq::EncodedSequence;
use crate::error::{Error, Result};
use crate::types::{Code, Pos};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct NodeBounds {
    lower: u64,
    upper: u64,
}

const EMPTY: NodeBounds = NodeBounds { lower: 0, upper: 0 };

pub struct PckBucketTable {
    sigma: u32,
    maxdepth: u32,
    nodes: Vec<NodeBounds>,
}

fn node_count(sigma: u32, maxdepth: u32) -> usize {
    // σ + σ² + ... + σ^maxdepth
    let mut count = 0usize;
    let mut power = 1usize;
    for _ in 0..maxdepth {
        power *= sigma as usize;
        count += power;
    }
    count
}

fn depth_offset(sigma: u32, depth: u32) -> usize {
    node_count(sigma, depth - 1)
}

impl PckBucketTable {
    /// One pass over the sorted suffixes; O(n · maxdepth).
    pub fn build(
        enc: &EncodedSequence,
        suftab: &impl SuftabAccess,
        maxdepth: u32,
    ) -> Result<Self> {
        if maxdepth == 0 {
            return Err(Error::misuse("matching-bound depth must be positive"));
        }
        let sigma = enc.alphabet().num_chars();
        let mut nodes = vec![EMPTY; node_count(sigma, maxdepth)];
        for rank in 0..suftab.len() {
            let suffix = suftab.get(rank);
            let mut code: Code = 0;
            for depth in 1..=maxdepth {
                let pos = suffix + (depth - 1) as Pos;
                if pos >= enc.len() {
                    break;
                }
                let symbol = enc.symbol_at(pos);
                if alphabet::is_special(symbol) {
                    break;
                }
                code = code * sigma as Code + symbol as Code;
                let node = &mut nodes[depth_offset(sigma, depth) + code as usize];
                if node.lower == node.upper {
                    node.lower = rank as u64;
                }
                node.upper = rank as u64 + 1;
            }
        }
        Ok(PckBucketTable {
            sigma,
            maxdepth,
            nodes,
        })
    }

    pub fn maxdepth(&self) -> u32 {
        self.maxdepth
    }

    /// The suffix-array interval of suffixes starting with `pattern`
    /// (alphabet codes, length ≤ maxdepth). `None` when no suffix
    /// matches.
    pub fn bounds(&self, pattern: &[u8]) -> Option<std::ops::Range<u64>> {
        assert!(!pattern.is_empty() && pattern.len() <= self.maxdepth as usize);
        let mut code: Code = 0;
        for &symbol in pattern {
            debug_assert!(!alphabet::is_special(symbol));
            code = code * self.sigma as Code + symbol as Code;
        }
        let node = self.nodes[depth_offset(self.sigma, pattern.len() as u32) + code as usize];
        if node.lower == node.upper {
            None
        } else {
            Some(node.lower..node.upper)
        }
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        let mut out = std::io::BufWriter::new(std::fs::File::create(path)?);
        out.write_all(&(self.maxdepth as u64).to_ne_bytes())?;
        out.write_all(&(self.sigma as u64).to_ne_bytes())?;
        for node in &self.nodes {
            out.write_all(&node.lower.to_ne_bytes())?;
            out.write_all(&node.upper.to_ne_bytes())?;
        }
        out.flush()?;
        Ok(())
    }

    pub fn read(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        if bytes.len() < 16 || bytes.len() % 16 != 0 {
            return Err(Error::format("matching-bound table has a broken size"));
        }
        let read_u64 =
            |idx: usize| u64::from_ne_bytes(bytes[idx * 8..idx * 8 + 8].try_into().unwrap());
        let maxdepth = read_u64(0) as u32;
        let sigma = read_u64(1) as u32;
        if maxdepth == 0 || sigma < 2 {
            return Err(Error::format("matching-bound table header is implausible"));
        }
        let expected = node_count(sigma, maxdepth);
        if bytes.len() != 16 + expected * 16 {
            return Err(Error::format("matching-bound table is truncated"));
        }
        let nodes = (0..expected)
            .map(|idx| NodeBounds {
                lower: read_u64(2 + 2 * idx),
                upper: read_u64(3 + 2 * idx),
            })
            .collect();
        Ok(PckBucketTable {
            sigma,
            maxdepth,
            nodes,
        })
    }
}
