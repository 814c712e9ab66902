// Copyright 2025-present Harry Tummalacherla
// SPDX-License-Identifier: Apache-2.0

//! Splitting the suffix array into code-aligned parts.
//!
//! Memory-bounded sorting inserts and sorts one part at a time. A part
//! is a contiguous range of prefix codes whose buckets together are as
//! close to `total / numofparts` wide as the bucket boundaries allow.
//! Empty parts are removed; a request for more parts than suffixes
//! silently becomes one part.

use crate::bcktab::Bcktab;
use crate::types::{Code, Pos};

#[derive(Debug, Clone, Copy)]
struct Component {
    /// Last code of this part (inclusive); the final part stores the
    /// total code count as a sentinel for "everything up to σ^k - 1".
    nextcode: Code,
    width: Pos,
    suftab_offset: Pos,
}

/// The part table, derived from the bucket table's cumulative ends.
#[derive(Debug, Clone)]
pub struct SuftabParts {
    components: Vec<Component>,
    numofallcodes: Code,
    largest_width: Pos,
    num_suffixes: Pos,
}

impl SuftabParts {
    /// `num_suffixes` is the bucket-covered suffix count (the value the
    /// prefix-sum pass returned). Call between prefix sum and insertion.
    pub fn new(requested_parts: u32, bcktab: &Bcktab, num_suffixes: Pos) -> Self {
        let numofparts = if num_suffixes == 0 {
            0
        } else if num_suffixes < requested_parts as Pos {
            1
        } else {
            requested_parts.max(1)
        };
        let mut components = Vec::with_capacity(numofparts as usize);
        if numofparts > 0 {
            let width_per_part = num_suffixes / numofparts as Pos;
            let mut remainder = num_suffixes % numofparts as Pos;
            let mut target: Pos = 0;
            let mut prev_end: Pos = 0;
            for part in 0..numofparts {
                target += width_per_part;
                if remainder > 0 {
                    target += 1;
                    remainder -= 1;
                }
                let (nextcode, end) = if part == numofparts - 1 {
                    (bcktab.numofallcodes(), num_suffixes)
                } else {
                    let code = bcktab.find_first_larger(target);
                    (code, bcktab.left_border(code))
                };
                components.push(Component {
                    nextcode,
                    width: end - prev_end,
                    suftab_offset: prev_end,
                });
                prev_end = end;
            }
            components.retain(|c| c.width > 0);
            // dropped trailing parts leave their (empty) code range to
            // the surviving last part
            if let Some(last) = components.last_mut() {
                last.nextcode = bcktab.numofallcodes();
            }
        }
        let largest_width = components.iter().map(|c| c.width).max().unwrap_or(0);
        SuftabParts {
            components,
            numofallcodes: bcktab.numofallcodes(),
            largest_width,
            num_suffixes,
        }
    }

    pub fn num_parts(&self) -> u32 {
        self.components.len() as u32
    }

    pub fn largest_width(&self) -> Pos {
        self.largest_width
    }

    pub fn num_suffixes(&self) -> Pos {
        self.num_suffixes
    }

    /// First code of `part`.
    pub fn min_code(&self, part: u32) -> Code {
        if part == 0 {
            0
        } else {
            self.components[part as usize - 1].nextcode + 1
        }
    }

    /// Last code of `part`, inclusive.
    pub fn max_code(&self, part: u32) -> Code {
        let component = &self.components[part as usize];
        if component.nextcode == self.numofallcodes {
            self.numofallcodes - 1
        } else {
            component.nextcode
        }
    }

    /// Absolute suffix-array offset of `part`.
    pub fn suftab_offset(&self, part: u32) -> Pos {
        self.components[part as usize].suftab_offset
    }

    pub fn width(&self, part: u32) -> Pos {
        self.components[part as usize].width
    }

    /// One past the last absolute offset of `part`.
    pub fn end_offset(&self, part: u32) -> Pos {
        self.components[part as usize].suftab_offset + self.components[part as usize].width
    }
}
