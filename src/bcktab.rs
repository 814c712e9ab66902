// Copyright 2025-present Harry Tummalacherla
// SPDX-License-Identifier: Apache-2.0

//! The bucket table: k-prefix code → suffix-array interval.
//!
//! `borders[c]` is a counter during the counting pass, the *inclusive
//! cumulative end* of bucket c after [`Bcktab::prefix_sum`], and — once
//! right-to-left insertion has pre-decremented it back down — the left
//! border of bucket c. A parallel specials counter records, per code,
//! the suffixes whose k-window hits a wildcard or separator and which
//! therefore occupy the tail slots of their (maximally padded) bucket.
//!
//! Borders are u32 while the total fits, u64 otherwise; multi-part
//! sorting can spill them to a temp file and map one code range at a
//! time through the mapped-range manager.

use std::io::{Read, Write};
use std::path::Path;

use crc32fast::Hasher as Crc32Hasher;

use crate::error::{Error, Result};
use crate::maprange::{MappedPart, MappedTable, Transform};
use crate::types::{Code, Pos};

/// Bounds of one bucket, valid once its part is fully inserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BucketSpec {
    /// Absolute suffix-array offset of the bucket's first slot.
    pub left: Pos,
    /// Total slot count (plain suffixes plus padded special suffixes).
    pub width: Pos,
    /// Number of tail slots holding suffixes with a special inside
    /// their k-window.
    pub specials: Pos,
}

/// Totals produced by the prefix-sum pass.
#[derive(Debug, Clone, Copy)]
pub struct PrefixSums {
    /// Widest bucket (determines scratch sizes downstream).
    pub max_bucket_width: Pos,
    /// All counted suffixes, i.e. the number of suffix-array slots the
    /// buckets cover.
    pub num_suffixes: Pos,
    /// Buckets of width ≤ 1, which the sorter skips outright.
    pub leaf_buckets: Code,
}

enum Borders {
    U32(Vec<u32>),
    U64(Vec<u64>),
    /// Spilled to disk; `slice` covers the code range of the part in
    /// flight.
    Mapped {
        table: MappedTable,
        slice: Option<MappedPart>,
    },
}

pub struct Bcktab {
    numofchars: u32,
    prefixlength: u32,
    numofallcodes: Code,
    borders: Borders,
    count_special: Option<Vec<Pos>>,
    /// σ^0 .. σ^k.
    basepowers: Vec<Code>,
}

/// Largest k with σ^k representable without overflow.
pub fn max_base_power(numofchars: u32) -> u32 {
    let mut power: Code = 1;
    let mut k = 0;
    while let Some(next) = power.checked_mul(numofchars as Code) {
        power = next;
        k += 1;
        if k >= 64 {
            break;
        }
    }
    k
}

/// Closed-form byte size of a table, used by the prefix-length chooser.
pub fn size_of_table(numofchars: u32, prefixlength: u32, maxvalue: Pos, with_specials: bool) -> u64 {
    let mut codes: u64 = 1;
    for _ in 0..prefixlength {
        codes = codes.saturating_mul(numofchars as u64);
    }
    let border_bytes = if maxvalue as u64 <= u32::MAX as u64 { 4 } else { 8 };
    let mut size = codes.saturating_add(1).saturating_mul(border_bytes);
    if with_specials {
        size = size.saturating_add(codes.saturating_mul(std::mem::size_of::<Pos>() as u64));
    }
    size
}

impl Bcktab {
    /// Allocate the `σ^k (+1)` counters. `maxvalue` (the total length)
    /// picks the border width.
    pub fn new(
        numofchars: u32,
        prefixlength: u32,
        maxvalue: Pos,
        with_specials: bool,
    ) -> Result<Self> {
        if prefixlength == 0 || prefixlength > max_base_power(numofchars) {
            return Err(Error::misuse(format!(
                "prefix length {} is out of range for a {}-letter alphabet",
                prefixlength, numofchars
            )));
        }
        let mut basepowers = Vec::with_capacity(prefixlength as usize + 1);
        let mut power: Code = 1;
        basepowers.push(power);
        for _ in 0..prefixlength {
            power = power.checked_mul(numofchars as Code).ok_or_else(|| {
                Error::overflow(format!(
                    "{}^{} exceeds the code type",
                    numofchars, prefixlength
                ))
            })?;
            basepowers.push(power);
        }
        let numofallcodes = basepowers[prefixlength as usize];
        let slots = numofallcodes as usize + 1;
        let borders = if maxvalue as u64 <= u32::MAX as u64 {
            let mut v = Vec::new();
            crate::error::try_reserve(&mut v, slots, "bucket borders")?;
            v.resize(slots, 0u32);
            Borders::U32(v)
        } else {
            let mut v = Vec::new();
            crate::error::try_reserve(&mut v, slots, "bucket borders")?;
            v.resize(slots, 0u64);
            Borders::U64(v)
        };
        Ok(Bcktab {
            numofchars,
            prefixlength,
            numofallcodes,
            borders,
            count_special: if with_specials {
                Some(vec![0; numofallcodes as usize])
            } else {
                None
            },
            basepowers,
        })
    }

    pub fn numofchars(&self) -> u32 {
        self.numofchars
    }

    pub fn prefixlength(&self) -> u32 {
        self.prefixlength
    }

    pub fn numofallcodes(&self) -> Code {
        self.numofallcodes
    }

    /// σ^exp for exp ≤ k.
    pub fn basepower(&self, exp: u32) -> Code {
        self.basepowers[exp as usize]
    }

    /// The code of `prefix_index` leading symbols padded with maximal
    /// symbols up to k (where suffixes with an interrupted window go).
    pub fn pad_code_max(&self, partial: Code, prefix_index: u32) -> Code {
        let pad = self.basepowers[(self.prefixlength - prefix_index) as usize];
        partial * pad + (pad - 1)
    }

    /// The same prefix padded with minimal symbols (where end-truncated
    /// suffixes go).
    pub fn pad_code_min(&self, partial: Code, prefix_index: u32) -> Code {
        partial * self.basepowers[(self.prefixlength - prefix_index) as usize]
    }

    #[inline]
    fn border_get(&self, code: Code) -> Pos {
        match &self.borders {
            Borders::U32(v) => v[code as usize] as Pos,
            Borders::U64(v) => v[code as usize] as Pos,
            Borders::Mapped { slice, .. } => {
                slice.as_ref().expect("no part mapped").get(code as usize) as Pos
            }
        }
    }

    /// Counting pass: one more suffix with this code.
    #[inline]
    pub fn add_code(&mut self, code: Code) {
        debug_assert!(code < self.numofallcodes);
        match &mut self.borders {
            Borders::U32(v) => v[code as usize] += 1,
            Borders::U64(v) => v[code as usize] += 1,
            Borders::Mapped { .. } => unreachable!("counting happens before spilling"),
        }
    }

    /// Counting pass: a suffix whose window has `prefix_index` plain
    /// symbols and then a special; it lands in `code`'s tail partition.
    pub fn update_specials(&mut self, code: Code, prefix_index: u32) {
        debug_assert!(prefix_index >= 1 && prefix_index < self.prefixlength);
        if let Some(specials) = &mut self.count_special {
            specials[code as usize] += 1;
        }
    }

    /// Counts → inclusive cumulative ends.
    pub fn prefix_sum(&mut self) -> PrefixSums {
        let mut sums = PrefixSums {
            max_bucket_width: 0,
            num_suffixes: 0,
            leaf_buckets: 0,
        };
        macro_rules! run {
            ($v:expr) => {{
                let mut acc = 0;
                for cell in $v.iter_mut() {
                    let width = *cell;
                    if (width as Pos) > sums.max_bucket_width {
                        sums.max_bucket_width = width as Pos;
                    }
                    if width <= 1 {
                        sums.leaf_buckets += 1;
                    }
                    acc += width;
                    *cell = acc;
                }
                sums.num_suffixes = acc as Pos;
            }};
        }
        match &mut self.borders {
            Borders::U32(v) => {
                let slots = v.len();
                run!(v[..slots - 1]);
                v[slots - 1] = sums.num_suffixes as u32;
            }
            Borders::U64(v) => {
                let slots = v.len();
                run!(v[..slots - 1]);
                v[slots - 1] = sums.num_suffixes as u64;
            }
            Borders::Mapped { .. } => unreachable!("prefix sum happens before spilling"),
        }
        sums
    }

    /// Pre-decrement the border of `code`, yielding the next insertion
    /// slot (buckets fill right to left).
    #[inline]
    pub fn insertion_index(&mut self, code: Code) -> Pos {
        match &mut self.borders {
            Borders::U32(v) => {
                v[code as usize] -= 1;
                v[code as usize] as Pos
            }
            Borders::U64(v) => {
                v[code as usize] -= 1;
                v[code as usize] as Pos
            }
            Borders::Mapped { slice, .. } => {
                slice.as_mut().expect("no part mapped").decrement(code as usize) as Pos
            }
        }
    }

    /// First code whose cumulative end exceeds `offset` (part splitting;
    /// call between prefix_sum and insertion).
    pub fn find_first_larger(&self, offset: Pos) -> Code {
        let mut lo: Code = 0;
        let mut hi: Code = self.numofallcodes;
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            if self.border_get(mid) <= offset {
                lo = mid + 1;
            } else {
                hi = mid;
            }
        }
        lo
    }

    /// Cumulative end of `code` (between prefix_sum and insertion), or
    /// its left border (after insertion).
    pub fn left_border(&self, code: Code) -> Pos {
        self.border_get(code)
    }

    /// Bucket bounds once the part `mincode..=maxcode` is inserted.
    /// `part_end` is the absolute end offset of the part.
    pub fn bounds_in_part(&self, code: Code, maxcode: Code, part_end: Pos) -> BucketSpec {
        let left = self.border_get(code);
        let end = if code < maxcode {
            self.border_get(code + 1)
        } else {
            part_end
        };
        debug_assert!(end >= left);
        BucketSpec {
            left,
            width: end - left,
            specials: self
                .count_special
                .as_ref()
                .map_or(0, |sp| sp[code as usize]),
        }
    }

    /// Specials tail width of one bucket.
    pub fn specials_in_bucket(&self, code: Code) -> Pos {
        self.count_special.as_ref().map_or(0, |sp| sp[code as usize])
    }

    // ------------------------------------------------------------------
    // spilling for multi-part runs
    // ------------------------------------------------------------------

    /// Move the borders to a temp file in `dir`; call after the counting
    /// pass and prefix sum, before the first part.
    pub fn spill_borders(&mut self, dir: &Path) -> Result<()> {
        let cells: Vec<u64> = match &self.borders {
            Borders::U32(v) => v.iter().map(|&x| x as u64).collect(),
            Borders::U64(v) => v.clone(),
            Borders::Mapped { .. } => return Err(Error::misuse("borders already spilled")),
        };
        let table = MappedTable::create(dir, &cells, Transform::Identity)?;
        self.borders = Borders::Mapped { table, slice: None };
        Ok(())
    }

    /// Map the border slice a part needs. Includes `maxcode + 1` so the
    /// part can read its right bounds.
    pub fn map_part(&mut self, mincode: Code, maxcode: Code) -> Result<()> {
        match &mut self.borders {
            Borders::Mapped { table, slice } => {
                *slice = None;
                let hi = (maxcode as usize + 1).min(table.units() - 1);
                *slice = Some(table.map_units(mincode as usize, hi)?);
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// Flush and drop the current part's slice.
    pub fn unmap_part(&mut self) -> Result<()> {
        if let Borders::Mapped { slice, .. } = &mut self.borders {
            if let Some(part) = slice.as_mut() {
                part.sync()?;
            }
            *slice = None;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // the .bck side file
    // ------------------------------------------------------------------

    /// Flush borders and specials counters, with a crc32 footer.
    pub fn write_bck(&self, path: &Path) -> Result<()> {
        let mut payload: Vec<u8> = Vec::new();
        payload.extend_from_slice(&(self.numofchars as u64).to_ne_bytes());
        payload.extend_from_slice(&(self.prefixlength as u64).to_ne_bytes());
        payload.extend_from_slice(&self.numofallcodes.to_ne_bytes());
        let with_specials = self.count_special.is_some() as u64;
        payload.extend_from_slice(&with_specials.to_ne_bytes());
        for code in 0..=self.numofallcodes {
            payload.extend_from_slice(&(self.border_get(code) as u64).to_ne_bytes());
        }
        if let Some(specials) = &self.count_special {
            for &count in specials {
                payload.extend_from_slice(&(count as u64).to_ne_bytes());
            }
        }
        let mut hasher = Crc32Hasher::new();
        hasher.update(&payload);
        let crc = hasher.finalize();
        let mut file = std::fs::File::create(path)?;
        file.write_all(&payload)?;
        file.write_all(&crc.to_ne_bytes())?;
        Ok(())
    }

    /// Reload a flushed table, verifying the checksum.
    pub fn read_bck(path: &Path, maxvalue: Pos) -> Result<Self> {
        let mut bytes = Vec::new();
        std::fs::File::open(path)?.read_to_end(&mut bytes)?;
        if bytes.len() < 4 + 4 * 8 {
            return Err(Error::format("bucket-table file truncated"));
        }
        let (payload, crc_bytes) = bytes.split_at(bytes.len() - 4);
        let mut hasher = Crc32Hasher::new();
        hasher.update(payload);
        if hasher.finalize() != u32::from_ne_bytes(crc_bytes.try_into().unwrap()) {
            return Err(Error::format("bucket-table checksum mismatch"));
        }
        let read_u64 = |idx: usize| -> u64 {
            u64::from_ne_bytes(payload[idx * 8..idx * 8 + 8].try_into().unwrap())
        };
        let numofchars = read_u64(0) as u32;
        let prefixlength = read_u64(1) as u32;
        let numofallcodes = read_u64(2);
        let with_specials = read_u64(3) != 0;
        let expect = 4 + (numofallcodes as usize + 1) + if with_specials {
            numofallcodes as usize
        } else {
            0
        };
        if payload.len() != expect * 8 {
            return Err(Error::format("bucket-table file has the wrong size"));
        }
        let mut tab = Bcktab::new(numofchars, prefixlength, maxvalue, with_specials)?;
        if tab.numofallcodes != numofallcodes {
            return Err(Error::format("bucket-table header is inconsistent"));
        }
        match &mut tab.borders {
            Borders::U32(v) => {
                for (idx, cell) in v.iter_mut().enumerate() {
                    *cell = read_u64(4 + idx) as u32;
                }
            }
            Borders::U64(v) => {
                for (idx, cell) in v.iter_mut().enumerate() {
                    *cell = read_u64(4 + idx);
                }
            }
            Borders::Mapped { .. } => unreachable!(),
        }
        if let Some(specials) = &mut tab.count_special {
            let base = 4 + numofallcodes as usize + 1;
            for (idx, cell) in specials.iter_mut().enumerate() {
                *cell = read_u64(base + idx) as Pos;
            }
        }
        Ok(tab)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counting_and_prefix_sum() {
        let mut tab = Bcktab::new(4, 2, 100, true).unwrap();
        // codes: 5 ×2, 0 ×1, 15 ×3
        tab.add_code(5);
        tab.add_code(5);
        tab.add_code(0);
        for _ in 0..3 {
            tab.add_code(15);
        }
        let sums = tab.prefix_sum();
        assert_eq!(sums.num_suffixes, 6);
        assert_eq!(sums.max_bucket_width, 3);
        assert_eq!(sums.leaf_buckets, 16 - 2); // only codes 5 and 15 exceed width 1
        assert_eq!(tab.left_border(0), 1);
        assert_eq!(tab.left_border(5), 3);
        assert_eq!(tab.left_border(15), 6);
        assert_eq!(tab.left_border(16), 6);
    }

    #[test]
    fn insertion_descends_to_left_border() {
        let mut tab = Bcktab::new(4, 1, 50, false).unwrap();
        tab.add_code(1);
        tab.add_code(1);
        tab.add_code(3);
        tab.prefix_sum();
        assert_eq!(tab.insertion_index(1), 1);
        assert_eq!(tab.insertion_index(1), 0);
        assert_eq!(tab.insertion_index(3), 2);
        // borders now equal left borders
        let spec = tab.bounds_in_part(1, 3, 3);
        assert_eq!(spec.left, 0);
        assert_eq!(spec.width, 2);
    }

    #[test]
    fn find_first_larger_splits_on_cumulative_ends() {
        let mut tab = Bcktab::new(2, 2, 50, false).unwrap();
        tab.add_code(0); // ends: [1, 1, 4, 4]
        tab.add_code(2);
        tab.add_code(2);
        tab.add_code(2);
        tab.prefix_sum();
        assert_eq!(tab.find_first_larger(0), 0);
        assert_eq!(tab.find_first_larger(1), 2);
        assert_eq!(tab.find_first_larger(3), 2);
        assert_eq!(tab.find_first_larger(4), 4);
    }

    #[test]
    fn pad_codes() {
        let tab = Bcktab::new(4, 3, 100, true).unwrap();
        // prefix "c" (code 1) padded to 3 symbols
        assert_eq!(tab.pad_code_max(1, 1), 1 * 16 + 15);
        assert_eq!(tab.pad_code_min(1, 1), 16);
        assert_eq!(tab.pad_code_max(5, 2), 5 * 4 + 3);
        assert_eq!(tab.pad_code_min(5, 2), 20);
    }

    #[test]
    fn spilled_borders_behave_like_memory() {
        let dir = tempfile::tempdir().unwrap();
        let build = |spill: bool| -> Vec<Pos> {
            let mut tab = Bcktab::new(4, 2, 100, false).unwrap();
            for code in [3u64, 3, 3, 9, 9, 12] {
                tab.add_code(code);
            }
            tab.prefix_sum();
            if spill {
                tab.spill_borders(dir.path()).unwrap();
                tab.map_part(0, 15).unwrap();
            }
            let mut slots = Vec::new();
            for code in [3u64, 3, 3, 9, 9, 12] {
                slots.push(tab.insertion_index(code));
            }
            if spill {
                tab.unmap_part().unwrap();
            }
            slots
        };
        assert_eq!(build(false), build(true));
    }

    #[test]
    fn bck_round_trip_and_corruption() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.bck");
        let mut tab = Bcktab::new(4, 2, 100, true).unwrap();
        tab.add_code(7);
        tab.add_code(7);
        tab.update_specials(3, 1);
        tab.prefix_sum();
        tab.write_bck(&path).unwrap();

        let back = Bcktab::read_bck(&path, 100).unwrap();
        assert_eq!(back.numofallcodes(), 16);
        assert_eq!(back.left_border(7), 2);
        assert_eq!(back.specials_in_bucket(3), 1);

        // flip one payload byte: checksum must catch it
        let mut bytes = std::fs::read(&path).unwrap();
        bytes[40] ^= 0xFF;
        std::fs::write(&path, &bytes).unwrap();
        assert!(Bcktab::read_bck(&path, 100).is_err());
    }

    #[test]
    fn zero_prefix_length_is_misuse() {
        assert!(Bcktab::new(4, 0, 10, false).is_err());
        assert!(Bcktab::new(4, 64, 10, false).is_err());
    }
}
