// Copyright 2025-present Harry Tummalacherla
// SPDX-License-Identifier: Apache-2.0

//! Temp-file-backed tables with per-part slice mapping.
//!
//! Memory-bounded multi-part sorting keeps its large per-code tables on
//! disk and maps only the slice a part touches. The mapped slice starts
//! at a page-aligned byte offset below the requested unit, and the
//! handle remembers the bias so callers keep using absolute unit
//! indices. The manager owns the temp file; dropping it unlinks the
//! backing storage.
//!
//! Cells are u64. A [`Transform`] maps code space to unit space: either
//! one unit per code, or one unit per fixed-size code block (for tables
//! that pack many codes per cell).

use std::fs::File;
use std::io::Write;

use mmap_rs::MmapMut;
use tempfile::tempfile_in;

use crate::binary::mmap::map_file_mut;
use crate::error::{Error, Result};

/// Mapping offsets must be page-aligned; 64 KiB is a multiple of every
/// page size in common use.
const SLICE_ALIGN: u64 = 64 * 1024;

/// Code-to-unit transformation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    /// One table unit per code.
    Identity,
    /// One table unit per `divisor` codes (the unit for code c is
    /// `c / divisor`).
    Divisor(u64),
}

impl Transform {
    pub fn apply(self, code: u64) -> usize {
        match self {
            Transform::Identity => code as usize,
            Transform::Divisor(div) => (code / div) as usize,
        }
    }
}

/// A table spilled to an anonymous temp file.
pub struct MappedTable {
    file: File,
    units: usize,
    transform: Transform,
}

impl MappedTable {
    /// Write `cells` to a fresh temp file in `dir` (unlinked on drop).
    pub fn create(dir: &std::path::Path, cells: &[u64], transform: Transform) -> Result<Self> {
        let mut file = tempfile_in(dir)?;
        let mut writer = std::io::BufWriter::new(&mut file);
        for &cell in cells {
            writer.write_all(&cell.to_ne_bytes())?;
        }
        writer.flush()?;
        drop(writer);
        Ok(MappedTable {
            file,
            units: cells.len(),
            transform,
        })
    }

    pub fn units(&self) -> usize {
        self.units
    }

    pub fn transform(&self) -> Transform {
        self.transform
    }

    /// Map the slice covering codes `mincode..=maxcode`. The returned
    /// part is indexed with absolute unit indices.
    pub fn map_code_range(&self, mincode: u64, maxcode: u64) -> Result<MappedPart> {
        let lo_unit = self.transform.apply(mincode);
        let hi_unit = self.transform.apply(maxcode);
        self.map_units(lo_unit, hi_unit)
    }

    /// Map units `lo..=hi`.
    pub fn map_units(&self, lo: usize, hi: usize) -> Result<MappedPart> {
        if lo > hi || hi >= self.units {
            return Err(Error::misuse(format!(
                "table slice [{}, {}] out of range (units {})",
                lo, hi, self.units
            )));
        }
        let lo_byte = (lo as u64 * 8) / SLICE_ALIGN * SLICE_ALIGN;
        let end_byte = (hi as u64 + 1) * 8;
        let map = map_file_mut(&self.file, lo_byte, (end_byte - lo_byte) as usize)?;
        Ok(MappedPart {
            map,
            bias_units: (lo_byte / 8) as usize,
            lo,
            hi,
        })
    }

    /// Read the whole table back (after all parts are done).
    pub fn read_all(&self) -> Result<Vec<u64>> {
        use std::io::{Read, Seek, SeekFrom};
        let mut file = &self.file;
        file.seek(SeekFrom::Start(0))?;
        let mut bytes = Vec::with_capacity(self.units * 8);
        file.take(self.units as u64 * 8).read_to_end(&mut bytes)?;
        if bytes.len() != self.units * 8 {
            return Err(Error::format("mapped table file truncated"));
        }
        Ok(bytes
            .chunks_exact(8)
            .map(|c| u64::from_ne_bytes(c.try_into().unwrap()))
            .collect())
    }
}

/// One page-aligned writable slice, addressed by absolute unit index.
pub struct MappedPart {
    map: MmapMut,
    bias_units: usize,
    lo: usize,
    hi: usize,
}

impl MappedPart {
    #[inline]
    fn byte_offset(&self, unit: usize) -> usize {
        debug_assert!(
            unit >= self.lo && unit <= self.hi,
            "unit {} outside mapped slice [{}, {}]",
            unit,
            self.lo,
            self.hi
        );
        (unit - self.bias_units) * 8
    }

    #[inline]
    pub fn get(&self, unit: usize) -> u64 {
        let off = self.byte_offset(unit);
        u64::from_ne_bytes(self.map.as_slice()[off..off + 8].try_into().unwrap())
    }

    #[inline]
    pub fn set(&mut self, unit: usize, value: u64) {
        let off = self.byte_offset(unit);
        self.map.as_mut_slice()[off..off + 8].copy_from_slice(&value.to_ne_bytes());
    }

    /// Pre-decrement, the bucket-insertion primitive.
    #[inline]
    pub fn decrement(&mut self, unit: usize) -> u64 {
        let value = self.get(unit) - 1;
        self.set(unit, value);
        value
    }

    /// Flush dirty pages back to the backing file.
    pub fn sync(&mut self) -> Result<()> {
        self.map
            .flush(0..self.map.len())
            .map_err(|e| Error::format(format!("cannot flush table slice: {}", e)))
    }
}
