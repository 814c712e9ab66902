// Copyright 2025-present Harry Tummalacherla
// SPDX-License-Identifier: Apache-2.0

//! The `.esq` on-disk image.
//!
//! One flat byte image, written by the builder and memory-mapped (or
//! buffer-loaded) by the reader. Every section is padded to an 8-byte
//! boundary and all scalars are host-endian u64 — the `.prj` manifest
//! tags the endianness and a reader on the other byte order refuses the
//! index before touching this file.
//!
//! # Format overview
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │ storage variant code                              u64    │
//! │ total length N                                    u64    │
//! │ number of sequences                               u64    │
//! │ number of input files                             u64    │
//! │ byte length of the file-name block                u64    │
//! │ special-char info                               5×u64    │
//! │   (specials, maximal ranges, stored ranges,              │
//! │    special prefix len, special suffix len)               │
//! ├──────────────────────────────────────────────────────────┤
//! │ file names, NUL-terminated, padded to 8                  │
//! │ file lengths (raw, effective)              2×u64 each    │
//! │ character distribution                        σ×u64      │
//! ├──────────────────────────────────────────────────────────┤
//! │ payload, by variant:                                     │
//! │   direct        N bytes, padded                          │
//! │   bytecompress  ⌈N·b/8⌉+2 bytes, padded                  │
//! │   bitaccess     2-bit units ×u64, special bitmap ×u64    │
//! │   *-ranges      2-bit units ×u64, range offsets,         │
//! │                 range lengths−1, per-page counts ×u64    │
//! └──────────────────────────────────────────────────────────┘
//! ```

use std::path::Path;

use mmap_rs::Mmap;

use crate::alphabet::Alphabet;
use crate::bitpack;
use crate::encseq::special::{RangeTables, RangeWidth};
use crate::encseq::{SpecialCharInfo, StorageVariant};
use crate::error::{Error, Result};
use crate::types::Pos;

/// Raw and effective (separator-free symbol) length of one input file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileLength {
    pub raw: u64,
    pub effective: u64,
}

/// Where the image bytes live.
pub enum Backing {
    Owned(Vec<u8>),
    Mapped(Mmap),
}

impl Backing {
    pub fn bytes(&self) -> &[u8] {
        match self {
            Backing::Owned(buf) => buf,
            Backing::Mapped(map) => map.as_slice(),
        }
    }

    /// Map `path` read-only.
    pub fn map(path: &Path) -> Result<Self> {
        Ok(Backing::Mapped(super::mmap::map_file(path)?))
    }

    /// Read `path` into memory (the `--scan` path).
    pub fn read(path: &Path) -> Result<Self> {
        Ok(Backing::Owned(std::fs::read(path)?))
    }
}

/// Extra slack bytes after the bytecompress payload so the two-byte
/// decode window never leaves the section.
pub const BYTECOMPRESS_SLACK: usize = 2;

/// Units allocated for the bitaccess special bitmap: one bit per
/// position plus one unit of slack for the window extractors.
pub fn bitmap_units(total: Pos) -> usize {
    (total as usize) / 64 + 2
}

// ============================================================================
// WRITER
// ============================================================================

/// Payload hand-over from the builder.
pub enum PayloadSpec<'a> {
    Direct(&'a [u8]),
    ByteCompress { data: &'a [u8] },
    BitAccess { twobit: &'a [u64], specialbits: &'a [u64] },
    Ranges { twobit: &'a [u64], tables: &'a RangeTables },
}

/// Everything the writer needs besides the payload.
pub struct EsqWriteSpec<'a> {
    pub sat: StorageVariant,
    pub total_length: Pos,
    pub num_sequences: u64,
    pub file_names: &'a [String],
    pub file_lengths: &'a [FileLength],
    pub special_info: SpecialCharInfo,
    pub char_distribution: &'a [u64],
    pub payload: PayloadSpec<'a>,
}

struct ImageWriter {
    buf: Vec<u8>,
}

impl ImageWriter {
    fn new() -> Self {
        ImageWriter { buf: Vec::new() }
    }

    fn push_u64(&mut self, value: u64) {
        self.buf.extend_from_slice(&value.to_ne_bytes());
    }

    fn push_u64s(&mut self, values: &[u64]) {
        for &value in values {
            self.push_u64(value);
        }
    }

    fn push_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    fn align8(&mut self) {
        while self.buf.len() % 8 != 0 {
            self.buf.push(0);
        }
    }
}

fn push_range_cells(writer: &mut ImageWriter, width: RangeWidth, cells: &[u64]) {
    match width {
        RangeWidth::U8 => {
            for &cell in cells {
                writer.buf.push(cell as u8);
            }
        }
        RangeWidth::U16 => {
            for &cell in cells {
                writer.buf.extend_from_slice(&(cell as u16).to_ne_bytes());
            }
        }
        RangeWidth::U32 => {
            for &cell in cells {
                writer.buf.extend_from_slice(&(cell as u32).to_ne_bytes());
            }
        }
    }
    writer.align8();
}

/// Serialise the complete image.
pub fn write_image(spec: &EsqWriteSpec<'_>) -> Vec<u8> {
    let mut writer = ImageWriter::new();
    let name_block: Vec<u8> = spec
        .file_names
        .iter()
        .flat_map(|name| name.bytes().chain(std::iter::once(0u8)))
        .collect();

    writer.push_u64(spec.sat.code());
    writer.push_u64(spec.total_length as u64);
    writer.push_u64(spec.num_sequences);
    writer.push_u64(spec.file_names.len() as u64);
    writer.push_u64(name_block.len() as u64);
    writer.push_u64(spec.special_info.special_characters);
    writer.push_u64(spec.special_info.special_ranges);
    writer.push_u64(spec.special_info.real_special_ranges);
    writer.push_u64(spec.special_info.length_of_special_prefix);
    writer.push_u64(spec.special_info.length_of_special_suffix);

    writer.push_bytes(&name_block);
    writer.align8();
    for fl in spec.file_lengths {
        writer.push_u64(fl.raw);
        writer.push_u64(fl.effective);
    }
    writer.push_u64s(spec.char_distribution);

    match &spec.payload {
        PayloadSpec::Direct(data) => {
            writer.push_bytes(data);
            writer.align8();
        }
        PayloadSpec::ByteCompress { data } => {
            writer.push_bytes(data);
            writer.push_bytes(&[0u8; BYTECOMPRESS_SLACK]);
            writer.align8();
        }
        PayloadSpec::BitAccess { twobit, specialbits } => {
            writer.push_u64s(twobit);
            writer.push_u64s(specialbits);
        }
        PayloadSpec::Ranges { twobit, tables } => {
            writer.push_u64s(twobit);
            push_range_cells(&mut writer, tables.width(), tables.offsets());
            push_range_cells(&mut writer, tables.width(), tables.lens());
            writer.push_u64s(tables.endsubs());
        }
    }
    writer.buf
}

// ============================================================================
// PARSER
// ============================================================================

/// Parsed image: the small tables materialised, payload as offsets into
/// the backing bytes.
pub struct EsqFields {
    pub sat: StorageVariant,
    pub total_length: Pos,
    pub num_sequences: u64,
    pub file_names: Vec<String>,
    pub file_lengths: Vec<FileLength>,
    pub special_info: SpecialCharInfo,
    pub char_distribution: Vec<u64>,
    /// Materialised side tables for the ranges variants.
    pub ranges: Option<RangeTables>,
    /// Byte offset of the variant payload (symbol bytes, packed bits, or
    /// 2-bit units).
    pub payload_offset: usize,
    /// Byte offset of the bitaccess special bitmap (0 otherwise).
    pub specialbits_offset: usize,
}

struct ImageParser<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> ImageParser<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        ImageParser { bytes, offset: 0 }
    }

    fn read_u64(&mut self) -> Result<u64> {
        let end = self.offset + 8;
        if end > self.bytes.len() {
            return Err(Error::format("encoded-sequence image truncated"));
        }
        let value = u64::from_ne_bytes(self.bytes[self.offset..end].try_into().unwrap());
        self.offset = end;
        Ok(value)
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self
            .offset
            .checked_add(len)
            .ok_or_else(|| Error::format("encoded-sequence image truncated"))?;
        if end > self.bytes.len() {
            return Err(Error::format("encoded-sequence image truncated"));
        }
        let slice = &self.bytes[self.offset..end];
        self.offset = end;
        Ok(slice)
    }

    fn align8(&mut self) {
        self.offset = (self.offset + 7) & !7;
    }

    fn read_range_cells(&mut self, width: RangeWidth, count: usize) -> Result<Vec<u64>> {
        let raw = self.take(count * width.cell_bytes())?;
        let cells = match width {
            RangeWidth::U8 => raw.iter().map(|&b| b as u64).collect(),
            RangeWidth::U16 => raw
                .chunks_exact(2)
                .map(|c| u16::from_ne_bytes(c.try_into().unwrap()) as u64)
                .collect(),
            RangeWidth::U32 => raw
                .chunks_exact(4)
                .map(|c| u32::from_ne_bytes(c.try_into().unwrap()) as u64)
                .collect(),
        };
        self.align8();
        Ok(cells)
    }
}

/// Parse and validate an image. `alphabet` supplies σ for the character
/// distribution; the caller has already read it from `.al1`.
pub fn parse_image(bytes: &[u8], alphabet: &Alphabet) -> Result<EsqFields> {
    let mut parser = ImageParser::new(bytes);
    let sat_code = parser.read_u64()?;
    let sat = StorageVariant::from_code(sat_code)
        .ok_or_else(|| Error::format(format!("unknown storage variant code {}", sat_code)))?;
    let total_u64 = parser.read_u64()?;
    if total_u64 > Pos::MAX as u64 {
        return Err(Error::format(format!(
            "index length {} exceeds the {}-bit position type",
            total_u64,
            crate::types::INTEGER_SIZE
        )));
    }
    let total_length = total_u64 as Pos;
    let num_sequences = parser.read_u64()?;
    let num_files = parser.read_u64()?;
    let name_block_len = parser.read_u64()? as usize;
    let special_info = SpecialCharInfo {
        special_characters: parser.read_u64()?,
        special_ranges: parser.read_u64()?,
        real_special_ranges: parser.read_u64()?,
        length_of_special_prefix: parser.read_u64()?,
        length_of_special_suffix: parser.read_u64()?,
    };
    if special_info.special_characters > total_u64 {
        return Err(Error::format("implausible special-character count"));
    }

    let name_block = parser.take(name_block_len)?;
    parser.align8();
    let mut file_names = Vec::with_capacity(num_files as usize);
    let mut rest = name_block;
    for _ in 0..num_files {
        let nul = rest
            .iter()
            .position(|&b| b == 0)
            .ok_or_else(|| Error::format("file-name block is not NUL-terminated"))?;
        file_names.push(
            std::str::from_utf8(&rest[..nul])
                .map_err(|_| Error::format("file name is not UTF-8"))?
                .to_string(),
        );
        rest = &rest[nul + 1..];
    }

    let mut file_lengths = Vec::with_capacity(num_files as usize);
    for _ in 0..num_files {
        let raw = parser.read_u64()?;
        let effective = parser.read_u64()?;
        file_lengths.push(FileLength { raw, effective });
    }

    let mut char_distribution = Vec::with_capacity(alphabet.num_chars() as usize);
    for _ in 0..alphabet.num_chars() {
        char_distribution.push(parser.read_u64()?);
    }

    let mut ranges = None;
    let payload_offset;
    let mut specialbits_offset = 0usize;
    match sat {
        StorageVariant::Direct => {
            payload_offset = parser.offset;
            parser.take(total_length as usize)?;
            parser.align8();
        }
        StorageVariant::ByteCompress => {
            payload_offset = parser.offset;
            let bits = alphabet.bits_per_symbol() as usize;
            let payload_len = (total_length as usize * bits).div_ceil(8) + BYTECOMPRESS_SLACK;
            parser.take(payload_len)?;
            parser.align8();
        }
        StorageVariant::BitAccess => {
            payload_offset = parser.offset;
            parser.take(bitpack::units_for(total_length) * 8)?;
            specialbits_offset = parser.offset;
            parser.take(bitmap_units(total_length) * 8)?;
        }
        StorageVariant::RangesU8 | StorageVariant::RangesU16 | StorageVariant::RangesU32 => {
            let width = sat.range_width().unwrap();
            payload_offset = parser.offset;
            parser.take(bitpack::units_for(total_length) * 8)?;
            let count = special_info.real_special_ranges as usize;
            let offsets = parser.read_range_cells(width, count)?;
            let lens = parser.read_range_cells(width, count)?;
            let mut endsubs = Vec::with_capacity(width.page_count(total_length));
            for _ in 0..width.page_count(total_length) {
                endsubs.push(parser.read_u64()?);
            }
            let tables = RangeTables::from_raw(width, offsets, lens, endsubs, total_length);
            if tables.total_specials() as u64 != special_info.special_characters {
                return Err(Error::format(
                    "special-range tables disagree with the special-character count",
                ));
            }
            ranges = Some(tables);
        }
    }

    Ok(EsqFields {
        sat,
        total_length,
        num_sequences,
        file_names,
        file_lengths,
        special_info,
        char_distribution,
        ranges,
        payload_offset,
        specialbits_offset,
    })
}

/// Host-endian u64 at `offset` of `bytes`.
#[inline]
pub fn read_u64_at(bytes: &[u8], offset: usize) -> u64 {
    u64::from_ne_bytes(bytes[offset..offset + 8].try_into().unwrap())
}

/// View of the 2-bit payload units inside a backing byte slice.
#[derive(Clone, Copy)]
pub struct UnitsView<'a> {
    bytes: &'a [u8],
}

impl<'a> UnitsView<'a> {
    pub fn new(bytes: &'a [u8], offset: usize, units: usize) -> Self {
        UnitsView {
            bytes: &bytes[offset..offset + units * 8],
        }
    }
}

impl bitpack::UnitSource for UnitsView<'_> {
    #[inline]
    fn unit(&self, idx: usize) -> u64 {
        read_u64_at(self.bytes, idx * 8)
    }
}
