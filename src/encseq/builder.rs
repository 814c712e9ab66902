// Copyright 2025-present Harry Tummalacherla
// SPDX-License-Identifier: Apache-2.0

//! The writer path: two passes over a raw-symbol producer.
//!
//! Pass one counts — total length, per-character frequencies, maximal
//! special runs, separator positions. The variant heuristic then picks
//! the cheapest representation by closed-form size (for the 4-letter
//! alphabet; anything else is stored bytecompressed). Pass two rewinds
//! the producer and fills the chosen payload, and the result is a fully
//! parsed [`EncodedSequence`] over the in-memory image — the same bytes
//! that go to disk as `.esq`, so the writer-in-place path exercises the
//! reader code.

use crate::alphabet::{self, Alphabet};
use crate::binary::esq::{self, Backing, FileLength, PayloadSpec};
use crate::bitpack::{self, TwoBitVec};
use crate::encseq::special::{RangeTables, SpecialRange};
use crate::encseq::{EncodedSequence, SpecialCharInfo, StorageVariant};
use crate::error::{Error, Result};
use crate::types::{Pos, INTEGER_SIZE};

/// Yields one encoded symbol per call: an alphabet code, [`WILDCARD`]
/// (`alphabet::WILDCARD`) or [`SEPARATOR`] (`alphabet::SEPARATOR`).
/// Rewinding restarts the stream for the second pass.
pub trait SymbolSource {
    fn next_symbol(&mut self) -> Result<Option<u8>>;
    fn rewind(&mut self) -> Result<()>;
}

/// A source over an in-memory symbol slice.
pub struct SliceSource<'a> {
    symbols: &'a [u8],
    next: usize,
}

impl<'a> SliceSource<'a> {
    pub fn new(symbols: &'a [u8]) -> Self {
        SliceSource { symbols, next: 0 }
    }
}

impl SymbolSource for SliceSource<'_> {
    fn next_symbol(&mut self) -> Result<Option<u8>> {
        match self.symbols.get(self.next) {
            Some(&symbol) => {
                self.next += 1;
                Ok(Some(symbol))
            }
            None => Ok(None),
        }
    }

    fn rewind(&mut self) -> Result<()> {
        self.next = 0;
        Ok(())
    }
}

/// Storage-variant request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SatChoice {
    /// Pick the smallest representation (DNA only; other alphabets are
    /// always bytecompressed).
    Auto,
    Force(StorageVariant),
}

/// What pass one learnt about the input.
#[derive(Debug, Clone)]
struct FirstPass {
    total_length: Pos,
    char_distribution: Vec<u64>,
    maximal_runs: Vec<SpecialRange>,
    separators: Vec<Pos>,
    special_prefix: u64,
    special_suffix: u64,
}

fn first_pass(source: &mut dyn SymbolSource, alphabet: &Alphabet) -> Result<FirstPass> {
    let sigma = alphabet.num_chars() as usize;
    let mut char_distribution = vec![0u64; sigma];
    let mut maximal_runs: Vec<SpecialRange> = Vec::new();
    let mut separators = Vec::new();
    let mut total = 0u64;
    let mut run_start: Option<u64> = None;
    while let Some(symbol) = source.next_symbol()? {
        if total >= Pos::MAX as u64 {
            return Err(Error::overflow(format!(
                "input exceeds the {}-bit position type",
                INTEGER_SIZE
            )));
        }
        if alphabet::is_special(symbol) {
            if symbol == alphabet::SEPARATOR {
                separators.push(total as Pos);
            }
            if run_start.is_none() {
                run_start = Some(total);
            }
        } else {
            if (symbol as usize) >= sigma {
                return Err(Error::format(format!(
                    "symbol code {} outside the {}-letter alphabet",
                    symbol, sigma
                )));
            }
            char_distribution[symbol as usize] += 1;
            if let Some(start) = run_start.take() {
                maximal_runs.push(SpecialRange {
                    start: start as Pos,
                    end: total as Pos,
                });
            }
        }
        total += 1;
    }
    if let Some(start) = run_start.take() {
        maximal_runs.push(SpecialRange {
            start: start as Pos,
            end: total as Pos,
        });
    }
    if total == 0 {
        return Err(Error::misuse("refusing to encode an empty input"));
    }
    let special_prefix = match maximal_runs.first() {
        Some(run) if run.start == 0 => run.len() as u64,
        _ => 0,
    };
    let special_suffix = match maximal_runs.last() {
        Some(run) if run.end as u64 == total => run.len() as u64,
        _ => 0,
    };
    Ok(FirstPass {
        total_length: total as Pos,
        char_distribution,
        maximal_runs,
        separators,
        special_prefix,
        special_suffix,
    })
}

/// Closed-form byte size of one representation (header fields included,
/// they are identical across variants).
fn variant_size(
    sat: StorageVariant,
    total: Pos,
    stored_ranges: u64,
    num_files: u64,
    name_bytes: u64,
    sigma: u32,
    bits_per_symbol: u32,
) -> u64 {
    let twobit = bitpack::units_for(total) as u64 * 8;
    let payload = match sat {
        StorageVariant::Direct => total as u64,
        StorageVariant::ByteCompress => (total as u64 * bits_per_symbol as u64).div_ceil(8),
        StorageVariant::BitAccess => {
            let mut sum = twobit;
            if stored_ranges > 0 {
                sum += esq::bitmap_units(total) as u64 * 8;
            }
            sum
        }
        StorageVariant::RangesU8 | StorageVariant::RangesU16 | StorageVariant::RangesU32 => {
            let width = sat.range_width().unwrap();
            let mut sum = twobit;
            if stored_ranges > 0 {
                sum += 2 * width.cell_bytes() as u64 * stored_ranges
                    + 8 * width.page_count(total) as u64;
            }
            sum
        }
    };
    payload + 10 * 8 + name_bytes + 16 * num_files + 8 * sigma as u64
}

/// The auto heuristic: smallest of the four 2-bit representations.
fn smallest_dna_variant(
    total: Pos,
    maximal_runs: &[SpecialRange],
    num_files: u64,
    name_bytes: u64,
) -> StorageVariant {
    let mut best = StorageVariant::BitAccess;
    let mut best_size = variant_size(
        best,
        total,
        maximal_runs.len() as u64,
        num_files,
        name_bytes,
        4,
        0,
    );
    for sat in [
        StorageVariant::RangesU8,
        StorageVariant::RangesU16,
        StorageVariant::RangesU32,
    ] {
        let stored = sat.range_width().unwrap().split_count(maximal_runs);
        let size = variant_size(sat, total, stored, num_files, name_bytes, 4, 0);
        if size < best_size {
            best = sat;
            best_size = size;
        }
    }
    best
}

fn choose_variant(
    choice: SatChoice,
    alphabet: &Alphabet,
    pass: &FirstPass,
    num_files: u64,
    name_bytes: u64,
) -> StorageVariant {
    let two_bit_capable = alphabet.num_chars() == 4;
    match choice {
        SatChoice::Auto => {
            if two_bit_capable {
                smallest_dna_variant(pass.total_length, &pass.maximal_runs, num_files, name_bytes)
            } else {
                StorageVariant::ByteCompress
            }
        }
        SatChoice::Force(sat) => match sat {
            StorageVariant::Direct | StorageVariant::ByteCompress => sat,
            _ if !two_bit_capable => StorageVariant::ByteCompress,
            StorageVariant::BitAccess => StorageVariant::BitAccess,
            // a ranges variant without any range degenerates to bitaccess
            _ if pass.maximal_runs.is_empty() => StorageVariant::BitAccess,
            sat => sat,
        },
    }
}

/// Input-file metadata recorded in the image.
#[derive(Debug, Clone)]
pub struct InputFile {
    pub name: String,
    pub lengths: FileLength,
}

/// Two-pass construction. `files` may be empty for ad-hoc stores.
pub fn build_encoded_sequence(
    source: &mut dyn SymbolSource,
    alphabet: Alphabet,
    choice: SatChoice,
    files: &[InputFile],
) -> Result<EncodedSequence> {
    let pass = first_pass(source, &alphabet)?;
    let file_names: Vec<String> = files.iter().map(|f| f.name.clone()).collect();
    let file_lengths: Vec<FileLength> = files.iter().map(|f| f.lengths).collect();
    let name_bytes: u64 = file_names.iter().map(|n| n.len() as u64 + 1).sum();
    let sat = choose_variant(choice, &alphabet, &pass, files.len() as u64, name_bytes);

    source.rewind()?;
    let total = pass.total_length;
    let specials: u64 = pass.maximal_runs.iter().map(|r| r.len() as u64).sum();
    let mut info = SpecialCharInfo {
        special_characters: specials,
        special_ranges: pass.maximal_runs.len() as u64,
        real_special_ranges: pass.maximal_runs.len() as u64,
        length_of_special_prefix: pass.special_prefix,
        length_of_special_suffix: pass.special_suffix,
    };

    // pass two: fill the payload
    let image = match sat {
        StorageVariant::Direct => {
            let mut data = Vec::with_capacity(total as usize);
            while let Some(symbol) = source.next_symbol()? {
                data.push(symbol);
            }
            build_image(&pass, sat, info, &file_names, &file_lengths, PayloadSpec::Direct(&data))
        }
        StorageVariant::ByteCompress => {
            let bits = alphabet.bits_per_symbol() as usize;
            let sigma = alphabet.num_chars() as u8;
            let mut data = vec![0u8; (total as usize * bits).div_ceil(8)];
            let mut bit_off = 0usize;
            while let Some(symbol) = source.next_symbol()? {
                let value = match symbol {
                    alphabet::WILDCARD => sigma,
                    alphabet::SEPARATOR => sigma + 1,
                    code => code,
                };
                let byte = bit_off / 8;
                let shift = bit_off % 8;
                let window = (value as u16) << shift;
                data[byte] |= window as u8;
                if byte + 1 < data.len() {
                    data[byte + 1] |= (window >> 8) as u8;
                }
                bit_off += bits;
            }
            build_image(
                &pass,
                sat,
                info,
                &file_names,
                &file_lengths,
                PayloadSpec::ByteCompress { data: &data },
            )
        }
        StorageVariant::BitAccess => {
            let mut twobit = TwoBitVec::with_len(total);
            let mut specialbits = vec![0u64; esq::bitmap_units(total)];
            let mut pos: Pos = 0;
            while let Some(symbol) = source.next_symbol()? {
                if alphabet::is_special(symbol) {
                    specialbits[pos as usize / 64] |= 1u64 << (pos % 64);
                } else {
                    twobit.set(pos, symbol);
                }
                pos += 1;
            }
            build_image(
                &pass,
                sat,
                info,
                &file_names,
                &file_lengths,
                PayloadSpec::BitAccess {
                    twobit: twobit.words(),
                    specialbits: &specialbits,
                },
            )
        }
        _ => {
            let width = sat.range_width().unwrap();
            let tables = RangeTables::build(width, &pass.maximal_runs, total);
            info.real_special_ranges = tables.num_ranges() as u64;
            let mut twobit = TwoBitVec::with_len(total);
            let mut pos: Pos = 0;
            while let Some(symbol) = source.next_symbol()? {
                if !alphabet::is_special(symbol) {
                    twobit.set(pos, symbol);
                }
                pos += 1;
            }
            build_image(
                &pass,
                sat,
                info,
                &file_names,
                &file_lengths,
                PayloadSpec::Ranges {
                    twobit: twobit.words(),
                    tables: &tables,
                },
            )
        }
    };

    EncodedSequence::from_image(Backing::Owned(image), alphabet, pass.separators)
}

fn build_image(
    pass: &FirstPass,
    sat: StorageVariant,
    info: SpecialCharInfo,
    file_names: &[String],
    file_lengths: &[FileLength],
    payload: PayloadSpec<'_>,
) -> Vec<u8> {
    esq::write_image(&esq::EsqWriteSpec {
        sat,
        total_length: pass.total_length,
        num_sequences: pass.separators.len() as u64 + 1,
        file_names,
        file_lengths,
        special_info: info,
        char_distribution: &pass.char_distribution,
        payload,
    })
}

/// Convenience for tests and the sampled cross-check: build straight
/// from a symbol slice, no file metadata.
pub fn build_from_symbols(
    symbols: &[u8],
    alphabet: Alphabet,
    choice: SatChoice,
) -> Result<EncodedSequence> {
    let mut source = SliceSource::new(symbols);
    build_encoded_sequence(&mut source, alphabet, choice, &[])
}
