// Copyright 2025-present Harry Tummalacherla
// SPDX-License-Identifier: Apache-2.0

//! Core scalar types shared by every module.
//!
//! The position type [`Pos`] is fixed at build time: 64-bit by default,
//! 32-bit under the `pos32` feature. The width is recorded in the `.prj`
//! manifest as `integersize`, and the reader refuses an index written with
//! the other width — mixing them would silently truncate positions.

/// A position in (or length of) the concatenated multi-sequence.
#[cfg(not(feature = "pos32"))]
pub type Pos = u64;

/// A position in (or length of) the concatenated multi-sequence.
#[cfg(feature = "pos32")]
pub type Pos = u32;

/// Bit width of [`Pos`], as recorded in the `.prj` manifest.
pub const INTEGER_SIZE: u32 = (std::mem::size_of::<Pos>() * 8) as u32;

/// A k-mer prefix code in `[0, numofchars^k)`.
pub type Code = u64;

/// Reading direction applied on top of the stored forward sequence.
///
/// Complement and reverse-complement are only defined for DNA alphabets;
/// on special symbols the complement is the identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Readmode {
    #[default]
    Forward,
    Reverse,
    Complement,
    ReverseComplement,
}

impl Readmode {
    /// Wire code used in the `.prj` manifest (0-3).
    pub fn code(self) -> u8 {
        match self {
            Readmode::Forward => 0,
            Readmode::Reverse => 1,
            Readmode::Complement => 2,
            Readmode::ReverseComplement => 3,
        }
    }

    /// Inverse of [`Readmode::code`]; `None` for out-of-range values.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Readmode::Forward),
            1 => Some(Readmode::Reverse),
            2 => Some(Readmode::Complement),
            3 => Some(Readmode::ReverseComplement),
            _ => None,
        }
    }

    /// True for the two direction-reversing modes.
    pub fn is_reverse(self) -> bool {
        matches!(self, Readmode::Reverse | Readmode::ReverseComplement)
    }

    /// True for the two base-complementing modes.
    pub fn is_complement(self) -> bool {
        matches!(self, Readmode::Complement | Readmode::ReverseComplement)
    }
}
