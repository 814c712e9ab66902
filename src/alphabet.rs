// Copyright 2025-present Harry Tummalacherla
// SPDX-License-Identifier: Apache-2.0

//! Alphabets and the two out-of-alphabet markers.
//!
//! Symbols are 8-bit values. Codes `0..numofchars` are alphabet symbols;
//! [`WILDCARD`] stands for any-base markers (N, X, ...) and [`SEPARATOR`]
//! delimits the member sequences of a multi-sequence store. Everything at
//! or above [`WILDCARD`] is "special" and does not fit the 2-bit encoding.
//!
//! An [`Alphabet`] maps printable characters to codes and back. Multiple
//! printable characters may share one code (`a` and `A`, or `t` and `u`),
//! the first listed one is used when decoding. The text form stored in
//! `.al1` files has one line per code listing its characters, plus a final
//! line starting with `*` listing the wildcard characters.

use crate::error::{Error, Result};

/// Any-base marker. Compares greater than every alphabet symbol.
pub const WILDCARD: u8 = 254;

/// Separator between member sequences. Compares greater than every
/// alphabet symbol; two separators are distinguished by position.
pub const SEPARATOR: u8 = 255;

/// Marker written to the BWT channel for rank-0 suffixes.
pub const UNDEF: u8 = 253;

/// True for wildcard and separator codes.
#[inline]
pub fn is_special(symbol: u8) -> bool {
    symbol >= WILDCARD
}

/// A fixed symbol-to-code mapping.
#[derive(Debug, Clone)]
pub struct Alphabet {
    /// Printable characters per code; `chars[c][0]` decodes code c.
    chars: Vec<Vec<u8>>,
    /// Printable wildcard characters; the first one decodes [`WILDCARD`].
    wildcards: Vec<u8>,
    /// 256-entry map from input byte to code, `None` for invalid bytes.
    map: [Option<u8>; 256],
    dna: bool,
}

impl Alphabet {
    /// The nucleotide alphabet `aA cC gG tTuU` with wildcards
    /// `nsywrkvbdhmNSYWRKVBDHM`.
    pub fn dna() -> Self {
        let mut alpha = Alphabet::new(
            &[b"aA".as_slice(), b"cC", b"gG", b"tTuU"],
            b"nsywrkvbdhmNSYWRKVBDHM",
        );
        alpha.dna = true;
        alpha
    }

    /// The 20-letter protein alphabet with wildcards `XUBZxubz*`.
    pub fn protein() -> Self {
        let mut groups: Vec<Vec<u8>> = Vec::with_capacity(20);
        for aa in b"LVIFKREDAGSTNQYWPHMC" {
            groups.push(vec![*aa, aa.to_ascii_lowercase()]);
        }
        let refs: Vec<&[u8]> = groups.iter().map(|g| g.as_slice()).collect();
        Alphabet::new(&refs, b"XUBZxubz*")
    }

    /// An alphabet with one code per given character and no extra
    /// wildcard characters. Used for non-biological inputs.
    pub fn plain(characters: &[u8]) -> Self {
        let groups: Vec<Vec<u8>> = characters.iter().map(|c| vec![*c]).collect();
        let refs: Vec<&[u8]> = groups.iter().map(|g| g.as_slice()).collect();
        Alphabet::new(&refs, b"")
    }

    fn new(groups: &[&[u8]], wildcards: &[u8]) -> Self {
        assert!(groups.len() < WILDCARD as usize);
        let mut map = [None; 256];
        let mut chars = Vec::with_capacity(groups.len());
        for (code, group) in groups.iter().enumerate() {
            for &ch in *group {
                map[ch as usize] = Some(code as u8);
            }
            chars.push(group.to_vec());
        }
        for &ch in wildcards {
            map[ch as usize] = Some(WILDCARD);
        }
        Alphabet {
            chars,
            wildcards: wildcards.to_vec(),
            map,
            dna: false,
        }
    }

    /// Number of alphabet symbols σ (excluding the special markers).
    pub fn num_chars(&self) -> u32 {
        self.chars.len() as u32
    }

    /// Bits per symbol when every symbol (plus the two markers) must be
    /// representable: ⌈log₂(σ+2)⌉.
    pub fn bits_per_symbol(&self) -> u32 {
        let values = self.num_chars() + 2;
        u32::BITS - (values - 1).leading_zeros()
    }

    /// True for the DNA alphabet, on which complementing is defined.
    pub fn is_dna(&self) -> bool {
        self.dna
    }

    /// Map an input character to a code, [`WILDCARD`], or `None` for a
    /// character the alphabet does not know.
    #[inline]
    pub fn encode(&self, ch: u8) -> Option<u8> {
        self.map[ch as usize]
    }

    /// Printable representation of a symbol (wildcards and separators
    /// included).
    pub fn decode(&self, symbol: u8) -> u8 {
        match symbol {
            SEPARATOR => b'|',
            WILDCARD => *self.wildcards.first().unwrap_or(&b'?'),
            code => self.chars[code as usize][0],
        }
    }

    /// Watson-Crick complement of an alphabet code; identity on specials.
    /// Only meaningful for DNA (a↔t, c↔g).
    #[inline]
    pub fn complement(&self, symbol: u8) -> u8 {
        debug_assert!(self.dna);
        if is_special(symbol) {
            symbol
        } else {
            3 - symbol
        }
    }

    /// Serialise to the `.al1` text format.
    pub fn to_al1(&self) -> String {
        let mut out = String::new();
        for group in &self.chars {
            out.push_str(std::str::from_utf8(group).unwrap_or("?"));
            out.push('\n');
        }
        if !self.wildcards.is_empty() {
            out.push('*');
            out.push_str(std::str::from_utf8(&self.wildcards).unwrap_or(""));
            out.push('\n');
        }
        out
    }

    /// Parse the `.al1` text format.
    pub fn from_al1(text: &str) -> Result<Self> {
        let mut groups: Vec<Vec<u8>> = Vec::new();
        let mut wildcards: Vec<u8> = Vec::new();
        for line in text.lines() {
            if line.is_empty() {
                continue;
            }
            if let Some(rest) = line.strip_prefix('*') {
                wildcards = rest.as_bytes().to_vec();
            } else {
                groups.push(line.as_bytes().to_vec());
            }
        }
        if groups.is_empty() {
            return Err(Error::format("alphabet file defines no symbols"));
        }
        if groups.len() >= WILDCARD as usize {
            return Err(Error::format(format!(
                "alphabet file defines {} symbols, more than the maximum {}",
                groups.len(),
                WILDCARD - 1
            )));
        }
        let refs: Vec<&[u8]> = groups.iter().map(|g| g.as_slice()).collect();
        let mut alpha = Alphabet::new(&refs, &wildcards);
        // A 4-symbol alphabet whose first groups are a/c/g/t is DNA.
        alpha.dna = alpha.num_chars() == 4
            && alpha.encode(b'a') == Some(0)
            && alpha.encode(b'c') == Some(1)
            && alpha.encode(b'g') == Some(2)
            && alpha.encode(b't') == Some(3);
        Ok(alpha)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dna_mapping() {
        let alpha = Alphabet::dna();
        assert_eq!(alpha.num_chars(), 4);
        assert!(alpha.is_dna());
        assert_eq!(alpha.encode(b'A'), Some(0));
        assert_eq!(alpha.encode(b'c'), Some(1));
        assert_eq!(alpha.encode(b'G'), Some(2));
        assert_eq!(alpha.encode(b'u'), Some(3));
        assert_eq!(alpha.encode(b'N'), Some(WILDCARD));
        assert_eq!(alpha.encode(b'@'), None);
        assert_eq!(alpha.decode(2), b'g');
    }

    #[test]
    fn dna_complement() {
        let alpha = Alphabet::dna();
        assert_eq!(alpha.complement(0), 3);
        assert_eq!(alpha.complement(3), 0);
        assert_eq!(alpha.complement(1), 2);
        assert_eq!(alpha.complement(WILDCARD), WILDCARD);
        assert_eq!(alpha.complement(SEPARATOR), SEPARATOR);
    }

    #[test]
    fn bits_per_symbol_covers_markers() {
        assert_eq!(Alphabet::dna().bits_per_symbol(), 3); // 4 + 2 values
        assert_eq!(Alphabet::protein().bits_per_symbol(), 5); // 20 + 2
        assert_eq!(Alphabet::plain(b"01").bits_per_symbol(), 2);
    }

    #[test]
    fn al1_round_trip() {
        let alpha = Alphabet::dna();
        let text = alpha.to_al1();
        let back = Alphabet::from_al1(&text).unwrap();
        assert_eq!(back.num_chars(), 4);
        assert!(back.is_dna());
        assert_eq!(back.encode(b'T'), Some(3));
        assert_eq!(back.encode(b'n'), Some(WILDCARD));
    }

    #[test]
    fn plain_alphabet_is_not_dna() {
        let alpha = Alphabet::plain(b"ABCDEFGHIJKLMNOPQRSTUVWXYZ");
        assert_eq!(alpha.num_chars(), 26);
        assert!(!alpha.is_dna());
        assert_eq!(alpha.encode(b'J'), Some(9));
        assert_eq!(alpha.encode(b'j'), None);
    }

    #[test]
    fn empty_al1_is_rejected() {
        assert!(Alphabet::from_al1("").is_err());
    }
}
