// Copyright 2025-present Harry Tummalacherla
// SPDX-License-Identifier: Apache-2.0

//! Choosing the bucket prefix length k.
//!
//! A larger k means finer buckets but a σ^k-sized table; the chooser
//! picks the largest k whose table stays within a fraction of the input
//! size. The recommended fraction is 0.5 (the table may cost up to half
//! the input), the hard ceiling 4.0.

use crate::bcktab;
use crate::error::{Error, Result};
use crate::types::Pos;

/// Fraction of the input size the table may use by default.
pub const RECOMMENDED_MULTIPLIER: f64 = 0.5;

/// Hard ceiling used for the upper bound reported to the user.
pub const MAX_MULTIPLIER: f64 = 4.0;

fn prefix_length_with_max_space(
    numofchars: u32,
    max_bytes: u64,
    factor: f64,
    maxvalue: Pos,
    with_specials: bool,
) -> u32 {
    let budget = (max_bytes as f64 * factor) as u64;
    let mut prefixlength = 1u32;
    loop {
        let size = bcktab::size_of_table(numofchars, prefixlength, maxvalue, with_specials);
        if size > budget {
            return prefixlength.saturating_sub(1);
        }
        prefixlength += 1;
    }
}

/// The k the builder uses when the caller gives none.
pub fn recommended_prefix_length(
    numofchars: u32,
    totallength: Pos,
    with_specials: bool,
) -> u32 {
    let prefixlength = prefix_length_with_max_space(
        numofchars,
        totallength as u64,
        RECOMMENDED_MULTIPLIER,
        totallength + 1,
        with_specials,
    )
    .max(1);
    prefixlength.min(bcktab::max_base_power(numofchars))
}

/// Largest k acceptable for this input, reported in misuse errors.
pub fn maximal_prefix_length(numofchars: u32, totallength: Pos, with_specials: bool) -> u32 {
    let maxlen = prefix_length_with_max_space(
        numofchars,
        totallength as u64,
        MAX_MULTIPLIER,
        totallength + 1,
        with_specials,
    )
    .max(1);
    maxlen.min(bcktab::max_base_power(numofchars))
}

/// Reject a user-supplied k that exceeds the maximum.
pub fn check_prefix_length(
    numofchars: u32,
    totallength: Pos,
    prefixlength: u32,
    with_specials: bool,
) -> Result<()> {
    let maxlen = maximal_prefix_length(numofchars, totallength, with_specials);
    if prefixlength == 0 || prefixlength > maxlen {
        return Err(Error::misuse(format!(
            "prefix length {} is too large, the maximal prefix length \
             for this input size and alphabet size is {}",
            prefixlength, maxlen
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recommendation_grows_with_input() {
        let small = recommended_prefix_length(4, 100, true);
        let large = recommended_prefix_length(4, 10_000_000, true);
        assert!(small >= 1);
        assert!(large > small);
    }

    #[test]
    fn recommendation_shrinks_with_alphabet() {
        let dna = recommended_prefix_length(4, 1_000_000, true);
        let protein = recommended_prefix_length(20, 1_000_000, true);
        assert!(protein < dna);
        assert!(protein >= 1);
    }

    #[test]
    fn table_fits_the_budget() {
        for total in [100u64, 10_000, 1_000_000] {
            let total = total as Pos;
            let k = recommended_prefix_length(4, total, true);
            let size = bcktab::size_of_table(4, k, total + 1, true);
            assert!(
                size as f64 <= total as f64 * RECOMMENDED_MULTIPLIER || k == 1,
                "k={} size={} total={}",
                k,
                size,
                total
            );
        }
    }

    #[test]
    fn check_rejects_oversized_k() {
        assert!(check_prefix_length(4, 1000, 2, true).is_ok());
        assert!(check_prefix_length(4, 1000, 30, true).is_err());
        assert!(check_prefix_length(4, 1000, 0, true).is_err());
    }
}
