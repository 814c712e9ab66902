// Copyright 2025-present Harry Tummalacherla
// SPDX-License-Identifier: Apache-2.0

//! Error kinds for the whole crate.
//!
//! Every public entry point returns `Result<T>`; the error branch carries
//! the kind plus a human-readable message, replacing the status-integer +
//! out-parameter convention of older suffix-index implementations. Callers
//! may assume that a failing callee has already released everything it
//! allocated on the failure path (partial index files are deleted by the
//! writer that created them).

use thiserror::Error;

/// One error type for the index family.
#[derive(Debug, Error)]
pub enum Error {
    /// Open / read / write / map failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Header mismatch, truncated section, or implausible field value.
    #[error("format error: {0}")]
    Format(String),

    /// An allocation was refused.
    #[error("out of memory: {0}")]
    OutOfMemory(String),

    /// A size would exceed what the position type can represent.
    #[error("overflow: {0}")]
    Overflow(String),

    /// The caller supplied an out-of-range parameter. Returned before any
    /// work is done.
    #[error("{0}")]
    Misuse(String),

    /// An internal invariant was violated mid-computation. The CLI maps
    /// this to a distinct exit code.
    #[error("internal invariant violated at {file}:{line}: {msg}")]
    Invariant {
        file: &'static str,
        line: u32,
        msg: String,
    },
}

impl Error {
    pub fn format(msg: impl Into<String>) -> Self {
        Error::Format(msg.into())
    }

    pub fn misuse(msg: impl Into<String>) -> Self {
        Error::Misuse(msg.into())
    }

    pub fn overflow(msg: impl Into<String>) -> Self {
        Error::Overflow(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Build an [`Error::Invariant`] carrying the call site.
#[macro_export]
macro_rules! invariant_error {
    ($($arg:tt)*) => {
        $crate::error::Error::Invariant {
            file: file!(),
            line: line!(),
            msg: format!($($arg)*),
        }
    };
}

/// Reserve capacity, mapping failure to [`Error::OutOfMemory`].
pub fn try_reserve<T>(vec: &mut Vec<T>, additional: usize, what: &str) -> Result<()> {
    vec.try_reserve_exact(additional)
        .map_err(|_| Error::OutOfMemory(format!("cannot allocate {} entries for {}", additional, what)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invariant_macro_records_location() {
        let err = invariant_error!("bucket {} out of range", 7);
        match err {
            Error::Invariant { file, msg, .. } => {
                assert!(file.ends_with("error.rs"));
                assert_eq!(msg, "bucket 7 out of range");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn misuse_message_is_unprefixed() {
        let err = Error::misuse("prefix length 9 is too large");
        assert_eq!(err.to_string(), "prefix length 9 is too large");
    }
}
