// Copyright 2025-present Harry Tummalacherla
// SPDX-License-Identifier: Apache-2.0

//! The crate's only contact with `mmap-rs`.
//!
//! Everything else is `deny(unsafe_code)`; the two map calls live here so
//! the exposure is one screenful. Maps are read-only ([`map_file`]) or
//! read-write over a private temp file ([`map_file_mut`]); both return
//! plain byte views, word access goes through `from_ne_bytes` helpers at
//! the call sites.
#![allow(unsafe_code)]

use std::fs::File;
use std::path::Path;

use mmap_rs::{Mmap, MmapFlags, MmapMut, MmapOptions};

use crate::error::{Error, Result};

fn map_error(context: &str, err: mmap_rs::Error) -> Error {
    Error::format(format!("{}: {}", context, err))
}

/// Memory-map a whole file read-only. Zero-length files get a one-byte
/// map (mapping nothing is an error on most platforms).
pub fn map_file(path: &Path) -> Result<Mmap> {
    let len = path.metadata()?.len() as usize;
    let file = File::open(path)?;
    let mmap = unsafe {
        MmapOptions::new(len.max(1))
            .map_err(|e| map_error("cannot size mapping", e))?
            .with_flags(MmapFlags::empty())
            .with_file(&file, 0)
            .map()
            .map_err(|e| map_error(&format!("cannot map {}", path.display()), e))?
    };
    Ok(mmap)
}

/// Memory-map `len` bytes of a writable file starting at `offset`.
/// `offset` must be page-aligned; the mapped-range manager aligns before
/// calling.
pub fn map_file_mut(file: &File, offset: u64, len: usize) -> Result<MmapMut> {
    let mmap = unsafe {
        MmapOptions::new(len.max(1))
            .map_err(|e| map_error("cannot size mapping", e))?
            .with_flags(MmapFlags::SHARED)
            .with_file(file, offset)
            .map_mut()
            .map_err(|e| map_error("cannot map table slice", e))?
    };
    Ok(mmap)
}
