//! Compact encoded-sequence storage with sorted-suffix and maximal-pair
//! indexing.
//!
//! Three coupled subsystems make up the crate:
//!
//! ```text
//! ┌──────────────┐    ┌───────────────┐    ┌────────────────┐
//! │   encseq     │───▶│     sfx       │───▶│   maxpairs     │
//! │ (6-variant   │    │ (bucket +     │    │ (LCP-interval  │
//! │  symbol      │    │  refinement   │    │  sweep,        │
//! │  store)      │    │  suffix sort) │    │  extension)    │
//! └──────────────┘    └───────────────┘    └────────────────┘
//!        │                   │                     │
//!        ▼                   ▼                     ▼
//! ┌─────────────────────────────────────────────────────────┐
//! │                        binary                           │
//! │   (.esq .prj .suf .lcp .llv .bwt .bck .pbt on disk,     │
//! │    mapped or buffer-loaded)                             │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! - [`encseq`]: packs DNA / protein sequences two bits per symbol (or
//!   byte-compressed for larger alphabets) with side tables for the
//!   wildcard and separator runs; random access, sequential scan, and
//!   word-at-a-time suffix comparison.
//! - [`sfx`]: bucket distribution by k-prefix code, per-bucket
//!   refinement (insertion / blind trie / counting / ternary), the
//!   copy-sort shortcut, memory-bounded multi-part operation and the
//!   [`diffcov`] accelerator.
//! - [`maxpairs`] / [`mmsearch`] / [`xdrop`] / [`greedy`]: maximal
//!   exact pairs from the LCP sweep, query matching over the suffix
//!   array, and the two seed-extension families.
//!
//! # Usage
//!
//! ```ignore
//! use repfind::{binary, encseq, fasta, logger::Logger};
//!
//! let mut source = fasta::FastaSource::open(&paths, &alphabet)?;
//! let enc = encseq::builder::build_encoded_sequence(
//!     &mut source, alphabet, SatChoice::Auto, source.files())?;
//! binary::write_index(&enc, source.descriptions(), &name,
//!                     &binary::WriteOptions::default(), &Logger::quiet())?;
//! ```

pub mod alphabet;
pub mod bcktab;
pub mod binary;
pub mod bitpack;
pub mod cli;
pub mod diffcov;
pub mod encseq;
pub mod error;
pub mod esa;
pub mod fasta;
pub mod greedy;
pub mod logger;
pub mod maprange;
pub mod maxpairs;
pub mod mmsearch;
pub mod parts;
pub mod pckbucket;
pub mod prefixlen;
pub mod querymatch;
pub mod repfind;
pub mod sfx;
pub mod testing;
pub mod types;
pub mod xdrop;

pub use binary::{write_index, Index, IndexName, WriteOptions};
pub use encseq::{EncodedSequence, StorageVariant};
pub use error::{Error, Result};
pub use sfx::{sort_suffixes, SortStrategy, Suffixer};
pub use types::{Code, Pos, Readmode};
