// Copyright 2025-present Harry Tummalacherla
// SPDX-License-Identifier: Apache-2.0

//! A minimal multi-FASTA symbol producer for the writer path.
//!
//! Parses one or more FASTA files into the encoded concatenation —
//! records separated by [`SEPARATOR`] (also across file boundaries) —
//! and keeps the record descriptions and per-file length bookkeeping
//! the index writer wants. Unknown residue characters are format
//! errors; whitespace inside sequence lines is ignored.

use std::path::Path;

use crate::alphabet::{Alphabet, SEPARATOR};
use crate::binary::esq::FileLength;
use crate::encseq::builder::{InputFile, SymbolSource};
use crate::error::{Error, Result};

/// The parsed input: encoded symbols plus metadata. Implements
/// [`SymbolSource`], rewindable for the builder's two passes.
pub struct FastaSource {
    symbols: Vec<u8>,
    descriptions: Vec<String>,
    files: Vec<InputFile>,
    next: usize,
}

impl FastaSource {
    pub fn open(paths: &[impl AsRef<Path>], alphabet: &Alphabet) -> Result<Self> {
        let mut source = FastaSource {
            symbols: Vec::new(),
            descriptions: Vec::new(),
            files: Vec::new(),
            next: 0,
        };
        for path in paths {
            let path = path.as_ref();
            let raw = std::fs::read(path)?;
            let effective_before = source.effective_len();
            source.parse_file(path, &raw, alphabet)?;
            source.files.push(InputFile {
                name: path.display().to_string(),
                lengths: FileLength {
                    raw: raw.len() as u64,
                    effective: (source.effective_len() - effective_before) as u64,
                },
            });
        }
        if source.symbols.is_empty() {
            return Err(Error::format("no sequence data in the input files"));
        }
        Ok(source)
    }

    /// Symbols excluding separators.
    fn effective_len(&self) -> usize {
        self.symbols
            .iter()
            .filter(|&&symbol| symbol != SEPARATOR)
            .count()
    }

    fn parse_file(&mut self, path: &Path, raw: &[u8], alphabet: &Alphabet) -> Result<()> {
        let mut in_record = false;
        for (lineno, line) in raw.split(|&byte| byte == b'\n').enumerate() {
            let line = line.strip_suffix(b"\r").unwrap_or(line);
            if line.is_empty() {
                continue;
            }
            if line[0] == b'>' {
                if in_record || !self.symbols.is_empty() {
                    self.symbols.push(SEPARATOR);
                }
                in_record = true;
                let description = String::from_utf8_lossy(&line[1..]).trim().to_string();
                self.descriptions.push(description);
                continue;
            }
            if !in_record {
                return Err(Error::format(format!(
                    "{}:{}: sequence data before the first header",
                    path.display(),
                    lineno + 1
                )));
            }
            for &ch in line {
                if ch.is_ascii_whitespace() {
                    continue;
                }
                match alphabet.encode(ch) {
                    Some(symbol) => self.symbols.push(symbol),
                    None => {
                        return Err(Error::format(format!(
                            "{}:{}: character {:?} is not in the alphabet",
                            path.display(),
                            lineno + 1,
                            ch as char
                        )))
                    }
                }
            }
        }
        Ok(())
    }

    pub fn descriptions(&self) -> &[String] {
        &self.descriptions
    }

    pub fn files(&self) -> &[InputFile] {
        &self.files
    }

    pub fn symbols(&self) -> &[u8] {
        &self.symbols
    }
}

impl SymbolSource for FastaSource {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alphabet::WILDCARD;

    fn write_file(dir: &Path, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn parses_records_and_descriptions() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            dir.path(),
            "reads.fna",
            ">read one\nACGT\nACGn\n>read two\nTT GG\n",
        );
        let source = FastaSource::open(&[&path], &Alphabet::dna()).unwrap();
        assert_eq!(source.descriptions(), &["read one", "read two"]);
        assert_eq!(
            source.symbols(),
            &[0, 1, 2, 3, 0, 1, 2, WILDCARD, SEPARATOR, 3, 3, 2, 2]
        );
        assert_eq!(source.files().len(), 1);
        assert_eq!(source.files()[0].lengths.effective, 12);
    }

    #[test]
    fn separators_span_file_boundaries() {
        let dir = tempfile::tempdir().unwrap();
        let one = write_file(dir.path(), "a.fna", ">a\nAC\n");
        let two = write_file(dir.path(), "b.fna", ">b\nGT\n");
        let source = FastaSource::open(&[&one, &two], &Alphabet::dna()).unwrap();
        assert_eq!(source.symbols(), &[0, 1, SEPARATOR, 2, 3]);
        assert_eq!(source.files().len(), 2);
    }

    #[test]
    fn rejects_foreign_characters_and_headerless_data() {
        let dir = tempfile::tempdir().unwrap();
        let bad = write_file(dir.path(), "bad.fna", ">x\nAC!T\n");
        assert!(FastaSource::open(&[&bad], &Alphabet::dna()).is_err());
        let headerless = write_file(dir.path(), "headerless.fna", "ACGT\n");
        assert!(FastaSource::open(&[&headerless], &Alphabet::dna()).is_err());
    }

    #[test]
    fn rewind_restarts_the_stream() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "r.fna", ">x\nAC\n");
        let mut source = FastaSource::open(&[&path], &Alphabet::dna()).unwrap();
        assert_eq!(source.next_symbol().unwrap(), Some(0));
        assert_eq!(source.next_symbol().unwrap(), Some(1));
        assert_eq!(source.next_symbol().unwrap(), None);
        source.rewind().unwrap();
        assert_eq!(source.next_symbol().unwrap(), Some(0));
    }
}
