// Copyright 2025-present Harry Tummalacherla
// SPDX-License-Identifier: Apache-2.0

//! The `.prj` manifest: a key=value text file describing an index.
//!
//! The manifest is the compatibility gate: a reader refuses an index
//! whose `integersize` disagrees with its build, whose `littleendian`
//! flag disagrees with the platform, or whose `readmode` is not a known
//! code. Everything else is bookkeeping the reader takes at face value
//! (the binary files carry their own structural validation).

use std::fmt::Write as _;
use std::path::Path;

use crate::error::{Error, Result};
use crate::types::{Readmode, INTEGER_SIZE};

fn platform_littleendian() -> u8 {
    cfg!(target_endian = "little") as u8
}

/// One `dbfile=` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbFile {
    pub name: String,
    pub length: u64,
    pub effective_length: u64,
}

/// The manifest contents.
#[derive(Debug, Clone, Default)]
pub struct Prj {
    pub totallength: u64,
    pub specialcharacters: u64,
    pub specialranges: u64,
    pub realspecialranges: u64,
    pub lengthofspecialprefix: u64,
    pub lengthofspecialsuffix: u64,
    pub numofsequences: u64,
    pub numofdbsequences: u64,
    /// Suffix-array rank of suffix 0 (needed to invert the BWT).
    pub longest: u64,
    pub prefixlength: u64,
    pub largelcpvalues: u64,
    pub maxbranchdepth: u64,
    pub integersize: u64,
    pub littleendian: u64,
    pub readmode: u64,
    pub dbfiles: Vec<DbFile>,
}

impl Prj {
    /// Stamp the build-dependent fields.
    pub fn for_this_build(readmode: Readmode) -> Self {
        Prj {
            integersize: INTEGER_SIZE as u64,
            littleendian: platform_littleendian() as u64,
            readmode: readmode.code() as u64,
            ..Prj::default()
        }
    }

    pub fn to_text(&self) -> String {
        let mut out = String::new();
        let mut put = |key: &str, value: u64| {
            let _ = writeln!(out, "{}={}", key, value);
        };
        put("totallength", self.totallength);
        put("specialcharacters", self.specialcharacters);
        put("specialranges", self.specialranges);
        put("realspecialranges", self.realspecialranges);
        put("lengthofspecialprefix", self.lengthofspecialprefix);
        put("lengthofspecialsuffix", self.lengthofspecialsuffix);
        put("numofsequences", self.numofsequences);
        put("numofdbsequences", self.numofdbsequences);
        put("longest", self.longest);
        put("prefixlength", self.prefixlength);
        put("largelcpvalues", self.largelcpvalues);
        put("maxbranchdepth", self.maxbranchdepth);
        put("integersize", self.integersize);
        put("littleendian", self.littleendian);
        put("readmode", self.readmode);
        for file in &self.dbfiles {
            let _ = writeln!(
                out,
                "dbfile={} {} {}",
                file.name, file.length, file.effective_length
            );
        }
        out
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_text())?;
        Ok(())
    }

    pub fn parse(text: &str) -> Result<Self> {
        let mut prj = Prj::default();
        for (lineno, line) in text.lines().enumerate() {
            if line.is_empty() {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                return Err(Error::format(format!(
                    "manifest line {} has no '='",
                    lineno + 1
                )));
            };
            if key == "dbfile" {
                let mut fields = value.rsplitn(3, ' ');
                let eff = fields.next();
                let len = fields.next();
                let name = fields.next();
                let (Some(name), Some(len), Some(eff)) = (name, len, eff) else {
                    return Err(Error::format(format!(
                        "manifest line {}: malformed dbfile entry",
                        lineno + 1
                    )));
                };
                prj.dbfiles.push(DbFile {
                    name: name.to_string(),
                    length: parse_u64(len, lineno)?,
                    effective_length: parse_u64(eff, lineno)?,
                });
                continue;
            }
            let number = parse_u64(value, lineno)?;
            match key {
                "totallength" => prj.totallength = number,
                "specialcharacters" => prj.specialcharacters = number,
                "specialranges" => prj.specialranges = number,
                "realspecialranges" => prj.realspecialranges = number,
                "lengthofspecialprefix" => prj.lengthofspecialprefix = number,
                "lengthofspecialsuffix" => prj.lengthofspecialsuffix = number,
                "numofsequences" => prj.numofsequences = number,
                "numofdbsequences" => prj.numofdbsequences = number,
                "longest" => prj.longest = number,
                "prefixlength" => prj.prefixlength = number,
                "largelcpvalues" => prj.largelcpvalues = number,
                "maxbranchdepth" => prj.maxbranchdepth = number,
                "integersize" => prj.integersize = number,
                "littleendian" => prj.littleendian = number,
                "readmode" => prj.readmode = number,
                other => {
                    return Err(Error::format(format!(
                        "manifest line {}: unknown key {:?}",
                        lineno + 1,
                        other
                    )))
                }
            }
        }
        Ok(prj)
    }

    pub fn read(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let prj = Prj::parse(&text)?;
        prj.check_compatible()?;
        Ok(prj)
    }

    /// The refusal rules.
    pub fn check_compatible(&self) -> Result<()> {
        if self.integersize != INTEGER_SIZE as u64 {
            return Err(Error::format(format!(
                "index uses {}-bit positions, this build uses {}-bit",
                self.integersize, INTEGER_SIZE
            )));
        }
        if self.littleendian != platform_littleendian() as u64 {
            return Err(Error::format(
                "index byte order does not match this platform",
            ));
        }
        if Readmode::from_code(self.readmode as u8).is_none() {
            return Err(Error::format(format!(
                "index read mode {} is not one of 0..=3",
                self.readmode
            )));
        }
        Ok(())
    }
}

fn parse_u64(text: &str, lineno: usize) -> Result<u64> {
    text.parse()
        .map_err(|_| Error::format(format!("manifest line {}: bad number {:?}", lineno + 1, text)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Prj {
        let mut prj = Prj::for_this_build(Readmode::Forward);
        prj.totallength = 42;
        prj.numofsequences = 2;
        prj.numofdbsequences = 2;
        prj.prefixlength = 3;
        prj.dbfiles.push(DbFile {
            name: "reads one.fna".to_string(),
            length: 50,
            effective_length: 42,
        });
        prj
    }

    #[test]
    fn text_round_trip() {
        let prj = sample();
        let back = Prj::parse(&prj.to_text()).unwrap();
        assert_eq!(back.totallength, 42);
        assert_eq!(back.prefixlength, 3);
        assert_eq!(back.dbfiles, prj.dbfiles);
        back.check_compatible().unwrap();
    }

    #[test]
    fn dbfile_names_may_contain_spaces() {
        let back = Prj::parse("dbfile=two words.fa 10 9\nintegersize=64\n").unwrap();
        assert_eq!(back.dbfiles[0].name, "two words.fa");
        assert_eq!(back.dbfiles[0].length, 10);
        assert_eq!(back.dbfiles[0].effective_length, 9);
    }

    #[test]
    fn refusal_rules() {
        let mut prj = sample();
        prj.integersize = if INTEGER_SIZE == 64 { 32 } else { 64 };
        assert!(prj.check_compatible().is_err());

        let mut prj = sample();
        prj.littleendian ^= 1;
        assert!(prj.check_compatible().is_err());

        let mut prj = sample();
        prj.readmode = 4;
        assert!(prj.check_compatible().is_err());
    }

    #[test]
    fn unknown_keys_are_format_errors() {
        assert!(Prj::parse("nonsense=1\n").is_err());
        assert!(Prj::parse("totallength\n").is_err());
        assert!(Prj::parse("totallength=x\n").is_err());
    }
}
