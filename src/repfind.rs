// Copyright 2025-present Harry Tummalacherla
// SPDX-License-Identifier: Apache-2.0

//! The maximal-repeat reporter: wiring from the sorted-suffix stream to
//! the match output.
//!
//! Self matches come out of the LCP-interval sweep; each seed pair is
//! either reported as-is, filtered down to suffix-prefix overlaps, or
//! extended to both sides by the x-drop or trimmed-greedy extender and
//! then filtered by error rate. Query matches come out of the maximal-
//! match searcher over the suffix array; reverse matches are query
//! matches of the reversed member sequences, mapped back. The sampled
//! cross-check draws random substring pairs and verifies that the
//! query path and the self path over their concatenation agree.

use std::cmp::Ordering;
use std::io::Write;
use std::path::PathBuf;

use rand::Rng;

use crate::alphabet::{self, SEPARATOR};
use crate::binary::outtables::SuftabStore;
use crate::binary::{Index, IndexName};
use crate::encseq::builder::{build_from_symbols, SatChoice};
use crate::encseq::EncodedSequence;
use crate::error::{Error, Result};
use crate::esa::EsaReader;
use crate::fasta::FastaSource;
use crate::greedy::{front_prune_extend, greedy_unit_distance, GreedyParams, PolishedPoint};
use crate::invariant_error;
use crate::log;
use crate::logger::Logger;
use crate::maxpairs::MaxPairsSweep;
use crate::mmsearch::MmSearcher;
use crate::querymatch::{MatchReporter, QueryMatch};
use crate::sfx::{sort_suffixes, SortStrategy};
use crate::types::{Pos, Readmode};
use crate::xdrop::{evaluate_xdrop, XdropBest, XdropScores, XDROP_BELOW_DEFAULT};

/// Seed-extension selection (`--extendxdrop` / `--extendgreedy`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExtendMode {
    #[default]
    None,
    Xdrop,
    Greedy,
}

/// Everything the `match` subcommand configures.
#[derive(Debug, Clone)]
pub struct MatchOptions {
    pub leastlength: Option<u32>,
    pub seedlength: Option<u32>,
    pub forward: bool,
    pub reverse: bool,
    pub spm: bool,
    pub extend: ExtendMode,
    pub errorpercentage: u64,
    pub maxalilendiff: u64,
    pub samples: u64,
    pub scan: bool,
    pub queries: Vec<PathBuf>,
}

impl Default for MatchOptions {
    fn default() -> Self {
        MatchOptions {
            leastlength: None,
            seedlength: None,
            forward: true,
            reverse: false,
            spm: false,
            extend: ExtendMode::None,
            errorpercentage: 10,
            maxalilendiff: 30,
            samples: 0,
            scan: false,
            queries: Vec::new(),
        }
    }
}

/// Fill the `-l` / `--seedlength` gaps: both default to 20, one given
/// sets the other, and the seed never exceeds the least length.
pub fn resolve_lengths(opts: &MatchOptions) -> (Pos, Pos) {
    let (least, seed) = match (opts.leastlength, opts.seedlength) {
        (None, None) => (20, 20),
        (None, Some(seed)) => (seed, seed),
        (Some(least), None) => (least, least),
        (Some(least), Some(seed)) => (least, seed.min(least)),
    };
    (least as Pos, seed as Pos)
}

fn error_rate(distance: Pos, alignedlen: Pos) -> f64 {
    200.0 * distance as f64 / alignedlen as f64
}

fn distance_to_score(distance: Pos, alignedlen: Pos) -> i64 {
    alignedlen as i64 - 3 * distance as i64
}

fn score_to_distance(score: i64, alignedlen: Pos) -> Pos {
    if score >= 0 {
        debug_assert!(alignedlen as i64 >= score);
        ((alignedlen as i64 - score) / 3) as Pos
    } else {
        (-((alignedlen as i64 + score) / 3)) as Pos
    }
}

/// db/query sequence frame of one self-match seed (`pos1 <= pos2`).
struct SeedFrame {
    db_seq_start: Pos,
    db_seq_end: Pos,
    query_seqnum: u64,
    query_seq_start: Pos,
    query_seq_end: Pos,
}

fn seed_frame(enc: &EncodedSequence, pos1: Pos, pos2: Pos) -> SeedFrame {
    let db_seqnum = enc.seqnum_of(pos1);
    let db_seq_start = enc.seq_start(db_seqnum);
    let db_seq_end = db_seq_start + enc.seq_length(db_seqnum);
    if pos2 < db_seq_end {
        SeedFrame {
            db_seq_start,
            db_seq_end,
            query_seqnum: db_seqnum,
            query_seq_start: db_seq_start,
            query_seq_end: db_seq_end,
        }
    } else {
        let query_seqnum = enc.seqnum_of(pos2);
        let query_seq_start = enc.seq_start(query_seqnum);
        SeedFrame {
            db_seq_start,
            db_seq_end,
            query_seqnum,
            query_seq_start,
            query_seq_end: query_seq_start + enc.seq_length(query_seqnum),
        }
    }
}

fn extract(enc: &EncodedSequence, from: Pos, to_exclusive: Pos, buf: &mut Vec<u8>) -> Result<()> {
    debug_assert!(from <= to_exclusive);
    if from == to_exclusive {
        buf.clear();
        return Ok(());
    }
    enc.extract_substring(buf, from, to_exclusive - 1)
}

// ============================================================================
// SELF-MATCH SEED PROCESSORS
// ============================================================================

/// X-drop extension of one self-match seed.
struct XdropSelf<'a, 'w> {
    enc: &'a EncodedSequence,
    reporter: MatchReporter<'w>,
    scores: XdropScores,
    below: i64,
    errorpercentage: u64,
    leastlength: Pos,
    ubuf: Vec<u8>,
    vbuf: Vec<u8>,
}

impl XdropSelf<'_, '_> {
    fn process(&mut self, pos1: Pos, pos2: Pos, len: Pos) -> Result<()> {
        let (pos1, pos2) = if pos1 <= pos2 { (pos1, pos2) } else { (pos2, pos1) };
        if pos1 + len >= pos2 {
            return Ok(()); // overlapping seeds
        }
        let frame = seed_frame(self.enc, pos1, pos2);
        let best_left = if pos1 > frame.db_seq_start && pos2 > frame.query_seq_start {
            extract(self.enc, frame.db_seq_start, pos1, &mut self.ubuf)?;
            let vstart = (pos1 + len).max(frame.query_seq_start);
            extract(self.enc, vstart, pos2, &mut self.vbuf)?;
            evaluate_xdrop(&self.ubuf, &self.vbuf, false, &self.scores, self.below)
        } else {
            XdropBest::default()
        };
        // the right extension may not run into the left copy of the seed
        let useq_end = frame.db_seq_end.min(pos2 - best_left.jvalue);
        let best_right = if pos1 + len < useq_end && pos2 + len < frame.query_seq_end {
            extract(self.enc, pos1 + len, useq_end, &mut self.ubuf)?;
            extract(self.enc, pos2 + len, frame.query_seq_end, &mut self.vbuf)?;
            evaluate_xdrop(&self.ubuf, &self.vbuf, true, &self.scores, self.below)
        } else {
            XdropBest::default()
        };
        let db_len = len + best_left.ivalue + best_right.ivalue;
        let query_len = len + best_left.jvalue + best_right.jvalue;
        let alignedlen = db_len + query_len;
        let score = len as i64 * self.scores.mat + best_left.score + best_right.score;
        let distance = score_to_distance(score, alignedlen);
        if error_rate(distance, alignedlen) <= self.errorpercentage as f64
            && alignedlen >= 2 * self.leastlength
        {
            let query_start = pos2 - best_left.jvalue;
            let m = QueryMatch {
                db_len,
                db_start: pos1 - best_left.ivalue,
                query_seqnum: frame.query_seqnum,
                query_len,
                query_start: query_start - frame.query_seq_start,
                score,
                distance,
                self_match: true,
                readmode: Readmode::Forward,
            };
            self.reporter.report(&m, self.enc)?;
        }
        Ok(())
    }
}

/// Trimmed-greedy extension of one self-match seed.
struct GreedySelf<'a, 'w> {
    enc: &'a EncodedSequence,
    reporter: MatchReporter<'w>,
    params: GreedyParams,
    errorpercentage: u64,
    leastlength: Pos,
    ubuf: Vec<u8>,
    vbuf: Vec<u8>,
}

impl GreedySelf<'_, '_> {
    fn process(&mut self, pos1: Pos, pos2: Pos, len: Pos) -> Result<()> {
        let (pos1, pos2) = if pos1 <= pos2 { (pos1, pos2) } else { (pos2, pos1) };
        if pos1 + len >= pos2 {
            return Ok(());
        }
        let frame = seed_frame(self.enc, pos1, pos2);
        let left = if pos1 > frame.db_seq_start && pos2 > frame.query_seq_start {
            extract(self.enc, frame.db_seq_start, pos1, &mut self.ubuf)?;
            let vstart = (pos1 + len).max(frame.query_seq_start);
            extract(self.enc, vstart, pos2, &mut self.vbuf)?;
            front_prune_extend(&self.ubuf, &self.vbuf, false, &self.params)
        } else {
            PolishedPoint::default()
        };
        let vextend_left = left.alignedlen - left.row;
        let uright_bound = frame.db_seq_end.min(pos2 - vextend_left);
        let right = if pos1 + len < uright_bound && pos2 + len < frame.query_seq_end {
            extract(self.enc, pos1 + len, uright_bound, &mut self.ubuf)?;
            extract(self.enc, pos2 + len, frame.query_seq_end, &mut self.vbuf)?;
            front_prune_extend(&self.ubuf, &self.vbuf, true, &self.params)
        } else {
            PolishedPoint::default()
        };
        let distance = left.distance + right.distance;
        let db_len = len + left.row + right.row;
        let vextend_right = right.alignedlen - right.row;
        let query_len = len + vextend_left + vextend_right;
        let alignedlen = db_len + query_len;
        if error_rate(distance, alignedlen) <= self.errorpercentage as f64
            && alignedlen >= 2 * self.leastlength
        {
            let m = QueryMatch {
                db_len,
                db_start: pos1 - left.row,
                query_seqnum: frame.query_seqnum,
                query_len,
                query_start: (pos2 - vextend_left) - frame.query_seq_start,
                score: distance_to_score(distance, alignedlen),
                distance,
                self_match: true,
                readmode: Readmode::Forward,
            };
            self.reporter.report(&m, self.enc)?;
        }
        Ok(())
    }
}

/// Suffix-prefix overlaps: one sequence's suffix equals another's
/// prefix.
fn report_spm(
    enc: &EncodedSequence,
    out: &mut dyn Write,
    pos1: Pos,
    pos2: Pos,
    len: Pos,
) -> Result<()> {
    let (pos1, pos2) = if pos1 <= pos2 { (pos1, pos2) } else { (pos2, pos1) };
    let seqnum1 = enc.seqnum_of(pos1);
    let rel1 = pos1 - enc.seq_start(seqnum1);
    let seqnum2 = enc.seqnum_of(pos2);
    let rel2 = pos2 - enc.seq_start(seqnum2);
    if rel1 == 0 {
        if rel2 + len == enc.seq_length(seqnum2) {
            writeln!(out, "{} {} {}", seqnum2, seqnum1, len)?;
        }
    } else if rel2 == 0 && rel1 + len == enc.seq_length(seqnum1) {
        writeln!(out, "{} {} {}", seqnum1, seqnum2, len)?;
    }
    Ok(())
}

// ============================================================================
// DRIVER
// ============================================================================

/// Run the reporter tool against an index.
pub fn run_match(
    name: &IndexName,
    opts: &MatchOptions,
    out: &mut dyn Write,
    logger: &Logger<'_>,
) -> Result<()> {
    if opts.extend == ExtendMode::Greedy && !opts.queries.is_empty() {
        return Err(Error::misuse(
            "greedy extension of query matches is not supported",
        ));
    }
    let (leastlength, seedlength) = resolve_lengths(opts);
    let index = Index::load(name, opts.scan)?;
    let enc = &index.enc;
    log!(logger, "index {} loaded, {} symbols", name.base().display(), enc.len());

    if opts.samples > 0 {
        return run_samples(enc, opts.samples, seedlength, logger);
    }
    if !opts.queries.is_empty() {
        return run_queries(&index, opts, seedlength, out, logger);
    }
    if opts.forward {
        run_forward_selfmatch(&index, opts, leastlength, seedlength, out, logger)?;
    }
    if opts.reverse {
        run_reverse_selfmatch(&index, opts, leastlength, out)?;
    }
    Ok(())
}

enum SelfProcessor<'a, 'w> {
    Plain(MatchReporter<'w>),
    Spm(&'w mut dyn Write),
    Xdrop(Box<XdropSelf<'a, 'w>>),
    Greedy(Box<GreedySelf<'a, 'w>>),
}

fn run_forward_selfmatch(
    index: &Index,
    opts: &MatchOptions,
    leastlength: Pos,
    seedlength: Pos,
    out: &mut dyn Write,
    logger: &Logger<'_>,
) -> Result<()> {
    let enc = &index.enc;
    let mut processor = if opts.spm {
        SelfProcessor::Spm(out)
    } else {
        match opts.extend {
            ExtendMode::None => SelfProcessor::Plain(MatchReporter::new(out)),
            ExtendMode::Xdrop => SelfProcessor::Xdrop(Box::new(XdropSelf {
                enc,
                reporter: MatchReporter::new(out),
                // self-match scores compatible with the greedy scale
                scores: XdropScores {
                    mat: 2,
                    mis: -1,
                    ins: -2,
                    del: -2,
                },
                below: XDROP_BELOW_DEFAULT,
                errorpercentage: opts.errorpercentage,
                leastlength,
                ubuf: Vec::new(),
                vbuf: Vec::new(),
            })),
            ExtendMode::Greedy => SelfProcessor::Greedy(Box::new(GreedySelf {
                enc,
                reporter: MatchReporter::new(out),
                params: GreedyParams::with_maxalilendiff(opts.maxalilendiff),
                errorpercentage: opts.errorpercentage,
                leastlength,
                ubuf: Vec::new(),
                vbuf: Vec::new(),
            })),
        }
    };
    // minimum sweep length: the seed length when extending, otherwise
    // the reported length itself
    let sweep_length = if opts.extend == ExtendMode::None && !opts.spm {
        leastlength
    } else {
        seedlength
    };
    let esa = EsaReader::open(&index.name, opts.scan)?;
    let mut sweep = MaxPairsSweep::new(enc, sweep_length)?;
    {
        let mut sink = |pos1: Pos, pos2: Pos, len: Pos| -> Result<()> {
            match &mut processor {
                SelfProcessor::Plain(reporter) => {
                    reporter.report(&QueryMatch::exact_self(enc, len, pos1, pos2), enc)
                }
                SelfProcessor::Spm(out) => report_spm(enc, &mut **out, pos1, pos2, len),
                SelfProcessor::Xdrop(info) => {
                    log!(logger, "seed: {} {} {}", pos1, pos2, len);
                    info.process(pos1, pos2, len)
                }
                SelfProcessor::Greedy(info) => {
                    log!(logger, "seed: {} {} {}", pos1, pos2, len);
                    info.process(pos1, pos2, len)
                }
            }
        };
        for item in esa {
            let (suffix, lcp) = item?;
            sweep.push(suffix, lcp, &mut sink)?;
        }
        sweep.finish(&mut sink)?;
    }
    Ok(())
}

/// Reverse matches: a substring whose reversal occurs elsewhere. Found
/// by matching every member sequence, reversed, against the index.
fn run_reverse_selfmatch(
    index: &Index,
    opts: &MatchOptions,
    leastlength: Pos,
    out: &mut dyn Write,
) -> Result<()> {
    let enc = &index.enc;
    let suftab = SuftabStore::open(&index.name.suffixed("suf"), opts.scan)?;
    let searcher = MmSearcher::new(enc, &suftab);
    let mut reporter = MatchReporter::new(out);
    let mut buf = Vec::new();
    for seqnum in 0..enc.num_sequences() {
        let start = enc.seq_start(seqnum);
        let seqlen = enc.seq_length(seqnum);
        if seqlen < leastlength {
            continue;
        }
        extract(enc, start, start + seqlen, &mut buf)?;
        let reversed: Vec<u8> = buf.iter().rev().copied().collect();
        searcher.enumerate_matches(&reversed, leastlength as usize, &mut |db, qpos, len| {
            // map back into original coordinates of this sequence
            let orig_rel = seqlen - (qpos as Pos + len as Pos);
            let q_abs = start + orig_rel;
            let (a, b) = if db <= q_abs { (db, q_abs) } else { (q_abs, db) };
            let query_seqnum = enc.seqnum_of(b);
            let m = QueryMatch {
                db_len: len as Pos,
                db_start: a,
                query_seqnum,
                query_len: len as Pos,
                query_start: b - enc.seq_start(query_seqnum),
                score: 0,
                distance: 0,
                self_match: true,
                readmode: Readmode::Reverse,
            };
            reporter.report(&m, enc)
        })?;
    }
    Ok(())
}

/// Match query files against the index, optionally x-drop extending.
fn run_queries(
    index: &Index,
    opts: &MatchOptions,
    seedlength: Pos,
    out: &mut dyn Write,
    logger: &Logger<'_>,
) -> Result<()> {
    let enc = &index.enc;
    let suftab = SuftabStore::open(&index.name.suffixed("suf"), opts.scan)?;
    let searcher = MmSearcher::new(enc, &suftab);
    let mut reporter = MatchReporter::new(out);
    let mut query_seqnum: u64 = 0;
    for path in &opts.queries {
        let source = FastaSource::open(&[path], enc.alphabet())?;
        log!(logger, "query file {} with {} sequence(s)", path.display(), source.descriptions().len());
        for record in source.symbols().split(|&symbol| symbol == SEPARATOR) {
            searcher.enumerate_matches(record, seedlength as usize, &mut |db, qpos, len| {
                match opts.extend {
                    ExtendMode::Xdrop => extend_query_match_xdrop(
                        enc,
                        record,
                        query_seqnum,
                        db,
                        qpos,
                        len,
                        &mut reporter,
                    ),
                    _ => {
                        let m = QueryMatch {
                            db_len: len as Pos,
                            db_start: db,
                            query_seqnum,
                            query_len: len as Pos,
                            query_start: qpos as Pos,
                            score: 0,
                            distance: 0,
                            self_match: false,
                            readmode: Readmode::Forward,
                        };
                        reporter.report(&m, enc)
                    }
                }
            })?;
            query_seqnum += 1;
        }
    }
    Ok(())
}

fn extend_query_match_xdrop(
    enc: &EncodedSequence,
    query: &[u8],
    query_seqnum: u64,
    db: Pos,
    qpos: usize,
    len: usize,
    reporter: &mut MatchReporter<'_>,
) -> Result<()> {
    let scores = XdropScores::query_match();
    let db_seqnum = enc.seqnum_of(db);
    let db_seq_start = enc.seq_start(db_seqnum);
    let db_seq_end = db_seq_start + enc.seq_length(db_seqnum);
    let mut ubuf = Vec::new();
    let best_left = if db > db_seq_start && qpos > 0 {
        extract(enc, db_seq_start, db, &mut ubuf)?;
        evaluate_xdrop(&ubuf, &query[..qpos], false, &scores, XDROP_BELOW_DEFAULT)
    } else {
        XdropBest::default()
    };
    let best_right = if db + (len as Pos) < db_seq_end && qpos + len < query.len() {
        extract(enc, db + len as Pos, db_seq_end, &mut ubuf)?;
        evaluate_xdrop(
            &ubuf,
            &query[qpos + len..],
            true,
            &scores,
            XDROP_BELOW_DEFAULT,
        )
    } else {
        XdropBest::default()
    };
    let db_len = len as Pos + best_left.ivalue + best_right.ivalue;
    let db_start = db - best_left.ivalue;
    let query_len = len as Pos + best_left.jvalue + best_right.jvalue;
    let query_start = qpos as Pos - best_left.jvalue;
    let score =
        len as i64 * scores.mat + best_left.score + best_right.score;
    // the frontier does not track the distance; recompute it greedily
    let mut dbbuf = Vec::new();
    extract(enc, db_start, db_start + db_len, &mut dbbuf)?;
    let qslice = &query[query_start as usize..(query_start + query_len) as usize];
    let distance = greedy_unit_distance(&dbbuf, qslice);
    let m = QueryMatch {
        db_len,
        db_start,
        query_seqnum,
        query_len,
        query_start,
        score,
        distance,
        self_match: false,
        readmode: Readmode::Forward,
    };
    reporter.report(&m, enc)
}

// ============================================================================
// SAMPLED CROSS-CHECK
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct SampledMatch {
    query_seqnum: u64,
    query_start: Pos,
    db_start: Pos,
    len: Pos,
}

fn adjacent_lcps(enc: &EncodedSequence, suftab: &[Pos]) -> Vec<Pos> {
    let mut lcps = vec![0 as Pos; suftab.len()];
    for idx in 1..suftab.len() {
        lcps[idx] = enc
            .compare_suffixes(false, suftab[idx - 1], suftab[idx], 0, None)
            .1;
    }
    lcps
}

fn sample_substring(
    enc: &EncodedSequence,
    rng: &mut impl Rng,
    substring_length: Pos,
    replace_specials: bool,
) -> Result<Vec<u8>> {
    let total = enc.len();
    let start = rng.gen_range(0..total);
    let len = substring_length.min(total - start);
    let mut buf = Vec::new();
    extract(enc, start, start + len, &mut buf)?;
    if replace_specials {
        let sigma = enc.alphabet().num_chars() as u8;
        for symbol in &mut buf {
            if alphabet::is_special(*symbol) {
                *symbol = rng.gen_range(0..sigma);
            }
        }
    }
    Ok(buf)
}

/// Draw random substring pairs and assert that query matching and the
/// self-match sweep over the concatenation report the same set.
pub fn run_samples(
    enc: &EncodedSequence,
    samples: u64,
    seedlength: Pos,
    logger: &Logger<'_>,
) -> Result<()> {
    let mut rng = rand::thread_rng();
    let substring_length = (100 * seedlength).min(enc.len() / 2).max(seedlength);
    log!(logger, "draw {} samples of length up to {}", samples, substring_length);
    let mut drawn = 0u64;
    while drawn < samples {
        let dbseq = sample_substring(enc, &mut rng, substring_length, false)?;
        let query = sample_substring(enc, &mut rng, substring_length, true)?;
        if (dbseq.len() as Pos) < seedlength
            || (query.len() as Pos) < seedlength
            || alphabet::is_special(dbseq[0])
            || alphabet::is_special(*dbseq.last().unwrap())
        {
            continue;
        }
        drawn += 1;
        check_one_sample(enc, &dbseq, &query, seedlength, logger)?;
    }
    log!(logger, "{} samples agreed", drawn);
    Ok(())
}

fn check_one_sample(
    enc: &EncodedSequence,
    dbseq: &[u8],
    query: &[u8],
    seedlength: Pos,
    logger: &Logger<'_>,
) -> Result<()> {
    // path A: sort the db sample, run query matching
    let db_enc = build_from_symbols(dbseq, enc.alphabet().clone(), SatChoice::Auto)?;
    let db_suftab = sort_suffixes(&db_enc, None, SortStrategy::default(), &Logger::quiet())?;
    let searcher = MmSearcher::new(&db_enc, &db_suftab);
    let mut by_query: Vec<SampledMatch> = Vec::new();
    searcher.enumerate_matches(query, seedlength as usize, &mut |db, qpos, len| {
        by_query.push(SampledMatch {
            query_seqnum: 0,
            query_start: qpos as Pos,
            db_start: db,
            len: len as Pos,
        });
        Ok(())
    })?;

    // path B: self matches of the concatenation crossing the boundary
    let mut concat = dbseq.to_vec();
    concat.push(SEPARATOR);
    concat.extend_from_slice(query);
    let both = build_from_symbols(&concat, enc.alphabet().clone(), SatChoice::Auto)?;
    let suftab = sort_suffixes(&both, None, SortStrategy::default(), &Logger::quiet())?;
    let lcptab = adjacent_lcps(&both, &suftab);
    let db_len = dbseq.len() as Pos;
    let mut by_self: Vec<SampledMatch> = Vec::new();
    crate::maxpairs::enumerate_maxpairs(&both, &suftab, &lcptab, seedlength, &mut |a, b, len| {
        let (db_start, query_pos) = match a.cmp(&b) {
            Ordering::Less => (a, b),
            _ => (b, a),
        };
        if db_start < db_len && query_pos > db_len {
            by_self.push(SampledMatch {
                query_seqnum: 0,
                query_start: query_pos - db_len - 1,
                db_start,
                len,
            });
        }
        Ok(())
    })?;

    by_query.sort_unstable();
    by_self.sort_unstable();
    if by_query != by_self {
        log!(logger, "query path found {} matches, self path {}", by_query.len(), by_self.len());
        return Err(invariant_error!(
            "sampled maximal-pair cross-check failed for a db of {} and a query of {} symbols",
            dbseq.len(),
            query.len()
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_resolution_rules() {
        let mut opts = MatchOptions::default();
        assert_eq!(resolve_lengths(&opts), (20, 20));
        opts.leastlength = Some(12);
        assert_eq!(resolve_lengths(&opts), (12, 12));
        opts.seedlength = Some(30);
        assert_eq!(resolve_lengths(&opts), (12, 12));
        opts.seedlength = Some(8);
        assert_eq!(resolve_lengths(&opts), (12, 8));
        opts.leastlength = None;
        assert_eq!(resolve_lengths(&opts), (8, 8));
    }

    #[test]
    fn score_distance_relation() {
        assert_eq!(distance_to_score(0, 40), 40);
        assert_eq!(distance_to_score(5, 40), 25);
        assert_eq!(score_to_distance(25, 40), 5);
        assert_eq!(score_to_distance(40, 40), 0);
        assert_eq!(score_to_distance(distance_to_score(7, 50), 50), 7);
    }

    #[test]
    fn error_rate_is_per_two_hundred() {
        assert!((error_rate(5, 100) - 10.0).abs() < 1e-9);
        assert!((error_rate(0, 50) - 0.0).abs() < 1e-9);
    }
}
