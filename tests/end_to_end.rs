//! End-to-end scenarios: literal inputs through the whole pipeline —
//! writer, on-disk index, sorted-suffix stream, pair enumeration and
//! seed extension.

use repfind::alphabet::Alphabet;
use repfind::binary::{write_index, IndexName, WriteOptions};
use repfind::encseq::builder::{build_from_symbols, SatChoice};
use repfind::encseq::StorageVariant;
use repfind::greedy::{front_prune_extend, GreedyParams};
use repfind::logger::Logger;
use repfind::maxpairs::enumerate_maxpairs;
use repfind::repfind::{run_match, run_samples, ExtendMode, MatchOptions};
use repfind::sfx::{sort_suffixes, SortStrategy};
use repfind::testing;
use repfind::types::Pos;
use repfind::xdrop::{evaluate_xdrop, XdropBest, XdropScores};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn quiet() -> Logger<'static> {
    Logger::quiet()
}

fn write_fasta(dir: &std::path::Path, name: &str, records: &[(&str, &str)]) -> std::path::PathBuf {
    let mut text = String::new();
    for (header, seq) in records {
        text.push('>');
        text.push_str(header);
        text.push('\n');
        text.push_str(seq);
        text.push('\n');
    }
    let path = dir.join(name);
    std::fs::write(&path, text).unwrap();
    path
}

fn build_index_from(
    dir: &std::path::Path,
    records: &[(&str, &str)],
    options: &WriteOptions,
) -> IndexName {
    use repfind::encseq::builder::build_encoded_sequence;
    use repfind::fasta::FastaSource;
    let fasta = write_fasta(dir, "input.fna", records);
    let mut source = FastaSource::open(&[&fasta], &Alphabet::dna()).unwrap();
    let files = source.files().to_vec();
    let descriptions = source.descriptions().to_vec();
    let enc =
        build_encoded_sequence(&mut source, Alphabet::dna(), SatChoice::Auto, &files).unwrap();
    let name = IndexName::new(dir.join("idx"));
    write_index(&enc, &descriptions, &name, options, &quiet()).unwrap();
    name
}

// ----------------------------------------------------------------------------
// scenario 1: AAAA
// ----------------------------------------------------------------------------

#[test]
fn scenario_all_a() {
    let enc =
        build_from_symbols(&testing::dna_symbols("aaaa"), Alphabet::dna(), SatChoice::Auto)
            .unwrap();
    let suftab = sort_suffixes(&enc, Some(2), SortStrategy::default(), &quiet()).unwrap();
    assert_eq!(suftab, vec![3, 2, 1, 0]);
    // with left-maximality only the (0, 1) pair of the run survives
    let lcptab = testing::naive_lcp_array(&enc, &suftab);
    let mut pairs = Vec::new();
    enumerate_maxpairs(&enc, &suftab, &lcptab, 3, &mut |a, b, len| {
        pairs.push((a, b, len));
        Ok(())
    })
    .unwrap();
    assert_eq!(pairs, vec![(0, 1, 3)]);
    assert_eq!(pairs, testing::naive_maximal_pairs(&enc, 3));
}

// ----------------------------------------------------------------------------
// scenario 2: a sequence and its reversal
// ----------------------------------------------------------------------------

#[test]
fn scenario_reverse_match() {
    let dir = tempfile::tempdir().unwrap();
    let name = build_index_from(dir.path(), &[("one", "ACGT"), ("two", "TGCA")], &WriteOptions::default());
    let opts = MatchOptions {
        leastlength: Some(4),
        forward: false,
        reverse: true,
        ..MatchOptions::default()
    };
    let mut out = Vec::new();
    run_match(&name, &opts, &mut out, &quiet()).unwrap();
    // reverse("TGCA") = "ACGT" occurs at absolute 0; reported with the
    // query side relative to sequence 1
    assert_eq!(String::from_utf8(out).unwrap(), "4 0 1 0\n");
}

// ----------------------------------------------------------------------------
// scenario 3: a plain 26-letter alphabet forces bytecompress
// ----------------------------------------------------------------------------

#[test]
fn scenario_plain_alphabet() {
    let alpha = Alphabet::plain(b"ABCDEFGHIJKLMNOPQRSTUVWXYZ");
    let symbols: Vec<u8> = (0..10u8).collect(); // "ABCDEFGHIJ"
    let enc = build_from_symbols(&symbols, alpha, SatChoice::Auto).unwrap();
    assert_eq!(enc.variant(), StorageVariant::ByteCompress);
    let suftab = sort_suffixes(&enc, Some(1), SortStrategy::default(), &quiet()).unwrap();
    assert_eq!(suftab, (0..10).collect::<Vec<Pos>>());
    let lcptab = testing::naive_lcp_array(&enc, &suftab);
    let mut pairs = Vec::new();
    enumerate_maxpairs(&enc, &suftab, &lcptab, 3, &mut |a, b, len| {
        pairs.push((a, b, len));
        Ok(())
    })
    .unwrap();
    assert!(pairs.is_empty());
}

// ----------------------------------------------------------------------------
// scenario 4: difference cover on the periodic sequence
// ----------------------------------------------------------------------------

#[test]
fn scenario_periodic_diffcover() {
    let symbols: Vec<u8> = (0..32u32).map(|i| (i % 4) as u8).collect();
    let enc = build_from_symbols(&symbols, Alphabet::dna(), SatChoice::Auto).unwrap();
    let plain = sort_suffixes(&enc, Some(2), SortStrategy::default(), &quiet()).unwrap();
    let assisted = sort_suffixes(
        &enc,
        Some(2),
        SortStrategy {
            diffcover: Some(8),
            ..SortStrategy::default()
        },
        &quiet(),
    )
    .unwrap();
    assert_eq!(assisted, plain);
    assert_eq!(plain, testing::naive_sorted_suffixes(&enc));
}

// ----------------------------------------------------------------------------
// scenario 5: x-drop extension around a seed
// ----------------------------------------------------------------------------

#[test]
fn scenario_xdrop_extension() {
    // a seed of 15 with differing left contexts, 5 more matches on the
    // right, then divergence with no stray similarity anywhere
    let scores = XdropScores {
        mat: 2,
        mis: -2,
        ins: -3,
        del: -3,
    };
    // left of the seed: nothing matches at all
    let useq_left = vec![0u8; 5];
    let vseq_left = vec![1u8; 85];
    let left = evaluate_xdrop(&useq_left, &vseq_left, false, &scores, 5);
    assert_eq!(left, XdropBest::default());

    // right of the seed: 5 shared symbols, then disjoint runs
    let shared = [0u8, 1, 2, 3, 3];
    let mut useq_right = shared.to_vec();
    useq_right.extend(std::iter::repeat(0u8).take(75));
    let mut vseq_right = shared.to_vec();
    vseq_right.extend(std::iter::repeat(1u8).take(75));
    let right = evaluate_xdrop(&useq_right, &vseq_right, true, &scores, 5);
    assert_eq!((right.ivalue, right.jvalue, right.score), (5, 5, 10));

    let total_score = 15 * scores.mat + left.score + right.score;
    assert_eq!(total_score, 40);
}

// ----------------------------------------------------------------------------
// scenario 6: greedy extension across noisy 50-mers
// ----------------------------------------------------------------------------

#[test]
fn scenario_greedy_extension() {
    // two identical 50-mers flanking the seed, with scattered
    // mismatches well under the 10% error budget
    let mut rng = StdRng::seed_from_u64(23);
    let core: Vec<u8> = (0..50).map(|_| rng.gen_range(0..4u8)).collect();
    let left_u = core.clone();
    let mut left_v = core.clone();
    left_v[10] = (left_v[10] + 1) % 4;
    left_v[40] = (left_v[40] + 2) % 4;
    let right_u = core.clone();
    let mut right_v = core;
    right_v[20] = (right_v[20] + 3) % 4;

    let params = GreedyParams::default();
    let rev_u: Vec<u8> = left_u.iter().rev().copied().collect();
    let rev_v: Vec<u8> = left_v.iter().rev().copied().collect();
    let left = front_prune_extend(&rev_u, &rev_v, true, &params);
    let right = front_prune_extend(&right_u, &right_v, true, &params);

    let seedlength: Pos = 10;
    let aligned = 2 * seedlength + left.alignedlen + right.alignedlen;
    let distance = left.distance + right.distance;
    assert!(aligned >= 90, "aligned length {} below 90", aligned);
    assert!(distance <= 9, "distance {} above 9", distance);
    assert_eq!(distance, 3);
}

// ----------------------------------------------------------------------------
// whole-pipeline checks
// ----------------------------------------------------------------------------

#[test]
fn forward_match_output_lists_every_maximal_pair() {
    let dir = tempfile::tempdir().unwrap();
    let name = build_index_from(
        dir.path(),
        &[("a", "GATTACAGATTACA"), ("b", "TTACAGATT")],
        &WriteOptions::default(),
    );
    let opts = MatchOptions {
        leastlength: Some(5),
        ..MatchOptions::default()
    };
    let mut out = Vec::new();
    run_match(&name, &opts, &mut out, &quiet()).unwrap();
    let text = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert!(!lines.is_empty());
    for line in &lines {
        let fields: Vec<u64> = line
            .split(' ')
            .map(|field| field.parse().unwrap())
            .collect();
        assert_eq!(fields.len(), 4);
        assert!(fields[0] >= 5); // length
    }
    // the planted 9-symbol overlap appears: GATTACAGA...
    assert!(
        lines.iter().any(|line| {
            let fields: Vec<u64> = line.split(' ').map(|f| f.parse().unwrap()).collect();
            fields[0] >= 9
        }),
        "output was:\n{}",
        text
    );
}

#[test]
fn sampled_cross_check_agrees_on_random_input() {
    let mut rng = StdRng::seed_from_u64(99);
    let symbols: Vec<u8> = (0..600)
        .map(|_| {
            if rng.gen_range(0..100) < 3 {
                repfind::alphabet::WILDCARD
            } else {
                rng.gen_range(0..4u8)
            }
        })
        .collect();
    let enc = build_from_symbols(&symbols, Alphabet::dna(), SatChoice::Auto).unwrap();
    run_samples(&enc, 10, 6, &quiet()).unwrap();
}

#[test]
fn extended_matches_pass_the_error_filter() {
    let dir = tempfile::tempdir().unwrap();
    // one sequence with a distant imperfect repeat
    let mut rng = StdRng::seed_from_u64(7);
    let mut seq = String::new();
    let unit: String = (0..60)
        .map(|_| ['A', 'C', 'G', 'T'][rng.gen_range(0..4)])
        .collect();
    seq.push_str(&unit);
    for _ in 0..30 {
        seq.push(['A', 'C', 'G', 'T'][rng.gen_range(0..4)]);
    }
    let mut copy: Vec<char> = unit.chars().collect();
    copy[7] = match copy[7] {
        'A' => 'C',
        'C' => 'G',
        'G' => 'T',
        _ => 'A',
    };
    seq.push_str(&copy.into_iter().collect::<String>());
    let name = build_index_from(dir.path(), &[("r", &seq)], &WriteOptions::default());

    for extend in [ExtendMode::Xdrop, ExtendMode::Greedy] {
        let opts = MatchOptions {
            leastlength: Some(30),
            seedlength: Some(12),
            extend,
            ..MatchOptions::default()
        };
        let mut out = Vec::new();
        run_match(&name, &opts, &mut out, &quiet()).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(!text.is_empty(), "no extended match found with {:?}", extend);
        for line in text.lines() {
            let fields: Vec<i64> = line.split(' ').map(|f| f.parse().unwrap()).collect();
            assert_eq!(fields.len(), 6, "extended record: {}", line);
            let (_score, distance, db_len) = (fields[0], fields[1], fields[2]);
            assert!(db_len >= 30);
            // the 10% error filter bounds the distance (aligned length
            // is at most the db side plus its greedy-trimmed partner)
            assert!(200 * distance <= 10 * (2 * db_len + 60));
        }
    }
}

#[test]
fn multi_part_index_files_equal_single_part() {
    let dir = tempfile::tempdir().unwrap();
    let mut rng = StdRng::seed_from_u64(3);
    let seq: String = (0..400)
        .map(|_| ['A', 'C', 'G', 'T'][rng.gen_range(0..4)])
        .collect();
    let single_dir = dir.path().join("single");
    let multi_dir = dir.path().join("multi");
    std::fs::create_dir_all(&single_dir).unwrap();
    std::fs::create_dir_all(&multi_dir).unwrap();
    let single = build_index_from(&single_dir, &[("s", &seq)], &WriteOptions::default());
    let multi = build_index_from(
        &multi_dir,
        &[("s", &seq)],
        &WriteOptions {
            numofparts: 4,
            ..WriteOptions::default()
        },
    );
    let suf_single = std::fs::read(single.suffixed("suf")).unwrap();
    let suf_multi = std::fs::read(multi.suffixed("suf")).unwrap();
    assert_eq!(suf_single, suf_multi);
    let lcp_single = std::fs::read(single.suffixed("lcp")).unwrap();
    let lcp_multi = std::fs::read(multi.suffixed("lcp")).unwrap();
    assert_eq!(lcp_single, lcp_multi);
}
