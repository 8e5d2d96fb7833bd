use cdi_cpt_index::{
    discover_shards, normalize_targets, write_tsv, CptIndexBuilder, CptIndexError, Shard,
};
use cdi_protocol::CptIndexEntry;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::{tempdir, TempDir};

const ANTHEM: &str = "extracted_procedures_single_call_Anthem_v2";
const CIGNA: &str = "extracted_procedures_single_call_Cigna_v2";

fn write_record(root: &Path, shard: &str, file: &str, body: &str) {
    let dir = root.join(shard);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join(file), body).unwrap();
}

fn two_payer_corpus() -> TempDir {
    let temp = tempdir().unwrap();
    // Cigna is written first so creation order differs from the expected output order.
    write_record(
        temp.path(),
        CIGNA,
        "shoulder.json",
        r#"{"section_title": "Shoulder arthroscopy", "codes": [{"system": "CPT", "code": "29827"}]}"#,
    );
    write_record(
        temp.path(),
        ANTHEM,
        "shoulder.json",
        r#"{"section_title": "Shoulder arthroscopy", "codes": [{"system": "CPT", "code": "29827"}]}"#,
    );
    temp
}

fn mixed_corpus() -> TempDir {
    let temp = two_payer_corpus();
    write_record(
        temp.path(),
        ANTHEM,
        "knee.json",
        r#"{"names": ["Knee arthroscopy"], "codes": [
            {"system": "CPT", "code": "29881"},
            {"system": " cpt", "code": "29827"}
        ]}"#,
    );
    write_record(
        temp.path(),
        "extracted_procedures_uhc",
        "hip.json",
        r#"{"title": "Hip arthroscopy", "codes": [{"system": "CPT", "code": "29914"}]}"#,
    );
    write_record(temp.path(), CIGNA, "broken.json", "[");
    write_record(
        temp.path(),
        "notes",
        "ignored.json",
        r#"{"title": "Not a shard", "codes": [{"system": "CPT", "code": "29827"}]}"#,
    );
    temp
}

#[test]
fn two_payers_yield_anthem_first() {
    let corpus = two_payer_corpus();
    let index = CptIndexBuilder::new(corpus.path(), normalize_targets(["29827"]))
        .build()
        .unwrap();

    assert_eq!(
        index.entries,
        vec![
            CptIndexEntry::new(
                "29827",
                "Shoulder arthroscopy",
                "Anthem",
                format!("{ANTHEM}/shoulder.json")
            ),
            CptIndexEntry::new(
                "29827",
                "Shoulder arthroscopy",
                "Cigna",
                format!("{CIGNA}/shoulder.json")
            ),
        ]
    );
    assert_eq!(index.stats.shards, 2);
}

#[test]
fn mixed_corpus_is_sorted_and_tolerant() {
    let corpus = mixed_corpus();
    let index = CptIndexBuilder::new(corpus.path(), normalize_targets(["29827, 29914", "29881"]))
        .build()
        .unwrap();

    let rows: Vec<(&str, &str, &str)> = index
        .entries
        .iter()
        .map(|e| (e.code.as_str(), e.payer.as_str(), e.procedure.as_str()))
        .collect();
    assert_eq!(
        rows,
        vec![
            ("29827", "Anthem", "Knee arthroscopy"),
            ("29827", "Anthem", "Shoulder arthroscopy"),
            ("29827", "Cigna", "Shoulder arthroscopy"),
            ("29881", "Anthem", "Knee arthroscopy"),
            ("29914", "extracted_procedures_uhc", "Hip arthroscopy"),
        ]
    );
    assert_eq!(index.stats.files_skipped, 1);
}

#[test]
fn zero_matches_is_not_an_error() {
    let corpus = two_payer_corpus();
    let index = CptIndexBuilder::new(corpus.path(), normalize_targets(["99999"]))
        .build()
        .unwrap();
    assert!(index.entries.is_empty());
    assert_eq!(index.stats.files_scanned, 2);
}

#[test]
fn empty_root_reports_no_shards() {
    let temp = tempdir().unwrap();
    let err = CptIndexBuilder::new(temp.path(), normalize_targets(["29827"]))
        .build()
        .unwrap_err();
    assert!(matches!(err, CptIndexError::NoShards(_)));
}

#[test]
fn writes_tsv_report() {
    let corpus = two_payer_corpus();
    let index = CptIndexBuilder::new(corpus.path(), normalize_targets(["29827"]))
        .build()
        .unwrap();
    let out = corpus.path().join("reports").join("index.tsv");
    write_tsv(&index.entries, &out).unwrap();

    let text = fs::read_to_string(&out).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "cpt_code\tprocedure\tpayer\tsource_file");
    assert!(lines[1].contains("\tAnthem\t"));
    assert!(lines[2].contains("\tCigna\t"));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn output_is_independent_of_shard_order(seed in any::<u64>()) {
        let corpus = mixed_corpus();
        let builder = CptIndexBuilder::new(corpus.path(), normalize_targets(["29827", "29881", "29914"]));
        let baseline = builder.build().unwrap().entries;

        let mut shards: Vec<Shard> = discover_shards(corpus.path());
        let len = shards.len();
        // Fisher-Yates driven by a small LCG so the permutation follows the seed.
        let mut state = seed;
        for i in (1..len).rev() {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            let j = (state >> 33) as usize % (i + 1);
            shards.swap(i, j);
        }

        prop_assert_eq!(builder.index_shards(&shards).entries, baseline);
    }
}
