#[path = "common/mod.rs"]
mod common;

use common::*;
use serde_json::json;
use twetl::{canonical_id, CorpusClean};

fn quiet() -> CorpusClean {
    CorpusClean::new().progress(false)
}

#[test]
fn stats_counts_records_and_languages() {
    let tmp = tempfile::tempdir().unwrap();
    let src = tmp.path().join("clean");
    write_shard(
        &src,
        "a.jsonl",
        &[
            tweet("1", "ja", "100", "一"),
            tweet("2", "ja", "101", "二"),
            tweet("3", "en", "102", "three"),
        ],
    );
    write_shard(&src, "b.jsonl", &[tweet("4", "und", "103", "???")]);

    let (total, per_shard) = quiet().stats(&src).unwrap();
    assert_eq!(total.records, 4);
    assert_eq!(per_shard.get("a.jsonl").copied(), Some(3));
    assert_eq!(per_shard.get("b.jsonl").copied(), Some(1));
    assert_eq!(total.languages.get("ja").copied(), Some(2));
    assert_eq!(total.languages.get("en").copied(), Some(1));
    assert_eq!(total.languages.get("und").copied(), Some(1));
}

/// Counting is stateless per shard, so the chunked concurrent path must give
/// the same totals as the sequential one.
#[test]
fn stats_concurrent_matches_sequential() {
    let tmp = tempfile::tempdir().unwrap();
    let src = tmp.path().join("clean");
    for i in 0..6 {
        let id = i.to_string();
        write_shard(&src, &format!("s{i}.jsonl"), &[tweet(&id, "ja", "100", "x")]);
    }

    let (seq, seq_shards) = quiet().stats(&src).unwrap();
    let (par, par_shards) = quiet().file_concurrency(4).stats(&src).unwrap();
    assert_eq!(seq.records, par.records);
    assert_eq!(seq_shards, par_shards);
}

/// Distinct authors come back sorted, with numeric and string author ids
/// canonicalized to one entry.
#[test]
fn distinct_authors_are_sorted_and_canonical() {
    let tmp = tempfile::tempdir().unwrap();
    let src = tmp.path().join("clean");
    write_raw_shard(
        &src,
        "a.jsonl",
        &[
            r#"{"id": "1", "lang": "ja", "author_id": 42, "text": "a"}"#,
            r#"{"id": "2", "lang": "ja", "author_id": "42", "text": "b"}"#,
            r#"{"id": "3", "lang": "ja", "author_id": "7", "text": "c"}"#,
            r#"{"id": "4", "lang": "ja", "text": "no author"}"#,
        ],
    );

    let authors = quiet().distinct_authors(&src).unwrap();
    assert_eq!(authors, vec!["42".to_string(), "7".to_string()]);
}

#[test]
fn canonical_id_normalizes_scalars() {
    assert_eq!(
        canonical_id(&json!({"id": "1309150000000001"})),
        canonical_id(&json!({"id": 1309150000000001u64}))
    );
    assert_eq!(canonical_id(&json!({"id": " 42 "})), Some("42".to_string()));
    assert_eq!(canonical_id(&json!({"id": "  "})), None);
    assert_eq!(canonical_id(&json!({"text": "no id"})), None);
    assert_eq!(canonical_id(&json!({"id": ["not", "scalar"]})), None);
}

/// A corpus directory that doesn't exist is a hard error, not an empty result.
#[test]
fn missing_corpus_directory_errors() {
    let tmp = tempfile::tempdir().unwrap();
    let missing = tmp.path().join("nope");
    let err = quiet().stats(&missing).unwrap_err();
    assert!(format!("{err:#}").contains("corpus directory not found"));
}
