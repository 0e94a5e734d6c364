#[path = "common/mod.rs"]
mod common;

use common::*;
use twetl::{CorpusClean, YearMonth};

fn quiet() -> CorpusClean {
    CorpusClean::new().progress(false)
}

/// Month partitioning groups records by their created_at month, dedups by id
/// across the whole corpus, and counts records it cannot place.
#[test]
fn partition_groups_by_month_and_dedups() {
    let tmp = tempfile::tempdir().unwrap();
    let src = tmp.path().join("raw");
    let dst = tmp.path().join("monthly");
    write_shard(
        &src,
        "batch1.jsonl",
        &[
            tweet_at("1", "ja", "100", "十月", "2017-10-05T10:00:00.000Z"),
            tweet_at("2", "ja", "101", "十一月", "2017-11-02T09:00:00.000Z"),
        ],
    );
    write_shard(
        &src,
        "batch2.jsonl",
        &[
            tweet_at("1", "ja", "100", "十月のコピー", "2017-10-05T10:00:00.000Z"),
            tweet_at("3", "ja", "102", "また十月", "2017-10-20T23:59:59.000Z"),
            tweet_at("4", "ja", "103", "日付なし", "not-a-date"),
        ],
    );

    let report = quiet().partition_months(&src, &dst).unwrap();
    assert_eq!(report.duplicates, 1);
    assert_eq!(report.undated, 1);
    assert_eq!(report.months.get(&YearMonth::new(2017, 10)).copied(), Some(2));
    assert_eq!(report.months.get(&YearMonth::new(2017, 11)).copied(), Some(1));

    assert_eq!(ids_of(&dst.join("2017-10.jsonl")), vec!["1", "3"]);
    assert_eq!(ids_of(&dst.join("2017-11.jsonl")), vec!["2"]);
}

/// Splitting yields N near-equal folds whose concatenation is exactly the
/// source stream, in order.
#[test]
fn split_covers_the_corpus_once_in_order() {
    let tmp = tempfile::tempdir().unwrap();
    let src = tmp.path().join("clean");
    let dst = tmp.path().join("folds");
    write_shard(
        &src,
        "a.jsonl",
        &[
            tweet("1", "ja", "100", "一"),
            tweet("2", "ja", "100", "二"),
            tweet("3", "ja", "100", "三"),
        ],
    );
    write_shard(
        &src,
        "b.jsonl",
        &[tweet("4", "ja", "100", "四"), tweet("5", "ja", "100", "五")],
    );

    let folds = quiet().split(&src, &dst, 2).unwrap();
    assert_eq!(folds, vec![("sample_1.jsonl".to_string(), 3), ("sample_2.jsonl".to_string(), 2)]);

    let mut all = ids_of(&dst.join("sample_1.jsonl"));
    all.extend(ids_of(&dst.join("sample_2.jsonl")));
    assert_eq!(all, vec!["1", "2", "3", "4", "5"]);
}

/// Splitting an empty corpus writes no fold shards.
#[test]
fn split_of_empty_corpus_is_empty() {
    let tmp = tempfile::tempdir().unwrap();
    let src = tmp.path().join("clean");
    let dst = tmp.path().join("folds");
    write_raw_shard(&src, "a.jsonl", &[]);

    let folds = quiet().split(&src, &dst, 3).unwrap();
    assert!(folds.is_empty());
    assert!(!dst.join("sample_1.jsonl").exists());
}
