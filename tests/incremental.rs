#[path = "common/mod.rs"]
mod common;

use common::*;
use twetl::{CorpusClean, MergeMode};

fn quiet() -> CorpusClean {
    CorpusClean::new().progress(false)
}

/// An incremental merge appends only genuinely new ids and reports how many.
#[test]
fn incremental_appends_only_new_ids() {
    let tmp = tempfile::tempdir().unwrap();
    let dst = write_shard(
        tmp.path(),
        "month.jsonl",
        &[tweet("1", "ja", "100", "a"), tweet("2", "ja", "100", "b")],
    );
    let src = write_shard(
        tmp.path(),
        "fetched.jsonl",
        &[tweet("2", "ja", "100", "b refetched"), tweet("3", "ja", "100", "c")],
    );

    let outcome = quiet().merge_incremental(&src, &dst).unwrap();
    assert_eq!(outcome.mode, MergeMode::Incremental);
    assert_eq!(outcome.appended, 1);
    assert_eq!(ids_of(&dst), vec!["1", "2", "3"]);
}

/// Every record previously in the destination is still present unchanged and
/// in place after an incremental merge.
#[test]
fn incremental_is_a_superset_of_the_destination() {
    let tmp = tempfile::tempdir().unwrap();
    let dst = write_shard(
        tmp.path(),
        "month.jsonl",
        &[tweet("1", "ja", "100", "最初"), tweet("2", "ja", "101", "二つ目")],
    );
    let before = read_lines(&dst);

    let src = write_shard(
        tmp.path(),
        "fetched.jsonl",
        &[tweet("3", "ja", "102", "新しい"), tweet("1", "ja", "100", "古いコピー")],
    );
    quiet().merge_incremental(&src, &dst).unwrap();

    let after = read_lines(&dst);
    assert_eq!(&after[..before.len()], &before[..]);
    assert_eq!(after.len(), before.len() + 1);
}

/// Duplicates *within* the new batch are suppressed too: the index is updated
/// as records are appended.
#[test]
fn incremental_suppresses_intra_batch_duplicates() {
    let tmp = tempfile::tempdir().unwrap();
    let dst = write_shard(tmp.path(), "month.jsonl", &[tweet("1", "ja", "100", "a")]);
    let src = write_shard(
        tmp.path(),
        "fetched.jsonl",
        &[
            tweet("2", "ja", "100", "b"),
            tweet("2", "ja", "100", "b again"),
            tweet("3", "ja", "100", "c"),
        ],
    );

    let outcome = quiet().merge_incremental(&src, &dst).unwrap();
    assert_eq!(outcome.appended, 2);
    assert_eq!(ids_of(&dst), vec!["1", "2", "3"]);
}

/// When the destination does not exist, the single-shard merge runs Fresh.
#[test]
fn merge_into_absent_destination_is_fresh() {
    let tmp = tempfile::tempdir().unwrap();
    let src = write_shard(
        tmp.path(),
        "fetched.jsonl",
        &[tweet("1", "ja", "100", "a"), tweet("1", "ja", "100", "copy")],
    );
    let dst = tmp.path().join("month.jsonl");

    let outcome = quiet().merge_incremental(&src, &dst).unwrap();
    assert_eq!(outcome.mode, MergeMode::Fresh);
    assert_eq!(outcome.kept, 1);
    assert_eq!(ids_of(&dst), vec!["1"]);
}

/// Crash recovery: an interrupted Fresh merge leaves only a stale
/// `.inprogress` file, never a partial destination. Re-running starts Fresh
/// from scratch and produces the same output as an uninterrupted run.
#[test]
fn interrupted_fresh_restarts_from_scratch() {
    let tmp = tempfile::tempdir().unwrap();
    let src = tmp.path().join("raw");
    let dst = tmp.path().join("clean");
    write_shard(
        &src,
        "a.jsonl",
        &[tweet("1", "ja", "100", "a"), tweet("2", "ja", "101", "b")],
    );

    // Simulate the crash artifact: a partial staging file, no destination.
    std::fs::create_dir_all(&dst).unwrap();
    std::fs::write(dst.join("a.jsonl.inprogress"), "{\"id\": \"1\",").unwrap();

    let report = quiet().clean(&src, &dst).unwrap();
    assert_eq!(report.kept, 2);
    assert_eq!(report.appended, 0, "partial output must not be treated as a destination");
    assert_eq!(ids_of(&dst.join("a.jsonl")), vec!["1", "2"]);
    assert!(!dst.join("a.jsonl.inprogress").exists(), "stale staging file should be gone");
}

/// Directory-level cleanup picks Incremental automatically for shards whose
/// destination already exists, and other filters no longer apply at that
/// stage: the destination's filtering happened when it was first created.
#[test]
fn clean_switches_to_incremental_per_shard() {
    let tmp = tempfile::tempdir().unwrap();
    let src = tmp.path().join("raw");
    let dst = tmp.path().join("clean");
    write_shard(
        &src,
        "a.jsonl",
        &[tweet("1", "ja", "100", "a"), tweet("2", "en", "101", "b")],
    );

    let first = quiet().lang("ja").clean(&src, &dst).unwrap();
    assert_eq!(first.kept, 1);

    // The shard is re-fetched with one genuinely new record, in English.
    write_shard(
        &src,
        "a.jsonl",
        &[
            tweet("1", "ja", "100", "a"),
            tweet("2", "en", "101", "b"),
            tweet("3", "en", "102", "new but english"),
        ],
    );
    let second = quiet().lang("ja").clean(&src, &dst).unwrap();
    assert_eq!(second.appended, 2, "incremental stage is duplicate suppression only");
    assert_eq!(ids_of(&dst.join("a.jsonl")), vec!["1", "2", "3"]);
}
