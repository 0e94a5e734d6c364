//! Corpus re-partitioning: month shards keyed on `created_at`, and near-equal
//! fold shards for annotation hand-off.

use crate::date::{ym_from_created_at, YearMonth};
use crate::key_index::KeyIndex;
use crate::paths::{fold_shard_name, month_shard_name, ShardFile};
use crate::record::{canonical_id, created_at};
use crate::store::{for_each_line, for_each_record, ParsePolicy, ShardWriter};
use anyhow::{bail, Context, Result};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// What a month-partitioning pass did.
#[derive(Clone, Debug, Default)]
pub struct PartitionReport {
    pub months: BTreeMap<YearMonth, u64>,
    /// Records dropped as corpus-wide duplicates.
    pub duplicates: u64,
    /// Records without a parseable `created_at`.
    pub undated: u64,
    /// Records without an id (cannot participate in dedup, dropped).
    pub missing_id: u64,
    pub skipped_lines: u64,
}

/// Re-partition a corpus into calendar-month shards `YYYY-MM.jsonl` under
/// `dst_dir`, deduplicating by id across the whole corpus as it goes.
/// Within a month, records keep their source order. Each month shard is
/// staged and promoted atomically.
pub fn partition_by_month(
    shards: &[ShardFile],
    dst_dir: &Path,
    read_buf_bytes: usize,
    write_buf_bytes: usize,
    policy: ParsePolicy,
) -> Result<PartitionReport> {
    fs::create_dir_all(dst_dir)
        .with_context(|| format!("create output dir {}", dst_dir.display()))?;

    let mut report = PartitionReport::default();
    let mut index = KeyIndex::new();
    let mut writers: BTreeMap<YearMonth, ShardWriter> = BTreeMap::new();

    for shard in shards {
        let skipped = for_each_record(&shard.path, read_buf_bytes, policy, |line, val| {
            let Some(id) = canonical_id(val) else {
                report.missing_id += 1;
                return Ok(());
            };
            if !index.insert(id) {
                report.duplicates += 1;
                return Ok(());
            }
            let Some(ym) = created_at(val).and_then(ym_from_created_at) else {
                report.undated += 1;
                return Ok(());
            };
            let writer = match writers.entry(ym) {
                Entry::Occupied(e) => e.into_mut(),
                Entry::Vacant(v) => {
                    let path = dst_dir.join(month_shard_name(ym));
                    v.insert(ShardWriter::create(&path, write_buf_bytes)?)
                }
            };
            writer.write_line(line)?;
            *report.months.entry(ym).or_insert(0) += 1;
            Ok(())
        })
        .with_context(|| format!("partition {}", shard.name))?;
        report.skipped_lines += skipped;
    }

    for (_, w) in writers {
        w.finish()?;
    }
    Ok(report)
}

/// Divide a corpus into `folds` near-equal shards `sample_<k>.jsonl` under
/// `dst_dir`, preserving source order. Two streaming passes: count, then
/// write; chunk size is `total / folds + 1`.
pub fn split_corpus(
    shards: &[ShardFile],
    dst_dir: &Path,
    folds: usize,
    read_buf_bytes: usize,
    write_buf_bytes: usize,
) -> Result<Vec<(String, u64)>> {
    if folds == 0 {
        bail!("fold count must be at least 1");
    }
    fs::create_dir_all(dst_dir)
        .with_context(|| format!("create output dir {}", dst_dir.display()))?;

    let mut total: u64 = 0;
    for shard in shards {
        for_each_line(&shard.path, read_buf_bytes, |_| {
            total += 1;
            Ok(())
        })?;
    }
    if total == 0 {
        return Ok(Vec::new());
    }
    let chunk = total / folds as u64 + 1;

    let mut out: Vec<(String, u64)> = Vec::new();
    let mut writer: Option<ShardWriter> = None;
    let mut in_fold: u64 = 0;
    let mut fold_no: usize = 0;

    for shard in shards {
        for_each_line(&shard.path, read_buf_bytes, |line| {
            if writer.is_none() || in_fold == chunk {
                if let Some(w) = writer.take() {
                    w.finish()?;
                }
                fold_no += 1;
                let name = fold_shard_name(fold_no);
                writer = Some(ShardWriter::create(&dst_dir.join(&name), write_buf_bytes)?);
                out.push((name, 0));
                in_fold = 0;
            }
            writer.as_mut().expect("writer set above").write_line(line)?;
            in_fold += 1;
            out.last_mut().expect("fold pushed above").1 += 1;
            Ok(())
        })?;
    }
    if let Some(w) = writer.take() {
        w.finish()?;
    }
    Ok(out)
}
