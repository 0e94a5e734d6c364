//! The per-shard merge engine: decide Fresh vs Incremental once, then stream.
//!
//! Fresh mode filters the source against an empty index and stages the output
//! through `ShardWriter::create`, so an interrupted run leaves no destination
//! and simply re-runs Fresh from scratch. A destination that exists is always
//! the product of a completed Fresh merge and can be trusted as the seed for
//! Incremental mode.

use crate::filters::{FilterChain, Verdict};
use crate::key_index::KeyIndex;
use crate::record::canonical_id;
use crate::store::{for_each_record, ParsePolicy, ShardWriter};
use anyhow::{Context, Result};
use std::path::Path;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MergeMode {
    /// Destination did not exist: full filter chain, new shard.
    Fresh,
    /// Destination exists: append genuinely new ids only.
    Incremental,
}

/// IO and error-policy knobs for one merge.
#[derive(Clone, Copy, Debug)]
pub struct MergeCfg {
    pub read_buf_bytes: usize,
    pub write_buf_bytes: usize,
    pub on_parse_error: ParsePolicy,
}

impl Default for MergeCfg {
    fn default() -> Self {
        Self {
            read_buf_bytes: 256 * 1024,
            write_buf_bytes: 256 * 1024,
            on_parse_error: ParsePolicy::Abort,
        }
    }
}

/// What one shard merge did.
#[derive(Clone, Copy, Debug)]
pub struct MergeOutcome {
    pub mode: MergeMode,
    /// Records written to a fresh destination.
    pub kept: u64,
    /// Source records not retained (any filter cause, including duplicate
    /// suppression during incremental updates).
    pub removed: u64,
    /// Records newly appended to an existing destination.
    pub appended: u64,
    /// Malformed source lines skipped under `ParsePolicy::Skip`.
    pub skipped_lines: u64,
}

/// Merge `src` into `dst`.
///
/// The mode is chosen once, from the existence of `dst`, before any record is
/// read. `chain` applies in Fresh mode only; an incremental update is
/// strictly duplicate suppression, since every other filter already ran when
/// the destination was first created.
pub fn merge_shard(
    src: &Path,
    dst: &Path,
    chain: &FilterChain,
    cfg: &MergeCfg,
) -> Result<MergeOutcome> {
    if dst.exists() {
        merge_incremental(src, dst, cfg)
    } else {
        merge_fresh(src, dst, chain, cfg)
    }
}

fn merge_fresh(src: &Path, dst: &Path, chain: &FilterChain, cfg: &MergeCfg) -> Result<MergeOutcome> {
    let mut index = KeyIndex::new();
    let mut writer = ShardWriter::create(dst, cfg.write_buf_bytes)?;
    let mut kept: u64 = 0;
    let mut removed: u64 = 0;

    let skipped = for_each_record(src, cfg.read_buf_bytes, cfg.on_parse_error, |line, val| {
        match chain.evaluate(val, &mut index) {
            Verdict::Keep => {
                writer.write_line(line)?;
                kept += 1;
            }
            Verdict::Drop(cause) => {
                tracing::trace!(?cause, "dropped record");
                removed += 1;
            }
        }
        Ok(())
    })
    .with_context(|| format!("fresh merge {} -> {}", src.display(), dst.display()))?;

    writer.finish()?;
    tracing::debug!(src = %src.display(), dst = %dst.display(), kept, removed, "fresh merge done");
    Ok(MergeOutcome { mode: MergeMode::Fresh, kept, removed, appended: 0, skipped_lines: skipped })
}

fn merge_incremental(src: &Path, dst: &Path, cfg: &MergeCfg) -> Result<MergeOutcome> {
    let mut index = KeyIndex::from_shard(dst, cfg.read_buf_bytes)
        .with_context(|| format!("scan destination {}", dst.display()))?;
    let mut writer = ShardWriter::append(dst, cfg.write_buf_bytes)?;
    let mut appended: u64 = 0;
    let mut removed: u64 = 0;

    let skipped = for_each_record(src, cfg.read_buf_bytes, cfg.on_parse_error, |line, val| {
        match canonical_id(val) {
            // Inserting as we append keeps intra-batch duplicates out too.
            Some(id) => {
                if index.insert(id) {
                    writer.write_line(line)?;
                    appended += 1;
                } else {
                    removed += 1;
                }
            }
            None => removed += 1,
        }
        Ok(())
    })
    .with_context(|| format!("incremental merge {} -> {}", src.display(), dst.display()))?;

    writer.finish()?;
    tracing::debug!(src = %src.display(), dst = %dst.display(), appended, removed, "incremental merge done");
    Ok(MergeOutcome {
        mode: MergeMode::Incremental,
        kept: 0,
        removed,
        appended,
        skipped_lines: skipped,
    })
}
