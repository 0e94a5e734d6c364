use crate::config::{BotList, CleanOptions};
use crate::counting::{authors_in_shard, merge_stats, stats_for_shard, CorpusStats};
use crate::filters::{compile_prefix_patterns, Filter, FilterChain};
use crate::merge::{merge_shard, MergeCfg, MergeMode, MergeOutcome};
use crate::partition::{partition_by_month, split_corpus, PartitionReport};
use crate::paths::discover_shards;
use crate::progress::ProgressScope;
use crate::store::ParsePolicy;
use crate::util::init_tracing_once;
use ahash::AHashSet;
use anyhow::{Context, Result};
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Builder-style entry point for corpus cleanup runs.
///
/// ```no_run
/// # use std::path::Path;
/// # use twetl::CorpusClean;
/// # fn main() -> anyhow::Result<()> {
/// let report = CorpusClean::new()
///     .lang("ja")
///     .bot_authors(["1278431234567"])
///     .progress(false)
///     .clean(Path::new("raw_data"), Path::new("clean_data"))?;
/// println!("{} records removed", report.removed);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct CorpusClean {
    opts: CleanOptions,
    dedup: bool,
}

impl Default for CorpusClean {
    fn default() -> Self {
        Self::new()
    }
}

/// Aggregate result of a directory-level cleanup run.
#[derive(Clone, Copy, Debug, Default)]
pub struct CleanReport {
    pub files: usize,
    pub kept: u64,
    pub removed: u64,
    pub appended: u64,
    pub skipped_lines: u64,
}

impl CorpusClean {
    pub fn new() -> Self {
        Self { opts: CleanOptions::default(), dedup: true }
    }

    // -------- Builder methods --------
    pub fn lang(mut self, code: impl AsRef<str>) -> Self {
        self.opts = self.opts.with_lang(code);
        self
    }
    /// Disable or re-enable duplicate-id suppression (on by default).
    pub fn dedup(mut self, yes: bool) -> Self {
        self.dedup = yes;
        self
    }
    pub fn bot_authors<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.opts = self.opts.with_bot_authors(ids);
        self
    }
    pub fn bot_text_patterns<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.opts = self.opts.with_bot_text_patterns(patterns);
        self
    }
    /// Load both bot lists from a parsed bots file.
    pub fn bots(self, bots: BotList) -> Self {
        self.bot_authors(bots.authors).bot_text_patterns(bots.patterns)
    }
    pub fn exclude_keywords<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.opts = self.opts.with_exclude_keywords(words);
        self
    }
    pub fn exclude_ids<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.opts = self.opts.with_exclude_ids(ids);
        self
    }
    pub fn parse_policy(mut self, policy: ParsePolicy) -> Self {
        self.opts = self.opts.with_parse_policy(policy);
        self
    }
    pub fn file_concurrency(mut self, n: usize) -> Self {
        self.opts = self.opts.with_file_concurrency(n);
        self
    }
    pub fn progress(mut self, yes: bool) -> Self {
        self.opts = self.opts.with_progress(yes);
        self
    }
    pub fn progress_label(mut self, label: impl Into<String>) -> Self {
        self.opts = self.opts.with_progress_label(label);
        self
    }
    pub fn io_buffers(mut self, read_bytes: usize, write_bytes: usize) -> Self {
        self.opts = self.opts.with_io_buffers(read_bytes, write_bytes);
        self
    }

    fn merge_cfg(&self) -> MergeCfg {
        MergeCfg {
            read_buf_bytes: self.opts.read_buffer_bytes,
            write_buf_bytes: self.opts.write_buffer_bytes,
            on_parse_error: self.opts.on_parse_error,
        }
    }

    /// Chain order: duplicate suppression first, then the cheap field
    /// equality filters, then the text scans.
    fn build_chain(&self) -> Result<FilterChain> {
        let mut filters = Vec::new();
        if self.dedup {
            filters.push(Filter::Duplicate);
        }
        if let Some(code) = &self.opts.lang {
            filters.push(Filter::Language(code.clone()));
        }
        if !self.opts.bot_authors.is_empty() {
            filters.push(Filter::BotAuthor(self.opts.bot_authors.iter().cloned().collect()));
        }
        if !self.opts.bot_text_patterns.is_empty() {
            filters.push(Filter::BotText(compile_prefix_patterns(&self.opts.bot_text_patterns)?));
        }
        if !self.opts.exclude_keywords.is_empty() {
            filters.push(Filter::KeywordExclude(self.opts.exclude_keywords.clone()));
        }
        if !self.opts.exclude_ids.is_empty() {
            filters.push(Filter::ExcludeIds(self.opts.exclude_ids.iter().cloned().collect()));
        }
        Ok(FilterChain::new(filters))
    }

    fn shard_progress(&self, label: &str, total: u64) -> ProgressScope {
        if self.opts.progress {
            ProgressScope::count(self.opts.progress_label.as_deref().unwrap_or(label), total)
        } else {
            ProgressScope::disabled()
        }
    }

    // -------- Operations --------

    /// Clean every shard of `src_dir` into the same-named shard under
    /// `dst_dir`: Fresh merge (full chain) when the destination is absent,
    /// Incremental merge (duplicate suppression only) when it exists.
    /// Shards are processed one at a time, in sorted filename order.
    pub fn clean(&self, src_dir: &Path, dst_dir: &Path) -> Result<CleanReport> {
        init_tracing_once();
        let shards = discover_shards(src_dir)?;
        fs::create_dir_all(dst_dir)
            .with_context(|| format!("create output dir {}", dst_dir.display()))?;
        if shards.is_empty() {
            tracing::warn!("no .jsonl shards found in {}", src_dir.display());
        }
        let chain = self.build_chain()?;
        let cfg = self.merge_cfg();
        let pb = self.shard_progress("Cleaning corpus", shards.len() as u64);

        let mut report = CleanReport::default();
        for shard in &shards {
            let dst = dst_dir.join(&shard.name);
            let outcome = merge_shard(&shard.path, &dst, &chain, &cfg)?;
            match outcome.mode {
                MergeMode::Fresh => tracing::info!(
                    shard = %shard.name,
                    kept = outcome.kept,
                    removed = outcome.removed,
                    "cleaned"
                ),
                MergeMode::Incremental => tracing::info!(
                    shard = %shard.name,
                    appended = outcome.appended,
                    suppressed = outcome.removed,
                    "updated"
                ),
            }
            report.files += 1;
            report.kept += outcome.kept;
            report.removed += outcome.removed;
            report.appended += outcome.appended;
            report.skipped_lines += outcome.skipped_lines;
            pb.inc(1);
        }
        pb.finish("done");
        tracing::info!(
            files = report.files,
            kept = report.kept,
            removed = report.removed,
            appended = report.appended,
            "cleanup finished"
        );
        Ok(report)
    }

    /// Single-shard Fresh-or-Incremental merge with duplicate suppression
    /// only (re-query accumulation of a monthly shard).
    pub fn merge_incremental(&self, src_shard: &Path, dst_shard: &Path) -> Result<MergeOutcome> {
        init_tracing_once();
        let chain = FilterChain::duplicates_only();
        merge_shard(src_shard, dst_shard, &chain, &self.merge_cfg())
    }

    /// Corpus statistics: total/per-shard record counts and a language
    /// histogram. Shards may be counted concurrently (`file_concurrency`);
    /// counting has no cross-shard state.
    pub fn stats(&self, src_dir: &Path) -> Result<(CorpusStats, BTreeMap<String, u64>)> {
        init_tracing_once();
        let shards = discover_shards(src_dir)?;
        let read_buf = self.opts.read_buffer_bytes;
        let policy = self.opts.on_parse_error;

        let mut total = CorpusStats::default();
        let mut per_shard = BTreeMap::new();
        if self.opts.file_concurrency <= 1 {
            for shard in &shards {
                let part = stats_for_shard(shard, read_buf, policy)?;
                per_shard.insert(shard.name.clone(), part.records);
                merge_stats(&mut total, part);
            }
        } else {
            for chunk in shards.chunks(self.opts.file_concurrency) {
                let parts = chunk
                    .par_iter()
                    .map(|shard| {
                        stats_for_shard(shard, read_buf, policy).map(|s| (shard.name.clone(), s))
                    })
                    .collect::<Result<Vec<_>>>()?;
                for (name, part) in parts {
                    per_shard.insert(name, part.records);
                    merge_stats(&mut total, part);
                }
            }
        }
        Ok((total, per_shard))
    }

    /// Sorted, deduplicated author ids across the corpus, for the user-info
    /// lookup collaborator.
    pub fn distinct_authors(&self, src_dir: &Path) -> Result<Vec<String>> {
        init_tracing_once();
        let shards = discover_shards(src_dir)?;
        let mut all = AHashSet::new();
        for shard in &shards {
            let part = authors_in_shard(shard, self.opts.read_buffer_bytes, self.opts.on_parse_error)?;
            all.extend(part);
        }
        let mut authors: Vec<String> = all.into_iter().collect();
        authors.sort();
        Ok(authors)
    }

    /// Re-partition `src_dir` into calendar-month shards under `dst_dir`.
    pub fn partition_months(&self, src_dir: &Path, dst_dir: &Path) -> Result<PartitionReport> {
        init_tracing_once();
        let shards = discover_shards(src_dir)?;
        partition_by_month(
            &shards,
            dst_dir,
            self.opts.read_buffer_bytes,
            self.opts.write_buffer_bytes,
            self.opts.on_parse_error,
        )
    }

    /// Divide `src_dir` into `folds` near-equal shards under `dst_dir`.
    pub fn split(&self, src_dir: &Path, dst_dir: &Path, folds: usize) -> Result<Vec<(String, u64)>> {
        init_tracing_once();
        let shards = discover_shards(src_dir)?;
        split_corpus(
            &shards,
            dst_dir,
            folds,
            self.opts.read_buffer_bytes,
            self.opts.write_buffer_bytes,
        )
    }
}
