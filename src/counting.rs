//! Small reducers over a corpus: record counts, language histogram, distinct
//! author ids.

use crate::paths::ShardFile;
use crate::record::{author_id, lang};
use crate::store::{for_each_record, ParsePolicy};
use ahash::{AHashMap, AHashSet};
use anyhow::{Context, Result};

/// Counts gathered from one shard (or merged across many).
#[derive(Clone, Debug, Default)]
pub struct CorpusStats {
    pub records: u64,
    pub languages: AHashMap<String, u64>,
    pub skipped_lines: u64,
}

pub fn stats_for_shard(
    shard: &ShardFile,
    read_buf_bytes: usize,
    policy: ParsePolicy,
) -> Result<CorpusStats> {
    let mut records: u64 = 0;
    let mut languages: AHashMap<String, u64> = AHashMap::new();
    let skipped = for_each_record(&shard.path, read_buf_bytes, policy, |_, val| {
        records += 1;
        let code = lang(val).unwrap_or("unknown");
        *languages.entry(code.to_string()).or_insert(0) += 1;
        Ok(())
    })
    .with_context(|| format!("count {}", shard.name))?;
    Ok(CorpusStats { records, languages, skipped_lines: skipped })
}

pub fn merge_stats(total: &mut CorpusStats, part: CorpusStats) {
    total.records += part.records;
    total.skipped_lines += part.skipped_lines;
    for (k, v) in part.languages {
        *total.languages.entry(k).or_insert(0) += v;
    }
}

/// Distinct author ids appearing in one shard. Records without an
/// `author_id` are ignored here; the user-info lookup has nothing to ask for.
pub fn authors_in_shard(
    shard: &ShardFile,
    read_buf_bytes: usize,
    policy: ParsePolicy,
) -> Result<AHashSet<String>> {
    let mut authors = AHashSet::new();
    for_each_record(&shard.path, read_buf_bytes, policy, |_, val| {
        if let Some(a) = author_id(val) {
            authors.insert(a);
        }
        Ok(())
    })
    .with_context(|| format!("collect authors {}", shard.name))?;
    Ok(authors)
}
