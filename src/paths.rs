use anyhow::{bail, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::date::YearMonth;

/// One discovered `.jsonl` shard in a corpus directory.
#[derive(Clone, Debug)]
pub struct ShardFile {
    pub name: String,
    pub path: PathBuf,
}

/// Discover the `.jsonl` shards directly under `dir`, sorted by file name.
///
/// The corpus relies on its naming conventions (`2017-10-01---2017-11-01.jsonl`,
/// `2018-03-march.jsonl`, …) to make that order chronological; nothing here
/// enforces it.
pub fn discover_shards(dir: &Path) -> Result<Vec<ShardFile>> {
    if !dir.is_dir() {
        bail!("corpus directory not found: {}", dir.display());
    }
    let mut shards = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let ent = entry?;
        if !ent.file_type().is_file() {
            continue;
        }
        if let Some(name) = ent.file_name().to_str() {
            if name.ends_with(".jsonl") {
                shards.push(ShardFile { name: name.to_string(), path: ent.path().to_path_buf() });
            }
        }
    }
    shards.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(shards)
}

/// Shard file name for one calendar month of partitioned output.
pub fn month_shard_name(ym: YearMonth) -> String {
    format!("{ym}.jsonl")
}

/// Shard file name for fold `k` (1-based) of a split corpus.
pub fn fold_shard_name(k: usize) -> String {
    format!("sample_{k}.jsonl")
}
