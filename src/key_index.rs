//! The in-memory set of record ids already retained by one merge operation.

use crate::record::canonical_id;
use crate::store::{for_each_record, ParsePolicy};
use anyhow::{bail, Result};
use std::path::Path;

/// Set of canonical ids retained so far. Built at the start of each merge
/// operation and scoped to that single shard merge; never shared across
/// shards or persisted between runs.
#[derive(Debug, Default)]
pub struct KeyIndex {
    ids: ahash::AHashSet<String>,
}

impl KeyIndex {
    /// Empty index, for a fresh merge.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the index from an existing destination shard.
    ///
    /// The destination was written by a completed merge of ours, so every
    /// line must parse and carry an id; anything else means the file is not
    /// one of our outputs and appending to it would corrupt the corpus.
    pub fn from_shard(path: &Path, read_buf_bytes: usize) -> Result<Self> {
        let mut ids = ahash::AHashSet::with_capacity(64_000);
        let mut record_no: u64 = 0;
        for_each_record(path, read_buf_bytes, ParsePolicy::Abort, |_, val| {
            record_no += 1;
            match canonical_id(val) {
                Some(id) => {
                    ids.insert(id);
                    Ok(())
                }
                None => bail!("{}: record {} has no id", path.display(), record_no),
            }
        })?;
        Ok(Self { ids })
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Insert an id; returns `false` if it was already present
    /// (first-seen-wins).
    pub fn insert(&mut self, id: String) -> bool {
        self.ids.insert(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
