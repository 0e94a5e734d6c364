mod config;
mod date;
mod paths;
mod store;
mod util;

mod filters;
mod key_index;
mod merge;
mod record;

mod counting;
mod partition;
mod pipeline;
mod progress;

pub use crate::config::{
    load_bot_list, load_conspiracy_keywords, load_id_list, merge_extra_author_exclusions, BotList,
    CleanOptions,
};
pub use crate::date::{ym_from_created_at, YearMonth};
pub use crate::pipeline::{CleanReport, CorpusClean};

pub use crate::filters::{compile_prefix_patterns, DropCause, Filter, FilterChain, Verdict};
pub use crate::key_index::KeyIndex;
pub use crate::merge::{merge_shard, MergeCfg, MergeMode, MergeOutcome};
pub use crate::record::{author_id, canonical_id, created_at, lang, text};

// Shard I/O primitives for application code.
pub use crate::paths::{discover_shards, fold_shard_name, month_shard_name, ShardFile};
pub use crate::store::{for_each_line, for_each_record, ParsePolicy, ShardReader, ShardWriter};

// Stats & re-partitioning.
pub use crate::counting::CorpusStats;
pub use crate::partition::PartitionReport;

// Expose progress helper and robust file ops so binaries can import from crate root.
pub use crate::progress::ProgressScope;
pub use crate::util::{
    append_with_backoff, create_with_backoff, init_tracing_once, open_with_backoff,
    remove_with_backoff, replace_file_atomic_backoff,
};
