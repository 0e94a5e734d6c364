use crate::store::ParsePolicy;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// User-facing cleanup options with sensible defaults and builder chaining.
#[derive(Clone, Debug)]
pub struct CleanOptions {
    pub lang: Option<String>,              // target language code, e.g. "ja"
    pub bot_authors: Vec<String>,          // author ids to exclude
    pub bot_text_patterns: Vec<String>,    // uncompiled match-from-start regexes
    pub exclude_keywords: Vec<String>,     // substring blocklist (conspiracy/spam)
    pub exclude_ids: Vec<String>,          // explicit record ids to drop
    pub on_parse_error: ParsePolicy,
    pub file_concurrency: usize,           // stats fan-out only; merges are sequential

    // IO tuning
    pub read_buffer_bytes: usize,
    pub write_buffer_bytes: usize,

    pub progress: bool,
    pub progress_label: Option<String>,
}

impl Default for CleanOptions {
    fn default() -> Self {
        let default_read = 256 * 1024;
        let default_write = 256 * 1024;
        Self {
            lang: None,
            bot_authors: Vec::new(),
            bot_text_patterns: Vec::new(),
            exclude_keywords: Vec::new(),
            exclude_ids: Vec::new(),
            on_parse_error: ParsePolicy::Abort,
            file_concurrency: 1,
            read_buffer_bytes: default_read,
            write_buffer_bytes: default_write,
            progress: true,
            progress_label: None,
        }
    }
}

impl CleanOptions {
    pub fn with_lang(mut self, code: impl AsRef<str>) -> Self {
        self.lang = Some(code.as_ref().trim().to_lowercase());
        self
    }
    pub fn with_bot_authors<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.bot_authors = ids.into_iter().map(Into::into).collect();
        self
    }
    pub fn with_bot_text_patterns<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.bot_text_patterns = patterns.into_iter().map(Into::into).collect();
        self
    }
    pub fn with_exclude_keywords<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_keywords = words.into_iter().map(Into::into).collect();
        self
    }
    pub fn with_exclude_ids<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_ids = ids.into_iter().map(Into::into).collect();
        self
    }
    pub fn with_parse_policy(mut self, policy: ParsePolicy) -> Self {
        self.on_parse_error = policy;
        self
    }
    pub fn with_file_concurrency(mut self, n: usize) -> Self {
        self.file_concurrency = n.max(1);
        self
    }
    pub fn with_progress(mut self, yes: bool) -> Self {
        self.progress = yes;
        self
    }
    pub fn with_progress_label(mut self, label: impl Into<String>) -> Self {
        self.progress_label = Some(label.into());
        self
    }
    pub fn with_io_buffers(mut self, read_bytes: usize, write_bytes: usize) -> Self {
        self.read_buffer_bytes = read_bytes.max(8 * 1024);
        self.write_buffer_bytes = write_bytes.max(8 * 1024);
        self
    }
}

/// On-disk bots file: `{"authors": ["123", ...], "patterns": ["^RT @spam", ...]}`.
#[derive(Debug, Default, Deserialize)]
pub struct BotList {
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(default)]
    pub patterns: Vec<String>,
}

pub fn load_bot_list(path: &Path) -> Result<BotList> {
    let f = File::open(path).with_context(|| format!("open bots file {}", path.display()))?;
    serde_json::from_reader(BufReader::new(f))
        .with_context(|| format!("parse bots file {}", path.display()))
}

#[derive(Debug, Default, Deserialize)]
struct KeywordFile {
    #[serde(default)]
    conspiracy: Vec<String>,
}

/// Keywords file: `{"conspiracy": ["word", ...]}` (same shape the annotation
/// side of the study reads).
pub fn load_conspiracy_keywords(path: &Path) -> Result<Vec<String>> {
    let f = File::open(path).with_context(|| format!("open keywords file {}", path.display()))?;
    let kw: KeywordFile = serde_json::from_reader(BufReader::new(f))
        .with_context(|| format!("parse keywords file {}", path.display()))?;
    Ok(kw.conspiracy)
}

/// Newline-separated id list (blank lines ignored).
pub fn load_id_list(path: &Path) -> Result<Vec<String>> {
    let f = File::open(path).with_context(|| format!("open id list {}", path.display()))?;
    let mut ids = Vec::new();
    for line in BufReader::new(f).lines() {
        let line = line?;
        let id = line.trim();
        if !id.is_empty() {
            ids.push(id.to_string());
        }
    }
    Ok(ids)
}

/// Merge extra excluded authors from env into the provided vector (in-place).
/// - TWETL_EXCLUDE_AUTHORS: comma/semicolon/space separated author ids
/// - TWETL_EXCLUDE_AUTHORS_FILE: path to newline-separated file of author ids
/// Entries are trimmed, then the list is sort+dedup.
pub fn merge_extra_author_exclusions(target: &mut Vec<String>) {
    if let Ok(s) = std::env::var("TWETL_EXCLUDE_AUTHORS") {
        for raw in s.split(|c: char| c == ',' || c == ';' || c.is_whitespace()) {
            let id = raw.trim();
            if !id.is_empty() {
                target.push(id.to_string());
            }
        }
    }

    if let Ok(path) = std::env::var("TWETL_EXCLUDE_AUTHORS_FILE") {
        if !path.trim().is_empty() {
            match load_id_list(Path::new(&path)) {
                Ok(ids) => target.extend(ids),
                Err(e) => {
                    tracing::warn!("TWETL_EXCLUDE_AUTHORS_FILE is set but cannot be read: {e:#}")
                }
            }
        }
    }

    for s in target.iter_mut() {
        *s = s.trim().to_string();
    }
    target.sort();
    target.dedup();
}
