//! Retention predicates over one record, combined as an ordered conjunction.
//!
//! Each variant answers "keep this record?" from the record's fields plus the
//! running [`KeyIndex`]. A record missing a field an active filter needs is
//! dropped and counted, never silently passed.

use crate::key_index::KeyIndex;
use crate::record::{author_id, canonical_id, lang, text};
use ahash::AHashSet;
use anyhow::{Context, Result};
use regex::Regex;
use serde_json::Value;

/// Why a record was not retained. The driver reports one aggregate removed
/// count; causes exist for logging and tests.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DropCause {
    Duplicate,
    Language,
    BotAuthor,
    BotText,
    Keyword,
    ExcludedId,
    MissingField,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    Keep,
    Drop(DropCause),
}

/// One configured retention predicate.
pub enum Filter {
    /// Drop records whose id was already retained in this operation.
    Duplicate,
    /// Keep only records in the target language. `"und"` passes: an
    /// undetermined language is never excluded by this filter alone.
    Language(String),
    /// Drop records authored by a known bot account.
    BotAuthor(AHashSet<String>),
    /// Drop records whose text starts with a known bot pattern.
    BotText(Vec<Regex>),
    /// Drop records whose text contains an excluded keyword.
    KeywordExclude(Vec<String>),
    /// Drop records from an explicit id blocklist.
    ExcludeIds(AHashSet<String>),
}

impl Filter {
    fn apply(&self, record: &Value, index: &KeyIndex) -> Verdict {
        match self {
            Filter::Duplicate => match canonical_id(record) {
                Some(id) if index.contains(&id) => Verdict::Drop(DropCause::Duplicate),
                Some(_) => Verdict::Keep,
                None => Verdict::Drop(DropCause::MissingField),
            },
            Filter::Language(target) => match lang(record) {
                Some("und") => Verdict::Keep,
                Some(l) if l == target => Verdict::Keep,
                Some(_) => Verdict::Drop(DropCause::Language),
                None => Verdict::Drop(DropCause::MissingField),
            },
            Filter::BotAuthor(bots) => match author_id(record) {
                Some(a) if bots.contains(&a) => Verdict::Drop(DropCause::BotAuthor),
                Some(_) => Verdict::Keep,
                None => Verdict::Drop(DropCause::MissingField),
            },
            Filter::BotText(patterns) => match text(record) {
                Some(t) if patterns.iter().any(|re| re.is_match(t)) => {
                    Verdict::Drop(DropCause::BotText)
                }
                Some(_) => Verdict::Keep,
                None => Verdict::Drop(DropCause::MissingField),
            },
            Filter::KeywordExclude(words) => match text(record) {
                Some(t) if words.iter().any(|w| t.contains(w.as_str())) => {
                    Verdict::Drop(DropCause::Keyword)
                }
                Some(_) => Verdict::Keep,
                None => Verdict::Drop(DropCause::MissingField),
            },
            Filter::ExcludeIds(ids) => match canonical_id(record) {
                Some(id) if ids.contains(&id) => Verdict::Drop(DropCause::ExcludedId),
                Some(_) => Verdict::Keep,
                None => Verdict::Drop(DropCause::MissingField),
            },
        }
    }
}

/// Ordered conjunction of filters: a record is retained iff every filter
/// keeps it.
#[derive(Default)]
pub struct FilterChain {
    filters: Vec<Filter>,
}

impl FilterChain {
    pub fn new(filters: Vec<Filter>) -> Self {
        Self { filters }
    }

    /// A chain that only suppresses duplicates (incremental merges).
    pub fn duplicates_only() -> Self {
        Self { filters: vec![Filter::Duplicate] }
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    fn tracks_duplicates(&self) -> bool {
        self.filters.iter().any(|f| matches!(f, Filter::Duplicate))
    }

    /// Evaluate the whole chain against one record.
    ///
    /// The record's id enters the index only when the chain keeps the record:
    /// a copy dropped for language (say) does not block a later retainable
    /// copy of the same id.
    pub fn evaluate(&self, record: &Value, index: &mut KeyIndex) -> Verdict {
        for f in &self.filters {
            if let Verdict::Drop(cause) = f.apply(record, index) {
                return Verdict::Drop(cause);
            }
        }
        if self.tracks_duplicates() {
            if let Some(id) = canonical_id(record) {
                index.insert(id);
            }
        }
        Verdict::Keep
    }
}

/// Compile bot text patterns with match-from-start semantics: a pattern
/// matching any prefix of the text excludes the record, like Python's
/// `re.match`.
pub fn compile_prefix_patterns<I, S>(patterns: I) -> Result<Vec<Regex>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    patterns
        .into_iter()
        .map(|p| {
            let p = p.as_ref();
            Regex::new(&format!("^(?:{p})")).with_context(|| format!("bot text pattern `{p}`"))
        })
        .collect()
}
