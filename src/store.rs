//! Shard I/O: buffered line reading over `.jsonl` shards, and the two write
//! paths the merge engine needs (atomic create for fresh shards, plain
//! append for incremental updates).
//!
//! A fresh shard is staged at `<path>.inprogress` and only promoted to its
//! final name on `finish()`, so a crash mid-write never leaves a partial
//! shard where the merge engine would later mistake it for a completed one.

use crate::util::{
    append_with_backoff, create_with_backoff, open_with_backoff, replace_file_atomic_backoff,
};
use anyhow::{Context, Result};
use serde_json::Value;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Minimal JSONL reader with buffering and `\r?\n` trimming.
pub struct ShardReader {
    rdr: BufReader<File>,
}

impl ShardReader {
    pub fn open(path: &Path, buf_bytes: usize) -> io::Result<Self> {
        let f = open_with_backoff(path, 16, 50)?;
        Ok(Self { rdr: BufReader::with_capacity(buf_bytes.max(8 * 1024), f) })
    }

    /// Read the next line into `buf`. Returns the number of bytes read (0 on EOF).
    /// Strips trailing `\r?\n`; whitespace-only lines come back empty.
    pub fn read_line(&mut self, buf: &mut String) -> io::Result<usize> {
        buf.clear();
        let n = self.rdr.read_line(buf)?;
        if n == 0 {
            return Ok(0);
        }
        if buf.ends_with('\n') {
            buf.pop();
            if buf.ends_with('\r') {
                buf.pop();
            }
        }
        Ok(n)
    }
}

/// What to do with a shard line that is not valid JSON.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ParsePolicy {
    /// Abort the shard with a line-numbered error (reference behavior).
    #[default]
    Abort,
    /// Skip the line, count it, keep going.
    Skip,
}

/// Stream every non-empty line of a shard through `f`.
pub fn for_each_line(
    path: &Path,
    buf_bytes: usize,
    mut f: impl FnMut(&str) -> Result<()>,
) -> Result<()> {
    let mut rdr = ShardReader::open(path, buf_bytes)
        .with_context(|| format!("open shard {}", path.display()))?;
    let mut buf = String::with_capacity(8 * 1024);
    loop {
        let n = rdr.read_line(&mut buf)?;
        if n == 0 {
            return Ok(());
        }
        if buf.is_empty() {
            continue;
        }
        f(&buf)?;
    }
}

/// Stream every record of a shard through `f` as `(raw_line, parsed_value)`.
/// Returns the number of malformed lines skipped (always 0 under
/// `ParsePolicy::Abort`, which errors out instead).
pub fn for_each_record(
    path: &Path,
    buf_bytes: usize,
    policy: ParsePolicy,
    mut f: impl FnMut(&str, &Value) -> Result<()>,
) -> Result<u64> {
    let mut skipped: u64 = 0;
    let mut line_no: u64 = 0;
    let mut rdr = ShardReader::open(path, buf_bytes)
        .with_context(|| format!("open shard {}", path.display()))?;
    let mut buf = String::with_capacity(8 * 1024);
    loop {
        let n = rdr.read_line(&mut buf)?;
        if n == 0 {
            return Ok(skipped);
        }
        line_no += 1;
        if buf.is_empty() {
            continue;
        }
        match serde_json::from_str::<Value>(&buf) {
            Ok(val) => f(&buf, &val)?,
            Err(e) => match policy {
                ParsePolicy::Abort => {
                    return Err(e)
                        .with_context(|| format!("{}:{}: invalid JSON", path.display(), line_no));
                }
                ParsePolicy::Skip => {
                    tracing::warn!(shard = %path.display(), line = line_no, "skipping invalid JSON line");
                    skipped += 1;
                }
            },
        }
    }
}

enum Sink {
    /// Staged at `tmp`, promoted to `dst` on finish.
    Atomic { tmp: PathBuf, dst: PathBuf },
    /// Direct append to the destination.
    Append,
}

/// Buffered JSONL writer over one shard.
pub struct ShardWriter {
    w: Option<BufWriter<File>>,
    sink: Sink,
}

impl ShardWriter {
    /// Start a brand-new shard. Content lands at `<path>.inprogress` until
    /// `finish()` promotes it.
    pub fn create(path: &Path, buf_bytes: usize) -> Result<Self> {
        let tmp = path.with_extension("jsonl.inprogress");
        let f = create_with_backoff(&tmp, 16, 50)
            .with_context(|| format!("create {}", tmp.display()))?;
        Ok(Self {
            w: Some(BufWriter::with_capacity(buf_bytes.max(8 * 1024), f)),
            sink: Sink::Atomic { tmp, dst: path.to_path_buf() },
        })
    }

    /// Open an existing shard for append (creating it if absent).
    pub fn append(path: &Path, buf_bytes: usize) -> Result<Self> {
        let f = append_with_backoff(path, 16, 50)
            .with_context(|| format!("open for append {}", path.display()))?;
        Ok(Self {
            w: Some(BufWriter::with_capacity(buf_bytes.max(8 * 1024), f)),
            sink: Sink::Append,
        })
    }

    /// Write one record line (the `\n` terminator is added here).
    pub fn write_line(&mut self, s: &str) -> io::Result<()> {
        if let Some(w) = &mut self.w {
            w.write_all(s.as_bytes())?;
            w.write_all(b"\n")?;
        }
        Ok(())
    }

    /// Flush, and promote the staged file for atomic-create writers.
    pub fn finish(mut self) -> Result<()> {
        if let Some(mut w) = self.w.take() {
            w.flush().context("flush shard writer")?;
        }
        match &self.sink {
            Sink::Atomic { tmp, dst } => replace_file_atomic_backoff(tmp, dst),
            Sink::Append => Ok(()),
        }
    }
}
