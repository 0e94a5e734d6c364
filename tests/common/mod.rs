use serde_json::{json, Value};
use std::fs::{self, File};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

/// Write a `.jsonl` shard from record values (one compact JSON object per line).
pub fn write_shard(dir: &Path, name: &str, records: &[Value]) -> PathBuf {
    fs::create_dir_all(dir).unwrap();
    let path = dir.join(name);
    let mut f = File::create(&path).unwrap();
    for r in records {
        writeln!(&mut f, "{}", r).unwrap();
    }
    path
}

/// Write a shard from raw lines, exactly as given (for malformed-line tests).
pub fn write_raw_shard(dir: &Path, name: &str, lines: &[&str]) -> PathBuf {
    fs::create_dir_all(dir).unwrap();
    let path = dir.join(name);
    let mut f = File::create(&path).unwrap();
    for l in lines {
        writeln!(&mut f, "{}", l).unwrap();
    }
    path
}

/// Read a JSONL file into a vector of `serde_json::Value` (skips empty lines).
pub fn read_jsonl_values(path: &Path) -> Vec<Value> {
    let f = File::open(path).unwrap();
    let r = BufReader::new(f);
    r.lines()
        .map(|l| l.unwrap())
        .filter(|s| !s.is_empty())
        .map(|s| serde_json::from_str(&s).unwrap())
        .collect()
}

/// Read a text file line-by-line into strings (keeps raw record lines).
pub fn read_lines(path: &Path) -> Vec<String> {
    let f = File::open(path).unwrap();
    let r = BufReader::new(f);
    r.lines().map(|l| l.unwrap()).filter(|s| !s.is_empty()).collect()
}

/// A minimal tweet record in the shape the search API exports: the pipeline's
/// required fields plus untouched extras.
pub fn tweet(id: &str, lang: &str, author: &str, text: &str) -> Value {
    tweet_at(id, lang, author, text, "2017-10-05T14:30:00.000Z")
}

pub fn tweet_at(id: &str, lang: &str, author: &str, text: &str, created_at: &str) -> Value {
    json!({
        "id": id,
        "lang": lang,
        "author_id": author,
        "text": text,
        "created_at": created_at,
        "public_metrics": {"retweet_count": 2, "reply_count": 0, "like_count": 5, "quote_count": 0}
    })
}

/// Extract the `id` values of a shard, in file order.
pub fn ids_of(path: &Path) -> Vec<String> {
    read_jsonl_values(path)
        .iter()
        .map(|v| v.get("id").unwrap().to_string().trim_matches('"').to_string())
        .collect()
}
