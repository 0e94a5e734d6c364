//! CLI for the corpus cleanup toolkit.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use twetl::{
    load_bot_list, load_conspiracy_keywords, load_id_list, merge_extra_author_exclusions,
    CorpusClean, MergeMode, ParsePolicy,
};

#[derive(Parser, Debug)]
#[command(name = "twetl")]
#[command(version)]
#[command(about = "Streaming cleanup, dedup and incremental-merge toolkit for JSONL tweet corpora")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Don't draw progress bars.
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Skip (and count) lines that are not valid JSON instead of aborting.
    #[arg(long, global = true)]
    skip_bad_lines: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Deduplicate a corpus by id, optionally keeping one language.
    Dedup {
        src_dir: PathBuf,
        dst_dir: PathBuf,
        /// Target language code (e.g. "ja"); "und" records always pass.
        #[arg(long)]
        lang: Option<String>,
    },

    /// Remove bot-authored and bot-patterned records.
    FilterBots {
        src_dir: PathBuf,
        dst_dir: PathBuf,
        /// JSON file: {"authors": [...], "patterns": [...]}.
        #[arg(long)]
        bots_file: PathBuf,
    },

    /// All filters combined: dedup, language, bots, keywords, explicit ids.
    FullClean {
        src_dir: PathBuf,
        dst_dir: PathBuf,
        #[arg(long)]
        bots_file: PathBuf,
        #[arg(long)]
        lang: Option<String>,
        /// JSON file: {"conspiracy": [...]}.
        #[arg(long)]
        keywords_file: Option<PathBuf>,
        /// Newline-separated record ids to force-exclude.
        #[arg(long)]
        exclude_ids_file: Option<PathBuf>,
    },

    /// Merge one freshly fetched shard into its accumulation target,
    /// appending only genuinely new ids.
    MergeIncremental {
        src_shard: PathBuf,
        dst_shard: PathBuf,
    },

    /// Re-partition a corpus into calendar-month shards by created_at.
    PartitionMonths {
        src_dir: PathBuf,
        dst_dir: PathBuf,
    },

    /// Divide a corpus into N near-equal fold shards.
    Split {
        src_dir: PathBuf,
        dst_dir: PathBuf,
        #[arg(long)]
        folds: usize,
    },

    /// Count records per shard, optionally with a language histogram.
    Stats {
        src_dir: PathBuf,
        /// Also print the per-language counts.
        #[arg(long)]
        languages: bool,
    },

    /// Collect the sorted distinct author ids of a corpus.
    Authors {
        src_dir: PathBuf,
        /// Output file, one author id per line.
        #[arg(short, long)]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let base = CorpusClean::new().progress(!cli.quiet).parse_policy(if cli.skip_bad_lines {
        ParsePolicy::Skip
    } else {
        ParsePolicy::Abort
    });

    match cli.command {
        Commands::Dedup { src_dir, dst_dir, lang } => {
            let mut etl = base;
            if let Some(code) = lang {
                etl = etl.lang(code);
            }
            let report = etl.clean(&src_dir, &dst_dir)?;
            print_clean_summary(&report);
        }

        Commands::FilterBots { src_dir, dst_dir, bots_file } => {
            let mut bots = load_bot_list(&bots_file)?;
            merge_extra_author_exclusions(&mut bots.authors);
            let report = base.dedup(false).bots(bots).clean(&src_dir, &dst_dir)?;
            print_clean_summary(&report);
        }

        Commands::FullClean { src_dir, dst_dir, bots_file, lang, keywords_file, exclude_ids_file } => {
            let mut bots = load_bot_list(&bots_file)?;
            merge_extra_author_exclusions(&mut bots.authors);
            let mut etl = base.bots(bots);
            if let Some(code) = lang {
                etl = etl.lang(code);
            }
            if let Some(path) = keywords_file {
                etl = etl.exclude_keywords(load_conspiracy_keywords(&path)?);
            }
            if let Some(path) = exclude_ids_file {
                etl = etl.exclude_ids(load_id_list(&path)?);
            }
            let report = etl.clean(&src_dir, &dst_dir)?;
            print_clean_summary(&report);
        }

        Commands::MergeIncremental { src_shard, dst_shard } => {
            let outcome = base.merge_incremental(&src_shard, &dst_shard)?;
            match outcome.mode {
                MergeMode::Fresh => {
                    println!("created {} with {} records", dst_shard.display(), outcome.kept)
                }
                MergeMode::Incremental => println!(
                    "{} records were added to existing file ({} already present)",
                    outcome.appended, outcome.removed
                ),
            }
        }

        Commands::PartitionMonths { src_dir, dst_dir } => {
            let report = base.partition_months(&src_dir, &dst_dir)?;
            for (ym, n) in &report.months {
                println!("{ym}: {n} records");
            }
            println!(
                "dropped {} duplicates, {} undated, {} without id",
                report.duplicates, report.undated, report.missing_id
            );
        }

        Commands::Split { src_dir, dst_dir, folds } => {
            let written = base.split(&src_dir, &dst_dir, folds)?;
            for (name, n) in &written {
                println!("{name}: {n} records");
            }
        }

        Commands::Stats { src_dir, languages } => {
            let (total, per_shard) = base.stats(&src_dir)?;
            for (name, n) in &per_shard {
                println!("{name}: {n} records");
            }
            println!("total: {} records in {} shards", total.records, per_shard.len());
            if total.skipped_lines > 0 {
                println!("skipped {} bad lines", total.skipped_lines);
            }
            if languages {
                let mut langs: Vec<_> = total.languages.into_iter().collect();
                langs.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
                for (code, n) in langs {
                    println!("{code}: {n}");
                }
            }
        }

        Commands::Authors { src_dir, output } => {
            let authors = base.distinct_authors(&src_dir)?;
            let mut w = BufWriter::new(File::create(&output)?);
            for a in &authors {
                writeln!(w, "{a}")?;
            }
            w.flush()?;
            println!("{} distinct authors written to {}", authors.len(), output.display());
        }
    }

    Ok(())
}

fn print_clean_summary(report: &twetl::CleanReport) {
    println!(
        "{} files processed: {} kept, {} removed, {} appended",
        report.files, report.kept, report.removed, report.appended
    );
    if report.skipped_lines > 0 {
        println!("skipped {} bad lines", report.skipped_lines);
    }
}
