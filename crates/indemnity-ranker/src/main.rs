//! Indemnity Ranking CLI
//!
//! Merges the indemnity, GDP, criminality and income datasets and prints
//! the top-N countries for each indemnity ratio.
//!
//! Usage:
//!   rank-indemnities --data-dir data/ -n 10
//!   rank-indemnities --country-table countries_fr.json --dump-merged merged.json

use anyhow::{Context, Result};
use clap::Parser;
use indemnity_ranker::{
    engine, report, CountryDatabase, Matcher, RatioKind, Reconciler, RecordStore, SourceSpec,
    DEFAULT_TOP_N, SIMILARITY_THRESHOLD,
};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "rank-indemnities",
    about = "Rank countries by indemnity relative to GDP, criminality and income"
)]
struct Args {
    /// Directory holding the input files
    #[arg(short, long, default_value = "data/")]
    data_dir: PathBuf,

    /// Primary indemnity dataset (JSON), relative to the data directory
    #[arg(long, default_value = "data_vie.json")]
    primary: PathBuf,

    /// GDP history (CSV, comma-delimited)
    #[arg(long, default_value = "data_pib.csv")]
    gdp: PathBuf,

    /// Crime and security indices (CSV, semicolon-delimited)
    #[arg(long, default_value = "data_criminality.csv")]
    criminality: PathBuf,

    /// Median income figures (CSV, comma-delimited)
    #[arg(long, default_value = "median-income_data.csv")]
    median_income: PathBuf,

    /// Countries per ranking
    #[arg(short = 'n', long, default_value_t = DEFAULT_TOP_N)]
    top: usize,

    /// Similarity a name must exceed to match, in [0, 1]
    #[arg(long, default_value_t = SIMILARITY_THRESHOLD, value_parser = parse_threshold)]
    threshold: f64,

    /// Replace the built-in country reference table (JSON array)
    #[arg(long)]
    country_table: Option<PathBuf>,

    /// Write the merged records as JSON
    #[arg(long)]
    dump_merged: Option<PathBuf>,

    /// Also print the weighted criminality ranking
    #[arg(long)]
    weighted: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn parse_threshold(s: &str) -> std::result::Result<f64, String> {
    let value: f64 = s.parse().map_err(|_| format!("`{}` is not a number", s))?;
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("threshold must be between 0 and 1, got {}", s))
    }
}

/// `--dump-merged` document
#[derive(Serialize)]
struct MergedDump {
    generated_at: String,
    threshold: f64,
    countries: serde_json::Value,
}

/// Serialize `dump` and flush, so a late write error is not lost on drop
fn write_dump<W: Write>(mut writer: W, dump: &MergedDump) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, dump)?;
    writer.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Logs go to stderr; stdout carries the report
    let default_filter = if args.verbose {
        "indemnity_ranker=debug"
    } else {
        "indemnity_ranker=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let countries = match &args.country_table {
        Some(path) => CountryDatabase::from_json_file(path)
            .with_context(|| format!("loading country table {}", path.display()))?,
        None => CountryDatabase::with_defaults(),
    };
    let reconciler = Reconciler::new(countries, Matcher::new(args.threshold));

    let primary = args.data_dir.join(&args.primary);
    let mut store = RecordStore::from_primary_json(&primary)
        .with_context(|| format!("loading {}", primary.display()))?;

    let sources = [
        SourceSpec::gdp(args.data_dir.join(&args.gdp)),
        SourceSpec::criminality(args.data_dir.join(&args.criminality)),
        SourceSpec::median_income(args.data_dir.join(&args.median_income)),
    ];

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    let mut diagnostics_failed = None;
    engine::merge_all(&mut store, &sources, &reconciler, |outcome| {
        for line in outcome.diagnostics() {
            if let Err(e) = writeln!(out, "{}", line) {
                diagnostics_failed.get_or_insert(e);
            }
        }
    })?;
    if let Some(e) = diagnostics_failed {
        return Err(e).context("writing diagnostics");
    }

    if let Some(path) = &args.dump_merged {
        info!("Writing merged records to {:?}", path);
        let dump = MergedDump {
            generated_at: chrono::Utc::now().to_rfc3339(),
            threshold: args.threshold,
            countries: store.to_json(),
        };
        let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
        write_dump(BufWriter::new(file), &dump)
            .with_context(|| format!("writing {}", path.display()))?;
    }

    let mut kinds = RatioKind::REPORTED.to_vec();
    if args.weighted {
        kinds.push(RatioKind::WeightedCriminality);
    }
    report::write_report(&mut out, &store, &kinds, args.top)?;

    Ok(())
}
