//! # Retriever News
//!
//! A batch pipeline that turns Retriever media-archive text exports into a
//! structured article table and aggregates externally computed similarity
//! scores into a monthly fiscal sentiment index.
//!
//! ## Features
//!
//! - Parses concatenated plain-text exports into title, publisher, date,
//!   publication type, body text and link
//! - Deduplicates articles across export files by body text
//! - Writes UTF-8 CSV with BOM (or JSON) for the downstream topic-model and
//!   embedding scripts
//! - Scores articles against positive and negative fiscal prompts and builds
//!   the monthly index with its linear trend and 12-month rolling mean
//!
//! ## Usage
//!
//! ```sh
//! retriever_news parse -i ./data -o structured_articles.csv
//! retriever_news index -s scored_articles.csv
//! retriever_news trend
//! retriever_news stats -i structured_articles.csv
//! ```
//!
//! ## Architecture
//!
//! The `parse` command follows a pipeline architecture:
//! 1. **Discovery**: Glob the export files in the input directory
//! 2. **Parsing**: Split each file into article blocks and extract fields
//! 3. **Deduplication**: Keep the first article for each body text
//! 4. **Output**: Write the table once, atomically
//!
//! Everything runs on a single thread, one file at a time. Any I/O error
//! aborts the run.

use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod config;
mod error;
mod index;
mod models;
mod outputs;
mod parser;
mod pipeline;
mod utils;

use cli::{Cli, Command};
use config::Settings;
use error::Result;

#[tokio::main(flavor = "current_thread")]
async fn main() -> std::result::Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("retriever_news starting up");

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    if let Err(e) = run(args.command).await {
        error!(error = %e, "Run failed; no output written for the failing step");
        return Err(e.into());
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );
    Ok(())
}

#[instrument(level = "debug", skip_all)]
async fn run(command: Command) -> Result<()> {
    match command {
        Command::Parse(args) => {
            let settings = Settings::from_args(&args).await?;
            let summary = pipeline::run_parse(&settings).await?;
            info!(
                files = summary.files,
                articles = summary.written,
                duplicates = summary.duplicates(),
                path = %settings.output.display(),
                "Saved dataset"
            );
        }
        Command::Index(args) => {
            let months =
                index::run_index(&args.scores, &args.articles_output, &args.index_output).await?;
            info!(
                months,
                articles_path = %args.articles_output.display(),
                index_path = %args.index_output.display(),
                "Saved sentiment tables"
            );
        }
        Command::Trend(args) => {
            let months = index::run_trend(&args.index, &args.output).await?;
            info!(months, path = %args.output.display(), "Saved trend series");
        }
        Command::Stats(args) => {
            let stats = pipeline::run_stats(&args.input).await?;
            info!(articles = stats.articles, path = %args.input.display(), "Checked article table");
        }
    }
    Ok(())
}
