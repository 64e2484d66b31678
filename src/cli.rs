//! Command-line interface definitions for Retriever News.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! Paths can be provided via command-line flags, environment variables or,
//! for `parse`, a YAML config file (see [`crate::config`]).

use crate::outputs::OutputFormat;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Command-line arguments for the Retriever News application.
///
/// # Examples
///
/// ```sh
/// # Parse every "Retriever export-*.txt" in ./data
/// retriever_news parse -i ./data
///
/// # Same, reading paths from a config file and writing JSON
/// retriever_news parse -c retriever.yaml -f json -o articles.json
///
/// # Aggregate externally computed similarity scores into the monthly index
/// retriever_news index -s scored_articles.csv
///
/// # Derive the trend lines of the monthly index
/// retriever_news trend -x fiscal_sentiment_index.csv
///
/// # Check how many parsed articles carry a byline, tag and link
/// retriever_news stats -i structured_articles.csv
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Parse raw export files into one deduplicated article table
    Parse(ParseArgs),
    /// Compute article sentiment and the monthly fiscal sentiment index
    Index(IndexArgs),
    /// Compute the linear trend and 12-month rolling mean of the index
    Trend(TrendArgs),
    /// Read a parsed article table back and report field coverage
    Stats(StatsArgs),
}

#[derive(Args, Debug)]
pub struct ParseArgs {
    /// Directory holding the raw export text files
    #[arg(short, long, env = "RETRIEVER_INPUT_DIR")]
    pub input_dir: Option<PathBuf>,

    /// Glob pattern selecting export files inside the input directory
    #[arg(short, long)]
    pub pattern: Option<String>,

    /// Output file for the article table
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Optional path to a YAML config file
    #[arg(short, long, env = "RETRIEVER_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct IndexArgs {
    /// CSV with Date, similarity_positive and similarity_negative columns
    #[arg(short, long)]
    pub scores: PathBuf,

    /// Output file for per-article sentiment
    #[arg(long, default_value = "articles_with_sentiment.csv")]
    pub articles_output: PathBuf,

    /// Output file for the monthly index
    #[arg(long, default_value = "fiscal_sentiment_index.csv")]
    pub index_output: PathBuf,
}

#[derive(Args, Debug)]
pub struct TrendArgs {
    /// Monthly index CSV written by the `index` command
    #[arg(short = 'x', long, default_value = "fiscal_sentiment_index.csv")]
    pub index: PathBuf,

    /// Output file for the trend series
    #[arg(short, long, default_value = "fiscal_sentiment_trend.csv")]
    pub output: PathBuf,
}

#[derive(Args, Debug)]
pub struct StatsArgs {
    /// Article table CSV written by the `parse` command
    #[arg(short, long, default_value = "structured_articles.csv")]
    pub input: PathBuf,
}
