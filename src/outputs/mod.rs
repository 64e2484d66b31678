//! Output generation for the parsed article table and the sentiment index.
//!
//! # Submodules
//!
//! - [`csv`]: Delimited tables, with a UTF-8 BOM for the article table so
//!   spreadsheet tools detect the encoding of Nordic characters
//! - [`json`]: The article table as a JSON array
//!
//! Every writer serializes the full table in memory first and then replaces
//! the destination atomically.

pub mod csv;
pub mod json;

use crate::error::Result;
use crate::models::ArticleRecord;
use clap::ValueEnum;
use serde::Deserialize;
use std::fmt;
use std::path::Path;

/// File format of the article table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Csv,
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Csv => write!(f, "csv"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Write the article table in the requested format.
pub async fn write_articles(
    records: &[ArticleRecord],
    path: &Path,
    format: OutputFormat,
) -> Result<()> {
    match format {
        OutputFormat::Csv => csv::write_articles(records, path).await,
        OutputFormat::Json => json::write_articles(records, path).await,
    }
}
