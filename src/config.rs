//! Resolution of `parse` settings from the CLI and an optional YAML file.
//!
//! A config file may look like:
//!
//! ```yaml
//! input_dir: /data/retriever
//! pattern: "Retriever export-*.txt"
//! output: structured_articles.csv
//! format: csv
//! ```
//!
//! Command-line flags win over the file, and the file wins over the defaults.

use crate::cli::ParseArgs;
use crate::error::{PipelineError, Result};
use crate::outputs::OutputFormat;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, instrument};

pub const DEFAULT_PATTERN: &str = "Retriever export-*.txt";
pub const DEFAULT_OUTPUT: &str = "structured_articles.csv";

/// Contents of the YAML config file. Every key is optional.
#[derive(Debug, Default, Deserialize, PartialEq)]
pub struct FileConfig {
    pub input_dir: Option<PathBuf>,
    pub pattern: Option<String>,
    pub output: Option<PathBuf>,
    pub format: Option<OutputFormat>,
}

/// Fully resolved settings for one `parse` run.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub input_dir: PathBuf,
    pub pattern: String,
    pub output: PathBuf,
    pub format: OutputFormat,
}

#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn load_file_config(path: &Path) -> Result<FileConfig> {
    let raw = fs::read_to_string(path)
        .await
        .map_err(|e| PipelineError::io(path, e))?;
    let config: FileConfig = serde_yaml::from_str(&raw).map_err(|e| PipelineError::Config {
        path: path.to_path_buf(),
        source: e,
    })?;
    info!("Loaded configuration");
    Ok(config)
}

impl Settings {
    /// Merge CLI arguments over file values over defaults.
    pub fn resolve(args: &ParseArgs, file: FileConfig) -> Result<Settings> {
        let input_dir = args
            .input_dir
            .clone()
            .or(file.input_dir)
            .ok_or(PipelineError::MissingSetting { name: "input_dir" })?;
        let pattern = args
            .pattern
            .clone()
            .or(file.pattern)
            .unwrap_or_else(|| DEFAULT_PATTERN.to_string());
        let output = args
            .output
            .clone()
            .or(file.output)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT));
        let format = args.format.or(file.format).unwrap_or_default();

        Ok(Settings {
            input_dir,
            pattern,
            output,
            format,
        })
    }

    /// Read the config file named by `args`, if any, and resolve.
    pub async fn from_args(args: &ParseArgs) -> Result<Settings> {
        let file = match &args.config {
            Some(path) => load_file_config(path).await?,
            None => FileConfig::default(),
        };
        Settings::resolve(args, file)
    }
}
