//! JSON output of the article table.
//!
//! Records are written as one pretty-printed array using the same field
//! names as the CSV header, with absent fields as `null`.

use crate::error::Result;
use crate::models::ArticleRecord;
use crate::utils::write_atomically;
use std::path::Path;
use tracing::{info, instrument};

/// Write the article table to `path` as a JSON array.
#[instrument(level = "info", skip_all, fields(path = %path.display(), rows = records.len()))]
pub async fn write_articles(records: &[ArticleRecord], path: &Path) -> Result<()> {
    let json = serde_json::to_vec_pretty(records)?;
    write_atomically(path, &json).await?;
    info!("Wrote JSON article table");
    Ok(())
}
