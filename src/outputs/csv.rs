//! CSV reading and writing.
//!
//! The article table is written with a leading UTF-8 byte-order mark and `\n`
//! line endings. Absent fields become empty cells and read back as `None`.
//! The index tables share the same helpers but are written without a BOM.

use crate::error::{PipelineError, Result};
use crate::models::ArticleRecord;
use crate::utils::write_atomically;
use csv::{ReaderBuilder, Terminator, WriterBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Column order of the article table.
pub const ARTICLE_COLUMNS: [&str; 6] = [
    "Title",
    "Publisher",
    "Date",
    "PublicationType",
    "Text",
    "Link",
];

/// Serialize `rows` under an explicit header row.
///
/// The header is written even when `rows` is empty.
pub fn encode_rows<T: Serialize>(
    rows: &[T],
    columns: &[&str],
    with_bom: bool,
) -> std::result::Result<Vec<u8>, csv::Error> {
    let buf = if with_bom { UTF8_BOM.to_vec() } else { Vec::new() };
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(buf);
    writer.write_record(columns)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    writer.into_inner().map_err(|e| e.into_error().into())
}

/// Deserialize rows from CSV bytes, ignoring a leading BOM.
pub fn decode_rows<T: DeserializeOwned>(bytes: &[u8]) -> std::result::Result<Vec<T>, csv::Error> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    ReaderBuilder::new()
        .has_headers(true)
        .from_reader(bytes)
        .deserialize()
        .collect()
}

/// Write `rows` to `path` as one atomic file replacement.
#[instrument(level = "info", skip_all, fields(path = %path.display(), rows = rows.len()))]
pub async fn write_rows<T: Serialize>(
    rows: &[T],
    columns: &[&str],
    with_bom: bool,
    path: &Path,
) -> Result<()> {
    let bytes = encode_rows(rows, columns, with_bom).map_err(|e| PipelineError::csv(path, e))?;
    write_atomically(path, &bytes).await?;
    info!("Wrote CSV");
    Ok(())
}

/// Read every row of the CSV file at `path`.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn read_rows<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let bytes = fs::read(path)
        .await
        .map_err(|e| PipelineError::io(path, e))?;
    let rows: Vec<T> = decode_rows(&bytes).map_err(|e| PipelineError::csv(path, e))?;
    info!(rows = rows.len(), "Read CSV");
    Ok(rows)
}

/// Write the article table as UTF-8 CSV with BOM.
pub async fn write_articles(records: &[ArticleRecord], path: &Path) -> Result<()> {
    write_rows(records, &ARTICLE_COLUMNS, true, path).await
}

/// Read an article table previously written by [`write_articles`].
pub async fn read_articles(path: &Path) -> Result<Vec<ArticleRecord>> {
    read_rows(path).await
}
