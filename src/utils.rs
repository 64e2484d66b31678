//! Utility functions for log formatting and file system operations.
//!
//! This module provides helpers used throughout the application:
//! - String truncation for logging long headlines and bodies
//! - Output directory validation before any expensive work starts
//! - Atomic file replacement so a failed run never leaves partial output

use crate::error::{PipelineError, Result};
use std::ffi::OsString;
use std::fs as stdfs;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, instrument, warn};

/// Truncate a string for logging purposes.
///
/// Long strings are cut to `max` characters with an ellipsis and a count of
/// the dropped bytes appended. The cut always lands on a character boundary,
/// which matters for Swedish text.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log("åäö", 2), "åä…(+2 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        None => s.to_string(),
        Some((cut, _)) => format!("{}…(+{} bytes)", &s[..cut], s.len() - cut),
    }
}

/// Directory an output file will be written into.
fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Ensure the directory that will hold `output` exists and is writable.
///
/// This function creates the directory if it doesn't exist, then performs
/// a write test by creating and immediately deleting a probe file.
///
/// # Errors
///
/// Returns an error if:
/// - The directory cannot be created
/// - The directory is not writable (permission denied, read-only filesystem, etc.)
#[instrument(level = "info", skip_all, fields(output = %output.display()))]
pub async fn ensure_writable_dir(output: &Path) -> Result<()> {
    let dir = parent_dir(output);
    fs::create_dir_all(&dir)
        .await
        .map_err(|e| PipelineError::io(&dir, e))?;
    // Try a small sync write using std fs (simpler error surface)
    let probe_path = dir.join("..__probe_write__");
    match stdfs::File::create(&probe_path) {
        Ok(_) => {
            let _ = stdfs::remove_file(&probe_path);
            info!(dir = %dir.display(), "Output directory is writable");
            Ok(())
        }
        Err(e) => Err(PipelineError::io(&dir, e)),
    }
}

/// Sibling `.tmp` path that `path` is staged under.
fn tmp_path_for(path: &Path) -> PathBuf {
    let mut tmp_name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("output"));
    tmp_name.push(".tmp");
    parent_dir(path).join(tmp_name)
}

/// Replace `path` with `contents` in one step.
///
/// The bytes go to a sibling `.tmp` file first, which is then renamed over
/// the destination.
#[instrument(level = "debug", skip_all, fields(path = %path.display(), bytes = contents.len()))]
pub async fn write_atomically(path: &Path, contents: &[u8]) -> Result<()> {
    write_all_atomically(&[(path, contents)]).await
}

/// Replace several files together.
///
/// Every file is staged before any destination is touched. If staging fails
/// the staged files are removed and no destination changes. Renames happen
/// only after all files are staged.
#[instrument(level = "debug", skip_all, fields(files = files.len()))]
pub async fn write_all_atomically(files: &[(&Path, &[u8])]) -> Result<()> {
    let mut staged: Vec<PathBuf> = Vec::with_capacity(files.len());
    for &(path, contents) in files {
        let tmp_path = tmp_path_for(path);
        if let Err(e) = fs::write(&tmp_path, contents).await {
            for tmp in &staged {
                let _ = fs::remove_file(tmp).await;
            }
            return Err(PipelineError::io(&tmp_path, e));
        }
        staged.push(tmp_path);
    }

    for (i, (&(path, _), tmp_path)) in files.iter().zip(&staged).enumerate() {
        if let Err(e) = fs::rename(tmp_path, path).await {
            for tmp in &staged[i..] {
                let _ = fs::remove_file(tmp).await;
            }
            if i > 0 {
                warn!(
                    replaced = i,
                    failed = %path.display(),
                    "Some output files were replaced before a rename failed"
                );
            }
            return Err(PipelineError::io(path, e));
        }
        debug!(path = %path.display(), "Renamed temporary file into place");
    }
    Ok(())
}
