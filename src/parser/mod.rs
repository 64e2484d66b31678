//! Parser for Retriever plain-text exports.
//!
//! A Retriever export concatenates many articles into one text file:
//!
//! ```text
//! Nyheter:
//! Regeringen höjer anslagen
//! DN, 2021-05-03 06:00
//! Publicerat på webb
//! Första stycket.
//! Andra stycket.
//! © Dagens Nyheter 2021
//! ==============================================================================
//! Nästa rubrik
//! ...
//! ```
//!
//! Parsing is a pure function of the text and never fails: a block that is
//! missing its byline or publication tag still yields a record, with those
//! fields left empty.
//!
//! # Submodules
//!
//! - [`byline`]: Locates the `"Publisher, date"` line
//! - [`body`]: Decides where the body starts and strips footers

pub mod body;
pub mod byline;

use crate::models::ArticleRecord;
use crate::utils::truncate_for_log;
use body::{body_start, extract_body};
use byline::locate_byline;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, instrument, trace};

static HEADER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]*Nyheter:[^\n]*\n?").unwrap());
static SEPARATOR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^[ \t]*=+[ \t]*$").unwrap());
static PUBLICATION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Publicerat\s+(på|i)\s+(\w+)").unwrap());
static LINK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"https?://\S+").unwrap());

/// Parse a whole export file into article records, in file order.
#[instrument(level = "debug", skip_all, fields(bytes = raw.len()))]
pub fn parse_export(raw: &str) -> Vec<ArticleRecord> {
    let normalized = raw.replace("\r\n", "\n").replace('\r', "\n");
    let records: Vec<ArticleRecord> = split_blocks(&normalized)
        .into_iter()
        .filter_map(|block| parse_block(&block))
        .collect();
    debug!(count = records.len(), "Parsed export");
    records
}

/// Strip the `Nyheter:` header lines and cut the text on `====` separator
/// lines. Returned blocks are trimmed and never empty.
pub fn split_blocks(raw: &str) -> Vec<String> {
    let stripped = HEADER_RE.replace_all(raw, "");
    SEPARATOR_RE
        .split(&stripped)
        .map(str::trim)
        .filter(|block| !block.is_empty())
        .map(str::to_string)
        .collect()
}

/// Build one record from one article block.
///
/// Returns `None` only when the block holds no non-blank line.
pub fn parse_block(block: &str) -> Option<ArticleRecord> {
    let lines: Vec<&str> = block
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();
    let title = *lines.first()?;

    let byline = locate_byline(&lines);

    let publication_type = PUBLICATION_RE
        .captures(block)
        .map(|caps| format!("{} {}", &caps[1], &caps[2]));
    let publication_anchor = publication_type
        .as_ref()
        .and_then(|_| lines.iter().position(|line| PUBLICATION_RE.is_match(line)));

    let link = LINK_RE.find(block).map(|m| m.as_str().to_string());

    let start = body_start(publication_anchor, &byline);
    let text = extract_body(&lines, start);

    trace!(
        title = %truncate_for_log(title, 80),
        ?byline,
        ?publication_anchor,
        start,
        "Parsed article block"
    );

    Some(ArticleRecord {
        title: title.to_string(),
        publisher: byline.publisher().map(str::to_string),
        date: byline.date().map(str::to_string),
        publication_type,
        text,
        link,
    })
}
