//! Detection of the `"Publisher, YYYY-MM-DD[ HH:MM]"` line.
//!
//! Retriever puts the byline directly under the headline, but a subtitle or
//! an author line sometimes sits in between. The byline is therefore looked
//! up over a short, ordered list of candidate lines and the first match wins.

use once_cell::sync::Lazy;
use regex::Regex;

static BYLINE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?P<publisher>[\wÅÄÖåäöéÉüÜæÆøØçÇ.\-&\s]+?),\s*(?P<date>\d{4}-\d{2}-\d{2}(?:\s*\d{2}:\d{2})?)\s*$",
    )
    .unwrap()
});

/// Line indices tried for the byline, in priority order. Index 0 is the title.
const CANDIDATE_LINES: [usize; 3] = [1, 2, 3];

/// Outcome of the byline search over one article block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Byline<'a> {
    /// The byline was found on line `index`.
    Found {
        index: usize,
        publisher: &'a str,
        date: &'a str,
    },
    NotFound,
}

impl<'a> Byline<'a> {
    pub fn publisher(&self) -> Option<&'a str> {
        match self {
            Byline::Found { publisher, .. } => Some(publisher),
            Byline::NotFound => None,
        }
    }

    pub fn date(&self) -> Option<&'a str> {
        match self {
            Byline::Found { date, .. } => Some(date),
            Byline::NotFound => None,
        }
    }

    pub fn index(&self) -> Option<usize> {
        match self {
            Byline::Found { index, .. } => Some(*index),
            Byline::NotFound => None,
        }
    }
}

/// Match a single line against the byline pattern.
pub fn match_byline(line: &str) -> Option<(&str, &str)> {
    let caps = BYLINE_RE.captures(line)?;
    let publisher = caps.name("publisher")?.as_str().trim();
    let date = caps.name("date")?.as_str().trim();
    Some((publisher, date))
}

/// Find the byline among the candidate lines of a block.
///
/// `lines` are the block's non-blank trimmed lines, title first.
pub fn locate_byline<'a>(lines: &[&'a str]) -> Byline<'a> {
    CANDIDATE_LINES
        .iter()
        .copied()
        .filter(|&index| index < lines.len())
        .find_map(|index| {
            match_byline(lines[index]).map(|(publisher, date)| Byline::Found {
                index,
                publisher,
                date,
            })
        })
        .unwrap_or(Byline::NotFound)
}
