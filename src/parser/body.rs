//! Body text reconstruction.
//!
//! The body runs from just after the last metadata line up to the first
//! footer line. Retriever footers start with a copyright sign, an
//! "Alla artiklar ..." rights notice or an image caption.

use super::byline::Byline;
use once_cell::sync::Lazy;
use regex::Regex;

static WEB_ARTICLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Se webartikeln på\s*http").unwrap());

/// What the scanner does with one candidate body line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineAction {
    Keep,
    Skip,
    Stop,
}

fn classify(line: &str) -> LineAction {
    if line.starts_with('©')
        || line.contains("Alla artiklar")
        || line.to_lowercase().starts_with("bildtext")
    {
        LineAction::Stop
    } else if WEB_ARTICLE_RE.is_match(line)
        || line.starts_with("http://")
        || line.starts_with("https://")
    {
        LineAction::Skip
    } else {
        LineAction::Keep
    }
}

/// Index of the first body line.
///
/// The publication-type line wins over the byline; with neither, only the
/// title is skipped.
pub fn body_start(publication_anchor: Option<usize>, byline: &Byline<'_>) -> usize {
    publication_anchor
        .or(byline.index())
        .map_or(1, |anchor| anchor + 1)
}

/// Collect body lines from `start` and join them as blank-line separated
/// paragraphs.
pub fn extract_body(lines: &[&str], start: usize) -> String {
    let mut paragraphs = Vec::new();
    for &line in lines.iter().skip(start) {
        match classify(line) {
            LineAction::Stop => break,
            LineAction::Skip => continue,
            LineAction::Keep => paragraphs.push(line),
        }
    }
    paragraphs.join("\n\n").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_start_precedence() {
        let found = Byline::Found {
            index: 2,
            publisher: "DN",
            date: "2021-05-03",
        };
        assert_eq!(body_start(Some(3), &found), 4);
        assert_eq!(body_start(Some(1), &found), 2);
        assert_eq!(body_start(None, &found), 3);
        assert_eq!(body_start(None, &Byline::NotFound), 1);
    }

    #[test]
    fn test_extract_body_stops_at_copyright() {
        let lines = ["Rubrik", "Ett.", "© DN", "Efter foten."];
        assert_eq!(extract_body(&lines, 1), "Ett.");
    }

    #[test]
    fn test_extract_body_stops_at_rights_notice() {
        let lines = ["Rubrik", "Ett.", "Alla artiklar är skyddade av upphovsrättslagen.", "Två."];
        assert_eq!(extract_body(&lines, 1), "Ett.");
    }

    #[test]
    fn test_extract_body_stops_at_caption_any_case() {
        let lines = ["Rubrik", "Ett.", "BILDTEXT: Finansministern.", "Två."];
        assert_eq!(extract_body(&lines, 1), "Ett.");
        let lines = ["Rubrik", "Bildtext", "Två."];
        assert_eq!(extract_body(&lines, 1), "");
    }

    #[test]
    fn test_extract_body_skips_links() {
        let lines = [
            "Rubrik",
            "Ett.",
            "Se webartikeln på https://www.dn.se/a",
            "https://www.dn.se/a",
            "Två.",
        ];
        assert_eq!(extract_body(&lines, 1), "Ett.\n\nTvå.");
    }

    #[test]
    fn test_extract_body_keeps_inline_links() {
        let lines = ["Rubrik", "Läs mer på https://www.dn.se/a i morgon."];
        assert_eq!(
            extract_body(&lines, 1),
            "Läs mer på https://www.dn.se/a i morgon."
        );
    }

    #[test]
    fn test_extract_body_start_past_end() {
        let lines = ["Rubrik"];
        assert_eq!(extract_body(&lines, 1), "");
        assert_eq!(extract_body(&lines, 5), "");
    }
}
