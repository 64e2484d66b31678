//! Multi-file orchestration of the article parser.
//!
//! A run follows the same two phases for every corpus:
//!
//! 1. **Discovery**: Find the export files matching the glob pattern
//! 2. **Parsing**: Read and parse each file in turn, then deduplicate
//!
//! Files are handled strictly one after the other in sorted path order, so
//! the path order decides which copy of a duplicated article survives. Any
//! read failure aborts the run before an output file is touched.

use crate::config::Settings;
use crate::error::{PipelineError, Result};
use crate::models::ArticleRecord;
use crate::outputs;
use crate::outputs::csv::read_articles;
use crate::parser::parse_export;
use crate::utils::ensure_writable_dir;
use itertools::Itertools;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, instrument};

/// Counts reported at the end of a `parse` run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseSummary {
    pub files: usize,
    pub parsed: usize,
    pub written: usize,
}

impl ParseSummary {
    pub fn duplicates(&self) -> usize {
        self.parsed - self.written
    }
}

/// Find the export files in `dir` matching `pattern`, sorted by path.
///
/// # Errors
///
/// Fails when `dir` does not exist or is not a directory, when it cannot be
/// inspected, when the pattern is invalid, or when nothing matches.
#[instrument(level = "info", skip_all, fields(dir = %dir.display(), %pattern))]
pub async fn collect_export_files(dir: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let is_dir = match fs::metadata(dir).await {
        Ok(meta) => meta.is_dir(),
        Err(e) if e.kind() == ErrorKind::NotFound => false,
        Err(e) => return Err(PipelineError::io(dir, e)),
    };
    if !is_dir {
        return Err(PipelineError::MissingInputDir {
            path: dir.to_path_buf(),
        });
    }

    let full_pattern = format!(
        "{}/{}",
        glob::Pattern::escape(&dir.to_string_lossy()),
        pattern
    );
    let mut files = glob::glob(&full_pattern)?
        .collect::<std::result::Result<Vec<PathBuf>, glob::GlobError>>()?;
    files.retain(|path| path.is_file());
    files.sort();

    if files.is_empty() {
        return Err(PipelineError::NoInputFiles {
            dir: dir.to_path_buf(),
            pattern: pattern.to_string(),
        });
    }

    info!(count = files.len(), "Found export files");
    debug!(files = ?files, "Export files");
    Ok(files)
}

/// Parse one export file.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn parse_export_file(path: &Path) -> Result<Vec<ArticleRecord>> {
    let raw = fs::read_to_string(path)
        .await
        .map_err(|e| PipelineError::io(path, e))?;
    let raw = raw.strip_prefix('\u{FEFF}').unwrap_or(&raw);
    let records = parse_export(raw);
    info!(count = records.len(), "Parsed export file");
    Ok(records)
}

/// Parse every file in order and concatenate the records.
pub async fn parse_export_files(paths: &[PathBuf]) -> Result<Vec<ArticleRecord>> {
    let mut records = Vec::new();
    for path in paths {
        records.extend(parse_export_file(path).await?);
    }
    Ok(records)
}

/// Drop records whose body text was already seen, keeping the first.
pub fn dedupe_by_text(records: Vec<ArticleRecord>) -> Vec<ArticleRecord> {
    records
        .into_iter()
        .unique_by(|record| record.text.clone())
        .collect()
}

/// Run the whole `parse` command: discover, parse, deduplicate, write.
#[instrument(level = "info", skip_all, fields(input_dir = %settings.input_dir.display(), output = %settings.output.display(), format = %settings.format))]
pub async fn run_parse(settings: &Settings) -> Result<ParseSummary> {
    let files = collect_export_files(&settings.input_dir, &settings.pattern).await?;
    ensure_writable_dir(&settings.output).await?;

    let records = parse_export_files(&files).await?;
    let parsed = records.len();

    let unique = dedupe_by_text(records);
    let summary = ParseSummary {
        files: files.len(),
        parsed,
        written: unique.len(),
    };
    info!(
        parsed = summary.parsed,
        duplicates = summary.duplicates(),
        "Deduplicated articles by body text"
    );

    outputs::write_articles(&unique, &settings.output, settings.format).await?;
    info!(articles = summary.written, "Saved article table");
    Ok(summary)
}

/// Field coverage of a written article table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableStats {
    pub articles: usize,
    pub with_publisher: usize,
    pub with_date: usize,
    pub with_publication_type: usize,
    pub with_link: usize,
    pub empty_text: usize,
}

impl TableStats {
    pub fn from_records(records: &[ArticleRecord]) -> Self {
        records.iter().fold(
            TableStats {
                articles: records.len(),
                ..TableStats::default()
            },
            |mut stats, record| {
                stats.with_publisher += usize::from(record.publisher.is_some());
                stats.with_date += usize::from(record.date.is_some());
                stats.with_publication_type += usize::from(record.publication_type.is_some());
                stats.with_link += usize::from(record.link.is_some());
                stats.empty_text += usize::from(record.text.is_empty());
                stats
            },
        )
    }
}

/// Run the `stats` command: read an article table back and count how many
/// records carry each optional field.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn run_stats(path: &Path) -> Result<TableStats> {
    let records = read_articles(path).await?;
    let stats = TableStats::from_records(&records);
    info!(
        articles = stats.articles,
        with_publisher = stats.with_publisher,
        with_date = stats.with_date,
        with_publication_type = stats.with_publication_type,
        with_link = stats.with_link,
        empty_text = stats.empty_text,
        "Summarized article table"
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outputs::OutputFormat;

    const SEPARATOR: &str = "==============================================================================";

    fn record(title: &str, text: &str) -> ArticleRecord {
        ArticleRecord {
            title: title.to_string(),
            publisher: None,
            date: None,
            publication_type: None,
            text: text.to_string(),
            link: None,
        }
    }

    fn export(articles: &[(&str, &str, &str)]) -> String {
        let mut raw = String::from("Nyheter:\n");
        for (title, byline, body) in articles {
            raw.push_str(&format!(
                "{title}\n{byline}\nPublicerat på webb\n{body}\n© Retriever\n{SEPARATOR}\n\n"
            ));
        }
        raw
    }

    #[test]
    fn test_dedupe_by_text_keeps_first() {
        let records = vec![
            record("Första", "Samma text."),
            record("Annan", "Annan text."),
            record("Andra", "Samma text."),
        ];
        let unique = dedupe_by_text(records);
        assert_eq!(unique.len(), 2);
        assert_eq!(unique[0].title, "Första");
        assert_eq!(unique[1].title, "Annan");
    }

    #[test]
    fn test_dedupe_by_text_collapses_empty_bodies() {
        let records = vec![record("A", ""), record("B", ""), record("C", "x")];
        let titles: Vec<String> = dedupe_by_text(records).into_iter().map(|r| r.title).collect();
        assert_eq!(titles, vec!["A", "C"]);
    }

    #[tokio::test]
    async fn test_collect_export_files_sorted_and_filtered() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("Retriever export-2.txt"), "").unwrap();
        std::fs::write(tmp.path().join("Retriever export-1.txt"), "").unwrap();
        std::fs::write(tmp.path().join("notes.txt"), "").unwrap();

        let files = collect_export_files(tmp.path(), "Retriever export-*.txt")
            .await
            .unwrap();
        let names: Vec<String> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["Retriever export-1.txt", "Retriever export-2.txt"]);
    }

    #[tokio::test]
    async fn test_collect_export_files_missing_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let err = collect_export_files(&tmp.path().join("absent"), "*.txt")
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::MissingInputDir { .. }));
    }

    #[tokio::test]
    async fn test_collect_export_files_not_a_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("Retriever export-1.txt");
        std::fs::write(&file, "").unwrap();
        let err = collect_export_files(&file, "*.txt").await.unwrap_err();
        assert!(matches!(err, PipelineError::MissingInputDir { .. }));
    }

    #[tokio::test]
    async fn test_collect_export_files_uninspectable_dir_is_io_error() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("plain.txt");
        std::fs::write(&file, "").unwrap();
        // A path through a regular file fails with ENOTDIR, not ENOENT.
        let err = collect_export_files(&file.join("data"), "*.txt")
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Io { .. }));
    }

    #[tokio::test]
    async fn test_collect_export_files_no_match() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("other.txt"), "").unwrap();
        let err = collect_export_files(tmp.path(), "Retriever export-*.txt")
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::NoInputFiles { .. }));
    }

    #[tokio::test]
    async fn test_parse_export_file_strips_bom() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("Retriever export-1.txt");
        std::fs::write(&path, format!("\u{FEFF}{}", export(&[("Rubrik", "DN, 2021-05-03", "Text.")]))).unwrap();

        let records = parse_export_file(&path).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "Rubrik");
    }

    #[tokio::test]
    async fn test_parse_export_file_rejects_invalid_utf8() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("Retriever export-1.txt");
        std::fs::write(&path, [0x66, 0xFF, 0xFE, 0x0A]).unwrap();

        let err = parse_export_file(&path).await.unwrap_err();
        assert!(matches!(err, PipelineError::Io { .. }));
    }

    #[tokio::test]
    async fn test_run_parse_end_to_end() {
        let tmp = tempfile::tempdir().unwrap();
        let input = tmp.path().join("data");
        std::fs::create_dir(&input).unwrap();
        std::fs::write(
            input.join("Retriever export-1.txt"),
            export(&[
                ("Budgeten växer", "DN, 2021-09-20 07:30", "Utgifterna ökar."),
                ("Kommunerna sparar", "Sydsvenskan, 2021-10-01", "Nedskärningar."),
            ]),
        )
        .unwrap();
        std::fs::write(
            input.join("Retriever export-2.txt"),
            export(&[
                ("Samma sak, ny rubrik", "SvD, 2021-09-21", "Utgifterna ökar."),
                ("Skatterna sänks", "Expressen, 2021-11-02", "Jobbskatteavdrag."),
            ]),
        )
        .unwrap();

        let output = tmp.path().join("out/structured_articles.csv");
        let settings = Settings {
            input_dir: input,
            pattern: "Retriever export-*.txt".to_string(),
            output: output.clone(),
            format: OutputFormat::Csv,
        };

        let summary = run_parse(&settings).await.unwrap();
        assert_eq!(
            summary,
            ParseSummary {
                files: 2,
                parsed: 4,
                written: 3
            }
        );
        assert_eq!(summary.duplicates(), 1);

        let restored = read_articles(&output).await.unwrap();
        let titles: Vec<&str> = restored.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(
            titles,
            vec!["Budgeten växer", "Kommunerna sparar", "Skatterna sänks"]
        );
        assert_eq!(restored[0].publisher.as_deref(), Some("DN"));
        assert_eq!(restored[0].date.as_deref(), Some("2021-09-20 07:30"));
        assert_eq!(restored[0].publication_type.as_deref(), Some("på webb"));
        assert_eq!(restored[0].text, "Utgifterna ökar.");
    }

    #[tokio::test]
    async fn test_run_parse_failure_writes_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        let output = tmp.path().join("structured_articles.csv");
        let settings = Settings {
            input_dir: tmp.path().join("absent"),
            pattern: "*.txt".to_string(),
            output: output.clone(),
            format: OutputFormat::Csv,
        };

        assert!(run_parse(&settings).await.is_err());
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn test_run_parse_missing_input_creates_no_output_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let out_dir = tmp.path().join("out/nested");
        let settings = Settings {
            input_dir: tmp.path().join("absent"),
            pattern: "*.txt".to_string(),
            output: out_dir.join("structured_articles.csv"),
            format: OutputFormat::Csv,
        };

        let err = run_parse(&settings).await.unwrap_err();
        assert!(matches!(err, PipelineError::MissingInputDir { .. }));
        assert!(!tmp.path().join("out").exists());
    }

    #[test]
    fn test_table_stats_counts_fields() {
        let mut full = record("Budgeten", "Text.");
        full.publisher = Some("DN".to_string());
        full.date = Some("2021-05-03".to_string());
        full.link = Some("https://www.dn.se/a".to_string());
        let stats = TableStats::from_records(&[full, record("Tom", "")]);
        assert_eq!(
            stats,
            TableStats {
                articles: 2,
                with_publisher: 1,
                with_date: 1,
                with_publication_type: 0,
                with_link: 1,
                empty_text: 1,
            }
        );
    }

    #[tokio::test]
    async fn test_run_stats_reads_written_table() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("structured_articles.csv");
        let mut dated = record("Budgeten", "Text.");
        dated.date = Some("2021-05-03".to_string());
        outputs::csv::write_articles(&[dated, record("Tom", "")], &path)
            .await
            .unwrap();

        let stats = run_stats(&path).await.unwrap();
        assert_eq!(stats.articles, 2);
        assert_eq!(stats.with_date, 1);
        assert_eq!(stats.empty_text, 1);
    }
}
