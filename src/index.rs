//! Fiscal sentiment index.
//!
//! Each article arrives with two cosine similarities computed by an external
//! sentence-embedding model: the best match against a set of expansionary
//! prompts ("Regeringen satsar mer pengar.") and against a set of
//! contractionary ones ("Nedskärningar i budgeten."). From these:
//!
//! ```text
//! relevance        = max(positive, negative)
//! polarity         = positive - negative
//! ArticleSentiment = polarity * relevance
//! ```
//!
//! The index for a month is the mean `ArticleSentiment` of the articles
//! dated in that month. Articles without a date are scored but left out of
//! the aggregate.

use crate::error::{PipelineError, Result};
use crate::models::{MonthlyIndex, ScoredArticle, SentimentRow, TrendPoint};
use crate::outputs::csv::{encode_rows, read_rows, write_rows};
use crate::utils::write_all_atomically;
use chrono::{NaiveDate, NaiveDateTime};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{info, instrument, warn};

pub const SENTIMENT_COLUMNS: [&str; 9] = [
    "Text",
    "Date",
    "ArticleID",
    "similarity_positive",
    "similarity_negative",
    "relevance",
    "polarity",
    "ArticleSentiment",
    "Month",
];
pub const INDEX_COLUMNS: [&str; 2] = ["Month", "FiscalSentimentIndex"];
pub const TREND_COLUMNS: [&str; 4] = [
    "Month",
    "FiscalSentimentIndex",
    "LinearTrend",
    "RollingMean12",
];

/// Width of the centered rolling mean, in months.
pub const ROLLING_WINDOW: usize = 12;

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Parse the raw date strings the article parser emits.
///
/// Returns `None` for anything that is not one of the accepted layouts.
pub fn parse_article_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|dt| dt.date())
        .or_else(|| NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok())
}

/// Read the externally scored article table.
pub async fn read_scored_articles(path: &Path) -> Result<Vec<ScoredArticle>> {
    read_rows(path).await
}

/// Derive sentiment values and the month key for every article.
///
/// Rows are numbered from zero; the number stands in for a missing
/// `ArticleID` and appears in date errors.
pub fn score_articles(articles: Vec<ScoredArticle>) -> Result<Vec<SentimentRow>> {
    articles
        .into_iter()
        .enumerate()
        .map(|(row, article)| -> Result<SentimentRow> {
            let date = article.date.filter(|d| !d.trim().is_empty());
            let month = match &date {
                Some(raw) => {
                    let parsed = parse_article_date(raw).ok_or_else(|| {
                        PipelineError::InvalidDate {
                            row,
                            value: raw.clone(),
                        }
                    })?;
                    Some(parsed.format("%Y-%m").to_string())
                }
                None => None,
            };

            let positive = article.similarity_positive;
            let negative = article.similarity_negative;
            let relevance = positive.max(negative);
            let polarity = positive - negative;

            Ok(SentimentRow {
                text: article.text,
                date,
                article_id: article.article_id.unwrap_or(row),
                similarity_positive: positive,
                similarity_negative: negative,
                relevance,
                polarity,
                article_sentiment: polarity * relevance,
                month,
            })
        })
        .collect()
}

/// Mean article sentiment per month, in ascending month order.
pub fn monthly_index(rows: &[SentimentRow]) -> Vec<MonthlyIndex> {
    let mut by_month: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
    for row in rows {
        if let Some(month) = row.month.as_deref() {
            let entry = by_month.entry(month).or_insert((0.0, 0));
            entry.0 += row.article_sentiment;
            entry.1 += 1;
        }
    }

    by_month
        .into_iter()
        .map(|(month, (sum, count))| MonthlyIndex {
            month: month.to_string(),
            fiscal_sentiment_index: sum / count as f64,
        })
        .collect()
}

/// Least-squares straight line through `values` at positions `0..n`,
/// evaluated at each position.
pub fn linear_trend(values: &[f64]) -> Vec<f64> {
    let n = values.len();
    if n < 2 {
        return values.to_vec();
    }
    let n_f = n as f64;
    let mean_x = (n_f - 1.0) / 2.0;
    let mean_y = values.iter().sum::<f64>() / n_f;

    let (mut sxy, mut sxx) = (0.0, 0.0);
    for (i, y) in values.iter().enumerate() {
        let dx = i as f64 - mean_x;
        sxy += dx * (y - mean_y);
        sxx += dx * dx;
    }
    let slope = sxy / sxx;
    let intercept = mean_y - slope * mean_x;

    (0..n).map(|i| intercept + slope * i as f64).collect()
}

/// Centered rolling mean over `window` positions.
///
/// For an even window the extra position falls before the centre, so with
/// 12 months position `i` averages `i - 6 ..= i + 5`. Positions whose window
/// runs off either end are `None`.
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<Option<f64>> {
    let n = values.len();
    let offset = window.saturating_sub(1) / 2;
    (0..n)
        .map(|i| {
            let end = i + 1 + offset;
            if window == 0 || end < window || end > n {
                return None;
            }
            let slice = &values[end - window..end];
            Some(slice.iter().sum::<f64>() / window as f64)
        })
        .collect()
}

/// Attach the linear trend and the 12-month rolling mean to the index.
pub fn trend_series(index: &[MonthlyIndex]) -> Vec<TrendPoint> {
    let values: Vec<f64> = index.iter().map(|m| m.fiscal_sentiment_index).collect();
    let trend = linear_trend(&values);
    let rolling = rolling_mean(&values, ROLLING_WINDOW);

    index
        .iter()
        .zip(trend)
        .zip(rolling)
        .map(|((month, linear_trend), rolling_mean_12)| TrendPoint {
            month: month.month.clone(),
            fiscal_sentiment_index: month.fiscal_sentiment_index,
            linear_trend,
            rolling_mean_12,
        })
        .collect()
}

/// Run the `index` command: score articles and write both tables.
#[instrument(level = "info", skip_all, fields(scores = %scores.display()))]
pub async fn run_index(scores: &Path, articles_output: &Path, index_output: &Path) -> Result<usize> {
    let articles = read_scored_articles(scores).await?;
    let rows = score_articles(articles)?;

    let undated = rows.iter().filter(|row| row.month.is_none()).count();
    if undated > 0 {
        warn!(undated, "Articles without a date are left out of the monthly index");
    }

    let index = monthly_index(&rows);
    info!(articles = rows.len(), months = index.len(), "Computed fiscal sentiment index");

    let articles_csv = encode_rows(&rows, &SENTIMENT_COLUMNS, false)
        .map_err(|e| PipelineError::csv(articles_output, e))?;
    let index_csv = encode_rows(&index, &INDEX_COLUMNS, false)
        .map_err(|e| PipelineError::csv(index_output, e))?;
    write_all_atomically(&[
        (articles_output, articles_csv.as_slice()),
        (index_output, index_csv.as_slice()),
    ])
    .await?;
    info!(
        articles_path = %articles_output.display(),
        index_path = %index_output.display(),
        "Wrote sentiment tables"
    );
    Ok(index.len())
}

/// Run the `trend` command over a previously written monthly index.
#[instrument(level = "info", skip_all, fields(index = %index_path.display()))]
pub async fn run_trend(index_path: &Path, output: &Path) -> Result<usize> {
    let mut index: Vec<MonthlyIndex> = read_rows(index_path).await?;
    index.sort_by(|a, b| a.month.cmp(&b.month));
    let series = trend_series(&index);

    let with_rolling = series.iter().filter(|p| p.rolling_mean_12.is_some()).count();
    info!(months = series.len(), with_rolling, "Computed trend series");

    write_rows(&series, &TREND_COLUMNS, false, output).await?;
    Ok(series.len())
}
