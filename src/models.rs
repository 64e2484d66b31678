//! Data models for parsed articles and the sentiment index derived from them.
//!
//! This module defines the tabular records the pipeline reads and writes:
//! - [`ArticleRecord`]: One article recovered from a Retriever text export
//! - [`ScoredArticle`]: An article with externally computed similarity scores
//! - [`SentimentRow`]: A scored article with its derived sentiment and month
//! - [`MonthlyIndex`] and [`TrendPoint`]: The aggregated monthly series
//!
//! Column names are fixed by the downstream analysis scripts, so every field
//! carries an explicit `#[serde(rename)]`.

use serde::{Deserialize, Serialize};

/// A single article parsed out of a raw export file.
///
/// Only `title` is guaranteed. Every other field is `None` when the parser
/// could not find the corresponding pattern in the article block.
///
/// # Fields
///
/// * `title` - First non-blank line of the block
/// * `publisher` / `date` - Taken together from a `"Publisher, YYYY-MM-DD"` line
/// * `publication_type` - `"på webb"`, `"i print"` and similar
/// * `text` - Body paragraphs separated by blank lines
/// * `link` - First URL anywhere in the block
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ArticleRecord {
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Publisher")]
    pub publisher: Option<String>,
    /// Raw date string as written in the export (`YYYY-MM-DD[ HH:MM]`).
    #[serde(rename = "Date")]
    pub date: Option<String>,
    #[serde(rename = "PublicationType")]
    pub publication_type: Option<String>,
    #[serde(rename = "Text")]
    pub text: String,
    #[serde(rename = "Link")]
    pub link: Option<String>,
}

/// An article row with similarity scores against the positive and negative
/// fiscal prompts.
///
/// The scores are produced outside this crate by a sentence-embedding model.
/// `ArticleID` and `Text` are optional input columns.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ScoredArticle {
    #[serde(rename = "ArticleID", default)]
    pub article_id: Option<usize>,
    #[serde(rename = "Text", default)]
    pub text: Option<String>,
    #[serde(rename = "Date", default)]
    pub date: Option<String>,
    pub similarity_positive: f64,
    pub similarity_negative: f64,
}

/// A scored article together with the sentiment values derived from it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SentimentRow {
    #[serde(rename = "Text")]
    pub text: Option<String>,
    #[serde(rename = "Date")]
    pub date: Option<String>,
    #[serde(rename = "ArticleID")]
    pub article_id: usize,
    pub similarity_positive: f64,
    pub similarity_negative: f64,
    /// Larger of the two similarities.
    pub relevance: f64,
    /// Positive minus negative similarity.
    pub polarity: f64,
    #[serde(rename = "ArticleSentiment")]
    pub article_sentiment: f64,
    /// `YYYY-MM`, or `None` when the article has no date.
    #[serde(rename = "Month")]
    pub month: Option<String>,
}

/// Mean article sentiment for one calendar month.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MonthlyIndex {
    #[serde(rename = "Month")]
    pub month: String,
    #[serde(rename = "FiscalSentimentIndex")]
    pub fiscal_sentiment_index: f64,
}

/// One month of the index with its long-run trend lines.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    #[serde(rename = "Month")]
    pub month: String,
    #[serde(rename = "FiscalSentimentIndex")]
    pub fiscal_sentiment_index: f64,
    #[serde(rename = "LinearTrend")]
    pub linear_trend: f64,
    /// Centered 12-month mean; `None` near either end of the series.
    #[serde(rename = "RollingMean12")]
    pub rolling_mean_12: Option<f64>,
}
