//! Corpus loading: documents, figure images, and the budget dataset.
//!
//! The upstream extraction scripts (out of scope here) write three JSON
//! files into the data directory; this module reads them into typed models
//! and derives publication years. Everything is loaded eagerly at startup;
//! a missing or malformed file is a fatal startup error, never a silently
//! empty corpus.

use crate::models::{Document, ImageRecord};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur while loading corpus files.
#[derive(Debug, Error)]
pub enum CorpusError {
    /// Failed to read a corpus file
    #[error("IO error reading {path}: {source}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse a corpus file
    #[error("Parse error in {path}: {message}")]
    ParseError { path: String, message: String },
}

/// Result type for corpus operations.
pub type CorpusResult<T> = Result<T, CorpusError>;

/// Raw document record as written by the extraction scripts.
#[derive(Debug, Deserialize)]
struct DocumentRecord {
    #[serde(alias = "Title")]
    title: String,

    #[serde(default, alias = "Link")]
    link: Option<String>,

    #[serde(default, rename = "abstract")]
    abstract_text: Option<String>,

    #[serde(default)]
    conclusion: Option<String>,

    #[serde(default)]
    date: Option<String>,
}

/// A raw budget row: a `Year` key plus arbitrary numeric and textual
/// columns, kept as loaded so the API can echo them verbatim.
pub type BudgetRow = Map<String, Value>;

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> CorpusResult<T> {
    let contents = fs::read_to_string(path).map_err(|source| CorpusError::IoError {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|e| CorpusError::ParseError {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

/// Load the publication corpus from a JSON array of document records.
///
/// Documents are assigned sequential ids matching their position in the
/// file; that position is the index used by every embedding matrix built
/// over the corpus, so the order must never be perturbed afterwards.
pub fn load_documents(path: &Path) -> CorpusResult<Vec<Document>> {
    let records: Vec<DocumentRecord> = read_json(path)?;
    let documents = records
        .into_iter()
        .enumerate()
        .map(|(id, record)| {
            let date = record.date.filter(|d| !d.trim().is_empty());
            let year = date.as_deref().and_then(parse_year);
            Document {
                id,
                title: record.title,
                link: record.link,
                abstract_text: record.abstract_text.unwrap_or_default(),
                conclusion: record.conclusion.unwrap_or_default(),
                date,
                year,
                primary_category: None,
            }
        })
        .collect::<Vec<_>>();

    debug!(count = documents.len(), "loaded document corpus");
    Ok(documents)
}

/// Load figure image metadata from a JSON array.
pub fn load_images(path: &Path) -> CorpusResult<Vec<ImageRecord>> {
    let images: Vec<ImageRecord> = read_json(path)?;
    debug!(count = images.len(), "loaded image metadata");
    Ok(images)
}

/// Load the budget dataset from a JSON array of row objects.
pub fn load_budget(path: &Path) -> CorpusResult<Vec<BudgetRow>> {
    let rows: Vec<BudgetRow> = read_json(path)?;
    debug!(count = rows.len(), "loaded budget dataset");
    Ok(rows)
}

/// Derive a publication year from a date string.
///
/// Accepts full `YYYY-MM-DD` dates; anything else falls back to a leading
/// four-digit year. Returns `None` for unparseable input; those documents
/// are excluded from temporal aggregation but remain in the corpus.
pub fn parse_year(date: &str) -> Option<i32> {
    let trimmed = date.trim();
    if let Ok(parsed) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        use chrono::Datelike;
        return Some(parsed.year());
    }

    let prefix: String = trimmed.chars().take_while(|c| c.is_ascii_digit()).collect();
    if prefix.len() == 4 {
        prefix.parse().ok()
    } else {
        None
    }
}
