//! Core data models for the bioscience insights service.
//!
//! This module contains the fundamental data structures used across the
//! application: publication metadata, figure images, the category catalog,
//! and the free-form mission query.

use serde::{Deserialize, Serialize};

/// Core metadata for a single publication in the corpus.
///
/// Documents are immutable after ingestion within a process lifetime and are
/// regenerated wholesale on restart. The embedding lives in the index-aligned
/// matrix owned by [`crate::context::SearchContext`], not on the document
/// itself, so the struct can be serialized for API responses as-is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Position of this document in the corpus (index into the embedding matrix)
    pub id: usize,

    /// Publication title
    pub title: String,

    /// Link to the source publication, if known
    pub link: Option<String>,

    /// Abstract text (may be empty when extraction failed upstream)
    #[serde(rename = "abstract")]
    pub abstract_text: String,

    /// Conclusion section text (may be empty)
    pub conclusion: String,

    /// Raw publication date string as ingested (e.g. "2021-03-14")
    pub date: Option<String>,

    /// Publication year derived from `date`; `None` when unparseable
    pub year: Option<i32>,

    /// Assigned category name; `None` until classification has run
    pub primary_category: Option<String>,
}

impl Document {
    /// Concatenated free-text body used for embedding: title, abstract, and
    /// conclusion joined by single spaces. Callers normalize the result
    /// before embedding.
    pub fn full_text(&self) -> String {
        format!("{} {} {}", self.title, self.abstract_text, self.conclusion)
    }
}

/// A figure image extracted from a publication PDF.
///
/// The caption comes from a heuristic scan of nearby page text during the
/// offline extraction step; the description is model-generated. Both are
/// concatenated to form the image's embedding text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageRecord {
    /// Path to the extracted image file
    pub image: String,

    /// Caption extracted from nearby page text (may be empty)
    #[serde(default)]
    pub caption: String,

    /// Model-generated structured description of the figure
    #[serde(default)]
    pub description: String,

    /// Filename of the source PDF
    pub pdf: String,
}

impl ImageRecord {
    /// Concatenated caption and description used for embedding.
    pub fn embedding_text(&self) -> String {
        format!("{} {}", self.caption, self.description)
    }
}

/// A category from the fixed classification catalog.
///
/// Categories are loaded from static configuration and never mutated at
/// runtime. The description text is what gets embedded; assignment is
/// nearest-description by cosine similarity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Category {
    /// Unique category name (also the column name in aggregation tables)
    pub name: String,

    /// Canonical description text used for the category embedding
    pub description: String,
}

impl Category {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

/// A free-form mission description: arbitrary field names mapped to arbitrary
/// JSON values. No fixed schema; transient, never persisted.
pub type MissionQuery = serde_json::Map<String, serde_json::Value>;
