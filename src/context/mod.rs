//! Startup-built immutable search context.
//!
//! All embedding work happens here, once, at startup: category descriptions,
//! document bodies, and image captions are normalized and embedded, every
//! document is assigned its nearest category, and the dense evolution table
//! is derived. The resulting context is shared read-only behind an `Arc`;
//! request handlers never mutate it and a restart rebuilds it from scratch.

use crate::aggregate::EvolutionTable;
use crate::categorize::assign_categories;
use crate::corpus::{self, BudgetRow, CorpusError};
use crate::embedding::{normalize_text, EmbeddingError, EmbeddingProvider};
use crate::models::{Category, Document, ImageRecord};
use std::path::Path;
use thiserror::Error;
use tracing::info;

/// Number of texts embedded per batch during startup indexing.
const EMBED_BATCH_SIZE: usize = 128;

/// Errors that can occur while building the search context.
#[derive(Debug, Error)]
pub enum ContextError {
    /// Corpus files could not be loaded
    #[error("Corpus error: {0}")]
    Corpus(#[from] CorpusError),

    /// Embedding generation failed
    #[error("Embedding error: {0}")]
    Embedding(#[from] EmbeddingError),

    /// An embedding matrix came back misaligned with its source collection
    #[error("Alignment error: {0}")]
    Alignment(String),
}

/// Result type for context operations.
pub type ContextResult<T> = Result<T, ContextError>;

/// The read-only state shared by all request handlers.
///
/// Invariant: `document_embeddings[i]` is the embedding of `documents[i]`,
/// and likewise for images and categories. [`SearchContext::build`] verifies
/// the alignment and every ranked result is resolved through these indices.
pub struct SearchContext {
    /// The classified publication corpus
    pub documents: Vec<Document>,

    /// Index-aligned document embeddings
    pub document_embeddings: Vec<Vec<f32>>,

    /// Figure image metadata
    pub images: Vec<ImageRecord>,

    /// Index-aligned image embeddings
    pub image_embeddings: Vec<Vec<f32>>,

    /// The fixed category catalog, in catalog order
    pub categories: Vec<Category>,

    /// Index-aligned category description embeddings
    pub category_embeddings: Vec<Vec<f32>>,

    /// Dense year-by-category publication counts
    pub evolution: EvolutionTable,

    /// Budget dataset rows, echoed verbatim by the API
    pub budget: Vec<BudgetRow>,
}

impl SearchContext {
    /// Load the corpus files from `data_dir` and build the context.
    ///
    /// Expects `documents.json`, `paper_images_metadata.json`, and
    /// `nasa_budget.json` in the directory. Any missing or malformed file is
    /// a fatal error.
    pub async fn from_dir(
        embedder: &dyn EmbeddingProvider,
        data_dir: &Path,
        categories: Vec<Category>,
    ) -> ContextResult<Self> {
        let documents = corpus::load_documents(&data_dir.join("documents.json"))?;
        let images = corpus::load_images(&data_dir.join("paper_images_metadata.json"))?;
        let budget = corpus::load_budget(&data_dir.join("nasa_budget.json"))?;
        Self::build(embedder, documents, images, categories, budget).await
    }

    /// Build the context from pre-loaded collections.
    ///
    /// Embeds everything in batches, classifies every document against the
    /// catalog, and derives the evolution table. This is the expensive call
    /// of the process lifetime; it runs exactly once, before the server
    /// starts accepting requests.
    ///
    /// # Errors
    /// Returns `ContextError` if any embedding batch fails or if a returned
    /// matrix does not line up with its source collection
    pub async fn build(
        embedder: &dyn EmbeddingProvider,
        mut documents: Vec<Document>,
        images: Vec<ImageRecord>,
        categories: Vec<Category>,
        budget: Vec<BudgetRow>,
    ) -> ContextResult<Self> {
        info!(
            documents = documents.len(),
            images = images.len(),
            categories = categories.len(),
            model = embedder.model_name(),
            "building search context"
        );

        let category_texts: Vec<String> = categories
            .iter()
            .map(|c| normalize_text(&c.description))
            .collect();
        let category_embeddings =
            embed_all(embedder, &category_texts, "categories").await?;

        let document_texts: Vec<String> = documents
            .iter()
            .map(|d| normalize_text(&d.full_text()))
            .collect();
        let document_embeddings = embed_all(embedder, &document_texts, "documents").await?;

        let image_texts: Vec<String> = images
            .iter()
            .map(|i| normalize_text(&i.embedding_text()))
            .collect();
        let image_embeddings = embed_all(embedder, &image_texts, "images").await?;

        let assignments = assign_categories(&document_embeddings, &category_embeddings);
        for (doc, &category_index) in documents.iter_mut().zip(&assignments) {
            doc.primary_category = Some(categories[category_index].name.clone());
        }

        let evolution = EvolutionTable::build(&documents);
        info!(
            years = evolution.years.len(),
            cells = evolution.cell_count(),
            undated = evolution.undated_documents,
            "search context ready"
        );

        Ok(Self {
            documents,
            document_embeddings,
            images,
            image_embeddings,
            categories,
            category_embeddings,
            evolution,
            budget,
        })
    }
}

/// Embed a collection in fixed-size batches, verifying that the provider
/// returned exactly one vector per input.
async fn embed_all(
    embedder: &dyn EmbeddingProvider,
    texts: &[String],
    label: &str,
) -> ContextResult<Vec<Vec<f32>>> {
    let mut embeddings = Vec::with_capacity(texts.len());
    for chunk in texts.chunks(EMBED_BATCH_SIZE) {
        let refs: Vec<&str> = chunk.iter().map(String::as_str).collect();
        let batch = embedder.embed_batch(&refs).await?;
        embeddings.extend(batch);
    }

    if embeddings.len() != texts.len() {
        return Err(ContextError::Alignment(format!(
            "{}: embedded {} of {} texts",
            label,
            embeddings.len(),
            texts.len()
        )));
    }
    Ok(embeddings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::EmbeddingResult;
    use async_trait::async_trait;

    /// Deterministic fake: hashes each text into a 4-dim vector so distinct
    /// inputs get distinct, repeatable embeddings.
    struct FakeEmbedder;

    fn fake_vector(text: &str) -> Vec<f32> {
        let mut v = [0.0f32; 4];
        for (i, b) in text.bytes().enumerate() {
            v[i % 4] += b as f32;
        }
        // Leave the zero vector for empty text.
        v.to_vec()
    }

    #[async_trait]
    impl EmbeddingProvider for FakeEmbedder {
        async fn embed(&self, text: &str) -> EmbeddingResult<Vec<f32>> {
            Ok(fake_vector(text))
        }

        async fn embed_batch(&self, texts: &[&str]) -> EmbeddingResult<Vec<Vec<f32>>> {
            Ok(texts.iter().map(|t| fake_vector(t)).collect())
        }

        fn dimension(&self) -> usize {
            4
        }

        fn model_name(&self) -> &str {
            "fake"
        }
    }

    fn doc(id: usize, title: &str, date: Option<&str>) -> Document {
        Document {
            id,
            title: title.to_string(),
            link: None,
            abstract_text: String::new(),
            conclusion: String::new(),
            date: date.map(String::from),
            year: date.and_then(corpus::parse_year),
            primary_category: None,
        }
    }

    #[tokio::test]
    async fn test_build_aligns_embeddings_and_classifies() {
        let documents = vec![
            doc(0, "seed germination in orbit", Some("2020-01-01")),
            doc(1, "", None),
        ];
        let images = vec![ImageRecord {
            image: "a.png".to_string(),
            caption: "Figure 1".to_string(),
            description: "growth".to_string(),
            pdf: "a.pdf".to_string(),
        }];
        let categories = vec![
            Category::new("Plants", "seed germination plant growth"),
            Category::new("Radiation", "cosmic radiation exposure"),
        ];

        let context = SearchContext::build(&FakeEmbedder, documents, images, categories, vec![])
            .await
            .unwrap();

        assert_eq!(context.document_embeddings.len(), context.documents.len());
        assert_eq!(context.image_embeddings.len(), context.images.len());
        assert_eq!(context.category_embeddings.len(), context.categories.len());
        // Every document got a category, including the empty-bodied one.
        for doc in &context.documents {
            assert!(doc.primary_category.is_some());
        }
        // The empty document has a zero-norm embedding and lands on the
        // first catalog category.
        assert_eq!(
            context.documents[1].primary_category.as_deref(),
            Some("Plants")
        );
    }

    #[tokio::test]
    async fn test_build_derives_evolution_table() {
        let documents = vec![
            doc(0, "alpha", Some("2020-01-01")),
            doc(1, "beta", Some("2021-06-30")),
            doc(2, "gamma", None),
        ];
        let categories = vec![Category::new("Everything", "alpha beta gamma")];

        let context = SearchContext::build(&FakeEmbedder, documents, vec![], categories, vec![])
            .await
            .unwrap();

        assert_eq!(context.evolution.years, vec![2020, 2021]);
        assert_eq!(context.evolution.undated_documents, 1);
    }

    #[tokio::test]
    async fn test_build_empty_corpus() {
        let categories = vec![Category::new("A", "anything")];
        let context = SearchContext::build(&FakeEmbedder, vec![], vec![], categories, vec![])
            .await
            .unwrap();
        assert!(context.documents.is_empty());
        assert_eq!(context.evolution.cell_count(), 0);
    }
}
