//! Bioscience Insights - semantic categorization and mission insight service.
//!
//! This library powers an HTTP API over a corpus of bioscience publications.
//! Documents, figure images, and a fixed category catalog are embedded once at
//! startup; requests then reuse those read-only matrices for semantic
//! retrieval, temporal aggregation, and LLM-generated narrative insights.
//!
//! # Architecture
//!
//! The system is organized into several key modules:
//!
//! - **models**: Core data structures (Document, ImageRecord, Category, etc.)
//! - **embedding**: Text embedding generation and normalization
//! - **generator**: Narrative (LLM) text generation and prompt construction
//! - **ranking**: Cosine similarity and exact top-k ranking
//! - **categorize**: Nearest-category batch classification
//! - **aggregate**: Dense (year x category) evolution tables
//! - **summary**: Bounded-length dataset compaction for LLM consumption
//! - **corpus**: JSON corpus/image/budget loading
//! - **context**: Startup-built immutable search context
//! - **mission**: Per-request mission synthesis pipeline
//! - **server**: HTTP surface (axum)
//!
//! # Workflow
//!
//! ## Startup
//!
//! 1. Load document, image, and budget metadata from the data directory
//! 2. Embed category descriptions, document bodies, and image captions
//! 3. Assign every document its nearest category
//! 4. Build the dense year-by-category evolution table
//!
//! ## Per request
//!
//! 1. Synthesize the mission description into a single paragraph (LLM)
//! 2. Normalize and embed the synthesis
//! 3. Rank all documents and images by cosine similarity
//! 4. Extract insights from the top-k document bodies (LLM)
//! 5. Return the synthesis, insight, and ranked results
//!
//! # Example
//!
//! ```ignore
//! use bioscience_insights::{
//!     categorize::default_categories,
//!     context::SearchContext,
//!     embedding::fastembed::FastEmbedProvider,
//!     generator::groq::GroqGenerator,
//!     mission::MissionPipeline,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let embedder = std::sync::Arc::new(FastEmbedProvider::with_defaults()?);
//!     let generator = std::sync::Arc::new(GroqGenerator::new(api_key, None)?);
//!
//!     let context = SearchContext::build(
//!         embedder.as_ref(),
//!         documents,
//!         images,
//!         default_categories(),
//!         budget,
//!     )
//!     .await?;
//!
//!     let pipeline = MissionPipeline::new(embedder, generator, 5, 3);
//!     let outcome = pipeline.synthesize(&context, &mission).await?;
//!     println!("{}", outcome.insight);
//!     Ok(())
//! }
//! ```

// Public modules
pub mod aggregate;
pub mod categorize;
pub mod context;
pub mod corpus;
pub mod embedding;
pub mod generator;
pub mod mission;
pub mod models;
pub mod ranking;
pub mod server;
pub mod summary;

// Re-export commonly used types at the crate root
pub use context::SearchContext;
pub use embedding::EmbeddingProvider;
pub use generator::NarrativeGenerator;
pub use mission::MissionPipeline;
pub use models::{Category, Document, ImageRecord, MissionQuery};
pub use ranking::{cosine_similarity, rank_top_k, SimilarityHit};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default number of documents returned by the mission pipeline
pub const DEFAULT_TOP_PAPERS: usize = 5;

/// Default number of images returned by the mission pipeline
pub const DEFAULT_TOP_IMAGES: usize = 3;

/// Default number of periods kept by the summary compactor
pub const DEFAULT_SUMMARY_PERIODS: usize = 5;
