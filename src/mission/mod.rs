//! Per-request mission synthesis pipeline.
//!
//! A mission is a free-form JSON object describing a planned spaceflight.
//! The pipeline turns it into a single narrative paragraph, embeds that
//! paragraph, ranks the whole corpus against it, and extracts insights from
//! the top-ranked publication bodies. Stages run strictly in order and any
//! stage failure aborts the request; there is no partial result.

use crate::context::SearchContext;
use crate::embedding::{normalize_text, EmbeddingError, EmbeddingProvider};
use crate::generator::{prompts, GeneratorError, NarrativeGenerator};
use crate::models::{Document, ImageRecord, MissionQuery};
use crate::ranking::rank_top_k;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Character budget per publication body in the insight prompt. The corpus
/// excerpt only ever contains the top-k bodies, truncated to this length.
const EXCERPT_CHARS_PER_DOCUMENT: usize = 1500;

/// Errors that can occur in the mission pipeline.
#[derive(Debug, Error)]
pub enum MissionError {
    /// Narrative generation failed
    #[error("Generation error: {0}")]
    Generator(#[from] GeneratorError),

    /// Embedding the synthesis failed
    #[error("Embedding error: {0}")]
    Embedding(#[from] EmbeddingError),
}

/// Result type for mission pipeline operations.
pub type MissionResult<T> = Result<T, MissionError>;

/// A document with its similarity score against the mission synthesis.
#[derive(Debug, Clone)]
pub struct RankedPaper {
    pub document: Document,
    pub score: f32,
}

/// An image with its similarity score against the mission synthesis.
#[derive(Debug, Clone)]
pub struct RankedImage {
    pub image: ImageRecord,
    pub score: f32,
}

/// Everything produced for one mission request.
#[derive(Debug, Clone)]
pub struct MissionOutcome {
    /// The generated narrative synthesis of the mission
    pub synthesis: String,

    /// The generated insight text grounded in the top-ranked publications
    pub insight: String,

    /// Top-ranked publications, best first
    pub papers: Vec<RankedPaper>,

    /// Top-ranked figure images, best first
    pub images: Vec<RankedImage>,
}

/// The mission synthesis pipeline.
///
/// Holds shared handles to the embedder and generator plus the result-size
/// limits; the per-request state lives entirely on the stack of
/// [`MissionPipeline::synthesize`].
pub struct MissionPipeline {
    embedder: Arc<dyn EmbeddingProvider>,
    generator: Arc<dyn NarrativeGenerator>,
    top_papers: usize,
    top_images: usize,
}

impl MissionPipeline {
    /// Create a pipeline with the given result-size limits.
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        generator: Arc<dyn NarrativeGenerator>,
        top_papers: usize,
        top_images: usize,
    ) -> Self {
        Self {
            embedder,
            generator,
            top_papers,
            top_images,
        }
    }

    /// Run the full pipeline for one mission.
    ///
    /// Stages: synthesize the mission into a paragraph, embed the paragraph,
    /// rank documents and images, extract insights from the top-k document
    /// bodies. Returns fewer than the configured limits when the corpus is
    /// smaller than them.
    ///
    /// # Errors
    /// Returns `MissionError` if generation or embedding fails; no stage is
    /// retried
    pub async fn synthesize(
        &self,
        context: &SearchContext,
        mission: &MissionQuery,
    ) -> MissionResult<MissionOutcome> {
        let mission_json = serde_json::Value::Object(mission.clone()).to_string();
        let synthesis = self
            .generator
            .generate(&prompts::mission_summary(&mission_json))
            .await?;
        debug!(chars = synthesis.len(), "mission synthesis generated");

        let query = self.embedder.embed(&normalize_text(&synthesis)).await?;

        let papers: Vec<RankedPaper> =
            rank_top_k(&query, &context.document_embeddings, self.top_papers)
                .into_iter()
                .map(|hit| RankedPaper {
                    document: context.documents[hit.index].clone(),
                    score: hit.score,
                })
                .collect();

        let images: Vec<RankedImage> =
            rank_top_k(&query, &context.image_embeddings, self.top_images)
                .into_iter()
                .map(|hit| RankedImage {
                    image: context.images[hit.index].clone(),
                    score: hit.score,
                })
                .collect();

        let excerpt = corpus_excerpt(&papers);
        let insight = self
            .generator
            .generate(&prompts::mission_insight(&synthesis, &excerpt))
            .await?;

        Ok(MissionOutcome {
            synthesis,
            insight,
            papers,
            images,
        })
    }
}

/// Concatenate the top-ranked publication bodies into a bounded excerpt,
/// one titled block per paper.
fn corpus_excerpt(papers: &[RankedPaper]) -> String {
    papers
        .iter()
        .map(|paper| {
            let mut body = paper.document.full_text();
            if body.len() > EXCERPT_CHARS_PER_DOCUMENT {
                let mut cut = EXCERPT_CHARS_PER_DOCUMENT;
                while !body.is_char_boundary(cut) {
                    cut -= 1;
                }
                body.truncate(cut);
            }
            format!("[{}]\n{}", paper.document.title, body)
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::EmbeddingResult;
    use crate::generator::GeneratorResult;
    use crate::models::Category;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Embeds every text to a fixed unit vector so ranking is deterministic:
    /// similarity is 1.0 against identical vectors.
    struct ConstEmbedder;

    #[async_trait]
    impl EmbeddingProvider for ConstEmbedder {
        async fn embed(&self, _text: &str) -> EmbeddingResult<Vec<f32>> {
            Ok(vec![1.0, 0.0])
        }

        async fn embed_batch(&self, texts: &[&str]) -> EmbeddingResult<Vec<Vec<f32>>> {
            Ok(texts.iter().map(|_| vec![1.0, 0.0]).collect())
        }

        fn dimension(&self) -> usize {
            2
        }

        fn model_name(&self) -> &str {
            "const"
        }
    }

    /// Records prompts and returns canned responses in call order.
    struct ScriptedGenerator {
        responses: Mutex<Vec<GeneratorResult<String>>>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedGenerator {
        fn new(responses: Vec<GeneratorResult<String>>) -> Self {
            Self {
                responses: Mutex::new(responses),
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl NarrativeGenerator for ScriptedGenerator {
        async fn generate(&self, prompt: &str) -> GeneratorResult<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.responses.lock().unwrap().remove(0)
        }

        fn model_name(&self) -> &str {
            "scripted"
        }
    }

    async fn small_context() -> SearchContext {
        let documents = (0..3)
            .map(|id| Document {
                id,
                title: format!("paper {id}"),
                link: None,
                abstract_text: "microgravity".to_string(),
                conclusion: String::new(),
                date: None,
                year: Some(2020),
                primary_category: None,
            })
            .collect();
        let images = vec![ImageRecord {
            image: "fig.png".to_string(),
            caption: "Figure 1".to_string(),
            description: String::new(),
            pdf: "p.pdf".to_string(),
        }];
        SearchContext::build(
            &ConstEmbedder,
            documents,
            images,
            vec![Category::new("All", "everything")],
            vec![],
        )
        .await
        .unwrap()
    }

    fn mission() -> MissionQuery {
        let mut m = MissionQuery::new();
        m.insert("type".to_string(), "Mars".into());
        m.insert("duration".to_string(), 180.into());
        m
    }

    #[tokio::test]
    async fn test_synthesize_returns_ranked_results() {
        let context = small_context().await;
        let generator = Arc::new(ScriptedGenerator::new(vec![
            Ok("a mars mission".to_string()),
            Ok("the insight".to_string()),
        ]));
        let pipeline = MissionPipeline::new(Arc::new(ConstEmbedder), generator.clone(), 5, 3);

        let outcome = pipeline.synthesize(&context, &mission()).await.unwrap();
        assert_eq!(outcome.synthesis, "a mars mission");
        assert_eq!(outcome.insight, "the insight");
        // Corpus smaller than the limits: everything comes back.
        assert_eq!(outcome.papers.len(), 3);
        assert_eq!(outcome.images.len(), 1);

        // The insight prompt saw the synthesis and the top paper bodies.
        let prompts = generator.prompts.lock().unwrap();
        assert!(prompts[0].contains("\"type\":\"Mars\""));
        assert!(prompts[1].contains("a mars mission"));
        assert!(prompts[1].contains("[paper 0]"));
    }

    #[tokio::test]
    async fn test_synthesize_respects_limits() {
        let context = small_context().await;
        let generator = Arc::new(ScriptedGenerator::new(vec![
            Ok("s".to_string()),
            Ok("i".to_string()),
        ]));
        let pipeline = MissionPipeline::new(Arc::new(ConstEmbedder), generator, 2, 0);

        let outcome = pipeline.synthesize(&context, &mission()).await.unwrap();
        assert_eq!(outcome.papers.len(), 2);
        assert!(outcome.images.is_empty());
    }

    #[tokio::test]
    async fn test_generator_failure_propagates() {
        let context = small_context().await;
        let generator = Arc::new(ScriptedGenerator::new(vec![Err(
            GeneratorError::ApiError("rate limited".to_string()),
        )]));
        let pipeline = MissionPipeline::new(Arc::new(ConstEmbedder), generator, 5, 3);

        let result = pipeline.synthesize(&context, &mission()).await;
        assert!(matches!(result, Err(MissionError::Generator(_))));
    }

    #[tokio::test]
    async fn test_insight_failure_after_synthesis_fails_whole_request() {
        // Synthesis and ranking succeed; the second generator call fails.
        // The request must fail outright, never returning a partial outcome
        // with an empty insight.
        let context = small_context().await;
        let generator = Arc::new(ScriptedGenerator::new(vec![
            Ok("a mars mission".to_string()),
            Err(GeneratorError::ApiError("rate limited".to_string())),
        ]));
        let pipeline = MissionPipeline::new(Arc::new(ConstEmbedder), generator.clone(), 5, 3);

        let result = pipeline.synthesize(&context, &mission()).await;
        assert!(matches!(result, Err(MissionError::Generator(_))));
        // Both generator calls were actually made.
        assert_eq!(generator.prompts.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_empty_mission_is_accepted() {
        let context = small_context().await;
        let generator = Arc::new(ScriptedGenerator::new(vec![
            Ok("empty mission".to_string()),
            Ok("no insight".to_string()),
        ]));
        let pipeline = MissionPipeline::new(Arc::new(ConstEmbedder), generator, 5, 3);

        let outcome = pipeline
            .synthesize(&context, &MissionQuery::new())
            .await
            .unwrap();
        assert_eq!(outcome.synthesis, "empty mission");
    }

    #[test]
    fn test_corpus_excerpt_truncates_long_bodies() {
        let long = "x".repeat(5000);
        let papers = vec![RankedPaper {
            document: Document {
                id: 0,
                title: "long".to_string(),
                link: None,
                abstract_text: long,
                conclusion: String::new(),
                date: None,
                year: None,
                primary_category: None,
            },
            score: 1.0,
        }];
        let excerpt = corpus_excerpt(&papers);
        assert!(excerpt.len() < 2000);
        assert!(excerpt.starts_with("[long]\n"));
    }
}
