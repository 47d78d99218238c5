//! HTTP API surface (axum).
//!
//! All handlers are thin: they validate input, delegate to the library
//! modules, and map errors onto a small status-code vocabulary. Client
//! mistakes (unknown dataset, malformed mission) are 400; failures of the
//! external generator are 502; everything else unexpected is 500. Error
//! bodies are always `{"message": ...}`.

use crate::context::SearchContext;
use crate::generator::{prompts, GeneratorError, NarrativeGenerator};
use crate::mission::{MissionError, MissionPipeline, RankedImage, RankedPaper};
use crate::models::{Document, MissionQuery};
use crate::summary::{compact_counts, compact_trends, TrendPeriod};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::str::FromStr;
use std::sync::Arc;
use tracing::{error, info};

/// Shared handler state. Cloned per request; everything inside is an `Arc`
/// or a small copy.
#[derive(Clone)]
pub struct AppState {
    pub context: Arc<SearchContext>,
    pub generator: Arc<dyn NarrativeGenerator>,
    pub pipeline: Arc<MissionPipeline>,
    pub summary_periods: usize,
}

/// API error vocabulary.
#[derive(Debug)]
pub enum ApiError {
    /// The request itself is wrong (unknown dataset, bad body)
    InvalidInput(String),

    /// The external generator failed
    Upstream(String),

    /// Anything else
    Internal(String),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::InvalidInput(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::Upstream(message) => (StatusCode::BAD_GATEWAY, message),
            ApiError::Internal(message) => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };
        if status.is_server_error() {
            error!(%status, message, "request failed");
        }
        (status, Json(ErrorBody { message })).into_response()
    }
}

impl From<GeneratorError> for ApiError {
    fn from(err: GeneratorError) -> Self {
        ApiError::Upstream(err.to_string())
    }
}

impl From<MissionError> for ApiError {
    fn from(err: MissionError) -> Self {
        match err {
            MissionError::Generator(inner) => ApiError::Upstream(inner.to_string()),
            MissionError::Embedding(inner) => ApiError::Internal(inner.to_string()),
        }
    }
}

/// The datasets the analysis endpoints can be pointed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dataset {
    ResearchEvolution,
    NasaBudget,
}

impl FromStr for Dataset {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "research-evolution" => Ok(Dataset::ResearchEvolution),
            "nasa-budget" => Ok(Dataset::NasaBudget),
            other => Err(ApiError::InvalidInput(format!(
                "unknown dataset '{other}'; expected 'research-evolution' or 'nasa-budget'"
            ))),
        }
    }
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/papers", get(papers))
        .route("/research-evolution", get(research_evolution))
        .route("/nasa-budget", get(nasa_budget))
        .route("/ai-tabs", get(ai_tabs))
        .route("/ask-ai", post(ask_ai))
        .route("/generate-mission-insights", post(mission_insights))
        .with_state(state)
}

#[derive(Serialize)]
struct HealthResponse {
    message: &'static str,
    documents: usize,
    images: usize,
    undated_documents: usize,
    model: String,
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        message: "ok",
        documents: state.context.documents.len(),
        images: state.context.images.len(),
        undated_documents: state.context.evolution.undated_documents,
        model: state.generator.model_name().to_string(),
    })
}

async fn papers(State(state): State<AppState>) -> Json<Vec<Document>> {
    Json(state.context.documents.clone())
}

/// The dense table as a bare array of row objects; consumers index into it
/// directly. Undated documents are reported via `/health`.
async fn research_evolution(State(state): State<AppState>) -> Json<Vec<Map<String, Value>>> {
    Json(state.context.evolution.rows())
}

async fn nasa_budget(State(state): State<AppState>) -> Json<Vec<Map<String, Value>>> {
    Json(state.context.budget.clone())
}

#[derive(Deserialize)]
struct DatasetQuery {
    /// Omitting the selector targets the research-evolution dataset.
    #[serde(default)]
    dataset: Option<String>,
}

impl DatasetQuery {
    fn resolve(&self) -> Result<Dataset, ApiError> {
        match self.dataset.as_deref() {
            Some(name) => name.parse(),
            None => Ok(Dataset::ResearchEvolution),
        }
    }
}

async fn ai_tabs(
    State(state): State<AppState>,
    Query(query): Query<DatasetQuery>,
) -> Result<Json<Map<String, Value>>, ApiError> {
    let dataset = query.resolve()?;
    let summary = dataset_summary(&state, dataset);

    let mut tabs = Map::new();
    for (name, tab_prompt) in prompts::ANALYSIS_TABS {
        let text = state
            .generator
            .generate(&prompts::tab_analysis(tab_prompt, &summary))
            .await?;
        tabs.insert(name.to_string(), Value::String(text));
    }
    Ok(Json(tabs))
}

#[derive(Deserialize)]
struct QuestionRequest {
    question: String,
}

#[derive(Serialize)]
struct AnswerResponse {
    answer: String,
}

async fn ask_ai(
    State(state): State<AppState>,
    Query(query): Query<DatasetQuery>,
    Json(request): Json<QuestionRequest>,
) -> Result<Json<AnswerResponse>, ApiError> {
    let dataset = query.resolve()?;
    if request.question.trim().is_empty() {
        return Err(ApiError::InvalidInput(
            "question must not be empty".to_string(),
        ));
    }

    let summary = dataset_summary(&state, dataset);
    let answer = state
        .generator
        .generate(&prompts::dataset_question(request.question.trim(), &summary))
        .await?;
    Ok(Json(AnswerResponse { answer }))
}

#[derive(Serialize)]
struct RankedPaperDto {
    title: String,
    link: Option<String>,
    similarity: f32,
}

impl From<RankedPaper> for RankedPaperDto {
    fn from(paper: RankedPaper) -> Self {
        Self {
            title: paper.document.title,
            link: paper.document.link,
            similarity: paper.score,
        }
    }
}

#[derive(Serialize)]
struct RankedImageDto {
    image: String,
    caption: String,
    description: String,
    pdf: String,
    similarity: f32,
}

impl From<RankedImage> for RankedImageDto {
    fn from(ranked: RankedImage) -> Self {
        Self {
            image: ranked.image.image,
            caption: ranked.image.caption,
            description: ranked.image.description,
            pdf: ranked.image.pdf,
            similarity: ranked.score,
        }
    }
}

#[derive(Serialize)]
struct MissionResponse {
    mission: MissionQuery,
    mission_summary: String,
    mission_insight: String,
    top_papers: Vec<RankedPaperDto>,
    top_images: Vec<RankedImageDto>,
}

async fn mission_insights(
    State(state): State<AppState>,
    Json(mission): Json<MissionQuery>,
) -> Result<Json<MissionResponse>, ApiError> {
    info!(fields = mission.len(), "mission insight request");
    let outcome = state.pipeline.synthesize(&state.context, &mission).await?;

    Ok(Json(MissionResponse {
        mission,
        mission_summary: outcome.synthesis,
        mission_insight: outcome.insight,
        top_papers: outcome.papers.into_iter().map(Into::into).collect(),
        top_images: outcome.images.into_iter().map(Into::into).collect(),
    }))
}

/// Compact the requested dataset into the bounded prompt summary.
fn dataset_summary(state: &AppState, dataset: Dataset) -> String {
    match dataset {
        Dataset::ResearchEvolution => {
            compact_counts(&state.context.evolution, state.summary_periods)
        }
        Dataset::NasaBudget => {
            let periods = budget_periods(&state.context.budget);
            compact_trends(&periods, state.summary_periods)
        }
    }
}

/// Extract trend periods from the raw budget rows: the `Year` column becomes
/// the period, every other numeric column becomes a named value. Rows
/// without a numeric year and non-numeric columns are skipped.
fn budget_periods(rows: &[Map<String, Value>]) -> Vec<TrendPeriod> {
    rows.iter()
        .filter_map(|row| {
            let period = row.get("Year")?.as_i64()? as i32;
            let values: Vec<(String, f64)> = row
                .iter()
                .filter(|(key, _)| key.as_str() != "Year")
                .filter_map(|(key, value)| Some((key.clone(), value.as_f64()?)))
                .collect();
            Some(TrendPeriod { period, values })
        })
        .collect()
}
