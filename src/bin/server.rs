//! HTTP server entry point.
//!
//! Loads the corpus from the data directory, builds the embedding index and
//! evolution table once, then serves the API. Startup is deliberately slow
//! and strict: any missing data file, embedding failure, or bad
//! configuration aborts the process before the listener is bound.
//!
//! # Examples
//!
//! ```bash
//! GROQ_API_KEY=... bioscience-server --data-dir data
//! ```
//!
//! ```bash
//! GROQ_API_KEY=... bioscience-server --bind 0.0.0.0:8000 --top-papers 10
//! ```

use anyhow::{Context, Result};
use bioscience_insights::{
    categorize::default_categories,
    context::SearchContext,
    embedding::fastembed::FastEmbedProvider,
    generator::groq::{GroqGenerator, DEFAULT_GROQ_MODEL},
    mission::MissionPipeline,
    server::{router, AppState},
    EmbeddingProvider, DEFAULT_SUMMARY_PERIODS, DEFAULT_TOP_IMAGES, DEFAULT_TOP_PAPERS,
};
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Server CLI for the bioscience insights API
#[derive(Parser, Debug)]
#[command(
    name = "bioscience-server",
    version,
    about = "Serve semantic search, aggregation, and mission insights over a publication corpus",
    long_about = "Serve the bioscience insights API. The data directory must contain \
                  documents.json, paper_images_metadata.json, and nasa_budget.json; \
                  the whole corpus is embedded at startup before the listener binds."
)]
struct Args {
    /// Directory containing the corpus JSON files
    #[arg(long, value_name = "DIR", default_value = "data")]
    data_dir: PathBuf,

    /// Address to bind the HTTP server to (host:port)
    #[arg(long, value_name = "ADDR", default_value = "127.0.0.1:8000")]
    bind: String,

    /// Groq API key for narrative generation
    #[arg(long, env = "GROQ_API_KEY", value_name = "KEY", hide_env_values = true)]
    groq_api_key: String,

    /// Groq model identifier
    #[arg(long, value_name = "MODEL", default_value = DEFAULT_GROQ_MODEL)]
    groq_model: String,

    /// Number of publications returned per mission request
    #[arg(long, value_name = "N", default_value_t = DEFAULT_TOP_PAPERS)]
    top_papers: usize,

    /// Number of figure images returned per mission request
    #[arg(long, value_name = "N", default_value_t = DEFAULT_TOP_IMAGES)]
    top_images: usize,

    /// Number of recent years kept in dataset summaries sent to the LLM
    #[arg(long, value_name = "N", default_value_t = DEFAULT_SUMMARY_PERIODS)]
    summary_years: usize,

    /// FastEmbed model cache directory
    #[arg(long, value_name = "DIR")]
    cache_dir: Option<PathBuf>,

    /// Logging verbosity level
    #[arg(long, default_value = "info", value_name = "LEVEL")]
    log_level: String,
}

/// Setup logging with the specified level
fn setup_logging(log_level: &str) {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    setup_logging(&args.log_level);

    if !args.data_dir.is_dir() {
        anyhow::bail!(
            "Data directory not found: {}\n\
             It must contain documents.json, paper_images_metadata.json, and nasa_budget.json.",
            args.data_dir.display()
        );
    }

    let embedder = FastEmbedProvider::new(
        None,
        args.cache_dir
            .as_ref()
            .map(|dir| dir.to_string_lossy().to_string()),
    )
    .context("Failed to initialize embedding model")?;
    info!(model = embedder.model_name(), "embedding provider ready");

    let generator = GroqGenerator::new(args.groq_api_key, Some(args.groq_model))
        .context("Failed to configure Groq generator")?;

    let context = SearchContext::from_dir(&embedder, &args.data_dir, default_categories())
        .await
        .with_context(|| format!("Failed to build context from {}", args.data_dir.display()))?;

    let embedder = Arc::new(embedder);
    let generator = Arc::new(generator);
    let pipeline = Arc::new(MissionPipeline::new(
        embedder,
        generator.clone(),
        args.top_papers,
        args.top_images,
    ));

    let state = AppState {
        context: Arc::new(context),
        generator,
        pipeline,
        summary_periods: args.summary_years.max(1),
    };
    let app = router(state);

    let addr: SocketAddr = args
        .bind
        .parse()
        .with_context(|| format!("Invalid bind address: {}", args.bind))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!(%addr, "listening");
    axum::serve(listener, app).await.context("Server shutdown")?;
    Ok(())
}
