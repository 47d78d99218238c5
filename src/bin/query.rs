//! Corpus query binary entry point.
//!
//! Command-line semantic search over the publication corpus, without the
//! LLM layer: the corpus is embedded in-process at startup and queries are
//! ranked by cosine similarity. Supports single-query and interactive REPL
//! modes with table or JSON output.
//!
//! # Examples
//!
//! Single query:
//! ```bash
//! bioscience-query --data-dir data --query "bone loss in microgravity"
//! ```
//!
//! JSON output:
//! ```bash
//! bioscience-query --data-dir data --query "radiation shielding" --format json
//! ```
//!
//! Interactive mode:
//! ```bash
//! bioscience-query --data-dir data --interactive
//! ```

use anyhow::{Context, Result};
use bioscience_insights::{
    categorize::default_categories,
    context::SearchContext,
    embedding::{fastembed::FastEmbedProvider, normalize_text},
    models::Document,
    ranking::rank_top_k,
    EmbeddingProvider,
};
use clap::{Parser, ValueEnum};
use comfy_table::{presets::UTF8_FULL, Attribute, Cell, ContentArrangement, Table};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Output format for search results
#[derive(Debug, Clone, ValueEnum)]
enum OutputFormat {
    /// Human-friendly table
    Table,
    /// Machine-readable JSON format
    Json,
}

/// Query binary CLI for semantic corpus search
#[derive(Parser, Debug)]
#[command(
    name = "bioscience-query",
    version,
    about = "Search the publication corpus using semantic similarity",
    long_about = "Query the publication corpus using semantic search. The corpus is \
                  embedded at startup, so the first query pays the indexing cost.

EXAMPLES:
  Single query:
    bioscience-query --data-dir data --query \"bone loss in microgravity\"

  JSON output:
    bioscience-query --data-dir data --query \"radiation shielding\" --format json

  Interactive mode:
    bioscience-query --data-dir data --interactive"
)]
struct Args {
    /// Directory containing the corpus JSON files
    #[arg(long, value_name = "DIR", default_value = "data")]
    data_dir: PathBuf,

    /// Search query (required for single-query mode, omitted in interactive mode)
    #[arg(long, value_name = "TEXT", conflicts_with = "interactive")]
    query: Option<String>,

    /// Number of results to return
    #[arg(long, value_name = "N", default_value = "10")]
    top_k: usize,

    /// Output format
    #[arg(long, value_enum, default_value = "table")]
    format: OutputFormat,

    /// Enable interactive REPL mode
    #[arg(long, short = 'i')]
    interactive: bool,

    /// Logging verbosity level
    #[arg(long, default_value = "warn", value_name = "LEVEL")]
    log_level: String,

    /// FastEmbed model cache directory
    #[arg(long, value_name = "DIR")]
    cache_dir: Option<PathBuf>,
}

/// Setup logging with the specified level
fn setup_logging(log_level: &str) {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)))
        .init();
}

/// A single ranked result for output formatting.
#[derive(Debug, Clone, Serialize)]
struct QueryResult {
    rank: usize,
    title: String,
    link: Option<String>,
    year: Option<i32>,
    category: Option<String>,
    score: f32,
}

/// Embed the query and rank the corpus.
async fn execute_search(
    embedder: &FastEmbedProvider,
    context: &SearchContext,
    query_text: &str,
    top_k: usize,
) -> Result<Vec<QueryResult>> {
    let query = embedder
        .embed(&normalize_text(query_text))
        .await
        .with_context(|| format!("Failed to embed query: '{query_text}'"))?;

    let results = rank_top_k(&query, &context.document_embeddings, top_k)
        .into_iter()
        .enumerate()
        .map(|(idx, hit)| {
            let doc: &Document = &context.documents[hit.index];
            QueryResult {
                rank: idx + 1,
                title: doc.title.clone(),
                link: doc.link.clone(),
                year: doc.year,
                category: doc.primary_category.clone(),
                score: hit.score,
            }
        })
        .collect();
    Ok(results)
}

/// Format results as a pretty table
fn format_results_table(results: &[QueryResult]) -> String {
    if results.is_empty() {
        return "No results found.".to_string();
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("Rank").add_attribute(Attribute::Bold),
        Cell::new("Title").add_attribute(Attribute::Bold),
        Cell::new("Year").add_attribute(Attribute::Bold),
        Cell::new("Category").add_attribute(Attribute::Bold),
        Cell::new("Score").add_attribute(Attribute::Bold),
    ]);

    for result in results {
        let title_display = truncate_title(&result.title, 60);

        table.add_row(vec![
            Cell::new(result.rank),
            Cell::new(title_display),
            Cell::new(
                result
                    .year
                    .map(|y| y.to_string())
                    .unwrap_or_else(|| "-".to_string()),
            ),
            Cell::new(result.category.as_deref().unwrap_or("-")),
            Cell::new(format!("{:.4}", result.score)),
        ]);
    }

    table.to_string()
}

/// Truncate a long title for table display, backing up to a char boundary
/// so multibyte characters never get split.
fn truncate_title(title: &str, max_bytes: usize) -> String {
    if title.len() <= max_bytes {
        return title.to_string();
    }
    let mut cut = max_bytes - 3;
    while !title.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}...", &title[..cut])
}

/// Format results as JSON
fn format_results_json(results: &[QueryResult]) -> Result<String> {
    serde_json::to_string_pretty(results).context("Failed to serialize results to JSON")
}

fn print_results(results: &[QueryResult], format: &OutputFormat, elapsed_secs: f64) {
    match format {
        OutputFormat::Table => {
            println!("{}", format_results_table(results));
            println!("\nFound {} results in {:.2}s", results.len(), elapsed_secs);
        }
        OutputFormat::Json => match format_results_json(results) {
            Ok(json) => println!("{json}"),
            Err(e) => eprintln!("Error formatting JSON: {e}"),
        },
    }
}

fn print_repl_help() {
    println!("Commands:");
    println!("  <query>       - Search the corpus");
    println!("  /top N        - Set number of results to N");
    println!("  /format table - Use table output format");
    println!("  /format json  - Use JSON output format");
    println!("  /help         - Show this help");
    println!("  Ctrl+D or Ctrl+C - Exit");
}

/// Run interactive REPL mode
async fn run_interactive(
    embedder: &FastEmbedProvider,
    context: &SearchContext,
    mut top_k: usize,
    mut format: OutputFormat,
) -> Result<()> {
    println!("Interactive Corpus Search");
    print_repl_help();
    println!();

    let mut rl = DefaultEditor::new().context("Failed to create readline editor")?;

    loop {
        match rl.readline("Search> ") {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                rl.add_history_entry(line).ok();

                if line.starts_with('/') {
                    let parts: Vec<&str> = line.split_whitespace().collect();
                    match parts[0] {
                        "/help" => print_repl_help(),
                        "/top" => match parts.get(1).and_then(|p| p.parse::<usize>().ok()) {
                            Some(n) if n > 0 => {
                                top_k = n;
                                println!("Set top-k to {top_k}");
                            }
                            _ => eprintln!("Usage: /top N (positive integer)"),
                        },
                        "/format" => match parts.get(1) {
                            Some(&"table") => {
                                format = OutputFormat::Table;
                                println!("Set output format to table");
                            }
                            Some(&"json") => {
                                format = OutputFormat::Json;
                                println!("Set output format to JSON");
                            }
                            _ => eprintln!("Usage: /format [table|json]"),
                        },
                        _ => eprintln!(
                            "Unknown command: {}. Type /help for available commands.",
                            parts[0]
                        ),
                    }
                } else {
                    let start = Instant::now();
                    match execute_search(embedder, context, line, top_k).await {
                        Ok(results) => {
                            print_results(&results, &format, start.elapsed().as_secs_f64())
                        }
                        Err(e) => eprintln!("Search failed: {e}"),
                    }
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                println!("Goodbye!");
                break;
            }
            Err(err) => {
                error!("Error reading input: {}", err);
                break;
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    setup_logging(&args.log_level);

    if !args.interactive && args.query.is_none() {
        anyhow::bail!(
            "Either --query or --interactive must be specified.\n\
             Use --help for usage information."
        );
    }

    let embedder = FastEmbedProvider::new(
        None,
        args.cache_dir
            .as_ref()
            .map(|dir| dir.to_string_lossy().to_string()),
    )
    .context("Failed to initialize embedding model")?;

    info!("Indexing corpus from {}", args.data_dir.display());
    let context = SearchContext::from_dir(&embedder, &args.data_dir, default_categories())
        .await
        .with_context(|| format!("Failed to build context from {}", args.data_dir.display()))?;
    info!("Corpus ready: {} documents", context.documents.len());

    if args.interactive {
        run_interactive(&embedder, &context, args.top_k, args.format).await?;
    } else {
        let query = args.query.as_deref().unwrap_or_default();
        let start = Instant::now();
        let results = execute_search(&embedder, &context, query, args.top_k).await?;
        print_results(&results, &args.format, start.elapsed().as_secs_f64());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_title_short_unchanged() {
        assert_eq!(truncate_title("Bone loss in orbit", 60), "Bone loss in orbit");
    }

    #[test]
    fn test_truncate_title_long_ascii() {
        let long = "x".repeat(80);
        let display = truncate_title(&long, 60);
        assert_eq!(display.len(), 60);
        assert!(display.ends_with("..."));
    }

    #[test]
    fn test_truncate_title_multibyte_boundary() {
        // A multibyte character spanning the cut point must not panic.
        let long = format!("{}µ-gravity effects on osteoblasts", "x".repeat(56));
        let display = truncate_title(&long, 60);
        assert!(display.ends_with("..."));
        assert!(display.len() <= 60);
    }
}
