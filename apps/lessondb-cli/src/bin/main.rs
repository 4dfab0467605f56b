use anyhow::Context;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use lessondb_core::catalog::Catalog;
use lessondb_core::config::{Config, Settings};
use lessondb_embed::{get_default_embedder, HashEmbedder};
use lessondb_quiz::{GeminiGenerator, ModelChain, QuizEngine, QuizRequest};
use lessondb_retrieval::{format_context, SearchOptions, SemanticSearchEngine};

#[derive(Parser)]
#[command(name = "lessondb", about = "Semantic search and quiz generation over course material")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Rank material chunks against a query
    Search {
        query: String,
        #[arg(long)]
        subject: Option<String>,
        #[arg(long)]
        topic: Option<String>,
        #[arg(long)]
        top_k: Option<usize>,
        #[arg(long)]
        min_similarity: Option<f32>,
        /// Print prompt-ready context instead of JSON
        #[arg(long)]
        context: bool,
    },
    /// List subjects of processed materials
    Subjects,
    /// List topics of a subject
    Topics { subject: String },
    /// Generate a multiple-choice quiz for a topic
    Quiz {
        topic_id: String,
        #[arg(long)]
        count: Option<i64>,
        #[arg(long)]
        difficulty: Option<String>,
    },
}

fn load_catalog(settings: &Settings) -> anyhow::Result<Arc<Catalog>> {
    let cwd = std::env::current_dir()?;
    let dir = settings.data.catalog_path(&cwd);
    let catalog = Catalog::load_dir(&dir).with_context(|| format!("loading catalog from {}", dir.display()))?;
    tracing::info!(dir = %dir.display(), materials = catalog.materials().len(), topics = catalog.topics().len(), "catalog loaded");
    Ok(Arc::new(catalog))
}

// Listing never embeds, so it must not require provider credentials.
fn listing_engine(catalog: Arc<Catalog>, settings: &Settings) -> SemanticSearchEngine {
    SemanticSearchEngine::new(catalog, Arc::new(HashEmbedder::new(settings.embedding.dim)))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load().context("loading configuration")?;
    let settings = config.settings()?;
    let catalog = load_catalog(&settings)?;

    match cli.command {
        Command::Search { query, subject, topic, top_k, min_similarity, context } => {
            let embedder = get_default_embedder(&settings)?;
            let engine = SemanticSearchEngine::new(catalog, embedder);
            let defaults = SearchOptions::from(&settings.retrieval);
            let options = SearchOptions {
                subject,
                topic,
                top_k: top_k.unwrap_or(defaults.top_k),
                min_similarity: min_similarity.unwrap_or(defaults.min_similarity),
            };
            let hits = engine.search(&query, &options).await?;
            if context {
                print!("{}", format_context(&hits));
            } else {
                println!("{}", serde_json::to_string_pretty(&hits)?);
            }
        }
        Command::Subjects => {
            let engine = listing_engine(catalog, &settings);
            println!("{}", serde_json::to_string_pretty(&engine.subjects().await?)?);
        }
        Command::Topics { subject } => {
            let engine = listing_engine(catalog, &settings);
            println!("{}", serde_json::to_string_pretty(&engine.topics(&subject).await?)?);
        }
        Command::Quiz { topic_id, count, difficulty } => {
            let generator = Arc::new(GeminiGenerator::new(&settings.gemini)?);
            let chain = ModelChain::from_settings(&settings.quiz)?;
            let engine = QuizEngine::new(catalog, generator, chain, settings.quiz.clone());
            let request = QuizRequest { topic_id, question_count: count, difficulty };
            let response = engine.generate(&request).await?;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
    }
    Ok(())
}
