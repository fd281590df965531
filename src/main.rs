//! # Answer Harness CLI (`ans`)
//!
//! The `ans` binary answers questions from a directory of plain-text study
//! documents, showing which sources support the answer and how confident
//! the retrieval layer is.
//!
//! ## Usage
//!
//! ```bash
//! ans --config ./config/ans.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `ans corpus` | List the documents loaded from the corpus root |
//! | `ans chunks [--doc <id>]` | Show chunk boundaries for one or all documents |
//! | `ans rank "<query>"` | Show the ranked matches for a query |
//! | `ans ask "<query>"` | Answer a question from the corpus |
//! | `ans summarize <id>` | Summarize one document |
//!
//! ## Examples
//!
//! ```bash
//! # What does my material say about photosynthesis?
//! ans ask "what pigment do plants use" --config ./config/ans.toml
//!
//! # Inspect retrieval without calling the model
//! ans rank "cell membrane transport" --config ./config/ans.toml
//!
//! # Answer in another language
//! ans ask "¿qué es la fotosíntesis?" --language es
//! ```

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use answer_harness::config::{load_config, Config};
use answer_harness::corpus::load_corpus;
use answer_harness::engine::AnswerEngine;
use answer_harness::models::{AnswerResult, SourceDocument};

/// Answer Harness CLI — ask questions grounded in your own study
/// documents.
#[derive(Parser)]
#[command(
    name = "ans",
    about = "Answer Harness — a retrieval-grounded answering engine for your documents",
    version,
    long_about = "Answer Harness chunks a directory of plain-text documents, ranks the chunks \
    against your question, and asks a generative model to answer using only that material, \
    reporting sources and a grounding confidence alongside the answer."
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/ans.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// List the documents loaded from the corpus root.
    Corpus,

    /// Show chunk boundaries for one or all documents.
    Chunks {
        /// Only show chunks for this document id (relative path).
        #[arg(long)]
        doc: Option<String>,
    },

    /// Show the ranked matches for a query without calling the model.
    Rank {
        /// The query string.
        query: String,
    },

    /// Answer a question from the corpus.
    Ask {
        /// The question.
        query: String,

        /// Answer language code (e.g. `es`); defaults to the configured
        /// language.
        #[arg(long)]
        language: Option<String>,

        /// Print the result as JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Summarize one document.
    Summarize {
        /// Document id (relative path within the corpus root).
        doc: String,

        /// Answer language code.
        #[arg(long)]
        language: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli.config)?;

    match cli.command {
        Commands::Corpus => cmd_corpus(&config),
        Commands::Chunks { doc } => cmd_chunks(config, doc),
        Commands::Rank { query } => cmd_rank(config, &query),
        Commands::Ask {
            query,
            language,
            json,
        } => cmd_ask(config, &query, language.as_deref(), json).await,
        Commands::Summarize { doc, language } => {
            cmd_summarize(config, &doc, language.as_deref()).await
        }
    }
}

fn corpus_documents(config: &Config) -> Result<Vec<SourceDocument>> {
    let corpus = config
        .corpus
        .as_ref()
        .context("No [corpus] section in config")?;
    load_corpus(corpus)
}

fn cmd_corpus(config: &Config) -> Result<()> {
    let docs = corpus_documents(config)?;
    println!("corpus ({} documents)", docs.len());
    for doc in &docs {
        println!(
            "  {}  \"{}\"  {} chars",
            doc.id,
            doc.display_name,
            doc.raw_content.len()
        );
    }
    Ok(())
}

fn cmd_chunks(config: Config, doc_filter: Option<String>) -> Result<()> {
    let mut engine = AnswerEngine::from_config(config)?;
    let docs = corpus_documents(engine.config())?;
    let indexed = engine.index_documents(&docs);

    for doc in &indexed {
        if let Some(ref filter) = doc_filter {
            if &doc.id != filter {
                continue;
            }
        }
        println!("{} \"{}\" ({} chunks)", doc.id, doc.display_name, doc.chunks.len());
        for chunk in &doc.chunks {
            let preview: String = chunk.text.chars().take(72).collect();
            println!("  [{}] {}", chunk.sequence_index, preview);
        }
    }

    if let Some(filter) = doc_filter {
        if !indexed.iter().any(|d| d.id == filter) {
            bail!("No document with id '{}' in the corpus", filter);
        }
    }
    Ok(())
}

fn cmd_rank(config: Config, query: &str) -> Result<()> {
    let mut engine = AnswerEngine::from_config(config)?;
    let docs = corpus_documents(engine.config())?;
    let matches = engine.rank(&docs, query);

    if matches.is_empty() {
        println!("no matches");
        return Ok(());
    }
    for m in &matches {
        let preview: String = m.chunk.text.chars().take(72).collect();
        println!(
            "{:>7.3}  {} [{}]  {}",
            m.relevance_score, m.chunk.source_name, m.chunk.sequence_index, preview
        );
    }
    Ok(())
}

async fn cmd_ask(
    config: Config,
    query: &str,
    language: Option<&str>,
    json: bool,
) -> Result<()> {
    let mut engine = AnswerEngine::from_config(config)?;
    let docs = corpus_documents(engine.config())?;
    let result = engine.ask(&docs, query, language).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_result(&result);
    }
    Ok(())
}

async fn cmd_summarize(config: Config, doc_id: &str, language: Option<&str>) -> Result<()> {
    let mut engine = AnswerEngine::from_config(config)?;
    let docs = corpus_documents(engine.config())?;
    let doc = docs
        .iter()
        .find(|d| d.id == doc_id)
        .with_context(|| format!("No document with id '{}' in the corpus", doc_id))?
        .clone();
    let result = engine.summarize(&doc, language).await;
    print_result(&result);
    Ok(())
}

// An in-band answer error is still a successful invocation; only config
// and corpus failures exit non-zero.
fn print_result(result: &AnswerResult) {
    if let Some(ref err) = result.error {
        println!("error: {}", err);
        return;
    }
    println!("{}", result.answer_text);
    println!();
    println!(
        "confidence: {:.0}/100 ({})",
        result.confidence,
        if result.grounded { "grounded" } else { "not grounded" }
    );
    if !result.sources.is_empty() {
        println!("sources:");
        for s in &result.sources {
            println!("  {}  ({:.3})", s.source, s.relevance);
        }
    }
}
