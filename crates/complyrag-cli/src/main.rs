//! complyrag: compliance question answering and gap reporting over an
//! information security policy.

mod backends;
#[cfg(all(feature = "onnx", feature = "lancedb"))]
mod index;

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use complyrag_core::{AUDIT_QUERIES, ComplianceConfig};
use complyrag_engine::{ComplianceReport, QueryEngine};
use complyrag_store::{ChunkOptions, PassageStore, chunk_sections};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::backends::{Backends, EngineArgs};

#[derive(Parser, Debug)]
#[command(name = "complyrag", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Split extracted policy text into section-tagged passages
    Chunk {
        /// Extracted plain-text policy document
        input: PathBuf,

        /// Passage file to write
        #[arg(long, env = "COMPLYRAG_PASSAGES", default_value = "data/knowledge_base/chunks_structured.json")]
        output: PathBuf,

        /// Split sections longer than this many words
        #[arg(long, default_value_t = 500)]
        max_words: usize,
    },
    /// Embed every passage and (re)build the vector index
    Index {
        #[arg(long, env = "COMPLYRAG_PASSAGES", default_value = "data/knowledge_base/chunks_structured.json")]
        passages: PathBuf,

        #[arg(long, env = "COMPLYRAG_INDEX", default_value = "data/knowledge_base/lancedb")]
        index: PathBuf,

        #[arg(long, env = "COMPLYRAG_EMBED_MODEL", default_value = "models/multi-qa-MiniLM-L6-cos-v1")]
        embed_model: PathBuf,
    },
    /// Answer one query, or read queries from stdin until `exit`
    Query {
        query: Option<String>,

        #[command(flatten)]
        engine: EngineArgs,
    },
    /// Run the audit battery and write the gap analysis report
    Report {
        #[arg(long, env = "COMPLYRAG_REPORT", default_value = "data/output/compliance_report.md")]
        output: PathBuf,

        #[command(flatten)]
        engine: EngineArgs,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    info!("complyrag v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Command::Chunk {
            input,
            output,
            max_words,
        } => cmd_chunk(&input, &output, max_words),
        Command::Index {
            passages,
            index,
            embed_model,
        } => cmd_index(&passages, &index, &embed_model).await,
        Command::Query { query, engine } => cmd_query(query.as_deref(), &engine).await,
        Command::Report { output, engine } => cmd_report(&output, &engine).await,
    }
}

fn cmd_chunk(input: &Path, output: &Path, max_words: usize) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(input)
        .with_context(|| format!("reading {}", input.display()))?;
    let passages = chunk_sections(&text, ChunkOptions { max_words });
    anyhow::ensure!(
        !passages.is_empty(),
        "no numbered section headings found in {}",
        input.display()
    );
    PassageStore::save(&passages, output)
        .with_context(|| format!("writing {}", output.display()))?;
    info!(passages = passages.len(), path = %output.display(), "wrote passage file");
    Ok(())
}

#[cfg(all(feature = "onnx", feature = "lancedb"))]
async fn cmd_index(passages: &Path, index_dir: &Path, embed_model: &Path) -> anyhow::Result<()> {
    let store = PassageStore::load(passages).context("loading passage file")?;
    let mut encoder = complyrag_ai::SentenceEncoder::load(embed_model)
        .context("loading sentence encoder")?;
    let lance = complyrag_store::LanceStore::open(index_dir)
        .await
        .context("opening LanceDB")?;

    let stats = index::run_index_pipeline(&lance, &mut encoder, &store).await?;
    info!(
        passages = stats.total_passages,
        secs = format_args!("{:.1}", stats.elapsed_secs),
        path = %index_dir.display(),
        "passage index built"
    );
    Ok(())
}

#[cfg(not(all(feature = "onnx", feature = "lancedb")))]
async fn cmd_index(_passages: &Path, _index_dir: &Path, _embed_model: &Path) -> anyhow::Result<()> {
    anyhow::bail!("`index` needs the `onnx` and `lancedb` features (build with --features full)")
}

async fn cmd_query(query: Option<&str>, args: &EngineArgs) -> anyhow::Result<()> {
    let config = ComplianceConfig::load_or_empty(&args.mapping);
    let passages = PassageStore::load_or_empty(&args.passages);
    let (retriever, synthesizer) = Backends::load(args)
        .await
        .into_components(args, &config, &passages);
    let mut engine = QueryEngine::new(&config, retriever, synthesizer).with_top_k(args.top_k);

    if let Some(query) = query {
        let answer = engine.ask(query).await;
        println!("{}", answer.text);
        return Ok(());
    }

    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("\nEnter your query (or 'exit' to quit): ");
        std::io::stdout().flush()?;
        let Some(line) = lines.next() else {
            break;
        };
        let query = line?;
        let query = query.trim();
        if query.eq_ignore_ascii_case("exit") {
            break;
        }
        if query.is_empty() {
            continue;
        }
        let answer = engine.ask(query).await;
        println!("\nResponse: {}", answer.text);
    }
    Ok(())
}

async fn cmd_report(output: &Path, args: &EngineArgs) -> anyhow::Result<()> {
    let config = ComplianceConfig::load_or_empty(&args.mapping);
    let passages = PassageStore::load_or_empty(&args.passages);
    let (retriever, synthesizer) = Backends::load(args)
        .await
        .into_components(args, &config, &passages);
    let mut engine = QueryEngine::new(&config, retriever, synthesizer).with_top_k(args.top_k);

    let report = ComplianceReport::assemble(&mut engine, &config, &AUDIT_QUERIES).await;
    report
        .write(output)
        .with_context(|| format!("writing report to {}", output.display()))?;
    eprintln!("Report written to {}", output.display());
    Ok(())
}
