//! Optional model and index backends, loaded once at startup.
//!
//! A backend that is compiled out or fails to load is left empty; the engine
//! then skips the strategy or tier that needs it.

use std::path::{Path, PathBuf};

use clap::Args;
use complyrag_engine::{
    ExtractiveReader, Generator, QueryEmbedder, RetrievalMode, Retriever, SynthesisSettings,
    Synthesizer, VectorIndex,
};
use complyrag_core::ComplianceConfig;
use complyrag_store::PassageStore;
use tracing::info;
#[cfg(not(all(feature = "onnx", feature = "lancedb", feature = "llm")))]
use tracing::debug;
#[cfg(any(feature = "onnx", feature = "lancedb", feature = "llm"))]
use tracing::warn;

/// Paths, models and budgets shared by the `query` and `report` stages.
#[derive(Args, Debug)]
pub struct EngineArgs {
    /// Passage file written by `chunk`
    #[arg(long, env = "COMPLYRAG_PASSAGES", default_value = "data/knowledge_base/chunks_structured.json")]
    pub passages: PathBuf,

    /// Compliance mapping (enhancements and section → clause mappings)
    #[arg(long, env = "COMPLYRAG_MAPPING", default_value = "data/mappings/compliance_mapping.json")]
    pub mapping: PathBuf,

    /// LanceDB directory written by `index`
    #[arg(long, env = "COMPLYRAG_INDEX", default_value = "data/knowledge_base/lancedb")]
    pub index: PathBuf,

    /// Sentence encoder directory (model.onnx + tokenizer.json)
    #[arg(long, env = "COMPLYRAG_EMBED_MODEL", default_value = "models/multi-qa-MiniLM-L6-cos-v1")]
    pub embed_model: PathBuf,

    /// Extractive QA model directory (model.onnx + tokenizer.json)
    #[arg(long, env = "COMPLYRAG_QA_MODEL", default_value = "models/distilbert-base-uncased-distilled-squad")]
    pub qa_model: PathBuf,

    /// Candidates requested from the vector index
    #[arg(long, default_value_t = complyrag_engine::DEFAULT_TOP_K)]
    pub top_k: usize,

    /// Token budget of the generative context
    #[arg(long, default_value_t = 3000)]
    pub context_budget: usize,

    /// Token budget of the passage given to extractive QA
    #[arg(long, default_value_t = 300)]
    pub extractive_budget: usize,

    /// Skip the vector index and scan every passage
    #[arg(long)]
    pub full_scan: bool,

    /// Groq API key; without it answers come from extractive QA
    #[arg(long, env = "GROQ_API_KEY", hide_env_values = true)]
    pub groq_api_key: Option<String>,

    #[arg(long, env = "GROQ_MODEL", default_value = "llama-3.1-8b-instant")]
    pub groq_model: String,

    #[arg(long, env = "GROQ_BASE_URL", default_value = "https://api.groq.com/openai/v1")]
    pub groq_base_url: String,
}

impl EngineArgs {
    pub fn modes(&self) -> &'static [RetrievalMode] {
        if self.full_scan {
            &[RetrievalMode::FullScan]
        } else {
            &RetrievalMode::DEFAULT_CHAIN
        }
    }

    pub fn settings(&self) -> SynthesisSettings {
        SynthesisSettings {
            context_budget: self.context_budget,
            extractive_budget: self.extractive_budget,
        }
    }
}

#[derive(Default)]
pub struct Backends {
    embedder: Option<Box<dyn QueryEmbedder>>,
    index: Option<Box<dyn VectorIndex>>,
    generator: Option<Box<dyn Generator>>,
    reader: Option<Box<dyn ExtractiveReader>>,
}

impl Backends {
    pub async fn load(args: &EngineArgs) -> Self {
        let mut backends = Self::default();
        if !args.full_scan {
            backends.embedder = load_embedder(&args.embed_model);
            if backends.embedder.is_some() {
                backends.index = load_index(&args.index).await;
            }
        }
        backends.generator = load_generator(args);
        backends.reader = load_reader(&args.qa_model);

        info!(
            embedder = backends.embedder.is_some(),
            index = backends.index.is_some(),
            generator = backends.generator.is_some(),
            reader = backends.reader.is_some(),
            "backends loaded"
        );
        backends
    }

    /// Assemble the retriever and synthesizer around the loaded backends.
    pub fn into_components<'a>(
        self,
        args: &EngineArgs,
        config: &'a ComplianceConfig,
        passages: &'a PassageStore,
    ) -> (Retriever<'a>, Synthesizer<'a>) {
        let mut retriever = Retriever::new(passages).with_modes(args.modes());
        if let Some(embedder) = self.embedder {
            retriever = retriever.with_embedder(embedder);
        }
        if let Some(index) = self.index {
            retriever = retriever.with_index(index);
        }

        let mut synthesizer = Synthesizer::new(config).with_settings(args.settings());
        if let Some(generator) = self.generator {
            synthesizer = synthesizer.with_generator(generator);
        }
        if let Some(reader) = self.reader {
            synthesizer = synthesizer.with_reader(reader);
        }
        (retriever, synthesizer)
    }
}

#[cfg(feature = "onnx")]
fn load_embedder(dir: &Path) -> Option<Box<dyn QueryEmbedder>> {
    match complyrag_ai::SentenceEncoder::load(dir) {
        Ok(encoder) => Some(Box::new(encoder)),
        Err(e) => {
            warn!(error = %e, "sentence encoder unavailable, indexed retrieval disabled");
            None
        }
    }
}

#[cfg(not(feature = "onnx"))]
fn load_embedder(dir: &Path) -> Option<Box<dyn QueryEmbedder>> {
    debug!(model = %dir.display(), "built without `onnx`, indexed retrieval disabled");
    None
}

#[cfg(feature = "onnx")]
fn load_reader(dir: &Path) -> Option<Box<dyn ExtractiveReader>> {
    match complyrag_ai::SpanReader::load(dir) {
        Ok(reader) => Some(Box::new(reader)),
        Err(e) => {
            warn!(error = %e, "extractive QA model unavailable");
            None
        }
    }
}

#[cfg(not(feature = "onnx"))]
fn load_reader(dir: &Path) -> Option<Box<dyn ExtractiveReader>> {
    debug!(model = %dir.display(), "built without `onnx`, extractive QA disabled");
    None
}

#[cfg(feature = "lancedb")]
async fn load_index(dir: &Path) -> Option<Box<dyn VectorIndex>> {
    let opened = async {
        let store = complyrag_store::LanceStore::open(dir).await?;
        let rows = store.passage_count().await?;
        Ok::<_, complyrag_store::StoreError>((store, rows))
    };
    match opened.await {
        Ok((store, rows)) => {
            info!(path = %dir.display(), rows, "opened passage index");
            Some(Box::new(store))
        }
        Err(e) => {
            warn!(path = %dir.display(), error = %e, "passage index unavailable, using full scan");
            None
        }
    }
}

#[cfg(not(feature = "lancedb"))]
async fn load_index(dir: &Path) -> Option<Box<dyn VectorIndex>> {
    debug!(path = %dir.display(), "built without `lancedb`, indexed retrieval disabled");
    None
}

#[cfg(feature = "llm")]
fn load_generator(args: &EngineArgs) -> Option<Box<dyn Generator>> {
    let Some(api_key) = args.groq_api_key.as_deref().filter(|k| !k.trim().is_empty()) else {
        warn!("GROQ_API_KEY not set, generative answers disabled");
        return None;
    };
    let mut settings = complyrag_ai::ChatSettings::new(api_key);
    settings.model = args.groq_model.clone();
    settings.base_url = args.groq_base_url.clone();
    let client = complyrag_ai::ChatClient::new(settings);
    info!(model = client.model(), "generative answers via Groq");
    Some(Box::new(client))
}

#[cfg(not(feature = "llm"))]
fn load_generator(args: &EngineArgs) -> Option<Box<dyn Generator>> {
    debug!(model = %args.groq_model, "built without `llm`, generative answers disabled");
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        engine: EngineArgs,
    }

    #[test]
    fn defaults() {
        let args = Harness::parse_from(["complyrag"]).engine;
        assert_eq!(args.top_k, 20);
        assert_eq!(args.context_budget, 3000);
        assert_eq!(args.extractive_budget, 300);
        assert_eq!(args.modes(), RetrievalMode::DEFAULT_CHAIN);
    }

    #[test]
    fn full_scan_flag_limits_chain() {
        let args = Harness::parse_from(["complyrag", "--full-scan"]).engine;
        assert_eq!(args.modes(), [RetrievalMode::FullScan]);
    }

    #[tokio::test]
    async fn full_scan_without_models_still_builds_components() {
        let args = Harness::parse_from([
            "complyrag",
            "--full-scan",
            "--qa-model",
            "/nonexistent/qa",
            "--groq-api-key",
            "",
        ])
        .engine;
        let backends = Backends::load(&args).await;
        assert!(backends.embedder.is_none());
        assert!(backends.index.is_none());
        assert!(backends.generator.is_none());
        assert!(backends.reader.is_none());

        let config = ComplianceConfig::default();
        let passages = PassageStore::new(vec![]);
        let (retriever, _) = backends.into_components(&args, &config, &passages);
        assert_eq!(retriever.modes(), [RetrievalMode::FullScan]);
    }
}
