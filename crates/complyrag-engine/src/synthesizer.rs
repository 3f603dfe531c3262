//! Answer synthesis over retrieved passages.
//!
//! Tiers, in order: mapping fallback text when retrieval came back empty,
//! a generative model over the truncated context, then extractive QA over
//! the first passage. Every answer not produced by the generative tier is
//! tagged `[INFERRED]`; a failure of the last tier becomes an `[ERROR]`
//! answer. Nothing here returns an error to the caller.

use complyrag_core::{AnswerRecord, AnswerSource, ComplianceConfig};
use tracing::{debug, error, info, warn};

use crate::context::truncate_context;
use crate::error::SynthesisError;
use crate::traits::{ExtractiveReader, Generator};

pub const NO_INFORMATION: &str = "No relevant information found. Please refine your query.";
pub const UNEXTRACTABLE: &str =
    "Unable to extract a precise answer. Please ask a more specific query.";
pub const PROCESSING_ERROR: &str = "Error processing query. Please try again.";
const EXTRACTIVE_LEAD: &str = "Based on the policy document:";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SynthesisSettings {
    /// Heuristic token budget of the generative context.
    pub context_budget: usize,
    /// Heuristic token budget of the passage given to the extractive reader.
    pub extractive_budget: usize,
}

impl Default for SynthesisSettings {
    fn default() -> Self {
        Self {
            context_budget: 3000,
            extractive_budget: 300,
        }
    }
}

pub struct Synthesizer<'a> {
    config: &'a ComplianceConfig,
    generator: Option<Box<dyn Generator>>,
    reader: Option<Box<dyn ExtractiveReader>>,
    settings: SynthesisSettings,
}

impl<'a> Synthesizer<'a> {
    pub fn new(config: &'a ComplianceConfig) -> Self {
        Self {
            config,
            generator: None,
            reader: None,
            settings: SynthesisSettings::default(),
        }
    }

    pub fn with_generator(mut self, generator: Box<dyn Generator>) -> Self {
        self.generator = Some(generator);
        self
    }

    pub fn with_reader(mut self, reader: Box<dyn ExtractiveReader>) -> Self {
        self.reader = Some(reader);
        self
    }

    pub fn with_settings(mut self, settings: SynthesisSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Answer `query` from `passages` (deduplicated, in rank order).
    pub async fn answer(&mut self, query: &str, passages: &[String]) -> AnswerRecord {
        let Some(first) = passages.first() else {
            return self.without_context(query);
        };

        let context = truncate_context(&passages.join("\n"), self.settings.context_budget);
        match self.generate(query, &context).await {
            Ok(text) => return AnswerRecord::generated(text),
            Err(e) => warn!(error = %e, "primary synthesis unavailable, falling back to extractive QA"),
        }

        let passage = truncate_context(first, self.settings.extractive_budget);
        match self.extract(query, &passage) {
            Ok(Some(span)) => {
                AnswerRecord::inferred(&format!("{EXTRACTIVE_LEAD} {span}"), AnswerSource::Extractive)
            }
            Ok(None) => AnswerRecord::inferred(UNEXTRACTABLE, AnswerSource::Unextractable),
            Err(e) => {
                error!(error = %e, "extractive synthesis failed");
                AnswerRecord::error(PROCESSING_ERROR)
            }
        }
    }

    /// Empty retrieval: mapping fallback text, else the generic message. No
    /// model is invoked.
    fn without_context(&self, query: &str) -> AnswerRecord {
        match self.config.fallback_for(query) {
            Some(text) => {
                info!("no passages retrieved, answering from mapping fallback");
                AnswerRecord::inferred(text, AnswerSource::MappingFallback)
            }
            None => {
                info!("no passages retrieved and no fallback text");
                AnswerRecord::inferred(NO_INFORMATION, AnswerSource::NoContext)
            }
        }
    }

    async fn generate(&self, query: &str, context: &str) -> Result<String, SynthesisError> {
        let generator = self.generator.as_ref().ok_or(SynthesisError::NoGenerator)?;
        let failed = |reason: String| SynthesisError::Generation {
            model: generator.name().to_string(),
            reason,
        };

        let text = generator
            .generate(query, context)
            .await
            .map_err(|e| failed(format!("{e:#}")))?;
        let text = text.trim();
        if text.is_empty() {
            return Err(failed("empty response".into()));
        }
        debug!(model = generator.name(), chars = text.len(), "generated answer");
        Ok(text.to_string())
    }

    /// Decoded answer span, or `None` when the predicted span is invalid.
    fn extract(&mut self, query: &str, passage: &str) -> Result<Option<String>, SynthesisError> {
        let reader = self.reader.as_mut().ok_or(SynthesisError::NoReader)?;
        let prediction = reader
            .predict(query, passage)
            .map_err(|e| SynthesisError::Extraction(format!("{e:#}")))?;

        let Some(ids) = prediction.span_ids() else {
            debug!(
                start = prediction.start,
                end = prediction.end,
                len = prediction.input_ids.len(),
                "predicted span out of bounds"
            );
            return Ok(None);
        };
        let span = reader
            .decode(ids)
            .map_err(|e| SynthesisError::Extraction(format!("{e:#}")))?;
        Ok(Some(span.trim().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use complyrag_ai::SpanPrediction;
    use complyrag_core::EnhancementEntry;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    /// Generator that echoes a fixed answer and records the context it saw.
    struct EchoGenerator {
        reply: anyhow::Result<String>,
        seen: Arc<Mutex<Vec<String>>>,
    }

    impl EchoGenerator {
        fn ok(reply: &str) -> Self {
            Self {
                reply: Ok(reply.to_string()),
                seen: Arc::default(),
            }
        }

        fn failing() -> Self {
            Self {
                reply: Err(anyhow::anyhow!("503 service unavailable")),
                seen: Arc::default(),
            }
        }
    }

    #[async_trait]
    impl Generator for EchoGenerator {
        fn name(&self) -> &str {
            "echo"
        }

        async fn generate(&self, _query: &str, context: &str) -> anyhow::Result<String> {
            self.seen.lock().unwrap().push(context.to_string());
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(e) => Err(anyhow::anyhow!("{e}")),
            }
        }
    }

    /// Reader over whitespace tokens: token `i` of the context has id `i`.
    struct WordReader {
        span: (usize, usize),
        words: Vec<String>,
        fail: bool,
        calls: Arc<AtomicUsize>,
    }

    impl WordReader {
        fn spanning(start: usize, end: usize) -> Self {
            Self {
                span: (start, end),
                words: Vec::new(),
                fail: false,
                calls: Arc::default(),
            }
        }
    }

    impl ExtractiveReader for WordReader {
        fn predict(&mut self, _question: &str, context: &str) -> anyhow::Result<SpanPrediction> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            anyhow::ensure!(!self.fail, "inference failed");
            self.words = context.split_whitespace().map(String::from).collect();
            Ok(SpanPrediction {
                start: self.span.0,
                end: self.span.1,
                input_ids: (0..self.words.len() as u32).collect(),
            })
        }

        fn decode(&self, ids: &[u32]) -> anyhow::Result<String> {
            Ok(ids
                .iter()
                .map(|&i| self.words[i as usize].as_str())
                .collect::<Vec<_>>()
                .join(" "))
        }
    }

    fn config() -> ComplianceConfig {
        ComplianceConfig {
            enhancements: vec![
                EnhancementEntry {
                    trigger_keyword: "password".into(),
                    extra_sections: vec!["4.5".into()],
                    extra_keywords: vec![],
                    fallback_text: None,
                },
                EnhancementEntry {
                    trigger_keyword: "password".into(),
                    extra_sections: vec![],
                    extra_keywords: vec![],
                    fallback_text: Some("Passwords follow the credential standard.".into()),
                },
            ],
            mappings: vec![],
        }
    }

    fn passages() -> Vec<String> {
        vec![
            "Passwords rotate every 90 days".to_string(),
            "Accounts lock after five failed attempts".to_string(),
        ]
    }

    #[tokio::test]
    async fn empty_retrieval_uses_mapping_fallback() {
        let cfg = config();
        let generator = EchoGenerator::ok("should not be called");
        let seen = Arc::clone(&generator.seen);
        let reader = WordReader::spanning(0, 1);
        let predicted = Arc::clone(&reader.calls);
        let mut synth = Synthesizer::new(&cfg)
            .with_generator(Box::new(generator))
            .with_reader(Box::new(reader));

        let answer = synth.answer("How are PASSWORDS managed?", &[]).await;
        assert_eq!(answer.text, "[INFERRED] Passwords follow the credential standard.");
        assert_eq!(answer.source, AnswerSource::MappingFallback);
        assert!(answer.is_inferred);
        assert!(seen.lock().unwrap().is_empty());
        assert_eq!(predicted.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn empty_retrieval_without_fallback() {
        let cfg = config();
        let reader = WordReader::spanning(0, 1);
        let predicted = Arc::clone(&reader.calls);
        let mut synth = Synthesizer::new(&cfg).with_reader(Box::new(reader));
        let answer = synth.answer("What is the badge policy?", &[]).await;
        assert_eq!(predicted.load(Ordering::SeqCst), 0);
        assert_eq!(
            answer.text,
            "[INFERRED] No relevant information found. Please refine your query."
        );
        assert_eq!(answer.source, AnswerSource::NoContext);
    }

    #[tokio::test]
    async fn generative_answer_is_not_inferred() {
        let cfg = config();
        let generator = EchoGenerator::ok("  Passwords are rotated quarterly.  ");
        let seen = Arc::clone(&generator.seen);
        let mut synth = Synthesizer::new(&cfg).with_generator(Box::new(generator));

        let answer = synth.answer("passwords?", &passages()).await;
        assert_eq!(answer.text, "Passwords are rotated quarterly.");
        assert!(!answer.is_inferred);
        assert_eq!(answer.source, AnswerSource::Generative);
        assert_eq!(
            seen.lock().unwrap()[0],
            "Passwords rotate every 90 days Accounts lock after five failed attempts"
        );
    }

    #[tokio::test]
    async fn generative_context_respects_budget() {
        let cfg = config();
        let generator = EchoGenerator::ok("ok");
        let seen = Arc::clone(&generator.seen);
        let mut synth = Synthesizer::new(&cfg)
            .with_generator(Box::new(generator))
            .with_settings(SynthesisSettings {
                context_budget: 6,
                extractive_budget: 300,
            });

        synth.answer("q", &passages()).await;
        assert_eq!(seen.lock().unwrap()[0], "Passwords rotate every 90");
    }

    #[tokio::test]
    async fn generator_failure_falls_back_to_extractive() {
        let cfg = config();
        let mut synth = Synthesizer::new(&cfg)
            .with_generator(Box::new(EchoGenerator::failing()))
            .with_reader(Box::new(WordReader::spanning(3, 4)));

        let answer = synth.answer("How often?", &passages()).await;
        assert_eq!(
            answer.text,
            "[INFERRED] Based on the policy document: 90 days"
        );
        assert_eq!(answer.source, AnswerSource::Extractive);
    }

    #[tokio::test]
    async fn empty_generation_counts_as_failure() {
        let cfg = config();
        let mut synth = Synthesizer::new(&cfg)
            .with_generator(Box::new(EchoGenerator::ok("   ")))
            .with_reader(Box::new(WordReader::spanning(0, 0)));

        let answer = synth.answer("q", &passages()).await;
        assert_eq!(answer.source, AnswerSource::Extractive);
        assert_eq!(answer.text, "[INFERRED] Based on the policy document: Passwords");
    }

    #[tokio::test]
    async fn missing_generator_is_inferred_extractive() {
        let cfg = config();
        let mut synth = Synthesizer::new(&cfg).with_reader(Box::new(WordReader::spanning(0, 1)));
        let answer = synth.answer("q", &passages()).await;
        assert!(answer.is_inferred);
        assert_eq!(
            answer.text,
            "[INFERRED] Based on the policy document: Passwords rotate"
        );
    }

    #[tokio::test]
    async fn extractive_uses_only_first_passage_within_budget() {
        let cfg = config();
        let mut synth = Synthesizer::new(&cfg)
            .with_reader(Box::new(WordReader::spanning(1, 2)))
            .with_settings(SynthesisSettings {
                context_budget: 3000,
                extractive_budget: 3,
            });
        let answer = synth.answer("q", &passages()).await;
        // Budget of 3 keeps two words, so end index 2 is out of range.
        assert_eq!(answer.source, AnswerSource::Unextractable);
    }

    #[tokio::test]
    async fn invalid_span_is_unextractable() {
        let cfg = config();
        let mut synth = Synthesizer::new(&cfg).with_reader(Box::new(WordReader::spanning(3, 1)));
        let answer = synth.answer("q", &passages()).await;
        assert_eq!(
            answer.text,
            "[INFERRED] Unable to extract a precise answer. Please ask a more specific query."
        );
        assert_eq!(answer.source, AnswerSource::Unextractable);
    }

    #[tokio::test]
    async fn reader_failure_is_error_answer() {
        let cfg = config();
        let mut reader = WordReader::spanning(0, 0);
        reader.fail = true;
        let mut synth = Synthesizer::new(&cfg).with_reader(Box::new(reader));
        let answer = synth.answer("q", &passages()).await;
        assert_eq!(answer.text, "[ERROR] Error processing query. Please try again.");
        assert!(answer.is_error());
    }

    #[tokio::test]
    async fn no_models_at_all_is_error_answer() {
        let cfg = config();
        let mut synth = Synthesizer::new(&cfg);
        let answer = synth.answer("q", &passages()).await;
        assert!(answer.is_error());
    }
}
