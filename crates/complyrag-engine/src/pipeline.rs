//! Single-query entry point: enhance, retrieve, synthesize.

use complyrag_core::{AnswerRecord, ComplianceConfig, QueryEnhancer};
use tracing::info;

use crate::retriever::Retriever;
use crate::synthesizer::Synthesizer;

/// Passages requested from the vector index per query.
pub const DEFAULT_TOP_K: usize = 20;

pub struct QueryEngine<'a> {
    enhancer: QueryEnhancer<'a>,
    retriever: Retriever<'a>,
    synthesizer: Synthesizer<'a>,
    top_k: usize,
}

impl<'a> QueryEngine<'a> {
    pub fn new(
        config: &'a ComplianceConfig,
        retriever: Retriever<'a>,
        synthesizer: Synthesizer<'a>,
    ) -> Self {
        Self {
            enhancer: QueryEnhancer::new(config),
            retriever,
            synthesizer,
            top_k: DEFAULT_TOP_K,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Answer one query. Never fails; degraded outcomes are carried in the
    /// record's source and prefix.
    pub async fn ask(&mut self, query: &str) -> AnswerRecord {
        let enhanced = self.enhancer.enhance(query);
        if enhanced.is_enhanced() {
            info!(enhanced = %enhanced.text(), "enhanced query");
        }
        let passages = self.retriever.retrieve(&enhanced, self.top_k).await;
        let answer = self.synthesizer.answer(enhanced.original(), &passages).await;
        info!(
            source = answer.source.as_str(),
            inferred = answer.is_inferred,
            passages = passages.len(),
            "answered query"
        );
        answer
    }
}
