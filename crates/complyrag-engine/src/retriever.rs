//! Passage retrieval as an ordered chain of strategies.
//!
//! Each mode in the chain is tried in turn until one yields passages. A mode
//! that errors is logged and treated like a mode that found nothing. Output
//! is deduplicated by exact body text, keeping the first occurrence.

use std::collections::HashSet;

use complyrag_core::{EnhancedQuery, Passage};
use complyrag_store::PassageStore;
use tracing::{debug, info, warn};

use crate::error::RetrievalError;
use crate::traits::{QueryEmbedder, VectorIndex};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetrievalMode {
    /// Embed the enhanced query and search the vector index.
    Indexed,
    /// Case-insensitive substring scan of every passage for the original query.
    FullScan,
}

impl RetrievalMode {
    /// Indexed search first, full scan when it comes back empty.
    pub const DEFAULT_CHAIN: [RetrievalMode; 2] = [Self::Indexed, Self::FullScan];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Indexed => "indexed",
            Self::FullScan => "full-scan",
        }
    }
}

/// Outcome of one strategy in the chain.
enum Attempt<'p> {
    Found(Vec<&'p Passage>),
    Exhausted,
}

pub struct Retriever<'a> {
    passages: &'a PassageStore,
    embedder: Option<Box<dyn QueryEmbedder>>,
    index: Option<Box<dyn VectorIndex>>,
    modes: Vec<RetrievalMode>,
}

impl<'a> Retriever<'a> {
    /// A retriever over `passages` with the default chain and no index loaded.
    pub fn new(passages: &'a PassageStore) -> Self {
        Self {
            passages,
            embedder: None,
            index: None,
            modes: RetrievalMode::DEFAULT_CHAIN.to_vec(),
        }
    }

    pub fn with_embedder(mut self, embedder: Box<dyn QueryEmbedder>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    pub fn with_index(mut self, index: Box<dyn VectorIndex>) -> Self {
        self.index = Some(index);
        self
    }

    pub fn with_modes(mut self, modes: &[RetrievalMode]) -> Self {
        self.modes = modes.to_vec();
        self
    }

    pub fn modes(&self) -> &[RetrievalMode] {
        &self.modes
    }

    /// Bodies of the passages relevant to `query`, deduplicated, in rank order.
    ///
    /// Empty when every strategy in the chain came back empty or failed.
    pub async fn retrieve(&mut self, query: &EnhancedQuery, top_k: usize) -> Vec<String> {
        let passages = self.passages;
        for mode in self.modes.clone() {
            match self.attempt(mode, query, top_k).await {
                Attempt::Found(hits) => {
                    info!(
                        mode = mode.as_str(),
                        sections = ?hits.iter().map(|p| p.section_id.as_str()).collect::<Vec<_>>(),
                        titles = ?hits.iter().map(|p| p.title.as_str()).collect::<Vec<_>>(),
                        "retrieved passages"
                    );
                    return hits.into_iter().map(|p| p.body_text.clone()).collect();
                }
                Attempt::Exhausted => {
                    debug!(mode = mode.as_str(), corpus = passages.len(), "no passages, trying next strategy");
                }
            }
        }
        warn!(query = %query.original(), "no passages found by any retrieval strategy");
        Vec::new()
    }

    async fn attempt(
        &mut self,
        mode: RetrievalMode,
        query: &EnhancedQuery,
        top_k: usize,
    ) -> Attempt<'a> {
        let passages = self.passages;
        let result = match mode {
            RetrievalMode::Indexed => self.indexed(query, top_k).await,
            RetrievalMode::FullScan => Ok(passages.full_scan(query.original())),
        };
        match result {
            Ok(hits) => {
                let hits = dedup_by_text(hits);
                if hits.is_empty() {
                    Attempt::Exhausted
                } else {
                    Attempt::Found(hits)
                }
            }
            Err(e) => {
                warn!(mode = mode.as_str(), error = %e, "retrieval strategy failed");
                Attempt::Exhausted
            }
        }
    }

    async fn indexed(
        &mut self,
        query: &EnhancedQuery,
        top_k: usize,
    ) -> Result<Vec<&'a Passage>, RetrievalError> {
        let passages = self.passages;
        let embedder = self
            .embedder
            .as_mut()
            .ok_or(RetrievalError::Unavailable("query embedder"))?;
        let index = self
            .index
            .as_ref()
            .ok_or(RetrievalError::Unavailable("vector index"))?;

        let vector = embedder
            .embed_query(query.text())
            .map_err(|e| RetrievalError::Embed(format!("{e:#}")))?;
        let positions = index
            .nearest(&vector, top_k)
            .await
            .map_err(|e| RetrievalError::Search(format!("{e:#}")))?;

        let mut hits = Vec::with_capacity(positions.len().min(top_k));
        for idx in positions.into_iter().take(top_k) {
            match passages.get(idx) {
                Some(p) => hits.push(p),
                None => debug!(idx, corpus = passages.len(), "index hit outside passage file, skipped"),
            }
        }
        Ok(hits)
    }
}

/// Drop passages whose body text was already seen, keeping first occurrences.
fn dedup_by_text(hits: Vec<&Passage>) -> Vec<&Passage> {
    let mut seen = HashSet::new();
    hits.into_iter()
        .filter(|&p| seen.insert(p.body_text.as_str()))
        .collect()
}
