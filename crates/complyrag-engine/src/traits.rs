//! Seams between the pipeline and its model/index backends.
//!
//! Each backend is optional at runtime. A component whose backend is absent
//! (not compiled in, or failed to load) degrades to the next strategy or
//! tier instead of failing the query.

use async_trait::async_trait;
use complyrag_ai::SpanPrediction;

/// Turns query text into a vector in the passage embedding space.
pub trait QueryEmbedder: Send {
    fn embed_query(&mut self, text: &str) -> anyhow::Result<Vec<f32>>;
}

/// Nearest-neighbour search over embedded passages.
///
/// Returns positions into the passage file, nearest first.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    async fn nearest(&self, query_vector: &[f32], limit: usize) -> anyhow::Result<Vec<usize>>;
}

/// Primary answer tier: a generative model over the retrieved context.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Name for logs.
    fn name(&self) -> &str;

    async fn generate(&self, query: &str, context: &str) -> anyhow::Result<String>;
}

/// Secondary answer tier: span extraction from a single passage.
pub trait ExtractiveReader: Send {
    fn predict(&mut self, question: &str, context: &str) -> anyhow::Result<SpanPrediction>;

    fn decode(&self, ids: &[u32]) -> anyhow::Result<String>;
}
