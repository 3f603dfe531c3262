//! Engine trait impls for the concrete model and index backends.

#[cfg(any(feature = "lancedb", feature = "llm"))]
use async_trait::async_trait;

#[cfg(any(feature = "onnx", feature = "lancedb", feature = "llm"))]
use crate::traits::*;

#[cfg(feature = "onnx")]
impl QueryEmbedder for complyrag_ai::SentenceEncoder {
    fn embed_query(&mut self, text: &str) -> anyhow::Result<Vec<f32>> {
        self.encode(text)
    }
}

#[cfg(feature = "onnx")]
impl ExtractiveReader for complyrag_ai::SpanReader {
    fn predict(
        &mut self,
        question: &str,
        context: &str,
    ) -> anyhow::Result<complyrag_ai::SpanPrediction> {
        complyrag_ai::SpanReader::predict(self, question, context)
    }

    fn decode(&self, ids: &[u32]) -> anyhow::Result<String> {
        complyrag_ai::SpanReader::decode(self, ids)
    }
}

#[cfg(feature = "lancedb")]
#[async_trait]
impl VectorIndex for complyrag_store::LanceStore {
    async fn nearest(&self, query_vector: &[f32], limit: usize) -> anyhow::Result<Vec<usize>> {
        Ok(self.nearest_passages(query_vector, limit).await?)
    }
}

#[cfg(feature = "llm")]
#[async_trait]
impl Generator for complyrag_ai::ChatClient {
    fn name(&self) -> &str {
        self.model()
    }

    async fn generate(&self, query: &str, context: &str) -> anyhow::Result<String> {
        let prompt = complyrag_ai::prompt::build_answer_prompt(query, context);
        Ok(self
            .complete(Some(complyrag_ai::prompt::SYSTEM_PROMPT), &prompt)
            .await?)
    }
}
