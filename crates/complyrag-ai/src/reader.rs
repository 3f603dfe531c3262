//! Extractive question answering over a short passage.
//!
//! Runs a SQuAD-tuned encoder (e.g. distilbert-base-uncased-distilled-squad
//! exported to ONNX) over the (question, context) pair and picks the argmax
//! start and end logits. Span validation is left to the caller.

use std::path::Path;

use ort::value::Tensor;
use tracing::{debug, info};

use crate::SpanPrediction;
use crate::model::{OnnxModel, argmax};

/// Question + context token budget of BERT-sized QA models.
const MAX_SEQ_LEN: usize = 512;

pub struct SpanReader {
    model: OnnxModel,
}

impl SpanReader {
    /// Load a QA model from a directory containing `model.onnx` and `tokenizer.json`.
    pub fn load(model_dir: &Path) -> anyhow::Result<Self> {
        let model = OnnxModel::load(model_dir, MAX_SEQ_LEN, false)?;
        info!(model = %model_dir.display(), "loaded extractive QA model");
        Ok(Self { model })
    }

    /// Predict the most likely answer span for `question` within `context`.
    pub fn predict(&mut self, question: &str, context: &str) -> anyhow::Result<SpanPrediction> {
        let encoding = self
            .model
            .tokenizer
            .encode((question, context), true)
            .map_err(|e| anyhow::anyhow!("tokenize: {e}"))?;

        let input_ids: Vec<u32> = encoding.get_ids().to_vec();
        let seq_len = input_ids.len();
        anyhow::ensure!(seq_len > 0, "empty encoding for question/context pair");

        let ids: Vec<i64> = input_ids.iter().map(|&id| id as i64).collect();
        let mask: Vec<i64> = encoding
            .get_attention_mask()
            .iter()
            .map(|&m| m as i64)
            .collect();
        let shape = [1i64, seq_len as i64];

        let outputs = self.model.session.run(ort::inputs![
            "input_ids" => Tensor::from_array((shape, ids.into_boxed_slice()))?,
            "attention_mask" => Tensor::from_array((shape, mask.into_boxed_slice()))?,
        ])?;

        let (_, start_logits) = outputs["start_logits"].try_extract_tensor::<f32>()?;
        let (_, end_logits) = outputs["end_logits"].try_extract_tensor::<f32>()?;

        let start = argmax(start_logits).ok_or_else(|| anyhow::anyhow!("empty start logits"))?;
        let end = argmax(end_logits).ok_or_else(|| anyhow::anyhow!("empty end logits"))?;
        debug!(start, end, seq_len, "predicted answer span");

        Ok(SpanPrediction {
            start,
            end,
            input_ids,
        })
    }

    /// Decode token ids back to text, dropping special tokens.
    pub fn decode(&self, ids: &[u32]) -> anyhow::Result<String> {
        self.model
            .tokenizer
            .decode(ids, true)
            .map_err(|e| anyhow::anyhow!("decode: {e}"))
    }
}
