//! Sentence embeddings for passages and queries.
//!
//! Mean-pooled, L2-normalized embeddings from a sentence-transformers model
//! exported to ONNX (MiniLM family, 384 dimensions). The same model must
//! embed the passages at index time and the queries at retrieval time.

use std::path::Path;

use ort::value::Tensor;
use tracing::info;

use crate::model::{OnnxModel, normalize};

/// Maximum sequence length of the MiniLM encoders.
const MAX_SEQ_LEN: usize = 256;

pub struct SentenceEncoder {
    model: OnnxModel,
    dim: usize,
}

impl SentenceEncoder {
    /// Load an encoder from a directory containing `model.onnx` and `tokenizer.json`.
    pub fn load(model_dir: &Path) -> anyhow::Result<Self> {
        let model = OnnxModel::load(model_dir, MAX_SEQ_LEN, true)?;
        let dim = output_dim(model.session.outputs()[0].dtype()).unwrap_or(384);
        info!(dim, model = %model_dir.display(), "loaded sentence encoder");
        Ok(Self { model, dim })
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Embed a single text.
    pub fn encode(&mut self, text: &str) -> anyhow::Result<Vec<f32>> {
        self.encode_batch(&[text])?
            .pop()
            .ok_or_else(|| anyhow::anyhow!("encoder returned no embedding"))
    }

    /// Embed a batch of texts, one normalized vector per input.
    pub fn encode_batch(&mut self, texts: &[&str]) -> anyhow::Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let encodings = self
            .model
            .tokenizer
            .encode_batch(texts.to_vec(), true)
            .map_err(|e| anyhow::anyhow!("tokenize: {e}"))?;

        let rows = encodings.len();
        let seq_len = encodings
            .iter()
            .map(|e| e.get_ids().len())
            .max()
            .unwrap_or(0);

        let mut ids = vec![0i64; rows * seq_len];
        let mut mask = vec![0i64; rows * seq_len];
        let mut type_ids = vec![0i64; rows * seq_len];
        for (row, enc) in encodings.iter().enumerate() {
            let base = row * seq_len;
            for (j, ((&id, &m), &t)) in enc
                .get_ids()
                .iter()
                .zip(enc.get_attention_mask())
                .zip(enc.get_type_ids())
                .enumerate()
            {
                ids[base + j] = id as i64;
                mask[base + j] = m as i64;
                type_ids[base + j] = t as i64;
            }
        }

        let dim = self.dim;
        let shape = [rows as i64, seq_len as i64];
        let outputs = self.model.session.run(ort::inputs![
            "input_ids" => Tensor::from_array((shape, ids.into_boxed_slice()))?,
            "attention_mask" => Tensor::from_array((shape, mask.clone().into_boxed_slice()))?,
            "token_type_ids" => Tensor::from_array((shape, type_ids.into_boxed_slice()))?,
        ])?;

        // Token embeddings: [rows, seq, dim].
        let (out_shape, hidden) = outputs[0].try_extract_tensor::<f32>()?;
        let dims: &[i64] = out_shape;
        anyhow::ensure!(
            dims.len() == 3 && dims[0] as usize == rows && dims[2] as usize == dim,
            "unexpected encoder output shape {dims:?}, expected [{rows}, {seq_len}, {dim}]"
        );
        let out_seq = dims[1] as usize;

        Ok((0..rows)
            .map(|row| {
                let row_mask = &mask[row * seq_len..(row + 1) * seq_len];
                mean_pool(hidden, row_mask, row, out_seq, dim)
            })
            .collect())
    }
}

/// Attention-masked mean over one row's token embeddings, normalized.
fn mean_pool(hidden: &[f32], mask: &[i64], row: usize, seq: usize, dim: usize) -> Vec<f32> {
    let mut pooled = vec![0.0f32; dim];
    let mut tokens = 0.0f32;
    for (j, &m) in mask.iter().take(seq).enumerate() {
        if m == 0 {
            continue;
        }
        let offset = (row * seq + j) * dim;
        for (p, &h) in pooled.iter_mut().zip(&hidden[offset..offset + dim]) {
            *p += h;
        }
        tokens += 1.0;
    }
    if tokens > 0.0 {
        pooled.iter_mut().for_each(|p| *p /= tokens);
    }
    normalize(&mut pooled);
    pooled
}

/// Last dimension of the model's first output, when statically known.
fn output_dim(output_type: &ort::value::ValueType) -> Option<usize> {
    match output_type {
        ort::value::ValueType::Tensor { shape, .. } => shape
            .last()
            .and_then(|&d| if d > 0 { Some(d as usize) } else { None }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn model_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("models")
            .join("multi-qa-MiniLM-L6-cos-v1")
    }

    #[test]
    fn mean_pool_ignores_masked_tokens() {
        // One row, three tokens of dim 2; the last token is padding.
        let hidden = [1.0, 0.0, 3.0, 0.0, 100.0, 100.0];
        let pooled = mean_pool(&hidden, &[1, 1, 0], 0, 3, 2);
        assert!((pooled[0] - 1.0).abs() < 1e-6);
        assert!(pooled[1].abs() < 1e-6);
    }

    #[test]
    #[ignore = "requires models/multi-qa-MiniLM-L6-cos-v1 (model.onnx + tokenizer.json from HuggingFace)"]
    fn encode_is_unit_norm() {
        let mut encoder = SentenceEncoder::load(&model_dir()).unwrap();
        let v = encoder.encode("restrict access to cardholder data").unwrap();
        assert_eq!(v.len(), encoder.dim());
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-4, "expected unit norm, got {norm}");
    }

    #[test]
    #[ignore = "requires models/multi-qa-MiniLM-L6-cos-v1 (model.onnx + tokenizer.json from HuggingFace)"]
    fn related_policy_texts_are_closer() {
        let mut encoder = SentenceEncoder::load(&model_dir()).unwrap();
        let q = encoder.encode("How are passwords managed?").unwrap();
        let pw = encoder
            .encode("Passwords must be rotated every 90 days and contain 12 characters.")
            .unwrap();
        let fire = encoder.encode("Fire extinguishers are inspected annually.").unwrap();
        let dot = |a: &[f32], b: &[f32]| a.iter().zip(b).map(|(x, y)| x * y).sum::<f32>();
        assert!(dot(&q, &pw) > dot(&q, &fire));
    }

    #[test]
    #[ignore = "requires models/multi-qa-MiniLM-L6-cos-v1 (model.onnx + tokenizer.json from HuggingFace)"]
    fn empty_batch() {
        let mut encoder = SentenceEncoder::load(&model_dir()).unwrap();
        assert!(encoder.encode_batch(&[]).unwrap().is_empty());
    }
}
