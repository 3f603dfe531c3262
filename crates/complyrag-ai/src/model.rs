//! Shared loading for ONNX transformer models exported with a
//! HuggingFace `tokenizer.json`.

use std::path::Path;

use ort::session::Session;
use tokenizers::{PaddingParams, Tokenizer, TruncationParams};

/// A loaded ONNX session and its tokenizer.
pub(crate) struct OnnxModel {
    pub session: Session,
    pub tokenizer: Tokenizer,
}

impl OnnxModel {
    /// Load `model.onnx` and `tokenizer.json` from `model_dir`.
    ///
    /// Inputs are truncated to `max_length` tokens; with `pad` every input in
    /// a batch is padded to the longest one.
    pub fn load(model_dir: &Path, max_length: usize, pad: bool) -> anyhow::Result<Self> {
        let model_path = model_dir.join("model.onnx");
        let tokenizer_path = model_dir.join("tokenizer.json");

        anyhow::ensure!(model_path.exists(), "model.onnx not found in {model_dir:?}");
        anyhow::ensure!(
            tokenizer_path.exists(),
            "tokenizer.json not found in {model_dir:?}"
        );

        let session = Session::builder()?.commit_from_file(&model_path)?;

        let mut tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| anyhow::anyhow!("load tokenizer: {e}"))?;
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length,
                ..Default::default()
            }))
            .map_err(|e| anyhow::anyhow!("set truncation: {e}"))?;
        if pad {
            tokenizer.with_padding(Some(PaddingParams::default()));
        }

        Ok(Self { session, tokenizer })
    }
}

/// Index of the largest value; ties resolve to the first.
pub(crate) fn argmax(values: &[f32]) -> Option<usize> {
    values
        .iter()
        .enumerate()
        .fold(None, |best: Option<(usize, f32)>, (i, &v)| match best {
            Some((_, b)) if b >= v => best,
            _ => Some((i, v)),
        })
        .map(|(i, _)| i)
}

/// L2-normalize a vector in place.
pub(crate) fn normalize(v: &mut [f32]) {
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}
