//! Model inference: ONNX Runtime for query embeddings and extractive QA,
//! a hosted chat-completions endpoint for generative answers.

pub mod prompt;
mod span;
pub use span::SpanPrediction;

#[cfg(feature = "onnx")]
mod model;

#[cfg(feature = "onnx")]
mod embedder;
#[cfg(feature = "onnx")]
pub use embedder::SentenceEncoder;

#[cfg(feature = "onnx")]
mod reader;
#[cfg(feature = "onnx")]
pub use reader::SpanReader;

#[cfg(feature = "llm")]
mod groq;
#[cfg(feature = "llm")]
pub use groq::{ChatClient, ChatError, ChatSettings, DEFAULT_BASE_URL, DEFAULT_MODEL};
