//! Question answering and gap reporting over an indexed policy document.
//!
//! [`QueryEngine`] answers single queries; [`ComplianceReport`] drives the
//! audit battery through it. Model and index backends plug in through the
//! traits in [`traits`]; `onnx`, `lancedb` and `llm` features provide the
//! concrete ones.

mod adapters;
pub mod context;
mod error;
pub mod pipeline;
pub mod report;
pub mod retriever;
pub mod synthesizer;
pub mod traits;

pub use context::truncate_context;
pub use error::{ReportError, RetrievalError, SynthesisError};
pub use pipeline::{DEFAULT_TOP_K, QueryEngine};
pub use report::{ComplianceReport, ReportRecord, write_report};
pub use retriever::{RetrievalMode, Retriever};
pub use synthesizer::{SynthesisSettings, Synthesizer};
pub use traits::{ExtractiveReader, Generator, QueryEmbedder, VectorIndex};
