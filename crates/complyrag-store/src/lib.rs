//! Storage layer: the passage file, section-aware chunking, and the LanceDB
//! passage index.

mod error;
pub use error::StoreError;

pub mod chunker;
pub use chunker::{ChunkOptions, chunk_sections};

mod passages;
pub use passages::PassageStore;

#[cfg(feature = "lancedb")]
mod lance;
#[cfg(feature = "lancedb")]
pub use lance::LanceStore;
