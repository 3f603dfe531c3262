use thiserror::Error;

#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error("{0} not loaded")]
    Unavailable(&'static str),

    #[error("query embedding failed: {0}")]
    Embed(String),

    #[error("vector search failed: {0}")]
    Search(String),
}

#[derive(Debug, Error)]
pub enum SynthesisError {
    #[error("no generative model loaded")]
    NoGenerator,

    #[error("{model} failed: {reason}")]
    Generation { model: String, reason: String },

    #[error("no extractive reader loaded")]
    NoReader,

    #[error("extraction failed: {0}")]
    Extraction(String),
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to persist report: {0}")]
    Persist(#[from] tempfile::PersistError),
}
