//! Answers produced by the synthesis tiers.

/// Prefix on every answer not grounded in a successful primary synthesis.
pub const INFERRED_PREFIX: &str = "[INFERRED] ";
/// Prefix on answers produced when synthesis itself failed.
pub const ERROR_PREFIX: &str = "[ERROR] ";

/// Which tier produced an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerSource {
    /// Generative model over the retrieved context.
    Generative,
    /// Extractive span from the first retrieved passage.
    Extractive,
    /// Extractive pass ran but produced no valid span.
    Unextractable,
    /// Retrieval was empty; fallback text from the enhancement table.
    MappingFallback,
    /// Retrieval was empty and no fallback text matched.
    NoContext,
    /// Synthesis failed outright.
    Error,
}

impl AnswerSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Generative => "generative",
            Self::Extractive => "extractive",
            Self::Unextractable => "unextractable",
            Self::MappingFallback => "mapping-fallback",
            Self::NoContext => "no-context",
            Self::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerRecord {
    /// Display text, including any `[INFERRED]`/`[ERROR]` prefix.
    pub text: String,
    pub is_inferred: bool,
    pub source: AnswerSource,
}

impl AnswerRecord {
    /// A grounded answer from the primary tier.
    pub fn generated(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_inferred: false,
            source: AnswerSource::Generative,
        }
    }

    /// An answer that carries the `[INFERRED]` tag.
    pub fn inferred(text: &str, source: AnswerSource) -> Self {
        Self {
            text: format!("{INFERRED_PREFIX}{text}"),
            is_inferred: true,
            source,
        }
    }

    pub fn error(text: &str) -> Self {
        Self {
            text: format!("{ERROR_PREFIX}{text}"),
            is_inferred: true,
            source: AnswerSource::Error,
        }
    }

    pub fn is_error(&self) -> bool {
        self.source == AnswerSource::Error
    }
}
