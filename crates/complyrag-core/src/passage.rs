//! Section-tagged policy passages shared between the chunker, the index
//! builder and the retriever.

use serde::{Deserialize, Serialize};

/// Body text recorded for a heading that had no text under it.
///
/// Full-scan retrieval never returns passages carrying this body.
pub const NO_TEXT_SENTINEL: &str = "[No text extracted]";

/// A unit of extracted policy text.
///
/// Stored as a JSON array by the chunking stage; field names follow the
/// on-disk format (`section`, `title`, `text`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Passage {
    /// Policy section identifier, e.g. `4.4` or `4.12.1`.
    #[serde(rename = "section", default = "unknown_section")]
    pub section_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(rename = "text", default)]
    pub body_text: String,
}

fn unknown_section() -> String {
    "Unknown".to_string()
}

impl Passage {
    pub fn new(
        section_id: impl Into<String>,
        title: impl Into<String>,
        body_text: impl Into<String>,
    ) -> Self {
        Self {
            section_id: section_id.into(),
            title: title.into(),
            body_text: body_text.into(),
        }
    }

    /// True when the chunker found no text under this heading.
    pub fn is_placeholder(&self) -> bool {
        self.body_text.trim() == NO_TEXT_SENTINEL
    }
}
