//! Section-aware chunking of extracted policy text.
//!
//! Splits on numbered headings (`4`, `4.1`, `4.1.1`) at the start of a line,
//! keeps each section intact, and cuts very long sections into word-bounded
//! pieces that share the section's id and title.

use std::sync::LazyLock;

use complyrag_core::{NO_TEXT_SENTINEL, Passage};
use regex::Regex;

static HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*(\d+(?:\.\d+){0,2})[ \t]+([^\n]+)$").expect("valid heading regex")
});

static PAGE_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)page\s*\d+\s*of\s*\d+").expect("valid page regex"));

#[derive(Debug, Clone, Copy)]
pub struct ChunkOptions {
    /// Sections longer than this many words are split.
    pub max_words: usize,
}

impl Default for ChunkOptions {
    fn default() -> Self {
        Self { max_words: 500 }
    }
}

/// Chunk extracted document text into ordered passages.
///
/// Text before the first heading is dropped.
pub fn chunk_sections(text: &str, options: ChunkOptions) -> Vec<Passage> {
    let max_words = options.max_words.max(1);
    let headings: Vec<_> = HEADING.captures_iter(text).collect();
    let mut passages = Vec::new();

    for (i, caps) in headings.iter().enumerate() {
        let (Some(whole), Some(number), Some(title)) = (caps.get(0), caps.get(1), caps.get(2))
        else {
            continue;
        };
        let end = headings
            .get(i + 1)
            .and_then(|next| next.get(0))
            .map(|m| m.start())
            .unwrap_or(text.len());

        let body = clean_section(&text[whole.end()..end]);
        let section = number.as_str();
        let title = title.as_str().trim();

        if body.is_empty() {
            passages.push(Passage::new(section, title, NO_TEXT_SENTINEL));
            continue;
        }

        let words: Vec<&str> = body.split_whitespace().collect();
        if words.len() > max_words {
            for piece in words.chunks(max_words) {
                passages.push(Passage::new(section, title, piece.join(" ")));
            }
        } else {
            passages.push(Passage::new(section, title, body));
        }
    }

    passages
}

/// Strip page markers and collapse all whitespace runs to single spaces.
fn clean_section(raw: &str) -> String {
    let without_pages = PAGE_MARKER.replace_all(raw, "");
    without_pages.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const POLICY: &str = "\
Information Security Policy v4.0
4 Policy Statements
4.4 Access Control
Access to systems is granted on a least privilege basis.
Page 12 of 40
Reviews occur every 90 days.
4.5 Password Management
4.5.1 Complexity
Passwords must contain 12 characters.
";

    #[test]
    fn splits_on_numbered_headings() {
        let passages = chunk_sections(POLICY, ChunkOptions::default());
        let sections: Vec<&str> = passages.iter().map(|p| p.section_id.as_str()).collect();
        assert_eq!(sections, vec!["4", "4.4", "4.5", "4.5.1"]);
        assert_eq!(passages[1].title, "Access Control");
    }

    #[test]
    fn strips_page_markers_and_newlines() {
        let passages = chunk_sections(POLICY, ChunkOptions::default());
        assert_eq!(
            passages[1].body_text,
            "Access to systems is granted on a least privilege basis. Reviews occur every 90 days."
        );
    }

    #[test]
    fn empty_sections_get_sentinel() {
        let passages = chunk_sections(POLICY, ChunkOptions::default());
        assert_eq!(passages[0].body_text, NO_TEXT_SENTINEL);
        assert!(passages[2].is_placeholder());
    }

    #[test]
    fn inline_numbers_are_not_headings() {
        let passages = chunk_sections(POLICY, ChunkOptions::default());
        assert!(passages.iter().all(|p| p.section_id != "90" && p.section_id != "12"));
    }

    #[test]
    fn long_sections_split_on_word_boundaries() {
        let body: Vec<String> = (0..25).map(|i| format!("w{i}")).collect();
        let text = format!("7.1 Long Section\n{}\n", body.join(" "));
        let passages = chunk_sections(&text, ChunkOptions { max_words: 10 });
        assert_eq!(passages.len(), 3);
        assert!(passages.iter().all(|p| p.section_id == "7.1" && p.title == "Long Section"));
        assert_eq!(passages[0].body_text.split_whitespace().count(), 10);
        assert_eq!(passages[2].body_text, "w20 w21 w22 w23 w24");
    }

    #[test]
    fn no_headings_no_passages() {
        assert!(chunk_sections("just prose without numbering", ChunkOptions::default()).is_empty());
    }
}
