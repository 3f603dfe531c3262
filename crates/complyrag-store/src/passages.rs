//! Read-only access to the ordered passage file produced by chunking.

use std::path::Path;

use complyrag_core::Passage;
use tracing::{error, info};

use crate::StoreError;

/// The ordered passage corpus. Positions are the indices stored in the
/// vector index, so the order is never changed after loading.
#[derive(Debug, Clone, Default)]
pub struct PassageStore {
    passages: Vec<Passage>,
}

impl PassageStore {
    pub fn new(passages: Vec<Passage>) -> Self {
        Self { passages }
    }

    /// Load a JSON array of passages.
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        if !path.exists() {
            return Err(StoreError::PassagesNotFound(path.to_path_buf()));
        }
        let raw = std::fs::read_to_string(path)?;
        let passages: Vec<Passage> = serde_json::from_str(&raw)?;
        info!(path = %path.display(), count = passages.len(), "loaded passages");
        Ok(Self { passages })
    }

    /// Load the passage file, degrading to an empty corpus on failure.
    pub fn load_or_empty(path: &Path) -> Self {
        Self::load(path).unwrap_or_else(|e| {
            error!(error = %e, "failed to load passages, retrieval will return nothing");
            Self::default()
        })
    }

    /// Write passages as a pretty-printed JSON array, creating parent directories.
    pub fn save(passages: &[Passage], path: &Path) -> Result<(), StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(passages)?;
        std::fs::write(path, json)?;
        info!(path = %path.display(), count = passages.len(), "saved passages");
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.passages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passages.is_empty()
    }

    /// Passage at `idx`, or `None` when the index is out of range.
    pub fn get(&self, idx: usize) -> Option<&Passage> {
        self.passages.get(idx)
    }

    pub fn passages(&self) -> &[Passage] {
        &self.passages
    }

    /// Case-insensitive substring match of `query` against body or title.
    ///
    /// Placeholder passages are skipped. Matches come back in corpus order,
    /// unranked.
    pub fn full_scan(&self, query: &str) -> Vec<&Passage> {
        let q = query.to_lowercase();
        self.passages
            .iter()
            .filter(|p| !p.is_placeholder())
            .filter(|p| p.body_text.to_lowercase().contains(&q) || p.title.to_lowercase().contains(&q))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use complyrag_core::NO_TEXT_SENTINEL;
    use tempfile::TempDir;

    fn corpus() -> PassageStore {
        PassageStore::new(vec![
            Passage::new("4.4", "Access Control", "Access to systems follows least privilege."),
            Passage::new("4.5", "Password Management", "Passwords rotate every 90 days."),
            Passage::new("4.6", "Remote Access", NO_TEXT_SENTINEL),
            Passage::new("4.7", "Physical Security", "Badges are required for ACCESS to server rooms."),
        ])
    }

    #[test]
    fn full_scan_matches_body_case_insensitively_in_corpus_order() {
        let store = corpus();
        let hits: Vec<&str> = store
            .full_scan("access")
            .iter()
            .map(|p| p.section_id.as_str())
            .collect();
        assert_eq!(hits, vec!["4.4", "4.7"]);
    }

    #[test]
    fn full_scan_matches_title() {
        let store = corpus();
        let hits = store.full_scan("password management");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].section_id, "4.5");
    }

    #[test]
    fn full_scan_skips_placeholders_even_when_title_matches() {
        let store = corpus();
        assert!(store.full_scan("remote access").is_empty());
    }

    #[test]
    fn get_out_of_range_is_none() {
        let store = corpus();
        assert!(store.get(3).is_some());
        assert!(store.get(4).is_none());
    }

    #[test]
    fn save_then_load_preserves_order() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("kb").join("chunks_structured.json");
        let store = corpus();
        PassageStore::save(store.passages(), &path).unwrap();

        let loaded = PassageStore::load(&path).unwrap();
        assert_eq!(loaded.passages(), store.passages());
    }

    #[test]
    fn missing_file_errors() {
        let result = PassageStore::load(Path::new("/nonexistent/chunks.json"));
        assert!(matches!(result, Err(StoreError::PassagesNotFound(_))));
        assert!(PassageStore::load_or_empty(Path::new("/nonexistent/chunks.json")).is_empty());
    }

    #[test]
    fn malformed_file_errors() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("chunks.json");
        std::fs::write(&path, "[{").unwrap();
        assert!(matches!(PassageStore::load(&path), Err(StoreError::Json(_))));
    }
}
