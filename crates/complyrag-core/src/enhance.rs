//! Keyword-driven query enhancement.
//!
//! Appends framework-specific sections and keywords to a query before it is
//! embedded, so the vector search lands on the mapped policy sections.

use crate::config::ComplianceConfig;

/// A query together with its enhanced form.
///
/// Indexed retrieval embeds [`text`](Self::text); full-scan retrieval matches
/// on [`original`](Self::original).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnhancedQuery {
    original: String,
    enhanced: String,
}

impl EnhancedQuery {
    /// A query with no enhancement applied.
    pub fn plain(query: &str) -> Self {
        Self {
            original: query.to_string(),
            enhanced: query.to_string(),
        }
    }

    pub fn original(&self) -> &str {
        &self.original
    }

    pub fn text(&self) -> &str {
        &self.enhanced
    }

    pub fn is_enhanced(&self) -> bool {
        self.original != self.enhanced
    }
}

pub struct QueryEnhancer<'a> {
    config: &'a ComplianceConfig,
}

impl<'a> QueryEnhancer<'a> {
    pub fn new(config: &'a ComplianceConfig) -> Self {
        Self { config }
    }

    /// Enhance `query` with the first matching entry, in declaration order.
    ///
    /// No match leaves the query unchanged.
    pub fn enhance(&self, query: &str) -> EnhancedQuery {
        let Some(entry) = self.config.enhancement_for(query) else {
            return EnhancedQuery::plain(query);
        };

        let additions: Vec<&str> = entry
            .extra_sections
            .iter()
            .chain(&entry.extra_keywords)
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect();

        if additions.is_empty() {
            return EnhancedQuery::plain(query);
        }

        EnhancedQuery {
            original: query.to_string(),
            enhanced: format!("{query} {}", additions.join(" ")),
        }
    }
}
