//! Static compliance configuration: query enhancements and the
//! policy-section → clause mapping for PCI-DSS and ISO 27001.
//!
//! Loaded once at startup and passed by reference into the components that
//! need it. Both lists are ordered: declaration order in the file is the
//! first-match order for keyword enhancement and for section lookup.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("compliance mapping not found: {0}")]
    NotFound(PathBuf),

    #[error("failed to read compliance mapping: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed compliance mapping: {0}")]
    Json(#[from] serde_json::Error),
}

/// Regulatory frameworks the gap analysis checks against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Framework {
    PciDss,
    Iso27001,
}

impl Framework {
    /// Both frameworks, in the order their clauses are checked and reported.
    pub const ALL: [Framework; 2] = [Framework::PciDss, Framework::Iso27001];

    /// Key used in the mapping file.
    pub fn key(&self) -> &'static str {
        match self {
            Self::PciDss => "pci_dss",
            Self::Iso27001 => "iso_27001",
        }
    }

    /// Human-readable label used in findings and reports.
    pub fn label(&self) -> &'static str {
        match self {
            Self::PciDss => "PCI-DSS",
            Self::Iso27001 => "ISO 27001",
        }
    }
}

impl std::fmt::Display for Framework {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A single regulatory requirement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clause {
    #[serde(rename = "clause")]
    pub clause_id: String,
    #[serde(default)]
    pub description: String,
}

/// Clauses applicable to every policy section starting with `policy_section`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionMapping {
    #[serde(rename = "policy_section")]
    pub policy_section_prefix: String,
    #[serde(default)]
    pub pci_dss: Vec<Clause>,
    #[serde(default)]
    pub iso_27001: Vec<Clause>,
}

impl SectionMapping {
    pub fn clauses_for(&self, framework: Framework) -> &[Clause] {
        match framework {
            Framework::PciDss => &self.pci_dss,
            Framework::Iso27001 => &self.iso_27001,
        }
    }

    /// Every clause across both frameworks, PCI-DSS first, each in file order.
    pub fn clauses(&self) -> impl Iterator<Item = (Framework, &Clause)> {
        Framework::ALL
            .into_iter()
            .flat_map(move |fw| self.clauses_for(fw).iter().map(move |c| (fw, c)))
    }

    pub fn clause_count(&self) -> usize {
        self.pci_dss.len() + self.iso_27001.len()
    }

    /// Prefix match against a query's policy section (`4.4` covers `4.4.2`).
    pub fn covers(&self, policy_section: &str) -> bool {
        policy_section.starts_with(&self.policy_section_prefix)
    }
}

/// Keyword-triggered query augmentation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnhancementEntry {
    #[serde(rename = "keyword")]
    pub trigger_keyword: String,
    #[serde(rename = "sections", default)]
    pub extra_sections: Vec<String>,
    #[serde(rename = "keywords", default)]
    pub extra_keywords: Vec<String>,
    /// Answer returned when retrieval finds nothing for a matching query.
    #[serde(rename = "fallback", default, skip_serializing_if = "Option::is_none")]
    pub fallback_text: Option<String>,
}

impl EnhancementEntry {
    /// Case-insensitive containment of the trigger keyword in `query_lower`.
    ///
    /// `query_lower` must already be lowercased.
    pub fn triggers_on(&self, query_lower: &str) -> bool {
        !self.trigger_keyword.is_empty()
            && query_lower.contains(&self.trigger_keyword.to_lowercase())
    }

    /// Fallback text as configured, unless missing or blank.
    pub fn fallback(&self) -> Option<&str> {
        self.fallback_text
            .as_deref()
            .filter(|t| !t.trim().is_empty())
    }
}

/// Process-wide, read-only compliance configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceConfig {
    #[serde(default)]
    pub enhancements: Vec<EnhancementEntry>,
    #[serde(default)]
    pub mappings: Vec<SectionMapping>,
}

impl ComplianceConfig {
    /// Load the configuration from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let raw = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)?;
        info!(
            path = %path.display(),
            enhancements = config.enhancements.len(),
            mappings = config.mappings.len(),
            "loaded compliance mapping"
        );
        Ok(config)
    }

    /// Load the configuration, degrading to an empty one on any failure.
    ///
    /// Downstream components then produce `Unknown` verdicts and generic
    /// fallback answers instead of failing.
    pub fn load_or_empty(path: &Path) -> Self {
        Self::load(path).unwrap_or_else(|e| {
            error!(error = %e, "failed to load compliance mapping, continuing with empty configuration");
            Self::default()
        })
    }

    pub fn is_empty(&self) -> bool {
        self.enhancements.is_empty() && self.mappings.is_empty()
    }

    /// First enhancement entry (declaration order) triggered by `query`.
    pub fn enhancement_for(&self, query: &str) -> Option<&EnhancementEntry> {
        let q = query.to_lowercase();
        self.enhancements.iter().find(|e| e.triggers_on(&q))
    }

    /// First triggered enhancement entry that carries fallback text.
    pub fn fallback_for(&self, query: &str) -> Option<&str> {
        let q = query.to_lowercase();
        self.enhancements
            .iter()
            .filter(|e| e.triggers_on(&q))
            .find_map(|e| e.fallback())
    }

    /// First mapping entry (declaration order) whose prefix covers `policy_section`.
    pub fn mapping_for(&self, policy_section: &str) -> Option<&SectionMapping> {
        self.mappings.iter().find(|m| m.covers(policy_section))
    }
}
