//! Clause-level gap analysis of an answer against the compliance mapping.
//!
//! A clause is a gap when its description (case-insensitive) does not occur
//! in the answer text. This is a substring check, not semantic entailment:
//! paraphrased coverage still counts as a gap.

use std::fmt;

use crate::config::{Framework, SectionMapping};

/// Outcome of checking one answer against one mapped policy section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComplianceStatus {
    /// Every clause description appears in the answer.
    Compliant,
    /// Some, but not all, clauses are missing.
    PartiallyCompliant,
    /// Every clause is missing.
    NonCompliant,
    /// No mapping, or the section is not mapped.
    Unknown,
}

impl ComplianceStatus {
    pub const ALL: [ComplianceStatus; 4] = [
        Self::Compliant,
        Self::PartiallyCompliant,
        Self::NonCompliant,
        Self::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Compliant => "Compliant",
            Self::PartiallyCompliant => "Partially Compliant",
            Self::NonCompliant => "Non-Compliant",
            Self::Unknown => "Unknown",
        }
    }

    /// Status from the gap count and the number of clauses checked.
    pub fn from_counts(gaps: usize, total_clauses: usize) -> Self {
        if gaps == 0 {
            Self::Compliant
        } else if gaps < total_clauses {
            Self::PartiallyCompliant
        } else {
            Self::NonCompliant
        }
    }
}

impl fmt::Display for ComplianceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A clause whose description is absent from the answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GapFinding {
    pub framework: Framework,
    pub clause_id: String,
    pub description: String,
}

impl fmt::Display for GapFinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}: Missing {}",
            self.framework.label(),
            self.clause_id,
            self.description
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Finding {
    Gap(GapFinding),
    /// The mapping file was missing, malformed or empty.
    MappingUnavailable,
    /// No mapping entry's prefix covers the queried section.
    SectionNotMapped { section: String },
}

impl Finding {
    pub fn as_gap(&self) -> Option<&GapFinding> {
        match self {
            Self::Gap(gap) => Some(gap),
            _ => None,
        }
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gap(gap) => gap.fmt(f),
            Self::MappingUnavailable => f.write_str("Compliance mapping not found"),
            Self::SectionNotMapped { .. } => {
                f.write_str("Section not found in compliance mapping")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplianceVerdict {
    pub status: ComplianceStatus,
    pub findings: Vec<Finding>,
}

impl ComplianceVerdict {
    fn unknown(finding: Finding) -> Self {
        Self {
            status: ComplianceStatus::Unknown,
            findings: vec![finding],
        }
    }

    /// Gap findings, in clause order.
    pub fn gaps(&self) -> impl Iterator<Item = &GapFinding> {
        self.findings.iter().filter_map(Finding::as_gap)
    }

    /// Gap findings for one framework.
    pub fn gaps_for(&self, framework: Framework) -> impl Iterator<Item = &GapFinding> {
        self.gaps().filter(move |g| g.framework == framework)
    }

    pub fn gap_count(&self) -> usize {
        self.gaps().count()
    }

    /// Findings that are not clause gaps (missing mapping, unmapped section).
    pub fn notes(&self) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(|f| f.as_gap().is_none())
    }
}

/// Check `answer_text` against the first mapping entry covering `policy_section`.
///
/// Pure function of its inputs. Entries are scanned in declaration order and
/// the first prefix match wins, so with overlapping prefixes (`4` before
/// `4.4`) the broader entry shadows the narrower one.
pub fn analyze(
    answer_text: &str,
    policy_section: &str,
    mappings: &[SectionMapping],
) -> ComplianceVerdict {
    if mappings.is_empty() {
        return ComplianceVerdict::unknown(Finding::MappingUnavailable);
    }

    let Some(entry) = mappings.iter().find(|m| m.covers(policy_section)) else {
        return ComplianceVerdict::unknown(Finding::SectionNotMapped {
            section: policy_section.to_string(),
        });
    };

    let answer_lower = answer_text.to_lowercase();
    let findings: Vec<Finding> = entry
        .clauses()
        .filter(|(_, clause)| {
            let desc = clause.description.to_lowercase();
            !desc.is_empty() && !answer_lower.contains(&desc)
        })
        .map(|(framework, clause)| {
            Finding::Gap(GapFinding {
                framework,
                clause_id: clause.clause_id.clone(),
                description: clause.description.clone(),
            })
        })
        .collect();

    ComplianceVerdict {
        status: ComplianceStatus::from_counts(findings.len(), entry.clause_count()),
        findings,
    }
}
