//! Audit priority by topic keyword.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RiskLevel {
    High,
    Medium,
    Low,
}

impl RiskLevel {
    pub const ALL: [RiskLevel; 3] = [Self::High, Self::Medium, Self::Low];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Topic → risk table, scanned in order; the first keyword contained in the
/// query decides. `password` leads so credential questions are always High.
pub const RISK_TABLE: &[(&str, RiskLevel)] = &[
    ("password", RiskLevel::High),
    ("access control", RiskLevel::High),
    ("encryption", RiskLevel::High),
    ("incident response", RiskLevel::High),
    ("vulnerability", RiskLevel::High),
    ("logging", RiskLevel::Medium),
    ("monitoring", RiskLevel::Medium),
    ("supplier", RiskLevel::Medium),
    ("data retention", RiskLevel::Low),
    ("physical security", RiskLevel::Low),
    ("business continuity", RiskLevel::Medium),
];

/// Classify a query's audit priority; `Low` when no keyword matches.
pub fn classify_risk(query: &str) -> RiskLevel {
    let q = query.to_lowercase();
    RISK_TABLE
        .iter()
        .find(|(keyword, _)| q.contains(keyword))
        .map(|&(_, level)| level)
        .unwrap_or(RiskLevel::Low)
}
