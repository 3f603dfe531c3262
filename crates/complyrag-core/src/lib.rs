pub mod answer;
pub mod audit;
pub mod compliance;
pub mod config;
pub mod enhance;
pub mod passage;
pub mod risk;
pub mod schema;

pub use answer::{AnswerRecord, AnswerSource};
pub use audit::{AUDIT_QUERIES, AuditQuery};
pub use compliance::{ComplianceStatus, ComplianceVerdict, Finding, GapFinding, analyze};
pub use config::{Clause, ComplianceConfig, ConfigError, EnhancementEntry, Framework, SectionMapping};
pub use enhance::{EnhancedQuery, QueryEnhancer};
pub use passage::{NO_TEXT_SENTINEL, Passage};
pub use risk::{RISK_TABLE, RiskLevel, classify_risk};
pub use schema::passage_index;
