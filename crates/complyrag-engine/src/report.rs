//! Compliance gap report over the audit query battery.
//!
//! Queries run one at a time, in battery order. The rendered Markdown is
//! written once, through a temporary file in the target directory that is
//! then renamed over the destination, so readers never see a partial report.

use std::fmt::Write as _;
use std::io::Write as _;
use std::path::Path;

use chrono::{DateTime, Utc};
use complyrag_core::{
    AnswerRecord, AuditQuery, ComplianceConfig, ComplianceStatus, ComplianceVerdict, Framework,
    RiskLevel, analyze, classify_risk,
};
use tempfile::NamedTempFile;
use tracing::info;

use crate::error::ReportError;
use crate::pipeline::QueryEngine;

pub const REPORT_TITLE: &str = "# Compliance Gap Analysis Report";

/// One audit query with its answer, verdict and priority.
#[derive(Debug, Clone)]
pub struct ReportRecord {
    pub query: AuditQuery,
    pub answer: AnswerRecord,
    pub verdict: ComplianceVerdict,
    pub risk: RiskLevel,
}

#[derive(Debug, Clone)]
pub struct ComplianceReport {
    pub generated_at: DateTime<Utc>,
    /// In battery order.
    pub records: Vec<ReportRecord>,
}

impl ComplianceReport {
    /// Run every query through `engine` and analyze the answers against
    /// `config`'s section mappings.
    pub async fn assemble(
        engine: &mut QueryEngine<'_>,
        config: &ComplianceConfig,
        queries: &[AuditQuery],
    ) -> Self {
        let mut records = Vec::with_capacity(queries.len());
        for (i, query) in queries.iter().enumerate() {
            info!(
                n = i + 1,
                of = queries.len(),
                section = query.policy_section,
                query = query.query_text,
                "processing audit query"
            );
            let answer = engine.ask(query.query_text).await;
            let verdict = analyze(&answer.text, query.policy_section, &config.mappings);
            let risk = classify_risk(query.query_text);
            info!(status = %verdict.status, risk = %risk, gaps = verdict.gap_count(), "analyzed answer");
            records.push(ReportRecord {
                query: *query,
                answer,
                verdict,
                risk,
            });
        }
        Self {
            generated_at: Utc::now(),
            records,
        }
    }

    pub fn status_count(&self, status: ComplianceStatus) -> usize {
        self.records
            .iter()
            .filter(|r| r.verdict.status == status)
            .count()
    }

    pub fn risk_count(&self, risk: RiskLevel) -> usize {
        self.records.iter().filter(|r| r.risk == risk).count()
    }

    /// Render the report as Markdown.
    pub fn render(&self) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = self.render_into(&mut out);
        out
    }

    fn render_into(&self, out: &mut String) -> std::fmt::Result {
        writeln!(out, "{REPORT_TITLE}")?;
        writeln!(out)?;
        writeln!(
            out,
            "Generated: {}",
            self.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
        )?;
        writeln!(out)?;

        writeln!(out, "## Summary")?;
        writeln!(out)?;
        writeln!(out, "| Compliance Status | Queries |")?;
        writeln!(out, "|---|---|")?;
        for status in ComplianceStatus::ALL {
            writeln!(out, "| {status} | {} |", self.status_count(status))?;
        }
        writeln!(out)?;
        writeln!(out, "| Audit Priority | Queries |")?;
        writeln!(out, "|---|---|")?;
        for risk in RiskLevel::ALL {
            writeln!(out, "| {risk} | {} |", self.risk_count(risk))?;
        }
        writeln!(out)?;

        writeln!(out, "## Findings")?;
        for record in &self.records {
            writeln!(out)?;
            render_record(out, record)?;
        }
        Ok(())
    }

    /// Render and write the report to `path`.
    pub fn write(&self, path: &Path) -> Result<(), ReportError> {
        write_report(path, &self.render())
    }
}

fn render_record(out: &mut String, record: &ReportRecord) -> std::fmt::Result {
    let verdict = &record.verdict;
    writeln!(out, "### Query: {}", record.query.query_text)?;
    writeln!(out)?;
    writeln!(out, "**Policy Section**: {}", record.query.policy_section)?;
    writeln!(out)?;
    writeln!(out, "**Response**: {}", record.answer.text)?;
    writeln!(out)?;
    writeln!(out, "**Compliance Status**: {}", verdict.status)?;
    writeln!(out)?;
    writeln!(out, "**Audit Priority (Risk Level)**: {}", record.risk)?;

    for framework in Framework::ALL {
        writeln!(out)?;
        writeln!(out, "**{framework} Gaps**:")?;
        writeln!(out)?;
        let mut any = false;
        for gap in verdict.gaps_for(framework) {
            writeln!(out, "- {gap}")?;
            any = true;
        }
        if !any {
            writeln!(out, "- None")?;
        }
    }

    let notes: Vec<_> = verdict.notes().collect();
    if !notes.is_empty() {
        writeln!(out)?;
        writeln!(out, "**Notes**:")?;
        writeln!(out)?;
        for note in notes {
            writeln!(out, "- {note}")?;
        }
    }
    Ok(())
}

/// Write `text` to `path` in one step, creating parent directories.
pub fn write_report(path: &Path, text: &str) -> Result<(), ReportError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(text.as_bytes())?;
    tmp.flush()?;
    tmp.persist(path)?;

    info!(path = %path.display(), bytes = text.len(), "report written");
    Ok(())
}
