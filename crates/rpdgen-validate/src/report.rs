//! Versioned validation report.
//!
//! The report is a stable serde surface: downstream tooling parses it, so
//! fields are only ever added, and a shape change means a `V2`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Warning,
    Error,
}

/// One validation problem, addressed by the concrete document path where it
/// was observed (array indices resolved, e.g. `...zones[1].surfaces[0]`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FindingV1 {
    pub severity: Severity,
    pub code: String,
    pub path: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryV1 {
    pub errors: usize,
    pub warnings: usize,
    /// False when the schema pass produced errors; the referential pass is
    /// skipped in that case and `referential_checked` is false too.
    pub schema_valid: bool,
    pub referential_checked: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReportV1 {
    pub schema_version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    pub findings: Vec<FindingV1>,
    pub summary: SummaryV1,
}

impl ValidationReportV1 {
    pub fn new(project_id: Option<String>) -> Self {
        ValidationReportV1 {
            schema_version: "1".to_string(),
            project_id,
            findings: Vec::new(),
            summary: SummaryV1::default(),
        }
    }

    pub fn push(&mut self, severity: Severity, code: &str, path: String, message: String) {
        match severity {
            Severity::Error => self.summary.errors += 1,
            Severity::Warning => self.summary.warnings += 1,
        }
        self.findings.push(FindingV1 {
            severity,
            code: code.to_string(),
            path,
            message,
        });
    }

    pub fn error(&mut self, code: &str, path: String, message: String) {
        self.push(Severity::Error, code, path, message);
    }

    pub fn warning(&mut self, code: &str, path: String, message: String) {
        self.push(Severity::Warning, code, path, message);
    }

    /// No errors; warnings alone do not make a document invalid.
    pub fn is_clean(&self) -> bool {
        self.summary.errors == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_track_pushes() {
        let mut report = ValidationReportV1::new(Some("P".to_string()));
        report.error("X", "a.b".to_string(), "broken".to_string());
        report.warning("Y", "a.c".to_string(), "odd".to_string());
        assert_eq!(report.summary.errors, 1);
        assert_eq!(report.summary.warnings, 1);
        assert!(!report.is_clean());
    }

    #[test]
    fn report_round_trips_through_json() {
        let mut report = ValidationReportV1::new(None);
        report.warning("Y", "a".to_string(), "odd".to_string());
        let json = serde_json::to_string(&report).unwrap();
        let back: ValidationReportV1 = serde_json::from_str(&json).unwrap();
        assert_eq!(back.findings, report.findings);
        assert!(back.is_clean());
    }
}
