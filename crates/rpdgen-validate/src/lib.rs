//! Two-pass validation of RPD report documents.
//!
//! 1. Schema pass — a generic walk of the JSON value against the formal
//!    schema tables: required fields, types, closed enum tags, no nulls,
//!    unknown fields (warning only).
//! 2. Referential pass — id uniqueness and reference closure from the
//!    catalogue in `rpdgen_schema::refs`.
//!
//! The referential pass only runs when the schema pass found no errors; a
//! structurally broken document produces meaningless reference findings.
//! Validation never fails as an operation: the outcome, good or bad, is a
//! [`ValidationReportV1`].

pub mod referential;
pub mod report;
pub mod schema_pass;

pub use report::{FindingV1, Severity, SummaryV1, ValidationReportV1};

use rpdgen_schema::doc::RulesetProjectDescription;
use rpdgen_schema::rpd_schema;
use serde_json::Value;

/// Validate a JSON value against the RPD schema and reference catalogue.
pub fn validate_value(value: &Value) -> ValidationReportV1 {
    let project_id = value
        .get("id")
        .and_then(Value::as_str)
        .map(str::to_string);
    let mut report = ValidationReportV1::new(project_id);

    schema_pass::run(value, rpd_schema(), &mut report);
    report.summary.schema_valid = report.summary.errors == 0;
    if report.summary.schema_valid {
        referential::run(value, &mut report);
        report.summary.referential_checked = true;
    }
    report
}

/// Validate a typed document (serializes it, then runs [`validate_value`]).
pub fn validate_document(doc: &RulesetProjectDescription) -> ValidationReportV1 {
    match serde_json::to_value(doc) {
        Ok(value) => validate_value(&value),
        Err(err) => {
            // Serialization of these types cannot fail in practice; report it
            // as a finding rather than panicking if it ever does.
            let mut report = ValidationReportV1::new(Some(doc.id.clone()));
            report.error(
                "SCHEMA_SERIALIZE",
                "$".to_string(),
                format!("document failed to serialize: {err}"),
            );
            report
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn schema_errors_gate_the_referential_pass() {
        let value = json!({
            "id": "P",
            "ruleset_model_descriptions": [ {
                "id": "M",
                "fluid_loops": "not-an-array",
                "pumps": [ { "id": "P1", "loop_or_piping": "Nowhere" } ]
            } ]
        });
        let report = validate_value(&value);
        assert!(!report.summary.schema_valid);
        assert!(!report.summary.referential_checked);
        // No REF_* findings at all: the dangling pump reference is not
        // reported against a structurally broken document.
        assert!(report.findings.iter().all(|f| !f.code.starts_with("REF_")));
    }

    #[test]
    fn clean_document_checks_both_passes() {
        let value = json!({
            "id": "P",
            "ruleset_model_descriptions": [ {
                "id": "M",
                "fluid_loops": [ { "id": "HW Loop", "loop_type": "HEATING_WATER" } ],
                "pumps": [ { "id": "P1", "loop_or_piping": "HW Loop" } ]
            } ]
        });
        let report = validate_value(&value);
        assert!(report.is_clean());
        assert!(report.summary.schema_valid);
        assert!(report.summary.referential_checked);
        assert_eq!(report.project_id.as_deref(), Some("P"));
    }

    #[test]
    fn typed_document_validates_through_the_same_path() {
        let doc = RulesetProjectDescription {
            id: "P".to_string(),
            ruleset_model_descriptions: Vec::new(),
        };
        let report = validate_document(&doc);
        assert!(report.is_clean());
    }
}
