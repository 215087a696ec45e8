//! Generic schema pass: walk a JSON document against the formal schema
//! tables. The walker knows nothing about the domain; everything it checks
//! comes from [`SchemaDef`].

use rpdgen_schema::{FieldSpec, FieldType, SchemaDef};
use serde_json::Value;

use crate::report::ValidationReportV1;

pub const SCHEMA_TYPE: &str = "SCHEMA_TYPE";
pub const SCHEMA_REQUIRED: &str = "SCHEMA_REQUIRED";
pub const SCHEMA_ENUM: &str = "SCHEMA_ENUM";
pub const SCHEMA_NULL: &str = "SCHEMA_NULL";
pub const SCHEMA_UNKNOWN_FIELD: &str = "SCHEMA_UNKNOWN_FIELD";

pub fn run(value: &Value, schema: &SchemaDef, report: &mut ValidationReportV1) {
    walk_object(value, schema.root, "$", schema, report);
}

fn walk_object(
    value: &Value,
    spec_name: &str,
    path: &str,
    schema: &SchemaDef,
    report: &mut ValidationReportV1,
) {
    let Some(spec) = schema.object(spec_name) else {
        // Unreachable with a self-consistent schema; surfaced rather than
        // panicking so a bad table edit fails visibly.
        report.error(
            SCHEMA_TYPE,
            path.to_string(),
            format!("no object spec named {spec_name}"),
        );
        return;
    };
    let Some(map) = value.as_object() else {
        report.error(
            SCHEMA_TYPE,
            path.to_string(),
            format!("expected a {spec_name} object"),
        );
        return;
    };

    for field in spec.fields {
        let field_path = format!("{path}.{}", field.name);
        match map.get(field.name) {
            None => {
                if field.required {
                    report.error(
                        SCHEMA_REQUIRED,
                        field_path,
                        format!("{spec_name} requires field {}", field.name),
                    );
                }
            }
            // Absent means omitted; an explicit null is a producer bug.
            Some(Value::Null) => {
                report.error(
                    SCHEMA_NULL,
                    field_path,
                    "null is not a legal field value; omit the field instead".to_string(),
                );
            }
            Some(present) => check_field(present, field, &field_path, schema, report),
        }
    }

    for key in map.keys() {
        if !spec.fields.iter().any(|f| f.name == key) {
            report.warning(
                SCHEMA_UNKNOWN_FIELD,
                format!("{path}.{key}"),
                format!("{spec_name} has no field named {key}"),
            );
        }
    }
}

fn check_field(
    value: &Value,
    field: &FieldSpec,
    path: &str,
    schema: &SchemaDef,
    report: &mut ValidationReportV1,
) {
    match field.ty {
        FieldType::Str => {
            if !value.is_string() {
                type_error(report, path, "a string");
            }
        }
        FieldType::Num => {
            if !value.is_number() {
                type_error(report, path, "a number");
            }
        }
        FieldType::Bool => {
            if !value.is_boolean() {
                type_error(report, path, "a boolean");
            }
        }
        FieldType::EnumOf(tags) => match value.as_str() {
            Some(tag) if tags.contains(&tag) => {}
            Some(tag) => report.error(
                SCHEMA_ENUM,
                path.to_string(),
                format!("`{tag}` is not a legal value (expected one of {tags:?})"),
            ),
            None => type_error(report, path, "an enum tag string"),
        },
        FieldType::NumArray => match value.as_array() {
            Some(items) => {
                for (i, item) in items.iter().enumerate() {
                    if !item.is_number() {
                        type_error(report, &format!("{path}[{i}]"), "a number");
                    }
                }
            }
            None => type_error(report, path, "an array of numbers"),
        },
        FieldType::Object(name) => walk_object(value, name, path, schema, report),
        FieldType::ObjectArray(name) => match value.as_array() {
            Some(items) => {
                for (i, item) in items.iter().enumerate() {
                    walk_object(item, name, &format!("{path}[{i}]"), schema, report);
                }
            }
            None => type_error(report, path, &format!("an array of {name} objects")),
        },
    }
}

fn type_error(report: &mut ValidationReportV1, path: &str, expected: &str) {
    report.error(
        SCHEMA_TYPE,
        path.to_string(),
        format!("expected {expected}"),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use rpdgen_schema::rpd_schema;
    use serde_json::json;

    fn run_on(value: serde_json::Value) -> ValidationReportV1 {
        let mut report = ValidationReportV1::new(None);
        run(&value, rpd_schema(), &mut report);
        report
    }

    #[test]
    fn minimal_document_is_clean() {
        let report = run_on(json!({ "id": "P" }));
        assert!(report.is_clean());
        assert!(report.findings.is_empty());
    }

    #[test]
    fn missing_required_id_is_an_error() {
        let report = run_on(json!({
            "id": "P",
            "ruleset_model_descriptions": [ { "schedules": [] } ]
        }));
        assert_eq!(report.summary.errors, 1);
        assert_eq!(report.findings[0].code, SCHEMA_REQUIRED);
        assert_eq!(report.findings[0].path, "$.ruleset_model_descriptions[0].id");
    }

    #[test]
    fn explicit_null_is_rejected() {
        let report = run_on(json!({
            "id": "P",
            "ruleset_model_descriptions": [ { "id": "M", "output": null } ]
        }));
        assert_eq!(report.summary.errors, 1);
        assert_eq!(report.findings[0].code, SCHEMA_NULL);
    }

    #[test]
    fn bad_enum_tag_is_reported_with_its_path() {
        let report = run_on(json!({
            "id": "P",
            "ruleset_model_descriptions": [ {
                "id": "M",
                "fluid_loops": [ { "id": "L", "loop_type": "WARM_WATER" } ]
            } ]
        }));
        assert_eq!(report.summary.errors, 1);
        let finding = &report.findings[0];
        assert_eq!(finding.code, SCHEMA_ENUM);
        assert_eq!(
            finding.path,
            "$.ruleset_model_descriptions[0].fluid_loops[0].loop_type"
        );
    }

    #[test]
    fn unknown_field_is_a_warning_not_an_error() {
        let report = run_on(json!({ "id": "P", "surprise": 1 }));
        assert!(report.is_clean());
        assert_eq!(report.summary.warnings, 1);
        assert_eq!(report.findings[0].code, SCHEMA_UNKNOWN_FIELD);
    }

    #[test]
    fn hourly_values_must_all_be_numbers() {
        let report = run_on(json!({
            "id": "P",
            "ruleset_model_descriptions": [ {
                "id": "M",
                "schedules": [ { "id": "S", "hourly_values": [1.0, "x"] } ]
            } ]
        }));
        assert_eq!(report.summary.errors, 1);
        assert!(report.findings[0].path.ends_with("hourly_values[1]"));
    }
}
