//! Referential pass: id uniqueness and reference closure.
//!
//! Runs only on schema-valid documents, so it can assume field types. Paths
//! come from the catalogue in `rpdgen_schema::refs`; the tiny query engine
//! here evaluates them, tracking concrete indices for finding paths.

use std::collections::{BTreeMap, BTreeSet};

use rpdgen_schema::{id_uniqueness_paths, reference_rules};
use serde_json::Value;
use tracing::debug;

use crate::report::ValidationReportV1;

pub const REF_DUPLICATE_ID: &str = "REF_DUPLICATE_ID";

pub fn run(value: &Value, report: &mut ValidationReportV1) {
    check_id_uniqueness(value, report);
    check_references(value, report);
}

/// Every string value found at `path`, paired with the concrete document
/// path it was found at. Segments ending in `[]` descend into each array
/// element; other segments descend into an object field. Absent fields
/// simply contribute nothing.
fn collect_strings(value: &Value, path: &str) -> Vec<(String, String)> {
    let mut out = Vec::new();
    descend(value, &path.split('.').collect::<Vec<_>>(), "$", &mut out);
    out
}

fn descend(value: &Value, segments: &[&str], at: &str, out: &mut Vec<(String, String)>) {
    let Some((segment, rest)) = segments.split_first() else {
        if let Some(s) = value.as_str() {
            out.push((at.to_string(), s.to_string()));
        }
        return;
    };
    if let Some(field) = segment.strip_suffix("[]") {
        let Some(items) = value.get(field).and_then(Value::as_array) else {
            return;
        };
        for (i, item) in items.iter().enumerate() {
            descend(item, rest, &format!("{at}.{field}[{i}]"), out);
        }
    } else if let Some(inner) = value.get(*segment) {
        descend(inner, rest, &format!("{at}.{segment}"), out);
    }
}

fn check_id_uniqueness(value: &Value, report: &mut ValidationReportV1) {
    for path in id_uniqueness_paths() {
        let mut seen: BTreeMap<String, String> = BTreeMap::new();
        for (at, id) in collect_strings(value, path) {
            if let Some(first) = seen.get(&id) {
                report.error(
                    REF_DUPLICATE_ID,
                    at,
                    format!("id `{id}` already used at {first}"),
                );
            } else {
                seen.insert(id, at);
            }
        }
    }
}

fn check_references(value: &Value, report: &mut ValidationReportV1) {
    for rule in reference_rules() {
        let ids: BTreeSet<String> = collect_strings(value, rule.id_path)
            .into_iter()
            .map(|(_, id)| id)
            .collect();
        debug!(rule = rule.code, ids = ids.len(), "checking references");
        for ref_path in rule.ref_paths {
            for (at, target) in collect_strings(value, ref_path) {
                if !ids.contains(&target) {
                    report.error(
                        rule.code,
                        at,
                        format!("`{target}` does not match any id ({})", rule.description),
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn run_on(value: Value) -> ValidationReportV1 {
        let mut report = ValidationReportV1::new(None);
        run(&value, &mut report);
        report
    }

    fn doc_with_zones(zones: Value) -> Value {
        json!({
            "id": "P",
            "ruleset_model_descriptions": [ {
                "id": "M",
                "buildings": [ {
                    "id": "B",
                    "building_segments": [ { "id": "Seg", "zones": zones } ]
                } ]
            } ]
        })
    }

    #[test]
    fn closed_references_are_clean() {
        let report = run_on(doc_with_zones(json!([
            { "id": "Z1", "surfaces": [ { "id": "W", "adjacent_zone": "Z2" } ] },
            { "id": "Z2" }
        ])));
        assert!(report.is_clean());
        assert!(report.findings.is_empty());
    }

    #[test]
    fn dangling_adjacent_zone_is_exactly_one_finding() {
        let report = run_on(doc_with_zones(json!([
            { "id": "Z1", "surfaces": [ { "id": "W", "adjacent_zone": "Z9" } ] },
            { "id": "Z2" }
        ])));
        assert_eq!(report.findings.len(), 1);
        let finding = &report.findings[0];
        assert_eq!(finding.code, "REF_ADJACENT_ZONE");
        assert!(finding.path.ends_with("zones[0].surfaces[0].adjacent_zone"));
        assert!(finding.message.contains("Z9"));
    }

    #[test]
    fn duplicate_ids_point_at_the_second_occurrence() {
        let report = run_on(doc_with_zones(json!([{ "id": "Z" }, { "id": "Z" }])));
        assert_eq!(report.findings.len(), 1);
        let finding = &report.findings[0];
        assert_eq!(finding.code, REF_DUPLICATE_ID);
        assert!(finding.path.ends_with("zones[1].id"));
    }

    #[test]
    fn loop_references_check_across_collections() {
        let report = run_on(json!({
            "id": "P",
            "ruleset_model_descriptions": [ {
                "id": "M",
                "fluid_loops": [ { "id": "HW Loop" } ],
                "pumps": [ { "id": "P1", "loop_or_piping": "HW Loop" } ],
                "boilers": [ { "id": "B1", "loop": "Steam Loop" } ]
            } ]
        }));
        assert_eq!(report.findings.len(), 1);
        assert_eq!(report.findings[0].code, "REF_FLUID_LOOP");
        assert!(report.findings[0].path.ends_with("boilers[0].loop"));
    }

    #[test]
    fn absent_collections_contribute_nothing() {
        let report = run_on(json!({ "id": "P" }));
        assert!(report.findings.is_empty());
    }
}
