//! Flat BDL records: the untrusted input boundary.
//!
//! A record is one source-model object after tokenization: a unique name, an
//! optional parent name, and a keyword → value map. Records are immutable
//! once read; everything downstream (registry, populator) works on borrowed
//! views of them.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::command::CommandKind;

/// A scalar or repeated keyword value.
///
/// Lists model BDL's repeated-keyword constructs (e.g. one `LIGHTING-SCHEDULE`
/// entry per lighting group). Numbers are kept as `f64`; integer-valued
/// keywords go through [`crate::coerce::try_i64`] at use sites.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Num(f64),
    Str(String),
    List(Vec<FieldValue>),
}

impl FieldValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_num(&self) -> Option<f64> {
        match self {
            FieldValue::Num(n) => Some(*n),
            // BDL emits numeric keywords as bare text in some report dumps.
            FieldValue::Str(s) => s.trim().parse().ok(),
            FieldValue::List(_) => None,
        }
    }

    pub fn as_list(&self) -> Option<&[FieldValue]> {
        match self {
            FieldValue::List(items) => Some(items),
            _ => None,
        }
    }
}

/// One flat keyword/value declaration for a single source-model object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Unique name of the source object. Global uniqueness is a contract the
    /// registry enforces, not something the source guarantees.
    pub unique_name: String,
    /// Declared owner, when the command kind has one (spaces name their
    /// floor, walls their space, zones their system).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_name: Option<String>,
    /// Keyword → value map. Keys come from the kind's fixed vocabulary.
    #[serde(default)]
    pub fields: BTreeMap<String, FieldValue>,
}

impl Record {
    pub fn new(unique_name: impl Into<String>) -> Self {
        Record {
            unique_name: unique_name.into(),
            parent_name: None,
            fields: BTreeMap::new(),
        }
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent_name = Some(parent.into());
        self
    }

    pub fn with_field(mut self, key: impl Into<String>, value: FieldValue) -> Self {
        self.fields.insert(key.into(), value);
        self
    }

    pub fn with_str(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.with_field(key, FieldValue::Str(value.into()))
    }

    pub fn with_num(self, key: impl Into<String>, value: f64) -> Self {
        self.with_field(key, FieldValue::Num(value))
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }
}

#[derive(Debug, Error)]
pub enum RecordSourceError {
    #[error("failed to read record file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse record file: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unknown command kind `{0}` in record file")]
    UnknownKind(String),
}

/// The record source boundary: one call per command kind, in caller order.
///
/// Implementations must return records in source declaration order; the
/// builder relies on within-kind order being stable.
pub trait RecordSource {
    fn read_records(&self, kind: CommandKind) -> Vec<Record>;
}

/// JSON-backed record source.
///
/// The file maps command-kind tags to record arrays:
///
/// ```json
/// { "ZONE": [ { "unique_name": "Zn1", "parent_name": "Sys1",
///               "fields": { "SPACE": "Sp1" } } ] }
/// ```
#[derive(Debug, Clone, Default)]
pub struct JsonRecordSource {
    by_kind: BTreeMap<CommandKind, Vec<Record>>,
}

impl JsonRecordSource {
    pub fn from_path(path: &Path) -> Result<Self, RecordSourceError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_str(&text)
    }

    pub fn from_str(text: &str) -> Result<Self, RecordSourceError> {
        let raw: BTreeMap<String, Vec<Record>> = serde_json::from_str(text)?;
        let mut by_kind = BTreeMap::new();
        for (tag, records) in raw {
            let kind = CommandKind::from_tag(&tag)
                .ok_or_else(|| RecordSourceError::UnknownKind(tag.clone()))?;
            by_kind.insert(kind, records);
        }
        Ok(JsonRecordSource { by_kind })
    }

    /// Build a source directly from in-memory records (tests, embedding).
    pub fn from_records(groups: impl IntoIterator<Item = (CommandKind, Vec<Record>)>) -> Self {
        JsonRecordSource {
            by_kind: groups.into_iter().collect(),
        }
    }

    pub fn push(&mut self, kind: CommandKind, record: Record) {
        self.by_kind.entry(kind).or_default().push(record);
    }
}

impl RecordSource for JsonRecordSource {
    fn read_records(&self, kind: CommandKind) -> Vec<Record> {
        self.by_kind.get(&kind).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_value_accessors() {
        assert_eq!(FieldValue::Num(2.5).as_num(), Some(2.5));
        assert_eq!(FieldValue::Str("2.5".into()).as_num(), Some(2.5));
        assert_eq!(FieldValue::Str("YES".into()).as_num(), None);
        assert_eq!(FieldValue::Str("YES".into()).as_str(), Some("YES"));
        assert!(FieldValue::List(vec![]).as_num().is_none());
    }

    #[test]
    fn parses_record_file() {
        let text = r#"
        {
            "ZONE": [
                { "unique_name": "Zn1", "parent_name": "Sys1",
                  "fields": { "SPACE": "Sp1", "DESIGN-HEAT-T": 72.0 } }
            ],
            "SPACE": [
                { "unique_name": "Sp1", "parent_name": "Fl1",
                  "fields": { "AREA": 1000.0 } }
            ]
        }
        "#;
        let source = JsonRecordSource::from_str(text).expect("parse records");
        let zones = source.read_records(CommandKind::Zone);
        assert_eq!(zones.len(), 1);
        assert_eq!(zones[0].unique_name, "Zn1");
        assert_eq!(zones[0].parent_name.as_deref(), Some("Sys1"));
        assert_eq!(
            zones[0].get("SPACE").and_then(FieldValue::as_str),
            Some("Sp1")
        );
        assert!(source.read_records(CommandKind::Boiler).is_empty());
    }

    #[test]
    fn rejects_unknown_kind() {
        let text = r#"{ "NOT-A-COMMAND": [] }"#;
        let err = JsonRecordSource::from_str(text).unwrap_err();
        assert!(matches!(err, RecordSourceError::UnknownKind(tag) if tag == "NOT-A-COMMAND"));
    }
}
