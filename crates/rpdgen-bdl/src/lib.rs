//! BDL record model for the RPD translator.
//!
//! The BDL tokenizer lives outside this workspace; what arrives here is its
//! output: one flat keyword/value record per source object, grouped by
//! command kind. This crate defines:
//!
//! - the `Record`/`FieldValue` shapes and the `RecordSource` boundary,
//! - the closed `CommandKind` vocabulary and the fixed build order (with a
//!   checkable reference topology, so the order is verified rather than
//!   trusted), and
//! - failure-tolerant coercion and unit-conversion helpers shared by the
//!   population rules.

pub mod coerce;
pub mod command;
pub mod record;

pub use command::{verify_build_order, BuildOrderError, CommandKind, BUILD_ORDER};
pub use record::{FieldValue, JsonRecordSource, Record, RecordSource, RecordSourceError};
