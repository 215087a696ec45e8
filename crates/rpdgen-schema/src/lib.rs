//! RPD document model and formal schema tables.
//!
//! Three views of the same shape live here:
//!
//! - `doc`: the typed document the assembler produces (serde structs, sparse:
//!   an absent computed value serializes as an absent field, never `null`),
//! - `def`: the table-driven schema definition the validator's schema pass
//!   walks (types, required fields, closed enum sets), and
//! - `refs`: the catalogue of name-valued reference fields and id
//!   collections the referential pass checks.
//!
//! Reference fields carry *names only*; the document never inlines the
//! referenced sub-document. Ownership nesting mirrors the build-time
//! ownership forest exactly.

pub mod def;
pub mod doc;
pub mod refs;

pub use def::{rpd_schema, FieldSpec, FieldType, ObjectSpec, SchemaDef};
pub use refs::{id_uniqueness_paths, reference_rules, ReferenceRule};
