//! Structural matcher for RPD report documents.
//!
//! Regression testing a translator by byte comparison breaks the moment an
//! id changes. This crate compares two documents structurally instead:
//!
//! - zones pair by exact id, then by name similarity
//! - HVAC systems pair by the set of zones their terminals serve, mapped
//!   through the zone pairing, then by name
//! - surfaces pair inside each matched zone pair by area and azimuth, then
//!   by name
//!
//! The result is a versioned [`MatchReportV1`] listing every pair with the
//! tier that justified it and every object left unmatched on either side.

pub mod matcher;
pub mod report;
pub mod similarity;

pub use matcher::{diff_documents, MatchOptions};
pub use report::{
    MatchBasis, MatchPairV1, MatchReportV1, MatchSummaryV1, ObjectKind, Side, UnmatchedV1,
};
pub use similarity::{levenshtein_with_max, name_similarity};
