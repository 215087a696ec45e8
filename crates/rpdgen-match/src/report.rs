//! Versioned match report.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    Zone,
    HvacSystem,
    Surface,
    Schedule,
    FluidLoop,
    Pump,
    Boiler,
    Chiller,
    HeatRejection,
    ServiceWaterHeating,
}

/// What justified a pair: exact id equality, the set of zones a system
/// serves, surface geometry, or the name-similarity fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchBasis {
    Id,
    ZoneSet,
    Geometry,
    Name,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchPairV1 {
    pub kind: ObjectKind,
    pub candidate_id: String,
    pub reference_id: String,
    pub basis: MatchBasis,
    /// Name similarity of the paired ids, even when the basis was stronger.
    pub score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Candidate,
    Reference,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnmatchedV1 {
    pub kind: ObjectKind,
    pub side: Side,
    pub id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSummaryV1 {
    pub pairs: usize,
    pub unmatched_candidate: usize,
    pub unmatched_reference: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchReportV1 {
    pub schema_version: String,
    pub pairs: Vec<MatchPairV1>,
    pub unmatched: Vec<UnmatchedV1>,
    pub summary: MatchSummaryV1,
}

impl MatchReportV1 {
    pub fn new() -> Self {
        MatchReportV1 {
            schema_version: "1".to_string(),
            pairs: Vec::new(),
            unmatched: Vec::new(),
            summary: MatchSummaryV1::default(),
        }
    }

    pub fn pair(
        &mut self,
        kind: ObjectKind,
        candidate_id: &str,
        reference_id: &str,
        basis: MatchBasis,
        score: f64,
    ) {
        self.summary.pairs += 1;
        self.pairs.push(MatchPairV1 {
            kind,
            candidate_id: candidate_id.to_string(),
            reference_id: reference_id.to_string(),
            basis,
            score,
        });
    }

    pub fn unmatched(&mut self, kind: ObjectKind, side: Side, id: &str) {
        match side {
            Side::Candidate => self.summary.unmatched_candidate += 1,
            Side::Reference => self.summary.unmatched_reference += 1,
        }
        self.unmatched.push(UnmatchedV1 {
            kind,
            side,
            id: id.to_string(),
        });
    }

    /// Every object on both sides found a partner.
    pub fn is_complete(&self) -> bool {
        self.unmatched.is_empty()
    }
}

impl Default for MatchReportV1 {
    fn default() -> Self {
        MatchReportV1::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_track_pushes() {
        let mut report = MatchReportV1::new();
        report.pair(ObjectKind::Zone, "Z1", "Z1", MatchBasis::Id, 1.0);
        report.unmatched(ObjectKind::Surface, Side::Candidate, "W9");
        report.unmatched(ObjectKind::Zone, Side::Reference, "Z2");
        assert_eq!(report.summary.pairs, 1);
        assert_eq!(report.summary.unmatched_candidate, 1);
        assert_eq!(report.summary.unmatched_reference, 1);
        assert!(!report.is_complete());
    }

    #[test]
    fn serializes_with_snake_case_tags() {
        let mut report = MatchReportV1::new();
        report.pair(ObjectKind::HvacSystem, "S1", "S2", MatchBasis::ZoneSet, 0.5);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["schema_version"], "1");
        assert_eq!(json["pairs"][0]["kind"], "hvac_system");
        assert_eq!(json["pairs"][0]["basis"], "zone_set");

        let back: MatchReportV1 = serde_json::from_value(json).unwrap();
        assert_eq!(back.pairs, report.pairs);
    }
}
