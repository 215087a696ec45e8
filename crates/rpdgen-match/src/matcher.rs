//! Greedy tiered matcher.
//!
//! Zones anchor everything: they are matched first (exact id, then name
//! similarity), systems next by the set of zones their terminals serve
//! (translated through the zone pairing), surfaces last inside each matched
//! zone pair by geometry. Every tier is deterministic: candidates are
//! visited in document order and ties break toward the lexicographically
//! smallest reference id.

use std::collections::BTreeSet;

use rpdgen_schema::doc::{HvacSystem, RulesetProjectDescription, Surface, Zone};
use tracing::debug;

use crate::report::{MatchBasis, MatchReportV1, ObjectKind, Side};
use crate::similarity::name_similarity;

#[derive(Debug, Clone, Copy)]
pub struct MatchOptions {
    /// Minimum name similarity for the fallback tier.
    pub name_threshold: f64,
    /// Relative area tolerance for surface geometry matching.
    pub area_tolerance: f64,
    /// Circular azimuth tolerance in degrees.
    pub azimuth_tolerance: f64,
}

impl Default for MatchOptions {
    fn default() -> Self {
        MatchOptions {
            name_threshold: 0.8,
            area_tolerance: 0.05,
            azimuth_tolerance: 5.0,
        }
    }
}

pub fn diff_documents(
    candidate: &RulesetProjectDescription,
    reference: &RulesetProjectDescription,
    options: &MatchOptions,
) -> MatchReportV1 {
    let mut report = MatchReportV1::new();

    let cand_zones = zones(candidate);
    let ref_zones = zones(reference);
    let zone_pairs = match_zones(&cand_zones, &ref_zones, options, &mut report);

    let cand_systems = systems(candidate);
    let ref_systems = systems(reference);
    match_systems(
        &cand_systems,
        &ref_systems,
        &cand_zones,
        &ref_zones,
        &zone_pairs,
        options,
        &mut report,
    );

    for (ci, ri) in &zone_pairs {
        match_surfaces(&cand_zones[*ci], &ref_zones[*ri], options, &mut report);
    }

    // The remaining top-level collections have no structural anchor to
    // propagate through; they match on ids and names alone.
    for (kind, cand_ids, ref_ids) in flat_collections(candidate, reference) {
        match_by_name(kind, &cand_ids, &ref_ids, options, &mut report);
    }
    report
}

type FlatCollection = (ObjectKind, Vec<String>, Vec<String>);

fn flat_collections(
    candidate: &RulesetProjectDescription,
    reference: &RulesetProjectDescription,
) -> Vec<FlatCollection> {
    fn ids<T>(
        doc: &RulesetProjectDescription,
        select: impl Fn(&rpdgen_schema::doc::RulesetModelDescription) -> &Vec<T>,
        id: impl Fn(&T) -> &str,
    ) -> Vec<String> {
        doc.ruleset_model_descriptions
            .iter()
            .flat_map(|rmd| select(rmd).iter())
            .map(|item| id(item).to_string())
            .collect()
    }
    vec![
        (
            ObjectKind::Schedule,
            ids(candidate, |r| &r.schedules, |s| &s.id),
            ids(reference, |r| &r.schedules, |s| &s.id),
        ),
        (
            ObjectKind::FluidLoop,
            ids(candidate, |r| &r.fluid_loops, |l| &l.id),
            ids(reference, |r| &r.fluid_loops, |l| &l.id),
        ),
        (
            ObjectKind::Pump,
            ids(candidate, |r| &r.pumps, |p| &p.id),
            ids(reference, |r| &r.pumps, |p| &p.id),
        ),
        (
            ObjectKind::Boiler,
            ids(candidate, |r| &r.boilers, |b| &b.id),
            ids(reference, |r| &r.boilers, |b| &b.id),
        ),
        (
            ObjectKind::Chiller,
            ids(candidate, |r| &r.chillers, |c| &c.id),
            ids(reference, |r| &r.chillers, |c| &c.id),
        ),
        (
            ObjectKind::HeatRejection,
            ids(candidate, |r| &r.heat_rejections, |h| &h.id),
            ids(reference, |r| &r.heat_rejections, |h| &h.id),
        ),
        (
            ObjectKind::ServiceWaterHeating,
            ids(candidate, |r| &r.service_water_heating_equipment, |s| &s.id),
            ids(reference, |r| &r.service_water_heating_equipment, |s| &s.id),
        ),
    ]
}

/// Exact-id tier, then name similarity, for collections without a stronger
/// structural signal.
fn match_by_name(
    kind: ObjectKind,
    cand: &[String],
    refs: &[String],
    options: &MatchOptions,
    report: &mut MatchReportV1,
) {
    let mut ref_taken = vec![false; refs.len()];
    let mut cand_taken = vec![false; cand.len()];

    for (ci, id) in cand.iter().enumerate() {
        let hit = refs
            .iter()
            .enumerate()
            .find(|(ri, r)| !ref_taken[*ri] && *r == id);
        if let Some((ri, _)) = hit {
            ref_taken[ri] = true;
            cand_taken[ci] = true;
            report.pair(kind, id, &refs[ri], MatchBasis::Id, 1.0);
        }
    }

    for (ci, id) in cand.iter().enumerate() {
        if cand_taken[ci] {
            continue;
        }
        if let Some((ri, score)) =
            best_by_name(id, refs.iter().map(String::as_str), &ref_taken, options)
        {
            ref_taken[ri] = true;
            cand_taken[ci] = true;
            report.pair(kind, id, &refs[ri], MatchBasis::Name, score);
        }
    }

    for (ci, id) in cand.iter().enumerate() {
        if !cand_taken[ci] {
            report.unmatched(kind, Side::Candidate, id);
        }
    }
    for (ri, id) in refs.iter().enumerate() {
        if !ref_taken[ri] {
            report.unmatched(kind, Side::Reference, id);
        }
    }
}

fn zones(doc: &RulesetProjectDescription) -> Vec<&Zone> {
    doc.ruleset_model_descriptions
        .iter()
        .flat_map(|rmd| &rmd.buildings)
        .flat_map(|b| &b.building_segments)
        .flat_map(|s| &s.zones)
        .collect()
}

fn systems(doc: &RulesetProjectDescription) -> Vec<&HvacSystem> {
    doc.ruleset_model_descriptions
        .iter()
        .flat_map(|rmd| &rmd.buildings)
        .flat_map(|b| &b.building_segments)
        .flat_map(|s| &s.heating_ventilating_air_conditioning_systems)
        .collect()
}

/// Pairs of (candidate index, reference index).
fn match_zones(
    cand: &[&Zone],
    refs: &[&Zone],
    options: &MatchOptions,
    report: &mut MatchReportV1,
) -> Vec<(usize, usize)> {
    let mut pairs = Vec::new();
    let mut ref_taken = vec![false; refs.len()];
    let mut cand_taken = vec![false; cand.len()];

    // Tier 1: exact id.
    for (ci, zone) in cand.iter().enumerate() {
        let hit = refs
            .iter()
            .enumerate()
            .find(|(ri, r)| !ref_taken[*ri] && r.id == zone.id);
        if let Some((ri, _)) = hit {
            ref_taken[ri] = true;
            cand_taken[ci] = true;
            report.pair(ObjectKind::Zone, &zone.id, &refs[ri].id, MatchBasis::Id, 1.0);
            pairs.push((ci, ri));
        }
    }

    // Tier 2: name similarity above the threshold.
    for (ci, zone) in cand.iter().enumerate() {
        if cand_taken[ci] {
            continue;
        }
        if let Some((ri, score)) =
            best_by_name(&zone.id, refs.iter().map(|r| r.id.as_str()), &ref_taken, options)
        {
            debug!(candidate = %zone.id, reference = %refs[ri].id, score, "zone name match");
            ref_taken[ri] = true;
            cand_taken[ci] = true;
            report.pair(ObjectKind::Zone, &zone.id, &refs[ri].id, MatchBasis::Name, score);
            pairs.push((ci, ri));
        }
    }

    for (ci, zone) in cand.iter().enumerate() {
        if !cand_taken[ci] {
            report.unmatched(ObjectKind::Zone, Side::Candidate, &zone.id);
        }
    }
    for (ri, zone) in refs.iter().enumerate() {
        if !ref_taken[ri] {
            report.unmatched(ObjectKind::Zone, Side::Reference, &zone.id);
        }
    }
    pairs
}

/// Best unclaimed name above the threshold; ties break toward the
/// lexicographically smallest id.
fn best_by_name<'a>(
    name: &str,
    ids: impl Iterator<Item = &'a str>,
    taken: &[bool],
    options: &MatchOptions,
) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64, &str)> = None;
    for (i, id) in ids.enumerate() {
        if taken[i] {
            continue;
        }
        let score = name_similarity(name, id);
        if score < options.name_threshold {
            continue;
        }
        let better = match &best {
            None => true,
            Some((_, s, b)) => score > *s || (score == *s && id < *b),
        };
        if better {
            best = Some((i, score, id));
        }
    }
    best.map(|(i, s, _)| (i, s))
}

/// The set of zone ids a system's terminals serve, optionally translated
/// through the zone pairing.
fn served_zone_set(
    system_id: &str,
    zones: &[&Zone],
    translate: Option<&[(String, String)]>,
) -> BTreeSet<String> {
    let mut set = BTreeSet::new();
    for zone in zones {
        let serves = zone.terminals.iter().any(|t| {
            t.served_by_heating_ventilating_air_conditioning_system.as_deref() == Some(system_id)
        });
        if !serves {
            continue;
        }
        let id = match translate {
            Some(map) => map
                .iter()
                .find(|(from, _)| *from == zone.id)
                .map(|(_, to)| to.clone())
                .unwrap_or_else(|| zone.id.clone()),
            None => zone.id.clone(),
        };
        set.insert(id);
    }
    set
}

#[allow(clippy::too_many_arguments)]
fn match_systems(
    cand: &[&HvacSystem],
    refs: &[&HvacSystem],
    cand_zones: &[&Zone],
    ref_zones: &[&Zone],
    zone_pairs: &[(usize, usize)],
    options: &MatchOptions,
    report: &mut MatchReportV1,
) {
    let translation: Vec<(String, String)> = zone_pairs
        .iter()
        .map(|(ci, ri)| (cand_zones[*ci].id.clone(), ref_zones[*ri].id.clone()))
        .collect();

    let ref_sets: Vec<BTreeSet<String>> = refs
        .iter()
        .map(|s| served_zone_set(&s.id, ref_zones, None))
        .collect();
    let mut ref_taken = vec![false; refs.len()];
    let mut cand_taken = vec![false; cand.len()];

    // Tier 1: identical served-zone sets (in reference id space).
    for (ci, system) in cand.iter().enumerate() {
        let set = served_zone_set(&system.id, cand_zones, Some(&translation));
        if set.is_empty() {
            continue;
        }
        let mut hit: Option<usize> = None;
        for (ri, ref_set) in ref_sets.iter().enumerate() {
            if ref_taken[ri] || *ref_set != set {
                continue;
            }
            let better = match hit {
                None => true,
                Some(prev) => refs[ri].id < refs[prev].id,
            };
            if better {
                hit = Some(ri);
            }
        }
        if let Some(ri) = hit {
            ref_taken[ri] = true;
            cand_taken[ci] = true;
            report.pair(
                ObjectKind::HvacSystem,
                &system.id,
                &refs[ri].id,
                MatchBasis::ZoneSet,
                name_similarity(&system.id, &refs[ri].id),
            );
        }
    }

    // Tier 2: name similarity.
    for (ci, system) in cand.iter().enumerate() {
        if cand_taken[ci] {
            continue;
        }
        if let Some((ri, score)) =
            best_by_name(&system.id, refs.iter().map(|r| r.id.as_str()), &ref_taken, options)
        {
            ref_taken[ri] = true;
            cand_taken[ci] = true;
            report.pair(
                ObjectKind::HvacSystem,
                &system.id,
                &refs[ri].id,
                MatchBasis::Name,
                score,
            );
        }
    }

    for (ci, system) in cand.iter().enumerate() {
        if !cand_taken[ci] {
            report.unmatched(ObjectKind::HvacSystem, Side::Candidate, &system.id);
        }
    }
    for (ri, system) in refs.iter().enumerate() {
        if !ref_taken[ri] {
            report.unmatched(ObjectKind::HvacSystem, Side::Reference, &system.id);
        }
    }
}

fn azimuth_delta(a: f64, b: f64) -> f64 {
    let d = (a - b).rem_euclid(360.0);
    d.min(360.0 - d)
}

fn geometry_compatible(a: &Surface, b: &Surface, options: &MatchOptions) -> bool {
    let areas = match (a.area, b.area) {
        (Some(x), Some(y)) => (x - y).abs() <= options.area_tolerance * x.max(y),
        _ => false,
    };
    if !areas {
        return false;
    }
    match (a.azimuth, b.azimuth) {
        (Some(x), Some(y)) => azimuth_delta(x, y) <= options.azimuth_tolerance,
        // Azimuth-less surfaces (floors, ceilings) compare on area alone.
        (None, None) => true,
        _ => false,
    }
}

fn match_surfaces(
    cand_zone: &Zone,
    ref_zone: &Zone,
    options: &MatchOptions,
    report: &mut MatchReportV1,
) {
    let cand = &cand_zone.surfaces;
    let refs = &ref_zone.surfaces;
    let mut ref_taken = vec![false; refs.len()];
    let mut cand_taken = vec![false; cand.len()];

    // Tier 1: geometry; name similarity only breaks ties.
    for (ci, surface) in cand.iter().enumerate() {
        let mut best: Option<(usize, f64)> = None;
        for (ri, r) in refs.iter().enumerate() {
            if ref_taken[ri] || !geometry_compatible(surface, r, options) {
                continue;
            }
            let score = name_similarity(&surface.id, &r.id);
            let better = match &best {
                None => true,
                Some((bi, bs)) => score > *bs || (score == *bs && r.id < refs[*bi].id),
            };
            if better {
                best = Some((ri, score));
            }
        }
        if let Some((ri, score)) = best {
            ref_taken[ri] = true;
            cand_taken[ci] = true;
            report.pair(
                ObjectKind::Surface,
                &surface.id,
                &refs[ri].id,
                MatchBasis::Geometry,
                score,
            );
        }
    }

    // Tier 2: name similarity.
    for (ci, surface) in cand.iter().enumerate() {
        if cand_taken[ci] {
            continue;
        }
        if let Some((ri, score)) =
            best_by_name(&surface.id, refs.iter().map(|r| r.id.as_str()), &ref_taken, options)
        {
            ref_taken[ri] = true;
            cand_taken[ci] = true;
            report.pair(ObjectKind::Surface, &surface.id, &refs[ri].id, MatchBasis::Name, score);
        }
    }

    for (ci, surface) in cand.iter().enumerate() {
        if !cand_taken[ci] {
            report.unmatched(ObjectKind::Surface, Side::Candidate, &surface.id);
        }
    }
    for (ri, surface) in refs.iter().enumerate() {
        if !ref_taken[ri] {
            report.unmatched(ObjectKind::Surface, Side::Reference, &surface.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rpdgen_schema::doc::{
        Building, BuildingSegment, RulesetModelDescription, Surface, Terminal,
    };

    fn surface(id: &str, area: f64, azimuth: Option<f64>) -> Surface {
        Surface {
            id: id.to_string(),
            classification: None,
            area: Some(area),
            azimuth,
            tilt: None,
            adjacent_to: None,
            adjacent_zone: None,
            construction: None,
            subsurfaces: Vec::new(),
        }
    }

    fn zone(id: &str, system: Option<&str>, surfaces: Vec<Surface>) -> Zone {
        Zone {
            id: id.to_string(),
            terminals: system
                .map(|s| {
                    vec![Terminal {
                        id: format!("{id} Terminal"),
                        terminal_type: None,
                        served_by_heating_ventilating_air_conditioning_system: Some(s.to_string()),
                        primary_airflow: None,
                        heating_capacity: None,
                        heating_source: None,
                    }]
                })
                .unwrap_or_default(),
            surfaces,
            ..Default::default()
        }
    }

    fn document(zones: Vec<Zone>, system_ids: &[&str]) -> RulesetProjectDescription {
        RulesetProjectDescription {
            id: "P".to_string(),
            ruleset_model_descriptions: vec![RulesetModelDescription {
                id: "M".to_string(),
                buildings: vec![Building {
                    id: "B".to_string(),
                    building_segments: vec![BuildingSegment {
                        id: "Seg".to_string(),
                        zones,
                        heating_ventilating_air_conditioning_systems: system_ids
                            .iter()
                            .map(|id| HvacSystem {
                                id: id.to_string(),
                                cooling_system: None,
                                heating_system: None,
                                fan_system: None,
                            })
                            .collect(),
                    }],
                }],
                ..Default::default()
            }],
        }
    }

    #[test]
    fn identical_documents_match_completely() {
        let doc = document(
            vec![zone("Z1", Some("S1"), vec![surface("W1", 10.0, Some(0.0))])],
            &["S1"],
        );
        let report = diff_documents(&doc, &doc, &MatchOptions::default());
        assert!(report.is_complete());
        assert_eq!(report.summary.pairs, 3); // zone, system, surface
        assert!(report.pairs.iter().any(|p| p.basis == MatchBasis::Id));
    }

    #[test]
    fn renamed_zone_recovers_through_name_similarity() {
        let cand = document(vec![zone("Zone 1", None, vec![])], &[]);
        let reference = document(vec![zone("Zone-1", None, vec![])], &[]);
        let report = diff_documents(&cand, &reference, &MatchOptions::default());
        assert!(report.is_complete());
        let pair = &report.pairs[0];
        assert_eq!(pair.basis, MatchBasis::Name);
        assert!(pair.score >= 0.8);
    }

    #[test]
    fn renamed_system_recovers_through_its_zone_set() {
        let cand = document(
            vec![zone("Z1", Some("AHU-North"), vec![]), zone("Z2", Some("AHU-North"), vec![])],
            &["AHU-North"],
        );
        let reference = document(
            vec![zone("Z1", Some("System 7"), vec![]), zone("Z2", Some("System 7"), vec![])],
            &["System 7"],
        );
        let report = diff_documents(&cand, &reference, &MatchOptions::default());
        let system_pair = report
            .pairs
            .iter()
            .find(|p| p.kind == ObjectKind::HvacSystem)
            .expect("system pair");
        assert_eq!(system_pair.basis, MatchBasis::ZoneSet);
        assert_eq!(system_pair.reference_id, "System 7");
    }

    #[test]
    fn surfaces_match_on_geometry_despite_renames() {
        let cand = document(
            vec![zone(
                "Z1",
                None,
                vec![surface("Front", 100.0, Some(0.0)), surface("Back", 100.0, Some(180.0))],
            )],
            &[],
        );
        let reference = document(
            vec![zone(
                "Z1",
                None,
                vec![surface("North Wall", 101.0, Some(2.0)), surface("South Wall", 100.0, Some(180.0))],
            )],
            &[],
        );
        let report = diff_documents(&cand, &reference, &MatchOptions::default());
        assert!(report.is_complete());
        let front = report
            .pairs
            .iter()
            .find(|p| p.candidate_id == "Front")
            .expect("front pair");
        assert_eq!(front.basis, MatchBasis::Geometry);
        assert_eq!(front.reference_id, "North Wall");
    }

    #[test]
    fn extra_objects_are_reported_unmatched() {
        let cand = document(vec![zone("Z1", None, vec![]), zone("Extra", None, vec![])], &[]);
        let reference = document(vec![zone("Z1", None, vec![]), zone("Missing", None, vec![])], &[]);
        let report = diff_documents(&cand, &reference, &MatchOptions::default());
        assert_eq!(report.summary.unmatched_candidate, 1);
        assert_eq!(report.summary.unmatched_reference, 1);
        assert!(report
            .unmatched
            .iter()
            .any(|u| u.side == Side::Candidate && u.id == "Extra"));
        assert!(report
            .unmatched
            .iter()
            .any(|u| u.side == Side::Reference && u.id == "Missing"));
    }

    #[test]
    fn flat_collections_match_on_names() {
        fn with_pumps(ids: &[&str]) -> RulesetProjectDescription {
            let mut doc = document(vec![], &[]);
            doc.ruleset_model_descriptions[0].pumps = ids
                .iter()
                .map(|id| rpdgen_schema::doc::Pump {
                    id: id.to_string(),
                    loop_or_piping: None,
                    speed_control: None,
                    design_flow: None,
                    design_head: None,
                    design_electric_power: None,
                    power_per_flow_rate: None,
                })
                .collect();
            doc
        }
        let cand = with_pumps(&["HW Pump", "CW Pump 2"]);
        let reference = with_pumps(&["HW-Pump", "Tower Pump"]);
        let report = diff_documents(&cand, &reference, &MatchOptions::default());

        let pump_pair = report
            .pairs
            .iter()
            .find(|p| p.kind == ObjectKind::Pump)
            .expect("pump pair");
        assert_eq!(pump_pair.candidate_id, "HW Pump");
        assert_eq!(pump_pair.reference_id, "HW-Pump");
        assert_eq!(pump_pair.basis, MatchBasis::Name);
        assert!(report
            .unmatched
            .iter()
            .any(|u| u.kind == ObjectKind::Pump && u.id == "CW Pump 2"));
        assert!(report
            .unmatched
            .iter()
            .any(|u| u.kind == ObjectKind::Pump && u.id == "Tower Pump"));
    }

    #[test]
    fn azimuth_wraps_around_north() {
        assert!(azimuth_delta(359.0, 1.0) <= 5.0);
        assert!(azimuth_delta(90.0, 270.0) > 5.0);
    }
}
