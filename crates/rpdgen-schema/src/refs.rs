//! Referential catalogue: where ids live, and which fields must point at them.
//!
//! Each rule names one id collection (a path ending in `.id`) and the set of
//! reference-field paths whose values must all resolve into that collection.
//! Path syntax is the small query language the referential pass evaluates:
//! `.`-separated segments, where `name[]` descends into every element of an
//! array field and a bare `name` descends into an object field. The final
//! segment reads a scalar.

/// One reference kind: every value found at any of `ref_paths` must equal
/// some value found at `id_path`.
#[derive(Debug, Clone, Copy)]
pub struct ReferenceRule {
    pub code: &'static str,
    pub description: &'static str,
    pub id_path: &'static str,
    pub ref_paths: &'static [&'static str],
}

const ZONES: &str = "ruleset_model_descriptions[].buildings[].building_segments[].zones[]";
const HVAC: &str =
    "ruleset_model_descriptions[].buildings[].building_segments[].heating_ventilating_air_conditioning_systems[]";

const RULES: &[ReferenceRule] = &[
    ReferenceRule {
        code: "REF_ADJACENT_ZONE",
        description: "every surface's adjacent_zone must equal some zone's id",
        id_path: "ruleset_model_descriptions[].buildings[].building_segments[].zones[].id",
        ref_paths:
            &["ruleset_model_descriptions[].buildings[].building_segments[].zones[].surfaces[].adjacent_zone"],
    },
    ReferenceRule {
        code: "REF_TERMINAL_SYSTEM",
        description: "every terminal's serving system must equal some HVAC system's id",
        id_path:
            "ruleset_model_descriptions[].buildings[].building_segments[].heating_ventilating_air_conditioning_systems[].id",
        ref_paths: &[
            "ruleset_model_descriptions[].buildings[].building_segments[].zones[].terminals[].served_by_heating_ventilating_air_conditioning_system",
        ],
    },
    ReferenceRule {
        code: "REF_FLUID_LOOP",
        description: "every loop-valued equipment field must equal some fluid loop's id",
        id_path: "ruleset_model_descriptions[].fluid_loops[].id",
        ref_paths: &[
            "ruleset_model_descriptions[].pumps[].loop_or_piping",
            "ruleset_model_descriptions[].boilers[].loop",
            "ruleset_model_descriptions[].chillers[].cooling_loop",
            "ruleset_model_descriptions[].chillers[].condensing_loop",
            "ruleset_model_descriptions[].heat_rejections[].loop",
            "ruleset_model_descriptions[].service_water_heating_equipment[].hot_water_loop",
            "ruleset_model_descriptions[].buildings[].building_segments[].heating_ventilating_air_conditioning_systems[].cooling_system.chilled_water_loop",
            "ruleset_model_descriptions[].buildings[].building_segments[].heating_ventilating_air_conditioning_systems[].heating_system.hot_water_loop",
        ],
    },
    ReferenceRule {
        code: "REF_SCHEDULE",
        description: "every schedule-valued field must equal some schedule's id",
        id_path: "ruleset_model_descriptions[].schedules[].id",
        ref_paths: &[
            "ruleset_model_descriptions[].buildings[].building_segments[].zones[].thermostat_heating_setpoint_schedule",
            "ruleset_model_descriptions[].buildings[].building_segments[].zones[].thermostat_cooling_setpoint_schedule",
            "ruleset_model_descriptions[].buildings[].building_segments[].zones[].spaces[].occupant_multiplier_schedule",
            "ruleset_model_descriptions[].buildings[].building_segments[].zones[].spaces[].interior_lighting[].lighting_multiplier_schedule",
            "ruleset_model_descriptions[].buildings[].building_segments[].zones[].spaces[].miscellaneous_equipment[].multiplier_schedule",
            "ruleset_model_descriptions[].buildings[].building_segments[].heating_ventilating_air_conditioning_systems[].fan_system.operating_schedule",
        ],
    },
];

/// Collections whose member ids must be unique (one path per collection).
const UNIQUE_ID_PATHS: &[&str] = &[
    "ruleset_model_descriptions[].buildings[].building_segments[].zones[].id",
    "ruleset_model_descriptions[].buildings[].building_segments[].heating_ventilating_air_conditioning_systems[].id",
    "ruleset_model_descriptions[].schedules[].id",
    "ruleset_model_descriptions[].fluid_loops[].id",
    "ruleset_model_descriptions[].pumps[].id",
    "ruleset_model_descriptions[].boilers[].id",
    "ruleset_model_descriptions[].chillers[].id",
    "ruleset_model_descriptions[].heat_rejections[].id",
    "ruleset_model_descriptions[].service_water_heating_equipment[].id",
];

pub fn reference_rules() -> &'static [ReferenceRule] {
    RULES
}

pub fn id_uniqueness_paths() -> &'static [&'static str] {
    UNIQUE_ID_PATHS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rule_codes_are_unique() {
        let mut seen = std::collections::BTreeSet::new();
        for rule in reference_rules() {
            assert!(seen.insert(rule.code), "duplicate rule code {}", rule.code);
        }
    }

    #[test]
    fn paths_are_rooted_and_nonterminal_segments_descend() {
        let all = reference_rules()
            .iter()
            .flat_map(|r| {
                std::iter::once(r.id_path).chain(r.ref_paths.iter().copied())
            })
            .chain(id_uniqueness_paths().iter().copied());
        for path in all {
            assert!(
                path.starts_with("ruleset_model_descriptions[]"),
                "path not rooted at the model list: {path}"
            );
            let last = path.rsplit('.').next().unwrap();
            assert!(
                !last.ends_with("[]"),
                "path must end in a scalar segment: {path}"
            );
        }
    }

    #[test]
    fn zone_and_hvac_prefixes_match_the_constants() {
        assert!(reference_rules()[0].id_path.starts_with(ZONES));
        assert!(reference_rules()[1].id_path.starts_with(HVAC));
    }
}
