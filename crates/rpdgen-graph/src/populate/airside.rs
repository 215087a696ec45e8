//! Airside rules: systems and the zone records that decorate spaces.
//!
//! A SYSTEM record becomes one HVAC system with cooling, heating and fan
//! sub-systems; a ZONE record becomes a terminal (staged onto its space) plus
//! the thermostat and exhaust attributes the space's output zone picks up at
//! assembly. Loop references are carried as written, resolved or not; the
//! validator owns referential integrity of the output document.

use rpdgen_bdl::coerce;
use rpdgen_schema::doc::{
    self, CoolingSystemType, EnergySource, FanSpeedControl, FanSystemControl, HeatingSystemType,
    TerminalType,
};

use crate::model::ModelRoot;
use crate::node::Node;
use crate::populate::attrs::{ComputedAttrs, SystemAttrs, ZoneAttrs};
use crate::populate::envelope::schedule_ref;
use crate::results::{
    ResultService, SYSTEM_COOLING_CAPACITY, SYSTEM_HEATING_CAPACITY, SYSTEM_OUTDOOR_AIRFLOW,
    SYSTEM_SUPPLY_AIRFLOW, SYSTEM_SUPPLY_FAN_KW, ZONE_EXHAUST_AIRFLOW, ZONE_EXHAUST_FAN_KW,
    ZONE_HEATING_CAPACITY, ZONE_SUPPLY_AIRFLOW,
};

/// (cooling type, fan control) by system TYPE. Packaged types cool with
/// direct expansion; central types with a chilled water coil. SUM is the
/// unconditioned-sum pseudo-system.
fn system_traits(type_tag: Option<&str>) -> (Option<CoolingSystemType>, Option<FanSystemControl>) {
    match type_tag {
        Some("PSZ") | Some("PTAC") | Some("PVVT") | Some("HP") => (
            Some(CoolingSystemType::DirectExpansion),
            Some(FanSystemControl::ConstantVolume),
        ),
        Some("PVAVS") | Some("PIU") => (
            Some(CoolingSystemType::DirectExpansion),
            Some(FanSystemControl::VariableAirVolume),
        ),
        Some("SZRH") | Some("RHFS") | Some("FC") | Some("UVT") => (
            Some(CoolingSystemType::FluidLoop),
            Some(FanSystemControl::ConstantVolume),
        ),
        Some("VAVS") => (
            Some(CoolingSystemType::FluidLoop),
            Some(FanSystemControl::VariableAirVolume),
        ),
        Some("SUM") => (Some(CoolingSystemType::None), None),
        Some(_) => (Some(CoolingSystemType::Other), None),
        None => (None, None),
    }
}

/// (heating type, energy source) by HEAT-SOURCE. Hot water heat gets its
/// energy source from the plant, not here.
fn heating_traits(
    source_tag: Option<&str>,
) -> (Option<HeatingSystemType>, Option<EnergySource>) {
    match source_tag {
        Some("HOT-WATER") => (Some(HeatingSystemType::FluidLoop), None),
        Some("FURNACE") => (
            Some(HeatingSystemType::Furnace),
            Some(EnergySource::NaturalGas),
        ),
        Some("ELECTRIC") => (
            Some(HeatingSystemType::Electric),
            Some(EnergySource::Electricity),
        ),
        Some("HEAT-PUMP") => (
            Some(HeatingSystemType::HeatPump),
            Some(EnergySource::Electricity),
        ),
        Some("NONE") => (Some(HeatingSystemType::None), None),
        Some(_) => (Some(HeatingSystemType::Other), None),
        None => (None, None),
    }
}

pub fn compute_system(node: &Node, model: &ModelRoot, results: &dyn ResultService) -> ComputedAttrs {
    let r = &node.record;
    let (cooling_type, fan_control) = system_traits(coerce::try_str(r, "TYPE"));
    let (heating_type, heating_source) = heating_traits(coerce::try_str(r, "HEAT-SOURCE"));

    let values = results.query(
        &node.unique_name,
        &[
            SYSTEM_SUPPLY_AIRFLOW,
            SYSTEM_SUPPLY_FAN_KW,
            SYSTEM_COOLING_CAPACITY,
            SYSTEM_HEATING_CAPACITY,
            SYSTEM_OUTDOOR_AIRFLOW,
        ],
    );
    let value = |code: i64| values.get(&code).copied().flatten();

    ComputedAttrs::System(SystemAttrs {
        cooling_type,
        cooling_capacity: value(SYSTEM_COOLING_CAPACITY.code).map(coerce::kbtuh_to_watts),
        chilled_water_loop: coerce::try_str(r, "CHW-LOOP").map(str::to_string),
        heating_type,
        // The engine reports heating capacities as negative heat flow.
        heating_capacity: value(SYSTEM_HEATING_CAPACITY.code)
            .map(|v| coerce::kbtuh_to_watts(v.abs())),
        heating_source,
        hot_water_loop: coerce::try_str(r, "HW-LOOP").map(str::to_string),
        fan_control,
        fan_schedule: schedule_ref(node, model, "FAN-SCHEDULE"),
        supply_airflow: value(SYSTEM_SUPPLY_AIRFLOW.code).map(coerce::cfm_to_l_per_s),
        supply_fan_power: value(SYSTEM_SUPPLY_FAN_KW.code).map(|kw| kw * 1000.0),
        minimum_outdoor_airflow: value(SYSTEM_OUTDOOR_AIRFLOW.code).map(coerce::cfm_to_l_per_s),
    })
}

pub fn compute_zone(node: &Node, model: &ModelRoot, results: &dyn ResultService) -> ComputedAttrs {
    let r = &node.record;
    let system = node.owner.map(|i| model.registry.get(i));
    let system_type = system.and_then(|s| coerce::try_str(&s.record, "TYPE"));
    let terminal_type = match system_traits(system_type).1 {
        Some(FanSystemControl::VariableAirVolume)
        | Some(FanSystemControl::MultiZoneVariableAirVolume) => {
            Some(TerminalType::VariableAirVolume)
        }
        Some(_) => Some(TerminalType::ConstantAirVolume),
        None => None,
    };
    // Reheat source: the zone's own HEAT-SOURCE wins over the system's.
    let heating_source = match coerce::try_str(r, "HEAT-SOURCE") {
        Some(tag) => heating_traits(Some(tag)).1,
        None => heating_traits(system.and_then(|s| coerce::try_str(&s.record, "HEAT-SOURCE"))).1,
    };

    let values = results.query(
        &node.unique_name,
        &[
            ZONE_SUPPLY_AIRFLOW,
            ZONE_EXHAUST_AIRFLOW,
            ZONE_HEATING_CAPACITY,
            ZONE_EXHAUST_FAN_KW,
        ],
    );
    let value = |code: i64| values.get(&code).copied().flatten();

    ComputedAttrs::Zone(ZoneAttrs {
        space: coerce::try_str(r, "SPACE").map(str::to_string),
        system: system.map(|s| s.unique_name.clone()),
        terminal_type,
        primary_airflow: value(ZONE_SUPPLY_AIRFLOW.code)
            .or_else(|| coerce::try_f64(r, "ASSIGNED-FLOW"))
            .map(coerce::cfm_to_l_per_s),
        heating_capacity: value(ZONE_HEATING_CAPACITY.code)
            .map(|v| coerce::kbtuh_to_watts(v.abs())),
        heating_source,
        design_heating_setpoint: coerce::try_f64(r, "DESIGN-HEAT-T")
            .map(coerce::fahrenheit_to_celsius),
        design_cooling_setpoint: coerce::try_f64(r, "DESIGN-COOL-T")
            .map(coerce::fahrenheit_to_celsius),
        heating_schedule: schedule_ref(node, model, "HEAT-TEMP-SCH"),
        cooling_schedule: schedule_ref(node, model, "COOL-TEMP-SCH"),
        exhaust_airflow: value(ZONE_EXHAUST_AIRFLOW.code)
            .or_else(|| coerce::try_f64(r, "EXHAUST-FLOW"))
            .map(coerce::cfm_to_l_per_s),
        exhaust_fan_power: value(ZONE_EXHAUST_FAN_KW.code).map(|kw| kw * 1000.0),
    })
}

pub fn assemble_system(node: &Node) -> doc::HvacSystem {
    let attrs = match &node.computed {
        ComputedAttrs::System(a) => a.clone(),
        _ => SystemAttrs::default(),
    };
    let name = &node.unique_name;

    let cooling_system = (attrs.cooling_type.is_some()
        || attrs.cooling_capacity.is_some()
        || attrs.chilled_water_loop.is_some())
    .then(|| doc::CoolingSystem {
        id: format!("{name} Cooling"),
        cooling_system_type: attrs.cooling_type,
        design_total_cool_capacity: attrs.cooling_capacity,
        chilled_water_loop: attrs.chilled_water_loop.clone(),
    });

    let heating_system = (attrs.heating_type.is_some()
        || attrs.heating_capacity.is_some()
        || attrs.hot_water_loop.is_some())
    .then(|| doc::HeatingSystem {
        id: format!("{name} Heating"),
        heating_system_type: attrs.heating_type,
        design_capacity: attrs.heating_capacity,
        energy_source_type: attrs.heating_source,
        hot_water_loop: attrs.hot_water_loop.clone(),
    });

    let supply_fans = (attrs.supply_airflow.is_some() || attrs.supply_fan_power.is_some())
        .then(|| doc::Fan {
            id: format!("{name} Supply Fan"),
            design_airflow: attrs.supply_airflow,
            design_electric_power: attrs.supply_fan_power,
            speed_control: match attrs.fan_control {
                Some(FanSystemControl::VariableAirVolume)
                | Some(FanSystemControl::MultiZoneVariableAirVolume) => {
                    Some(FanSpeedControl::VariableSpeed)
                }
                Some(_) => Some(FanSpeedControl::FixedSpeed),
                None => None,
            },
        })
        .into_iter()
        .collect::<Vec<_>>();

    let fan_system = (attrs.fan_control.is_some()
        || attrs.fan_schedule.is_some()
        || attrs.minimum_outdoor_airflow.is_some()
        || !supply_fans.is_empty())
    .then(|| doc::FanSystem {
        id: format!("{name} Fan System"),
        fan_control: attrs.fan_control,
        operating_schedule: attrs.fan_schedule.clone(),
        minimum_outdoor_airflow: attrs.minimum_outdoor_airflow,
        supply_fans,
        return_fans: Vec::new(),
    });

    doc::HvacSystem {
        id: name.clone(),
        cooling_system,
        heating_system,
        fan_system,
    }
}

pub fn assemble_terminal(node: &Node) -> Option<doc::Terminal> {
    let ComputedAttrs::Zone(attrs) = &node.computed else {
        return None;
    };
    Some(doc::Terminal {
        id: format!("{} Terminal", node.unique_name),
        terminal_type: attrs.terminal_type,
        served_by_heating_ventilating_air_conditioning_system: attrs.system.clone(),
        primary_airflow: attrs.primary_airflow,
        heating_capacity: attrs.heating_capacity,
        heating_source: attrs.heating_source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::build_graph;
    use crate::populate::{run_phase1, run_phase2};
    use crate::results::{EmptyResultService, JsonResultService};
    use approx::assert_relative_eq;
    use rpdgen_bdl::{CommandKind, JsonRecordSource, Record};

    fn airside_source() -> JsonRecordSource {
        JsonRecordSource::from_records([
            (CommandKind::Floor, vec![Record::new("Fl")]),
            (
                CommandKind::Space,
                vec![Record::new("Sp").with_parent("Fl").with_num("AREA", 1000.0)],
            ),
            (
                CommandKind::System,
                vec![Record::new("Sys")
                    .with_str("TYPE", "VAVS")
                    .with_str("HEAT-SOURCE", "HOT-WATER")
                    .with_str("CHW-LOOP", "CHW Loop")
                    .with_str("HW-LOOP", "HW Loop")],
            ),
            (
                CommandKind::Zone,
                vec![Record::new("Zn")
                    .with_parent("Sys")
                    .with_str("SPACE", "Sp")
                    .with_num("DESIGN-HEAT-T", 70.0)
                    .with_num("DESIGN-COOL-T", 75.0)
                    .with_num("EXHAUST-FLOW", 100.0)],
            ),
        ])
    }

    #[test]
    fn system_assembles_subsystems_from_type_tables() {
        let mut results = JsonResultService::default();
        results.insert("Sys", SYSTEM_SUPPLY_AIRFLOW.code, 10_000.0);
        results.insert("Sys", SYSTEM_SUPPLY_FAN_KW.code, 7.5);
        results.insert("Sys", SYSTEM_COOLING_CAPACITY.code, 120.0);

        let mut model = build_graph(&airside_source()).unwrap();
        run_phase1(&mut model, &results).unwrap();
        run_phase2(&mut model).unwrap();

        assert_eq!(model.collections.hvac_systems.len(), 1);
        let sys = &model.collections.hvac_systems[0];
        let cooling = sys.cooling_system.as_ref().expect("cooling");
        assert_eq!(cooling.cooling_system_type, Some(CoolingSystemType::FluidLoop));
        assert_eq!(cooling.chilled_water_loop.as_deref(), Some("CHW Loop"));
        assert_relative_eq!(
            cooling.design_total_cool_capacity.unwrap(),
            coerce::kbtuh_to_watts(120.0)
        );
        let heating = sys.heating_system.as_ref().expect("heating");
        assert_eq!(heating.heating_system_type, Some(HeatingSystemType::FluidLoop));
        assert_eq!(heating.hot_water_loop.as_deref(), Some("HW Loop"));
        let fans = sys.fan_system.as_ref().expect("fan system");
        assert_eq!(fans.fan_control, Some(FanSystemControl::VariableAirVolume));
        assert_eq!(fans.supply_fans.len(), 1);
        assert_eq!(fans.supply_fans[0].design_electric_power, Some(7_500.0));
        assert_eq!(
            fans.supply_fans[0].speed_control,
            Some(FanSpeedControl::VariableSpeed)
        );
    }

    #[test]
    fn zone_decorates_space_and_stages_a_terminal() {
        let mut model = build_graph(&airside_source()).unwrap();
        run_phase1(&mut model, &EmptyResultService).unwrap();
        run_phase2(&mut model).unwrap();

        assert_eq!(model.collections.zones.len(), 1);
        let zone = &model.collections.zones[0];
        assert_eq!(zone.id, "Zn");
        assert_relative_eq!(
            zone.design_thermostat_heating_setpoint.unwrap(),
            coerce::fahrenheit_to_celsius(70.0)
        );
        assert_relative_eq!(
            zone.exhaust_airflow_rate.unwrap(),
            coerce::cfm_to_l_per_s(100.0)
        );
        assert_eq!(zone.terminals.len(), 1);
        let terminal = &zone.terminals[0];
        assert_eq!(terminal.id, "Zn Terminal");
        assert_eq!(terminal.terminal_type, Some(TerminalType::VariableAirVolume));
        assert_eq!(
            terminal
                .served_by_heating_ventilating_air_conditioning_system
                .as_deref(),
            Some("Sys")
        );
    }

    #[test]
    fn assembly_is_a_pure_function_of_computed_state() {
        let mut model = build_graph(&airside_source()).unwrap();
        run_phase1(&mut model, &EmptyResultService).unwrap();

        let sys = model.registry.resolve("Sys").unwrap();
        assert_eq!(assemble_system(sys), assemble_system(sys));
        let zone = model.registry.resolve("Zn").unwrap();
        assert_eq!(assemble_terminal(zone), assemble_terminal(zone));
    }

    #[test]
    fn sum_system_has_no_fan_section_without_results() {
        let source = JsonRecordSource::from_records([(
            CommandKind::System,
            vec![Record::new("Sum").with_str("TYPE", "SUM")],
        )]);
        let mut model = build_graph(&source).unwrap();
        run_phase1(&mut model, &EmptyResultService).unwrap();
        run_phase2(&mut model).unwrap();
        let sys = &model.collections.hvac_systems[0];
        assert_eq!(
            sys.cooling_system.as_ref().unwrap().cooling_system_type,
            Some(CoolingSystemType::None)
        );
        assert!(sys.fan_system.is_none());
        assert!(sys.heating_system.is_none());
    }
}
