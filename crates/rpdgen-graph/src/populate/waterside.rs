//! Waterside rules: pumps, circulation loops, boilers, chillers, heat
//! rejection and service water heaters.
//!
//! A pump never knows its loop from its own record; the loop (or the plant
//! equipment sitting between loop and pump) names the pump and emits side
//! writes that the Phase-1 sub-pass applies. Loop references on equipment
//! are carried as written for the validator to check.

use rpdgen_bdl::{coerce, CommandKind};
use rpdgen_schema::doc::{
    self, BoilerDraftType, ChillerCompressorType, EnergySource, FanSpeedControl, FluidLoopOperation,
    FluidLoopType, PumpSpeedControl, ServiceWaterHeaterTankType,
};
use tracing::warn;

use crate::model::ModelRoot;
use crate::node::Node;
use crate::populate::attrs::{
    BoilerAttrs, ChillerAttrs, ComputedAttrs, DwHeaterAttrs, FluidLoopAttrs, HeatRejectionAttrs,
    PumpAttrs,
};
use crate::populate::project::fuel_tag_source;
use crate::populate::SideWrite;
use crate::results::{
    ResultService, BOILER_AUX_KW, BOILER_CAPACITY, CHILLER_CAPACITY, DWH_CAPACITY,
    HEAT_REJECTION_FAN_KW, PUMP_FLOW, PUMP_HEAD, PUMP_KW,
};

pub fn compute_pump(node: &Node, results: &dyn ResultService) -> ComputedAttrs {
    let r = &node.record;
    let speed_control = coerce::try_str(r, "CAP-CTRL").map(|tag| match tag {
        "ONE-SPEED-PUMP" => PumpSpeedControl::FixedSpeed,
        "TWO-SPEED-PUMP" => PumpSpeedControl::TwoSpeed,
        "VAR-SPEED-PUMP" => PumpSpeedControl::VariableSpeed,
        _ => PumpSpeedControl::Other,
    });
    let values = results.query(&node.unique_name, &[PUMP_FLOW, PUMP_HEAD, PUMP_KW]);
    let value = |code: i64| values.get(&code).copied().flatten();
    ComputedAttrs::Pump(PumpAttrs {
        loop_or_piping: None,
        speed_control,
        design_flow: value(PUMP_FLOW.code)
            .or_else(|| coerce::try_f64(r, "FLOW"))
            .map(coerce::gpm_to_l_per_s),
        design_head: value(PUMP_HEAD.code)
            .or_else(|| coerce::try_f64(r, "HEAD"))
            .map(coerce::ft_head_to_pa),
        design_electric_power: value(PUMP_KW.code).map(|kw| kw * 1000.0),
        power_per_flow_rate: None,
    })
}

/// Side writes wiring `pump` to `loop_id`, provided the name resolves to a
/// pump node. The power-per-flow figure comes from the pump's own simulated
/// flow and power, queried here because the wiring is the loop's concern.
fn pump_writes(
    owner: &Node,
    model: &ModelRoot,
    results: &dyn ResultService,
    pump_key: &str,
    loop_id: &str,
) -> Vec<SideWrite> {
    let Some(pump) = coerce::try_str(&owner.record, pump_key) else {
        return Vec::new();
    };
    match model.registry.resolve(pump) {
        Some(n) if n.kind == CommandKind::Pump => {}
        _ => {
            warn!(node = %owner.unique_name, pump, "pump reference does not resolve");
            return Vec::new();
        }
    }
    let mut writes = vec![SideWrite::PumpLoop {
        pump: pump.to_string(),
        loop_id: loop_id.to_string(),
    }];
    let values = results.query(pump, &[PUMP_FLOW, PUMP_KW]);
    let flow = values.get(&PUMP_FLOW.code).copied().flatten();
    let kw = values.get(&PUMP_KW.code).copied().flatten();
    if let (Some(flow), Some(kw)) = (flow, kw) {
        let flow_l_s = coerce::gpm_to_l_per_s(flow);
        if flow_l_s > 0.0 {
            writes.push(SideWrite::PumpPowerPerFlow {
                pump: pump.to_string(),
                w_per_l_s: kw * 1000.0 / flow_l_s,
            });
        }
    }
    writes
}

pub fn compute_loop(
    node: &Node,
    model: &ModelRoot,
    results: &dyn ResultService,
) -> (ComputedAttrs, Vec<SideWrite>) {
    let r = &node.record;
    let loop_type = coerce::try_str(r, "TYPE").map(|tag| match tag {
        "HW" => FluidLoopType::HeatingWater,
        "CHW" => FluidLoopType::ChilledWater,
        "CW" => FluidLoopType::CondenserWater,
        "DHW" => FluidLoopType::ServiceWaterHeating,
        _ => FluidLoopType::Other,
    });
    let operation = coerce::try_str(r, "LOOP-OPERATION").map(|tag| match tag {
        "CONTINUOUS" => FluidLoopOperation::Continuous,
        "DEMAND-ONLY" | "STANDBY" => FluidLoopOperation::Intermittent,
        "SCHEDULED" => FluidLoopOperation::ScheduledOff,
        _ => FluidLoopOperation::Other,
    });

    // Supply temperature by loop duty; return derived from the design delta.
    let supply = match loop_type {
        Some(FluidLoopType::HeatingWater) | Some(FluidLoopType::ServiceWaterHeating) => {
            coerce::try_f64(r, "DESIGN-HEAT-T")
        }
        _ => coerce::try_f64(r, "DESIGN-COOL-T"),
    }
    .map(coerce::fahrenheit_to_celsius);
    let delta = coerce::try_f64(r, "LOOP-DESIGN-DT").map(coerce::delta_f_to_c);
    let design_return_temperature = match (supply, delta, loop_type) {
        (Some(s), Some(d), Some(FluidLoopType::HeatingWater))
        | (Some(s), Some(d), Some(FluidLoopType::ServiceWaterHeating)) => Some(s - d),
        (Some(s), Some(d), _) => Some(s + d),
        _ => None,
    };

    let writes = pump_writes(node, model, results, "LOOP-PUMP", &node.unique_name);
    let attrs = ComputedAttrs::FluidLoop(FluidLoopAttrs {
        loop_type,
        operation,
        design_supply_temperature: supply,
        design_return_temperature,
        design_flow: coerce::try_f64(r, "DESIGN-FLOW").map(coerce::gpm_to_l_per_s),
    });
    (attrs, writes)
}

/// The energy source of fuel-burning equipment: its own FUEL-METER, else the
/// master meters' default heat fuel meter, chased to the meter's TYPE.
fn fuel_meter_source(node: &Node, model: &ModelRoot) -> Option<EnergySource> {
    let name = coerce::try_str(&node.record, "FUEL-METER")
        .map(str::to_string)
        .or_else(|| {
            let mm = model
                .registry
                .iter()
                .find(|n| n.kind == CommandKind::MasterMeters)?;
            coerce::try_str(&mm.record, "HEAT-FUEL-METER").map(str::to_string)
        })?;
    match model.registry.resolve(&name) {
        Some(meter) if meter.kind == CommandKind::FuelMeter => {
            Some(fuel_tag_source(coerce::try_str(&meter.record, "TYPE")))
        }
        _ => {
            warn!(node = %node.unique_name, meter = %name, "fuel meter does not resolve");
            None
        }
    }
}

pub fn compute_boiler(
    node: &Node,
    model: &ModelRoot,
    results: &dyn ResultService,
) -> (ComputedAttrs, Vec<SideWrite>) {
    let r = &node.record;
    let type_tag = coerce::try_str(r, "TYPE");
    let draft_type = match type_tag {
        Some("HW-BOILER") => Some(BoilerDraftType::Natural),
        Some("HW-BOILER-W/DRAFT") => Some(BoilerDraftType::Forced),
        Some("HW-CONDENSING") => Some(BoilerDraftType::Condensing),
        Some("ELEC-HW-BOILER") | None => None,
        Some(_) => Some(BoilerDraftType::Other),
    };
    let energy_source = match type_tag {
        Some("ELEC-HW-BOILER") => Some(EnergySource::Electricity),
        _ => fuel_meter_source(node, model),
    };

    let values = results.query(&node.unique_name, &[BOILER_CAPACITY, BOILER_AUX_KW]);
    let value = |code: i64| values.get(&code).copied().flatten();

    let loop_ = coerce::try_str(r, "HW-LOOP").map(str::to_string);
    let writes = match &loop_ {
        Some(loop_id) => pump_writes(node, model, results, "HW-PUMP", loop_id),
        None => Vec::new(),
    };
    let attrs = ComputedAttrs::Boiler(BoilerAttrs {
        loop_,
        draft_type,
        energy_source,
        design_capacity: value(BOILER_CAPACITY.code).map(coerce::kbtuh_to_watts),
        rated_capacity: coerce::try_f64(r, "CAPACITY").map(coerce::kbtuh_to_watts),
        // HEAT-INPUT-RATIO is the inverse of thermal efficiency.
        efficiency: coerce::try_f64(r, "HEAT-INPUT-RATIO")
            .filter(|hir| *hir > 0.0)
            .map(|hir| 1.0 / hir),
        auxiliary_power: value(BOILER_AUX_KW.code).map(|kw| kw * 1000.0),
    });
    (attrs, writes)
}

pub fn compute_chiller(
    node: &Node,
    model: &ModelRoot,
    results: &dyn ResultService,
) -> (ComputedAttrs, Vec<SideWrite>) {
    let r = &node.record;
    let compressor_type = coerce::try_str(r, "TYPE").map(|tag| match tag {
        "ELEC-OPEN-CENT" | "ELEC-HERM-CENT" => ChillerCompressorType::Centrifugal,
        "ELEC-SCREW" => ChillerCompressorType::Screw,
        "ELEC-OPEN-REC" | "ELEC-HERM-REC" => ChillerCompressorType::Reciprocating,
        "ABSOR-1" => ChillerCompressorType::SingleEffectAbsorption,
        "ABSOR-2" => ChillerCompressorType::DoubleEffectAbsorption,
        _ => ChillerCompressorType::Other,
    });

    let values = results.query(&node.unique_name, &[CHILLER_CAPACITY]);
    let cooling_loop = coerce::try_str(r, "CHW-LOOP").map(str::to_string);
    let condensing_loop = coerce::try_str(r, "CW-LOOP").map(str::to_string);

    let mut writes = match &cooling_loop {
        Some(loop_id) => pump_writes(node, model, results, "CHW-PUMP", loop_id),
        None => Vec::new(),
    };
    if let Some(loop_id) = &condensing_loop {
        writes.extend(pump_writes(node, model, results, "CW-PUMP", loop_id));
    }

    let attrs = ComputedAttrs::Chiller(ChillerAttrs {
        cooling_loop,
        condensing_loop,
        compressor_type,
        design_capacity: values
            .get(&CHILLER_CAPACITY.code)
            .copied()
            .flatten()
            .map(coerce::kbtuh_to_watts),
        rated_capacity: coerce::try_f64(r, "CAPACITY").map(coerce::kbtuh_to_watts),
        design_leaving_evaporator_temperature: coerce::try_f64(r, "DESIGN-CHW-T")
            .map(coerce::fahrenheit_to_celsius),
        design_entering_condenser_temperature: coerce::try_f64(r, "DESIGN-COND-T")
            .map(coerce::fahrenheit_to_celsius),
        // ELEC-INPUT-RATIO is the inverse of the full-load COP.
        full_load_efficiency: coerce::try_f64(r, "ELEC-INPUT-RATIO")
            .filter(|eir| *eir > 0.0)
            .map(|eir| 1.0 / eir),
    });
    (attrs, writes)
}

pub fn compute_heat_rejection(
    node: &Node,
    model: &ModelRoot,
    results: &dyn ResultService,
) -> (ComputedAttrs, Vec<SideWrite>) {
    let r = &node.record;
    let heat_rejection_type = coerce::try_str(r, "TYPE").map(|tag| match tag {
        "OPEN-TWR" => doc::HeatRejectionType::OpenCircuitCoolingTower,
        "FLUID-COOLER" => doc::HeatRejectionType::ClosedCircuitCoolingTower,
        "DRY-COOLER" => doc::HeatRejectionType::DryCooler,
        _ => doc::HeatRejectionType::Other,
    });
    let fan_speed_control = coerce::try_str(r, "CAPACITY-CTRL").map(|tag| match tag {
        "ONE-SPEED-FAN" => FanSpeedControl::FixedSpeed,
        "TWO-SPEED-FAN" => FanSpeedControl::TwoSpeed,
        "VARIABLE-SPEED-FAN" => FanSpeedControl::VariableSpeed,
        _ => FanSpeedControl::Other,
    });

    let values = results.query(&node.unique_name, &[HEAT_REJECTION_FAN_KW]);
    let loop_ = coerce::try_str(r, "CW-LOOP").map(str::to_string);
    let writes = match &loop_ {
        Some(loop_id) => pump_writes(node, model, results, "CW-PUMP", loop_id),
        None => Vec::new(),
    };
    let attrs = ComputedAttrs::HeatRejection(HeatRejectionAttrs {
        loop_,
        heat_rejection_type,
        fan_speed_control,
        design_wetbulb_temperature: coerce::try_f64(r, "DESIGN-WETBULB")
            .map(coerce::fahrenheit_to_celsius),
        range: coerce::try_f64(r, "RANGE").map(coerce::delta_f_to_c),
        approach: coerce::try_f64(r, "APPROACH").map(coerce::delta_f_to_c),
        fan_motor_nameplate_power: values
            .get(&HEAT_REJECTION_FAN_KW.code)
            .copied()
            .flatten()
            .map(|kw| kw * 1000.0),
    });
    (attrs, writes)
}

pub fn compute_dw_heater(
    node: &Node,
    model: &ModelRoot,
    results: &dyn ResultService,
) -> ComputedAttrs {
    let r = &node.record;
    let type_tag = coerce::try_str(r, "TYPE");
    let tank_volume = coerce::try_f64(r, "TANK-VOLUME");
    let tank_type = match (type_tag, tank_volume) {
        (Some("HEAT-PUMP"), _) => Some(ServiceWaterHeaterTankType::HeatPumpPackagedStorage),
        (_, Some(v)) if v > 0.0 => Some(ServiceWaterHeaterTankType::Storage),
        (Some(_), _) => Some(ServiceWaterHeaterTankType::Instantaneous),
        (None, None) => None,
        (None, Some(_)) => Some(ServiceWaterHeaterTankType::Storage),
    };
    let energy_source = match type_tag {
        Some("ELEC") | Some("HEAT-PUMP") => Some(EnergySource::Electricity),
        _ => fuel_meter_source(node, model),
    };
    let values = results.query(&node.unique_name, &[DWH_CAPACITY]);
    ComputedAttrs::DwHeater(DwHeaterAttrs {
        hot_water_loop: coerce::try_str(r, "DHW-LOOP").map(str::to_string),
        tank_type,
        tank_storage_capacity: tank_volume.map(coerce::gal_to_l),
        energy_source,
        setpoint_temperature: coerce::try_f64(r, "AQUASTAT-SETPT-T")
            .map(coerce::fahrenheit_to_celsius),
        rated_capacity: values
            .get(&DWH_CAPACITY.code)
            .copied()
            .flatten()
            .map(coerce::kbtuh_to_watts)
            .or_else(|| coerce::try_f64(r, "CAPACITY").map(coerce::kbtuh_to_watts)),
    })
}

// ============================================================================
// Assembly
// ============================================================================

pub fn assemble_pump(node: &Node) -> doc::Pump {
    let attrs = match &node.computed {
        ComputedAttrs::Pump(a) => a.clone(),
        _ => PumpAttrs::default(),
    };
    doc::Pump {
        id: node.unique_name.clone(),
        loop_or_piping: attrs.loop_or_piping,
        speed_control: attrs.speed_control,
        design_flow: attrs.design_flow,
        design_head: attrs.design_head,
        design_electric_power: attrs.design_electric_power,
        power_per_flow_rate: attrs.power_per_flow_rate,
    }
}

pub fn assemble_fluid_loop(node: &Node) -> doc::FluidLoop {
    let attrs = match &node.computed {
        ComputedAttrs::FluidLoop(a) => a.clone(),
        _ => FluidLoopAttrs::default(),
    };
    doc::FluidLoop {
        id: node.unique_name.clone(),
        loop_type: attrs.loop_type,
        operation: attrs.operation,
        design_supply_temperature: attrs.design_supply_temperature,
        design_return_temperature: attrs.design_return_temperature,
        design_flow: attrs.design_flow,
    }
}

pub fn assemble_boiler(node: &Node) -> doc::Boiler {
    let attrs = match &node.computed {
        ComputedAttrs::Boiler(a) => a.clone(),
        _ => BoilerAttrs::default(),
    };
    doc::Boiler {
        id: node.unique_name.clone(),
        loop_: attrs.loop_,
        draft_type: attrs.draft_type,
        energy_source_type: attrs.energy_source,
        design_capacity: attrs.design_capacity,
        rated_capacity: attrs.rated_capacity,
        efficiency: attrs.efficiency,
        auxiliary_power: attrs.auxiliary_power,
    }
}

pub fn assemble_chiller(node: &Node) -> doc::Chiller {
    let attrs = match &node.computed {
        ComputedAttrs::Chiller(a) => a.clone(),
        _ => ChillerAttrs::default(),
    };
    doc::Chiller {
        id: node.unique_name.clone(),
        cooling_loop: attrs.cooling_loop,
        condensing_loop: attrs.condensing_loop,
        compressor_type: attrs.compressor_type,
        design_capacity: attrs.design_capacity,
        rated_capacity: attrs.rated_capacity,
        design_leaving_evaporator_temperature: attrs.design_leaving_evaporator_temperature,
        design_entering_condenser_temperature: attrs.design_entering_condenser_temperature,
        full_load_efficiency: attrs.full_load_efficiency,
    }
}

pub fn assemble_heat_rejection(node: &Node) -> doc::HeatRejection {
    let attrs = match &node.computed {
        ComputedAttrs::HeatRejection(a) => a.clone(),
        _ => HeatRejectionAttrs::default(),
    };
    doc::HeatRejection {
        id: node.unique_name.clone(),
        loop_: attrs.loop_,
        heat_rejection_type: attrs.heat_rejection_type,
        fan_speed_control: attrs.fan_speed_control,
        design_wetbulb_temperature: attrs.design_wetbulb_temperature,
        range: attrs.range,
        approach: attrs.approach,
        fan_motor_nameplate_power: attrs.fan_motor_nameplate_power,
    }
}

pub fn assemble_dw_heater(node: &Node) -> doc::ServiceWaterHeatingEquipment {
    let attrs = match &node.computed {
        ComputedAttrs::DwHeater(a) => a.clone(),
        _ => DwHeaterAttrs::default(),
    };
    doc::ServiceWaterHeatingEquipment {
        id: node.unique_name.clone(),
        hot_water_loop: attrs.hot_water_loop,
        tank_type: attrs.tank_type,
        tank_storage_capacity: attrs.tank_storage_capacity,
        energy_source_type: attrs.energy_source,
        setpoint_temperature: attrs.setpoint_temperature,
        rated_capacity: attrs.rated_capacity,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::build_graph;
    use crate::populate::{run_phase1, run_phase2};
    use crate::results::{EmptyResultService, JsonResultService};
    use approx::assert_relative_eq;
    use rpdgen_bdl::{JsonRecordSource, Record};

    fn plant_source() -> JsonRecordSource {
        JsonRecordSource::from_records([
            (
                CommandKind::FuelMeter,
                vec![Record::new("FM").with_str("TYPE", "NATURAL-GAS")],
            ),
            (
                CommandKind::MasterMeters,
                vec![Record::new("MM").with_str("HEAT-FUEL-METER", "FM")],
            ),
            (
                CommandKind::Pump,
                vec![
                    Record::new("HW Pump")
                        .with_str("CAP-CTRL", "VAR-SPEED-PUMP")
                        .with_num("FLOW", 100.0)
                        .with_num("HEAD", 60.0),
                    Record::new("CHW Pump").with_str("CAP-CTRL", "ONE-SPEED-PUMP"),
                ],
            ),
            (
                CommandKind::CirculationLoop,
                vec![
                    Record::new("HW Loop")
                        .with_str("TYPE", "HW")
                        .with_str("LOOP-PUMP", "HW Pump")
                        .with_num("DESIGN-HEAT-T", 180.0)
                        .with_num("LOOP-DESIGN-DT", 40.0),
                    Record::new("CHW Loop")
                        .with_str("TYPE", "CHW")
                        .with_str("LOOP-PUMP", "CHW Pump")
                        .with_num("DESIGN-COOL-T", 44.0)
                        .with_num("LOOP-DESIGN-DT", 12.0),
                ],
            ),
            (
                CommandKind::Boiler,
                vec![Record::new("B1")
                    .with_str("TYPE", "HW-BOILER")
                    .with_str("HW-LOOP", "HW Loop")
                    .with_num("CAPACITY", 500.0)
                    .with_num("HEAT-INPUT-RATIO", 1.25)],
            ),
        ])
    }

    #[test]
    fn loop_wires_its_pump() {
        let mut results = JsonResultService::default();
        results.insert("HW Pump", PUMP_FLOW.code, 100.0);
        results.insert("HW Pump", PUMP_KW.code, 2.0);

        let mut model = build_graph(&plant_source()).unwrap();
        run_phase1(&mut model, &results).unwrap();
        run_phase2(&mut model).unwrap();

        let pump = model
            .collections
            .pumps
            .iter()
            .find(|p| p.id == "HW Pump")
            .expect("pump");
        assert_eq!(pump.loop_or_piping.as_deref(), Some("HW Loop"));
        assert_eq!(pump.speed_control, Some(PumpSpeedControl::VariableSpeed));
        let expected = 2_000.0 / coerce::gpm_to_l_per_s(100.0);
        assert_relative_eq!(pump.power_per_flow_rate.unwrap(), expected);
        // The simulated flow overrides the raw keyword.
        assert_relative_eq!(pump.design_flow.unwrap(), coerce::gpm_to_l_per_s(100.0));
    }

    #[test]
    fn loop_temperatures_derive_from_delta() {
        let mut model = build_graph(&plant_source()).unwrap();
        run_phase1(&mut model, &EmptyResultService).unwrap();
        run_phase2(&mut model).unwrap();

        let hw = model
            .collections
            .fluid_loops
            .iter()
            .find(|l| l.id == "HW Loop")
            .expect("hw loop");
        assert_eq!(hw.loop_type, Some(FluidLoopType::HeatingWater));
        let supply = coerce::fahrenheit_to_celsius(180.0);
        assert_relative_eq!(hw.design_supply_temperature.unwrap(), supply);
        assert_relative_eq!(
            hw.design_return_temperature.unwrap(),
            supply - coerce::delta_f_to_c(40.0)
        );

        let chw = model
            .collections
            .fluid_loops
            .iter()
            .find(|l| l.id == "CHW Loop")
            .expect("chw loop");
        let supply = coerce::fahrenheit_to_celsius(44.0);
        assert_relative_eq!(
            chw.design_return_temperature.unwrap(),
            supply + coerce::delta_f_to_c(12.0)
        );
    }

    #[test]
    fn boiler_defaults_to_the_master_heat_fuel_meter() {
        let mut model = build_graph(&plant_source()).unwrap();
        run_phase1(&mut model, &EmptyResultService).unwrap();
        run_phase2(&mut model).unwrap();

        let boiler = &model.collections.boilers[0];
        assert_eq!(boiler.energy_source_type, Some(EnergySource::NaturalGas));
        assert_eq!(boiler.draft_type, Some(BoilerDraftType::Natural));
        assert_eq!(boiler.loop_.as_deref(), Some("HW Loop"));
        assert_relative_eq!(boiler.rated_capacity.unwrap(), coerce::kbtuh_to_watts(500.0));
        assert_relative_eq!(boiler.efficiency.unwrap(), 0.8);
    }

    #[test]
    fn electric_boiler_ignores_fuel_meters() {
        let source = JsonRecordSource::from_records([(
            CommandKind::Boiler,
            vec![Record::new("EB").with_str("TYPE", "ELEC-HW-BOILER")],
        )]);
        let mut model = build_graph(&source).unwrap();
        run_phase1(&mut model, &EmptyResultService).unwrap();
        run_phase2(&mut model).unwrap();
        let boiler = &model.collections.boilers[0];
        assert_eq!(boiler.energy_source_type, Some(EnergySource::Electricity));
        assert!(boiler.draft_type.is_none());
    }

    #[test]
    fn dw_heater_tank_classification() {
        let source = JsonRecordSource::from_records([
            (
                CommandKind::FuelMeter,
                vec![Record::new("FM").with_str("TYPE", "PROPANE")],
            ),
            (
                CommandKind::DwHeater,
                vec![
                    Record::new("Tank")
                        .with_str("TYPE", "GAS")
                        .with_str("FUEL-METER", "FM")
                        .with_num("TANK-VOLUME", 80.0)
                        .with_num("AQUASTAT-SETPT-T", 140.0),
                    Record::new("Tankless").with_str("TYPE", "ELEC"),
                ],
            ),
        ]);
        let mut model = build_graph(&source).unwrap();
        run_phase1(&mut model, &EmptyResultService).unwrap();
        run_phase2(&mut model).unwrap();

        let swh = &model.collections.service_water_heating_equipment;
        let tank = swh.iter().find(|s| s.id == "Tank").expect("tank");
        assert_eq!(tank.tank_type, Some(ServiceWaterHeaterTankType::Storage));
        assert_eq!(tank.energy_source_type, Some(EnergySource::Propane));
        assert_relative_eq!(tank.tank_storage_capacity.unwrap(), coerce::gal_to_l(80.0));
        let tankless = swh.iter().find(|s| s.id == "Tankless").expect("tankless");
        assert_eq!(
            tankless.tank_type,
            Some(ServiceWaterHeaterTankType::Instantaneous)
        );
        assert_eq!(
            tankless.energy_source_type,
            Some(EnergySource::Electricity)
        );
    }
}
