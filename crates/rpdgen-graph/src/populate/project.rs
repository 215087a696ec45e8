//! Project-level rules: run period, holidays, meters, and the simulation
//! output block.

use rpdgen_bdl::{coerce, CommandKind};
use rpdgen_schema::doc::{self, EndUse, EnergySource};
use tracing::warn;

use crate::model::ModelRoot;
use crate::node::Node;
use crate::populate::attrs::{
    ComputedAttrs, HolidaysAttrs, MasterMetersAttrs, MeterAttrs, RunPeriodAttrs,
};
use crate::results::{
    ResultService, ANNUAL_COOLING_ENERGY, ANNUAL_EQUIPMENT_ENERGY, ANNUAL_FAN_ENERGY,
    ANNUAL_HEATING_ENERGY, ANNUAL_LIGHTING_ENERGY, ANNUAL_PUMP_ENERGY, ANNUAL_SITE_ENERGY,
    ANNUAL_SWH_ENERGY,
};

/// End-use metric codes and their report tags, in output order.
const END_USE_METRICS: &[(EndUse, i64)] = &[
    (EndUse::InteriorLighting, ANNUAL_LIGHTING_ENERGY.code),
    (EndUse::MiscellaneousEquipment, ANNUAL_EQUIPMENT_ENERGY.code),
    (EndUse::SpaceHeating, ANNUAL_HEATING_ENERGY.code),
    (EndUse::SpaceCooling, ANNUAL_COOLING_ENERGY.code),
    (EndUse::Fans, ANNUAL_FAN_ENERGY.code),
    (EndUse::Pumps, ANNUAL_PUMP_ENERGY.code),
    (EndUse::ServiceWaterHeating, ANNUAL_SWH_ENERGY.code),
];

pub fn compute_run_period(node: &Node, results: &dyn ResultService) -> ComputedAttrs {
    let values = results.query(
        &node.unique_name,
        &[
            ANNUAL_SITE_ENERGY,
            ANNUAL_LIGHTING_ENERGY,
            ANNUAL_EQUIPMENT_ENERGY,
            ANNUAL_HEATING_ENERGY,
            ANNUAL_COOLING_ENERGY,
            ANNUAL_FAN_ENERGY,
            ANNUAL_PUMP_ENERGY,
            ANNUAL_SWH_ENERGY,
        ],
    );
    let end_use_energy = END_USE_METRICS
        .iter()
        .filter_map(|(end_use, code)| {
            values.get(code).copied().flatten().map(|v| (*end_use, v))
        })
        .collect();
    ComputedAttrs::RunPeriod(RunPeriodAttrs {
        year: coerce::try_i64(&node.record, "BEGIN-YEAR"),
        total_site_energy: values.get(&ANNUAL_SITE_ENERGY.code).copied().flatten(),
        end_use_energy,
    })
}

pub fn compute_holidays(node: &Node) -> ComputedAttrs {
    let days = coerce::try_f64_list(&node.record, "DAYS")
        .into_iter()
        .map(|d| d as i64)
        .collect();
    ComputedAttrs::Holidays(HolidaysAttrs { days })
}

/// Fuel-meter TYPE keyword → energy source. Absent TYPE means natural gas,
/// the engine default. Shared with the plant rules, which chase meter
/// references to type their equipment.
pub(super) fn fuel_tag_source(tag: Option<&str>) -> EnergySource {
    match tag {
        None | Some("NATURAL-GAS") => EnergySource::NaturalGas,
        Some("LPG") | Some("PROPANE") => EnergySource::Propane,
        Some("FUEL-OIL") | Some("DIESEL-OIL") => EnergySource::FuelOil,
        Some("STEAM") => EnergySource::Steam,
        Some(other) => {
            warn!(fuel = other, "unrecognized fuel type");
            EnergySource::Other
        }
    }
}

/// Electric meters are always electricity; fuel meters map their TYPE.
pub fn compute_meter(node: &Node) -> ComputedAttrs {
    let energy_source = match node.kind {
        CommandKind::ElectricMeter => Some(EnergySource::Electricity),
        _ => Some(fuel_tag_source(coerce::try_str(&node.record, "TYPE"))),
    };
    ComputedAttrs::Meter(MeterAttrs { energy_source })
}

pub fn compute_master_meters(node: &Node, model: &ModelRoot) -> ComputedAttrs {
    let heat_fuel_meter = coerce::try_str(&node.record, "HEAT-FUEL-METER")
        .filter(|name| match model.registry.resolve(name) {
            Some(meter) if meter.kind == CommandKind::FuelMeter => true,
            _ => {
                warn!(meter = name, "HEAT-FUEL-METER does not resolve to a fuel meter");
                false
            }
        })
        .map(str::to_string);
    ComputedAttrs::MasterMeters(MasterMetersAttrs { heat_fuel_meter })
}

/// The output block exists only when the model was simulated: no annual
/// results at all means no output block, not an empty one.
pub fn assemble_output(node: &Node) -> Option<doc::Output> {
    let ComputedAttrs::RunPeriod(attrs) = &node.computed else {
        return None;
    };
    if attrs.total_site_energy.is_none() && attrs.end_use_energy.is_empty() {
        return None;
    }
    let annual_end_use_results = attrs
        .end_use_energy
        .iter()
        .enumerate()
        .map(|(i, (end_use, value))| doc::EndUseResult {
            id: format!("{} EndUse {}", node.unique_name, i + 1),
            end_use: Some(*end_use),
            annual_site_energy_use: Some(*value),
        })
        .collect();
    Some(doc::Output {
        id: format!("{} Output", node.unique_name),
        total_site_energy: attrs.total_site_energy,
        annual_end_use_results,
    })
}
