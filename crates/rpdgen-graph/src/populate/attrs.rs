//! Computed attributes: the typed output of Phase 1, per node kind.
//!
//! Every field that can fail to derive is an `Option` (or an empty `Vec`);
//! Phase 2 turns absence into omitted output fields. Repeated-keyword groups
//! (space lighting, miscellaneous equipment) are explicit vectors populated
//! by index — there is no name-prefix introspection anywhere.

use rpdgen_schema::doc::{
    BoilerDraftType, ChillerCompressorType, CoolingSystemType, EnergySource, FanSpeedControl,
    FanSystemControl, FluidLoopOperation, FluidLoopType, HeatRejectionType, HeatingSystemType,
    PumpSpeedControl, ScheduleType, ServiceWaterHeaterTankType, SubsurfaceClassification,
    SurfaceAdjacency, SurfaceClassification, TerminalType,
};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunPeriodAttrs {
    pub year: Option<i64>,
    pub total_site_energy: Option<f64>,
    /// `(end-use tag, annual site energy)` pairs, in fixed end-use order.
    pub end_use_energy: Vec<(rpdgen_schema::doc::EndUse, f64)>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HolidaysAttrs {
    pub days: Vec<i64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeterAttrs {
    pub energy_source: Option<EnergySource>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MasterMetersAttrs {
    /// Default fuel meter for heat-producing equipment without an explicit
    /// meter reference.
    pub heat_fuel_meter: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MaterialAttrs {
    pub thickness: Option<f64>,
    pub thermal_conductivity: Option<f64>,
    pub density: Option<f64>,
    pub specific_heat: Option<f64>,
    pub r_value: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayersAttrs {
    /// Material names, outside-in, unresolved entries dropped.
    pub materials: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConstructionAttrs {
    pub u_factor: Option<f64>,
    pub materials: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GlassTypeAttrs {
    pub u_factor: Option<f64>,
    pub solar_heat_gain_coefficient: Option<f64>,
    pub visible_transmittance: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DayScheduleAttrs {
    pub schedule_type: Option<ScheduleType>,
    pub hourly: Vec<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeekScheduleAttrs {
    pub schedule_type: Option<ScheduleType>,
    pub day_schedules: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnnualScheduleAttrs {
    pub schedule_type: Option<ScheduleType>,
    /// 8760 values when the calendar and every referenced day schedule
    /// resolved; empty otherwise.
    pub hourly_values: Vec<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FloorAttrs {
    pub azimuth: Option<f64>,
    pub floor_height: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LightingGroup {
    pub power_per_area: Option<f64>,
    pub schedule: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MiscEquipmentGroup {
    pub power: Option<f64>,
    pub schedule: Option<String>,
    pub energy_type: Option<EnergySource>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpaceAttrs {
    pub floor_area: Option<f64>,
    pub volume: Option<f64>,
    pub number_of_occupants: Option<f64>,
    pub occupant_schedule: Option<String>,
    pub lighting: Vec<LightingGroup>,
    pub misc_equipment: Vec<MiscEquipmentGroup>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SurfaceAttrs {
    pub classification: Option<SurfaceClassification>,
    pub area: Option<f64>,
    pub azimuth: Option<f64>,
    pub tilt: Option<f64>,
    pub adjacent_to: Option<SurfaceAdjacency>,
    /// Output zone id of the space behind an interior surface.
    pub adjacent_zone: Option<String>,
    pub construction: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubsurfaceAttrs {
    pub classification: Option<SubsurfaceClassification>,
    pub glazed_area: Option<f64>,
    pub opaque_area: Option<f64>,
    pub u_factor: Option<f64>,
    pub solar_heat_gain_coefficient: Option<f64>,
    pub visible_transmittance: Option<f64>,
    pub has_shading_overhang: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PumpAttrs {
    /// Wired by the loop/equipment side-write sub-pass.
    pub loop_or_piping: Option<String>,
    pub speed_control: Option<PumpSpeedControl>,
    pub design_flow: Option<f64>,
    pub design_head: Option<f64>,
    pub design_electric_power: Option<f64>,
    /// Wired by the loop side-write sub-pass.
    pub power_per_flow_rate: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FluidLoopAttrs {
    pub loop_type: Option<FluidLoopType>,
    pub operation: Option<FluidLoopOperation>,
    pub design_supply_temperature: Option<f64>,
    pub design_return_temperature: Option<f64>,
    pub design_flow: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoilerAttrs {
    pub loop_: Option<String>,
    pub draft_type: Option<BoilerDraftType>,
    pub energy_source: Option<EnergySource>,
    pub design_capacity: Option<f64>,
    pub rated_capacity: Option<f64>,
    pub efficiency: Option<f64>,
    pub auxiliary_power: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChillerAttrs {
    pub cooling_loop: Option<String>,
    pub condensing_loop: Option<String>,
    pub compressor_type: Option<ChillerCompressorType>,
    pub design_capacity: Option<f64>,
    pub rated_capacity: Option<f64>,
    pub design_leaving_evaporator_temperature: Option<f64>,
    pub design_entering_condenser_temperature: Option<f64>,
    pub full_load_efficiency: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeatRejectionAttrs {
    pub loop_: Option<String>,
    pub heat_rejection_type: Option<HeatRejectionType>,
    pub fan_speed_control: Option<FanSpeedControl>,
    pub design_wetbulb_temperature: Option<f64>,
    pub range: Option<f64>,
    pub approach: Option<f64>,
    pub fan_motor_nameplate_power: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DwHeaterAttrs {
    pub hot_water_loop: Option<String>,
    pub tank_type: Option<ServiceWaterHeaterTankType>,
    pub tank_storage_capacity: Option<f64>,
    pub energy_source: Option<EnergySource>,
    pub setpoint_temperature: Option<f64>,
    pub rated_capacity: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SystemAttrs {
    pub cooling_type: Option<CoolingSystemType>,
    pub cooling_capacity: Option<f64>,
    pub chilled_water_loop: Option<String>,
    pub heating_type: Option<HeatingSystemType>,
    pub heating_capacity: Option<f64>,
    pub heating_source: Option<EnergySource>,
    pub hot_water_loop: Option<String>,
    pub fan_control: Option<FanSystemControl>,
    pub fan_schedule: Option<String>,
    pub supply_airflow: Option<f64>,
    pub supply_fan_power: Option<f64>,
    pub minimum_outdoor_airflow: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ZoneAttrs {
    pub space: Option<String>,
    /// Owning system's unique name, the terminal's serving-system reference.
    pub system: Option<String>,
    pub terminal_type: Option<TerminalType>,
    pub primary_airflow: Option<f64>,
    pub heating_capacity: Option<f64>,
    pub heating_source: Option<EnergySource>,
    pub design_heating_setpoint: Option<f64>,
    pub design_cooling_setpoint: Option<f64>,
    pub heating_schedule: Option<String>,
    pub cooling_schedule: Option<String>,
    pub exhaust_airflow: Option<f64>,
    pub exhaust_fan_power: Option<f64>,
}

/// Tagged computed state, one variant per node kind. `Pending` is the
/// pre-Phase-1 placeholder; the phase driver guarantees no assembly step
/// ever observes it.
#[derive(Debug, Clone, PartialEq)]
pub enum ComputedAttrs {
    Pending,
    RunPeriod(RunPeriodAttrs),
    Holidays(HolidaysAttrs),
    Meter(MeterAttrs),
    MasterMeters(MasterMetersAttrs),
    Material(MaterialAttrs),
    Layers(LayersAttrs),
    Construction(ConstructionAttrs),
    GlassType(GlassTypeAttrs),
    DaySchedule(DayScheduleAttrs),
    WeekSchedule(WeekScheduleAttrs),
    AnnualSchedule(AnnualScheduleAttrs),
    Floor(FloorAttrs),
    Space(SpaceAttrs),
    Surface(SurfaceAttrs),
    Subsurface(SubsurfaceAttrs),
    Pump(PumpAttrs),
    FluidLoop(FluidLoopAttrs),
    Boiler(BoilerAttrs),
    Chiller(ChillerAttrs),
    HeatRejection(HeatRejectionAttrs),
    DwHeater(DwHeaterAttrs),
    System(SystemAttrs),
    Zone(ZoneAttrs),
}

impl ComputedAttrs {
    pub fn as_material(&self) -> Option<&MaterialAttrs> {
        match self {
            ComputedAttrs::Material(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_glass_type(&self) -> Option<&GlassTypeAttrs> {
        match self {
            ComputedAttrs::GlassType(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_construction(&self) -> Option<&ConstructionAttrs> {
        match self {
            ComputedAttrs::Construction(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_zone(&self) -> Option<&ZoneAttrs> {
        match self {
            ComputedAttrs::Zone(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_pump_mut(&mut self) -> Option<&mut PumpAttrs> {
        match self {
            ComputedAttrs::Pump(a) => Some(a),
            _ => None,
        }
    }
}
