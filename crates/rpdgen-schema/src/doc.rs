//! Typed RPD document (ASHRAE 229-style project report).
//!
//! Struct field order is serialization order, so a built document serializes
//! byte-identically across runs. Every optional scalar uses
//! `skip_serializing_if` — the sparse-document policy is "absent, never
//! null". Owned children are nested arrays of already-assembled
//! sub-documents; reference fields (`*_loop`, `*_schedule`,
//! `served_by_...`, `adjacent_zone`) are plain id strings.

use serde::{Deserialize, Serialize};

fn is_empty<T>(v: &Vec<T>) -> bool {
    v.is_empty()
}

// ============================================================================
// Enums (closed sets; unmapped source tags surface as `Other`)
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EnergySource {
    Electricity,
    NaturalGas,
    Propane,
    FuelOil,
    Steam,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScheduleType {
    Fraction,
    Multiplier,
    OnOff,
    Temperature,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SurfaceClassification {
    Wall,
    Floor,
    Ceiling,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SurfaceAdjacency {
    Exterior,
    Interior,
    Ground,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubsurfaceClassification {
    Window,
    Door,
    Skylight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FluidLoopType {
    HeatingWater,
    ChilledWater,
    CondenserWater,
    ServiceWaterHeating,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FluidLoopOperation {
    Continuous,
    Intermittent,
    ScheduledOff,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PumpSpeedControl {
    FixedSpeed,
    TwoSpeed,
    VariableSpeed,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BoilerDraftType {
    Natural,
    Forced,
    Induced,
    Condensing,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChillerCompressorType {
    Centrifugal,
    Screw,
    Reciprocating,
    Scroll,
    SingleEffectAbsorption,
    DoubleEffectAbsorption,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HeatRejectionType {
    OpenCircuitCoolingTower,
    ClosedCircuitCoolingTower,
    DryCooler,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FanSpeedControl {
    FixedSpeed,
    TwoSpeed,
    VariableSpeed,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FanSystemControl {
    ConstantVolume,
    VariableAirVolume,
    MultiZoneVariableAirVolume,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CoolingSystemType {
    DirectExpansion,
    FluidLoop,
    NonMechanical,
    None,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HeatingSystemType {
    Furnace,
    HeatPump,
    FluidLoop,
    Electric,
    None,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TerminalType {
    ConstantAirVolume,
    VariableAirVolume,
    Baseboard,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServiceWaterHeaterTankType {
    Storage,
    Instantaneous,
    HeatPumpPackagedStorage,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EndUse {
    InteriorLighting,
    MiscellaneousEquipment,
    SpaceHeating,
    SpaceCooling,
    Fans,
    Pumps,
    HeatRejection,
    ServiceWaterHeating,
    Other,
}

// ============================================================================
// Document
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RulesetProjectDescription {
    pub id: String,
    #[serde(default, skip_serializing_if = "is_empty")]
    pub ruleset_model_descriptions: Vec<RulesetModelDescription>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RulesetModelDescription {
    pub id: String,
    #[serde(default, skip_serializing_if = "is_empty")]
    pub buildings: Vec<Building>,
    #[serde(default, skip_serializing_if = "is_empty")]
    pub schedules: Vec<Schedule>,
    #[serde(default, skip_serializing_if = "is_empty")]
    pub fluid_loops: Vec<FluidLoop>,
    #[serde(default, skip_serializing_if = "is_empty")]
    pub pumps: Vec<Pump>,
    #[serde(default, skip_serializing_if = "is_empty")]
    pub boilers: Vec<Boiler>,
    #[serde(default, skip_serializing_if = "is_empty")]
    pub chillers: Vec<Chiller>,
    #[serde(default, skip_serializing_if = "is_empty")]
    pub heat_rejections: Vec<HeatRejection>,
    #[serde(default, skip_serializing_if = "is_empty")]
    pub service_water_heating_equipment: Vec<ServiceWaterHeatingEquipment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<Output>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Building {
    pub id: String,
    #[serde(default, skip_serializing_if = "is_empty")]
    pub building_segments: Vec<BuildingSegment>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingSegment {
    pub id: String,
    #[serde(default, skip_serializing_if = "is_empty")]
    pub zones: Vec<Zone>,
    #[serde(default, skip_serializing_if = "is_empty")]
    pub heating_ventilating_air_conditioning_systems: Vec<HvacSystem>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Zone {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub design_thermostat_heating_setpoint: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub design_thermostat_cooling_setpoint: Option<f64>,
    /// Schedule reference (id), not an owned sub-document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thermostat_heating_setpoint_schedule: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thermostat_cooling_setpoint_schedule: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exhaust_airflow_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zonal_exhaust_fan: Option<Fan>,
    #[serde(default, skip_serializing_if = "is_empty")]
    pub spaces: Vec<Space>,
    #[serde(default, skip_serializing_if = "is_empty")]
    pub surfaces: Vec<Surface>,
    #[serde(default, skip_serializing_if = "is_empty")]
    pub terminals: Vec<Terminal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Space {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub floor_area: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_of_occupants: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occupant_multiplier_schedule: Option<String>,
    #[serde(default, skip_serializing_if = "is_empty")]
    pub interior_lighting: Vec<InteriorLighting>,
    #[serde(default, skip_serializing_if = "is_empty")]
    pub miscellaneous_equipment: Vec<MiscellaneousEquipment>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteriorLighting {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub power_per_area: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lighting_multiplier_schedule: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MiscellaneousEquipment {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub power: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multiplier_schedule: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub energy_type: Option<EnergySource>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Surface {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classification: Option<SurfaceClassification>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub azimuth: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tilt: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adjacent_to: Option<SurfaceAdjacency>,
    /// Zone reference (id) for interior surfaces; never inlined.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adjacent_zone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub construction: Option<Construction>,
    #[serde(default, skip_serializing_if = "is_empty")]
    pub subsurfaces: Vec<Subsurface>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Construction {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub u_factor: Option<f64>,
    #[serde(default, skip_serializing_if = "is_empty")]
    pub primary_layers: Vec<Material>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thickness: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thermal_conductivity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub density: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specific_heat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r_value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subsurface {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classification: Option<SubsurfaceClassification>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub glazed_area: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opaque_area: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub u_factor: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solar_heat_gain_coefficient: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible_transmittance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_shading_overhang: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule_type: Option<ScheduleType>,
    #[serde(default, skip_serializing_if = "is_empty")]
    pub hourly_values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HvacSystem {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cooling_system: Option<CoolingSystem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heating_system: Option<HeatingSystem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fan_system: Option<FanSystem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoolingSystem {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cooling_system_type: Option<CoolingSystemType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub design_total_cool_capacity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chilled_water_loop: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatingSystem {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heating_system_type: Option<HeatingSystemType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub design_capacity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub energy_source_type: Option<EnergySource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hot_water_loop: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FanSystem {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fan_control: Option<FanSystemControl>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operating_schedule: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_outdoor_airflow: Option<f64>,
    #[serde(default, skip_serializing_if = "is_empty")]
    pub supply_fans: Vec<Fan>,
    #[serde(default, skip_serializing_if = "is_empty")]
    pub return_fans: Vec<Fan>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fan {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub design_airflow: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub design_electric_power: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed_control: Option<FanSpeedControl>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Terminal {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terminal_type: Option<TerminalType>,
    /// HVAC system reference (id); the system sub-document lives under the
    /// building segment, never inlined here.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub served_by_heating_ventilating_air_conditioning_system: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_airflow: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heating_capacity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heating_source: Option<EnergySource>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FluidLoop {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loop_type: Option<FluidLoopType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation: Option<FluidLoopOperation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub design_supply_temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub design_return_temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub design_flow: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pump {
    pub id: String,
    /// Fluid loop reference (id).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loop_or_piping: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed_control: Option<PumpSpeedControl>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub design_flow: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub design_head: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub design_electric_power: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub power_per_flow_rate: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Boiler {
    pub id: String,
    /// Fluid loop reference (id). `loop` is a Rust keyword, hence the rename.
    #[serde(rename = "loop", default, skip_serializing_if = "Option::is_none")]
    pub loop_: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub draft_type: Option<BoilerDraftType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub energy_source_type: Option<EnergySource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub design_capacity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rated_capacity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub efficiency: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auxiliary_power: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chiller {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cooling_loop: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condensing_loop: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compressor_type: Option<ChillerCompressorType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub design_capacity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rated_capacity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub design_leaving_evaporator_temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub design_entering_condenser_temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_load_efficiency: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatRejection {
    pub id: String,
    #[serde(rename = "loop", default, skip_serializing_if = "Option::is_none")]
    pub loop_: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heat_rejection_type: Option<HeatRejectionType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fan_speed_control: Option<FanSpeedControl>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub design_wetbulb_temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approach: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fan_motor_nameplate_power: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceWaterHeatingEquipment {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hot_water_loop: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tank_type: Option<ServiceWaterHeaterTankType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tank_storage_capacity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub energy_source_type: Option<EnergySource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub setpoint_temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rated_capacity: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Output {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_site_energy: Option<f64>,
    #[serde(default, skip_serializing_if = "is_empty")]
    pub annual_end_use_results: Vec<EndUseResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndUseResult {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_use: Option<EndUse>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annual_site_energy_use: Option<f64>,
}
