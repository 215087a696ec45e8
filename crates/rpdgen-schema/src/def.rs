//! Table-driven formal schema definition.
//!
//! The validator's schema pass is generic: it walks a JSON document guided by
//! these tables and knows nothing about the domain. Keeping the schema as
//! data (rather than hand-written per-type checks) means the doc structs in
//! [`crate::doc`] and the validation rules cannot drift apart silently — the
//! in-module tests assemble documents through the typed structs and run them
//! through the tables.

/// Field type in the formal schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Str,
    Num,
    Bool,
    /// Closed enum; the slice is the full legal tag set.
    EnumOf(&'static [&'static str]),
    NumArray,
    /// Single nested object of the named object spec.
    Object(&'static str),
    /// Array of nested objects of the named object spec.
    ObjectArray(&'static str),
}

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub ty: FieldType,
    pub required: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct ObjectSpec {
    pub name: &'static str,
    pub fields: &'static [FieldSpec],
}

#[derive(Debug, Clone, Copy)]
pub struct SchemaDef {
    pub root: &'static str,
    pub objects: &'static [ObjectSpec],
}

impl SchemaDef {
    pub fn object(&self, name: &str) -> Option<&'static ObjectSpec> {
        self.objects.iter().find(|o| o.name == name)
    }
}

const fn req(name: &'static str, ty: FieldType) -> FieldSpec {
    FieldSpec {
        name,
        ty,
        required: true,
    }
}

const fn opt(name: &'static str, ty: FieldType) -> FieldSpec {
    FieldSpec {
        name,
        ty,
        required: false,
    }
}

// Enum tag sets; keep in sync with the serde renames in `doc`.
const ENERGY_SOURCE: &[&str] = &[
    "ELECTRICITY",
    "NATURAL_GAS",
    "PROPANE",
    "FUEL_OIL",
    "STEAM",
    "OTHER",
];
const SCHEDULE_TYPE: &[&str] = &["FRACTION", "MULTIPLIER", "ON_OFF", "TEMPERATURE", "OTHER"];
const SURFACE_CLASSIFICATION: &[&str] = &["WALL", "FLOOR", "CEILING"];
const SURFACE_ADJACENCY: &[&str] = &["EXTERIOR", "INTERIOR", "GROUND"];
const SUBSURFACE_CLASSIFICATION: &[&str] = &["WINDOW", "DOOR", "SKYLIGHT"];
const FLUID_LOOP_TYPE: &[&str] = &[
    "HEATING_WATER",
    "CHILLED_WATER",
    "CONDENSER_WATER",
    "SERVICE_WATER_HEATING",
    "OTHER",
];
const FLUID_LOOP_OPERATION: &[&str] = &["CONTINUOUS", "INTERMITTENT", "SCHEDULED_OFF", "OTHER"];
const PUMP_SPEED_CONTROL: &[&str] = &["FIXED_SPEED", "TWO_SPEED", "VARIABLE_SPEED", "OTHER"];
const BOILER_DRAFT_TYPE: &[&str] = &["NATURAL", "FORCED", "INDUCED", "CONDENSING", "OTHER"];
const CHILLER_COMPRESSOR_TYPE: &[&str] = &[
    "CENTRIFUGAL",
    "SCREW",
    "RECIPROCATING",
    "SCROLL",
    "SINGLE_EFFECT_ABSORPTION",
    "DOUBLE_EFFECT_ABSORPTION",
    "OTHER",
];
const HEAT_REJECTION_TYPE: &[&str] = &[
    "OPEN_CIRCUIT_COOLING_TOWER",
    "CLOSED_CIRCUIT_COOLING_TOWER",
    "DRY_COOLER",
    "OTHER",
];
const FAN_SPEED_CONTROL: &[&str] = &["FIXED_SPEED", "TWO_SPEED", "VARIABLE_SPEED", "OTHER"];
const FAN_SYSTEM_CONTROL: &[&str] = &[
    "CONSTANT_VOLUME",
    "VARIABLE_AIR_VOLUME",
    "MULTI_ZONE_VARIABLE_AIR_VOLUME",
    "OTHER",
];
const COOLING_SYSTEM_TYPE: &[&str] = &[
    "DIRECT_EXPANSION",
    "FLUID_LOOP",
    "NON_MECHANICAL",
    "NONE",
    "OTHER",
];
const HEATING_SYSTEM_TYPE: &[&str] = &[
    "FURNACE",
    "HEAT_PUMP",
    "FLUID_LOOP",
    "ELECTRIC",
    "NONE",
    "OTHER",
];
const TERMINAL_TYPE: &[&str] = &[
    "CONSTANT_AIR_VOLUME",
    "VARIABLE_AIR_VOLUME",
    "BASEBOARD",
    "OTHER",
];
const SWH_TANK_TYPE: &[&str] = &[
    "STORAGE",
    "INSTANTANEOUS",
    "HEAT_PUMP_PACKAGED_STORAGE",
    "OTHER",
];
const END_USE: &[&str] = &[
    "INTERIOR_LIGHTING",
    "MISCELLANEOUS_EQUIPMENT",
    "SPACE_HEATING",
    "SPACE_COOLING",
    "FANS",
    "PUMPS",
    "HEAT_REJECTION",
    "SERVICE_WATER_HEATING",
    "OTHER",
];

const OBJECTS: &[ObjectSpec] = &[
    ObjectSpec {
        name: "RulesetProjectDescription",
        fields: &[
            req("id", FieldType::Str),
            opt(
                "ruleset_model_descriptions",
                FieldType::ObjectArray("RulesetModelDescription"),
            ),
        ],
    },
    ObjectSpec {
        name: "RulesetModelDescription",
        fields: &[
            req("id", FieldType::Str),
            opt("buildings", FieldType::ObjectArray("Building")),
            opt("schedules", FieldType::ObjectArray("Schedule")),
            opt("fluid_loops", FieldType::ObjectArray("FluidLoop")),
            opt("pumps", FieldType::ObjectArray("Pump")),
            opt("boilers", FieldType::ObjectArray("Boiler")),
            opt("chillers", FieldType::ObjectArray("Chiller")),
            opt("heat_rejections", FieldType::ObjectArray("HeatRejection")),
            opt(
                "service_water_heating_equipment",
                FieldType::ObjectArray("ServiceWaterHeatingEquipment"),
            ),
            opt("output", FieldType::Object("Output")),
        ],
    },
    ObjectSpec {
        name: "Building",
        fields: &[
            req("id", FieldType::Str),
            opt(
                "building_segments",
                FieldType::ObjectArray("BuildingSegment"),
            ),
        ],
    },
    ObjectSpec {
        name: "BuildingSegment",
        fields: &[
            req("id", FieldType::Str),
            opt("zones", FieldType::ObjectArray("Zone")),
            opt(
                "heating_ventilating_air_conditioning_systems",
                FieldType::ObjectArray("HvacSystem"),
            ),
        ],
    },
    ObjectSpec {
        name: "Zone",
        fields: &[
            req("id", FieldType::Str),
            opt("volume", FieldType::Num),
            opt("design_thermostat_heating_setpoint", FieldType::Num),
            opt("design_thermostat_cooling_setpoint", FieldType::Num),
            opt("thermostat_heating_setpoint_schedule", FieldType::Str),
            opt("thermostat_cooling_setpoint_schedule", FieldType::Str),
            opt("exhaust_airflow_rate", FieldType::Num),
            opt("zonal_exhaust_fan", FieldType::Object("Fan")),
            opt("spaces", FieldType::ObjectArray("Space")),
            opt("surfaces", FieldType::ObjectArray("Surface")),
            opt("terminals", FieldType::ObjectArray("Terminal")),
        ],
    },
    ObjectSpec {
        name: "Space",
        fields: &[
            req("id", FieldType::Str),
            opt("floor_area", FieldType::Num),
            opt("number_of_occupants", FieldType::Num),
            opt("occupant_multiplier_schedule", FieldType::Str),
            opt(
                "interior_lighting",
                FieldType::ObjectArray("InteriorLighting"),
            ),
            opt(
                "miscellaneous_equipment",
                FieldType::ObjectArray("MiscellaneousEquipment"),
            ),
        ],
    },
    ObjectSpec {
        name: "InteriorLighting",
        fields: &[
            req("id", FieldType::Str),
            opt("power_per_area", FieldType::Num),
            opt("lighting_multiplier_schedule", FieldType::Str),
        ],
    },
    ObjectSpec {
        name: "MiscellaneousEquipment",
        fields: &[
            req("id", FieldType::Str),
            opt("power", FieldType::Num),
            opt("multiplier_schedule", FieldType::Str),
            opt("energy_type", FieldType::EnumOf(ENERGY_SOURCE)),
        ],
    },
    ObjectSpec {
        name: "Surface",
        fields: &[
            req("id", FieldType::Str),
            opt("classification", FieldType::EnumOf(SURFACE_CLASSIFICATION)),
            opt("area", FieldType::Num),
            opt("azimuth", FieldType::Num),
            opt("tilt", FieldType::Num),
            opt("adjacent_to", FieldType::EnumOf(SURFACE_ADJACENCY)),
            opt("adjacent_zone", FieldType::Str),
            opt("construction", FieldType::Object("Construction")),
            opt("subsurfaces", FieldType::ObjectArray("Subsurface")),
        ],
    },
    ObjectSpec {
        name: "Construction",
        fields: &[
            req("id", FieldType::Str),
            opt("u_factor", FieldType::Num),
            opt("primary_layers", FieldType::ObjectArray("Material")),
        ],
    },
    ObjectSpec {
        name: "Material",
        fields: &[
            req("id", FieldType::Str),
            opt("thickness", FieldType::Num),
            opt("thermal_conductivity", FieldType::Num),
            opt("density", FieldType::Num),
            opt("specific_heat", FieldType::Num),
            opt("r_value", FieldType::Num),
        ],
    },
    ObjectSpec {
        name: "Subsurface",
        fields: &[
            req("id", FieldType::Str),
            opt(
                "classification",
                FieldType::EnumOf(SUBSURFACE_CLASSIFICATION),
            ),
            opt("glazed_area", FieldType::Num),
            opt("opaque_area", FieldType::Num),
            opt("u_factor", FieldType::Num),
            opt("solar_heat_gain_coefficient", FieldType::Num),
            opt("visible_transmittance", FieldType::Num),
            opt("has_shading_overhang", FieldType::Bool),
        ],
    },
    ObjectSpec {
        name: "Schedule",
        fields: &[
            req("id", FieldType::Str),
            opt("schedule_type", FieldType::EnumOf(SCHEDULE_TYPE)),
            opt("hourly_values", FieldType::NumArray),
        ],
    },
    ObjectSpec {
        name: "HvacSystem",
        fields: &[
            req("id", FieldType::Str),
            opt("cooling_system", FieldType::Object("CoolingSystem")),
            opt("heating_system", FieldType::Object("HeatingSystem")),
            opt("fan_system", FieldType::Object("FanSystem")),
        ],
    },
    ObjectSpec {
        name: "CoolingSystem",
        fields: &[
            req("id", FieldType::Str),
            opt("cooling_system_type", FieldType::EnumOf(COOLING_SYSTEM_TYPE)),
            opt("design_total_cool_capacity", FieldType::Num),
            opt("chilled_water_loop", FieldType::Str),
        ],
    },
    ObjectSpec {
        name: "HeatingSystem",
        fields: &[
            req("id", FieldType::Str),
            opt("heating_system_type", FieldType::EnumOf(HEATING_SYSTEM_TYPE)),
            opt("design_capacity", FieldType::Num),
            opt("energy_source_type", FieldType::EnumOf(ENERGY_SOURCE)),
            opt("hot_water_loop", FieldType::Str),
        ],
    },
    ObjectSpec {
        name: "FanSystem",
        fields: &[
            req("id", FieldType::Str),
            opt("fan_control", FieldType::EnumOf(FAN_SYSTEM_CONTROL)),
            opt("operating_schedule", FieldType::Str),
            opt("minimum_outdoor_airflow", FieldType::Num),
            opt("supply_fans", FieldType::ObjectArray("Fan")),
            opt("return_fans", FieldType::ObjectArray("Fan")),
        ],
    },
    ObjectSpec {
        name: "Fan",
        fields: &[
            req("id", FieldType::Str),
            opt("design_airflow", FieldType::Num),
            opt("design_electric_power", FieldType::Num),
            opt("speed_control", FieldType::EnumOf(FAN_SPEED_CONTROL)),
        ],
    },
    ObjectSpec {
        name: "Terminal",
        fields: &[
            req("id", FieldType::Str),
            opt("terminal_type", FieldType::EnumOf(TERMINAL_TYPE)),
            opt(
                "served_by_heating_ventilating_air_conditioning_system",
                FieldType::Str,
            ),
            opt("primary_airflow", FieldType::Num),
            opt("heating_capacity", FieldType::Num),
            opt("heating_source", FieldType::EnumOf(ENERGY_SOURCE)),
        ],
    },
    ObjectSpec {
        name: "FluidLoop",
        fields: &[
            req("id", FieldType::Str),
            opt("loop_type", FieldType::EnumOf(FLUID_LOOP_TYPE)),
            opt("operation", FieldType::EnumOf(FLUID_LOOP_OPERATION)),
            opt("design_supply_temperature", FieldType::Num),
            opt("design_return_temperature", FieldType::Num),
            opt("design_flow", FieldType::Num),
        ],
    },
    ObjectSpec {
        name: "Pump",
        fields: &[
            req("id", FieldType::Str),
            opt("loop_or_piping", FieldType::Str),
            opt("speed_control", FieldType::EnumOf(PUMP_SPEED_CONTROL)),
            opt("design_flow", FieldType::Num),
            opt("design_head", FieldType::Num),
            opt("design_electric_power", FieldType::Num),
            opt("power_per_flow_rate", FieldType::Num),
        ],
    },
    ObjectSpec {
        name: "Boiler",
        fields: &[
            req("id", FieldType::Str),
            opt("loop", FieldType::Str),
            opt("draft_type", FieldType::EnumOf(BOILER_DRAFT_TYPE)),
            opt("energy_source_type", FieldType::EnumOf(ENERGY_SOURCE)),
            opt("design_capacity", FieldType::Num),
            opt("rated_capacity", FieldType::Num),
            opt("efficiency", FieldType::Num),
            opt("auxiliary_power", FieldType::Num),
        ],
    },
    ObjectSpec {
        name: "Chiller",
        fields: &[
            req("id", FieldType::Str),
            opt("cooling_loop", FieldType::Str),
            opt("condensing_loop", FieldType::Str),
            opt(
                "compressor_type",
                FieldType::EnumOf(CHILLER_COMPRESSOR_TYPE),
            ),
            opt("design_capacity", FieldType::Num),
            opt("rated_capacity", FieldType::Num),
            opt("design_leaving_evaporator_temperature", FieldType::Num),
            opt("design_entering_condenser_temperature", FieldType::Num),
            opt("full_load_efficiency", FieldType::Num),
        ],
    },
    ObjectSpec {
        name: "HeatRejection",
        fields: &[
            req("id", FieldType::Str),
            opt("loop", FieldType::Str),
            opt("heat_rejection_type", FieldType::EnumOf(HEAT_REJECTION_TYPE)),
            opt("fan_speed_control", FieldType::EnumOf(FAN_SPEED_CONTROL)),
            opt("design_wetbulb_temperature", FieldType::Num),
            opt("range", FieldType::Num),
            opt("approach", FieldType::Num),
            opt("fan_motor_nameplate_power", FieldType::Num),
        ],
    },
    ObjectSpec {
        name: "ServiceWaterHeatingEquipment",
        fields: &[
            req("id", FieldType::Str),
            opt("hot_water_loop", FieldType::Str),
            opt("tank_type", FieldType::EnumOf(SWH_TANK_TYPE)),
            opt("tank_storage_capacity", FieldType::Num),
            opt("energy_source_type", FieldType::EnumOf(ENERGY_SOURCE)),
            opt("setpoint_temperature", FieldType::Num),
            opt("rated_capacity", FieldType::Num),
        ],
    },
    ObjectSpec {
        name: "Output",
        fields: &[
            req("id", FieldType::Str),
            opt("total_site_energy", FieldType::Num),
            opt(
                "annual_end_use_results",
                FieldType::ObjectArray("EndUseResult"),
            ),
        ],
    },
    ObjectSpec {
        name: "EndUseResult",
        fields: &[
            req("id", FieldType::Str),
            opt("end_use", FieldType::EnumOf(END_USE)),
            opt("annual_site_energy_use", FieldType::Num),
        ],
    },
];

const RPD_SCHEMA: SchemaDef = SchemaDef {
    root: "RulesetProjectDescription",
    objects: OBJECTS,
};

/// The formal schema for RPD documents.
pub fn rpd_schema() -> &'static SchemaDef {
    &RPD_SCHEMA
}
