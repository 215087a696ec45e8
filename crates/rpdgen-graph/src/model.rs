//! Model root: the build-wide shared state.
//!
//! Owns the registry, the zone ↔ space name caches (zones and spaces arrive
//! in separate record streams but describe one output zone), the model
//! calendar (an explicit field threaded to the schedule rules — never a
//! global), and the top-level output collections each node's insertion step
//! appends into.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use rpdgen_schema::doc;

use crate::registry::Registry;

/// Weekly schedule slot for one calendar day: 0–6 = Monday–Sunday, 7 =
/// holiday. Matches the day-schedule list layout of week schedules.
pub const HOLIDAY_SLOT: usize = 7;

/// Simulation-year calendar. 365 days, 8760 hours; the legacy engine does
/// not simulate leap days.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Calendar {
    pub year: i32,
    /// One slot per day of year, `day_slots[0]` = January 1st.
    pub day_slots: Vec<usize>,
}

impl Calendar {
    /// Build the calendar for `year`, marking each `holiday_days` entry
    /// (1-based day of year) as a holiday slot.
    pub fn build(year: i32, holiday_days: &[i64]) -> Calendar {
        let mut day_slots = Vec::with_capacity(365);
        for doy in 1..=365u32 {
            let slot = NaiveDate::from_yo_opt(year, doy)
                .map(|d| d.weekday().num_days_from_monday() as usize)
                .unwrap_or(0);
            day_slots.push(slot);
        }
        for day in holiday_days {
            if (1..=365).contains(day) {
                day_slots[(*day - 1) as usize] = HOLIDAY_SLOT;
            }
        }
        Calendar { year, day_slots }
    }

    pub fn days(&self) -> usize {
        self.day_slots.len()
    }
}

/// Top-level collections of the output document, populated by Phase-2
/// insertion steps and read off by the schema assembler.
#[derive(Debug, Clone, Default)]
pub struct RootCollections {
    pub zones: Vec<doc::Zone>,
    pub hvac_systems: Vec<doc::HvacSystem>,
    pub schedules: Vec<doc::Schedule>,
    pub fluid_loops: Vec<doc::FluidLoop>,
    pub pumps: Vec<doc::Pump>,
    pub boilers: Vec<doc::Boiler>,
    pub chillers: Vec<doc::Chiller>,
    pub heat_rejections: Vec<doc::HeatRejection>,
    pub service_water_heating_equipment: Vec<doc::ServiceWaterHeatingEquipment>,
    pub output: Option<doc::Output>,
}

#[derive(Debug, Default)]
pub struct ModelRoot {
    pub registry: Registry,
    /// zone record name → decorated space name, wired by the builder when a
    /// zone record is constructed.
    pub space_for_zone: BTreeMap<String, String>,
    /// space name → zone record name (reverse of `space_for_zone`).
    pub zone_for_space: BTreeMap<String, String>,
    pub calendar: Option<Calendar>,
    pub collections: RootCollections,
}

impl ModelRoot {
    pub fn new() -> Self {
        ModelRoot::default()
    }

    /// The id the output zone sub-document for `space_name` carries: the
    /// decorating zone record's name when one exists, the space name
    /// otherwise.
    pub fn output_zone_id(&self, space_name: &str) -> String {
        self.zone_for_space
            .get(space_name)
            .cloned()
            .unwrap_or_else(|| space_name.to_string())
    }
}
