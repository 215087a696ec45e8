//! The closed command-kind vocabulary and the build order.
//!
//! The builder constructs nodes kind-by-kind in `BUILD_ORDER`, so that any
//! node a later node resolves by name during Phase 1 already exists in the
//! registry. The order is hand-curated from the domain's reference topology
//! (materials before layers before constructions before walls; pumps before
//! the loops that wire them; parents before their declared children), but it
//! is *verified*, not trusted: each kind declares the kinds its population
//! rules may reference, and [`verify_build_order`] rejects any ordering where
//! a kind references a later kind.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One BDL command kind. The tag strings are the source vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CommandKind {
    RunPeriod,
    Holidays,
    FuelMeter,
    ElectricMeter,
    MasterMeters,
    Material,
    Layers,
    Construction,
    GlassType,
    DaySchedulePd,
    WeekSchedulePd,
    SchedulePd,
    Floor,
    Space,
    ExteriorWall,
    InteriorWall,
    UndergroundWall,
    Window,
    Door,
    Pump,
    CirculationLoop,
    Boiler,
    Chiller,
    HeatRejection,
    DwHeater,
    System,
    Zone,
}

/// Fixed total order over command kinds; the builder processes kinds in this
/// order, registering each record's node immediately.
pub const BUILD_ORDER: &[CommandKind] = &[
    CommandKind::RunPeriod,
    CommandKind::Holidays,
    CommandKind::FuelMeter,
    CommandKind::ElectricMeter,
    CommandKind::MasterMeters,
    CommandKind::Material,
    CommandKind::Layers,
    CommandKind::Construction,
    CommandKind::GlassType,
    CommandKind::DaySchedulePd,
    CommandKind::WeekSchedulePd,
    CommandKind::SchedulePd,
    CommandKind::Floor,
    CommandKind::Space,
    CommandKind::ExteriorWall,
    CommandKind::InteriorWall,
    CommandKind::UndergroundWall,
    CommandKind::Window,
    CommandKind::Door,
    CommandKind::Pump,
    CommandKind::CirculationLoop,
    CommandKind::Boiler,
    CommandKind::Chiller,
    CommandKind::HeatRejection,
    CommandKind::DwHeater,
    CommandKind::System,
    CommandKind::Zone,
];

impl CommandKind {
    /// Source tag as it appears in record files.
    pub fn tag(self) -> &'static str {
        match self {
            CommandKind::RunPeriod => "RUN-PERIOD-PD",
            CommandKind::Holidays => "HOLIDAYS",
            CommandKind::FuelMeter => "FUEL-METER",
            CommandKind::ElectricMeter => "ELEC-METER",
            CommandKind::MasterMeters => "MASTER-METERS",
            CommandKind::Material => "MATERIAL",
            CommandKind::Layers => "LAYERS",
            CommandKind::Construction => "CONSTRUCTION",
            CommandKind::GlassType => "GLASS-TYPE",
            CommandKind::DaySchedulePd => "DAY-SCHEDULE-PD",
            CommandKind::WeekSchedulePd => "WEEK-SCHEDULE-PD",
            CommandKind::SchedulePd => "SCHEDULE-PD",
            CommandKind::Floor => "FLOOR",
            CommandKind::Space => "SPACE",
            CommandKind::ExteriorWall => "EXTERIOR-WALL",
            CommandKind::InteriorWall => "INTERIOR-WALL",
            CommandKind::UndergroundWall => "UNDERGROUND-WALL",
            CommandKind::Window => "WINDOW",
            CommandKind::Door => "DOOR",
            CommandKind::Pump => "PUMP",
            CommandKind::CirculationLoop => "CIRCULATION-LOOP",
            CommandKind::Boiler => "BOILER",
            CommandKind::Chiller => "CHILLER",
            CommandKind::HeatRejection => "HEAT-REJECTION",
            CommandKind::DwHeater => "DW-HEATER",
            CommandKind::System => "SYSTEM",
            CommandKind::Zone => "ZONE",
        }
    }

    pub fn from_tag(tag: &str) -> Option<CommandKind> {
        BUILD_ORDER.iter().copied().find(|k| k.tag() == tag)
    }

    /// The kind of this kind's declared owner, when it has one.
    ///
    /// Ownership edges form a forest; a record of a kind with a parent kind
    /// must name an already-registered node of that kind.
    pub fn parent_kind(self) -> Option<CommandKind> {
        match self {
            CommandKind::Space => Some(CommandKind::Floor),
            CommandKind::ExteriorWall
            | CommandKind::InteriorWall
            | CommandKind::UndergroundWall => Some(CommandKind::Space),
            CommandKind::Window | CommandKind::Door => Some(CommandKind::ExteriorWall),
            CommandKind::Zone => Some(CommandKind::System),
            _ => None,
        }
    }

    /// Kinds this kind's Phase-1 population rules may resolve by name.
    ///
    /// This is the declared reference topology that `verify_build_order`
    /// checks against `BUILD_ORDER`. Keep it in sync with the populate
    /// modules; an under-declared reference here shows up as an
    /// `UnresolvedParent`-class bug at build time, an over-declared one is
    /// harmless.
    pub fn referenced_kinds(self) -> &'static [CommandKind] {
        match self {
            CommandKind::RunPeriod
            | CommandKind::Holidays
            | CommandKind::FuelMeter
            | CommandKind::ElectricMeter
            | CommandKind::Material
            | CommandKind::GlassType
            | CommandKind::DaySchedulePd
            | CommandKind::Floor
            | CommandKind::Pump => &[],
            CommandKind::MasterMeters => &[CommandKind::FuelMeter, CommandKind::ElectricMeter],
            CommandKind::Layers => &[CommandKind::Material],
            CommandKind::Construction => &[CommandKind::Layers],
            CommandKind::WeekSchedulePd => &[CommandKind::DaySchedulePd],
            CommandKind::SchedulePd => &[CommandKind::WeekSchedulePd],
            CommandKind::Space => &[CommandKind::Floor, CommandKind::SchedulePd],
            CommandKind::ExteriorWall | CommandKind::UndergroundWall => {
                &[CommandKind::Space, CommandKind::Construction, CommandKind::Floor]
            }
            CommandKind::InteriorWall => {
                &[CommandKind::Space, CommandKind::Construction, CommandKind::Floor]
            }
            CommandKind::Window => &[CommandKind::GlassType, CommandKind::ExteriorWall],
            CommandKind::Door => &[CommandKind::Construction, CommandKind::ExteriorWall],
            CommandKind::CirculationLoop => &[CommandKind::Pump, CommandKind::SchedulePd],
            CommandKind::Boiler => &[
                CommandKind::CirculationLoop,
                CommandKind::Pump,
                CommandKind::FuelMeter,
                CommandKind::MasterMeters,
            ],
            CommandKind::Chiller => &[
                CommandKind::CirculationLoop,
                CommandKind::Pump,
                CommandKind::ElectricMeter,
            ],
            CommandKind::HeatRejection => &[CommandKind::CirculationLoop, CommandKind::Pump],
            CommandKind::DwHeater => &[
                CommandKind::CirculationLoop,
                CommandKind::FuelMeter,
                CommandKind::MasterMeters,
                CommandKind::SchedulePd,
            ],
            CommandKind::System => &[CommandKind::SchedulePd, CommandKind::CirculationLoop],
            CommandKind::Zone => &[
                CommandKind::System,
                CommandKind::Space,
                CommandKind::SchedulePd,
            ],
        }
    }
}

impl std::fmt::Display for CommandKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BuildOrderError {
    #[error("build order is missing command kind {kind}")]
    MissingKind { kind: CommandKind },
    #[error("build order lists {kind} more than once")]
    DuplicateKind { kind: CommandKind },
    #[error("{kind} references {referenced}, which is built later")]
    ReferenceAfter {
        kind: CommandKind,
        referenced: CommandKind,
    },
    #[error("{kind} is owned by {parent}, which is built later")]
    ParentAfter {
        kind: CommandKind,
        parent: CommandKind,
    },
}

/// Check that `order` is a permutation of all command kinds in which every
/// kind's declared references and parent kind appear strictly earlier.
///
/// The builder runs this over `BUILD_ORDER` before constructing anything, so
/// an edit that breaks the reference topology fails loudly instead of
/// surfacing as a missing-reference mystery mid-build.
pub fn verify_build_order(order: &[CommandKind]) -> Result<(), BuildOrderError> {
    let mut position = std::collections::BTreeMap::new();
    for (i, kind) in order.iter().enumerate() {
        if position.insert(*kind, i).is_some() {
            return Err(BuildOrderError::DuplicateKind { kind: *kind });
        }
    }
    for kind in BUILD_ORDER {
        if !position.contains_key(kind) {
            return Err(BuildOrderError::MissingKind { kind: *kind });
        }
    }

    for (i, kind) in order.iter().enumerate() {
        for referenced in kind.referenced_kinds() {
            if position[referenced] >= i {
                return Err(BuildOrderError::ReferenceAfter {
                    kind: *kind,
                    referenced: *referenced,
                });
            }
        }
        if let Some(parent) = kind.parent_kind() {
            if position[&parent] >= i {
                return Err(BuildOrderError::ParentAfter {
                    kind: *kind,
                    parent,
                });
            }
        }
    }
    Ok(())
}
