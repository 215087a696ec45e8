//! Two-phase population.
//!
//! Phase 1 walks the registry in construction order and computes each node's
//! typed attributes from its raw fields, resolved references (raw fields
//! only — never another node's computed attributes) and batched result
//! queries. Rules that need to mutate a *different* node (loops and plant
//! equipment wiring their pumps) do not mutate in place; they emit side
//! writes, which are applied in a deterministic sorted sub-pass after every
//! node has computed.
//!
//! Phase 2 walks kinds in *reverse* build order, so every owned node is
//! assembled and inserted before its owner assembles: a parent only ever
//! embeds finished sub-documents, pulled out of its staging area.

pub mod attrs;

mod airside;
mod envelope;
mod project;
mod schedules;
mod waterside;

use rpdgen_bdl::{coerce, CommandKind, BUILD_ORDER};
use rpdgen_schema::doc;
use tracing::{debug, warn};

use crate::builder::BuildError;
use crate::model::{Calendar, ModelRoot};
use crate::node::{NodeState, Staging};
use crate::populate::attrs::ComputedAttrs;
use crate::results::ResultService;

/// A deferred write onto another node's computed attributes, emitted during
/// Phase 1 and applied in the sorted sub-pass. Every variant targets a pump;
/// pumps are the only nodes the domain wires from the outside.
#[derive(Debug, Clone, PartialEq)]
pub enum SideWrite {
    /// The loop (or the plant equipment standing in for one) this pump serves.
    PumpLoop { pump: String, loop_id: String },
    /// Loop-derived electric power per unit flow, W per L/s.
    PumpPowerPerFlow { pump: String, w_per_l_s: f64 },
}

impl SideWrite {
    /// Total order for the application sub-pass: target name first, then
    /// variant, then payload, so the applied sequence is independent of the
    /// order rules emitted in.
    fn sort_key(&self) -> (String, u8, String) {
        match self {
            SideWrite::PumpLoop { pump, loop_id } => (pump.clone(), 0, loop_id.clone()),
            SideWrite::PumpPowerPerFlow { pump, w_per_l_s } => {
                (pump.clone(), 1, format!("{:024.9}", w_per_l_s))
            }
        }
    }

    fn apply(self, model: &mut ModelRoot) {
        let pump_name = match &self {
            SideWrite::PumpLoop { pump, .. } | SideWrite::PumpPowerPerFlow { pump, .. } => {
                pump.clone()
            }
        };
        let Some(index) = model.registry.index_of(&pump_name) else {
            warn!(pump = %pump_name, "side write targets an unknown pump");
            return;
        };
        let node = model.registry.get_mut(index);
        let Some(pump) = node.computed.as_pump_mut() else {
            warn!(target = %pump_name, kind = %node.kind, "side write targets a non-pump node");
            return;
        };
        match self {
            SideWrite::PumpLoop { loop_id, .. } => {
                debug!(pump = %pump_name, loop_id = %loop_id, "pump wired to loop");
                pump.loop_or_piping = Some(loop_id);
            }
            SideWrite::PumpPowerPerFlow { w_per_l_s, .. } => {
                pump.power_per_flow_rate = Some(w_per_l_s);
            }
        }
    }
}

/// Phase 1: calendar, per-node attribute computation, side-write sub-pass.
pub fn run_phase1(model: &mut ModelRoot, results: &dyn ResultService) -> Result<(), BuildError> {
    model.calendar = build_calendar(model);

    let mut side_writes = Vec::new();
    for index in 0..model.registry.len() {
        let (computed, mut writes) = compute(model, index, results);
        side_writes.append(&mut writes);
        let node = model.registry.get_mut(index);
        node.computed = computed;
        node.advance(NodeState::Constructed)?;
    }

    side_writes.sort_by_key(SideWrite::sort_key);
    for write in side_writes {
        write.apply(model);
    }
    Ok(())
}

/// Phase 2: assemble and insert, children before owners.
pub fn run_phase2(model: &mut ModelRoot) -> Result<(), BuildError> {
    for kind in BUILD_ORDER.iter().rev() {
        let indices: Vec<usize> = (0..model.registry.len())
            .filter(|i| model.registry.get(*i).kind == *kind)
            .collect();
        for index in indices {
            let staging = std::mem::take(&mut model.registry.get_mut(index).staging);
            let piece = assemble(model, index, staging);
            model.registry.get_mut(index).advance(NodeState::Computed)?;
            insert(model, index, piece);
            model.registry.get_mut(index).advance(NodeState::Assembled)?;
        }
    }
    Ok(())
}

/// Simulation-year calendar from the run period and holiday raw fields.
/// With no run period there is no calendar, and annual schedules stay
/// unexpanded.
fn build_calendar(model: &ModelRoot) -> Option<Calendar> {
    let run_period = model
        .registry
        .iter()
        .find(|n| n.kind == CommandKind::RunPeriod)?;
    // 2018 starts on a Monday; the engine's fallback year.
    let year = coerce::try_i64(&run_period.record, "BEGIN-YEAR").unwrap_or(2018) as i32;

    let holiday_days: Vec<i64> = model
        .registry
        .iter()
        .filter(|n| n.kind == CommandKind::Holidays)
        .flat_map(|n| {
            coerce::try_f64_list(&n.record, "DAYS")
                .into_iter()
                .map(|d| d as i64)
        })
        .collect();
    Some(Calendar::build(year, &holiday_days))
}

fn compute(
    model: &ModelRoot,
    index: usize,
    results: &dyn ResultService,
) -> (ComputedAttrs, Vec<SideWrite>) {
    let node = model.registry.get(index);
    let plain = |attrs: ComputedAttrs| (attrs, Vec::new());
    match node.kind {
        CommandKind::RunPeriod => plain(project::compute_run_period(node, results)),
        CommandKind::Holidays => plain(project::compute_holidays(node)),
        CommandKind::FuelMeter | CommandKind::ElectricMeter => {
            plain(project::compute_meter(node))
        }
        CommandKind::MasterMeters => plain(project::compute_master_meters(node, model)),
        CommandKind::Material => plain(envelope::compute_material(node)),
        CommandKind::Layers => plain(envelope::compute_layers(node, model)),
        CommandKind::Construction => plain(envelope::compute_construction(node, model, results)),
        CommandKind::GlassType => plain(envelope::compute_glass_type(node)),
        CommandKind::DaySchedulePd => plain(schedules::compute_day(node)),
        CommandKind::WeekSchedulePd => plain(schedules::compute_week(node, model)),
        CommandKind::SchedulePd => plain(schedules::compute_annual(node, model)),
        CommandKind::Floor => plain(envelope::compute_floor(node)),
        CommandKind::Space => plain(envelope::compute_space(node, model)),
        CommandKind::ExteriorWall | CommandKind::InteriorWall | CommandKind::UndergroundWall => {
            plain(envelope::compute_surface(node, model))
        }
        CommandKind::Window => plain(envelope::compute_window(node, model)),
        CommandKind::Door => plain(envelope::compute_door(node, model)),
        CommandKind::Pump => plain(waterside::compute_pump(node, results)),
        CommandKind::CirculationLoop => waterside::compute_loop(node, model, results),
        CommandKind::Boiler => waterside::compute_boiler(node, model, results),
        CommandKind::Chiller => waterside::compute_chiller(node, model, results),
        CommandKind::HeatRejection => waterside::compute_heat_rejection(node, model, results),
        CommandKind::DwHeater => plain(waterside::compute_dw_heater(node, model, results)),
        CommandKind::System => plain(airside::compute_system(node, model, results)),
        CommandKind::Zone => plain(airside::compute_zone(node, model, results)),
    }
}

/// One assembled sub-document, ready for insertion. Kinds whose output is
/// embedded by reference resolution rather than ownership (materials, glass
/// types, schedules' building blocks) assemble to `Nothing`.
enum Assembled {
    Nothing,
    Schedule(doc::Schedule),
    Zone(doc::Zone),
    Surface(doc::Surface),
    Subsurface(doc::Subsurface),
    Terminal(doc::Terminal),
    HvacSystem(doc::HvacSystem),
    FluidLoop(doc::FluidLoop),
    Pump(doc::Pump),
    Boiler(doc::Boiler),
    Chiller(doc::Chiller),
    HeatRejection(doc::HeatRejection),
    ServiceWaterHeating(doc::ServiceWaterHeatingEquipment),
    Output(doc::Output),
}

fn assemble(model: &ModelRoot, index: usize, staging: Staging) -> Assembled {
    let node = model.registry.get(index);
    match node.kind {
        CommandKind::RunPeriod => match project::assemble_output(node) {
            Some(output) => Assembled::Output(output),
            None => Assembled::Nothing,
        },
        CommandKind::Holidays
        | CommandKind::FuelMeter
        | CommandKind::ElectricMeter
        | CommandKind::MasterMeters
        | CommandKind::Material
        | CommandKind::Layers
        | CommandKind::Construction
        | CommandKind::GlassType
        | CommandKind::DaySchedulePd
        | CommandKind::WeekSchedulePd
        | CommandKind::Floor => Assembled::Nothing,
        CommandKind::SchedulePd => Assembled::Schedule(schedules::assemble_schedule(node)),
        CommandKind::Space => Assembled::Zone(envelope::assemble_zone(node, staging, model)),
        CommandKind::ExteriorWall | CommandKind::InteriorWall | CommandKind::UndergroundWall => {
            Assembled::Surface(envelope::assemble_surface(node, staging, model))
        }
        CommandKind::Window | CommandKind::Door => {
            Assembled::Subsurface(envelope::assemble_subsurface(node))
        }
        CommandKind::Pump => Assembled::Pump(waterside::assemble_pump(node)),
        CommandKind::CirculationLoop => {
            Assembled::FluidLoop(waterside::assemble_fluid_loop(node))
        }
        CommandKind::Boiler => Assembled::Boiler(waterside::assemble_boiler(node)),
        CommandKind::Chiller => Assembled::Chiller(waterside::assemble_chiller(node)),
        CommandKind::HeatRejection => {
            Assembled::HeatRejection(waterside::assemble_heat_rejection(node))
        }
        CommandKind::DwHeater => {
            Assembled::ServiceWaterHeating(waterside::assemble_dw_heater(node))
        }
        CommandKind::System => Assembled::HvacSystem(airside::assemble_system(node)),
        CommandKind::Zone => match airside::assemble_terminal(node) {
            Some(terminal) => Assembled::Terminal(terminal),
            None => Assembled::Nothing,
        },
    }
}

fn insert(model: &mut ModelRoot, index: usize, piece: Assembled) {
    let owner = model.registry.get(index).owner;
    match piece {
        Assembled::Nothing => {}
        Assembled::Schedule(s) => model.collections.schedules.push(s),
        Assembled::Zone(z) => model.collections.zones.push(z),
        Assembled::Surface(s) => match owner {
            Some(owner) => model.registry.get_mut(owner).staging.surfaces.push(s),
            None => warn!(surface = %s.id, "surface has no owning space; dropped"),
        },
        Assembled::Subsurface(s) => match owner {
            Some(owner) => model.registry.get_mut(owner).staging.subsurfaces.push(s),
            None => warn!(subsurface = %s.id, "subsurface has no owning wall; dropped"),
        },
        Assembled::Terminal(t) => {
            let zone_name = model.registry.get(index).unique_name.clone();
            let space_index = model
                .space_for_zone
                .get(&zone_name)
                .and_then(|space| model.registry.index_of(space));
            match space_index {
                Some(space) => model.registry.get_mut(space).staging.terminals.push(t),
                None => warn!(zone = %zone_name, "terminal has no resolvable space; dropped"),
            }
        }
        Assembled::HvacSystem(s) => model.collections.hvac_systems.push(s),
        Assembled::FluidLoop(l) => model.collections.fluid_loops.push(l),
        Assembled::Pump(p) => model.collections.pumps.push(p),
        Assembled::Boiler(b) => model.collections.boilers.push(b),
        Assembled::Chiller(c) => model.collections.chillers.push(c),
        Assembled::HeatRejection(h) => model.collections.heat_rejections.push(h),
        Assembled::ServiceWaterHeating(s) => {
            model.collections.service_water_heating_equipment.push(s)
        }
        Assembled::Output(o) => model.collections.output = Some(o),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::build_graph;
    use crate::results::EmptyResultService;
    use rpdgen_bdl::{FieldValue, JsonRecordSource, Record};

    #[test]
    fn phase1_advances_every_node_and_builds_calendar() {
        let source = JsonRecordSource::from_records([
            (
                CommandKind::RunPeriod,
                vec![Record::new("RP").with_num("BEGIN-YEAR", 2018.0)],
            ),
            (
                CommandKind::Holidays,
                vec![Record::new("Hol").with_field(
                    "DAYS",
                    FieldValue::List(vec![FieldValue::Num(1.0), FieldValue::Num(185.0)]),
                )],
            ),
            (CommandKind::Material, vec![Record::new("Mat")]),
        ]);
        let mut model = build_graph(&source).unwrap();
        run_phase1(&mut model, &EmptyResultService).unwrap();
        assert!(model
            .registry
            .iter()
            .all(|n| n.state == NodeState::Computed));
        let cal = model.calendar.as_ref().expect("calendar");
        assert_eq!(cal.year, 2018);
        assert_eq!(cal.day_slots[0], crate::model::HOLIDAY_SLOT);
    }

    #[test]
    fn no_run_period_means_no_calendar() {
        let source =
            JsonRecordSource::from_records([(CommandKind::Material, vec![Record::new("Mat")])]);
        let mut model = build_graph(&source).unwrap();
        run_phase1(&mut model, &EmptyResultService).unwrap();
        assert!(model.calendar.is_none());
    }

    #[test]
    fn side_writes_apply_in_name_order() {
        let source = JsonRecordSource::from_records([(
            CommandKind::Pump,
            vec![Record::new("P1"), Record::new("P2")],
        )]);
        let mut model = build_graph(&source).unwrap();
        run_phase1(&mut model, &EmptyResultService).unwrap();

        let writes = vec![
            SideWrite::PumpLoop {
                pump: "P2".to_string(),
                loop_id: "HW".to_string(),
            },
            SideWrite::PumpLoop {
                pump: "P1".to_string(),
                loop_id: "CHW".to_string(),
            },
        ];
        let mut sorted = writes;
        sorted.sort_by_key(SideWrite::sort_key);
        for write in sorted {
            write.apply(&mut model);
        }
        let p1 = model.registry.resolve("P1").unwrap();
        let loop_id = match &p1.computed {
            ComputedAttrs::Pump(a) => a.loop_or_piping.clone(),
            _ => None,
        };
        assert_eq!(loop_id.as_deref(), Some("CHW"));
    }

    #[test]
    fn conflicting_side_writes_resolve_deterministically() {
        let a = SideWrite::PumpLoop {
            pump: "P".to_string(),
            loop_id: "B-Loop".to_string(),
        };
        let b = SideWrite::PumpLoop {
            pump: "P".to_string(),
            loop_id: "A-Loop".to_string(),
        };
        let mut one = vec![a.clone(), b.clone()];
        let mut two = vec![b, a];
        one.sort_by_key(SideWrite::sort_key);
        two.sort_by_key(SideWrite::sort_key);
        assert_eq!(one, two);
    }

    mod properties {
        use super::super::SideWrite;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn side_write_order_is_emission_invariant(
                mut writes in proptest::collection::vec(
                    ("[A-Z][a-z0-9]{0,6}", "[A-Z]{1,4}-Loop").prop_map(|(pump, loop_id)| {
                        SideWrite::PumpLoop { pump, loop_id }
                    }),
                    0..16,
                ),
            ) {
                let mut reversed: Vec<SideWrite> = writes.iter().cloned().rev().collect();
                writes.sort_by_key(SideWrite::sort_key);
                reversed.sort_by_key(SideWrite::sort_key);
                prop_assert_eq!(writes, reversed);
            }
        }
    }

    #[test]
    fn phase2_runs_children_before_owners() {
        let source = JsonRecordSource::from_records([
            (CommandKind::Floor, vec![Record::new("Fl1")]),
            (
                CommandKind::Space,
                vec![Record::new("Sp1")
                    .with_parent("Fl1")
                    .with_num("AREA", 1000.0)],
            ),
            (
                CommandKind::ExteriorWall,
                vec![Record::new("W1")
                    .with_parent("Sp1")
                    .with_num("AREA", 200.0)],
            ),
        ]);
        let mut model = build_graph(&source).unwrap();
        run_phase1(&mut model, &EmptyResultService).unwrap();
        run_phase2(&mut model).unwrap();
        assert!(model
            .registry
            .iter()
            .all(|n| n.state == NodeState::Inserted));
        assert_eq!(model.collections.zones.len(), 1);
        let zone = &model.collections.zones[0];
        assert_eq!(zone.id, "Sp1");
        assert_eq!(zone.surfaces.len(), 1);
        assert_eq!(zone.surfaces[0].id, "W1");
    }
}
