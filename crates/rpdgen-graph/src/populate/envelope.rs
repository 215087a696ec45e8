//! Envelope rules: materials, layers, constructions, glazing, floors,
//! spaces, walls and openings.
//!
//! Surface orientation is resolved against the owner chain: a wall's output
//! azimuth is its own azimuth plus the space and floor azimuths, wrapped to
//! [0, 360). Interior walls carry the output zone id of the space they face,
//! which is where a dangling NEXT-TO reference leaks into the document for
//! the validator to find.

use rpdgen_bdl::{coerce, CommandKind};
use rpdgen_schema::doc::{self, SubsurfaceClassification, SurfaceAdjacency, SurfaceClassification};
use tracing::warn;

use crate::model::ModelRoot;
use crate::node::{Node, Staging};
use crate::populate::attrs::{
    ComputedAttrs, ConstructionAttrs, FloorAttrs, GlassTypeAttrs, LayersAttrs, LightingGroup,
    MaterialAttrs, MiscEquipmentGroup, SpaceAttrs, SubsurfaceAttrs, SurfaceAttrs,
};
use crate::results::{ResultService, CONSTRUCTION_U_FACTOR};

pub fn compute_material(node: &Node) -> ComputedAttrs {
    let r = &node.record;
    ComputedAttrs::Material(MaterialAttrs {
        thickness: coerce::try_f64(r, "THICKNESS").map(coerce::ft_to_m),
        thermal_conductivity: coerce::try_f64(r, "CONDUCTIVITY").map(coerce::conductivity_ip_to_si),
        density: coerce::try_f64(r, "DENSITY").map(coerce::lb_per_cuft_to_kg_per_m3),
        specific_heat: coerce::try_f64(r, "SPECIFIC-HEAT").map(coerce::btu_per_lb_f_to_j_per_kg_k),
        r_value: coerce::try_f64(r, "RESISTANCE").map(coerce::r_ip_to_si),
    })
}

pub fn compute_layers(node: &Node, model: &ModelRoot) -> ComputedAttrs {
    let materials = coerce::try_str_list(&node.record, "MATERIAL")
        .into_iter()
        .filter(|name| match model.registry.resolve(name) {
            Some(n) if n.kind == CommandKind::Material => true,
            _ => {
                warn!(layers = %node.unique_name, material = %name, "unknown material dropped");
                false
            }
        })
        .collect();
    ComputedAttrs::Layers(LayersAttrs { materials })
}

pub fn compute_construction(
    node: &Node,
    model: &ModelRoot,
    results: &dyn ResultService,
) -> ComputedAttrs {
    let values = results.query(&node.unique_name, &[CONSTRUCTION_U_FACTOR]);
    let u_factor = values
        .get(&CONSTRUCTION_U_FACTOR.code)
        .copied()
        .flatten()
        .map(coerce::u_ip_to_si)
        .or_else(|| coerce::try_f64(&node.record, "U-VALUE").map(coerce::u_ip_to_si));

    // Material names come off the referenced LAYERS record's raw fields.
    let materials = coerce::try_str(&node.record, "LAYERS")
        .and_then(|name| model.registry.resolve(name))
        .filter(|n| n.kind == CommandKind::Layers)
        .map(|layers| coerce::try_str_list(&layers.record, "MATERIAL"))
        .unwrap_or_default();
    ComputedAttrs::Construction(ConstructionAttrs { u_factor, materials })
}

pub fn compute_glass_type(node: &Node) -> ComputedAttrs {
    let r = &node.record;
    ComputedAttrs::GlassType(GlassTypeAttrs {
        u_factor: coerce::try_f64(r, "GLASS-CONDUCTANCE").map(coerce::u_ip_to_si),
        // Shading coefficient relates to SHGC by the standard 0.87 factor.
        solar_heat_gain_coefficient: coerce::try_f64(r, "SHADING-COEF").map(|sc| sc * 0.87),
        visible_transmittance: coerce::try_f64(r, "VIS-TRANS"),
    })
}

pub fn compute_floor(node: &Node) -> ComputedAttrs {
    ComputedAttrs::Floor(FloorAttrs {
        azimuth: coerce::try_f64(&node.record, "AZIMUTH"),
        floor_height: coerce::try_f64(&node.record, "FLOOR-HEIGHT").map(coerce::ft_to_m),
    })
}

pub(super) fn schedule_ref(node: &Node, model: &ModelRoot, key: &str) -> Option<String> {
    let name = coerce::try_str(&node.record, key)?;
    match model.registry.resolve(name) {
        Some(n) if n.kind == CommandKind::SchedulePd => Some(name.to_string()),
        _ => {
            warn!(node = %node.unique_name, key, schedule = name, "unknown schedule reference");
            None
        }
    }
}

pub fn compute_space(node: &Node, model: &ModelRoot) -> ComputedAttrs {
    let r = &node.record;

    // Repeated keyword groups pair the i-th power entry with the i-th
    // schedule entry; a shorter list leaves the trailing slots absent.
    let lighting_power = coerce::try_f64_list(r, "LIGHTING-W/AREA");
    let lighting_schedules = coerce::try_str_list(r, "LIGHTING-SCHEDULE");
    let lighting = (0..lighting_power.len().max(lighting_schedules.len()))
        .map(|i| LightingGroup {
            power_per_area: lighting_power
                .get(i)
                .copied()
                .map(coerce::w_per_sqft_to_w_per_m2),
            schedule: lighting_schedules
                .get(i)
                .filter(|name| model.registry.resolve(name).is_some())
                .cloned(),
        })
        .collect();

    let equipment_kw = coerce::try_f64_list(r, "EQUIPMENT-KW");
    let equipment_schedules = coerce::try_str_list(r, "EQUIP-SCHEDULE");
    let misc_equipment = (0..equipment_kw.len().max(equipment_schedules.len()))
        .map(|i| MiscEquipmentGroup {
            power: equipment_kw.get(i).map(|kw| kw * 1000.0),
            schedule: equipment_schedules
                .get(i)
                .filter(|name| model.registry.resolve(name).is_some())
                .cloned(),
            energy_type: Some(doc::EnergySource::Electricity),
        })
        .collect();

    ComputedAttrs::Space(SpaceAttrs {
        floor_area: coerce::try_f64(r, "AREA").map(coerce::sqft_to_m2),
        volume: coerce::try_f64(r, "VOLUME").map(coerce::cuft_to_m3),
        number_of_occupants: coerce::try_f64(r, "NUMBER-OF-PEOPLE"),
        occupant_schedule: schedule_ref(node, model, "PEOPLE-SCHEDULE"),
        lighting,
        misc_equipment,
    })
}

/// Wall tilt buckets per the reporting convention: near-horizontal facing up
/// is a ceiling, facing down a floor, everything else a wall.
fn classify_tilt(tilt: f64) -> SurfaceClassification {
    if tilt < 60.0 {
        SurfaceClassification::Ceiling
    } else if tilt > 120.0 {
        SurfaceClassification::Floor
    } else {
        SurfaceClassification::Wall
    }
}

/// Absolute azimuth: the wall's own azimuth rotated by its space's and
/// floor's azimuths, read off the owner chain's raw fields.
fn absolute_azimuth(node: &Node, model: &ModelRoot) -> Option<f64> {
    let own = coerce::try_f64(&node.record, "AZIMUTH")?;
    let space = node.owner.map(|i| model.registry.get(i));
    let space_az = space
        .and_then(|s| coerce::try_f64(&s.record, "AZIMUTH"))
        .unwrap_or(0.0);
    let floor_az = space
        .and_then(|s| s.owner)
        .map(|i| model.registry.get(i))
        .and_then(|f| coerce::try_f64(&f.record, "AZIMUTH"))
        .unwrap_or(0.0);
    Some((own + space_az + floor_az).rem_euclid(360.0))
}

fn wall_area(node: &Node) -> Option<f64> {
    coerce::try_f64(&node.record, "AREA")
        .or_else(|| {
            let h = coerce::try_f64(&node.record, "HEIGHT")?;
            let w = coerce::try_f64(&node.record, "WIDTH")?;
            Some(h * w)
        })
        .map(coerce::sqft_to_m2)
}

fn construction_ref(node: &Node, model: &ModelRoot) -> Option<String> {
    let name = coerce::try_str(&node.record, "CONSTRUCTION")?;
    match model.registry.resolve(name) {
        Some(n) if n.kind == CommandKind::Construction => Some(name.to_string()),
        _ => {
            warn!(wall = %node.unique_name, construction = name, "unknown construction");
            None
        }
    }
}

pub fn compute_surface(node: &Node, model: &ModelRoot) -> ComputedAttrs {
    let tilt = coerce::try_f64(&node.record, "TILT").unwrap_or(90.0);
    let adjacent_to = match node.kind {
        CommandKind::ExteriorWall => SurfaceAdjacency::Exterior,
        CommandKind::UndergroundWall => SurfaceAdjacency::Ground,
        _ => SurfaceAdjacency::Interior,
    };
    // NEXT-TO names a space; the document carries that space's output zone
    // id, resolved through the zone decoration cache. An unknown space still
    // produces the id (the reference leak the validator reports), never a
    // build failure.
    let adjacent_zone = if node.kind == CommandKind::InteriorWall {
        coerce::try_str(&node.record, "NEXT-TO").map(|space| model.output_zone_id(space))
    } else {
        None
    };
    ComputedAttrs::Surface(SurfaceAttrs {
        classification: Some(classify_tilt(tilt)),
        area: wall_area(node),
        azimuth: absolute_azimuth(node, model),
        tilt: Some(tilt),
        adjacent_to: Some(adjacent_to),
        adjacent_zone,
        construction: construction_ref(node, model),
    })
}

pub fn compute_window(node: &Node, model: &ModelRoot) -> ComputedAttrs {
    let glass = coerce::try_str(&node.record, "GLASS-TYPE")
        .and_then(|name| model.registry.resolve(name))
        .filter(|n| n.kind == CommandKind::GlassType);
    let glass_record = glass.map(|g| &g.record);
    ComputedAttrs::Subsurface(SubsurfaceAttrs {
        classification: Some(SubsurfaceClassification::Window),
        glazed_area: wall_area(node),
        opaque_area: None,
        u_factor: glass_record
            .and_then(|r| coerce::try_f64(r, "GLASS-CONDUCTANCE"))
            .map(coerce::u_ip_to_si),
        solar_heat_gain_coefficient: glass_record
            .and_then(|r| coerce::try_f64(r, "SHADING-COEF"))
            .map(|sc| sc * 0.87),
        visible_transmittance: glass_record.and_then(|r| coerce::try_f64(r, "VIS-TRANS")),
        has_shading_overhang: coerce::try_f64(&node.record, "OVERHANG-D").map(|d| d > 0.0),
    })
}

pub fn compute_door(node: &Node, model: &ModelRoot) -> ComputedAttrs {
    let u_factor = coerce::try_str(&node.record, "CONSTRUCTION")
        .and_then(|name| model.registry.resolve(name))
        .filter(|n| n.kind == CommandKind::Construction)
        .and_then(|c| coerce::try_f64(&c.record, "U-VALUE"))
        .map(coerce::u_ip_to_si);
    ComputedAttrs::Subsurface(SubsurfaceAttrs {
        classification: Some(SubsurfaceClassification::Door),
        glazed_area: None,
        opaque_area: wall_area(node),
        u_factor,
        solar_heat_gain_coefficient: None,
        visible_transmittance: None,
        has_shading_overhang: None,
    })
}

// ============================================================================
// Assembly
// ============================================================================

/// Embedded construction sub-document: the construction node's computed
/// attributes plus one material sub-document per resolved layer entry.
fn assemble_construction(name: &str, model: &ModelRoot) -> Option<doc::Construction> {
    let node = model.registry.resolve(name)?;
    let attrs = node.computed.as_construction()?;
    let primary_layers = attrs
        .materials
        .iter()
        .filter_map(|mat_name| {
            let mat = model.registry.resolve(mat_name)?;
            let m = mat.computed.as_material()?;
            Some(doc::Material {
                id: mat_name.clone(),
                thickness: m.thickness,
                thermal_conductivity: m.thermal_conductivity,
                density: m.density,
                specific_heat: m.specific_heat,
                r_value: m.r_value,
            })
        })
        .collect();
    Some(doc::Construction {
        id: name.to_string(),
        u_factor: attrs.u_factor,
        primary_layers,
    })
}

pub fn assemble_surface(node: &Node, staging: Staging, model: &ModelRoot) -> doc::Surface {
    let attrs = match &node.computed {
        ComputedAttrs::Surface(a) => a.clone(),
        _ => SurfaceAttrs::default(),
    };
    doc::Surface {
        id: node.unique_name.clone(),
        classification: attrs.classification,
        area: attrs.area,
        azimuth: attrs.azimuth,
        tilt: attrs.tilt,
        adjacent_to: attrs.adjacent_to,
        adjacent_zone: attrs.adjacent_zone,
        construction: attrs
            .construction
            .as_deref()
            .and_then(|name| assemble_construction(name, model)),
        subsurfaces: staging.subsurfaces,
    }
}

pub fn assemble_subsurface(node: &Node) -> doc::Subsurface {
    let attrs = match &node.computed {
        ComputedAttrs::Subsurface(a) => a.clone(),
        _ => SubsurfaceAttrs::default(),
    };
    doc::Subsurface {
        id: node.unique_name.clone(),
        classification: attrs.classification,
        glazed_area: attrs.glazed_area,
        opaque_area: attrs.opaque_area,
        u_factor: attrs.u_factor,
        solar_heat_gain_coefficient: attrs.solar_heat_gain_coefficient,
        visible_transmittance: attrs.visible_transmittance,
        has_shading_overhang: attrs.has_shading_overhang,
    }
}

/// A space node assembles the *output zone*: its own loads plus anything the
/// decorating zone record computed (setpoints, schedules, exhaust fan) and
/// whatever its owned walls and the zone's terminal staged onto it.
pub fn assemble_zone(node: &Node, staging: Staging, model: &ModelRoot) -> doc::Zone {
    let attrs = match &node.computed {
        ComputedAttrs::Space(a) => a.clone(),
        _ => SpaceAttrs::default(),
    };
    let zone_id = model.output_zone_id(&node.unique_name);

    let interior_lighting = attrs
        .lighting
        .iter()
        .enumerate()
        .map(|(i, group)| doc::InteriorLighting {
            id: format!("{} Lighting {}", node.unique_name, i + 1),
            power_per_area: group.power_per_area,
            lighting_multiplier_schedule: group.schedule.clone(),
        })
        .collect();
    let miscellaneous_equipment = attrs
        .misc_equipment
        .iter()
        .enumerate()
        .map(|(i, group)| doc::MiscellaneousEquipment {
            id: format!("{} Equipment {}", node.unique_name, i + 1),
            power: group.power,
            multiplier_schedule: group.schedule.clone(),
            energy_type: group.energy_type,
        })
        .collect();

    let decoration = model
        .zone_for_space
        .get(&node.unique_name)
        .and_then(|zone| model.registry.resolve(zone))
        .and_then(|zone| zone.computed.as_zone());

    let zonal_exhaust_fan = decoration.and_then(|z| {
        if z.exhaust_airflow.is_none() && z.exhaust_fan_power.is_none() {
            return None;
        }
        Some(doc::Fan {
            id: format!("{} Exhaust Fan", zone_id),
            design_airflow: z.exhaust_airflow,
            design_electric_power: z.exhaust_fan_power,
            speed_control: None,
        })
    });

    doc::Zone {
        id: zone_id,
        volume: attrs.volume,
        design_thermostat_heating_setpoint: decoration.and_then(|z| z.design_heating_setpoint),
        design_thermostat_cooling_setpoint: decoration.and_then(|z| z.design_cooling_setpoint),
        thermostat_heating_setpoint_schedule: decoration.and_then(|z| z.heating_schedule.clone()),
        thermostat_cooling_setpoint_schedule: decoration.and_then(|z| z.cooling_schedule.clone()),
        exhaust_airflow_rate: decoration.and_then(|z| z.exhaust_airflow),
        zonal_exhaust_fan,
        spaces: vec![doc::Space {
            id: node.unique_name.clone(),
            floor_area: attrs.floor_area,
            number_of_occupants: attrs.number_of_occupants,
            occupant_multiplier_schedule: attrs.occupant_schedule,
            interior_lighting,
            miscellaneous_equipment,
        }],
        surfaces: staging.surfaces,
        terminals: staging.terminals,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::build_graph;
    use crate::populate::{run_phase1, run_phase2};
    use crate::results::{EmptyResultService, JsonResultService};
    use approx::assert_relative_eq;
    use rpdgen_bdl::{FieldValue, JsonRecordSource, Record};

    fn str_list(values: &[&str]) -> FieldValue {
        FieldValue::List(
            values
                .iter()
                .map(|s| FieldValue::Str(s.to_string()))
                .collect(),
        )
    }

    #[test]
    fn tilt_classification_buckets() {
        assert_eq!(classify_tilt(0.0), SurfaceClassification::Ceiling);
        assert_eq!(classify_tilt(90.0), SurfaceClassification::Wall);
        assert_eq!(classify_tilt(180.0), SurfaceClassification::Floor);
    }

    #[test]
    fn azimuth_accumulates_the_owner_chain() {
        let source = JsonRecordSource::from_records([
            (
                CommandKind::Floor,
                vec![Record::new("Fl").with_num("AZIMUTH", 30.0)],
            ),
            (
                CommandKind::Space,
                vec![Record::new("Sp")
                    .with_parent("Fl")
                    .with_num("AZIMUTH", 90.0)],
            ),
            (
                CommandKind::ExteriorWall,
                vec![Record::new("W")
                    .with_parent("Sp")
                    .with_num("AZIMUTH", 270.0)],
            ),
        ]);
        let mut model = build_graph(&source).unwrap();
        run_phase1(&mut model, &EmptyResultService).unwrap();
        let wall = model.registry.resolve("W").unwrap();
        let ComputedAttrs::Surface(attrs) = &wall.computed else {
            panic!("surface attrs");
        };
        // 270 + 90 + 30 = 390, wrapped.
        assert_relative_eq!(attrs.azimuth.unwrap(), 30.0);
    }

    #[test]
    fn construction_embeds_resolved_materials() {
        let mut results = JsonResultService::default();
        results.insert("Con", CONSTRUCTION_U_FACTOR.code, 0.1);
        let source = JsonRecordSource::from_records([
            (
                CommandKind::Material,
                vec![Record::new("Brick")
                    .with_num("THICKNESS", 0.333)
                    .with_num("CONDUCTIVITY", 0.4)],
            ),
            (
                CommandKind::Layers,
                vec![Record::new("Lay").with_field("MATERIAL", str_list(&["Brick", "Missing"]))],
            ),
            (
                CommandKind::Construction,
                vec![Record::new("Con").with_str("LAYERS", "Lay")],
            ),
            (CommandKind::Floor, vec![Record::new("Fl")]),
            (
                CommandKind::Space,
                vec![Record::new("Sp").with_parent("Fl")],
            ),
            (
                CommandKind::ExteriorWall,
                vec![Record::new("W")
                    .with_parent("Sp")
                    .with_str("CONSTRUCTION", "Con")],
            ),
        ]);
        let mut model = build_graph(&source).unwrap();
        run_phase1(&mut model, &results).unwrap();
        run_phase2(&mut model).unwrap();

        let zone = &model.collections.zones[0];
        let construction = zone.surfaces[0].construction.as_ref().expect("construction");
        assert_relative_eq!(construction.u_factor.unwrap(), coerce::u_ip_to_si(0.1));
        // Only the resolvable material survives.
        assert_eq!(construction.primary_layers.len(), 1);
        assert_eq!(construction.primary_layers[0].id, "Brick");
    }

    #[test]
    fn interior_wall_carries_adjacent_output_zone_id() {
        let source = JsonRecordSource::from_records([
            (CommandKind::Floor, vec![Record::new("Fl")]),
            (
                CommandKind::Space,
                vec![
                    Record::new("Sp1").with_parent("Fl"),
                    Record::new("Sp2").with_parent("Fl"),
                ],
            ),
            (
                CommandKind::InteriorWall,
                vec![Record::new("IW")
                    .with_parent("Sp1")
                    .with_str("NEXT-TO", "Sp2")],
            ),
            (CommandKind::System, vec![Record::new("Sys")]),
            (
                CommandKind::Zone,
                vec![Record::new("Zn2").with_parent("Sys").with_str("SPACE", "Sp2")],
            ),
        ]);
        let mut model = build_graph(&source).unwrap();
        run_phase1(&mut model, &EmptyResultService).unwrap();
        let wall = model.registry.resolve("IW").unwrap();
        let ComputedAttrs::Surface(attrs) = &wall.computed else {
            panic!("surface attrs");
        };
        // Sp2 is decorated by Zn2, so the output id is the zone's.
        assert_eq!(attrs.adjacent_zone.as_deref(), Some("Zn2"));
        assert_eq!(attrs.adjacent_to, Some(SurfaceAdjacency::Interior));
    }

    #[test]
    fn space_repeated_groups_pair_by_index() {
        let source = JsonRecordSource::from_records([
            (
                CommandKind::DaySchedulePd,
                vec![Record::new("D").with_field(
                    "VALUES",
                    FieldValue::List(vec![FieldValue::Num(1.0); 24]),
                )],
            ),
            (
                CommandKind::WeekSchedulePd,
                vec![Record::new("Wk").with_field("DAY-SCHEDULES", str_list(&["D"; 8]))],
            ),
            (
                CommandKind::SchedulePd,
                vec![Record::new("LtgSch").with_field("WEEK-SCHEDULES", str_list(&["Wk"]))],
            ),
            (CommandKind::Floor, vec![Record::new("Fl")]),
            (
                CommandKind::Space,
                vec![Record::new("Sp")
                    .with_parent("Fl")
                    .with_num("AREA", 1000.0)
                    .with_field(
                        "LIGHTING-W/AREA",
                        FieldValue::List(vec![FieldValue::Num(1.0), FieldValue::Num(0.5)]),
                    )
                    .with_field("LIGHTING-SCHEDULE", str_list(&["LtgSch"]))],
            ),
        ]);
        let mut model = build_graph(&source).unwrap();
        run_phase1(&mut model, &EmptyResultService).unwrap();
        let space = model.registry.resolve("Sp").unwrap();
        let ComputedAttrs::Space(attrs) = &space.computed else {
            panic!("space attrs");
        };
        assert_eq!(attrs.lighting.len(), 2);
        assert_eq!(attrs.lighting[0].schedule.as_deref(), Some("LtgSch"));
        assert!(attrs.lighting[1].schedule.is_none());
        assert_relative_eq!(
            attrs.lighting[0].power_per_area.unwrap(),
            coerce::w_per_sqft_to_w_per_m2(1.0)
        );
        assert_relative_eq!(attrs.floor_area.unwrap(), 92.903_04, max_relative = 1e-9);
    }
}
