//! Schema assembler: Model Root collections → one report document.
//!
//! Collections are moved, not copied, into the fixed document shell
//! (project → model description → building → segment). Empty collections
//! serialize as omitted fields; a model with no zones and no systems gets no
//! building at all.

use rpdgen_schema::doc::{
    Building, BuildingSegment, RulesetModelDescription, RulesetProjectDescription,
};

use crate::model::ModelRoot;

pub fn assemble_document(model: ModelRoot, project_id: &str) -> RulesetProjectDescription {
    let collections = model.collections;

    let buildings = if collections.zones.is_empty() && collections.hvac_systems.is_empty() {
        Vec::new()
    } else {
        vec![Building {
            id: format!("{project_id} Building"),
            building_segments: vec![BuildingSegment {
                id: format!("{project_id} Building Segment"),
                zones: collections.zones,
                heating_ventilating_air_conditioning_systems: collections.hvac_systems,
            }],
        }]
    };

    RulesetProjectDescription {
        id: project_id.to_string(),
        ruleset_model_descriptions: vec![RulesetModelDescription {
            id: format!("{project_id} Model"),
            buildings,
            schedules: collections.schedules,
            fluid_loops: collections.fluid_loops,
            pumps: collections.pumps,
            boilers: collections.boilers,
            chillers: collections.chillers,
            heat_rejections: collections.heat_rejections,
            service_water_heating_equipment: collections.service_water_heating_equipment,
            output: collections.output,
        }],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rpdgen_schema::doc;

    #[test]
    fn empty_model_has_no_building_and_sparse_json() {
        let rpd = assemble_document(ModelRoot::new(), "Proj");
        assert!(rpd.ruleset_model_descriptions[0].buildings.is_empty());
        let json = serde_json::to_value(&rpd).unwrap();
        let rmd = &json["ruleset_model_descriptions"][0];
        // Empty collections are omitted, not serialized as [] or null.
        assert!(rmd.get("buildings").is_none());
        assert!(rmd.get("schedules").is_none());
        assert!(rmd.get("output").is_none());
        assert_eq!(rmd["id"], "Proj Model");
    }

    #[test]
    fn zones_land_in_a_single_building_segment() {
        let mut model = ModelRoot::new();
        model.collections.zones.push(doc::Zone {
            id: "Z1".to_string(),
            ..Default::default()
        });
        let rpd = assemble_document(model, "Proj");
        let buildings = &rpd.ruleset_model_descriptions[0].buildings;
        assert_eq!(buildings.len(), 1);
        assert_eq!(buildings[0].building_segments[0].zones[0].id, "Z1");
    }
}
