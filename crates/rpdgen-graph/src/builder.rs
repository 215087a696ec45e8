//! Dependency-ordered graph builder.
//!
//! Records are consumed kind-by-kind in `BUILD_ORDER` (verified against the
//! declared reference topology before anything is constructed), in
//! within-kind record order, registering each node immediately so later
//! kinds can resolve it. A parent name that does not resolve is an ordering
//! bug — fatal, never tolerated.

use rpdgen_bdl::{
    coerce, verify_build_order, BuildOrderError, CommandKind, RecordSource, BUILD_ORDER,
};
use thiserror::Error;
use tracing::{debug, warn};

use crate::model::ModelRoot;
use crate::node::{Node, StateError};

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("duplicate unique name `{name}` ({kind})")]
    DuplicateName { name: String, kind: CommandKind },
    #[error("{kind} `{name}` declares parent `{parent}`, which is not registered")]
    UnresolvedParent {
        name: String,
        kind: CommandKind,
        parent: String,
    },
    #[error("build order violates reference topology: {0}")]
    BuildOrder(#[from] BuildOrderError),
    #[error("node state violation: {0}")]
    State(#[from] StateError),
}

/// Construct the full graph from a record source.
///
/// On success every node is registered exactly once, ownership edges are
/// wired, and the zone → space side-channel cache is populated. Nothing is
/// computed yet; all nodes are in `Constructed` state.
pub fn build_graph(source: &dyn RecordSource) -> Result<ModelRoot, BuildError> {
    verify_build_order(BUILD_ORDER)?;

    let mut model = ModelRoot::new();
    for kind in BUILD_ORDER {
        let records = source.read_records(*kind);
        debug!(kind = %kind, count = records.len(), "constructing nodes");
        for record in records {
            let owner = match &record.parent_name {
                Some(parent) => {
                    Some(model.registry.index_of(parent).ok_or_else(|| {
                        BuildError::UnresolvedParent {
                            name: record.unique_name.clone(),
                            kind: *kind,
                            parent: parent.clone(),
                        }
                    })?)
                }
                None => None,
            };

            // Zone records decorate a space declared in a separate stream;
            // the link is threaded into the model caches now, at
            // construction time, so every later phase sees it.
            if *kind == CommandKind::Zone {
                match coerce::try_str(&record, "SPACE") {
                    Some(space) if model.registry.resolve(space).is_some() => {
                        model
                            .space_for_zone
                            .insert(record.unique_name.clone(), space.to_string());
                        model
                            .zone_for_space
                            .insert(space.to_string(), record.unique_name.clone());
                    }
                    Some(space) => {
                        warn!(zone = %record.unique_name, space, "zone names an unknown space");
                    }
                    None => {
                        warn!(zone = %record.unique_name, "zone record has no SPACE keyword");
                    }
                }
            }

            let name = record.unique_name.clone();
            let node = Node::new(*kind, record, owner);
            let index = model
                .registry
                .register(node)
                .ok_or(BuildError::DuplicateName { name, kind: *kind })?;
            if let Some(owner) = owner {
                model.registry.get_mut(owner).children.push(index);
            }
        }
    }
    Ok(model)
}
