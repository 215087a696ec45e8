//! Graph core of the BDL → RPD translator.
//!
//! The pipeline, in the order a build runs it:
//!
//! 1. [`builder::build_graph`] — instantiates one [`node::Node`] per record in
//!    the fixed dependency order, registering each in the [`registry::Registry`]
//!    so later nodes can resolve earlier ones by name.
//! 2. [`populate::run_phase1`] — per-node typed attribute computation:
//!    coercion, reference resolution, batched [`results::ResultService`]
//!    queries, and a deterministic side-write sub-pass.
//! 3. [`populate::run_phase2`] — per-node sub-document assembly + insertion
//!    into the owner's staging collection (owned children are visited before
//!    their owner, so a parent only ever embeds finished sub-documents).
//! 4. [`assemble::assemble_document`] — reads the Model Root's populated
//!    collections off into one `RulesetProjectDescription`.
//!
//! The whole pipeline is single-threaded batch work; the registry is mutated
//! only during build and the node arena only through the phase drivers.

pub mod assemble;
pub mod builder;
pub mod model;
pub mod node;
pub mod populate;
pub mod registry;
pub mod results;

pub use builder::{build_graph, BuildError};
pub use model::ModelRoot;
pub use registry::Registry;
pub use results::{EmptyResultService, JsonResultService, MetricRequest, ResultService};

use rpdgen_bdl::RecordSource;
use rpdgen_schema::doc::RulesetProjectDescription;

/// Run the full translation: build, populate (both phases), assemble.
///
/// A successful run always produces a document; only fatal/structural errors
/// (`DuplicateName`, `UnresolvedParent`, a broken build order, a node state
/// violation) abort. Per-field problems degrade to absent fields.
pub fn translate(
    source: &dyn RecordSource,
    results: &dyn ResultService,
    project_id: &str,
) -> Result<RulesetProjectDescription, BuildError> {
    let mut model = build_graph(source)?;
    populate::run_phase1(&mut model, results)?;
    populate::run_phase2(&mut model)?;
    Ok(assemble::assemble_document(model, project_id))
}
