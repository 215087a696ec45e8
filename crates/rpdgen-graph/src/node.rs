//! Graph nodes.
//!
//! A node is one source record after construction: identity, retained raw
//! fields, ownership links, computed attributes (Phase 1) and a staging area
//! children push finished sub-documents into (Phase 2 insertion). Ownership
//! is plain composition — an optional owner plus a child list — never a
//! class-hierarchy concern; "leaf or parent" is a property of the kind.

use rpdgen_bdl::{CommandKind, Record};
use rpdgen_schema::doc;
use thiserror::Error;

use crate::populate::attrs::ComputedAttrs;

/// Per-node lifecycle. Transitions are strictly ordered and checked; a
/// skipped or repeated transition is a driver bug, not bad input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum NodeState {
    Constructed,
    Computed,
    Assembled,
    Inserted,
}

#[derive(Debug, Error)]
#[error("{name}: illegal state transition {from:?} -> {to:?}")]
pub struct StateError {
    pub name: String,
    pub from: NodeState,
    pub to: NodeState,
}

impl NodeState {
    fn next(self) -> Option<NodeState> {
        match self {
            NodeState::Constructed => Some(NodeState::Computed),
            NodeState::Computed => Some(NodeState::Assembled),
            NodeState::Assembled => Some(NodeState::Inserted),
            NodeState::Inserted => None,
        }
    }
}

/// Sub-documents pushed onto a node by the nodes it owns, consumed by the
/// owner's own assembly step. Only the fields a kind actually owns are ever
/// populated; the rest stay empty.
#[derive(Debug, Clone, Default)]
pub struct Staging {
    pub surfaces: Vec<doc::Surface>,
    pub subsurfaces: Vec<doc::Subsurface>,
    pub terminals: Vec<doc::Terminal>,
}

#[derive(Debug, Clone)]
pub struct Node {
    /// Registry key; globally unique by construction.
    pub unique_name: String,
    pub kind: CommandKind,
    /// Raw record field map, retained for Phase-1 lookup (other nodes may
    /// read these through the registry, but never computed attributes).
    pub record: Record,
    /// Arena index of the owner, fixed at construction from `parent_name`.
    pub owner: Option<usize>,
    /// Arena indices of owned children, in construction order.
    pub children: Vec<usize>,
    pub state: NodeState,
    pub computed: ComputedAttrs,
    pub staging: Staging,
}

impl Node {
    pub fn new(kind: CommandKind, record: Record, owner: Option<usize>) -> Self {
        Node {
            unique_name: record.unique_name.clone(),
            kind,
            record,
            owner,
            children: Vec::new(),
            state: NodeState::Constructed,
            computed: ComputedAttrs::Pending,
            staging: Staging::default(),
        }
    }

    pub fn parent_name(&self) -> Option<&str> {
        self.record.parent_name.as_deref()
    }

    /// Advance the state machine by exactly one step, verifying the
    /// expected starting state.
    pub fn advance(&mut self, from: NodeState) -> Result<(), StateError> {
        let to = from.next().unwrap_or(from);
        if self.state != from || from.next().is_none() {
            return Err(StateError {
                name: self.unique_name.clone(),
                from: self.state,
                to,
            });
        }
        self.state = to;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node() -> Node {
        Node::new(CommandKind::Material, Record::new("Mat-1"), None)
    }

    #[test]
    fn state_machine_is_strictly_ordered() {
        let mut n = node();
        n.advance(NodeState::Constructed).unwrap();
        n.advance(NodeState::Computed).unwrap();
        n.advance(NodeState::Assembled).unwrap();
        assert_eq!(n.state, NodeState::Inserted);
    }

    #[test]
    fn skipping_a_transition_fails() {
        let mut n = node();
        let err = n.advance(NodeState::Computed).unwrap_err();
        assert_eq!(err.from, NodeState::Constructed);
    }

    #[test]
    fn reentering_a_state_fails() {
        let mut n = node();
        n.advance(NodeState::Constructed).unwrap();
        assert!(n.advance(NodeState::Constructed).is_err());
    }
}
