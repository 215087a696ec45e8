//! Object registry: the single name → node mapping the whole build shares.
//!
//! Nodes live in an arena (`Vec<Node>`, insertion order = build order); the
//! name index maps unique names to arena slots. Registration is write-once
//! per name — a duplicate is a contract violation, not a merge — and
//! `resolve` is the only read path. There is no locking: the registry is
//! mutated only during build and read-only afterwards.

use std::collections::BTreeMap;

use crate::node::Node;

#[derive(Debug, Default)]
pub struct Registry {
    nodes: Vec<Node>,
    by_name: BTreeMap<String, usize>,
}

impl Registry {
    pub fn new() -> Self {
        Registry::default()
    }

    /// Register a node under its unique name. Returns the arena index, or
    /// `None` if the name is already taken (callers treat that as fatal).
    pub fn register(&mut self, node: Node) -> Option<usize> {
        if self.by_name.contains_key(&node.unique_name) {
            return None;
        }
        let index = self.nodes.len();
        self.by_name.insert(node.unique_name.clone(), index);
        self.nodes.push(node);
        Some(index)
    }

    /// Name lookup. Absence is `None`, never an error — the caller decides
    /// whether a missing reference is fatal (builder) or a tolerated absent
    /// field (populator).
    pub fn resolve(&self, name: &str) -> Option<&Node> {
        self.by_name.get(name).map(|i| &self.nodes[*i])
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    pub fn get(&self, index: usize) -> &Node {
        &self.nodes[index]
    }

    pub fn get_mut(&mut self, index: usize) -> &mut Node {
        &mut self.nodes[index]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterate nodes in construction order (the registry iteration order the
    /// phase drivers rely on).
    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }
}
