//! Variation diffs: two variation trees sharing their unchanged nodes.
//!
//! All nodes live in one arena owned by [`VariationDiff`] and refer to each
//! other by [`NodeId`]. Following only the before-edges from the root
//! yields the variation tree before the edit, following only the
//! after-edges yields the tree after the edit.

mod id;
mod node;

#[cfg(test)]
mod tests;

pub use id::DecodedId;
pub use node::{DiffNode, NodeId, NodeType};

use crate::diff::{DiffLineNumber, DiffType, Time};
use crate::formula::Formula;
use std::ops::Index;
use thiserror::Error;

/// A violated structural property of a variation diff.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConsistencyError {
    #[error("{node} does not exist {time} the edit")]
    NotExistingAt { node: NodeId, time: Time },

    #[error("{node} already has a parent {time} the edit")]
    AlreadyHasParent { node: NodeId, time: Time },

    #[error("the root cannot have a parent")]
    RootHasParent,

    #[error("{child} is a {time} child of {parent} but does not have it as {time} parent")]
    MissingParentEdge {
        parent: NodeId,
        child: NodeId,
        time: Time,
    },

    #[error("{node} has {parent} as {time} parent but is not among its children")]
    MissingChildEdge {
        node: NodeId,
        parent: NodeId,
        time: Time,
    },

    #[error("{node} is {diff_type} but has parents before: {before}, after: {after}")]
    ParentsContradictDiffType {
        node: NodeId,
        diff_type: DiffType,
        before: bool,
        after: bool,
    },

    #[error("{node} shares its parent {parent} at both times but that parent was edited")]
    SharedParentEdited { node: NodeId, parent: NodeId },

    #[error("{node} is {node_type} but its {time} parent is neither IF nor ELIF")]
    InvalidChainParent {
        node: NodeId,
        node_type: NodeType,
        time: Time,
    },

    #[error("{node} is {node_type} but its formula presence is wrong (formula expected: {expected})")]
    FormulaMismatch {
        node: NodeId,
        node_type: NodeType,
        expected: bool,
    },
}

/// A variation diff: an arena of [`DiffNode`]s below a synthetic root.
#[derive(Debug, Clone)]
pub struct VariationDiff {
    nodes: Vec<DiffNode>,
    root: NodeId,
}

impl Default for VariationDiff {
    fn default() -> Self {
        Self::new()
    }
}

impl VariationDiff {
    /// A variation diff containing only the root.
    pub fn new() -> Self {
        Self {
            nodes: vec![DiffNode::root()],
            root: NodeId(0),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &DiffNode {
        &self.nodes[id.0]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut DiffNode {
        &mut self.nodes[id.0]
    }

    /// Number of nodes, the root included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// All nodes in creation order, the root first.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &DiffNode)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (NodeId(index), node))
    }

    pub(crate) fn push_node(&mut self, node: DiffNode) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    /// Create a detached node.
    ///
    /// # Errors
    ///
    /// * `ConsistencyError::FormulaMismatch` - `formula` is present but
    ///   `node_type` is not `IF`/`ELIF`, or the other way round
    pub fn create_node(
        &mut self,
        diff_type: DiffType,
        node_type: NodeType,
        from: DiffLineNumber,
        to: DiffLineNumber,
        formula: Option<Formula>,
        label: Vec<String>,
    ) -> Result<NodeId, ConsistencyError> {
        let expected = node_type.is_conditional_annotation();
        if formula.is_some() != expected {
            return Err(ConsistencyError::FormulaMismatch {
                node: NodeId(self.nodes.len()),
                node_type,
                expected,
            });
        }
        Ok(self.push_node(DiffNode::new(
            diff_type, node_type, from, to, formula, label,
        )))
    }

    pub fn parent(&self, id: NodeId, time: Time) -> Option<NodeId> {
        self.node(id).parent(time)
    }

    pub fn children(&self, id: NodeId, time: Time) -> &[NodeId] {
        self.node(id).children(time)
    }

    /// Children at either time, before-children first, without duplicates.
    pub fn all_children(&self, id: NodeId) -> Vec<NodeId> {
        let node = self.node(id);
        let mut children = node.children(Time::Before).to_vec();
        for &child in node.children(Time::After) {
            if !children.contains(&child) {
                children.push(child);
            }
        }
        children
    }

    /// Append `child` to the children of `parent` at `time`.
    ///
    /// # Errors
    ///
    /// * `ConsistencyError::NotExistingAt` - one of the nodes does not exist at `time`
    /// * `ConsistencyError::AlreadyHasParent` - `child` already has a parent at `time`
    /// * `ConsistencyError::RootHasParent` - `child` is the root
    pub fn add_child(
        &mut self,
        parent: NodeId,
        child: NodeId,
        time: Time,
    ) -> Result<(), ConsistencyError> {
        if child == self.root {
            return Err(ConsistencyError::RootHasParent);
        }
        for node in [parent, child] {
            if !self.node(node).exists_at(time) {
                return Err(ConsistencyError::NotExistingAt { node, time });
            }
        }
        if self.node(child).parent(time).is_some() {
            return Err(ConsistencyError::AlreadyHasParent { node: child, time });
        }

        self.link(parent, child, time);
        Ok(())
    }

    /// Append `child` to `parent` at `time` without checking any invariant.
    pub(crate) fn link(&mut self, parent: NodeId, child: NodeId, time: Time) {
        self.node_mut(parent).children_mut(time).push(child);
        self.node_mut(child).set_parent(time, Some(parent));
    }

    /// Attach `child` below `before_parent` and `after_parent` at every
    /// time `child` exists.
    pub fn add_below(
        &mut self,
        child: NodeId,
        before_parent: NodeId,
        after_parent: NodeId,
    ) -> Result<(), ConsistencyError> {
        let diff_type = self.node(child).diff_type();
        for time in diff_type.times() {
            let parent = match time {
                Time::Before => before_parent,
                Time::After => after_parent,
            };
            self.add_child(parent, child, time)?;
        }
        Ok(())
    }

    /// Detach `child` from `parent` at `time`.
    ///
    /// Returns false if `child` was not a child of `parent` at `time`.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId, time: Time) -> bool {
        let children = self.node_mut(parent).children_mut(time);
        let Some(position) = children.iter().position(|&c| c == child) else {
            return false;
        };
        children.remove(position);
        self.node_mut(child).set_parent(time, None);
        true
    }

    /// The variation tree at `time` in preorder, starting at the root.
    pub fn preorder(&self, time: Time) -> Vec<NodeId> {
        self.collect_preorder(|id| self.children(id, time).to_vec())
    }

    /// Every node reachable at either time, each once, in preorder over
    /// [`VariationDiff::all_children`].
    pub fn preorder_all(&self) -> Vec<NodeId> {
        self.collect_preorder(|id| self.all_children(id))
    }

    fn collect_preorder<F>(&self, children_of: F) -> Vec<NodeId>
    where
        F: Fn(NodeId) -> Vec<NodeId>,
    {
        let mut visited = vec![false; self.nodes.len()];
        let mut order = Vec::new();
        let mut stack = vec![self.root];

        while let Some(id) = stack.pop() {
            if std::mem::replace(&mut visited[id.0], true) {
                continue;
            }
            order.push(id);
            stack.extend(children_of(id).into_iter().rev());
        }
        order
    }

    /// Length of the path from the root to `id` at `time`.
    ///
    /// Returns `None` if `id` is not connected to the root at `time`.
    pub fn depth(&self, id: NodeId, time: Time) -> Option<usize> {
        let mut depth = 0;
        let mut current = id;
        while current != self.root {
            current = self.parent(current, time)?;
            depth += 1;
            if depth > self.nodes.len() {
                return None;
            }
        }
        Some(depth)
    }

    /// The closest `IF` on the path from `id` to the root at `time`, `id` included.
    pub fn if_node(&self, id: NodeId, time: Time) -> Option<NodeId> {
        let mut current = id;
        for _ in 0..=self.nodes.len() {
            if self.node(current).is_if() {
                return Some(current);
            }
            current = self.parent(current, time)?;
        }
        None
    }

    /// The feature mapping of `id` at `time`.
    ///
    /// `IF` nodes are mapped to their formula. `ELIF` and `ELSE` nodes are
    /// mapped to their own formula (for `ELIF`) conjoined with the negated
    /// formulas of all earlier branches of their chain. Artifacts inherit
    /// the feature mapping of their parent.
    ///
    /// Returns `None` if `id` does not exist at `time` or its chain is malformed.
    pub fn feature_mapping(&self, id: NodeId, time: Time) -> Option<Formula> {
        self.feature_mapping_clauses(id, time).map(Formula::and)
    }

    /// The presence condition of `id` at `time`: the conjunction of the
    /// feature mappings on the path to the root, where a chain's earlier
    /// branches contribute their negations.
    ///
    /// Returns `None` if `id` does not exist at `time` or its chain is malformed.
    pub fn presence_condition(&self, id: NodeId, time: Time) -> Option<Formula> {
        self.presence_condition_clauses(id, time).map(Formula::and)
    }

    fn feature_mapping_clauses(&self, id: NodeId, time: Time) -> Option<Vec<Formula>> {
        let node = self.node(id);
        if !node.exists_at(time) {
            return None;
        }

        match node.node_type() {
            NodeType::If => Some(vec![node.formula()?.clone()]),
            NodeType::Artifact => self.feature_mapping_clauses(self.parent(id, time)?, time),
            NodeType::Elif | NodeType::Else => {
                let mut clauses = Vec::new();
                if let Some(formula) = node.formula() {
                    clauses.push(formula.clone());
                }

                let mut ancestor = self.parent(id, time)?;
                loop {
                    let ancestor_node = self.node(ancestor);
                    match ancestor_node.node_type() {
                        NodeType::Elif => {
                            clauses.push(Formula::not(ancestor_node.formula()?.clone()));
                            ancestor = self.parent(ancestor, time)?;
                        }
                        NodeType::If => {
                            clauses.push(Formula::not(ancestor_node.formula()?.clone()));
                            break;
                        }
                        _ => return None,
                    }
                }
                Some(clauses)
            }
        }
    }

    fn presence_condition_clauses(&self, id: NodeId, time: Time) -> Option<Vec<Formula>> {
        let node = self.node(id);
        if !node.exists_at(time) {
            return None;
        }
        let parent = self.parent(id, time);

        match node.node_type() {
            NodeType::Elif | NodeType::Else => {
                let mut clauses = self.feature_mapping_clauses(id, time)?;
                let chain_start = self.if_node(parent?, time)?;
                if let Some(outer) = self.parent(chain_start, time) {
                    clauses.extend(self.presence_condition_clauses(outer, time)?);
                }
                Some(clauses)
            }
            NodeType::Artifact => self.presence_condition_clauses(parent?, time),
            NodeType::If => {
                let mut clauses = match parent {
                    Some(parent) => self.presence_condition_clauses(parent, time)?,
                    None => Vec::new(),
                };
                clauses.push(node.formula()?.clone());
                Some(clauses)
            }
        }
    }

    /// Check the structural invariants of every node.
    ///
    /// * parent and child edges agree with each other at both times
    /// * nodes with only a before-parent are removed, nodes with only an
    ///   after-parent are added, nodes with both are unchanged
    /// * a parent shared by both times is unchanged
    /// * parents of `ELSE`/`ELIF` are `IF` or `ELIF`
    /// * exactly `IF`/`ELIF` nodes carry a formula
    pub fn check_consistency(&self) -> Result<(), ConsistencyError> {
        for (id, node) in self.iter() {
            for time in Time::ALL {
                for &child in node.children(time) {
                    if self.parent(child, time) != Some(id) {
                        return Err(ConsistencyError::MissingParentEdge {
                            parent: id,
                            child,
                            time,
                        });
                    }
                }
                if let Some(parent) = node.parent(time) {
                    if !self.children(parent, time).contains(&id) {
                        return Err(ConsistencyError::MissingChildEdge {
                            node: id,
                            parent,
                            time,
                        });
                    }
                }
            }

            let before = node.parent(Time::Before);
            let after = node.parent(Time::After);
            if id == self.root {
                if before.is_some() || after.is_some() {
                    return Err(ConsistencyError::RootHasParent);
                }
            } else {
                let expected = match (before.is_some(), after.is_some()) {
                    (true, true) => Some(DiffType::Unchanged),
                    (true, false) => Some(DiffType::Removed),
                    (false, true) => Some(DiffType::Added),
                    (false, false) => None,
                };
                if expected.is_some_and(|expected| expected != node.diff_type()) {
                    return Err(ConsistencyError::ParentsContradictDiffType {
                        node: id,
                        diff_type: node.diff_type(),
                        before: before.is_some(),
                        after: after.is_some(),
                    });
                }
            }

            if let (Some(before), Some(after)) = (before, after) {
                if before == after && self.node(before).diff_type() != DiffType::Unchanged {
                    return Err(ConsistencyError::SharedParentEdited {
                        node: id,
                        parent: before,
                    });
                }
            }

            if node.is_else() || node.is_elif() {
                for time in Time::ALL {
                    if let Some(parent) = node.parent(time) {
                        let parent = self.node(parent);
                        if !(parent.is_if() || parent.is_elif()) {
                            return Err(ConsistencyError::InvalidChainParent {
                                node: id,
                                node_type: node.node_type(),
                                time,
                            });
                        }
                    }
                }
            }

            let expected = node.node_type().is_conditional_annotation();
            if node.formula().is_some() != expected {
                return Err(ConsistencyError::FormulaMismatch {
                    node: id,
                    node_type: node.node_type(),
                    expected,
                });
            }
        }
        Ok(())
    }
}

impl Index<NodeId> for VariationDiff {
    type Output = DiffNode;

    fn index(&self, id: NodeId) -> &DiffNode {
        self.node(id)
    }
}
