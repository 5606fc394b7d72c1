//! Nodes of a variation diff.

use crate::diff::{DiffLineNumber, DiffType, Time};
use crate::formula::Formula;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::id::DecodedId;

/// The kind of source element a node stands for.
///
/// The declaration order fixes the ordinals used by packed node ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeType {
    If,
    Else,
    Elif,
    /// A span of ordinary code.
    Artifact,
}

impl NodeType {
    /// All node types in ordinal order.
    pub const ALL: [NodeType; 4] = [
        NodeType::If,
        NodeType::Else,
        NodeType::Elif,
        NodeType::Artifact,
    ];

    /// Number of bits a node type occupies in a packed node id.
    pub const BIT_COUNT: u32 = 3;

    /// Map a directive keyword to the annotation it opens.
    ///
    /// `endif` closes annotations and has no node type.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "if" => Some(NodeType::If),
            "elif" => Some(NodeType::Elif),
            "else" => Some(NodeType::Else),
            _ => None,
        }
    }

    /// `IF`, `ELIF` and `ELSE` are annotations.
    pub fn is_annotation(self) -> bool {
        self != NodeType::Artifact
    }

    /// `IF` and `ELIF` carry a condition.
    pub fn is_conditional_annotation(self) -> bool {
        matches!(self, NodeType::If | NodeType::Elif)
    }

    /// Upper-case tag used in labels and text output.
    pub fn as_str(self) -> &'static str {
        match self {
            NodeType::If => "IF",
            NodeType::Else => "ELSE",
            NodeType::Elif => "ELIF",
            NodeType::Artifact => "ARTIFACT",
        }
    }

    /// Parse a tag produced by [`NodeType::as_str`].
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|node_type| node_type.as_str() == tag)
    }

    pub fn ordinal(self) -> u32 {
        self as u32
    }

    pub fn from_ordinal(ordinal: u32) -> Option<Self> {
        Self::ALL.get(ordinal as usize).copied()
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Index of a node in the arena of its [`VariationDiff`](super::VariationDiff).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node {}", self.0)
    }
}

/// A node of a variation diff.
///
/// Every node has one parent and one ordered child list per [`Time`].
/// An unchanged node is linked at both times, an added node only after
/// the edit and a removed node only before it.
#[derive(Debug, Clone)]
pub struct DiffNode {
    diff_type: DiffType,
    node_type: NodeType,
    from: DiffLineNumber,
    to: DiffLineNumber,
    formula: Option<Formula>,
    label: Vec<String>,
    parents: [Option<NodeId>; 2],
    children: [Vec<NodeId>; 2],
}

impl DiffNode {
    pub(crate) fn new(
        diff_type: DiffType,
        node_type: NodeType,
        from: DiffLineNumber,
        to: DiffLineNumber,
        formula: Option<Formula>,
        label: Vec<String>,
    ) -> Self {
        Self {
            diff_type,
            node_type,
            from,
            to,
            formula,
            label,
            parents: [None, None],
            children: [Vec::new(), Vec::new()],
        }
    }

    /// The synthetic root: an unchanged `IF` with formula `True`.
    pub(crate) fn root() -> Self {
        Self::new(
            DiffType::Unchanged,
            NodeType::If,
            DiffLineNumber::invalid(),
            DiffLineNumber::invalid(),
            Some(Formula::True),
            Vec::new(),
        )
    }

    pub fn diff_type(&self) -> DiffType {
        self.diff_type
    }

    pub fn node_type(&self) -> NodeType {
        self.node_type
    }

    /// First line of this node (inclusive).
    pub fn from(&self) -> DiffLineNumber {
        self.from
    }

    /// End of this node (exclusive).
    pub fn to(&self) -> DiffLineNumber {
        self.to
    }

    /// The condition of an `IF` or `ELIF`; `None` for every other node type.
    pub fn formula(&self) -> Option<&Formula> {
        self.formula.as_ref()
    }

    /// The source lines of this node, without diff markers.
    pub fn label(&self) -> &[String] {
        &self.label
    }

    /// The source lines joined by newlines.
    pub fn label_text(&self) -> String {
        self.label.join("\n")
    }

    pub fn parent(&self, time: Time) -> Option<NodeId> {
        self.parents[time.index()]
    }

    pub fn children(&self, time: Time) -> &[NodeId] {
        &self.children[time.index()]
    }

    pub fn exists_at(&self, time: Time) -> bool {
        self.diff_type.exists_at(time)
    }

    pub fn is_if(&self) -> bool {
        self.node_type == NodeType::If
    }

    pub fn is_elif(&self) -> bool {
        self.node_type == NodeType::Elif
    }

    pub fn is_else(&self) -> bool {
        self.node_type == NodeType::Else
    }

    pub fn is_artifact(&self) -> bool {
        self.node_type == NodeType::Artifact
    }

    pub fn is_annotation(&self) -> bool {
        self.node_type.is_annotation()
    }

    /// Returns true iff this node has no children at either time.
    pub fn is_leaf(&self) -> bool {
        self.children.iter().all(Vec::is_empty)
    }

    /// Packed identifier of this node. See [`DecodedId`].
    pub fn id(&self) -> u64 {
        DecodedId::encode(self.node_type, self.diff_type, self.from.in_diff)
    }

    pub(crate) fn set_to(&mut self, to: DiffLineNumber) {
        self.to = to;
    }

    pub(crate) fn extend_label<I: IntoIterator<Item = String>>(&mut self, lines: I) {
        self.label.extend(lines);
    }

    pub(crate) fn set_parent(&mut self, time: Time, parent: Option<NodeId>) {
        self.parents[time.index()] = parent;
    }

    pub(crate) fn children_mut(&mut self, time: Time) -> &mut Vec<NodeId> {
        &mut self.children[time.index()]
    }
}

impl fmt::Display for DiffNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}_{} from {} to {}",
            self.diff_type, self.node_type, self.from, self.to
        )?;
        if let Some(formula) = &self.formula {
            write!(f, " with formula {}", formula)?;
        }
        Ok(())
    }
}
