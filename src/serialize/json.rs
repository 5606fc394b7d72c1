//! JSON view of a variation diff.

use serde::{Deserialize, Serialize};

use crate::diff::{DiffLineNumber, DiffType, Time};
use crate::tree::{NodeType, VariationDiff};

/// A variation diff as a flat node list in preorder, root first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonTree {
    pub nodes: Vec<JsonNode>,
}

/// One node of a [`JsonTree`]. Parents are referenced by packed id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonNode {
    pub id: u64,
    pub diff_type: DiffType,
    pub node_type: NodeType,
    pub from: DiffLineNumber,
    pub to: DiffLineNumber,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub formula: Option<String>,
    pub label: Vec<String>,
    pub before_parent: Option<u64>,
    pub after_parent: Option<u64>,
}

impl JsonTree {
    pub fn from_diff(diff: &VariationDiff) -> Self {
        let nodes = diff
            .preorder_all()
            .into_iter()
            .map(|id| {
                let node = diff.node(id);
                let parent_id = |time| node.parent(time).map(|parent| diff.node(parent).id());
                JsonNode {
                    id: node.id(),
                    diff_type: node.diff_type(),
                    node_type: node.node_type(),
                    from: node.from(),
                    to: node.to(),
                    formula: node.formula().map(ToString::to_string),
                    label: node.label().to_vec(),
                    before_parent: parent_id(Time::Before),
                    after_parent: parent_id(Time::After),
                }
            })
            .collect();
        Self { nodes }
    }
}

/// Pretty-printed JSON of `diff`.
pub fn to_json(diff: &VariationDiff) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&JsonTree::from_diff(diff))
}
