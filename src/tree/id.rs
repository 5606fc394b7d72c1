//! Packed node identifiers.
//!
//! An id stores, from the least significant bit upwards, the node type
//! ordinal, the diff type ordinal, and one plus the node's first line in
//! the diff. The offset maps the invalid line of the root to zero.
//! Ids are unique within a parsed variation diff as long as no two nodes
//! of the same type and diff type start on the same diff line.

use crate::diff::DiffType;

use super::NodeType;

const NODE_TYPE_MASK: u64 = (1 << NodeType::BIT_COUNT) - 1;
const DIFF_TYPE_MASK: u64 = (1 << DiffType::BIT_COUNT) - 1;
const LINE_SHIFT: u32 = NodeType::BIT_COUNT + DiffType::BIT_COUNT;

/// The information a packed node id carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedId {
    pub node_type: NodeType,
    pub diff_type: DiffType,
    /// First line of the node in the diff.
    pub from_in_diff: i32,
}

impl DecodedId {
    pub fn encode(node_type: NodeType, diff_type: DiffType, from_in_diff: i32) -> u64 {
        let line = (i64::from(from_in_diff) + 1).max(0) as u64;
        (line << LINE_SHIFT)
            | (u64::from(diff_type.ordinal()) << NodeType::BIT_COUNT)
            | u64::from(node_type.ordinal())
    }

    /// Unpack `id`, or `None` if it holds an unknown type ordinal or an
    /// out-of-range line.
    pub fn decode(id: u64) -> Option<Self> {
        let node_type = NodeType::from_ordinal((id & NODE_TYPE_MASK) as u32)?;
        let diff_type =
            DiffType::from_ordinal(((id >> NodeType::BIT_COUNT) & DIFF_TYPE_MASK) as u32)?;
        let line = i64::try_from(id >> LINE_SHIFT).ok()? - 1;
        Some(Self {
            node_type,
            diff_type,
            from_in_diff: i32::try_from(line).ok()?,
        })
    }

    pub fn id(&self) -> u64 {
        Self::encode(self.node_type, self.diff_type, self.from_in_diff)
    }
}
