//! Line graph text format.
//!
//! A line graph file holds any number of variation diffs:
//!
//! ```text
//! t # <name>
//! v <id> <DIFF>_<NODE>_<label>
//! e <child id> <parent id> <ba|b|a>
//! ```
//!
//! Node ids are packed ids (see [`DecodedId`]). Edges point from child to
//! parent and are labelled with the times at which the parent holds:
//! `b` before the edit, `a` after it, `ba` at both. Labels are the node's
//! source lines joined by newlines, with `\` and newlines escaped.

use std::collections::{HashMap, HashSet};
use std::fmt::Write;

use crate::diff::{DiffLineNumber, DiffType, Time};
use crate::error::{Result, VdiffError};
use crate::formula::FormulaParser;
use crate::tree::{DecodedId, NodeId, NodeType, VariationDiff};

pub const TREE_HEADER: &str = "t #";
pub const NODE: &str = "v";
pub const EDGE: &str = "e";
pub const BEFORE_AND_AFTER_PARENT: &str = "ba";
pub const BEFORE_PARENT: &str = "b";
pub const AFTER_PARENT: &str = "a";

/// Render `diff` as one line graph tree named `name`.
///
/// Nodes are listed in preorder over both times, followed by all edges.
pub fn export(name: &str, diff: &VariationDiff) -> String {
    let mut out = String::new();
    // Writing to a String cannot fail.
    let _ = writeln!(out, "{} {}", TREE_HEADER, name);

    let order = diff.preorder_all();
    for &id in &order {
        let node = diff.node(id);
        let _ = writeln!(
            out,
            "{} {} {}_{}_{}",
            NODE,
            node.id(),
            node.diff_type().as_str(),
            node.node_type().as_str(),
            escape(&node.label_text())
        );
    }

    for &id in &order {
        let node = diff.node(id);
        let before = node.parent(Time::Before);
        let after = node.parent(Time::After);
        let edges: Vec<(NodeId, &str)> = match (before, after) {
            (Some(b), Some(a)) if b == a => vec![(b, BEFORE_AND_AFTER_PARENT)],
            (b, a) => b
                .map(|b| (b, BEFORE_PARENT))
                .into_iter()
                .chain(a.map(|a| (a, AFTER_PARENT)))
                .collect(),
        };
        for (parent, label) in edges {
            let _ = writeln!(
                out,
                "{} {} {} {}",
                EDGE,
                node.id(),
                diff.node(parent).id(),
                label
            );
        }
    }

    out
}

/// Render several named variation diffs into one line graph.
pub fn export_all<'a, I>(trees: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a VariationDiff)>,
{
    trees
        .into_iter()
        .map(|(name, diff)| export(name, diff))
        .collect()
}

/// Read every tree of a line graph.
///
/// Annotation formulas are recovered by running `formula_parser` on the
/// node labels. Line numbers other than the start line in the diff are
/// not stored in a line graph and come back invalid.
///
/// # Errors
///
/// Returns `VdiffError::InvalidLineGraph` for malformed records, dangling
/// or contradictory edges, and trees without exactly one root.
pub fn import(text: &str, formula_parser: &dyn FormulaParser) -> Result<Vec<(String, VariationDiff)>> {
    let mut trees = Vec::new();
    let mut current: Option<PendingTree> = None;

    for (index, line) in text.lines().enumerate() {
        let line_number = index + 1;
        if let Some(name) = line.strip_prefix(TREE_HEADER) {
            if let Some(tree) = current.take() {
                trees.push(tree.build(formula_parser)?);
            }
            current = Some(PendingTree::new(name.trim(), line_number));
        } else if let Some(record) = line.strip_prefix(NODE) {
            let tree = tree_or_err(&mut current, line_number)?;
            tree.nodes.push(parse_node(record, line_number)?);
        } else if let Some(record) = line.strip_prefix(EDGE) {
            let tree = tree_or_err(&mut current, line_number)?;
            tree.edges.push(parse_edge(record, line_number)?);
        } else if !line.trim().is_empty() {
            return Err(invalid(
                line_number,
                format!(
                    "expected \"{}\", \"{}\" or \"{}\" but got \"{}\"",
                    TREE_HEADER, NODE, EDGE, line
                ),
            ));
        }
    }

    if let Some(tree) = current {
        trees.push(tree.build(formula_parser)?);
    }
    Ok(trees)
}

struct PendingNode {
    id: u64,
    decoded: DecodedId,
    label: Vec<String>,
    line: usize,
}

struct PendingEdge {
    child: u64,
    parent: u64,
    times: &'static [Time],
    line: usize,
}

struct PendingTree {
    name: String,
    line: usize,
    nodes: Vec<PendingNode>,
    edges: Vec<PendingEdge>,
}

impl PendingTree {
    fn new(name: &str, line: usize) -> Self {
        Self {
            name: name.to_string(),
            line,
            nodes: Vec::new(),
            edges: Vec::new(),
        }
    }

    fn build(self, formula_parser: &dyn FormulaParser) -> Result<(String, VariationDiff)> {
        let mut seen = HashSet::new();
        if let Some(duplicate) = self.nodes.iter().find(|node| !seen.insert(node.id)) {
            return Err(invalid(
                duplicate.line,
                format!("duplicate node id {}", duplicate.id),
            ));
        }

        let children: HashSet<u64> = self.edges.iter().map(|edge| edge.child).collect();
        let mut roots = self.nodes.iter().filter(|node| !children.contains(&node.id));
        let root = match (roots.next(), roots.next()) {
            (Some(root), None) => root,
            (None, _) => return Err(invalid(self.line, "tree has no root".to_string())),
            (Some(first), Some(second)) => {
                return Err(invalid(
                    second.line,
                    format!("tree has more than one root: {} and {}", first.id, second.id),
                ));
            }
        };
        if root.decoded.node_type != NodeType::If {
            return Err(invalid(
                root.line,
                format!("node {} has no parent but is not an IF", root.id),
            ));
        }

        let mut diff = VariationDiff::new();
        let mut ids: HashMap<u64, NodeId> = HashMap::new();
        ids.insert(root.id, diff.root());

        for node in &self.nodes {
            if node.id == root.id {
                continue;
            }
            let formula = if node.decoded.node_type.is_conditional_annotation() {
                let text = directive_text(&node.label);
                let formula = formula_parser
                    .parse(&text)
                    .map_err(|e| invalid(node.line, e.to_string()))?;
                Some(formula)
            } else {
                None
            };
            let from = DiffLineNumber::new(
                node.decoded.from_in_diff,
                DiffLineNumber::INVALID,
                DiffLineNumber::INVALID,
            );
            let created = diff
                .create_node(
                    node.decoded.diff_type,
                    node.decoded.node_type,
                    from,
                    DiffLineNumber::invalid(),
                    formula,
                    node.label.clone(),
                )
                .map_err(|e| invalid(node.line, e.to_string()))?;
            ids.insert(node.id, created);
        }

        for edge in &self.edges {
            let lookup = |id: u64| {
                ids.get(&id)
                    .copied()
                    .ok_or_else(|| invalid(edge.line, format!("node {} does not exist", id)))
            };
            let child = lookup(edge.child)?;
            let parent = lookup(edge.parent)?;
            for &time in edge.times {
                diff.add_child(parent, child, time)
                    .map_err(|e| invalid(edge.line, e.to_string()))?;
            }
        }

        Ok((self.name, diff))
    }
}

fn tree_or_err(current: &mut Option<PendingTree>, line: usize) -> Result<&mut PendingTree> {
    current
        .as_mut()
        .ok_or_else(|| invalid(line, format!("record before the first \"{}\"", TREE_HEADER)))
}

fn parse_node(record: &str, line: usize) -> Result<PendingNode> {
    let record = record
        .strip_prefix(' ')
        .ok_or_else(|| invalid(line, "malformed node record".to_string()))?;
    let (id, label) = record
        .split_once(' ')
        .ok_or_else(|| invalid(line, "node record has no label".to_string()))?;
    let id: u64 = id
        .parse()
        .map_err(|_| invalid(line, format!("node id is not an integer: '{}'", id)))?;
    let decoded =
        DecodedId::decode(id).ok_or_else(|| invalid(line, format!("invalid node id {}", id)))?;

    let mut parts = label.splitn(3, '_');
    let diff_type = parts.next().and_then(DiffType::from_tag);
    let node_type = parts.next().and_then(NodeType::from_tag);
    let text = parts.next().unwrap_or("");
    if diff_type != Some(decoded.diff_type) || node_type != Some(decoded.node_type) {
        return Err(invalid(
            line,
            format!("label '{}' does not match node id {}", label, id),
        ));
    }

    Ok(PendingNode {
        id,
        decoded,
        label: unescape(text).split('\n').map(str::to_string).collect(),
        line,
    })
}

fn parse_edge(record: &str, line: usize) -> Result<PendingEdge> {
    let fields: Vec<&str> = record.split_whitespace().collect();
    let [child, parent, label] = fields.as_slice() else {
        return Err(invalid(line, "edge record needs child, parent and label".to_string()));
    };
    let parse_id = |field: &str| {
        field
            .parse::<u64>()
            .map_err(|_| invalid(line, format!("node id is not an integer: '{}'", field)))
    };
    let times: &'static [Time] = match *label {
        BEFORE_AND_AFTER_PARENT => &Time::ALL,
        BEFORE_PARENT => &[Time::Before],
        AFTER_PARENT => &[Time::After],
        other => return Err(invalid(line, format!("invalid edge label '{}'", other))),
    };
    Ok(PendingEdge {
        child: parse_id(child)?,
        parent: parse_id(parent)?,
        times,
        line,
    })
}

/// The label as one directive line, continuation backslashes removed.
fn directive_text(label: &[String]) -> String {
    label
        .iter()
        .map(|line| line.strip_suffix('\\').unwrap_or(line.as_str()))
        .collect()
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            c => escaped.push(c),
        }
    }
    escaped
}

fn unescape(text: &str) -> String {
    let mut unescaped = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            unescaped.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => unescaped.push('\n'),
            Some('r') => unescaped.push('\r'),
            Some(other) => unescaped.push(other),
            None => unescaped.push('\\'),
        }
    }
    unescaped
}

fn invalid(line: usize, message: String) -> VdiffError {
    VdiffError::InvalidLineGraph { line, message }
}
