//! Indented plain-text rendering of a variation diff.

use std::fmt::Write;

use crate::diff::{DiffType, Time};
use crate::tree::{NodeId, VariationDiff};

const INDENT: &str = "  ";

/// Render `diff` as an indented outline, one node per line.
///
/// A node whose parent differs between the times appears under each
/// parent, tagged with the time that edge belongs to.
pub fn render(diff: &VariationDiff) -> String {
    let mut out = String::new();
    let mut path = Vec::new();
    render_node(diff, diff.root(), None, 0, &mut path, &mut out);
    out
}

fn render_node(
    diff: &VariationDiff,
    id: NodeId,
    only_at: Option<Time>,
    depth: usize,
    path: &mut Vec<NodeId>,
    out: &mut String,
) {
    let node = diff.node(id);
    let _ = write!(
        out,
        "{}{} {} {}",
        INDENT.repeat(depth),
        node.diff_type().as_str(),
        node.node_type().as_str(),
        describe(diff, id)
    );
    if let Some(time) = only_at {
        let _ = write!(out, " [{}]", time);
    }
    out.push('\n');

    path.push(id);
    for child in diff.all_children(id) {
        // a node moved below one of its own descendants
        if path.contains(&child) {
            continue;
        }
        let before = diff.parent(child, Time::Before) == Some(id);
        let after = diff.parent(child, Time::After) == Some(id);
        let child_is_split = diff.node(child).diff_type() == DiffType::Unchanged && before != after;
        let tag = match (child_is_split, before) {
            (false, _) => None,
            (true, true) => Some(Time::Before),
            (true, false) => Some(Time::After),
        };
        render_node(diff, child, tag, depth + 1, path, out);
    }
    path.pop();
}

fn describe(diff: &VariationDiff, id: NodeId) -> String {
    let node = diff.node(id);
    if id == diff.root() {
        return "(root)".to_string();
    }
    if let Some(formula) = node.formula() {
        return formula.to_string();
    }
    match node.label() {
        [] => String::new(),
        [line] => format!("\"{}\"", line.trim()),
        [first, rest @ ..] => format!("\"{}\" (+{} lines)", first.trim(), rest.len()),
    }
}
