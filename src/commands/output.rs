//! Rendering of parsed variation diffs in the selected output format.

use crate::config::OutputFormat;
use crate::error::{Result, VdiffError};
use crate::serialize::{JsonTree, linegraph, render};
use crate::tree::VariationDiff;
use serde::Serialize;

#[derive(Serialize)]
struct NamedTree<'a> {
    name: &'a str,
    #[serde(flatten)]
    tree: JsonTree,
}

/// Render named variation diffs.
///
/// * text: one outline per tree, each below a `== name ==` header
/// * json: an array of `{"name": ..., "nodes": [...]}` objects
/// * linegraph: one `t # name` block per tree
pub fn render_trees(format: OutputFormat, trees: &[(String, VariationDiff)]) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(trees
            .iter()
            .map(|(name, diff)| format!("== {} ==\n{}", name, render(diff)))
            .collect()),
        OutputFormat::Json => {
            let named: Vec<NamedTree<'_>> = trees
                .iter()
                .map(|(name, diff)| NamedTree {
                    name,
                    tree: JsonTree::from_diff(diff),
                })
                .collect();
            let mut json = serde_json::to_string_pretty(&named).map_err(|e| {
                VdiffError::UserError(format!("failed to serialize output to JSON: {}", e))
            })?;
            json.push('\n');
            Ok(json)
        }
        OutputFormat::Linegraph => Ok(linegraph::export_all(
            trees.iter().map(|(name, diff)| (name.as_str(), diff)),
        )),
    }
}
