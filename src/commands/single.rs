//! Implementation of the single-input commands `parse`, `tree` and `patch`.

use super::{Settings, current_dir, read_file, read_input, render_trees};
use crate::cli::{ParseArgs, PatchArgs, TreeArgs};
use crate::diff::{full_diff, split_file_diffs};
use crate::error::{DiffParseError, Result, VdiffError};
use crate::events::{Event, EventAction};
use crate::parse::{parse_diff, parse_variation_tree};
use crate::tree::VariationDiff;
use serde_json::json;

/// Execute the `vdiff parse` command.
pub fn cmd_parse(args: ParseArgs) -> Result<()> {
    let settings = Settings::resolve(&args.common, &current_dir()?)?;
    let (name, input) = read_input(args.file.as_deref())?;
    let result = parse_diff(&input, &settings.options);
    finish(&settings, name, result)
}

/// Execute the `vdiff tree` command.
pub fn cmd_tree(args: TreeArgs) -> Result<()> {
    let settings = Settings::resolve(&args.common, &current_dir()?)?;
    let (name, input) = read_input(args.file.as_deref())?;
    let result = parse_variation_tree(&input, &settings.options);
    finish(&settings, name, result)
}

/// Execute the `vdiff patch` command.
///
/// The diff may carry file headers and any amount of context. Only a
/// diff of a single file is accepted.
pub fn cmd_patch(args: PatchArgs) -> Result<()> {
    let settings = Settings::resolve(&args.common, &current_dir()?)?;
    let before = read_file(&args.before)?;
    let diff = read_file(&args.diff)?;

    let full = patch_to_full_diff(&before, &diff)?;
    let result = parse_diff(&full, &settings.options);
    finish(&settings, args.diff.display().to_string(), result)
}

/// The full diff of a single-file unified diff applied to `before`.
pub(super) fn patch_to_full_diff(before: &str, diff: &str) -> Result<String> {
    let mut files = split_file_diffs(diff);
    if files.len() > 1 {
        return Err(VdiffError::UserError(format!(
            "expected a diff of one file, found {} files",
            files.len()
        )));
    }
    match files.pop() {
        Some(file) => full_diff(before, &file.hunks),
        None => full_diff(before, ""),
    }
}

/// Log the outcome, then print the tree or return the parse error.
fn finish(
    settings: &Settings,
    name: String,
    result: std::result::Result<VariationDiff, DiffParseError>,
) -> Result<()> {
    if let Some(log) = &settings.events {
        let event = match &result {
            Ok(diff) => Event::new(EventAction::PatchParsed)
                .with_file(name.as_str())
                .with_details(json!({ "nodes": diff.node_count() })),
            Err(err) => Event::new(EventAction::PatchFailed)
                .with_file(name.as_str())
                .with_details(json!({ "error": err.to_string() })),
        };
        log.append(&event)?;
    }

    let diff = result?;
    print!("{}", render_trees(settings.format, &[(name, diff)])?);
    Ok(())
}
