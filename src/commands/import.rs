//! Implementation of the `vdiff import` command.

use super::{Settings, current_dir, read_file, render_trees};
use crate::cli::ImportArgs;
use crate::error::Result;
use crate::serialize::linegraph;

/// Execute the `vdiff import` command.
///
/// Reads every tree of a line graph and prints it in the selected format,
/// recovering annotation formulas with the configured introducer.
pub fn cmd_import(args: ImportArgs) -> Result<()> {
    let settings = Settings::resolve(&args.common, &current_dir()?)?;
    let text = read_file(&args.file)?;
    let trees = linegraph::import(&text, settings.options.formula_parser.as_ref())?;
    print!("{}", render_trees(settings.format, &trees)?);
    Ok(())
}
