//! CLI argument parsing for vdiff.
//!
//! Uses clap derive macros for declarative argument definitions.
//! This module defines the command structure; actual implementations
//! are in the `commands` module.

use crate::config::OutputFormat;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// vdiff: mine edits to conditional-compilation annotations from text diffs.
///
/// A diff of a C/C++ file is parsed into a variation diff: a tree of
/// `#if`/`#elif`/`#else` annotations and code artifacts that records, for
/// every element, whether it was added, removed or left unchanged and
/// where it is nested before and after the edit.
#[derive(Parser, Debug)]
#[command(name = "vdiff")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands for vdiff.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Parse a full diff into a variation diff.
    ///
    /// Every line of the input must carry a diff marker, including the
    /// unchanged lines a unified diff omits. Reads stdin when FILE is omitted.
    Parse(ParseArgs),

    /// Parse a plain source file into a variation tree.
    ///
    /// All lines are treated as unchanged.
    Tree(TreeArgs),

    /// Apply hunks to a pre-image and parse the resulting full diff.
    Patch(PatchArgs),

    /// Parse every matching file changed by a commit.
    ///
    /// Files whose patch cannot be parsed are reported and skipped;
    /// the scan continues with the next file.
    Commit(CommitArgs),

    /// Read variation diffs back from a line graph file.
    Import(ImportArgs),
}

/// Parser and output options shared by all commands.
#[derive(Args, Debug, Clone, Default)]
pub struct CommonArgs {
    /// Config file (default: ./vdiff.yaml if present).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Merge consecutive code lines of the same diff type into one node.
    #[arg(long)]
    pub collapse: bool,

    /// Skip blank lines.
    #[arg(long)]
    pub ignore_empty: bool,

    /// Text that starts a directive (e.g. "#" or "//#").
    #[arg(long)]
    pub introducer: Option<String>,

    /// Output format.
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Append NDJSON events to this file.
    #[arg(long)]
    pub events: Option<PathBuf>,
}

/// Arguments for the `parse` command.
#[derive(Parser, Debug)]
pub struct ParseArgs {
    /// Full diff to parse (stdin when omitted).
    pub file: Option<PathBuf>,

    #[command(flatten)]
    pub common: CommonArgs,
}

/// Arguments for the `tree` command.
#[derive(Parser, Debug)]
pub struct TreeArgs {
    /// Source file to parse (stdin when omitted).
    pub file: Option<PathBuf>,

    #[command(flatten)]
    pub common: CommonArgs,
}

/// Arguments for the `patch` command.
#[derive(Parser, Debug)]
pub struct PatchArgs {
    /// The file before the edit.
    #[arg(long)]
    pub before: PathBuf,

    /// Unified diff of the file, with any amount of context.
    pub diff: PathBuf,

    #[command(flatten)]
    pub common: CommonArgs,
}

/// Arguments for the `commit` command.
#[derive(Parser, Debug)]
pub struct CommitArgs {
    /// Commit to analyse (any revision git understands).
    pub rev: String,

    /// Repository to read from (default: current directory).
    #[arg(long)]
    pub repo: Option<PathBuf>,

    #[command(flatten)]
    pub common: CommonArgs,
}

/// Arguments for the `import` command.
#[derive(Parser, Debug)]
pub struct ImportArgs {
    /// Line graph file.
    pub file: PathBuf,

    #[command(flatten)]
    pub common: CommonArgs,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
