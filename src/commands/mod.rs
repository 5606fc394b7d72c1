//! Command implementations for vdiff.
//!
//! This module provides the dispatcher that routes CLI commands to their
//! implementations, and the settings every command derives from its
//! config file and flags.

mod commit;
mod import;
mod output;
mod single;


pub use commit::{CommitScan, FileFailure, scan_commit};
pub use output::render_trees;

use crate::cli::{Command, CommonArgs};
use crate::config::{Config, OutputFormat, PathFilter};
use crate::error::{Result, VdiffError};
use crate::events::EventLog;
use crate::parse::ParseOptions;
use std::path::{Path, PathBuf};

/// Dispatch a command to its implementation.
///
/// This is the main entry point for command execution. Each command
/// is routed to its handler function.
pub fn dispatch(command: Command) -> Result<()> {
    match command {
        Command::Parse(args) => single::cmd_parse(args),
        Command::Tree(args) => single::cmd_tree(args),
        Command::Patch(args) => single::cmd_patch(args),
        Command::Commit(args) => commit::cmd_commit(args),
        Command::Import(args) => import::cmd_import(args),
    }
}

/// Effective settings of a run: the config file with flags applied on top.
#[derive(Debug, Clone)]
pub struct Settings {
    pub options: ParseOptions,
    pub format: OutputFormat,
    pub filter: PathFilter,
    pub events: Option<EventLog>,
}

impl Settings {
    /// Load the config (explicit `--config`, or `vdiff.yaml` in `dir`) and
    /// apply the command-line overrides.
    pub fn resolve(common: &CommonArgs, dir: &Path) -> Result<Self> {
        let mut config = Config::resolve(common.config.as_deref(), dir)?;

        if common.collapse {
            config.collapse_multiple_code_lines = true;
        }
        if common.ignore_empty {
            config.ignore_empty_lines = true;
        }
        if let Some(introducer) = &common.introducer {
            config.annotation_introducer = introducer.clone();
        }
        if let Some(format) = common.format {
            config.format = format;
        }
        config.validate()?;

        let events = common
            .events
            .clone()
            .or_else(|| config.event_log.as_ref().map(|log| dir.join(log)))
            .map(EventLog::new);

        Ok(Self {
            options: config.parse_options()?,
            format: config.format,
            filter: config.path_filter()?,
            events,
        })
    }
}

fn current_dir() -> Result<PathBuf> {
    std::env::current_dir().map_err(|e| {
        VdiffError::UserError(format!("failed to determine current directory: {}", e))
    })
}

/// Read `path`, or stdin when `path` is `None`.
///
/// Returns the name the input is reported under together with its content.
fn read_input(path: Option<&Path>) -> Result<(String, String)> {
    match path {
        Some(path) => Ok((path.display().to_string(), read_file(path)?)),
        None => {
            let content = std::io::read_to_string(std::io::stdin())
                .map_err(|e| VdiffError::UserError(format!("failed to read stdin: {}", e)))?;
            Ok(("stdin".to_string(), content))
        }
    }
}

fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| {
        VdiffError::UserError(format!("failed to read '{}': {}", path.display(), e))
    })
}
