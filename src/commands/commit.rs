//! Implementation of the `vdiff commit` command.
//!
//! Every file a commit changes relative to its first parent is run through
//! the parser. A file whose patch cannot be retrieved or parsed is recorded
//! as a failure and the scan moves on; only errors that concern the commit
//! as a whole (unknown revision, not a repository) abort the command.

use super::{Settings, current_dir, render_trees};
use crate::cli::CommitArgs;
use crate::diff::{changed_files, first_parent, full_diff_for, resolve_commit};
use crate::error::Result;
use crate::events::{Event, EventAction};
use crate::git::get_repo_root;
use crate::parse::parse_diff;
use crate::tree::VariationDiff;
use serde_json::json;
use std::path::Path;

/// Separates the commit from the file path in tree names.
pub const TREE_NAME_SEPARATOR: &str = "$$$";

/// A file of a commit that could not be turned into a variation diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFailure {
    pub path: String,
    pub error: String,
}

/// Outcome of scanning one commit.
#[derive(Debug, Clone)]
pub struct CommitScan {
    pub commit: String,
    /// `None` for a root commit.
    pub parent: Option<String>,
    /// Parsed files, named `<commit>$$$<path>`.
    pub trees: Vec<(String, VariationDiff)>,
    pub failures: Vec<FileFailure>,
    /// Changed files the path filter rejected.
    pub skipped: Vec<String>,
}

/// Execute the `vdiff commit` command.
///
/// Failed files are reported on stderr; the exit code stays zero as long
/// as the commit itself could be read.
pub fn cmd_commit(args: CommitArgs) -> Result<()> {
    let dir = match &args.repo {
        Some(repo) => repo.clone(),
        None => current_dir()?,
    };
    let repo = get_repo_root(&dir)?;
    let settings = Settings::resolve(&args.common, &repo)?;

    let scan = scan_commit(&repo, &args.rev, &settings)?;

    for failure in &scan.failures {
        eprintln!("warning: {}: {}", failure.path, failure.error);
    }
    eprintln!(
        "Parsed {} file(s) of {} ({} failed, {} skipped)",
        scan.trees.len(),
        short(&scan.commit),
        scan.failures.len(),
        scan.skipped.len()
    );

    print!("{}", render_trees(settings.format, &scan.trees)?);
    Ok(())
}

/// Parse every changed file of `rev` that passes the path filter.
///
/// Appends one event per file and a closing `commit_scanned` event to the
/// event log, if one is configured.
pub fn scan_commit(repo: &Path, rev: &str, settings: &Settings) -> Result<CommitScan> {
    let commit = resolve_commit(repo, rev)?;
    let parent = first_parent(repo, &commit)?;
    let files = changed_files(repo, parent.as_deref(), &commit)?;

    let mut scan = CommitScan {
        commit: commit.clone(),
        parent: parent.clone(),
        trees: Vec::new(),
        failures: Vec::new(),
        skipped: Vec::new(),
    };

    for file in &files {
        let path = file.path().to_string();

        if !settings.filter.matches(&path) {
            log(settings, || {
                Event::new(EventAction::PatchSkipped)
                    .with_commit(commit.as_str())
                    .with_file(path.as_str())
            })?;
            scan.skipped.push(path);
            continue;
        }

        let parsed = full_diff_for(repo, parent.as_deref(), &commit, file).and_then(|full| {
            parse_diff(&full, &settings.options).map_err(Into::into)
        });

        match parsed {
            Ok(diff) => {
                log(settings, || {
                    Event::new(EventAction::PatchParsed)
                        .with_commit(commit.as_str())
                        .with_file(path.as_str())
                        .with_details(json!({
                            "change": format!("{:?}", file.change).to_lowercase(),
                            "nodes": diff.node_count(),
                        }))
                })?;
                let name = format!("{}{}{}", commit, TREE_NAME_SEPARATOR, path);
                scan.trees.push((name, diff));
            }
            Err(err) => {
                log(settings, || {
                    Event::new(EventAction::PatchFailed)
                        .with_commit(commit.as_str())
                        .with_file(path.as_str())
                        .with_details(json!({ "error": err.to_string() }))
                })?;
                scan.failures.push(FileFailure {
                    path,
                    error: err.to_string(),
                });
            }
        }
    }

    log(settings, || {
        Event::new(EventAction::CommitScanned)
            .with_commit(commit.as_str())
            .with_details(json!({
                "parent": parent,
                "parsed": scan.trees.len(),
                "failed": scan.failures.len(),
                "skipped": scan.skipped.len(),
            }))
    })?;

    Ok(scan)
}

fn log<F: FnOnce() -> Event>(settings: &Settings, event: F) -> Result<()> {
    match &settings.events {
        Some(log) => log.append(&event()),
        None => Ok(()),
    }
}

fn short(commit: &str) -> &str {
    commit.get(..7).unwrap_or(commit)
}
