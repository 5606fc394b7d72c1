//! Git-backed retrieval of the diffs a commit introduces.

use crate::error::{Result, VdiffError};
use crate::git::run_git;
use std::path::Path;

use super::full::{full_diff, split_file_diffs};
use super::helpers::normalize_path;

/// Object id of git's empty tree, used as the parent of root commits.
pub const EMPTY_TREE: &str = "4b825dc642cb6eb9a060e54bf8d69288fbee4904";

/// How a commit changed a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Added,
    Deleted,
    Modified,
    Renamed,
}

/// A file touched by a commit, as reported by `git diff --name-status`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangedFile {
    pub change: ChangeKind,
    /// Path before the commit; `None` for added files.
    pub old_path: Option<String>,
    /// Path after the commit; `None` for deleted files.
    pub new_path: Option<String>,
}

impl ChangedFile {
    /// The path after the commit, or before it for deleted files.
    pub fn path(&self) -> &str {
        self.new_path
            .as_deref()
            .or(self.old_path.as_deref())
            .unwrap_or_default()
    }
}

/// Resolve `rev` to a full commit SHA.
///
/// # Returns
///
/// * `Ok(String)` - The commit SHA
/// * `Err(VdiffError::GitError)` - `rev` does not name a commit
pub fn resolve_commit<P: AsRef<Path>>(cwd: P, rev: &str) -> Result<String> {
    let spec = format!("{}^{{commit}}", rev);
    let output = run_git(&cwd, &["rev-parse", "--verify", &spec])?;
    Ok(output.trimmed().to_string())
}

/// The first parent of `rev`, or `None` for a root commit.
pub fn first_parent<P: AsRef<Path>>(cwd: P, rev: &str) -> Result<Option<String>> {
    let output = run_git(&cwd, &["rev-list", "--parents", "-n", "1", rev])?;
    Ok(output.trimmed().split_whitespace().nth(1).map(str::to_string))
}

/// List the files `rev` changed relative to `parent`.
///
/// Root commits are compared against the empty tree when `parent` is `None`.
///
/// # Arguments
///
/// * `cwd` - Any directory inside the repository
/// * `parent` - The commit to compare against
/// * `rev` - The commit whose changes are listed
///
/// # Returns
///
/// * `Ok(Vec<ChangedFile>)` - Changed files in git's output order
/// * `Err(VdiffError::GitError)` - Git command failed
pub fn changed_files<P: AsRef<Path>>(
    cwd: P,
    parent: Option<&str>,
    rev: &str,
) -> Result<Vec<ChangedFile>> {
    let parent = parent.unwrap_or(EMPTY_TREE);
    let output = run_git(
        &cwd,
        &[
            "-c",
            "core.quotepath=off",
            "diff",
            "--name-status",
            "-M",
            parent,
            rev,
        ],
    )?;

    output
        .lines()
        .into_iter()
        .map(parse_name_status_line)
        .collect()
}

/// Parse one line of `git diff --name-status` output.
pub(super) fn parse_name_status_line(line: &str) -> Result<ChangedFile> {
    let fields: Vec<&str> = line.split('\t').collect();
    let invalid = || VdiffError::GitError(format!("unexpected name-status line: {}", line));

    let status = fields.first().and_then(|s| s.chars().next()).ok_or_else(invalid)?;
    let path = |index: usize| fields.get(index).map(|p| normalize_path(p));

    let file = match status {
        'A' => ChangedFile {
            change: ChangeKind::Added,
            old_path: None,
            new_path: path(1),
        },
        'D' => ChangedFile {
            change: ChangeKind::Deleted,
            old_path: path(1),
            new_path: None,
        },
        'R' => ChangedFile {
            change: ChangeKind::Renamed,
            old_path: path(1),
            new_path: path(2),
        },
        // M, T (type change), C (copy) and friends keep both paths
        _ => ChangedFile {
            change: ChangeKind::Modified,
            old_path: path(1),
            new_path: fields.get(2).or(fields.get(1)).map(|p| normalize_path(p)),
        },
    };

    if file.old_path.is_none() && file.new_path.is_none() {
        return Err(invalid());
    }
    Ok(file)
}

/// Read a file as it was at `rev`.
pub fn file_at<P: AsRef<Path>>(cwd: P, rev: &str, path: &str) -> Result<String> {
    let object = format!("{}:{}", rev, path);
    let output = run_git(&cwd, &["show", &object])?;
    Ok(output.stdout)
}

/// The zero-context hunks `rev` applied to `file`.
///
/// Returns an empty string when git reports no textual hunks (e.g. a
/// pure rename or a mode change).
pub fn file_hunks<P: AsRef<Path>>(
    cwd: P,
    parent: Option<&str>,
    rev: &str,
    file: &ChangedFile,
) -> Result<String> {
    let parent = parent.unwrap_or(EMPTY_TREE);
    let mut args = vec![
        "-c",
        "core.quotepath=off",
        "diff",
        "--no-color",
        "--no-ext-diff",
        "-U0",
        "-M",
        parent,
        rev,
        "--",
    ];
    args.extend(file.old_path.as_deref());
    if file.new_path != file.old_path {
        args.extend(file.new_path.as_deref());
    }

    let output = run_git(&cwd, &args)?;
    Ok(split_file_diffs(&output.stdout)
        .into_iter()
        .next()
        .map(|diff| diff.hunks)
        .unwrap_or_default())
}

/// The full diff of `file` in `rev`: every line of the file, diff-marked.
///
/// Added files are reconstructed against an empty pre-image.
pub fn full_diff_for<P: AsRef<Path>>(
    cwd: P,
    parent: Option<&str>,
    rev: &str,
    file: &ChangedFile,
) -> Result<String> {
    let cwd = cwd.as_ref();
    let hunks = file_hunks(cwd, parent, rev, file)?;
    let before = match (parent, file.old_path.as_deref()) {
        (Some(parent), Some(old_path)) => file_at(cwd, parent, old_path)?,
        _ => String::new(),
    };
    full_diff(&before, &hunks)
}
