//! Git command runner for vdiff.
//!
//! Provides a wrapper around git commands with captured stdout/stderr
//! and structured error handling. All git operations go through this module.

use crate::error::{Result, VdiffError};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Result of a successful git command execution.
#[derive(Debug, Clone)]
pub struct GitOutput {
    /// Standard output from the command, untouched.
    ///
    /// File contents are read through `git show`, so trailing whitespace
    /// and newlines are significant and must not be trimmed here.
    pub stdout: String,
    /// Standard error from the command (trimmed).
    pub stderr: String,
}

impl GitOutput {
    fn from_output(output: &Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        }
    }

    /// Returns true if stdout contains nothing but whitespace.
    pub fn is_empty(&self) -> bool {
        self.stdout.trim().is_empty()
    }

    /// Returns the non-empty stdout lines.
    pub fn lines(&self) -> Vec<&str> {
        self.stdout.lines().filter(|line| !line.is_empty()).collect()
    }

    /// Stdout with surrounding whitespace removed, for single-value commands.
    pub fn trimmed(&self) -> &str {
        self.stdout.trim()
    }
}

/// Run a git command with the specified working directory.
///
/// # Arguments
///
/// * `cwd` - The working directory to run the command in
/// * `args` - The git command arguments (without "git" prefix)
///
/// # Returns
///
/// * `Ok(GitOutput)` - On successful execution (exit code 0)
/// * `Err(VdiffError::GitError)` - On non-zero exit code (mapped to exit code 3)
///
/// # Examples
///
/// ```no_run
/// use vdiff::git::run_git;
/// use std::path::Path;
///
/// let output = run_git(Path::new("."), &["log", "--oneline", "-1"])?;
/// println!("HEAD: {}", output.trimmed());
/// # Ok::<(), vdiff::error::VdiffError>(())
/// ```
pub fn run_git<P: AsRef<Path>>(cwd: P, args: &[&str]) -> Result<GitOutput> {
    let cwd = cwd.as_ref();

    let output = Command::new("git")
        .current_dir(cwd)
        .args(args)
        .output()
        .map_err(|e| {
            VdiffError::GitError(format!(
                "failed to execute git {}: {}",
                subcommand(args),
                e
            ))
        })?;

    let git_output = GitOutput::from_output(&output);

    if output.status.success() {
        Ok(git_output)
    } else {
        let exit_code = output.status.code().unwrap_or(-1);
        let error_msg = if git_output.stderr.is_empty() {
            git_output.stdout.trim().to_string()
        } else {
            git_output.stderr.clone()
        };

        Err(VdiffError::GitError(format!(
            "git {} failed (exit code {}): {}",
            subcommand(args),
            exit_code,
            error_msg
        )))
    }
}

/// First argument that is not a `-c key=value` override.
fn subcommand<'a>(args: &[&'a str]) -> &'a str {
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if *arg == "-c" {
            iter.next();
            continue;
        }
        return arg;
    }
    ""
}

/// Get the repository root directory using `git rev-parse --show-toplevel`.
///
/// # Returns
///
/// * `Ok(PathBuf)` - The absolute path to the repository root
/// * `Err(VdiffError::UserError)` - If not inside a git repository (exit code 1)
pub fn get_repo_root<P: AsRef<Path>>(cwd: P) -> Result<PathBuf> {
    let output = run_git_for_repo_detection(cwd.as_ref(), &["rev-parse", "--show-toplevel"])?;
    Ok(PathBuf::from(output.trimmed()))
}

/// Returns a UserError instead of GitError for repo detection, so that
/// "not in a git repo" exits with 1 rather than 3.
fn run_git_for_repo_detection(cwd: &Path, args: &[&str]) -> Result<GitOutput> {
    let output = Command::new("git")
        .current_dir(cwd)
        .args(args)
        .output()
        .map_err(|e| {
            VdiffError::UserError(format!("failed to execute git: {} (is git installed?)", e))
        })?;

    let git_output = GitOutput::from_output(&output);

    if output.status.success() {
        Ok(git_output)
    } else {
        let stderr = &git_output.stderr;
        if stderr.contains("not a git repository") || stderr.contains("fatal:") {
            Err(VdiffError::UserError(format!(
                "{} is not inside a git repository",
                cwd.display()
            )))
        } else {
            Err(VdiffError::UserError(format!(
                "git command failed: {}",
                if stderr.is_empty() {
                    git_output.stdout.trim()
                } else {
                    stderr
                }
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::create_test_repo;
    use tempfile::TempDir;

    #[test]
    fn test_run_git_success() {
        let temp_dir = create_test_repo();
        let result = run_git(temp_dir.path(), &["status", "--porcelain"]);
        assert!(result.is_ok());
    }

    #[test]
    fn test_run_git_keeps_trailing_newline() {
        let temp_dir = create_test_repo();
        let output = run_git(temp_dir.path(), &["show", "HEAD:README.md"]).unwrap();
        assert_eq!(output.stdout, "# Test Repo\n");
        assert_eq!(output.trimmed(), "# Test Repo");
    }

    #[test]
    fn test_run_git_failure_returns_git_error() {
        let temp_dir = create_test_repo();
        let result = run_git(temp_dir.path(), &["checkout", "nonexistent-branch"]);
        let err = result.unwrap_err();
        assert!(matches!(err, VdiffError::GitError(_)));
        assert!(err.to_string().contains("git checkout failed"));
    }

    #[test]
    fn test_subcommand_skips_config_overrides() {
        assert_eq!(subcommand(&["-c", "core.quotepath=off", "diff"]), "diff");
        assert_eq!(subcommand(&["show"]), "show");
        assert_eq!(subcommand(&[]), "");
    }

    #[test]
    fn test_get_repo_root_from_subdirectory() {
        let temp_dir = create_test_repo();
        let subdir = temp_dir.path().join("subdir").join("nested");
        std::fs::create_dir_all(&subdir).unwrap();

        let root = get_repo_root(&subdir).unwrap();
        let expected = temp_dir.path().canonicalize().unwrap();
        assert_eq!(root.canonicalize().unwrap(), expected);
    }

    #[test]
    fn test_get_repo_root_outside_repo_returns_user_error() {
        let temp_dir = TempDir::new().unwrap();
        let err = get_repo_root(temp_dir.path()).unwrap_err();
        assert!(matches!(err, VdiffError::UserError(_)));
        assert!(err.to_string().contains("not inside a git repository"));
    }

    #[test]
    fn test_git_output_lines_skip_empty() {
        let output = GitOutput {
            stdout: "line1\n\nline2\n".to_string(),
            stderr: String::new(),
        };
        assert_eq!(output.lines(), vec!["line1", "line2"]);
        assert!(!output.is_empty());
    }

    #[test]
    fn test_git_output_is_empty_ignores_whitespace() {
        let output = GitOutput {
            stdout: "\n".to_string(),
            stderr: String::new(),
        };
        assert!(output.is_empty());
        assert!(output.lines().is_empty());
    }
}
