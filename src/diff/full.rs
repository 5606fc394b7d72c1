//! Reconstruction of full diffs from hunk-only diffs.
//!
//! The variation diff parser needs every line of the edited file, marked
//! with its diff type. A unified diff only carries the hunks, so the
//! unmodified lines between hunks are copied from the file before the edit.

use crate::error::{Result, VdiffError};

use super::helpers::{normalize_path, parse_diff_git_line, parse_hunk_header};

/// Marker git emits after a line that lacks a trailing newline.
pub const NO_NEWLINE_MARKER: &str = "\\ No newline at end of file";

const BOM: char = '\u{feff}';

/// The hunks of one file within a (possibly multi-file) unified diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDiff {
    /// Path after the edit, or before it for deletions. `None` if the diff had no file headers.
    pub path: Option<String>,
    /// Hunk headers and hunk lines, without any file headers.
    pub hunks: String,
}

/// Remove byte order marks anywhere in `text`.
pub fn strip_bom(text: &str) -> String {
    text.replace(BOM, "")
}

/// Split a unified diff into per-file hunks.
///
/// Understands `git diff` output (`diff --git` headers) as well as plain
/// `diff -u` output (`---`/`+++` headers) and bare hunks without headers.
/// Hunk bodies are delimited by the line counts of their headers, so removed
/// lines that look like file headers are kept.
pub fn split_file_diffs(diff: &str) -> Vec<FileDiff> {
    let mut files: Vec<FileDiff> = Vec::new();
    let mut current: Option<FileDiff> = None;
    let mut old_remaining = 0usize;
    let mut new_remaining = 0usize;

    for line in diff.lines() {
        let in_body = old_remaining > 0 || new_remaining > 0;

        if in_body {
            match line.chars().next() {
                Some('+') => new_remaining = new_remaining.saturating_sub(1),
                Some('-') => old_remaining = old_remaining.saturating_sub(1),
                Some('\\') => {}
                _ => {
                    old_remaining = old_remaining.saturating_sub(1);
                    new_remaining = new_remaining.saturating_sub(1);
                }
            }
            push_hunk_line(&mut current, line);
            continue;
        }

        if let Some(rest) = line.strip_prefix("diff --git ") {
            files.extend(current.take());
            current = Some(FileDiff {
                path: parse_diff_git_line(rest),
                hunks: String::new(),
            });
        } else if let Some(rest) = line.strip_prefix("--- ") {
            let starts_new_file = current.as_ref().is_none_or(|file| !file.hunks.is_empty());
            if starts_new_file {
                files.extend(current.take());
                current = Some(FileDiff {
                    path: header_path(rest),
                    hunks: String::new(),
                });
            }
        } else if let Some(rest) = line.strip_prefix("+++ ") {
            if let Some(path) = header_path(rest) {
                current
                    .get_or_insert_with(|| FileDiff {
                        path: None,
                        hunks: String::new(),
                    })
                    .path = Some(path);
            }
        } else if let Some(header) = parse_hunk_header(line) {
            old_remaining = header.old_len;
            new_remaining = header.new_len;
            push_hunk_line(&mut current, line);
        } else if line == NO_NEWLINE_MARKER {
            push_hunk_line(&mut current, line);
        }
        // Other header lines (index, mode changes, rename info) are dropped.
    }

    files.extend(current);
    files
}

fn push_hunk_line(current: &mut Option<FileDiff>, line: &str) {
    let file = current.get_or_insert_with(|| FileDiff {
        path: None,
        hunks: String::new(),
    });
    file.hunks.push_str(line);
    file.hunks.push('\n');
}

/// Extract the path from a `---`/`+++` header value.
fn header_path(rest: &str) -> Option<String> {
    // diff -u appends a tab and a timestamp
    let path = rest.split('\t').next().unwrap_or(rest).trim_end();
    if path == "/dev/null" {
        return None;
    }
    let path = path
        .strip_prefix("a/")
        .or_else(|| path.strip_prefix("b/"))
        .unwrap_or(path);
    Some(normalize_path(path))
}

/// Interleave the unmodified lines of `before` with the hunks of a diff.
///
/// Every line of the result carries a diff marker: the hunk lines keep
/// theirs and lines copied from `before` get the neutral marker `' '`.
/// A `\ No newline at end of file` marker becomes an empty line and byte
/// order marks are removed before splitting lines.
///
/// # Errors
///
/// * `VdiffError::InvalidPatch` - a hunk starts before the previous hunk
///   ended or beyond the end of `before`
pub fn full_diff(before: &str, hunks: &str) -> Result<String> {
    let before = strip_bom(before);
    let hunks = strip_bom(hunks);
    let before_lines: Vec<&str> = before.lines().collect();

    let mut full: Vec<String> = Vec::new();
    let mut next_before = 0usize;

    for line in hunks.lines() {
        if let Some(header) = parse_hunk_header(line) {
            let target = header.old_lines_before();
            if target < next_before || target > before_lines.len() {
                return Err(VdiffError::InvalidPatch(format!(
                    "hunk '{}' does not fit the {} line(s) of the file before the edit",
                    line,
                    before_lines.len()
                )));
            }
            while next_before < target {
                full.push(format!(" {}", before_lines[next_before]));
                next_before += 1;
            }
        } else if line == NO_NEWLINE_MARKER {
            full.push(String::new());
        } else {
            if !line.starts_with('+') {
                next_before += 1;
            }
            full.push(line.to_string());
        }
    }

    while next_before < before_lines.len() {
        full.push(format!(" {}", before_lines[next_before]));
        next_before += 1;
    }

    Ok(full.join("\n"))
}
