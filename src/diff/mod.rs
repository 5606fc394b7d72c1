//! Diff primitives for vdiff.
//!
//! This module provides:
//! - the diff types and timelines every variation diff element is tagged with
//! - line positions in the diff and in both edited files
//! - reconstruction of full diffs from hunk-only unified diffs
//! - retrieval of per-file diffs from a git commit

mod api;
mod full;
mod helpers;
mod line_number;
mod types;

#[cfg(test)]
mod tests;

pub use api::{
    ChangeKind, ChangedFile, EMPTY_TREE, changed_files, file_at, file_hunks, first_parent,
    full_diff_for, resolve_commit,
};
pub use full::{FileDiff, NO_NEWLINE_MARKER, full_diff, split_file_diffs, strip_bom};
pub use helpers::{HunkHeader, normalize_path, parse_hunk_header};
pub use line_number::DiffLineNumber;
pub use types::{DiffType, Time};
