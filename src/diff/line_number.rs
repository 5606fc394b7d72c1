//! Line positions in a diff and in the two files it relates.

use super::types::{DiffType, Time};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A line position in three coordinate systems at once: the diff text,
/// the file before the edit, and the file after the edit.
///
/// A coordinate is [`DiffLineNumber::INVALID`] when the element does not
/// exist in that coordinate system (e.g. an added line before the edit).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DiffLineNumber {
    /// Position in the diff text.
    pub in_diff: i32,
    /// Position in the file before the edit.
    pub before_edit: i32,
    /// Position in the file after the edit.
    pub after_edit: i32,
}

impl DiffLineNumber {
    /// Sentinel for a coordinate that does not apply.
    pub const INVALID: i32 = -1;

    /// Create a line position from its three coordinates.
    pub fn new(in_diff: i32, before_edit: i32, after_edit: i32) -> Self {
        Self {
            in_diff,
            before_edit,
            after_edit,
        }
    }

    /// A line position that is invalid in all coordinate systems.
    pub fn invalid() -> Self {
        Self::new(Self::INVALID, Self::INVALID, Self::INVALID)
    }

    /// Shift by `offset` lines of the given diff type.
    ///
    /// The diff coordinate always moves. Added lines do not move the
    /// before-edit coordinate and removed lines do not move the after-edit
    /// coordinate.
    pub fn add(self, offset: i32, diff_type: DiffType) -> Self {
        Self::new(
            self.in_diff + offset,
            self.before_edit + if diff_type == DiffType::Added { 0 } else { offset },
            self.after_edit + if diff_type == DiffType::Removed { 0 } else { offset },
        )
    }

    /// Invalidate the coordinates in which an element of `diff_type` does not exist.
    pub fn restrict_to(self, diff_type: DiffType) -> Self {
        Self::new(
            self.in_diff,
            if diff_type == DiffType::Added {
                Self::INVALID
            } else {
                self.before_edit
            },
            if diff_type == DiffType::Removed {
                Self::INVALID
            } else {
                self.after_edit
            },
        )
    }

    /// The coordinate at `time`.
    pub fn at(self, time: Time) -> i32 {
        match time {
            Time::Before => self.before_edit,
            Time::After => self.after_edit,
        }
    }

    /// Replace the coordinate at `time`.
    pub fn with_at(self, time: Time, line: i32) -> Self {
        match time {
            Time::Before => Self::new(self.in_diff, line, self.after_edit),
            Time::After => Self::new(self.in_diff, self.before_edit, line),
        }
    }

    /// Returns true iff the coordinate at `time` is not the sentinel.
    pub fn is_valid_at(self, time: Time) -> bool {
        self.at(time) != Self::INVALID
    }
}

impl Default for DiffLineNumber {
    fn default() -> Self {
        Self::invalid()
    }
}

impl fmt::Display for DiffLineNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(old: {}, diff: {}, new: {})",
            self.before_edit, self.in_diff, self.after_edit
        )
    }
}
