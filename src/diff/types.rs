//! Diff types and the two timelines of an edit.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the two states of a file an edit relates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Time {
    /// The file before the edit.
    Before,
    /// The file after the edit.
    After,
}

impl Time {
    /// Both timelines, before first.
    pub const ALL: [Time; 2] = [Time::Before, Time::After];

    /// Index of this timeline into per-time arrays.
    pub fn index(self) -> usize {
        match self {
            Time::Before => 0,
            Time::After => 1,
        }
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Time::Before => write!(f, "before"),
            Time::After => write!(f, "after"),
        }
    }
}

/// Whether a tree element exists only after, only before, or on both sides of an edit.
///
/// The declaration order fixes the ordinals used by packed node ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiffType {
    /// Exists only after the edit.
    Added,
    /// Exists only before the edit.
    Removed,
    /// Exists before and after the edit.
    Unchanged,
}

impl DiffType {
    /// All diff types in ordinal order.
    pub const ALL: [DiffType; 3] = [DiffType::Added, DiffType::Removed, DiffType::Unchanged];

    /// Number of bits a diff type occupies in a packed node id.
    pub const BIT_COUNT: u32 = 3;

    /// Classify a line of a diff by its leading marker.
    ///
    /// Every line that starts with neither `+` nor `-` is unchanged
    /// context, including empty lines.
    pub fn of_diff_line(line: &str) -> Self {
        match line.chars().next() {
            Some('+') => DiffType::Added,
            Some('-') => DiffType::Removed,
            _ => DiffType::Unchanged,
        }
    }

    /// The diff type of elements that exist only at `time`.
    pub fn only_at(time: Time) -> Self {
        match time {
            Time::Before => DiffType::Removed,
            Time::After => DiffType::Added,
        }
    }

    /// Returns true iff elements of this diff type exist at `time`.
    pub fn exists_at(self, time: Time) -> bool {
        match time {
            Time::Before => self != DiffType::Added,
            Time::After => self != DiffType::Removed,
        }
    }

    /// Returns true iff elements of this diff type exist before the edit.
    pub fn exists_before(self) -> bool {
        self.exists_at(Time::Before)
    }

    /// Returns true iff elements of this diff type exist after the edit.
    pub fn exists_after(self) -> bool {
        self.exists_at(Time::After)
    }

    /// The timelines in which elements of this diff type exist, before first.
    pub fn times(self) -> impl Iterator<Item = Time> {
        Time::ALL.into_iter().filter(move |&time| self.exists_at(time))
    }

    /// Short tag used in labels and text output.
    pub fn as_str(self) -> &'static str {
        match self {
            DiffType::Added => "ADD",
            DiffType::Removed => "REM",
            DiffType::Unchanged => "NON",
        }
    }

    /// Parse a short tag produced by [`DiffType::as_str`].
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "ADD" => Some(DiffType::Added),
            "REM" => Some(DiffType::Removed),
            "NON" => Some(DiffType::Unchanged),
            _ => None,
        }
    }

    /// Ordinal used by packed node ids.
    pub fn ordinal(self) -> u32 {
        self as u32
    }

    /// Inverse of [`DiffType::ordinal`].
    pub fn from_ordinal(ordinal: u32) -> Option<Self> {
        Self::ALL.get(ordinal as usize).copied()
    }
}

impl fmt::Display for DiffType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
