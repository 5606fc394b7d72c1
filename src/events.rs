//! Event logging for batch runs.
//!
//! `vdiff commit` can append one event per analysed file and one summary
//! event per commit to a log file. Events are stored in NDJSON format (one
//! JSON object per line), so a long scan can be followed with `tail -f`
//! and processed with line-oriented tools.
//!
//! # Event Format
//!
//! Each event is a JSON object with the following fields:
//! - `ts`: RFC3339 timestamp
//! - `action`: The action performed (patch_parsed, patch_failed, ...)
//! - `commit`: Optional commit id
//! - `file`: Optional path of the patched file
//! - `details`: Freeform object with action-specific details
//!
//! # Usage
//!
//! ```no_run
//! use vdiff::events::{Event, EventAction, EventLog};
//! use serde_json::json;
//!
//! let log = EventLog::new("events.ndjson");
//! let event = Event::new(EventAction::PatchParsed)
//!     .with_commit("4e1f0a2")
//!     .with_file("src/main.c")
//!     .with_details(json!({"nodes": 12}));
//! log.append(&event)?;
//! # Ok::<(), vdiff::error::VdiffError>(())
//! ```

use crate::error::{Result, VdiffError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Actions that can be logged as events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventAction {
    /// A file's patch was parsed into a variation diff
    PatchParsed,
    /// A file's patch could not be retrieved or parsed
    PatchFailed,
    /// A changed file did not match the path filter
    PatchSkipped,
    /// All files of a commit were processed
    CommitScanned,
}

impl std::fmt::Display for EventAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventAction::PatchParsed => write!(f, "patch_parsed"),
            EventAction::PatchFailed => write!(f, "patch_failed"),
            EventAction::PatchSkipped => write!(f, "patch_skipped"),
            EventAction::CommitScanned => write!(f, "commit_scanned"),
        }
    }
}

/// An event record for the log.
///
/// Events are serialized as single-line JSON objects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// RFC3339 timestamp when the event occurred.
    pub ts: DateTime<Utc>,

    /// The action that was performed.
    pub action: EventAction,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,

    /// Freeform details object with action-specific information.
    pub details: Value,
}

impl Event {
    /// Create a new event with the given action, timestamped now.
    pub fn new(action: EventAction) -> Self {
        Self {
            ts: Utc::now(),
            action,
            commit: None,
            file: None,
            details: Value::Object(serde_json::Map::new()),
        }
    }

    pub fn with_commit(mut self, commit: impl Into<String>) -> Self {
        self.commit = Some(commit.into());
        self
    }

    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// Set the details object for this event.
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = details;
        self
    }

    /// Serialize the event to a single-line JSON string.
    pub fn to_ndjson_line(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| {
            VdiffError::UserError(format!("failed to serialize event to JSON: {}", e))
        })
    }
}

/// An append-only NDJSON event file.
#[derive(Debug, Clone)]
pub struct EventLog {
    path: PathBuf,
}

impl EventLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append an event to the log.
    ///
    /// The file and its parent directory are created if they don't exist.
    /// Each append results in one line with a trailing newline, synced to
    /// disk before returning.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - Event was successfully appended
    /// * `Err(VdiffError::UserError)` - Serialization or write failed
    pub fn append(&self, event: &Event) -> Result<()> {
        let json_line = event.to_ndjson_line()?;

        if let Some(dir) = self.path.parent()
            && !dir.as_os_str().is_empty()
            && !dir.exists()
        {
            fs::create_dir_all(dir).map_err(|e| {
                VdiffError::UserError(format!(
                    "failed to create event log directory '{}': {}",
                    dir.display(),
                    e
                ))
            })?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| {
                VdiffError::UserError(format!(
                    "failed to open event log '{}': {}",
                    self.path.display(),
                    e
                ))
            })?;

        writeln!(file, "{}", json_line).map_err(|e| {
            VdiffError::UserError(format!(
                "failed to write event to '{}': {}",
                self.path.display(),
                e
            ))
        })?;

        file.sync_all().map_err(|e| {
            VdiffError::UserError(format!(
                "failed to sync event log '{}': {}",
                self.path.display(),
                e
            ))
        })?;

        Ok(())
    }

    /// Read back every event of the log.
    pub fn read_all(&self) -> Result<Vec<Event>> {
        let content = fs::read_to_string(&self.path).map_err(|e| {
            VdiffError::UserError(format!(
                "failed to read event log '{}': {}",
                self.path.display(),
                e
            ))
        })?;
        content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .enumerate()
            .map(|(index, line)| {
                serde_json::from_str(line).map_err(|e| {
                    VdiffError::UserError(format!(
                        "invalid event on line {} of '{}': {}",
                        index + 1,
                        self.path.display(),
                        e
                    ))
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_event_creation() {
        let event = Event::new(EventAction::PatchParsed);

        assert_eq!(event.action, EventAction::PatchParsed);
        assert!(event.commit.is_none());
        assert!(event.file.is_none());
        // Timestamp should be recent (within last minute)
        let age = Utc::now().signed_duration_since(event.ts);
        assert!(age.num_minutes() < 1);
    }

    #[test]
    fn test_event_with_commit_and_file() {
        let event = Event::new(EventAction::PatchFailed)
            .with_commit("abc123")
            .with_file("src/a.c");

        assert_eq!(event.commit, Some("abc123".to_string()));
        assert_eq!(event.file, Some("src/a.c".to_string()));
    }

    #[test]
    fn test_event_serialization() {
        let event = Event::new(EventAction::PatchParsed)
            .with_file("src/a.c")
            .with_details(json!({"nodes": 4}));

        let json_line = event.to_ndjson_line().unwrap();

        // Should be valid JSON
        let parsed: Event = serde_json::from_str(&json_line).unwrap();
        assert_eq!(parsed.action, EventAction::PatchParsed);
        assert_eq!(parsed.details["nodes"], 4);

        // Should not contain newlines (single line)
        assert!(!json_line.contains('\n'));
    }

    #[test]
    fn test_event_action_serialization() {
        let json_line = Event::new(EventAction::CommitScanned)
            .to_ndjson_line()
            .unwrap();
        assert!(json_line.contains("\"commit_scanned\""));
        assert_eq!(EventAction::PatchSkipped.to_string(), "patch_skipped");
    }

    #[test]
    fn test_event_without_commit_omits_field() {
        let json_line = Event::new(EventAction::PatchParsed)
            .to_ndjson_line()
            .unwrap();

        let parsed: Value = serde_json::from_str(&json_line).unwrap();
        assert!(parsed.get("commit").is_none());
        assert!(parsed.get("file").is_none());
    }

    #[test]
    fn test_append_creates_file_and_directory() {
        let temp_dir = TempDir::new().unwrap();
        let log = EventLog::new(temp_dir.path().join("logs").join("events.ndjson"));
        assert!(!log.path().exists());

        log.append(&Event::new(EventAction::PatchParsed)).unwrap();

        assert!(log.path().exists());
        let content = fs::read_to_string(log.path()).unwrap();
        assert_eq!(content.lines().count(), 1);
        assert!(content.ends_with('\n'));
    }

    #[test]
    fn test_append_multiple_lines() {
        let temp_dir = TempDir::new().unwrap();
        let log = EventLog::new(temp_dir.path().join("events.ndjson"));

        log.append(&Event::new(EventAction::PatchParsed).with_file("a.c"))
            .unwrap();
        log.append(&Event::new(EventAction::PatchFailed).with_file("b.c"))
            .unwrap();

        let events = log.read_all().unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].action, EventAction::PatchParsed);
        assert_eq!(events[1].action, EventAction::PatchFailed);
        assert_eq!(events[1].file.as_deref(), Some("b.c"));
    }

    #[test]
    fn test_read_all_reports_corrupt_line() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("events.ndjson");
        fs::write(&path, "not json\n").unwrap();

        let err = EventLog::new(&path).read_all().unwrap_err();
        assert!(err.to_string().contains("invalid event on line 1"));
    }
}
