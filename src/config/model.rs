//! Config struct definition and default implementation.

use super::types::*;
use serde::{Deserialize, Serialize};

/// Configuration for vdiff.
///
/// This struct represents the contents of `vdiff.yaml`.
/// Unknown fields in the YAML are ignored for forward compatibility.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // =========================================================================
    // Parser settings
    // =========================================================================
    /// Merge consecutive code lines of the same diff type into one artifact.
    #[serde(default)]
    pub collapse_multiple_code_lines: bool,

    /// Skip blank lines when parsing.
    #[serde(default)]
    pub ignore_empty_lines: bool,

    /// Text that starts a directive, e.g. `#` or `//#`.
    #[serde(default = "default_annotation_introducer")]
    pub annotation_introducer: String,

    // =========================================================================
    // Commit scanning
    // =========================================================================
    /// Glob patterns of files analysed by `vdiff commit`.
    #[serde(default = "default_include")]
    pub include: Vec<String>,

    /// Glob patterns of files skipped by `vdiff commit`, even if included.
    #[serde(default)]
    pub exclude: Vec<String>,

    // =========================================================================
    // Output
    // =========================================================================
    /// Output format used when no `--format` is given.
    #[serde(default)]
    pub format: OutputFormat,

    /// NDJSON event log that batch runs append to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_log: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            collapse_multiple_code_lines: false,
            ignore_empty_lines: false,
            annotation_introducer: default_annotation_introducer(),
            include: default_include(),
            exclude: Vec::new(),
            format: OutputFormat::default(),
            event_log: None,
        }
    }
}
