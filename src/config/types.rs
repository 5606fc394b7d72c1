//! Configuration types and defaults for vdiff.
//!
//! This module defines enums and default value functions used by the
//! Config struct.

use serde::{Deserialize, Serialize};

/// How parsed variation diffs are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// Indented outline (default).
    #[default]
    Text,
    /// Flat JSON node list.
    Json,
    /// Line graph text.
    Linegraph,
}

/// Default annotation introducer: C preprocessor directives.
pub fn default_annotation_introducer() -> String {
    "#".to_string()
}

/// Default file patterns analysed in commit mode: C and C++ sources and headers.
pub fn default_include() -> Vec<String> {
    ["c", "h", "cpp", "hpp", "cc", "hh", "cxx", "hxx"]
        .iter()
        .map(|ext| format!("**/*.{}", ext))
        .collect()
}
