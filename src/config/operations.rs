//! Config loading, validation, and utility operations.

use super::model::Config;
use crate::diff::normalize_path;
use crate::error::{Result, VdiffError};
use crate::parse::ParseOptions;
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};

/// Name of the config file picked up from the working directory.
pub const CONFIG_FILE_NAME: &str = "vdiff.yaml";

impl Config {
    /// Load config from a YAML file.
    ///
    /// Unknown fields in the YAML are silently ignored for forward compatibility.
    ///
    /// # Returns
    ///
    /// * `Ok(Config)` - Successfully loaded and validated config
    /// * `Err(VdiffError::UserError)` - Read error, parse error or validation failure
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|e| {
            VdiffError::UserError(format!(
                "failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        Self::from_yaml(&content)
    }

    /// Load the config for a run.
    ///
    /// An explicit `path` must exist. Without one, `vdiff.yaml` in `dir` is
    /// used if present, and the defaults otherwise.
    pub fn resolve(path: Option<&Path>, dir: &Path) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => match Self::discover(dir) {
                Some(found) => Self::load(found),
                None => Ok(Self::default()),
            },
        }
    }

    /// Path of the config file in `dir`, if there is one.
    pub fn discover(dir: &Path) -> Option<PathBuf> {
        let candidate = dir.join(CONFIG_FILE_NAME);
        candidate.is_file().then_some(candidate)
    }

    /// Parse config from a YAML string.
    ///
    /// Unknown fields in the YAML are silently ignored for forward compatibility.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)
            .map_err(|e| VdiffError::UserError(format!("failed to parse config YAML: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Serialize config to YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| {
            VdiffError::UserError(format!("failed to serialize config to YAML: {}", e))
        })
    }

    /// Validate config values and return error on invalid values.
    ///
    /// Validation rules:
    /// - `annotation_introducer` must be non-empty and contain no whitespace
    /// - `include` and `exclude` entries must be valid globs
    /// - `event_log`, if set, must be non-empty
    pub fn validate(&self) -> Result<()> {
        if self.annotation_introducer.is_empty() {
            return Err(VdiffError::UserError(
                "config validation failed: annotation_introducer must be non-empty".to_string(),
            ));
        }
        if self.annotation_introducer.contains(char::is_whitespace) {
            return Err(VdiffError::UserError(format!(
                "config validation failed: annotation_introducer must not contain whitespace (found '{}')",
                self.annotation_introducer
            )));
        }

        if self.event_log.as_deref().is_some_and(|log| log.trim().is_empty()) {
            return Err(VdiffError::UserError(
                "config validation failed: event_log must be non-empty when set".to_string(),
            ));
        }

        self.path_filter()?;
        Ok(())
    }

    /// Parser options for this config, using the default formula parser.
    pub fn parse_options(&self) -> Result<ParseOptions> {
        let mut options = ParseOptions::with_introducer(&self.annotation_introducer)?;
        options.collapse_multiple_code_lines = self.collapse_multiple_code_lines;
        options.ignore_empty_lines = self.ignore_empty_lines;
        Ok(options)
    }

    /// Compiled `include`/`exclude` patterns.
    pub fn path_filter(&self) -> Result<PathFilter> {
        Ok(PathFilter {
            include: build_globset(&self.include, "include")?,
            exclude: build_globset(&self.exclude, "exclude")?,
        })
    }
}

/// Decides which changed files of a commit are analysed.
#[derive(Debug, Clone)]
pub struct PathFilter {
    include: GlobSet,
    exclude: GlobSet,
}

impl PathFilter {
    /// Returns true iff `path` matches an include pattern and no exclude pattern.
    pub fn matches(&self, path: &str) -> bool {
        let path = normalize_path(path);
        self.include.is_match(&path) && !self.exclude.is_match(&path)
    }
}

/// Build a GlobSet from a list of glob patterns.
fn build_globset(patterns: &[String], field_name: &str) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();

    for pattern in patterns {
        let glob = Glob::new(&normalize_path(pattern)).map_err(|e| {
            VdiffError::UserError(format!(
                "config validation failed: invalid glob pattern in {}: '{}' - {}",
                field_name, pattern, e
            ))
        })?;
        builder.add(glob);
    }

    builder.build().map_err(|e| {
        VdiffError::UserError(format!("failed to compile {} globs: {}", field_name, e))
    })
}
