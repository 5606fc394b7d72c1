//! Recognition of annotation directives.

use crate::error::{Result, VdiffError};
use regex::Regex;
use std::sync::LazyLock;

static CPP_DIRECTIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&directive_pattern("#")).expect("CPP directive regex should compile")
});

fn directive_pattern(introducer: &str) -> String {
    format!(
        r"^[+-]?\s*{}\s*(if|elif|else|endif)",
        regex::escape(introducer)
    )
}

/// How annotation directives are written in the analysed language.
///
/// A line is a directive if, after optional whitespace, it starts with the
/// introducer followed by one of the keywords `if`, `elif`, `else` and
/// `endif`. Keywords only need to be a prefix, so `#ifdef` and `#ifndef`
/// open an `if`. Comments between introducer and keyword are not
/// recognised.
#[derive(Debug, Clone)]
pub struct AnnotationSyntax {
    introducer: String,
    pattern: Regex,
}

impl AnnotationSyntax {
    /// C preprocessor syntax, introduced by `#`.
    pub fn cpp() -> Self {
        Self {
            introducer: "#".to_string(),
            pattern: CPP_DIRECTIVE.clone(),
        }
    }

    /// Directives introduced by `introducer`, e.g. `//#` for Java preprocessors.
    ///
    /// # Errors
    ///
    /// * `VdiffError::UserError` - `introducer` is empty
    pub fn with_introducer(introducer: &str) -> Result<Self> {
        if introducer.trim().is_empty() {
            return Err(VdiffError::UserError(
                "annotation introducer must not be empty".to_string(),
            ));
        }
        let pattern = Regex::new(&directive_pattern(introducer)).map_err(|e| {
            VdiffError::UserError(format!(
                "invalid annotation introducer '{}': {}",
                introducer, e
            ))
        })?;
        Ok(Self {
            introducer: introducer.to_string(),
            pattern,
        })
    }

    pub fn introducer(&self) -> &str {
        &self.introducer
    }

    /// The directive keyword `line` starts with, if any.
    pub fn keyword<'a>(&self, line: &'a str) -> Option<&'a str> {
        self.pattern
            .captures(line)
            .and_then(|captures| captures.get(1))
            .map(|keyword| keyword.as_str())
    }
}

impl Default for AnnotationSyntax {
    fn default() -> Self {
        Self::cpp()
    }
}
