//! Options of the variation diff parser.

use crate::error::Result;
use crate::formula::{CppFormulaParser, FormulaParser};
use std::fmt;
use std::sync::Arc;

use super::directive::AnnotationSyntax;

/// Options controlling how a diff is parsed into a variation diff.
#[derive(Clone)]
pub struct ParseOptions {
    /// Merge consecutive code lines of the same diff type into one artifact node.
    pub collapse_multiple_code_lines: bool,
    /// Skip blank lines entirely. Line numbers still advance.
    pub ignore_empty_lines: bool,
    /// How directives are recognised.
    pub syntax: AnnotationSyntax,
    /// Turns `#if`/`#elif` lines into formulas.
    pub formula_parser: Arc<dyn FormulaParser>,
}

impl ParseOptions {
    /// Default options for directives introduced by `introducer`.
    pub fn with_introducer(introducer: &str) -> Result<Self> {
        Ok(Self {
            syntax: AnnotationSyntax::with_introducer(introducer)?,
            formula_parser: Arc::new(CppFormulaParser::with_introducer(introducer)?),
            ..Self::default()
        })
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            collapse_multiple_code_lines: false,
            ignore_empty_lines: false,
            syntax: AnnotationSyntax::cpp(),
            formula_parser: Arc::new(CppFormulaParser::new()),
        }
    }
}

impl fmt::Debug for ParseOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParseOptions")
            .field("collapse_multiple_code_lines", &self.collapse_multiple_code_lines)
            .field("ignore_empty_lines", &self.ignore_empty_lines)
            .field("introducer", &self.syntax.introducer())
            .finish_non_exhaustive()
    }
}
