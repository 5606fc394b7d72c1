//! Error types for vdiff.
//!
//! Uses thiserror for derive macros. [`DiffParseError`] is the structured
//! error of the variation diff parser; [`VdiffError`] is the crate-level
//! error that every fallible operation outside the parser returns.

use crate::diff::DiffLineNumber;
use crate::exit_codes;
use crate::formula::FormulaError;
use thiserror::Error;

/// Why a diff could not be parsed into a variation diff.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DiffErrorKind {
    /// A line's leading marker cannot be classified.
    ///
    /// Text diffs never produce it: every marker other than `+` and `-`
    /// is unchanged context.
    #[error("invalid diff line")]
    InvalidDiff,

    /// Input ended inside a line continuation or block comment.
    #[error("input ends inside a line continuation or block comment")]
    InvalidLineContinuation,

    /// Unknown directive after the annotation introducer.
    #[error("invalid macro name")]
    InvalidMacroName,

    #[error("#endif without #if")]
    EndifWithoutIf,

    #[error("#else or #elif without #if")]
    ElseOrElifWithoutIf,

    #[error("#else or #elif after #else")]
    ElseAfterElse,

    #[error("not all annotations are closed")]
    NotAllAnnotationsClosed,

    /// The formula parser rejected a directive's condition.
    #[error("unparseable formula: {0}")]
    UnparseableFormula(#[from] FormulaError),
}

/// A parse failure together with the position it was detected at.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind} at {line}")]
pub struct DiffParseError {
    pub kind: DiffErrorKind,
    pub line: DiffLineNumber,
}

impl DiffParseError {
    pub fn new(kind: DiffErrorKind, line: DiffLineNumber) -> Self {
        Self { kind, line }
    }
}

/// Main error type for vdiff operations.
///
/// Each variant maps to a process exit code.
#[derive(Error, Debug)]
pub enum VdiffError {
    /// Invalid arguments, unreadable input, or invalid configuration.
    #[error("{0}")]
    UserError(String),

    /// A hunk diff does not fit the file it claims to edit.
    #[error("invalid patch: {0}")]
    InvalidPatch(String),

    /// A diff could not be parsed into a variation diff.
    #[error("parse failed: {0}")]
    Parse(#[from] DiffParseError),

    /// Line graph text could not be read back into variation diffs.
    #[error("invalid line graph at line {line}: {message}")]
    InvalidLineGraph { line: usize, message: String },

    /// Git operation failed.
    #[error("Git operation failed: {0}")]
    GitError(String),
}

impl VdiffError {
    /// Returns the appropriate exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            VdiffError::UserError(_) => exit_codes::USER_ERROR,
            VdiffError::InvalidLineGraph { .. } => exit_codes::USER_ERROR,
            VdiffError::InvalidPatch(_) => exit_codes::PARSE_FAILURE,
            VdiffError::Parse(_) => exit_codes::PARSE_FAILURE,
            VdiffError::GitError(_) => exit_codes::GIT_FAILURE,
        }
    }
}

/// Result type alias for vdiff operations.
pub type Result<T> = std::result::Result<T, VdiffError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_error_has_correct_exit_code() {
        let err = VdiffError::UserError("bad argument".to_string());
        assert_eq!(err.exit_code(), exit_codes::USER_ERROR);
    }

    #[test]
    fn parse_errors_have_parse_exit_code() {
        let err: VdiffError =
            DiffParseError::new(DiffErrorKind::EndifWithoutIf, DiffLineNumber::new(3, 2, 2))
                .into();
        assert_eq!(err.exit_code(), exit_codes::PARSE_FAILURE);

        let err = VdiffError::InvalidPatch("hunk out of range".to_string());
        assert_eq!(err.exit_code(), exit_codes::PARSE_FAILURE);
    }

    #[test]
    fn git_error_has_correct_exit_code() {
        let err = VdiffError::GitError("unknown revision".to_string());
        assert_eq!(err.exit_code(), exit_codes::GIT_FAILURE);
    }

    #[test]
    fn parse_error_message_names_kind_and_position() {
        let err = DiffParseError::new(
            DiffErrorKind::ElseAfterElse,
            DiffLineNumber::new(7, 5, DiffLineNumber::INVALID),
        );
        assert_eq!(
            err.to_string(),
            "#else or #elif after #else at (old: 5, diff: 7, new: -1)"
        );
    }

    #[test]
    fn formula_errors_convert_into_kind() {
        let kind: DiffErrorKind = FormulaError::EmptyCondition.into();
        assert!(matches!(kind, DiffErrorKind::UnparseableFormula(_)));
        assert!(kind.to_string().starts_with("unparseable formula: "));
    }
}
