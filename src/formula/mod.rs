//! Propositional formulas attached to conditional annotations.
//!
//! The variation diff parser does not understand condition text itself. It
//! hands every `#if`/`#elif` line to a [`FormulaParser`] and stores the
//! resulting [`Formula`] on the node. [`CppFormulaParser`] is the default
//! implementation for C preprocessor directives.

mod cpp;


pub use cpp::CppFormulaParser;

use std::fmt;
use thiserror::Error;

/// A propositional formula over named features.
///
/// Formulas are never simplified or evaluated; they are kept in the shape
/// they were parsed or built in so that printing them is predictable.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Formula {
    True,
    False,
    /// A named feature or an abstracted non-boolean sub-expression.
    Literal(String),
    Not(Box<Formula>),
    And(Vec<Formula>),
    Or(Vec<Formula>),
}

impl Formula {
    pub fn var(name: impl Into<String>) -> Self {
        Formula::Literal(name.into())
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(formula: Formula) -> Self {
        Formula::Not(Box::new(formula))
    }

    /// Conjunction of `operands`; `True` when empty, the operand itself when single.
    pub fn and(mut operands: Vec<Formula>) -> Self {
        match operands.len() {
            0 => Formula::True,
            1 => operands.remove(0),
            _ => Formula::And(operands),
        }
    }

    /// Disjunction of `operands`; `False` when empty, the operand itself when single.
    pub fn or(mut operands: Vec<Formula>) -> Self {
        match operands.len() {
            0 => Formula::False,
            1 => operands.remove(0),
            _ => Formula::Or(operands),
        }
    }

    /// Returns true iff this formula is the constant `True`.
    pub fn is_true(&self) -> bool {
        matches!(self, Formula::True)
    }

    fn is_atomic(&self) -> bool {
        !matches!(self, Formula::And(_) | Formula::Or(_))
    }

    fn write_operand(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_atomic() {
            write!(f, "{}", self)
        } else {
            write!(f, "({})", self)
        }
    }

    fn write_joined(f: &mut fmt::Formatter<'_>, operands: &[Formula], op: &str) -> fmt::Result {
        for (i, operand) in operands.iter().enumerate() {
            if i > 0 {
                f.write_str(op)?;
            }
            operand.write_operand(f)?;
        }
        Ok(())
    }
}

/// Renders in C preprocessor syntax, so the output can be parsed again.
impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Formula::True => f.write_str("1"),
            Formula::False => f.write_str("0"),
            Formula::Literal(name) => f.write_str(name),
            Formula::Not(operand) => {
                f.write_str("!")?;
                operand.write_operand(f)
            }
            Formula::And(operands) => Formula::write_joined(f, operands, " && "),
            Formula::Or(operands) => Formula::write_joined(f, operands, " || "),
        }
    }
}

/// Why a directive's condition could not be turned into a formula.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormulaError {
    #[error("no condition can be extracted from '{0}'")]
    NotADirective(String),

    #[error("empty condition")]
    EmptyCondition,

    #[error("unbalanced parentheses in '{0}'")]
    UnbalancedParentheses(String),

    #[error("unexpected '{token}' in '{condition}'")]
    UnexpectedToken { token: String, condition: String },
}

/// Turns the text of a conditional directive into a formula.
///
/// Implementations receive the complete logical line of an `#if`-like or
/// `#elif`-like directive, with its diff marker and line continuations
/// removed, and must be usable from several parser invocations at once.
pub trait FormulaParser: Send + Sync {
    fn parse(&self, directive: &str) -> Result<Formula, FormulaError>;
}
