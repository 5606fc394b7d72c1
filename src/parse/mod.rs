//! Parsing of diffs and source files into variation diffs.
//!
//! Physical lines are assembled into logical lines, tagged with their
//! position in the diff and both files, and fed into a dual-stack parser
//! that tracks the nesting of annotations before and after the edit.

mod directive;
mod logical_line;
mod options;
mod parser;


pub use directive::AnnotationSyntax;
pub use logical_line::LogicalLine;
pub use options::ParseOptions;
pub use parser::{parse_diff, parse_diff_lines, parse_variation_tree};
