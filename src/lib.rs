//! vdiff: variation diffs from text diffs.
//!
//! A variation diff describes an edit to a source file that uses
//! conditional compilation. Its nodes are the `#if`, `#elif` and `#else`
//! annotations and the code artifacts of the file; each node is added,
//! removed or unchanged and is nested below one annotation before the edit
//! and one after it.
//!
//! ```
//! use vdiff::parse::{ParseOptions, parse_diff};
//! use vdiff::diff::Time;
//!
//! let diff = parse_diff(" #if A\n+int x;\n #endif\n", &ParseOptions::default())?;
//! assert_eq!(diff.preorder(Time::Before).len(), 2);
//! assert_eq!(diff.preorder(Time::After).len(), 3);
//! # Ok::<(), vdiff::error::DiffParseError>(())
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod diff;
pub mod error;
pub mod events;
pub mod exit_codes;
pub mod formula;
pub mod git;
pub mod parse;
pub mod serialize;
pub mod tree;

#[cfg(test)]
mod test_support;
