//! Serialization of variation diffs.
//!
//! - [`linegraph`]: the line graph text format, export and import
//! - [`json`]: a flat JSON node list
//! - [`text`]: an indented outline for terminals

pub mod json;
pub mod linegraph;
pub mod text;


pub use json::{JsonNode, JsonTree, to_json};
pub use text::render;
