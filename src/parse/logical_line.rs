//! Assembly of physical lines into logical lines.

use crate::diff::DiffLineNumber;

/// One or more physical lines joined by line continuations or by a block
/// comment spanning several lines.
#[derive(Debug, Clone, Default)]
pub struct LogicalLine {
    lines: Vec<String>,
    is_continued: bool,
    in_comment: bool,
    start: DiffLineNumber,
}

impl LogicalLine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return to the empty, not started state.
    pub fn reset(&mut self) {
        self.lines.clear();
        self.is_continued = false;
        self.in_comment = false;
        self.start = DiffLineNumber::invalid();
    }

    /// Append a physical line located at `line_number`.
    ///
    /// Must not be called on a complete logical line.
    pub fn consume(&mut self, line: &str, line_number: DiffLineNumber) {
        debug_assert!(!self.is_complete(), "consume on a complete logical line");

        if !self.has_started() {
            self.start = line_number;
        }

        self.is_continued = line.ends_with('\\');

        self.in_comment = ends_in_comment(line, self.in_comment);

        self.lines.push(line.to_string());
    }

    pub fn has_started(&self) -> bool {
        !self.lines.is_empty()
    }

    /// Returns true iff the last physical line neither continues nor leaves
    /// a block comment open.
    pub fn is_complete(&self) -> bool {
        self.has_started() && !self.is_continued && !self.in_comment
    }

    /// Position of the first physical line.
    pub fn start_line_number(&self) -> DiffLineNumber {
        self.start
    }

    /// The physical lines consumed so far.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// The physical lines concatenated, with continuation backslashes removed.
    pub fn text(&self) -> String {
        self.lines
            .iter()
            .map(|line| line.strip_suffix('\\').unwrap_or(line.as_str()))
            .collect()
    }
}

/// Whether a block comment is open at the end of `line`, given whether
/// one was open at its start.
///
/// Outside a block comment, `//` ends the scan: a `/*` behind it is part
/// of the line comment.
fn ends_in_comment(line: &str, mut in_comment: bool) -> bool {
    let mut rest = line;
    loop {
        if in_comment {
            match rest.find("*/") {
                Some(end) => {
                    rest = &rest[end + 2..];
                    in_comment = false;
                }
                None => return true,
            }
        } else {
            let start = rest.find("/*");
            match (rest.find("//"), start) {
                (Some(line_comment), Some(start)) if line_comment < start => return false,
                (_, Some(start)) => {
                    rest = &rest[start + 2..];
                    in_comment = true;
                }
                (_, None) => return false,
            }
        }
    }
}
