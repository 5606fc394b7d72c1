//! Helper functions for unified diff text.

/// The ranges declared by a hunk header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HunkHeader {
    /// First line of the hunk in the old file (1-based).
    pub old_start: usize,
    /// Number of old lines covered by the hunk.
    pub old_len: usize,
    /// First line of the hunk in the new file (1-based).
    pub new_start: usize,
    /// Number of new lines covered by the hunk.
    pub new_len: usize,
}

impl HunkHeader {
    /// Number of old-file lines that precede the first line of this hunk.
    ///
    /// A hunk that covers no old lines declares the line it is inserted
    /// after, so nothing before it is shifted.
    pub fn old_lines_before(&self) -> usize {
        if self.old_len == 0 {
            self.old_start
        } else {
            self.old_start.saturating_sub(1)
        }
    }
}

/// Parse a hunk header line.
///
/// Format: "@@ -old_start,old_len +new_start,new_len @@" or "@@ -old_start +new_start @@"
/// Also handles: "@@ -old_start,old_len +new_start,new_len @@ context info"
///
/// Omitted lengths default to 1. Returns `None` if the line is not a hunk header.
pub fn parse_hunk_header(line: &str) -> Option<HunkHeader> {
    let line = line.strip_prefix("@@ ")?;

    let end_marker = line.find(" @@")?;
    let range_part = &line[..end_marker];

    let parts: Vec<&str> = range_part.split_whitespace().collect();
    if parts.len() < 2 {
        return None;
    }

    let (old_start, old_len) = parse_range(parts[0].strip_prefix('-')?)?;
    let (new_start, new_len) = parse_range(parts[1].strip_prefix('+')?)?;

    Some(HunkHeader {
        old_start,
        old_len,
        new_start,
        new_len,
    })
}

/// Parse a range specification of the form "start" or "start,len".
fn parse_range(range: &str) -> Option<(usize, usize)> {
    match range.split_once(',') {
        Some((start, len)) => Some((start.parse().ok()?, len.parse().ok()?)),
        None => Some((range.parse().ok()?, 1)),
    }
}

/// Parse the file path from a "diff --git" line (without the prefix).
///
/// Returns the "b/" path (new file path), or None if parsing fails.
pub(super) fn parse_diff_git_line(rest: &str) -> Option<String> {
    // Paths can contain spaces, so split on the last " b/".
    if let Some(b_pos) = rest.rfind(" b/") {
        return Some(normalize_path(&rest[b_pos + 3..]));
    }

    let parts: Vec<&str> = rest.split_whitespace().collect();
    if parts.len() >= 2 {
        if let Some(path) = parts[parts.len() - 1].strip_prefix("b/") {
            return Some(normalize_path(path));
        }
    }

    None
}

/// Normalize a file path to use forward slashes.
pub fn normalize_path(path: &str) -> String {
    path.replace('\\', "/")
}
