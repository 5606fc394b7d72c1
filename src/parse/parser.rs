//! The dual-stack variation diff parser.
//!
//! The parser keeps one stack of open annotations per [`Time`]. Each
//! completed logical line either closes the innermost if-chain (`endif`),
//! extends the previous artifact (line collapsing), or becomes a new node
//! below the top of every stack it exists at.

use crate::diff::{DiffLineNumber, DiffType, Time};
use crate::error::{DiffErrorKind, DiffParseError};
use crate::tree::{DiffNode, NodeId, NodeType, VariationDiff};

use super::logical_line::LogicalLine;
use super::options::ParseOptions;

type ParseResult<T> = std::result::Result<T, DiffParseError>;

/// Parse a full diff into a variation diff.
///
/// Every line of the diff must start with a diff marker (`+`, `-` or a
/// neutral character such as a space), including the unmodified lines a
/// unified diff would omit. Use [`crate::diff::full_diff`] to obtain such a
/// diff from hunks.
///
/// # Errors
///
/// Returns the first [`DiffParseError`] encountered; no partial tree is produced.
pub fn parse_diff(diff: &str, options: &ParseOptions) -> ParseResult<VariationDiff> {
    parse_diff_lines(diff.lines(), options)
}

/// Like [`parse_diff`], for a diff that is already split into lines.
pub fn parse_diff_lines<'a, I>(lines: I, options: &ParseOptions) -> ParseResult<VariationDiff>
where
    I: IntoIterator<Item = &'a str>,
{
    let lines = lines.into_iter().map(|line| {
        let mut chars = line.chars();
        let diff_type = DiffType::of_diff_line(line);
        chars.next();
        (diff_type, chars.as_str())
    });
    VariationDiffParser::new(options).parse(lines)
}

/// Parse a plain source file into a variation tree.
///
/// Every line is unchanged, so the before and after trees are identical.
pub fn parse_variation_tree(source: &str, options: &ParseOptions) -> ParseResult<VariationDiff> {
    let lines = source
        .lines()
        .map(|line| (DiffType::Unchanged, line));
    VariationDiffParser::new(options).parse(lines)
}

struct VariationDiffParser<'o> {
    options: &'o ParseOptions,
    diff: VariationDiff,
    /// Open annotations per time, the root at the bottom.
    stacks: [Vec<NodeId>; 2],
    /// The previously created node, if it is an artifact that may be extended.
    last_artifact: Option<NodeId>,
}

impl<'o> VariationDiffParser<'o> {
    fn new(options: &'o ParseOptions) -> Self {
        let diff = VariationDiff::new();
        let root = diff.root();
        Self {
            options,
            diff,
            stacks: [vec![root], vec![root]],
            last_artifact: None,
        }
    }

    fn parse<'a, I>(mut self, lines: I) -> ParseResult<VariationDiff>
    where
        I: IntoIterator<Item = (DiffType, &'a str)>,
    {
        let mut before_line = LogicalLine::new();
        let mut after_line = LogicalLine::new();
        // whether the pending logical lines consist of unchanged lines only
        let mut is_unchanged = false;
        let mut line_number = DiffLineNumber::new(0, 0, 0);

        for (diff_type, content) in lines {
            line_number = line_number.add(1, diff_type);

            if self.options.ignore_empty_lines && content.trim().is_empty() {
                continue;
            }

            is_unchanged = diff_type == DiffType::Unchanged
                && (is_unchanged || (!before_line.has_started() && !after_line.has_started()));

            if diff_type.exists_before() {
                before_line.consume(content, line_number);
            }
            if diff_type.exists_after() {
                after_line.consume(content, line_number);
            }

            if is_unchanged && before_line.is_complete() && after_line.is_complete() {
                self.parse_line(&before_line, DiffType::Unchanged, line_number)?;
                before_line.reset();
                after_line.reset();
            } else {
                if before_line.is_complete() {
                    self.parse_line(&before_line, DiffType::Removed, line_number)?;
                    before_line.reset();
                }
                if after_line.is_complete() {
                    self.parse_line(&after_line, DiffType::Added, line_number)?;
                    after_line.reset();
                }
            }
        }

        if before_line.has_started() || after_line.has_started() {
            return Err(DiffParseError::new(
                DiffErrorKind::InvalidLineContinuation,
                line_number,
            ));
        }

        for time in Time::ALL {
            let stack = &self.stacks[time.index()];
            if stack.len() > 1 {
                let unclosed = self.top(time);
                return Err(DiffParseError::new(
                    DiffErrorKind::NotAllAnnotationsClosed,
                    self.diff.node(unclosed).from(),
                ));
            }
        }

        Ok(self.diff)
    }

    fn top(&self, time: Time) -> NodeId {
        self.stacks[time.index()]
            .last()
            .copied()
            .unwrap_or_else(|| self.diff.root())
    }

    /// Turn a completed logical line into tree structure.
    ///
    /// `last_line_number` is the position of the physical line that
    /// completed `line`.
    fn parse_line(
        &mut self,
        line: &LogicalLine,
        diff_type: DiffType,
        last_line_number: DiffLineNumber,
    ) -> ParseResult<()> {
        let from = line.start_line_number().restrict_to(diff_type);
        let to = last_line_number
            .add(1, DiffType::Unchanged)
            .restrict_to(diff_type);

        let keyword = line
            .lines()
            .first()
            .and_then(|first| self.options.syntax.keyword(first));

        if keyword == Some("endif") {
            self.last_artifact = None;
            for time in diff_type.times() {
                self.pop_if_chain(time, from)?;
            }
            return Ok(());
        }

        if keyword.is_none() {
            if let Some(artifact) = self.collapsible_artifact(diff_type, from) {
                let node = self.diff.node_mut(artifact);
                node.extend_label(line.lines().iter().cloned());
                node.set_to(to);
                return Ok(());
            }
        }

        let node_type = match keyword {
            None => NodeType::Artifact,
            Some(keyword) => NodeType::from_keyword(keyword)
                .ok_or_else(|| DiffParseError::new(DiffErrorKind::InvalidMacroName, from))?,
        };

        let formula = if node_type.is_conditional_annotation() {
            let formula = self
                .options
                .formula_parser
                .parse(&line.text())
                .map_err(|e| DiffParseError::new(e.into(), from))?;
            Some(formula)
        } else {
            None
        };

        let node = self.diff.push_node(DiffNode::new(
            diff_type,
            node_type,
            from,
            to,
            formula,
            line.lines().to_vec(),
        ));
        self.add_node(node)?;
        self.last_artifact = (node_type == NodeType::Artifact).then_some(node);
        Ok(())
    }

    /// The previous artifact, if a code line of `diff_type` starting at
    /// `from` may be merged into it.
    fn collapsible_artifact(&self, diff_type: DiffType, from: DiffLineNumber) -> Option<NodeId> {
        if !self.options.collapse_multiple_code_lines {
            return None;
        }
        let artifact = self.last_artifact?;
        let node = self.diff.node(artifact);
        (node.diff_type() == diff_type && node.to().in_diff == from.in_diff).then_some(artifact)
    }

    /// Close the innermost if-chain at `time`.
    ///
    /// Every popped annotation ends where the next element of its chain
    /// begins: the last branch at the `endif` starting at `endif_line`,
    /// earlier branches at the following `elif`/`else`.
    fn pop_if_chain(&mut self, time: Time, endif_line: DiffLineNumber) -> ParseResult<()> {
        let stack = &mut self.stacks[time.index()];
        let mut next_start = endif_line;

        loop {
            let Some(annotation) = stack.pop() else {
                return Err(DiffParseError::new(DiffErrorKind::EndifWithoutIf, endif_line));
            };
            let node = self.diff.node_mut(annotation);
            let to = node.to();
            let closed = DiffLineNumber::new(
                next_start.in_diff.max(to.in_diff),
                to.before_edit,
                to.after_edit,
            )
            .with_at(time, next_start.at(time));
            node.set_to(closed);
            next_start = node.from();

            if node.is_if() {
                break;
            }
        }

        // popping the root means there was no if to close
        if stack.is_empty() {
            return Err(DiffParseError::new(DiffErrorKind::EndifWithoutIf, endif_line));
        }
        Ok(())
    }

    /// Attach `node` below the current stack tops and push it if it is an annotation.
    fn add_node(&mut self, node: NodeId) -> ParseResult<()> {
        let (diff_type, node_type, from) = {
            let node = self.diff.node(node);
            (node.diff_type(), node.node_type(), node.from())
        };

        for time in diff_type.times() {
            let parent = self.top(time);
            self.diff.link(parent, node, time);
        }

        if !node_type.is_annotation() {
            return Ok(());
        }

        for time in diff_type.times() {
            let top = self.top(time);
            let stack = &mut self.stacks[time.index()];
            if matches!(node_type, NodeType::Elif | NodeType::Else) {
                if stack.len() == 1 {
                    return Err(DiffParseError::new(
                        DiffErrorKind::ElseOrElifWithoutIf,
                        from,
                    ));
                }
                if self.diff.node(top).is_else() {
                    return Err(DiffParseError::new(DiffErrorKind::ElseAfterElse, from));
                }
            }
            stack.push(node);
        }
        Ok(())
    }
}
