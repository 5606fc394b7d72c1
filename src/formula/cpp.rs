//! Condition extraction and parsing for C preprocessor directives.
//!
//! Only `||`, `&&`, `!`, parentheses, `defined` and plain identifiers or
//! integers have a propositional meaning. Any other sub-expression
//! (comparisons, arithmetic, macro calls) is abstracted into a single
//! literal whose name is derived from its tokens, e.g. `VERSION >= 2`
//! becomes the literal `VERSION__GEQ__2`.

use super::{Formula, FormulaError, FormulaParser};
use crate::error::{Result, VdiffError};
use regex::Regex;
use std::sync::LazyLock;

static CPP_CONDITION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&condition_pattern("#")).expect("CPP condition regex should compile")
});

static COMMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/\*.*?(?:\*/|$)|//.*").expect("comment regex should compile")
});

fn condition_pattern(introducer: &str) -> String {
    format!(
        r"^[+-]?\s*{}\s*(ifdef|ifndef|if|elif)(\s+(.*)|(\(.*\)))$",
        regex::escape(introducer)
    )
}

/// Formula parser for `#if`, `#ifdef`, `#ifndef` and `#elif` lines.
#[derive(Debug, Clone)]
pub struct CppFormulaParser {
    condition: Regex,
}

impl CppFormulaParser {
    /// Parser for directives introduced by `#`.
    pub fn new() -> Self {
        Self {
            condition: CPP_CONDITION.clone(),
        }
    }

    /// Parser for directives introduced by `introducer` (e.g. `//#`).
    pub fn with_introducer(introducer: &str) -> Result<Self> {
        let condition = Regex::new(&condition_pattern(introducer)).map_err(|e| {
            VdiffError::UserError(format!(
                "invalid annotation introducer '{}': {}",
                introducer, e
            ))
        })?;
        Ok(Self { condition })
    }

    /// Split a directive into its keyword and its condition text.
    ///
    /// Comments inside the condition are removed.
    pub fn extract_condition<'a>(
        &self,
        directive: &'a str,
    ) -> std::result::Result<(&'a str, String), FormulaError> {
        let not_a_directive = || FormulaError::NotADirective(directive.to_string());
        let captures = self.condition.captures(directive).ok_or_else(not_a_directive)?;

        let keyword = captures.get(1).ok_or_else(not_a_directive)?.as_str();
        let condition = captures
            .get(3)
            .or_else(|| captures.get(4))
            .ok_or_else(not_a_directive)?
            .as_str();

        let condition = COMMENT.replace_all(condition, " ").trim().to_string();
        if condition.is_empty() {
            return Err(FormulaError::EmptyCondition);
        }
        Ok((keyword, condition))
    }

    /// Parse a bare condition such as `defined(A) && B > 1`.
    pub fn parse_condition(&self, condition: &str) -> std::result::Result<Formula, FormulaError> {
        let tokens = tokenize(condition);
        if tokens.is_empty() {
            return Err(FormulaError::EmptyCondition);
        }
        ConditionParser::new(&tokens, condition).parse_all()
    }
}

impl Default for CppFormulaParser {
    fn default() -> Self {
        Self::new()
    }
}

impl FormulaParser for CppFormulaParser {
    fn parse(&self, directive: &str) -> std::result::Result<Formula, FormulaError> {
        let (keyword, condition) = self.extract_condition(directive)?;
        let formula = self.parse_condition(&condition)?;
        if keyword == "ifndef" {
            Ok(Formula::not(formula))
        } else {
            Ok(formula)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Ident(String),
    Number(String),
    LParen,
    RParen,
    Not,
    And,
    Or,
    Op(&'static str),
    Other(char),
}

impl Token {
    fn text(&self) -> String {
        match self {
            Token::Ident(text) | Token::Number(text) => text.clone(),
            Token::LParen => "(".to_string(),
            Token::RParen => ")".to_string(),
            Token::Not => "!".to_string(),
            Token::And => "&&".to_string(),
            Token::Or => "||".to_string(),
            Token::Op(op) => op.to_string(),
            Token::Other(c) => c.to_string(),
        }
    }

    fn is_word(&self) -> bool {
        matches!(self, Token::Ident(_) | Token::Number(_))
    }

    /// Name fragment used when abstracting a sub-expression.
    fn abstract_name(&self) -> String {
        let name = match self {
            Token::Ident(text) | Token::Number(text) => return text.clone(),
            Token::Op(",") => return "__".to_string(),
            Token::LParen => "LB",
            Token::RParen => "RB",
            Token::Not => "NOT",
            Token::And => "AND",
            Token::Or => "OR",
            Token::Op(op) => match *op {
                "==" => "EQ",
                "!=" => "NEQ",
                ">=" => "GEQ",
                "<=" => "LEQ",
                ">" => "GT",
                "<" => "LT",
                "+" => "ADD",
                "-" => "SUB",
                "*" => "MUL",
                "/" => "DIV",
                "%" => "MOD",
                "<<" => "LSHIFT",
                ">>" => "RSHIFT",
                "&" => "BAND",
                "|" => "BOR",
                "^" => "XOR",
                "~" => "BNOT",
                "?" => "THEN",
                ":" => "ELSE",
                _ => "OP",
            },
            Token::Other(c) => return format!("__U{:X}__", *c as u32),
        };
        format!("__{}__", name)
    }
}

fn tokenize(condition: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut chars = condition.char_indices().peekable();

    while let Some((start, c)) = chars.next() {
        let token = match c {
            c if c.is_whitespace() => continue,
            c if c.is_ascii_alphabetic() || c == '_' || c.is_ascii_digit() => {
                let mut end = start + c.len_utf8();
                while let Some(&(i, next)) = chars.peek() {
                    if next.is_ascii_alphanumeric() || next == '_' || next == '.' {
                        end = i + next.len_utf8();
                        chars.next();
                    } else {
                        break;
                    }
                }
                let text = condition[start..end].to_string();
                if c.is_ascii_digit() {
                    Token::Number(text)
                } else {
                    Token::Ident(text)
                }
            }
            '(' => Token::LParen,
            ')' => Token::RParen,
            '!' | '=' | '>' | '<' | '&' | '|' => {
                let next = chars.peek().map(|&(_, next)| next);
                let (token, consumes_next) = match (c, next) {
                    ('!', Some('=')) => (Token::Op("!="), true),
                    ('!', _) => (Token::Not, false),
                    ('=', Some('=')) => (Token::Op("=="), true),
                    ('=', _) => (Token::Op("="), false),
                    ('>', Some('=')) => (Token::Op(">="), true),
                    ('>', Some('>')) => (Token::Op(">>"), true),
                    ('>', _) => (Token::Op(">"), false),
                    ('<', Some('=')) => (Token::Op("<="), true),
                    ('<', Some('<')) => (Token::Op("<<"), true),
                    ('<', _) => (Token::Op("<"), false),
                    ('&', Some('&')) => (Token::And, true),
                    ('&', _) => (Token::Op("&"), false),
                    ('|', Some('|')) => (Token::Or, true),
                    _ => (Token::Op("|"), false),
                };
                if consumes_next {
                    chars.next();
                }
                token
            }
            '+' => Token::Op("+"),
            '-' => Token::Op("-"),
            '*' => Token::Op("*"),
            '/' => Token::Op("/"),
            '%' => Token::Op("%"),
            '^' => Token::Op("^"),
            '~' => Token::Op("~"),
            '?' => Token::Op("?"),
            ':' => Token::Op(":"),
            ',' => Token::Op(","),
            other => Token::Other(other),
        };
        tokens.push(token);
    }

    tokens
}

/// Recursive descent over `||`, `&&` and `!`.
///
/// Everything between those operators is an operand run, which is either
/// recognised as a propositional atom or abstracted into a literal.
struct ConditionParser<'a> {
    tokens: &'a [Token],
    pos: usize,
    condition: &'a str,
}

type ParseResult = std::result::Result<Formula, FormulaError>;

impl<'a> ConditionParser<'a> {
    fn new(tokens: &'a [Token], condition: &'a str) -> Self {
        Self {
            tokens,
            pos: 0,
            condition,
        }
    }

    fn parse_all(mut self) -> ParseResult {
        let formula = self.parse_or()?;
        if self.pos < self.tokens.len() {
            // operand runs only stop early at an unmatched closing parenthesis
            return Err(FormulaError::UnbalancedParentheses(self.condition.to_string()));
        }
        Ok(formula)
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn parse_or(&mut self) -> ParseResult {
        let mut operands = vec![self.parse_and()?];
        while self.peek() == Some(&Token::Or) {
            self.pos += 1;
            operands.push(self.parse_and()?);
        }
        Ok(Formula::or(operands))
    }

    fn parse_and(&mut self) -> ParseResult {
        let mut operands = vec![self.parse_unary()?];
        while self.peek() == Some(&Token::And) {
            self.pos += 1;
            operands.push(self.parse_unary()?);
        }
        Ok(Formula::and(operands))
    }

    fn parse_unary(&mut self) -> ParseResult {
        if self.peek() == Some(&Token::Not) {
            self.pos += 1;
            return Ok(Formula::not(self.parse_unary()?));
        }
        self.parse_run()
    }

    fn parse_run(&mut self) -> ParseResult {
        let start = self.pos;
        let mut depth = 0usize;
        while let Some(token) = self.tokens.get(self.pos) {
            match token {
                Token::LParen => depth += 1,
                Token::RParen if depth == 0 => break,
                Token::RParen => depth -= 1,
                Token::And | Token::Or if depth == 0 => break,
                _ => {}
            }
            self.pos += 1;
        }

        if depth != 0 {
            return Err(FormulaError::UnbalancedParentheses(self.condition.to_string()));
        }

        let run = &self.tokens[start..self.pos];
        if run.is_empty() {
            let token = self
                .peek()
                .map(Token::text)
                .unwrap_or_else(|| "end of condition".to_string());
            return Err(FormulaError::UnexpectedToken {
                token,
                condition: self.condition.to_string(),
            });
        }
        self.interpret_run(run)
    }

    fn interpret_run(&self, run: &[Token]) -> ParseResult {
        match run {
            [Token::Ident(name)] => Ok(Formula::var(name.as_str())),
            [Token::Number(number)] => Ok(number_formula(number)),
            [Token::Ident(defined), Token::Ident(name)] if defined == "defined" => {
                Ok(Formula::var(name.as_str()))
            }
            [Token::Ident(defined), Token::LParen, Token::Ident(name), Token::RParen]
                if defined == "defined" =>
            {
                Ok(Formula::var(name.as_str()))
            }
            [Token::LParen, inner @ .., Token::RParen] if encloses(run) => {
                ConditionParser::new(inner, self.condition).parse_all()
            }
            _ => Ok(Formula::Literal(abstract_name(run))),
        }
    }
}

/// Returns true iff the first token of `run` is an opening parenthesis
/// matched by the last token.
fn encloses(run: &[Token]) -> bool {
    let mut depth = 0usize;
    for (i, token) in run.iter().enumerate() {
        match token {
            Token::LParen => depth += 1,
            Token::RParen => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return i + 1 == run.len();
                }
            }
            _ => {}
        }
    }
    false
}

fn abstract_name(run: &[Token]) -> String {
    let mut name = String::new();
    let mut previous_was_word = false;
    for token in run {
        if token.is_word() && previous_was_word {
            name.push_str("__");
        }
        name.push_str(&token.abstract_name());
        previous_was_word = token.is_word();
    }
    name
}

/// `0` is false and every other integer literal is true.
fn number_formula(text: &str) -> Formula {
    let digits = text.trim_end_matches(['u', 'U', 'l', 'L']);
    let value = if let Some(hex) = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        u64::from_str_radix(hex, 16).ok()
    } else if digits.len() > 1 && digits.starts_with('0') {
        u64::from_str_radix(&digits[1..], 8).ok()
    } else {
        digits.parse::<u64>().ok()
    };

    match value {
        Some(0) => Formula::False,
        Some(_) => Formula::True,
        None => Formula::Literal(text.to_string()),
    }
}
