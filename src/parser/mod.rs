//! PEG-style recognizer for the search-query language.
//!
//! The top-level production is `term (space term)*`, where a term is a
//! parenthesized group, an `AND`/`OR` operator, a filter, or free text.
//! Alternatives backtrack: a term that fails to parse as a filter is
//! re-read as free text, so the only hard grammar failures are
//! unterminated quotes and unmatched parentheses.

mod cursor;
mod filter;
mod key;
mod value;

use miette::Report;
use smol_str::SmolStr;

use crate::ast::{BooleanOp, FreeText, LogicBoolean, LogicGroup, Spaces, Term};
use crate::catalog::SearchConfig;
use crate::diag::{self, Diag};
use cursor::Cursor;

/// Result type for hard grammar failures.
pub(crate) type PResult<T> = Result<T, Box<Diag>>;

/// Result of parsing a query in diagnostic mode.
#[derive(Debug)]
pub struct ParseResult {
    /// The parsed term sequence, or `None` on grammar failure. A present
    /// AST may still contain invalid-annotated filters; that is not a
    /// parse failure.
    pub ast: Option<Vec<Term>>,
    /// Grammar diagnostics rendered as miette reports.
    pub diagnostics: Vec<Report>,
}

/// Search-query parser over a borrowed query and catalog.
pub struct Parser<'a> {
    cursor: Cursor<'a>,
    config: &'a SearchConfig,
}

impl<'a> Parser<'a> {
    /// Creates a parser for the given query and catalog.
    pub fn new(query: &'a str, config: &'a SearchConfig) -> Self {
        Self {
            cursor: Cursor::new(query),
            config,
        }
    }

    /// Parses the query, reporting grammar failures as diagnostics.
    ///
    /// This is the opt-in diagnostic mode; the top-level
    /// [`parse`](crate::parse) swallows diagnostics and returns `None`.
    pub fn parse(mut self) -> ParseResult {
        let source = self.cursor.source();
        match self.parse_query() {
            Ok(terms) => ParseResult {
                ast: Some(terms),
                diagnostics: Vec::new(),
            },
            Err(diagnostic) => ParseResult {
                ast: None,
                diagnostics: diag::to_reports(&[*diagnostic], source),
            },
        }
    }

    fn parse_query(&mut self) -> PResult<Vec<Term>> {
        let terms = self.parse_terms()?;
        if !self.cursor.is_eof() {
            // Only a stray ')' can stop the term loop early.
            return Err(self.error_here("unmatched ')'"));
        }
        Ok(terms)
    }

    /// `term (space term)*`, stopping at end of input or a `)`.
    fn parse_terms(&mut self) -> PResult<Vec<Term>> {
        let mut terms = Vec::new();
        loop {
            let Some(ch) = self.cursor.peek() else {
                break;
            };
            if ch == ')' {
                break;
            }
            if ch.is_ascii_whitespace() {
                let mark = self.cursor.pos();
                let run = self.cursor.eat_while(|c| c.is_ascii_whitespace());
                terms.push(Term::Spaces(Spaces {
                    text: run.into(),
                    span: mark..self.cursor.pos(),
                }));
                continue;
            }
            terms.push(self.parse_term()?);
        }
        Ok(terms)
    }

    fn parse_term(&mut self) -> PResult<Term> {
        if self.cursor.peek() == Some('(') {
            return self.parse_logic_group();
        }
        if self.config.allow_boolean {
            if let Some(term) = self.try_logic_boolean() {
                return Ok(term);
            }
        }
        if let Some(filter) = self.try_filter() {
            return Ok(Term::Filter(Box::new(filter)));
        }
        self.parse_free_text()
    }

    /// `"(" terms ")"`. An unmatched `(` is a grammar failure.
    fn parse_logic_group(&mut self) -> PResult<Term> {
        let mark = self.cursor.pos();
        self.cursor.advance();
        let terms = self.parse_terms()?;
        if !self.cursor.match_char(')') {
            return Err(Box::new(
                Diag::error("unclosed group")
                    .with_label(mark..mark + 1, "group opened here")
                    .with_help("add a matching ')'"),
            ));
        }
        Ok(Term::LogicGroup(LogicGroup {
            terms,
            text: self.cursor.slice_from(mark).into(),
            span: mark..self.cursor.pos(),
        }))
    }

    /// `AND` / `OR` (case-insensitive), as a whole term.
    fn try_logic_boolean(&mut self) -> Option<Term> {
        let mark = self.cursor.pos();
        for (word, op) in [("AND", BooleanOp::And), ("OR", BooleanOp::Or)] {
            if self.cursor.match_str_ignore_ascii_case(word) && self.at_term_boundary() {
                return Some(Term::LogicBoolean(LogicBoolean {
                    op,
                    text: self.cursor.slice_from(mark).into(),
                    span: mark..self.cursor.pos(),
                }));
            }
            self.cursor.reset(mark);
        }
        None
    }

    /// The catch-all term: a quoted string or a bare run. Quotes are
    /// structural here, so a `"` either opens a terminated string or
    /// fails the grammar.
    fn parse_free_text(&mut self) -> PResult<Term> {
        let mark = self.cursor.pos();
        if self.cursor.peek() == Some('"') {
            let value = self.parse_quoted_string()?;
            return Ok(Term::FreeText(FreeText {
                value,
                quoted: true,
                text: self.cursor.slice_from(mark).into(),
                span: mark..self.cursor.pos(),
            }));
        }
        let run = self.cursor.eat_while(is_free_text_char);
        if run.is_empty() {
            return Err(self.error_here("unexpected character"));
        }
        Ok(Term::FreeText(FreeText {
            value: run.into(),
            quoted: false,
            text: run.into(),
            span: mark..self.cursor.pos(),
        }))
    }

    /// Parses a double-quoted string, resolving `\"` and `\\`; other
    /// escape pairs are kept verbatim.
    pub(crate) fn parse_quoted_string(&mut self) -> PResult<SmolStr> {
        let mark = self.cursor.pos();
        self.cursor.advance();
        let mut value = String::new();
        loop {
            match self.cursor.advance() {
                None => {
                    return Err(Box::new(
                        Diag::error("unterminated quoted string")
                            .with_label(mark..mark + 1, "quote opened here")
                            .with_help("close the quote or escape it with a backslash"),
                    ));
                }
                Some('"') => break,
                Some('\\') => match self.cursor.advance() {
                    None => {
                        return Err(Box::new(
                            Diag::error("unterminated quoted string")
                                .with_label(mark..mark + 1, "quote opened here"),
                        ));
                    }
                    Some('"') => value.push('"'),
                    Some('\\') => value.push('\\'),
                    Some(other) => {
                        value.push('\\');
                        value.push(other);
                    }
                },
                Some(ch) => value.push(ch),
            }
        }
        Ok(value.into())
    }

    /// True at a term boundary: whitespace, a parenthesis, or the end of
    /// input.
    pub(crate) fn at_term_boundary(&self) -> bool {
        match self.cursor.peek() {
            None => true,
            Some(ch) => ch.is_ascii_whitespace() || ch == ')' || ch == '(',
        }
    }

    fn error_here(&self, message: &str) -> Box<Diag> {
        let pos = self.cursor.pos();
        let end = (pos + 1).min(self.cursor.source().len()).max(pos);
        Box::new(Diag::error(message).with_label(pos..end, "here"))
    }
}

fn is_free_text_char(ch: char) -> bool {
    !ch.is_ascii_whitespace() && !matches!(ch, '(' | ')' | '"')
}
