//! Top-level terms of a parsed query.

use smol_str::SmolStr;
use std::fmt;

use crate::ast::filter::Filter;
use crate::ast::Span;

/// A logical connective between terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BooleanOp {
    And,
    Or,
}

/// An `AND`/`OR` term. Only produced when the config enables boolean
/// operators; otherwise the same token parses as free text.
#[derive(Debug, Clone, PartialEq)]
pub struct LogicBoolean {
    pub op: BooleanOp,
    /// Exact source slice, original casing preserved.
    pub text: SmolStr,
    pub span: Span,
}

/// A parenthesized group of terms. Groups nest.
#[derive(Debug, Clone, PartialEq)]
pub struct LogicGroup {
    pub terms: Vec<Term>,
    /// Exact source slice, parentheses included.
    pub text: SmolStr,
    pub span: Span,
}

/// A whitespace-delimited run that is not a filter, group or operator.
#[derive(Debug, Clone, PartialEq)]
pub struct FreeText {
    /// The payload with quotes stripped and escapes resolved.
    pub value: SmolStr,
    pub quoted: bool,
    pub text: SmolStr,
    pub span: Span,
}

/// A run of ASCII whitespace between terms.
#[derive(Debug, Clone, PartialEq)]
pub struct Spaces {
    pub text: SmolStr,
    pub span: Span,
}

/// One top-level element of the parsed query.
///
/// Concatenating every term's `text` in order reconstructs the input
/// exactly.
#[derive(Debug, Clone, PartialEq)]
pub enum Term {
    LogicBoolean(LogicBoolean),
    LogicGroup(LogicGroup),
    Filter(Box<Filter>),
    FreeText(FreeText),
    Spaces(Spaces),
}

impl Term {
    /// The exact source slice of this term.
    pub fn text(&self) -> &SmolStr {
        match self {
            Term::LogicBoolean(term) => &term.text,
            Term::LogicGroup(term) => &term.text,
            Term::Filter(term) => &term.text,
            Term::FreeText(term) => &term.text,
            Term::Spaces(term) => &term.text,
        }
    }

    /// The source span of this term.
    pub fn span(&self) -> &Span {
        match self {
            Term::LogicBoolean(term) => &term.span,
            Term::LogicGroup(term) => &term.span,
            Term::Filter(term) => &term.span,
            Term::FreeText(term) => &term.span,
            Term::Spaces(term) => &term.span,
        }
    }

    /// Returns the filter when this term is one.
    pub fn as_filter(&self) -> Option<&Filter> {
        match self {
            Term::Filter(filter) => Some(filter),
            _ => None,
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text())
    }
}
