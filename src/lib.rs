//! Structured search-query parser.
//!
//! Parses the free-form query language used by observability search bars
//! (`is:unresolved browser:"Chrome 33.0" count():>50 event.timestamp:-24h`)
//! into a typed AST. Every token carries its exact source text and byte
//! span; filters carry a semantic verdict instead of raising errors, so a
//! query with problems still parses and downstream UIs decide what to do
//! with the annotations.
//!
//! # Parse
//!
//! ```
//! use search_syntax::{parse, FilterType, SearchConfig, Term};
//!
//! let config = SearchConfig::for_events();
//! let terms = parse("is:unresolved transaction.duration:>500ms", &config).unwrap();
//!
//! let filters: Vec<_> = terms.iter().filter_map(Term::as_filter).collect();
//! assert_eq!(filters.len(), 2);
//! assert_eq!(filters[0].filter, FilterType::Is);
//! assert_eq!(filters[1].filter, FilterType::Duration);
//! ```
//!
//! # Round trip
//!
//! ```
//! use search_syntax::{join, parse, SearchConfig};
//!
//! let config = SearchConfig::for_events();
//! let query = "foo:bar AND (baz:qux OR quux:[1,2,3])";
//! let terms = parse(query, &config).unwrap();
//! assert_eq!(join(&terms), query);
//! ```
//!
//! # Diagnostic mode
//!
//! `parse` swallows grammar failures and returns `None`. Callers that
//! want structured reports use the parser directly:
//!
//! ```
//! use search_syntax::{Parser, SearchConfig};
//!
//! let config = SearchConfig::new();
//! let result = Parser::new("\"unterminated", &config).parse();
//! assert!(result.ast.is_none());
//! assert!(!result.diagnostics.is_empty());
//! ```

pub mod ast;
pub mod catalog;
pub mod diag;
mod join;
mod parser;
mod semantic;

// Re-export the AST surface.
pub use ast::{
    BooleanOp, Filter, FilterType, FilterTypeConfig, FreeText, InvalidFilter,
    InvalidFilterCollector, Key, KeyKind, LogicBoolean, LogicGroup, Operator, Spaces, Span, Term,
    TermVisitor, Value, ValueKind,
};

// Re-export the catalog surface.
pub use catalog::{
    AggregateDefinition, AggregateParamKind, AggregateParameter, ColumnArg, ColumnTypes,
    FieldDefinition, FieldKind, FieldValueType, SearchConfig,
};

// Re-export the parser and join APIs.
pub use join::{join, join_with, JoinOptions};
pub use parser::{ParseResult, Parser};

/// Parses a query against the supplied field catalog.
///
/// Returns `None` when the grammar cannot recognize the input (the only
/// hard failures are unterminated quotes and unmatched parentheses) and
/// `Some(vec![])` for empty input. Filters that parse but fail semantic
/// checks are returned with their `invalid` verdict set.
pub fn parse(query: &str, config: &SearchConfig) -> Option<Vec<Term>> {
    Parser::new(query, config).parse().ast
}
