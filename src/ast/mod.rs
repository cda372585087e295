//! Typed AST for parsed search queries.
//!
//! A query parses into a flat, ordered sequence of [`Term`]s; groups nest
//! terms recursively. Every node carries its exact source slice and byte
//! span, which is what makes the join round-trip exact.

mod filter;
mod key;
mod span;
mod term;
mod value;
pub mod visitor;

pub use filter::{Filter, FilterType, FilterTypeConfig, InvalidFilter, Operator};
pub use key::{
    AggregateArg, AggregateArgs, AggregateKey, AggregateParam, ExplicitTagKey, Key, KeyKind,
    SimpleKey,
};
pub use span::{merge_spans, Span};
pub use term::{BooleanOp, FreeText, LogicBoolean, LogicGroup, Spaces, Term};
pub use value::{
    BooleanValue, DurationUnit, DurationValue, Iso8601DateValue, ListItem, NumberListValue,
    NumberUnit, NumberValue, PercentageValue, RelativeDateUnit, RelativeDateValue, RelativeSign,
    TextListValue, TextValue, Value, ValueKind,
};
pub use visitor::{walk_logic_group, walk_term, walk_terms, InvalidFilterCollector, TermVisitor};
