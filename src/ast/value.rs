//! Value subtrees: the right-hand side of a filter.
//!
//! Each value node keeps the exact source slice it was recognized from
//! (`text`) alongside its normalized payload, so the AST can always be
//! joined back into the original query byte-for-byte.

use chrono::{DateTime, Utc};
use smol_str::SmolStr;
use std::fmt;

use crate::ast::Span;

/// Multiplier suffix on a numeric value (`500k`, `2.5m`, `3b`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NumberUnit {
    /// No suffix.
    #[default]
    None,
    /// The `k` suffix, thousands.
    Thousand,
    /// The `m` suffix, millions.
    Million,
    /// The `b` suffix, billions.
    Billion,
}

impl NumberUnit {
    /// Returns the factor this suffix applies to the numeric part.
    pub fn multiplier(self) -> f64 {
        match self {
            NumberUnit::None => 1.0,
            NumberUnit::Thousand => 1e3,
            NumberUnit::Million => 1e6,
            NumberUnit::Billion => 1e9,
        }
    }

    /// The suffix as it appears in source.
    pub fn as_str(self) -> &'static str {
        match self {
            NumberUnit::None => "",
            NumberUnit::Thousand => "k",
            NumberUnit::Million => "m",
            NumberUnit::Billion => "b",
        }
    }

    /// Maps a suffix character to its unit.
    pub fn from_suffix(ch: char) -> Option<Self> {
        match ch {
            'k' => Some(NumberUnit::Thousand),
            'm' => Some(NumberUnit::Million),
            'b' => Some(NumberUnit::Billion),
            _ => None,
        }
    }
}

/// Unit of a duration value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationUnit {
    Milliseconds,
    Seconds,
    Minutes,
    Hours,
    Days,
    Weeks,
}

impl DurationUnit {
    /// Maps a source suffix (`ms`, `s`, `min`, `m`, `hr`, `h`, `day`, `d`,
    /// `wk`, `w`) to its unit.
    pub fn from_suffix(suffix: &str) -> Option<Self> {
        match suffix {
            "ms" => Some(DurationUnit::Milliseconds),
            "s" => Some(DurationUnit::Seconds),
            "min" | "m" => Some(DurationUnit::Minutes),
            "hr" | "h" => Some(DurationUnit::Hours),
            "day" | "d" => Some(DurationUnit::Days),
            "wk" | "w" => Some(DurationUnit::Weeks),
            _ => None,
        }
    }

    /// Number of milliseconds in one of this unit.
    pub fn in_milliseconds(self) -> f64 {
        match self {
            DurationUnit::Milliseconds => 1.0,
            DurationUnit::Seconds => 1e3,
            DurationUnit::Minutes => 60.0 * 1e3,
            DurationUnit::Hours => 60.0 * 60.0 * 1e3,
            DurationUnit::Days => 24.0 * 60.0 * 60.0 * 1e3,
            DurationUnit::Weeks => 7.0 * 24.0 * 60.0 * 60.0 * 1e3,
        }
    }
}

/// Sign of a relative date (`+1h` vs `-24h`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelativeSign {
    Plus,
    Minus,
}

impl RelativeSign {
    pub fn as_str(self) -> &'static str {
        match self {
            RelativeSign::Plus => "+",
            RelativeSign::Minus => "-",
        }
    }
}

/// Unit of a relative date offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelativeDateUnit {
    Weeks,
    Days,
    Hours,
    Minutes,
}

impl RelativeDateUnit {
    /// Maps a source suffix (`w`, `d`, `h`, `m`) to its unit.
    pub fn from_suffix(ch: char) -> Option<Self> {
        match ch {
            'w' => Some(RelativeDateUnit::Weeks),
            'd' => Some(RelativeDateUnit::Days),
            'h' => Some(RelativeDateUnit::Hours),
            'm' => Some(RelativeDateUnit::Minutes),
            _ => None,
        }
    }
}

/// A plain text value, quoted or bare.
#[derive(Debug, Clone, PartialEq)]
pub struct TextValue {
    /// The payload with quotes stripped and `\"` / `\\` escapes resolved.
    pub value: SmolStr,
    /// Whether the source was enclosed in double quotes.
    pub quoted: bool,
    /// Exact source slice, quotes included.
    pub text: SmolStr,
    pub span: Span,
}

/// One entry of a bracketed list, with the raw separator text (leading
/// whitespace, comma, trailing whitespace) that preceded it in source.
#[derive(Debug, Clone, PartialEq)]
pub struct ListItem<T> {
    /// Raw text between the previous item (or `[`) and this value.
    pub separator: SmolStr,
    pub value: T,
}

/// A bracketed list of text values (`key:[a, b, c]`).
#[derive(Debug, Clone, PartialEq)]
pub struct TextListValue {
    pub items: Vec<ListItem<TextValue>>,
    pub text: SmolStr,
    pub span: Span,
}

/// A numeric value with an optional multiplier suffix.
#[derive(Debug, Clone, PartialEq)]
pub struct NumberValue {
    /// The numeric portion as written, suffix excluded (`"2.5"` for `2.5m`).
    pub value: SmolStr,
    /// The numeric portion multiplied out (`2_500_000.0` for `2.5m`).
    pub raw_value: f64,
    pub unit: NumberUnit,
    pub text: SmolStr,
    pub span: Span,
}

/// A bracketed list of numeric values (`key:[1, 2, 3]`).
#[derive(Debug, Clone, PartialEq)]
pub struct NumberListValue {
    pub items: Vec<ListItem<NumberValue>>,
    pub text: SmolStr,
    pub span: Span,
}

/// A boolean value. True iff the source token lowercased is `1` or `true`.
#[derive(Debug, Clone, PartialEq)]
pub struct BooleanValue {
    pub value: bool,
    pub text: SmolStr,
    pub span: Span,
}

/// A duration value (`500ms`, `1.5h`).
#[derive(Debug, Clone, PartialEq)]
pub struct DurationValue {
    pub value: f64,
    pub unit: DurationUnit,
    pub text: SmolStr,
    pub span: Span,
}

impl DurationValue {
    /// The duration normalized to milliseconds.
    pub fn as_milliseconds(&self) -> f64 {
        self.value * self.unit.in_milliseconds()
    }
}

/// A percentage value. The number is stored exactly as written: `50%`
/// yields `50.0`, not `0.5`.
#[derive(Debug, Clone, PartialEq)]
pub struct PercentageValue {
    pub value: f64,
    pub text: SmolStr,
    pub span: Span,
}

/// An ISO-8601 date or datetime, normalized to UTC.
///
/// Date-only input (`2023-01-01`) maps to midnight UTC; datetimes without
/// an offset are taken as UTC.
#[derive(Debug, Clone, PartialEq)]
pub struct Iso8601DateValue {
    pub value: DateTime<Utc>,
    pub text: SmolStr,
    pub span: Span,
}

/// A relative date offset (`-24h`, `+7d`).
#[derive(Debug, Clone, PartialEq)]
pub struct RelativeDateValue {
    pub value: u64,
    pub sign: RelativeSign,
    pub unit: RelativeDateUnit,
    pub text: SmolStr,
    pub span: Span,
}

/// Discriminator for [`Value`] variants, used by the filter-type
/// configuration table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Text,
    TextList,
    Number,
    NumberList,
    Boolean,
    Duration,
    Percentage,
    Iso8601Date,
    RelativeDate,
}

/// The value subtree of a filter.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(TextValue),
    TextList(TextListValue),
    Number(NumberValue),
    NumberList(NumberListValue),
    Boolean(BooleanValue),
    Duration(DurationValue),
    Percentage(PercentageValue),
    Iso8601Date(Iso8601DateValue),
    RelativeDate(RelativeDateValue),
}

impl Value {
    /// The exact source slice of this value.
    pub fn text(&self) -> &SmolStr {
        match self {
            Value::Text(v) => &v.text,
            Value::TextList(v) => &v.text,
            Value::Number(v) => &v.text,
            Value::NumberList(v) => &v.text,
            Value::Boolean(v) => &v.text,
            Value::Duration(v) => &v.text,
            Value::Percentage(v) => &v.text,
            Value::Iso8601Date(v) => &v.text,
            Value::RelativeDate(v) => &v.text,
        }
    }

    /// The source span of this value.
    pub fn span(&self) -> &Span {
        match self {
            Value::Text(v) => &v.span,
            Value::TextList(v) => &v.span,
            Value::Number(v) => &v.span,
            Value::NumberList(v) => &v.span,
            Value::Boolean(v) => &v.span,
            Value::Duration(v) => &v.span,
            Value::Percentage(v) => &v.span,
            Value::Iso8601Date(v) => &v.span,
            Value::RelativeDate(v) => &v.span,
        }
    }

    /// The variant discriminator.
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Text(_) => ValueKind::Text,
            Value::TextList(_) => ValueKind::TextList,
            Value::Number(_) => ValueKind::Number,
            Value::NumberList(_) => ValueKind::NumberList,
            Value::Boolean(_) => ValueKind::Boolean,
            Value::Duration(_) => ValueKind::Duration,
            Value::Percentage(_) => ValueKind::Percentage,
            Value::Iso8601Date(_) => ValueKind::Iso8601Date,
            Value::RelativeDate(_) => ValueKind::RelativeDate,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text())
    }
}
