//! Filter nodes and the static filter-type configuration table.
//!
//! `FilterType` is the discriminant of the filter union: the parser commits
//! one variant per filter during alternation, and the same table that
//! documents each variant's admissible keys, operators and values drives
//! post-parse shape checks and operator introspection for consumers.

use smol_str::SmolStr;
use std::fmt;

use crate::ast::key::{Key, KeyKind};
use crate::ast::value::{Value, ValueKind};
use crate::ast::Span;

/// Comparison operator of a filter.
///
/// `Empty` is the implicit default (`key:value`) and is distinct from an
/// explicit `=`; both survive a join round-trip unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Operator {
    #[default]
    Empty,
    Equal,
    NotEqual,
    GreaterThan,
    GreaterThanEqual,
    LessThan,
    LessThanEqual,
}

impl Operator {
    /// The operator as it appears in source (`""` for the default).
    pub fn as_str(self) -> &'static str {
        match self {
            Operator::Empty => "",
            Operator::Equal => "=",
            Operator::NotEqual => "!=",
            Operator::GreaterThan => ">",
            Operator::GreaterThanEqual => ">=",
            Operator::LessThan => "<",
            Operator::LessThanEqual => "<=",
        }
    }

    /// Returns true for `>`, `>=`, `<` and `<=`.
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            Operator::GreaterThan
                | Operator::GreaterThanEqual
                | Operator::LessThan
                | Operator::LessThanEqual
        )
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The sixteen filter variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterType {
    Text,
    TextIn,
    Date,
    SpecificDate,
    RelativeDate,
    Duration,
    Numeric,
    NumericIn,
    Boolean,
    AggregateDuration,
    AggregateNumeric,
    AggregatePercentage,
    AggregateDate,
    AggregateRelativeDate,
    Has,
    Is,
}

impl FilterType {
    /// Canonical name of this filter type.
    pub fn as_str(self) -> &'static str {
        match self {
            FilterType::Text => "text",
            FilterType::TextIn => "textIn",
            FilterType::Date => "date",
            FilterType::SpecificDate => "specificDate",
            FilterType::RelativeDate => "relativeDate",
            FilterType::Duration => "duration",
            FilterType::Numeric => "numeric",
            FilterType::NumericIn => "numericIn",
            FilterType::Boolean => "boolean",
            FilterType::AggregateDuration => "aggregateDuration",
            FilterType::AggregateNumeric => "aggregateNumeric",
            FilterType::AggregatePercentage => "aggregatePercentage",
            FilterType::AggregateDate => "aggregateDate",
            FilterType::AggregateRelativeDate => "aggregateRelativeDate",
            FilterType::Has => "has",
            FilterType::Is => "is",
        }
    }

    /// The static shape configuration for this filter type.
    pub fn config(self) -> &'static FilterTypeConfig {
        match self {
            FilterType::Text => &TEXT_CONFIG,
            FilterType::TextIn => &TEXT_IN_CONFIG,
            FilterType::Date => &DATE_CONFIG,
            FilterType::SpecificDate => &SPECIFIC_DATE_CONFIG,
            FilterType::RelativeDate => &RELATIVE_DATE_CONFIG,
            FilterType::Duration => &DURATION_CONFIG,
            FilterType::Numeric => &NUMERIC_CONFIG,
            FilterType::NumericIn => &NUMERIC_IN_CONFIG,
            FilterType::Boolean => &BOOLEAN_CONFIG,
            FilterType::AggregateDuration => &AGGREGATE_DURATION_CONFIG,
            FilterType::AggregateNumeric => &AGGREGATE_NUMERIC_CONFIG,
            FilterType::AggregatePercentage => &AGGREGATE_PERCENTAGE_CONFIG,
            FilterType::AggregateDate => &AGGREGATE_DATE_CONFIG,
            FilterType::AggregateRelativeDate => &AGGREGATE_RELATIVE_DATE_CONFIG,
            FilterType::Has => &HAS_CONFIG,
            FilterType::Is => &IS_CONFIG,
        }
    }

    /// Filter types whose operator sets are merged with this one when
    /// computing admissible operators for operator pickers.
    pub fn interchangeable(self) -> &'static [FilterType] {
        match self {
            FilterType::Date => &[FilterType::SpecificDate],
            FilterType::SpecificDate => &[FilterType::Date],
            _ => &[],
        }
    }

    /// Admissible operators for this filter type, unioned across its
    /// interchangeable types.
    pub fn valid_operators(self) -> Vec<Operator> {
        let mut ops: Vec<Operator> = self.config().valid_ops.to_vec();
        for other in self.interchangeable() {
            for op in other.config().valid_ops {
                if !ops.contains(op) {
                    ops.push(*op);
                }
            }
        }
        ops
    }

    /// Whether a filter of this type may carry the `!key:value` negation.
    pub fn can_negate(self) -> bool {
        self.config().can_negate
    }
}

impl fmt::Display for FilterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Shape configuration for one [`FilterType`].
///
/// An empty `valid_values` slice means the value slot is unconstrained
/// (only `Has` uses this).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterTypeConfig {
    pub valid_keys: &'static [KeyKind],
    pub valid_ops: &'static [Operator],
    pub valid_values: &'static [ValueKind],
    pub can_negate: bool,
}

const ALL_OPERATORS: &[Operator] = &[
    Operator::Empty,
    Operator::Equal,
    Operator::NotEqual,
    Operator::GreaterThan,
    Operator::GreaterThanEqual,
    Operator::LessThan,
    Operator::LessThanEqual,
];

const DEFAULT_OR_NEGATED: &[Operator] = &[Operator::Empty, Operator::NotEqual];

const TEXT_CONFIG: FilterTypeConfig = FilterTypeConfig {
    valid_keys: &[KeyKind::Simple, KeyKind::ExplicitTag],
    valid_ops: DEFAULT_OR_NEGATED,
    valid_values: &[ValueKind::Text],
    can_negate: true,
};

const TEXT_IN_CONFIG: FilterTypeConfig = FilterTypeConfig {
    valid_keys: &[KeyKind::Simple, KeyKind::ExplicitTag],
    valid_ops: &[Operator::Empty],
    valid_values: &[ValueKind::TextList],
    can_negate: true,
};

const DATE_CONFIG: FilterTypeConfig = FilterTypeConfig {
    valid_keys: &[KeyKind::Simple],
    valid_ops: ALL_OPERATORS,
    valid_values: &[ValueKind::Iso8601Date],
    can_negate: false,
};

const SPECIFIC_DATE_CONFIG: FilterTypeConfig = FilterTypeConfig {
    valid_keys: &[KeyKind::Simple],
    valid_ops: &[Operator::Empty],
    valid_values: &[ValueKind::Iso8601Date],
    can_negate: false,
};

const RELATIVE_DATE_CONFIG: FilterTypeConfig = FilterTypeConfig {
    valid_keys: &[KeyKind::Simple],
    valid_ops: &[Operator::Empty],
    valid_values: &[ValueKind::RelativeDate],
    can_negate: false,
};

const DURATION_CONFIG: FilterTypeConfig = FilterTypeConfig {
    valid_keys: &[KeyKind::Simple],
    valid_ops: ALL_OPERATORS,
    valid_values: &[ValueKind::Duration],
    can_negate: true,
};

const NUMERIC_CONFIG: FilterTypeConfig = FilterTypeConfig {
    valid_keys: &[KeyKind::Simple],
    valid_ops: ALL_OPERATORS,
    valid_values: &[ValueKind::Number],
    can_negate: true,
};

const NUMERIC_IN_CONFIG: FilterTypeConfig = FilterTypeConfig {
    valid_keys: &[KeyKind::Simple],
    valid_ops: &[Operator::Empty],
    valid_values: &[ValueKind::NumberList],
    can_negate: true,
};

const BOOLEAN_CONFIG: FilterTypeConfig = FilterTypeConfig {
    valid_keys: &[KeyKind::Simple],
    valid_ops: DEFAULT_OR_NEGATED,
    valid_values: &[ValueKind::Boolean],
    can_negate: true,
};

const AGGREGATE_DURATION_CONFIG: FilterTypeConfig = FilterTypeConfig {
    valid_keys: &[KeyKind::Aggregate],
    valid_ops: ALL_OPERATORS,
    valid_values: &[ValueKind::Duration],
    can_negate: true,
};

const AGGREGATE_NUMERIC_CONFIG: FilterTypeConfig = FilterTypeConfig {
    valid_keys: &[KeyKind::Aggregate],
    valid_ops: ALL_OPERATORS,
    valid_values: &[ValueKind::Number],
    can_negate: true,
};

const AGGREGATE_PERCENTAGE_CONFIG: FilterTypeConfig = FilterTypeConfig {
    valid_keys: &[KeyKind::Aggregate],
    valid_ops: ALL_OPERATORS,
    valid_values: &[ValueKind::Percentage],
    can_negate: true,
};

const AGGREGATE_DATE_CONFIG: FilterTypeConfig = FilterTypeConfig {
    valid_keys: &[KeyKind::Aggregate],
    valid_ops: ALL_OPERATORS,
    valid_values: &[ValueKind::Iso8601Date],
    can_negate: true,
};

const AGGREGATE_RELATIVE_DATE_CONFIG: FilterTypeConfig = FilterTypeConfig {
    valid_keys: &[KeyKind::Aggregate],
    valid_ops: ALL_OPERATORS,
    valid_values: &[ValueKind::RelativeDate],
    can_negate: true,
};

const HAS_CONFIG: FilterTypeConfig = FilterTypeConfig {
    valid_keys: &[KeyKind::Simple],
    valid_ops: DEFAULT_OR_NEGATED,
    valid_values: &[],
    can_negate: true,
};

const IS_CONFIG: FilterTypeConfig = FilterTypeConfig {
    valid_keys: &[KeyKind::Simple],
    valid_ops: DEFAULT_OR_NEGATED,
    valid_values: &[ValueKind::Text],
    can_negate: true,
};

/// A structured invalidity verdict attached to a filter.
#[derive(Debug, Clone, PartialEq)]
pub struct InvalidFilter {
    /// Human-readable reason the filter is invalid.
    pub reason: String,
    /// Filter types the key's cataloged type expected, as a repair hint.
    /// Empty when no hint applies.
    pub expected_type: Vec<FilterType>,
}

impl InvalidFilter {
    /// A verdict without a repair hint.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            expected_type: Vec::new(),
        }
    }

    /// A verdict hinting at the filter types the key expected.
    pub fn with_expected(reason: impl Into<String>, expected_type: Vec<FilterType>) -> Self {
        Self {
            reason: reason.into(),
            expected_type,
        }
    }
}

/// A committed filter term.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    /// The committed variant.
    pub filter: FilterType,
    pub key: Key,
    pub value: Value,
    pub operator: Operator,
    /// Whether the filter was written in the `!key:value` form.
    pub negated: bool,
    /// `None` when the filter passed every semantic check.
    pub invalid: Option<InvalidFilter>,
    /// Exact source slice, negation and operator included.
    pub text: SmolStr,
    pub span: Span,
}

impl Filter {
    /// Whether the filter passed every semantic check.
    pub fn is_valid(&self) -> bool {
        self.invalid.is_none()
    }
}
