//! Aggregate (function) signatures and the builtin aggregate table.
//!
//! Builtin aggregates are resolved by direct name lookup; caller-supplied
//! definitions in the [`SearchConfig`](super::SearchConfig) shadow them.

use smol_str::SmolStr;
use std::fmt;
use std::sync::Arc;

use super::{FieldDefinition, FieldValueType};

/// A column argument handed to a [`ColumnTypes::Check`] predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnArg<'a> {
    /// The argument as written.
    pub name: &'a str,
    /// The cataloged value type of that field, when known.
    pub data_type: Option<FieldValueType>,
}

/// Admissible column types for a `column`-kind parameter: either a fixed
/// list of value types or an arbitrary predicate.
#[derive(Clone)]
pub enum ColumnTypes {
    /// The column's cataloged type must be one of these.
    Types(Vec<FieldValueType>),
    /// Caller-supplied predicate over the column argument.
    Check(Arc<dyn Fn(&ColumnArg<'_>) -> bool + Send + Sync>),
}

impl ColumnTypes {
    /// Accepts any column, known or unknown.
    pub fn any() -> Self {
        ColumnTypes::Check(Arc::new(|_| true))
    }
}

impl fmt::Debug for ColumnTypes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnTypes::Types(types) => f.debug_tuple("Types").field(types).finish(),
            ColumnTypes::Check(_) => f.write_str("Check(..)"),
        }
    }
}

/// One option of a `dropdown`-kind parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropdownOption {
    pub value: SmolStr,
}

/// The kind of an aggregate parameter.
#[derive(Debug, Clone)]
pub enum AggregateParamKind {
    /// A field reference, checked against the catalog.
    Column { column_types: ColumnTypes },
    /// One of a fixed set of options.
    Dropdown { options: Vec<DropdownOption> },
    /// A literal value of a fixed type.
    Value { data_type: FieldValueType },
}

/// One parameter of an aggregate signature.
#[derive(Debug, Clone)]
pub struct AggregateParameter {
    pub name: SmolStr,
    pub kind: AggregateParamKind,
    pub required: bool,
}

impl AggregateParameter {
    /// A `column`-kind parameter.
    pub fn column(name: impl Into<SmolStr>, column_types: ColumnTypes, required: bool) -> Self {
        Self {
            name: name.into(),
            kind: AggregateParamKind::Column { column_types },
            required,
        }
    }

    /// A `dropdown`-kind parameter.
    pub fn dropdown(name: impl Into<SmolStr>, options: &[&str], required: bool) -> Self {
        Self {
            name: name.into(),
            kind: AggregateParamKind::Dropdown {
                options: options
                    .iter()
                    .map(|option| DropdownOption {
                        value: SmolStr::from(*option),
                    })
                    .collect(),
            },
            required,
        }
    }

    /// A `value`-kind parameter.
    pub fn value(name: impl Into<SmolStr>, data_type: FieldValueType, required: bool) -> Self {
        Self {
            name: name.into(),
            kind: AggregateParamKind::Value { data_type },
            required,
        }
    }
}

/// The parameter schema of one aggregate.
#[derive(Debug, Clone, Default)]
pub struct AggregateDefinition {
    pub parameters: Vec<AggregateParameter>,
}

impl AggregateDefinition {
    pub fn new(parameters: Vec<AggregateParameter>) -> Self {
        Self { parameters }
    }

    /// Number of parameters that must be supplied.
    pub fn required_count(&self) -> usize {
        self.parameters.iter().filter(|param| param.required).count()
    }
}

/// Column types accepted by the numeric aggregations.
fn numeric_columns() -> ColumnTypes {
    ColumnTypes::Types(vec![
        FieldValueType::Duration,
        FieldValueType::Number,
        FieldValueType::Integer,
        FieldValueType::Percentage,
    ])
}

/// Resolves a builtin aggregate signature by name.
pub(crate) fn builtin_aggregate_definition(name: &str) -> Option<AggregateDefinition> {
    let definition = match name {
        "count" | "epm" | "eps" | "failure_rate" | "last_seen" => AggregateDefinition::new(vec![]),
        "count_unique" => AggregateDefinition::new(vec![AggregateParameter::column(
            "column",
            ColumnTypes::any(),
            true,
        )]),
        "count_if" => AggregateDefinition::new(vec![
            // Any non-boolean column, unknown tags included.
            AggregateParameter::column(
                "column",
                ColumnTypes::Check(Arc::new(|arg| {
                    !matches!(arg.data_type, Some(FieldValueType::Boolean))
                })),
                true,
            ),
            AggregateParameter::dropdown(
                "condition",
                &["equals", "notEquals", "less", "greater"],
                true,
            ),
            AggregateParameter::value("value", FieldValueType::String, true),
        ]),
        "avg" | "sum" | "min" | "max" => AggregateDefinition::new(vec![
            AggregateParameter::column("column", numeric_columns(), true),
        ]),
        "p50" | "p75" | "p95" | "p99" | "p100" => AggregateDefinition::new(vec![
            AggregateParameter::column("column", numeric_columns(), false),
        ]),
        "percentile" => AggregateDefinition::new(vec![
            AggregateParameter::column("column", numeric_columns(), true),
            AggregateParameter::value("percentile", FieldValueType::Number, true),
        ]),
        "apdex" | "user_misery" => AggregateDefinition::new(vec![AggregateParameter::value(
            "threshold",
            FieldValueType::Number,
            false,
        )]),
        _ => return None,
    };
    Some(definition)
}

/// Resolves the field definition (kind + return type) of a builtin
/// aggregate. Percentile-style aggregates return `None` for the value
/// type: their return type follows the column they aggregate over.
pub(crate) fn builtin_function_definition(name: &str) -> Option<FieldDefinition> {
    let definition = match name {
        "count" | "count_if" | "epm" | "eps" | "apdex" | "user_misery" => {
            FieldDefinition::function(FieldValueType::Number)
        }
        "count_unique" => FieldDefinition::function(FieldValueType::Integer),
        "failure_rate" => FieldDefinition::function(FieldValueType::Percentage),
        "last_seen" => FieldDefinition::function(FieldValueType::Date),
        "avg" | "sum" | "min" | "max" | "p50" | "p75" | "p95" | "p99" | "p100" | "percentile" => {
            FieldDefinition::function(None)
        }
        _ => return None,
    };
    Some(definition)
}
