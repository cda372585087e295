//! The field catalog supplied to the parser.
//!
//! A [`SearchConfig`] is read-only for the duration of a parse: the
//! grammar's semantic predicates consult it to pick filter variants, and
//! the post-parse validator consults it to attach invalidity verdicts.
//! One config can be shared across concurrent parses without coordination.

pub mod aggregates;

use smol_str::SmolStr;
use std::collections::{HashMap, HashSet};
use std::fmt;

pub use aggregates::{
    AggregateDefinition, AggregateParamKind, AggregateParameter, ColumnArg, ColumnTypes,
    DropdownOption,
};

/// Whether a key names a plain field or an aggregate function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Field,
    Function,
}

/// The value type a field carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldValueType {
    String,
    Number,
    Integer,
    Duration,
    Date,
    Percentage,
    Boolean,
}

impl fmt::Display for FieldValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldValueType::String => "string",
            FieldValueType::Number => "number",
            FieldValueType::Integer => "integer",
            FieldValueType::Duration => "duration",
            FieldValueType::Date => "date",
            FieldValueType::Percentage => "percentage",
            FieldValueType::Boolean => "boolean",
        };
        write!(f, "{name}")
    }
}

/// Catalog metadata for one key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDefinition {
    pub kind: FieldKind,
    /// `None` on a function whose return type follows its column argument.
    pub value_type: Option<FieldValueType>,
    pub deprecated: bool,
    pub desc: Option<SmolStr>,
}

impl FieldDefinition {
    /// A plain field of the given type.
    pub fn field(value_type: FieldValueType) -> Self {
        Self {
            kind: FieldKind::Field,
            value_type: Some(value_type),
            deprecated: false,
            desc: None,
        }
    }

    /// An aggregate function, optionally with a fixed return type.
    pub fn function(value_type: impl Into<Option<FieldValueType>>) -> Self {
        Self {
            kind: FieldKind::Function,
            value_type: value_type.into(),
            deprecated: false,
            desc: None,
        }
    }

    /// Attaches a description.
    pub fn with_desc(mut self, desc: impl Into<SmolStr>) -> Self {
        self.desc = Some(desc.into());
        self
    }

    /// Marks the field deprecated.
    pub fn mark_deprecated(mut self) -> Self {
        self.deprecated = true;
        self
    }
}

/// The runtime field catalog threaded through `parse`.
///
/// The key-type sets steer grammar disambiguation (`count():>50` only
/// commits a numeric variant because `count` is a function; `duration:>5s`
/// only commits a duration variant because the key is in
/// `duration_keys`). Two implicit families augment the sets:
/// `measurements.*` keys are numeric (and duration when the measurement
/// itself is cataloged as one), and `spans.*` span-operation breakdowns
/// are both numeric and duration.
#[derive(Debug, Clone, Default)]
pub struct SearchConfig {
    /// Keys whose values are numbers.
    pub numeric_keys: HashSet<SmolStr>,
    /// Keys whose values are booleans.
    pub boolean_keys: HashSet<SmolStr>,
    /// Keys whose values are percentages.
    pub percentage_keys: HashSet<SmolStr>,
    /// Keys whose values are dates.
    pub date_keys: HashSet<SmolStr>,
    /// Keys whose values are durations.
    pub duration_keys: HashSet<SmolStr>,
    /// Text keys that admit comparison operators, not just `=`/`!=`.
    pub text_operator_keys: HashSet<SmolStr>,
    /// Whether `AND`/`OR` parse as logical operators instead of free text.
    pub allow_boolean: bool,
    fields: HashMap<SmolStr, FieldDefinition>,
    aggregate_definitions: HashMap<SmolStr, AggregateDefinition>,
}

impl SearchConfig {
    /// An empty catalog with boolean operators enabled.
    pub fn new() -> Self {
        Self {
            allow_boolean: true,
            ..Self::default()
        }
    }

    /// Registers a field definition, shadowing any builtin.
    pub fn with_field(mut self, name: impl Into<SmolStr>, definition: FieldDefinition) -> Self {
        self.fields.insert(name.into(), definition);
        self
    }

    /// Registers an aggregate signature, shadowing any builtin.
    pub fn with_aggregate(
        mut self,
        name: impl Into<SmolStr>,
        definition: AggregateDefinition,
    ) -> Self {
        self.aggregate_definitions.insert(name.into(), definition);
        self
    }

    /// Looks up the definition of a key, falling back to the builtin
    /// aggregate table for function names.
    pub fn field_definition(&self, key: &str) -> Option<FieldDefinition> {
        self.fields
            .get(key)
            .cloned()
            .or_else(|| aggregates::builtin_function_definition(key))
    }

    /// Looks up the parameter schema of an aggregate, falling back to the
    /// builtin table.
    pub fn aggregate_definition(&self, name: &str) -> Option<AggregateDefinition> {
        self.aggregate_definitions
            .get(name)
            .cloned()
            .or_else(|| aggregates::builtin_aggregate_definition(name))
    }

    /// Whether the key is an implicit `measurements.*` field.
    pub fn is_measurement(&self, key: &str) -> bool {
        key.starts_with("measurements.")
    }

    /// Whether the key is an implicit `spans.*` operation breakdown.
    pub fn is_span_op_breakdown(&self, key: &str) -> bool {
        key.starts_with("spans.")
    }

    /// Whether the key's values are numbers.
    pub fn is_numeric(&self, key: &str) -> bool {
        self.numeric_keys.contains(key)
            || self.is_measurement(key)
            || self.is_span_op_breakdown(key)
    }

    /// Whether the key's values are durations. A measurement counts when
    /// the measurement itself is cataloged as a duration.
    pub fn is_duration(&self, key: &str) -> bool {
        if self.duration_keys.contains(key) || self.is_span_op_breakdown(key) {
            return true;
        }
        self.is_measurement(key)
            && self
                .field_definition(key)
                .is_some_and(|def| def.value_type == Some(FieldValueType::Duration))
    }

    /// Whether the key's values are booleans.
    pub fn is_boolean(&self, key: &str) -> bool {
        self.boolean_keys.contains(key)
    }

    /// Whether the key's values are dates.
    pub fn is_date(&self, key: &str) -> bool {
        self.date_keys.contains(key)
    }

    /// Whether the key's values are percentages.
    pub fn is_percentage(&self, key: &str) -> bool {
        self.percentage_keys.contains(key)
    }

    /// Whether the key names an aggregate function.
    pub fn is_function_key(&self, key: &str) -> bool {
        self.field_definition(key)
            .is_some_and(|def| def.kind == FieldKind::Function)
            || self.aggregate_definition(key).is_some()
    }

    /// Whether a text filter on this key may carry a comparison operator.
    pub fn allows_text_operators(&self, key: &str) -> bool {
        self.text_operator_keys.contains(key)
    }

    /// A catalog prepopulated with the standard event-search key families.
    pub fn for_events() -> Self {
        let mut config = Self::new();

        for key in ["project_id", "issue.id", "stack.lineno", "stack.colno"] {
            config.numeric_keys.insert(key.into());
        }
        for key in ["error.handled", "error.unhandled", "stack.in_app"] {
            config.boolean_keys.insert(key.into());
        }
        for key in ["timestamp", "event.timestamp", "first_seen", "last_seen"] {
            config.date_keys.insert(key.into());
        }
        config.duration_keys.insert("transaction.duration".into());
        for key in [
            "release.version",
            "release.build",
            "release.stage",
            "release.package",
        ] {
            config.text_operator_keys.insert(key.into());
        }

        config
            .with_field(
                "transaction.duration",
                FieldDefinition::field(FieldValueType::Duration),
            )
            .with_field("timestamp", FieldDefinition::field(FieldValueType::Date))
            .with_field(
                "event.timestamp",
                FieldDefinition::field(FieldValueType::Date),
            )
            .with_field(
                "error.handled",
                FieldDefinition::field(FieldValueType::Boolean),
            )
            .with_field(
                "stack.lineno",
                FieldDefinition::field(FieldValueType::Number),
            )
            .with_field("browser.name", FieldDefinition::field(FieldValueType::String))
            .with_field("message", FieldDefinition::field(FieldValueType::String))
            .with_field("environment", FieldDefinition::field(FieldValueType::String))
            .with_field("transaction", FieldDefinition::field(FieldValueType::String))
            .with_field(
                "release.version",
                FieldDefinition::field(FieldValueType::String),
            )
            .with_field(
                "measurements.fp",
                FieldDefinition::field(FieldValueType::Duration),
            )
            .with_field(
                "measurements.fcp",
                FieldDefinition::field(FieldValueType::Duration),
            )
            .with_field(
                "measurements.lcp",
                FieldDefinition::field(FieldValueType::Duration),
            )
            .with_field(
                "measurements.cls",
                FieldDefinition::field(FieldValueType::Number),
            )
    }
}
