//! Aggregate filter verdicts: return-type coherence and parameter checks.

use crate::ast::{AggregateKey, Filter, FilterType, InvalidFilter, Key};
use crate::catalog::{
    AggregateDefinition, AggregateParamKind, AggregateParameter, ColumnArg, ColumnTypes,
    FieldKind, FieldValueType, SearchConfig,
};

/// Validates a committed aggregate filter. The first failure wins:
/// return-type coherence, then parameter arity and types in position
/// order. Functions absent from the catalog validate vacuously.
pub(crate) fn validate_aggregate(filter: &Filter, config: &SearchConfig) -> Option<InvalidFilter> {
    let Key::Aggregate(key) = &filter.key else {
        return None;
    };
    let name = key.name.value.as_str();

    if let Some(return_type) = resolve_return_type(config, key) {
        if !family_matches(filter.filter, return_type) {
            return Some(InvalidFilter::new(format!(
                "'{}' returns a {}; '{}' is not valid here.",
                name,
                return_type,
                filter.value.text()
            )));
        }
    }

    let definition = config.aggregate_definition(name)?;
    validate_parameters(name, &definition, key, config)
}

/// The aggregate's return type: the function's cataloged value type, or,
/// for functions whose type follows their input, the cataloged type of
/// the first argument. Derivation only adopts aggregatable column types;
/// a string column is left to the parameter checks.
fn resolve_return_type(config: &SearchConfig, key: &AggregateKey) -> Option<FieldValueType> {
    let definition = config.field_definition(&key.name.value)?;
    if definition.kind != FieldKind::Function {
        return None;
    }
    definition.value_type.or_else(|| {
        let first = key.arg_values().next()?;
        let column_type = config.field_definition(&first.value)?.value_type?;
        matches!(
            column_type,
            FieldValueType::Duration
                | FieldValueType::Number
                | FieldValueType::Integer
                | FieldValueType::Percentage
                | FieldValueType::Date
        )
        .then_some(column_type)
    })
}

/// Whether the committed filter family accepts a value of the aggregate's
/// return type.
fn family_matches(filter_type: FilterType, return_type: FieldValueType) -> bool {
    match filter_type {
        FilterType::AggregateDuration => return_type == FieldValueType::Duration,
        FilterType::AggregateNumeric => matches!(
            return_type,
            FieldValueType::Number | FieldValueType::Integer
        ),
        FilterType::AggregatePercentage => return_type == FieldValueType::Percentage,
        FilterType::AggregateDate | FilterType::AggregateRelativeDate => {
            return_type == FieldValueType::Date
        }
        _ => true,
    }
}

fn validate_parameters(
    name: &str,
    definition: &AggregateDefinition,
    key: &AggregateKey,
    config: &SearchConfig,
) -> Option<InvalidFilter> {
    let provided: Vec<&str> = key.arg_values().map(|param| param.value.as_str()).collect();
    let expected = &definition.parameters;

    for position in 0..expected.len().max(provided.len()) {
        match (expected.get(position), provided.get(position)) {
            (None, Some(_)) => {
                return Some(arity_error(name, expected.len()));
            }
            (Some(parameter), None) => {
                if parameter.required {
                    return Some(arity_error(name, definition.required_count()));
                }
            }
            (Some(parameter), Some(argument)) => {
                if let Some(invalid) = check_parameter(name, position, parameter, argument, config)
                {
                    return Some(invalid);
                }
            }
            (None, None) => unreachable!("position is below one of the lengths"),
        }
    }
    None
}

fn check_parameter(
    name: &str,
    position: usize,
    parameter: &AggregateParameter,
    argument: &str,
    config: &SearchConfig,
) -> Option<InvalidFilter> {
    let ordinal = position + 1;
    match &parameter.kind {
        AggregateParamKind::Column { column_types } => match column_types {
            ColumnTypes::Check(check) => {
                let data_type = config
                    .field_definition(argument)
                    .and_then(|def| def.value_type);
                let arg = ColumnArg {
                    name: argument,
                    data_type,
                };
                if !check(&arg) {
                    return Some(InvalidFilter::new(format!(
                        "Argument {ordinal} is an invalid column type."
                    )));
                }
                None
            }
            ColumnTypes::Types(types) => {
                let Some(def) = config.field_definition(argument) else {
                    return Some(InvalidFilter::new(format!(
                        "'{name}' expects argument {ordinal} to be a column"
                    )));
                };
                match def.value_type {
                    Some(value_type) if types.contains(&value_type) => None,
                    _ => {
                        let allowed = types
                            .iter()
                            .map(FieldValueType::to_string)
                            .collect::<Vec<_>>()
                            .join(", ");
                        Some(InvalidFilter::new(format!(
                            "'{name}' expects argument {ordinal} to be a column of type: {allowed}"
                        )))
                    }
                }
            }
        },
        AggregateParamKind::Dropdown { options } => {
            if options.iter().any(|option| option.value == argument) {
                None
            } else {
                let allowed = options
                    .iter()
                    .map(|option| format!("'{}'", option.value))
                    .collect::<Vec<_>>()
                    .join(", ");
                Some(InvalidFilter::new(format!(
                    "'{name}' expects argument {ordinal} to be one of: {allowed}"
                )))
            }
        }
        AggregateParamKind::Value { data_type } => {
            let is_number = argument.parse::<f64>().is_ok();
            let matches_type = match data_type {
                FieldValueType::Number | FieldValueType::Integer => is_number,
                FieldValueType::String => !is_number,
                _ => true,
            };
            if matches_type {
                None
            } else {
                Some(InvalidFilter::new(format!(
                    "'{name}' expects argument {ordinal} to be of type {data_type}"
                )))
            }
        }
    }
}

fn arity_error(name: &str, count: usize) -> InvalidFilter {
    let plural = if count == 1 { "argument" } else { "arguments" };
    InvalidFilter::new(format!("'{name}' is expecting {count} {plural}."))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::SearchConfig;
    use crate::parse;

    fn only_filter(source: &str, config: &SearchConfig) -> Filter {
        let terms = parse(source, config).expect("expected an AST");
        terms
            .iter()
            .find_map(|term| term.as_filter().cloned())
            .expect("expected a filter")
    }

    #[test]
    fn valid_duration_aggregate() {
        let config = SearchConfig::for_events();
        let filter = only_filter("p95(transaction.duration):>500ms", &config);
        assert_eq!(filter.filter, FilterType::AggregateDuration);
        assert!(filter.invalid.is_none());
    }

    #[test]
    fn count_with_percentage_value_is_incoherent() {
        let config = SearchConfig::for_events();
        let filter = only_filter("count():>50%", &config);
        assert_eq!(filter.filter, FilterType::AggregatePercentage);
        let invalid = filter.invalid.unwrap();
        assert_eq!(
            invalid.reason,
            "'count' returns a number; '50%' is not valid here."
        );
    }

    #[test]
    fn count_with_date_value_is_incoherent() {
        let config = SearchConfig::for_events();
        let filter = only_filter("count():>2023-01-01", &config);
        assert_eq!(filter.filter, FilterType::AggregateDate);
        assert!(filter.invalid.is_some());
    }

    #[test]
    fn last_seen_accepts_dates() {
        let config = SearchConfig::for_events();
        let filter = only_filter("last_seen():>2023-01-01", &config);
        assert_eq!(filter.filter, FilterType::AggregateDate);
        assert!(filter.invalid.is_none());

        let filter = only_filter("last_seen():-24h", &config);
        assert_eq!(filter.filter, FilterType::AggregateRelativeDate);
        assert!(filter.invalid.is_none());
    }

    #[test]
    fn duration_returning_aggregate_rejects_bare_numbers() {
        let config = SearchConfig::for_events();
        let filter = only_filter("p95(transaction.duration):>50", &config);
        assert_eq!(filter.filter, FilterType::AggregateNumeric);
        let invalid = filter.invalid.unwrap();
        assert_eq!(
            invalid.reason,
            "'p95' returns a duration; '50' is not valid here."
        );
    }

    #[test]
    fn extra_arguments_fail_arity() {
        let config = SearchConfig::for_events();
        let filter = only_filter("count(transaction.duration):>5", &config);
        assert_eq!(
            filter.invalid.unwrap().reason,
            "'count' is expecting 0 arguments."
        );
    }

    #[test]
    fn missing_required_argument_fails_arity() {
        let config = SearchConfig::for_events();
        let filter = only_filter("count_unique():>5", &config);
        assert_eq!(
            filter.invalid.unwrap().reason,
            "'count_unique' is expecting 1 argument."
        );
    }

    #[test]
    fn optional_arguments_may_be_omitted() {
        let config = SearchConfig::for_events();
        let filter = only_filter("apdex():<0.8", &config);
        assert!(filter.invalid.is_none());
    }

    #[test]
    fn column_list_rejects_wrong_type() {
        let config = SearchConfig::for_events();
        let filter = only_filter("avg(browser.name):>5", &config);
        let reason = filter.invalid.unwrap().reason;
        assert_eq!(
            reason,
            "'avg' expects argument 1 to be a column of type: duration, number, integer, percentage"
        );
    }

    #[test]
    fn column_list_rejects_unknown_column() {
        let config = SearchConfig::for_events();
        let filter = only_filter("avg(nosuchfield):>5", &config);
        assert_eq!(
            filter.invalid.unwrap().reason,
            "'avg' expects argument 1 to be a column"
        );
    }

    #[test]
    fn column_check_predicate_runs() {
        let config = SearchConfig::for_events();
        // count_if denies boolean columns and admits unknown tags.
        let filter = only_filter("count_if(error.handled,equals,true):>5", &config);
        assert_eq!(
            filter.invalid.unwrap().reason,
            "Argument 1 is an invalid column type."
        );

        let filter = only_filter("count_if(custom_tag,equals,yes):>5", &config);
        assert!(filter.invalid.is_none());
    }

    #[test]
    fn dropdown_options_are_enforced() {
        let config = SearchConfig::for_events();
        let filter = only_filter("count_if(custom_tag,between,5):>5", &config);
        assert_eq!(
            filter.invalid.unwrap().reason,
            "'count_if' expects argument 2 to be one of: 'equals', 'notEquals', 'less', 'greater'"
        );
    }

    #[test]
    fn value_parameter_type_is_enforced() {
        let config = SearchConfig::for_events();
        let filter = only_filter("percentile(transaction.duration,fast):>5s", &config);
        assert_eq!(
            filter.invalid.unwrap().reason,
            "'percentile' expects argument 2 to be of type number"
        );

        let filter = only_filter("percentile(transaction.duration,0.95):>5s", &config);
        assert!(filter.invalid.is_none());
    }

    #[test]
    fn unknown_functions_validate_vacuously() {
        let config = SearchConfig::new();
        let filter = only_filter("made_up(a,b,c):>5", &config);
        assert_eq!(filter.filter, FilterType::AggregateNumeric);
        assert!(filter.invalid.is_none());
    }
}
