//! Filter verdicts: value sanity, expected-type hints, and list checks.

use crate::ast::{Filter, FilterType, InvalidFilter, Key, TextValue, Value};
use crate::catalog::SearchConfig;

use super::aggregate;

pub(crate) const REASON_UNESCAPED_QUOTES: &str = "Quotes must enclose text or be escaped";
pub(crate) const REASON_EMPTY_VALUE: &str = "Filter must have a value";
pub(crate) const REASON_INVALID_DURATION: &str =
    "Invalid duration. Expected number followed by duration unit suffix (e.g. 4h)";
pub(crate) const REASON_INVALID_DATE: &str =
    "Invalid date format. Expected +/-duration (e.g. +1h) or ISO 8601-like (e.g. yyyy-mm-ddThh:mm:ss)";
pub(crate) const REASON_INVALID_BOOLEAN: &str = "Invalid boolean. Expected true, 1, false, or 0.";
pub(crate) const REASON_INVALID_NUMBER: &str =
    "Invalid number. Expected number then optional k, m, or b suffix (e.g. 500k)";
pub(crate) const REASON_EMPTY_LIST_VALUE: &str = "Lists should not have empty values";

/// Stamps the filter's `invalid` verdict in place.
pub(crate) fn validate_filter(filter: &mut Filter, config: &SearchConfig) {
    filter.invalid = verdict(filter, config);
}

fn verdict(filter: &Filter, config: &SearchConfig) -> Option<InvalidFilter> {
    match filter.filter {
        FilterType::Text => {
            if let Value::Text(value) = &filter.value {
                if let Some(invalid) = text_value_sanity(value) {
                    return Some(invalid);
                }
            }
            expected_type_hint(filter, config)
        }
        FilterType::TextIn => {
            // A typed key whose list failed to scan lands here; the
            // expected-type hint outranks the list check.
            if let Some(invalid) = expected_type_hint(filter, config) {
                return Some(invalid);
            }
            list_emptiness(&filter.value)
        }
        FilterType::NumericIn => list_emptiness(&filter.value),
        FilterType::Is | FilterType::Has => match &filter.value {
            Value::Text(value) => text_value_sanity(value),
            _ => None,
        },
        FilterType::AggregateDuration
        | FilterType::AggregateNumeric
        | FilterType::AggregatePercentage
        | FilterType::AggregateDate
        | FilterType::AggregateRelativeDate => aggregate::validate_aggregate(filter, config),
        _ => None,
    }
}

/// Text value sanity: an unquoted value may not contain an unescaped
/// quote, and may not be empty.
fn text_value_sanity(value: &TextValue) -> Option<InvalidFilter> {
    if !value.quoted && has_unescaped_quote(&value.value) {
        return Some(InvalidFilter::new(REASON_UNESCAPED_QUOTES));
    }
    if !value.quoted && value.value.is_empty() {
        return Some(InvalidFilter::new(REASON_EMPTY_VALUE));
    }
    None
}

/// When a typed key lands as a text-family filter, hint at the filter
/// types the catalog expected. Explicit tags and function keys are
/// exempt: the tag escape is text by definition, and function keys fall
/// through to text without warnings.
fn expected_type_hint(filter: &Filter, config: &SearchConfig) -> Option<InvalidFilter> {
    let Key::Simple(key) = &filter.key else {
        return None;
    };
    let name = key.value.as_str();
    if config.is_function_key(name) {
        return None;
    }
    if config.is_duration(name) {
        return Some(InvalidFilter::with_expected(
            REASON_INVALID_DURATION,
            vec![FilterType::Duration],
        ));
    }
    if config.is_date(name) {
        return Some(InvalidFilter::with_expected(
            REASON_INVALID_DATE,
            vec![
                FilterType::Date,
                FilterType::SpecificDate,
                FilterType::RelativeDate,
            ],
        ));
    }
    if config.is_boolean(name) {
        return Some(InvalidFilter::with_expected(
            REASON_INVALID_BOOLEAN,
            vec![FilterType::Boolean],
        ));
    }
    if config.is_numeric(name) {
        return Some(InvalidFilter::with_expected(
            REASON_INVALID_NUMBER,
            vec![FilterType::Numeric, FilterType::NumericIn],
        ));
    }
    None
}

/// In-lists: no item may be empty.
fn list_emptiness(value: &Value) -> Option<InvalidFilter> {
    let has_empty = match value {
        Value::TextList(list) => list.items.iter().any(|item| item.value.value.is_empty()),
        Value::NumberList(list) => list.items.iter().any(|item| item.value.value.is_empty()),
        _ => false,
    };
    has_empty.then(|| InvalidFilter::new(REASON_EMPTY_LIST_VALUE))
}

/// True when the string contains a `"` not preceded by a backslash.
fn has_unescaped_quote(value: &str) -> bool {
    let mut escaped = false;
    for ch in value.chars() {
        match ch {
            '\\' => escaped = !escaped,
            '"' if !escaped => return true,
            _ => escaped = false,
        }
    }
    false
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
    fn unescaped_quote_in_value() {
        let config = SearchConfig::new();
        let filter = only_filter("foo:bar\"baz", &config);
        assert_eq!(filter.invalid.unwrap().reason, REASON_UNESCAPED_QUOTES);

        let filter = only_filter(r#"foo:bar\"baz"#, &config);
        assert!(filter.invalid.is_none());
    }

    #[test]
    fn empty_unquoted_value() {
        let config = SearchConfig::new();
        let filter = only_filter("foo:", &config);
        assert_eq!(filter.invalid.unwrap().reason, REASON_EMPTY_VALUE);

        // A quoted empty value is deliberate and valid.
        let filter = only_filter("foo:\"\"", &config);
        assert!(filter.invalid.is_none());
    }

    #[test]
    fn duration_key_with_text_value() {
        let config = SearchConfig::for_events();
        let filter = only_filter("transaction.duration:\"hello\"", &config);
        let invalid = filter.invalid.unwrap();
        assert!(invalid.reason.starts_with("Invalid duration."));
        assert_eq!(invalid.expected_type, vec![FilterType::Duration]);
    }

    #[test]
    fn date_key_with_text_value() {
        let config = SearchConfig::for_events();
        let filter = only_filter("timestamp:tomorrow", &config);
        let invalid = filter.invalid.unwrap();
        assert!(invalid.reason.starts_with("Invalid date format."));
        assert_eq!(
            invalid.expected_type,
            vec![
                FilterType::Date,
                FilterType::SpecificDate,
                FilterType::RelativeDate
            ]
        );
    }

    #[test]
    fn boolean_key_with_text_value() {
        let config = SearchConfig::for_events();
        let filter = only_filter("error.handled:maybe", &config);
        let invalid = filter.invalid.unwrap();
        assert_eq!(invalid.reason, REASON_INVALID_BOOLEAN);
        assert_eq!(invalid.expected_type, vec![FilterType::Boolean]);
    }

    #[test]
    fn numeric_key_with_text_value() {
        let config = SearchConfig::for_events();
        let filter = only_filter("stack.lineno:abc", &config);
        let invalid = filter.invalid.unwrap();
        assert_eq!(invalid.reason, REASON_INVALID_NUMBER);
        assert_eq!(
            invalid.expected_type,
            vec![FilterType::Numeric, FilterType::NumericIn]
        );
    }

    #[test]
    fn numeric_key_with_malformed_list_gets_numeric_hint() {
        let config = SearchConfig::for_events();
        let filter = only_filter("stack.lineno:[1,two]", &config);
        assert_eq!(filter.filter, FilterType::TextIn);
        let invalid = filter.invalid.unwrap();
        assert_eq!(
            invalid.expected_type,
            vec![FilterType::Numeric, FilterType::NumericIn]
        );
    }

    #[test]
    fn explicit_tag_skips_type_hints() {
        let config = SearchConfig::for_events();
        let filter = only_filter("tags[transaction.duration]:hello", &config);
        assert!(filter.invalid.is_none());
    }

    #[test]
    fn empty_list_items() {
        let config = SearchConfig::new();
        let filter = only_filter("env:[prod,,staging]", &config);
        assert_eq!(filter.invalid.unwrap().reason, REASON_EMPTY_LIST_VALUE);

        let filter = only_filter("env:[prod,staging]", &config);
        assert!(filter.invalid.is_none());
    }

    #[test]
    fn is_and_has_use_value_sanity_only() {
        let config = SearchConfig::new();
        let filter = only_filter("is:", &config);
        assert_eq!(filter.invalid.unwrap().reason, REASON_EMPTY_VALUE);

        let filter = only_filter("has:browser", &config);
        assert!(filter.invalid.is_none());
    }

    #[test]
    fn unescaped_quote_detection() {
        assert!(has_unescaped_quote("a\"b"));
        assert!(!has_unescaped_quote("a\\\"b"));
        assert!(has_unescaped_quote("a\\\\\"b"));
        assert!(!has_unescaped_quote("plain"));
    }
}
