//! End-to-end scenarios over the public API.

use search_syntax::{
    parse, BooleanOp, FilterType, Operator, SearchConfig, Term, Value,
};

use chrono::{TimeZone, Utc};

fn events_config() -> SearchConfig {
    let mut config = SearchConfig::for_events();
    config.numeric_keys.insert("quux".into());
    config
}

fn first_filter(terms: &[Term]) -> &search_syntax::Filter {
    terms
        .iter()
        .find_map(|term| term.as_filter())
        .expect("expected a filter")
}

#[test]
fn quoted_text_filter() {
    let config = events_config();
    let terms = parse("browser.name:\"Chrome 33.0\"", &config).unwrap();
    assert_eq!(terms.len(), 1);

    let filter = first_filter(&terms);
    assert_eq!(filter.filter, FilterType::Text);
    assert_eq!(filter.key.name(), "browser.name");
    assert_eq!(filter.operator, Operator::Empty);
    assert!(!filter.negated);
    assert!(filter.invalid.is_none());

    let Value::Text(value) = &filter.value else {
        panic!("expected a text value");
    };
    assert_eq!(value.value, "Chrome 33.0");
    assert!(value.quoted);
}

#[test]
fn negated_is_filter() {
    let config = events_config();
    let terms = parse("!is:unresolved", &config).unwrap();
    let filter = first_filter(&terms);

    assert_eq!(filter.filter, FilterType::Is);
    assert!(filter.negated);
    assert!(filter.invalid.is_none());
    let Value::Text(value) = &filter.value else {
        panic!("expected a text value");
    };
    assert_eq!(value.value, "unresolved");
    assert_eq!(filter.text, "!is:unresolved");
}

#[test]
fn date_filter_with_operator() {
    let config = events_config();
    let terms = parse("event.timestamp:>=2023-01-01T00:00:00Z", &config).unwrap();
    let filter = first_filter(&terms);

    assert_eq!(filter.filter, FilterType::Date);
    assert_eq!(filter.operator, Operator::GreaterThanEqual);
    assert!(filter.invalid.is_none());
    let Value::Iso8601Date(value) = &filter.value else {
        panic!("expected a date value");
    };
    assert_eq!(value.value, Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap());
}

#[test]
fn aggregate_duration_filter() {
    let config = events_config();
    let terms = parse("p95(transaction.duration):>500ms", &config).unwrap();
    let filter = first_filter(&terms);

    assert_eq!(filter.filter, FilterType::AggregateDuration);
    assert_eq!(filter.operator, Operator::GreaterThan);
    assert!(filter.invalid.is_none());
    assert_eq!(filter.key.name(), "p95");
    assert_eq!(filter.key.text(), "p95(transaction.duration)");

    let Value::Duration(value) = &filter.value else {
        panic!("expected a duration value");
    };
    assert_eq!(value.value, 500.0);
    assert_eq!(value.as_milliseconds(), 500.0);
}

#[test]
fn boolean_logic_with_group_and_numeric_list() {
    let config = events_config();
    let terms = parse("foo:bar AND (baz:qux OR quux:[1,2,3])", &config).unwrap();
    assert_eq!(terms.len(), 5);

    let filter = terms[0].as_filter().unwrap();
    assert_eq!(filter.filter, FilterType::Text);
    assert!(matches!(terms[1], Term::Spaces(_)));
    let Term::LogicBoolean(boolean) = &terms[2] else {
        panic!("expected AND");
    };
    assert_eq!(boolean.op, BooleanOp::And);
    assert!(matches!(terms[3], Term::Spaces(_)));

    let Term::LogicGroup(group) = &terms[4] else {
        panic!("expected a group");
    };
    assert_eq!(group.terms.len(), 5);
    let inner = group.terms[4].as_filter().unwrap();
    assert_eq!(inner.filter, FilterType::NumericIn);
    assert!(inner.invalid.is_none());
    let Value::NumberList(list) = &inner.value else {
        panic!("expected a number list");
    };
    let raw: Vec<f64> = list.items.iter().map(|item| item.value.raw_value).collect();
    assert_eq!(raw, [1.0, 2.0, 3.0]);
}

#[test]
fn function_key_falls_back_to_text_without_warning() {
    let config = events_config();
    let terms = parse("count():>notanumber", &config).unwrap();
    let filter = first_filter(&terms);

    assert_eq!(filter.filter, FilterType::Text);
    assert!(filter.invalid.is_none());
    assert_eq!(filter.text, "count():>notanumber");
}

#[test]
fn bare_function_name_key_stays_text_without_warning() {
    let config = events_config();
    let terms = parse("p95:>50", &config).unwrap();
    let filter = first_filter(&terms);

    assert_eq!(filter.filter, FilterType::Text);
    assert!(filter.invalid.is_none());
}

#[test]
fn duration_key_with_text_value_gets_typed_hint() {
    let config = events_config();
    let terms = parse("transaction.duration:\"hello\"", &config).unwrap();
    let filter = first_filter(&terms);

    assert_eq!(filter.filter, FilterType::Text);
    let invalid = filter.invalid.as_ref().expect("expected a verdict");
    assert!(invalid.reason.starts_with("Invalid duration."));
    assert_eq!(invalid.expected_type, vec![FilterType::Duration]);
}

#[test]
fn empty_input_is_an_empty_ast() {
    let config = events_config();
    assert_eq!(parse("", &config), Some(vec![]));
}

#[test]
fn whitespace_only_input() {
    let config = events_config();
    let terms = parse(" \t  ", &config).unwrap();
    assert_eq!(terms.len(), 1);
    assert!(matches!(terms[0], Term::Spaces(_)));
}

#[test]
fn unterminated_quote_returns_none() {
    let config = events_config();
    assert!(parse("\"unterminated", &config).is_none());
    assert!(parse("foo:\"unterminated", &config).is_none());
}

#[test]
fn numeric_suffix_multipliers() {
    let config = events_config();
    for (query, expected) in [
        ("quux:1k", 1_000.0),
        ("quux:2.5m", 2_500_000.0),
        ("quux:3b", 3_000_000_000.0),
        ("quux:42", 42.0),
    ] {
        let terms = parse(query, &config).unwrap();
        let filter = first_filter(&terms);
        assert_eq!(filter.filter, FilterType::Numeric, "for {query}");
        let Value::Number(value) = &filter.value else {
            panic!("expected a number value");
        };
        assert_eq!(value.raw_value, expected, "for {query}");
    }
}

#[test]
fn boolean_value_forms() {
    let config = events_config();
    for (query, expected) in [
        ("error.handled:1", true),
        ("error.handled:true", true),
        ("error.handled:TRUE", true),
        ("error.handled:0", false),
        ("error.handled:false", false),
        ("error.handled:FALSE", false),
    ] {
        let terms = parse(query, &config).unwrap();
        let filter = first_filter(&terms);
        assert_eq!(filter.filter, FilterType::Boolean, "for {query}");
        let Value::Boolean(value) = &filter.value else {
            panic!("expected a boolean value");
        };
        assert_eq!(value.value, expected, "for {query}");
    }
}

#[test]
fn relative_date_filter() {
    let config = events_config();
    let terms = parse("timestamp:-14d", &config).unwrap();
    let filter = first_filter(&terms);
    assert_eq!(filter.filter, FilterType::RelativeDate);
    assert!(filter.invalid.is_none());
}

#[test]
fn free_text_mixes_with_filters() {
    let config = events_config();
    let terms = parse("TypeError is:unresolved \"in app\"", &config).unwrap();
    assert_eq!(terms.len(), 5);
    assert!(matches!(terms[0], Term::FreeText(_)));
    assert!(terms[2].as_filter().is_some());
    let Term::FreeText(quoted) = &terms[4] else {
        panic!("expected quoted free text");
    };
    assert!(quoted.quoted);
    assert_eq!(quoted.value, "in app");
}

#[test]
fn deeply_nested_groups() {
    let config = events_config();
    let terms = parse("(a:b OR (c:d AND (e:f)))", &config).unwrap();
    assert_eq!(terms.len(), 1);
    let Term::LogicGroup(outer) = &terms[0] else {
        panic!("expected a group");
    };
    assert_eq!(outer.text, "(a:b OR (c:d AND (e:f)))");
}
