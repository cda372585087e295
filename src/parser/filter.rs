//! Filter alternation.
//!
//! Variants are tried in a fixed order (typed value forms before generic
//! text, in-list before scalar) and a semantic predicate consults the
//! catalog before a typed variant is committed. A rejected variant rewinds
//! to the value position and falls through; a generic text filter is the
//! catch-all, so any key/value shape that parses at all yields a filter.

use crate::ast::{AggregateKey, Filter, FilterType, Key, Operator, Value};
use crate::parser::Parser;
use crate::semantic;

impl Parser<'_> {
    /// Tries to parse a whole filter at the cursor. Rewinds and returns
    /// `None` when the source is not a filter.
    pub(crate) fn try_filter(&mut self) -> Option<Filter> {
        let mark = self.cursor.pos();
        let negated = self.cursor.match_char('!');
        let Some(key) = self.try_key() else {
            self.cursor.reset(mark);
            return None;
        };
        if !self.cursor.match_char(':') {
            self.cursor.reset(mark);
            return None;
        }
        let value_mark = self.cursor.pos();

        let filter = match &key {
            Key::Aggregate(aggregate) => {
                let duration_like = self.aggregate_is_duration(aggregate);
                self.try_aggregate_forms(mark, value_mark, &key, negated, duration_like)
            }
            Key::ExplicitTag(_) => self.try_text_forms(mark, value_mark, &key, negated),
            Key::Simple(_) => self.try_simple_forms(mark, value_mark, &key, negated),
        };
        if filter.is_none() {
            self.cursor.reset(mark);
        }
        filter
    }

    /// Alternation for simple keys, steered by the key's cataloged type.
    fn try_simple_forms(
        &mut self,
        mark: usize,
        value_mark: usize,
        key: &Key,
        negated: bool,
    ) -> Option<Filter> {
        let Key::Simple(simple) = key else {
            return None;
        };
        let name = simple.value.as_str();

        // Date filters cannot be negated, so the whole family is skipped
        // under `!` and the term falls through to a text filter.
        if !negated && self.config.is_date(name) {
            self.cursor.reset(value_mark);
            let operator = self.try_operator();
            if let Some(value) = self.try_iso_date_value() {
                let filter_type = if operator == Operator::Empty {
                    FilterType::SpecificDate
                } else {
                    FilterType::Date
                };
                return Some(self.finish(
                    mark,
                    filter_type,
                    key,
                    operator,
                    Value::Iso8601Date(value),
                    negated,
                ));
            }
            self.cursor.reset(value_mark);
            if let Some(value) = self.try_relative_date_value() {
                return Some(self.finish(
                    mark,
                    FilterType::RelativeDate,
                    key,
                    Operator::Empty,
                    Value::RelativeDate(value),
                    negated,
                ));
            }
        }

        if self.config.is_duration(name) {
            self.cursor.reset(value_mark);
            let operator = self.try_operator();
            if let Some(value) = self.try_duration_value() {
                return Some(self.finish(
                    mark,
                    FilterType::Duration,
                    key,
                    operator,
                    Value::Duration(value),
                    negated,
                ));
            }
        }

        if self.config.is_boolean(name) {
            self.cursor.reset(value_mark);
            let operator = self.try_restricted_operator();
            if let Some(value) = self.try_boolean_value() {
                return Some(self.finish(
                    mark,
                    FilterType::Boolean,
                    key,
                    operator,
                    Value::Boolean(value),
                    negated,
                ));
            }
        }

        if self.config.is_numeric(name) {
            self.cursor.reset(value_mark);
            if let Some(value) = self.try_number_list() {
                return Some(self.finish(
                    mark,
                    FilterType::NumericIn,
                    key,
                    Operator::Empty,
                    Value::NumberList(value),
                    negated,
                ));
            }
            self.cursor.reset(value_mark);
            let operator = self.try_operator();
            if let Some(value) = self.try_number_value() {
                return Some(self.finish(
                    mark,
                    FilterType::Numeric,
                    key,
                    operator,
                    Value::Number(value),
                    negated,
                ));
            }
        }

        if !simple.quoted && name.eq_ignore_ascii_case("has") {
            self.cursor.reset(value_mark);
            let operator = self.try_restricted_operator();
            if let Some(value) = self.try_text_value() {
                return Some(self.finish(
                    mark,
                    FilterType::Has,
                    key,
                    operator,
                    Value::Text(value),
                    negated,
                ));
            }
        }

        if !simple.quoted && name.eq_ignore_ascii_case("is") {
            self.cursor.reset(value_mark);
            let operator = self.try_restricted_operator();
            if let Some(value) = self.try_text_value() {
                return Some(self.finish(
                    mark,
                    FilterType::Is,
                    key,
                    operator,
                    Value::Text(value),
                    negated,
                ));
            }
        }

        self.try_text_forms(mark, value_mark, key, negated)
    }

    /// Alternation for aggregate keys. The duration form is gated on the
    /// function name or one of its column arguments being a duration; the
    /// remaining typed forms admit any function, and a text filter is the
    /// no-warning fallback.
    fn try_aggregate_forms(
        &mut self,
        mark: usize,
        value_mark: usize,
        key: &Key,
        negated: bool,
        duration_like: bool,
    ) -> Option<Filter> {
        if duration_like {
            self.cursor.reset(value_mark);
            let operator = self.try_operator();
            if let Some(value) = self.try_duration_value() {
                return Some(self.finish(
                    mark,
                    FilterType::AggregateDuration,
                    key,
                    operator,
                    Value::Duration(value),
                    negated,
                ));
            }
        }

        self.cursor.reset(value_mark);
        let operator = self.try_operator();
        if let Some(value) = self.try_percentage_value() {
            return Some(self.finish(
                mark,
                FilterType::AggregatePercentage,
                key,
                operator,
                Value::Percentage(value),
                negated,
            ));
        }

        self.cursor.reset(value_mark);
        let operator = self.try_operator();
        if let Some(value) = self.try_number_value() {
            return Some(self.finish(
                mark,
                FilterType::AggregateNumeric,
                key,
                operator,
                Value::Number(value),
                negated,
            ));
        }

        self.cursor.reset(value_mark);
        let operator = self.try_operator();
        if let Some(value) = self.try_iso_date_value() {
            return Some(self.finish(
                mark,
                FilterType::AggregateDate,
                key,
                operator,
                Value::Iso8601Date(value),
                negated,
            ));
        }

        self.cursor.reset(value_mark);
        let operator = self.try_operator();
        if let Some(value) = self.try_relative_date_value() {
            return Some(self.finish(
                mark,
                FilterType::AggregateRelativeDate,
                key,
                operator,
                Value::RelativeDate(value),
                negated,
            ));
        }

        self.cursor.reset(value_mark);
        let operator = self.try_text_operator(key.name());
        let value = self.try_text_value()?;
        Some(self.finish(mark, FilterType::Text, key, operator, Value::Text(value), negated))
    }

    /// The text-family tail shared by simple keys and `tags[...]`:
    /// in-list first, then the scalar catch-all.
    fn try_text_forms(
        &mut self,
        mark: usize,
        value_mark: usize,
        key: &Key,
        negated: bool,
    ) -> Option<Filter> {
        self.cursor.reset(value_mark);
        if let Some(value) = self.try_text_list() {
            return Some(self.finish(
                mark,
                FilterType::TextIn,
                key,
                Operator::Empty,
                Value::TextList(value),
                negated,
            ));
        }

        self.cursor.reset(value_mark);
        let operator = self.try_text_operator(key.name());
        let value = self.try_text_value()?;
        Some(self.finish(mark, FilterType::Text, key, operator, Value::Text(value), negated))
    }

    /// Operator parsing for text filters: `!=` is always admissible,
    /// comparison operators (and explicit `=`) only for keys listed in
    /// `text_operator_keys`. An inadmissible operator is left in place and
    /// becomes part of the value.
    fn try_text_operator(&mut self, key_name: &str) -> Operator {
        let mark = self.cursor.pos();
        let operator = self.try_operator();
        let admissible = match operator {
            Operator::Empty | Operator::NotEqual => true,
            _ => self.config.allows_text_operators(key_name),
        };
        if admissible {
            operator
        } else {
            self.cursor.reset(mark);
            Operator::Empty
        }
    }

    /// Operator parsing for filters that admit only the default and `!=`.
    fn try_restricted_operator(&mut self) -> Operator {
        let mark = self.cursor.pos();
        let operator = self.try_operator();
        if matches!(operator, Operator::Empty | Operator::NotEqual) {
            operator
        } else {
            self.cursor.reset(mark);
            Operator::Empty
        }
    }

    /// Duration predicate for aggregate keys: the function name itself or
    /// any of its column arguments is a cataloged duration.
    fn aggregate_is_duration(&self, key: &AggregateKey) -> bool {
        self.config.is_duration(&key.name.value)
            || key
                .arg_values()
                .any(|param| self.config.is_duration(&param.value))
    }

    /// Builds the committed filter, stamps its span and source text, and
    /// runs the post-parse validator.
    fn finish(
        &mut self,
        mark: usize,
        filter_type: FilterType,
        key: &Key,
        operator: Operator,
        value: Value,
        negated: bool,
    ) -> Filter {
        let mut filter = Filter {
            filter: filter_type,
            key: key.clone(),
            value,
            operator,
            negated,
            invalid: None,
            text: self.cursor.slice_from(mark).into(),
            span: mark..self.cursor.pos(),
        };
        semantic::validate_filter(&mut filter, self.config);
        filter
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::SearchConfig;

    fn filter_of(source: &str, config: &SearchConfig) -> Filter {
        let mut parser = Parser::new(source, config);
        parser.try_filter().expect("expected a filter")
    }

    #[test]
    fn plain_text_filter() {
        let config = SearchConfig::new();
        let filter = filter_of("foo:bar", &config);
        assert_eq!(filter.filter, FilterType::Text);
        assert_eq!(filter.operator, Operator::Empty);
        assert!(!filter.negated);
        assert!(filter.invalid.is_none());
    }

    #[test]
    fn numeric_key_commits_numeric_variant() {
        let mut config = SearchConfig::new();
        config.numeric_keys.insert("attempts".into());
        let filter = filter_of("attempts:>50", &config);
        assert_eq!(filter.filter, FilterType::Numeric);
        assert_eq!(filter.operator, Operator::GreaterThan);

        // Same value under an unconfigured key stays text.
        let filter = filter_of("retries:>50", &SearchConfig::new());
        assert_eq!(filter.filter, FilterType::Text);
    }

    #[test]
    fn date_with_operator_vs_specific_date() {
        let config = SearchConfig::for_events();
        let filter = filter_of("timestamp:>=2023-01-01", &config);
        assert_eq!(filter.filter, FilterType::Date);
        let filter = filter_of("timestamp:2023-01-01", &config);
        assert_eq!(filter.filter, FilterType::SpecificDate);
        let filter = filter_of("timestamp:-24h", &config);
        assert_eq!(filter.filter, FilterType::RelativeDate);
    }

    #[test]
    fn negated_date_falls_back_to_text_with_hint() {
        let config = SearchConfig::for_events();
        let filter = filter_of("!timestamp:2023-01-01", &config);
        assert_eq!(filter.filter, FilterType::Text);
        assert!(filter.negated);
        let invalid = filter.invalid.expect("expected a verdict");
        assert!(invalid.expected_type.contains(&FilterType::Date));
    }

    #[test]
    fn boolean_filter_rejects_comparison_operators() {
        let config = SearchConfig::for_events();
        let filter = filter_of("error.handled:1", &config);
        assert_eq!(filter.filter, FilterType::Boolean);

        let filter = filter_of("error.handled:>1", &config);
        assert_eq!(filter.filter, FilterType::Text);
        if let Value::Text(value) = &filter.value {
            assert_eq!(value.value, ">1");
        } else {
            panic!("expected a text value");
        }
    }

    #[test]
    fn aggregate_duration_gated_on_catalog() {
        let config = SearchConfig::for_events();
        let filter = filter_of("p95(transaction.duration):>500ms", &config);
        assert_eq!(filter.filter, FilterType::AggregateDuration);
        assert!(filter.invalid.is_none());

        // A non-duration column rejects the duration form; the value does
        // not scan as anything else, so this lands as text.
        let filter = filter_of("p95(measurements.cls):>500ms", &config);
        assert_eq!(filter.filter, FilterType::Text);
        assert!(filter.invalid.is_none());
    }

    #[test]
    fn aggregate_falls_back_to_text_without_warning() {
        let config = SearchConfig::new();
        let filter = filter_of("count():>notanumber", &config);
        assert_eq!(filter.filter, FilterType::Text);
        assert!(filter.invalid.is_none());
        assert_eq!(filter.key.name(), "count");
    }

    #[test]
    fn text_operator_keys_admit_comparisons() {
        let config = SearchConfig::for_events();
        let filter = filter_of("release.version:>=1.2.3", &config);
        assert_eq!(filter.filter, FilterType::Text);
        assert_eq!(filter.operator, Operator::GreaterThanEqual);
        if let Value::Text(value) = &filter.value {
            assert_eq!(value.value, "1.2.3");
        } else {
            panic!("expected a text value");
        }

        let filter = filter_of("browser.name:>=1.2.3", &config);
        assert_eq!(filter.operator, Operator::Empty);
        if let Value::Text(value) = &filter.value {
            assert_eq!(value.value, ">=1.2.3");
        } else {
            panic!("expected a text value");
        }
    }

    #[test]
    fn is_and_has_filters() {
        let config = SearchConfig::new();
        let filter = filter_of("is:unresolved", &config);
        assert_eq!(filter.filter, FilterType::Is);

        let filter = filter_of("!has:browser", &config);
        assert_eq!(filter.filter, FilterType::Has);
        assert!(filter.negated);
    }

    #[test]
    fn explicit_tag_forces_text() {
        let config = SearchConfig::for_events();
        let filter = filter_of("tags[transaction.duration]:500ms", &config);
        assert_eq!(filter.filter, FilterType::Text);
        assert!(filter.invalid.is_none());
    }

    #[test]
    fn in_list_variants() {
        let mut config = SearchConfig::new();
        config.numeric_keys.insert("code".into());
        let filter = filter_of("code:[400, 404, 500]", &config);
        assert_eq!(filter.filter, FilterType::NumericIn);

        let filter = filter_of("env:[prod, staging]", &config);
        assert_eq!(filter.filter, FilterType::TextIn);
    }

    #[test]
    fn bare_word_is_not_a_filter() {
        let config = SearchConfig::new();
        let mut parser = Parser::new("justtext", &config);
        assert!(parser.try_filter().is_none());
        assert_eq!(parser.cursor.pos(), 0);
    }
}
