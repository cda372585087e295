//! Universal invariants checked over a query corpus.

use search_syntax::{
    join, parse, Filter, FilterType, KeyKind, Operator, SearchConfig, Term, TermVisitor,
};

const CORPUS: &[&str] = &[
    "",
    "   ",
    "browser.name:\"Chrome 33.0\"",
    "!is:unresolved",
    "event.timestamp:>=2023-01-01T00:00:00Z",
    "timestamp:2023-06-15",
    "timestamp:-14d",
    "p95(transaction.duration):>500ms",
    "foo:bar AND (baz:qux OR quux:[1,2,3])",
    "count():>notanumber",
    "count():>50",
    "count():>50%",
    "last_seen():-24h",
    "transaction.duration:\"hello\"",
    "transaction.duration:>1.5h",
    "measurements.lcp:>2.5s",
    "spans.db:>50ms",
    "stack.lineno:[10, 20,30]",
    "error.handled:true !error.unhandled:0",
    "release.version:>=1.2.3",
    "tags[browser]:Chrome tags[\"dotted tag\"]:x",
    "has:stack.filename !has:environment",
    "is:unresolved is:for_review",
    "count_if(custom,equals,yes):>10",
    "avg(measurements.cls):<0.1",
    "( a:b ( c:d ) )",
    "free text  with   spaces",
    "\"quoted free text\" trailing:",
    "env:[prod, staging, \"dev box\"]",
    "!key:!=value",
    "x:>=",
];

fn corpus_config() -> SearchConfig {
    let mut config = SearchConfig::for_events();
    config.numeric_keys.insert("quux".into());
    config
}

struct FilterSink {
    filters: Vec<Filter>,
}

impl TermVisitor for FilterSink {
    fn visit_filter(&mut self, filter: &Filter) {
        self.filters.push(filter.clone());
    }
}

fn all_filters(terms: &[Term]) -> Vec<Filter> {
    let mut sink = FilterSink {
        filters: Vec::new(),
    };
    search_syntax::ast::walk_terms(&mut sink, terms);
    sink.filters
}

/// Walks the tree depth-first, asserting that sibling spans are gapless
/// and every node's text is exactly its source slice.
fn assert_text_tiles(terms: &[Term], source: &str, start: usize) {
    let mut pos = start;
    for term in terms {
        let span = term.span();
        assert_eq!(span.start, pos, "gap before {:?} in {source:?}", term.text());
        assert_eq!(&source[span.clone()], term.text().as_str());
        if let Term::LogicGroup(group) = term {
            // Children tile the region between the parentheses.
            assert_text_tiles(&group.terms, source, span.start + 1);
            if let Some(last) = group.terms.last() {
                assert_eq!(last.span().end, span.end - 1);
            }
        }
        pos = span.end;
    }
}

#[test]
fn join_round_trips_every_corpus_query() {
    let config = corpus_config();
    for query in CORPUS {
        let terms = parse(query, &config)
            .unwrap_or_else(|| panic!("corpus query failed to parse: {query:?}"));
        assert_eq!(join(&terms), *query, "round trip for {query:?}");
    }
}

#[test]
fn node_texts_tile_the_input() {
    let config = corpus_config();
    for query in CORPUS {
        let terms = parse(query, &config).unwrap();
        let joined: String = terms.iter().map(|term| term.text().as_str()).collect();
        assert_eq!(joined, *query);
        assert_text_tiles(&terms, query, 0);
    }
}

#[test]
fn negation_respects_filter_type_config() {
    let config = corpus_config();
    for query in CORPUS {
        for filter in all_filters(&parse(query, &config).unwrap()) {
            if filter.negated {
                assert!(
                    filter.filter.can_negate(),
                    "negated {:?} in {query:?}",
                    filter.filter
                );
            }
        }
    }
}

#[test]
fn operators_are_admissible() {
    let config = corpus_config();
    for query in CORPUS {
        for filter in all_filters(&parse(query, &config).unwrap()) {
            let ops = filter.filter.config().valid_ops;
            let admissible = filter.operator == Operator::Empty
                || ops.contains(&filter.operator)
                || (config.allows_text_operators(filter.key.name())
                    && (filter.operator.is_comparison() || filter.operator == Operator::Equal));
            assert!(
                admissible,
                "operator {:?} on {:?} in {query:?}",
                filter.operator, filter.filter
            );
        }
    }
}

#[test]
fn valid_filters_match_the_shape_table() {
    let config = corpus_config();
    for query in CORPUS {
        for filter in all_filters(&parse(query, &config).unwrap()) {
            if filter.invalid.is_some() {
                continue;
            }
            let shape = filter.filter.config();
            // The one sanctioned exception: a function key falling back
            // to a text filter.
            let function_fallback =
                filter.filter == FilterType::Text && filter.key.kind() == KeyKind::Aggregate;
            if !function_fallback {
                assert!(
                    shape.valid_keys.contains(&filter.key.kind()),
                    "key kind {:?} on {:?} in {query:?}",
                    filter.key.kind(),
                    filter.filter
                );
            }
            if !shape.valid_values.is_empty() {
                assert!(
                    shape.valid_values.contains(&filter.value.kind()),
                    "value kind {:?} on {:?} in {query:?}",
                    filter.value.kind(),
                    filter.filter
                );
            }
        }
    }
}

#[test]
fn spans_lie_on_char_boundaries() {
    let config = corpus_config();
    let query = "müller:straße \"grüße\"";
    let terms = parse(query, &config).unwrap();
    assert_eq!(join(&terms), query);
    for term in &terms {
        assert!(query.is_char_boundary(term.span().start));
        assert!(query.is_char_boundary(term.span().end));
    }
}

#[test]
fn parse_is_deterministic() {
    let config = corpus_config();
    for query in CORPUS {
        assert_eq!(parse(query, &config), parse(query, &config));
    }
}
