//! AST traversal for downstream consumers.
//!
//! Suggestion UIs and query inspectors walk the term sequence rather than
//! pattern-matching it by hand; the visitor recurses into groups so a
//! consumer only overrides the node kinds it cares about.

use crate::ast::filter::Filter;
use crate::ast::term::{FreeText, LogicBoolean, LogicGroup, Spaces, Term};

/// Visitor over a parsed term sequence.
///
/// Every method has a default that continues the traversal, so
/// implementations override only what they need.
pub trait TermVisitor {
    fn visit_term(&mut self, term: &Term) {
        walk_term(self, term);
    }

    fn visit_filter(&mut self, _filter: &Filter) {}

    fn visit_logic_group(&mut self, group: &LogicGroup) {
        walk_logic_group(self, group);
    }

    fn visit_logic_boolean(&mut self, _op: &LogicBoolean) {}

    fn visit_free_text(&mut self, _text: &FreeText) {}

    fn visit_spaces(&mut self, _spaces: &Spaces) {}
}

/// Visits every term of a sequence in order.
pub fn walk_terms<V: TermVisitor + ?Sized>(visitor: &mut V, terms: &[Term]) {
    for term in terms {
        visitor.visit_term(term);
    }
}

/// Dispatches one term to its kind-specific visit method.
pub fn walk_term<V: TermVisitor + ?Sized>(visitor: &mut V, term: &Term) {
    match term {
        Term::LogicBoolean(op) => visitor.visit_logic_boolean(op),
        Term::LogicGroup(group) => visitor.visit_logic_group(group),
        Term::Filter(filter) => visitor.visit_filter(filter),
        Term::FreeText(text) => visitor.visit_free_text(text),
        Term::Spaces(spaces) => visitor.visit_spaces(spaces),
    }
}

/// Recurses into a group's terms.
pub fn walk_logic_group<V: TermVisitor + ?Sized>(visitor: &mut V, group: &LogicGroup) {
    walk_terms(visitor, &group.terms);
}

/// Collects every filter carrying an invalidity verdict, groups included.
#[derive(Debug, Default)]
pub struct InvalidFilterCollector {
    filters: Vec<Filter>,
}

impl InvalidFilterCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// The collected invalid filters, in source order.
    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    pub fn into_filters(self) -> Vec<Filter> {
        self.filters
    }
}

impl TermVisitor for InvalidFilterCollector {
    fn visit_filter(&mut self, filter: &Filter) {
        if filter.invalid.is_some() {
            self.filters.push(filter.clone());
        }
    }
}
