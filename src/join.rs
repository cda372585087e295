//! Reassembling a term sequence into query text.
//!
//! Every node carries its exact source slice, so joining is pure
//! concatenation; with default options the result is byte-identical to
//! the parsed input.

use crate::ast::Term;

/// Options for [`join_with`].
#[derive(Debug, Clone, Copy, Default)]
pub struct JoinOptions {
    /// Prepend a single space when the joined text is non-empty.
    pub leading_space: bool,
    /// Insert a space between top-level terms.
    pub additional_space_between: bool,
}

/// Joins terms back into query text. With defaults this is the exact
/// inverse of parsing: `join(&parse(q, cfg)?) == q`.
pub fn join(terms: &[Term]) -> String {
    join_with(terms, &JoinOptions::default())
}

/// Joins terms with explicit spacing options.
pub fn join_with(terms: &[Term], options: &JoinOptions) -> String {
    let mut out = String::new();
    for (index, term) in terms.iter().enumerate() {
        if index > 0 && options.additional_space_between {
            out.push(' ');
        }
        out.push_str(term.text());
    }
    if options.leading_space && !out.is_empty() {
        out.insert(0, ' ');
    }
    out
}
