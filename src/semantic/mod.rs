//! Post-parse validation.
//!
//! Once the grammar has committed a filter shape, these checks classify
//! it as valid or invalid with a structured reason and, where the key's
//! cataloged type disagrees with the landed shape, a typed repair hint.
//! Verdicts are data on the filter node; validation never fails a parse.

mod aggregate;
mod validator;

pub(crate) use validator::validate_filter;
