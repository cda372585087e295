//! Key subtrees: the left-hand side of a filter.

use smol_str::SmolStr;
use std::fmt;

use crate::ast::Span;

/// A bare or quoted key (`browser.name`, `"weird key"`).
#[derive(Debug, Clone, PartialEq)]
pub struct SimpleKey {
    /// The key name with quotes stripped.
    pub value: SmolStr,
    /// Whether the source was enclosed in double quotes.
    pub quoted: bool,
    /// Exact source slice, quotes included.
    pub text: SmolStr,
    pub span: Span,
}

/// The `tags[name]` escape that forces text-filter interpretation
/// regardless of the named key's cataloged type.
#[derive(Debug, Clone, PartialEq)]
pub struct ExplicitTagKey {
    /// The literal prefix, always `tags`.
    pub prefix: SmolStr,
    /// The tag named inside the brackets.
    pub key: SimpleKey,
    pub text: SmolStr,
    pub span: Span,
}

/// One argument of an aggregate key, with the raw separator text that
/// preceded it in source.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateArg {
    /// Raw text between the previous argument (or `(`) and this value.
    pub separator: SmolStr,
    pub value: AggregateParam,
}

/// A single aggregate argument value, quoted or bare.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateParam {
    pub value: SmolStr,
    pub quoted: bool,
    pub text: SmolStr,
    pub span: Span,
}

/// The parenthesized argument list of an aggregate key.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateArgs {
    pub args: Vec<AggregateArg>,
    pub text: SmolStr,
    pub span: Span,
}

/// A function-shaped key (`p95(transaction.duration)`, `count()`).
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateKey {
    pub name: SimpleKey,
    /// `None` for an empty argument list.
    pub args: Option<AggregateArgs>,
    /// Whitespace between `(` and the first argument.
    pub space_before: SmolStr,
    /// Whitespace between the last argument and `)`.
    pub space_after: SmolStr,
    pub text: SmolStr,
    pub span: Span,
}

impl AggregateKey {
    /// Iterates the argument values in order.
    pub fn arg_values(&self) -> impl Iterator<Item = &AggregateParam> {
        self.args.iter().flat_map(|args| args.args.iter().map(|arg| &arg.value))
    }
}

/// Discriminator for [`Key`] variants, used by the filter-type
/// configuration table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    Simple,
    ExplicitTag,
    Aggregate,
}

/// The key subtree of a filter.
#[derive(Debug, Clone, PartialEq)]
pub enum Key {
    Simple(SimpleKey),
    ExplicitTag(ExplicitTagKey),
    Aggregate(AggregateKey),
}

impl Key {
    /// The name used for catalog lookups: the key itself for simple keys,
    /// the inner tag for `tags[...]`, the function name for aggregates.
    pub fn name(&self) -> &str {
        match self {
            Key::Simple(key) => &key.value,
            Key::ExplicitTag(key) => &key.key.value,
            Key::Aggregate(key) => &key.name.value,
        }
    }

    /// The exact source slice of this key.
    pub fn text(&self) -> &SmolStr {
        match self {
            Key::Simple(key) => &key.text,
            Key::ExplicitTag(key) => &key.text,
            Key::Aggregate(key) => &key.text,
        }
    }

    /// The source span of this key.
    pub fn span(&self) -> &Span {
        match self {
            Key::Simple(key) => &key.span,
            Key::ExplicitTag(key) => &key.span,
            Key::Aggregate(key) => &key.span,
        }
    }

    /// The variant discriminator.
    pub fn kind(&self) -> KeyKind {
        match self {
            Key::Simple(_) => KeyKind::Simple,
            Key::ExplicitTag(_) => KeyKind::ExplicitTag,
            Key::Aggregate(_) => KeyKind::Aggregate,
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn simple(name: &str) -> SimpleKey {
        SimpleKey {
            value: name.into(),
            quoted: false,
            text: name.into(),
            span: 0..name.len(),
        }
    }

    #[test]
    fn simple_key_name() {
        let key = Key::Simple(simple("browser.name"));
        assert_eq!(key.name(), "browser.name");
        assert_eq!(key.kind(), KeyKind::Simple);
    }

    #[test]
    fn explicit_tag_name_is_inner_key() {
        let key = Key::ExplicitTag(ExplicitTagKey {
            prefix: "tags".into(),
            key: simple("browser"),
            text: "tags[browser]".into(),
            span: 0..13,
        });
        assert_eq!(key.name(), "browser");
        assert_eq!(key.text(), "tags[browser]");
    }

    #[test]
    fn aggregate_arg_values_in_order() {
        let key = AggregateKey {
            name: simple("count_if"),
            args: Some(AggregateArgs {
                args: vec![
                    AggregateArg {
                        separator: "".into(),
                        value: AggregateParam {
                            value: "transaction.duration".into(),
                            quoted: false,
                            text: "transaction.duration".into(),
                            span: 9..29,
                        },
                    },
                    AggregateArg {
                        separator: ",".into(),
                        value: AggregateParam {
                            value: "greater".into(),
                            quoted: false,
                            text: "greater".into(),
                            span: 30..37,
                        },
                    },
                ],
                text: "transaction.duration,greater".into(),
                span: 9..37,
            }),
            space_before: "".into(),
            space_after: "".into(),
            text: "count_if(transaction.duration,greater)".into(),
            span: 0..38,
        };
        let values: Vec<&str> = key.arg_values().map(|arg| arg.value.as_str()).collect();
        assert_eq!(values, ["transaction.duration", "greater"]);
    }
}
