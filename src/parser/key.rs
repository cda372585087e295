//! Key productions: simple and quoted keys, the `tags[...]` escape, and
//! aggregate keys with their argument lists.

use smol_str::SmolStr;

use crate::ast::{
    AggregateArg, AggregateArgs, AggregateKey, AggregateParam, ExplicitTagKey, Key, SimpleKey,
};
use crate::parser::Parser;

impl Parser<'_> {
    /// Tries the key alternatives in order: aggregate, explicit tag,
    /// simple.
    pub(crate) fn try_key(&mut self) -> Option<Key> {
        if let Some(key) = self.try_aggregate_key() {
            return Some(Key::Aggregate(key));
        }
        if let Some(key) = self.try_explicit_tag_key() {
            return Some(Key::ExplicitTag(key));
        }
        self.try_simple_key().map(Key::Simple)
    }

    /// A bare (`browser.name`) or quoted (`"weird key"`) key.
    pub(crate) fn try_simple_key(&mut self) -> Option<SimpleKey> {
        let mark = self.cursor.pos();
        if self.cursor.peek() == Some('"') {
            let Ok(value) = self.parse_quoted_string() else {
                self.cursor.reset(mark);
                return None;
            };
            if value.is_empty() {
                self.cursor.reset(mark);
                return None;
            }
            return Some(SimpleKey {
                value,
                quoted: true,
                text: self.cursor.slice_from(mark).into(),
                span: mark..self.cursor.pos(),
            });
        }
        self.try_bare_key_name().map(|name| SimpleKey {
            value: name,
            quoted: false,
            text: self.cursor.slice_from(mark).into(),
            span: mark..self.cursor.pos(),
        })
    }

    /// `tags[name]` or `tags["name with spaces"]`.
    fn try_explicit_tag_key(&mut self) -> Option<ExplicitTagKey> {
        let mark = self.cursor.pos();
        if !self.cursor.match_str("tags[") {
            return None;
        }
        let Some(key) = self.try_simple_key() else {
            self.cursor.reset(mark);
            return None;
        };
        if !self.cursor.match_char(']') {
            self.cursor.reset(mark);
            return None;
        }
        Some(ExplicitTagKey {
            prefix: "tags".into(),
            key,
            text: self.cursor.slice_from(mark).into(),
            span: mark..self.cursor.pos(),
        })
    }

    /// `name(arg, ...)` with optional whitespace inside the parentheses.
    fn try_aggregate_key(&mut self) -> Option<AggregateKey> {
        let mark = self.cursor.pos();
        let name_mark = mark;
        let Some(name) = self.try_bare_key_name() else {
            return None;
        };
        let name = SimpleKey {
            value: name,
            quoted: false,
            text: self.cursor.slice_from(name_mark).into(),
            span: name_mark..self.cursor.pos(),
        };
        if !self.cursor.match_char('(') {
            self.cursor.reset(mark);
            return None;
        }
        let space_before: SmolStr = self
            .cursor
            .eat_while(|ch| ch.is_ascii_whitespace())
            .into();

        let mut args = None;
        let mut space_after = SmolStr::default();
        if self.cursor.peek() != Some(')') {
            let args_mark = self.cursor.pos();
            let mut list = Vec::new();
            let mut separator = SmolStr::default();
            let mut args_end;
            loop {
                let Some(value) = self.try_aggregate_param() else {
                    self.cursor.reset(mark);
                    return None;
                };
                list.push(AggregateArg { separator, value });
                args_end = self.cursor.pos();
                let separator_mark = self.cursor.pos();
                self.cursor.eat_while(|ch| ch.is_ascii_whitespace());
                if self.cursor.match_char(',') {
                    self.cursor.eat_while(|ch| ch.is_ascii_whitespace());
                    separator = self.cursor.slice_from(separator_mark).into();
                    continue;
                }
                space_after = self.cursor.slice_from(separator_mark).into();
                break;
            }
            args = Some(AggregateArgs {
                args: list,
                text: self.cursor.source()[args_mark..args_end].into(),
                span: args_mark..args_end,
            });
        }
        if !self.cursor.match_char(')') {
            self.cursor.reset(mark);
            return None;
        }
        Some(AggregateKey {
            name,
            args,
            space_before,
            space_after,
            text: self.cursor.slice_from(mark).into(),
            span: mark..self.cursor.pos(),
        })
    }

    /// One aggregate argument: a quoted string or a bare run.
    fn try_aggregate_param(&mut self) -> Option<AggregateParam> {
        let mark = self.cursor.pos();
        if self.cursor.peek() == Some('"') {
            let Ok(value) = self.parse_quoted_string() else {
                self.cursor.reset(mark);
                return None;
            };
            return Some(AggregateParam {
                value,
                quoted: true,
                text: self.cursor.slice_from(mark).into(),
                span: mark..self.cursor.pos(),
            });
        }
        let run = self.cursor.eat_while(is_aggregate_param_char);
        if run.is_empty() {
            return None;
        }
        Some(AggregateParam {
            value: run.into(),
            quoted: false,
            text: run.into(),
            span: mark..self.cursor.pos(),
        })
    }

    /// `[A-Za-z_][A-Za-z0-9_.-]*`. The separating colon is never part of
    /// a bare key; quoted keys cover exotic names.
    fn try_bare_key_name(&mut self) -> Option<SmolStr> {
        let mark = self.cursor.pos();
        match self.cursor.peek() {
            Some(ch) if ch.is_ascii_alphabetic() || ch == '_' => {
                self.cursor.advance();
            }
            _ => return None,
        }
        self.cursor
            .eat_while(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '_' | '.' | '-'));
        Some(self.cursor.slice_from(mark).into())
    }
}

fn is_aggregate_param_char(ch: char) -> bool {
    !ch.is_ascii_whitespace() && !matches!(ch, ',' | '(' | ')' | '"')
}
