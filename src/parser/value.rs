//! Value productions.
//!
//! Every production backtracks to its starting mark when the source does
//! not match, so the filter alternation can fall through to the next
//! variant. Scalar values must end at a term boundary; list items end at
//! a comma, a closing bracket, or whitespace inside the brackets.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use smol_str::SmolStr;

use crate::ast::{
    BooleanValue, DurationUnit, DurationValue, Iso8601DateValue, ListItem, NumberListValue,
    NumberUnit, NumberValue, Operator, PercentageValue, RelativeDateUnit, RelativeDateValue,
    RelativeSign, TextListValue, TextValue,
};
use crate::parser::Parser;

/// Duration suffixes, longest-prefix first so `ms`/`min` win over `m`.
const DURATION_SUFFIXES: &[&str] = &["ms", "min", "m", "s", "hr", "h", "day", "d", "wk", "w"];

impl Parser<'_> {
    /// Consumes an explicit comparison operator when present.
    pub(crate) fn try_operator(&mut self) -> Operator {
        for (source, op) in [
            (">=", Operator::GreaterThanEqual),
            ("<=", Operator::LessThanEqual),
            ("!=", Operator::NotEqual),
            (">", Operator::GreaterThan),
            ("<", Operator::LessThan),
            ("=", Operator::Equal),
        ] {
            if self.cursor.match_str(source) {
                return op;
            }
        }
        Operator::Empty
    }

    /// Scans the numeric core `sign? digits ('.' digits)? suffix?` without
    /// a boundary requirement. Returns the numeric text (suffix excluded),
    /// the multiplied-out value and the unit.
    fn scan_number_core(&mut self) -> Option<(SmolStr, f64, NumberUnit)> {
        let mark = self.cursor.pos();
        if let Some(ch) = self.cursor.peek() {
            if ch == '-' || ch == '+' {
                self.cursor.advance();
            }
        }
        if self.cursor.eat_while(|ch| ch.is_ascii_digit()).is_empty() {
            self.cursor.reset(mark);
            return None;
        }
        let before_fraction = self.cursor.pos();
        if self.cursor.match_char('.')
            && self.cursor.eat_while(|ch| ch.is_ascii_digit()).is_empty()
        {
            self.cursor.reset(before_fraction);
        }
        let numeric_text = self.cursor.slice_from(mark);

        let unit = match self.cursor.peek().and_then(NumberUnit::from_suffix) {
            Some(unit) => {
                self.cursor.advance();
                unit
            }
            None => NumberUnit::None,
        };

        let Ok(parsed) = numeric_text.parse::<f64>() else {
            self.cursor.reset(mark);
            return None;
        };
        Some((numeric_text.into(), parsed * unit.multiplier(), unit))
    }

    /// `500`, `-12.5`, `2.5m`, ending at a term boundary.
    pub(crate) fn try_number_value(&mut self) -> Option<NumberValue> {
        let mark = self.cursor.pos();
        let (value, raw_value, unit) = self.scan_number_core()?;
        if !self.at_term_boundary() {
            self.cursor.reset(mark);
            return None;
        }
        Some(NumberValue {
            value,
            raw_value,
            unit,
            text: self.cursor.slice_from(mark).into(),
            span: mark..self.cursor.pos(),
        })
    }

    /// `500ms`, `1.5h`: a non-negative number with a duration suffix.
    pub(crate) fn try_duration_value(&mut self) -> Option<DurationValue> {
        let mark = self.cursor.pos();
        if self.cursor.eat_while(|ch| ch.is_ascii_digit()).is_empty() {
            return None;
        }
        let before_fraction = self.cursor.pos();
        if self.cursor.match_char('.')
            && self.cursor.eat_while(|ch| ch.is_ascii_digit()).is_empty()
        {
            self.cursor.reset(before_fraction);
        }
        let number_text = self.cursor.slice_from(mark);
        let number_end = self.cursor.pos();

        let mut unit = None;
        for suffix in DURATION_SUFFIXES {
            if self.cursor.match_str(suffix) {
                if self.at_term_boundary() {
                    unit = DurationUnit::from_suffix(suffix);
                    break;
                }
                self.cursor.reset(number_end);
            }
        }
        let Some(unit) = unit else {
            self.cursor.reset(mark);
            return None;
        };
        let Ok(value) = number_text.parse::<f64>() else {
            self.cursor.reset(mark);
            return None;
        };
        Some(DurationValue {
            value,
            unit,
            text: self.cursor.slice_from(mark).into(),
            span: mark..self.cursor.pos(),
        })
    }

    /// `50%`, `99.9%`. The number is kept as written, not divided by 100.
    pub(crate) fn try_percentage_value(&mut self) -> Option<PercentageValue> {
        let mark = self.cursor.pos();
        if self.cursor.eat_while(|ch| ch.is_ascii_digit()).is_empty() {
            return None;
        }
        let before_fraction = self.cursor.pos();
        if self.cursor.match_char('.')
            && self.cursor.eat_while(|ch| ch.is_ascii_digit()).is_empty()
        {
            self.cursor.reset(before_fraction);
        }
        let number_text = self.cursor.slice_from(mark);
        if !self.cursor.match_char('%') || !self.at_term_boundary() {
            self.cursor.reset(mark);
            return None;
        }
        let Ok(value) = number_text.parse::<f64>() else {
            self.cursor.reset(mark);
            return None;
        };
        Some(PercentageValue {
            value,
            text: self.cursor.slice_from(mark).into(),
            span: mark..self.cursor.pos(),
        })
    }

    /// `1`, `0`, `true`, `false`, case-insensitive.
    pub(crate) fn try_boolean_value(&mut self) -> Option<BooleanValue> {
        let mark = self.cursor.pos();
        let token = self.cursor.eat_while(|ch| ch.is_ascii_alphanumeric());
        if token.is_empty() || !self.at_term_boundary() {
            self.cursor.reset(mark);
            return None;
        }
        let lowered = token.to_ascii_lowercase();
        let value = match lowered.as_str() {
            "1" | "true" => true,
            "0" | "false" => false,
            _ => {
                self.cursor.reset(mark);
                return None;
            }
        };
        Some(BooleanValue {
            value,
            text: token.into(),
            span: mark..self.cursor.pos(),
        })
    }

    /// `2023-01-01` or `2023-01-01T00:00:00(.123)?(Z|±hh:mm)?`, normalized
    /// to a UTC timestamp.
    pub(crate) fn try_iso_date_value(&mut self) -> Option<Iso8601DateValue> {
        let mark = self.cursor.pos();
        if !(self.eat_exact_digits(4)
            && self.cursor.match_char('-')
            && self.eat_exact_digits(2)
            && self.cursor.match_char('-')
            && self.eat_exact_digits(2))
        {
            self.cursor.reset(mark);
            return None;
        }

        let mut has_time = false;
        let mut has_offset = false;
        if self.cursor.match_char('T') {
            has_time = true;
            if !(self.eat_exact_digits(2)
                && self.cursor.match_char(':')
                && self.eat_exact_digits(2)
                && self.cursor.match_char(':')
                && self.eat_exact_digits(2))
            {
                self.cursor.reset(mark);
                return None;
            }
            if self.cursor.match_char('.')
                && self.cursor.eat_while(|ch| ch.is_ascii_digit()).is_empty()
            {
                self.cursor.reset(mark);
                return None;
            }
            if self.cursor.match_char('Z') {
                has_offset = true;
            } else if matches!(self.cursor.peek(), Some('+') | Some('-')) {
                self.cursor.advance();
                if !(self.eat_exact_digits(2)
                    && self.cursor.match_char(':')
                    && self.eat_exact_digits(2))
                {
                    self.cursor.reset(mark);
                    return None;
                }
                has_offset = true;
            }
        }

        if !self.at_term_boundary() {
            self.cursor.reset(mark);
            return None;
        }
        let text = self.cursor.slice_from(mark);
        let Some(value) = parse_iso_timestamp(text, has_time, has_offset) else {
            self.cursor.reset(mark);
            return None;
        };
        Some(Iso8601DateValue {
            value,
            text: text.into(),
            span: mark..self.cursor.pos(),
        })
    }

    /// `-24h`, `+7d`: a signed offset from now.
    pub(crate) fn try_relative_date_value(&mut self) -> Option<RelativeDateValue> {
        let mark = self.cursor.pos();
        let sign = match self.cursor.peek() {
            Some('+') => RelativeSign::Plus,
            Some('-') => RelativeSign::Minus,
            _ => return None,
        };
        self.cursor.advance();
        let digits = self.cursor.eat_while(|ch| ch.is_ascii_digit());
        if digits.is_empty() {
            self.cursor.reset(mark);
            return None;
        }
        let Ok(value) = digits.parse::<u64>() else {
            self.cursor.reset(mark);
            return None;
        };
        let unit = match self.cursor.peek().and_then(RelativeDateUnit::from_suffix) {
            Some(unit) => {
                self.cursor.advance();
                unit
            }
            None => {
                self.cursor.reset(mark);
                return None;
            }
        };
        if !self.at_term_boundary() {
            self.cursor.reset(mark);
            return None;
        }
        Some(RelativeDateValue {
            value,
            sign,
            unit,
            text: self.cursor.slice_from(mark).into(),
            span: mark..self.cursor.pos(),
        })
    }

    /// A generic text value: a quoted string or a bare run up to the term
    /// boundary. The bare run may be empty (`key:`) and may contain
    /// quotes mid-token; it cannot start with one.
    pub(crate) fn try_text_value(&mut self) -> Option<TextValue> {
        let mark = self.cursor.pos();
        if self.cursor.peek() == Some('"') {
            let Ok(value) = self.parse_quoted_string() else {
                self.cursor.reset(mark);
                return None;
            };
            if !self.at_term_boundary() {
                self.cursor.reset(mark);
                return None;
            }
            return Some(TextValue {
                value,
                quoted: true,
                text: self.cursor.slice_from(mark).into(),
                span: mark..self.cursor.pos(),
            });
        }
        let run = self.cursor.eat_while(is_value_char);
        Some(TextValue {
            value: run.into(),
            quoted: false,
            text: run.into(),
            span: mark..self.cursor.pos(),
        })
    }

    /// `[1, 2.5k, -3]`. Every item must scan as a number.
    pub(crate) fn try_number_list(&mut self) -> Option<NumberListValue> {
        let mark = self.cursor.pos();
        if !self.cursor.match_char('[') {
            return None;
        }
        let mut items = Vec::new();
        let mut separator_mark = self.cursor.pos();
        self.cursor.eat_while(|ch| ch.is_ascii_whitespace());
        loop {
            let separator: SmolStr = self.cursor.slice_from(separator_mark).into();
            let item_mark = self.cursor.pos();
            let Some((value, raw_value, unit)) = self.scan_number_core() else {
                self.cursor.reset(mark);
                return None;
            };
            items.push(ListItem {
                separator,
                value: NumberValue {
                    value,
                    raw_value,
                    unit,
                    text: self.cursor.slice_from(item_mark).into(),
                    span: item_mark..self.cursor.pos(),
                },
            });
            separator_mark = self.cursor.pos();
            self.cursor.eat_while(|ch| ch.is_ascii_whitespace());
            if self.cursor.match_char(',') {
                self.cursor.eat_while(|ch| ch.is_ascii_whitespace());
                continue;
            }
            if self.cursor.match_char(']') {
                break;
            }
            self.cursor.reset(mark);
            return None;
        }
        if !self.at_term_boundary() {
            self.cursor.reset(mark);
            return None;
        }
        Some(NumberListValue {
            items,
            text: self.cursor.slice_from(mark).into(),
            span: mark..self.cursor.pos(),
        })
    }

    /// `[alpha, "beta c", gamma]`. Items may be empty; the validator
    /// flags those.
    pub(crate) fn try_text_list(&mut self) -> Option<TextListValue> {
        let mark = self.cursor.pos();
        if !self.cursor.match_char('[') {
            return None;
        }
        let mut items = Vec::new();
        let mut separator_mark = self.cursor.pos();
        self.cursor.eat_while(|ch| ch.is_ascii_whitespace());
        loop {
            let separator: SmolStr = self.cursor.slice_from(separator_mark).into();
            let item_mark = self.cursor.pos();
            let value = if self.cursor.peek() == Some('"') {
                let Ok(value) = self.parse_quoted_string() else {
                    self.cursor.reset(mark);
                    return None;
                };
                TextValue {
                    value,
                    quoted: true,
                    text: self.cursor.slice_from(item_mark).into(),
                    span: item_mark..self.cursor.pos(),
                }
            } else {
                let run = self.cursor.eat_while(is_list_item_char);
                TextValue {
                    value: run.into(),
                    quoted: false,
                    text: run.into(),
                    span: item_mark..self.cursor.pos(),
                }
            };
            items.push(ListItem { separator, value });
            separator_mark = self.cursor.pos();
            self.cursor.eat_while(|ch| ch.is_ascii_whitespace());
            if self.cursor.match_char(',') {
                self.cursor.eat_while(|ch| ch.is_ascii_whitespace());
                continue;
            }
            if self.cursor.match_char(']') {
                break;
            }
            self.cursor.reset(mark);
            return None;
        }
        if !self.at_term_boundary() {
            self.cursor.reset(mark);
            return None;
        }
        Some(TextListValue {
            items,
            text: self.cursor.slice_from(mark).into(),
            span: mark..self.cursor.pos(),
        })
    }

    fn eat_exact_digits(&mut self, count: usize) -> bool {
        for _ in 0..count {
            if !self.cursor.peek().is_some_and(|ch| ch.is_ascii_digit()) {
                return false;
            }
            self.cursor.advance();
        }
        true
    }
}

fn is_value_char(ch: char) -> bool {
    !ch.is_ascii_whitespace() && !matches!(ch, '(' | ')')
}

fn is_list_item_char(ch: char) -> bool {
    !ch.is_ascii_whitespace() && !matches!(ch, ',' | ']' | '(' | ')' | '"')
}

fn parse_iso_timestamp(text: &str, has_time: bool, has_offset: bool) -> Option<DateTime<Utc>> {
    if !has_time {
        let date = NaiveDate::parse_from_str(text, "%Y-%m-%d").ok()?;
        return Some(date.and_hms_opt(0, 0, 0)?.and_utc());
    }
    if has_offset {
        return DateTime::parse_from_rfc3339(text)
            .ok()
            .map(|value| value.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|value| value.and_utc())
}
