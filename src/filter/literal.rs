//! Literal formatting
//!
//! Renders constants as grammar literals. Output is locale-invariant.

use std::fmt::Write;

use chrono::NaiveDateTime;

use crate::expr::{DateTimeKind, DateTimeValue, Literal};

const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Formats a constant as a grammar literal
pub fn format_literal(value: &Literal) -> String {
    let mut out = String::new();
    write_literal(&mut out, value);
    out
}

/// Appends the grammar literal for `value` to `out`
pub fn write_literal(out: &mut String, value: &Literal) {
    match value {
        Literal::Null => out.push_str("null"),
        Literal::Bool(true) => out.push_str("true"),
        Literal::Bool(false) => out.push_str("false"),
        Literal::Int(v) => {
            let _ = write!(out, "{}", v);
        }
        Literal::Double(v) => write_double(out, *v),
        Literal::Decimal(v) => {
            let _ = write!(out, "{}m", v);
        }
        Literal::String(s) => {
            out.push('\'');
            out.push_str(&s.replace('\'', "''"));
            out.push('\'');
        }
        Literal::Guid(g) => {
            let _ = write!(out, "guid'{}'", g.hyphenated());
        }
        Literal::DateTime(dt) => {
            let _ = write!(
                out,
                "datetime'{}{}'",
                dt.value.format(DATETIME_FORMAT),
                if dt.is_utc() { "Z" } else { "" }
            );
        }
    }
}

fn write_double(out: &mut String, v: f64) {
    if v.is_nan() {
        out.push_str("NaN");
    } else if v.is_infinite() {
        out.push_str(if v > 0.0 { "INF" } else { "-INF" });
    } else {
        let _ = write!(out, "{}", v);
    }
}

/// Parses the text between the quotes of a `datetime'...'` literal
pub(crate) fn parse_datetime(text: &str) -> Option<DateTimeValue> {
    match text.strip_suffix('Z') {
        Some(naive) => NaiveDateTime::parse_from_str(naive, DATETIME_FORMAT)
            .ok()
            .map(|v| DateTimeValue::new(v, DateTimeKind::Utc)),
        None => NaiveDateTime::parse_from_str(text, DATETIME_FORMAT)
            .ok()
            .map(DateTimeValue::unspecified),
    }
}
