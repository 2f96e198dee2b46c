//! Constant values carried by predicate expressions

use chrono::{DateTime, Local, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::TypeRef;

/// Kind of a date/time value, mirroring how the value was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DateTimeKind {
    Utc,
    Local,
    Unspecified,
}

/// Wall-clock date/time plus its kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateTimeValue {
    pub value: NaiveDateTime,
    pub kind: DateTimeKind,
}

impl DateTimeValue {
    pub fn new(value: NaiveDateTime, kind: DateTimeKind) -> Self {
        Self { value, kind }
    }

    pub fn utc(value: DateTime<Utc>) -> Self {
        Self::new(value.naive_utc(), DateTimeKind::Utc)
    }

    pub fn local(value: NaiveDateTime) -> Self {
        Self::new(value, DateTimeKind::Local)
    }

    pub fn unspecified(value: NaiveDateTime) -> Self {
        Self::new(value, DateTimeKind::Unspecified)
    }

    pub fn is_utc(&self) -> bool {
        self.kind == DateTimeKind::Utc
    }
}

impl From<DateTime<Utc>> for DateTimeValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::utc(value)
    }
}

impl From<DateTime<Local>> for DateTimeValue {
    fn from(value: DateTime<Local>) -> Self {
        Self::local(value.naive_local())
    }
}

/// A typed constant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Literal {
    Null,
    Bool(bool),
    Int(i64),
    Double(f64),
    Decimal(Decimal),
    String(String),
    Guid(Uuid),
    DateTime(DateTimeValue),
}

impl Literal {
    /// Default type tag for this value
    pub fn type_ref(&self) -> TypeRef {
        match self {
            Literal::Null => TypeRef::object(),
            Literal::Bool(_) => TypeRef::boolean(),
            Literal::Int(v) if i32::try_from(*v).is_ok() => TypeRef::int32(),
            Literal::Int(_) => TypeRef::int64(),
            Literal::Double(_) => TypeRef::double(),
            Literal::Decimal(_) => TypeRef::decimal(),
            Literal::String(_) => TypeRef::string(),
            Literal::Guid(_) => TypeRef::guid(),
            Literal::DateTime(_) => TypeRef::date_time(),
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Literal::Int(v) => Some(*v),
            _ => None,
        }
    }
}

impl From<&str> for Literal {
    fn from(v: &str) -> Self {
        Literal::String(v.to_string())
    }
}

impl From<String> for Literal {
    fn from(v: String) -> Self {
        Literal::String(v)
    }
}

impl From<bool> for Literal {
    fn from(v: bool) -> Self {
        Literal::Bool(v)
    }
}

impl From<i32> for Literal {
    fn from(v: i32) -> Self {
        Literal::Int(i64::from(v))
    }
}

impl From<i64> for Literal {
    fn from(v: i64) -> Self {
        Literal::Int(v)
    }
}

impl From<f64> for Literal {
    fn from(v: f64) -> Self {
        Literal::Double(v)
    }
}

impl From<Decimal> for Literal {
    fn from(v: Decimal) -> Self {
        Literal::Decimal(v)
    }
}

impl From<Uuid> for Literal {
    fn from(v: Uuid) -> Self {
        Literal::Guid(v)
    }
}

impl From<DateTimeValue> for Literal {
    fn from(v: DateTimeValue) -> Self {
        Literal::DateTime(v)
    }
}

impl From<DateTime<Utc>> for Literal {
    fn from(v: DateTime<Utc>) -> Self {
        Literal::DateTime(v.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_int_type_widens_past_i32() {
        assert_eq!(Literal::Int(42).type_ref(), TypeRef::int32());
        assert_eq!(Literal::Int(i64::from(i32::MAX) + 1).type_ref(), TypeRef::int64());
    }

    #[test]
    fn test_utc_conversion_keeps_wall_clock() {
        let instant = Utc.with_ymd_and_hms(2012, 10, 22, 5, 32, 45).unwrap();
        let value = DateTimeValue::from(instant);
        assert!(value.is_utc());
        assert_eq!(value.value, instant.naive_utc());
    }

    #[test]
    fn test_literal_json_shape() {
        let json = serde_json::to_value(Literal::from("What")).unwrap();
        assert_eq!(json, serde_json::json!({"type": "string", "value": "What"}));
        let back: Literal = serde_json::from_value(serde_json::json!({"type": "null"})).unwrap();
        assert_eq!(back, Literal::Null);
    }
}
