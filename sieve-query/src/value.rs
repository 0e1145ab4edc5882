//! Scalar values carried by predicate leaves.

use std::fmt;
use std::hash::{Hash, Hasher};

use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A scalar value that a predicate compares a field against.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalarValue {
    /// Null value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Float value.
    Float(f64),
    /// String value.
    String(String),
    /// Calendar day.
    Date(NaiveDate),
    /// Instant in time.
    Timestamp(DateTime<Utc>),
    /// JSON value.
    Json(serde_json::Value),
    /// List of values.
    List(Vec<ScalarValue>),
}

/// Discriminant of a [`ScalarValue`], used to decide whether value sets can be merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// `ScalarValue::Null`.
    Null,
    /// `ScalarValue::Bool`.
    Bool,
    /// `ScalarValue::Int`.
    Int,
    /// `ScalarValue::Float`.
    Float,
    /// `ScalarValue::String`.
    String,
    /// `ScalarValue::Date`.
    Date,
    /// `ScalarValue::Timestamp`.
    Timestamp,
    /// `ScalarValue::Json`.
    Json,
    /// `ScalarValue::List`.
    List,
}

impl ScalarValue {
    /// Check if this is a null value.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Null, or a string with no visible characters.
    ///
    /// Leaves carrying a blank value place no constraint on the result.
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Null => true,
            Self::String(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Whether the value is a calendar day or an instant.
    pub fn is_date_like(&self) -> bool {
        matches!(self, Self::Date(_) | Self::Timestamp(_))
    }

    /// Get the kind of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Null => ValueKind::Null,
            Self::Bool(_) => ValueKind::Bool,
            Self::Int(_) => ValueKind::Int,
            Self::Float(_) => ValueKind::Float,
            Self::String(_) => ValueKind::String,
            Self::Date(_) => ValueKind::Date,
            Self::Timestamp(_) => ValueKind::Timestamp,
            Self::Json(_) => ValueKind::Json,
            Self::List(_) => ValueKind::List,
        }
    }

    /// Move a date-like value by whole days.
    ///
    /// Non date-like values are returned unchanged. Returns `None` when the
    /// result would leave the representable calendar.
    pub fn shift_days(self, days: i64) -> Option<Self> {
        let step = Days::new(days.unsigned_abs());
        match self {
            Self::Date(d) => {
                let shifted = if days >= 0 {
                    d.checked_add_days(step)
                } else {
                    d.checked_sub_days(step)
                };
                shifted.map(Self::Date)
            }
            Self::Timestamp(ts) => {
                let shifted = if days >= 0 {
                    ts.checked_add_days(step)
                } else {
                    ts.checked_sub_days(step)
                };
                shifted.map(Self::Timestamp)
            }
            other => Some(other),
        }
    }
}

/// The kind shared by every value of a slice, if there is exactly one.
pub fn common_kind(values: &[ScalarValue]) -> Option<ValueKind> {
    let mut iter = values.iter().map(ScalarValue::kind);
    let first = iter.next()?;
    iter.all(|k| k == first).then_some(first)
}

/// Bit pattern a float is compared and hashed by. Both zeros share one key;
/// NaN stays equal to itself so that values can be set members.
fn float_key(f: f64) -> u64 {
    if f == 0.0 { 0 } else { f.to_bits() }
}

/// Hash a JSON value consistently with `serde_json::Value` equality.
fn hash_json<H: Hasher>(value: &serde_json::Value, state: &mut H) {
    use serde_json::Value;

    std::mem::discriminant(value).hash(state);
    match value {
        Value::Null => {}
        Value::Bool(b) => b.hash(state),
        Value::Number(n) => match (n.as_i64(), n.as_u64()) {
            (Some(i), _) => i.hash(state),
            (None, Some(u)) => u.hash(state),
            (None, None) => float_key(n.as_f64().unwrap_or_default()).hash(state),
        },
        Value::String(s) => s.hash(state),
        Value::Array(items) => {
            items.len().hash(state);
            for item in items {
                hash_json(item, state);
            }
        }
        Value::Object(map) => {
            // Object equality ignores entry order.
            let mut entries: Vec<_> = map.iter().collect();
            entries.sort_unstable_by(|a, b| a.0.cmp(b.0));
            entries.len().hash(state);
            for (key, item) in entries {
                key.hash(state);
                hash_json(item, state);
            }
        }
    }
}

impl PartialEq for ScalarValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => float_key(*a) == float_key(*b),
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Date(a), Self::Date(b)) => a == b,
            (Self::Timestamp(a), Self::Timestamp(b)) => a == b,
            (Self::Json(a), Self::Json(b)) => a == b,
            (Self::List(a), Self::List(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for ScalarValue {}

impl Hash for ScalarValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind().hash(state);
        match self {
            Self::Null => {}
            Self::Bool(b) => b.hash(state),
            Self::Int(i) => i.hash(state),
            Self::Float(f) => float_key(*f).hash(state),
            Self::String(s) => s.hash(state),
            Self::Date(d) => d.hash(state),
            Self::Timestamp(ts) => ts.hash(state),
            Self::Json(v) => hash_json(v, state),
            Self::List(items) => items.hash(state),
        }
    }
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{}", b),
            Self::Int(i) => write!(f, "{}", i),
            Self::Float(x) => write!(f, "{:?}", x),
            Self::String(s) => write!(f, "{:?}", s),
            Self::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Self::Timestamp(ts) => write!(f, "{}", ts.to_rfc3339()),
            Self::Json(v) => write!(f, "{}", v),
            Self::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
        }
    }
}

impl From<bool> for ScalarValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for ScalarValue {
    fn from(v: i32) -> Self {
        Self::Int(v as i64)
    }
}

impl From<i64> for ScalarValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<u32> for ScalarValue {
    fn from(v: u32) -> Self {
        Self::Int(v as i64)
    }
}

impl From<f64> for ScalarValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<String> for ScalarValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<&str> for ScalarValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<NaiveDate> for ScalarValue {
    fn from(v: NaiveDate) -> Self {
        Self::Date(v)
    }
}

impl From<DateTime<Utc>> for ScalarValue {
    fn from(v: DateTime<Utc>) -> Self {
        Self::Timestamp(v)
    }
}

impl From<serde_json::Value> for ScalarValue {
    fn from(v: serde_json::Value) -> Self {
        Self::Json(v)
    }
}

impl<T: Into<ScalarValue>> From<Vec<T>> for ScalarValue {
    fn from(v: Vec<T>) -> Self {
        Self::List(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<ScalarValue>> From<Option<T>> for ScalarValue {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => Self::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use indexmap::IndexSet;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_scalar_value_from() {
        assert_eq!(ScalarValue::from(42i32), ScalarValue::Int(42));
        assert_eq!(ScalarValue::from("hello"), ScalarValue::String("hello".to_string()));
        assert_eq!(ScalarValue::from(true), ScalarValue::Bool(true));
        assert_eq!(ScalarValue::from(None::<i64>), ScalarValue::Null);
    }

    #[test]
    fn test_blank_values() {
        assert!(ScalarValue::Null.is_blank());
        assert!(ScalarValue::from("").is_blank());
        assert!(ScalarValue::from("   ").is_blank());
        assert!(!ScalarValue::from("x").is_blank());
        assert!(!ScalarValue::Int(0).is_blank());
    }

    #[test]
    fn test_float_equality_is_bitwise() {
        assert_eq!(ScalarValue::Float(f64::NAN), ScalarValue::Float(f64::NAN));
        assert_ne!(ScalarValue::Float(1.0), ScalarValue::Int(1));
        assert_ne!(ScalarValue::Float(1.0), ScalarValue::Float(-1.0));
    }

    #[test]
    fn test_signed_zeros_are_one_member() {
        let set: IndexSet<ScalarValue> =
            [ScalarValue::Float(0.0), ScalarValue::Float(-0.0)].into_iter().collect();
        assert_eq!(set.len(), 1);
        assert_eq!(ScalarValue::Float(0.0), ScalarValue::Float(-0.0));
    }

    #[test]
    fn test_json_hash_agrees_with_equality() {
        let zero = ScalarValue::Json(serde_json::json!({"a": 0.0, "b": [1, "x"]}));
        let negative = ScalarValue::Json(serde_json::json!({"b": [1, "x"], "a": -0.0}));
        assert_eq!(zero, negative);

        let set: IndexSet<ScalarValue> = [zero, negative].into_iter().collect();
        assert_eq!(set.len(), 1);

        assert_ne!(
            ScalarValue::Json(serde_json::json!(1)),
            ScalarValue::Json(serde_json::json!(1.0))
        );
    }

    #[test]
    fn test_shift_days() {
        let d = ScalarValue::Date(date(2020, 1, 31));
        assert_eq!(d.clone().shift_days(1), Some(ScalarValue::Date(date(2020, 2, 1))));
        assert_eq!(d.shift_days(-31), Some(ScalarValue::Date(date(2019, 12, 31))));

        let ts = Utc.with_ymd_and_hms(2020, 3, 1, 12, 30, 0).unwrap();
        assert_eq!(
            ScalarValue::Timestamp(ts).shift_days(-1),
            Some(ScalarValue::Timestamp(Utc.with_ymd_and_hms(2020, 2, 29, 12, 30, 0).unwrap()))
        );

        assert_eq!(ScalarValue::Int(5).shift_days(1), Some(ScalarValue::Int(5)));
        assert_eq!(ScalarValue::Date(NaiveDate::MAX).shift_days(1), None);
    }

    #[test]
    fn test_common_kind() {
        assert_eq!(common_kind(&[1.into(), 2.into()]), Some(ValueKind::Int));
        assert_eq!(common_kind(&[1.into(), "a".into()]), None);
        assert_eq!(common_kind(&[]), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(ScalarValue::from("a").to_string(), "\"a\"");
        assert_eq!(ScalarValue::Date(date(2020, 1, 2)).to_string(), "2020-01-02");
        assert_eq!(ScalarValue::from(vec![1, 2]).to_string(), "[1, 2]");
    }
}
