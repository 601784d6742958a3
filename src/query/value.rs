//! Typed filter literals.
//!
//! [`FilterValue`] is the closed set of literal shapes a filter may carry.
//! Operator/value mismatches are rejected when a
//! [`FilterSpec`](super::filter::FilterSpec) is constructed rather than when
//! the predicate is built.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum FilterValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Timestamp(DateTime<Utc>),
    Date(NaiveDate),
    Uuid(Uuid),
    List(Vec<FilterValue>),
}

impl FilterValue {
    /// Short kind name used in error messages
    pub fn kind(&self) -> &'static str {
        match self {
            FilterValue::Text(_) => "text",
            FilterValue::Integer(_) => "integer",
            FilterValue::Float(_) => "float",
            FilterValue::Boolean(_) => "boolean",
            FilterValue::Timestamp(_) => "timestamp",
            FilterValue::Date(_) => "date",
            FilterValue::Uuid(_) => "uuid",
            FilterValue::List(_) => "list",
        }
    }

    /// Whether the value can take part in an ordering comparison
    pub fn is_orderable(&self) -> bool {
        matches!(
            self,
            FilterValue::Text(_)
                | FilterValue::Integer(_)
                | FilterValue::Float(_)
                | FilterValue::Timestamp(_)
                | FilterValue::Date(_)
        )
    }

    pub fn is_list(&self) -> bool {
        matches!(self, FilterValue::List(_))
    }

    pub fn as_list(&self) -> Option<&[FilterValue]> {
        match self {
            FilterValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FilterValue::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Compare two values with SQL semantics: numbers compare across
    /// integer/float, every other kind only against itself.
    pub fn compare(&self, other: &FilterValue) -> Option<Ordering> {
        match (self, other) {
            (FilterValue::Integer(a), FilterValue::Integer(b)) => Some(a.cmp(b)),
            (FilterValue::Integer(a), FilterValue::Float(b)) => (*a as f64).partial_cmp(b),
            (FilterValue::Float(a), FilterValue::Integer(b)) => a.partial_cmp(&(*b as f64)),
            (FilterValue::Float(a), FilterValue::Float(b)) => a.partial_cmp(b),
            (FilterValue::Text(a), FilterValue::Text(b)) => Some(a.cmp(b)),
            (FilterValue::Boolean(a), FilterValue::Boolean(b)) => Some(a.cmp(b)),
            (FilterValue::Timestamp(a), FilterValue::Timestamp(b)) => Some(a.cmp(b)),
            (FilterValue::Date(a), FilterValue::Date(b)) => Some(a.cmp(b)),
            (FilterValue::Uuid(a), FilterValue::Uuid(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    /// Whether `self` and `other` can be compared with [`FilterValue::compare`]
    pub fn is_comparable_with(&self, other: &FilterValue) -> bool {
        self.compare(other).is_some()
    }
}

impl fmt::Display for FilterValue {
    /// Text rendering used when a column is cast to text
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterValue::Text(value) => f.write_str(value),
            FilterValue::Integer(value) => write!(f, "{value}"),
            FilterValue::Float(value) => write!(f, "{value}"),
            FilterValue::Boolean(value) => write!(f, "{value}"),
            FilterValue::Timestamp(value) => write!(f, "{}", value.to_rfc3339()),
            FilterValue::Date(value) => write!(f, "{value}"),
            FilterValue::Uuid(value) => write!(f, "{value}"),
            FilterValue::List(items) => {
                let rendered: Vec<String> = items.iter().map(ToString::to_string).collect();
                write!(f, "{{{}}}", rendered.join(","))
            }
        }
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        FilterValue::Text(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        FilterValue::Text(value)
    }
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        FilterValue::Integer(value)
    }
}

impl From<i32> for FilterValue {
    fn from(value: i32) -> Self {
        FilterValue::Integer(i64::from(value))
    }
}

impl From<u32> for FilterValue {
    fn from(value: u32) -> Self {
        FilterValue::Integer(i64::from(value))
    }
}

impl From<f64> for FilterValue {
    fn from(value: f64) -> Self {
        FilterValue::Float(value)
    }
}

impl From<bool> for FilterValue {
    fn from(value: bool) -> Self {
        FilterValue::Boolean(value)
    }
}

impl From<DateTime<Utc>> for FilterValue {
    fn from(value: DateTime<Utc>) -> Self {
        FilterValue::Timestamp(value)
    }
}

impl From<NaiveDate> for FilterValue {
    fn from(value: NaiveDate) -> Self {
        FilterValue::Date(value)
    }
}

impl From<Uuid> for FilterValue {
    fn from(value: Uuid) -> Self {
        FilterValue::Uuid(value)
    }
}

impl<T: Into<FilterValue>> From<Vec<T>> for FilterValue {
    fn from(values: Vec<T>) -> Self {
        FilterValue::List(values.into_iter().map(Into::into).collect())
    }
}
