//! Filter predicate descriptors.
//!
//! A [`FilterSpec`] pairs a dotted field path with an operator and typed
//! literal(s). Shape invariants are checked at construction:
//!
//! - `value_to` is present iff the operator is `BETWEEN` or `NOT_BETWEEN`
//! - `value` is absent only for `IS_NULL` / `IS_NOT_NULL`
//! - ordering operators need orderable literals, `IN` needs a list,
//!   `LIKE` needs text
//!
//! This is stricter than validating while the predicate is built: a
//! malformed descriptor never exists. What construction cannot know is the
//! type of the column the path resolves to; that check happens in the
//! predicate builder.
//!
//! String-typed input (operator names and tagged JSON values, as received
//! from request parameters) goes through [`RawFilterSpec`], which maps the
//! operator name and then applies the same validation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::value::FilterValue;
use crate::error::{QueryError, Result};

/// Closed set of filter operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FilterOperator {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    Between,
    NotBetween,
    Like,
    NotLike,
    In,
    NotIn,
    IsNull,
    IsNotNull,
}

impl FilterOperator {
    pub const ALL: [FilterOperator; 14] = [
        FilterOperator::Eq,
        FilterOperator::Ne,
        FilterOperator::Gt,
        FilterOperator::Gte,
        FilterOperator::Lt,
        FilterOperator::Lte,
        FilterOperator::Between,
        FilterOperator::NotBetween,
        FilterOperator::Like,
        FilterOperator::NotLike,
        FilterOperator::In,
        FilterOperator::NotIn,
        FilterOperator::IsNull,
        FilterOperator::IsNotNull,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FilterOperator::Eq => "EQ",
            FilterOperator::Ne => "NE",
            FilterOperator::Gt => "GT",
            FilterOperator::Gte => "GTE",
            FilterOperator::Lt => "LT",
            FilterOperator::Lte => "LTE",
            FilterOperator::Between => "BETWEEN",
            FilterOperator::NotBetween => "NOT_BETWEEN",
            FilterOperator::Like => "LIKE",
            FilterOperator::NotLike => "NOT_LIKE",
            FilterOperator::In => "IN",
            FilterOperator::NotIn => "NOT_IN",
            FilterOperator::IsNull => "IS_NULL",
            FilterOperator::IsNotNull => "IS_NOT_NULL",
        }
    }

    /// Operators comparing by order (`<`, `<=`, `>`, `>=`, ranges)
    pub fn is_ordering(self) -> bool {
        matches!(
            self,
            FilterOperator::Gt
                | FilterOperator::Gte
                | FilterOperator::Lt
                | FilterOperator::Lte
                | FilterOperator::Between
                | FilterOperator::NotBetween
        )
    }

    pub fn is_range(self) -> bool {
        matches!(self, FilterOperator::Between | FilterOperator::NotBetween)
    }

    pub fn is_membership(self) -> bool {
        matches!(self, FilterOperator::In | FilterOperator::NotIn)
    }

    pub fn is_pattern(self) -> bool {
        matches!(self, FilterOperator::Like | FilterOperator::NotLike)
    }

    pub fn is_nullity(self) -> bool {
        matches!(self, FilterOperator::IsNull | FilterOperator::IsNotNull)
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterOperator {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_uppercase();
        FilterOperator::ALL
            .into_iter()
            .find(|op| op.as_str() == normalized)
            .ok_or_else(|| QueryError::InvalidOperator(s.to_string()))
    }
}

/// One validated filter predicate descriptor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawFilterSpec", into = "RawFilterSpec")]
pub struct FilterSpec {
    field: String,
    operator: FilterOperator,
    value: Option<FilterValue>,
    value_to: Option<FilterValue>,
}

impl FilterSpec {
    /// Validate and assemble a filter descriptor
    pub fn new(
        field: impl Into<String>,
        operator: FilterOperator,
        value: Option<FilterValue>,
        value_to: Option<FilterValue>,
    ) -> Result<Self> {
        let field = field.into();
        validate_field_path(&field)?;

        if operator.is_nullity() {
            return Ok(Self {
                field,
                operator,
                value: None,
                value_to: None,
            });
        }

        let Some(value) = value else {
            return Err(QueryError::invalid_filter(
                &field,
                format!("{operator} requires a value"),
            ));
        };

        if operator.is_range() != value_to.is_some() {
            let reason = if operator.is_range() {
                format!("{operator} requires an upper bound")
            } else {
                format!("{operator} does not take an upper bound")
            };
            return Err(QueryError::invalid_filter(&field, reason));
        }

        if operator.is_membership() {
            let Some(items) = value.as_list() else {
                return Err(QueryError::invalid_filter(
                    &field,
                    format!("{operator} requires a list, got {}", value.kind()),
                ));
            };
            if items.iter().any(FilterValue::is_list) {
                return Err(QueryError::invalid_filter(
                    &field,
                    "nested lists are not supported",
                ));
            }
        } else if value.is_list() {
            return Err(QueryError::invalid_filter(
                &field,
                format!("{operator} does not accept a list"),
            ));
        }

        if operator.is_pattern() && value.as_text().is_none() {
            return Err(QueryError::invalid_filter(
                &field,
                format!("{operator} requires text, got {}", value.kind()),
            ));
        }

        if operator.is_ordering() {
            for bound in std::iter::once(&value).chain(value_to.iter()) {
                if !bound.is_orderable() {
                    return Err(QueryError::invalid_filter(
                        &field,
                        format!("{operator} requires an orderable value, got {}", bound.kind()),
                    ));
                }
            }
            if let Some(upper) = &value_to {
                if !value.is_comparable_with(upper) {
                    return Err(QueryError::invalid_filter(
                        &field,
                        format!(
                            "{operator} bounds are not comparable ({} and {})",
                            value.kind(),
                            upper.kind()
                        ),
                    ));
                }
            }
        }

        Ok(Self {
            field,
            operator,
            value: Some(value),
            value_to,
        })
    }

    fn single(
        field: impl Into<String>,
        operator: FilterOperator,
        value: impl Into<FilterValue>,
    ) -> Result<Self> {
        Self::new(field, operator, Some(value.into()), None)
    }

    pub fn eq(field: impl Into<String>, value: impl Into<FilterValue>) -> Result<Self> {
        Self::single(field, FilterOperator::Eq, value)
    }

    pub fn ne(field: impl Into<String>, value: impl Into<FilterValue>) -> Result<Self> {
        Self::single(field, FilterOperator::Ne, value)
    }

    pub fn gt(field: impl Into<String>, value: impl Into<FilterValue>) -> Result<Self> {
        Self::single(field, FilterOperator::Gt, value)
    }

    pub fn gte(field: impl Into<String>, value: impl Into<FilterValue>) -> Result<Self> {
        Self::single(field, FilterOperator::Gte, value)
    }

    pub fn lt(field: impl Into<String>, value: impl Into<FilterValue>) -> Result<Self> {
        Self::single(field, FilterOperator::Lt, value)
    }

    pub fn lte(field: impl Into<String>, value: impl Into<FilterValue>) -> Result<Self> {
        Self::single(field, FilterOperator::Lte, value)
    }

    pub fn between(
        field: impl Into<String>,
        low: impl Into<FilterValue>,
        high: impl Into<FilterValue>,
    ) -> Result<Self> {
        Self::new(
            field,
            FilterOperator::Between,
            Some(low.into()),
            Some(high.into()),
        )
    }

    pub fn not_between(
        field: impl Into<String>,
        low: impl Into<FilterValue>,
        high: impl Into<FilterValue>,
    ) -> Result<Self> {
        Self::new(
            field,
            FilterOperator::NotBetween,
            Some(low.into()),
            Some(high.into()),
        )
    }

    /// Substring match; the value is wrapped as `%value%`
    pub fn like(field: impl Into<String>, value: impl Into<String>) -> Result<Self> {
        Self::single(field, FilterOperator::Like, FilterValue::Text(value.into()))
    }

    pub fn not_like(field: impl Into<String>, value: impl Into<String>) -> Result<Self> {
        Self::single(field, FilterOperator::NotLike, FilterValue::Text(value.into()))
    }

    pub fn is_in<T: Into<FilterValue>>(
        field: impl Into<String>,
        values: impl IntoIterator<Item = T>,
    ) -> Result<Self> {
        let list = FilterValue::List(values.into_iter().map(Into::into).collect());
        Self::new(field, FilterOperator::In, Some(list), None)
    }

    pub fn not_in<T: Into<FilterValue>>(
        field: impl Into<String>,
        values: impl IntoIterator<Item = T>,
    ) -> Result<Self> {
        let list = FilterValue::List(values.into_iter().map(Into::into).collect());
        Self::new(field, FilterOperator::NotIn, Some(list), None)
    }

    pub fn is_null(field: impl Into<String>) -> Result<Self> {
        Self::new(field, FilterOperator::IsNull, None, None)
    }

    pub fn is_not_null(field: impl Into<String>) -> Result<Self> {
        Self::new(field, FilterOperator::IsNotNull, None, None)
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn operator(&self) -> FilterOperator {
        self.operator
    }

    pub fn value(&self) -> Option<&FilterValue> {
        self.value.as_ref()
    }

    pub fn value_to(&self) -> Option<&FilterValue> {
        self.value_to.as_ref()
    }
}

/// Dotted paths must be non-empty with no empty segments
pub(crate) fn validate_field_path(field: &str) -> Result<()> {
    if field.is_empty() || field.split('.').any(|segment| segment.trim().is_empty()) {
        return Err(QueryError::invalid_filter(
            field,
            "field path must be a non-empty dotted path",
        ));
    }
    Ok(())
}

/// Loosely typed filter input with a string operator name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawFilterSpec {
    pub field: String,
    pub operator: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<FilterValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_to: Option<FilterValue>,
}

impl TryFrom<RawFilterSpec> for FilterSpec {
    type Error = QueryError;

    fn try_from(raw: RawFilterSpec) -> Result<Self> {
        let operator = raw.operator.parse::<FilterOperator>()?;
        FilterSpec::new(raw.field, operator, raw.value, raw.value_to)
    }
}

impl From<FilterSpec> for RawFilterSpec {
    fn from(spec: FilterSpec) -> Self {
        RawFilterSpec {
            field: spec.field,
            operator: spec.operator.as_str().to_string(),
            value: spec.value,
            value_to: spec.value_to,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_parsing_is_case_insensitive() {
        assert_eq!("eq".parse::<FilterOperator>().unwrap(), FilterOperator::Eq);
        assert_eq!(
            " not_between ".parse::<FilterOperator>().unwrap(),
            FilterOperator::NotBetween
        );
        assert!(matches!(
            "CONTAINS".parse::<FilterOperator>(),
            Err(QueryError::InvalidOperator(op)) if op == "CONTAINS"
        ));
    }

    #[test]
    fn test_operator_names_round_trip() {
        for op in FilterOperator::ALL {
            assert_eq!(op.to_string().parse::<FilterOperator>().unwrap(), op);
        }
    }

    #[test]
    fn test_value_to_only_for_ranges() {
        assert!(FilterSpec::new(
            "id",
            FilterOperator::Eq,
            Some(1.into()),
            Some(2.into())
        )
        .is_err());
        assert!(FilterSpec::new("id", FilterOperator::Between, Some(1.into()), None).is_err());
        assert!(FilterSpec::between("id", 1, 2).is_ok());
    }

    #[test]
    fn test_value_required_except_for_nullity() {
        assert!(FilterSpec::new("id", FilterOperator::Eq, None, None).is_err());
        let spec = FilterSpec::new(
            "id",
            FilterOperator::IsNull,
            Some(1.into()),
            Some(2.into()),
        )
        .unwrap();
        assert!(spec.value().is_none());
        assert!(spec.value_to().is_none());
    }

    // Construction rejects these up front; the predicate builder never sees them.
    #[test]
    fn test_non_orderable_values_rejected_at_construction() {
        let err = FilterSpec::gt("closed", true).unwrap_err();
        assert!(err.is_recoverable_filter_error());
        assert!(FilterSpec::between("id", 1, "z").is_err());
        assert!(FilterSpec::lte("id", vec![1, 2]).is_err());
    }

    #[test]
    fn test_membership_requires_list() {
        assert!(FilterSpec::new("id", FilterOperator::In, Some(5.into()), None).is_err());
        assert!(FilterSpec::is_in("id", [1, 2, 3]).is_ok());
        let nested = FilterValue::List(vec![FilterValue::from(vec![1])]);
        assert!(FilterSpec::new("id", FilterOperator::NotIn, Some(nested), None).is_err());
        assert!(FilterSpec::eq("id", vec![1, 2]).is_err());
    }

    #[test]
    fn test_like_requires_text() {
        assert!(FilterSpec::new("content", FilterOperator::Like, Some(5.into()), None).is_err());
        assert!(FilterSpec::like("content", "rust").is_ok());
    }

    #[test]
    fn test_malformed_paths_rejected() {
        assert!(FilterSpec::eq("", 1).is_err());
        assert!(FilterSpec::eq("discussion..id", 1).is_err());
        assert!(FilterSpec::eq("discussion.", 1).is_err());
    }

    #[test]
    fn test_raw_filter_conversion() {
        let raw: RawFilterSpec = serde_json::from_value(serde_json::json!({
            "field": "discussion.id",
            "operator": "eq",
            "value": {"type": "integer", "value": 10}
        }))
        .unwrap();
        let spec = FilterSpec::try_from(raw).unwrap();
        assert_eq!(spec.operator(), FilterOperator::Eq);
        assert_eq!(spec.value(), Some(&FilterValue::Integer(10)));

        let unknown = RawFilterSpec {
            field: "id".into(),
            operator: "CONTAINS".into(),
            value: Some(1.into()),
            value_to: None,
        };
        assert!(matches!(
            FilterSpec::try_from(unknown),
            Err(QueryError::InvalidOperator(_))
        ));
    }

    #[test]
    fn test_deserialization_validates() {
        let invalid = serde_json::json!({
            "field": "id",
            "operator": "GT",
            "value": {"type": "boolean", "value": true}
        });
        assert!(serde_json::from_value::<FilterSpec>(invalid).is_err());

        let valid = serde_json::json!({
            "field": "id",
            "operator": "BETWEEN",
            "value": {"type": "integer", "value": 1},
            "value_to": {"type": "integer", "value": 3}
        });
        let spec: FilterSpec = serde_json::from_value(valid).unwrap();
        assert_eq!(spec.value_to(), Some(&FilterValue::Integer(3)));
    }
}
