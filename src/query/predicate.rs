//! # Predicate Builder
//!
//! Turns one [`FilterSpec`] into one [`Condition`] over its resolved column.
//! Operators are dispatched through [`OPERATOR_TABLE`], so adding an
//! operator is one variant plus one table row.
//!
//! ## Combination policy
//!
//! [`PredicateBuilder::build_all`] builds every filter independently. A filter
//! whose literal does not fit the resolved column
//! ([`QueryError::InvalidFilter`]) is skipped with a warning and recorded as a
//! [`SkippedFilter`]; the remaining conditions are still AND-combined. Path
//! resolution and operator errors abort the whole call.

use tracing::warn;

use super::conditions::{Comparison, Condition};
use super::filter::{FilterOperator, FilterSpec};
use super::path::{JoinGraph, PathResolver, ResolvedAttribute};
use super::value::FilterValue;
use crate::error::{QueryError, Result};

type BuildFn = fn(&ResolvedAttribute, &FilterSpec) -> Result<Condition>;

/// Operator to builder dispatch table
pub const OPERATOR_TABLE: [(FilterOperator, BuildFn); 14] = [
    (FilterOperator::Eq, build_eq),
    (FilterOperator::Ne, build_ne),
    (FilterOperator::Gt, build_gt),
    (FilterOperator::Gte, build_gte),
    (FilterOperator::Lt, build_lt),
    (FilterOperator::Lte, build_lte),
    (FilterOperator::Between, build_between),
    (FilterOperator::NotBetween, build_not_between),
    (FilterOperator::Like, build_like),
    (FilterOperator::NotLike, build_not_like),
    (FilterOperator::In, build_in),
    (FilterOperator::NotIn, build_not_in),
    (FilterOperator::IsNull, build_is_null),
    (FilterOperator::IsNotNull, build_is_not_null),
];

/// A filter dropped from the AND-combination, with the reason
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedFilter {
    pub filter: FilterSpec,
    pub reason: String,
}

/// Conditions that survived building plus the filters that were skipped
#[derive(Debug, Clone, Default)]
pub struct BuiltPredicates {
    pub conditions: Vec<Condition>,
    pub skipped: Vec<SkippedFilter>,
}

pub struct PredicateBuilder;

impl PredicateBuilder {
    fn lookup(operator: FilterOperator) -> Result<BuildFn> {
        OPERATOR_TABLE
            .iter()
            .find(|(candidate, _)| *candidate == operator)
            .map(|(_, build)| *build)
            .ok_or_else(|| QueryError::InvalidOperator(operator.to_string()))
    }

    /// Build one condition, adding the joins its path needs to `graph`.
    ///
    /// Joins are committed only when the condition builds, so a rejected
    /// filter leaves no join behind.
    pub fn build(graph: &mut JoinGraph, filter: &FilterSpec) -> Result<Condition> {
        let build = Self::lookup(filter.operator())?;
        let mut staged = graph.clone();
        let attribute = PathResolver::resolve_filter_attribute(&mut staged, filter.field())?;
        let condition = build(&attribute, filter)?;
        *graph = staged;
        Ok(condition)
    }

    /// Build every filter, skipping the ones that do not fit their column
    pub fn build_all(graph: &mut JoinGraph, filters: &[FilterSpec]) -> Result<BuiltPredicates> {
        let mut built = BuiltPredicates::default();

        for filter in filters {
            match Self::build(graph, filter) {
                Ok(condition) => built.conditions.push(condition),
                Err(error) if error.is_recoverable_filter_error() => {
                    warn!(
                        entity = graph.root().name,
                        field = filter.field(),
                        operator = %filter.operator(),
                        error = %error,
                        "Skipping invalid filter"
                    );
                    built.skipped.push(SkippedFilter {
                        filter: filter.clone(),
                        reason: error.to_string(),
                    });
                }
                Err(error) => return Err(error),
            }
        }

        Ok(built)
    }
}

fn required_value<'a>(filter: &'a FilterSpec) -> Result<&'a FilterValue> {
    filter
        .value()
        .ok_or_else(|| QueryError::invalid_filter(filter.field(), "missing value"))
}

fn required_upper<'a>(filter: &'a FilterSpec) -> Result<&'a FilterValue> {
    filter
        .value_to()
        .ok_or_else(|| QueryError::invalid_filter(filter.field(), "missing upper bound"))
}

fn ensure_accepts(
    attribute: &ResolvedAttribute,
    filter: &FilterSpec,
    value: &FilterValue,
) -> Result<()> {
    if attribute.ty.accepts(value) {
        Ok(())
    } else {
        Err(QueryError::invalid_filter(
            filter.field(),
            format!(
                "{} value is not comparable to {} column {}",
                value.kind(),
                attribute.ty,
                attribute.column
            ),
        ))
    }
}

fn ensure_orderable(attribute: &ResolvedAttribute, filter: &FilterSpec) -> Result<()> {
    if attribute.ty.is_orderable() {
        Ok(())
    } else {
        Err(QueryError::invalid_filter(
            filter.field(),
            format!(
                "{} does not apply to {} column {}",
                filter.operator(),
                attribute.ty,
                attribute.column
            ),
        ))
    }
}

fn compare(attribute: &ResolvedAttribute, filter: &FilterSpec, op: Comparison) -> Result<Condition> {
    let value = required_value(filter)?;
    if !matches!(op, Comparison::Eq | Comparison::Ne) {
        ensure_orderable(attribute, filter)?;
    }
    ensure_accepts(attribute, filter, value)?;
    Ok(Condition::Compare {
        column: attribute.column.clone(),
        op,
        value: value.clone(),
    })
}

fn build_eq(attribute: &ResolvedAttribute, filter: &FilterSpec) -> Result<Condition> {
    compare(attribute, filter, Comparison::Eq)
}

fn build_ne(attribute: &ResolvedAttribute, filter: &FilterSpec) -> Result<Condition> {
    compare(attribute, filter, Comparison::Ne)
}

fn build_gt(attribute: &ResolvedAttribute, filter: &FilterSpec) -> Result<Condition> {
    compare(attribute, filter, Comparison::Gt)
}

fn build_gte(attribute: &ResolvedAttribute, filter: &FilterSpec) -> Result<Condition> {
    compare(attribute, filter, Comparison::Gte)
}

fn build_lt(attribute: &ResolvedAttribute, filter: &FilterSpec) -> Result<Condition> {
    compare(attribute, filter, Comparison::Lt)
}

fn build_lte(attribute: &ResolvedAttribute, filter: &FilterSpec) -> Result<Condition> {
    compare(attribute, filter, Comparison::Lte)
}

fn build_between(attribute: &ResolvedAttribute, filter: &FilterSpec) -> Result<Condition> {
    let low = required_value(filter)?;
    let high = required_upper(filter)?;
    ensure_orderable(attribute, filter)?;
    ensure_accepts(attribute, filter, low)?;
    ensure_accepts(attribute, filter, high)?;
    Ok(Condition::Between {
        column: attribute.column.clone(),
        low: low.clone(),
        high: high.clone(),
    })
}

fn build_not_between(attribute: &ResolvedAttribute, filter: &FilterSpec) -> Result<Condition> {
    build_between(attribute, filter).map(Condition::negate)
}

fn build_like(attribute: &ResolvedAttribute, filter: &FilterSpec) -> Result<Condition> {
    let value = required_value(filter)?;
    let text = value.as_text().ok_or_else(|| {
        QueryError::invalid_filter(
            filter.field(),
            format!("{} requires text, got {}", filter.operator(), value.kind()),
        )
    })?;
    Ok(Condition::Like {
        column: attribute.column.clone(),
        pattern: format!("%{text}%"),
    })
}

fn build_not_like(attribute: &ResolvedAttribute, filter: &FilterSpec) -> Result<Condition> {
    build_like(attribute, filter).map(Condition::negate)
}

fn build_in(attribute: &ResolvedAttribute, filter: &FilterSpec) -> Result<Condition> {
    let value = required_value(filter)?;
    let items = value.as_list().ok_or_else(|| {
        QueryError::invalid_filter(
            filter.field(),
            format!("{} requires a list, got {}", filter.operator(), value.kind()),
        )
    })?;
    for item in items {
        ensure_accepts(attribute, filter, item)?;
    }
    Ok(Condition::In {
        column: attribute.column.clone(),
        values: items.to_vec(),
    })
}

fn build_not_in(attribute: &ResolvedAttribute, filter: &FilterSpec) -> Result<Condition> {
    build_in(attribute, filter).map(Condition::negate)
}

fn build_is_null(attribute: &ResolvedAttribute, _filter: &FilterSpec) -> Result<Condition> {
    Ok(Condition::IsNull {
        column: attribute.column.clone(),
    })
}

fn build_is_not_null(attribute: &ResolvedAttribute, _filter: &FilterSpec) -> Result<Condition> {
    Ok(Condition::IsNotNull {
        column: attribute.column.clone(),
    })
}
