//! Compiled WHERE-clause conditions.
//!
//! A [`Condition`] references resolved columns and carries typed literals.
//! It renders to PostgreSQL with every literal bound as a parameter, and it
//! can be evaluated directly against in-memory rows with SQL's three-valued
//! logic (`None` stands for UNKNOWN).

use sqlx::{Postgres, QueryBuilder};
use std::cmp::Ordering;

use super::joins::ColumnRef;
use super::value::FilterValue;

/// Binary comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl Comparison {
    pub fn as_sql(self) -> &'static str {
        match self {
            Comparison::Eq => "=",
            Comparison::Ne => "<>",
            Comparison::Gt => ">",
            Comparison::Gte => ">=",
            Comparison::Lt => "<",
            Comparison::Lte => "<=",
        }
    }

    fn holds(self, ordering: Ordering) -> bool {
        match self {
            Comparison::Eq => ordering == Ordering::Equal,
            Comparison::Ne => ordering != Ordering::Equal,
            Comparison::Gt => ordering == Ordering::Greater,
            Comparison::Gte => ordering != Ordering::Less,
            Comparison::Lt => ordering == Ordering::Less,
            Comparison::Lte => ordering != Ordering::Greater,
        }
    }
}

/// Represents one compiled boolean condition
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Compare {
        column: ColumnRef,
        op: Comparison,
        value: FilterValue,
    },
    /// Inclusive range
    Between {
        column: ColumnRef,
        low: FilterValue,
        high: FilterValue,
    },
    /// Column cast to text, matched against a LIKE pattern
    Like {
        column: ColumnRef,
        pattern: String,
    },
    In {
        column: ColumnRef,
        values: Vec<FilterValue>,
    },
    IsNull {
        column: ColumnRef,
    },
    IsNotNull {
        column: ColumnRef,
    },
    Not(Box<Condition>),
}

impl Condition {
    pub fn negate(self) -> Condition {
        Condition::Not(Box::new(self))
    }

    /// Append this condition to a statement, binding every literal
    pub fn push_sql(&self, query: &mut QueryBuilder<'static, Postgres>) {
        match self {
            Condition::Compare { column, op, value } => {
                query.push(format!("{column} {} ", op.as_sql()));
                push_value(query, value);
            }
            Condition::Between { column, low, high } => {
                query.push(format!("{column} BETWEEN "));
                push_value(query, low);
                query.push(" AND ");
                push_value(query, high);
            }
            Condition::Like { column, pattern } => {
                query.push(format!("CAST({column} AS TEXT) LIKE "));
                query.push_bind(pattern.clone());
            }
            Condition::In { column, values } => {
                if values.is_empty() {
                    query.push("FALSE");
                    return;
                }
                query.push(format!("{column} IN ("));
                push_list(query, values);
                query.push(")");
            }
            Condition::IsNull { column } => {
                query.push(format!("{column} IS NULL"));
            }
            Condition::IsNotNull { column } => {
                query.push(format!("{column} IS NOT NULL"));
            }
            Condition::Not(inner) => {
                query.push("NOT (");
                inner.push_sql(query);
                query.push(")");
            }
        }
    }

    /// Evaluate with three-valued logic; `None` is UNKNOWN
    pub fn evaluate<'a, F>(&self, lookup: &F) -> Option<bool>
    where
        F: Fn(&ColumnRef) -> Option<&'a FilterValue>,
    {
        match self {
            Condition::Compare { column, op, value } => {
                let actual = lookup(column)?;
                actual.compare(value).map(|ordering| op.holds(ordering))
            }
            Condition::Between { column, low, high } => {
                let actual = lookup(column)?;
                let above = actual.compare(low)? != Ordering::Less;
                let below = actual.compare(high)? != Ordering::Greater;
                Some(above && below)
            }
            Condition::Like { column, pattern } => {
                let actual = lookup(column)?;
                Some(like_matches(&actual.to_string(), pattern))
            }
            Condition::In { column, values } => {
                if values.is_empty() {
                    return Some(false);
                }
                let actual = lookup(column)?;
                let matched = values
                    .iter()
                    .any(|candidate| actual.compare(candidate) == Some(Ordering::Equal));
                Some(matched)
            }
            Condition::IsNull { column } => Some(lookup(column).is_none()),
            Condition::IsNotNull { column } => Some(lookup(column).is_some()),
            Condition::Not(inner) => inner.evaluate(lookup).map(|result| !result),
        }
    }
}

fn push_value(query: &mut QueryBuilder<'static, Postgres>, value: &FilterValue) {
    match value {
        FilterValue::Text(v) => {
            query.push_bind(v.clone());
        }
        FilterValue::Integer(v) => {
            query.push_bind(*v);
        }
        FilterValue::Float(v) => {
            query.push_bind(*v);
        }
        FilterValue::Boolean(v) => {
            query.push_bind(*v);
        }
        FilterValue::Timestamp(v) => {
            query.push_bind(*v);
        }
        FilterValue::Date(v) => {
            query.push_bind(*v);
        }
        FilterValue::Uuid(v) => {
            query.push_bind(*v);
        }
        FilterValue::List(items) => {
            query.push("(");
            push_list(query, items);
            query.push(")");
        }
    }
}

fn push_list(query: &mut QueryBuilder<'static, Postgres>, values: &[FilterValue]) {
    for (index, value) in values.iter().enumerate() {
        if index > 0 {
            query.push(", ");
        }
        push_value(query, value);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LikeToken {
    AnyRun,
    AnyOne,
    Literal(char),
}

fn like_tokens(pattern: &str) -> Vec<LikeToken> {
    let mut tokens = Vec::with_capacity(pattern.len());
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        tokens.push(match c {
            '%' => LikeToken::AnyRun,
            '_' => LikeToken::AnyOne,
            // a trailing escape stands for itself
            '\\' => LikeToken::Literal(chars.next().unwrap_or('\\')),
            other => LikeToken::Literal(other),
        });
    }
    tokens
}

/// SQL LIKE matching: `%` is any run of characters, `_` exactly one, and
/// `\` makes the next character literal
pub fn like_matches(text: &str, pattern: &str) -> bool {
    let text: Vec<char> = text.chars().collect();
    let pattern = like_tokens(pattern);

    let (mut t, mut p) = (0usize, 0usize);
    let mut backtrack: Option<(usize, usize)> = None;

    while t < text.len() {
        let step = match pattern.get(p) {
            Some(LikeToken::AnyOne) => true,
            Some(LikeToken::Literal(c)) => *c == text[t],
            _ => false,
        };
        if step {
            t += 1;
            p += 1;
        } else if pattern.get(p) == Some(&LikeToken::AnyRun) {
            backtrack = Some((p, t));
            p += 1;
        } else if let Some((star, matched)) = backtrack {
            p = star + 1;
            t = matched + 1;
            backtrack = Some((star, matched + 1));
        } else {
            return false;
        }
    }

    pattern[p..].iter().all(|token| *token == LikeToken::AnyRun)
}
