//! # In-Process Execution Context
//!
//! [`MemoryContext`] keeps tables of [`Record`]s and evaluates compiled
//! queries against them following PostgreSQL's rules:
//!
//! - joins are inner joins; a NULL key never matches
//! - conditions use three-valued logic and a row survives only on TRUE
//! - NULLs sort last ascending and first descending
//! - OFFSET then LIMIT, and `COUNT(col)` skips NULLs
//! - LIKE honors `%`, `_` and the `\` escape
//!
//! LIKE on a non-text column matches against the value's [`Display`] form,
//! which is not always PostgreSQL's `CAST(col AS TEXT)`: timestamps render
//! as RFC 3339 (`2024-01-01T00:00:00+00:00`) where PostgreSQL prints
//! `2024-01-01 00:00:00+00` in the session time zone. Integers, text,
//! booleans, dates and uuids agree.
//!
//! Fixtures and tests use it wherever a database is not available.
//!
//! [`Display`]: std::fmt::Display

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Number, Value};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use crate::error::{QueryError, Result};
use crate::models::{Comment, Discussion, Forum, Tag, User, Vote};
use crate::query::{
    ColumnRef, ExecutionContext, FilterValue, FromResultRow, SelectQuery, Selection, ROOT_ALIAS,
};
use crate::schema::{Entity, ScalarType};

fn decode_error(error: serde_json::Error) -> QueryError {
    QueryError::Store(sqlx::Error::Decode(Box::new(error)))
}

/// One in-process row; an absent column is NULL
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    columns: BTreeMap<String, FilterValue>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, column: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.set(column, value);
        self
    }

    /// Set `column`, or leave it NULL when `value` is `None`
    pub fn with_optional<V: Into<FilterValue>>(
        mut self,
        column: impl Into<String>,
        value: Option<V>,
    ) -> Self {
        match value {
            Some(value) => self.set(column, value),
            None => {
                self.columns.remove(&column.into());
            }
        }
        self
    }

    pub fn set(&mut self, column: impl Into<String>, value: impl Into<FilterValue>) {
        self.columns.insert(column.into(), value.into());
    }

    pub fn get(&self, column: &str) -> Option<&FilterValue> {
        self.columns.get(column)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Build a row from a model, typing each column by its entity metadata
    pub fn from_model<E: Entity + Serialize>(model: &E) -> Result<Self> {
        let entity = E::entity();
        let Value::Object(fields) = serde_json::to_value(model).map_err(decode_error)? else {
            return Err(QueryError::InvalidQuery(format!(
                "{} does not serialize to an object",
                entity.name
            )));
        };

        let mut record = Record::new();
        for (column, json) in fields {
            if json.is_null() {
                continue;
            }
            let ty = entity.column_type(&column).ok_or_else(|| {
                QueryError::InvalidQuery(format!("{} has no column '{column}'", entity.name))
            })?;
            record.set(column, typed_value(ty, json).map_err(decode_error)?);
        }
        Ok(record)
    }

    /// Plain JSON object of the row, NULL columns omitted
    pub fn to_json(&self) -> Value {
        let object: Map<String, Value> = self
            .columns
            .iter()
            .map(|(column, value)| (column.clone(), plain_json(value)))
            .collect();
        Value::Object(object)
    }

    /// Decode into any deserializable row type
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_value(self.to_json()).map_err(decode_error)
    }
}

fn typed_value(ty: ScalarType, json: Value) -> serde_json::Result<FilterValue> {
    Ok(match ty {
        ScalarType::Integer => FilterValue::Integer(serde_json::from_value(json)?),
        ScalarType::Float => FilterValue::Float(serde_json::from_value(json)?),
        ScalarType::Text => FilterValue::Text(serde_json::from_value(json)?),
        ScalarType::Boolean => FilterValue::Boolean(serde_json::from_value(json)?),
        ScalarType::Timestamp => FilterValue::Timestamp(serde_json::from_value(json)?),
        ScalarType::Date => FilterValue::Date(serde_json::from_value(json)?),
        ScalarType::Uuid => FilterValue::Uuid(serde_json::from_value(json)?),
    })
}

fn plain_json(value: &FilterValue) -> Value {
    match value {
        FilterValue::Text(v) => Value::String(v.clone()),
        FilterValue::Integer(v) => Value::Number((*v).into()),
        FilterValue::Float(v) => Number::from_f64(*v).map_or(Value::Null, Value::Number),
        FilterValue::Boolean(v) => Value::Bool(*v),
        FilterValue::Timestamp(v) => Value::String(v.to_rfc3339()),
        FilterValue::Date(v) => Value::String(v.format("%Y-%m-%d").to_string()),
        FilterValue::Uuid(v) => Value::String(v.to_string()),
        FilterValue::List(items) => Value::Array(items.iter().map(plain_json).collect()),
    }
}

impl FromResultRow<Record> for Record {
    fn from_result_row(row: &Record) -> Result<Self> {
        Ok(row.clone())
    }
}

macro_rules! decode_models_from_records {
    ($($model:ty),* $(,)?) => {
        $(
            impl FromResultRow<Record> for $model {
                fn from_result_row(row: &Record) -> Result<Self> {
                    row.decode()
                }
            }
        )*
    };
}

decode_models_from_records!(Comment, Discussion, Forum, Tag, User, Vote);

/// Rows of every table in scope for one candidate result, keyed by alias
#[derive(Debug, Clone)]
struct Binding<'a> {
    rows: Vec<(&'a str, &'a Record)>,
}

impl<'a> Binding<'a> {
    fn record(&self, alias: &str) -> Option<&'a Record> {
        self.rows
            .iter()
            .find(|(bound, _)| *bound == alias)
            .map(|(_, record)| *record)
    }

    fn value(&self, column: &ColumnRef) -> Option<&'a FilterValue> {
        self.record(&column.alias)?.get(column.column)
    }

    fn extended(&self, alias: &'a str, record: &'a Record) -> Self {
        let mut rows = self.rows.clone();
        rows.push((alias, record));
        Self { rows }
    }
}

fn compare_nullable(
    left: Option<&FilterValue>,
    right: Option<&FilterValue>,
    ascending: bool,
) -> Ordering {
    match (left, right) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) if ascending => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) if ascending => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(left), Some(right)) => {
            let ordering = left.compare(right).unwrap_or(Ordering::Equal);
            if ascending {
                ordering
            } else {
                ordering.reverse()
            }
        }
    }
}

/// Tables of records evaluated with SQL semantics
#[derive(Debug, Clone, Default)]
pub struct MemoryContext {
    tables: HashMap<String, Vec<Record>>,
}

impl MemoryContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, table: impl Into<String>, record: Record) {
        self.tables.entry(table.into()).or_default().push(record);
    }

    /// Insert a model into its entity's table
    pub fn insert_model<E: Entity + Serialize>(&mut self, model: &E) -> Result<()> {
        let record = Record::from_model(model)?;
        self.insert(E::entity().table, record);
        Ok(())
    }

    pub fn with_rows(
        mut self,
        table: impl Into<String>,
        rows: impl IntoIterator<Item = Record>,
    ) -> Self {
        self.tables.entry(table.into()).or_default().extend(rows);
        self
    }

    pub fn rows(&self, table: &str) -> &[Record] {
        self.tables.get(table).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Joined, filtered and sorted bindings, before the window is applied
    fn matching<'a>(&'a self, query: &'a SelectQuery) -> Vec<Binding<'a>> {
        let mut bindings: Vec<Binding<'a>> = self
            .rows(query.root.table)
            .iter()
            .map(|record| Binding {
                rows: vec![(ROOT_ALIAS, record)],
            })
            .collect();

        for join in &query.joins {
            let candidates = self.rows(join.table);
            bindings = bindings
                .iter()
                .flat_map(|binding| {
                    let parent = binding.value(&join.parent);
                    candidates
                        .iter()
                        .filter(move |candidate| {
                            match (parent, candidate.get(join.joined.column)) {
                                (Some(parent), Some(key)) => {
                                    parent.compare(key) == Some(Ordering::Equal)
                                }
                                _ => false,
                            }
                        })
                        .map(move |candidate| binding.extended(&join.alias, candidate))
                })
                .collect();
        }

        bindings.retain(|binding| {
            let lookup = |column: &ColumnRef| binding.value(column);
            query
                .conditions
                .iter()
                .all(|condition| condition.evaluate(&lookup) == Some(true))
        });

        if !query.order_by.is_empty() {
            bindings.sort_by(|left, right| {
                query
                    .order_by
                    .iter()
                    .map(|key| {
                        compare_nullable(
                            left.value(&key.column),
                            right.value(&key.column),
                            key.ascending,
                        )
                    })
                    .find(|ordering| *ordering != Ordering::Equal)
                    .unwrap_or(Ordering::Equal)
            });
        }

        bindings
    }

    fn windowed<'a>(&'a self, query: &'a SelectQuery) -> Vec<Binding<'a>> {
        let bindings = self.matching(query);
        match &query.pagination {
            Some(pagination) => pagination.apply(bindings),
            None => bindings,
        }
    }

    fn count_matches(query: &SelectQuery, bindings: &[Binding<'_>]) -> i64 {
        let counted = match &query.selection {
            Selection::CountColumn(column) => bindings
                .iter()
                .filter(|binding| binding.value(column).is_some())
                .count(),
            _ => bindings.len(),
        };
        i64::try_from(counted).unwrap_or(i64::MAX)
    }

    fn project(selection: &Selection, binding: &Binding<'_>) -> Record {
        match selection {
            Selection::Entity { alias, .. } => binding.record(alias).cloned().unwrap_or_default(),
            Selection::Column(column) => {
                Record::new().with_optional(column.column, binding.value(column).cloned())
            }
            Selection::CountRows | Selection::CountColumn(_) | Selection::Literal => Record::new(),
        }
    }
}

#[async_trait]
impl ExecutionContext for MemoryContext {
    type Row = Record;

    async fn fetch_rows(&self, query: &SelectQuery) -> Result<Vec<Record>> {
        if query.selection.is_count() {
            let count = Self::count_matches(query, &self.matching(query));
            return Ok(vec![Record::new().with("count", count)]);
        }

        Ok(self
            .windowed(query)
            .iter()
            .map(|binding| Self::project(&query.selection, binding))
            .collect())
    }

    async fn fetch_count(&self, query: &SelectQuery) -> Result<i64> {
        Ok(Self::count_matches(query, &self.matching(query)))
    }

    async fn probe(&self, query: &SelectQuery) -> Result<bool> {
        Ok(!self.windowed(query).is_empty())
    }
}
