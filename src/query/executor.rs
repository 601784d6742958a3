//! # Query Executor
//!
//! Runs a [`QuerySpec`] against an [`ExecutionContext`]. Every operation
//! compiles the query spec afresh and performs exactly one round trip.
//!
//! | Operation | Selection | Order | Window |
//! |---|---|---|---|
//! | [`QueryExecutor::find`] | projection or root entity | yes | start index / max result |
//! | [`QueryExecutor::find_optional`] | projection or root entity | yes | start index / 1 |
//! | [`QueryExecutor::count`] | `COUNT(*)` or `COUNT(col)` | no | none |
//! | [`QueryExecutor::exists`] | `1` or projected column | no | 1 |

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::FromRow;
use std::time::Instant;
use tracing::{debug, warn};

use super::planner::{Planner, QueryMode};
use super::select::SelectQuery;
use super::spec::QuerySpec;
use crate::config::QueryConfig;
use crate::error::{QueryError, Result};
use crate::logging::{log_error, log_query_operation};

/// A backend able to run compiled queries
#[async_trait]
pub trait ExecutionContext: Send + Sync {
    type Row: Send;

    async fn fetch_rows(&self, query: &SelectQuery) -> Result<Vec<Self::Row>>;

    /// Run a query whose selection is a count
    async fn fetch_count(&self, query: &SelectQuery) -> Result<i64>;

    /// Whether the query yields at least one row
    async fn probe(&self, query: &SelectQuery) -> Result<bool>;
}

/// Decoding of one backend row into a result value
pub trait FromResultRow<R>: Sized {
    fn from_result_row(row: &R) -> Result<Self>;
}

impl<T> FromResultRow<PgRow> for T
where
    T: for<'r> FromRow<'r, PgRow>,
{
    fn from_result_row(row: &PgRow) -> Result<Self> {
        T::from_row(row).map_err(QueryError::from)
    }
}

pub struct QueryExecutor<C> {
    context: C,
    config: QueryConfig,
}

impl<C: ExecutionContext> QueryExecutor<C> {
    pub fn new(context: C) -> Self {
        Self::with_config(context, QueryConfig::default())
    }

    pub fn with_config(context: C, config: QueryConfig) -> Self {
        Self { context, config }
    }

    pub fn context(&self) -> &C {
        &self.context
    }

    pub fn config(&self) -> &QueryConfig {
        &self.config
    }

    pub fn plan_find<T>(&self, spec: &QuerySpec<T>) -> Result<SelectQuery> {
        Planner::plan(spec, QueryMode::Rows)
    }

    pub fn plan_count<T>(&self, spec: &QuerySpec<T>) -> Result<SelectQuery> {
        Planner::plan(spec, QueryMode::Count)
    }

    pub fn plan_exists<T>(&self, spec: &QuerySpec<T>) -> Result<SelectQuery> {
        Planner::plan(spec, QueryMode::Probe)
    }

    /// All rows matching the query spec, ordered and windowed
    pub async fn find<T>(&self, spec: &QuerySpec<T>) -> Result<Vec<T>>
    where
        T: FromResultRow<C::Row>,
    {
        let started = Instant::now();
        let result = async {
            let query = Planner::plan(spec, QueryMode::Rows)?;
            self.log_statement("find", &query);
            let rows = self.context.fetch_rows(&query).await?;
            rows.iter().map(T::from_result_row).collect::<Result<Vec<T>>>()
        }
        .await;

        let details = result.as_ref().ok().map(|rows| format!("rows={}", rows.len()));
        self.finish("find", spec, started, &result, details);
        result
    }

    /// The first matching row, if any
    pub async fn find_optional<T>(&self, spec: &QuerySpec<T>) -> Result<Option<T>>
    where
        T: FromResultRow<C::Row>,
    {
        let started = Instant::now();
        let result = async {
            let query = Planner::plan(spec, QueryMode::FirstRow)?;
            self.log_statement("find_optional", &query);
            let rows = self.context.fetch_rows(&query).await?;
            rows.first().map(T::from_result_row).transpose()
        }
        .await;

        let details = result
            .as_ref()
            .ok()
            .map(|row| format!("found={}", row.is_some()));
        self.finish("find_optional", spec, started, &result, details);
        result
    }

    /// Number of matching rows, ignoring order and pagination
    pub async fn count<T>(&self, spec: &QuerySpec<T>) -> Result<i64> {
        let started = Instant::now();
        let result = async {
            let query = Planner::plan(spec, QueryMode::Count)?;
            self.log_statement("count", &query);
            self.context.fetch_count(&query).await
        }
        .await;

        let details = result.as_ref().ok().map(|count| format!("count={count}"));
        self.finish("count", spec, started, &result, details);
        result
    }

    /// Whether at least one row matches
    pub async fn exists<T>(&self, spec: &QuerySpec<T>) -> Result<bool> {
        let started = Instant::now();
        let result = async {
            let query = Planner::plan(spec, QueryMode::Probe)?;
            self.log_statement("exists", &query);
            self.context.probe(&query).await
        }
        .await;

        let details = result.as_ref().ok().map(|found| format!("exists={found}"));
        self.finish("exists", spec, started, &result, details);
        result
    }

    fn log_statement(&self, operation: &str, query: &SelectQuery) {
        if self.config.log_statements {
            debug!(
                operation = operation,
                entity = query.root.name,
                sql = %query.to_sql(),
                skipped_filters = query.skipped_filters.len(),
                "Executing query"
            );
        }
    }

    fn finish<T, R>(
        &self,
        operation: &str,
        spec: &QuerySpec<T>,
        started: Instant,
        result: &Result<R>,
        details: Option<String>,
    ) {
        let elapsed = started.elapsed();
        let duration_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        let entity = spec.root().name;

        match result {
            Ok(_) => {
                if elapsed >= self.config.slow_query_threshold() {
                    warn!(
                        operation = operation,
                        entity = entity,
                        duration_ms = duration_ms,
                        threshold_ms = self.config.slow_query_threshold_ms,
                        "Slow query"
                    );
                }
                log_query_operation(operation, entity, "ok", Some(duration_ms), details.as_deref());
            }
            Err(error) => {
                log_query_operation(operation, entity, "error", Some(duration_ms), None);
                log_error("query_executor", operation, &error.to_string(), Some(entity));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{MemoryContext, Record};
    use crate::models::{Comment, COMMENT};
    use crate::query::FilterSpec;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Delegates to a memory context and counts round trips
    #[derive(Default)]
    struct CountingContext {
        inner: MemoryContext,
        calls: AtomicUsize,
    }

    impl CountingContext {
        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ExecutionContext for CountingContext {
        type Row = Record;

        async fn fetch_rows(&self, query: &SelectQuery) -> Result<Vec<Record>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.fetch_rows(query).await
        }

        async fn fetch_count(&self, query: &SelectQuery) -> Result<i64> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.fetch_count(query).await
        }

        async fn probe(&self, query: &SelectQuery) -> Result<bool> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.probe(query).await
        }
    }

    /// Fails every round trip with a pool timeout
    #[derive(Default)]
    struct UnavailableContext {
        calls: AtomicUsize,
    }

    impl UnavailableContext {
        fn fail<T>(&self) -> Result<T> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(QueryError::Store(sqlx::Error::PoolTimedOut))
        }
    }

    #[async_trait]
    impl ExecutionContext for UnavailableContext {
        type Row = Record;

        async fn fetch_rows(&self, _query: &SelectQuery) -> Result<Vec<Record>> {
            self.fail()
        }

        async fn fetch_count(&self, _query: &SelectQuery) -> Result<i64> {
            self.fail()
        }

        async fn probe(&self, _query: &SelectQuery) -> Result<bool> {
            self.fail()
        }
    }

    fn is_pool_timeout<T>(result: &Result<T>) -> bool {
        matches!(result, Err(QueryError::Store(sqlx::Error::PoolTimedOut)))
    }

    fn spec() -> QuerySpec<Comment> {
        QuerySpec::<Comment>::for_entity()
            .filter(FilterSpec::eq("create_by", "alice").unwrap())
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_each_operation_is_one_round_trip() {
        let executor = QueryExecutor::new(CountingContext::default());
        let spec = spec();

        executor.find(&spec).await.unwrap();
        assert_eq!(executor.context().calls(), 1);
        executor.find_optional(&spec).await.unwrap();
        assert_eq!(executor.context().calls(), 2);
        executor.count(&spec).await.unwrap();
        assert_eq!(executor.context().calls(), 3);
        executor.exists(&spec).await.unwrap();
        assert_eq!(executor.context().calls(), 4);
    }

    #[tokio::test]
    async fn test_store_errors_propagate_without_retry() {
        let executor = QueryExecutor::new(UnavailableContext::default());
        let spec = spec();

        assert!(is_pool_timeout(&executor.find(&spec).await));
        assert_eq!(executor.context().calls.load(Ordering::SeqCst), 1);
        assert!(is_pool_timeout(&executor.find_optional(&spec).await));
        assert_eq!(executor.context().calls.load(Ordering::SeqCst), 2);
        assert!(is_pool_timeout(&executor.count(&spec).await));
        assert_eq!(executor.context().calls.load(Ordering::SeqCst), 3);
        assert!(is_pool_timeout(&executor.exists(&spec).await));
        assert_eq!(executor.context().calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_resolution_failure_never_reaches_the_context() {
        let executor = QueryExecutor::new(CountingContext::default());
        let spec = QuerySpec::<Comment>::for_entity()
            .filter(FilterSpec::eq("author.name", "alice").unwrap())
            .build()
            .unwrap();

        assert!(matches!(
            executor.count(&spec).await,
            Err(QueryError::PathResolution { .. })
        ));
        assert_eq!(executor.context().calls(), 0);
    }

    #[tokio::test]
    async fn test_projection_rows_decode_as_records() {
        let context = MemoryContext::new().with_rows(
            COMMENT.table,
            [Record::new().with("id", 1).with("content", "hello")],
        );
        let executor = QueryExecutor::with_config(
            context,
            QueryConfig {
                log_statements: true,
                slow_query_threshold_ms: 0,
            },
        );
        let spec = QuerySpec::<Record>::builder(&COMMENT)
            .target_path("content")
            .build()
            .unwrap();

        let rows = executor.find(&spec).await.unwrap();
        assert_eq!(rows, vec![Record::new().with("content", "hello")]);
        assert!(executor.exists(&spec).await.unwrap());
    }

    #[test]
    fn test_plans_are_exposed() {
        let executor = QueryExecutor::new(MemoryContext::new());
        let spec = spec();
        assert!(executor.plan_find(&spec).unwrap().to_sql().starts_with("SELECT t0.*"));
        assert!(executor.plan_count(&spec).unwrap().to_sql().starts_with("SELECT COUNT(*)"));
        assert!(executor.plan_exists(&spec).unwrap().to_sql().starts_with("SELECT 1"));
    }
}
