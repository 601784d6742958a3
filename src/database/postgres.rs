use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::PgPool;

use crate::error::Result;
use crate::query::{ExecutionContext, SelectQuery};

/// Runs compiled queries on a PostgreSQL pool
#[derive(Debug, Clone)]
pub struct PgExecutionContext {
    pool: PgPool,
}

impl PgExecutionContext {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl ExecutionContext for PgExecutionContext {
    type Row = PgRow;

    async fn fetch_rows(&self, query: &SelectQuery) -> Result<Vec<PgRow>> {
        let mut builder = query.to_query_builder();
        let rows = builder.build().fetch_all(&self.pool).await?;
        Ok(rows)
    }

    async fn fetch_count(&self, query: &SelectQuery) -> Result<i64> {
        let mut builder = query.to_query_builder();
        let count = builder
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn probe(&self, query: &SelectQuery) -> Result<bool> {
        let mut builder = query.to_query_builder();
        let row = builder.build().fetch_optional(&self.pool).await?;
        Ok(row.is_some())
    }
}
