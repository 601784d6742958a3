//! # Database Layer
//!
//! Execution contexts for compiled queries plus PostgreSQL pool wiring.
//!
//! - [`connection`] - pool construction from [`DatabaseConfig`](crate::config::DatabaseConfig)
//! - [`postgres`] - [`PgExecutionContext`], runs queries on a `PgPool`
//! - [`memory`] - [`MemoryContext`], evaluates queries over in-process records
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use forum_core::config::DatabaseConfig;
//! use forum_core::database::{DatabaseConnection, PgExecutionContext};
//! use forum_core::query::QueryExecutor;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let connection = DatabaseConnection::connect(&DatabaseConfig::default()).await?;
//! let executor = QueryExecutor::new(PgExecutionContext::new(connection.pool().clone()));
//! # Ok(())
//! # }
//! ```

pub mod connection;
pub mod memory;
pub mod postgres;

pub use connection::DatabaseConnection;
pub use memory::{MemoryContext, Record};
pub use postgres::PgExecutionContext;
