#![allow(clippy::doc_markdown)] // Allow technical terms like PostgreSQL, SQLx in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Forum Core Rust
//!
//! Dynamic query specification and execution engine for the forum backend.
//!
//! ## Overview
//!
//! Every service of the forum (forums, discussions, comments, tags, votes,
//! users) fetches data the same way: it describes the query as a value and
//! hands it to the engine, which compiles it into one SQL statement and
//! runs it in a single round trip.
//!
//! ## Module Organization
//!
//! - [`query`] - filter/order/query specs, path resolution, predicates, executor
//! - [`schema`] - entity and relation metadata the engine navigates
//! - [`models`] - forum row types and their metadata
//! - [`database`] - PostgreSQL and in-process execution contexts
//! - [`config`] - layered configuration
//! - [`error`] - structured error handling
//! - [`logging`] - structured logging setup
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use forum_core::config::ConfigManager;
//! use forum_core::database::{DatabaseConnection, PgExecutionContext};
//! use forum_core::models::Comment;
//! use forum_core::query::{FilterSpec, QueryExecutor, QuerySpec};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! forum_core::logging::init_structured_logging();
//! let manager = ConfigManager::load()?;
//! let connection = DatabaseConnection::connect(&manager.config().database).await?;
//! let executor = QueryExecutor::with_config(
//!     PgExecutionContext::new(connection.pool().clone()),
//!     manager.config().query.clone(),
//! );
//!
//! let spec = QuerySpec::<Comment>::for_entity()
//!     .filter(FilterSpec::eq("discussion.forum.id", 1)?)
//!     .order_desc("create_date")
//!     .paginate(1, 20)
//!     .build()?;
//! let page: Vec<Comment> = executor.find(&spec).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Testing
//!
//! ```bash
//! cargo test --lib                     # Unit tests
//! cargo test                           # Unit, integration and property tests
//! DATABASE_URL=... cargo test -- --ignored   # PostgreSQL integration tests
//! ```

pub mod config;
pub mod database;
pub mod error;
pub mod logging;
pub mod models;
pub mod query;
pub mod schema;

pub use config::{ConfigManager, DatabaseConfig, EngineConfig, QueryConfig};
pub use error::{QueryError, Result};
pub use query::{FilterOperator, FilterSpec, FilterValue, OrderSpec, QueryExecutor, QuerySpec};
pub use schema::{Entity, EntityDef};
