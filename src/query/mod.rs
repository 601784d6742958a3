//! # Dynamic Query Engine
//!
//! Callers describe what to fetch as an immutable [`QuerySpec`]; the engine
//! compiles it into a single [`SelectQuery`] and runs it on an
//! [`ExecutionContext`].
//!
//! ## Pipeline
//!
//! ```text
//! QuerySpec ──> Planner ──> SelectQuery ──> ExecutionContext ──> rows
//!                 │
//!                 ├─ PathResolver     dotted paths to joins + columns
//!                 └─ PredicateBuilder FilterSpec to Condition
//! ```
//!
//! ## Example
//!
//! ```rust
//! use forum_core::database::{MemoryContext, Record};
//! use forum_core::models::Comment;
//! use forum_core::query::{FilterSpec, QueryExecutor, QuerySpec};
//!
//! # async fn example() -> forum_core::Result<()> {
//! let executor = QueryExecutor::new(MemoryContext::new());
//! let spec = QuerySpec::<Comment>::for_entity()
//!     .filter(FilterSpec::eq("discussion.id", 10)?)
//!     .order_asc("id")
//!     .build()?;
//!
//! let comments: Vec<Comment> = executor.find(&spec).await?;
//! let total = executor.count(&spec).await?;
//! assert_eq!(comments.len() as i64, total);
//! # Ok(())
//! # }
//! ```

pub mod conditions;
pub mod executor;
pub mod filter;
pub mod joins;
pub mod order;
pub mod pagination;
pub mod path;
pub mod planner;
pub mod predicate;
pub mod select;
pub mod spec;
pub mod value;

pub use conditions::{Comparison, Condition};
pub use executor::{ExecutionContext, FromResultRow, QueryExecutor};
pub use filter::{FilterOperator, FilterSpec, RawFilterSpec};
pub use joins::{ColumnRef, Join};
pub use order::OrderSpec;
pub use pagination::Pagination;
pub use path::{JoinGraph, PathResolver, ResolvedAttribute, ResolvedPath, ROOT_ALIAS};
pub use planner::{Planner, QueryMode};
pub use predicate::{BuiltPredicates, PredicateBuilder, SkippedFilter};
pub use select::{OrderKey, SelectQuery, Selection};
pub use spec::{QuerySpec, QuerySpecBuilder};
pub use value::FilterValue;
