//! Complete query descriptions.
//!
//! A [`QuerySpec<T>`] names the root entity (FROM), an optional projection
//! path, AND-combined filters, ordered sort keys and a pagination window. `T`
//! is the shape each result row decodes into.
//!
//! ```rust
//! use forum_core::models::Comment;
//! use forum_core::query::{FilterSpec, QuerySpec};
//!
//! # fn main() -> forum_core::Result<()> {
//! let spec = QuerySpec::<Comment>::for_entity()
//!     .filter(FilterSpec::eq("discussion.id", 10)?)
//!     .order_asc("id")
//!     .max_result(20)
//!     .build()?;
//! assert_eq!(spec.root().name, "Comment");
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::marker::PhantomData;

use super::filter::{validate_field_path, FilterSpec};
use super::order::OrderSpec;
use super::pagination::Pagination;
use crate::error::{QueryError, Result};
use crate::schema::{Entity, EntityDef};

pub struct QuerySpec<T> {
    root: &'static EntityDef,
    target_path: Option<String>,
    filters: Vec<FilterSpec>,
    orders: Vec<OrderSpec>,
    start_index: Option<u32>,
    max_result: Option<u32>,
    _target: PhantomData<fn() -> T>,
}

impl<E: Entity> QuerySpec<E> {
    /// Query whose root entity is also the result type
    pub fn for_entity() -> QuerySpecBuilder<E> {
        QuerySpecBuilder::new(E::entity())
    }
}

impl<T> QuerySpec<T> {
    /// Query rooted at `root`, usually combined with a projection path
    pub fn builder(root: &'static EntityDef) -> QuerySpecBuilder<T> {
        QuerySpecBuilder::new(root)
    }

    pub fn root(&self) -> &'static EntityDef {
        self.root
    }

    pub fn target_path(&self) -> Option<&str> {
        self.target_path.as_deref()
    }

    pub fn filters(&self) -> &[FilterSpec] {
        &self.filters
    }

    pub fn orders(&self) -> &[OrderSpec] {
        &self.orders
    }

    pub fn start_index(&self) -> Option<u32> {
        self.start_index
    }

    pub fn max_result(&self) -> Option<u32> {
        self.max_result
    }

    pub fn pagination(&self) -> Option<Pagination> {
        Pagination::window(self.start_index, self.max_result)
    }

    /// Same query with pagination removed
    pub fn without_pagination(&self) -> Self {
        Self {
            start_index: None,
            max_result: None,
            ..self.clone()
        }
    }

    /// Reuse this description for a different result shape
    pub fn cast<U>(&self) -> QuerySpec<U> {
        QuerySpec {
            root: self.root,
            target_path: self.target_path.clone(),
            filters: self.filters.clone(),
            orders: self.orders.clone(),
            start_index: self.start_index,
            max_result: self.max_result,
            _target: PhantomData,
        }
    }
}

impl<T> Clone for QuerySpec<T> {
    fn clone(&self) -> Self {
        self.cast()
    }
}

impl<T> fmt::Debug for QuerySpec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuerySpec")
            .field("root", &self.root.name)
            .field("target_path", &self.target_path)
            .field("filters", &self.filters)
            .field("orders", &self.orders)
            .field("start_index", &self.start_index)
            .field("max_result", &self.max_result)
            .finish()
    }
}

/// Assembles a [`QuerySpec`]
pub struct QuerySpecBuilder<T> {
    spec: QuerySpec<T>,
}

impl<T> QuerySpecBuilder<T> {
    fn new(root: &'static EntityDef) -> Self {
        Self {
            spec: QuerySpec {
                root,
                target_path: None,
                filters: Vec::new(),
                orders: Vec::new(),
                start_index: None,
                max_result: None,
                _target: PhantomData,
            },
        }
    }

    /// Override the FROM entity
    pub fn root(mut self, root: &'static EntityDef) -> Self {
        self.spec.root = root;
        self
    }

    /// Select `path` instead of the whole root entity
    pub fn target_path(mut self, path: impl Into<String>) -> Self {
        self.spec.target_path = Some(path.into());
        self
    }

    pub fn filter(mut self, filter: FilterSpec) -> Self {
        self.spec.filters.push(filter);
        self
    }

    pub fn filters(mut self, filters: impl IntoIterator<Item = FilterSpec>) -> Self {
        self.spec.filters.extend(filters);
        self
    }

    pub fn order(mut self, order: OrderSpec) -> Self {
        self.spec.orders.push(order);
        self
    }

    pub fn order_asc(self, field: impl Into<String>) -> Self {
        self.order(OrderSpec::asc(field))
    }

    pub fn order_desc(self, field: impl Into<String>) -> Self {
        self.order(OrderSpec::desc(field))
    }

    pub fn start_index(mut self, start_index: u32) -> Self {
        self.spec.start_index = Some(start_index);
        self
    }

    pub fn max_result(mut self, max_result: u32) -> Self {
        self.spec.max_result = Some(max_result);
        self
    }

    /// Window for a 1-indexed page
    pub fn paginate(mut self, page: u32, per_page: u32) -> Self {
        let pagination = Pagination::page(page, per_page);
        self.spec.start_index = pagination.offset;
        self.spec.max_result = pagination.limit;
        self
    }

    pub fn build(self) -> Result<QuerySpec<T>> {
        if self.spec.max_result == Some(0) {
            return Err(QueryError::InvalidQuery(
                "max_result must be greater than 0".to_string(),
            ));
        }

        if let Some(path) = &self.spec.target_path {
            validate_field_path(path).map_err(|_| {
                QueryError::InvalidQuery(format!("malformed target path '{path}'"))
            })?;
        }

        Ok(self.spec)
    }
}
