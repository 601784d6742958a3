//! # Query Planner
//!
//! Compiles a [`QuerySpec`] into a [`SelectQuery`]. The projection, the
//! filters and the sort keys are resolved against one [`JoinGraph`], so
//! every operation on the same spec sees the same joins; the operations
//! differ only in selection, ordering and window.

use super::conditions::Condition;
use super::joins::ColumnRef;
use super::pagination::Pagination;
use super::path::{JoinGraph, PathResolver, ResolvedPath, ROOT_ALIAS};
use super::predicate::PredicateBuilder;
use super::select::{OrderKey, SelectQuery, Selection};
use super::spec::QuerySpec;
use crate::error::Result;

/// Which executor operation a plan serves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryMode {
    /// Every matching row in the requested window
    Rows,
    /// At most one row, honoring the start index
    FirstRow,
    /// Number of matches, ignoring order and window
    Count,
    /// Whether any match exists
    Probe,
}

pub struct Planner;

impl Planner {
    pub fn plan<T>(spec: &QuerySpec<T>, mode: QueryMode) -> Result<SelectQuery> {
        let mut graph = JoinGraph::new(spec.root());

        let projection = match spec.target_path() {
            Some(path) => PathResolver::resolve_projection(&mut graph, path)?,
            None => ResolvedPath::Entity {
                alias: ROOT_ALIAS.to_string(),
                entity: spec.root(),
            },
        };

        let built = PredicateBuilder::build_all(&mut graph, spec.filters())?;

        // Sort keys are resolved in every mode so they contribute the same joins
        let mut order_by = Vec::with_capacity(spec.orders().len());
        for order in spec.orders() {
            let attribute = PathResolver::resolve_attribute(&mut graph, order.field())?;
            order_by.push(OrderKey {
                column: attribute.column,
                ascending: order.is_ascending(),
            });
        }

        let mut conditions = built.conditions;
        let (selection, order_by, pagination) = match mode {
            QueryMode::Rows => (Self::rows(projection), order_by, spec.pagination()),
            QueryMode::FirstRow => (
                Self::rows(projection),
                order_by,
                Some(Pagination {
                    limit: Some(1),
                    offset: spec.start_index(),
                }),
            ),
            QueryMode::Count => (Self::count(projection), Vec::new(), None),
            QueryMode::Probe => {
                let selection = match projection {
                    ResolvedPath::Column(attribute) => {
                        conditions.push(Condition::IsNotNull {
                            column: attribute.column.clone(),
                        });
                        Selection::Column(attribute.column)
                    }
                    ResolvedPath::Entity { .. } => Selection::Literal,
                };
                (selection, Vec::new(), Some(Pagination::limit_only(1)))
            }
        };

        Ok(SelectQuery {
            root: spec.root(),
            selection,
            joins: graph.into_joins(),
            conditions,
            order_by,
            pagination,
            skipped_filters: built.skipped,
        })
    }

    fn rows(projection: ResolvedPath) -> Selection {
        match projection {
            ResolvedPath::Column(attribute) => Selection::Column(attribute.column),
            ResolvedPath::Entity { alias, entity } => Selection::Entity { alias, entity },
        }
    }

    fn count(projection: ResolvedPath) -> Selection {
        match projection {
            ResolvedPath::Column(attribute) => Selection::CountColumn(attribute.column),
            ResolvedPath::Entity { alias, .. } if alias == ROOT_ALIAS => Selection::CountRows,
            ResolvedPath::Entity { alias, entity } => {
                Selection::CountColumn(ColumnRef::new(alias, entity.id_column))
            }
        }
    }
}
