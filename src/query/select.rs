//! Compiled, backend-neutral SELECT statements.
//!
//! A [`SelectQuery`] is what the planner hands to an execution context. It
//! renders to PostgreSQL through [`sqlx::QueryBuilder`] with every filter
//! literal bound as a parameter; identifiers come only from entity metadata.

use sqlx::{Postgres, QueryBuilder};

use super::conditions::Condition;
use super::joins::{ColumnRef, Join};
use super::pagination::Pagination;
use super::path::ROOT_ALIAS;
use super::predicate::SkippedFilter;
use crate::schema::EntityDef;

/// What the SELECT list produces
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    /// Every column of the entity bound to `alias`
    Entity {
        alias: String,
        entity: &'static EntityDef,
    },
    Column(ColumnRef),
    /// `COUNT(*)`
    CountRows,
    /// `COUNT(col)`, nulls excluded
    CountColumn(ColumnRef),
    /// `1`, for existence probes
    Literal,
}

impl Selection {
    pub fn to_sql(&self) -> String {
        match self {
            Selection::Entity { alias, .. } => format!("{alias}.*"),
            Selection::Column(column) => column.to_string(),
            Selection::CountRows => "COUNT(*)".to_string(),
            Selection::CountColumn(column) => format!("COUNT({column})"),
            Selection::Literal => "1".to_string(),
        }
    }

    pub fn is_count(&self) -> bool {
        matches!(self, Selection::CountRows | Selection::CountColumn(_))
    }
}

/// One ORDER BY key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderKey {
    pub column: ColumnRef,
    pub ascending: bool,
}

impl OrderKey {
    pub fn to_sql(&self) -> String {
        let direction = if self.ascending { "ASC" } else { "DESC" };
        format!("{} {direction}", self.column)
    }
}

#[derive(Debug, Clone)]
pub struct SelectQuery {
    pub root: &'static EntityDef,
    pub selection: Selection,
    pub joins: Vec<Join>,
    /// AND-combined
    pub conditions: Vec<Condition>,
    pub order_by: Vec<OrderKey>,
    pub pagination: Option<Pagination>,
    /// Filters dropped while compiling
    pub skipped_filters: Vec<SkippedFilter>,
}

impl SelectQuery {
    /// `SELECT t0.* FROM <root table> t0` with nothing else applied
    pub fn new(root: &'static EntityDef) -> Self {
        Self {
            root,
            selection: Selection::Entity {
                alias: ROOT_ALIAS.to_string(),
                entity: root,
            },
            joins: Vec::new(),
            conditions: Vec::new(),
            order_by: Vec::new(),
            pagination: None,
            skipped_filters: Vec::new(),
        }
    }

    /// Render into a builder carrying the bound parameters
    pub fn to_query_builder(&self) -> QueryBuilder<'static, Postgres> {
        let mut query = QueryBuilder::new(format!(
            "SELECT {} FROM {} {ROOT_ALIAS}",
            self.selection.to_sql(),
            self.root.table
        ));

        for join in &self.joins {
            query.push(" ");
            query.push(join.to_sql());
        }

        if !self.conditions.is_empty() {
            query.push(" WHERE ");
            for (index, condition) in self.conditions.iter().enumerate() {
                if index > 0 {
                    query.push(" AND ");
                }
                condition.push_sql(&mut query);
            }
        }

        if !self.order_by.is_empty() {
            let keys: Vec<String> = self.order_by.iter().map(OrderKey::to_sql).collect();
            query.push(format!(" ORDER BY {}", keys.join(", ")));
        }

        if let Some(pagination) = &self.pagination {
            query.push(pagination.to_sql());
        }

        query
    }

    /// SQL text with `$n` placeholders
    pub fn to_sql(&self) -> String {
        self.to_query_builder().sql().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{COMMENT, DISCUSSION};
    use crate::query::conditions::Comparison;

    #[test]
    fn test_bare_select() {
        let query = SelectQuery::new(&COMMENT);
        assert_eq!(query.to_sql(), "SELECT t0.* FROM comments t0");
    }

    #[test]
    fn test_full_statement_shape() {
        let mut query = SelectQuery::new(&COMMENT);
        query.joins.push(Join::inner(
            DISCUSSION.table,
            "j1",
            "id",
            ColumnRef::new("t0", "discussion_id"),
        ));
        query.conditions.push(Condition::Compare {
            column: ColumnRef::new("j1", "id"),
            op: Comparison::Eq,
            value: 10.into(),
        });
        query.conditions.push(Condition::IsNotNull {
            column: ColumnRef::new("t0", "content"),
        });
        query.order_by.push(OrderKey {
            column: ColumnRef::new("t0", "create_date"),
            ascending: false,
        });
        query.order_by.push(OrderKey {
            column: ColumnRef::new("t0", "id"),
            ascending: true,
        });
        query.pagination = Some(Pagination::window(Some(20), Some(10)).unwrap());

        assert_eq!(
            query.to_sql(),
            "SELECT t0.* FROM comments t0 \
             INNER JOIN discussions j1 ON j1.id = t0.discussion_id \
             WHERE j1.id = $1 AND t0.content IS NOT NULL \
             ORDER BY t0.create_date DESC, t0.id ASC LIMIT 10 OFFSET 20"
        );
    }

    #[test]
    fn test_selection_rendering() {
        let column = ColumnRef::new("j1", "title");
        assert_eq!(Selection::Column(column.clone()).to_sql(), "j1.title");
        assert_eq!(Selection::CountRows.to_sql(), "COUNT(*)");
        assert_eq!(Selection::CountColumn(column).to_sql(), "COUNT(j1.title)");
        assert_eq!(Selection::Literal.to_sql(), "1");
        assert!(Selection::CountRows.is_count());
        assert!(!Selection::Literal.is_count());
    }
}
