//! # Path Resolution
//!
//! Turns a dotted field path such as `discussion.forum.id` into the joins
//! needed to reach it plus a reference to the leaf column.
//!
//! Every segment except the last must name a relation. Each relation hop
//! adds an INNER join (two for many-to-many: the link table, then the
//! target). A [`JoinGraph`] lives for one compiled query and is never reused
//! across calls.
//!
//! To-one hops are shared: every path of the query that walks the same
//! to-one chain reuses its joins. Collection hops (to-many, many-to-many)
//! are shared by the projection and the sort keys, but each filter gets a
//! join of its own that no other path reuses, so every filter on a collection independently asks whether *some*
//! related row matches. `discussions.title = 'a' AND discussions.title = 'b'`
//! therefore matches a forum owning both discussions.
//!
//! Resolution is all-or-nothing: when any segment fails to resolve the
//! graph is left exactly as it was.

use std::collections::HashMap;

use super::joins::{ColumnRef, Join};
use crate::error::{QueryError, Result};
use crate::schema::{EntityDef, FieldDef, FieldKind, ScalarType};

/// Alias of the FROM table
pub const ROOT_ALIAS: &str = "t0";

#[derive(Debug, Clone)]
struct Scope {
    alias: String,
    entity: &'static EntityDef,
}

/// Joins accumulated while compiling one query
#[derive(Debug, Clone)]
pub struct JoinGraph {
    root: &'static EntityDef,
    joins: Vec<Join>,
    scopes: HashMap<String, Scope>,
    next_alias: usize,
}

impl JoinGraph {
    pub fn new(root: &'static EntityDef) -> Self {
        Self {
            root,
            joins: Vec::new(),
            scopes: HashMap::new(),
            next_alias: 1,
        }
    }

    pub fn root(&self) -> &'static EntityDef {
        self.root
    }

    pub fn joins(&self) -> &[Join] {
        &self.joins
    }

    pub fn into_joins(self) -> Vec<Join> {
        self.joins
    }

    fn root_scope(&self) -> Scope {
        Scope {
            alias: ROOT_ALIAS.to_string(),
            entity: self.root,
        }
    }

    fn allocate_alias(&mut self) -> String {
        let alias = format!("j{}", self.next_alias);
        self.next_alias += 1;
        alias
    }

    /// Scope reached by following `field` from `from`, joining if needed
    fn enter(&mut self, from: &Scope, field: &FieldDef, reuse: JoinReuse) -> Option<Scope> {
        let key = format!("{}.{}", from.alias, field.name);
        let private = reuse == JoinReuse::ToOneOnly
            && matches!(
                field.kind,
                FieldKind::ToMany { .. } | FieldKind::ManyToMany { .. }
            );
        if !private {
            if let Some(scope) = self.scopes.get(&key) {
                return Some(scope.clone());
            }
        }

        let (alias, target) = match field.kind {
            FieldKind::Scalar { .. } => return None,
            FieldKind::ToOne { column, target } => {
                let target = target();
                let alias = self.allocate_alias();
                self.joins.push(Join::inner(
                    target.table,
                    alias.clone(),
                    target.id_column,
                    ColumnRef::new(from.alias.clone(), column),
                ));
                (alias, target)
            }
            FieldKind::ToMany { mapped_by, target } => {
                let target = target();
                let alias = self.allocate_alias();
                self.joins.push(Join::inner(
                    target.table,
                    alias.clone(),
                    mapped_by,
                    ColumnRef::new(from.alias.clone(), from.entity.id_column),
                ));
                (alias, target)
            }
            FieldKind::ManyToMany {
                join_table,
                join_column,
                inverse_join_column,
                target,
            } => {
                let target = target();
                let link = self.allocate_alias();
                self.joins.push(Join::inner(
                    join_table,
                    link.clone(),
                    join_column,
                    ColumnRef::new(from.alias.clone(), from.entity.id_column),
                ));
                let alias = self.allocate_alias();
                self.joins.push(Join::inner(
                    target.table,
                    alias.clone(),
                    target.id_column,
                    ColumnRef::new(link, inverse_join_column),
                ));
                (alias, target)
            }
        };

        let scope = Scope {
            alias,
            entity: target,
        };
        if !private {
            self.scopes.insert(key, scope.clone());
        }
        Some(scope)
    }
}

/// A comparable leaf column and its type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAttribute {
    pub column: ColumnRef,
    pub ty: ScalarType,
}

/// What a projection path selects
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedPath {
    Column(ResolvedAttribute),
    Entity {
        alias: String,
        entity: &'static EntityDef,
    },
}

/// Which existing joins a resolution may reuse
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum JoinReuse {
    All,
    /// Collection hops always get a fresh join
    ToOneOnly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LeafMode {
    Attribute,
    Projection,
}

/// Stateless resolver of dotted paths against entity metadata
pub struct PathResolver;

impl PathResolver {
    /// Resolve a path used by a filter or sort key.
    ///
    /// A to-one relation leaf resolves to its foreign-key column, typed as
    /// the target's id. Collection leaves cannot be compared and fail.
    pub fn resolve_attribute(graph: &mut JoinGraph, path: &str) -> Result<ResolvedAttribute> {
        Self::attribute(graph, path, JoinReuse::All)
    }

    /// Resolve a filter path. Like [`Self::resolve_attribute`], except that
    /// collection hops never reuse a join, so the filter matches when any
    /// related row satisfies it regardless of the other filters.
    pub fn resolve_filter_attribute(
        graph: &mut JoinGraph,
        path: &str,
    ) -> Result<ResolvedAttribute> {
        Self::attribute(graph, path, JoinReuse::ToOneOnly)
    }

    /// Resolve a projection path; a relation leaf is joined and selected whole
    pub fn resolve_projection(graph: &mut JoinGraph, path: &str) -> Result<ResolvedPath> {
        Self::resolve(graph, path, LeafMode::Projection, JoinReuse::All)
    }

    fn attribute(graph: &mut JoinGraph, path: &str, reuse: JoinReuse) -> Result<ResolvedAttribute> {
        match Self::resolve(graph, path, LeafMode::Attribute, reuse)? {
            ResolvedPath::Column(attribute) => Ok(attribute),
            ResolvedPath::Entity { .. } => Err(QueryError::path_resolution(
                graph.root().name,
                path,
                "path does not end in a comparable attribute",
            )),
        }
    }

    fn resolve(
        graph: &mut JoinGraph,
        path: &str,
        mode: LeafMode,
        reuse: JoinReuse,
    ) -> Result<ResolvedPath> {
        let root_name = graph.root().name;
        let fail = |reason: String| QueryError::path_resolution(root_name, path, reason);

        let segments: Vec<&str> = path.split('.').collect();
        if segments.iter().any(|segment| segment.is_empty()) {
            return Err(fail("path contains an empty segment".to_string()));
        }

        let mut staged = graph.clone();
        let mut scope = staged.root_scope();

        for (index, segment) in segments.iter().enumerate() {
            let field = scope.entity.field(segment).ok_or_else(|| {
                fail(format!(
                    "unknown field '{segment}' on {}",
                    scope.entity.name
                ))
            })?;

            let is_leaf = index + 1 == segments.len();
            if !is_leaf {
                scope = staged.enter(&scope, field, reuse).ok_or_else(|| {
                    fail(format!(
                        "'{segment}' on {} is not a relation",
                        scope.entity.name
                    ))
                })?;
                continue;
            }

            let resolved = match (field.kind, mode) {
                (FieldKind::Scalar { column, ty }, _) => ResolvedPath::Column(ResolvedAttribute {
                    column: ColumnRef::new(scope.alias.clone(), column),
                    ty,
                }),
                (FieldKind::ToOne { column, target }, LeafMode::Attribute) => {
                    ResolvedPath::Column(ResolvedAttribute {
                        column: ColumnRef::new(scope.alias.clone(), column),
                        ty: target().id_type,
                    })
                }
                (_, LeafMode::Attribute) => {
                    return Err(fail(format!(
                        "'{segment}' on {} is a collection and cannot be compared",
                        scope.entity.name
                    )));
                }
                (_, LeafMode::Projection) => {
                    let joined = staged.enter(&scope, field, reuse).ok_or_else(|| {
                        fail(format!("'{segment}' is not a relation"))
                    })?;
                    ResolvedPath::Entity {
                        alias: joined.alias,
                        entity: joined.entity,
                    }
                }
            };

            *graph = staged;
            return Ok(resolved);
        }

        Err(fail("empty path".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{COMMENT, DISCUSSION, FORUM, TAG};

    #[test]
    fn test_single_segment_needs_no_join() {
        let mut graph = JoinGraph::new(&COMMENT);
        let resolved = PathResolver::resolve_attribute(&mut graph, "create_by").unwrap();
        assert_eq!(resolved.column, ColumnRef::new("t0", "create_by"));
        assert_eq!(resolved.ty, ScalarType::Text);
        assert!(graph.joins().is_empty());
    }

    #[test]
    fn test_two_hop_path_builds_join_chain() {
        let mut graph = JoinGraph::new(&COMMENT);
        let resolved = PathResolver::resolve_attribute(&mut graph, "discussion.forum.id").unwrap();

        assert_eq!(resolved.column, ColumnRef::new("j2", "id"));
        let sql: Vec<String> = graph.joins().iter().map(Join::to_sql).collect();
        assert_eq!(
            sql,
            vec![
                "INNER JOIN discussions j1 ON j1.id = t0.discussion_id",
                "INNER JOIN forums j2 ON j2.id = j1.forum_id",
            ]
        );
    }

    #[test]
    fn test_shared_prefix_reuses_join() {
        let mut graph = JoinGraph::new(&COMMENT);
        PathResolver::resolve_attribute(&mut graph, "discussion.forum.id").unwrap();
        PathResolver::resolve_attribute(&mut graph, "discussion.title").unwrap();
        let title = PathResolver::resolve_attribute(&mut graph, "discussion.forum.title").unwrap();

        assert_eq!(graph.joins().len(), 2);
        assert_eq!(title.column, ColumnRef::new("j2", "title"));
    }

    #[test]
    fn test_filters_get_their_own_collection_joins() {
        let mut graph = JoinGraph::new(&FORUM);
        let first = PathResolver::resolve_filter_attribute(&mut graph, "discussions.title").unwrap();
        let second = PathResolver::resolve_filter_attribute(&mut graph, "discussions.title").unwrap();

        assert_eq!(first.column, ColumnRef::new("j1", "title"));
        assert_eq!(second.column, ColumnRef::new("j2", "title"));
        assert_eq!(graph.joins().len(), 2);

        // a filter's collection join is never handed to another path
        let order = PathResolver::resolve_attribute(&mut graph, "discussions.title").unwrap();
        assert_eq!(order.column, ColumnRef::new("j3", "title"));
        let again = PathResolver::resolve_attribute(&mut graph, "discussions.id").unwrap();
        assert_eq!(again.column, ColumnRef::new("j3", "id"));
        assert_eq!(graph.joins().len(), 3);
    }

    #[test]
    fn test_filters_share_to_one_joins() {
        let mut graph = JoinGraph::new(&COMMENT);
        PathResolver::resolve_filter_attribute(&mut graph, "discussion.forum.id").unwrap();
        let title = PathResolver::resolve_filter_attribute(&mut graph, "discussion.title").unwrap();

        assert_eq!(title.column, ColumnRef::new("j1", "title"));
        assert_eq!(graph.joins().len(), 2);
    }

    #[test]
    fn test_to_one_leaf_compares_foreign_key() {
        let mut graph = JoinGraph::new(&COMMENT);
        let resolved = PathResolver::resolve_attribute(&mut graph, "discussion").unwrap();
        assert_eq!(resolved.column, ColumnRef::new("t0", "discussion_id"));
        assert_eq!(resolved.ty, ScalarType::Integer);
        assert!(graph.joins().is_empty());
    }

    #[test]
    fn test_to_many_and_many_to_many_hops() {
        let mut graph = JoinGraph::new(&FORUM);
        PathResolver::resolve_attribute(&mut graph, "discussions.tags.label").unwrap();
        let sql: Vec<String> = graph.joins().iter().map(Join::to_sql).collect();
        assert_eq!(
            sql,
            vec![
                "INNER JOIN discussions j1 ON j1.forum_id = t0.id",
                "INNER JOIN discussion_tags j2 ON j2.discussion_id = j1.id",
                "INNER JOIN tags j3 ON j3.id = j2.tag_id",
            ]
        );
    }

    #[test]
    fn test_unknown_segment_fails_without_partial_joins() {
        let mut graph = JoinGraph::new(&COMMENT);
        let err = PathResolver::resolve_attribute(&mut graph, "discussion.forum.nope").unwrap_err();
        assert!(matches!(err, QueryError::PathResolution { .. }));
        assert!(err.to_string().contains("unknown field 'nope' on Forum"));
        assert!(graph.joins().is_empty());
    }

    #[test]
    fn test_scalar_in_the_middle_fails() {
        let mut graph = JoinGraph::new(&COMMENT);
        let err = PathResolver::resolve_attribute(&mut graph, "content.length").unwrap_err();
        assert!(err.to_string().contains("is not a relation"));
    }

    #[test]
    fn test_collection_leaf_is_not_comparable() {
        let mut graph = JoinGraph::new(&DISCUSSION);
        assert!(PathResolver::resolve_attribute(&mut graph, "comments").is_err());
        assert!(PathResolver::resolve_attribute(&mut graph, "tags").is_err());
    }

    #[test]
    fn test_projection_of_relation_joins_target() {
        let mut graph = JoinGraph::new(&COMMENT);
        let resolved = PathResolver::resolve_projection(&mut graph, "discussion").unwrap();
        assert_eq!(
            resolved,
            ResolvedPath::Entity {
                alias: "j1".to_string(),
                entity: &DISCUSSION
            }
        );

        let mut graph = JoinGraph::new(&DISCUSSION);
        let resolved = PathResolver::resolve_projection(&mut graph, "tags").unwrap();
        assert!(matches!(resolved, ResolvedPath::Entity { entity, .. } if entity == &TAG));
        assert_eq!(graph.joins().len(), 2);
    }
}
