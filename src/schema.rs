//! # Entity Metadata
//!
//! Static descriptions of entities, their columns and their relations. The
//! path resolver navigates these descriptors to turn a dotted field path into
//! a join chain and a leaf column.
//!
//! Descriptors are plain `'static` data; relation targets are function
//! pointers so entities can refer to each other in both directions.

use crate::query::value::FilterValue;
use std::fmt;

/// Function returning the metadata of a relation's target entity
pub type EntityRef = fn() -> &'static EntityDef;

/// An entity type usable as a query root
pub trait Entity {
    fn entity() -> &'static EntityDef;
}

/// Column types known to the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarType {
    Integer,
    Float,
    Text,
    Boolean,
    Timestamp,
    Date,
    Uuid,
}

impl ScalarType {
    /// Whether values of this column type support GT/GTE/LT/LTE/BETWEEN
    pub fn is_orderable(self) -> bool {
        !matches!(self, ScalarType::Boolean | ScalarType::Uuid)
    }

    /// Whether a filter literal can be compared against a column of this type
    pub fn accepts(self, value: &FilterValue) -> bool {
        matches!(
            (self, value),
            (ScalarType::Integer, FilterValue::Integer(_))
                | (ScalarType::Float, FilterValue::Integer(_) | FilterValue::Float(_))
                | (ScalarType::Text, FilterValue::Text(_))
                | (ScalarType::Boolean, FilterValue::Boolean(_))
                | (ScalarType::Timestamp, FilterValue::Timestamp(_))
                | (ScalarType::Date, FilterValue::Date(_))
                | (ScalarType::Uuid, FilterValue::Uuid(_))
        )
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScalarType::Integer => "integer",
            ScalarType::Float => "float",
            ScalarType::Text => "text",
            ScalarType::Boolean => "boolean",
            ScalarType::Timestamp => "timestamp",
            ScalarType::Date => "date",
            ScalarType::Uuid => "uuid",
        };
        f.write_str(name)
    }
}

/// How a field maps onto the relational schema
#[derive(Clone, Copy)]
pub enum FieldKind {
    Scalar {
        column: &'static str,
        ty: ScalarType,
    },
    /// Foreign key on this entity's table pointing at `target`'s id
    ToOne {
        column: &'static str,
        target: EntityRef,
    },
    /// Foreign key `mapped_by` on `target`'s table pointing at this entity's id
    ToMany {
        mapped_by: &'static str,
        target: EntityRef,
    },
    /// Link table holding `join_column` (this side) and `inverse_join_column` (target side)
    ManyToMany {
        join_table: &'static str,
        join_column: &'static str,
        inverse_join_column: &'static str,
        target: EntityRef,
    },
}

impl FieldKind {
    pub fn target(&self) -> Option<&'static EntityDef> {
        match self {
            FieldKind::Scalar { .. } => None,
            FieldKind::ToOne { target, .. }
            | FieldKind::ToMany { target, .. }
            | FieldKind::ManyToMany { target, .. } => Some(target()),
        }
    }

    pub fn is_relation(&self) -> bool {
        !matches!(self, FieldKind::Scalar { .. })
    }
}

impl fmt::Debug for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::Scalar { column, ty } => f
                .debug_struct("Scalar")
                .field("column", column)
                .field("ty", ty)
                .finish(),
            FieldKind::ToOne { column, target } => f
                .debug_struct("ToOne")
                .field("column", column)
                .field("target", &target().name)
                .finish(),
            FieldKind::ToMany { mapped_by, target } => f
                .debug_struct("ToMany")
                .field("mapped_by", mapped_by)
                .field("target", &target().name)
                .finish(),
            FieldKind::ManyToMany {
                join_table, target, ..
            } => f
                .debug_struct("ManyToMany")
                .field("join_table", join_table)
                .field("target", &target().name)
                .finish(),
        }
    }
}

/// A named field of an entity
#[derive(Debug, Clone, Copy)]
pub struct FieldDef {
    pub name: &'static str,
    pub kind: FieldKind,
}

impl FieldDef {
    pub const fn scalar(name: &'static str, column: &'static str, ty: ScalarType) -> Self {
        Self {
            name,
            kind: FieldKind::Scalar { column, ty },
        }
    }

    pub const fn to_one(name: &'static str, column: &'static str, target: EntityRef) -> Self {
        Self {
            name,
            kind: FieldKind::ToOne { column, target },
        }
    }

    pub const fn to_many(name: &'static str, mapped_by: &'static str, target: EntityRef) -> Self {
        Self {
            name,
            kind: FieldKind::ToMany { mapped_by, target },
        }
    }

    pub const fn many_to_many(
        name: &'static str,
        join_table: &'static str,
        join_column: &'static str,
        inverse_join_column: &'static str,
        target: EntityRef,
    ) -> Self {
        Self {
            name,
            kind: FieldKind::ManyToMany {
                join_table,
                join_column,
                inverse_join_column,
                target,
            },
        }
    }
}

/// Table-level description of an entity
#[derive(Debug)]
pub struct EntityDef {
    pub name: &'static str,
    pub table: &'static str,
    pub id_column: &'static str,
    pub id_type: ScalarType,
    pub fields: &'static [FieldDef],
}

impl EntityDef {
    pub fn field(&self, name: &str) -> Option<&'static FieldDef> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Type of a column stored on this entity's own table
    pub fn column_type(&self, column: &str) -> Option<ScalarType> {
        self.fields.iter().find_map(|field| match field.kind {
            FieldKind::Scalar { column: own, ty } if own == column => Some(ty),
            FieldKind::ToOne { column: own, target } if own == column => Some(target().id_type),
            _ => None,
        })
    }
}

impl PartialEq for EntityDef {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.table == other.table
    }
}

impl Eq for EntityDef {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{COMMENT, DISCUSSION};

    #[test]
    fn test_field_lookup() {
        let field = COMMENT.field("discussion").unwrap();
        assert!(field.kind.is_relation());
        assert_eq!(field.kind.target().unwrap(), &DISCUSSION);
        assert!(COMMENT.field("missing").is_none());
    }

    #[test]
    fn test_column_types() {
        assert_eq!(COMMENT.column_type("content"), Some(ScalarType::Text));
        assert_eq!(COMMENT.column_type("discussion_id"), Some(ScalarType::Integer));
        assert_eq!(COMMENT.column_type("votes"), None);
    }

    #[test]
    fn test_type_acceptance() {
        assert!(ScalarType::Integer.accepts(&FilterValue::Integer(1)));
        assert!(!ScalarType::Integer.accepts(&FilterValue::Float(1.0)));
        assert!(ScalarType::Float.accepts(&FilterValue::Integer(1)));
        assert!(!ScalarType::Text.accepts(&FilterValue::Integer(1)));
        assert!(!ScalarType::Text.accepts(&FilterValue::List(vec![])));
    }

    #[test]
    fn test_orderable_column_types() {
        assert!(ScalarType::Timestamp.is_orderable());
        assert!(ScalarType::Text.is_orderable());
        assert!(!ScalarType::Boolean.is_orderable());
    }
}
