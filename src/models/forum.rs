use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::Discussion;
use crate::schema::{Entity, EntityDef, FieldDef, ScalarType};

/// A top-level board grouping discussions
/// Maps to `forums` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Forum {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub create_by: String,
    pub create_date: DateTime<Utc>,
    pub active: bool,
}

pub static FORUM: EntityDef = EntityDef {
    name: "Forum",
    table: "forums",
    id_column: "id",
    id_type: ScalarType::Integer,
    fields: &[
        FieldDef::scalar("id", "id", ScalarType::Integer),
        FieldDef::scalar("title", "title", ScalarType::Text),
        FieldDef::scalar("description", "description", ScalarType::Text),
        FieldDef::scalar("create_by", "create_by", ScalarType::Text),
        FieldDef::scalar("create_date", "create_date", ScalarType::Timestamp),
        FieldDef::scalar("active", "active", ScalarType::Boolean),
        FieldDef::to_many("discussions", "forum_id", Discussion::entity),
    ],
};

impl Entity for Forum {
    fn entity() -> &'static EntityDef {
        &FORUM
    }
}
