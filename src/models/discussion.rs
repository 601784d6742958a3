use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::{Comment, Forum, Tag};
use crate::schema::{Entity, EntityDef, FieldDef, ScalarType};

/// A thread of comments inside a forum
/// Maps to `discussions` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Discussion {
    pub id: i64,
    pub forum_id: i64,
    pub title: String,
    pub create_by: String,
    pub create_date: DateTime<Utc>,
    pub closed: bool,
    pub view_count: i64,
}

pub static DISCUSSION: EntityDef = EntityDef {
    name: "Discussion",
    table: "discussions",
    id_column: "id",
    id_type: ScalarType::Integer,
    fields: &[
        FieldDef::scalar("id", "id", ScalarType::Integer),
        FieldDef::scalar("title", "title", ScalarType::Text),
        FieldDef::scalar("create_by", "create_by", ScalarType::Text),
        FieldDef::scalar("create_date", "create_date", ScalarType::Timestamp),
        FieldDef::scalar("closed", "closed", ScalarType::Boolean),
        FieldDef::scalar("view_count", "view_count", ScalarType::Integer),
        FieldDef::to_one("forum", "forum_id", Forum::entity),
        FieldDef::to_many("comments", "discussion_id", Comment::entity),
        FieldDef::many_to_many(
            "tags",
            "discussion_tags",
            "discussion_id",
            "tag_id",
            Tag::entity,
        ),
    ],
};

impl Entity for Discussion {
    fn entity() -> &'static EntityDef {
        &DISCUSSION
    }
}
