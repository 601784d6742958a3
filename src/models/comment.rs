use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::{Discussion, Vote};
use crate::schema::{Entity, EntityDef, FieldDef, ScalarType};

/// A single post within a discussion
/// Maps to `comments` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Comment {
    pub id: i64,
    pub discussion_id: i64,
    pub content: String,
    pub create_by: String,
    pub create_date: DateTime<Utc>,
    pub vote_up: i64,
    pub vote_down: i64,
}

pub static COMMENT: EntityDef = EntityDef {
    name: "Comment",
    table: "comments",
    id_column: "id",
    id_type: ScalarType::Integer,
    fields: &[
        FieldDef::scalar("id", "id", ScalarType::Integer),
        FieldDef::scalar("content", "content", ScalarType::Text),
        FieldDef::scalar("create_by", "create_by", ScalarType::Text),
        FieldDef::scalar("create_date", "create_date", ScalarType::Timestamp),
        FieldDef::scalar("vote_up", "vote_up", ScalarType::Integer),
        FieldDef::scalar("vote_down", "vote_down", ScalarType::Integer),
        FieldDef::to_one("discussion", "discussion_id", Discussion::entity),
        FieldDef::to_many("votes", "comment_id", Vote::entity),
    ],
};

impl Entity for Comment {
    fn entity() -> &'static EntityDef {
        &COMMENT
    }
}
