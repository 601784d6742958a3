use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::Comment;
use crate::schema::{Entity, EntityDef, FieldDef, ScalarType};

/// An up or down vote cast on a comment
/// Maps to `votes` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Vote {
    pub id: i64,
    pub comment_id: i64,
    pub vote_name: String,
    pub vote_value: i64,
}

pub static VOTE: EntityDef = EntityDef {
    name: "Vote",
    table: "votes",
    id_column: "id",
    id_type: ScalarType::Integer,
    fields: &[
        FieldDef::scalar("id", "id", ScalarType::Integer),
        FieldDef::scalar("vote_name", "vote_name", ScalarType::Text),
        FieldDef::scalar("vote_value", "vote_value", ScalarType::Integer),
        FieldDef::to_one("comment", "comment_id", Comment::entity),
    ],
};

impl Entity for Vote {
    fn entity() -> &'static EntityDef {
        &VOTE
    }
}
