use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::Discussion;
use crate::schema::{Entity, EntityDef, FieldDef, ScalarType};

/// Label attached to discussions
/// Maps to `tags` table, linked through `discussion_tags`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Tag {
    pub id: i64,
    pub label: String,
    pub disabled: bool,
}

pub static TAG: EntityDef = EntityDef {
    name: "Tag",
    table: "tags",
    id_column: "id",
    id_type: ScalarType::Integer,
    fields: &[
        FieldDef::scalar("id", "id", ScalarType::Integer),
        FieldDef::scalar("label", "label", ScalarType::Text),
        FieldDef::scalar("disabled", "disabled", ScalarType::Boolean),
        FieldDef::many_to_many(
            "discussions",
            "discussion_tags",
            "tag_id",
            "discussion_id",
            Discussion::entity,
        ),
    ],
};

impl Entity for Tag {
    fn entity() -> &'static EntityDef {
        &TAG
    }
}
