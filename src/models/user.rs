use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::schema::{Entity, EntityDef, FieldDef, ScalarType};

/// A registered forum member
/// Maps to `forum_users` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub create_date: DateTime<Utc>,
}

pub static USER: EntityDef = EntityDef {
    name: "User",
    table: "forum_users",
    id_column: "id",
    id_type: ScalarType::Integer,
    fields: &[
        FieldDef::scalar("id", "id", ScalarType::Integer),
        FieldDef::scalar("username", "username", ScalarType::Text),
        FieldDef::scalar("email", "email", ScalarType::Text),
        FieldDef::scalar("create_date", "create_date", ScalarType::Timestamp),
    ],
};

impl Entity for User {
    fn entity() -> &'static EntityDef {
        &USER
    }
}
