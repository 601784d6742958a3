//! # Forum Models
//!
//! Row types for the forum schema together with the static metadata the
//! query engine navigates. Every model maps to one table in `migrations/`.
//!
//! | Entity | Table | Relations |
//! |---|---|---|
//! | [`User`] | `forum_users` | none |
//! | [`Forum`] | `forums` | `discussions` |
//! | [`Discussion`] | `discussions` | `forum`, `comments`, `tags` |
//! | [`Comment`] | `comments` | `discussion`, `votes` |
//! | [`Tag`] | `tags` | `discussions` |
//! | [`Vote`] | `votes` | `comment` |

pub mod comment;
pub mod discussion;
pub mod forum;
pub mod tag;
pub mod user;
pub mod vote;

pub use comment::{Comment, COMMENT};
pub use discussion::{Discussion, DISCUSSION};
pub use forum::{Forum, FORUM};
pub use tag::{Tag, TAG};
pub use user::{User, USER};
pub use vote::{Vote, VOTE};

use crate::schema::EntityDef;

/// Every entity of the forum schema, in dependency order
pub fn all_entities() -> [&'static EntityDef; 6] {
    [&USER, &FORUM, &DISCUSSION, &TAG, &COMMENT, &VOTE]
}
