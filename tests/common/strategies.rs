use forum_core::database::MemoryContext;
use forum_core::models::Comment;
use proptest::prelude::*;

use super::day;

pub const AUTHORS: [&str; 4] = ["alice", "bob", "carol", "dave"];

/// Strategy for author names drawn from a small pool so filters hit
pub fn author_strategy() -> impl Strategy<Value = String> {
    prop::sample::select(AUTHORS.to_vec()).prop_map(str::to_string)
}

/// Strategy for a comment table with unique ids
pub fn comments_strategy() -> impl Strategy<Value = Vec<Comment>> {
    prop::collection::vec((10i64..14, author_strategy(), 0i64..20, 1u32..28), 0..25).prop_map(
        |rows| {
            rows.into_iter()
                .enumerate()
                .map(|(index, (discussion_id, create_by, vote_up, created))| Comment {
                    id: index as i64 + 1,
                    discussion_id,
                    content: format!("generated {index}"),
                    create_by,
                    create_date: day(created),
                    vote_up,
                    vote_down: 0,
                })
                .collect()
        },
    )
}

/// Strategy for an inclusive integer range, bounds in either order
pub fn vote_range_strategy() -> impl Strategy<Value = (i64, i64)> {
    (0i64..20, 0i64..20)
}

pub fn context_with(comments: &[Comment]) -> MemoryContext {
    let mut context = MemoryContext::new();
    for comment in comments {
        context.insert_model(comment).unwrap();
    }
    context
}
