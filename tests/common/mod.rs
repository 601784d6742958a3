//! Shared fixtures for the query engine integration tests

#![allow(dead_code)]

pub mod strategies;

use chrono::{DateTime, TimeZone, Utc};
use forum_core::database::{MemoryContext, Record};
use forum_core::models::{Comment, Discussion, Forum, Tag, User, Vote};
use forum_core::query::QueryExecutor;

/// Midnight UTC on the given day of January 2024
pub fn day(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap()
}

pub fn forum(id: i64, title: &str, description: Option<&str>) -> Forum {
    Forum {
        id,
        title: title.to_string(),
        description: description.map(str::to_string),
        create_by: "admin".to_string(),
        create_date: day(1),
        active: true,
    }
}

pub fn discussion(id: i64, forum_id: i64, title: &str) -> Discussion {
    Discussion {
        id,
        forum_id,
        title: title.to_string(),
        create_by: "alice".to_string(),
        create_date: day(2),
        closed: false,
        view_count: id * 10,
    }
}

pub fn comment(id: i64, discussion_id: i64, create_by: &str) -> Comment {
    Comment {
        id,
        discussion_id,
        content: format!("comment {id} by {create_by}"),
        create_by: create_by.to_string(),
        create_date: day(u32::try_from(id).unwrap() + 2),
        vote_up: id,
        vote_down: 0,
    }
}

pub fn tag(id: i64, label: &str) -> Tag {
    Tag {
        id,
        label: label.to_string(),
        disabled: false,
    }
}

/// Comments 1, 2 and 3 in discussions 10, 10 and 20 by alice, bob and alice
pub fn comment_scenario() -> MemoryContext {
    let mut context = MemoryContext::new();
    context.insert_model(&forum(1, "General", None)).unwrap();
    context.insert_model(&discussion(10, 1, "Welcome")).unwrap();
    context.insert_model(&discussion(20, 1, "Rules")).unwrap();
    for (id, discussion_id, author) in [(1, 10, "alice"), (2, 10, "bob"), (3, 20, "alice")] {
        context
            .insert_model(&comment(id, discussion_id, author))
            .unwrap();
    }
    context
}

/// Two forums, three discussions, tags, six comments and their votes
pub fn forum_fixture() -> MemoryContext {
    let mut context = MemoryContext::new();

    context
        .insert_model(&User {
            id: 1,
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            create_date: day(1),
        })
        .unwrap();

    context
        .insert_model(&forum(1, "Rust", Some("Systems programming")))
        .unwrap();
    context.insert_model(&forum(2, "Databases", None)).unwrap();
    context
        .insert_model(&forum(3, "Announcements", Some("News")))
        .unwrap();

    context.insert_model(&discussion(10, 1, "Ownership")).unwrap();
    context.insert_model(&discussion(11, 1, "Lifetimes")).unwrap();
    context.insert_model(&discussion(20, 2, "Indexes")).unwrap();

    context.insert_model(&tag(100, "beginner")).unwrap();
    context.insert_model(&tag(101, "advanced")).unwrap();
    for (discussion_id, tag_id) in [(10_i64, 100_i64), (11, 101), (20, 100), (20, 101)] {
        context.insert(
            "discussion_tags",
            Record::new()
                .with("discussion_id", discussion_id)
                .with("tag_id", tag_id),
        );
    }

    let comments = [
        (1, 10, "alice"),
        (2, 10, "bob"),
        (3, 11, "alice"),
        (4, 11, "carol"),
        (5, 20, "bob"),
        (6, 20, "alice"),
    ];
    for (id, discussion_id, author) in comments {
        context
            .insert_model(&comment(id, discussion_id, author))
            .unwrap();
    }

    for (id, comment_id, value) in [(1000, 1, 1), (1001, 1, 1), (1002, 5, -1)] {
        context
            .insert_model(&Vote {
                id,
                comment_id,
                vote_name: "helpful".to_string(),
                vote_value: value,
            })
            .unwrap();
    }

    context
}

pub fn executor(context: MemoryContext) -> QueryExecutor<MemoryContext> {
    QueryExecutor::new(context)
}

pub fn ids(comments: &[Comment]) -> Vec<i64> {
    comments.iter().map(|comment| comment.id).collect()
}
