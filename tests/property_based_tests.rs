mod common;

use common::strategies::*;
use forum_core::models::Comment;
use forum_core::query::{FilterSpec, QueryExecutor, QuerySpec};
use proptest::prelude::*;
use std::collections::BTreeSet;

fn id_set(comments: &[Comment]) -> BTreeSet<i64> {
    comments.iter().map(|comment| comment.id).collect()
}

fn spec_with(filters: Vec<FilterSpec>) -> QuerySpec<Comment> {
    QuerySpec::<Comment>::for_entity()
        .filters(filters)
        .order_asc("id")
        .build()
        .unwrap()
}

proptest! {
    /// Property: EQ and NE are disjoint and together cover every row
    #[test]
    fn eq_and_ne_partition_rows(comments in comments_strategy(), author in author_strategy()) {
        let executor = QueryExecutor::new(context_with(&comments));
        let eq = tokio_test::block_on(executor.find(&spec_with(vec![FilterSpec::eq("create_by", author.as_str()).unwrap()]))).unwrap();
        let ne = tokio_test::block_on(executor.find(&spec_with(vec![FilterSpec::ne("create_by", author.as_str()).unwrap()]))).unwrap();

        let (eq, ne) = (id_set(&eq), id_set(&ne));
        prop_assert!(eq.is_disjoint(&ne));
        prop_assert_eq!(eq.len() + ne.len(), comments.len());
    }

    /// Property: BETWEEN equals GTE AND LTE, NOT_BETWEEN is its complement
    #[test]
    fn between_matches_bounds(comments in comments_strategy(), (low, high) in vote_range_strategy()) {
        let executor = QueryExecutor::new(context_with(&comments));
        let between = tokio_test::block_on(executor.find(&spec_with(vec![FilterSpec::between("vote_up", low, high).unwrap()]))).unwrap();
        let bounded = tokio_test::block_on(executor.find(&spec_with(vec![
            FilterSpec::gte("vote_up", low).unwrap(),
            FilterSpec::lte("vote_up", high).unwrap(),
        ]))).unwrap();
        let outside = tokio_test::block_on(executor.find(&spec_with(vec![FilterSpec::not_between("vote_up", low, high).unwrap()]))).unwrap();

        prop_assert_eq!(id_set(&between), id_set(&bounded));
        prop_assert!(id_set(&between).is_disjoint(&id_set(&outside)));
        prop_assert_eq!(between.len() + outside.len(), comments.len());
    }

    /// Property: IN and NOT_IN over the same list partition the rows
    #[test]
    fn in_and_not_in_partition_rows(
        comments in comments_strategy(),
        authors in prop::collection::vec(author_strategy(), 0..3),
    ) {
        let executor = QueryExecutor::new(context_with(&comments));
        let inside = tokio_test::block_on(executor.find(&spec_with(vec![FilterSpec::is_in("create_by", authors.clone()).unwrap()]))).unwrap();
        let outside = tokio_test::block_on(executor.find(&spec_with(vec![FilterSpec::not_in("create_by", authors).unwrap()]))).unwrap();

        prop_assert!(id_set(&inside).is_disjoint(&id_set(&outside)));
        prop_assert_eq!(inside.len() + outside.len(), comments.len());
    }

    /// Property: count equals the unpaginated find, exists equals count > 0
    #[test]
    fn count_and_exists_agree_with_find(
        comments in comments_strategy(),
        author in author_strategy(),
        start in 0u32..5,
        limit in 1u32..5,
    ) {
        let executor = QueryExecutor::new(context_with(&comments));
        let spec = QuerySpec::<Comment>::for_entity()
            .filter(FilterSpec::eq("create_by", author.as_str()).unwrap())
            .order_desc("create_date")
            .start_index(start)
            .max_result(limit)
            .build()
            .unwrap();

        let page = tokio_test::block_on(executor.find(&spec)).unwrap();
        let everything = tokio_test::block_on(executor.find(&spec.without_pagination())).unwrap();
        let count = tokio_test::block_on(executor.count(&spec)).unwrap();
        let exists = tokio_test::block_on(executor.exists(&spec)).unwrap();

        prop_assert!(page.len() <= limit as usize);
        prop_assert_eq!(count, everything.len() as i64);
        prop_assert_eq!(exists, count > 0);
    }

    /// Property: find_optional returns the first row of find, honoring the start index
    #[test]
    fn find_optional_is_first_of_find(comments in comments_strategy(), start in 0u32..5) {
        let executor = QueryExecutor::new(context_with(&comments));
        let spec = QuerySpec::<Comment>::for_entity()
            .order_asc("vote_up")
            .order_asc("id")
            .start_index(start)
            .build()
            .unwrap();

        let rows = tokio_test::block_on(executor.find(&spec)).unwrap();
        let first = tokio_test::block_on(executor.find_optional(&spec)).unwrap();
        prop_assert_eq!(first.as_ref(), rows.first());
    }

    /// Property: an invalid filter never changes the result of the valid ones
    #[test]
    fn invalid_filters_are_ignored(comments in comments_strategy(), author in author_strategy()) {
        let executor = QueryExecutor::new(context_with(&comments));
        let valid = FilterSpec::eq("create_by", author.as_str()).unwrap();
        let invalid = FilterSpec::gt("vote_up", "many").unwrap();

        let clean = tokio_test::block_on(executor.find(&spec_with(vec![valid.clone()]))).unwrap();
        let mixed = tokio_test::block_on(executor.find(&spec_with(vec![invalid, valid]))).unwrap();
        prop_assert_eq!(clean, mixed);
    }
}
