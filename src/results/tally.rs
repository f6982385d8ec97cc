//! Counting votes into a ranking.
//!
//! This is a pure function over rows which were already loaded; nothing in
//! here touches the database.

use std::cmp::Reverse;

use indexmap::IndexMap;
use serde::Serialize;

use crate::{categories::Category, votes::Vote};

/// The tally for one category.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct TallyResult {
    pub category_id: String,
    pub category_name: String,
    /// Number of votes picking this category as `best`.
    pub best_votes: u32,
    /// Number of votes picking this category as `nice`. Shown, but not
    /// scored.
    pub nice_votes: u32,
    /// Always equal to `best_votes`.
    pub total_points: u32,
    /// Competition ranking (1-based, ties share a position).
    pub position: usize,
    /// The name given by the first vote which claimed this category as its
    /// own.
    pub submitted_by: Option<String>,
}

impl TallyResult {
    fn empty(category: &Category) -> Self {
        Self {
            category_id: category.id.clone(),
            category_name: category.name.clone(),
            best_votes: 0,
            nice_votes: 0,
            total_points: 0,
            position: 0,
            submitted_by: None,
        }
    }
}

/// Tallies `votes` over `categories`.
///
/// Returns one result per distinct category id, sorted by `best_votes`
/// descending. The sort is stable, so tied categories stay in the order
/// they were passed in. References to categories which are not in
/// `categories` are ignored, and each of a vote's three picks is counted
/// independently.
pub fn compute_ranking(
    votes: &[Vote],
    categories: &[Category],
) -> Vec<TallyResult> {
    let mut tally: IndexMap<&str, TallyResult> = IndexMap::new();
    for category in categories {
        tally
            .entry(category.id.as_str())
            .or_insert_with(|| TallyResult::empty(category));
    }

    for vote in votes {
        if let Some(result) = tally.get_mut(vote.best_category_id.as_str()) {
            result.best_votes += 1;
            result.total_points += 1;
        }
        if let Some(result) = tally.get_mut(vote.nice_category_id.as_str()) {
            result.nice_votes += 1;
        }
        if let Some(result) = tally.get_mut(vote.own_category_id.as_str()) {
            let name = vote.user_name.trim();
            if result.submitted_by.is_none() && !name.is_empty() {
                result.submitted_by = Some(name.to_string());
            }
        }
    }

    let mut results: Vec<TallyResult> = tally.into_values().collect();
    results.sort_by_key(|result| Reverse(result.best_votes));

    // sorted descending, so everything with more votes comes earlier
    let mut position = 1;
    for i in 0..results.len() {
        if i > 0 && results[i].best_votes < results[i - 1].best_votes {
            position = i + 1;
        }
        results[i].position = position;
    }

    results
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDateTime;

    use super::{TallyResult, compute_ranking};
    use crate::{categories::Category, votes::Vote};

    fn category(id: &str) -> Category {
        Category {
            id: id.to_string(),
            name: format!("Song {id}"),
            challenge_id: Some("c1".to_string()),
            created_at: NaiveDateTime::default(),
        }
    }

    fn vote(name: &str, best: &str, nice: &str, own: &str) -> Vote {
        Vote {
            id: format!("{name}-{best}{nice}{own}"),
            user_email: format!("{name}@example.com"),
            user_name: name.to_string(),
            best_category_id: best.to_string(),
            nice_category_id: nice.to_string(),
            own_category_id: own.to_string(),
            created_at: NaiveDateTime::default(),
        }
    }

    fn counts(results: &[TallyResult]) -> Vec<(&str, u32, u32)> {
        results
            .iter()
            .map(|r| (r.category_id.as_str(), r.best_votes, r.nice_votes))
            .collect()
    }

    #[test]
    fn ranks_by_best_votes() {
        let categories = [category("A"), category("B"), category("C")];
        let votes = [
            vote("ana", "A", "B", "C"),
            vote("bob", "A", "C", "B"),
            vote("cat", "B", "A", "C"),
        ];

        let results = compute_ranking(&votes, &categories);
        assert_eq!(
            counts(&results),
            vec![("A", 2, 1), ("B", 1, 1), ("C", 0, 1)]
        );
        assert_eq!(
            results.iter().map(|r| r.position).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
        for result in &results {
            assert_eq!(result.total_points, result.best_votes);
        }
    }

    #[test]
    fn no_votes_gives_zeroed_results_in_input_order() {
        let results = compute_ranking(&[], &[category("A"), category("B")]);
        assert_eq!(counts(&results), vec![("A", 0, 0), ("B", 0, 0)]);
        assert!(results.iter().all(|r| r.position == 1));
        assert!(results.iter().all(|r| r.submitted_by.is_none()));
    }

    #[test]
    fn no_categories_gives_no_results() {
        let votes = [vote("ana", "A", "B", "C")];
        assert!(compute_ranking(&votes, &[]).is_empty());
    }

    #[test]
    fn unknown_categories_are_ignored() {
        let categories = [category("A"), category("B")];
        let votes = [
            vote("ana", "X", "A", "Y"),
            vote("bob", "B", "Z", "A"),
            vote("cat", "A", "B", "Q"),
        ];

        let results = compute_ranking(&votes, &categories);
        assert_eq!(results.len(), 2);
        let best: u32 = results.iter().map(|r| r.best_votes).sum();
        assert_eq!(best, 2);
        assert_eq!(counts(&results), vec![("A", 1, 1), ("B", 1, 1)]);
        assert_eq!(results[0].submitted_by.as_deref(), Some("bob"));
    }

    #[test]
    fn ties_keep_input_order_and_share_a_position() {
        let categories =
            [category("A"), category("B"), category("C"), category("D")];
        let votes = [
            vote("ana", "C", "A", "B"),
            vote("bob", "B", "A", "C"),
            vote("cat", "D", "A", "B"),
            vote("dan", "D", "A", "B"),
        ];

        let results = compute_ranking(&votes, &categories);
        let order: Vec<&str> =
            results.iter().map(|r| r.category_id.as_str()).collect();
        assert_eq!(order, vec!["D", "B", "C", "A"]);
        assert_eq!(
            results.iter().map(|r| r.position).collect::<Vec<_>>(),
            vec![1, 2, 2, 4]
        );
    }

    #[test]
    fn first_claim_of_ownership_wins() {
        let categories = [category("A"), category("B"), category("C")];
        let votes = [
            vote("", "A", "B", "C"),
            vote("ana", "A", "B", "C"),
            vote("bob", "B", "A", "C"),
        ];

        let results = compute_ranking(&votes, &categories);
        let c = results.iter().find(|r| r.category_id == "C").unwrap();
        assert_eq!(c.submitted_by.as_deref(), Some("ana"));
        let a = results.iter().find(|r| r.category_id == "A").unwrap();
        assert_eq!(a.submitted_by, None);
    }

    #[test]
    fn malformed_votes_count_each_pick() {
        let categories = [category("A"), category("B")];
        let votes = [vote("ana", "A", "A", "A")];

        let results = compute_ranking(&votes, &categories);
        assert_eq!(counts(&results), vec![("A", 1, 1), ("B", 0, 0)]);
        assert_eq!(results[0].submitted_by.as_deref(), Some("ana"));
    }

    #[test]
    fn duplicate_categories_keep_first_entry() {
        let mut renamed = category("A");
        renamed.name = "Other".to_string();
        let categories = [category("A"), category("B"), renamed];

        let results = compute_ranking(&[vote("ana", "A", "B", "B")], &categories);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].category_name, "Song A");
    }
}
