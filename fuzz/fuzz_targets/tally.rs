//! Feeds arbitrary votes into the tally and checks the ranking invariants.

#![no_main]

use std::collections::HashSet;

use arbitrary::Arbitrary;
use chrono::NaiveDateTime;
use libfuzzer_sys::fuzz_target;
use tunevote::{
    categories::Category, results::tally::compute_ranking, votes::Vote,
};

/// Category ids are drawn from a small alphabet so that votes hit known
/// categories, unknown ones and duplicates alike.
#[derive(Arbitrary, Debug)]
struct Input {
    categories: Vec<u8>,
    votes: Vec<(u8, u8, u8, bool)>,
}

fn id(n: u8) -> String {
    format!("c{}", n % 16)
}

fuzz_target!(|input: Input| {
    let categories: Vec<Category> = input
        .categories
        .iter()
        .map(|&n| Category {
            id: id(n),
            name: format!("Song {n}"),
            challenge_id: None,
            created_at: NaiveDateTime::default(),
        })
        .collect();
    let votes: Vec<Vote> = input
        .votes
        .iter()
        .enumerate()
        .map(|(i, &(best, nice, own, named))| Vote {
            id: i.to_string(),
            user_email: format!("{i}@example.com"),
            user_name: if named { format!("voter {i}") } else { String::new() },
            best_category_id: id(best),
            nice_category_id: id(nice),
            own_category_id: id(own),
            created_at: NaiveDateTime::default(),
        })
        .collect();

    let results = compute_ranking(&votes, &categories);

    let known: HashSet<&str> =
        categories.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(results.len(), known.len());

    let counted = votes
        .iter()
        .filter(|v| known.contains(v.best_category_id.as_str()))
        .count();
    let best: u32 = results.iter().map(|r| r.best_votes).sum();
    assert_eq!(best as usize, counted);

    for result in &results {
        assert_eq!(result.total_points, result.best_votes);
        let ahead = results
            .iter()
            .filter(|r| r.best_votes > result.best_votes)
            .count();
        assert_eq!(result.position, ahead + 1);
    }
    for pair in results.windows(2) {
        assert!(pair[0].best_votes >= pair[1].best_votes);
    }
});
