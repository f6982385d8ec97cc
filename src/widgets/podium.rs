use hypertext::prelude::*;

use crate::results::tally::TallyResult;

/// The three best placed entries, winner in the middle.
pub struct Podium<'r> {
    pub results: &'r [TallyResult],
}

fn place(position: usize) -> String {
    let suffix = match (position % 10, position % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{position}{suffix} place")
}

impl Renderable for Podium<'_> {
    fn render_to(
        &self,
        buffer: &mut hypertext::Buffer<hypertext::context::Node>,
    ) {
        // display order: 2nd, 1st, 3rd
        let top: Vec<&TallyResult> = self.results.iter().take(3).collect();
        let arranged: Vec<&TallyResult> = [1, 0, 2]
            .into_iter()
            .filter_map(|i| top.get(i).copied())
            .collect();

        maud! {
            div class="row g-4 mb-5 align-items-end" {
                @for result in &arranged {
                    div class="col-md-4" {
                        div class=(if result.position == 1 { "card text-center border-warning shadow" } else { "card text-center" }) {
                            div class="card-body" {
                                p class="text-muted mb-1" { (place(result.position)) }
                                h3 class="card-title" { (result.category_name) }
                                p class="display-6 fw-bold mb-0" {
                                    (result.best_votes)
                                    @if result.best_votes == 1 { " vote" } @else { " votes" }
                                }
                            }
                        }
                    }
                }
            }
        }
        .render_to(buffer);
    }
}

#[cfg(test)]
mod tests {
    use hypertext::prelude::*;

    use super::{Podium, place};
    use crate::results::tally::TallyResult;

    fn result(name: &str, best_votes: u32, position: usize) -> TallyResult {
        TallyResult {
            category_id: name.to_lowercase(),
            category_name: name.to_string(),
            best_votes,
            nice_votes: 0,
            total_points: best_votes,
            position,
            submitted_by: None,
        }
    }

    #[test]
    fn places_have_ordinal_suffixes() {
        assert_eq!(place(1), "1st place");
        assert_eq!(place(2), "2nd place");
        assert_eq!(place(3), "3rd place");
        assert_eq!(place(4), "4th place");
        assert_eq!(place(11), "11th place");
        assert_eq!(place(22), "22nd place");
    }

    #[test]
    fn tied_entries_share_their_place() {
        let results = [
            result("Alpha", 2, 1),
            result("Bravo", 2, 1),
            result("Charlie", 1, 3),
        ];
        let html = Podium { results: &results }.render().into_inner();

        assert_eq!(html.matches("1st place").count(), 2);
        assert!(!html.contains("2nd place"));
        assert_eq!(html.matches("3rd place").count(), 1);
        assert_eq!(html.matches("border-warning").count(), 2);
    }
}
