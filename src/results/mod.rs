use diesel::{connection::LoadConnection, sqlite::Sqlite};
use hypertext::prelude::*;
use serde::Serialize;

use crate::{
    categories::Category,
    challenges::Challenge,
    error::Result,
    results::tally::{TallyResult, compute_ranking},
    votes::Vote,
};

pub mod public;
pub mod tally;

/// The tally of the active challenge.
#[derive(Serialize, Debug, Clone, Default)]
pub struct Ranking {
    pub results: Vec<TallyResult>,
    /// Votes whose `best` pick belongs to the active challenge.
    pub total_votes: usize,
}

impl Ranking {
    /// Recomputed from scratch on every call. Empty when no challenge is
    /// active.
    #[tracing::instrument(skip(conn))]
    pub fn of_active_challenge(
        conn: &mut impl LoadConnection<Backend = Sqlite>,
    ) -> Result<Self> {
        let challenge = match Challenge::get_active(conn)? {
            Some(challenge) => challenge,
            None => return Ok(Self::default()),
        };

        let categories = Category::of_challenge(&challenge.id, conn)?;
        let ids: Vec<String> =
            categories.iter().map(|c| c.id.clone()).collect();
        let votes = Vote::for_categories(&ids, conn)?;

        Ok(Self {
            results: compute_ranking(&votes, &categories),
            total_votes: votes.len(),
        })
    }
}

pub struct RankingTable<'r> {
    pub results: &'r [TallyResult],
}

impl Renderable for RankingTable<'_> {
    fn render_to(
        &self,
        buffer: &mut hypertext::Buffer<hypertext::context::Node>,
    ) {
        maud! {
            table class="table table-striped" {
                thead {
                    tr {
                        th scope="col" { "#" }
                        th scope="col" { "Song" }
                        th scope="col" { "Submitted by" }
                        th scope="col" { "Best votes" }
                        th scope="col" { "Nice votes" }
                    }
                }
                tbody {
                    @for result in self.results {
                        tr {
                            th scope="row" { (result.position) }
                            td { (result.category_name) }
                            td {
                                @if let Some(name) = &result.submitted_by {
                                    (name)
                                } @else {
                                    span class="text-muted" { "unknown" }
                                }
                            }
                            td { (result.best_votes) }
                            td { (result.nice_votes) }
                        }
                    }
                }
            }
        }
        .render_to(buffer);
    }
}
