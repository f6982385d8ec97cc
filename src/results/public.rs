use hypertext::prelude::*;

use crate::{
    auth::User,
    results::{Ranking, RankingTable},
    settings::results_public,
    state::Conn,
    template::Page,
    util_resp::{StandardResponse, forbidden, success},
    widgets::{non_public::NonPublic, podium::Podium},
};

pub async fn public_results_page(
    user: Option<User>,
    mut conn: Conn,
) -> StandardResponse {
    let is_admin = user.as_ref().is_some_and(|u| u.is_admin);
    let public = results_public(&mut *conn)?;

    if !public && !is_admin {
        return forbidden(
            Page::new_full()
                .user_opt(user)
                .extra_head(maud! {
                    meta http-equiv="refresh" content="30";
                })
                .body(maud! {
                    div class="container py-5 text-center" {
                        h1 { "Results are not available yet" }
                        p class="lead text-muted" {
                            "The results will appear here once voting has closed."
                        }
                    }
                })
                .render(),
        );
    }

    let ranking = Ranking::of_active_challenge(&mut *conn)?;

    success(
        Page::new()
            .user_opt(user)
            .body(maud! {
                div class="container py-5" {
                    h1 { "Results" }
                    @if public {
                        (Tally { ranking: &ranking })
                    } @else {
                        (NonPublic {
                            child: Tally { ranking: &ranking },
                            title: "Results",
                        })
                    }
                }
            })
            .render(),
    )
}

/// Vote count, podium and full table of a ranking.
struct Tally<'r> {
    ranking: &'r Ranking,
}

impl Renderable for Tally<'_> {
    fn render_to(
        &self,
        buffer: &mut hypertext::Buffer<hypertext::context::Node>,
    ) {
        let total = self.ranking.total_votes;
        maud! {
            p class="lead" {
                (total)
                @if total == 1 { " vote" } @else { " votes" }
                " counted"
            }
            Podium results=(&self.ranking.results);
            RankingTable results=(&self.ranking.results);
        }
        .render_to(buffer);
    }
}
