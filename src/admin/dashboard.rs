use std::collections::HashMap;

use hypertext::prelude::*;

use crate::{
    categories::Category,
    challenges::Challenge,
    permission::Admin,
    results::{Ranking, RankingTable},
    settings::results_public,
    state::Conn,
    template::Page,
    util_resp::{StandardResponse, success},
    votes::{Vote, active_category_ids},
};

pub async fn admin_dashboard(
    Admin(user): Admin,
    mut conn: Conn,
) -> StandardResponse {
    let challenges = Challenge::all(&mut *conn)?;
    let categories = Category::all(&mut *conn)?;
    let public = results_public(&mut *conn)?;
    let ranking = Ranking::of_active_challenge(&mut *conn)?;
    let active_ids = active_category_ids(&mut *conn)?;
    let votes = Vote::for_categories(&active_ids, &mut *conn)?;

    let names: HashMap<&str, &str> = categories
        .iter()
        .map(|c| (c.id.as_str(), c.name.as_str()))
        .collect();
    let name_of = |id: &str| {
        names.get(id).copied().unwrap_or("(unknown)").to_string()
    };
    let rows: Vec<VoteRow> = votes
        .into_iter()
        .map(|vote| VoteRow {
            when: vote.created_at.format("%Y-%m-%d %H:%M").to_string(),
            best: name_of(&vote.best_category_id),
            nice: name_of(&vote.nice_category_id),
            own: name_of(&vote.own_category_id),
            vote,
        })
        .collect();

    success(
        Page::new()
            .user(user)
            .body(maud! {
                div class="container py-5" {
                    h1 { "Admin" }

                    div class="card mb-4" {
                        div class="card-body d-flex align-items-center justify-content-between" {
                            div {
                                h5 class="card-title mb-0" { "Results visibility" }
                                p class="text-muted mb-0" {
                                    @if public { "Results are public." } @else { "Results are only visible to admins." }
                                }
                            }
                            form method="post" action="/admin/settings" {
                                input type="hidden" name="results_public" value=(if public { "false" } else { "true" });
                                button type="submit" class=(if public { "btn btn-outline-danger" } else { "btn btn-success" }) {
                                    @if public { "Hide results" } @else { "Publish results" }
                                }
                            }
                        }
                    }

                    div class="d-flex justify-content-between align-items-center" {
                        h2 class="h4" { "Challenges" }
                        a href="/admin/challenges/create" class="btn btn-sm btn-primary" { "New challenge" }
                    }
                    @if challenges.is_empty() {
                        p class="text-muted" { "No challenges yet." }
                    }
                    @for challenge in &challenges {
                        div class=(if challenge.is_active { "card mb-3 border-primary" } else { "card mb-3" }) {
                            div class="card-body" {
                                div class="d-flex justify-content-between align-items-start" {
                                    div {
                                        h5 class="card-title" {
                                            "#" (challenge.number) " " (challenge.title)
                                            @if challenge.is_active {
                                                " " span class="badge text-bg-primary" { "active" }
                                            }
                                        }
                                        p class="card-text text-muted" { (challenge.description) }
                                    }
                                    @if !challenge.is_active {
                                        form method="post" action="/admin/challenge"
                                            onsubmit="return confirm('Switch the active challenge?');" {
                                            input type="hidden" name="challenge_id" value=(challenge.id);
                                            button type="submit" class="btn btn-sm btn-outline-primary" { "Make active" }
                                        }
                                    }
                                }
                                ul class="mb-2" {
                                    @for category in categories.iter().filter(|c| c.challenge_id.as_deref() == Some(challenge.id.as_str())) {
                                        li { (category.name) }
                                    }
                                }
                                form method="post" action=(format!("/admin/challenges/{}/categories", challenge.id)) class="d-flex gap-2" {
                                    input type="text" name="name" class="form-control form-control-sm" placeholder="Song name" required;
                                    button type="submit" class="btn btn-sm btn-outline-secondary" { "Add" }
                                }
                            }
                        }
                    }

                    h2 class="h4 mt-4" { "Ranking (" (ranking.total_votes) " votes)" }
                    RankingTable results=(&ranking.results);

                    h2 class="h4 mt-4" { "Votes in this challenge" }
                    @if rows.is_empty() {
                        p class="text-muted" { "No votes yet." }
                    }
                    table class="table table-sm" {
                        thead {
                            tr {
                                th scope="col" { "When" }
                                th scope="col" { "Name" }
                                th scope="col" { "Email" }
                                th scope="col" { "Best" }
                                th scope="col" { "Nice" }
                                th scope="col" { "Own" }
                            }
                        }
                        tbody {
                            @for row in &rows {
                                tr {
                                    td { (row.when) }
                                    td { (row.vote.user_name) }
                                    td { (row.vote.user_email) }
                                    td { (row.best) }
                                    td { (row.nice) }
                                    td { (row.own) }
                                }
                            }
                        }
                    }
                }
            })
            .render(),
    )
}

/// A vote of the active challenge with its picks resolved to names.
struct VoteRow {
    vote: Vote,
    when: String,
    best: String,
    nice: String,
    own: String,
}
