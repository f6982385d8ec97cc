use std::sync::Arc;

use axum::extract::{Form, State};
use hypertext::prelude::*;
use serde::Deserialize;

use crate::{
    auth::User,
    categories::Category,
    challenges::Challenge,
    config::AppConfig,
    state::Conn,
    template::Page,
    util_resp::{StandardResponse, bad_request, err_not_found, success},
    votes::{
        VoteCheckScope, has_voted,
        intake::{VoteSubmission, submit_vote},
    },
    widgets::alert::{ErrorAlert, SuccessAlert},
};

pub async fn vote_page(user: User, mut conn: Conn) -> StandardResponse {
    let challenge = Challenge::require_active(&mut *conn)?;
    let categories = Category::of_challenge(&challenge.id, &mut *conn)?;
    if categories.is_empty() {
        return err_not_found();
    }

    let voted =
        has_voted(&user.email, VoteCheckScope::ActiveChallenge, &mut *conn)?;

    let picks = [
        ("best_category_id", "Best song"),
        ("nice_category_id", "Also nice"),
        ("own_category_id", "Your own entry"),
    ];

    success(
        Page::new()
            .user(user)
            .body(maud! {
                div class="container py-5" style="max-width: 720px;" {
                    h1 { "Vote: " (challenge.title) }
                    @if voted {
                        SuccessAlert msg="You have already voted in this challenge. Thanks!";
                    } @else {
                        form method="post" {
                            div class="mb-3" {
                                label for="user_name" class="form-label" { "Your name" }
                                input type="text" class="form-control" id="user_name" name="user_name" required;
                            }
                            @for &(field, label) in &picks {
                                div class="mb-3" {
                                    label for=(field) class="form-label" { (label) }
                                    select class="form-select" id=(field) name=(field) required {
                                        option value="" { "Choose..." }
                                        @for category in &categories {
                                            option value=(category.id) { (category.name) }
                                        }
                                    }
                                }
                            }
                            button type="submit" class="btn btn-primary" { "Submit vote" }
                        }
                    }
                }
            })
            .render(),
    )
}

#[derive(Deserialize, Debug)]
pub struct VoteForm {
    #[serde(default)]
    user_name: String,
    #[serde(default)]
    best_category_id: String,
    #[serde(default)]
    nice_category_id: String,
    #[serde(default)]
    own_category_id: String,
}

pub async fn do_submit_vote(
    user: User,
    State(config): State<Arc<AppConfig>>,
    mut conn: Conn,
    Form(form): Form<VoteForm>,
) -> StandardResponse {
    let submission = VoteSubmission {
        user_email: user.email.clone(),
        user_name: form.user_name,
        best_category_id: form.best_category_id,
        nice_category_id: form.nice_category_id,
        own_category_id: form.own_category_id,
    };

    match submit_vote(
        &submission,
        VoteCheckScope::for_intake(&config),
        &mut *conn,
    ) {
        Ok(_) => success(
            Page::new()
                .user(user)
                .body(maud! {
                    div class="container py-5" {
                        SuccessAlert msg="Your vote has been recorded.";
                        a href="/" class="btn btn-primary" { "Back home" }
                    }
                })
                .render(),
        ),
        Err(e) if e.is_validation() => {
            let msg = e.to_string();
            bad_request(
                Page::new()
                    .user(user)
                    .body(maud! {
                        div class="container py-5" {
                            ErrorAlert msg=(&msg);
                            a href="/vote" class="btn btn-outline-primary" { "Try again" }
                        }
                    })
                    .render(),
            )
        }
        Err(e) => Err(e.into()),
    }
}
