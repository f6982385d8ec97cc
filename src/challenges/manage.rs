use axum::{
    extract::{Form, Path},
    response::Redirect,
};
use hypertext::prelude::*;
use serde::Deserialize;

use crate::{
    categories::Category,
    challenges::Challenge,
    permission::Admin,
    state::Conn,
    template::Page,
    util_resp::{StandardResponse, bad_request, see_other_ok, success},
    widgets::alert::ErrorAlert,
};

#[derive(Deserialize)]
pub struct SwitchChallengeForm {
    #[serde(default)]
    challenge_id: String,
}

pub async fn do_switch_challenge(
    Admin(user): Admin,
    mut conn: Conn,
    Form(form): Form<SwitchChallengeForm>,
) -> StandardResponse {
    if form.challenge_id.is_empty() {
        return bad_request(
            Page::new()
                .user(user)
                .body(maud! {
                    div class="container py-5" {
                        ErrorAlert msg="Missing challenge_id";
                    }
                })
                .render(),
        );
    }

    Challenge::set_active(&form.challenge_id, &mut *conn)?;
    tracing::info!(
        admin = %user.email,
        challenge_id = %form.challenge_id,
        "challenge activated"
    );

    see_other_ok(Redirect::to("/admin"))
}

pub async fn create_challenge_page(Admin(user): Admin) -> StandardResponse {
    success(
        Page::new()
            .user(user)
            .body(maud! {
                div class="container py-5" style="max-width: 720px;" {
                    h1 { "New challenge" }
                    form method="post" {
                        div class="mb-3" {
                            label for="number" class="form-label" { "Number" }
                            input type="number" class="form-control" id="number" name="number" min="1" required;
                        }
                        div class="mb-3" {
                            label for="title" class="form-label" { "Title" }
                            input type="text" class="form-control" id="title" name="title" maxlength="120" required;
                        }
                        div class="mb-3" {
                            label for="description" class="form-label" { "Description" }
                            textarea class="form-control" id="description" name="description" rows="4" {}
                        }
                        button type="submit" class="btn btn-primary" { "Create" }
                    }
                }
            })
            .render(),
    )
}

#[derive(Deserialize)]
pub struct CreateChallengeForm {
    number: i64,
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
}

pub async fn do_create_challenge(
    Admin(user): Admin,
    mut conn: Conn,
    Form(form): Form<CreateChallengeForm>,
) -> StandardResponse {
    let title = form.title.trim();
    if title.is_empty() || form.number < 1 {
        return bad_request(
            Page::new()
                .user(user)
                .body(maud! {
                    div class="container py-5" {
                        ErrorAlert msg="A challenge needs a positive number and a title.";
                    }
                })
                .render(),
        );
    }

    let challenge = Challenge::create(
        form.number,
        title,
        form.description.trim(),
        &mut *conn,
    )?;
    tracing::info!(challenge_id = %challenge.id, "challenge created");

    see_other_ok(Redirect::to("/admin"))
}

#[derive(Deserialize)]
pub struct CreateCategoryForm {
    #[serde(default)]
    name: String,
}

pub async fn do_create_category(
    Path(challenge_id): Path<String>,
    Admin(user): Admin,
    mut conn: Conn,
    Form(form): Form<CreateCategoryForm>,
) -> StandardResponse {
    let challenge = Challenge::fetch(&challenge_id, &mut *conn)?;

    let name = form.name.trim();
    if name.is_empty() {
        return bad_request(
            Page::new()
                .user(user)
                .body(maud! {
                    div class="container py-5" {
                        ErrorAlert msg="An entry needs a name.";
                    }
                })
                .render(),
        );
    }

    let category = Category::create(name, &challenge.id, &mut *conn)?;
    tracing::info!(
        category_id = %category.id,
        challenge_id = %challenge.id,
        "category created"
    );

    see_other_ok(Redirect::to("/admin"))
}
