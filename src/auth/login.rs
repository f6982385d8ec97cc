//! Passwordless sign-in. Submitting an email address issues a single-use
//! link; following the link sets the session cookie.

use std::sync::Arc;

use axum::{
    extract::{Form, Query, State},
    response::Redirect,
};
use axum_extra::extract::PrivateCookieJar;
use chrono::{Duration, NaiveDateTime, Utc};
use diesel::prelude::*;
use hypertext::prelude::*;
use rand::{Rng, distr::Alphanumeric};
use serde::Deserialize;
use url::Url;
use uuid::Uuid;

use crate::{
    auth::{User, remove_login_cookie, set_login_cookie},
    config::AppConfig,
    schema::login_tokens,
    state::Conn,
    template::Page,
    util_resp::{FailureResponse, StandardResponse, bad_request, success},
    validation::is_valid_email,
    widgets::alert::ErrorAlert,
};

const TOKEN_LEN: usize = 43;

/// Delivers sign-in links. Delivery itself (mail) happens outside this
/// crate.
pub trait LinkSender: Send + Sync {
    fn send(&self, email: &str, link: &Url);
}

/// Writes the link to the log.
pub struct LogLinkSender;

impl LinkSender for LogLinkSender {
    fn send(&self, email: &str, link: &Url) {
        tracing::info!(email, %link, "sign-in link issued");
    }
}

#[derive(Queryable, Debug)]
pub struct LoginToken {
    pub id: String,
    pub email: String,
    pub token: String,
    pub created_at: NaiveDateTime,
    pub expires_at: NaiveDateTime,
    pub used_at: Option<NaiveDateTime>,
}

#[derive(Deserialize)]
pub struct NextQuery {
    next: Option<String>,
}

pub async fn login_page(
    user: Option<User>,
    Query(query): Query<NextQuery>,
) -> StandardResponse {
    if let Some(user) = user {
        let email = user.email.clone();
        return success(
            Page::new()
                .body(maud! {
                    div class="container py-5" {
                        p { "You are signed in as " (email) "." }
                        form method="post" action="/logout" {
                            button type="submit" class="btn btn-outline-secondary" { "Sign out" }
                        }
                    }
                })
                .user(user)
                .render(),
        );
    }

    let action = match &query.next {
        Some(next) => format!(
            "/login?{}",
            serde_urlencoded::to_string([("next", next)])
                .unwrap_or_default()
        ),
        None => "/login".to_string(),
    };

    success(
        Page::new()
            .body(maud! {
                div class="container py-5" style="max-width: 480px;" {
                    h1 { "Sign in" }
                    p class="text-muted" {
                        "We will send you a link which signs you in. No password needed."
                    }
                    form method="post" action=(action) {
                        div class="mb-3" {
                            label for="email" class="form-label" { "Email address" }
                            input type="email" class="form-control" id="email" name="email" required;
                        }
                        button type="submit" class="btn btn-primary" { "Send link" }
                    }
                }
            })
            .render(),
    )
}

#[derive(Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    email: String,
}

pub async fn do_login(
    State(config): State<Arc<AppConfig>>,
    State(links): State<Arc<dyn LinkSender>>,
    mut conn: Conn,
    Query(query): Query<NextQuery>,
    Form(form): Form<LoginForm>,
) -> StandardResponse {
    let email = form.email.trim().to_lowercase();
    if let Err(e) = is_valid_email(&email) {
        tracing::warn!("sign-in requested for invalid email");
        return bad_request(
            Page::new()
                .body(maud! {
                    div class="container py-5" {
                        ErrorAlert msg=(format!("Could not send a link: {e}."));
                        a href="/login" { "Try again" }
                    }
                })
                .render(),
        );
    }

    let token: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LEN)
        .map(char::from)
        .collect();
    let now = Utc::now().naive_utc();

    diesel::insert_into(login_tokens::table)
        .values((
            login_tokens::id.eq(Uuid::now_v7().to_string()),
            login_tokens::email.eq(&email),
            login_tokens::token.eq(&token),
            login_tokens::created_at.eq(now),
            login_tokens::expires_at
                .eq(now + Duration::minutes(config.login_link_ttl_minutes)),
        ))
        .execute(&mut *conn)?;

    let mut link = config.public_url.join("/auth/callback").map_err(|e| {
        tracing::error!("could not build sign-in link: {e}");
        FailureResponse::ServerError(())
    })?;
    link.query_pairs_mut().append_pair("token", &token);
    if let Some(next) = &query.next {
        link.query_pairs_mut().append_pair("next", next);
    }

    links.send(&email, &link);

    success(
        Page::new()
            .body(maud! {
                div class="container py-5" {
                    h1 { "Check your inbox" }
                    p {
                        "If " (email) " can receive mail, a sign-in link is on its way."
                    }
                    @if config.show_login_links {
                        p {
                            a href=(link.as_str()) id="login-link" { "Sign in" }
                        }
                    }
                }
            })
            .render(),
    )
}

#[derive(Deserialize)]
pub struct CallbackQuery {
    token: String,
    next: Option<String>,
}

pub async fn auth_callback(
    State(config): State<Arc<AppConfig>>,
    mut conn: Conn,
    jar: PrivateCookieJar,
    Query(query): Query<CallbackQuery>,
) -> Result<(PrivateCookieJar, Redirect), FailureResponse> {
    let now = Utc::now().naive_utc();

    let login = login_tokens::table
        .filter(login_tokens::token.eq(&query.token))
        .filter(login_tokens::used_at.is_null())
        .filter(login_tokens::expires_at.gt(now))
        .first::<LoginToken>(&mut *conn)
        .optional()?;

    let login = match login {
        Some(login) => login,
        None => {
            tracing::warn!("sign-in attempted with an unknown or stale token");
            return Err(FailureResponse::BadRequest(
                Page::new()
                    .body(maud! {
                        div class="container py-5" {
                            ErrorAlert msg="This sign-in link is invalid or has expired.";
                            a href="/login" { "Request a new link" }
                        }
                    })
                    .render(),
            ));
        }
    };

    diesel::update(login_tokens::table.filter(login_tokens::id.eq(&login.id)))
        .set(login_tokens::used_at.eq(Some(now)))
        .execute(&mut *conn)?;

    tracing::info!(email = %login.email, "signed in");

    let jar = set_login_cookie(login.email, jar).map_err(|e| {
        tracing::error!("could not encode session: {e}");
        FailureResponse::ServerError(())
    })?;

    Ok((
        jar,
        Redirect::to(&redirect_target(
            query.next.as_deref(),
            &config.public_url,
        )),
    ))
}

pub async fn do_logout(jar: PrivateCookieJar) -> (PrivateCookieJar, Redirect) {
    (remove_login_cookie(jar), Redirect::to("/"))
}

/// Only paths on this site are followed after signing in.
fn redirect_target(next: Option<&str>, base: &Url) -> String {
    next.and_then(|next| base.join(next).ok())
        .filter(|url| url.origin() == base.origin())
        .map(|url| url.path().to_string())
        .unwrap_or_else(|| "/".to_string())
}

#[cfg(test)]
mod tests {
    use url::Url;

    use super::redirect_target;

    #[test]
    fn redirects_stay_on_site() {
        let base = Url::parse("http://localhost:8000").unwrap();
        assert_eq!(redirect_target(Some("/vote"), &base), "/vote");
        assert_eq!(redirect_target(Some("https://evil.test/x"), &base), "/");
        assert_eq!(redirect_target(Some("//evil.test/x"), &base), "/");
        assert_eq!(redirect_target(None, &base), "/");
    }
}
