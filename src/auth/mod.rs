use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{
    PrivateCookieJar,
    cookie::{Cookie, Key, SameSite},
};
use chrono::{Days, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::AppConfig;

pub mod login;

pub const LOGIN_COOKIE: &str = "tunevote_session";

/// Somebody who has followed a sign-in link. Identity is just the email
/// address the link was sent to.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct User {
    pub email: String,
    pub is_admin: bool,
}

#[derive(Debug)]
pub enum AuthError {
    CookieMissingOrMalformed,
    Unauthorized,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        tracing::debug!("auth rejected: {self:?}");
        Redirect::to("/login").into_response()
    }
}

#[derive(Serialize, Deserialize)]
pub struct LoginSession {
    email: String,
    expiry: NaiveDateTime,
}

#[async_trait]
impl<S> FromRequestParts<S> for User
where
    S: Send + Sync,
    Key: FromRef<S>,
    Arc<AppConfig>: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> Result<Self, Self::Rejection> {
        let jar: PrivateCookieJar<Key> =
            PrivateCookieJar::from_request_parts(parts, state)
                .await
                .map_err(|_| AuthError::CookieMissingOrMalformed)?;

        let login_cookie = match jar.get(LOGIN_COOKIE) {
            Some(cookie) => cookie,
            None => return Err(AuthError::Unauthorized),
        };

        let login: LoginSession =
            match serde_json::from_str::<LoginSession>(login_cookie.value()) {
                Ok(t) if Utc::now().naive_utc() < t.expiry => t,
                _ => return Err(AuthError::Unauthorized),
            };

        let config = Arc::<AppConfig>::from_ref(state);
        Ok(User {
            is_admin: config.is_admin(&login.email),
            email: login.email,
        })
    }
}

pub fn set_login_cookie(
    email: String,
    jar: PrivateCookieJar,
) -> Result<PrivateCookieJar, serde_json::Error> {
    let expiry = Utc::now()
        .naive_utc()
        .checked_add_days(Days::new(7))
        .unwrap_or(NaiveDateTime::MAX);

    let value = serde_json::to_string(&LoginSession { email, expiry })?;

    Ok(jar.add(
        Cookie::build((LOGIN_COOKIE, value))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax),
    ))
}

pub fn remove_login_cookie(jar: PrivateCookieJar) -> PrivateCookieJar {
    jar.remove(Cookie::build(LOGIN_COOKIE).path("/"))
}
