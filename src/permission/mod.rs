use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::Key;

use crate::{
    auth::User, config::AppConfig, error::Error, util_resp::FailureResponse,
};

/// A signed in user whose email is on the admin list.
///
/// Anonymous visitors are sent to the sign-in page; signed in users who are
/// not admins get a 403.
pub struct Admin(pub User);

#[async_trait]
impl<S> FromRequestParts<S> for Admin
where
    S: Send + Sync,
    Key: FromRef<S>,
    Arc<AppConfig>: FromRef<S>,
{
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> Result<Self, Self::Rejection> {
        let user = User::from_request_parts(parts, state)
            .await
            .map_err(IntoResponse::into_response)?;

        if !user.is_admin {
            tracing::warn!(email = %user.email, "non-admin tried an admin route");
            return Err(FailureResponse::from(Error::Unauthorized).into_response());
        }

        Ok(Admin(user))
    }
}
