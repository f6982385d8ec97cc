//! JSON views of the same data the pages show.

use axum::{Json, extract::Query};
use serde::{Deserialize, Serialize};

use crate::{
    auth::User,
    categories::Category,
    challenges::Challenge,
    results::Ranking,
    settings::results_public,
    state::Conn,
    util_resp::FailureResponse,
    votes::{VoteCheckScope, VotingStatus, has_voted},
};

type ApiResult<T> = Result<Json<T>, FailureResponse>;

pub async fn list_challenges(mut conn: Conn) -> ApiResult<Vec<Challenge>> {
    Ok(Json(Challenge::all(&mut *conn)?))
}

pub async fn active_challenge(mut conn: Conn) -> ApiResult<Challenge> {
    Ok(Json(Challenge::require_active(&mut *conn)?))
}

#[derive(Deserialize)]
pub struct CategoriesQuery {
    challenge_id: Option<String>,
}

/// Categories of the requested challenge, else of the active one, else all
/// of them.
pub async fn list_categories(
    mut conn: Conn,
    Query(query): Query<CategoriesQuery>,
) -> ApiResult<Vec<Category>> {
    let challenge_id = match query.challenge_id.filter(|id| !id.is_empty()) {
        Some(id) => Some(id),
        None => Challenge::get_active(&mut *conn)?.map(|c| c.id),
    };

    Ok(Json(match challenge_id {
        Some(id) => Category::of_challenge(&id, &mut *conn)?,
        None => Category::all(&mut *conn)?,
    }))
}

#[derive(Deserialize)]
pub struct CheckVoteQuery {
    email: Option<String>,
}

#[derive(Serialize)]
pub struct CheckVoteResponse {
    #[serde(rename = "hasVoted")]
    has_voted: bool,
}

/// Never fails: a missing email or a store error both read as "has not
/// voted".
pub async fn check_vote(
    mut conn: Conn,
    Query(query): Query<CheckVoteQuery>,
) -> Json<CheckVoteResponse> {
    // emails are stored the way sign-in normalizes them
    let email = query.email.unwrap_or_default().trim().to_lowercase();
    if email.is_empty() {
        return Json(CheckVoteResponse { has_voted: false });
    }

    let voted = has_voted(&email, VoteCheckScope::ActiveChallenge, &mut *conn)
        .unwrap_or_else(|e| {
            tracing::error!("vote check failed: {e}");
            false
        });
    Json(CheckVoteResponse { has_voted: voted })
}

pub async fn voting_status(mut conn: Conn) -> ApiResult<VotingStatus> {
    Ok(Json(VotingStatus::of_active_challenge(&mut *conn)?))
}

#[derive(Serialize)]
pub struct SettingsResponse {
    results_public: bool,
}

pub async fn read_settings(mut conn: Conn) -> Json<SettingsResponse> {
    let public = results_public(&mut *conn).unwrap_or_else(|e| {
        tracing::error!("could not read settings: {e}");
        false
    });
    Json(SettingsResponse {
        results_public: public,
    })
}

pub async fn results(
    user: Option<User>,
    mut conn: Conn,
) -> ApiResult<Ranking> {
    let is_admin = user.is_some_and(|u| u.is_admin);
    if !is_admin && !results_public(&mut *conn)? {
        return Err(FailureResponse::Unauthorized(()));
    }

    Ok(Json(Ranking::of_active_challenge(&mut *conn)?))
}
