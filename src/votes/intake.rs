//! Checks applied to a vote before it is stored.

use diesel::{connection::LoadConnection, sqlite::Sqlite};
use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    votes::{Vote, VoteCheckScope, has_voted},
};

/// A vote as submitted, before any checks have run.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct VoteSubmission {
    pub user_email: String,
    pub user_name: String,
    pub best_category_id: String,
    pub nice_category_id: String,
    pub own_category_id: String,
}

impl VoteSubmission {
    fn fields(&self) -> [&str; 5] {
        [
            &self.user_email,
            &self.user_name,
            &self.best_category_id,
            &self.nice_category_id,
            &self.own_category_id,
        ]
    }
}

/// Validates a submission, stopping at the first failed check:
///
/// 1. every field is present ([`Error::MissingFields`]; whitespace only
///    counts as missing)
/// 2. the three categories are pairwise distinct
///    ([`Error::DuplicateCategorySelection`])
/// 3. `already_voted` says no for the submitter's email
///    ([`Error::AlreadyVoted`])
///
/// `already_voted` is only called once the first two checks pass.
pub fn check_submission(
    submission: &VoteSubmission,
    already_voted: impl FnOnce(&str) -> Result<bool>,
) -> Result<()> {
    if submission.fields().iter().any(|f| f.trim().is_empty()) {
        return Err(Error::MissingFields);
    }

    let best = &submission.best_category_id;
    let nice = &submission.nice_category_id;
    let own = &submission.own_category_id;
    if best == nice || best == own || nice == own {
        return Err(Error::DuplicateCategorySelection);
    }

    if already_voted(submission.user_email.trim())? {
        return Err(Error::AlreadyVoted);
    }

    Ok(())
}

/// Runs [`check_submission`] against the store and records the vote. Store
/// failures surface as [`Error::Persistence`] and are not retried.
#[tracing::instrument(skip_all, fields(email = %submission.user_email))]
pub fn submit_vote(
    submission: &VoteSubmission,
    scope: VoteCheckScope,
    conn: &mut impl LoadConnection<Backend = Sqlite>,
) -> Result<Vote> {
    if let Err(e) =
        check_submission(submission, |email| has_voted(email, scope, conn))
    {
        match &e {
            Error::Persistence(inner) => {
                tracing::error!("could not check for an earlier vote: {inner}")
            }
            _ => tracing::warn!("vote rejected: {e}"),
        }
        return Err(e);
    }

    let vote = Vote::insert(submission, conn)?;
    tracing::info!(vote_id = %vote.id, "vote recorded");
    Ok(vote)
}
