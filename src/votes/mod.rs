use chrono::{NaiveDateTime, Utc};
use diesel::{
    connection::LoadConnection, dsl::exists, prelude::*, select,
    sqlite::Sqlite,
};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    categories::Category,
    challenges::Challenge,
    config::AppConfig,
    error::Result,
    schema::votes,
    votes::intake::VoteSubmission,
};

pub mod intake;
pub mod submit;

/// One submitter's three picks. Votes are never updated or deleted.
#[derive(Serialize, Deserialize, Queryable, Clone, Debug)]
pub struct Vote {
    pub id: String,
    pub user_email: String,
    pub user_name: String,
    pub best_category_id: String,
    pub nice_category_id: String,
    pub own_category_id: String,
    pub created_at: NaiveDateTime,
}

/// Which votes count when asking whether someone has already voted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteCheckScope {
    /// Any vote ever cast with this email.
    AllChallenges,
    /// Only votes whose `best` pick belongs to the active challenge.
    ActiveChallenge,
}

impl VoteCheckScope {
    /// The scope the vote intake applies.
    pub fn for_intake(config: &AppConfig) -> Self {
        if config.scope_vote_check_by_active_challenge {
            VoteCheckScope::ActiveChallenge
        } else {
            VoteCheckScope::AllChallenges
        }
    }
}

/// Ids of the categories of the active challenge (empty when nothing is
/// active).
pub fn active_category_ids(
    conn: &mut impl LoadConnection<Backend = Sqlite>,
) -> Result<Vec<String>> {
    Ok(match Challenge::get_active(conn)? {
        Some(challenge) => Category::of_challenge(&challenge.id, conn)?
            .into_iter()
            .map(|c| c.id)
            .collect(),
        None => Vec::new(),
    })
}

#[tracing::instrument(skip(conn))]
pub fn has_voted(
    email: &str,
    scope: VoteCheckScope,
    conn: &mut impl LoadConnection<Backend = Sqlite>,
) -> Result<bool> {
    match scope {
        VoteCheckScope::AllChallenges => Ok(select(exists(
            votes::table.filter(votes::user_email.eq(email)),
        ))
        .get_result::<bool>(conn)?),
        VoteCheckScope::ActiveChallenge => {
            let ids = active_category_ids(conn)?;
            if ids.is_empty() {
                return Ok(false);
            }
            Ok(select(exists(
                votes::table
                    .filter(votes::user_email.eq(email))
                    .filter(votes::best_category_id.eq_any(ids)),
            ))
            .get_result::<bool>(conn)?)
        }
    }
}

impl Vote {
    /// Votes whose `best` pick is one of `category_ids`, newest first.
    pub fn for_categories(
        category_ids: &[String],
        conn: &mut impl LoadConnection<Backend = Sqlite>,
    ) -> Result<Vec<Self>> {
        Ok(votes::table
            .filter(votes::best_category_id.eq_any(category_ids))
            .order_by((votes::created_at.desc(), votes::id.desc()))
            .load::<Vote>(conn)?)
    }

    /// Stores a submission which has already passed the intake checks.
    pub fn insert(
        submission: &VoteSubmission,
        conn: &mut impl LoadConnection<Backend = Sqlite>,
    ) -> Result<Self> {
        let vote = Vote {
            id: Uuid::now_v7().to_string(),
            user_email: submission.user_email.trim().to_string(),
            user_name: submission.user_name.trim().to_string(),
            best_category_id: submission.best_category_id.clone(),
            nice_category_id: submission.nice_category_id.clone(),
            own_category_id: submission.own_category_id.clone(),
            created_at: Utc::now().naive_utc(),
        };

        diesel::insert_into(votes::table)
            .values((
                votes::id.eq(&vote.id),
                votes::user_email.eq(&vote.user_email),
                votes::user_name.eq(&vote.user_name),
                votes::best_category_id.eq(&vote.best_category_id),
                votes::nice_category_id.eq(&vote.nice_category_id),
                votes::own_category_id.eq(&vote.own_category_id),
                votes::created_at.eq(vote.created_at),
            ))
            .execute(conn)?;

        Ok(vote)
    }
}

/// Who has voted in the active challenge so far.
#[derive(Serialize, Debug, Clone, Default)]
pub struct VotingStatus {
    /// Display names in the order people voted, each listed once.
    pub voters: Vec<String>,
    pub total: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub challenge_id: Option<String>,
}

impl VotingStatus {
    pub fn of_active_challenge(
        conn: &mut impl LoadConnection<Backend = Sqlite>,
    ) -> Result<Self> {
        let challenge = match Challenge::get_active(conn)? {
            Some(challenge) => challenge,
            None => return Ok(Self::default()),
        };
        let ids: Vec<String> = Category::of_challenge(&challenge.id, conn)?
            .into_iter()
            .map(|c| c.id)
            .collect();
        if ids.is_empty() {
            return Ok(Self {
                challenge_id: Some(challenge.id),
                ..Self::default()
            });
        }

        let voters: Vec<String> = votes::table
            .filter(votes::best_category_id.eq_any(&ids))
            .order_by((votes::created_at.asc(), votes::id.asc()))
            .select(votes::user_name)
            .load::<String>(conn)?
            .into_iter()
            .unique()
            .collect();

        Ok(Self {
            total: voters.len(),
            voters,
            challenge_id: Some(challenge.id),
        })
    }
}
