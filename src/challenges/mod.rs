use chrono::{NaiveDateTime, Utc};
use diesel::{
    connection::LoadConnection, dsl::exists, prelude::*, select,
    sqlite::Sqlite,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::{Error, Result},
    schema::challenges,
};

pub mod manage;

/// A voting round. At most one challenge is active at a time.
#[derive(Serialize, Deserialize, Queryable, Clone, Debug)]
pub struct Challenge {
    pub id: String,
    pub number: i64,
    pub title: String,
    pub description: String,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
}

impl Challenge {
    pub fn fetch(
        challenge_id: &str,
        conn: &mut impl LoadConnection<Backend = Sqlite>,
    ) -> Result<Self> {
        challenges::table
            .filter(challenges::id.eq(challenge_id))
            .first::<Challenge>(conn)
            .optional()?
            .ok_or(Error::NotFound)
    }

    /// All challenges, in the order they were numbered.
    pub fn all(
        conn: &mut impl LoadConnection<Backend = Sqlite>,
    ) -> Result<Vec<Self>> {
        Ok(challenges::table
            .order_by(challenges::number.asc())
            .load::<Challenge>(conn)?)
    }

    pub fn get_active(
        conn: &mut impl LoadConnection<Backend = Sqlite>,
    ) -> Result<Option<Self>> {
        Ok(challenges::table
            .filter(challenges::is_active.eq(true))
            .first::<Challenge>(conn)
            .optional()?)
    }

    /// Like [`Challenge::get_active`], but treats "nothing is running" as
    /// [`Error::NotFound`].
    pub fn require_active(
        conn: &mut impl LoadConnection<Backend = Sqlite>,
    ) -> Result<Self> {
        Self::get_active(conn)?.ok_or(Error::NotFound)
    }

    /// Makes `challenge_id` the only active challenge.
    ///
    /// Both steps (deactivating everything, then activating the target) run
    /// in one transaction, so no reader ever sees zero active challenges.
    #[tracing::instrument(skip(conn))]
    pub fn set_active(
        challenge_id: &str,
        conn: &mut impl LoadConnection<Backend = Sqlite>,
    ) -> Result<()> {
        conn.transaction::<_, Error, _>(|conn| {
            let known = select(exists(
                challenges::table.filter(challenges::id.eq(challenge_id)),
            ))
            .get_result::<bool>(conn)?;
            if !known {
                return Err(Error::NotFound);
            }

            diesel::update(
                challenges::table.filter(challenges::is_active.eq(true)),
            )
            .set(challenges::is_active.eq(false))
            .execute(conn)?;

            diesel::update(
                challenges::table.filter(challenges::id.eq(challenge_id)),
            )
            .set(challenges::is_active.eq(true))
            .execute(conn)?;

            Ok(())
        })?;

        tracing::info!("active challenge switched");
        Ok(())
    }

    /// Creates a new, inactive challenge.
    pub fn create(
        number: i64,
        title: &str,
        description: &str,
        conn: &mut impl LoadConnection<Backend = Sqlite>,
    ) -> Result<Self> {
        let challenge = Challenge {
            id: Uuid::now_v7().to_string(),
            number,
            title: title.to_string(),
            description: description.to_string(),
            is_active: false,
            created_at: Utc::now().naive_utc(),
        };

        diesel::insert_into(challenges::table)
            .values((
                challenges::id.eq(&challenge.id),
                challenges::number.eq(challenge.number),
                challenges::title.eq(&challenge.title),
                challenges::description.eq(&challenge.description),
                challenges::is_active.eq(challenge.is_active),
                challenges::created_at.eq(challenge.created_at),
            ))
            .execute(conn)?;

        Ok(challenge)
    }
}
