use chrono::{NaiveDateTime, Utc};
use diesel::{connection::LoadConnection, prelude::*, sqlite::Sqlite};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{error::Result, schema::categories};

/// One entry (a song) which can be voted for. Belongs to a single
/// challenge.
#[derive(Serialize, Deserialize, Queryable, Clone, Debug, PartialEq, Eq)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub challenge_id: Option<String>,
    pub created_at: NaiveDateTime,
}

impl Category {
    /// The categories of a challenge, ordered by name.
    pub fn of_challenge(
        challenge_id: &str,
        conn: &mut impl LoadConnection<Backend = Sqlite>,
    ) -> Result<Vec<Self>> {
        Ok(categories::table
            .filter(categories::challenge_id.eq(challenge_id))
            .order_by(categories::name.asc())
            .load::<Category>(conn)?)
    }

    pub fn all(
        conn: &mut impl LoadConnection<Backend = Sqlite>,
    ) -> Result<Vec<Self>> {
        Ok(categories::table
            .order_by(categories::name.asc())
            .load::<Category>(conn)?)
    }

    pub fn create(
        name: &str,
        challenge_id: &str,
        conn: &mut impl LoadConnection<Backend = Sqlite>,
    ) -> Result<Self> {
        let category = Category {
            id: Uuid::now_v7().to_string(),
            name: name.to_string(),
            challenge_id: Some(challenge_id.to_string()),
            created_at: Utc::now().naive_utc(),
        };

        diesel::insert_into(categories::table)
            .values((
                categories::id.eq(&category.id),
                categories::name.eq(&category.name),
                categories::challenge_id.eq(&category.challenge_id),
                categories::created_at.eq(category.created_at),
            ))
            .execute(conn)?;

        Ok(category)
    }
}
