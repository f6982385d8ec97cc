//! Admin-controlled flags. Only `results_public` is read anywhere.

use axum::{extract::Form, response::Redirect};
use chrono::{NaiveDateTime, Utc};
use diesel::{connection::LoadConnection, prelude::*, sqlite::Sqlite};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::Result,
    permission::Admin,
    schema::settings,
    state::Conn,
    util_resp::{StandardResponse, see_other_ok},
};

pub const RESULTS_PUBLIC: &str = "results_public";

#[derive(Serialize, Deserialize, Queryable, Clone, Debug)]
pub struct Setting {
    pub id: String,
    pub key: String,
    pub value: bool,
    pub updated_at: NaiveDateTime,
}

/// Whether non-admins may see the ranking. A missing row reads as `false`.
pub fn results_public(
    conn: &mut impl LoadConnection<Backend = Sqlite>,
) -> Result<bool> {
    Ok(settings::table
        .filter(settings::key.eq(RESULTS_PUBLIC))
        .select(settings::value)
        .first::<bool>(conn)
        .optional()?
        .unwrap_or(false))
}

pub fn set_results_public(
    value: bool,
    conn: &mut impl LoadConnection<Backend = Sqlite>,
) -> Result<()> {
    let now = Utc::now().naive_utc();
    let updated =
        diesel::update(settings::table.filter(settings::key.eq(RESULTS_PUBLIC)))
            .set((settings::value.eq(value), settings::updated_at.eq(now)))
            .execute(conn)?;

    if updated == 0 {
        diesel::insert_into(settings::table)
            .values((
                settings::id.eq(Uuid::now_v7().to_string()),
                settings::key.eq(RESULTS_PUBLIC),
                settings::value.eq(value),
                settings::updated_at.eq(now),
            ))
            .execute(conn)?;
    }

    Ok(())
}

#[derive(Deserialize)]
pub struct SettingsForm {
    results_public: bool,
}

pub async fn do_update_settings(
    Admin(user): Admin,
    mut conn: Conn,
    Form(form): Form<SettingsForm>,
) -> StandardResponse {
    set_results_public(form.results_public, &mut *conn)?;
    tracing::info!(
        admin = %user.email,
        results_public = form.results_public,
        "settings updated"
    );

    see_other_ok(Redirect::to("/admin"))
}
