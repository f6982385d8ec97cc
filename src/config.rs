use std::{path::Path, sync::Arc};

use axum::{
    Router, middleware,
    routing::{get, post},
};
use axum_extra::extract::cookie::Key;
use diesel::{
    SqliteConnection,
    connection::SimpleConnection,
    r2d2::{ConnectionManager, CustomizeConnection, Pool},
};
use diesel_migrations::MigrationHarness;
use hypertext::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tower_http::trace::TraceLayer;
use url::Url;

use crate::{
    MIGRATIONS,
    admin::dashboard::admin_dashboard,
    api,
    auth::{
        User,
        login::{LogLinkSender, auth_callback, do_login, do_logout, login_page},
    },
    categories::Category,
    challenges::{
        Challenge,
        manage::{
            create_challenge_page, do_create_category, do_create_challenge,
            do_switch_challenge,
        },
    },
    results::public::public_results_page,
    settings::do_update_settings,
    state::{AppState, DbPool, Conn, tx_commit},
    template::Page,
    util_resp::{StandardResponse, success},
    votes::{
        VotingStatus,
        submit::{do_submit_vote, vote_page},
    },
    widgets::actions::Actions,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read configuration file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid configuration file: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid public url: {0}")]
    Url(#[from] url::ParseError),
    #[error("`secret_key` must be at least 64 bytes long")]
    SecretKeyTooShort,
}

/// Process-wide configuration. Values come from an (optional) TOML file and
/// are then overridden by environment variables.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct AppConfig {
    pub database_url: String,
    pub bind: String,
    pub secret_key: Option<String>,
    /// Emails (compared case-insensitively) which may use the admin pages.
    pub admin_emails: Vec<String>,
    pub public_url: Url,
    /// When false, anyone who has voted in any challenge is refused a vote
    /// in every later challenge.
    pub scope_vote_check_by_active_challenge: bool,
    pub login_link_ttl_minutes: i64,
    /// Print sign-in links on the login page (for running locally without
    /// a mail setup).
    pub show_login_links: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: ":memory:".to_string(),
            bind: "127.0.0.1:8000".to_string(),
            secret_key: None,
            admin_emails: Vec::new(),
            public_url: Url::parse("http://localhost:8000")
                .expect("default public url is valid"),
            scope_vote_check_by_active_challenge: false,
            login_link_ttl_minutes: 60,
            show_login_links: false,
        }
    }
}

impl AppConfig {
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Reads the configuration file (if any), then applies the process
    /// environment on top.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => Self::from_toml(&std::fs::read_to_string(path)?)?,
            None => Self::default(),
        };
        config.with_env(|key| std::env::var(key).ok())
    }

    pub fn with_env(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(url) = lookup("DATABASE_URL") {
            self.database_url = url;
        }
        if let Some(bind) = lookup("BIND_ADDRESS") {
            self.bind = bind;
        }
        if let Some(secret) = lookup("SECRET_KEY") {
            self.secret_key = Some(secret);
        }
        if let Some(admins) = lookup("ADMIN_EMAIL") {
            self.admin_emails = admins
                .split(',')
                .map(str::trim)
                .filter(|email| !email.is_empty())
                .map(ToString::to_string)
                .collect();
        }
        if let Some(url) = lookup("PUBLIC_URL") {
            self.public_url = Url::parse(&url)?;
        }
        if let Some(show) = lookup("SHOW_LOGIN_LINKS") {
            self.show_login_links = matches!(show.as_str(), "1" | "true");
        }
        Ok(self)
    }

    pub fn is_admin(&self, email: &str) -> bool {
        self.admin_emails
            .iter()
            .any(|admin| admin.eq_ignore_ascii_case(email.trim()))
    }

    /// The key used to encrypt session cookies. Without a configured secret
    /// a fresh key is generated, so sessions end when the process exits.
    pub fn cookie_key(&self) -> Result<Key, ConfigError> {
        match &self.secret_key {
            Some(secret) if secret.len() >= 64 => {
                Ok(Key::from(secret.as_bytes()))
            }
            Some(_) => Err(ConfigError::SecretKeyTooShort),
            None => {
                tracing::warn!(
                    "no `SECRET_KEY` set, sessions will not survive a restart"
                );
                Ok(Key::generate())
            }
        }
    }
}

/// How long a connection waits for another one's write lock before giving
/// up with `SQLITE_BUSY`.
const BUSY_TIMEOUT_MS: u32 = 5_000;

/// Applied to every connection the pool opens. WAL lets readers carry on
/// while a write transaction is open, and the busy timeout makes writers
/// queue for the lock instead of failing straight away.
#[derive(Debug)]
struct SqlitePragmas;

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error>
    for SqlitePragmas
{
    fn on_acquire(
        &self,
        conn: &mut SqliteConnection,
    ) -> Result<(), diesel::r2d2::Error> {
        conn.batch_execute(&format!(
            "PRAGMA busy_timeout = {BUSY_TIMEOUT_MS}; \
             PRAGMA journal_mode = WAL; \
             PRAGMA synchronous = NORMAL;"
        ))
        .map_err(diesel::r2d2::Error::QueryError)
    }
}

pub fn make_pool(
    database_url: &str,
) -> Result<DbPool, diesel::r2d2::PoolError> {
    Pool::builder()
        .max_size(if database_url == ":memory:" { 1 } else { 10 })
        .connection_customizer(Box::new(SqlitePragmas))
        .build(ConnectionManager::<SqliteConnection>::new(database_url))
}

pub fn run_migrations(
    pool: &DbPool,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut conn = pool.get()?;
    let applied = conn.run_pending_migrations(MIGRATIONS)?;
    if !applied.is_empty() {
        tracing::info!("applied {} migration(s)", applied.len());
    }
    Ok(())
}

pub async fn home(user: Option<User>, mut conn: Conn) -> StandardResponse {
    let active = Challenge::get_active(&mut *conn)?;
    let categories = match &active {
        Some(challenge) => Category::of_challenge(&challenge.id, &mut *conn)?,
        None => Vec::new(),
    };
    let status = VotingStatus::of_active_challenge(&mut *conn)?;
    let is_admin = user.as_ref().is_some_and(|u| u.is_admin);

    let mut links = vec![("/vote", "Vote"), ("/results", "Results")];
    if is_admin {
        links.push(("/admin", "Admin"));
    }

    success(
        Page::new()
            .user_opt(user)
            .body(maud! {
                div class="container py-5" {
                    @if let Some(challenge) = &active {
                        h1 class="display-5 fw-bold" {
                            "Challenge #" (challenge.number) ": " (challenge.title)
                        }
                        p class="lead" { (challenge.description) }

                        h2 class="h4 mt-4" { "Entries" }
                        @if categories.is_empty() {
                            p class="text-muted" { "No entries yet." }
                        } @else {
                            ul class="list-group mb-4" {
                                @for category in &categories {
                                    li class="list-group-item" { (category.name) }
                                }
                            }
                        }

                        h2 class="h4" { "Who has voted (" (status.total) ")" }
                        @if status.voters.is_empty() {
                            p class="text-muted" { "Nobody has voted yet." }
                        } @else {
                            p {
                                @for (i, name) in status.voters.iter().enumerate() {
                                    @if i > 0 { ", " }
                                    (name)
                                }
                            }
                        }
                    } @else {
                        h1 { "No challenge is running" }
                        p class="text-muted" { "Check back once the next challenge starts." }
                    }
                    Actions options=(&links);
                }
            })
            .render(),
    )
}

pub fn create_app(
    pool: DbPool,
    config: AppConfig,
) -> Result<Router, ConfigError> {
    let state = AppState {
        pool,
        key: config.cookie_key()?,
        config: Arc::new(config),
        links: Arc::new(LogLinkSender),
    };

    Ok(Router::new()
        .route("/", get(home))
        .route("/login", get(login_page).post(do_login))
        .route("/auth/callback", get(auth_callback))
        .route("/logout", post(do_logout))
        .route("/vote", get(vote_page).post(do_submit_vote))
        .route("/results", get(public_results_page))
        .route("/admin", get(admin_dashboard))
        .route("/admin/settings", post(do_update_settings))
        .route("/admin/challenge", post(do_switch_challenge))
        .route(
            "/admin/challenges/create",
            get(create_challenge_page).post(do_create_challenge),
        )
        .route(
            "/admin/challenges/:challenge_id/categories",
            post(do_create_category),
        )
        .route("/api/challenges", get(api::list_challenges))
        .route("/api/challenges/active", get(api::active_challenge))
        .route("/api/categories", get(api::list_categories))
        .route("/api/vote/check", get(api::check_vote))
        .route("/api/votes/status", get(api::voting_status))
        .route("/api/settings", get(api::read_settings))
        .route("/api/results", get(api::results))
        .layer(middleware::from_fn_with_state(state.clone(), tx_commit))
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}
