//! End-to-end tests. These drive the full router (middleware included)
//! against an in-memory database, or a temporary file where concurrency
//! matters.

use std::path::PathBuf;

use axum::{
    Router,
    body::Body,
    extract::Request,
    http::header::{CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE},
    response::Response,
};
use diesel::prelude::*;
use tower::ServiceExt;
use uuid::Uuid;

use crate::{
    categories::Category,
    challenges::Challenge,
    config::{AppConfig, create_app, make_pool, run_migrations},
    schema::{login_tokens, votes},
    state::DbPool,
};

mod login;
mod results;
mod smoke;

pub const ADMIN_EMAIL: &str = "admin@example.com";

pub struct TestApp {
    pub app: Router,
    pub pool: DbPool,
    db_file: Option<PathBuf>,
}

impl Drop for TestApp {
    fn drop(&mut self) {
        if let Some(path) = &self.db_file {
            for suffix in ["", "-wal", "-shm"] {
                let mut file = path.clone().into_os_string();
                file.push(suffix);
                let _ = std::fs::remove_file(file);
            }
        }
    }
}

pub fn test_config() -> AppConfig {
    AppConfig {
        admin_emails: vec![ADMIN_EMAIL.to_string()],
        ..Default::default()
    }
}

pub fn setup() -> TestApp {
    setup_with(test_config())
}

pub fn setup_with(config: AppConfig) -> TestApp {
    let pool = make_pool(":memory:").unwrap();
    run_migrations(&pool).unwrap();

    let app = create_app(pool.clone(), config).unwrap();
    TestApp {
        app,
        pool,
        db_file: None,
    }
}

/// Like [`setup`], but backed by a fresh database file with a full sized
/// pool, so requests really do run side by side.
pub fn setup_file() -> TestApp {
    let path =
        std::env::temp_dir().join(format!("tunevote-{}.db", Uuid::now_v7()));
    let pool = make_pool(&path.to_string_lossy()).unwrap();
    run_migrations(&pool).unwrap();

    let app = create_app(pool.clone(), test_config()).unwrap();
    TestApp {
        app,
        pool,
        db_file: Some(path),
    }
}

impl TestApp {
    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> Response {
        let mut request = Request::builder().method("GET").uri(uri);
        if let Some(cookie) = cookie {
            request = request.header(COOKIE, cookie);
        }
        self.send(request.body(Body::empty()).unwrap()).await
    }

    pub async fn post(
        &self,
        uri: &str,
        cookie: Option<&str>,
        form: &[(&str, &str)],
    ) -> Response {
        let mut request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            request = request.header(COOKIE, cookie);
        }
        self.send(
            request
                .body(Body::from(serde_urlencoded::to_string(form).unwrap()))
                .unwrap(),
        )
        .await
    }

    async fn send(&self, request: Request) -> Response {
        self.app.clone().oneshot(request).await.unwrap()
    }

    /// Walks through the emailed-link sign-in and returns the session
    /// cookie (as `name=value`).
    pub async fn sign_in(&self, email: &str) -> String {
        let response = self.post("/login", None, &[("email", email)]).await;
        assert!(response.status().is_success());

        let token = self.latest_token(email);
        let response = self
            .get(&format!("/auth/callback?token={token}"), None)
            .await;
        assert!(response.status().is_redirection());

        session_cookie(&response)
    }

    pub fn latest_token(&self, email: &str) -> String {
        let mut conn = self.pool.get().unwrap();
        login_tokens::table
            .filter(login_tokens::email.eq(email.trim().to_lowercase()))
            .order_by(login_tokens::created_at.desc())
            .select(login_tokens::token)
            .first::<String>(&mut conn)
            .unwrap()
    }

    /// Creates a challenge with one category per name, activating it if
    /// asked to.
    pub fn seed_challenge(
        &self,
        number: i64,
        names: &[&str],
        active: bool,
    ) -> (Challenge, Vec<Category>) {
        let mut conn = self.pool.get().unwrap();
        let challenge = Challenge::create(
            number,
            &format!("Challenge {number}"),
            "Pick your favourite.",
            &mut conn,
        )
        .unwrap();
        let categories = names
            .iter()
            .map(|name| Category::create(name, &challenge.id, &mut conn).unwrap())
            .collect();
        if active {
            Challenge::set_active(&challenge.id, &mut conn).unwrap();
        }
        (challenge, categories)
    }

    pub fn vote_count(&self) -> i64 {
        let mut conn = self.pool.get().unwrap();
        votes::table.count().get_result(&mut conn).unwrap()
    }

    pub fn active_challenge(&self) -> Option<Challenge> {
        let mut conn = self.pool.get().unwrap();
        Challenge::get_active(&mut conn).unwrap()
    }
}

pub fn session_cookie(response: &Response) -> String {
    response
        .headers()
        .get(SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_string()
}

pub fn location(response: &Response) -> &str {
    response.headers().get(LOCATION).unwrap().to_str().unwrap()
}

pub async fn body_string(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8_lossy(&bytes).to_string()
}

/// Form fields of a vote for the given categories.
pub fn vote_form<'a>(
    name: &'a str,
    best: &'a Category,
    nice: &'a Category,
    own: &'a Category,
) -> [(&'a str, &'a str); 4] {
    [
        ("user_name", name),
        ("best_category_id", best.id.as_str()),
        ("nice_category_id", nice.id.as_str()),
        ("own_category_id", own.id.as_str()),
    ]
}
