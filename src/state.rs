use std::{
    ops::{Deref, DerefMut},
    sync::Arc,
};

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts, Request, State},
    http::{Method, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::Key;
use diesel::{
    Connection, SqliteConnection,
    connection::{AnsiTransactionManager, TransactionManager},
    r2d2::{ConnectionManager, Pool, PooledConnection},
};
use tokio::task::spawn_blocking;

use crate::{
    auth::login::LinkSender, config::AppConfig, util_resp::FailureResponse,
};

pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;
pub type PooledConn = PooledConnection<ConnectionManager<SqliteConnection>>;

#[derive(Clone, FromRef)]
pub struct AppState {
    pub pool: DbPool,
    pub key: Key,
    pub config: Arc<AppConfig>,
    pub links: Arc<dyn LinkSender>,
}

/// `GET` routes which write, and so need the write lock like any `POST`.
const WRITING_GETS: &[&str] = &["/auth/callback"];

/// Opens a transaction for every request and commits it once the handler
/// has produced a response. Responses which are not successful (or
/// redirects) roll the transaction back, so a handler can bail out half way
/// through without leaving partial writes behind.
///
/// Requests which may write take SQLite's write lock when the transaction
/// starts (`BEGIN IMMEDIATE`), so concurrent writers queue on the busy
/// timeout rather than failing at commit time. Waiting happens on the
/// blocking pool, never on an async worker.
pub async fn tx_commit(
    State(pool): State<DbPool>,
    mut request: Request,
    next: Next,
) -> Response {
    let writes = !matches!(*request.method(), Method::GET | Method::HEAD)
        || WRITING_GETS.contains(&request.uri().path());

    let conn = match spawn_blocking(move || {
        let mut conn = pool.get()?;
        begin(&mut conn, writes)?;
        Ok::<_, Box<dyn std::error::Error + Send + Sync>>(conn)
    })
    .await
    {
        Ok(Ok(conn)) => conn,
        Ok(Err(e)) => {
            tracing::error!(writes, "could not open a transaction: {e}");
            return FailureResponse::ServerError(()).into_response();
        }
        Err(e) => {
            tracing::error!("connection checkout task failed: {e}");
            return FailureResponse::ServerError(()).into_response();
        }
    };

    let shared = ThreadSafeConn {
        inner: Arc::new(tokio::sync::Mutex::new(conn)),
    };
    request.extensions_mut().insert(shared.clone());

    let response = next.run(request).await;

    let mut conn = shared.inner.lock().await;
    let status = response.status();
    let outcome = if status.is_success()
        || status.is_redirection()
        || status.is_informational()
    {
        <PooledConn as Connection>::TransactionManager::commit_transaction(
            &mut *conn,
        )
    } else {
        <PooledConn as Connection>::TransactionManager::rollback_transaction(
            &mut *conn,
        )
    };

    match outcome {
        Ok(()) => response,
        Err(e) => {
            tracing::error!("could not finish transaction: {e}");
            FailureResponse::ServerError(()).into_response()
        }
    }
}

fn begin(conn: &mut PooledConn, writes: bool) -> diesel::QueryResult<()> {
    if writes {
        AnsiTransactionManager::begin_transaction_sql(
            &mut **conn,
            "BEGIN IMMEDIATE",
        )
    } else {
        <PooledConn as Connection>::TransactionManager::begin_transaction(conn)
    }
}

/// The connection (and open transaction) of the current request. Cloning
/// shares the same connection.
#[derive(Clone)]
pub struct ThreadSafeConn {
    pub inner: Arc<tokio::sync::Mutex<PooledConn>>,
}

#[async_trait]
impl<S> FromRequestParts<S> for ThreadSafeConn
where
    S: Send + Sync,
{
    type Rejection = FailureResponse;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<ThreadSafeConn>() {
            Some(conn) => Ok(conn.clone()),
            None => {
                tracing::error!("route is not wrapped in `tx_commit`");
                Err(FailureResponse::ServerError(()))
            }
        }
    }
}

/// Exclusive access to the request's connection for the duration of a
/// handler.
pub struct Conn {
    inner: tokio::sync::OwnedMutexGuard<PooledConn>,
}

impl Deref for Conn {
    type Target = PooledConn;

    fn deref(&self) -> &Self::Target {
        self.inner.deref()
    }
}

impl DerefMut for Conn {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.inner.deref_mut()
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Conn
where
    S: Send + Sync,
{
    type Rejection = FailureResponse;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> Result<Self, Self::Rejection> {
        let conn = ThreadSafeConn::from_request_parts(parts, state).await?;
        Ok(Conn {
            inner: conn.inner.lock_owned().await,
        })
    }
}
