use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::any::{install_default_drivers, AnyPoolOptions};
use sqlx::AnyPool;
use tracing::{info, warn};

use crate::config::Config;
use crate::model::leave_request::{LeaveRequest, LeaveStatus, PendingLeave};
use crate::model::role::Role;
use crate::model::user::User;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Engine {
    Postgres,
    Sqlite,
}

#[derive(Debug)]
pub enum StoreError {
    DuplicateEmail,
    Sqlx(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError::Sqlx(e)
    }
}

// Both engines accept $n placeholders, so one query text serves both;
// only the bootstrap DDL is engine-specific.
const PG_SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id BIGSERIAL PRIMARY KEY,
        email TEXT UNIQUE NOT NULL,
        password_hash TEXT NOT NULL,
        role TEXT NOT NULL DEFAULT 'employee',
        created_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS leave_requests (
        id BIGSERIAL PRIMARY KEY,
        user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        start_date TEXT NOT NULL,
        end_date TEXT NOT NULL,
        reason TEXT NOT NULL,
        status TEXT NOT NULL DEFAULT 'pending',
        created_at TEXT NOT NULL
    )
    "#,
];

const SQLITE_SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        email TEXT UNIQUE NOT NULL,
        password_hash TEXT NOT NULL,
        role TEXT NOT NULL DEFAULT 'employee',
        created_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS leave_requests (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        start_date TEXT NOT NULL,
        end_date TEXT NOT NULL,
        reason TEXT NOT NULL,
        status TEXT NOT NULL DEFAULT 'pending',
        created_at TEXT NOT NULL
    )
    "#,
];

fn now_timestamp() -> String {
    Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Storage client, constructed once at startup and injected into handlers.
/// The engine is decided at init and never re-probed.
#[derive(Clone)]
pub struct Store {
    pool: AnyPool,
    engine: Engine,
}

impl Store {
    pub async fn init(config: &Config) -> Result<Self> {
        install_default_drivers();

        if let Some(url) = &config.database_url {
            match Self::try_postgres(url).await {
                Ok(store) => {
                    info!("Using Postgres storage backend");
                    return Ok(store);
                }
                Err(e) => {
                    warn!(error = %e, "Postgres unavailable, falling back to SQLite");
                }
            }
        } else {
            info!("DATABASE_URL not set, using SQLite");
        }

        let store = Self::open_sqlite(&config.sqlite_path)
            .await
            .context("failed to open SQLite fallback")?;
        info!(path = %config.sqlite_path, "Using SQLite storage backend");
        Ok(store)
    }

    pub fn engine(&self) -> Engine {
        self.engine
    }

    async fn try_postgres(url: &str) -> Result<Self> {
        let pool = AnyPoolOptions::new()
            .max_connections(20)
            .acquire_timeout(Duration::from_secs(5))
            .connect(url)
            .await?;

        // quick probe before committing to this engine
        sqlx::query("SELECT 1").execute(&pool).await?;

        let store = Store {
            pool,
            engine: Engine::Postgres,
        };
        store.bootstrap().await?;
        Ok(store)
    }

    async fn open_sqlite(path: &str) -> Result<Self> {
        let url = format!("sqlite://{path}?mode=rwc");
        let store = Self::connect_sqlite(&url, 5).await?;
        store.bootstrap().await?;
        Ok(store)
    }

    async fn connect_sqlite(url: &str, max_connections: u32) -> Result<Self> {
        let pool = AnyPoolOptions::new()
            .max_connections(max_connections)
            .after_connect(|conn, _meta| {
                Box::pin(async move {
                    sqlx::query("PRAGMA foreign_keys = ON")
                        .execute(&mut *conn)
                        .await?;
                    Ok(())
                })
            })
            .connect(url)
            .await?;

        Ok(Store {
            pool,
            engine: Engine::Sqlite,
        })
    }

    async fn bootstrap(&self) -> Result<()> {
        let statements = match self.engine {
            Engine::Postgres => PG_SCHEMA,
            Engine::Sqlite => SQLITE_SCHEMA,
        };
        for statement in statements {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    pub async fn insert_user(
        &self,
        email: &str,
        password_hash: &str,
        role: Role,
    ) -> std::result::Result<i64, StoreError> {
        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO users (email, password_hash, role, created_at) \
             VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(email)
        .bind(password_hash)
        .bind(role.to_string())
        .bind(now_timestamp())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                StoreError::DuplicateEmail
            }
            _ => StoreError::Sqlx(e),
        })?;

        Ok(id)
    }

    pub async fn find_user_by_email(&self, email: &str) -> sqlx::Result<Option<User>> {
        sqlx::query_as::<_, User>(
            "SELECT id, email, password_hash, role FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn insert_leave_request(
        &self,
        user_id: i64,
        start_date: &str,
        end_date: &str,
        reason: &str,
    ) -> sqlx::Result<i64> {
        sqlx::query_scalar::<_, i64>(
            "INSERT INTO leave_requests (user_id, start_date, end_date, reason, status, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING id",
        )
        .bind(user_id)
        .bind(start_date)
        .bind(end_date)
        .bind(reason)
        .bind(LeaveStatus::Pending.to_string())
        .bind(now_timestamp())
        .fetch_one(&self.pool)
        .await
    }

    /// All requests owned by the caller, any status, insertion order.
    pub async fn find_leave_requests_by_owner(
        &self,
        user_id: i64,
    ) -> sqlx::Result<Vec<LeaveRequest>> {
        sqlx::query_as::<_, LeaveRequest>(
            "SELECT id, user_id, start_date, end_date, reason, status, created_at \
             FROM leave_requests WHERE user_id = $1 ORDER BY id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
    }

    /// Pending requests across all owners, joined with the owner's email.
    pub async fn find_pending_leave_requests_with_owner_email(
        &self,
    ) -> sqlx::Result<Vec<PendingLeave>> {
        sqlx::query_as::<_, PendingLeave>(
            "SELECT lr.id, lr.user_id, lr.start_date, lr.end_date, lr.reason, \
                    lr.status, lr.created_at, u.email \
             FROM leave_requests lr \
             JOIN users u ON lr.user_id = u.id \
             WHERE lr.status = $1 \
             ORDER BY lr.id",
        )
        .bind(LeaveStatus::Pending.to_string())
        .fetch_all(&self.pool)
        .await
    }

    /// Optimistic transition: only a pending row is touched. Returns rows
    /// affected; zero means the request is unknown or already resolved.
    pub async fn update_leave_request_status(
        &self,
        id: i64,
        status: LeaveStatus,
    ) -> sqlx::Result<u64> {
        let result = sqlx::query(
            "UPDATE leave_requests SET status = $1 WHERE id = $2 AND status = $3",
        )
        .bind(status.to_string())
        .bind(id)
        .bind(LeaveStatus::Pending.to_string())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// In-memory SQLite store for tests. A single connection keeps every
    /// query on the same memory database.
    #[cfg(test)]
    pub async fn memory() -> Self {
        install_default_drivers();
        let store = Self::connect_sqlite("sqlite::memory:", 1)
            .await
            .expect("in-memory sqlite");
        store.bootstrap().await.expect("bootstrap schema");
        store
    }
}
