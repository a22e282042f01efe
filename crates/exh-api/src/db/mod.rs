//! # Database Persistence Layer
//!
//! Optional Postgres write-through via SQLx.
//!
//! When `DATABASE_URL` is set, every package a request changed is stored
//! as one JSONB document in `exh_packages`, and the in-memory repository is
//! hydrated from that table on startup. When absent, the API runs
//! in-memory only and state does not survive a restart.
//!
//! Uniqueness of (kind, origin id) and of folios is enforced in memory and
//! mirrored by table constraints.

pub mod packages;

use sqlx::postgres::{PgPool, PgPoolOptions};

/// Initialize the database connection pool and run migrations.
///
/// Returns `None` if `DATABASE_URL` is not set (in-memory-only mode).
/// Returns `Err` if the URL is set but the connection or migration fails.
pub async fn init_pool() -> Result<Option<PgPool>, sqlx::Error> {
    let url = match std::env::var("DATABASE_URL") {
        Ok(url) if !url.trim().is_empty() => url,
        _ => {
            tracing::warn!(
                "DATABASE_URL not set; running in-memory only mode. \
                 State will not survive restarts."
            );
            return Ok(None);
        }
    };

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .min_connections(1)
        .acquire_timeout(std::time::Duration::from_secs(5))
        .connect(&url)
        .await?;

    tracing::info!("Connected to PostgreSQL");

    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("Database migrations applied");

    Ok(Some(pool))
}
