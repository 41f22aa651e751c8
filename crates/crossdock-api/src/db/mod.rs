//! # Database Persistence Layer
//!
//! Optional Postgres mirroring via SQLx. When `DATABASE_URL` is set, the
//! API writes two append-only tables and hydrates one of them at boot:
//!
//! - `assignment_events` — write-only audit mirror of bin assignment
//!   opens and closures. Never read back by the engine; it exists for
//!   offline reconciliation.
//! - `storage_charges` — the charge ledger mirror, loaded into memory at
//!   startup so accrual idempotence (high-water marks, duplicate-period
//!   rejection) survives restarts.
//!
//! When `DATABASE_URL` is absent the API runs in-memory only, suitable
//! for development and testing.

pub mod assignments;
pub mod charges;

use sqlx::postgres::{PgPool, PgPoolOptions};

use crate::state::AppState;

/// Initialize the database connection pool and run migrations.
///
/// Returns `None` if `DATABASE_URL` is not set (in-memory-only mode).
///
/// # Errors
///
/// Fails if the URL is set but the connection or a migration fails.
pub async fn init_pool() -> Result<Option<PgPool>, sqlx::Error> {
    let url = match std::env::var("DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            tracing::warn!(
                "DATABASE_URL not set — running in-memory only mode. \
                 Charge history will not survive restarts."
            );
            return Ok(None);
        }
    };

    let pool = PgPoolOptions::new()
        .max_connections(20)
        .min_connections(2)
        .acquire_timeout(std::time::Duration::from_secs(5))
        .connect(&url)
        .await?;

    tracing::info!("Connected to PostgreSQL");

    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("Database migrations applied");

    Ok(Some(pool))
}

/// Hydrate in-memory state from the database at boot.
///
/// Only the charge ledger is loaded; assignment events are a write-only
/// mirror. Duplicate rows (already appended this boot) are skipped.
pub async fn hydrate(state: &AppState, pool: &PgPool) -> Result<(), sqlx::Error> {
    let rows = charges::load_all(pool).await?;
    let total = rows.len();
    let mut loaded = 0usize;
    for charge in rows {
        if state.charges.append(charge).is_ok() {
            loaded += 1;
        }
    }
    tracing::info!(loaded, total, "charge ledger hydrated from database");
    Ok(())
}
