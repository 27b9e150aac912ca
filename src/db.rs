//! Database connection pool setup.
//!
//! The pool is the single shared handle to the backing store: opened once in
//! `main` at process start, passed into services explicitly, and closed on
//! shutdown. Acquisition is bounded — exhaustion surfaces as a timeout, which
//! the error layer reports as `StoreUnavailable` rather than queuing forever.

use crate::error::Result;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

/// Create a new database connection pool
pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(20)
        .min_connections(5)
        .acquire_timeout(Duration::from_secs(10))
        .idle_timeout(Duration::from_secs(600))
        .connect(database_url)
        .await?;

    Ok(pool)
}
