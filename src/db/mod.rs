//! Postgres access (Neon) through sqlx

pub mod curated;
pub mod tweets;

pub use curated::PgCuratedFeeds;
pub use tweets::{PgTweetStore, TWEETS_TABLE};

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::time::Duration;

use crate::errors::GenieError;

/// Build a pool that connects on first use.
///
/// Lambda cold starts stay cheap and routes that never touch the database
/// (health checks, rejected webhooks) never open a connection.
///
/// # Errors
///
/// Returns an error if `database_url` cannot be parsed.
pub fn connect(database_url: &str) -> Result<PgPool, GenieError> {
    PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(10))
        .connect_lazy(database_url)
        .map_err(|e| GenieError::DatabaseError(format!("Invalid DATABASE_URL: {e}")))
}
