//! Read-only access to Juggernaut's `curated_feeds` table.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{info, warn};

use crate::core::models::CuratedArticle;
use crate::errors::GenieError;
use crate::services::ArticleSource;

#[derive(Clone)]
pub struct PgCuratedFeeds {
    pool: PgPool,
}

impl PgCuratedFeeds {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Parse the `curated_articles` blob into articles.
///
/// # Errors
///
/// Returns a parse error if the blob is not a JSON array of articles.
pub fn parse_curated_articles(blob: &str) -> Result<Vec<CuratedArticle>, GenieError> {
    serde_json::from_str(blob)
        .map_err(|e| GenieError::ParseError(format!("Invalid curated_articles JSON: {e}")))
}

#[async_trait]
impl ArticleSource for PgCuratedFeeds {
    async fn fetch_articles(
        &self,
        user_id: &str,
        created_at: &str,
    ) -> Result<Vec<CuratedArticle>, GenieError> {
        info!(user_id = %user_id, created_at = %created_at, "Fetching curated articles");

        // Cast both sides to text so json, jsonb and text columns all decode the same way.
        let blob: Option<Option<String>> = sqlx::query_scalar(
            r"
            SELECT curated_articles::text
            FROM curated_feeds
            WHERE user_id::text = $1 AND created_at = $2::timestamptz
            LIMIT 1
            ",
        )
        .bind(user_id)
        .bind(created_at)
        .fetch_optional(&self.pool)
        .await?;

        let Some(Some(blob)) = blob else {
            warn!(user_id = %user_id, created_at = %created_at, "No articles found");
            return Ok(Vec::new());
        };

        let articles = parse_curated_articles(&blob)?;
        info!("Successfully fetched {} articles", articles.len());
        Ok(articles)
    }
}
