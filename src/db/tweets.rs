//! Tweet records stored in `gib_tweets`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::core::models::{ApprovalStatus, NewTweet, PostStatus, TweetRecord};
use crate::errors::GenieError;
use crate::services::TweetStore;

pub const TWEETS_TABLE: &str = "gib_tweets";

const RECORD_COLUMNS: &str = "id, article_id, article_title, tweet_text, web_url, \
     approval_status, post_status, telegram_message_id, x_tweet_id, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct TweetRow {
    id: Uuid,
    article_id: String,
    article_title: String,
    tweet_text: String,
    web_url: String,
    approval_status: String,
    post_status: String,
    telegram_message_id: Option<String>,
    x_tweet_id: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<TweetRow> for TweetRecord {
    type Error = GenieError;

    fn try_from(row: TweetRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            article_id: row.article_id,
            article_title: row.article_title,
            tweet_text: row.tweet_text,
            web_url: row.web_url,
            approval_status: row
                .approval_status
                .parse()
                .map_err(GenieError::DatabaseError)?,
            post_status: row.post_status.parse().map_err(GenieError::DatabaseError)?,
            telegram_message_id: row.telegram_message_id,
            x_tweet_id: row.x_tweet_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Repository for tweet records
#[derive(Clone)]
pub struct PgTweetStore {
    pool: PgPool,
}

impl PgTweetStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TweetStore for PgTweetStore {
    async fn create_tweet(&self, tweet: &NewTweet) -> Result<Uuid, GenieError> {
        let query = format!(
            "INSERT INTO {TWEETS_TABLE} (
                id,
                article_id,
                article_title,
                tweet_text,
                web_url,
                approval_status,
                post_status
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)"
        );

        let record_id = Uuid::new_v4();
        sqlx::query(&query)
            .bind(record_id)
            .bind(&tweet.article_id)
            .bind(&tweet.article_title)
            .bind(&tweet.tweet_text)
            .bind(&tweet.web_url)
            .bind(ApprovalStatus::Queued.as_str())
            .bind(PostStatus::Pending.as_str())
            .execute(&self.pool)
            .await?;

        info!(record_id = %record_id, article_id = %tweet.article_id, "Created tweet record");
        Ok(record_id)
    }

    async fn tweet_exists_for_article(&self, article_id: &str) -> Result<bool, GenieError> {
        let query = format!("SELECT EXISTS(SELECT 1 FROM {TWEETS_TABLE} WHERE article_id = $1)");
        let exists: bool = sqlx::query_scalar(&query)
            .bind(article_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    async fn get_by_telegram_message_id(
        &self,
        telegram_message_id: &str,
    ) -> Result<Option<TweetRecord>, GenieError> {
        let query = format!(
            "SELECT {RECORD_COLUMNS}
            FROM {TWEETS_TABLE}
            WHERE telegram_message_id = $1
            LIMIT 1"
        );
        let row: Option<TweetRow> = sqlx::query_as(&query)
            .bind(telegram_message_id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(TweetRecord::try_from).transpose()
    }

    async fn claim_earliest_queued(&self) -> Result<Option<TweetRecord>, GenieError> {
        let query = format!(
            "UPDATE {TWEETS_TABLE}
            SET approval_status = $2, updated_at = NOW()
            WHERE id = (
                SELECT id FROM {TWEETS_TABLE}
                WHERE approval_status = $1
                ORDER BY created_at ASC
                LIMIT 1
                FOR UPDATE SKIP LOCKED
            )
            RETURNING {RECORD_COLUMNS}"
        );
        let row: Option<TweetRow> = sqlx::query_as(&query)
            .bind(ApprovalStatus::Queued.as_str())
            .bind(ApprovalStatus::Pending.as_str())
            .fetch_optional(&self.pool)
            .await?;
        row.map(TweetRecord::try_from).transpose()
    }

    async fn transition_approval_status(
        &self,
        record_id: Uuid,
        from: ApprovalStatus,
        to: ApprovalStatus,
    ) -> Result<bool, GenieError> {
        let query = format!(
            "UPDATE {TWEETS_TABLE}
            SET approval_status = $1, updated_at = NOW()
            WHERE id = $2 AND approval_status = $3"
        );
        let result = sqlx::query(&query)
            .bind(to.as_str())
            .bind(record_id)
            .bind(from.as_str())
            .execute(&self.pool)
            .await?;

        let changed = result.rows_affected() == 1;
        if changed {
            info!(record_id = %record_id, from = %from, to = %to, "Updated approval status");
        } else {
            info!(record_id = %record_id, from = %from, "Approval status no longer matched");
        }
        Ok(changed)
    }

    async fn update_post_status(
        &self,
        record_id: Uuid,
        status: PostStatus,
        x_tweet_id: Option<&str>,
    ) -> Result<(), GenieError> {
        let query = format!(
            "UPDATE {TWEETS_TABLE}
            SET post_status = $1, x_tweet_id = $2, updated_at = NOW()
            WHERE id = $3"
        );
        sqlx::query(&query)
            .bind(status.as_str())
            .bind(x_tweet_id)
            .bind(record_id)
            .execute(&self.pool)
            .await?;
        info!(record_id = %record_id, status = %status, "Updated post status");
        Ok(())
    }

    async fn update_telegram_message_id(
        &self,
        record_id: Uuid,
        telegram_message_id: &str,
    ) -> Result<(), GenieError> {
        let query = format!(
            "UPDATE {TWEETS_TABLE} SET telegram_message_id = $1, updated_at = NOW() WHERE id = $2"
        );
        sqlx::query(&query)
            .bind(telegram_message_id)
            .bind(record_id)
            .execute(&self.pool)
            .await?;
        info!(record_id = %record_id, "Stored telegram_message_id");
        Ok(())
    }
}
