//! Service seams between the pipelines and the outside world.
//!
//! Every external system the workflows touch (OpenAI, Postgres, Telegram, X,
//! SQS) sits behind one of these traits so the approval and pipeline logic can
//! be driven end to end with in-memory implementations.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::core::models::{
    ApprovalStatus, CuratedArticle, FeedArticle, NewTweet, PostStatus, ProcessingTask, TweetRecord,
};
use crate::errors::GenieError;

/// Produces text from a system/user prompt pair.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, system_prompt: &str, user_prompt: &str)
    -> Result<String, GenieError>;
}

/// Persistence for generated tweets and their approval lifecycle.
#[async_trait]
pub trait TweetStore: Send + Sync {
    async fn create_tweet(&self, tweet: &NewTweet) -> Result<Uuid, GenieError>;

    async fn tweet_exists_for_article(&self, article_id: &str) -> Result<bool, GenieError>;

    async fn get_by_telegram_message_id(
        &self,
        telegram_message_id: &str,
    ) -> Result<Option<TweetRecord>, GenieError>;

    /// Atomically move the oldest `queued` record to `pending` and return it.
    async fn claim_earliest_queued(&self) -> Result<Option<TweetRecord>, GenieError>;

    /// Compare-and-set on the approval status.
    ///
    /// Returns `false` when the record was not in `from`, so exactly one
    /// caller wins each transition.
    async fn transition_approval_status(
        &self,
        record_id: Uuid,
        from: ApprovalStatus,
        to: ApprovalStatus,
    ) -> Result<bool, GenieError>;

    async fn update_post_status(
        &self,
        record_id: Uuid,
        status: PostStatus,
        x_tweet_id: Option<&str>,
    ) -> Result<(), GenieError>;

    async fn update_telegram_message_id(
        &self,
        record_id: Uuid,
        telegram_message_id: &str,
    ) -> Result<(), GenieError>;
}

/// Source of curated articles published by Juggernaut.
#[async_trait]
pub trait ArticleSource: Send + Sync {
    async fn fetch_articles(
        &self,
        user_id: &str,
        created_at: &str,
    ) -> Result<Vec<CuratedArticle>, GenieError>;
}

/// Reader for syndicated (RSS) feeds.
#[async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch_feed(&self, feed_url: &str) -> Result<Vec<FeedArticle>, GenieError>;
}

/// Human-in-the-loop channel used for approvals and status updates.
#[async_trait]
pub trait ApprovalChannel: Send + Sync {
    /// Returns the id of the message the reviewer replies to.
    async fn send_tweet_for_approval(
        &self,
        tweet_text: &str,
        article_id: &str,
        web_url: &str,
    ) -> Result<String, GenieError>;

    async fn send_status_notification(&self, message: &str) -> Result<(), GenieError>;
}

/// Social network the approved tweets end up on.
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Returns the id of the published post.
    async fn post(&self, text: &str) -> Result<String, GenieError>;
}

/// Hand-off between the API function and the worker.
#[async_trait]
pub trait TaskQueue: Send + Sync {
    async fn enqueue(&self, task: &ProcessingTask) -> Result<(), GenieError>;
}

/// Everything the approval flow and the pipelines need.
#[derive(Clone)]
pub struct Services {
    pub generator: Arc<dyn TextGenerator>,
    pub store: Arc<dyn TweetStore>,
    pub articles: Arc<dyn ArticleSource>,
    pub feeds: Arc<dyn FeedSource>,
    pub approvals: Arc<dyn ApprovalChannel>,
    pub publisher: Arc<dyn Publisher>,
}
