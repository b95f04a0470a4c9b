#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use genie::core::config::AppConfig;
use genie::core::models::{
    ApprovalStatus, CuratedArticle, FeedArticle, NewTweet, PostStatus, ProcessingTask, TweetRecord,
};
use genie::errors::GenieError;
use genie::services::{
    ApprovalChannel, ArticleSource, FeedSource, Publisher, Services, TaskQueue, TextGenerator,
    TweetStore,
};

pub const CHAT_ID: &str = "-1001";

pub fn test_config() -> AppConfig {
    AppConfig {
        database_url: "postgres://localhost/genie".into(),
        openai_api_key: "sk-test".into(),
        openai_org_id: None,
        openai_model: "gpt-4o-mini".into(),
        openai_temperature: 0.7,
        telegram_bot_token: "bot-token".into(),
        telegram_chat_id: CHAT_ID.into(),
        telegram_webhook_secret: None,
        x_api_key: "ck".into(),
        x_api_secret: "cs".into(),
        x_access_token: "at".into(),
        x_access_token_secret: "ats".into(),
        processing_queue_url: Some("https://sqs.test/queue".into()),
        juggernaut_signing_secret: None,
        substack_accounts_path: "config/substack_accounts.yaml".into(),
    }
}

#[derive(Default)]
pub struct FakeGenerator {
    responses: Mutex<VecDeque<Result<String, String>>>,
    pub prompts: Mutex<Vec<(String, String)>>,
}

impl FakeGenerator {
    pub fn push_ok(&self, text: &str) {
        self.responses.lock().unwrap().push_back(Ok(text.to_string()));
    }

    pub fn push_err(&self, message: &str) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Err(message.to_string()));
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl TextGenerator for FakeGenerator {
    async fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String, GenieError> {
        self.prompts
            .lock()
            .unwrap()
            .push((system_prompt.to_string(), user_prompt.to_string()));
        match self.responses.lock().unwrap().pop_front() {
            Some(Ok(text)) => Ok(text),
            Some(Err(message)) => Err(GenieError::OpenAIError(message)),
            None => Err(GenieError::OpenAIError("no scripted response".into())),
        }
    }
}

#[derive(Default)]
pub struct FakeStore {
    pub records: Mutex<Vec<TweetRecord>>,
    pub fail_reads: Mutex<bool>,
    /// Tweet texts whose insert fails.
    pub reject_inserts: Mutex<Vec<String>>,
}

impl FakeStore {
    /// Insert a record directly, `age_secs` in the past.
    pub fn seed(
        &self,
        article_id: &str,
        text: &str,
        web_url: &str,
        status: ApprovalStatus,
        telegram_message_id: Option<&str>,
        age_secs: i64,
    ) -> Uuid {
        let now = Utc::now() - Duration::seconds(age_secs);
        let id = Uuid::new_v4();
        self.records.lock().unwrap().push(TweetRecord {
            id,
            article_id: article_id.into(),
            article_title: article_id.into(),
            tweet_text: text.into(),
            web_url: web_url.into(),
            approval_status: status,
            post_status: PostStatus::Pending,
            telegram_message_id: telegram_message_id.map(str::to_string),
            x_tweet_id: None,
            created_at: now,
            updated_at: now,
        });
        id
    }

    pub fn get(&self, id: Uuid) -> TweetRecord {
        self.records
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .expect("record exists")
    }

    pub fn all(&self) -> Vec<TweetRecord> {
        self.records.lock().unwrap().clone()
    }

    fn check_reads(&self) -> Result<(), GenieError> {
        if *self.fail_reads.lock().unwrap() {
            return Err(GenieError::DatabaseError("connection refused".into()));
        }
        Ok(())
    }

    fn update(&self, id: Uuid, f: impl FnOnce(&mut TweetRecord)) -> Result<(), GenieError> {
        let mut records = self.records.lock().unwrap();
        let record = records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| GenieError::DatabaseError("no such record".into()))?;
        f(record);
        record.updated_at = Utc::now();
        Ok(())
    }
}

#[async_trait]
impl TweetStore for FakeStore {
    async fn create_tweet(&self, tweet: &NewTweet) -> Result<Uuid, GenieError> {
        if self
            .reject_inserts
            .lock()
            .unwrap()
            .contains(&tweet.tweet_text)
        {
            return Err(GenieError::DatabaseError("insert rejected".into()));
        }
        let now = Utc::now();
        let id = Uuid::new_v4();
        self.records.lock().unwrap().push(TweetRecord {
            id,
            article_id: tweet.article_id.clone(),
            article_title: tweet.article_title.clone(),
            tweet_text: tweet.tweet_text.clone(),
            web_url: tweet.web_url.clone(),
            approval_status: ApprovalStatus::Queued,
            post_status: PostStatus::Pending,
            telegram_message_id: None,
            x_tweet_id: None,
            created_at: now,
            updated_at: now,
        });
        Ok(id)
    }

    async fn tweet_exists_for_article(&self, article_id: &str) -> Result<bool, GenieError> {
        self.check_reads()?;
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .any(|r| r.article_id == article_id))
    }

    async fn get_by_telegram_message_id(
        &self,
        telegram_message_id: &str,
    ) -> Result<Option<TweetRecord>, GenieError> {
        self.check_reads()?;
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.telegram_message_id.as_deref() == Some(telegram_message_id))
            .cloned())
    }

    async fn claim_earliest_queued(&self) -> Result<Option<TweetRecord>, GenieError> {
        self.check_reads()?;
        let mut records = self.records.lock().unwrap();
        let Some(record) = records
            .iter_mut()
            .filter(|r| r.approval_status == ApprovalStatus::Queued)
            .min_by_key(|r| r.created_at)
        else {
            return Ok(None);
        };
        record.approval_status = ApprovalStatus::Pending;
        record.updated_at = Utc::now();
        Ok(Some(record.clone()))
    }

    async fn transition_approval_status(
        &self,
        record_id: Uuid,
        from: ApprovalStatus,
        to: ApprovalStatus,
    ) -> Result<bool, GenieError> {
        let mut records = self.records.lock().unwrap();
        let record = records
            .iter_mut()
            .find(|r| r.id == record_id)
            .ok_or_else(|| GenieError::DatabaseError("no such record".into()))?;
        if record.approval_status != from {
            return Ok(false);
        }
        record.approval_status = to;
        record.updated_at = Utc::now();
        Ok(true)
    }

    async fn update_post_status(
        &self,
        record_id: Uuid,
        status: PostStatus,
        x_tweet_id: Option<&str>,
    ) -> Result<(), GenieError> {
        self.update(record_id, |r| {
            r.post_status = status;
            r.x_tweet_id = x_tweet_id.map(str::to_string);
        })
    }

    async fn update_telegram_message_id(
        &self,
        record_id: Uuid,
        telegram_message_id: &str,
    ) -> Result<(), GenieError> {
        self.update(record_id, |r| {
            r.telegram_message_id = Some(telegram_message_id.to_string());
        })
    }
}

/// Hands control back to the runtime after every lookup, so two replies
/// handled with `tokio::join!` both read the record before either writes.
pub struct YieldingStore(pub Arc<FakeStore>);

#[async_trait]
impl TweetStore for YieldingStore {
    async fn create_tweet(&self, tweet: &NewTweet) -> Result<Uuid, GenieError> {
        self.0.create_tweet(tweet).await
    }

    async fn tweet_exists_for_article(&self, article_id: &str) -> Result<bool, GenieError> {
        self.0.tweet_exists_for_article(article_id).await
    }

    async fn get_by_telegram_message_id(
        &self,
        telegram_message_id: &str,
    ) -> Result<Option<TweetRecord>, GenieError> {
        let record = self.0.get_by_telegram_message_id(telegram_message_id).await;
        tokio::task::yield_now().await;
        record
    }

    async fn claim_earliest_queued(&self) -> Result<Option<TweetRecord>, GenieError> {
        self.0.claim_earliest_queued().await
    }

    async fn transition_approval_status(
        &self,
        record_id: Uuid,
        from: ApprovalStatus,
        to: ApprovalStatus,
    ) -> Result<bool, GenieError> {
        self.0.transition_approval_status(record_id, from, to).await
    }

    async fn update_post_status(
        &self,
        record_id: Uuid,
        status: PostStatus,
        x_tweet_id: Option<&str>,
    ) -> Result<(), GenieError> {
        self.0.update_post_status(record_id, status, x_tweet_id).await
    }

    async fn update_telegram_message_id(
        &self,
        record_id: Uuid,
        telegram_message_id: &str,
    ) -> Result<(), GenieError> {
        self.0
            .update_telegram_message_id(record_id, telegram_message_id)
            .await
    }
}

#[derive(Default)]
pub struct FakeArticles {
    pub articles: Mutex<Vec<CuratedArticle>>,
}

#[async_trait]
impl ArticleSource for FakeArticles {
    async fn fetch_articles(
        &self,
        _user_id: &str,
        _created_at: &str,
    ) -> Result<Vec<CuratedArticle>, GenieError> {
        Ok(self.articles.lock().unwrap().clone())
    }
}

/// Feeds keyed by URL; unknown URLs fail like an unreachable host.
#[derive(Default)]
pub struct FakeFeeds {
    pub feeds: Mutex<HashMap<String, Vec<FeedArticle>>>,
}

#[async_trait]
impl FeedSource for FakeFeeds {
    async fn fetch_feed(&self, feed_url: &str) -> Result<Vec<FeedArticle>, GenieError> {
        self.feeds
            .lock()
            .unwrap()
            .get(feed_url)
            .cloned()
            .ok_or_else(|| GenieError::HttpError(format!("unreachable: {feed_url}")))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentApproval {
    pub message_id: String,
    pub tweet_text: String,
    pub article_id: String,
    pub web_url: String,
}

pub struct FakeApprovals {
    next_message_id: AtomicU64,
    pub sent: Mutex<Vec<SentApproval>>,
    pub notifications: Mutex<Vec<String>>,
    pub fail_sends: Mutex<bool>,
}

impl Default for FakeApprovals {
    fn default() -> Self {
        Self {
            next_message_id: AtomicU64::new(500),
            sent: Mutex::new(Vec::new()),
            notifications: Mutex::new(Vec::new()),
            fail_sends: Mutex::new(false),
        }
    }
}

impl FakeApprovals {
    pub fn sent(&self) -> Vec<SentApproval> {
        self.sent.lock().unwrap().clone()
    }

    pub fn notifications(&self) -> Vec<String> {
        self.notifications.lock().unwrap().clone()
    }
}

#[async_trait]
impl ApprovalChannel for FakeApprovals {
    async fn send_tweet_for_approval(
        &self,
        tweet_text: &str,
        article_id: &str,
        web_url: &str,
    ) -> Result<String, GenieError> {
        if *self.fail_sends.lock().unwrap() {
            return Err(GenieError::TelegramError("chat not found".into()));
        }
        let message_id = self
            .next_message_id
            .fetch_add(1, Ordering::SeqCst)
            .to_string();
        self.sent.lock().unwrap().push(SentApproval {
            message_id: message_id.clone(),
            tweet_text: tweet_text.into(),
            article_id: article_id.into(),
            web_url: web_url.into(),
        });
        Ok(message_id)
    }

    async fn send_status_notification(&self, message: &str) -> Result<(), GenieError> {
        self.notifications.lock().unwrap().push(message.to_string());
        Ok(())
    }
}

pub struct FakePublisher {
    pub result: Mutex<Result<String, String>>,
    pub posted: Mutex<Vec<String>>,
}

impl Default for FakePublisher {
    fn default() -> Self {
        Self {
            result: Mutex::new(Ok("1890000000000000001".into())),
            posted: Mutex::new(Vec::new()),
        }
    }
}

impl FakePublisher {
    pub fn fail_with(&self, message: &str) {
        *self.result.lock().unwrap() = Err(message.to_string());
    }

    pub fn posted(&self) -> Vec<String> {
        self.posted.lock().unwrap().clone()
    }
}

#[async_trait]
impl Publisher for FakePublisher {
    async fn post(&self, text: &str) -> Result<String, GenieError> {
        self.posted.lock().unwrap().push(text.to_string());
        self.result
            .lock()
            .unwrap()
            .clone()
            .map_err(GenieError::XPlatformError)
    }
}

#[derive(Default)]
pub struct FakeQueue {
    pub tasks: Mutex<Vec<ProcessingTask>>,
    pub fail: Mutex<bool>,
}

#[async_trait]
impl TaskQueue for FakeQueue {
    async fn enqueue(&self, task: &ProcessingTask) -> Result<(), GenieError> {
        if *self.fail.lock().unwrap() {
            return Err(GenieError::AwsError("queue unavailable".into()));
        }
        self.tasks.lock().unwrap().push(task.clone());
        Ok(())
    }
}

/// All fakes plus the `Services` bundle that points at them.
pub struct Harness {
    pub generator: Arc<FakeGenerator>,
    pub store: Arc<FakeStore>,
    pub articles: Arc<FakeArticles>,
    pub feeds: Arc<FakeFeeds>,
    pub approvals: Arc<FakeApprovals>,
    pub publisher: Arc<FakePublisher>,
    pub services: Services,
}

impl Harness {
    pub fn new() -> Self {
        let generator = Arc::new(FakeGenerator::default());
        let store = Arc::new(FakeStore::default());
        let articles = Arc::new(FakeArticles::default());
        let feeds = Arc::new(FakeFeeds::default());
        let approvals = Arc::new(FakeApprovals::default());
        let publisher = Arc::new(FakePublisher::default());

        let services = Services {
            generator: generator.clone(),
            store: store.clone(),
            articles: articles.clone(),
            feeds: feeds.clone(),
            approvals: approvals.clone(),
            publisher: publisher.clone(),
        };

        Self {
            generator,
            store,
            articles,
            feeds,
            approvals,
            publisher,
            services,
        }
    }
}

pub fn curated(id: &str, web_url: Option<&str>, summary: &str) -> CuratedArticle {
    CuratedArticle {
        id: id.into(),
        title: format!("Title of {id}"),
        web_url: web_url.map(str::to_string),
        article_summary: Some(summary.into()),
        ..CuratedArticle::default()
    }
}

pub fn feed_article(title: &str, link: &str, content: &str) -> FeedArticle {
    FeedArticle {
        title: title.into(),
        link: link.into(),
        content: content.into(),
    }
}
