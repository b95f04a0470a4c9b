//! Telegram Bot API client used for approvals and status notifications.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::LazyLock;
use std::time::Duration;
use tokio_retry::RetryIf;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tracing::{error, info, warn};

use crate::errors::GenieError;
use crate::services::ApprovalChannel;

pub const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

static HTTP_CLIENT: LazyLock<Client> = LazyLock::new(|| {
    Client::builder()
        .timeout(Duration::from_secs(10))
        .build()
        .unwrap_or_else(|_| Client::new())
});

#[derive(Debug, Deserialize)]
struct SendMessageResponse {
    ok: bool,
    description: Option<String>,
    result: Option<SentMessage>,
}

#[derive(Debug, Deserialize)]
struct SentMessage {
    message_id: i64,
}

/// Escape text for Telegram's HTML parse mode.
#[must_use]
pub fn html_escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            other => out.push(other),
        }
    }
    out
}

/// Body of the approval request: the escaped tweet plus a link to the article.
#[must_use]
pub fn approval_message_html(tweet_text: &str, web_url: &str) -> String {
    format!(
        "{}\n<a href=\"{}\">Read full article here</a>",
        html_escape(tweet_text),
        html_escape(web_url)
    )
}

#[must_use]
pub fn build_approval_payload(chat_id: &str, tweet_text: &str, web_url: &str) -> Value {
    json!({
        "chat_id": chat_id,
        "text": approval_message_html(tweet_text, web_url),
        "parse_mode": "HTML",
        "disable_web_page_preview": true
    })
}

#[must_use]
pub fn build_status_payload(chat_id: &str, message: &str) -> Value {
    json!({
        "chat_id": chat_id,
        "text": message
    })
}

pub(crate) fn is_retryable(error: &reqwest::Error) -> bool {
    error.is_connect()
}

/// Telegram bot bound to the single review chat.
pub struct TelegramBot {
    token: String,
    chat_id: String,
    api_base: String,
}

impl TelegramBot {
    #[must_use]
    pub fn new(token: String, chat_id: String) -> Self {
        Self {
            token,
            chat_id,
            api_base: TELEGRAM_API_BASE.to_string(),
        }
    }

    #[must_use]
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    /// Retry only failures where the request never reached Telegram.
    ///
    /// A timeout after the request was written may still have delivered the
    /// message; resending it would show the reviewer a second copy.
    async fn with_retry<F, Fut, T>(&self, operation: F) -> Result<T, reqwest::Error>
    where
        F: FnMut() -> Fut + Send,
        Fut: std::future::Future<Output = Result<T, reqwest::Error>> + Send,
        T: Send,
    {
        let strategy = ExponentialBackoff::from_millis(2)
            .factor(50)
            .map(jitter)
            .take(3);

        RetryIf::spawn(strategy, operation, is_retryable).await
    }

    /// POST `sendMessage` and return the new message id.
    ///
    /// API-level rejections are final.
    async fn send_message(&self, payload: &Value) -> Result<i64, GenieError> {
        let url = format!("{}/bot{}/sendMessage", self.api_base, self.token);

        let response = self
            .with_retry(|| async {
                HTTP_CLIENT
                    .post(&url)
                    .json(payload)
                    .send()
                    .await
                    .inspect_err(|e| warn!("Telegram request failed: {}", e))
            })
            .await
            .map_err(|e| {
                GenieError::HttpError(format!("Telegram request failed: {}", e.without_url()))
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            GenieError::TelegramError(format!(
                "Failed to read Telegram response: {}",
                e.without_url()
            ))
        })?;

        let parsed: SendMessageResponse = serde_json::from_str(&body).map_err(|e| {
            GenieError::TelegramError(format!(
                "Unexpected Telegram response (status {status}): {e}"
            ))
        })?;

        if !parsed.ok {
            return Err(GenieError::TelegramError(format!(
                "Telegram API error: {}",
                parsed.description.unwrap_or_else(|| status.to_string())
            )));
        }

        parsed
            .result
            .map(|m| m.message_id)
            .ok_or_else(|| {
                GenieError::TelegramError("Telegram response missing result".to_string())
            })
    }

    /// # Errors
    ///
    /// Returns an error if Telegram cannot be reached or rejects the message.
    pub async fn send_tweet_for_approval(
        &self,
        tweet_text: &str,
        article_id: &str,
        web_url: &str,
    ) -> Result<String, GenieError> {
        info!(article_id = %article_id, "Sending tweet for approval to Telegram");
        let payload = build_approval_payload(&self.chat_id, tweet_text, web_url);

        let message_id = self
            .send_message(&payload)
            .await
            .inspect_err(|e| error!("Failed to send message to Telegram: {}", e))?
            .to_string();

        info!(message_id = %message_id, "Successfully sent message to Telegram");
        Ok(message_id)
    }

    /// # Errors
    ///
    /// Returns an error if Telegram cannot be reached or rejects the message.
    pub async fn send_status_notification(&self, message: &str) -> Result<(), GenieError> {
        info!("Sending status notification to Telegram");
        let payload = build_status_payload(&self.chat_id, message);

        self.send_message(&payload)
            .await
            .inspect_err(|e| error!("Failed to send status notification to Telegram: {}", e))?;

        info!("Successfully sent status notification to Telegram");
        Ok(())
    }
}

#[async_trait]
impl ApprovalChannel for TelegramBot {
    async fn send_tweet_for_approval(
        &self,
        tweet_text: &str,
        article_id: &str,
        web_url: &str,
    ) -> Result<String, GenieError> {
        TelegramBot::send_tweet_for_approval(self, tweet_text, article_id, web_url).await
    }

    async fn send_status_notification(&self, message: &str) -> Result<(), GenieError> {
        TelegramBot::send_status_notification(self, message).await
    }
}
