use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde_json::{Value, json};
use std::sync::LazyLock;
use std::time::Duration;
use tracing::{error, info};
use uuid::Uuid;

use super::oauth::{OAuthCredentials, authorization_header};
use crate::errors::GenieError;
use crate::services::Publisher;

pub const X_API_BASE: &str = "https://api.twitter.com";

static HTTP_CLIENT: LazyLock<Client> = LazyLock::new(|| {
    Client::builder()
        .timeout(Duration::from_secs(20))
        .build()
        .unwrap_or_else(|_| Client::new())
});

/// Posts tweets with user-context OAuth 1.0a credentials.
pub struct XClient {
    credentials: OAuthCredentials,
    api_base: String,
}

impl XClient {
    #[must_use]
    pub fn new(credentials: OAuthCredentials) -> Self {
        Self {
            credentials,
            api_base: X_API_BASE.to_string(),
        }
    }

    #[must_use]
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    /// Publish `text` and return the new tweet id. Never retried.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, X rejects it, or the response
    /// carries no tweet id.
    pub async fn post_tweet(&self, text: &str) -> Result<String, GenieError> {
        let url = format!("{}/2/tweets", self.api_base);
        let nonce = Uuid::new_v4().simple().to_string();
        let timestamp = Utc::now().timestamp().to_string();
        let auth = authorization_header("POST", &url, &self.credentials, &nonce, &timestamp, &[])?;

        info!("Posting tweet to X");
        let response = HTTP_CLIENT
            .post(&url)
            .header("Authorization", auth)
            .json(&json!({ "text": text }))
            .send()
            .await
            .map_err(|e| GenieError::HttpError(format!("X request failed: {}", e.without_url())))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            GenieError::XPlatformError(format!("Failed to read X response: {}", e.without_url()))
        })?;

        if !status.is_success() {
            error!(status = %status, "X rejected the tweet");
            return Err(GenieError::XPlatformError(format!(
                "X API error (status {status}): {body}"
            )));
        }

        let tweet_id = parse_tweet_id(&body)?;
        info!(tweet_id = %tweet_id, "Tweet posted");
        Ok(tweet_id)
    }
}

fn parse_tweet_id(body: &str) -> Result<String, GenieError> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| GenieError::XPlatformError(format!("Unexpected X response: {e}")))?;
    value
        .pointer("/data/id")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| GenieError::XPlatformError(format!("X response missing data.id: {body}")))
}

#[async_trait]
impl Publisher for XClient {
    async fn post(&self, text: &str) -> Result<String, GenieError> {
        self.post_tweet(text).await
    }
}
