//! LLM (`OpenAI`) API client module
//!
//! Encapsulates all LLM API interactions for generating tweet text.

use async_trait::async_trait;
use openai_api_rs::v1::chat_completion::{ChatCompletionMessage, Content, MessageRole};
use reqwest::Client;
use serde_json::{Value, json};
use std::sync::LazyLock;
use std::time::Duration;
use tracing::info;

use crate::errors::GenieError;
use crate::services::TextGenerator;

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";

/// gpt-4o-mini has a 128k context window; keep headroom for the reply.
const MAX_INPUT_TOKENS: usize = 120_000;
const MAX_OUTPUT_TOKENS: usize = 4_096;

static HTTP_CLIENT: LazyLock<Client> = LazyLock::new(|| {
    Client::builder()
        .timeout(Duration::from_secs(120))
        .build()
        .unwrap_or_else(|_| Client::new())
});

#[must_use]
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count() / 4 + 1
}

/// LLM API client for generating tweets
pub struct LlmClient {
    api_key: String,
    org_id: Option<String>,
    model_name: String,
    temperature: f32,
    base_url: String,
}

impl LlmClient {
    #[must_use]
    pub fn new(
        api_key: String,
        org_id: Option<String>,
        model_name: String,
        temperature: f32,
    ) -> Self {
        Self {
            api_key,
            org_id,
            model_name,
            temperature,
            base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
        }
    }

    /// Point the client at a different API host (proxies, tests).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    #[must_use]
    pub fn build_prompt(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Vec<ChatCompletionMessage> {
        vec![
            ChatCompletionMessage {
                role: MessageRole::system,
                content: Content::Text(system_prompt.to_string()),
                name: None,
                tool_calls: None,
                tool_call_id: None,
            },
            ChatCompletionMessage {
                role: MessageRole::user,
                content: Content::Text(user_prompt.to_string()),
                name: None,
                tool_calls: None,
                tool_call_id: None,
            },
        ]
    }

    /// # Errors
    ///
    /// Returns an error if the prompt does not fit the context window, the
    /// HTTP request to `OpenAI` fails, or the response carries no text.
    pub async fn generate_text(
        &self,
        prompt: Vec<ChatCompletionMessage>,
    ) -> Result<String, GenieError> {
        #[cfg(feature = "debug-logs")]
        info!("Using OpenAI prompt:\n{:?}", prompt);

        let estimated_input_tokens = prompt
            .iter()
            .map(|msg| estimate_tokens(&format!("{:?}", msg.content)))
            .sum::<usize>();

        info!(
            model = %self.model_name,
            temperature = self.temperature,
            estimated_input_tokens,
            "Making OpenAI API call"
        );

        if estimated_input_tokens > MAX_INPUT_TOKENS {
            return Err(GenieError::OpenAIError(format!(
                "Prompt too large: ~{estimated_input_tokens} tokens exceeds the {MAX_INPUT_TOKENS} token budget"
            )));
        }

        let request_body = json!({
            "model": self.model_name,
            "input": build_responses_input_from_prompt(&prompt),
            "temperature": self.temperature,
            "max_output_tokens": MAX_OUTPUT_TOKENS
        });

        let mut headers = reqwest::header::HeaderMap::new();
        let auth_value = format!("Bearer {}", self.api_key)
            .parse()
            .map_err(|e| GenieError::HttpError(format!("Invalid Authorization header: {e}")))?;
        headers.insert("Authorization", auth_value);

        let content_type_value = "application/json"
            .parse()
            .map_err(|e| GenieError::HttpError(format!("Invalid Content-Type header: {e}")))?;
        headers.insert("Content-Type", content_type_value);

        if let Some(org) = &self.org_id {
            let org_value = org.parse().map_err(|e| {
                GenieError::HttpError(format!("Invalid OpenAI-Organization header: {e}"))
            })?;
            headers.insert("OpenAI-Organization", org_value);
        }

        let response = HTTP_CLIENT
            .post(format!("{}/v1/responses", self.base_url))
            .headers(headers)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| GenieError::HttpError(format!("OpenAI API request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_else(|e| {
                format!("Failed to read error response body (status {status}): {e}")
            });
            return Err(GenieError::OpenAIError(format!(
                "OpenAI API error (status {status}): {error_text}"
            )));
        }

        let response_json: Value = response.json().await.map_err(|e| {
            GenieError::OpenAIError(format!("Failed to parse OpenAI response: {e}"))
        })?;

        let text = extract_output_text(&response_json)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| GenieError::OpenAIError("OpenAI returned empty response".to_string()))?;

        info!("OpenAI API call successful");
        Ok(text)
    }
}

#[async_trait]
impl TextGenerator for LlmClient {
    async fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String, GenieError> {
        let prompt = self.build_prompt(system_prompt, user_prompt);
        self.generate_text(prompt).await
    }
}

/// Pull the generated text out of a Responses API payload.
///
/// Prefers the `output_text` convenience field and otherwise joins every
/// `output_text` content part.
#[must_use]
pub fn extract_output_text(response_json: &Value) -> Option<String> {
    if let Some(text) = response_json.get("output_text").and_then(|v| v.as_str()) {
        return Some(text.to_string());
    }

    let mut collected: Vec<String> = Vec::new();
    if let Some(items) = response_json.get("output").and_then(|o| o.as_array()) {
        for item in items {
            let Some(parts) = item.get("content").and_then(|c| c.as_array()) else {
                continue;
            };
            for p in parts {
                let is_output_text = p
                    .get("type")
                    .and_then(|t| t.as_str())
                    .is_some_and(|t| t == "output_text");
                if !is_output_text {
                    continue;
                }
                if let Some(s) = p.get("text").and_then(|t| t.as_str()) {
                    collected.push(s.to_string());
                } else if let Some(s) = p
                    .get("text")
                    .and_then(|t| t.get("value"))
                    .and_then(|v| v.as_str())
                {
                    collected.push(s.to_string());
                }
            }
        }
    }

    if collected.is_empty() {
        None
    } else {
        Some(collected.join("\n"))
    }
}

/// Build the Responses API `input` from a chat-style prompt.
///
/// Assistant turns are dropped (Responses treats them as output); every
/// remaining text message becomes a single `input_text` part.
pub(crate) fn build_responses_input_from_prompt(prompt: &[ChatCompletionMessage]) -> Vec<Value> {
    prompt
        .iter()
        .filter_map(|m| {
            let role_str = match m.role {
                MessageRole::assistant => return None,
                MessageRole::system => "system",
                MessageRole::user | MessageRole::function | MessageRole::tool => "user",
            };
            let Content::Text(text) = &m.content else {
                return None;
            };
            Some(json!({
                "role": role_str,
                "content": [{ "type": "input_text", "text": text }]
            }))
        })
        .collect()
}
