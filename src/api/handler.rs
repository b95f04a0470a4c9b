//! API Lambda handler - thin router over the webhook handlers.

use lambda_runtime::{Error, LambdaEvent};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::{helpers, parsing, signature};
use crate::approval::{ReplyOutcome, handle_reply};
use crate::core::config::AppConfig;
use crate::core::models::ProcessingTask;
use crate::errors::GenieError;
use crate::services::{Services, TaskQueue};
use crate::telegram::parse_update;

pub const SERVICE_NAME: &str = "genie-in-the-bottle";
pub const TELEGRAM_SECRET_HEADER: &str = "X-Telegram-Bot-Api-Secret-Token";

/// Long-lived state shared across invocations of the API function.
#[derive(Clone)]
pub struct ApiState {
    pub config: AppConfig,
    pub services: Services,
    pub queue: Arc<dyn TaskQueue>,
}

/// Lambda handler for the API entrypoint.
///
/// # Errors
///
/// Never fails at the Lambda level; every problem becomes an HTTP response.
#[tracing::instrument(level = "info", skip(state, event))]
pub async fn function_handler(
    state: &ApiState,
    event: LambdaEvent<Value>,
) -> Result<Value, Error> {
    Ok(route(&state.config, &state.services, state.queue.as_ref(), &event.payload).await)
}

/// Dispatch an API Gateway event by method and path.
pub async fn route(
    config: &AppConfig,
    services: &Services,
    queue: &dyn TaskQueue,
    payload: &Value,
) -> Value {
    let method = parsing::request_method(payload).unwrap_or("").to_ascii_uppercase();
    let path = parsing::request_path(payload).unwrap_or("");
    info!(method = %method, raw_path = %path, "API request");

    match (method.as_str(), path) {
        ("GET", "/health") => {
            helpers::json_response(200, &json!({ "status": "ok", "service": SERVICE_NAME }))
        }
        ("POST", "/webhook/juggernaut") => handle_juggernaut(config, queue, payload).await,
        ("POST", "/webhook/telegram") => handle_telegram(config, services, payload).await,
        _ => {
            warn!(method = %method, raw_path = %path, "No route");
            helpers::err_response(404, "Not found")
        }
    }
}

fn extract_body(payload: &Value) -> Result<String, Value> {
    parsing::request_body(payload).map_err(|e| {
        error!("Failed to read request body: {}", e);
        helpers::err_response(400, "Invalid body format")
    })
}

fn verify_juggernaut_signature(body: &str, headers: &Value, secret: &str) -> Result<(), Value> {
    let Some(sig) = parsing::get_header_value(headers, signature::SIGNATURE_HEADER) else {
        error!("Missing {} header", signature::SIGNATURE_HEADER);
        return Err(helpers::err_response(401, "Missing signature header"));
    };

    let Some(timestamp) = parsing::get_header_value(headers, signature::TIMESTAMP_HEADER) else {
        error!("Missing {} header", signature::TIMESTAMP_HEADER);
        return Err(helpers::err_response(401, "Missing timestamp header"));
    };

    if !signature::verify_signature(body, timestamp, sig, secret) {
        return Err(helpers::err_response(401, "Invalid signature"));
    }

    Ok(())
}

#[derive(Debug, Deserialize)]
struct JuggernautWebhook {
    user_id: Option<String>,
    created_at: Option<String>,
}

async fn handle_juggernaut(config: &AppConfig, queue: &dyn TaskQueue, payload: &Value) -> Value {
    let body = match extract_body(payload) {
        Ok(b) => b,
        Err(response) => return response,
    };
    let no_headers = json!({});
    let headers = payload.get("headers").unwrap_or(&no_headers);

    if let Some(secret) = config.juggernaut_signing_secret.as_deref() {
        if let Err(response) = verify_juggernaut_signature(&body, headers, secret) {
            return response;
        }
        info!("Juggernaut signature verified");
    }

    let webhook: JuggernautWebhook = match serde_json::from_str(&body) {
        Ok(w) => w,
        Err(e) => {
            error!("Invalid Juggernaut payload: {}", e);
            return helpers::err_response(400, "Invalid JSON payload");
        }
    };

    let non_empty = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
    let (Some(user_id), Some(created_at)) =
        (non_empty(webhook.user_id), non_empty(webhook.created_at))
    else {
        return helpers::err_response(400, "Missing required fields: user_id and created_at");
    };

    let correlation_id = Uuid::new_v4().to_string();
    info!(
        correlation_id = %correlation_id,
        user_id = %user_id,
        created_at = %created_at,
        "Queueing curated feed"
    );

    let task = ProcessingTask::CuratedFeed {
        correlation_id: correlation_id.clone(),
        user_id,
        created_at,
    };

    match queue.enqueue(&task).await {
        Ok(()) => helpers::json_response(
            202,
            &json!({ "message": "Queued", "correlation_id": correlation_id }),
        ),
        Err(e) => {
            error!(correlation_id = %correlation_id, "Failed to queue task: {}", e);
            helpers::err_response(500, "Failed to queue processing task")
        }
    }
}

async fn handle_telegram(config: &AppConfig, services: &Services, payload: &Value) -> Value {
    let no_headers = json!({});
    let headers = payload.get("headers").unwrap_or(&no_headers);

    if let Some(secret) = config.telegram_webhook_secret.as_deref() {
        let received = parsing::get_header_value(headers, TELEGRAM_SECRET_HEADER);
        if received != Some(secret) {
            error!("Telegram secret token mismatch");
            return helpers::err_response(401, "Invalid secret token");
        }
    }

    let body = match extract_body(payload) {
        Ok(b) => b,
        Err(response) => return response,
    };

    let update: Value = match serde_json::from_str(&body) {
        Ok(v) => v,
        Err(e) => {
            error!("Invalid Telegram update: {}", e);
            return helpers::err_response(400, "Invalid JSON payload");
        }
    };

    let Some(incoming) = parse_update(&update) else {
        return helpers::message_response(200, "Not a message update");
    };

    match handle_reply(services, &incoming, &config.telegram_chat_id).await {
        Ok(outcome) => {
            let mut body = json!({ "message": outcome.message() });
            if let ReplyOutcome::Posted(tweet_id) = &outcome {
                body["tweet_id"] = json!(tweet_id);
            }
            helpers::json_response(200, &body)
        }
        Err(GenieError::DatabaseError(e)) => {
            error!("Tweet store failure: {}", e);
            helpers::err_response(500, "Failed to read tweet record")
        }
        Err(e) => {
            error!("Reply handling failed: {}", e);
            helpers::err_response(500, "Failed to post tweet to X")
        }
    }
}
