mod common;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use common::{CHAT_ID, FakeQueue, Harness, test_config};
use genie::api::route;
use genie::api::signature::compute_signature;
use genie::core::models::{ApprovalStatus, ProcessingTask};
use serde_json::{Value, json};
use std::time::{SystemTime, UNIX_EPOCH};

fn event(method: &str, path: &str, body: &str, headers: Value) -> Value {
    json!({
        "rawPath": path,
        "requestContext": {"http": {"method": method}},
        "headers": headers,
        "body": body,
        "isBase64Encoded": false
    })
}

fn body_of(response: &Value) -> Value {
    serde_json::from_str(response["body"].as_str().unwrap()).unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let h = Harness::new();
    let queue = FakeQueue::default();
    let ev = event("GET", "/health", "", json!({}));
    let resp = route(&test_config(), &h.services, &queue, &ev).await;

    assert_eq!(resp["statusCode"], 200);
    assert_eq!(
        body_of(&resp),
        json!({"status": "ok", "service": "genie-in-the-bottle"})
    );
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let h = Harness::new();
    let queue = FakeQueue::default();
    let config = test_config();

    for (method, path) in [("GET", "/nope"), ("GET", "/webhook/juggernaut"), ("POST", "/health")] {
        let resp = route(&config, &h.services, &queue, &event(method, path, "", json!({}))).await;
        assert_eq!(resp["statusCode"], 404, "{method} {path}");
    }
}

#[tokio::test]
async fn test_juggernaut_webhook_queues_curated_feed() {
    let h = Harness::new();
    let queue = FakeQueue::default();
    let body = r#"{"user_id": "u-42", "created_at": "2025-03-01T12:00:00Z"}"#;

    let resp = route(
        &test_config(),
        &h.services,
        &queue,
        &event("POST", "/webhook/juggernaut", body, json!({})),
    )
    .await;

    assert_eq!(resp["statusCode"], 202);
    let payload = body_of(&resp);
    assert_eq!(payload["message"], "Queued");

    let tasks = queue.tasks.lock().unwrap().clone();
    assert_eq!(tasks.len(), 1);
    match &tasks[0] {
        ProcessingTask::CuratedFeed {
            correlation_id,
            user_id,
            created_at,
        } => {
            assert_eq!(payload["correlation_id"], correlation_id.as_str());
            assert_eq!(user_id, "u-42");
            assert_eq!(created_at, "2025-03-01T12:00:00Z");
        }
        other => panic!("unexpected task {other:?}"),
    }
}

#[tokio::test]
async fn test_juggernaut_webhook_validates_payload() {
    let h = Harness::new();
    let queue = FakeQueue::default();
    let config = test_config();

    let ev = event("POST", "/webhook/juggernaut", "{not json", json!({}));
    let resp = route(&config, &h.services, &queue, &ev).await;
    assert_eq!(resp["statusCode"], 400);
    assert_eq!(body_of(&resp)["error"], "Invalid JSON payload");

    let resp = route(
        &config,
        &h.services,
        &queue,
        &event("POST", "/webhook/juggernaut", r#"{"user_id": "u", "created_at": ""}"#, json!({})),
    )
    .await;
    assert_eq!(resp["statusCode"], 400);
    assert_eq!(
        body_of(&resp)["error"],
        "Missing required fields: user_id and created_at"
    );
    assert!(queue.tasks.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_juggernaut_webhook_queue_failure_is_500() {
    let h = Harness::new();
    let queue = FakeQueue::default();
    *queue.fail.lock().unwrap() = true;

    let resp = route(
        &test_config(),
        &h.services,
        &queue,
        &event("POST", "/webhook/juggernaut", r#"{"user_id": "u", "created_at": "c"}"#, json!({})),
    )
    .await;
    assert_eq!(resp["statusCode"], 500);
}

#[tokio::test]
async fn test_juggernaut_signature_is_enforced_when_configured() {
    let h = Harness::new();
    let queue = FakeQueue::default();
    let mut config = test_config();
    config.juggernaut_signing_secret = Some("shh".into());
    let body = r#"{"user_id": "u", "created_at": "c"}"#;

    let ev = event("POST", "/webhook/juggernaut", body, json!({}));
    let resp = route(&config, &h.services, &queue, &ev).await;
    assert_eq!(resp["statusCode"], 401);

    let ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs()
        .to_string();
    let headers = json!({
        "x-genie-signature": compute_signature(&ts, body, "shh"),
        "x-genie-request-timestamp": ts,
    });
    let ev = event("POST", "/webhook/juggernaut", body, headers);
    let resp = route(&config, &h.services, &queue, &ev).await;
    assert_eq!(resp["statusCode"], 202);
}

#[tokio::test]
async fn test_telegram_webhook_posts_approved_tweet() {
    let h = Harness::new();
    let queue = FakeQueue::default();
    h.store.seed("a", "Tweet A", "https://ex.test/a", ApprovalStatus::Pending, Some("77"), 60);

    let update = json!({
        "update_id": 1,
        "message": {
            "message_id": 78,
            "chat": {"id": CHAT_ID.parse::<i64>().unwrap()},
            "text": "approve",
            "reply_to_message": {"message_id": 77}
        }
    })
    .to_string();
    let mut ev = event("POST", "/webhook/telegram", &BASE64.encode(&update), json!({}));
    ev["isBase64Encoded"] = json!(true);

    let resp = route(&test_config(), &h.services, &queue, &ev).await;
    assert_eq!(resp["statusCode"], 200);
    let payload = body_of(&resp);
    assert_eq!(payload["message"], "Tweet posted successfully");
    assert_eq!(payload["tweet_id"], "1890000000000000001");
    assert_eq!(h.publisher.posted().len(), 1);
}

#[tokio::test]
async fn test_telegram_webhook_non_message_and_failures() {
    let h = Harness::new();
    let queue = FakeQueue::default();
    let config = test_config();

    let resp = route(
        &config,
        &h.services,
        &queue,
        &event("POST", "/webhook/telegram", r#"{"update_id": 5, "callback_query": {}}"#, json!({})),
    )
    .await;
    assert_eq!(resp["statusCode"], 200);
    assert_eq!(body_of(&resp)["message"], "Not a message update");

    h.store.seed("a", "Tweet A", "", ApprovalStatus::Pending, Some("77"), 60);
    h.publisher.fail_with("forbidden");
    let update = json!({
        "message": {
            "message_id": 78,
            "chat": {"id": CHAT_ID},
            "text": "yes",
            "reply_to_message": {"message_id": 77}
        }
    })
    .to_string();
    let ev = event("POST", "/webhook/telegram", &update, json!({}));
    let resp = route(&config, &h.services, &queue, &ev).await;
    assert_eq!(resp["statusCode"], 500);
    assert_eq!(body_of(&resp)["error"], "Failed to post tweet to X");

    *h.store.fail_reads.lock().unwrap() = true;
    let ev = event("POST", "/webhook/telegram", &update, json!({}));
    let resp = route(&config, &h.services, &queue, &ev).await;
    assert_eq!(resp["statusCode"], 500);
    assert_eq!(body_of(&resp)["error"], "Failed to read tweet record");
}

#[tokio::test]
async fn test_telegram_secret_token_checked() {
    let h = Harness::new();
    let queue = FakeQueue::default();
    let mut config = test_config();
    config.telegram_webhook_secret = Some("tg-secret".into());
    let body = r#"{"update_id": 5}"#;

    let ev = event("POST", "/webhook/telegram", body, json!({}));
    let resp = route(&config, &h.services, &queue, &ev).await;
    assert_eq!(resp["statusCode"], 401);

    let headers = json!({"x-telegram-bot-api-secret-token": "tg-secret"});
    let ev = event("POST", "/webhook/telegram", body, headers);
    let resp = route(&config, &h.services, &queue, &ev).await;
    assert_eq!(resp["statusCode"], 200);
}
