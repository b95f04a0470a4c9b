mod common;

use common::{Harness, curated, feed_article, test_config};
use genie::core::models::ProcessingTask;
use genie::worker::{batch_item_failures, process_records, process_task};
use serde_json::json;
use std::io::Write;

fn sqs_event(records: &[(&str, String)]) -> serde_json::Value {
    let records: Vec<_> = records
        .iter()
        .map(|(id, body)| json!({"messageId": id, "body": body}))
        .collect();
    json!({ "Records": records })
}

fn curated_task() -> String {
    serde_json::to_string(&ProcessingTask::CuratedFeed {
        correlation_id: "c1".into(),
        user_id: "u".into(),
        created_at: "2025-01-01T00:00:00Z".into(),
    })
    .unwrap()
}

#[tokio::test]
async fn test_processes_every_record_and_reports_failed_ids() {
    let h = Harness::new();
    *h.articles.articles.lock().unwrap() =
        vec![curated("art-1", Some("https://ex.test/1"), "Summary")];
    h.generator.push_ok(r#"{"art-1": "A tweet"}"#);

    let event = sqs_event(&[("m-1", curated_task()), ("m-2", "not a task".to_string())]);

    let failed = process_records(&test_config(), &h.services, &event).await;
    assert_eq!(failed, vec!["m-2".to_string()]);
    assert_eq!(h.store.all().len(), 1);
    assert_eq!(h.approvals.sent().len(), 1);
}

#[tokio::test]
async fn test_redelivered_batch_does_not_duplicate_tweets() {
    let h = Harness::new();
    *h.articles.articles.lock().unwrap() =
        vec![curated("art-1", Some("https://ex.test/1"), "Summary")];
    h.generator.push_ok(r#"{"art-1": "A tweet"}"#);

    let event = sqs_event(&[("m-1", curated_task()), ("m-2", "not a task".to_string())]);
    let first = process_records(&test_config(), &h.services, &event).await;
    let second = process_records(&test_config(), &h.services, &event).await;

    assert_eq!(first, vec!["m-2".to_string()]);
    assert_eq!(second, vec!["m-2".to_string()]);
    let stored: Vec<_> = h
        .store
        .all()
        .into_iter()
        .filter(|r| r.article_id == "art-1")
        .collect();
    assert_eq!(stored.len(), 1);
    assert_eq!(h.generator.calls(), 1);
}

#[tokio::test]
async fn test_empty_event_has_no_failures() {
    let h = Harness::new();
    assert!(
        process_records(&test_config(), &h.services, &json!({}))
            .await
            .is_empty()
    );
}

#[test]
fn test_partial_batch_response_shape() {
    assert_eq!(
        batch_item_failures(&["m-2".to_string()]),
        json!({"batchItemFailures": [{"itemIdentifier": "m-2"}]})
    );
    assert_eq!(batch_item_failures(&[]), json!({"batchItemFailures": []}));
}

#[tokio::test]
async fn test_task_wire_format() {
    let task: ProcessingTask = serde_json::from_str(
        r#"{"kind": "curated_feed", "correlation_id": "c", "user_id": "u", "created_at": "t"}"#,
    )
    .unwrap();
    assert_eq!(task.correlation_id(), "c");

    let sweep = serde_json::to_value(ProcessingTask::SubstackSweep {
        correlation_id: "s".into(),
    })
    .unwrap();
    assert_eq!(sweep, json!({"kind": "substack_sweep", "correlation_id": "s"}));
}

#[tokio::test]
async fn test_substack_sweep_reads_account_file() {
    let h = Harness::new();
    h.feeds.feeds.lock().unwrap().insert(
        "https://alpha.substack.com/feed".into(),
        vec![feed_article(
            "Post",
            "https://alpha.substack.com/p/post",
            "<p>Body text</p>",
        )],
    );
    h.generator.push_ok(r#"{"tweets": ["Risky"]}"#);

    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "accounts:\n  - alpha").unwrap();
    let mut config = test_config();
    config.substack_accounts_path = file.path().to_string_lossy().into_owned();

    let outcome = process_task(
        &config,
        &h.services,
        &ProcessingTask::SubstackSweep {
            correlation_id: "s".into(),
        },
    )
    .await
    .unwrap();
    assert_eq!(outcome.processed, 1);
    assert_eq!(h.store.all()[0].tweet_text, "Risky");
}

#[tokio::test]
async fn test_missing_account_file_fails_the_task() {
    let h = Harness::new();
    let mut config = test_config();
    config.substack_accounts_path = "/nonexistent/accounts.yaml".into();

    let result = process_task(
        &config,
        &h.services,
        &ProcessingTask::SubstackSweep {
            correlation_id: "s".into(),
        },
    )
    .await;
    assert!(result.is_err());
}
