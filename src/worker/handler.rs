use lambda_runtime::{Error, LambdaEvent};
use serde_json::{Value, json};
use tracing::{error, info, warn};

use crate::core::config::AppConfig;
use crate::core::models::{ProcessingOutcome, ProcessingTask};
use crate::errors::GenieError;
use crate::feeds::load_substack_accounts;
use crate::pipeline::{process_curated_feed, process_substack_feeds};
use crate::services::Services;

/// Long-lived state shared across invocations of the worker function.
#[derive(Clone)]
pub struct WorkerState {
    pub config: AppConfig,
    pub services: Services,
}

/// Run one queued task through its pipeline.
pub async fn process_task(
    config: &AppConfig,
    services: &Services,
    task: &ProcessingTask,
) -> Result<ProcessingOutcome, GenieError> {
    match task {
        ProcessingTask::CuratedFeed {
            user_id, created_at, ..
        } => process_curated_feed(services, user_id, created_at).await,
        ProcessingTask::SubstackSweep { .. } => {
            let accounts = load_substack_accounts(&config.substack_accounts_path)?;
            process_substack_feeds(services, &accounts).await
        }
    }
}

fn parse_record(record: &Value) -> Result<ProcessingTask, GenieError> {
    let body = record
        .get("body")
        .and_then(Value::as_str)
        .ok_or_else(|| GenieError::ParseError("Failed to extract SQS message body".to_string()))?;
    serde_json::from_str(body).map_err(|e| {
        GenieError::ParseError(format!(
            "Failed to parse SQS message body into ProcessingTask: {e}"
        ))
    })
}

fn message_id(record: &Value) -> String {
    record
        .get("messageId")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Process every record in an SQS event and return the message ids that failed.
pub async fn process_records(
    config: &AppConfig,
    services: &Services,
    payload: &Value,
) -> Vec<String> {
    let records = payload
        .get("Records")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();
    info!("Worker received {} records", records.len());

    let mut failed = Vec::new();
    for record in records {
        let task = match parse_record(record) {
            Ok(task) => task,
            Err(e) => {
                error!(message_id = %message_id(record), "{}", e);
                failed.push(message_id(record));
                continue;
            }
        };

        let correlation_id = task.correlation_id().to_string();
        info!(correlation_id = %correlation_id, "Processing task: {:?}", task);

        match process_task(config, services, &task).await {
            Ok(outcome) => info!(
                correlation_id = %correlation_id,
                processed = outcome.processed,
                total = outcome.total,
                "{}",
                outcome.message
            ),
            Err(e) => {
                error!(correlation_id = %correlation_id, "Task failed: {}", e);
                failed.push(message_id(record));
            }
        }
    }
    failed
}

/// SQS partial batch response naming the records to redeliver.
#[must_use]
pub fn batch_item_failures(failed: &[String]) -> Value {
    let items: Vec<Value> = failed
        .iter()
        .map(|id| json!({ "itemIdentifier": id }))
        .collect();
    json!({ "batchItemFailures": items })
}

/// Lambda handler for the Worker entrypoint.
///
/// Only failed records are reported back, so SQS redelivers those alone.
///
/// # Errors
///
/// Never fails the invocation itself; record failures go in the response.
pub async fn function_handler(
    state: &WorkerState,
    event: LambdaEvent<Value>,
) -> Result<Value, Error> {
    let failed = process_records(&state.config, &state.services, &event.payload).await;
    if !failed.is_empty() {
        warn!("{} record(s) failed and will be redelivered", failed.len());
    }
    Ok(batch_item_failures(&failed))
}
