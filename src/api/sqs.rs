use async_trait::async_trait;
use aws_sdk_sqs::Client as SqsClient;
use tracing::info;

use crate::core::models::ProcessingTask;
use crate::errors::GenieError;
use crate::services::TaskQueue;

/// Sends processing tasks to the worker's SQS queue.
pub struct SqsTaskQueue {
    client: SqsClient,
    queue_url: String,
}

impl SqsTaskQueue {
    pub async fn from_env(queue_url: impl Into<String>) -> Self {
        let shared_config = aws_config::from_env().load().await;
        Self {
            client: SqsClient::new(&shared_config),
            queue_url: queue_url.into(),
        }
    }
}

#[async_trait]
impl TaskQueue for SqsTaskQueue {
    async fn enqueue(&self, task: &ProcessingTask) -> Result<(), GenieError> {
        let message_body = serde_json::to_string(task)?;

        self.client
            .send_message()
            .queue_url(&self.queue_url)
            .message_body(message_body)
            .send()
            .await
            .map_err(|e| GenieError::AwsError(format!("Failed to send message to SQS: {e}")))?;

        info!(correlation_id = %task.correlation_id(), "Task queued");
        Ok(())
    }
}
