use std::sync::Arc;

use genie::api::{ApiState, function_handler, sqs::SqsTaskQueue};
use genie::core::config::AppConfig;
use lambda_runtime::{Error, LambdaEvent, service_fn};
use serde_json::Value;
use tracing::error;

#[tokio::main]
async fn main() -> Result<(), Error> {
    genie::setup_logging();

    let config = AppConfig::from_env().map_err(|e| {
        error!("Config error: {}", e);
        Error::from(e)
    })?;
    let queue_url = config.require_queue_url()?.to_string();
    let services = genie::build_services(&config)?;
    let queue = SqsTaskQueue::from_env(queue_url).await;

    let state = ApiState {
        config,
        services,
        queue: Arc::new(queue),
    };
    let state = &state;

    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| async move {
        function_handler(state, event).await
    }))
    .await
}
