use genie::core::config::AppConfig;
use genie::worker::{WorkerState, function_handler};
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
    let services = genie::build_services(&config)?;
    let state = WorkerState { config, services };
    let state = &state;

    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| async move {
        function_handler(state, event).await
    }))
    .await
}
