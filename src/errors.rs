use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenieError {
    #[error("Failed to parse payload: {0}")]
    ParseError(String),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Failed to access database: {0}")]
    DatabaseError(String),

    #[error("Failed to access OpenAI API: {0}")]
    OpenAIError(String),

    #[error("Failed to access Telegram API: {0}")]
    TelegramError(String),

    #[error("Failed to access X API: {0}")]
    XPlatformError(String),

    #[error("Failed to send HTTP request: {0}")]
    HttpError(String),

    #[error("Failed to interact with AWS services: {0}")]
    AwsError(String),

    #[error("{0}")]
    GeneralError(String),
}

impl From<reqwest::Error> for GenieError {
    fn from(error: reqwest::Error) -> Self {
        GenieError::HttpError(error.to_string())
    }
}

impl From<sqlx::Error> for GenieError {
    fn from(error: sqlx::Error) -> Self {
        GenieError::DatabaseError(error.to_string())
    }
}

impl From<serde_json::Error> for GenieError {
    fn from(error: serde_json::Error) -> Self {
        GenieError::ParseError(error.to_string())
    }
}

impl From<anyhow::Error> for GenieError {
    fn from(error: anyhow::Error) -> Self {
        GenieError::GeneralError(error.to_string())
    }
}

// Generic implementation for AWS SDK errors
impl<E> From<aws_sdk_sqs::error::SdkError<E>> for GenieError
where
    E: std::fmt::Display,
{
    fn from(error: aws_sdk_sqs::error::SdkError<E>) -> Self {
        GenieError::AwsError(error.to_string())
    }
}
