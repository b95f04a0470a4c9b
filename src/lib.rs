//! Genie in the Bottle - turns curated articles into tweets, routes them
//! through a human reviewer on Telegram and publishes the approved ones to X.
//!
//! The crate implements a two-Lambda architecture:
//! 1. An API Lambda that serves the Juggernaut and Telegram webhooks. Curated
//!    feed notifications are queued; reviewer replies are handled inline.
//! 2. A Worker Lambda that consumes the queue, generates tweets with OpenAI
//!    and sends the oldest queued tweet for approval.
//!
//! A third binary, `genie-substack`, sweeps a list of Substack accounts from
//! the command line.
//!
//! # Architecture
//!
//! - AWS Lambda for serverless execution, SQS between the two functions
//! - Postgres (through sqlx) for curated feeds and tweet records
//! - `OpenAI` Responses API for generation
//! - Telegram Bot API for approvals, X API v2 for publishing
//!
//! Every external system sits behind a trait in [`services`], so the
//! approval loop and the pipelines run unchanged against in-memory fakes.

pub mod ai;
pub mod api;
pub mod approval;
pub mod compose;
pub mod core;
pub mod db;
pub mod errors;
pub mod feeds;
pub mod pipeline;
pub mod services;
pub mod telegram;
pub mod worker;
pub mod x;

pub use errors::GenieError;
pub use services::Services;

use std::sync::Arc;

use crate::ai::LlmClient;
use crate::core::config::AppConfig;
use crate::db::{PgCuratedFeeds, PgTweetStore};
use crate::feeds::FeedReader;
use crate::telegram::TelegramBot;
use crate::x::{OAuthCredentials, XClient};

/// Configure structured logging with JSON format for AWS Lambda environments.
///
/// The level comes from `RUST_LOG` and defaults to `info`. Calling this more
/// than once is harmless.
///
/// ```
/// genie::setup_logging();
/// ```
pub fn setup_logging() {
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::prelude::*;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = tracing_subscriber::fmt::layer().json().with_target(true);

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}

/// Wire the production implementations of every service.
///
/// # Errors
///
/// Returns an error if `DATABASE_URL` cannot be parsed.
pub fn build_services(config: &AppConfig) -> Result<Services, GenieError> {
    let pool = db::connect(&config.database_url)?;

    let generator = LlmClient::new(
        config.openai_api_key.clone(),
        config.openai_org_id.clone(),
        config.openai_model.clone(),
        config.openai_temperature,
    );
    let bot = TelegramBot::new(
        config.telegram_bot_token.clone(),
        config.telegram_chat_id.clone(),
    );
    let publisher = XClient::new(OAuthCredentials {
        consumer_key: config.x_api_key.clone(),
        consumer_secret: config.x_api_secret.clone(),
        access_token: config.x_access_token.clone(),
        access_token_secret: config.x_access_token_secret.clone(),
    });

    Ok(Services {
        generator: Arc::new(generator),
        store: Arc::new(PgTweetStore::new(pool.clone())),
        articles: Arc::new(PgCuratedFeeds::new(pool)),
        feeds: Arc::new(FeedReader::new()),
        approvals: Arc::new(bot),
        publisher: Arc::new(publisher),
    })
}
