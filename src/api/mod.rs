//! API Lambda: health check plus the Juggernaut and Telegram webhooks

pub mod handler;
pub mod helpers;
pub mod parsing;
pub mod signature;
pub mod sqs;

pub use handler::{ApiState, function_handler, route};
