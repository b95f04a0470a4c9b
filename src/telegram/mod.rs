pub mod bot;
pub mod webhook;

pub use bot::{TelegramBot, html_escape};
pub use webhook::{IncomingMessage, ReplyDecision, parse_update};
