//! Parsing of Telegram webhook updates and reviewer replies.

use serde_json::Value;

/// A text message delivered to the bot's webhook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingMessage {
    pub message_id: String,
    pub text: String,
    pub chat_id: String,
    /// Id of the bot message this one replies to, if any.
    pub reply_to_message_id: Option<String>,
}

/// Telegram ids arrive as numbers but are handled as strings.
fn id_to_string(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

/// Extract the text message from an update. Returns `None` for callback
/// queries, edited messages, stickers and anything else without text.
#[must_use]
pub fn parse_update(update: &Value) -> Option<IncomingMessage> {
    let message = update.get("message")?;
    let text = message.get("text")?.as_str()?;
    let message_id = id_to_string(message.get("message_id")?)?;
    let chat_id = id_to_string(message.get("chat")?.get("id")?)?;
    let reply_to_message_id = message
        .get("reply_to_message")
        .and_then(|r| r.get("message_id"))
        .and_then(id_to_string);

    Some(IncomingMessage {
        message_id,
        text: text.to_string(),
        chat_id,
        reply_to_message_id,
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyDecision {
    Reject,
    Approve,
    /// Post this text instead of the generated one.
    Edit(String),
    Empty,
}

impl ReplyDecision {
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Self::Empty;
        }
        match trimmed.to_lowercase().as_str() {
            "/reject" | "reject" | "no" => Self::Reject,
            "/approve" | "approve" | "yes" => Self::Approve,
            _ => Self::Edit(trimmed.to_string()),
        }
    }
}
