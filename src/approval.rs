//! The review loop: queued tweet -> Telegram -> reviewer reply -> X.

use tracing::{error, info, warn};
use uuid::Uuid;

use crate::core::models::{ApprovalStatus, PostStatus};
use crate::errors::GenieError;
use crate::services::Services;
use crate::telegram::{IncomingMessage, ReplyDecision};

/// What a Telegram message did to the approval queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyOutcome {
    NotAReply,
    ForeignChat,
    RecordNotFound,
    AlreadyHandled,
    EmptyReply,
    Rejected,
    Posted(String),
}

impl ReplyOutcome {
    /// Message returned to Telegram in the webhook response.
    #[must_use]
    pub fn message(&self) -> &'static str {
        match self {
            Self::NotAReply => "Not a reply message",
            Self::ForeignChat => "Message from unrecognised chat",
            Self::RecordNotFound => "No matching tweet record",
            Self::AlreadyHandled => "Tweet already handled",
            Self::EmptyReply => "Empty reply ignored",
            Self::Rejected => "Tweet rejected",
            Self::Posted(_) => "Tweet posted successfully",
        }
    }
}

/// Claim the oldest queued tweet and send it to the reviewer.
///
/// Returns the record id, or `None` when the queue is empty. A record whose
/// Telegram send fails goes back to `queued`.
///
/// # Errors
///
/// Returns an error if the store or Telegram fails.
pub async fn send_earliest_queued_for_approval(
    services: &Services,
) -> Result<Option<Uuid>, GenieError> {
    let Some(record) = services.store.claim_earliest_queued().await? else {
        info!("No queued tweets to send for approval");
        return Ok(None);
    };

    let message_id = match services
        .approvals
        .send_tweet_for_approval(&record.tweet_text, &record.article_id, &record.web_url)
        .await
    {
        Ok(message_id) => message_id,
        Err(e) => {
            if let Err(store_err) = services
                .store
                .transition_approval_status(
                    record.id,
                    ApprovalStatus::Pending,
                    ApprovalStatus::Queued,
                )
                .await
            {
                error!(record_id = %record.id, "Failed to requeue tweet: {}", store_err);
            }
            return Err(e);
        }
    };

    services
        .store
        .update_telegram_message_id(record.id, &message_id)
        .await?;

    info!(record_id = %record.id, message_id = %message_id, "Tweet sent for approval");
    Ok(Some(record.id))
}

/// [`send_earliest_queued_for_approval`] for callers that must not fail on it.
pub async fn send_next_for_approval(services: &Services) {
    if let Err(e) = send_earliest_queued_for_approval(services).await {
        error!("Failed to send next queued tweet for approval: {}", e);
    }
}

async fn notify(services: &Services, message: &str) {
    if let Err(e) = services.approvals.send_status_notification(message).await {
        warn!("Failed to send status notification: {}", e);
    }
}

/// Move a pending record on; `false` means a concurrent reply got there first.
async fn claim_pending(
    services: &Services,
    record_id: Uuid,
    to: ApprovalStatus,
) -> Result<bool, GenieError> {
    let claimed = services
        .store
        .transition_approval_status(record_id, ApprovalStatus::Pending, to)
        .await?;
    if !claimed {
        info!(record_id = %record_id, "Tweet was handled by a concurrent reply");
    }
    Ok(claimed)
}

#[must_use]
pub fn compose_final_text(text: &str, web_url: &str) -> String {
    if web_url.trim().is_empty() {
        text.to_string()
    } else {
        format!("{text}\n{web_url}")
    }
}

/// Apply a reviewer's reply to the tweet it answers.
///
/// # Errors
///
/// Returns an error if the store fails or the post to X fails. A failed post
/// is recorded as `failed` and reported to the reviewer first.
pub async fn handle_reply(
    services: &Services,
    incoming: &IncomingMessage,
    allowed_chat_id: &str,
) -> Result<ReplyOutcome, GenieError> {
    let Some(reply_to) = incoming.reply_to_message_id.as_deref() else {
        return Ok(ReplyOutcome::NotAReply);
    };

    if incoming.chat_id != allowed_chat_id {
        warn!(chat_id = %incoming.chat_id, "Ignoring reply from unrecognised chat");
        return Ok(ReplyOutcome::ForeignChat);
    }

    let Some(record) = services.store.get_by_telegram_message_id(reply_to).await? else {
        warn!(message_id = %reply_to, "No tweet record for replied message");
        return Ok(ReplyOutcome::RecordNotFound);
    };

    if record.approval_status != ApprovalStatus::Pending {
        info!(
            record_id = %record.id,
            status = %record.approval_status,
            "Reply to a tweet that is no longer pending"
        );
        return Ok(ReplyOutcome::AlreadyHandled);
    }

    let text = match ReplyDecision::from_text(&incoming.text) {
        ReplyDecision::Empty => return Ok(ReplyOutcome::EmptyReply),
        ReplyDecision::Reject => {
            if !claim_pending(services, record.id, ApprovalStatus::Rejected).await? {
                return Ok(ReplyOutcome::AlreadyHandled);
            }
            info!(record_id = %record.id, "Tweet rejected");
            send_next_for_approval(services).await;
            return Ok(ReplyOutcome::Rejected);
        }
        ReplyDecision::Approve => record.tweet_text.clone(),
        ReplyDecision::Edit(edited) => {
            info!(record_id = %record.id, "Posting edited tweet");
            edited
        }
    };

    if !claim_pending(services, record.id, ApprovalStatus::Approved).await? {
        return Ok(ReplyOutcome::AlreadyHandled);
    }

    let final_text = compose_final_text(&text, &record.web_url);
    match services.publisher.post(&final_text).await {
        Ok(tweet_id) => {
            services
                .store
                .update_post_status(record.id, PostStatus::Posted, Some(&tweet_id))
                .await?;
            notify(
                services,
                &format!("✅ Tweet posted successfully!\nTweet ID: {tweet_id}"),
            )
            .await;
            send_next_for_approval(services).await;
            Ok(ReplyOutcome::Posted(tweet_id))
        }
        Err(e) => {
            error!(record_id = %record.id, "Failed to post tweet to X: {}", e);
            if let Err(store_err) = services
                .store
                .update_post_status(record.id, PostStatus::Failed, None)
                .await
            {
                error!("Failed to record post failure: {}", store_err);
            }
            notify(services, &format!("❌ Failed to post tweet to X: {e}")).await;
            Err(e)
        }
    }
}
