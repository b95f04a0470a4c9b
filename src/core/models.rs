use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// A curated article as stored by Juggernaut in `curated_feeds.curated_articles`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CuratedArticle {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(rename = "webUrl", default)]
    pub web_url: Option<String>,
    #[serde(default)]
    pub section: Option<String>,
    #[serde(rename = "trailText", default)]
    pub trail_text: Option<String>,
    #[serde(rename = "publishedDate", default)]
    pub published_date: Option<String>,
    #[serde(rename = "relevanceScore", default)]
    pub relevance_score: Option<f64>,
    #[serde(default)]
    pub article_summary: Option<String>,
}

impl CuratedArticle {
    /// The text handed to the model: the curated summary, else the trail text.
    #[must_use]
    pub fn summary_text(&self) -> &str {
        self.article_summary
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .or(self.trail_text.as_deref())
            .unwrap_or("")
    }
}

/// An item parsed from a Substack RSS feed. `content` is raw HTML.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedArticle {
    pub title: String,
    pub link: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedTweet {
    pub article_id: String,
    pub tweet_text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStatus {
    Queued,
    Pending,
    Approved,
    Rejected,
}

impl ApprovalStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApprovalStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "queued" => Ok(Self::Queued),
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            other => Err(format!("unknown approval status: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    Pending,
    Posted,
    Failed,
}

impl PostStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Posted => "posted",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PostStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "posted" => Ok(Self::Posted),
            "failed" => Ok(Self::Failed),
            other => Err(format!("unknown post status: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTweet {
    pub article_id: String,
    pub article_title: String,
    pub tweet_text: String,
    pub web_url: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TweetRecord {
    pub id: Uuid,
    pub article_id: String,
    pub article_title: String,
    pub tweet_text: String,
    pub web_url: String,
    pub approval_status: ApprovalStatus,
    pub post_status: PostStatus,
    pub telegram_message_id: Option<String>,
    pub x_tweet_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Message body placed on the processing queue by the API function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProcessingTask {
    CuratedFeed {
        correlation_id: String,
        user_id: String,
        created_at: String,
    },
    SubstackSweep {
        correlation_id: String,
    },
}

impl ProcessingTask {
    #[must_use]
    pub fn correlation_id(&self) -> &str {
        match self {
            Self::CuratedFeed { correlation_id, .. } | Self::SubstackSweep { correlation_id } => {
                correlation_id
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessingOutcome {
    pub message: String,
    pub processed: usize,
    pub total: usize,
}

impl ProcessingOutcome {
    #[must_use]
    pub fn no_articles() -> Self {
        Self {
            message: "No articles found".to_string(),
            processed: 0,
            total: 0,
        }
    }

    #[must_use]
    pub fn complete(processed: usize, total: usize) -> Self {
        Self {
            message: "Processing complete".to_string(),
            processed,
            total,
        }
    }
}
