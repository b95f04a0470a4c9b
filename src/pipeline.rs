//! Worker jobs: turn curated feeds and Substack posts into queued tweets.

use std::collections::HashMap;
use tracing::{error, info, warn};
use url::Url;

use crate::ai::prompt_builder::sanitize_inline;
use crate::approval::send_next_for_approval;
use crate::compose::{generate_tweets_batch, generate_tweets_for_article};
use crate::core::models::{CuratedArticle, FeedArticle, NewTweet, ProcessingOutcome};
use crate::errors::GenieError;
use crate::feeds::substack_feed_url;
use crate::services::Services;

/// Generate, store and queue tweets for one Juggernaut curated feed.
///
/// Articles that already have tweets are left out, so running the same feed
/// twice queues nothing new.
///
/// # Errors
///
/// Returns an error if the articles cannot be fetched, the store cannot be
/// checked, or batch generation fails. Generation failures are reported to
/// the reviewer first.
pub async fn process_curated_feed(
    services: &Services,
    user_id: &str,
    created_at: &str,
) -> Result<ProcessingOutcome, GenieError> {
    let fetched = services.articles.fetch_articles(user_id, created_at).await?;
    if fetched.is_empty() {
        warn!(user_id = %user_id, created_at = %created_at, "No articles found");
        return Ok(ProcessingOutcome::no_articles());
    }

    let mut articles = Vec::with_capacity(fetched.len());
    for article in fetched {
        if services.store.tweet_exists_for_article(&article.id).await? {
            info!(article_id = %article.id, "Tweets already exist, skipping");
        } else {
            articles.push(article);
        }
    }
    if articles.is_empty() {
        info!(user_id = %user_id, "Every article already has tweets");
        send_next_for_approval(services).await;
        return Ok(ProcessingOutcome::complete(0, 0));
    }

    let tweets = match generate_tweets_batch(&articles, services.generator.as_ref()).await {
        Ok(tweets) => tweets,
        Err(e) => {
            error!("Batch tweet generation failed: {}", e);
            let message = format!(
                "❌ Batch tweet generation failed\n\nUser ID: {user_id}\nCreated At: {created_at}\nError: {e}"
            );
            if let Err(notify_err) = services.approvals.send_status_notification(&message).await {
                error!("Failed to send failure notification: {}", notify_err);
            }
            return Err(e);
        }
    };

    // The model only ever saw sanitized ids.
    let by_id: HashMap<String, &CuratedArticle> =
        articles.iter().map(|a| (sanitize_inline(&a.id), a)).collect();

    let mut processed = 0;
    for tweet in &tweets {
        let Some(article) = by_id.get(tweet.article_id.as_str()) else {
            warn!(article_id = %tweet.article_id, "Generated tweet matches no article, skipping");
            continue;
        };
        let Some(web_url) = article.web_url.as_deref().filter(|u| !u.trim().is_empty()) else {
            warn!(article_id = %article.id, "Article has no webUrl, skipping");
            continue;
        };

        let record = NewTweet {
            article_id: article.id.clone(),
            article_title: article.title.clone(),
            tweet_text: tweet.tweet_text.clone(),
            web_url: web_url.to_string(),
        };
        match services.store.create_tweet(&record).await {
            Ok(_) => processed += 1,
            Err(e) => error!(article_id = %article.id, "Failed to store tweet: {}", e),
        }
    }

    info!(
        "Stored {} of {} generated tweets for {} articles",
        processed,
        tweets.len(),
        articles.len()
    );

    send_next_for_approval(services).await;
    Ok(ProcessingOutcome::complete(processed, tweets.len()))
}

/// An absolute http(s) link, or `None` for anything unusable.
fn article_link(article: &FeedArticle) -> Option<String> {
    let link = article.link.trim();
    if link.is_empty() {
        return None;
    }
    Url::parse(link)
        .ok()
        .filter(|u| matches!(u.scheme(), "http" | "https"))
        .map(String::from)
}

/// Returns `(stored, generated)` for one article.
async fn process_feed_article(
    services: &Services,
    article: &FeedArticle,
    web_url: &str,
) -> Result<(usize, usize), GenieError> {
    let tweets = generate_tweets_for_article(article, services.generator.as_ref()).await?;
    let generated = tweets.len();

    let mut stored = 0;
    for tweet in tweets {
        let record = NewTweet {
            article_id: tweet.article_id,
            article_title: article.title.clone(),
            tweet_text: tweet.tweet_text,
            web_url: web_url.to_string(),
        };
        match services.store.create_tweet(&record).await {
            Ok(_) => stored += 1,
            Err(e) => error!(title = %article.title, "Failed to store tweet: {}", e),
        }
    }
    Ok((stored, generated))
}

/// Sweep the given Substack accounts for posts that have no tweets yet.
///
/// # Errors
///
/// Feed and article failures are logged and skipped, never returned.
pub async fn process_substack_feeds(
    services: &Services,
    accounts: &[String],
) -> Result<ProcessingOutcome, GenieError> {
    let mut articles = Vec::new();
    for account in accounts {
        let feed_url = substack_feed_url(account);
        match services.feeds.fetch_feed(&feed_url).await {
            Ok(items) => {
                info!(account = %account, "Fetched {} articles", items.len());
                articles.extend(items);
            }
            Err(e) => error!(account = %account, "Failed to fetch feed: {}", e),
        }
    }

    if articles.is_empty() {
        warn!("No Substack articles found");
        return Ok(ProcessingOutcome::no_articles());
    }

    let mut processed = 0;
    let mut generated = 0;
    for article in &articles {
        let Some(web_url) = article_link(article) else {
            warn!(title = %article.title, "Article has no usable link, skipping");
            continue;
        };

        match services.store.tweet_exists_for_article(&article.title).await {
            Ok(true) => {
                info!(title = %article.title, "Tweets already exist, skipping");
                continue;
            }
            Ok(false) => {}
            Err(e) => {
                error!(title = %article.title, "Failed to check existing tweets: {}", e);
                continue;
            }
        }

        match process_feed_article(services, article, &web_url).await {
            Ok((stored, count)) => {
                processed += stored;
                generated += count;
            }
            Err(e) => error!(title = %article.title, "Failed to process article: {}", e),
        }
    }

    info!(
        "Stored {} of {} generated tweets from {} articles",
        processed,
        generated,
        articles.len()
    );

    send_next_for_approval(services).await;
    Ok(ProcessingOutcome::complete(processed, generated))
}
