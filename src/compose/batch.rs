//! One-call tweet generation for a curated Juggernaut feed.

use serde_json::Value;
use tracing::{error, info, warn};

use super::extract_json_object;
use crate::ai::prompt_builder::{
    BATCH_SYSTEM_PROMPT, MAX_SUMMARY_CHARS, sanitize_article_text, sanitize_inline,
};
use crate::core::models::{CuratedArticle, GeneratedTweet};
use crate::errors::GenieError;
use crate::services::TextGenerator;

/// Format the articles as numbered blocks for the batch user prompt.
#[must_use]
pub fn aggregate_articles_for_batch(articles: &[CuratedArticle]) -> String {
    articles
        .iter()
        .enumerate()
        .map(|(idx, article)| {
            format!(
                "Article {}:\nID: {}\nSummary: {}\n",
                idx + 1,
                sanitize_inline(&article.id),
                sanitize_article_text(article.summary_text(), MAX_SUMMARY_CHARS)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Parse the `{article_id: tweet_text}` object returned for a batch.
///
/// # Errors
///
/// Returns a parse error if no JSON object can be recovered from the output.
pub fn parse_batch_output(model_output: &str) -> Result<Vec<GeneratedTweet>, GenieError> {
    let parsed = extract_json_object(model_output).inspect_err(|e| {
        error!("Failed to parse batch output: {}", e);
        error!("Raw output: {}", model_output);
    })?;

    let tweets: Vec<GeneratedTweet> = parsed
        .into_iter()
        .filter_map(|(article_id, value)| match value {
            Value::String(tweet_text) if !tweet_text.trim().is_empty() => Some(GeneratedTweet {
                article_id,
                tweet_text: tweet_text.trim().to_string(),
            }),
            other => {
                warn!(article_id = %article_id, value = %other, "Skipping non-text tweet value");
                None
            }
        })
        .collect();

    info!("Successfully parsed {} tweets from batch output", tweets.len());
    Ok(tweets)
}

/// Generate one tweet per curated article in a single model call.
///
/// # Errors
///
/// Returns an error if the model call fails or its output cannot be parsed.
pub async fn generate_tweets_batch(
    articles: &[CuratedArticle],
    generator: &dyn TextGenerator,
) -> Result<Vec<GeneratedTweet>, GenieError> {
    if articles.is_empty() {
        return Ok(Vec::new());
    }

    info!("Generating tweets for {} articles in batch", articles.len());

    let aggregated = aggregate_articles_for_batch(articles);
    let user_prompt = format!(
        "Generate one tweet per article:\n\n{aggregated}\n\nReturn only valid JSON as specified."
    );

    let raw_output = generator
        .generate(BATCH_SYSTEM_PROMPT, &user_prompt)
        .await
        .inspect_err(|e| error!("Failed to generate tweets in batch: {}", e))?;

    let tweets = parse_batch_output(&raw_output)?;
    info!("Successfully generated {} tweets in batch", tweets.len());
    Ok(tweets)
}
