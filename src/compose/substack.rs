//! Per-article tweet generation for Substack posts.

use serde_json::Value;
use tracing::{error, info, warn};

use super::extract_json_object;
use crate::ai::prompt_builder::{
    MAX_ARTICLE_CHARS, SUBSTACK_SYSTEM_PROMPT, sanitize_article_text, sanitize_inline,
};
use crate::core::models::{FeedArticle, GeneratedTweet};
use crate::errors::GenieError;
use crate::feeds::clean_substack_content;
use crate::services::TextGenerator;

const NOT_FOUND: &str = "not found";

/// Parse the `{"tweets": [...]}` object returned for one article.
///
/// `"Not found"` entries and blanks are dropped, so an article with nothing
/// relevant yields an empty list.
///
/// # Errors
///
/// Returns a parse error if no JSON object can be recovered or `tweets` is
/// not an array.
pub fn parse_article_tweets(
    model_output: &str,
    article_id: &str,
) -> Result<Vec<GeneratedTweet>, GenieError> {
    let parsed = extract_json_object(model_output).inspect_err(|e| {
        error!("Failed to parse tweet output: {}", e);
        error!("Raw output: {}", model_output);
    })?;

    let tweets = match parsed.get("tweets") {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(items)) => items,
        Some(_) => {
            error!("Raw output: {}", model_output);
            return Err(GenieError::ParseError(
                "Expected 'tweets' to be an array in OpenAI output".to_string(),
            ));
        }
    };

    let result: Vec<GeneratedTweet> = tweets
        .iter()
        .filter_map(|item| {
            let Some(text) = item.as_str() else {
                warn!(article_id = %article_id, value = %item, "Skipping non-text tweet value");
                return None;
            };
            let text = text.trim();
            if text.is_empty() || text.eq_ignore_ascii_case(NOT_FOUND) {
                return None;
            }
            Some(GeneratedTweet {
                article_id: article_id.to_string(),
                tweet_text: text.to_string(),
            })
        })
        .collect();

    info!(
        "Successfully parsed {} tweets for article {}",
        result.len(),
        article_id
    );
    Ok(result)
}

/// Generate tweets for a single Substack article. The title doubles as the
/// article id.
///
/// # Errors
///
/// Returns an error if the model call fails or its output cannot be parsed.
pub async fn generate_tweets_for_article(
    article: &FeedArticle,
    generator: &dyn TextGenerator,
) -> Result<Vec<GeneratedTweet>, GenieError> {
    let article_id = article.title.as_str();
    info!("Generating tweet for Substack article: {}", article_id);

    let cleaned = clean_substack_content(&article.content);
    if cleaned.is_empty() {
        warn!(article_id = %article_id, "Article has no readable content, skipping");
        return Ok(Vec::new());
    }

    let user_prompt = format!(
        "Article ID: {}\nContent: {}\n\nReturn only valid JSON as specified.",
        sanitize_inline(article_id),
        sanitize_article_text(&cleaned, MAX_ARTICLE_CHARS)
    );

    let raw_output = generator
        .generate(SUBSTACK_SYSTEM_PROMPT, &user_prompt)
        .await
        .inspect_err(|e| error!("Failed to generate tweet for article {}: {}", article_id, e))?;

    let tweets = parse_article_tweets(&raw_output, article_id)?;
    info!(
        "Successfully generated {} tweets for article {}",
        tweets.len(),
        article_id
    );
    Ok(tweets)
}
