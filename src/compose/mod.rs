//! Tweet generation from articles

pub mod batch;
pub mod substack;

pub use batch::{aggregate_articles_for_batch, generate_tweets_batch, parse_batch_output};
pub use substack::{generate_tweets_for_article, parse_article_tweets};

use serde_json::Value;

use crate::errors::GenieError;

/// Locate the outermost JSON object in model output and parse it.
///
/// Models occasionally wrap the object in prose or code fences; everything
/// before the first `{` and after the last `}` is ignored.
pub(crate) fn extract_json_object(
    model_output: &str,
) -> Result<serde_json::Map<String, Value>, GenieError> {
    let output = model_output.trim();
    let (Some(start_idx), Some(end_idx)) = (output.find('{'), output.rfind('}')) else {
        return Err(GenieError::ParseError(
            "No JSON object found in OpenAI output".to_string(),
        ));
    };
    if end_idx < start_idx {
        return Err(GenieError::ParseError(
            "No JSON object found in OpenAI output".to_string(),
        ));
    }

    let parsed: Value = serde_json::from_str(&output[start_idx..=end_idx])
        .map_err(|e| GenieError::ParseError(format!("Invalid JSON in OpenAI output: {e}")))?;

    match parsed {
        Value::Object(map) => Ok(map),
        _ => Err(GenieError::ParseError(
            "Expected a JSON object in OpenAI output".to_string(),
        )),
    }
}
