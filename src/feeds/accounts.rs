use serde::Deserialize;
use std::path::Path;
use tracing::info;

use crate::errors::GenieError;

#[derive(Debug, Default, Deserialize)]
struct AccountsFile {
    #[serde(default)]
    accounts: Vec<String>,
}

/// # Errors
///
/// Returns a config error if the file cannot be read and a parse error if it
/// is not valid YAML.
pub fn load_substack_accounts(path: impl AsRef<Path>) -> Result<Vec<String>, GenieError> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path).map_err(|e| {
        GenieError::ConfigError(format!(
            "Failed to read Substack accounts file {}: {e}",
            path.display()
        ))
    })?;

    let accounts = parse_substack_accounts(&raw)?;
    info!(
        count = accounts.len(),
        path = %path.display(),
        "Loaded Substack accounts"
    );
    Ok(accounts)
}

/// # Errors
///
/// Returns a parse error if `raw` is not a YAML document of the expected shape.
pub fn parse_substack_accounts(raw: &str) -> Result<Vec<String>, GenieError> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }

    let file: AccountsFile = serde_yaml::from_str(raw)
        .map_err(|e| GenieError::ParseError(format!("Invalid Substack accounts YAML: {e}")))?;

    Ok(file
        .accounts
        .into_iter()
        .map(|a| a.trim().to_string())
        .filter(|a| !a.is_empty())
        .collect())
}

#[must_use]
pub fn substack_feed_url(account_name: &str) -> String {
    format!("https://{}.substack.com/feed", account_name.trim())
}
