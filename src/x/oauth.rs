//! OAuth 1.0a request signing (HMAC-SHA1) for the X API.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use hmac::{Hmac, Mac};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use sha1::Sha1;

use crate::errors::GenieError;

type HmacSha1 = Hmac<Sha1>;

/// Everything except the RFC 3986 unreserved characters.
const RFC3986: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

#[derive(Debug, Clone)]
pub struct OAuthCredentials {
    pub consumer_key: String,
    pub consumer_secret: String,
    pub access_token: String,
    pub access_token_secret: String,
}

#[must_use]
pub fn percent_encode(raw: &str) -> String {
    utf8_percent_encode(raw, RFC3986).to_string()
}

/// `METHOD&url&params`, with params encoded, sorted and joined.
#[must_use]
pub fn signature_base_string(method: &str, url: &str, params: &[(String, String)]) -> String {
    let mut encoded: Vec<(String, String)> = params
        .iter()
        .map(|(k, v)| (percent_encode(k), percent_encode(v)))
        .collect();
    encoded.sort();

    let param_string = encoded
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");

    format!(
        "{}&{}&{}",
        method.to_uppercase(),
        percent_encode(url),
        percent_encode(&param_string)
    )
}

/// Base64 HMAC-SHA1 of the base string under `consumer_secret&token_secret`.
///
/// # Errors
///
/// Returns a configuration error if the HMAC key is rejected.
pub fn sign(
    base_string: &str,
    consumer_secret: &str,
    token_secret: &str,
) -> Result<String, GenieError> {
    let key = format!(
        "{}&{}",
        percent_encode(consumer_secret),
        percent_encode(token_secret)
    );
    let mut mac = HmacSha1::new_from_slice(key.as_bytes())
        .map_err(|e| GenieError::ConfigError(format!("Invalid OAuth signing key: {e}")))?;
    mac.update(base_string.as_bytes());
    Ok(BASE64.encode(mac.finalize().into_bytes()))
}

/// Build the `Authorization: OAuth ...` header value for one request.
///
/// `extra_params` are query or form parameters that take part in the
/// signature. JSON bodies are never signed.
///
/// # Errors
///
/// Returns an error if the request cannot be signed.
pub fn authorization_header(
    method: &str,
    url: &str,
    creds: &OAuthCredentials,
    nonce: &str,
    timestamp: &str,
    extra_params: &[(String, String)],
) -> Result<String, GenieError> {
    let mut oauth_params: Vec<(String, String)> = vec![
        ("oauth_consumer_key".into(), creds.consumer_key.clone()),
        ("oauth_nonce".into(), nonce.to_string()),
        ("oauth_signature_method".into(), "HMAC-SHA1".into()),
        ("oauth_timestamp".into(), timestamp.to_string()),
        ("oauth_token".into(), creds.access_token.clone()),
        ("oauth_version".into(), "1.0".into()),
    ];

    let mut all_params = oauth_params.clone();
    all_params.extend_from_slice(extra_params);

    let base = signature_base_string(method, url, &all_params);
    let signature = sign(&base, &creds.consumer_secret, &creds.access_token_secret)?;
    oauth_params.push(("oauth_signature".into(), signature));
    oauth_params.sort();

    let fields = oauth_params
        .iter()
        .map(|(k, v)| format!("{}=\"{}\"", percent_encode(k), percent_encode(v)))
        .collect::<Vec<_>>()
        .join(", ");

    Ok(format!("OAuth {fields}"))
}
