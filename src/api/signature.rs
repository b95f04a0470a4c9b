//! HMAC verification for Juggernaut webhooks.
//!
//! Juggernaut signs `v0:{timestamp}:{body}` with the shared secret and sends
//! `v0=<hex>` in `X-Genie-Signature` and the unix timestamp in
//! `X-Genie-Request-Timestamp`.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::error;

pub const SIGNATURE_HEADER: &str = "X-Genie-Signature";
pub const TIMESTAMP_HEADER: &str = "X-Genie-Request-Timestamp";

const MAX_AGE_SECS: u64 = 300;
const MAX_SKEW_SECS: u64 = 60;

fn timestamp_in_window(ts: u64, now_secs: u64) -> bool {
    now_secs.saturating_sub(ts) <= MAX_AGE_SECS && ts <= now_secs + MAX_SKEW_SECS
}

#[must_use]
pub fn verify_signature(
    request_body: &str,
    timestamp: &str,
    signature: &str,
    secret: &str,
) -> bool {
    let Ok(ts) = timestamp.trim().parse::<u64>() else {
        error!("Invalid request timestamp");
        return false;
    };

    if let Ok(now) = SystemTime::now().duration_since(UNIX_EPOCH) {
        if !timestamp_in_window(ts, now.as_secs()) {
            error!("Timestamp out of range, potential replay attack");
            return false;
        }
    }

    let Some(received) = signature
        .strip_prefix("v0=")
        .and_then(|hex_sig| hex::decode(hex_sig).ok())
    else {
        error!("Malformed signature header");
        return false;
    };

    let base_string = format!("v0:{timestamp}:{request_body}");
    let mut mac = match Hmac::<Sha256>::new_from_slice(secret.as_bytes()) {
        Ok(mac) => mac,
        Err(e) => {
            error!("Failed to create HMAC: {}", e);
            return false;
        }
    };
    mac.update(base_string.as_bytes());

    if mac.verify_slice(&received).is_ok() {
        true
    } else {
        error!("Signature verification failed");
        false
    }
}

#[must_use]
pub fn compute_signature(timestamp: &str, request_body: &str, secret: &str) -> String {
    let base_string = format!("v0:{timestamp}:{request_body}");
    let mut mac = match Hmac::<Sha256>::new_from_slice(secret.as_bytes()) {
        Ok(mac) => mac,
        Err(e) => {
            error!("Failed to create HMAC: {}", e);
            return String::new();
        }
    };
    mac.update(base_string.as_bytes());
    format!("v0={}", hex::encode(mac.finalize().into_bytes()))
}
