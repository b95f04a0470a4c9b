//! Publishing to X (formerly Twitter).

pub mod client;
pub mod oauth;

pub use client::XClient;
pub use oauth::OAuthCredentials;
