//! RSS feed retrieval and parsing.

use async_trait::async_trait;
use quick_xml::Reader;
use quick_xml::events::Event;
use reqwest::Client;
use std::sync::LazyLock;
use std::time::Duration;
use tracing::{debug, info};

use crate::core::models::FeedArticle;
use crate::errors::GenieError;
use crate::services::FeedSource;

static HTTP_CLIENT: LazyLock<Client> = LazyLock::new(|| {
    Client::builder()
        .timeout(Duration::from_secs(30))
        .user_agent(concat!("genie-in-the-bottle/", env!("CARGO_PKG_VERSION")))
        .build()
        .unwrap_or_else(|_| Client::new())
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ItemField {
    Title,
    Link,
    Encoded,
    Description,
}

#[derive(Debug, Default)]
struct ItemBuffer {
    title: String,
    link: String,
    encoded: String,
    description: String,
}

impl ItemBuffer {
    fn push(&mut self, field: ItemField, text: &str) {
        match field {
            ItemField::Title => self.title.push_str(text),
            ItemField::Link => self.link.push_str(text),
            ItemField::Encoded => self.encoded.push_str(text),
            ItemField::Description => self.description.push_str(text),
        }
    }

    fn finish(self) -> FeedArticle {
        let content = if self.encoded.trim().is_empty() {
            self.description
        } else {
            self.encoded
        };
        FeedArticle {
            title: self.title.trim().to_string(),
            link: self.link.trim().to_string(),
            content: content.trim().to_string(),
        }
    }
}

fn item_field(name: &[u8]) -> Option<ItemField> {
    match name {
        b"title" => Some(ItemField::Title),
        b"link" => Some(ItemField::Link),
        b"content:encoded" => Some(ItemField::Encoded),
        b"description" => Some(ItemField::Description),
        _ => None,
    }
}

/// Parse an RSS 2.0 document into its items.
///
/// # Errors
///
/// Returns a parse error if the document is not well-formed XML.
pub fn parse_rss(xml: &str) -> Result<Vec<FeedArticle>, GenieError> {
    let mut reader = Reader::from_str(xml);
    let mut articles = Vec::new();
    let mut current: Option<ItemBuffer> = None;
    let mut field: Option<ItemField> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = e.name();
                if name.as_ref() == b"item" {
                    current = Some(ItemBuffer::default());
                    field = None;
                } else if current.is_some() {
                    field = item_field(name.as_ref());
                }
            }
            Ok(Event::End(e)) => {
                let name = e.name();
                if name.as_ref() == b"item" {
                    if let Some(item) = current.take() {
                        let article = item.finish();
                        debug!(title = %article.title, "Parsed article");
                        articles.push(article);
                    }
                    field = None;
                } else if field.is_some() && item_field(name.as_ref()) == field {
                    field = None;
                }
            }
            Ok(Event::Text(t)) => {
                if let (Some(item), Some(f)) = (current.as_mut(), field) {
                    let text = t
                        .unescape()
                        .map(std::borrow::Cow::into_owned)
                        .unwrap_or_else(|_| String::from_utf8_lossy(&t).into_owned());
                    item.push(f, &text);
                }
            }
            Ok(Event::CData(c)) => {
                if let (Some(item), Some(f)) = (current.as_mut(), field) {
                    item.push(f, &String::from_utf8_lossy(&c));
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(GenieError::ParseError(format!(
                    "Malformed RSS at position {}: {e}",
                    reader.buffer_position()
                )));
            }
            Ok(_) => {}
        }
    }

    Ok(articles)
}

/// Fetches RSS feeds over HTTP.
#[derive(Debug, Default, Clone)]
pub struct FeedReader;

impl FeedReader {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// # Errors
    ///
    /// Returns an error if the request fails, the server answers with a
    /// non-success status, or the body is not valid RSS.
    pub async fn fetch(&self, feed_url: &str) -> Result<Vec<FeedArticle>, GenieError> {
        let response = HTTP_CLIENT
            .get(feed_url)
            .send()
            .await
            .map_err(|e| {
                GenieError::HttpError(format!("Feed request failed for {feed_url}: {e}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(GenieError::HttpError(format!(
                "Feed {feed_url} returned status {status}"
            )));
        }

        let body = response.text().await?;
        let articles = parse_rss(&body)?;
        info!(
            feed_url = %feed_url,
            count = articles.len(),
            "Successfully parsed articles from feed"
        );
        Ok(articles)
    }
}

#[async_trait]
impl FeedSource for FeedReader {
    async fn fetch_feed(&self, feed_url: &str) -> Result<Vec<FeedArticle>, GenieError> {
        self.fetch(feed_url).await
    }
}
