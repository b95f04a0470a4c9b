//! Substack ingestion: account list, RSS retrieval and HTML cleanup

pub mod accounts;
pub mod cleaner;
pub mod reader;

pub use accounts::{load_substack_accounts, substack_feed_url};
pub use cleaner::clean_substack_content;
pub use reader::{FeedReader, parse_rss};
