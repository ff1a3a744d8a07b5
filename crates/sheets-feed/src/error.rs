//! Error types for the feed protocol layer.

use thiserror::Error;

/// Errors that can occur while talking to the spreadsheet feeds.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Remote returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed feed: {0}")]
    Malformed(String),

    #[error("Missing link relation: {0}")]
    MissingLink(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, FeedError>;
