//! Error type shared by the scraper, fetcher and data store.

/// Errors produced while scraping, downloading or persisting images.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Request or body read failed.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The page URL could not be parsed.
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The downloaded file could not be decoded or re-encoded.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// A blocking conversion task panicked or was cancelled.
    #[error("background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    /// The URL has no final path segment to name the file after.
    #[error("no filename in url: {0}")]
    NoFilename(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
