use thiserror::Error;

/// Errors surfaced by the catalog, detail and fetch layers.
///
/// Link resolution never returns these: strategy failures are absorbed and
/// reported through [`crate::resolver::Resolution`] instead.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// The request could not be completed (connect failure, timeout, body read)
    #[error("network error fetching {url}: {message}")]
    Network { url: String, message: String },

    /// The page was fetched but the expected content is absent
    #[error("not found: {0}")]
    NotFound(String),

    /// The input could not be tokenized at all
    #[error("malformed markup: {0}")]
    MalformedMarkup(String),

    #[error("invalid url '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("unknown site: {0}")]
    UnknownSite(String),
}

impl ScrapeError {
    pub fn network(url: impl Into<String>, message: impl ToString) -> Self {
        Self::Network {
            url: url.into(),
            message: message.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, ScrapeError>;
