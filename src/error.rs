//! Error types for scraping, assembly and persistence

use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors raised while turning a listing URL into a record
#[derive(Error, Debug)]
pub enum ScrapeError {
    /// Malformed source URL. Retrying will not help.
    #[error("invalid listing URL '{url}': {reason}")]
    InvalidInput { url: String, reason: String },

    /// Network, timeout or browser failure while fetching the page
    #[error("failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: BoxError,
    },

    /// The server answered with a non-success status
    #[error("failed to fetch {url}: status code {status}")]
    Status { url: String, status: u16 },
}

impl ScrapeError {
    pub fn invalid(url: impl Into<String>, reason: impl Into<String>) -> Self {
        ScrapeError::InvalidInput {
            url: url.into(),
            reason: reason.into(),
        }
    }

    pub fn fetch(url: impl Into<String>, source: impl Into<BoxError>) -> Self {
        ScrapeError::Fetch {
            url: url.into(),
            source: source.into(),
        }
    }

    /// Whether this is a fetch-class failure the caller may retry
    pub fn is_fetch(&self) -> bool {
        matches!(self, ScrapeError::Fetch { .. } | ScrapeError::Status { .. })
    }
}

/// Failure to assemble a single listing, carrying the URL it was for
#[derive(Error, Debug)]
#[error("could not assemble listing {url}: {cause}")]
pub struct AssemblyError {
    pub url: String,
    #[source]
    pub cause: ScrapeError,
}

impl AssemblyError {
    pub fn new(url: impl Into<String>, cause: ScrapeError) -> Self {
        Self {
            url: url.into(),
            cause,
        }
    }
}

/// Persistence failures
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}
