use crate::error::ScrapeError;
use async_trait::async_trait;
use url::Url;

/// Fetches the HTML of a listing page.
/// Implementations decide how (plain HTTP, headless browser, fixtures in tests).
#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    /// Fetch the page at `url` and return its HTML
    async fn fetch(&self, url: &Url) -> Result<String, ScrapeError>;

    /// Short name used in logs
    fn name(&self) -> &'static str;
}
