use crate::config::ScrapeConfig;
use crate::error::ScrapeError;
use crate::scrapers::traits::DocumentFetcher;
use anyhow::{Context, Result};
use async_trait::async_trait;
use headless_chrome::{Browser, LaunchOptions, Tab};
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// Fetcher that renders pages in headless Chrome.
/// The listing site builds its pages with JavaScript, so the raw HTTP body
/// can miss the details panel and photos.
pub struct BrowserFetcher {
    browser: Browser,
    user_agent: String,
    settle: Duration,
}

impl BrowserFetcher {
    /// Launch a headless Chrome instance
    pub fn new(config: &ScrapeConfig) -> Result<Self> {
        info!("Launching headless Chrome...");

        let options = LaunchOptions::default_builder()
            .headless(true)
            .sandbox(false)
            .idle_browser_timeout(Duration::from_secs(600))
            .build()
            .context("Failed to build launch options")?;

        let browser = Browser::new(options).context("Failed to launch Chrome browser")?;

        Ok(Self {
            browser,
            user_agent: config.user_agent.clone(),
            settle: config.browser_settle,
        })
    }

    /// Render `url` in a fresh tab. The tab is closed whether or not the
    /// page could be read.
    fn render(browser: &Browser, url: &str, user_agent: &str, settle: Duration) -> Result<String> {
        let tab = browser.new_tab()?;
        let html = Self::read_page(&tab, url, user_agent, settle);

        if let Err(e) = tab.close(true) {
            warn!("Failed to close tab for {}: {}", url, e);
        }
        html
    }

    fn read_page(tab: &Tab, url: &str, user_agent: &str, settle: Duration) -> Result<String> {
        tab.set_user_agent(user_agent, None, None)?;

        tab.navigate_to(url)?;
        tab.wait_until_navigated()?;

        // Give client-side rendering time to fill in the page
        thread::sleep(settle);

        let result = tab.evaluate("document.documentElement.outerHTML", false)?;
        result
            .value
            .and_then(|value| value.as_str().map(str::to_string))
            .context("Page returned no HTML")
    }
}

#[async_trait]
impl DocumentFetcher for BrowserFetcher {
    async fn fetch(&self, url: &Url) -> Result<String, ScrapeError> {
        debug!("Rendering URL: {}", url);

        let browser = self.browser.clone();
        let target = url.to_string();
        let user_agent = self.user_agent.clone();
        let settle = self.settle;

        let rendered = tokio::task::spawn_blocking(move || {
            BrowserFetcher::render(&browser, &target, &user_agent, settle)
        })
        .await
        .map_err(|e| ScrapeError::fetch(url.as_str(), e))?;

        let html = rendered.map_err(|e| ScrapeError::fetch(url.as_str(), e))?;
        debug!("Rendered {} bytes of HTML", html.len());
        Ok(html)
    }

    fn name(&self) -> &'static str {
        "browser"
    }
}
