use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Which fetcher a catalog pass uses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    /// Plain HTTP request via reqwest
    Http,
    /// Headless Chrome, for pages assembled by JavaScript
    Browser,
}

impl std::str::FromStr for FetchMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "http" => Ok(FetchMode::Http),
            "browser" => Ok(FetchMode::Browser),
            _ => Err(anyhow::anyhow!("Invalid fetch mode: {}", s)),
        }
    }
}

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub fetch_mode: FetchMode,
    pub catalog_path: Option<PathBuf>,
    pub scrape_on_startup: bool,
    pub scrape: ScrapeConfig,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        let mut scrape = ScrapeConfig::default();
        if let Ok(secs) = env::var("REQUEST_DELAY_SECS") {
            scrape.request_delay = Duration::from_secs(
                secs.parse().context("REQUEST_DELAY_SECS must be a number")?,
            );
        }
        if let Ok(secs) = env::var("FETCH_TIMEOUT_SECS") {
            scrape.timeout = Duration::from_secs(
                secs.parse().context("FETCH_TIMEOUT_SECS must be a number")?,
            );
        }

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            port: env::var("PORT")
                .unwrap_or_else(|_| "5000".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            fetch_mode: env::var("FETCH_MODE")
                .unwrap_or_else(|_| "http".to_string())
                .parse()?,
            catalog_path: env::var("CATALOG_PATH").ok().map(PathBuf::from),
            scrape_on_startup: env::var("SCRAPE_ON_STARTUP")
                .map(|v| !matches!(v.to_ascii_lowercase().as_str(), "0" | "false" | "no"))
                .unwrap_or(true),
            scrape,
        })
    }
}

/// Hints used to pick the property photograph out of a page's images
#[derive(Debug, Clone)]
pub struct ImageHints {
    /// `src` substrings marking a location map image
    pub map_tokens: Vec<String>,
    /// Street names that mark a property photo
    pub street_tokens: Vec<StreetToken>,
    /// `src` substrings that mark logos, icons and other non-property assets
    pub exclusions: Vec<String>,
    /// Images wider or taller than this are considered photos
    pub min_dimension: u32,
}

#[derive(Debug, Clone)]
pub struct StreetToken {
    pub name: String,
    /// Only counts when the `src` also mentions "apt"
    pub requires_apt: bool,
}

impl StreetToken {
    fn new(name: &str, requires_apt: bool) -> Self {
        Self {
            name: name.to_string(),
            requires_apt,
        }
    }
}

/// Default amenity strings merged in by the normalizer
#[derive(Debug, Clone)]
pub struct AmenityDefaults {
    pub bathroom: String,
    pub kitchen: String,
    pub living: String,
    /// Appended when missing from every listing
    pub standard: Vec<String>,
    /// Appended, in order, while a listing has fewer than `min_count` amenities
    pub fallback: Vec<String>,
    pub min_count: usize,
}

/// Immutable scraping configuration shared by the fetchers, extractor and normalizer
#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    pub base_url: String,
    pub placeholder_image_url: String,
    pub user_agent: String,
    pub timeout: Duration,
    /// Pause between consecutive catalog requests
    pub request_delay: Duration,
    /// Time given to a browser-rendered page to finish its scripts
    pub browser_settle: Duration,
    pub images: ImageHints,
    /// Category label -> bedroom count, e.g. "2 Beds" -> 2
    pub bedroom_categories: Vec<(String, u8)>,
    pub amenities: AmenityDefaults,
}

impl ScrapeConfig {
    /// Largest bedroom count any category declares
    pub fn max_bedrooms(&self) -> u8 {
        self.bedroom_categories
            .iter()
            .map(|(_, beds)| *beds)
            .max()
            .unwrap_or(0)
    }
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        let base_url = "https://www.binghamtonwest.com".to_string();
        let owned = |items: &[&str]| items.iter().map(|s| s.to_string()).collect::<Vec<_>>();

        Self {
            placeholder_image_url: format!("{}/static/images/placeholder.jpg", base_url),
            base_url,
            user_agent: concat!(
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 ",
                "(KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
            )
            .to_string(),
            timeout: Duration::from_secs(10),
            request_delay: Duration::from_secs(3),
            browser_settle: Duration::from_secs(3),
            images: ImageHints {
                map_tokens: owned(&["map", "location"]),
                street_tokens: vec![
                    StreetToken::new("seminary", true),
                    StreetToken::new("ayres", false),
                    StreetToken::new("murray", false),
                    StreetToken::new("leroy", false),
                    StreetToken::new("chapin", false),
                    StreetToken::new("walnut", false),
                    StreetToken::new("oak", false),
                ],
                exclusions: owned(&["logo", "icon", "button", "wix-image", "bedroom"]),
                min_dimension: 200,
            },
            bedroom_categories: (1..=7u8)
                .map(|n| {
                    let label = if n == 1 {
                        "1 Bed".to_string()
                    } else {
                        format!("{} Beds", n)
                    };
                    (label, n)
                })
                .collect(),
            amenities: AmenityDefaults {
                bathroom: "One Bathroom".to_string(),
                kitchen: "Kitchen".to_string(),
                living: "Living Room".to_string(),
                standard: owned(&["Pet Friendly", "1 Block to Bus Stop"]),
                fallback: owned(&[
                    "Kitchen",
                    "Living Room",
                    "Fully Furnished",
                    "Pet Friendly",
                    "1 Block to Bus Stop",
                ]),
                min_count: 3,
            },
        }
    }
}
