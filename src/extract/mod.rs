//! Field extraction from a fetched listing page.
//!
//! Every heuristic degrades to an absent value instead of failing; the only
//! error is a source URL that cannot identify a listing.

pub mod amenities;
pub mod bedrooms;
pub mod dom;
pub mod image;
pub mod text;
pub mod title;

use scraper::Html;
use std::sync::Arc;
use url::Url;

use crate::config::ScrapeConfig;
use crate::error::ScrapeError;

pub use title::title_from_url;

/// Fields read from one listing page, before amenity normalization
#[derive(Debug, Clone, PartialEq)]
pub struct PartialListingFields {
    pub title: String,
    pub price: Option<String>,
    pub bedrooms: Option<u8>,
    pub image_url: Option<String>,
    /// Harvested feature strings, deduplicated but not yet canonical
    pub raw_amenities: Vec<String>,
    pub description: Option<String>,
    pub availability: Option<String>,
}

/// Parse and check a listing URL. Only absolute http(s) URLs with a path
/// segment can name a listing.
pub fn parse_source_url(raw: &str) -> Result<Url, ScrapeError> {
    let url = Url::parse(raw.trim()).map_err(|e| ScrapeError::invalid(raw, e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ScrapeError::invalid(raw, "only http(s) URLs are supported"));
    }
    if url.host_str().is_none() {
        return Err(ScrapeError::invalid(raw, "URL has no host"));
    }
    Ok(url)
}

pub struct FieldExtractor {
    config: Arc<ScrapeConfig>,
    base_url: Url,
}

impl FieldExtractor {
    pub fn new(config: Arc<ScrapeConfig>) -> Result<Self, ScrapeError> {
        let base_url = parse_source_url(&config.base_url)?;
        Ok(Self { config, base_url })
    }

    /// Derive every listing field from `document`, fetched from `source_url`
    pub fn extract(
        &self,
        document: &Html,
        source_url: &str,
    ) -> Result<PartialListingFields, ScrapeError> {
        let url = parse_source_url(source_url)?;
        let title = title_from_url(&url)
            .ok_or_else(|| ScrapeError::invalid(source_url, "URL has no listing path segment"))?;

        let bedrooms = bedrooms::bedrooms_from_title(
            &title,
            &self.config.bedroom_categories,
            self.config.max_bedrooms(),
        );

        Ok(PartialListingFields {
            price: text::find_price(document),
            bedrooms,
            image_url: image::resolve_image(document, &self.config.images, &self.base_url),
            raw_amenities: amenities::harvest(document, self.config.amenities.min_count),
            description: text::find_description(document),
            availability: text::find_availability(document),
            title,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> FieldExtractor {
        FieldExtractor::new(Arc::new(ScrapeConfig::default())).unwrap()
    }

    #[test]
    fn title_ignores_page_content() {
        let a = Html::parse_document("<title>LUXURY LIVING!!!</title><h1>Best deal</h1>");
        let b = Html::parse_document("<title>Other</title><p>$700/mo</p>");
        let url = "https://www.binghamtonwest.com/10-seminary-apt-2";

        let fields_a = extractor().extract(&a, url).unwrap();
        let fields_b = extractor().extract(&b, url).unwrap();
        assert_eq!(fields_a.title, "10 Seminary Apt 2");
        assert_eq!(fields_a.title, fields_b.title);
    }

    #[test]
    fn missing_fields_are_absent_not_errors() {
        let html = Html::parse_document("<p>Nothing to see</p>");
        let fields = extractor()
            .extract(&html, "https://www.binghamtonwest.com/10-seminary-apt-1")
            .unwrap();
        assert_eq!(fields.price, None);
        assert_eq!(fields.bedrooms, None);
        assert_eq!(fields.image_url, None);
        assert_eq!(fields.description, None);
        assert_eq!(fields.availability, None);
    }

    #[test]
    fn malformed_urls_are_invalid_input() {
        let html = Html::parse_document("<p>$500</p>");
        for bad in ["not a url", "ftp://www.binghamtonwest.com/6-ayres", "/6-ayres"] {
            let err = extractor().extract(&html, bad).unwrap_err();
            assert!(matches!(err, ScrapeError::InvalidInput { .. }), "{bad}");
        }
    }
}
