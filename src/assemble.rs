use async_stream::stream;
use futures::Stream;
use scraper::Html;
use std::pin::Pin;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::ScrapeConfig;
use crate::error::{AssemblyError, ScrapeError};
use crate::extract::{parse_source_url, title_from_url, FieldExtractor};
use crate::models::ListingRecord;
use crate::normalize::{AmenityNormalizer, PropertyKind};
use crate::scrapers::{Catalog, DocumentFetcher};

const NO_DESCRIPTION: &str =
    "No description available. Contact the property manager for more details.";

/// Turns listing URLs into normalized records: fetch, extract, normalize.
pub struct ListingAssembler {
    fetcher: Arc<dyn DocumentFetcher>,
    extractor: FieldExtractor,
    normalizer: AmenityNormalizer,
    config: Arc<ScrapeConfig>,
    site_host: String,
}

impl ListingAssembler {
    pub fn new(
        fetcher: Arc<dyn DocumentFetcher>,
        config: Arc<ScrapeConfig>,
    ) -> Result<Self, ScrapeError> {
        let site = parse_source_url(&config.base_url)?;
        Ok(Self {
            site_host: site.host_str().unwrap_or_default().to_string(),
            extractor: FieldExtractor::new(config.clone())?,
            normalizer: AmenityNormalizer::new(config.amenities.clone()),
            fetcher,
            config,
        })
    }

    /// Whether `url` points at the configured listing site
    pub fn is_site_listing(&self, url: &str) -> bool {
        !self.site_host.is_empty() && url.contains(&self.site_host)
    }

    /// Assemble a single listing. Every failure is returned to the caller.
    pub async fn assemble_one(&self, raw_url: &str) -> Result<ListingRecord, AssemblyError> {
        let url = parse_source_url(raw_url).map_err(|e| AssemblyError::new(raw_url, e))?;
        if title_from_url(&url).is_none() {
            return Err(AssemblyError::new(
                raw_url,
                ScrapeError::invalid(raw_url, "URL has no listing path segment"),
            ));
        }

        let html = self
            .fetcher
            .fetch(&url)
            .await
            .map_err(|e| AssemblyError::new(raw_url, e))?;

        self.build(&html, raw_url)
            .map_err(|e| AssemblyError::new(raw_url, e))
    }

    /// Lazily assemble every catalog URL in order, one at a time with the
    /// configured delay between requests. Failed URLs are logged and skipped.
    pub fn assemble_catalog<'a>(
        &'a self,
        catalog: &'a Catalog,
    ) -> Pin<Box<dyn Stream<Item = ListingRecord> + Send + 'a>> {
        Box::pin(stream! {
            let total = catalog.len();
            info!("Scraping {} listings with the {} fetcher", total, self.fetcher.name());

            for (index, (category, url)) in catalog.entries().enumerate() {
                if index > 0 && !self.config.request_delay.is_zero() {
                    tokio::time::sleep(self.config.request_delay).await;
                }

                debug!("[{}/{}] {} (listed under {} bed)", index + 1, total, url, category);
                match self.assemble_one(url).await {
                    Ok(record) => {
                        info!("Scraped {} ({})", record.title, record.price_display());
                        yield record;
                    }
                    Err(e) => warn!("Skipping {}: {}", e.url, e.cause),
                }
            }
        })
    }

    /// Parse and turn fetched HTML into a record. Kept synchronous because
    /// the parsed document is not `Send`.
    pub fn build(&self, html: &str, source_url: &str) -> Result<ListingRecord, ScrapeError> {
        let document = Html::parse_document(html);
        let fields = self.extractor.extract(&document, source_url)?;
        let normalized = self
            .normalizer
            .normalize(&fields.raw_amenities, fields.bedrooms, &fields.title);

        let description = match fields.description {
            Some(text) => text,
            None => describe(
                &fields.title,
                fields.bedrooms,
                normalized.kind,
                &normalized.amenities,
            ),
        };

        let image_url = fields.image_url.unwrap_or_else(|| {
            debug!("No property image for {}, using placeholder", source_url);
            self.config.placeholder_image_url.clone()
        });

        Ok(ListingRecord {
            location: fields.title.clone(),
            title: fields.title,
            price: fields.price,
            url: source_url.trim().to_string(),
            bedrooms: fields.bedrooms,
            image_url,
            amenities: normalized.amenities,
            description,
            availability: fields.availability,
        })
    }
}

/// Synthesize a description sentence from the normalized amenities
pub fn describe(
    title: &str,
    bedrooms: Option<u8>,
    kind: PropertyKind,
    amenities: &[String],
) -> String {
    let (last, rest) = match amenities.split_last() {
        Some(split) => split,
        None => return NO_DESCRIPTION.to_string(),
    };

    let subject = match bedrooms {
        Some(n) => format!("This {} bedroom {}", n, kind),
        None => format!("This {}", kind),
    };
    let features = if rest.is_empty() {
        last.clone()
    } else {
        format!("{} and {}", rest.join(", "), last)
    };

    format!("{} at {} features {}.", subject, title, features)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use futures::StreamExt;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use url::Url;

    use crate::scrapers::CatalogCategory;

    struct FakeFetcher {
        pages: HashMap<String, String>,
        calls: AtomicUsize,
    }

    impl FakeFetcher {
        fn new(pages: &[(&str, &str)]) -> Self {
            Self {
                pages: pages
                    .iter()
                    .map(|(url, html)| (url.to_string(), html.to_string()))
                    .collect(),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl DocumentFetcher for FakeFetcher {
        async fn fetch(&self, url: &Url) -> Result<String, ScrapeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.pages
                .get(url.as_str())
                .cloned()
                .ok_or_else(|| ScrapeError::Status {
                    url: url.to_string(),
                    status: 404,
                })
        }

        fn name(&self) -> &'static str {
            "fake"
        }
    }

    fn assembler(fetcher: Arc<FakeFetcher>) -> ListingAssembler {
        let mut config = ScrapeConfig::default();
        config.request_delay = Duration::ZERO;
        ListingAssembler::new(fetcher, Arc::new(config)).unwrap()
    }

    const PAGE: &str = r#"
        <html><body>
          <p>Rent: $650/month per person</p>
          <ul><li>Laundry: washer and dryer</li><li>Front porch</li></ul>
        </body></html>"#;

    #[test]
    fn describe_joins_amenities_into_a_sentence() {
        let amenities = vec![
            "Two Bedrooms".to_string(),
            "One Bathroom".to_string(),
            "Living Room".to_string(),
        ];
        assert_eq!(
            describe("14 Seminary Apt 2A", Some(2), PropertyKind::Apartment, &amenities),
            "This 2 bedroom apartment at 14 Seminary Apt 2A features \
             Two Bedrooms, One Bathroom and Living Room."
        );
        assert_eq!(
            describe("6 Ayres", None, PropertyKind::Property, &amenities[..1]),
            "This property at 6 Ayres features Two Bedrooms."
        );
        assert_eq!(describe("6 Ayres", None, PropertyKind::Property, &[]), NO_DESCRIPTION);
    }

    #[test]
    fn site_listings_are_matched_by_host() {
        let assembler = assembler(Arc::new(FakeFetcher::new(&[])));
        assert!(assembler.is_site_listing("https://www.binghamtonwest.com/6-ayres"));
        assert!(!assembler.is_site_listing("https://other.example.com/6-ayres"));
    }

    #[tokio::test]
    async fn assemble_one_builds_a_full_record() {
        let url = "https://www.binghamtonwest.com/14-seminary-apt-2a";
        let fetcher = Arc::new(FakeFetcher::new(&[(url, PAGE)]));
        let record = assembler(fetcher).assemble_one(url).await.unwrap();

        assert_eq!(record.title, "14 Seminary Apt 2A");
        assert_eq!(record.location, record.title);
        assert_eq!(record.price.as_deref(), Some("$650/month"));
        assert_eq!(record.url, url);
        assert!(record.image_url.ends_with("/static/images/placeholder.jpg"));
        assert!(record.amenities.iter().any(|a| a == "Washer & Dryer"));
        assert!(record.description.starts_with("This apartment at 14 Seminary Apt 2A features "));
    }

    #[tokio::test]
    async fn invalid_url_never_reaches_the_fetcher() {
        let fetcher = Arc::new(FakeFetcher::new(&[]));
        let assembler = assembler(fetcher.clone());

        for bad in ["not a url", "https://www.binghamtonwest.com/"] {
            let err = assembler.assemble_one(bad).await.unwrap_err();
            assert!(matches!(err.cause, ScrapeError::InvalidInput { .. }), "{bad}");
        }
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn fetch_failure_is_returned_by_assemble_one() {
        let fetcher = Arc::new(FakeFetcher::new(&[]));
        let err = assembler(fetcher)
            .assemble_one("https://www.binghamtonwest.com/6-ayres")
            .await
            .unwrap_err();
        assert!(err.cause.is_fetch());
        assert_eq!(err.url, "https://www.binghamtonwest.com/6-ayres");
    }

    #[tokio::test]
    async fn catalog_pass_skips_failed_urls() {
        let good = "https://www.binghamtonwest.com/10-seminary-apt-2";
        let bad = "https://www.binghamtonwest.com/404-missing";
        let fetcher = Arc::new(FakeFetcher::new(&[(good, PAGE)]));
        let assembler = assembler(fetcher.clone());
        let catalog = Catalog {
            categories: vec![CatalogCategory {
                bedrooms: 1,
                urls: vec![bad.to_string(), good.to_string()],
            }],
        };

        let records: Vec<_> = assembler.assemble_catalog(&catalog).collect().await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].url, good);
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 2);
    }
}
