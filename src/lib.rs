//! Scrapes student-housing listings from a fixed catalog of pages, normalizes
//! them into uniform records and serves them over a small JSON API.

pub mod api;
pub mod assemble;
pub mod config;
pub mod error;
pub mod extract;
pub mod models;
pub mod normalize;
pub mod refresh;
pub mod scrapers;
pub mod store;

pub use assemble::ListingAssembler;
pub use config::{Config, FetchMode, ScrapeConfig};
pub use error::{AssemblyError, ScrapeError, StoreError};
pub use models::{ListingQuery, ListingRecord, Property};
pub use refresh::{refresh_catalog, refresh_one, RefreshSummary};
pub use scrapers::{Catalog, DocumentFetcher};
pub use store::{ListingStore, MemoryListingStore, PgListingStore};
