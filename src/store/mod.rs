//! Listing persistence.
//!
//! - `PgListingStore` - PostgreSQL, used by the server and CLI
//! - `MemoryListingStore` - in-memory, for tests and dry runs

pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::models::{ListingQuery, ListingRecord, ListingResults, ListingSort, Property};

pub use memory::MemoryListingStore;
pub use postgres::PgListingStore;

/// Insert-or-update storage for scraped listings, keyed by URL
#[async_trait]
pub trait ListingStore: Send + Sync {
    /// Insert the record, or overwrite the row with the same URL.
    /// Identity and creation time of an existing row are kept.
    async fn upsert(&self, record: &ListingRecord) -> Result<i32, StoreError>;

    /// One property with the price sentinel applied
    async fn find_by_id(&self, id: i32) -> Result<Option<Property>, StoreError>;

    /// Properties matching `query`, with the price sentinel and distance applied
    async fn list(&self, query: &ListingQuery) -> Result<ListingResults, StoreError>;

    async fn count(&self) -> Result<i64, StoreError>;
}

/// Bedroom filter, where the top bucket means "that many or more"
pub(crate) const OPEN_ENDED_BEDROOMS: i32 = 4;

/// Past the last known distance when sorting
const UNKNOWN_DISTANCE: f64 = 999.0;

/// Finish rows fetched with the bedroom and site filters: apply display
/// values, then the price and distance filters and the distance sort.
/// Prices are free text, so these run after the query.
pub(crate) fn present(rows: Vec<Property>, query: &ListingQuery) -> ListingResults {
    let rows: Vec<Property> = rows
        .into_iter()
        .map(|p| p.with_display_price().with_distance())
        .collect();

    if query.has_price_filter() && !rows.is_empty() && rows.iter().all(|p| !p.has_price()) {
        return ListingResults::all_no_price(rows);
    }

    let mut matched: Vec<Property> = rows
        .into_iter()
        .filter(|p| matches_price_and_distance(p, query))
        .collect();

    if query.sort == ListingSort::DistanceAsc {
        matched.sort_by(|a, b| {
            let distance = |p: &Property| p.distance.unwrap_or(UNKNOWN_DISTANCE);
            distance(a).total_cmp(&distance(b)).then(a.id.cmp(&b.id))
        });
    }
    ListingResults::Matched(matched)
}

fn matches_price_and_distance(property: &Property, query: &ListingQuery) -> bool {
    if (query.has_price_filter() || query.with_price_only) && !property.has_price() {
        return false;
    }
    if let Some(price) = property.numeric_price() {
        if query.min_price.is_some_and(|min| price < min)
            || query.max_price.is_some_and(|max| price > max)
        {
            return false;
        }
    }
    match (query.distance, property.distance) {
        (Some(max), Some(miles)) => miles <= max,
        _ => true,
    }
}

pub(crate) fn matches_filters(property: &Property, query: &ListingQuery, site_host: &str) -> bool {
    if !query.include_all && !property.url.contains(site_host) {
        return false;
    }
    match (query.bedrooms, property.bedrooms) {
        (None, _) => true,
        (Some(_), None) => false,
        (Some(wanted), Some(n)) if wanted == OPEN_ENDED_BEDROOMS => n >= wanted,
        (Some(wanted), Some(n)) => n == wanted,
    }
}

/// Order rows the way the SQL store does: by id, or by price text then id
pub(crate) fn sort_properties(rows: &mut [Property], sort: ListingSort) {
    match sort {
        ListingSort::IdAsc | ListingSort::DistanceAsc => rows.sort_by_key(|p| p.id),
        ListingSort::IdDesc => rows.sort_by_key(|p| std::cmp::Reverse(p.id)),
        ListingSort::PriceAsc => rows.sort_by(|a, b| a.price.cmp(&b.price).then(a.id.cmp(&b.id))),
        ListingSort::PriceDesc => rows.sort_by(|a, b| b.price.cmp(&a.price).then(a.id.cmp(&b.id))),
    }
}
