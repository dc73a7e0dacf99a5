//! In-memory listing store. Data is lost on restart.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{matches_filters, present, sort_properties, ListingStore};
use crate::error::StoreError;
use crate::models::{ListingQuery, ListingRecord, ListingResults, Property};

pub struct MemoryListingStore {
    site_host: String,
    rows: RwLock<Vec<Property>>,
}

impl MemoryListingStore {
    /// `site_host` is the host listings are restricted to unless a query asks for all
    pub fn new(site_host: impl Into<String>) -> Self {
        Self {
            site_host: site_host.into(),
            rows: RwLock::new(Vec::new()),
        }
    }
}

#[async_trait]
impl ListingStore for MemoryListingStore {
    async fn upsert(&self, record: &ListingRecord) -> Result<i32, StoreError> {
        let mut rows = self.rows.write().await;
        let now = Utc::now();

        if let Some(existing) = rows.iter_mut().find(|p| p.url == record.url) {
            let id = existing.id;
            let created_at = existing.created_at;
            *existing = Property::from_record(record, id, created_at, now);
            return Ok(id);
        }

        let id = rows.iter().map(|p| p.id).max().unwrap_or(0) + 1;
        rows.push(Property::from_record(record, id, now, now));
        Ok(id)
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Property>, StoreError> {
        let rows = self.rows.read().await;
        Ok(rows
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .map(|p| p.with_display_price().with_distance()))
    }

    async fn list(&self, query: &ListingQuery) -> Result<ListingResults, StoreError> {
        let mut matching: Vec<Property> = self
            .rows
            .read()
            .await
            .iter()
            .filter(|p| matches_filters(p, query, &self.site_host))
            .cloned()
            .collect();
        sort_properties(&mut matching, query.sort);
        Ok(present(matching, query))
    }

    async fn count(&self) -> Result<i64, StoreError> {
        Ok(self.rows.read().await.len() as i64)
    }
}
