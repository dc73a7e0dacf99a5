use futures::StreamExt;
use serde::Serialize;
use tracing::{error, info};

use crate::assemble::ListingAssembler;
use crate::error::{AssemblyError, StoreError};
use crate::models::ListingRecord;
use crate::scrapers::Catalog;
use crate::store::ListingStore;

/// Outcome of one catalog pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RefreshSummary {
    /// Listings assembled from the catalog
    pub discovered: usize,
    /// Listings written to the store
    pub saved: usize,
}

/// Scrape every catalog URL and upsert each assembled listing as it arrives.
/// Neither failed URLs nor failed writes stop the pass.
pub async fn refresh_catalog(
    assembler: &ListingAssembler,
    catalog: &Catalog,
    store: &dyn ListingStore,
) -> RefreshSummary {
    let mut summary = RefreshSummary::default();
    let mut records = assembler.assemble_catalog(catalog);

    while let Some(record) = records.next().await {
        summary.discovered += 1;
        match store.upsert(&record).await {
            Ok(_) => summary.saved += 1,
            Err(e) => error!("Failed to save {}: {}", record.url, e),
        }
    }

    info!(
        "Catalog pass done: {} discovered, {} saved",
        summary.discovered, summary.saved
    );
    summary
}

#[derive(Debug, thiserror::Error)]
pub enum RefreshError {
    #[error(transparent)]
    Assembly(#[from] AssemblyError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Scrape one listing and persist it, returning the record and its row id
pub async fn refresh_one(
    assembler: &ListingAssembler,
    store: &dyn ListingStore,
    url: &str,
) -> Result<(i32, ListingRecord), RefreshError> {
    let record = assembler.assemble_one(url).await?;
    let id = store.upsert(&record).await?;
    info!("Refreshed {} as property {}", record.url, id);
    Ok((id, record))
}
