//! JSON API over the listing store and scraper.

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::assemble::ListingAssembler;
use crate::error::{ScrapeError, StoreError};
use crate::models::{ListingQuery, ListingRecord, ListingResults, Property};
use crate::refresh::refresh_catalog;
use crate::scrapers::Catalog;
use crate::store::ListingStore;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ListingStore>,
    pub assembler: Arc<ListingAssembler>,
    pub catalog: Arc<Catalog>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RefreshResponse {
    pub message: String,
    pub count: usize,
}

#[derive(Debug, Deserialize)]
pub struct DetailsParams {
    pub url: Option<String>,
}

/// Application error type
#[derive(Debug)]
pub enum AppError {
    NotFound(&'static str),
    Store(StoreError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::NotFound(what) => (StatusCode::NOT_FOUND, format!("{} not found", what)),
            AppError::Store(e) => {
                error!("Store error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        AppError::Store(e)
    }
}

/// GET /health
async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// GET /api/listings - filtered, sorted listings
async fn list_listings(
    State(state): State<AppState>,
    Query(query): Query<ListingQuery>,
) -> Result<Json<ListingResults>, AppError> {
    let results = state.store.list(&query).await?;
    match &results {
        ListingResults::Matched(properties) => info!("Returning {} listings", properties.len()),
        ListingResults::AllNoPrice { properties, .. } => {
            info!("No listing has a price, returning all {} unfiltered", properties.len())
        }
    }
    Ok(Json(results))
}

/// GET /api/properties/:id - stored row, refreshed from the site when possible
async fn get_property(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Property>, AppError> {
    let mut property = state
        .store
        .find_by_id(id)
        .await?
        .ok_or(AppError::NotFound("Property"))?;

    if state.assembler.is_site_listing(&property.url) {
        match state.assembler.assemble_one(&property.url).await {
            Ok(fresh) => property = overlay_fresh_details(property, fresh),
            Err(e) => warn!("Error fetching updated property details for {}: {}", e.url, e.cause),
        }
    }
    Ok(Json(property))
}

/// Replace stored fields with the non-empty ones from a fresh scrape.
/// The fresh copy is not written back.
fn overlay_fresh_details(mut property: Property, fresh: ListingRecord) -> Property {
    if let Some(bedrooms) = fresh.bedrooms {
        property.bedrooms = Some(bedrooms.into());
    }
    if !fresh.amenities.is_empty() {
        property.amenities = fresh.amenities;
    }
    if !fresh.description.is_empty() {
        property.description = Some(fresh.description);
    }
    if let Some(price) = fresh.price {
        property.price = price;
    }
    property.with_display_price()
}

/// POST /refresh - run a full catalog pass
async fn refresh(State(state): State<AppState>) -> Json<RefreshResponse> {
    let summary = refresh_catalog(&state.assembler, &state.catalog, state.store.as_ref()).await;
    Json(RefreshResponse {
        message: "Data refresh completed successfully".to_string(),
        count: summary.discovered,
    })
}

/// GET /api/scrape-listing-details?url= - scrape one listing on demand
async fn scrape_listing_details(
    State(state): State<AppState>,
    Query(params): Query<DetailsParams>,
) -> Response {
    let Some(url) = params.url.filter(|u| !u.trim().is_empty()) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "success": false, "error": "No URL provided" })),
        )
            .into_response();
    };

    match state.assembler.assemble_one(&url).await {
        Ok(record) => Json(json!({
            "success": true,
            "title": record.title,
            "price": record.price_display(),
            "location": record.location,
            "url": record.url,
            "bedrooms": record.bedrooms,
            "image_url": record.image_url,
            "amenities": record.amenities,
            "description": record.description,
            "availability": record.availability,
        }))
        .into_response(),
        Err(e) => {
            warn!("Error scraping listing details from {}: {}", url, e.cause);
            let status = match e.cause {
                ScrapeError::InvalidInput { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                _ => StatusCode::BAD_GATEWAY,
            };
            (
                status,
                Json(json!({ "success": false, "error": e.cause.to_string(), "url": url })),
            )
                .into_response()
        }
    }
}

/// Create the axum router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/listings", get(list_listings))
        .route("/api/properties/:id", get(get_property))
        .route("/api/scrape-listing-details", get(scrape_listing_details))
        .route("/refresh", post(refresh))
        .with_state(state)
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store, no-cache, must-revalidate, max-age=0"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::PRAGMA,
            HeaderValue::from_static("no-cache"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::EXPIRES,
            HeaderValue::from_static("0"),
        ))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
