//! PostgreSQL listing store.

use async_trait::async_trait;
use sqlx::postgres::PgPool;
use sqlx::{Postgres, QueryBuilder};
use tracing::{debug, info};

use super::{present, ListingStore, OPEN_ENDED_BEDROOMS};
use crate::error::StoreError;
use crate::models::{ListingQuery, ListingRecord, ListingResults, ListingSort, Property};

pub struct PgListingStore {
    pool: PgPool,
    site_host: String,
}

impl PgListingStore {
    pub fn new(pool: PgPool, site_host: impl Into<String>) -> Self {
        Self {
            pool,
            site_host: site_host.into(),
        }
    }

    /// Apply pending migrations from `./migrations`
    pub async fn migrate(&self) -> Result<(), StoreError> {
        info!("Running database migrations...");
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl ListingStore for PgListingStore {
    async fn upsert(&self, record: &ListingRecord) -> Result<i32, StoreError> {
        let (id,): (i32,) = sqlx::query_as(
            r#"
            INSERT INTO properties
                (title, price, location, url, bedrooms, image_url, amenities, description, availability)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (url) DO UPDATE SET
                title = EXCLUDED.title,
                price = EXCLUDED.price,
                location = EXCLUDED.location,
                bedrooms = EXCLUDED.bedrooms,
                image_url = EXCLUDED.image_url,
                amenities = EXCLUDED.amenities,
                description = EXCLUDED.description,
                availability = EXCLUDED.availability,
                updated_at = NOW()
            RETURNING id
            "#,
        )
        .bind(&record.title)
        .bind(record.price_display())
        .bind(&record.location)
        .bind(&record.url)
        .bind(record.bedrooms.map(i32::from))
        .bind(&record.image_url)
        .bind(&record.amenities)
        .bind(&record.description)
        .bind(&record.availability)
        .fetch_one(&self.pool)
        .await?;

        debug!("Upserted property {} ({})", id, record.url);
        Ok(id)
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Property>, StoreError> {
        let row: Option<Property> = sqlx::query_as("SELECT * FROM properties WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|p| p.with_display_price().with_distance()))
    }

    async fn list(&self, query: &ListingQuery) -> Result<ListingResults, StoreError> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT * FROM properties WHERE TRUE");

        if !query.include_all {
            builder
                .push(" AND url LIKE ")
                .push_bind(format!("%{}%", self.site_host));
        }
        match query.bedrooms {
            Some(n) if n == OPEN_ENDED_BEDROOMS => {
                builder.push(" AND bedrooms >= ").push_bind(n);
            }
            Some(n) => {
                builder.push(" AND bedrooms = ").push_bind(n);
            }
            None => {}
        }

        builder.push(match query.sort {
            ListingSort::IdAsc | ListingSort::DistanceAsc => " ORDER BY id ASC",
            ListingSort::IdDesc => " ORDER BY id DESC",
            ListingSort::PriceAsc => " ORDER BY price ASC, id ASC",
            ListingSort::PriceDesc => " ORDER BY price DESC, id ASC",
        });

        let rows: Vec<Property> = builder.build_query_as().fetch_all(&self.pool).await?;
        debug!("Fetched {} properties from database", rows.len());
        Ok(present(rows, query))
    }

    async fn count(&self) -> Result<i64, StoreError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM properties")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
