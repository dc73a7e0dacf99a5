use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Display text used wherever a listing has no price
pub const PRICE_ON_REQUEST: &str = "Contact for price";

/// Rough miles to campus by street, first match wins
const STREET_DISTANCES: &[(&str, f64)] = &[
    ("seminary", 0.8),
    ("murray", 1.2),
    ("leroy", 0.9),
    ("front", 0.5),
    ("walnut", 1.3),
    ("chapin", 1.8),
    ("ayres", 1.5),
];
const DEFAULT_DISTANCE: f64 = 1.0;
const UNKNOWN_LOCATION_DISTANCE: f64 = 1.5;

/// Estimated distance to campus in miles, from the street in `location`.
/// There is no geocoding, so this is a per-street constant.
pub fn estimate_distance(location: &str) -> f64 {
    let location = location.trim().to_lowercase();
    if location.is_empty() {
        return UNKNOWN_LOCATION_DISTANCE;
    }
    STREET_DISTANCES
        .iter()
        .find(|(street, _)| location.contains(street))
        .map_or(DEFAULT_DISTANCE, |(_, miles)| *miles)
}

/// A freshly scraped listing, ready to be upserted by URL
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingRecord {
    /// Address derived from the URL path, never from page content
    pub title: String,
    pub price: Option<String>,
    /// Always equal to `title`
    pub location: String,
    pub url: String,
    pub bedrooms: Option<u8>,
    pub image_url: String,
    pub amenities: Vec<String>,
    pub description: String,
    pub availability: Option<String>,
}

impl ListingRecord {
    pub fn price_display(&self) -> &str {
        self.price.as_deref().unwrap_or(PRICE_ON_REQUEST)
    }
}

/// A listing as stored in the `properties` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Property {
    pub id: i32,
    pub title: String,
    pub price: String,
    pub location: String,
    pub url: String,
    pub bedrooms: Option<i32>,
    pub image_url: Option<String>,
    pub amenities: Vec<String>,
    pub description: Option<String>,
    pub availability: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Estimated miles to campus; computed on read, never stored
    #[sqlx(skip)]
    #[serde(default)]
    pub distance: Option<f64>,
}

impl Property {
    /// Row for `record` as the store writes it
    pub fn from_record(
        record: &ListingRecord,
        id: i32,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            title: record.title.clone(),
            price: record.price_display().to_string(),
            location: record.location.clone(),
            url: record.url.clone(),
            bedrooms: record.bedrooms.map(i32::from),
            image_url: Some(record.image_url.clone()),
            amenities: record.amenities.clone(),
            description: Some(record.description.clone()),
            availability: record.availability.clone(),
            created_at,
            updated_at,
            distance: None,
        }
    }

    /// Blank or degenerate prices ("$", "$,", "No price") are shown as the sentinel
    pub fn with_display_price(mut self) -> Self {
        let trimmed = self.price.trim();
        let bare_symbol = trimmed.starts_with('$') && !trimmed.chars().any(|c| c.is_ascii_digit());
        if trimmed.is_empty() || trimmed == "No price" || bare_symbol {
            self.price = PRICE_ON_REQUEST.to_string();
        }
        self
    }

    pub fn with_distance(mut self) -> Self {
        self.distance = Some(estimate_distance(&self.location));
        self
    }

    /// Whether the displayed price is a real one
    pub fn has_price(&self) -> bool {
        self.price != PRICE_ON_REQUEST
    }

    /// Every digit of the price read as one number: "$1,250/mo" -> 1250
    pub fn numeric_price(&self) -> Option<u64> {
        let digits: String = self.price.chars().filter(char::is_ascii_digit).collect();
        digits.parse().ok()
    }
}

/// Ordering of listing queries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingSort {
    #[default]
    IdAsc,
    IdDesc,
    PriceAsc,
    PriceDesc,
    DistanceAsc,
}

/// Filters accepted by the listings endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListingQuery {
    /// Exact bedroom count; 4 means "4 or more"
    pub bedrooms: Option<i32>,
    #[serde(default)]
    pub sort: ListingSort,
    /// Hide listings showing the price sentinel
    #[serde(default)]
    pub with_price_only: bool,
    /// Include listings from outside the configured site
    #[serde(default)]
    pub include_all: bool,
    /// Compared against the digits of the price
    pub min_price: Option<u64>,
    pub max_price: Option<u64>,
    /// Maximum estimated distance to campus, in miles
    pub distance: Option<f64>,
}

impl ListingQuery {
    pub fn has_price_filter(&self) -> bool {
        self.min_price.is_some() || self.max_price.is_some()
    }
}

/// Result of a listings query
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ListingResults {
    Matched(Vec<Property>),
    /// A price filter was requested but no listing has a price, so the
    /// filter was not applied
    AllNoPrice {
        all_no_price: bool,
        message: String,
        properties: Vec<Property>,
    },
}

impl ListingResults {
    pub fn all_no_price(properties: Vec<Property>) -> Self {
        ListingResults::AllNoPrice {
            all_no_price: true,
            message: "All properties have no price information. Price filters cannot be applied."
                .to_string(),
            properties,
        }
    }

    pub fn into_properties(self) -> Vec<Property> {
        match self {
            ListingResults::Matched(properties) => properties,
            ListingResults::AllNoPrice { properties, .. } => properties,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn property(price: &str) -> Property {
        Property {
            id: 1,
            title: "10 Seminary Apt 2".into(),
            price: price.into(),
            location: "10 Seminary Apt 2".into(),
            url: "https://www.binghamtonwest.com/10-seminary-apt-2".into(),
            bedrooms: Some(1),
            image_url: None,
            amenities: vec![],
            description: None,
            availability: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            distance: None,
        }
    }

    #[test]
    fn missing_price_displays_sentinel() {
        let record = ListingRecord {
            title: "6 Ayres".into(),
            price: None,
            location: "6 Ayres".into(),
            url: "https://www.binghamtonwest.com/6-ayres".into(),
            bedrooms: Some(4),
            image_url: String::new(),
            amenities: vec![],
            description: String::new(),
            availability: None,
        };
        assert_eq!(record.price_display(), PRICE_ON_REQUEST);
    }

    #[test]
    fn degenerate_stored_prices_are_replaced() {
        assert_eq!(property("$,").with_display_price().price, PRICE_ON_REQUEST);
        assert_eq!(property("").with_display_price().price, PRICE_ON_REQUEST);
        assert_eq!(property("$650/mo").with_display_price().price, "$650/mo");
    }

    #[test]
    fn numeric_price_joins_all_digits() {
        assert_eq!(property("$1,250/mo").numeric_price(), Some(1250));
        assert_eq!(property(PRICE_ON_REQUEST).numeric_price(), None);
    }

    #[test]
    fn distance_comes_from_the_street() {
        assert_eq!(estimate_distance("10 Seminary Apt 2"), 0.8);
        assert_eq!(estimate_distance("93 Chapin Apt R"), 1.8);
        assert_eq!(estimate_distance("12 Vincent"), 1.0);
        assert_eq!(estimate_distance(""), 1.5);
        assert_eq!(property("$500").with_distance().distance, Some(0.8));
    }
}
