use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Listing URLs the site files under one bedroom category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogCategory {
    /// Bedroom count the site's menu lists these under. Informational only:
    /// the count derived from each listing is what gets stored.
    pub bedrooms: u8,
    pub urls: Vec<String>,
}

/// Static catalog of listing pages to scrape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(rename = "category", default)]
    pub categories: Vec<CatalogCategory>,
}

impl Catalog {
    /// Parse a catalog from TOML:
    ///
    /// ```toml
    /// [[category]]
    /// bedrooms = 1
    /// urls = ["https://www.binghamtonwest.com/10-seminary-apt-2"]
    /// ```
    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        toml::from_str(toml_str).context("Failed to parse catalog TOML")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog {}", path.display()))?;
        Self::from_toml_str(&raw)
    }

    /// Every (category, url) pair in catalog order
    pub fn entries(&self) -> impl Iterator<Item = (u8, &str)> + '_ {
        self.categories
            .iter()
            .flat_map(|c| c.urls.iter().map(move |url| (c.bedrooms, url.as_str())))
    }

    pub fn len(&self) -> usize {
        self.categories.iter().map(|c| c.urls.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The listings published on binghamtonwest.com, by menu category
    pub fn binghamton_west() -> Self {
        const BASE: &str = "https://www.binghamtonwest.com";
        let slugs: [(u8, &[&str]); 7] = [
            (1, &[
                "10-seminary-apt-2", "10-seminary-apt-3", "14-seminary-apt-2a",
                "14-seminary-apt-2nd-fl", "14-seminary-apt-3rd-fl", "16-seminary-apt-1f",
                "16-seminary-apt-3", "18-5-seminary-apt-1", "18-5-seminary-apt-2",
                "31-leroy-apt-4", "40-walnut-apt-1", "40-walnut-apt-2", "43-leroy-apt-1f",
                "43-leroy-apt-2r", "68-chapin-apt-2l", "69-st-john-apt-2r", "93-murray-apt-2",
            ]),
            (2, &[
                "4-seminary-apt-3", "10-johnson-apt-l-or-r", "10-seminary-apt-1", "12-vincent",
                "14-seminary-apt-1", "16-seminary-apt-1r", "18-seminary-apt-2", "29-leroy-apt-6",
                "38-5-oak", "41-kneeland-apt-1-2", "41-leroy-apt-2", "53-5-murray-apt-1",
                "68-chapin-apt-1l", "69-st-john-apt-1", "74-oak-apt-1", "93-murray-apt-1",
                "160-seminary-apt-1-or-2",
            ]),
            (3, &[
                "2-ayres-apt-r", "4-seminary-apt-2", "5-ayres-apt-1-or-2", "18-seminary-apt-1",
                "41-leroy-apt-1", "50-leroy-apt-l", "56-st-john-apt-r", "59-murray-apt-1-or-2",
                "74-oak-apt-2-or-3", "93-chapin-apt-r", "104-chapin-apt-2",
            ]),
            (4, &[
                "6-ayres", "7-walnut", "25-seminary", "38-st-john", "40-st-john", "44-murray",
                "50-leroy-apt-r", "53-5-murray-apt-2", "54-leroy", "55-st-john",
                "93-chapin-apt-l", "106-murray",
            ]),
            (5, &[
                "3-ayres", "17-st-john", "18-seminary", "23-ayres", "29-seminary", "30-seminary",
                "38-oak",
            ]),
            (6, &["2-ayres", "5-ayres", "11-ayres", "13-seminary"]),
            (7, &["50-leroy", "93-chapin", "97-chapin"]),
        ];

        Self {
            categories: slugs
                .iter()
                .map(|(bedrooms, slugs)| CatalogCategory {
                    bedrooms: *bedrooms,
                    urls: slugs.iter().map(|slug| format!("{}/{}", BASE, slug)).collect(),
                })
                .collect(),
        }
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::binghamton_west()
    }
}
