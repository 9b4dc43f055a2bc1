// src/models/fragrance.rs
// DOCUMENTATION: Static catalog entries
// PURPOSE: Shape of data/fragrances.json and catalog query DTOs

use serde::{Deserialize, Serialize};

/// Note pyramid of a fragrance
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotePyramid {
    #[serde(default)]
    pub top: Vec<String>,
    #[serde(default)]
    pub heart: Vec<String>,
    #[serde(default)]
    pub base: Vec<String>,
}

impl NotePyramid {
    /// Every note across all tiers
    pub fn all(&self) -> impl Iterator<Item = &String> {
        self.top.iter().chain(self.heart.iter()).chain(self.base.iter())
    }
}

/// A fragrance profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fragrance {
    /// URL-safe identifier, unique across the catalog
    pub slug: String,
    pub name: String,
    pub brand: String,
    pub year: Option<u16>,
    /// EDT, EDP, Parfum, Cologne...
    pub concentration: String,
    pub gender: String,
    pub notes: NotePyramid,
    #[serde(default)]
    pub sizes_ml: Vec<u32>,
    pub price_usd: Option<f64>,
    #[serde(default)]
    pub description: String,
}

/// GET /api/fragrances query string
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogQuery {
    pub q: Option<String>,
    pub brand: Option<String>,
    pub note: Option<String>,
    pub page: Option<usize>,
    pub limit: Option<usize>,
}

/// Pages past this one are clamped to it
pub const MAX_CATALOG_PAGE: usize = 10_000;

impl CatalogQuery {
    pub fn page(&self) -> usize {
        self.page.unwrap_or(1).clamp(1, MAX_CATALOG_PAGE)
    }

    pub fn limit(&self) -> usize {
        self.limit.unwrap_or(24).clamp(1, 100)
    }
}

#[derive(Debug, Serialize)]
pub struct CatalogResponse<'a> {
    pub data: Vec<&'a Fragrance>,
    pub total_count: usize,
    pub page: usize,
    pub limit: usize,
    pub has_more: bool,
}
