// src/services/catalog.rs
// DOCUMENTATION: Embedded fragrance catalog
// PURPOSE: Parse data/fragrances.json once and answer catalog queries from memory

use std::collections::{BTreeSet, HashMap};

use crate::errors::HubError;
use crate::models::{CatalogQuery, CatalogResponse, Fragrance};

const EMBEDDED_CATALOG: &str = include_str!("../../data/fragrances.json");

/// Read-only fragrance catalog
pub struct Catalog {
    fragrances: Vec<Fragrance>,
    by_slug: HashMap<String, usize>,
}

impl Catalog {
    /// Catalog compiled into the binary
    pub fn embedded() -> Result<Self, HubError> {
        Self::from_json(EMBEDDED_CATALOG)
    }

    pub fn from_json(json: &str) -> Result<Self, HubError> {
        let fragrances: Vec<Fragrance> = serde_json::from_str(json).map_err(|e| {
            log::error!("Failed to parse fragrance catalog: {}", e);
            HubError::InternalError
        })?;

        let mut by_slug = HashMap::with_capacity(fragrances.len());
        for (index, fragrance) in fragrances.iter().enumerate() {
            if by_slug.insert(fragrance.slug.clone(), index).is_some() {
                log::error!("Duplicate catalog slug: {}", fragrance.slug);
                return Err(HubError::InternalError);
            }
        }

        log::info!("Loaded fragrance catalog ({} entries)", fragrances.len());
        Ok(Self {
            fragrances,
            by_slug,
        })
    }

    pub fn len(&self) -> usize {
        self.fragrances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragrances.is_empty()
    }

    pub fn get(&self, slug: &str) -> Result<&Fragrance, HubError> {
        self.by_slug
            .get(slug)
            .map(|&i| &self.fragrances[i])
            .ok_or_else(|| HubError::NotFound(format!("Fragrance not found: {}", slug)))
    }

    /// Distinct brands, sorted
    pub fn brands(&self) -> Vec<&str> {
        self.fragrances
            .iter()
            .map(|f| f.brand.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Filter by free text, brand and note, then paginate
    pub fn search(&self, query: &CatalogQuery) -> CatalogResponse<'_> {
        let text = normalized(query.q.as_deref());
        let brand = normalized(query.brand.as_deref());
        let note = normalized(query.note.as_deref());

        let matches: Vec<&Fragrance> = self
            .fragrances
            .iter()
            .filter(|f| {
                text.as_ref().map_or(true, |t| {
                    f.name.to_lowercase().contains(t) || f.brand.to_lowercase().contains(t)
                })
            })
            .filter(|f| brand.as_ref().map_or(true, |b| f.brand.to_lowercase() == *b))
            .filter(|f| {
                note.as_ref()
                    .map_or(true, |n| f.notes.all().any(|x| x.to_lowercase().contains(n)))
            })
            .collect();

        let page = query.page();
        let limit = query.limit();
        let total_count = matches.len();
        let data = matches
            .into_iter()
            .skip((page - 1) * limit)
            .take(limit)
            .collect();

        CatalogResponse {
            data,
            total_count,
            page,
            limit,
            has_more: total_count > page * limit,
        }
    }
}

fn normalized(value: Option<&str>) -> Option<String> {
    value
        .map(|v| v.trim().to_lowercase())
        .filter(|v| !v.is_empty())
}
