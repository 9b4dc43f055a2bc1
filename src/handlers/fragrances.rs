// src/handlers/fragrances.rs
// DOCUMENTATION: Read-only catalog endpoints
// PURPOSE: Search and look up fragrances from the embedded catalog

use crate::errors::HubError;
use crate::models::CatalogQuery;
use crate::services::Catalog;
use actix_web::{web, HttpResponse, Responder};
use serde_json::json;

/// GET /api/fragrances?q=...&brand=...&note=...&page=...&limit=...
pub async fn search_fragrances(
    catalog: web::Data<Catalog>,
    query: web::Query<CatalogQuery>,
) -> impl Responder {
    HttpResponse::Ok().json(catalog.search(&query))
}

/// GET /api/fragrances/brands
pub async fn list_brands(catalog: web::Data<Catalog>) -> impl Responder {
    let brands = catalog.brands();
    HttpResponse::Ok().json(json!({
        "total_count": brands.len(),
        "brands": brands,
    }))
}

/// GET /api/fragrances/{slug}
pub async fn get_fragrance(
    catalog: web::Data<Catalog>,
    path: web::Path<String>,
) -> Result<impl Responder, HubError> {
    let fragrance = catalog.get(path.trim())?;
    Ok(HttpResponse::Ok().json(fragrance))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/fragrances")
            .route("", web::get().to(search_fragrances))
            .route("/brands", web::get().to(list_brands))
            .route("/{slug}", web::get().to(get_fragrance)),
    );
}
