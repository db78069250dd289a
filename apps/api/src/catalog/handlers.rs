//! Axum route handlers for the public job listing.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use brickhole_catalog::{JobPosting, ALL_CATEGORIES, CATEGORIES};
use chrono::Utc;
use serde::Serialize;

use crate::catalog::params::CatalogParams;
use crate::errors::AppError;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct CatalogPageResponse {
    pub jobs: Vec<JobPosting>,
    pub total: usize,
    pub page: u32,
    pub per_page: u32,
    pub total_pages: u32,
}

#[derive(Debug, Serialize)]
pub struct CatalogJobResponse {
    pub job: JobPosting,
}

#[derive(Debug, Serialize)]
pub struct Category {
    pub name: &'static str,
    pub icon: &'static str,
}

#[derive(Debug, Serialize)]
pub struct CategoriesResponse {
    pub all: &'static str,
    pub categories: Vec<Category>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/catalog
///
/// Filters, optionally sorts, and pages the listing. Bad filter values → 422.
pub async fn handle_list_catalog(
    State(state): State<AppState>,
    Query(params): Query<CatalogParams>,
) -> Result<Json<CatalogPageResponse>, AppError> {
    let query = params.into_query()?;
    let page = state.catalog.list_jobs(&query, Utc::now()).await?;

    Ok(Json(CatalogPageResponse {
        total_pages: page.total_pages(),
        total: page.total,
        page: page.page,
        per_page: page.per_page,
        jobs: page.items,
    }))
}

/// GET /api/catalog/:id
pub async fn handle_get_catalog_job(
    State(state): State<AppState>,
    Path(id): Path<u32>,
) -> Result<Json<CatalogJobResponse>, AppError> {
    let job = state
        .catalog
        .get_job(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job {id} not found")))?;
    Ok(Json(CatalogJobResponse { job }))
}

/// GET /api/catalog/categories
pub async fn handle_list_categories() -> Json<CategoriesResponse> {
    Json(CategoriesResponse {
        all: ALL_CATEGORIES,
        categories: CATEGORIES
            .iter()
            .map(|&(name, icon)| Category { name, icon })
            .collect(),
    })
}
