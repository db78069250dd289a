pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::services::ServeDir;

use crate::auth::handlers as auth;
use crate::catalog::handlers as catalog;
use crate::config::StorageConfig;
use crate::jobs::handlers as jobs;
use crate::state::AppState;

/// Room for the text fields and multipart framing on top of the photo.
const FORM_OVERHEAD_BYTES: usize = 64 * 1024;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes + FORM_OVERHEAD_BYTES;

    let mut router = Router::new()
        .route("/health", get(health::health_handler))
        // Accounts
        .route("/api/register", post(auth::handle_register))
        .route("/api/login", post(auth::handle_login))
        .route("/api/user", get(auth::handle_current_user))
        // Posted jobs
        .route(
            "/api/jobs",
            get(jobs::handle_list_jobs).post(jobs::handle_add_job),
        )
        .route("/api/jobs/:id", get(jobs::handle_get_job))
        // Marketplace listing
        .route("/api/catalog", get(catalog::handle_list_catalog))
        .route(
            "/api/catalog/categories",
            get(catalog::handle_list_categories),
        )
        .route("/api/catalog/:id", get(catalog::handle_get_catalog_job));

    // Uploaded photos are public; S3 serves its own.
    if let StorageConfig::Local { root, public_url } = &state.config.storage {
        let prefix = public_url.trim_end_matches('/');
        if prefix.starts_with('/') {
            router = router.nest_service(prefix, ServeDir::new(root));
        }
    }

    router
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
