use std::sync::Arc;

use brickhole_catalog::JobCatalog;

use crate::auth::tokens::TokenRepository;
use crate::auth::users::UserRepository;
use crate::config::Config;
use crate::jobs::repository::JobRepository;
use crate::jobs::storage::ImageStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub tokens: Arc<dyn TokenRepository>,
    pub jobs: Arc<dyn JobRepository>,
    /// Public disk or S3 bucket, per `STORAGE_BACKEND`.
    pub images: Arc<dyn ImageStore>,
    /// Listing served by the marketplace page. Default: the seeded in-memory catalog.
    pub catalog: Arc<dyn JobCatalog>,
    pub config: Config,
}
