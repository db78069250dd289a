mod auth;
mod catalog;
mod config;
mod db;
mod errors;
mod jobs;
mod models;
mod routes;
mod state;
#[cfg(test)]
mod testing;
mod validation;

use anyhow::Result;
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use brickhole_catalog::InMemoryCatalog;
use chrono::Utc;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use std::sync::Arc;

use crate::auth::tokens::PgTokenRepository;
use crate::auth::users::PgUserRepository;
use crate::config::{Config, StorageConfig};
use crate::db::{create_pool, run_migrations};
use crate::jobs::repository::PgJobRepository;
use crate::jobs::storage::{ImageStore, LocalImageStore, S3ImageStore};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={},brickhole_catalog={}",
                env!("CARGO_CRATE_NAME"),
                &config.rust_log,
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting BrickHole API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;
    run_migrations(&db).await?;

    // Initialize photo storage
    let images: Arc<dyn ImageStore> = match &config.storage {
        StorageConfig::Local { root, public_url } => {
            info!("Storing photos under {} (served at {public_url})", root.display());
            Arc::new(LocalImageStore::new(root.clone()))
        }
        StorageConfig::S3 { bucket, .. } => {
            let s3 = build_s3_client(&config.storage).await;
            info!("Storing photos in S3 bucket {bucket}");
            Arc::new(S3ImageStore::new(s3, bucket.clone()))
        }
    };

    // Seed the marketplace listing
    let catalog = InMemoryCatalog::seeded(Utc::now());
    info!("Catalog seeded with {} jobs", catalog.jobs().len());

    // Build app state
    let state = AppState {
        users: Arc::new(PgUserRepository::new(db.clone())),
        tokens: Arc::new(PgTokenRepository::new(db.clone())),
        jobs: Arc::new(PgJobRepository::new(db)),
        images,
        catalog: Arc::new(catalog),
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins to the frontend host

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Constructs an S3 client configured for MinIO (local) or AWS (production).
async fn build_s3_client(storage: &StorageConfig) -> aws_sdk_s3::Client {
    let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(Region::new("us-east-1"));

    if let StorageConfig::S3 {
        endpoint,
        access_key_id,
        secret_access_key,
        ..
    } = storage
    {
        let credentials = Credentials::new(
            access_key_id,
            secret_access_key,
            None,
            None,
            "brickhole-static",
        );
        loader = loader
            .credentials_provider(credentials)
            .endpoint_url(endpoint);
    }

    let s3_config = loader.load().await;
    aws_sdk_s3::Client::new(&s3_config)
}
