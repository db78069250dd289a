use std::path::PathBuf;

use anyhow::{bail, Context, Result};

/// Where uploaded job photos go.
#[derive(Debug, Clone)]
pub enum StorageConfig {
    /// Public disk on the local filesystem, served under `public_url`.
    Local { root: PathBuf, public_url: String },
    S3 {
        bucket: String,
        endpoint: String,
        access_key_id: String,
        secret_access_key: String,
    },
}

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub storage: StorageConfig,
    pub max_upload_bytes: usize,
    pub bcrypt_cost: u32,
    /// Answer 401 for unknown emails too, instead of 404.
    pub unify_login_errors: bool,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            storage: storage_from_env()?,
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", 5 * 1024 * 1024)?,
            bcrypt_cost: parse_env("BCRYPT_COST", bcrypt::DEFAULT_COST)?,
            unify_login_errors: parse_env("UNIFY_LOGIN_ERRORS", false)?,
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn storage_from_env() -> Result<StorageConfig> {
    let backend = std::env::var("STORAGE_BACKEND").unwrap_or_else(|_| "local".to_string());
    match backend.as_str() {
        "local" => Ok(StorageConfig::Local {
            root: std::env::var("STORAGE_ROOT")
                .unwrap_or_else(|_| "storage/app/public".to_string())
                .into(),
            public_url: std::env::var("PUBLIC_STORAGE_URL")
                .unwrap_or_else(|_| "/storage".to_string()),
        }),
        "s3" => Ok(StorageConfig::S3 {
            bucket: require_env("S3_BUCKET")?,
            endpoint: require_env("S3_ENDPOINT")?,
            access_key_id: require_env("AWS_ACCESS_KEY_ID")?,
            secret_access_key: require_env("AWS_SECRET_ACCESS_KEY")?,
        }),
        other => bail!("STORAGE_BACKEND must be 'local' or 's3', got '{other}'"),
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value '{raw}'")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
impl Config {
    /// Local storage under `root`, cheapest bcrypt cost.
    pub fn for_tests(root: PathBuf) -> Self {
        Config {
            database_url: "postgres://localhost/brickhole_test".to_string(),
            storage: StorageConfig::Local {
                root,
                public_url: "/storage".to_string(),
            },
            max_upload_bytes: 1024 * 1024,
            bcrypt_cost: 4,
            unify_login_errors: false,
            port: 0,
            rust_log: "debug".to_string(),
        }
    }
}
