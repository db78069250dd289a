use anyhow::anyhow;

use crate::errors::AppError;

/// bcrypt-hashes `password` on the blocking pool.
pub async fn hash_password(password: String, cost: u32) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| anyhow!("password hashing task failed: {e}"))?
        .map_err(|e| AppError::Internal(anyhow!("failed to hash password: {e}")))
}

/// Checks `password` against a stored bcrypt hash. A malformed hash counts as a mismatch.
pub async fn verify_password(password: String, hash: String) -> Result<bool, AppError> {
    let verified = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| anyhow!("password verification task failed: {e}"))?;
    Ok(verified.unwrap_or_else(|e| {
        tracing::warn!("Stored password hash could not be verified: {e}");
        false
    }))
}
