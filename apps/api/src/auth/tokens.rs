//! Opaque bearer tokens of the form `<id>|<secret>`.
//!
//! Only the SHA-256 of the secret is persisted; the id locates the row and
//! the hash comparison authenticates it.

use async_trait::async_trait;
use rand::distr::{Alphanumeric, SampleString};
use sha2::{Digest, Sha256};
use sqlx::PgPool;

use crate::errors::AppError;
use crate::models::token::AccessTokenRow;

const SECRET_LEN: usize = 40;

/// Name recorded for tokens issued by the login endpoint.
pub const LOGIN_TOKEN_NAME: &str = "token";

#[async_trait]
pub trait TokenRepository: Send + Sync {
    async fn create(
        &self,
        user_id: i64,
        name: &str,
        token_hash: &str,
    ) -> Result<AccessTokenRow, AppError>;

    async fn find(&self, id: i64) -> Result<Option<AccessTokenRow>, AppError>;

    /// Records that the token authenticated a request.
    async fn touch(&self, id: i64) -> Result<(), AppError>;
}

pub fn generate_secret() -> String {
    Alphanumeric.sample_string(&mut rand::rng(), SECRET_LEN)
}

pub fn hash_secret(secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(secret.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// A bearer token split into its row id and secret.
#[derive(Debug, PartialEq)]
pub struct PlainToken<'a> {
    pub id: i64,
    pub secret: &'a str,
}

impl<'a> PlainToken<'a> {
    pub fn parse(raw: &'a str) -> Option<Self> {
        let (id, secret) = raw.split_once('|')?;
        let id = id.parse::<i64>().ok()?;
        if secret.is_empty() {
            return None;
        }
        Some(PlainToken { id, secret })
    }

    /// Whether `row` was issued for this token.
    pub fn matches(&self, row: &AccessTokenRow) -> bool {
        row.id == self.id && constant_time_eq(hash_secret(self.secret).as_bytes(), row.token_hash.as_bytes())
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Issues a token for `user_id` and returns its plain-text form. The plain
/// text is never stored and cannot be recovered later.
pub async fn issue_token(
    tokens: &dyn TokenRepository,
    user_id: i64,
    name: &str,
) -> Result<String, AppError> {
    let secret = generate_secret();
    let row = tokens.create(user_id, name, &hash_secret(&secret)).await?;
    Ok(format!("{}|{}", row.id, secret))
}

pub struct PgTokenRepository {
    pool: PgPool,
}

impl PgTokenRepository {
    pub fn new(pool: PgPool) -> Self {
        PgTokenRepository { pool }
    }
}

#[async_trait]
impl TokenRepository for PgTokenRepository {
    async fn create(
        &self,
        user_id: i64,
        name: &str,
        token_hash: &str,
    ) -> Result<AccessTokenRow, AppError> {
        Ok(sqlx::query_as::<_, AccessTokenRow>(
            r#"
            INSERT INTO personal_access_tokens (user_id, name, token_hash)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(name)
        .bind(token_hash)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn find(&self, id: i64) -> Result<Option<AccessTokenRow>, AppError> {
        Ok(
            sqlx::query_as::<_, AccessTokenRow>("SELECT * FROM personal_access_tokens WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn touch(&self, id: i64) -> Result<(), AppError> {
        sqlx::query("UPDATE personal_access_tokens SET last_used_at = now() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
