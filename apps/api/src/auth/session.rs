//! Request session resolved once from the `Authorization` header.
//!
//! Handlers that need a user take [`AuthUser`]. The resolved [`Session`] is
//! cached in the request extensions, so the token is looked up at most once
//! per request.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use tracing::debug;

use crate::auth::tokens::PlainToken;
use crate::errors::AppError;
use crate::models::user::User;
use crate::state::AppState;

#[derive(Debug, Clone)]
pub enum Session {
    Authenticated(User),
    Anonymous,
}

impl Session {
    async fn resolve(headers: &HeaderMap, state: &AppState) -> Result<Session, AppError> {
        let Some(raw) = bearer_token(headers) else {
            return Ok(Session::Anonymous);
        };
        let Some(token) = PlainToken::parse(raw) else {
            debug!("Malformed bearer token");
            return Ok(Session::Anonymous);
        };
        let Some(row) = state.tokens.find(token.id).await? else {
            return Ok(Session::Anonymous);
        };
        if !token.matches(&row) {
            debug!("Bearer token {} failed hash check", token.id);
            return Ok(Session::Anonymous);
        }

        let Some(user) = state.users.find_by_id(row.user_id).await? else {
            return Ok(Session::Anonymous);
        };
        state.tokens.touch(row.id).await?;
        Ok(Session::Authenticated(user))
    }
}

/// `Authorization: Bearer <token>`, scheme matched case-insensitively.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

#[async_trait]
impl FromRequestParts<AppState> for Session {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if let Some(session) = parts.extensions.get::<Session>() {
            return Ok(session.clone());
        }
        let session = Session::resolve(&parts.headers, state).await?;
        parts.extensions.insert(session.clone());
        Ok(session)
    }
}

/// The authenticated user; rejects with 401 otherwise.
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        match Session::from_request_parts(parts, state).await? {
            Session::Authenticated(user) => Ok(AuthUser(user)),
            Session::Anonymous => Err(AppError::Unauthorized),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_bearer_token_extraction() {
        assert_eq!(bearer_token(&headers("Bearer 1|abc")), Some("1|abc"));
        assert_eq!(bearer_token(&headers("bearer 1|abc")), Some("1|abc"));
        assert_eq!(bearer_token(&headers("Basic dXNlcg==")), None);
        assert_eq!(bearer_token(&headers("Bearer ")), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }
}
