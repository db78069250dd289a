//! Axum route handlers for registration, login and the current user.

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use validator::{Validate, ValidationError};

use crate::auth::password::{hash_password, verify_password};
use crate::auth::session::AuthUser;
use crate::auth::tokens::{issue_token, LOGIN_TOKEN_NAME};
use crate::auth::users::EMAIL_TAKEN;
use crate::errors::AppError;
use crate::models::user::{NewUser, User};
use crate::state::AppState;
use crate::validation::{failure, present, FieldErrors};

pub const ROLES: &[&str] = &["find-worker", "offer-services"];

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(
        required(message = "The name field is required."),
        length(max = 255, message = "The name field must not be greater than 255 characters.")
    )]
    pub name: Option<String>,
    #[validate(
        required(message = "The email field is required."),
        email(message = "The email field must be a valid email address."),
        length(max = 255, message = "The email field must not be greater than 255 characters.")
    )]
    pub email: Option<String>,
    #[validate(
        required(message = "The password field is required."),
        length(min = 8, message = "The password field must be at least 8 characters."),
        must_match(
            other = "password_confirmation",
            message = "The password field confirmation does not match."
        )
    )]
    pub password: Option<String>,
    pub password_confirmation: Option<String>,
    #[validate(
        required(message = "The role field is required."),
        custom(function = "validate_role")
    )]
    pub role: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(
        required(message = "The email field is required."),
        email(message = "The email field must be a valid email address.")
    )]
    pub email: Option<String>,
    #[validate(required(message = "The password field is required."))]
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

fn validate_role(role: &str) -> Result<(), ValidationError> {
    if ROLES.contains(&role) {
        Ok(())
    } else {
        Err(failure("role", "The selected role is invalid."))
    }
}

/// Passwords are never trimmed; an empty one counts as missing.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

impl RegisterRequest {
    fn normalized(self) -> Self {
        RegisterRequest {
            name: present(self.name),
            email: present(self.email),
            password: non_empty(self.password),
            password_confirmation: non_empty(self.password_confirmation),
            role: present(self.role),
        }
    }
}

impl LoginRequest {
    fn normalized(self) -> Self {
        LoginRequest {
            email: present(self.email),
            password: non_empty(self.password),
        }
    }
}

/// Registration after validation; the password is still plain text.
#[derive(Debug)]
struct Registration {
    name: String,
    email: String,
    password: String,
    role: String,
}

fn validate_registration(req: RegisterRequest) -> Result<Registration, FieldErrors> {
    let req = req.normalized();
    req.validate()?;

    Ok(Registration {
        name: req.name.unwrap_or_default(),
        email: req.email.unwrap_or_default().to_lowercase(),
        password: req.password.unwrap_or_default(),
        role: req.role.unwrap_or_default(),
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/register
pub async fn handle_register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    let registration = validate_registration(req)?;

    if state.users.find_by_email(&registration.email).await?.is_some() {
        return Err(AppError::field("email", EMAIL_TAKEN));
    }

    let password_hash = hash_password(registration.password, state.config.bcrypt_cost).await?;
    let user = state
        .users
        .create(NewUser {
            name: registration.name,
            email: registration.email,
            password_hash,
            role: registration.role,
        })
        .await?;

    info!("Registered user {} ({})", user.id, user.role);

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "success".to_string(),
        }),
    ))
}

/// POST /api/login
///
/// Unknown email → 404, wrong password → 401, unless `UNIFY_LOGIN_ERRORS`
/// folds both into 401.
pub async fn handle_login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    let req = req.normalized();
    req.validate()?;
    let email = req.email.unwrap_or_default();
    let password = req.password.unwrap_or_default();

    let Some(user) = state.users.find_by_email(&email).await? else {
        warn!("Login attempt for unknown email");
        return Err(if state.config.unify_login_errors {
            AppError::InvalidCredentials
        } else {
            AppError::UserNotFound
        });
    };

    if !verify_password(password, user.password_hash.clone()).await? {
        warn!("Invalid password for user {}", user.id);
        return Err(AppError::InvalidCredentials);
    }

    let token = issue_token(state.tokens.as_ref(), user.id, LOGIN_TOKEN_NAME).await?;
    info!("Issued token for user {}", user.id);

    Ok(Json(TokenResponse { token }))
}

/// GET /api/user
pub async fn handle_current_user(AuthUser(user): AuthUser) -> Json<User> {
    Json(user)
}
