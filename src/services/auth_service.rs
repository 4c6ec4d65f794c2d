use axum::Extension;
use bcrypt::{hash, verify};
use chrono::{Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use sqlx::SqlitePool;
use tracing::info;

use crate::db::models::User;
use crate::db::services::user_service;
use crate::services::validation::validate_registration;
use crate::web::error::AppError;
use crate::web::models::{
    AuthenticatedUser, Claims, LoginRequest, LoginResponse, RegisterRequest, UserResponse,
};

pub async fn register_user(
    pool: &SqlitePool,
    req: RegisterRequest,
    bcrypt_cost: u32,
) -> Result<UserResponse, AppError> {
    let username = validate_registration(&req)?;

    if user_service::get_user_by_username(pool, &username).await?.is_some() {
        return Err(AppError::UserAlreadyExists("Username already taken".to_string()));
    }

    let password_hash = hash(&req.password, bcrypt_cost)
        .map_err(|e| AppError::PasswordHashingError(format!("Failed to hash password: {e}")))?;

    // The unique constraint still guards against a concurrent registration.
    let user = user_service::create_user(pool, &username, &password_hash).await?;
    info!(user_id = user.id, username = %user.username, "User registered.");

    Ok(UserResponse {
        id: user.id,
        username: user.username,
    })
}

/// Unknown usernames and wrong passwords produce the same error.
pub async fn login_user(
    pool: &SqlitePool,
    req: LoginRequest,
    jwt_secret: &str,
    token_ttl_hours: i64,
) -> Result<LoginResponse, AppError> {
    if req.username.trim().is_empty() || req.password.is_empty() {
        return Err(AppError::InvalidInput(
            "Username and password required".to_string(),
        ));
    }

    let user = match user_service::get_user_by_username(pool, req.username.trim()).await? {
        Some(u) => u,
        None => return Err(AppError::InvalidCredentials),
    };

    let valid_password = verify(&req.password, &user.password_hash)
        .map_err(|e| AppError::InternalServerError(format!("Password verification failed: {e}")))?;

    if !valid_password {
        return Err(AppError::InvalidCredentials);
    }

    info!(user_id = user.id, "User logged in.");
    create_jwt_for_user(&user, jwt_secret, token_ttl_hours)
}

pub fn create_jwt_for_user(
    user: &User,
    jwt_secret: &str,
    token_ttl_hours: i64,
) -> Result<LoginResponse, AppError> {
    if token_ttl_hours < 1 {
        return Err(AppError::TokenCreationError(format!(
            "Token lifetime must be positive, got {token_ttl_hours} hours"
        )));
    }
    let expiration = Duration::try_hours(token_ttl_hours)
        .and_then(|ttl| Utc::now().checked_add_signed(ttl))
        .ok_or_else(|| {
            AppError::TokenCreationError(format!("Token lifetime of {token_ttl_hours} hours is out of range"))
        })?
        .timestamp() as usize;

    let claims = Claims {
        sub: user.username.clone(),
        user_id: user.id,
        exp: expiration,
    };

    let token = encode(&Header::default(), &claims, &EncodingKey::from_secret(jwt_secret.as_ref()))
        .map_err(|e| AppError::TokenCreationError(format!("Failed to create token: {e}")))?;

    Ok(LoginResponse {
        token,
        user_id: user.id,
        username: user.username.clone(),
    })
}

pub async fn me(
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<axum::Json<UserResponse>, AppError> {
    Ok(axum::Json(UserResponse {
        id: user.id,
        username: user.username,
    }))
}
