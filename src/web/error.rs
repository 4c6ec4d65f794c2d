use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("User already exists: {0}")]
    UserAlreadyExists(String),
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Password hashing failed: {0}")]
    PasswordHashingError(String),
    #[error("JWT creation failed: {0}")]
    TokenCreationError(String),
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Internal server error: {0}")]
    InternalServerError(String),
    #[error("Not Found: {0}")]
    NotFound(String),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Conflict: {0}")]
    Conflict(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::UserAlreadyExists(msg) => (StatusCode::CONFLICT, msg),
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "Invalid username or password".to_string(),
            ),
            AppError::PasswordHashingError(msg) => {
                error!(error = %msg, "Password hashing failed.");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Password hashing error".to_string(),
                )
            }
            AppError::TokenCreationError(msg) => {
                error!(error = %msg, "Session token creation failed.");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Token creation error".to_string(),
                )
            }
            AppError::DatabaseError(msg) => {
                error!(error = %msg, "Database failure while handling request.");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database error".to_string(),
                )
            }
            AppError::InternalServerError(msg) => {
                error!(error = %msg, "Internal server error.");
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
        };
        (status, Json(serde_json::json!({ "error": error_message }))).into_response()
    }
}

/// Constraint violations become user-facing errors; anything else is a storage failure.
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => AppError::NotFound("Record not found".to_string()),
            sqlx::Error::Database(database_error) if database_error.is_unique_violation() => {
                AppError::Conflict("A record with the same value already exists.".to_string())
            }
            sqlx::Error::Database(database_error) if database_error.is_foreign_key_violation() => {
                AppError::InvalidInput("Referenced record does not exist.".to_string())
            }
            sqlx::Error::Database(database_error) if database_error.is_check_violation() => {
                AppError::InvalidInput("A required field is empty.".to_string())
            }
            _ => AppError::DatabaseError(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InternalServerError(format!("JSON serialization/deserialization error: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        let app_error = AppError::from(sqlx::Error::RowNotFound);
        assert!(matches!(app_error, AppError::NotFound(_)));
    }

    #[test]
    fn test_pool_timeout_maps_to_database_error() {
        let app_error = AppError::from(sqlx::Error::PoolTimedOut);
        assert!(matches!(app_error, AppError::DatabaseError(_)));
        assert_eq!(
            app_error.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::InvalidInput("Title is required".to_string())
                .into_response()
                .status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::NotFound("Match not found".to_string())
                .into_response()
                .status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::InvalidCredentials.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::UserAlreadyExists("Username already taken".to_string())
                .into_response()
                .status(),
            StatusCode::CONFLICT
        );
    }
}
