use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use jsonwebtoken::{DecodingKey, Validation, decode};
use std::sync::Arc;
use tracing::warn;

use crate::web::models::{AuthenticatedUser, Claims};
use crate::web::{AppState, error::AppError};

pub const TOKEN_COOKIE: &str = "token";

const LOGIN_REQUIRED: &str = "Please log in to continue";
const SESSION_EXPIRED: &str = "Session expired, please log in again";

/// An `Authorization: Bearer` header beats the `token` cookie. Blank values count as absent.
fn session_token(headers: &HeaderMap, jar: &CookieJar) -> Option<String> {
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim);
    let cookie = jar.get(TOKEN_COOKIE).map(|cookie| cookie.value());

    bearer
        .filter(|token| !token.is_empty())
        .or(cookie.filter(|token| !token.is_empty()))
        .map(str::to_owned)
}

/// Checks signature and expiry, then turns the claims into the request's user.
fn verify_session(token: &str, jwt_secret: &str) -> Result<AuthenticatedUser, AppError> {
    let key = DecodingKey::from_secret(jwt_secret.as_bytes());
    match decode::<Claims>(token, &key, &Validation::default()) {
        Ok(data) => Ok(AuthenticatedUser {
            id: data.claims.user_id,
            username: data.claims.sub,
        }),
        Err(err) => {
            warn!(error = %err, "Rejected session token.");
            Err(AppError::Unauthorized(SESSION_EXPIRED.to_string()))
        }
    }
}

/// Guards the protected routers. Handlers behind it read `Extension<AuthenticatedUser>`.
pub async fn auth(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let Some(token) = session_token(req.headers(), &jar) else {
        return Err(AppError::Unauthorized(LOGIN_REQUIRED.to_string()));
    };
    let user = verify_session(&token, &state.config.jwt_secret)?;
    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}
