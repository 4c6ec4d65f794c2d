use axum::{
    extract::State,
    http::Method,
    middleware as axum_middleware,
    response::IntoResponse,
    routing::{get, post},
    Json,
    Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::server::config::ServerConfig;
use crate::services::auth_service;
use crate::web::{
    middleware::auth::{self, TOKEN_COOKIE},
    models::{LoginRequest, RegisterRequest},
    routes::*,
};

pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;

pub use error::AppError;

#[derive(Clone)]
pub struct AppState {
    pub db_pool: SqlitePool,
    pub config: Arc<ServerConfig>,
}

async fn register_handler(
    State(app_state): State<Arc<AppState>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<models::UserResponse>, AppError> {
    let user_response =
        auth_service::register_user(&app_state.db_pool, payload, app_state.config.bcrypt_cost).await?;
    Ok(Json(user_response))
}

async fn login_handler(
    State(app_state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let login_response = auth_service::login_user(
        &app_state.db_pool,
        payload,
        &app_state.config.jwt_secret,
        app_state.config.token_ttl_hours,
    )
    .await?;

    let auth_cookie = Cookie::build((TOKEN_COOKIE, login_response.token.clone()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(app_state.config.secure_cookies)
        .build();

    Ok((jar.add(auth_cookie), Json(login_response)))
}

async fn logout_handler(jar: CookieJar) -> impl IntoResponse {
    let jar = jar.remove(Cookie::build(TOKEN_COOKIE).path("/"));
    (jar, Json(serde_json::json!({ "message": "Logged out" })))
}

async fn health_check_handler() -> &'static str {
    "OK"
}

pub fn create_axum_router(db_pool: SqlitePool, config: Arc<ServerConfig>) -> Router {
    let app_state = Arc::new(AppState { db_pool, config });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(vec![Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/api/health", get(health_check_handler))
        .route("/api/auth/register", post(register_handler))
        .route("/api/auth/login", post(login_handler))
        .route("/api/auth/logout", post(logout_handler))
        .route("/api/auth/me", get(auth_service::me).route_layer(axum_middleware::from_fn_with_state(app_state.clone(), auth::auth)))
        .nest(
            "/api/matches",
            match_routes::create_public_router().merge(
                match_routes::create_protected_router()
                    .route_layer(axum_middleware::from_fn_with_state(app_state.clone(), auth::auth)),
            ),
        )
        .nest("/api/categories", category_routes::create_category_router())
        .nest("/api/users", user_routes::create_user_router())
        .with_state(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
