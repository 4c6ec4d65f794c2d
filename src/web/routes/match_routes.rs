use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use std::sync::Arc;

use crate::db::models::{Comment, Match, MatchDetail, MatchEditView, MatchPage};
use crate::db::services;
use crate::web::models::{AuthenticatedUser, CommentRequest, ListMatchesQuery, MatchRequest};
use crate::web::{AppError, AppState};

pub fn create_public_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_matches_handler))
        .route("/{id}", get(get_match_detail_handler))
}

pub fn create_protected_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(create_match_handler))
        .route("/{id}", put(update_match_handler).delete(delete_match_handler))
        .route("/{id}/edit", get(get_match_edit_handler))
        .route("/{id}/comments", post(add_comment_handler))
}

// --- Route Handlers ---

async fn list_matches_handler(
    State(app_state): State<Arc<AppState>>,
    Query(query): Query<ListMatchesQuery>,
) -> Result<Json<MatchPage>, AppError> {
    let page = services::list_matches(
        &app_state.db_pool,
        query.q.as_deref(),
        query.page_number(),
        app_state.config.page_size,
    )
    .await?;
    Ok(Json(page))
}

async fn get_match_detail_handler(
    State(app_state): State<Arc<AppState>>,
    Path(match_id): Path<i64>,
) -> Result<Json<MatchDetail>, AppError> {
    let detail = services::get_match_detail(&app_state.db_pool, match_id).await?;
    Ok(Json(detail))
}

async fn create_match_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    Json(payload): Json<MatchRequest>,
) -> Result<(StatusCode, Json<Match>), AppError> {
    let created = services::create_match(&app_state.db_pool, authenticated_user.id, &payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn get_match_edit_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    Path(match_id): Path<i64>,
) -> Result<Json<MatchEditView>, AppError> {
    let view = services::get_match_for_edit(&app_state.db_pool, authenticated_user.id, match_id).await?;
    Ok(Json(view))
}

async fn update_match_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    Path(match_id): Path<i64>,
    Json(payload): Json<MatchRequest>,
) -> Result<Json<Match>, AppError> {
    let updated =
        services::update_match(&app_state.db_pool, authenticated_user.id, match_id, &payload).await?;
    Ok(Json(updated))
}

async fn delete_match_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    Path(match_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    services::delete_match(&app_state.db_pool, authenticated_user.id, match_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn add_comment_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    Path(match_id): Path<i64>,
    Json(payload): Json<CommentRequest>,
) -> Result<(StatusCode, Json<Comment>), AppError> {
    let comment = services::add_comment(
        &app_state.db_pool,
        authenticated_user.id,
        match_id,
        &payload.content,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(comment)))
}
