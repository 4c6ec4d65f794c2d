use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use std::sync::Arc;

use crate::db::models::UserProfile;
use crate::db::services;
use crate::web::{AppError, AppState};

pub fn create_user_router() -> Router<Arc<AppState>> {
    Router::new().route("/{id}", get(get_user_profile_handler))
}

/// Public profile page data. No login required.
async fn get_user_profile_handler(
    State(app_state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
) -> Result<Json<UserProfile>, AppError> {
    let profile = services::get_user_profile(&app_state.db_pool, user_id).await?;
    Ok(Json(profile))
}
