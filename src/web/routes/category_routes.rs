use axum::{Json, Router, extract::State, routing::get};
use std::sync::Arc;

use crate::db::models::Category;
use crate::db::services;
use crate::web::{AppError, AppState};

pub fn create_category_router() -> Router<Arc<AppState>> {
    Router::new().route("/", get(list_categories_handler))
}

async fn list_categories_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<Vec<Category>>, AppError> {
    let categories = services::list_categories(&app_state.db_pool).await?;
    Ok(Json(categories))
}
