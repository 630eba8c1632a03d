use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::info;

use helperhub_types::api::CreateCategoryRequest;
use helperhub_types::models::Category;

use crate::auth::{AppState, with_db};
use crate::error::ApiError;

pub async fn create_category(
    State(state): State<AppState>,
    payload: Result<Json<CreateCategoryRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;
    req.validate()?;

    let category = with_db(&state, move |db| db.create_category(&req.category)).await?;

    info!("Created category {}", category.category);
    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn list_categories(State(state): State<AppState>) -> Result<Json<Vec<Category>>, ApiError> {
    let categories = with_db(&state, |db| db.list_categories()).await?;
    Ok(Json(categories))
}
