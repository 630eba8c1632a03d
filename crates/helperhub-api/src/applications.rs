use axum::{
    Extension, Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    response::IntoResponse,
};
use tracing::info;

use helperhub_db::DbError;
use helperhub_db::models::{ApplicationPatch, NewApplication};
use helperhub_identity::Subject;
use helperhub_types::api::{ApplicationFilter, CreateApplicationRequest, UpdateApplicationRequest};
use helperhub_types::models::Application;

use crate::auth::{AppState, with_db};
use crate::error::ApiError;

const ENTITY: &str = "application";

/// Volunteer and opportunity ids are stored as given; neither is checked.
pub async fn create_application(
    State(state): State<AppState>,
    payload: Result<Json<CreateApplicationRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;
    req.validate()?;

    let new = NewApplication::from(req);
    let application = with_db(&state, move |db| db.create_application(&new)).await?;

    info!(
        "Volunteer {} applied to opportunity {} (application {})",
        application.volunteer_id, application.opportunity_id, application.id
    );
    Ok((StatusCode::CREATED, Json(application)))
}

pub async fn get_application(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Application>, ApiError> {
    let Path(id) = id?;
    let application = with_db(&state, move |db| db.get_application(id))
        .await?
        .ok_or_else(|| DbError::not_found(ENTITY, id))?;
    Ok(Json(application))
}

pub async fn list_applications(
    State(state): State<AppState>,
    filter: Result<Query<ApplicationFilter>, QueryRejection>,
) -> Result<Json<Vec<Application>>, ApiError> {
    let Query(filter) = filter?;
    let applications = with_db(&state, move |db| db.list_applications(&filter)).await?;
    Ok(Json(applications))
}

pub async fn update_application(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<UpdateApplicationRequest>, JsonRejection>,
) -> Result<Json<Application>, ApiError> {
    let Path(id) = id?;
    let Json(req) = payload?;
    req.validate()?;

    let patch = ApplicationPatch::from(req);
    let application = with_db(&state, move |db| db.update_application(id, patch)).await?;
    info!("Application {} is now {}", application.id, application.status);
    Ok(Json(application))
}

pub async fn delete_application(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    caller: Option<Extension<Subject>>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = id?;
    with_db(&state, move |db| db.delete_application(id)).await?;

    match caller {
        Some(Extension(subject)) => info!("Deleted application {} (by {})", id, subject.id),
        None => info!("Deleted application {}", id),
    }
    Ok(StatusCode::NO_CONTENT)
}
