use axum::{
    Extension, Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    response::IntoResponse,
};
use tracing::info;

use helperhub_db::DbError;
use helperhub_db::models::{NewVolunteer, VolunteerPatch};
use helperhub_identity::Subject;
use helperhub_types::api::{CreateVolunteerRequest, UpdateVolunteerRequest};
use helperhub_types::models::Volunteer;

use crate::auth::{AppState, hash_password, with_db};
use crate::error::ApiError;

const ENTITY: &str = "volunteer";

pub async fn create_volunteer(
    State(state): State<AppState>,
    payload: Result<Json<CreateVolunteerRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;
    req.validate()?;

    let password_hash = match req.password.as_deref() {
        Some(password) => hash_password(password)?,
        None => String::new(),
    };
    let new = NewVolunteer::from_request(req, password_hash);
    let volunteer = with_db(&state, move |db| db.create_volunteer(&new)).await?;

    info!("Created volunteer {}", volunteer.email);
    Ok((StatusCode::CREATED, Json(volunteer)))
}

pub async fn get_volunteer(
    State(state): State<AppState>,
    email: Result<Path<String>, PathRejection>,
) -> Result<Json<Volunteer>, ApiError> {
    let Path(email) = email?;
    let key = email.clone();
    let volunteer = with_db(&state, move |db| db.get_volunteer_by_email(&key))
        .await?
        .ok_or_else(|| DbError::not_found(ENTITY, &email))?;
    Ok(Json(volunteer))
}

pub async fn update_volunteer(
    State(state): State<AppState>,
    email: Result<Path<String>, PathRejection>,
    payload: Result<Json<UpdateVolunteerRequest>, JsonRejection>,
) -> Result<Json<Volunteer>, ApiError> {
    let Path(email) = email?;
    let Json(req) = payload?;
    req.validate()?;

    let password_hash = req.password.as_deref().map(hash_password).transpose()?;
    let patch = VolunteerPatch::from_request(req, password_hash);
    let volunteer = with_db(&state, move |db| db.update_volunteer(&email, patch)).await?;
    Ok(Json(volunteer))
}

pub async fn delete_volunteer(
    State(state): State<AppState>,
    email: Result<Path<String>, PathRejection>,
    caller: Option<Extension<Subject>>,
) -> Result<StatusCode, ApiError> {
    let Path(email) = email?;
    let key = email.clone();
    with_db(&state, move |db| db.delete_volunteer(&key)).await?;

    match caller {
        Some(Extension(subject)) => info!("Deleted volunteer {} (by {})", email, subject.id),
        None => info!("Deleted volunteer {}", email),
    }
    Ok(StatusCode::NO_CONTENT)
}
