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
use helperhub_db::models::{NewOrganization, OrganizationPatch};
use helperhub_identity::Subject;
use helperhub_types::api::{CreateOrganizationRequest, UpdateOrganizationRequest};
use helperhub_types::models::Organization;

use crate::auth::{AppState, hash_password, with_db};
use crate::error::ApiError;

const ENTITY: &str = "organization";

pub async fn create_organization(
    State(state): State<AppState>,
    payload: Result<Json<CreateOrganizationRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;
    req.validate()?;

    let password_hash = match req.password.as_deref() {
        Some(password) => hash_password(password)?,
        None => String::new(),
    };
    let new = NewOrganization::from_request(req, password_hash);
    let organization = with_db(&state, move |db| db.create_organization(&new)).await?;

    info!("Created organization {} ({})", organization.name, organization.email);
    Ok((StatusCode::CREATED, Json(organization)))
}

pub async fn get_organization(
    State(state): State<AppState>,
    email: Result<Path<String>, PathRejection>,
) -> Result<Json<Organization>, ApiError> {
    let Path(email) = email?;
    let key = email.clone();
    let organization = with_db(&state, move |db| db.get_organization_by_email(&key))
        .await?
        .ok_or_else(|| DbError::not_found(ENTITY, &email))?;
    Ok(Json(organization))
}

pub async fn update_organization(
    State(state): State<AppState>,
    email: Result<Path<String>, PathRejection>,
    payload: Result<Json<UpdateOrganizationRequest>, JsonRejection>,
) -> Result<Json<Organization>, ApiError> {
    let Path(email) = email?;
    let Json(req) = payload?;
    req.validate()?;

    let password_hash = req.password.as_deref().map(hash_password).transpose()?;
    let patch = OrganizationPatch::from_request(req, password_hash);
    let organization = with_db(&state, move |db| db.update_organization(&email, patch)).await?;
    Ok(Json(organization))
}

pub async fn delete_organization(
    State(state): State<AppState>,
    email: Result<Path<String>, PathRejection>,
    caller: Option<Extension<Subject>>,
) -> Result<StatusCode, ApiError> {
    let Path(email) = email?;
    let key = email.clone();
    with_db(&state, move |db| db.delete_organization(&key)).await?;

    match caller {
        Some(Extension(subject)) => info!("Deleted organization {} (by {})", email, subject.id),
        None => info!("Deleted organization {}", email),
    }
    Ok(StatusCode::NO_CONTENT)
}
