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
use helperhub_db::models::{NewOpportunity, OpportunityPatch};
use helperhub_identity::Subject;
use helperhub_types::api::{CreateOpportunityRequest, OpportunityFilter, UpdateOpportunityRequest};
use helperhub_types::models::Opportunity;

use crate::auth::{AppState, with_db};
use crate::error::ApiError;

const ENTITY: &str = "opportunity";

pub async fn create_opportunity(
    State(state): State<AppState>,
    payload: Result<Json<CreateOpportunityRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;
    req.validate()?;

    let new = NewOpportunity::from(req);
    let opportunity = with_db(&state, move |db| db.create_opportunity(&new)).await?;

    info!(
        "Created opportunity {} for {}",
        opportunity.id, opportunity.organization_email
    );
    Ok((StatusCode::CREATED, Json(opportunity)))
}

pub async fn get_opportunity(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Opportunity>, ApiError> {
    let Path(id) = id?;
    let opportunity = with_db(&state, move |db| db.get_opportunity(id))
        .await?
        .ok_or_else(|| DbError::not_found(ENTITY, id))?;
    Ok(Json(opportunity))
}

/// `?organization_email=&category=`; absent parameters match everything.
pub async fn list_opportunities(
    State(state): State<AppState>,
    filter: Result<Query<OpportunityFilter>, QueryRejection>,
) -> Result<Json<Vec<Opportunity>>, ApiError> {
    let Query(filter) = filter?;
    let opportunities = with_db(&state, move |db| db.list_opportunities(&filter)).await?;
    Ok(Json(opportunities))
}

pub async fn update_opportunity(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<UpdateOpportunityRequest>, JsonRejection>,
) -> Result<Json<Opportunity>, ApiError> {
    let Path(id) = id?;
    let Json(req) = payload?;
    req.validate()?;

    let patch = OpportunityPatch::from(req);
    let opportunity = with_db(&state, move |db| db.update_opportunity(id, patch)).await?;
    Ok(Json(opportunity))
}

pub async fn delete_opportunity(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    caller: Option<Extension<Subject>>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = id?;
    with_db(&state, move |db| db.delete_opportunity(id)).await?;

    match caller {
        Some(Extension(subject)) => info!("Deleted opportunity {} (by {})", id, subject.id),
        None => info!("Deleted opportunity {}", id),
    }
    Ok(StatusCode::NO_CONTENT)
}
