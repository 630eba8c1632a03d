use axum::{
    Extension, Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    response::IntoResponse,
};
use tracing::{debug, error, info, warn};

use helperhub_db::DbError;
use helperhub_db::models::{NewUser, UserPatch};
use helperhub_identity::{ManagementOp, NewSubject, Subject, SubjectChanges};
use helperhub_types::api::{CreateUserRequest, UpdateUserRequest};
use helperhub_types::models::User;

use crate::auth::{AppState, hash_password, with_db};
use crate::error::ApiError;

const ENTITY: &str = "user";

/// Register a platform user. With identity management enabled the user is
/// created at the provider first and its subject id is stored locally.
pub async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;
    req.validate()?;

    let identity_id = if state.identity.management_enabled() {
        let email = req.email.clone();
        if with_db(&state, move |db| db.get_user_by_email(&email))
            .await?
            .is_some()
        {
            return Err(DbError::Conflict {
                entity: ENTITY,
                field: "email".into(),
            }
            .into());
        }

        let subject = state
            .identity
            .manage(ManagementOp::CreateSubject(NewSubject::new(
                req.email.clone(),
                req.password.clone(),
                Some(req.full_name.clone()),
            )))
            .await?;
        debug!("Mirrored {} as {}", req.email, subject.user_id);
        subject.user_id
    } else {
        String::new()
    };

    let password_hash = hash_password(&req.password)?;
    let new = NewUser::from_request(req, password_hash, identity_id);
    let user = with_db(&state, move |db| db.create_user(&new)).await?;

    info!("Created user {}", user.email);
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn get_user(
    State(state): State<AppState>,
    email: Result<Path<String>, PathRejection>,
) -> Result<Json<User>, ApiError> {
    let Path(email) = email?;
    let key = email.clone();
    let user = with_db(&state, move |db| db.get_user_by_email(&key))
        .await?
        .ok_or_else(|| DbError::not_found(ENTITY, &email))?;
    Ok(Json(user))
}

/// The local record is written first so conflicts surface before the
/// provider is touched. If mirroring then fails, the local write is undone.
pub async fn update_user(
    State(state): State<AppState>,
    email: Result<Path<String>, PathRejection>,
    payload: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> Result<Json<User>, ApiError> {
    let Path(email) = email?;
    let Json(req) = payload?;
    req.validate()?;

    let key = email.clone();
    let existing = with_db(&state, move |db| db.get_user_by_email(&key))
        .await?
        .ok_or_else(|| DbError::not_found(ENTITY, &email))?;

    let changes = SubjectChanges {
        email: req.email.clone().filter(|e| *e != existing.email),
        name: req.full_name.clone(),
        password: req.password.clone(),
    };

    let password_hash = req.password.as_deref().map(hash_password).transpose()?;
    let patch = UserPatch::from_request(req, password_hash);
    let user = with_db(&state, move |db| db.update_user(&email, patch)).await?;

    if changes.is_empty() || existing.identity_id.is_empty() || !state.identity.management_enabled() {
        return Ok(Json(user));
    }

    let mirrored = state
        .identity
        .manage(ManagementOp::UpdateSubject {
            id: existing.identity_id.clone(),
            changes,
        })
        .await;
    if let Err(e) = mirrored {
        warn!("Provider rejected update of {}; restoring local record", existing.email);
        let current = user.email.clone();
        let restore = UserPatch {
            email: Some(existing.email.clone()),
            password_hash: Some(existing.password_hash.clone()),
            full_name: Some(existing.full_name.clone()),
            role: Some(existing.role.clone()),
        };
        if let Err(restore_err) = with_db(&state, move |db| db.update_user(&current, restore)).await {
            error!(
                "Could not restore user {} after provider failure: {}",
                existing.email, restore_err
            );
        }
        return Err(e.into());
    }

    Ok(Json(user))
}

pub async fn delete_user(
    State(state): State<AppState>,
    email: Result<Path<String>, PathRejection>,
    caller: Option<Extension<Subject>>,
) -> Result<StatusCode, ApiError> {
    let Path(email) = email?;
    let key = email.clone();
    with_db(&state, move |db| db.delete_user(&key)).await?;

    match caller {
        Some(Extension(subject)) => info!("Deleted user {} (by {})", email, subject.id),
        None => info!("Deleted user {}", email),
    }
    Ok(StatusCode::NO_CONTENT)
}
