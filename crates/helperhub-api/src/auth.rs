use std::sync::Arc;

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{Json, extract::State, extract::rejection::JsonRejection};
use serde::Serialize;
use tracing::{error, info};

use helperhub_db::{Database, DbError};
use helperhub_identity::IdentityGateway;
use helperhub_types::api::{LoginRequest, LoginResponse};
use helperhub_types::models::{Account, Organization, Volunteer};

use crate::error::ApiError;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub identity: IdentityGateway,
}

/// Run a store call off the async runtime.
pub(crate) async fn with_db<F, T>(state: &AppState, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&Database) -> Result<T, DbError> + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    tokio::task::spawn_blocking(move || f(&state.db))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal(e.to_string())
        })?
        .map_err(ApiError::from)
}

/// Hash a password with Argon2id and a random salt.
pub(crate) fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ApiError::Internal(format!("password hashing failed: {e}")))
}

/// Accounts registered without a local password never verify.
fn verify_password(account: &impl Account, password: &str) -> Result<(), ApiError> {
    if account.password_hash().is_empty() {
        return Err(ApiError::InvalidCredentials);
    }

    let parsed = PasswordHash::new(account.password_hash()).map_err(|e| {
        error!("Stored password hash for {} is unreadable: {}", account.email(), e);
        ApiError::Internal(e.to_string())
    })?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| ApiError::InvalidCredentials)
}

fn login_response<A: Account + Serialize>(
    account: Option<A>,
    password: &str,
) -> Result<Json<LoginResponse<A>>, ApiError> {
    let account = account.ok_or(ApiError::InvalidCredentials)?;
    verify_password(&account, password)?;
    info!("{} signed in", account.email());
    Ok(Json(LoginResponse { user: account }))
}

pub async fn login_volunteer(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse<Volunteer>>, ApiError> {
    let Json(req) = payload?;
    let email = req.email.clone();
    let volunteer = with_db(&state, move |db| db.get_volunteer_by_email(&email)).await?;
    login_response(volunteer, &req.password)
}

pub async fn login_organization(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse<Organization>>, ApiError> {
    let Json(req) = payload?;
    let email = req.email.clone();
    let organization = with_db(&state, move |db| db.get_organization_by_email(&email)).await?;
    login_response(organization, &req.password)
}
