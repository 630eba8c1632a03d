use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
    typed_header::TypedHeaderRejection,
};
use helperhub_identity::AuthError;
use tracing::debug;

use crate::auth::AppState;
use crate::error::ApiError;

/// Verify the bearer token with the identity provider and attach the
/// resulting `Subject` to the request.
pub async fn require_auth(
    State(state): State<AppState>,
    bearer: Result<TypedHeader<Authorization<Bearer>>, TypedHeaderRejection>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let TypedHeader(Authorization(bearer)) = bearer.map_err(|rejection| {
        if rejection.is_missing() {
            AuthError::Missing
        } else {
            AuthError::Invalid(rejection.to_string())
        }
    })?;

    let subject = state.identity.authenticate(bearer.token())?;
    debug!("Authenticated {} for {} {}", subject.id, req.method(), req.uri().path());

    req.extensions_mut().insert(subject);
    Ok(next.run(req).await)
}
