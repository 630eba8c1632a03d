pub mod applications;
pub mod auth;
pub mod categories;
pub mod error;
pub mod middleware;
pub mod opportunities;
pub mod organizations;
pub mod users;
pub mod volunteers;

pub use auth::{AppState, AppStateInner};
pub use error::ApiError;

use axum::{
    Json, Router,
    middleware::from_fn_with_state,
    routing::{delete, get, post, put},
};
use serde_json::{Value, json};

use crate::middleware::require_auth;

/// Which routes need a verified bearer token.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AuthPolicy {
    /// Every route is public.
    #[default]
    Open,
    /// Updates and deletes of every entity, plus creation of categories,
    /// opportunities and applications, require a token. Registration, login
    /// and reads stay public.
    RequireForMutations,
}

pub fn router(state: AppState, policy: AuthPolicy) -> Router {
    let public = Router::new()
        .route("/health", get(health))
        // Registration and login
        .route("/users/create", post(users::create_user))
        .route("/volunteers/create", post(volunteers::create_volunteer))
        .route("/organizations/create", post(organizations::create_organization))
        .route("/login/volunteer", post(auth::login_volunteer))
        .route("/login/organization", post(auth::login_organization))
        // Reads
        .route("/users/get/{username}", get(users::get_user))
        .route("/volunteers/get/{volunteer_mail}", get(volunteers::get_volunteer))
        .route("/organizations/get/{organization_mail}", get(organizations::get_organization))
        .route("/categories/get", get(categories::list_categories))
        .route("/opportunities/get", get(opportunities::list_opportunities))
        .route("/opportunities/get/{id}", get(opportunities::get_opportunity))
        .route("/applications/get", get(applications::list_applications))
        .route("/applications/get/{id}", get(applications::get_application));

    let mutations = Router::new()
        .route("/users/update/{username}", put(users::update_user))
        .route("/users/delete/{username}", delete(users::delete_user))
        .route("/volunteers/update/{volunteer_mail}", put(volunteers::update_volunteer))
        .route("/volunteers/delete/{volunteer_mail}", delete(volunteers::delete_volunteer))
        .route(
            "/organizations/update/{organization_mail}",
            put(organizations::update_organization),
        )
        .route(
            "/organizations/delete/{organization_mail}",
            delete(organizations::delete_organization),
        )
        .route("/categories/create", post(categories::create_category))
        .route("/opportunities/create", post(opportunities::create_opportunity))
        .route("/opportunities/update/{id}", put(opportunities::update_opportunity))
        .route("/opportunities/delete/{id}", delete(opportunities::delete_opportunity))
        .route("/applications/create", post(applications::create_application))
        .route("/applications/update/{id}", put(applications::update_application))
        .route("/applications/delete/{id}", delete(applications::delete_application));

    let mutations = match policy {
        AuthPolicy::Open => mutations,
        AuthPolicy::RequireForMutations => {
            mutations.route_layer(from_fn_with_state(state.clone(), require_auth))
        }
    };

    public.merge(mutations).with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
