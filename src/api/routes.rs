//! Route definitions for the API.

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::handlers;
use crate::auth::{require_basic_auth, AuthGate};
use crate::AppState;

/// Security scheme modifier for OpenAPI.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "basic_auth",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Basic).build()),
            );
        }
    }
}

/// OpenAPI documentation.
#[derive(OpenApi)]
#[openapi(
    paths(handlers::health_check, handlers::add_public_key),
    components(schemas(crate::provision::PublicKeySubmission)),
    modifiers(&SecurityAddon),
    tags(
        (name = "keys", description = "SSH public key provisioning"),
        (name = "health", description = "Health and status endpoints")
    ),
    info(
        title = "Keygate API",
        version = "0.1.0",
        description = "Authenticated SSH public key provisioning",
        license(name = "MIT")
    )
)]
pub struct ApiDoc;

/// Build the API router.
///
/// Only `/add_public_key` sits behind basic authentication.
pub fn build_router(state: AppState, gate: AuthGate) -> Router {
    let key_routes = Router::new()
        .route("/add_public_key", post(handlers::add_public_key))
        .route_layer(middleware::from_fn_with_state(gate, require_basic_auth))
        .with_state(state);

    let public_routes = Router::new()
        .route("/", get(handlers::health_check))
        .route("/api-docs/openapi.json", get(handlers::openapi_spec));

    Router::new()
        .merge(key_routes)
        .merge(public_routes)
        .layer(TraceLayer::new_for_http())
}
