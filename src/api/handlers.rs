//! HTTP request handlers.

use std::io;
use std::sync::Arc;

use axum::{body::Bytes, extract::State, Json};
use utoipa::OpenApi;

use crate::api::routes::ApiDoc;
use crate::provision::PublicKeySubmission;
use crate::error::{ProvisionError, ProvisionResult};
use crate::AppState;

/// Liveness check.
///
/// GET /
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Service is up", body = String, content_type = "text/plain")
    ),
    tag = "health"
)]
pub async fn health_check() -> &'static str {
    "Hi"
}

/// Append a public key to the trust store and record it in the tracking directory.
///
/// POST /add_public_key
#[utoipa::path(
    post,
    path = "/add_public_key",
    request_body(content = PublicKeySubmission, content_type = "application/json"),
    responses(
        (status = 200, description = "Key saved", body = String, content_type = "text/plain"),
        (status = 400, description = "Malformed payload, missing property or invalid base64"),
        (status = 401, description = "Missing or wrong basic credentials"),
        (status = 500, description = "Key store not ready or not writable")
    ),
    security(("basic_auth" = [])),
    tag = "keys"
)]
pub async fn add_public_key(
    State(state): State<AppState>,
    body: Bytes,
) -> ProvisionResult<String> {
    let provisioner = Arc::clone(&state.provisioner);

    let provisioned = tokio::task::spawn_blocking(move || provisioner.provision(&body))
        .await
        .map_err(|e| {
            ProvisionError::io("running provisioning task", io::Error::other(e.to_string()))
        })??;

    tracing::info!(
        fingerprint = %provisioned.key.fingerprint(),
        tracking_file = ?provisioned.tracking_file,
        "Public key provisioned"
    );

    Ok(provisioned.success_text())
}

/// OpenAPI document.
///
/// GET /api-docs/openapi.json
pub async fn openapi_spec() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
