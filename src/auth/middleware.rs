//! Authentication middleware for axum.

use axum::{
    body::Body,
    extract::{Request, State},
    http::{
        header::{AUTHORIZATION, WWW_AUTHENTICATE},
        StatusCode,
    },
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::auth::{parse_basic_authorization, AuthGate};

/// Rejection returned when the basic credentials are missing or wrong.
#[derive(Debug)]
pub struct AuthError {
    pub realm: String,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        (
            StatusCode::UNAUTHORIZED,
            [(WWW_AUTHENTICATE, format!("Basic realm=\"{}\"", self.realm))],
            "Not authorized\n",
        )
            .into_response()
    }
}

/// Require the configured basic credentials before running the handler.
pub async fn require_basic_auth(
    State(gate): State<AuthGate>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, AuthError> {
    let presented = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(parse_basic_authorization);

    let (identity, secret) = match &presented {
        Some((identity, secret)) => (Some(identity.as_str()), Some(secret.as_str())),
        None => (None, None),
    };

    if !gate.authorize(identity, secret) {
        tracing::warn!(
            identity = identity.unwrap_or("-"),
            uri = %request.uri(),
            "Unauthorized request rejected"
        );
        return Err(AuthError {
            realm: gate.realm().to_string(),
        });
    }

    Ok(next.run(request).await)
}
