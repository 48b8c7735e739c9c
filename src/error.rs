//! Error types for Keygate.
//!
//! Every failure of the provisioning flow maps to a status code and a single
//! plain-text line, mirroring the plain-text success response.

use std::path::PathBuf;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Failure kinds of a key provisioning request.
#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error(
        "SSH authorized_keys file {} or daemon directory {} not found",
        .authorized_keys.display(),
        .tracking_dir.display()
    )]
    EnvironmentNotReady {
        authorized_keys: PathBuf,
        tracking_dir: PathBuf,
    },

    #[error("Please provide a JSON object with a ssh_public_key property")]
    MalformedPayload,

    #[error("Your JSON request is missing the required ssh_public_key property")]
    MissingField,

    #[error("The ssh_public_key property is not a valid base64 encoded string")]
    InvalidEncoding,

    #[error("I/O error while {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl ProvisionError {
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        ProvisionError::Io {
            context: context.into(),
            source,
        }
    }

    /// HTTP status the error is reported with.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ProvisionError::EnvironmentNotReady { .. } | ProvisionError::Io { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ProvisionError::MalformedPayload
            | ProvisionError::MissingField
            | ProvisionError::InvalidEncoding => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ProvisionError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match &self {
            ProvisionError::EnvironmentNotReady { .. } => {
                tracing::error!(error = %self, "Key store environment not ready");
                self.to_string()
            }
            ProvisionError::Io { context, source } => {
                // Log the actual error but don't expose internals
                tracing::error!(error = %source, context = %context, "Key store I/O error");
                "Failed to save the SSH public key".to_string()
            }
            _ => {
                tracing::debug!(error = %self, "Rejected key submission");
                self.to_string()
            }
        };

        (status, body).into_response()
    }
}

/// Result type alias for provisioning operations.
pub type ProvisionResult<T> = Result<T, ProvisionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors_are_bad_requests() {
        for error in [
            ProvisionError::MalformedPayload,
            ProvisionError::MissingField,
            ProvisionError::InvalidEncoding,
        ] {
            assert_eq!(error.status_code(), StatusCode::BAD_REQUEST);
        }
    }

    #[test]
    fn test_environment_message_names_both_paths() {
        let error = ProvisionError::EnvironmentNotReady {
            authorized_keys: PathBuf::from("/opt/ssh/authorized_keys"),
            tracking_dir: PathBuf::from("/opt/ssh/authorized_keys.d"),
        };

        assert_eq!(error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            error.to_string(),
            "SSH authorized_keys file /opt/ssh/authorized_keys or daemon directory \
             /opt/ssh/authorized_keys.d not found"
        );
    }

    #[tokio::test]
    async fn test_io_error_hides_os_detail() {
        let error = ProvisionError::io(
            "appending to /secret/path",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert_eq!(text, "Failed to save the SSH public key");
        assert!(!text.contains("/secret/path"));
        assert!(!text.contains("denied"));
    }
}
