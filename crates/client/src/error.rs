use std::path::PathBuf;

use fleetdesk_core::error::CoreError;

/// Errors from the listing HTTP layer and the edit session.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout, body).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The backend returned a non-2xx status code.
    #[error("Listing API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// A configured or payload-provided URL could not be resolved.
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// A selected photo could not be read for upload.
    #[error("Failed to read upload {}: {source}", .path.display())]
    Upload {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A domain-level error from `fleetdesk_core`.
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl ClientError {
    /// Message suitable for the user-facing feedback region.
    pub fn user_message(&self) -> String {
        match self {
            Self::Core(CoreError::Remote(message)) => message.clone(),
            Self::Core(CoreError::Validation(message)) => message.clone(),
            Self::Api { status: 404, .. } => "Listing not found".to_string(),
            Self::Api { status: 401 | 403, .. } => {
                "You are not allowed to edit this listing".to_string()
            }
            Self::Request(e) if e.is_timeout() => "The server took too long to respond".to_string(),
            other => other.to_string(),
        }
    }
}
