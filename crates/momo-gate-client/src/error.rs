//! Client error types.

use momo_gate_core::RemoteError;

/// Errors that can occur when talking to the MoMo API.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// MoMo returned an error response.
    #[error("MoMo API error: {status} - {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error code from the body, if any.
        code: Option<String>,
        /// Error message.
        message: String,
    },

    /// The status endpoint returned a status this client does not know.
    #[error("unknown payment status: {0}")]
    UnknownStatus(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl From<ClientError> for RemoteError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Api {
                status, message, ..
            } => Self::Rejected { status, message },
            other => Self::Unexpected(other.to_string()),
        }
    }
}
