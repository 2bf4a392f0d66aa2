//! Canary client error types.

use canary_core::ErrorKind;

/// Errors from talking to a canary server.
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    /// The server address cannot be turned into a URL.
    #[error("invalid server address {address:?}: {reason}")]
    InvalidAddress { address: String, reason: String },

    /// The proxy address is not usable.
    #[error("invalid proxy {proxy:?}: {source}")]
    InvalidProxy {
        proxy: String,
        source: reqwest::Error,
    },

    /// HTTP transport error.
    #[error("HTTP error calling {endpoint}: {source}")]
    Http {
        endpoint: String,
        source: reqwest::Error,
    },

    /// The server answered with an unexpected status.
    #[error("{endpoint} returned {status}: {message}")]
    ApiError {
        endpoint: String,
        status: u16,
        /// The server's error message, or the raw body if it sent none.
        message: String,
    },

    /// Response deserialization failed.
    #[error("failed to deserialize response from {endpoint}: {source}")]
    Deserialization {
        endpoint: String,
        source: reqwest::Error,
    },
}

impl RemoteError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidAddress { .. } => ErrorKind::MalformedInput,
            _ => ErrorKind::RemoteTransport,
        }
    }
}
