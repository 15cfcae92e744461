use thiserror::Error;

/// Error types for yard viewer operations
#[derive(Debug, Error)]
pub enum YardError {
    /// Network failure talking to the backend
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    /// Backend answered with a non-success status
    #[error("{endpoint} returned HTTP {status}")]
    Status { endpoint: String, status: u16 },
    /// Body was not a well-formed snapshot
    #[error("could not decode response from {endpoint}: {message}")]
    Decode { endpoint: String, message: String },
    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),
    /// Manifest rejected before upload
    #[error("invalid upload: {0}")]
    InvalidUpload(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl YardError {
    /// Transport, status and decode errors all count as a failed fetch
    pub fn is_fetch_failure(&self) -> bool {
        matches!(
            self,
            YardError::Transport { .. } | YardError::Status { .. } | YardError::Decode { .. }
        )
    }

    pub(crate) fn transport(endpoint: &str, source: reqwest::Error) -> Self {
        YardError::Transport {
            endpoint: endpoint.to_string(),
            source,
        }
    }

    pub(crate) fn decode(endpoint: &str, message: impl ToString) -> Self {
        YardError::Decode {
            endpoint: endpoint.to_string(),
            message: message.to_string(),
        }
    }
}

/// Result type alias for yard viewer operations
pub type YardResult<T> = Result<T, YardError>;
