//! Error types for dashboard client operations

use thiserror::Error;

/// Dashboard client errors
#[derive(Debug, Error)]
pub enum DashboardError {
    /// The update channel failed to connect or dropped
    #[error("Channel transport error: {0}")]
    Transport(String),

    /// A REST endpoint answered with a non-success status
    #[error("HTTP {status} from {endpoint}")]
    RequestRejected {
        endpoint: String,
        status: u16,
    },

    /// The server reported a failed analysis run
    #[error("Server reported error: {0}")]
    ServerReported(String),

    /// Initial portfolio or news data could not be loaded
    #[error("Failed to load {resource}: {reason}")]
    DataLoad {
        resource: String,
        reason: String,
    },

    /// An inbound channel frame could not be understood
    #[error("Malformed channel message: {0}")]
    MalformedMessage(String),

    /// Network or HTTP error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// WebSocket protocol error
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// Invalid origin or endpoint URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Caller supplied an argument the server would reject
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl DashboardError {
    /// HTTP status carried by the error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::RequestRejected { status, .. } => Some(*status),
            Self::Network(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Result type alias for dashboard operations
pub type Result<T> = std::result::Result<T, DashboardError>;

/// Convert anyhow::Error to DashboardError
impl From<anyhow::Error> for DashboardError {
    fn from(err: anyhow::Error) -> Self {
        DashboardError::Other(err.to_string())
    }
}
