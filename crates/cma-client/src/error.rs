//! Client error types.

/// Errors from the Contentful client.
///
/// Transport and HTTP failures are values, never panics. `status()` gives
/// the HTTP status code, or `None` when the request never got a response.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("unexpected response ({status}): {message}")]
    Protocol { status: u16, message: String },

    #[error("failed to encode request: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("{0} is not a valid header value")]
    InvalidHeader(&'static str),
}

impl ClientError {
    /// HTTP status of the failed call, `None` for transport-level failures.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } | Self::Protocol { status, .. } => Some(*status),
            Self::Transport(_) | Self::Encode(_) | Self::InvalidHeader(_) => None,
        }
    }

    /// Whether the failure happened below the HTTP layer.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Transport(format!("request timed out: {err}"))
        } else {
            Self::Transport(err.to_string())
        }
    }
}
