//! Publication error types.

use std::fmt;

use cfupload_cma_client::ClientError;

/// A step of the publication pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Validate,
    Upload,
    CreateAsset,
    RequestProcessing,
    Poll,
    PublishAsset,
    CreateEntry,
    PublishEntry,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Validate => "validation",
            Self::Upload => "asset upload",
            Self::CreateAsset => "asset creation",
            Self::RequestProcessing => "asset processing",
            Self::Poll => "asset status poll",
            Self::PublishAsset => "asset publish",
            Self::CreateEntry => "entry creation",
            Self::PublishEntry => "entry publish",
        };
        f.write_str(name)
    }
}

/// Errors produced while publishing an image.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("not configured: {field} is empty")]
    ConfigurationMissing { field: &'static str },

    #[error("validation failed: {0}")]
    ValidationFailed(String),

    #[error("{step} failed: network error: {message}")]
    Transport { step: Step, message: String },

    #[error("{step} failed ({status}): {body}")]
    RemoteRejected { step: Step, status: u16, body: String },

    #[error("asset processing timed out after {attempts} polls")]
    ProcessingTimeout { attempts: u32 },

    #[error("{step} failed: unexpected response: {message}")]
    ProtocolViolation { step: Step, message: String },

    #[error("{step} cancelled")]
    Cancelled { step: Step },
}

impl PublishError {
    /// The step the run stopped at.
    pub fn step(&self) -> Step {
        match self {
            Self::ConfigurationMissing { .. } | Self::ValidationFailed(_) => Step::Validate,
            Self::ProcessingTimeout { .. } => Step::Poll,
            Self::Transport { step, .. }
            | Self::RemoteRejected { step, .. }
            | Self::ProtocolViolation { step, .. }
            | Self::Cancelled { step } => *step,
        }
    }

    /// Tags a client failure with the step that issued the call.
    pub fn from_client(step: Step, err: ClientError) -> Self {
        match err {
            ClientError::Transport(message) => Self::Transport { step, message },
            ClientError::Api { status, body } => Self::RemoteRejected { step, status, body },
            ClientError::Protocol { message, .. } => Self::ProtocolViolation { step, message },
            err @ (ClientError::Encode(_) | ClientError::InvalidHeader(_)) => {
                Self::ValidationFailed(format!("{step}: {err}"))
            }
        }
    }
}
