// crates/types/src/error.rs
use thiserror::Error;

/// Errors returned by the external collaborators (build service, record
/// service, activity listing).
///
/// Cloneable so callers can store the failure in a snapshot and hand the same
/// value to several observers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Server returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Invalid request: {0}")]
    Invalid(String),
}

impl ServiceError {
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self::Status {
            status,
            body: body.into(),
        }
    }

    /// Error for a non-2xx response. Rejected payloads (400, 422) become
    /// [`ServiceError::Invalid`] carrying the server's explanation.
    pub fn from_response(status: u16, body: impl Into<String>) -> Self {
        match status {
            400 | 422 => Self::Invalid(body.into()),
            _ => Self::status(status, body),
        }
    }
}
