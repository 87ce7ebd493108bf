//! Host error types.

use thiserror::Error;

use crate::types::SessionId;

/// Errors reported by the host UI primitives.
///
/// The confirmation flow assumes the host is reliable, so every one of these
/// is fatal to the request that triggered it.
#[derive(Debug, Clone, Error)]
pub enum HostError {
    /// The host does not know the session.
    #[error("unknown session: {0}")]
    UnknownSession(SessionId),

    /// The session was already closed.
    #[error("session already closed: {0}")]
    SessionClosed(SessionId),

    /// The host could not render the supplied content.
    #[error("render failed: {0}")]
    RenderFailed(String),

    /// Any other host failure.
    #[error("host error: {0}")]
    Internal(String),
}

/// Result type for host operations.
pub type HostResult<T> = Result<T, HostError>;
