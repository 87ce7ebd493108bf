use grantflow_core::{HostError, SessionId};
use grantflow_events::DispatchError;

/// Errors raised by confirmation sessions and the request lifecycle.
#[derive(Debug, thiserror::Error)]
pub enum ApprovalError {
    /// The request is malformed or out of bounds.
    #[error("invalid permission request: {0}")]
    Validation(String),

    /// No handler is registered for the requested permission type.
    #[error("unsupported permission type: {0}")]
    UnsupportedPermissionType(String),

    /// An edit was attempted on a request that does not allow adjustment.
    #[error("Permission adjustment is not allowed")]
    AdjustmentNotAllowed,

    /// A session operation was called before the session was created.
    #[error("confirmation session has not been created")]
    SessionNotCreated,

    /// The session already reached its decision.
    #[error("confirmation session {0} is closed")]
    SessionClosed(SessionId),

    /// A host UI primitive failed.
    #[error("host error: {0}")]
    Host(#[from] HostError),

    /// The dispatcher refused an operation.
    #[error("dispatch error: {0}")]
    Dispatch(#[from] DispatchError),

    /// Grantor account lookup failed.
    #[error("account lookup failed: {0}")]
    Account(String),

    /// Building the restriction set failed.
    #[error("restriction error: {0}")]
    Restriction(String),

    /// Signing the authorization failed.
    #[error("signing failed: {0}")]
    Signing(String),

    /// A permission-type collaborator failed.
    #[error("collaborator error: {0}")]
    Collaborator(String),

    /// Internal error.
    #[error("internal approval error: {0}")]
    Internal(String),
}

/// Result type for approval operations.
pub type ApprovalResult<T> = Result<T, ApprovalError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adjustment_message_is_exact() {
        assert_eq!(
            ApprovalError::AdjustmentNotAllowed.to_string(),
            "Permission adjustment is not allowed"
        );
    }

    #[test]
    fn test_host_error_converts() {
        let session = SessionId::new();
        let err: ApprovalError = HostError::UnknownSession(session).into();
        assert!(matches!(err, ApprovalError::Host(_)));
    }
}
