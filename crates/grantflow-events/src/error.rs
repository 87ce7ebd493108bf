//! Dispatcher error types.

use thiserror::Error;

/// Errors returned by the event dispatcher.
///
/// Handler failures are deliberately absent: they are contained inside
/// `dispatch` and only logged.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The ingress handle of this dispatcher was already issued.
    #[error("ingress handle already issued for this dispatcher")]
    IngressAlreadyIssued,
}

/// Result type for dispatcher operations.
pub type DispatchResult<T> = Result<T, DispatchError>;
