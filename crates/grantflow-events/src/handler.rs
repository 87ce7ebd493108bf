//! Event handlers and their registration keys.

use async_trait::async_trait;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use grantflow_core::{ElementId, EventKind, SessionId, UserInputEvent};

/// Error returned by a failing handler.
///
/// The dispatcher only logs it; it never reaches the caller of `dispatch`.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct HandlerError(Box<dyn std::error::Error + Send + Sync>);

impl HandlerError {
    /// Wrap any error.
    pub fn new(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self(Box::new(err))
    }

    /// Create an error from a message.
    pub fn msg(message: impl Into<String>) -> Self {
        let message: String = message.into();
        Self(message.into())
    }
}

/// Result type for handler execution.
pub type HandlerResult = Result<(), HandlerError>;

/// Something that reacts to user input in a confirmation session.
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// Handle one event.
    async fn handle(&self, event: &UserInputEvent) -> HandlerResult;
}

/// Adapter turning an async closure into an [`EventHandler`].
pub struct FnHandler<F> {
    f: F,
}

impl<F> fmt::Debug for FnHandler<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnHandler").finish_non_exhaustive()
    }
}

#[async_trait]
impl<F, Fut> EventHandler for FnHandler<F>
where
    F: Fn(UserInputEvent) -> Fut + Send + Sync,
    Fut: Future<Output = HandlerResult> + Send,
{
    async fn handle(&self, event: &UserInputEvent) -> HandlerResult {
        (self.f)(event.clone()).await
    }
}

/// Wrap an async closure as a shareable handler.
pub fn handler_fn<F, Fut>(f: F) -> Arc<dyn EventHandler>
where
    F: Fn(UserInputEvent) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    Arc::new(FnHandler { f })
}

/// The key handlers are registered and looked up under.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HandlerKey {
    /// Element the handler listens on.
    pub element_id: ElementId,
    /// Event kind the handler listens for.
    pub kind: EventKind,
    /// Session the handler belongs to.
    pub session_id: SessionId,
}

impl HandlerKey {
    /// Create a key.
    #[must_use]
    pub fn new(element_id: impl Into<ElementId>, kind: EventKind, session_id: SessionId) -> Self {
        Self {
            element_id: element_id.into(),
            kind,
            session_id,
        }
    }

    /// The key an event raised in `session_id` is delivered to.
    #[must_use]
    pub fn for_event(session_id: &SessionId, event: &UserInputEvent) -> Self {
        Self {
            element_id: event.element_id.clone(),
            kind: event.kind,
            session_id: session_id.clone(),
        }
    }
}

impl fmt::Display for HandlerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.session_id, self.element_id, self.kind)
    }
}

/// Opaque proof of one registration, used to deregister it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HandlerToken {
    pub(crate) key: HandlerKey,
    pub(crate) id: u64,
}

impl HandlerToken {
    /// The key this registration lives under.
    #[must_use]
    pub fn key(&self) -> &HandlerKey {
        &self.key
    }
}
