//! Request context for correlating one orchestrated permission request.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use grantflow_core::{ChainId, RequestId, SessionId};

/// Correlation data for one permission request.
///
/// The orchestrator creates one per request and runs the whole lifecycle
/// inside [`RequestContext::span`], so every event logged by the session,
/// the dispatcher handlers and the collaborators carries the request id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// Unique request identifier.
    pub request_id: RequestId,
    /// Correlation ID shared with the requester, if it supplied one.
    pub correlation_id: Uuid,
    /// Permission type tag of the request.
    pub permission_type: Option<String>,
    /// Chain the permission applies to.
    pub chain_id: Option<ChainId>,
    /// Confirmation session, once one is open.
    pub session_id: Option<SessionId>,
    /// When the request started.
    pub started_at: DateTime<Utc>,
}

impl RequestContext {
    /// Create a new request context.
    #[must_use]
    pub fn new() -> Self {
        let request_id = RequestId::new();
        Self {
            correlation_id: request_id.0,
            request_id,
            permission_type: None,
            chain_id: None,
            session_id: None,
            started_at: Utc::now(),
        }
    }

    /// Set the correlation ID.
    #[must_use]
    pub fn with_correlation_id(mut self, id: Uuid) -> Self {
        self.correlation_id = id;
        self
    }

    /// Set the permission type.
    #[must_use]
    pub fn with_permission_type(mut self, permission_type: impl Into<String>) -> Self {
        self.permission_type = Some(permission_type.into());
        self
    }

    /// Set the chain.
    #[must_use]
    pub fn with_chain_id(mut self, chain_id: ChainId) -> Self {
        self.chain_id = Some(chain_id);
        self
    }

    /// Set the session ID.
    #[must_use]
    pub fn with_session_id(mut self, session_id: SessionId) -> Self {
        self.session_id = Some(session_id);
        self
    }

    /// Milliseconds since the request started.
    #[must_use]
    pub fn elapsed_ms(&self) -> i64 {
        Utc::now()
            .signed_duration_since(self.started_at)
            .num_milliseconds()
    }

    /// Create a tracing span for this request.
    ///
    /// `session_id` is left empty when not yet known; record it with
    /// `span.record("session_id", ...)` once the session opens.
    #[must_use]
    pub fn span(&self) -> tracing::Span {
        let span = tracing::info_span!(
            "permission_request",
            request_id = %self.request_id,
            correlation_id = %self.correlation_id,
            permission_type = self.permission_type.as_deref(),
            chain_id = self.chain_id.map(|c| c.0),
            session_id = tracing::field::Empty,
        );
        if let Some(session_id) = &self.session_id {
            span.record("session_id", tracing::field::display(session_id));
        }
        span
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}
