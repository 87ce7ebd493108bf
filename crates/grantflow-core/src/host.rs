//! Host dialog primitives.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::HostResult;
use crate::types::SessionId;
use crate::ui::UiElement;

/// Host wrapper.
pub type ArcHost = std::sync::Arc<dyn HostUi>;

/// Terminal input the host reports for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HostDecision {
    /// The grantor pressed grant.
    Grant,
    /// The grantor pressed cancel.
    Cancel,
    /// The dialog was dismissed without pressing either button.
    Dismissed,
}

impl HostDecision {
    /// Whether the grantor granted the request.
    #[must_use]
    pub fn is_grant(self) -> bool {
        matches!(self, Self::Grant)
    }
}

impl fmt::Display for HostDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Grant => write!(f, "grant"),
            Self::Cancel => write!(f, "cancel"),
            Self::Dismissed => write!(f, "dismissed"),
        }
    }
}

/// The dialog primitives a host (wallet UI, CLI, test harness) provides.
///
/// Input events raised inside a session are not delivered through this
/// trait; the host feeds them into the event dispatcher's ingress handle.
///
/// All primitives are assumed reliable: an error from any of them is fatal
/// to the request being confirmed.
#[async_trait]
pub trait HostUi: Send + Sync {
    /// Open a new dialog showing `ui` and return its session ID.
    async fn create_session(&self, ui: UiElement) -> HostResult<SessionId>;

    /// Replace the content of an open dialog.
    async fn update_content(&self, session_id: &SessionId, ui: UiElement) -> HostResult<()>;

    /// Wait until the dialog reaches a terminal input.
    ///
    /// Resolves with the value passed to [`HostUi::close_session`], or with
    /// [`HostDecision::Dismissed`] if the grantor closed the dialog some
    /// other way.
    async fn request_decision(&self, session_id: &SessionId) -> HostResult<HostDecision>;

    /// Close the dialog, resolving any pending [`HostUi::request_decision`].
    async fn close_session(&self, session_id: &SessionId, decision: HostDecision) -> HostResult<()>;
}
