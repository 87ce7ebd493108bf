//! Confirmation session controller.
//!
//! A [`ConfirmationSession`] owns one host dialog. It composes the dialog
//! frame (title, justification, content body, cancel/grant footer) around
//! whatever content the orchestrator renders, swaps that content on request,
//! and produces exactly one [`Decision`].
//!
//! # Lifecycle
//!
//! 1. [`ConfirmationSession::create_session`] opens the dialog (idempotent)
//! 2. [`ConfirmationSession::update_content`] replaces the body any number
//!    of times until a decision is reached
//! 3. [`ConfirmationSession::await_decision`] registers the grant, cancel
//!    and details-toggle handlers, waits for the host to report a terminal
//!    input, and deregisters them again before returning
//!
//! Pressing grant or cancel closes the host dialog as part of producing the
//! decision; callers never close it themselves.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock, Weak};

use async_trait::async_trait;
use tokio::sync::{Mutex, watch};
use tracing::{debug, error, info, warn};

use grantflow_core::{
    ArcHost, EventKind, HostDecision, HostError, SessionId, UiElement, UserInputEvent,
};
use grantflow_events::{EventDispatcher, EventHandler, HandlerError, HandlerKey, HandlerResult};

use crate::decision::Decision;
use crate::error::{ApprovalError, ApprovalResult};
use crate::settings::SessionSettings;

/// Justifications longer than this many characters are collapsed behind the
/// details toggle.
pub const JUSTIFICATION_PREVIEW_CHARS: usize = 120;

/// Session-local display state.
///
/// Lives next to the business context, never inside it: nothing here can
/// influence the permission that is eventually granted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UiState {
    /// Whether the full justification is shown.
    pub details_expanded: bool,
}

struct SessionState {
    content: UiElement,
    grant_disabled: bool,
    ui: UiState,
}

struct SessionInner {
    host: ArcHost,
    dispatcher: EventDispatcher,
    settings: SessionSettings,
    justification: Option<String>,
    id: OnceLock<SessionId>,
    resolved: AtomicBool,
    awaited: AtomicBool,
    /// First host failure hit by a button handler; ends `await_decision`.
    host_failure: watch::Sender<Option<HostError>>,
    state: Mutex<SessionState>,
}

impl SessionInner {
    fn require_id(&self) -> ApprovalResult<SessionId> {
        self.id.get().cloned().ok_or(ApprovalError::SessionNotCreated)
    }

    fn frame(&self, state: &SessionState) -> UiElement {
        let mut children = vec![UiElement::heading(self.settings.title.clone())];
        if let Some(justification) = self.justification.as_deref() {
            children.push(self.justification_section(justification, state.ui));
        }
        children.push(state.content.clone());
        children.push(UiElement::Footer {
            children: vec![
                UiElement::button(self.settings.cancel_button.clone(), "Cancel", false),
                UiElement::button(
                    self.settings.grant_button.clone(),
                    "Grant",
                    state.grant_disabled,
                ),
            ],
        });
        UiElement::container(children)
    }

    fn justification_section(&self, justification: &str, ui: UiState) -> UiElement {
        if justification.chars().count() <= JUSTIFICATION_PREVIEW_CHARS {
            return UiElement::section("Justification", vec![UiElement::text(justification)]);
        }

        let (shown, label) = if ui.details_expanded {
            (justification.to_owned(), "Show less")
        } else {
            let preview: String = justification
                .chars()
                .take(JUSTIFICATION_PREVIEW_CHARS)
                .collect();
            (format!("{preview}..."), "Show more")
        };
        UiElement::section(
            "Justification",
            vec![
                UiElement::text(shown),
                UiElement::button(self.settings.details_toggle.clone(), label, false),
            ],
        )
    }

    /// Hand a host failure to the pending `await_decision`.
    ///
    /// The dispatcher swallows handler errors; this is the only path a failed
    /// close or re-render takes back to the caller.
    fn report_host_failure(&self, id: &SessionId, e: HostError) -> ApprovalError {
        error!(session_id = %id, error = %e, "host failed during decision");
        self.host_failure.send_if_modified(|slot| {
            if slot.is_some() {
                return false;
            }
            *slot = Some(e.clone());
            true
        });
        ApprovalError::Host(e)
    }

    /// Produce the decision for a grant or cancel press.
    async fn resolve(&self, decision: HostDecision) -> ApprovalResult<()> {
        let id = self.require_id()?;
        let state = self.state.lock().await;

        if decision.is_grant() && state.grant_disabled {
            warn!(session_id = %id, "grant pressed while disabled, ignoring");
            return Ok(());
        }
        if self.resolved.swap(true, Ordering::AcqRel) {
            debug!(session_id = %id, decision = %decision, "session already resolved, ignoring");
            return Ok(());
        }
        drop(state);

        self.host
            .close_session(&id, decision)
            .await
            .map_err(|e| self.report_host_failure(&id, e))?;
        info!(session_id = %id, decision = %decision, "confirmation session resolved");
        Ok(())
    }

    async fn toggle_details(&self) -> ApprovalResult<()> {
        let id = self.require_id()?;
        let mut state = self.state.lock().await;
        if self.resolved.load(Ordering::Acquire) {
            return Ok(());
        }

        state.ui.details_expanded = !state.ui.details_expanded;
        debug!(session_id = %id, expanded = state.ui.details_expanded, "toggled details");
        let frame = self.frame(&state);
        match self.host.update_content(&id, frame).await {
            Ok(()) => Ok(()),
            Err(HostError::SessionClosed(_)) => Err(ApprovalError::SessionClosed(id)),
            Err(e) => Err(self.report_host_failure(&id, e)),
        }
    }
}

/// Grant or cancel button.
struct DecisionControl {
    session: Weak<SessionInner>,
    decision: HostDecision,
}

#[async_trait]
impl EventHandler for DecisionControl {
    async fn handle(&self, _event: &UserInputEvent) -> HandlerResult {
        let Some(session) = self.session.upgrade() else {
            return Ok(());
        };
        session
            .resolve(self.decision)
            .await
            .map_err(HandlerError::new)
    }
}

struct DetailsToggle {
    session: Weak<SessionInner>,
}

#[async_trait]
impl EventHandler for DetailsToggle {
    async fn handle(&self, _event: &UserInputEvent) -> HandlerResult {
        let Some(session) = self.session.upgrade() else {
            return Ok(());
        };
        session.toggle_details().await.map_err(HandlerError::new)
    }
}

/// One confirmation dialog.
///
/// Cheap to clone; clones share the same dialog.
#[derive(Clone)]
pub struct ConfirmationSession {
    inner: Arc<SessionInner>,
}

impl ConfirmationSession {
    /// Create a controller. Nothing is shown until
    /// [`ConfirmationSession::create_session`].
    #[must_use]
    pub fn new(
        host: ArcHost,
        dispatcher: EventDispatcher,
        settings: SessionSettings,
        justification: Option<String>,
    ) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                host,
                dispatcher,
                settings,
                justification,
                id: OnceLock::new(),
                resolved: AtomicBool::new(false),
                awaited: AtomicBool::new(false),
                host_failure: watch::channel(None).0,
                state: Mutex::new(SessionState {
                    content: UiElement::Skeleton,
                    grant_disabled: true,
                    ui: UiState::default(),
                }),
            }),
        }
    }

    /// Open the dialog showing `initial`.
    ///
    /// Calling this again once the dialog exists returns the same session
    /// ID and leaves the dialog untouched.
    ///
    /// # Errors
    ///
    /// Returns [`ApprovalError::Host`] if the host cannot open the dialog.
    pub async fn create_session(
        &self,
        initial: UiElement,
        grant_disabled: bool,
    ) -> ApprovalResult<SessionId> {
        let mut state = self.inner.state.lock().await;
        if let Some(id) = self.inner.id.get() {
            debug!(session_id = %id, "session already exists");
            return Ok(id.clone());
        }

        state.content = initial;
        state.grant_disabled = grant_disabled;
        let id = self.inner.host.create_session(self.inner.frame(&state)).await?;
        // Set under the state lock, so the cell is always empty here.
        let _ = self.inner.id.set(id.clone());
        debug!(session_id = %id, grant_disabled, "confirmation session created");
        Ok(id)
    }

    /// Replace the dialog content and the grant flag.
    ///
    /// # Errors
    ///
    /// - [`ApprovalError::SessionNotCreated`] before `create_session`
    /// - [`ApprovalError::SessionClosed`] once a decision was reached
    /// - [`ApprovalError::Host`] if the host cannot render
    pub async fn update_content(&self, ui: UiElement, grant_disabled: bool) -> ApprovalResult<()> {
        let id = self.inner.require_id()?;
        let mut state = self.inner.state.lock().await;
        if self.inner.resolved.load(Ordering::Acquire) {
            return Err(ApprovalError::SessionClosed(id));
        }

        state.content = ui;
        state.grant_disabled = grant_disabled;
        let frame = self.inner.frame(&state);
        match self.inner.host.update_content(&id, frame).await {
            Ok(()) => {
                debug!(session_id = %id, grant_disabled, "content updated");
                Ok(())
            },
            // Dismissed on the host side; the decision is on its way.
            Err(HostError::SessionClosed(_)) => Err(ApprovalError::SessionClosed(id)),
            Err(e) => Err(e.into()),
        }
    }

    /// Wait for the grantor's decision.
    ///
    /// Cancel and dismissal both reject with the configured reason.
    ///
    /// # Errors
    ///
    /// - [`ApprovalError::SessionNotCreated`] before `create_session`
    /// - [`ApprovalError::SessionClosed`] if a decision was already awaited
    /// - [`ApprovalError::Host`] if the host fails while waiting, or fails to
    ///   close or re-render the dialog in response to a button press
    pub async fn await_decision(&self) -> ApprovalResult<Decision> {
        let id = self.inner.require_id()?;
        if self.inner.awaited.swap(true, Ordering::AcqRel) {
            return Err(ApprovalError::SessionClosed(id));
        }

        let mut failures = self.inner.host_failure.subscribe();
        let settings = &self.inner.settings;
        let session = Arc::downgrade(&self.inner);
        let dispatcher = &self.inner.dispatcher;
        let tokens = [
            dispatcher.register(
                HandlerKey::new(settings.grant_button.clone(), EventKind::ButtonClick, id.clone()),
                Arc::new(DecisionControl {
                    session: session.clone(),
                    decision: HostDecision::Grant,
                }),
            ),
            dispatcher.register(
                HandlerKey::new(settings.cancel_button.clone(), EventKind::ButtonClick, id.clone()),
                Arc::new(DecisionControl {
                    session: session.clone(),
                    decision: HostDecision::Cancel,
                }),
            ),
            dispatcher.register(
                HandlerKey::new(settings.details_toggle.clone(), EventKind::ButtonClick, id.clone()),
                Arc::new(DetailsToggle { session }),
            ),
        ];

        let reported = tokio::select! {
            reported = self.inner.host.request_decision(&id) => reported.map_err(ApprovalError::from),
            failed = failures.wait_for(Option::is_some) => Err(match failed {
                Ok(slot) => (*slot).clone().map_or_else(
                    || ApprovalError::Internal("host failure slot empty".to_owned()),
                    ApprovalError::Host,
                ),
                Err(e) => ApprovalError::Internal(e.to_string()),
            }),
        };
        self.inner.resolved.store(true, Ordering::Release);
        for token in &tokens {
            dispatcher.deregister(token);
        }

        let decision = match reported? {
            HostDecision::Grant => Decision::Approved(()),
            HostDecision::Cancel | HostDecision::Dismissed => Decision::Rejected {
                reason: settings.rejection_reason.clone(),
            },
        };
        debug!(session_id = %id, approved = decision.is_approved(), "decision reached");
        Ok(decision)
    }

    /// Close the dialog without a button press.
    ///
    /// No-op once a decision was reached.
    ///
    /// # Errors
    ///
    /// Returns [`ApprovalError::SessionNotCreated`] before `create_session`,
    /// or [`ApprovalError::Host`] if the host cannot close the dialog.
    pub async fn dismiss(&self) -> ApprovalResult<()> {
        let id = self.inner.require_id()?;
        let state = self.inner.state.lock().await;
        if self.inner.resolved.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        drop(state);

        self.inner
            .host
            .close_session(&id, HostDecision::Dismissed)
            .await
            .map_err(|e| self.inner.report_host_failure(&id, e))?;
        info!(session_id = %id, "confirmation session dismissed");
        Ok(())
    }

    /// The session ID, once created.
    #[must_use]
    pub fn session_id(&self) -> Option<&SessionId> {
        self.inner.id.get()
    }

    /// Whether a decision was reached.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.inner.resolved.load(Ordering::Acquire)
    }

    /// Current display state.
    pub async fn ui_state(&self) -> UiState {
        self.inner.state.lock().await.ui
    }
}

impl std::fmt::Debug for ConfirmationSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfirmationSession")
            .field("session_id", &self.inner.id.get())
            .field("resolved", &self.is_resolved())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::TestHost;
    use grantflow_core::ElementId;

    fn session_with(
        host: &Arc<TestHost>,
        justification: Option<&str>,
    ) -> (ConfirmationSession, EventDispatcher) {
        let dispatcher = EventDispatcher::new();
        let session = ConfirmationSession::new(
            Arc::clone(host) as ArcHost,
            dispatcher.clone(),
            SessionSettings::default(),
            justification.map(str::to_owned),
        );
        (session, dispatcher)
    }

    async fn wait_for_handlers(dispatcher: &EventDispatcher, key: &HandlerKey) {
        while dispatcher.handler_count(key) == 0 {
            tokio::task::yield_now().await;
        }
    }

    fn grant_key(id: &SessionId) -> HandlerKey {
        HandlerKey::new("grant-button", EventKind::ButtonClick, id.clone())
    }

    #[tokio::test]
    async fn test_create_session_is_idempotent() {
        let host = TestHost::new();
        let (session, _) = session_with(&host, None);

        let first = session.create_session(UiElement::Skeleton, true).await.unwrap();
        let second = session
            .create_session(UiElement::text("ignored"), false)
            .await
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(host.creates.load(Ordering::SeqCst), 1);
        assert!(host.last_render().contains_skeleton());
    }

    #[tokio::test]
    async fn test_update_before_create_fails() {
        let host = TestHost::new();
        let (session, _) = session_with(&host, None);
        let err = session
            .update_content(UiElement::text("x"), false)
            .await
            .unwrap_err();
        assert!(matches!(err, ApprovalError::SessionNotCreated));
        assert!(matches!(
            session.await_decision().await,
            Err(ApprovalError::SessionNotCreated)
        ));
    }

    #[tokio::test]
    async fn test_frame_carries_grant_flag() {
        let host = TestHost::new();
        let (session, _) = session_with(&host, None);
        let grant = ElementId::from("grant-button");

        session.create_session(UiElement::Skeleton, true).await.unwrap();
        assert_eq!(host.last_render().button_disabled(&grant), Some(true));

        session
            .update_content(UiElement::text("ready"), false)
            .await
            .unwrap();
        let frame = host.last_render();
        assert_eq!(frame.button_disabled(&grant), Some(false));
        assert!(frame.contains_text("ready"));
        assert!(frame.contains_text("Permission request"));
    }

    #[tokio::test]
    async fn test_grant_press_approves_and_closes() {
        let host = TestHost::new();
        let (session, dispatcher) = session_with(&host, None);
        let id = session.create_session(UiElement::Skeleton, false).await.unwrap();

        let waiter = tokio::spawn({
            let session = session.clone();
            async move { session.await_decision().await }
        });
        wait_for_handlers(&dispatcher, &grant_key(&id)).await;

        dispatcher
            .dispatch(&id, UserInputEvent::button_click("grant-button"))
            .await;

        let decision = waiter.await.unwrap().unwrap();
        assert_eq!(decision, Decision::Approved(()));
        assert_eq!(host.closed_with(), Some(HostDecision::Grant));
        assert!(session.is_resolved());
        assert_eq!(dispatcher.handler_count(&grant_key(&id)), 0);
        assert!(matches!(
            session.update_content(UiElement::text("late"), false).await,
            Err(ApprovalError::SessionClosed(_))
        ));
    }

    #[tokio::test]
    async fn test_cancel_rejects_with_configured_reason() {
        let host = TestHost::new();
        let (session, dispatcher) = session_with(&host, None);
        let id = session.create_session(UiElement::Skeleton, true).await.unwrap();

        let waiter = tokio::spawn({
            let session = session.clone();
            async move { session.await_decision().await }
        });
        wait_for_handlers(&dispatcher, &grant_key(&id)).await;

        dispatcher
            .dispatch(&id, UserInputEvent::button_click("cancel-button"))
            .await;

        let decision = waiter.await.unwrap().unwrap();
        assert_eq!(decision.reason(), Some("Permission request denied"));
        assert_eq!(host.closed_with(), Some(HostDecision::Cancel));
    }

    #[tokio::test]
    async fn test_grant_ignored_while_disabled() {
        let host = TestHost::new();
        let (session, dispatcher) = session_with(&host, None);
        let id = session.create_session(UiElement::Skeleton, true).await.unwrap();

        let waiter = tokio::spawn({
            let session = session.clone();
            async move { session.await_decision().await }
        });
        wait_for_handlers(&dispatcher, &grant_key(&id)).await;

        dispatcher
            .dispatch(&id, UserInputEvent::button_click("grant-button"))
            .await;
        assert!(!session.is_resolved());
        assert_eq!(host.closed_with(), None);

        session
            .update_content(UiElement::text("ready"), false)
            .await
            .unwrap();
        dispatcher
            .dispatch(&id, UserInputEvent::button_click("grant-button"))
            .await;
        assert!(waiter.await.unwrap().unwrap().is_approved());
    }

    #[tokio::test]
    async fn test_dismiss_rejects_once() {
        let host = TestHost::new();
        let (session, _) = session_with(&host, None);
        session.create_session(UiElement::Skeleton, true).await.unwrap();

        let waiter = tokio::spawn({
            let session = session.clone();
            async move { session.await_decision().await }
        });
        session.dismiss().await.unwrap();
        session.dismiss().await.unwrap();

        let decision = waiter.await.unwrap().unwrap();
        assert!(!decision.is_approved());
        assert_eq!(host.closed_with(), Some(HostDecision::Dismissed));
    }

    #[tokio::test]
    async fn test_details_toggle_is_cosmetic() {
        let host = TestHost::new();
        let long = "x".repeat(JUSTIFICATION_PREVIEW_CHARS.saturating_add(10));
        let (session, dispatcher) = session_with(&host, Some(&long));
        let id = session.create_session(UiElement::text("body"), false).await.unwrap();
        let preview = format!("{}...", "x".repeat(JUSTIFICATION_PREVIEW_CHARS));
        assert!(host.last_render().contains_text(&preview));

        let waiter = tokio::spawn({
            let session = session.clone();
            async move { session.await_decision().await }
        });
        wait_for_handlers(&dispatcher, &grant_key(&id)).await;

        dispatcher
            .dispatch(&id, UserInputEvent::button_click("show-more-button"))
            .await;
        assert!(session.ui_state().await.details_expanded);
        assert!(host.last_render().contains_text(&long));
        assert!(!session.is_resolved());

        dispatcher
            .dispatch(&id, UserInputEvent::button_click("cancel-button"))
            .await;
        assert!(!waiter.await.unwrap().unwrap().is_approved());
    }

    #[tokio::test]
    async fn test_short_justification_has_no_toggle() {
        let host = TestHost::new();
        let (session, _) = session_with(&host, Some("pay my rent"));
        session.create_session(UiElement::Skeleton, true).await.unwrap();
        let frame = host.last_render();
        assert!(frame.contains_text("pay my rent"));
        assert!(frame.find(&ElementId::from("show-more-button")).is_none());
    }

    #[tokio::test]
    async fn test_close_failure_is_fatal() {
        let host = TestHost::failing_close();
        let (session, dispatcher) = session_with(&host, None);
        let id = session.create_session(UiElement::Skeleton, true).await.unwrap();

        let waiter = tokio::spawn({
            let session = session.clone();
            async move { session.await_decision().await }
        });
        wait_for_handlers(&dispatcher, &grant_key(&id)).await;

        dispatcher
            .dispatch(&id, UserInputEvent::button_click("cancel-button"))
            .await;
        dispatcher
            .dispatch(&id, UserInputEvent::button_click("cancel-button"))
            .await;

        let result = tokio::time::timeout(std::time::Duration::from_secs(2), waiter)
            .await
            .expect("await_decision hung after close failure")
            .unwrap();
        assert!(matches!(
            result,
            Err(ApprovalError::Host(HostError::Internal(_)))
        ));
        assert_eq!(host.close_attempts.load(Ordering::SeqCst), 1);
        assert_eq!(dispatcher.handler_count(&grant_key(&id)), 0);
        assert!(session.is_resolved());
    }

    #[tokio::test]
    async fn test_dismiss_failure_ends_the_wait() {
        let host = TestHost::failing_close();
        let (session, _) = session_with(&host, None);
        session.create_session(UiElement::Skeleton, true).await.unwrap();

        let waiter = tokio::spawn({
            let session = session.clone();
            async move { session.await_decision().await }
        });
        assert!(matches!(
            session.dismiss().await,
            Err(ApprovalError::Host(_))
        ));

        let result = tokio::time::timeout(std::time::Duration::from_secs(2), waiter)
            .await
            .expect("await_decision hung after dismiss failure")
            .unwrap();
        assert!(matches!(result, Err(ApprovalError::Host(_))));
    }

    #[tokio::test]
    async fn test_second_await_is_rejected() {
        let host = TestHost::new();
        let (session, _) = session_with(&host, None);
        session.create_session(UiElement::Skeleton, true).await.unwrap();
        session.dismiss().await.unwrap();

        assert!(session.await_decision().await.is_ok());
        assert!(matches!(
            session.await_decision().await,
            Err(ApprovalError::SessionClosed(_))
        ));
    }
}
