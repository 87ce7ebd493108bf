//! In-crate test doubles.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::watch;

use grantflow_core::{HostDecision, HostError, HostResult, HostUi, SessionId, UiElement};

/// Single-dialog host recording every render.
pub(crate) struct TestHost {
    pub(crate) session: SessionId,
    pub(crate) creates: AtomicUsize,
    pub(crate) renders: std::sync::Mutex<Vec<UiElement>>,
    pub(crate) decision: watch::Sender<Option<HostDecision>>,
    pub(crate) fail_close: AtomicBool,
    pub(crate) close_attempts: AtomicUsize,
}

impl TestHost {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            session: SessionId::new(),
            creates: AtomicUsize::new(0),
            renders: std::sync::Mutex::new(Vec::new()),
            decision: watch::channel(None).0,
            fail_close: AtomicBool::new(false),
            close_attempts: AtomicUsize::new(0),
        })
    }

    /// A host whose `close_session` always fails.
    pub(crate) fn failing_close() -> Arc<Self> {
        let host = Self::new();
        host.fail_close.store(true, Ordering::SeqCst);
        host
    }

    pub(crate) fn last_render(&self) -> UiElement {
        self.renders.lock().unwrap().last().cloned().unwrap()
    }

    pub(crate) fn render_count(&self) -> usize {
        self.renders.lock().unwrap().len()
    }

    pub(crate) fn closed_with(&self) -> Option<HostDecision> {
        *self.decision.borrow()
    }
}

#[async_trait]
impl HostUi for TestHost {
    async fn create_session(&self, ui: UiElement) -> HostResult<SessionId> {
        self.creates.fetch_add(1, Ordering::SeqCst);
        self.renders.lock().unwrap().push(ui);
        Ok(self.session.clone())
    }

    async fn update_content(&self, _id: &SessionId, ui: UiElement) -> HostResult<()> {
        self.renders.lock().unwrap().push(ui);
        Ok(())
    }

    async fn request_decision(&self, _id: &SessionId) -> HostResult<HostDecision> {
        let mut rx = self.decision.subscribe();
        let decision = rx
            .wait_for(Option::is_some)
            .await
            .map_err(|e| HostError::Internal(e.to_string()))?;
        Ok((*decision).unwrap_or(HostDecision::Dismissed))
    }

    async fn close_session(&self, _id: &SessionId, decision: HostDecision) -> HostResult<()> {
        self.close_attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail_close.load(Ordering::SeqCst) {
            return Err(HostError::Internal("close refused".to_owned()));
        }
        self.decision.send_replace(Some(decision));
        Ok(())
    }
}
