//! Mock implementations for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;

use grantflow_approval::{
    AccountInfo, AccountProvider, ApprovalError, ApprovalResult, Authorization,
    AuthorizationSigner, KeyPairSigner, SignedAuthorization,
};
use grantflow_core::{ChainId, HostDecision, HostError, HostResult, HostUi, SessionId, UiElement};
use grantflow_crypto::{KeyPair, PublicKey};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Everything the mock host remembers about one dialog.
struct DialogRecord {
    renders: Vec<UiElement>,
    decision: watch::Sender<Option<HostDecision>>,
}

#[derive(Default)]
struct HostState {
    dialogs: HashMap<SessionId, DialogRecord>,
    order: Vec<SessionId>,
}

/// Mock implementation of the [`HostUi`] trait.
///
/// Records every render per dialog and resolves `request_decision` when the
/// dialog is closed, either through `close_session` or through a simulated
/// dismissal ([`MockHost::dismiss`]). Uses `std::sync::Mutex` internally so
/// inspection works without awaiting.
#[derive(Clone)]
pub struct MockHost {
    state: Arc<Mutex<HostState>>,
    changes: Arc<watch::Sender<u64>>,
    fail_updates: bool,
    fail_close: bool,
}

impl MockHost {
    /// Create a new mock host.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(HostState::default())),
            changes: Arc::new(watch::channel(0).0),
            fail_updates: false,
            fail_close: false,
        }
    }

    /// Make every `update_content` call fail with a render error.
    #[must_use]
    pub fn with_failing_updates(mut self) -> Self {
        self.fail_updates = true;
        self
    }

    /// Make every `close_session` call fail. The dialog stays open.
    #[must_use]
    pub fn with_failing_close(mut self) -> Self {
        self.fail_close = true;
        self
    }

    /// As a shareable host handle.
    #[must_use]
    pub fn as_host(&self) -> Arc<dyn HostUi> {
        Arc::new(self.clone())
    }

    fn touch(&self) {
        self.changes.send_modify(|n| *n = n.wrapping_add(1));
    }

    /// Number of dialogs opened so far.
    #[must_use]
    pub fn session_count(&self) -> usize {
        lock(&self.state).order.len()
    }

    /// IDs of every dialog, in creation order.
    #[must_use]
    pub fn sessions(&self) -> Vec<SessionId> {
        lock(&self.state).order.clone()
    }

    /// Every render of a dialog, including the initial one.
    #[must_use]
    pub fn renders(&self, session_id: &SessionId) -> Vec<UiElement> {
        lock(&self.state)
            .dialogs
            .get(session_id)
            .map(|d| d.renders.clone())
            .unwrap_or_default()
    }

    /// What the dialog currently shows.
    #[must_use]
    pub fn current(&self, session_id: &SessionId) -> Option<UiElement> {
        lock(&self.state)
            .dialogs
            .get(session_id)
            .and_then(|d| d.renders.last().cloned())
    }

    /// How the dialog was closed, if it was.
    #[must_use]
    pub fn closed_with(&self, session_id: &SessionId) -> Option<HostDecision> {
        lock(&self.state)
            .dialogs
            .get(session_id)
            .and_then(|d| *d.decision.borrow())
    }

    /// Simulate the grantor closing the dialog without pressing a button.
    pub fn dismiss(&self, session_id: &SessionId) {
        if let Some(dialog) = lock(&self.state).dialogs.get(session_id) {
            dialog.decision.send_if_modified(|current| {
                if current.is_some() {
                    return false;
                }
                *current = Some(HostDecision::Dismissed);
                true
            });
        }
        self.touch();
    }

    /// Wait until the `n`-th dialog (zero-based) is open and return its ID.
    pub async fn wait_for_session(&self, n: usize) -> SessionId {
        let mut rx = self.changes.subscribe();
        loop {
            if let Some(id) = lock(&self.state).order.get(n).cloned() {
                return id;
            }
            if rx.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }

    /// Wait until the dialog's current render satisfies `predicate`.
    pub async fn wait_for_render<F>(&self, session_id: &SessionId, predicate: F) -> UiElement
    where
        F: Fn(&UiElement) -> bool,
    {
        let mut rx = self.changes.subscribe();
        loop {
            if let Some(ui) = self.current(session_id).filter(|ui| predicate(ui)) {
                return ui;
            }
            if rx.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }

    /// Wait until the dialog is closed and return how.
    pub async fn wait_for_close(&self, session_id: &SessionId) -> HostDecision {
        let mut rx = self.changes.subscribe();
        loop {
            if let Some(decision) = self.closed_with(session_id) {
                return decision;
            }
            if rx.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }
}

impl Default for MockHost {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MockHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockHost")
            .field("sessions", &self.session_count())
            .field("fail_updates", &self.fail_updates)
            .field("fail_close", &self.fail_close)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl HostUi for MockHost {
    async fn create_session(&self, ui: UiElement) -> HostResult<SessionId> {
        let id = SessionId::new();
        {
            let mut state = lock(&self.state);
            state.dialogs.insert(
                id.clone(),
                DialogRecord {
                    renders: vec![ui],
                    decision: watch::channel(None).0,
                },
            );
            state.order.push(id.clone());
        }
        self.touch();
        Ok(id)
    }

    async fn update_content(&self, session_id: &SessionId, ui: UiElement) -> HostResult<()> {
        if self.fail_updates {
            return Err(HostError::RenderFailed("mock host refuses updates".to_string()));
        }
        {
            let mut state = lock(&self.state);
            let dialog = state
                .dialogs
                .get_mut(session_id)
                .ok_or_else(|| HostError::UnknownSession(session_id.clone()))?;
            if dialog.decision.borrow().is_some() {
                return Err(HostError::SessionClosed(session_id.clone()));
            }
            dialog.renders.push(ui);
        }
        self.touch();
        Ok(())
    }

    async fn request_decision(&self, session_id: &SessionId) -> HostResult<HostDecision> {
        let mut rx = lock(&self.state)
            .dialogs
            .get(session_id)
            .map(|d| d.decision.subscribe())
            .ok_or_else(|| HostError::UnknownSession(session_id.clone()))?;
        let decision = rx
            .wait_for(Option::is_some)
            .await
            .map_err(|e| HostError::Internal(e.to_string()))?;
        Ok((*decision).unwrap_or(HostDecision::Dismissed))
    }

    async fn close_session(&self, session_id: &SessionId, decision: HostDecision) -> HostResult<()> {
        if self.fail_close {
            return Err(HostError::Internal("mock host refuses to close".to_string()));
        }
        {
            let state = lock(&self.state);
            let dialog = state
                .dialogs
                .get(session_id)
                .ok_or_else(|| HostError::UnknownSession(session_id.clone()))?;
            // The first close wins.
            dialog.decision.send_if_modified(|current| {
                if current.is_some() {
                    return false;
                }
                *current = Some(decision);
                true
            });
        }
        self.touch();
        Ok(())
    }
}

/// Mock grantor account lookup.
#[derive(Debug, Clone)]
pub struct MockAccountProvider {
    address: String,
    metadata: serde_json::Value,
    fail: bool,
    lookups: Arc<Mutex<Vec<ChainId>>>,
}

impl MockAccountProvider {
    /// Create a provider returning `address` for every chain.
    #[must_use]
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            metadata: serde_json::json!({ "deployed": true }),
            fail: false,
            lookups: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Return `metadata` with every account.
    #[must_use]
    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }

    /// Make every lookup fail.
    #[must_use]
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    /// Chains looked up so far.
    #[must_use]
    pub fn lookups(&self) -> Vec<ChainId> {
        lock(&self.lookups).clone()
    }
}

impl Default for MockAccountProvider {
    fn default() -> Self {
        Self::new("0x00000000000000000000000000000000000000aa")
    }
}

#[async_trait]
impl AccountProvider for MockAccountProvider {
    async fn account(&self, chain_id: ChainId) -> ApprovalResult<AccountInfo> {
        lock(&self.lookups).push(chain_id);
        if self.fail {
            return Err(ApprovalError::Account(format!(
                "no account deployed on chain {chain_id}"
            )));
        }
        Ok(AccountInfo {
            address: self.address.clone(),
            metadata: self.metadata.clone(),
        })
    }
}

/// Signer recording every authorization it is asked to sign.
#[derive(Clone)]
pub struct RecordingSigner {
    inner: Arc<KeyPairSigner>,
    fail: bool,
    signed: Arc<Mutex<Vec<Authorization>>>,
}

impl RecordingSigner {
    /// Create a signer with a fresh key.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(KeyPairSigner::new(KeyPair::generate())),
            fail: false,
            signed: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Make every signing attempt fail.
    #[must_use]
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    /// The key signatures verify against.
    #[must_use]
    pub fn public_key(&self) -> PublicKey {
        self.inner.public_key()
    }

    /// Authorizations signed (or attempted) so far.
    #[must_use]
    pub fn signed(&self) -> Vec<Authorization> {
        lock(&self.signed).clone()
    }
}

impl Default for RecordingSigner {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RecordingSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordingSigner")
            .field("public_key", &self.public_key())
            .field("fail", &self.fail)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl AuthorizationSigner for RecordingSigner {
    async fn sign(&self, authorization: Authorization) -> ApprovalResult<SignedAuthorization> {
        lock(&self.signed).push(authorization.clone());
        if self.fail {
            return Err(ApprovalError::Signing("signing key unavailable".to_string()));
        }
        self.inner.sign(authorization).await
    }
}
