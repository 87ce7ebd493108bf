//! Permission request lifecycle orchestrator.
//!
//! The [`PermissionOrchestrator`] drives one request from admission to a
//! [`GrantOutcome`]:
//!
//! 1. Validate the raw request (fatal, no dialog is opened on failure)
//! 2. Open the dialog showing a skeleton with grant disabled
//! 3. In the background, build the context, derive metadata, render the
//!    content and enable grant
//! 4. Apply grantor edits, each one replacing the context wholesale
//! 5. Wait for the decision (optionally bounded by a timeout)
//! 6. On grant: resolve the edited request, populate the permission, look up
//!    the grantor account, build the restriction set, sign, and assemble
//!    the response
//!
//! # Ordering
//!
//! Every context transition of one request goes through a single lane (an
//! async mutex around the current context). The background resolution takes
//! the lane before the dialog is even opened, so an edit arriving before the
//! first render queues behind it instead of interleaving. The lane only ever
//! holds the context whose content the host is currently showing: an edit
//! that loses the race against a decision is discarded, and grant always
//! reads what the grantor saw.

use std::sync::{Arc, Weak};

use async_trait::async_trait;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tokio::task::JoinHandle;
use tracing::{Instrument, Span, debug, error, info, warn};

use grantflow_core::{
    ArcHost, ElementId, InputValue, PermissionPayload, PermissionRequest, RawPermissionRequest,
    SessionId, UserInputEvent,
};
use grantflow_events::{EventDispatcher, EventHandler, HandlerError, HandlerKey, HandlerResult};
use grantflow_telemetry::RequestContext;

use crate::authorization::{Authorization, AuthorizationSigner};
use crate::decision::{Decision, GrantOutcome, GrantResponse};
use crate::error::{ApprovalError, ApprovalResult};
use crate::permission::{AccountProvider, PermissionHandler};
use crate::restriction::{Restriction, RestrictionBuilder};
use crate::session::ConfirmationSession;
use crate::settings::{OrchestratorSettings, SessionSettings};

/// Rejection reason when the grantor does not decide in time.
pub const TIMEOUT_REASON: &str = "Permission request timed out";

type ContextLane<C> = Arc<Mutex<Option<Arc<C>>>>;

/// Drives permission requests of one permission type.
pub struct PermissionOrchestrator<H: PermissionHandler> {
    handler: Arc<H>,
    host: ArcHost,
    dispatcher: EventDispatcher,
    accounts: Arc<dyn AccountProvider>,
    signer: Arc<dyn AuthorizationSigner>,
    session_settings: SessionSettings,
    settings: OrchestratorSettings,
}

impl<H: PermissionHandler> PermissionOrchestrator<H> {
    /// Create an orchestrator with default session and lifecycle settings.
    pub fn new(
        handler: H,
        host: ArcHost,
        dispatcher: EventDispatcher,
        accounts: Arc<dyn AccountProvider>,
        signer: Arc<dyn AuthorizationSigner>,
    ) -> Self {
        Self {
            handler: Arc::new(handler),
            host,
            dispatcher,
            accounts,
            signer,
            session_settings: SessionSettings::default(),
            settings: OrchestratorSettings::default(),
        }
    }

    /// Use custom dialog settings.
    #[must_use]
    pub fn with_session_settings(mut self, settings: SessionSettings) -> Self {
        self.session_settings = settings;
        self
    }

    /// Use custom lifecycle settings.
    #[must_use]
    pub fn with_settings(mut self, settings: OrchestratorSettings) -> Self {
        self.settings = settings;
        self
    }

    /// The dispatcher input events must be fed into.
    pub fn dispatcher(&self) -> &EventDispatcher {
        &self.dispatcher
    }

    /// Run one request to completion.
    ///
    /// # Errors
    ///
    /// Returns validation errors before any dialog is opened, and host,
    /// collaborator, account, restriction and signing failures as they
    /// occur. A cancelled, dismissed or timed-out dialog is not an error.
    pub async fn orchestrate(&self, raw: RawPermissionRequest) -> ApprovalResult<GrantOutcome> {
        self.start(raw).await?.finish().await
    }

    /// Run one request given as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ApprovalError::Validation`] if the JSON is not a request,
    /// otherwise see [`PermissionOrchestrator::orchestrate`].
    pub async fn orchestrate_json(&self, raw: serde_json::Value) -> ApprovalResult<GrantOutcome> {
        let raw: RawPermissionRequest =
            serde_json::from_value(raw).map_err(|e| ApprovalError::Validation(e.to_string()))?;
        self.orchestrate(raw).await
    }

    /// Admit a request and open its dialog.
    ///
    /// Returns as soon as the skeleton is shown; the context resolves in the
    /// background. Finish the returned request with
    /// [`PendingRequest::finish`].
    ///
    /// # Errors
    ///
    /// - [`ApprovalError::UnsupportedPermissionType`] or any validation
    ///   error of the handler, before a dialog is opened
    /// - [`ApprovalError::Host`] if the dialog cannot be opened
    pub async fn start(&self, raw: RawPermissionRequest) -> ApprovalResult<PendingRequest<H>> {
        let telemetry = RequestContext::new()
            .with_permission_type(raw.permission_type())
            .with_chain_id(raw.chain_id);
        let span = telemetry.span();

        async {
            if raw.permission_type() != self.handler.permission_type() {
                return Err(ApprovalError::UnsupportedPermissionType(
                    raw.permission_type().to_owned(),
                ));
            }
            let request = self.handler.validate(&raw)?;

            let session = ConfirmationSession::new(
                Arc::clone(&self.host),
                self.dispatcher.clone(),
                self.session_settings.clone(),
                request.justification().map(str::to_owned),
            );
            let lane: ContextLane<H::Context> = Arc::new(Mutex::new(None));
            let first_render = Arc::clone(&lane).lock_owned().await;

            let session_id = session
                .create_session(self.handler.render_skeleton(), true)
                .await?;
            Span::current().record("session_id", tracing::field::display(&session_id));
            info!(request_id = %telemetry.request_id, "permission request started");

            let flow = Arc::new(EditFlow {
                handler: Arc::clone(&self.handler),
                request,
                session,
                session_id,
                dispatcher: self.dispatcher.clone(),
                lane,
            });
            flow.register_edit_handlers();

            let resolution = tokio::spawn(
                resolve_initial(Arc::clone(&flow), first_render).instrument(Span::current()),
            );

            Ok(PendingRequest {
                flow,
                resolution,
                accounts: Arc::clone(&self.accounts),
                signer: Arc::clone(&self.signer),
                settings: self.settings,
                telemetry,
                span: Span::current(),
            })
        }
        .instrument(span)
        .await
    }
}

impl<H: PermissionHandler> std::fmt::Debug for PermissionOrchestrator<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PermissionOrchestrator")
            .field("permission_type", &self.handler.permission_type())
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

/// Everything the edit path of one request needs.
struct EditFlow<H: PermissionHandler> {
    handler: Arc<H>,
    request: PermissionRequest<H::Permission>,
    session: ConfirmationSession,
    session_id: SessionId,
    dispatcher: EventDispatcher,
    lane: ContextLane<H::Context>,
}

impl<H: PermissionHandler> EditFlow<H> {
    fn register_edit_handlers(self: &Arc<Self>) {
        for (element_id, kind) in self.handler.editable_fields(&self.request) {
            let key = HandlerKey::new(element_id, kind, self.session_id.clone());
            debug!(key = %key, "registering edit handler");
            self.dispatcher.register(
                key,
                Arc::new(EditHandler {
                    flow: Arc::downgrade(self),
                }),
            );
        }
    }

    /// Replace the context with the result of one edit.
    async fn apply_edit(&self, element_id: &ElementId, value: &InputValue) -> ApprovalResult<()> {
        if !self.request.is_adjustment_allowed {
            warn!(session_id = %self.session_id, element_id = %element_id, "edit on non-adjustable request");
            return Err(ApprovalError::AdjustmentNotAllowed);
        }

        let mut current = self.lane.lock().await;
        let Some(context) = current.clone() else {
            debug!(session_id = %self.session_id, "no context to edit, skipping");
            return Ok(());
        };
        if self.session.is_resolved() {
            debug!(session_id = %self.session_id, element_id = %element_id, "session resolved, edit skipped");
            return Ok(());
        }

        let next = self.handler.apply_edit(&context, element_id, value)?;
        let metadata = self.handler.derive_metadata(&next).await?;
        let ui = self.handler.render_content(&next, &metadata);
        match self
            .session
            .update_content(ui, self.handler.grant_disabled(&metadata))
            .await
        {
            Ok(()) => {
                *current = Some(Arc::new(next));
                debug!(session_id = %self.session_id, element_id = %element_id, "edit applied");
                Ok(())
            },
            Err(ApprovalError::SessionClosed(_)) => {
                debug!(session_id = %self.session_id, element_id = %element_id, "session resolved during edit, discarded");
                Ok(())
            },
            Err(e) => Err(e),
        }
    }
}

impl<H: PermissionHandler> Drop for EditFlow<H> {
    fn drop(&mut self) {
        // Releases the registrations of a request that was never finished.
        self.dispatcher.deregister_session(&self.session_id);
    }
}

struct EditHandler<H: PermissionHandler> {
    flow: Weak<EditFlow<H>>,
}

#[async_trait]
impl<H: PermissionHandler> EventHandler for EditHandler<H> {
    async fn handle(&self, event: &UserInputEvent) -> HandlerResult {
        let Some(flow) = self.flow.upgrade() else {
            return Ok(());
        };
        let Some(value) = &event.value else {
            return Err(HandlerError::msg(format!(
                "edit of {} carries no value",
                event.element_id
            )));
        };
        flow.apply_edit(&event.element_id, value)
            .await
            .map_err(HandlerError::new)
    }
}

/// Build the first context and swap it in for the skeleton.
async fn resolve_initial<H: PermissionHandler>(
    flow: Arc<EditFlow<H>>,
    mut first_render: OwnedMutexGuard<Option<Arc<H::Context>>>,
) -> ApprovalResult<()> {
    let context = flow.handler.build_context(&flow.request).await?;
    let metadata = flow.handler.derive_metadata(&context).await?;
    let ui = flow.handler.render_content(&context, &metadata);

    match flow
        .session
        .update_content(ui, flow.handler.grant_disabled(&metadata))
        .await
    {
        Ok(()) => {
            *first_render = Some(Arc::new(context));
            debug!(session_id = %flow.session_id, "context resolved");
            Ok(())
        },
        Err(ApprovalError::SessionClosed(_)) => {
            debug!(session_id = %flow.session_id, "session resolved before context");
            Ok(())
        },
        Err(e) => Err(e),
    }
}

/// A request whose dialog is open.
pub struct PendingRequest<H: PermissionHandler> {
    flow: Arc<EditFlow<H>>,
    resolution: JoinHandle<ApprovalResult<()>>,
    accounts: Arc<dyn AccountProvider>,
    signer: Arc<dyn AuthorizationSigner>,
    settings: OrchestratorSettings,
    telemetry: RequestContext,
    span: Span,
}

impl<H: PermissionHandler> PendingRequest<H> {
    /// The dialog's session ID.
    pub fn session_id(&self) -> &SessionId {
        &self.flow.session_id
    }

    /// Apply an edit directly, bypassing the dispatcher and its debounce.
    ///
    /// # Errors
    ///
    /// Returns [`ApprovalError::AdjustmentNotAllowed`] if the request does
    /// not allow adjustment, whether or not the context has resolved yet,
    /// and any failure of the handler's edit or metadata derivation.
    pub async fn apply_edit(
        &self,
        element_id: impl Into<ElementId>,
        value: impl Into<InputValue>,
    ) -> ApprovalResult<()> {
        self.flow
            .apply_edit(&element_id.into(), &value.into())
            .await
    }

    /// Wait for the decision and, if granted, produce the signed response.
    ///
    /// # Errors
    ///
    /// See [`PermissionOrchestrator::orchestrate`].
    pub async fn finish(self) -> ApprovalResult<GrantOutcome> {
        let PendingRequest {
            flow,
            mut resolution,
            accounts,
            signer,
            settings,
            telemetry,
            span,
        } = self;

        async move {
            let result = conclude(&flow, &mut resolution, settings, &*accounts, &*signer).await;
            flow.dispatcher.deregister_session(&flow.session_id);
            resolution.abort();

            match &result {
                Ok(outcome) => info!(
                    approved = outcome.is_approved(),
                    reason = outcome.reason(),
                    elapsed_ms = telemetry.elapsed_ms(),
                    "permission request finished"
                ),
                Err(e) => error!(
                    error = %e,
                    elapsed_ms = telemetry.elapsed_ms(),
                    "permission request failed"
                ),
            }
            result
        }
        .instrument(span)
        .await
    }
}

impl<H: PermissionHandler> std::fmt::Debug for PendingRequest<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingRequest")
            .field("session_id", &self.flow.session_id)
            .field("request_id", &self.telemetry.request_id)
            .finish_non_exhaustive()
    }
}

fn resolution_result(
    joined: Result<ApprovalResult<()>, tokio::task::JoinError>,
) -> ApprovalResult<()> {
    joined.map_err(|e| ApprovalError::Internal(format!("context resolution task failed: {e}")))?
}

async fn conclude<H: PermissionHandler>(
    flow: &EditFlow<H>,
    resolution: &mut JoinHandle<ApprovalResult<()>>,
    settings: OrchestratorSettings,
    accounts: &dyn AccountProvider,
    signer: &dyn AuthorizationSigner,
) -> ApprovalResult<GrantOutcome> {
    let deadline = async {
        match settings.decision_timeout {
            Some(timeout) => tokio::time::sleep(timeout).await,
            None => std::future::pending().await,
        }
    };
    let awaiting = flow.session.await_decision();
    tokio::pin!(deadline, awaiting);

    let mut resolved = false;
    let mut timed_out = false;
    let mut failure = None;
    let decision = loop {
        tokio::select! {
            decision = &mut awaiting => break decision,
            joined = &mut *resolution, if !resolved => {
                resolved = true;
                if let Err(e) = resolution_result(joined) {
                    error!(error = %e, "context resolution failed");
                    if let Err(dismissal) = flow.session.dismiss().await {
                        warn!(error = %dismissal, "dialog not dismissed after resolution failure");
                        return Err(e);
                    }
                    failure = Some(e);
                }
            },
            () = &mut deadline, if !timed_out => {
                timed_out = true;
                warn!(timeout = ?settings.decision_timeout, "no decision in time, dismissing");
                flow.session.dismiss().await?;
            },
        }
    };

    if let Some(e) = failure {
        return Err(e);
    }

    let decision: Decision<Arc<H::Context>> = match decision? {
        Decision::Approved(()) => {
            if !resolved {
                resolution_result((&mut *resolution).await)?;
            }
            let context = flow.lane.lock().await.clone().ok_or_else(|| {
                ApprovalError::Internal("granted without a resolved context".to_owned())
            })?;
            Decision::Approved(context)
        },
        Decision::Rejected { reason } => Decision::Rejected { reason },
    };

    match decision {
        Decision::Rejected { reason } => {
            let reason = if timed_out {
                TIMEOUT_REASON.to_owned()
            } else {
                reason
            };
            Ok(GrantOutcome::Rejected { reason })
        },
        Decision::Approved(context) => {
            let response = grant(flow, &context, accounts, signer).await?;
            Ok(GrantOutcome::Approved(Box::new(response)))
        },
    }
}

async fn grant<H: PermissionHandler>(
    flow: &EditFlow<H>,
    context: &H::Context,
    accounts: &dyn AccountProvider,
    signer: &dyn AuthorizationSigner,
) -> ApprovalResult<GrantResponse> {
    let handler = &flow.handler;

    let resolved = handler.resolve_request(context, &flow.request).await?;
    let populated = handler.finalize(resolved.permission.data.clone()).await?;
    let account = accounts.account(resolved.chain_id).await?;
    debug!(address = %account.address, "grantor account resolved");

    let expiry = resolved.effective_expiry();
    let restrictions = handler
        .append_restrictions(&populated, RestrictionBuilder::new())
        .await?
        .with(Restriction::expiry(expiry))?
        .build();

    let authorization = Authorization::new(
        resolved.chain_id,
        resolved.signer.address(),
        account.address.clone(),
        restrictions,
    );
    let signed = signer.sign(authorization).await?;
    signed.verify()?;
    debug!(restrictions = signed.authorization.restrictions.len(), "authorization signed");

    let data = serde_json::to_value(&populated)
        .map_err(|e| ApprovalError::Internal(format!("failed to serialize permission: {e}")))?;
    let artifact = signed.encode()?;

    Ok(GrantResponse {
        chain_id: resolved.chain_id,
        address: account.address,
        signer: resolved.signer,
        permission: PermissionPayload {
            permission_type: resolved.permission.permission_type,
            data,
            justification: resolved.permission.justification,
        },
        expiry,
        rules: resolved.rules,
        context: format!("0x{}", hex::encode(&artifact)),
        artifact_hash: signed.artifact_hash()?,
        account_metadata: account.metadata,
    })
}
