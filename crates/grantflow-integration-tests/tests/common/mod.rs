//! Shared test harness for integration tests.

use std::sync::Arc;

use grantflow_approval::{ApprovalSettings, PermissionOrchestrator};
use grantflow_core::{ElementId, EventKind, SessionId, UiElement, UserInputEvent};
use grantflow_events::HandlerKey;
use grantflow_test::{
    MockAccountProvider, MockHost, RecordingSigner, TokenStreamHandler, TokenStreamProbe,
};

/// A token stream orchestrator wired to mock collaborators.
#[allow(dead_code)]
pub struct Harness {
    /// The mock host.
    pub host: MockHost,
    /// The mock account provider.
    pub accounts: MockAccountProvider,
    /// The recording signer.
    pub signer: RecordingSigner,
    /// Observer of the token stream handler.
    pub probe: Arc<TokenStreamProbe>,
    /// The orchestrator under test.
    pub orchestrator: PermissionOrchestrator<TokenStreamHandler>,
    /// Settings the orchestrator was built from.
    pub settings: ApprovalSettings,
}

#[allow(dead_code)]
impl Harness {
    /// Default handler, collaborators and settings.
    pub fn new() -> Self {
        Self::with_handler(TokenStreamHandler::new())
    }

    /// Custom handler, default collaborators and settings.
    pub fn with_handler(handler: TokenStreamHandler) -> Self {
        Self::build(
            handler,
            MockHost::new(),
            MockAccountProvider::default(),
            RecordingSigner::new(),
            ApprovalSettings::default(),
        )
    }

    /// Everything explicit.
    pub fn build(
        handler: TokenStreamHandler,
        host: MockHost,
        accounts: MockAccountProvider,
        signer: RecordingSigner,
        settings: ApprovalSettings,
    ) -> Self {
        grantflow_test::init_test_logging();
        let probe = handler.probe();
        let orchestrator = PermissionOrchestrator::new(
            handler,
            host.as_host(),
            settings.dispatcher.build(),
            Arc::new(accounts.clone()),
            Arc::new(signer.clone()),
        )
        .with_session_settings(settings.session.clone())
        .with_settings(settings.orchestrator);

        Self {
            host,
            accounts,
            signer,
            probe,
            orchestrator,
            settings,
        }
    }

    /// Element ID of the grant button.
    pub fn grant(&self) -> &str {
        self.settings.session.grant_button.as_str()
    }

    /// Element ID of the cancel button.
    pub fn cancel(&self) -> &str {
        self.settings.session.cancel_button.as_str()
    }

    /// Element ID of the justification toggle.
    pub fn details_toggle(&self) -> &str {
        self.settings.session.details_toggle.as_str()
    }

    /// Click `button` once a handler is listening for it.
    pub async fn press(&self, session_id: &SessionId, button: &str) {
        let key = HandlerKey::new(button, EventKind::ButtonClick, session_id.clone());
        while self.orchestrator.dispatcher().handler_count(&key) == 0 {
            tokio::task::yield_now().await;
        }
        self.orchestrator
            .dispatcher()
            .dispatch(session_id, UserInputEvent::button_click(button))
            .await;
    }

    /// Type `value` into `field` through the dispatcher.
    pub async fn type_into(&self, session_id: &SessionId, field: &str, value: &str) {
        self.orchestrator
            .dispatcher()
            .dispatch(session_id, UserInputEvent::input_change(field, value))
            .await;
    }

    /// Wait until the dialog shows resolved content.
    pub async fn wait_for_content(&self, session_id: &SessionId) -> UiElement {
        self.host
            .wait_for_render(session_id, |ui| !ui.contains_skeleton())
            .await
    }

    /// Wait until `field` displays `value`.
    pub async fn wait_for_field(&self, session_id: &SessionId, field: &str, value: &str) -> UiElement {
        let id = ElementId::from(field);
        self.host
            .wait_for_render(session_id, |ui| ui.field_value(&id) == Some(value))
            .await
    }
}
