//! Runtime settings, built from the `grantflow-config` sections.

use std::time::Duration;

use grantflow_config::Config;
use grantflow_core::ElementId;
use grantflow_events::{DEFAULT_DEBOUNCE_WINDOW, EventDispatcher};

/// Event dispatcher settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatcherSettings {
    /// Quiet window for field edits.
    pub debounce_window: Duration,
}

impl DispatcherSettings {
    /// Build a dispatcher with these settings.
    #[must_use]
    pub fn build(&self) -> EventDispatcher {
        EventDispatcher::with_debounce_window(self.debounce_window)
    }
}

impl Default for DispatcherSettings {
    fn default() -> Self {
        Self {
            debounce_window: DEFAULT_DEBOUNCE_WINDOW,
        }
    }
}

impl From<&Config> for DispatcherSettings {
    fn from(config: &Config) -> Self {
        Self {
            debounce_window: Duration::from_millis(config.dispatcher.debounce_ms),
        }
    }
}

/// Confirmation dialog settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSettings {
    /// Element ID of the grant button.
    pub grant_button: ElementId,
    /// Element ID of the cancel button.
    pub cancel_button: ElementId,
    /// Element ID of the justification toggle.
    pub details_toggle: ElementId,
    /// Dialog title.
    pub title: String,
    /// Reason attached to a cancelled or dismissed session.
    pub rejection_reason: String,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for SessionSettings {
    fn from(config: &Config) -> Self {
        Self {
            grant_button: ElementId::new(config.session.grant_button.clone()),
            cancel_button: ElementId::new(config.session.cancel_button.clone()),
            details_toggle: ElementId::new(config.session.details_toggle.clone()),
            title: config.session.title.clone(),
            rejection_reason: config.orchestrator.rejection_reason.clone(),
        }
    }
}

/// Request lifecycle settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrchestratorSettings {
    /// How long to wait for the grantor. `None` waits indefinitely.
    pub decision_timeout: Option<Duration>,
}

impl From<&Config> for OrchestratorSettings {
    fn from(config: &Config) -> Self {
        Self {
            decision_timeout: config
                .orchestrator
                .decision_timeout_secs
                .map(Duration::from_secs),
        }
    }
}

/// All runtime settings of the confirmation flow.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApprovalSettings {
    /// Dispatcher settings.
    pub dispatcher: DispatcherSettings,
    /// Session settings.
    pub session: SessionSettings,
    /// Orchestrator settings.
    pub orchestrator: OrchestratorSettings,
}

impl From<&Config> for ApprovalSettings {
    fn from(config: &Config) -> Self {
        Self {
            dispatcher: config.into(),
            session: config.into(),
            orchestrator: config.into(),
        }
    }
}
