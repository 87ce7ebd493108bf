//! Configuration types for grantflow.
//!
//! All types in this module are self-contained with no dependencies on other
//! internal grantflow crates. Runtime settings are built from them at the
//! boundary. Every struct implements [`Default`] with the same values as the
//! embedded `defaults.toml`, so a bare `[section]` header in TOML produces a
//! working configuration.

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Event dispatch tuning.
    pub dispatcher: DispatcherSection,
    /// Confirmation dialog element IDs and labels.
    pub session: SessionSection,
    /// Request lifecycle policy.
    pub orchestrator: OrchestratorSection,
    /// Logging level, format, and per-crate directives.
    pub logging: LoggingSection,
}

// ---------------------------------------------------------------------------
// DispatcherSection
// ---------------------------------------------------------------------------

/// Event dispatcher configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatcherSection {
    /// Quiet window for field edits, in milliseconds. Only the last edit of
    /// a burst is handled once this much time passes without another one.
    pub debounce_ms: u64,
}

impl Default for DispatcherSection {
    fn default() -> Self {
        Self { debounce_ms: 500 }
    }
}

// ---------------------------------------------------------------------------
// SessionSection
// ---------------------------------------------------------------------------

/// Confirmation dialog configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSection {
    /// Element ID of the grant button.
    pub grant_button: String,
    /// Element ID of the cancel button.
    pub cancel_button: String,
    /// Element ID of the justification "show more" toggle.
    pub details_toggle: String,
    /// Dialog title.
    pub title: String,
}

impl Default for SessionSection {
    fn default() -> Self {
        Self {
            grant_button: "grant-button".to_owned(),
            cancel_button: "cancel-button".to_owned(),
            details_toggle: "show-more-button".to_owned(),
            title: "Permission request".to_owned(),
        }
    }
}

// ---------------------------------------------------------------------------
// OrchestratorSection
// ---------------------------------------------------------------------------

/// Request lifecycle configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorSection {
    /// Seconds to wait for the grantor before rejecting. `None` waits
    /// indefinitely.
    pub decision_timeout_secs: Option<u64>,
    /// Reason reported when the grantor cancels or dismisses the dialog.
    pub rejection_reason: String,
}

impl Default for OrchestratorSection {
    fn default() -> Self {
        Self {
            decision_timeout_secs: None,
            rejection_reason: "Permission request denied".to_owned(),
        }
    }
}

// ---------------------------------------------------------------------------
// LoggingSection
// ---------------------------------------------------------------------------

/// Logging and tracing configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Global log level filter (`"trace"`, `"debug"`, `"info"`, `"warn"`,
    /// `"error"`).
    pub level: String,
    /// Output format: `"pretty"`, `"compact"`, `"json"`, or `"full"`.
    pub format: String,
    /// Per-crate tracing directives (e.g. `["grantflow_events=debug"]`).
    pub directives: Vec<String>,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            format: "compact".to_owned(),
            directives: Vec::new(),
        }
    }
}
