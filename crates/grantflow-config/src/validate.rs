//! Post-merge configuration validation.

use crate::error::{ConfigError, ConfigResult};
use crate::types::Config;

/// Largest accepted debounce window (10 seconds).
const MAX_DEBOUNCE_MS: u64 = 10_000;

fn invalid(field: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field: field.to_owned(),
        reason: reason.into(),
    }
}

/// Validate a fully-merged and deserialized configuration.
///
/// # Errors
///
/// Returns the first validation error found.
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_dispatcher(config)?;
    validate_session(config)?;
    validate_orchestrator(config)?;
    validate_logging(config)?;
    Ok(())
}

fn validate_dispatcher(config: &Config) -> ConfigResult<()> {
    let ms = config.dispatcher.debounce_ms;
    if ms == 0 || ms > MAX_DEBOUNCE_MS {
        return Err(invalid(
            "dispatcher.debounce_ms",
            format!("must be between 1 and {MAX_DEBOUNCE_MS}, got {ms}"),
        ));
    }
    Ok(())
}

fn validate_session(config: &Config) -> ConfigResult<()> {
    let s = &config.session;
    let ids = [
        ("session.grant_button", &s.grant_button),
        ("session.cancel_button", &s.cancel_button),
        ("session.details_toggle", &s.details_toggle),
    ];

    for (field, id) in ids {
        if id.trim().is_empty() {
            return Err(invalid(field, "element id must not be empty"));
        }
    }
    for (i, (field, id)) in ids.iter().enumerate() {
        if ids.iter().skip(i.saturating_add(1)).any(|(_, other)| other == id) {
            return Err(invalid(field, format!("element id '{id}' is used twice")));
        }
    }

    if s.title.trim().is_empty() {
        return Err(invalid("session.title", "must not be empty"));
    }
    Ok(())
}

fn validate_orchestrator(config: &Config) -> ConfigResult<()> {
    let o = &config.orchestrator;
    if o.decision_timeout_secs == Some(0) {
        return Err(invalid(
            "orchestrator.decision_timeout_secs",
            "must be positive; omit it to wait indefinitely",
        ));
    }
    if o.rejection_reason.trim().is_empty() {
        return Err(invalid("orchestrator.rejection_reason", "must not be empty"));
    }
    Ok(())
}

fn validate_logging(config: &Config) -> ConfigResult<()> {
    let l = &config.logging;
    if !matches!(
        l.level.to_ascii_lowercase().as_str(),
        "trace" | "debug" | "info" | "warn" | "error"
    ) {
        return Err(invalid(
            "logging.level",
            format!(
                "unsupported level '{}'; expected one of: trace, debug, info, warn, error",
                l.level
            ),
        ));
    }
    if !matches!(l.format.as_str(), "pretty" | "compact" | "json" | "full") {
        return Err(invalid(
            "logging.format",
            format!(
                "unsupported format '{}'; expected one of: pretty, compact, json, full",
                l.format
            ),
        ));
    }
    Ok(())
}
