//! Environment variable overrides.
//!
//! `GRANTFLOW_*` variables are the last layer: a variable that is set wins
//! over every config file.

use std::collections::HashMap;
use std::hash::BuildHasher;

use tracing::debug;

use crate::error::{ConfigError, ConfigResult};

#[derive(Clone, Copy)]
enum ValueKind {
    Integer,
    String,
}

/// Mapping from environment variable name to config field path.
struct EnvMapping {
    var_name: &'static str,
    section: &'static str,
    key: &'static str,
    kind: ValueKind,
}

const ENV_MAPPINGS: &[EnvMapping] = &[
    EnvMapping {
        var_name: "GRANTFLOW_DEBOUNCE_MS",
        section: "dispatcher",
        key: "debounce_ms",
        kind: ValueKind::Integer,
    },
    EnvMapping {
        var_name: "GRANTFLOW_DECISION_TIMEOUT_SECS",
        section: "orchestrator",
        key: "decision_timeout_secs",
        kind: ValueKind::Integer,
    },
    EnvMapping {
        var_name: "GRANTFLOW_LOG_LEVEL",
        section: "logging",
        key: "level",
        kind: ValueKind::String,
    },
];

/// Snapshot the process environment.
#[must_use]
pub fn collect_env_vars() -> HashMap<String, String> {
    std::env::vars()
        .filter(|(k, _)| k.starts_with("GRANTFLOW_"))
        .collect()
}

/// Write every set `GRANTFLOW_*` variable into the merged tree.
///
/// Returns the number of variables applied.
///
/// # Errors
///
/// Returns [`ConfigError::Invalid`] if a numeric variable does not parse.
pub fn apply_env_overrides<S: BuildHasher>(
    merged: &mut toml::Value,
    env_vars: &HashMap<String, String, S>,
) -> ConfigResult<usize> {
    let mut count: usize = 0;

    for mapping in ENV_MAPPINGS {
        let Some(raw) = env_vars.get(mapping.var_name) else {
            continue;
        };

        let value = match mapping.kind {
            ValueKind::String => toml::Value::String(raw.clone()),
            ValueKind::Integer => {
                let parsed: i64 = raw.trim().parse().map_err(|_| ConfigError::Invalid {
                    field: mapping.var_name.to_owned(),
                    reason: format!("expected a non-negative integer, got '{raw}'"),
                })?;
                if parsed < 0 {
                    return Err(ConfigError::Invalid {
                        field: mapping.var_name.to_owned(),
                        reason: format!("expected a non-negative integer, got '{raw}'"),
                    });
                }
                toml::Value::Integer(parsed)
            },
        };

        let Some(root) = merged.as_table_mut() else {
            continue;
        };
        let section = root
            .entry(mapping.section)
            .or_insert(toml::Value::Table(toml::map::Map::new()));
        if let Some(table) = section.as_table_mut() {
            debug!(
                var = mapping.var_name,
                field = %format!("{}.{}", mapping.section, mapping.key),
                "applying env var override"
            );
            table.insert(mapping.key.to_owned(), value);
            count = count.saturating_add(1);
        }
    }

    Ok(count)
}
