//! Config file discovery and layered loading.
//!
//! 1. Parse `defaults.toml` → base
//! 2. Merge `~/.grantflow/config.toml` (user)
//! 3. Merge `{workspace}/.grantflow/config.toml` (workspace)
//! 4. Apply `GRANTFLOW_*` env var overrides
//! 5. Deserialize merged tree → `Config`
//! 6. Validate

use std::collections::HashMap;
use std::hash::BuildHasher;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::env::{apply_env_overrides, collect_env_vars};
use crate::error::{ConfigError, ConfigResult};
use crate::types::Config;
use crate::validate;

/// Embedded default configuration.
const DEFAULTS_TOML: &str = include_str!("defaults.toml");

/// Maximum allowed config file size (1 MB).
const MAX_CONFIG_FILE_SIZE: usize = 1_048_576;

/// Name of the per-user and per-workspace config directory.
const CONFIG_DIR: &str = ".grantflow";

/// Load the configuration with layered file precedence and the process
/// environment.
///
/// `workspace_root` is the root of the current project. If `None`, the
/// workspace layer is skipped. `home_override` replaces the user's home
/// directory for user-level discovery.
///
/// # Errors
///
/// Returns a [`ConfigError`] if any config file is malformed, or if the
/// final merged configuration fails validation.
pub fn load(workspace_root: Option<&Path>, home_override: Option<&Path>) -> ConfigResult<Config> {
    let home_dir = match home_override {
        Some(h) => h.to_path_buf(),
        None => home_directory()?,
    };
    load_layers(workspace_root, &home_dir, &collect_env_vars())
}

/// Load the configuration from explicit layers.
///
/// # Errors
///
/// Returns a [`ConfigError`] if any config file is malformed, an environment
/// value does not parse, or the final configuration fails validation.
pub fn load_layers<S: BuildHasher>(
    workspace_root: Option<&Path>,
    home_dir: &Path,
    env_vars: &HashMap<String, String, S>,
) -> ConfigResult<Config> {
    let mut merged: toml::Value =
        toml::from_str(DEFAULTS_TOML).map_err(|e| ConfigError::ParseError {
            path: "<embedded defaults>".to_owned(),
            source: e,
        })?;

    let user_path = home_dir.join(CONFIG_DIR).join("config.toml");
    if let Some(overlay) = try_load_file(&user_path)? {
        deep_merge(&mut merged, &overlay);
        info!(path = %user_path.display(), "loaded user config");
    }

    if let Some(ws_root) = workspace_root {
        let ws_path = ws_root.join(CONFIG_DIR).join("config.toml");
        if let Some(overlay) = try_load_file(&ws_path)? {
            deep_merge(&mut merged, &overlay);
            info!(path = %ws_path.display(), "loaded workspace config");
        }
    }

    let env_count = apply_env_overrides(&mut merged, env_vars)?;
    if env_count > 0 {
        debug!(count = env_count, "applied environment variable overrides");
    }

    let config: Config =
        merged
            .try_into()
            .map_err(|e: toml::de::Error| ConfigError::ParseError {
                path: "<merged config>".to_owned(),
                source: e,
            })?;

    validate::validate(&config)?;
    Ok(config)
}

/// Load a config from a specific file path (no layering, no environment).
///
/// # Errors
///
/// Returns a [`ConfigError`] if the file cannot be read, parsed or validated.
pub fn load_file(path: &Path) -> ConfigResult<Config> {
    let content = read_bounded(path)?;
    let config: Config = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
        path: path.display().to_string(),
        source: e,
    })?;
    validate::validate(&config)?;
    Ok(config)
}

/// Recursively deep-merge `overlay` into `base`.
///
/// Tables merge per key; scalars and arrays from the overlay replace the
/// base value.
pub fn deep_merge(base: &mut toml::Value, overlay: &toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                if let Some(base_val) = base_table.get_mut(key) {
                    deep_merge(base_val, overlay_val);
                } else {
                    base_table.insert(key.clone(), overlay_val.clone());
                }
            }
        },
        (base, overlay) => {
            *base = overlay.clone();
        },
    }
}

fn read_bounded(path: &Path) -> ConfigResult<String> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.display().to_string(),
        source: e,
    })?;
    if content.len() > MAX_CONFIG_FILE_SIZE {
        return Err(ConfigError::Invalid {
            field: path.display().to_string(),
            reason: format!(
                "config file is {} bytes, exceeding the {MAX_CONFIG_FILE_SIZE} byte limit",
                content.len()
            ),
        });
    }
    Ok(content)
}

/// Try to load a file, returning `None` if it doesn't exist.
fn try_load_file(path: &Path) -> ConfigResult<Option<toml::Value>> {
    let content = match read_bounded(path) {
        Ok(c) => c,
        Err(ConfigError::ReadError { source, .. })
            if source.kind() == std::io::ErrorKind::NotFound =>
        {
            debug!(path = %path.display(), "config file not found, skipping");
            return Ok(None);
        },
        Err(e) => return Err(e),
    };

    let value: toml::Value = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
        path: path.display().to_string(),
        source: e,
    })?;
    Ok(Some(value))
}

fn home_directory() -> ConfigResult<PathBuf> {
    directories::BaseDirs::new()
        .map(|d| d.home_dir().to_path_buf())
        .ok_or(ConfigError::NoHomeDir)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(root: &Path, body: &str) {
        let dir = root.join(CONFIG_DIR);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("config.toml"), body).unwrap();
    }

    fn no_env() -> HashMap<String, String> {
        HashMap::new()
    }

    #[test]
    fn test_defaults_deserialize_to_default_config() {
        let config: Config = toml::from_str(DEFAULTS_TOML).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_without_files() {
        let home = tempfile::tempdir().unwrap();
        let config = load_layers(None, home.path(), &no_env()).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_workspace_overrides_user() {
        let home = tempfile::tempdir().unwrap();
        let workspace = tempfile::tempdir().unwrap();
        write_config(
            home.path(),
            "[dispatcher]\ndebounce_ms = 300\n[session]\ntitle = \"From user\"\n",
        );
        write_config(workspace.path(), "[dispatcher]\ndebounce_ms = 200\n");

        let config = load_layers(Some(workspace.path()), home.path(), &no_env()).unwrap();
        assert_eq!(config.dispatcher.debounce_ms, 200);
        assert_eq!(config.session.title, "From user");
        assert_eq!(config.session.grant_button, "grant-button");
    }

    #[test]
    fn test_env_overrides_files() {
        let home = tempfile::tempdir().unwrap();
        write_config(
            home.path(),
            "[orchestrator]\ndecision_timeout_secs = 120\n",
        );
        let env = HashMap::from([
            ("GRANTFLOW_DECISION_TIMEOUT_SECS".to_owned(), "45".to_owned()),
            ("GRANTFLOW_LOG_LEVEL".to_owned(), "debug".to_owned()),
        ]);

        let config = load_layers(None, home.path(), &env).unwrap();
        assert_eq!(config.orchestrator.decision_timeout_secs, Some(45));
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_invalid_merged_value_fails_validation() {
        let home = tempfile::tempdir().unwrap();
        write_config(home.path(), "[dispatcher]\ndebounce_ms = 0\n");
        let err = load_layers(None, home.path(), &no_env()).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let home = tempfile::tempdir().unwrap();
        write_config(home.path(), "[dispatcher\n");
        let err = load_layers(None, home.path(), &no_env()).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn test_load_file_nonexistent() {
        let result = load_file(Path::new("/nonexistent/config.toml"));
        assert!(matches!(result, Err(ConfigError::ReadError { .. })));
    }

    #[test]
    fn test_try_load_file_missing() {
        assert!(
            try_load_file(Path::new("/nonexistent/config.toml"))
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn test_oversized_config_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("huge.toml");
        let data = format!("x = \"{}\"", "a".repeat(1_100_000));
        std::fs::write(&file_path, data).unwrap();

        assert!(matches!(
            try_load_file(&file_path),
            Err(ConfigError::Invalid { .. })
        ));
    }

    #[test]
    fn test_deep_merge_replaces_arrays() {
        let mut base: toml::Value =
            toml::from_str("[logging]\ndirectives = [\"a=debug\"]\nlevel = \"info\"\n").unwrap();
        let overlay: toml::Value = toml::from_str("[logging]\ndirectives = [\"b=trace\"]\n").unwrap();
        deep_merge(&mut base, &overlay);

        let config: Config = base.try_into().unwrap();
        assert_eq!(config.logging.directives, vec!["b=trace"]);
        assert_eq!(config.logging.level, "info");
    }
}
