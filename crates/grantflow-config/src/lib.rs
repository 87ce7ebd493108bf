#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]
//! Layered configuration for grantflow.
//!
//! # Usage
//!
//! ```rust,no_run
//! use grantflow_config::Config;
//!
//! let config = Config::load(Some(std::path::Path::new("."))).unwrap();
//! println!("debounce window: {}ms", config.dispatcher.debounce_ms);
//! ```
//!
//! # Configuration Precedence
//!
//! From lowest to highest priority:
//!
//! 1. **Embedded defaults** (`defaults.toml` compiled into the binary)
//! 2. **User** (`~/.grantflow/config.toml`)
//! 3. **Workspace** (`{workspace}/.grantflow/config.toml`)
//! 4. **Environment variables** (`GRANTFLOW_DEBOUNCE_MS`,
//!    `GRANTFLOW_DECISION_TIMEOUT_SECS`, `GRANTFLOW_LOG_LEVEL`)
//!
//! # Design
//!
//! This crate has no dependencies on other internal grantflow crates.
//! Conversion from config sections to runtime settings happens in the crates
//! that consume them.

/// Environment variable overrides.
pub mod env;
/// Configuration error types.
pub mod error;
/// Configuration file discovery and loading.
pub mod loader;
/// Configuration struct definitions.
pub mod types;
/// Configuration validation rules.
pub mod validate;

pub use error::{ConfigError, ConfigResult};
pub use types::*;

impl Config {
    /// Load configuration with the full precedence chain.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if any config file is malformed or the final
    /// configuration fails validation.
    pub fn load(workspace_root: Option<&std::path::Path>) -> ConfigResult<Self> {
        loader::load(workspace_root, None)
    }

    /// Load configuration with an explicit home directory.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if any config file is malformed or the final
    /// configuration fails validation.
    pub fn load_with_home(
        workspace_root: Option<&std::path::Path>,
        home_dir: &std::path::Path,
    ) -> ConfigResult<Self> {
        loader::load(workspace_root, Some(home_dir))
    }
}
