//! Grantflow Telemetry - Logging and request tracing.
//!
//! This crate provides:
//! - Configurable logging setup with multiple formats and targets
//! - [`RequestContext`] for correlating everything logged while one
//!   permission request is confirmed
//!
//! # Example
//!
//! ```rust,no_run
//! use grantflow_telemetry::{LogConfig, LogFormat, RequestContext, setup_logging};
//!
//! # fn main() -> Result<(), grantflow_telemetry::TelemetryError> {
//! let config = LogConfig::new("debug")
//!     .with_format(LogFormat::Pretty)
//!     .with_directive("grantflow_events=trace");
//! setup_logging(&config)?;
//!
//! let ctx = RequestContext::new().with_permission_type("token-stream");
//! let _entered = ctx.span().entered();
//! tracing::info!("confirming permission");
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod context;
mod error;
mod logging;

pub use context::RequestContext;
pub use error::{TelemetryError, TelemetryResult};
pub use logging::{
    FileRotation, LogConfig, LogFormat, LogTarget, setup_default_logging, setup_logging,
};
