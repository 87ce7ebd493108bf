//! Prelude module - commonly used types for convenient import.
//!
//! Use `use grantflow_telemetry::prelude::*;` to import all essential types.

pub use crate::{LogConfig, LogFormat, LogTarget, RequestContext, setup_logging};

pub use crate::{TelemetryError, TelemetryResult};
