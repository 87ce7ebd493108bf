//! Grantflow Test - Shared test utilities for grantflow.
//!
//! This crate provides mock implementations of the host and collaborator
//! interfaces, a reference permission type, and request fixtures that can be
//! used across grantflow crates as a dev-dependency.
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! grantflow-test.workspace = true
//! ```
//!
//! ```rust,ignore
//! use grantflow_test::{MockHost, MockAccountProvider, RecordingSigner, TokenStreamHandler};
//!
//! #[tokio::test]
//! async fn test_grant() {
//!     let host = MockHost::new();
//!     let handler = TokenStreamHandler::new();
//!     let probe = handler.probe();
//!     // build an orchestrator around `host` and `handler`...
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod prelude;

pub mod fixtures;
pub mod mocks;
pub mod token_stream;

pub use fixtures::*;
pub use mocks::*;
pub use token_stream::*;
