//! Grantflow Core - Foundation types and traits for the permission confirmation flow.
//!
//! This crate provides:
//! - Identifiers shared by every layer (sessions, requests, UI elements, chains)
//! - The UI element tree exchanged with the host
//! - User-input events reported by the host
//! - The permission request data model
//! - The [`HostUi`] trait describing the host's dialog primitives
//!
//! Nothing in here knows how a confirmation is sequenced; that lives in
//! `grantflow-events` (dispatch) and `grantflow-approval` (sessions and the
//! request lifecycle).

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

pub mod error;
pub mod host;
pub mod input;
pub mod request;
pub mod types;
pub mod ui;

pub use error::{HostError, HostResult};
pub use host::{ArcHost, HostDecision, HostUi};
pub use input::{EventKind, HostNotification, InputValue, UserInputEvent};
pub use request::{PermissionPayload, PermissionRequest, RawPermissionRequest, Rule, SignerIdentity};
pub use types::{ChainId, ElementId, RequestId, SessionId, Timestamp};
pub use ui::UiElement;
