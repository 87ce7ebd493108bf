//! Prelude module - commonly used types for convenient import.
//!
//! Use `use grantflow_core::prelude::*;` to import all essential types.

// Identifiers
pub use crate::{ChainId, ElementId, RequestId, SessionId, Timestamp};

// Host
pub use crate::{ArcHost, HostDecision, HostError, HostResult, HostUi};

// Input
pub use crate::{EventKind, HostNotification, InputValue, UserInputEvent};

// Requests
pub use crate::{PermissionPayload, PermissionRequest, RawPermissionRequest, Rule, SignerIdentity};

// UI
pub use crate::UiElement;
