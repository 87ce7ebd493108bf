//! Grantflow Approval - Confirmation sessions and the permission request lifecycle.
//!
//! This crate provides:
//! - [`ConfirmationSession`], which owns one host dialog and produces exactly
//!   one [`Decision`]
//! - [`PermissionOrchestrator`], the state machine taking a raw request
//!   through skeleton, context resolution, edits and decision to a signed
//!   [`GrantResponse`]
//! - The collaborator interfaces a permission type plugs in
//!   ([`PermissionHandler`], [`AccountProvider`], [`AuthorizationSigner`])
//! - [`RestrictionBuilder`] and the [`Authorization`] artifact with a
//!   reference ed25519 signer
//!
//! # Lifecycle
//!
//! ```text
//! Init → SkeletonShown → ContextResolving → Interactive → Resolving → Terminal
//! ```
//!
//! Validation failures never open a dialog. Cancel, dismissal and timeout
//! are ordinary rejections. Failures after the grant press (account lookup,
//! restrictions, signing) propagate to the caller unchanged.
//!
//! # Example
//!
//! ```rust,ignore
//! use grantflow_approval::prelude::*;
//!
//! let orchestrator = PermissionOrchestrator::new(handler, host, dispatcher, accounts, signer)
//!     .with_settings(OrchestratorSettings::from(&config));
//! match orchestrator.orchestrate(request).await? {
//!     GrantOutcome::Approved(response) => deliver(response),
//!     GrantOutcome::Rejected { reason } => tracing::info!(%reason, "not granted"),
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

pub mod authorization;
pub mod decision;
pub mod error;
pub mod orchestrator;
pub mod permission;
pub mod restriction;
pub mod session;
pub mod settings;

#[cfg(test)]
mod test_support;

pub use authorization::{
    Authorization, AuthorizationSigner, KeyPairSigner, ROOT_AUTHORITY, SignedAuthorization,
};
pub use decision::{Decision, GrantOutcome, GrantResponse};
pub use error::{ApprovalError, ApprovalResult};
pub use orchestrator::{PendingRequest, PermissionOrchestrator, TIMEOUT_REASON};
pub use permission::{AccountInfo, AccountProvider, PermissionHandler};
pub use restriction::{MAX_RESTRICTIONS, Restriction, RestrictionBuilder};
pub use session::{ConfirmationSession, JUSTIFICATION_PREVIEW_CHARS, UiState};
pub use settings::{ApprovalSettings, DispatcherSettings, OrchestratorSettings, SessionSettings};
