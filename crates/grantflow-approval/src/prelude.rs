//! Prelude module - commonly used types for convenient import.
//!
//! Use `use grantflow_approval::prelude::*;` to import all essential types.

// Lifecycle
pub use crate::{ConfirmationSession, PendingRequest, PermissionOrchestrator};

// Collaborators
pub use crate::{AccountInfo, AccountProvider, AuthorizationSigner, KeyPairSigner, PermissionHandler};

// Outcomes
pub use crate::{Decision, GrantOutcome, GrantResponse};

// Restrictions and artifacts
pub use crate::{Authorization, Restriction, RestrictionBuilder, SignedAuthorization};

// Settings
pub use crate::{ApprovalSettings, DispatcherSettings, OrchestratorSettings, SessionSettings};

// Errors
pub use crate::{ApprovalError, ApprovalResult};
