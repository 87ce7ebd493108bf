//! Decisions and the outcome returned to the requester.

use serde::{Deserialize, Serialize};

use grantflow_core::{ChainId, PermissionPayload, Rule, SignerIdentity};
use grantflow_crypto::ContentHash;

/// Terminal outcome of one confirmation session.
///
/// The dialog only knows which button ended it, so
/// [`ConfirmationSession::await_decision`](crate::ConfirmationSession::await_decision)
/// yields `Decision<()>`. The orchestrator attaches the context the grantor
/// was shown before granting, turning it into `Decision<Arc<Context>>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision<C = ()> {
    /// The grantor granted; carries the state to grant from.
    Approved(C),
    /// The grantor cancelled or dismissed the dialog.
    Rejected {
        /// Why the request was rejected.
        reason: String,
    },
}

impl<C> Decision<C> {
    /// Whether the grantor granted.
    #[must_use]
    pub fn is_approved(&self) -> bool {
        matches!(self, Self::Approved(_))
    }

    /// The rejection reason, if rejected.
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Approved(_) => None,
            Self::Rejected { reason } => Some(reason),
        }
    }

    /// Transform the approved payload.
    pub fn map<D>(self, f: impl FnOnce(C) -> D) -> Decision<D> {
        match self {
            Self::Approved(c) => Decision::Approved(f(c)),
            Self::Rejected { reason } => Decision::Rejected { reason },
        }
    }
}

/// What a granted request hands back to the requester.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrantResponse {
    /// Chain the permission applies to.
    pub chain_id: ChainId,
    /// Grantor account address.
    pub address: String,
    /// Grantee.
    pub signer: SignerIdentity,
    /// The populated permission as granted (after any edits).
    pub permission: PermissionPayload<serde_json::Value>,
    /// Envelope expiry (unix seconds).
    pub expiry: u64,
    /// Rules of the granted request.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<Rule>,
    /// Hex-encoded signed authorization artifact.
    pub context: String,
    /// Domain-separated hash of the artifact bytes.
    pub artifact_hash: ContentHash,
    /// Grantor account metadata from the account provider.
    pub account_metadata: serde_json::Value,
}

/// Result of orchestrating one permission request.
#[derive(Debug, Clone, PartialEq)]
pub enum GrantOutcome {
    /// Granted and signed.
    Approved(Box<GrantResponse>),
    /// Not granted.
    Rejected {
        /// Why the request was rejected.
        reason: String,
    },
}

impl GrantOutcome {
    /// Whether the request was granted.
    #[must_use]
    pub fn is_approved(&self) -> bool {
        matches!(self, Self::Approved(_))
    }

    /// The response, if granted.
    #[must_use]
    pub fn response(&self) -> Option<&GrantResponse> {
        match self {
            Self::Approved(response) => Some(response),
            Self::Rejected { .. } => None,
        }
    }

    /// The rejection reason, if rejected.
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Approved(_) => None,
            Self::Rejected { reason } => Some(reason),
        }
    }
}
