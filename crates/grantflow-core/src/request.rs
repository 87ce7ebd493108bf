//! Permission request data model.
//!
//! A requester describes the capability it wants as a [`PermissionRequest`].
//! The envelope (chain, grantee, expiry, rules, adjustability) is understood
//! by the confirmation flow; the permission payload `P` is opaque to it and
//! only interpreted by the permission type's own rules.

use serde::{Deserialize, Serialize};

use crate::types::ChainId;

/// Identity of the grantee that will exercise the permission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum SignerIdentity {
    /// An account address.
    Account {
        /// The grantee's address.
        address: String,
    },
}

impl SignerIdentity {
    /// Create an account signer.
    #[must_use]
    pub fn account(address: impl Into<String>) -> Self {
        Self::Account {
            address: address.into(),
        }
    }

    /// The grantee's address.
    #[must_use]
    pub fn address(&self) -> &str {
        match self {
            Self::Account { address } => address,
        }
    }
}

/// Auxiliary rule attached to a request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    /// Rule type tag (e.g. `"expiry"`).
    #[serde(rename = "type")]
    pub rule_type: String,
    /// Rule-specific data.
    #[serde(default)]
    pub data: serde_json::Value,
}

impl Rule {
    /// Type tag of expiry rules.
    pub const EXPIRY: &'static str = "expiry";

    /// Create an expiry rule for a unix timestamp (seconds).
    #[must_use]
    pub fn expiry(timestamp: u64) -> Self {
        Self {
            rule_type: Self::EXPIRY.to_owned(),
            data: serde_json::json!({ "timestamp": timestamp }),
        }
    }

    /// The timestamp of an expiry rule, `None` for other rules.
    #[must_use]
    pub fn expiry_timestamp(&self) -> Option<u64> {
        if self.rule_type != Self::EXPIRY {
            return None;
        }
        self.data.get("timestamp").and_then(serde_json::Value::as_u64)
    }
}

/// The typed permission payload of a request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PermissionPayload<P> {
    /// Permission type tag (e.g. `"token-stream"`).
    #[serde(rename = "type")]
    pub permission_type: String,
    /// Type-specific data.
    pub data: P,
    /// Requester-supplied explanation shown to the grantor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub justification: Option<String>,
}

/// A requester's description of the capability it wants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionRequest<P = serde_json::Value> {
    /// Chain the permission applies to.
    pub chain_id: ChainId,
    /// Who receives the permission.
    pub signer: SignerIdentity,
    /// Unix timestamp (seconds) after which the permission is void.
    pub expiry: u64,
    /// The typed permission payload.
    pub permission: PermissionPayload<P>,
    /// Auxiliary rules.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<Rule>,
    /// Whether the grantor may edit values before granting.
    pub is_adjustment_allowed: bool,
}

/// A request as received from the requester, before type-specific validation.
pub type RawPermissionRequest = PermissionRequest<serde_json::Value>;

impl<P> PermissionRequest<P> {
    /// The permission type tag.
    #[must_use]
    pub fn permission_type(&self) -> &str {
        &self.permission.permission_type
    }

    /// The requester's justification, if any.
    #[must_use]
    pub fn justification(&self) -> Option<&str> {
        self.permission.justification.as_deref()
    }

    /// The earliest of the envelope expiry and any expiry rule.
    #[must_use]
    pub fn effective_expiry(&self) -> u64 {
        self.rules
            .iter()
            .filter_map(Rule::expiry_timestamp)
            .fold(self.expiry, u64::min)
    }

    /// Replace the permission data, keeping the envelope.
    #[must_use]
    pub fn with_data<Q>(self, data: Q) -> PermissionRequest<Q> {
        PermissionRequest {
            chain_id: self.chain_id,
            signer: self.signer,
            expiry: self.expiry,
            permission: PermissionPayload {
                permission_type: self.permission.permission_type,
                data,
                justification: self.permission.justification,
            },
            rules: self.rules,
            is_adjustment_allowed: self.is_adjustment_allowed,
        }
    }

    /// Convert the permission data, keeping the envelope.
    ///
    /// # Errors
    ///
    /// Returns whatever error `f` produces.
    pub fn try_map_data<Q, E>(
        self,
        f: impl FnOnce(P) -> Result<Q, E>,
    ) -> Result<PermissionRequest<Q>, E> {
        let PermissionRequest {
            chain_id,
            signer,
            expiry,
            permission,
            rules,
            is_adjustment_allowed,
        } = self;
        Ok(PermissionRequest {
            chain_id,
            signer,
            expiry,
            permission: PermissionPayload {
                permission_type: permission.permission_type,
                data: f(permission.data)?,
                justification: permission.justification,
            },
            rules,
            is_adjustment_allowed,
        })
    }
}
