//! Restrictions scoping a granted authorization.
//!
//! The terms of a restriction are opaque bytes produced by whoever
//! understands the permission type. The confirmation flow only decides the
//! order: type-specific restrictions first, the expiry restriction last.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{ApprovalError, ApprovalResult};

/// Maximum number of restrictions on one authorization.
pub const MAX_RESTRICTIONS: usize = 32;

/// One scoping constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Restriction {
    /// Name of the enforcer that interprets `terms`.
    pub enforcer: String,
    /// Enforcer-specific encoded terms.
    #[serde(serialize_with = "terms_to_hex", deserialize_with = "terms_from_hex")]
    pub terms: Vec<u8>,
}

impl Restriction {
    /// Enforcer name of the expiry restriction.
    pub const EXPIRY_ENFORCER: &'static str = "expiry";

    /// Create a restriction.
    #[must_use]
    pub fn new(enforcer: impl Into<String>, terms: impl Into<Vec<u8>>) -> Self {
        Self {
            enforcer: enforcer.into(),
            terms: terms.into(),
        }
    }

    /// Restriction voiding the authorization after `timestamp` (unix seconds).
    ///
    /// Terms are the timestamp as 8 big-endian bytes.
    #[must_use]
    pub fn expiry(timestamp: u64) -> Self {
        Self::new(Self::EXPIRY_ENFORCER, timestamp.to_be_bytes().to_vec())
    }

    /// The timestamp of an expiry restriction, `None` for any other.
    #[must_use]
    pub fn expiry_timestamp(&self) -> Option<u64> {
        if self.enforcer != Self::EXPIRY_ENFORCER {
            return None;
        }
        let bytes: [u8; 8] = self.terms.as_slice().try_into().ok()?;
        Some(u64::from_be_bytes(bytes))
    }
}

fn terms_to_hex<S: Serializer>(terms: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format!("0x{}", hex::encode(terms)))
}

fn terms_from_hex<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
    let s = String::deserialize(deserializer)?;
    hex::decode(s.strip_prefix("0x").unwrap_or(&s)).map_err(serde::de::Error::custom)
}

/// Ordered collection of restrictions under construction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestrictionBuilder {
    restrictions: Vec<Restriction>,
}

impl RestrictionBuilder {
    /// Create an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a restriction.
    ///
    /// # Errors
    ///
    /// Returns [`ApprovalError::Restriction`] if the enforcer name is empty
    /// or the builder already holds [`MAX_RESTRICTIONS`].
    pub fn push(&mut self, restriction: Restriction) -> ApprovalResult<()> {
        if restriction.enforcer.trim().is_empty() {
            return Err(ApprovalError::Restriction(
                "restriction enforcer must not be empty".to_owned(),
            ));
        }
        if self.restrictions.len() >= MAX_RESTRICTIONS {
            return Err(ApprovalError::Restriction(format!(
                "at most {MAX_RESTRICTIONS} restrictions are allowed"
            )));
        }
        self.restrictions.push(restriction);
        Ok(())
    }

    /// Append a restriction, builder style.
    ///
    /// # Errors
    ///
    /// See [`RestrictionBuilder::push`].
    pub fn with(mut self, restriction: Restriction) -> ApprovalResult<Self> {
        self.push(restriction)?;
        Ok(self)
    }

    /// Number of restrictions so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.restrictions.len()
    }

    /// Whether no restriction was added yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.restrictions.is_empty()
    }

    /// The restrictions in insertion order.
    #[must_use]
    pub fn restrictions(&self) -> &[Restriction] {
        &self.restrictions
    }

    /// Finish building.
    #[must_use]
    pub fn build(self) -> Vec<Restriction> {
        self.restrictions
    }
}
