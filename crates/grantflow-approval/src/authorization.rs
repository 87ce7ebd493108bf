//! The signed authorization artifact.
//!
//! An [`Authorization`] delegates the granted permission from the grantor
//! (delegator) to the grantee (delegate), scoped by an ordered restriction
//! set. The bytes that get signed are a versioned, length-prefixed encoding
//! of every field, so two authorizations differing in any field never share
//! a signature.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use grantflow_core::ChainId;
use grantflow_crypto::{ContentHash, KeyPair, PublicKey, Signature};

use crate::error::{ApprovalError, ApprovalResult};
use crate::restriction::Restriction;

/// Current signing data format version.
const SIGNING_DATA_VERSION: u8 = 0x01;

/// Domain used when hashing encoded artifacts.
const ARTIFACT_HASH_DOMAIN: &str = "grantflow 2026 authorization artifact v1";

/// Authority of an authorization that is not derived from another one.
pub const ROOT_AUTHORITY: &str =
    "0xffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff";

/// Encode a length as the 4-byte little-endian prefix.
fn length_prefix(len: usize, what: &str) -> ApprovalResult<[u8; 4]> {
    u32::try_from(len)
        .map(u32::to_le_bytes)
        .map_err(|_| ApprovalError::Restriction(format!("{what} too long to encode: {len}")))
}

/// Write a length-prefixed byte slice to the output buffer.
///
/// Format: 4-byte little-endian length followed by the data.
fn write_length_prefixed(data: &mut Vec<u8>, bytes: &[u8], what: &str) -> ApprovalResult<()> {
    data.extend_from_slice(&length_prefix(bytes.len(), what)?);
    data.extend_from_slice(bytes);
    Ok(())
}

/// An unsigned delegation of a permission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Authorization {
    /// Chain the authorization is valid on.
    pub chain_id: ChainId,
    /// Grantee address.
    pub delegate: String,
    /// Grantor address.
    pub delegator: String,
    /// Parent authority ([`ROOT_AUTHORITY`] for a fresh grant).
    pub authority: String,
    /// Scoping restrictions, in enforcement order.
    pub restrictions: Vec<Restriction>,
    /// Random salt making otherwise identical grants distinct.
    pub salt: u64,
}

impl Authorization {
    /// Create a root authorization with a random salt.
    #[must_use]
    pub fn new(
        chain_id: ChainId,
        delegate: impl Into<String>,
        delegator: impl Into<String>,
        restrictions: Vec<Restriction>,
    ) -> Self {
        Self {
            chain_id,
            delegate: delegate.into(),
            delegator: delegator.into(),
            authority: ROOT_AUTHORITY.to_owned(),
            restrictions,
            salt: rand::random(),
        }
    }

    /// The bytes a signer signs.
    ///
    /// # Errors
    ///
    /// Returns [`ApprovalError::Restriction`] if a field or the restriction
    /// count does not fit its 32-bit length prefix.
    pub fn signing_data(&self) -> ApprovalResult<Vec<u8>> {
        let mut data = Vec::with_capacity(256);

        data.push(SIGNING_DATA_VERSION);
        data.extend_from_slice(&self.chain_id.0.to_le_bytes());
        write_length_prefixed(&mut data, self.delegate.as_bytes(), "delegate")?;
        write_length_prefixed(&mut data, self.delegator.as_bytes(), "delegator")?;
        write_length_prefixed(&mut data, self.authority.as_bytes(), "authority")?;

        data.extend_from_slice(&length_prefix(self.restrictions.len(), "restriction set")?);
        for restriction in &self.restrictions {
            write_length_prefixed(&mut data, restriction.enforcer.as_bytes(), "enforcer")?;
            write_length_prefixed(&mut data, &restriction.terms, "restriction terms")?;
        }

        data.extend_from_slice(&self.salt.to_le_bytes());
        Ok(data)
    }
}

/// An authorization plus the grantor's signature over its signing data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedAuthorization {
    /// The signed authorization.
    pub authorization: Authorization,
    /// Key that produced the signature.
    pub signer: PublicKey,
    /// Signature over [`Authorization::signing_data`].
    pub signature: Signature,
}

impl SignedAuthorization {
    /// Check the signature.
    ///
    /// # Errors
    ///
    /// Returns [`ApprovalError::Signing`] if the signature does not verify,
    /// or [`ApprovalError::Restriction`] if the authorization cannot be
    /// encoded.
    pub fn verify(&self) -> ApprovalResult<()> {
        self.signer
            .verify(&self.authorization.signing_data()?, &self.signature)
            .map_err(|e| ApprovalError::Signing(e.to_string()))
    }

    /// Encoded artifact: signing data, then the 32-byte key, then the
    /// 64-byte signature.
    ///
    /// # Errors
    ///
    /// See [`Authorization::signing_data`].
    pub fn encode(&self) -> ApprovalResult<Vec<u8>> {
        let mut data = self.authorization.signing_data()?;
        data.extend_from_slice(self.signer.as_bytes());
        data.extend_from_slice(self.signature.as_bytes());
        Ok(data)
    }

    /// Domain-separated hash of [`SignedAuthorization::encode`].
    ///
    /// # Errors
    ///
    /// See [`Authorization::signing_data`].
    pub fn artifact_hash(&self) -> ApprovalResult<ContentHash> {
        Ok(ContentHash::hash_with_domain(ARTIFACT_HASH_DOMAIN, &self.encode()?))
    }
}

/// Signs authorizations on behalf of the grantor.
#[async_trait]
pub trait AuthorizationSigner: Send + Sync {
    /// Sign `authorization`.
    async fn sign(&self, authorization: Authorization) -> ApprovalResult<SignedAuthorization>;
}

/// Reference signer holding an ed25519 key in memory.
#[derive(Debug)]
pub struct KeyPairSigner {
    key: KeyPair,
}

impl KeyPairSigner {
    /// Sign with `key`.
    #[must_use]
    pub fn new(key: KeyPair) -> Self {
        Self { key }
    }

    /// The signer's public key.
    #[must_use]
    pub fn public_key(&self) -> PublicKey {
        self.key.public_key()
    }
}

#[async_trait]
impl AuthorizationSigner for KeyPairSigner {
    async fn sign(&self, authorization: Authorization) -> ApprovalResult<SignedAuthorization> {
        let signature = self.key.sign(&authorization.signing_data()?);
        Ok(SignedAuthorization {
            authorization,
            signer: self.key.public_key(),
            signature,
        })
    }
}
