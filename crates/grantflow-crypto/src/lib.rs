//! Grantflow Crypto - Signing and hashing primitives.
//!
//! This crate provides:
//! - Ed25519 key pairs whose secret half is zeroized on drop
//! - Hex-encoded signatures and public keys
//! - BLAKE3 content hashing with domain separation
//!
//! The confirmation flow itself is agnostic to the signing scheme; these
//! primitives back the reference authorization signer.
//!
//! # Example
//!
//! ```
//! use grantflow_crypto::{ContentHash, KeyPair};
//!
//! let keypair = KeyPair::generate();
//! let signature = keypair.sign(b"authorization");
//! assert!(keypair.verify(b"authorization", &signature).is_ok());
//!
//! let hash = ContentHash::hash_with_domain("grantflow-authorization", b"authorization");
//! assert_eq!(hash.to_hex().len(), 64);
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

mod error;
mod hash;
mod keypair;
mod signature;

pub use error::{CryptoError, CryptoResult};
pub use hash::ContentHash;
pub use keypair::{KeyPair, PublicKey};
pub use signature::Signature;
