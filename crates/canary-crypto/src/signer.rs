//! # Signing Capability
//!
//! The core only needs two operations: turn a message into signed text, and
//! turn signed text back into the message it vouches for. These traits are
//! that seam; [`Ed25519Signer`] and [`Ed25519Verifier`] implement them with
//! the clear-signed envelope.

use crate::ed25519::{Ed25519KeyPair, Ed25519PublicKey};
use crate::envelope;
use crate::error::CryptoError;

/// Produces signed text from a message.
pub trait Signer: Send + Sync {
    /// Sign `message`, returning the armored text.
    fn sign(&self, message: &[u8]) -> Result<String, CryptoError>;
}

/// Checks signed text and recovers the message. Fails closed.
pub trait Verifier: Send + Sync {
    /// Verify `signed` and return the message bytes it covers.
    fn verify(&self, signed: &str) -> Result<Vec<u8>, CryptoError>;

    /// Textual form of the trusted key, as published in status reports.
    fn public_key_text(&self) -> String;
}

/// Signs with an Ed25519 key pair.
#[derive(Debug)]
pub struct Ed25519Signer {
    key: Ed25519KeyPair,
}

impl Ed25519Signer {
    /// Sign with `key`.
    pub fn new(key: Ed25519KeyPair) -> Self {
        Self { key }
    }

    /// The key submissions signed by this signer must be checked against.
    pub fn public_key(&self) -> Ed25519PublicKey {
        self.key.public_key()
    }
}

impl Signer for Ed25519Signer {
    fn sign(&self, message: &[u8]) -> Result<String, CryptoError> {
        let text = std::str::from_utf8(message).map_err(|_| CryptoError::NotText)?;
        Ok(envelope::clear_sign(&self.key, text))
    }
}

/// Verifies against a single trusted Ed25519 public key.
#[derive(Debug, Clone)]
pub struct Ed25519Verifier {
    key: Ed25519PublicKey,
}

impl Ed25519Verifier {
    /// Trust only `key`.
    pub fn new(key: Ed25519PublicKey) -> Self {
        Self { key }
    }

    /// Load the trusted key from the hex text of a public key file.
    pub fn from_hex(hex: &str) -> Result<Self, CryptoError> {
        Ed25519PublicKey::from_hex(hex).map(Self::new)
    }

    /// The trusted key.
    pub fn public_key(&self) -> &Ed25519PublicKey {
        &self.key
    }
}

impl Verifier for Ed25519Verifier {
    fn verify(&self, signed: &str) -> Result<Vec<u8>, CryptoError> {
        envelope::open(&self.key, signed).map(String::into_bytes)
    }

    fn public_key_text(&self) -> String {
        self.key.to_hex()
    }
}
