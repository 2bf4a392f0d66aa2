//! # Proof Digests
//!
//! Content addressing for proof text. A canary links to its predecessor by
//! the SHA-256 of the predecessor's full signed proof text, and the proof
//! store names files by the same digest.

use sha2::{Digest, Sha256};

/// A SHA-256 digest of a proof's exact text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProofDigest([u8; 32]);

impl ProofDigest {
    /// Digest the exact bytes of a proof text.
    pub fn of(text: &str) -> Self {
        let hash = Sha256::digest(text.as_bytes());
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&hash);
        Self(bytes)
    }

    /// The raw 32 digest bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Render the digest as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }
}

impl std::fmt::Display for ProofDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Lowercase hex SHA-256 of a proof text.
pub fn sha256_hex(text: &str) -> String {
    ProofDigest::of(text).to_hex()
}
