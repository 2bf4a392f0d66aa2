//! # Ed25519 Keys and Signatures
//!
//! Key generation, hex (de)serialization, and raw signing/verification over
//! message bytes. The armored envelope built on top of these lives in
//! [`crate::envelope`].
//!
//! ## Security Invariant
//!
//! - Private keys are never serialized or logged. `Ed25519KeyPair` has a
//!   redacted `Debug` and exposes its seed only as a zeroizing hex string
//!   for writing key files.
//! - Key files are lowercase hex: 64 characters for either half.

use ed25519_dalek::{Signer as _, Verifier as _};
use zeroize::Zeroizing;

use crate::error::CryptoError;

/// An Ed25519 public key (32 bytes).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ed25519PublicKey([u8; 32]);

/// An Ed25519 signature (64 bytes).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ed25519Signature([u8; 64]);

/// An Ed25519 key pair for signing proofs.
pub struct Ed25519KeyPair {
    signing_key: ed25519_dalek::SigningKey,
}

// ---------------------------------------------------------------------------
// Ed25519PublicKey impls
// ---------------------------------------------------------------------------

impl Ed25519PublicKey {
    /// Return the raw 32-byte public key.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Render the public key as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        to_hex(&self.0)
    }

    /// Parse a public key from a 64-character hex string.
    ///
    /// Surrounding whitespace is ignored, so key files may end in a newline.
    pub fn from_hex(hex: &str) -> Result<Self, CryptoError> {
        let bytes = hex_to_array::<32>(hex).map_err(CryptoError::KeyError)?;
        ed25519_dalek::VerifyingKey::from_bytes(&bytes)
            .map_err(|e| CryptoError::KeyError(format!("invalid public key: {e}")))?;
        Ok(Self(bytes))
    }

    /// Verify `signature` over `message`.
    pub fn verify(&self, message: &[u8], signature: &Ed25519Signature) -> Result<(), CryptoError> {
        let vk = ed25519_dalek::VerifyingKey::from_bytes(&self.0)
            .map_err(|e| CryptoError::KeyError(format!("invalid public key: {e}")))?;
        let sig = ed25519_dalek::Signature::from_bytes(&signature.0);
        vk.verify(message, &sig)
            .map_err(|e| CryptoError::VerificationFailed(format!("Ed25519: {e}")))
    }
}

impl std::fmt::Debug for Ed25519PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Ed25519PublicKey({}...)", to_hex(&self.0[..4]))
    }
}

impl std::fmt::Display for Ed25519PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

// ---------------------------------------------------------------------------
// Ed25519Signature impls
// ---------------------------------------------------------------------------

impl Ed25519Signature {
    /// Render the signature as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        to_hex(&self.0)
    }

    /// Parse a signature from a 128-character hex string.
    pub fn from_hex(hex: &str) -> Result<Self, CryptoError> {
        hex_to_array::<64>(hex)
            .map(Self)
            .map_err(CryptoError::VerificationFailed)
    }
}

impl std::fmt::Debug for Ed25519Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Ed25519Signature({}...)", to_hex(&self.0[..4]))
    }
}

// ---------------------------------------------------------------------------
// Ed25519KeyPair impls
// ---------------------------------------------------------------------------

impl Ed25519KeyPair {
    /// Generate a new random key pair.
    pub fn generate() -> Self {
        let mut csprng = rand::rngs::OsRng;
        Self {
            signing_key: ed25519_dalek::SigningKey::generate(&mut csprng),
        }
    }

    /// Create a key pair from a raw 32-byte seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self {
            signing_key: ed25519_dalek::SigningKey::from_bytes(seed),
        }
    }

    /// Load a key pair from the hex seed stored in a private key file.
    pub fn from_hex(hex: &str) -> Result<Self, CryptoError> {
        let seed = Zeroizing::new(hex_to_array::<32>(hex).map_err(CryptoError::KeyError)?);
        Ok(Self::from_seed(&seed))
    }

    /// The seed as lowercase hex, for writing a private key file.
    pub fn secret_hex(&self) -> Zeroizing<String> {
        let seed = Zeroizing::new(self.signing_key.to_bytes());
        Zeroizing::new(to_hex(&seed[..]))
    }

    /// The public half.
    pub fn public_key(&self) -> Ed25519PublicKey {
        Ed25519PublicKey(self.signing_key.verifying_key().to_bytes())
    }

    /// Sign raw message bytes.
    pub fn sign(&self, message: &[u8]) -> Ed25519Signature {
        Ed25519Signature(self.signing_key.sign(message).to_bytes())
    }
}

impl std::fmt::Debug for Ed25519KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Ed25519KeyPair(<private>)")
    }
}

// ---------------------------------------------------------------------------
// Hex utilities (no external hex crate dependency)
// ---------------------------------------------------------------------------

pub(crate) fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn hex_to_array<const N: usize>(hex: &str) -> Result<[u8; N], String> {
    let hex = hex.trim();
    if hex.len() != N * 2 {
        return Err(format!("expected {} hex chars, got {}", N * 2, hex.len()));
    }
    if !hex.is_ascii() {
        return Err("hex string contains non-ASCII characters".to_string());
    }
    let mut out = [0u8; N];
    for (i, slot) in out.iter_mut().enumerate() {
        let pair = &hex[2 * i..2 * i + 2];
        *slot = u8::from_str_radix(pair, 16)
            .map_err(|e| format!("invalid hex at position {}: {e}", 2 * i))?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_and_verify() {
        let kp = Ed25519KeyPair::generate();
        let sig = kp.sign(b"hello canary");
        kp.public_key()
            .verify(b"hello canary", &sig)
            .expect("valid signature should verify");
    }

    #[test]
    fn test_verify_wrong_key_fails() {
        let kp1 = Ed25519KeyPair::generate();
        let kp2 = Ed25519KeyPair::generate();
        let sig = kp1.sign(b"msg");
        assert!(kp2.public_key().verify(b"msg", &sig).is_err());
    }

    #[test]
    fn test_verify_wrong_message_fails() {
        let kp = Ed25519KeyPair::generate();
        let sig = kp.sign(b"original");
        let err = kp.public_key().verify(b"tampered", &sig).unwrap_err();
        assert!(matches!(err, CryptoError::VerificationFailed(_)));
    }

    #[test]
    fn test_deterministic_from_seed() {
        let kp1 = Ed25519KeyPair::from_seed(&[42u8; 32]);
        let kp2 = Ed25519KeyPair::from_seed(&[42u8; 32]);
        assert_eq!(kp1.public_key(), kp2.public_key());
        assert_eq!(kp1.sign(b"x"), kp2.sign(b"x"));
    }

    #[test]
    fn test_secret_hex_roundtrip() {
        let kp = Ed25519KeyPair::generate();
        let hex = kp.secret_hex();
        assert_eq!(hex.len(), 64);
        let back = Ed25519KeyPair::from_hex(&format!("{}\n", hex.as_str())).unwrap();
        assert_eq!(back.public_key(), kp.public_key());
    }

    #[test]
    fn test_public_key_hex_roundtrip() {
        let pk = Ed25519KeyPair::generate().public_key();
        let hex = pk.to_hex();
        assert_eq!(hex.len(), 64);
        assert_eq!(Ed25519PublicKey::from_hex(&hex).unwrap(), pk);
    }

    #[test]
    fn test_signature_hex_roundtrip() {
        let sig = Ed25519KeyPair::generate().sign(b"x");
        let hex = sig.to_hex();
        assert_eq!(hex.len(), 128);
        assert_eq!(Ed25519Signature::from_hex(&hex).unwrap(), sig);
    }

    #[test]
    fn test_invalid_hex() {
        assert!(Ed25519PublicKey::from_hex("not-hex").is_err());
        assert!(Ed25519PublicKey::from_hex("aabb").is_err());
        assert!(Ed25519PublicKey::from_hex(&"zz".repeat(32)).is_err());
        assert!(Ed25519Signature::from_hex("aabb").is_err());
        assert!(Ed25519KeyPair::from_hex(&"é".repeat(32)).is_err());
    }

    #[test]
    fn test_debug_does_not_leak_private_key() {
        let kp = Ed25519KeyPair::generate();
        assert_eq!(format!("{kp:?}"), "Ed25519KeyPair(<private>)");
    }
}
