//! # canary-crypto: Signing Capability
//!
//! Provides the cryptographic building blocks for the canary stack:
//!
//! - **Ed25519** keys, signing, and verification.
//! - **Clear-signed envelope** that keeps the signed proof human-readable.
//! - **`Signer` / `Verifier` traits**, the seam the server and client use.
//! - **Nonce generation** from the OS CSPRNG.
//! - **Proof seal/open**: message layout plus signature in one step.
//!
//! ## Crate Policy
//!
//! - Depends only on `canary-core` internally.
//! - No mocking of cryptographic operations in tests; all tests use real
//!   Ed25519 keys.

pub mod ed25519;
pub mod envelope;
pub mod error;
pub mod nonce;
pub mod proof;
pub mod signer;

pub use ed25519::{Ed25519KeyPair, Ed25519PublicKey, Ed25519Signature};
pub use error::{CryptoError, ProofError};
pub use nonce::random_nonce;
pub use proof::{open_proof, seal_proof};
pub use signer::{Ed25519Signer, Ed25519Verifier, Signer, Verifier};
