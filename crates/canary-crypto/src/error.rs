//! Errors raised while loading keys, signing, or opening proofs.

use canary_core::{DocumentError, ErrorKind};
use thiserror::Error;

/// Cryptographic operation failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// A key could not be decoded.
    #[error("key error: {0}")]
    KeyError(String),

    /// The signed text does not have the clear-signed envelope layout.
    #[error("malformed signed message: {0}")]
    MalformedArmor(&'static str),

    /// The envelope names a different key than the one trusted.
    #[error("message is signed by key {found}, expected {expected}")]
    KeyMismatch {
        /// Hex of the trusted key.
        expected: String,
        /// Hex named in the envelope.
        found: String,
    },

    /// The message to sign, or the signed body, is not UTF-8 text.
    #[error("message is not valid UTF-8 text")]
    NotText,

    /// The signature does not verify.
    #[error("signature verification failed: {0}")]
    VerificationFailed(String),
}

impl CryptoError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::KeyError(_) => ErrorKind::MalformedInput,
            _ => ErrorKind::SignatureInvalid,
        }
    }
}

/// A proof could not be sealed or opened.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProofError {
    /// The signature layer rejected the proof.
    #[error(transparent)]
    Signature(#[from] CryptoError),

    /// The signed message is not a well-formed canary message.
    #[error(transparent)]
    Document(#[from] DocumentError),
}

impl ProofError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Signature(e) => e.kind(),
            Self::Document(e) => e.kind(),
        }
    }
}
