//! # Error Taxonomy
//!
//! Closed error enums for everything the core can reject, built with
//! `thiserror`. Callers branch on [`ErrorKind`] or on the variant itself,
//! never on message text.
//!
//! ## Design
//!
//! - [`FormatError`] covers checks that need no history (a single canary
//!   against the current time).
//! - [`SuccessionError`] covers checks against the previously accepted
//!   canary. It is reported separately so that callers can tell a
//!   malformed submission from one that conflicts with history.
//! - [`DocumentError`] covers the textual layer: timestamps, the proof
//!   message layout, and JSON.

use thiserror::Error;

use crate::temporal::Timestamp;

/// Coarse classification shared by every error type in the workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Bad nonce, time, version, missing author, unparseable document.
    MalformedInput,
    /// Expired, future creation, creation regression, deadline not advancing.
    TemporalViolation,
    /// A final canary would be superseded.
    ChainClosed,
    /// Signature or armor did not verify.
    SignatureInvalid,
    /// The proof store contains something other than proof files.
    CorruptStore,
    /// Reading or writing the proof store failed.
    StorageIo,
    /// Network or proxy failure talking to a canary server.
    RemoteTransport,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::MalformedInput => "MALFORMED_INPUT",
            Self::TemporalViolation => "TEMPORAL_VIOLATION",
            Self::ChainClosed => "CHAIN_CLOSED",
            Self::SignatureInvalid => "SIGNATURE_INVALID",
            Self::CorruptStore => "CORRUPT_STORE",
            Self::StorageIo => "STORAGE_IO",
            Self::RemoteTransport => "REMOTE_TRANSPORT",
        };
        f.write_str(s)
    }
}

/// A canary failed a check that needs no history.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// The document declares a protocol version other than the supported one.
    #[error("unsupported canary version {found} (expected {expected})")]
    UnsupportedVersion {
        /// Version found in the document.
        found: i64,
        /// The only version this build accepts.
        expected: i64,
    },

    /// The nonce does not have the fixed length.
    #[error("nonce must be {expected} characters long, got {found}")]
    MalformedNonce {
        /// Length of the nonce in the document.
        found: usize,
        /// Required nonce length.
        expected: usize,
    },

    /// The expiry lies before the validation time.
    #[error("canary has expired (expiry {expiry})")]
    Expired {
        /// Expiry of the rejected canary.
        expiry: Timestamp,
    },

    /// The author field is empty.
    #[error("author field is empty")]
    MissingAuthor,

    /// The creation time lies after the validation time.
    #[error("creation time {creation} is in the future (canary not valid yet)")]
    FutureCreation {
        /// Creation time of the rejected canary.
        creation: Timestamp,
    },
}

impl FormatError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnsupportedVersion { .. } | Self::MalformedNonce { .. } | Self::MissingAuthor => {
                ErrorKind::MalformedInput
            }
            Self::Expired { .. } | Self::FutureCreation { .. } => ErrorKind::TemporalViolation,
        }
    }
}

/// A canary cannot follow the previously accepted one.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SuccessionError {
    /// The previous canary was final.
    #[error("current canary is final; no successor can be accepted")]
    ChainClosed,

    /// The previous canary was created after the candidate.
    #[error("current canary was created at {previous}, after the new canary ({candidate})")]
    CreationRegression {
        /// Creation time of the accepted canary.
        previous: Timestamp,
        /// Creation time of the candidate.
        candidate: Timestamp,
    },

    /// The candidate's expiry is not strictly after the previous expiry.
    #[error("new canary expiry {candidate} is not after current expiry {previous}")]
    DeadlineNotAdvancing {
        /// Expiry of the accepted canary.
        previous: Timestamp,
        /// Expiry of the candidate.
        candidate: Timestamp,
    },

    /// The candidate does not reference the digest of the current proof.
    #[error("canary must reference the hash of the current proof {expected}")]
    PreviousHashMismatch {
        /// SHA-256 hex of the accepted proof text.
        expected: String,
        /// Digest the candidate claims as its predecessor, if any.
        found: Option<String>,
    },
}

impl SuccessionError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ChainClosed => ErrorKind::ChainClosed,
            Self::CreationRegression { .. } | Self::DeadlineNotAdvancing { .. } => {
                ErrorKind::TemporalViolation
            }
            Self::PreviousHashMismatch { .. } => ErrorKind::MalformedInput,
        }
    }
}

/// Outcome of the composed format + succession check.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The candidate is malformed on its own.
    #[error("invalid canary: {0}")]
    Format(#[from] FormatError),

    /// The candidate conflicts with the accepted history.
    #[error("canary conflicts with history: {0}")]
    Succession(#[from] SuccessionError),
}

impl ValidationError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Format(e) => e.kind(),
            Self::Succession(e) => e.kind(),
        }
    }
}

/// The textual representation of a canary could not be read or written.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DocumentError {
    /// A time field is not a string of the form `YYYY-MM-DDTHH:MM:SSZ`.
    #[error("malformed time {0:?}: expected YYYY-MM-DDTHH:MM:SSZ")]
    MalformedTime(String),

    /// The signed message has no canary separator line.
    #[error("unable to find canary separator")]
    MissingSeparator,

    /// The canary body is not valid JSON for the canary schema.
    #[error("unable to parse canary structure: {0}")]
    Json(String),
}

impl DocumentError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::MalformedInput
    }
}

impl From<serde_json::Error> for DocumentError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}
