//! # Validation Engine
//!
//! Pure checks over canaries. Nothing here reads the clock or touches
//! storage: callers pass `now` and the previously accepted canary in.
//!
//! - [`check_format`] judges a canary on its own.
//! - [`check_succession`] judges it against its predecessor.
//! - [`check_canary`] runs both, format first.
//!
//! Every check returns on the first failure, in a fixed order, so the same
//! input always yields the same error.

use crate::canary::{Canary, NONCE_LENGTH, SUPPORTED_VERSION};
use crate::digest::sha256_hex;
use crate::error::{FormatError, SuccessionError, ValidationError};
use crate::temporal::Timestamp;

/// The accepted canary a candidate must follow, with the exact proof text
/// it was parsed from.
#[derive(Debug, Clone, Copy)]
pub struct Predecessor<'a> {
    /// The accepted canary.
    pub canary: &'a Canary,
    /// The signed proof text the canary came from.
    pub proof: &'a str,
}

impl<'a> Predecessor<'a> {
    /// Pair a canary with its proof text.
    pub fn new(canary: &'a Canary, proof: &'a str) -> Self {
        Self { canary, proof }
    }
}

/// Check a canary in isolation against the time `now`.
///
/// Order: version, nonce length, expiry, author, creation.
pub fn check_format(candidate: &Canary, now: Timestamp) -> Result<(), FormatError> {
    if candidate.version != SUPPORTED_VERSION {
        return Err(FormatError::UnsupportedVersion {
            found: candidate.version,
            expected: SUPPORTED_VERSION,
        });
    }

    let nonce_len = candidate.nonce.chars().count();
    if nonce_len != NONCE_LENGTH {
        return Err(FormatError::MalformedNonce {
            found: nonce_len,
            expected: NONCE_LENGTH,
        });
    }

    if now > candidate.expiry {
        return Err(FormatError::Expired {
            expiry: candidate.expiry,
        });
    }

    if candidate.author.is_empty() {
        return Err(FormatError::MissingAuthor);
    }

    if candidate.creation > now {
        return Err(FormatError::FutureCreation {
            creation: candidate.creation,
        });
    }

    Ok(())
}

/// Check that `candidate` may follow `previous`. A chain with no accepted
/// canary admits any candidate.
///
/// Order: closed chain, creation regression, deadline advance, hash link.
pub fn check_succession(
    candidate: &Canary,
    previous: Option<Predecessor<'_>>,
) -> Result<(), SuccessionError> {
    let Some(prev) = previous else {
        return Ok(());
    };

    if prev.canary.is_final {
        return Err(SuccessionError::ChainClosed);
    }

    if prev.canary.creation > candidate.creation {
        return Err(SuccessionError::CreationRegression {
            previous: prev.canary.creation,
            candidate: candidate.creation,
        });
    }

    if candidate.expiry <= prev.canary.expiry {
        return Err(SuccessionError::DeadlineNotAdvancing {
            previous: prev.canary.expiry,
            candidate: candidate.expiry,
        });
    }

    let expected = sha256_hex(prev.proof);
    if candidate.previous.as_deref() != Some(expected.as_str()) {
        return Err(SuccessionError::PreviousHashMismatch {
            expected,
            found: candidate.previous.clone(),
        });
    }

    Ok(())
}

/// Run [`check_format`] then [`check_succession`].
pub fn check_canary(
    candidate: &Canary,
    previous: Option<Predecessor<'_>>,
    now: Timestamp,
) -> Result<(), ValidationError> {
    check_format(candidate, now)?;
    check_succession(candidate, previous)?;
    Ok(())
}
