//! # Proof Seal / Open
//!
//! A proof is the signed text of a canary message. Sealing lays out the
//! message and signs it; opening verifies the signature and parses the
//! message back into a canary and its description.

use canary_core::{compose_message, parse_message, Canary};

use crate::error::{CryptoError, ProofError};
use crate::signer::{Signer, Verifier};

/// Lay out `canary` with `description` and sign the result.
pub fn seal_proof(
    signer: &dyn Signer,
    canary: &Canary,
    description: &str,
) -> Result<String, ProofError> {
    let message = compose_message(description, canary)?;
    Ok(signer.sign(message.as_bytes())?)
}

/// Verify `proof` and recover its canary and description.
///
/// Only the signature and the message layout are checked here; whether the
/// canary is acceptable is a separate validation step.
pub fn open_proof(verifier: &dyn Verifier, proof: &str) -> Result<(Canary, String), ProofError> {
    let bytes = verifier.verify(proof)?;
    let message = String::from_utf8(bytes).map_err(|_| CryptoError::NotText)?;
    Ok(parse_message(&message)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ed25519::Ed25519KeyPair;
    use crate::nonce::random_nonce;
    use crate::signer::{Ed25519Signer, Ed25519Verifier};
    use canary_core::{DocumentError, Timestamp};

    fn pair() -> (Ed25519Signer, Ed25519Verifier) {
        let signer = Ed25519Signer::new(Ed25519KeyPair::generate());
        let verifier = Ed25519Verifier::new(signer.public_key());
        (signer, verifier)
    }

    fn canary() -> Canary {
        Canary::new(
            "example.org",
            Timestamp::parse("2026-01-15T12:00:00Z").unwrap(),
            Timestamp::parse("2026-02-15T12:00:00Z").unwrap(),
            random_nonce(),
        )
        .with_promises(vec!["- no gag orders".into()])
    }

    #[test]
    fn seal_then_open() {
        let (signer, verifier) = pair();
        let c = canary();
        let proof = seal_proof(&signer, &c, "Quarterly statement.\n-- the team").unwrap();
        let (opened, description) = open_proof(&verifier, &proof).unwrap();
        assert_eq!(opened, c);
        assert_eq!(description, "Quarterly statement.\n-- the team");
    }

    #[test]
    fn crlf_description_opens_with_lf_line_endings() {
        let (signer, verifier) = pair();
        let c = canary();
        let proof = seal_proof(&signer, &c, "line one\r\nline two").unwrap();
        let (opened, description) = open_proof(&verifier, &proof).unwrap();
        assert_eq!(opened, c);
        assert_eq!(description, "line one\nline two");
    }

    #[test]
    fn open_with_wrong_key_is_signature_error() {
        let (signer, _) = pair();
        let (_, other) = pair();
        let proof = seal_proof(&signer, &canary(), "").unwrap();
        let err = open_proof(&other, &proof).unwrap_err();
        assert_eq!(err.kind(), canary_core::ErrorKind::SignatureInvalid);
    }

    #[test]
    fn signed_message_without_separator_is_document_error() {
        let (signer, verifier) = pair();
        let proof = signer.sign(b"just words").unwrap();
        assert_eq!(
            open_proof(&verifier, &proof).unwrap_err(),
            ProofError::Document(DocumentError::MissingSeparator)
        );
    }
}
