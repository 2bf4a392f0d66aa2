//! # Publisher and Reader Workflow
//!
//! The client-side operations, free of argument parsing and printing:
//!
//! - [`create`]: issue the next canary from a manifest and seal it.
//! - [`verify`]: open a proof and check the canary on its own.
//! - [`add`]: validate a proof against a local store's latest and append it.
//! - [`connect`], [`push`], [`pull`], [`status`]: talk to a server.
//!
//! Nothing here reads the system clock; callers pass `now`.

use canary_client::{CanaryClient, ClientConfig, RemoteError};
use canary_core::{
    check_canary, check_format, sha256_hex, Canary, ErrorKind, FormatError, Predecessor,
    StatusReport, Timestamp, ValidationError,
};
use canary_crypto::{open_proof, random_nonce, seal_proof, ProofError, Signer, Verifier};
use canary_store::{ProofStore, StoreError};
use thiserror::Error;

use crate::manifest::Manifest;

#[derive(Error, Debug)]
pub enum WorkflowError {
    /// Signature or message layout is bad.
    #[error(transparent)]
    Proof(#[from] ProofError),

    /// The canary is malformed on its own.
    #[error(transparent)]
    Format(#[from] FormatError),

    /// The canary is malformed or cannot follow the store's latest.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// `now + delta` is not a representable time.
    #[error("deadline {delta}s after {now} is out of range")]
    DeadlineOverflow { now: Timestamp, delta: u64 },

    #[error(transparent)]
    Store(#[from] StoreError),

    /// The store's latest proof does not open with the given key.
    #[error("latest proof in store is invalid: {0}")]
    StoredProof(#[source] ProofError),

    #[error(transparent)]
    Remote(#[from] RemoteError),
}

impl WorkflowError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Proof(e) => e.kind(),
            Self::Format(e) => e.kind(),
            Self::Validation(e) => e.kind(),
            Self::DeadlineOverflow { .. } => ErrorKind::MalformedInput,
            Self::Store(e) => e.kind(),
            Self::StoredProof(_) => ErrorKind::CorruptStore,
            Self::Remote(e) => e.kind(),
        }
    }
}

/// Issue and seal the canary described by `manifest`.
///
/// The canary is created at `now`, expires `manifest.delta` seconds later,
/// and links to `previous_proof` when there is one.
pub fn create(
    manifest: &Manifest,
    signer: &dyn Signer,
    previous_proof: Option<&str>,
    now: Timestamp,
) -> Result<String, WorkflowError> {
    let expiry = now
        .checked_add_secs(manifest.delta)
        .ok_or(WorkflowError::DeadlineOverflow {
            now,
            delta: manifest.delta,
        })?;

    let mut canary = Canary::new(manifest.author.clone(), now, expiry, random_nonce())
        .with_promises(manifest.promises.clone())
        .with_news(manifest.news.clone())
        .with_final(manifest.is_final);
    if let Some(previous) = previous_proof {
        canary = canary.with_previous(sha256_hex(previous));
    }
    check_format(&canary, now)?;

    tracing::debug!(%expiry, linked = previous_proof.is_some(), "sealing canary");
    Ok(seal_proof(signer, &canary, &manifest.description)?)
}

/// Open `proof` and check its canary without any history.
pub fn verify(
    proof: &str,
    verifier: &dyn Verifier,
    now: Timestamp,
) -> Result<(Canary, String), WorkflowError> {
    let (canary, description) = open_proof(verifier, proof)?;
    check_format(&canary, now)?;
    Ok((canary, description))
}

/// Result of [`add`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Added {
    pub canary: Canary,
    pub description: String,
    /// File name the proof was stored under.
    pub file: String,
}

/// Validate `proof` as the successor of `store`'s latest proof and append it.
pub fn add(
    proof: &str,
    verifier: &dyn Verifier,
    store: &ProofStore,
    now: Timestamp,
) -> Result<Added, WorkflowError> {
    let latest = store.load_latest()?;
    let previous = latest
        .as_deref()
        .map(|text| {
            open_proof(verifier, text)
                .map(|(canary, _)| (canary, text))
                .map_err(WorkflowError::StoredProof)
        })
        .transpose()?;

    let (canary, description) = open_proof(verifier, proof)?;
    check_canary(
        &canary,
        previous
            .as_ref()
            .map(|(prev, text)| Predecessor::new(prev, text)),
        now,
    )?;

    let file = store.save(proof, canary.expiry)?;
    Ok(Added {
        canary,
        description,
        file,
    })
}

/// Build a client for `address`, optionally through a SOCKS5 proxy.
pub fn connect(address: &str, proxy: Option<&str>) -> Result<CanaryClient, WorkflowError> {
    Ok(CanaryClient::new(ClientConfig::new(address, proxy)?)?)
}

pub async fn push(client: &CanaryClient, proof: &str) -> Result<(), WorkflowError> {
    Ok(client.submit(proof).await?)
}

/// Latest proof on the server; `None` when it has none yet.
pub async fn pull(client: &CanaryClient) -> Result<Option<String>, WorkflowError> {
    Ok(client.latest().await?)
}

pub async fn status(client: &CanaryClient) -> Result<StatusReport, WorkflowError> {
    Ok(client.status().await?)
}

/// Public key text the server verifies submissions with.
pub async fn key(client: &CanaryClient) -> Result<String, WorkflowError> {
    Ok(client.key().await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use canary_core::SuccessionError;
    use canary_crypto::{Ed25519KeyPair, Ed25519Signer, Ed25519Verifier};

    fn ts(s: &str) -> Timestamp {
        Timestamp::parse(s).unwrap()
    }

    fn keys() -> (Ed25519Signer, Ed25519Verifier) {
        let signer = Ed25519Signer::new(Ed25519KeyPair::from_seed(&[9u8; 32]));
        let verifier = Ed25519Verifier::new(signer.public_key());
        (signer, verifier)
    }

    fn manifest(delta: u64) -> Manifest {
        Manifest {
            author: "canary.example.org".into(),
            delta,
            promises: vec!["No gag orders.".into()],
            description: "Weekly renewal.".into(),
            news: vec![],
            is_final: false,
        }
    }

    #[test]
    fn create_then_verify() {
        let (signer, verifier) = keys();
        let now = ts("2026-01-15T12:00:00Z");
        let proof = create(&manifest(3600), &signer, None, now).unwrap();

        let (canary, description) = verify(&proof, &verifier, now).unwrap();
        assert_eq!(canary.author, "canary.example.org");
        assert_eq!(canary.creation, now);
        assert_eq!(canary.expiry, ts("2026-01-15T13:00:00Z"));
        assert_eq!(canary.previous, None);
        assert_eq!(canary.news, None);
        assert_eq!(description, "Weekly renewal.");

        let later = ts("2026-01-15T13:00:01Z");
        assert!(matches!(
            verify(&proof, &verifier, later),
            Err(WorkflowError::Format(FormatError::Expired { .. }))
        ));
    }

    #[test]
    fn create_links_previous_proof() {
        let (signer, verifier) = keys();
        let now = ts("2026-01-15T12:00:00Z");
        let proof = create(&manifest(60), &signer, Some("old proof"), now).unwrap();
        let (canary, _) = verify(&proof, &verifier, now).unwrap();
        assert_eq!(canary.previous, Some(sha256_hex("old proof")));
    }

    #[test]
    fn create_rejects_empty_author() {
        let (signer, _) = keys();
        let mut m = manifest(60);
        m.author.clear();
        assert!(matches!(
            create(&m, &signer, None, ts("2026-01-15T12:00:00Z")),
            Err(WorkflowError::Format(FormatError::MissingAuthor))
        ));
    }

    #[test]
    fn add_builds_a_chain_in_the_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProofStore::open(dir.path()).unwrap();
        let (signer, verifier) = keys();

        let t0 = ts("2026-01-15T12:00:00Z");
        let first = create(&manifest(3600), &signer, None, t0).unwrap();
        let added = add(&first, &verifier, &store, t0).unwrap();
        assert_eq!(added.description, "Weekly renewal.");
        assert_eq!(store.list().unwrap(), vec![added.file.clone()]);

        let t1 = ts("2026-01-15T12:30:00Z");
        let second = create(&manifest(7200), &signer, Some(&first), t1).unwrap();
        add(&second, &verifier, &store, t1).unwrap();
        assert_eq!(store.load_latest().unwrap().as_deref(), Some(second.as_str()));

        // Not linked to the current latest.
        let stray = create(&manifest(9000), &signer, Some(&first), t1).unwrap();
        let err = add(&stray, &verifier, &store, t1).unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::Validation(ValidationError::Succession(
                SuccessionError::PreviousHashMismatch { .. }
            ))
        ));
        assert_eq!(store.list().unwrap().len(), 2);
    }

    #[test]
    fn add_rejects_store_signed_by_another_key() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProofStore::open(dir.path()).unwrap();
        let (signer, verifier) = keys();
        let now = ts("2026-01-15T12:00:00Z");

        let stranger = Ed25519Signer::new(Ed25519KeyPair::from_seed(&[1u8; 32]));
        let foreign = create(&manifest(60), &stranger, None, now).unwrap();
        store
            .save(&foreign, ts("2026-01-15T12:01:00Z"))
            .unwrap();

        let proof = create(&manifest(3600), &signer, Some(&foreign), now).unwrap();
        assert!(matches!(
            add(&proof, &verifier, &store, now),
            Err(WorkflowError::StoredProof(_))
        ));
    }
}
