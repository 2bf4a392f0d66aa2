//! # Server State Coordinator
//!
//! The single mutable cell holding the latest accepted proof and its parsed
//! canary, shared by every request handler and the action runner.
//!
//! ## Locking
//!
//! One `parking_lot::RwLock` guards the cell. It is never held across an
//! `.await`; every method here is synchronous.
//!
//! A submission does the expensive, history-free work first (signature
//! check, parsing, format check) without the lock, then takes the write
//! lock for the succession check, the store append, the cache update, and
//! publishing the new deadline. Submissions are therefore totally ordered
//! and a failed one never changes what readers see.

use std::sync::Arc;

use canary_core::{
    check_format, check_succession, Canary, Clock, ErrorKind, FormatError, Predecessor,
    StatusReport, SuccessionError, Timestamp, SUPPORTED_VERSION,
};
use canary_crypto::{open_proof, ProofError, Verifier};
use canary_store::{ProofStore, StoreError};
use parking_lot::RwLock;
use thiserror::Error;
use tokio::sync::watch;

/// The latest accepted proof and the canary parsed from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Accepted {
    /// Exact signed text as submitted.
    pub proof: String,
    /// Canary carried by the proof.
    pub canary: Canary,
}

/// Startup failed; the server must not come up.
#[derive(Error, Debug)]
pub enum LoadError {
    /// The proof store could not be read.
    #[error("failed to read proof store: {0}")]
    Store(#[from] StoreError),

    /// The latest stored proof does not open with the configured key.
    #[error("latest stored proof is invalid: {0}")]
    Proof(#[from] ProofError),
}

impl LoadError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Store(e) => e.kind(),
            Self::Proof(e) => e.kind(),
        }
    }
}

/// A submission was rejected. Nothing was stored.
#[derive(Error, Debug)]
pub enum SubmitError {
    /// Signature or message layout is bad.
    #[error(transparent)]
    Proof(#[from] ProofError),

    /// The canary is malformed on its own.
    #[error(transparent)]
    Format(#[from] FormatError),

    /// The canary cannot follow the current one.
    #[error(transparent)]
    Succession(#[from] SuccessionError),

    /// Appending to the store failed. The message deliberately omits the
    /// underlying error, which may name paths.
    #[error("failed to persist proof")]
    Storage(#[source] StoreError),
}

impl SubmitError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Proof(e) => e.kind(),
            Self::Format(e) => e.kind(),
            Self::Succession(e) => e.kind(),
            Self::Storage(e) => e.kind(),
        }
    }
}

/// Shared server state. Wrap in an `Arc` to share.
pub struct CanaryState {
    latest: RwLock<Option<Accepted>>,
    store: ProofStore,
    verifier: Arc<dyn Verifier>,
    clock: Arc<dyn Clock>,
    deadline_tx: watch::Sender<Option<Timestamp>>,
}

impl std::fmt::Debug for CanaryState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CanaryState")
            .field("store", &self.store.dir())
            .field("deadline", &self.deadline())
            .finish_non_exhaustive()
    }
}

impl CanaryState {
    /// Build the state from whatever the store already holds.
    ///
    /// The latest stored proof must open with `verifier`. It is not
    /// re-validated against the clock: an expired canary on disk is exactly
    /// the case the action runner exists for.
    pub fn load(
        store: ProofStore,
        verifier: Arc<dyn Verifier>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, LoadError> {
        let latest = match store.load_latest()? {
            Some(proof) => {
                let (canary, _) = open_proof(verifier.as_ref(), &proof)?;
                tracing::info!(
                    deadline = %canary.expiry,
                    final_canary = canary.is_final,
                    "loaded latest canary from store"
                );
                Some(Accepted { proof, canary })
            }
            None => {
                tracing::info!("proof store is empty");
                None
            }
        };

        let (deadline_tx, _) = watch::channel(latest.as_ref().map(|a| a.canary.expiry));
        Ok(Self {
            latest: RwLock::new(latest),
            store,
            verifier,
            clock,
            deadline_tx,
        })
    }

    /// Latest accepted proof text, if any.
    pub fn latest_proof(&self) -> Option<String> {
        self.latest.read().as_ref().map(|a| a.proof.clone())
    }

    /// Latest accepted canary, if any.
    pub fn latest_canary(&self) -> Option<Canary> {
        self.latest.read().as_ref().map(|a| a.canary.clone())
    }

    /// Current deadline, if any canary has been accepted.
    pub fn deadline(&self) -> Option<Timestamp> {
        self.latest.read().as_ref().map(|a| a.canary.expiry)
    }

    /// Receiver that observes every deadline change.
    pub fn subscribe(&self) -> watch::Receiver<Option<Timestamp>> {
        self.deadline_tx.subscribe()
    }

    /// Public key submissions are verified against.
    pub fn public_key_text(&self) -> String {
        self.verifier.public_key_text()
    }

    /// Status metadata. `triggered` comes from the action runner.
    pub fn status(&self, triggered: bool) -> StatusReport {
        let latest = self.latest.read();
        StatusReport {
            version: SUPPORTED_VERSION,
            key: self.public_key_text(),
            enabled: latest.is_some(),
            deadline: latest.as_ref().map(|a| a.canary.expiry),
            is_final: latest.as_ref().map(|a| a.canary.is_final),
            triggered,
        }
    }

    /// Validate `proof` and, if acceptable, make it the latest.
    pub fn submit(&self, proof: &str) -> Result<Canary, SubmitError> {
        let (candidate, _) = open_proof(self.verifier.as_ref(), proof)?;
        check_format(&candidate, self.clock.now())?;

        let mut latest = self.latest.write();
        check_succession(
            &candidate,
            latest
                .as_ref()
                .map(|a| Predecessor::new(&a.canary, &a.proof)),
        )?;

        let file = self
            .store
            .save(proof, candidate.expiry)
            .map_err(SubmitError::Storage)?;

        let deadline = candidate.expiry;
        *latest = Some(Accepted {
            proof: proof.to_string(),
            canary: candidate.clone(),
        });
        self.deadline_tx.send_replace(Some(deadline));
        drop(latest);

        tracing::info!(
            %file,
            %deadline,
            final_canary = candidate.is_final,
            "accepted new canary"
        );
        Ok(candidate)
    }
}
