//! Coordinator behavior against a real store and real signatures.

use std::sync::{Arc, Barrier};

use canary_core::{sha256_hex, Canary, ManualClock, SuccessionError, Timestamp};
use canary_crypto::{
    random_nonce, seal_proof, Ed25519KeyPair, Ed25519Signer, Ed25519Verifier, ProofError,
};
use canary_state::{CanaryState, LoadError, SubmitError};
use canary_store::ProofStore;

const NOW: &str = "2026-01-15T12:00:00Z";

fn ts(s: &str) -> Timestamp {
    Timestamp::parse(s).unwrap()
}

struct Fixture {
    dir: tempfile::TempDir,
    signer: Ed25519Signer,
    state: Arc<CanaryState>,
}

impl Fixture {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let signer = Ed25519Signer::new(Ed25519KeyPair::generate());
        let state = load(dir.path(), &signer);
        Self {
            dir,
            signer,
            state: Arc::new(state),
        }
    }

    fn seal(&self, canary: &Canary) -> String {
        seal_proof(&self.signer, canary, "test canary").unwrap()
    }
}

fn load(dir: &std::path::Path, signer: &Ed25519Signer) -> CanaryState {
    CanaryState::load(
        ProofStore::open(dir).unwrap(),
        Arc::new(Ed25519Verifier::new(signer.public_key())),
        Arc::new(ManualClock::new(ts(NOW))),
    )
    .unwrap()
}

fn canary(creation: &str, expiry: &str) -> Canary {
    Canary::new("example.org", ts(creation), ts(expiry), random_nonce())
}

#[test]
fn first_submission_is_accepted_and_cached() {
    let fx = Fixture::new();
    assert_eq!(fx.state.latest_proof(), None);
    assert!(!fx.state.status(false).enabled);

    let a = canary("2026-01-15T00:00:00Z", "2026-02-01T00:00:00Z");
    let proof = fx.seal(&a);
    let accepted = fx.state.submit(&proof).unwrap();

    assert_eq!(accepted, a);
    assert_eq!(fx.state.latest_proof().as_deref(), Some(proof.as_str()));
    assert_eq!(fx.state.latest_canary(), Some(a.clone()));
    assert_eq!(fx.state.deadline(), Some(a.expiry));
    assert_eq!(*fx.state.subscribe().borrow(), Some(a.expiry));

    let status = fx.state.status(false);
    assert!(status.enabled);
    assert_eq!(status.deadline, Some(a.expiry));
    assert_eq!(status.is_final, Some(false));
    assert_eq!(status.key.len(), 64);
}

#[test]
fn earlier_deadline_rejected_then_later_accepted() {
    let fx = Fixture::new();
    let a = canary("2026-01-15T00:00:00Z", "2026-02-01T00:00:00Z");
    let proof_a = fx.seal(&a);
    fx.state.submit(&proof_a).unwrap();

    let b = canary("2026-01-15T01:00:00Z", "2026-01-20T00:00:00Z")
        .with_previous(sha256_hex(&proof_a));
    let err = fx.state.submit(&fx.seal(&b)).unwrap_err();
    assert!(matches!(
        err,
        SubmitError::Succession(SuccessionError::DeadlineNotAdvancing { .. })
    ));
    assert_eq!(fx.state.latest_proof().as_deref(), Some(proof_a.as_str()));

    let c = canary("2026-01-15T01:00:00Z", "2026-03-01T00:00:00Z")
        .with_previous(sha256_hex(&proof_a));
    let proof_c = fx.seal(&c);
    fx.state.submit(&proof_c).unwrap();
    assert_eq!(fx.state.latest_proof().as_deref(), Some(proof_c.as_str()));
    assert_eq!(fx.state.deadline(), Some(c.expiry));
}

#[test]
fn final_canary_closes_chain() {
    let fx = Fixture::new();
    let last = canary("2026-01-15T00:00:00Z", "2026-02-01T00:00:00Z").with_final(true);
    let proof = fx.seal(&last);
    fx.state.submit(&proof).unwrap();

    let next = canary("2026-01-15T01:00:00Z", "2026-03-01T00:00:00Z")
        .with_previous(sha256_hex(&proof));
    let err = fx.state.submit(&fx.seal(&next)).unwrap_err();
    assert!(matches!(err, SubmitError::Succession(SuccessionError::ChainClosed)));
    assert_eq!(fx.state.status(false).is_final, Some(true));
}

#[test]
fn format_violation_is_distinct_and_stores_nothing() {
    let fx = Fixture::new();
    let expired = canary("2026-01-01T00:00:00Z", "2026-01-10T00:00:00Z");
    let err = fx.state.submit(&fx.seal(&expired)).unwrap_err();
    assert!(matches!(err, SubmitError::Format(_)));
    assert_eq!(fx.state.latest_proof(), None);
    assert!(ProofStore::open(fx.dir.path()).unwrap().list().unwrap().is_empty());
}

#[test]
fn foreign_signature_is_proof_error() {
    let fx = Fixture::new();
    let other = Ed25519Signer::new(Ed25519KeyPair::generate());
    let c = canary("2026-01-15T00:00:00Z", "2026-02-01T00:00:00Z");
    let proof = seal_proof(&other, &c, "").unwrap();
    assert!(matches!(
        fx.state.submit(&proof),
        Err(SubmitError::Proof(ProofError::Signature(_)))
    ));
    assert!(matches!(
        fx.state.submit("garbage"),
        Err(SubmitError::Proof(_))
    ));
}

#[test]
fn concurrent_first_submissions_accept_exactly_one() {
    let fx = Fixture::new();
    let proofs = [
        fx.seal(&canary("2026-01-15T00:00:00Z", "2026-02-01T00:00:00Z")),
        fx.seal(&canary("2026-01-15T00:00:00Z", "2026-02-02T00:00:00Z")),
    ];
    let barrier = Arc::new(Barrier::new(proofs.len()));

    let handles: Vec<_> = proofs
        .iter()
        .cloned()
        .map(|proof| {
            let state = Arc::clone(&fx.state);
            let barrier = Arc::clone(&barrier);
            std::thread::spawn(move || {
                barrier.wait();
                state.submit(&proof).map(|_| proof)
            })
        })
        .collect();
    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    let accepted: Vec<_> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
    assert_eq!(accepted.len(), 1);
    assert!(results
        .iter()
        .filter_map(|r| r.as_ref().err())
        .all(|e| matches!(e, SubmitError::Succession(_))));
    assert_eq!(fx.state.latest_proof().as_ref(), Some(accepted[0]));
    assert_eq!(
        ProofStore::open(fx.dir.path()).unwrap().list().unwrap().len(),
        1
    );
}

#[test]
fn reload_restores_latest() {
    let fx = Fixture::new();
    let a = canary("2026-01-15T00:00:00Z", "2026-02-01T00:00:00Z");
    let proof = fx.seal(&a);
    fx.state.submit(&proof).unwrap();

    let reloaded = load(fx.dir.path(), &fx.signer);
    assert_eq!(reloaded.latest_proof().as_deref(), Some(proof.as_str()));
    assert_eq!(reloaded.deadline(), Some(a.expiry));
}

#[test]
fn load_fails_on_proof_signed_by_other_key() {
    let fx = Fixture::new();
    fx.state
        .submit(&fx.seal(&canary("2026-01-15T00:00:00Z", "2026-02-01T00:00:00Z")))
        .unwrap();

    let stranger = Ed25519Signer::new(Ed25519KeyPair::generate());
    let err = CanaryState::load(
        ProofStore::open(fx.dir.path()).unwrap(),
        Arc::new(Ed25519Verifier::new(stranger.public_key())),
        Arc::new(ManualClock::new(ts(NOW))),
    )
    .unwrap_err();
    assert!(matches!(err, LoadError::Proof(_)));
}

#[test]
fn load_fails_on_corrupt_store() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("stray")).unwrap();
    let signer = Ed25519Signer::new(Ed25519KeyPair::generate());
    let err = CanaryState::load(
        ProofStore::open(dir.path()).unwrap(),
        Arc::new(Ed25519Verifier::new(signer.public_key())),
        Arc::new(ManualClock::new(ts(NOW))),
    )
    .unwrap_err();
    assert_eq!(err.kind(), canary_core::ErrorKind::CorruptStore);
}
