//! # Local Subcommands
//!
//! Commands that work on files only:
//!
//! - `canary create`: issue the next canary from a manifest.
//! - `canary verify`: check a proof's signature and fields.
//! - `canary add`: validate a proof against a local store and append it.

use std::path::{Path, PathBuf};

use clap::Args;

use canary_core::{Canary, Timestamp};
use canary_store::ProofStore;

use crate::exit::{ExitContext, ExitStatus, Failure};
use crate::keys::{load_signer, load_verifier};
use crate::manifest::{Manifest, ManifestError};
use crate::workflow::{self, WorkflowError};

/// Arguments for `canary create`.
#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Manifest describing the canary (YAML).
    #[arg(long)]
    pub manifest: PathBuf,
    /// Private key file (hex).
    #[arg(long)]
    pub private_key: PathBuf,
    /// Local proof store; its latest proof becomes the new `previous`.
    #[arg(long)]
    pub store: Option<PathBuf>,
    /// Where to write the new proof.
    #[arg(long, short)]
    pub output: PathBuf,
}

/// Arguments for `canary verify`.
#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Public key file (hex).
    #[arg(long)]
    pub public_key: PathBuf,
    /// Proof to verify.
    #[arg(long)]
    pub proof: PathBuf,
}

/// Arguments for `canary add`.
#[derive(Args, Debug)]
pub struct AddArgs {
    /// Public key file (hex).
    #[arg(long)]
    pub public_key: PathBuf,
    /// Proof to add.
    #[arg(long)]
    pub proof: PathBuf,
    /// Local proof store directory.
    #[arg(long)]
    pub store: PathBuf,
}

pub fn run_create(args: &CreateArgs) -> Result<(), Failure> {
    cmd_create(args, Timestamp::now())
}

pub fn run_verify(args: &VerifyArgs) -> Result<(), Failure> {
    cmd_verify(&args.public_key, &args.proof, Timestamp::now())
}

pub fn run_add(args: &AddArgs) -> Result<(), Failure> {
    cmd_add(&args.public_key, &args.proof, &args.store, Timestamp::now())
}

fn cmd_create(args: &CreateArgs, now: Timestamp) -> Result<(), Failure> {
    let manifest = Manifest::load(&args.manifest).map_err(|e| match e {
        ManifestError::Read { .. } => Failure::new(ExitStatus::FileRead, e),
        _ => Failure::new(ExitStatus::InvalidArguments, e),
    })?;
    let signer = load_signer(&args.private_key)?;

    let previous = match &args.store {
        Some(dir) => open_store(dir)?
            .load_latest()
            .map_err(WorkflowError::from)?,
        None => None,
    };

    let proof = workflow::create(&manifest, &signer, previous.as_deref(), now)?;
    std::fs::write(&args.output, &proof).or_exit(ExitStatus::FileWrite, || {
        format!("failed to write proof: {}", args.output.display())
    })?;

    println!("OK: wrote new proof to {}", args.output.display());
    if previous.is_none() {
        println!("  First canary of its chain (no previous proof)");
    }
    Ok(())
}

fn cmd_verify(public_key: &Path, proof_path: &Path, now: Timestamp) -> Result<(), Failure> {
    let verifier = load_verifier(public_key)?;
    let proof = read_proof(proof_path)?;
    let (canary, description) = workflow::verify(&proof, &verifier, now)?;

    println!("OK: proof is valid");
    print_canary(&canary, &description);
    Ok(())
}

fn cmd_add(
    public_key: &Path,
    proof_path: &Path,
    store_dir: &Path,
    now: Timestamp,
) -> Result<(), Failure> {
    let verifier = load_verifier(public_key)?;
    let proof = read_proof(proof_path)?;
    let store = open_store(store_dir)?;
    let added = workflow::add(&proof, &verifier, &store, now)?;

    tracing::info!(file = %added.file, "proof added to store");
    if !added.description.is_empty() {
        println!("{}", added.description);
    }
    println!("New deadline: {}", added.canary.expiry);
    Ok(())
}

pub(crate) fn read_proof(path: &Path) -> Result<String, Failure> {
    std::fs::read_to_string(path).or_exit(ExitStatus::FileRead, || {
        format!("failed to read proof: {}", path.display())
    })
}

fn open_store(dir: &Path) -> Result<ProofStore, Failure> {
    ProofStore::open(dir).map_err(|e| Failure::from(WorkflowError::from(e)))
}

pub(crate) fn print_canary(canary: &Canary, description: &str) {
    println!("Author:  {}", canary.author);
    println!("Created: {}", canary.creation);
    println!("Expires: {}", canary.expiry);
    if canary.is_final {
        println!("Final:   yes (no further canaries will be issued)");
    }
    for promise in &canary.promises {
        println!("Promise: {promise}");
    }
    for item in canary.news.iter().flatten() {
        println!("News:    {item}");
    }
    if !description.is_empty() {
        println!("Description:\n{description}");
    }
}
