//! # Server Bootstrap
//!
//! Turns a [`ServerConfig`] into running pieces:
//!
//! 1. **Load Key**: read the hex public key from `canary.key_file`.
//! 2. **Open Store**: create the proof directory if needed.
//! 3. **Load State**: verify and cache the latest stored proof.
//! 4. **Build Runner**: wire the action runner to the state's deadline.
//!
//! Any failure here is fatal: the server must not serve a state it could
//! not verify.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use canary_core::{Clock, ErrorKind};
use canary_crypto::{CryptoError, Ed25519Verifier};
use canary_state::{Action, ActionRunner, CanaryState, LoadError};
use canary_store::{ProofStore, StoreError};

use crate::config::{ConfigError, ServerConfig};

/// Errors during server bootstrap.
#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Key file could not be read.
    #[error("failed to read key file {path}: {source}")]
    KeyFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Key file content is not a public key.
    #[error("invalid public key in {path}: {source}")]
    Key {
        path: PathBuf,
        #[source]
        source: CryptoError,
    },

    /// Proof store directory is unusable.
    #[error("failed to open proof store: {0}")]
    Store(#[from] StoreError),

    /// Stored state failed verification.
    #[error(transparent)]
    Load(#[from] LoadError),

    /// Log file could not be opened.
    #[error("failed to open log file {path}: {source}")]
    LogFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The listener could not be bound, or serving failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BootstrapError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Config(e) => e.kind(),
            Self::Key { .. } => ErrorKind::MalformedInput,
            Self::Store(e) => e.kind(),
            Self::Load(e) => e.kind(),
            Self::KeyFile { .. } | Self::LogFile { .. } | Self::Io(_) => ErrorKind::StorageIo,
        }
    }
}

/// Everything the binary needs to start serving.
#[derive(Debug)]
pub struct Bootstrapped {
    pub state: Arc<CanaryState>,
    pub runner: ActionRunner,
}

/// Read a hex Ed25519 public key file into a verifier.
pub fn load_verifier(path: &Path) -> Result<Ed25519Verifier, BootstrapError> {
    let text = std::fs::read_to_string(path).map_err(|source| BootstrapError::KeyFile {
        path: path.to_path_buf(),
        source,
    })?;
    Ed25519Verifier::from_hex(&text).map_err(|source| BootstrapError::Key {
        path: path.to_path_buf(),
        source,
    })
}

/// Build state and action runner from configuration.
pub fn bootstrap(
    config: &ServerConfig,
    clock: Arc<dyn Clock>,
) -> Result<Bootstrapped, BootstrapError> {
    let verifier = load_verifier(&config.canary.key_file)?;
    tracing::info!(key = %verifier.public_key(), "loaded verification key");

    let store = ProofStore::open(&config.canary.store)?;
    let state = Arc::new(CanaryState::load(store, Arc::new(verifier), Arc::clone(&clock))?);

    let action = config.canary.on_failure.as_deref().and_then(Action::parse);
    match &action {
        Some(action) => tracing::info!(program = action.program(), "failure action configured"),
        None => tracing::warn!("no failure action configured; a lapsed canary will only be logged"),
    }

    let runner = ActionRunner::new(state.subscribe(), clock, action)
        .with_poll_interval(Duration::from_secs(config.canary.poll_interval_secs.max(1)));

    Ok(Bootstrapped { state, runner })
}

/// Bind the HTTP listener on `addr`.
pub async fn bind(addr: SocketAddr) -> Result<tokio::net::TcpListener, BootstrapError> {
    Ok(tokio::net::TcpListener::bind(addr).await?)
}
