//! # canary-store: Append-Only Proof Store
//!
//! Persists every accepted proof as its own file and answers "what is the
//! latest proof?". Files are never rewritten or deleted.
//!
//! ## Layout
//!
//! One flat directory of `proof-<YYYYMMDDHHMMSS>-<sha256 hex>.sig` files.
//! The timestamp is supplied by the caller (the server uses the canary's
//! expiry, which strictly increases along a chain), so lexicographic order
//! of file names is chronological order of proofs.
//!
//! ## Integrity Invariant
//!
//! Anything else in the directory (a subdirectory, a file without the
//! `.sig` extension) means the store is not ours to interpret, and every
//! read fails with [`StoreError::Corrupt`]. Writes use create-new semantics,
//! so an existing file is never overwritten.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use canary_core::{sha256_hex, ErrorKind, Timestamp};
use thiserror::Error;

/// Extension every proof file carries.
pub const PROOF_EXTENSION: &str = "sig";

/// Errors from the proof store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// A filesystem operation failed.
    #[error("failed to {op} {}: {source}", path.display())]
    Io {
        /// What was being attempted.
        op: &'static str,
        /// File or directory involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// A proof file with the same name already exists.
    #[error("proof file {file} already exists")]
    Collision {
        /// The colliding file name.
        file: String,
    },

    /// The store directory holds something other than proof files.
    #[error("corrupt proof store: {entry} {reason}")]
    Corrupt {
        /// Offending entry name.
        entry: String,
        /// What is wrong with it.
        reason: &'static str,
    },
}

impl StoreError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Io { .. } => ErrorKind::StorageIo,
            Self::Collision { .. } | Self::Corrupt { .. } => ErrorKind::CorruptStore,
        }
    }

    fn io(op: &'static str, path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            op,
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Directory-backed proof log.
#[derive(Debug, Clone)]
pub struct ProofStore {
    dir: PathBuf,
}

impl ProofStore {
    /// Open the store at `dir`, creating the directory if it is missing.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| StoreError::io("create directory", &dir, e))?;
        Ok(Self { dir })
    }

    /// The store directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File name a proof saved at `when` gets.
    pub fn file_name(proof: &str, when: Timestamp) -> String {
        format!(
            "proof-{}-{}.{PROOF_EXTENSION}",
            when.to_file_stamp(),
            sha256_hex(proof)
        )
    }

    /// Append `proof` under a name derived from `when` and its digest.
    ///
    /// Returns the file name written. Never overwrites: an existing file of
    /// the same name is [`StoreError::Collision`]. A failed write leaves no
    /// partial file behind.
    pub fn save(&self, proof: &str, when: Timestamp) -> Result<String, StoreError> {
        let name = Self::file_name(proof, when);
        let path = self.dir.join(&name);

        let mut options = fs::OpenOptions::new();
        options.write(true).create_new(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let mut file = match options.open(&path) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                return Err(StoreError::Collision { file: name });
            }
            Err(e) => return Err(StoreError::io("create", &path, e)),
        };

        let written = file
            .write_all(proof.as_bytes())
            .and_then(|()| file.sync_all());
        if let Err(e) = written {
            drop(file);
            if let Err(cleanup) = fs::remove_file(&path) {
                tracing::warn!(file = %name, error = %cleanup, "failed to remove partial proof file");
            }
            return Err(StoreError::io("write", &path, e));
        }

        tracing::debug!(file = %name, "proof saved");
        Ok(name)
    }

    /// Sorted names of all proof files, oldest first.
    pub fn list(&self) -> Result<Vec<String>, StoreError> {
        let entries =
            fs::read_dir(&self.dir).map_err(|e| StoreError::io("read directory", &self.dir, e))?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StoreError::io("read directory", &self.dir, e))?;
            let name = entry.file_name().to_string_lossy().into_owned();
            let file_type = entry
                .file_type()
                .map_err(|e| StoreError::io("stat", &entry.path(), e))?;
            if file_type.is_dir() {
                return Err(StoreError::Corrupt {
                    entry: name,
                    reason: "is a directory",
                });
            }
            if Path::new(&name).extension().and_then(|e| e.to_str()) != Some(PROOF_EXTENSION) {
                return Err(StoreError::Corrupt {
                    entry: name,
                    reason: "is not a proof file",
                });
            }
            names.push(name);
        }
        names.sort();
        Ok(names)
    }

    /// Contents of the lexicographically last proof file, or `None` for an
    /// empty store.
    pub fn load_latest(&self) -> Result<Option<String>, StoreError> {
        let Some(latest) = self.list()?.pop() else {
            return Ok(None);
        };
        self.read(&latest).map(Some)
    }

    /// Contents of one proof file by name.
    pub fn read(&self, name: &str) -> Result<String, StoreError> {
        let path = self.dir.join(name);
        fs::read_to_string(&path).map_err(|e| StoreError::io("read", &path, e))
    }
}
