//! Canary manifests: the YAML a publisher keeps to describe each renewal.
//!
//! ```yaml
//! author: canary.example.org
//! delta: 1209600            # seconds until the new deadline
//! promises:
//!   - We have not received any National Security Letters.
//! description: |
//!   Renewed as scheduled.
//! news: []
//! final: false
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use canary_core::ErrorKind;

#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("failed to read manifest {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid manifest {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("manifest delta must be a positive number of seconds")]
    ZeroDelta,
}

impl ManifestError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Read { .. } => ErrorKind::StorageIo,
            Self::Parse { .. } | Self::ZeroDelta => ErrorKind::MalformedInput,
        }
    }
}

/// Everything needed to issue the next canary except key and time.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    pub author: String,
    /// Seconds from creation to expiry.
    pub delta: u64,
    #[serde(default)]
    pub promises: Vec<String>,
    /// Human-readable text placed above the canary in the proof.
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub news: Vec<String>,
    #[serde(default, rename = "final")]
    pub is_final: bool,
}

impl Manifest {
    pub fn from_yaml(path: &Path, yaml: &str) -> Result<Self, ManifestError> {
        let manifest: Self = serde_yaml::from_str(yaml).map_err(|source| ManifestError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        if manifest.delta == 0 {
            return Err(ManifestError::ZeroDelta);
        }
        Ok(manifest)
    }

    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let yaml = std::fs::read_to_string(path).map_err(|source| ManifestError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(path, &yaml)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(yaml: &str) -> Result<Manifest, ManifestError> {
        Manifest::from_yaml(Path::new("manifest.yaml"), yaml)
    }

    #[test]
    fn full_manifest() {
        let m = parse(
            "author: canary.example.org\ndelta: 86400\npromises: [a, b]\n\
             description: |\n  line one\n  line two\nnews: [n]\nfinal: true\n",
        )
        .unwrap();
        assert_eq!(m.author, "canary.example.org");
        assert_eq!(m.delta, 86400);
        assert_eq!(m.promises, vec!["a", "b"]);
        assert_eq!(m.description, "line one\nline two\n");
        assert_eq!(m.news, vec!["n"]);
        assert!(m.is_final);
    }

    #[test]
    fn optional_fields_default() {
        let m = parse("author: me\ndelta: 60\n").unwrap();
        assert!(m.promises.is_empty());
        assert!(m.description.is_empty());
        assert!(!m.is_final);
    }

    #[test]
    fn zero_delta_and_missing_fields_are_rejected() {
        assert!(matches!(parse("author: me\ndelta: 0\n"), Err(ManifestError::ZeroDelta)));
        assert!(matches!(parse("author: me\n"), Err(ManifestError::Parse { .. })));
        assert!(matches!(
            parse("author: me\ndelta: 5\nexpire: 3\n"),
            Err(ManifestError::Parse { .. })
        ));
    }
}
