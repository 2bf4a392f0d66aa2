//! # Server Configuration
//!
//! YAML configuration read at startup. The path comes from `CANARY_CONFIG`
//! (default `config.yaml`). Every field has a default, so an empty file or,
//! for the default path only, a missing file yields a working server.
//!
//! ```yaml
//! logging: { level: info, file: null }
//! server:
//!   address: 0.0.0.0
//!   port: 8080
//!   timeout_secs: 30
//!   enable_submit: true
//!   enable_status: true
//!   enable_latest: true
//!   enable_getkey: true
//! canary:
//!   key_file: canary.pub
//!   store: store
//!   on_failure: null
//!   poll_interval_secs: 5
//! ```
//!
//! `PORT` in the environment overrides `server.port`.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use canary_core::ErrorKind;

/// Environment variable naming the configuration file.
pub const CONFIG_ENV: &str = "CANARY_CONFIG";

/// Configuration file used when [`CONFIG_ENV`] is unset.
pub const DEFAULT_CONFIG_PATH: &str = "config.yaml";

/// Configuration could not be loaded.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("PORT must be a port number, got {0:?}")]
    InvalidPort(String),
}

impl ConfigError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Read { .. } => ErrorKind::StorageIo,
            Self::Parse { .. } | Self::InvalidPort(_) => ErrorKind::MalformedInput,
        }
    }
}

/// Log verbosity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    #[serde(alias = "warning")]
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Directive understood by `tracing_subscriber::EnvFilter`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// Default level; `RUST_LOG` wins when set.
    pub level: LogLevel,
    /// Optional file mirroring the log output (append mode, no ANSI).
    pub file: Option<PathBuf>,
}

/// HTTP listener settings and per-view switches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HttpConfig {
    pub address: IpAddr,
    pub port: u16,
    /// Per-request timeout.
    pub timeout_secs: u64,
    pub enable_submit: bool,
    pub enable_status: bool,
    pub enable_latest: bool,
    pub enable_getkey: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            address: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 8080,
            timeout_secs: 30,
            enable_submit: true,
            enable_status: true,
            enable_latest: true,
            enable_getkey: true,
        }
    }
}

impl HttpConfig {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.address, self.port)
    }
}

/// Where the key and proofs live, and what to do when the canary lapses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CanaryConfig {
    /// Hex Ed25519 public key submissions must be signed with.
    pub key_file: PathBuf,
    /// Proof store directory. Created if missing.
    pub store: PathBuf,
    /// Command run once when the deadline passes without renewal.
    pub on_failure: Option<String>,
    /// How often the action runner re-checks while no canary exists.
    pub poll_interval_secs: u64,
}

impl Default for CanaryConfig {
    fn default() -> Self {
        Self {
            key_file: PathBuf::from("canary.pub"),
            store: PathBuf::from("store"),
            on_failure: None,
            poll_interval_secs: 5,
        }
    }
}

/// Complete server configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub logging: LoggingConfig,
    pub server: HttpConfig,
    pub canary: CanaryConfig,
}

impl ServerConfig {
    /// Load from the environment: file from `CANARY_CONFIG`, then `PORT`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::load(Path::new(&path))?,
            None => Self::load_or_default(Path::new(DEFAULT_CONFIG_PATH))?,
        };
        config.with_port_override(std::env::var("PORT").ok().as_deref())
    }

    /// Parse a YAML document. Empty input gives the defaults.
    pub fn from_yaml(path: &Path, yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(yaml).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load from `path`, which must exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let yaml = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(path, &yaml)
    }

    /// Load from `path`, falling back to defaults if it does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Apply a `PORT` value, if one is given.
    pub fn with_port_override(mut self, port: Option<&str>) -> Result<Self, ConfigError> {
        if let Some(raw) = port {
            self.server.port = raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidPort(raw.to_string()))?;
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(yaml: &str) -> ServerConfig {
        ServerConfig::from_yaml(Path::new("test.yaml"), yaml).unwrap()
    }

    #[test]
    fn empty_document_is_all_defaults() {
        let cfg = parse("");
        assert_eq!(cfg, ServerConfig::default());
        assert_eq!(cfg.server.port, 8080);
        assert!(cfg.server.enable_submit);
        assert_eq!(cfg.canary.on_failure, None);
    }

    #[test]
    fn partial_document_keeps_other_defaults() {
        let cfg = parse(
            "server:\n  port: 9000\n  enable_submit: false\ncanary:\n  on_failure: /bin/alert --now\n",
        );
        assert_eq!(cfg.server.port, 9000);
        assert!(!cfg.server.enable_submit);
        assert!(cfg.server.enable_latest);
        assert_eq!(cfg.canary.on_failure.as_deref(), Some("/bin/alert --now"));
        assert_eq!(cfg.canary.store, PathBuf::from("store"));
    }

    #[test]
    fn log_level_accepts_warning_alias() {
        let cfg = parse("logging:\n  level: warning\n");
        assert_eq!(cfg.logging.level, LogLevel::Warn);
        assert_eq!(cfg.logging.level.as_str(), "warn");
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = ServerConfig::from_yaml(Path::new("x.yaml"), "server:\n  prot: 1\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn bad_level_is_rejected() {
        assert!(ServerConfig::from_yaml(Path::new("x.yaml"), "logging:\n  level: loud\n").is_err());
    }

    #[test]
    fn port_override() {
        let cfg = ServerConfig::default().with_port_override(Some("9443")).unwrap();
        assert_eq!(cfg.server.port, 9443);
        let cfg = ServerConfig::default().with_port_override(None).unwrap();
        assert_eq!(cfg.server.port, 8080);
        assert!(matches!(
            ServerConfig::default().with_port_override(Some("http")),
            Err(ConfigError::InvalidPort(_))
        ));
    }

    #[test]
    fn explicit_path_must_exist_default_path_may_not() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.yaml");
        assert!(matches!(
            ServerConfig::load(&missing),
            Err(ConfigError::Read { .. })
        ));
        assert_eq!(
            ServerConfig::load_or_default(&missing).unwrap(),
            ServerConfig::default()
        );

        let present = dir.path().join("config.yaml");
        std::fs::write(&present, "server:\n  timeout_secs: 5\n").unwrap();
        assert_eq!(ServerConfig::load(&present).unwrap().server.timeout_secs, 5);
    }

    #[test]
    fn socket_addr_combines_address_and_port() {
        let cfg = parse("server:\n  address: 127.0.0.1\n  port: 8081\n");
        assert_eq!(cfg.server.socket_addr().to_string(), "127.0.0.1:8081");
    }
}
