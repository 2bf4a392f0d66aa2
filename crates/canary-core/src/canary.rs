//! # Canary Model
//!
//! The attestation record. A [`Canary`] is plain data: it carries no
//! behavior beyond construction and (de)serialization. Validation lives in
//! [`crate::validation`]; signing lives in `canary-crypto`.
//!
//! ## Wire form
//!
//! ```json
//! {
//!   "version": 0,
//!   "author": "example.org",
//!   "creation": "2026-01-15T12:00:00Z",
//!   "expiry": "2026-02-15T12:00:00Z",
//!   "nonce": "hY1x...32 chars...",
//!   "promises": ["We have not received a national security letter."],
//!   "final": false,
//!   "previous": "9f86d0...",
//!   "news": ["headline"]
//! }
//! ```
//!
//! `previous` and `news` are omitted when absent. Time fields must be
//! strings of the exact form `YYYY-MM-DDTHH:MM:SSZ`.

use serde::{Deserialize, Serialize};

use crate::error::DocumentError;
use crate::temporal::Timestamp;

/// The only protocol version this build produces or accepts.
pub const SUPPORTED_VERSION: i64 = 0;

/// Fixed length of the canary nonce, in characters.
pub const NONCE_LENGTH: usize = 32;

/// Alphabet the nonce is drawn from.
pub const NONCE_ALPHABET: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";

/// A signed-for attestation asserting that a renewal will appear before
/// `expiry`.
///
/// Values are never mutated once built; a renewal is a new `Canary` whose
/// `previous` field names the digest of the proof it supersedes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawCanary")]
pub struct Canary {
    /// Protocol version; must equal [`SUPPORTED_VERSION`].
    pub version: i64,
    /// Publisher identity. Must be non-empty.
    pub author: String,
    /// When the canary was issued.
    pub creation: Timestamp,
    /// Deadline after which the canary is no longer valid.
    pub expiry: Timestamp,
    /// Random string making otherwise-identical canaries distinct.
    pub nonce: String,
    /// Free-form claims, in order.
    pub promises: Vec<String>,
    /// When set, no successor may ever be accepted.
    #[serde(rename = "final")]
    pub is_final: bool,
    /// Lowercase hex SHA-256 of the predecessor's proof text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous: Option<String>,
    /// Human context attached by the publisher; not validated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub news: Option<Vec<String>>,
}

impl Canary {
    /// Start a version-0 canary with no promises, no predecessor and no news.
    pub fn new(
        author: impl Into<String>,
        creation: Timestamp,
        expiry: Timestamp,
        nonce: impl Into<String>,
    ) -> Self {
        Self {
            version: SUPPORTED_VERSION,
            author: author.into(),
            creation,
            expiry,
            nonce: nonce.into(),
            promises: Vec::new(),
            is_final: false,
            previous: None,
            news: None,
        }
    }

    /// Replace the promises.
    pub fn with_promises(mut self, promises: Vec<String>) -> Self {
        self.promises = promises;
        self
    }

    /// Mark the canary as the last of its chain.
    pub fn with_final(mut self, is_final: bool) -> Self {
        self.is_final = is_final;
        self
    }

    /// Link to a predecessor by the hex digest of its proof text.
    pub fn with_previous(mut self, digest: impl Into<String>) -> Self {
        self.previous = Some(digest.into());
        self
    }

    /// Attach news lines. An empty list is stored as absent.
    pub fn with_news(mut self, news: Vec<String>) -> Self {
        self.news = if news.is_empty() { None } else { Some(news) };
        self
    }

    /// Parse a canary from JSON, reporting bad time fields as
    /// [`DocumentError::MalformedTime`] rather than a generic JSON error.
    pub fn from_json(json: &str) -> Result<Self, DocumentError> {
        let raw: RawCanary = serde_json::from_str(json)?;
        Self::try_from(raw)
    }

    /// Pretty-printed JSON, the form embedded in proof messages.
    pub fn to_json_pretty(&self) -> Result<String, DocumentError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Shape of a canary before its time fields are checked.
#[derive(Deserialize)]
struct RawCanary {
    version: i64,
    author: String,
    creation: String,
    expiry: String,
    nonce: String,
    #[serde(default)]
    promises: Vec<String>,
    #[serde(rename = "final", default)]
    is_final: bool,
    #[serde(default)]
    previous: Option<String>,
    #[serde(default)]
    news: Option<Vec<String>>,
}

impl TryFrom<RawCanary> for Canary {
    type Error = DocumentError;

    fn try_from(raw: RawCanary) -> Result<Self, Self::Error> {
        Ok(Self {
            version: raw.version,
            author: raw.author,
            creation: Timestamp::parse(&raw.creation)?,
            expiry: Timestamp::parse(&raw.expiry)?,
            nonce: raw.nonce,
            promises: raw.promises,
            is_final: raw.is_final,
            previous: raw.previous,
            news: raw.news,
        })
    }
}

/// Server metadata served by `GET /status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusReport {
    /// Protocol version the server speaks.
    pub version: i64,
    /// Hex Ed25519 public key submissions must be signed with.
    pub key: String,
    /// Whether a canary has ever been accepted.
    pub enabled: bool,
    /// Expiry of the current canary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<Timestamp>,
    /// Whether the current canary closed the chain.
    #[serde(rename = "final", default, skip_serializing_if = "Option::is_none")]
    pub is_final: Option<bool>,
    /// Whether the dead-man's switch has fired.
    #[serde(default)]
    pub triggered: bool,
}
