//! # canary-cli: Command-Line Client for Warrant Canaries
//!
//! ## Subcommands
//!
//! - `canary keygen`: generate an Ed25519 keypair.
//! - `canary create`: issue the next canary from a manifest.
//! - `canary verify`: check a proof locally.
//! - `canary add`: append a proof to a local store after chain checks.
//! - `canary push` / `pull` / `status` / `key`: talk to a canary server.
//!
//! ```bash
//! canary keygen --output keys --prefix canary
//! canary create --manifest manifest.yaml --private-key keys/canary.key \
//!     --store store --output next.sig
//! canary push --address canary.example.org --proof next.sig
//! canary pull --address canary.example.org --proof latest.sig \
//!     --public-key keys/canary.pub --proxy 127.0.0.1:9050
//! ```
//!
//! Each failure exits with a distinct [`ExitStatus`] code.

pub mod exit;
pub mod keys;
pub mod local;
pub mod manifest;
pub mod remote;
pub mod workflow;

pub use exit::{ExitStatus, Failure};
