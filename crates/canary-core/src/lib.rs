//! # canary-core: Foundational Types for the Warrant Canary Stack
//!
//! Defines the attestation record ([`Canary`]), its time representation
//! ([`Timestamp`]), the layout of the signed proof message, and the
//! validation engine that decides whether a canary may be accepted. Every
//! other crate in the workspace depends on `canary-core`; it depends on
//! nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **UTC-only timestamps.** `Timestamp` is seconds-precision UTC with a
//!    single textual form, so a signed document has one reading.
//!
//! 2. **Pure validation.** The engine takes `now` and the predecessor as
//!    arguments. It performs no I/O and holds no state.
//!
//! 3. **Closed error enums.** Format and succession failures are separate
//!    types, and every error maps to an [`ErrorKind`].
//!
//! ## Crate Policy
//!
//! - No dependencies on other `canary-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod canary;
pub mod clock;
pub mod digest;
pub mod error;
pub mod proof;
pub mod temporal;
pub mod validation;

// Re-export primary types for ergonomic imports.
pub use canary::{Canary, StatusReport, NONCE_ALPHABET, NONCE_LENGTH, SUPPORTED_VERSION};
pub use clock::{Clock, ManualClock, SystemClock};
pub use digest::{sha256_hex, ProofDigest};
pub use error::{DocumentError, ErrorKind, FormatError, SuccessionError, ValidationError};
pub use proof::{compose_message, parse_message, CANARY_SEPARATOR};
pub use temporal::Timestamp;
pub use validation::{check_canary, check_format, check_succession, Predecessor};
