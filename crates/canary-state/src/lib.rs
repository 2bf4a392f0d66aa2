//! # canary-state: Server-Side Canary State
//!
//! - [`CanaryState`]: the coordinator holding the latest accepted proof,
//!   shared by request handlers.
//! - [`ActionRunner`]: the background dead-man's switch that watches the
//!   coordinator's deadline.
//!
//! The two meet only through a `tokio::sync::watch` channel of the current
//! deadline, so the runner never takes the coordinator's lock.

pub mod coordinator;
pub mod runner;

pub use coordinator::{Accepted, CanaryState, LoadError, SubmitError};
pub use runner::{
    Action, ActionOutcome, ActionReport, ActionRunner, Phase, DEFAULT_POLL_INTERVAL,
};
