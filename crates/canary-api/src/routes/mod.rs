//! # API Route Modules
//!
//! - `canary`: the wire protocol (`/latest`, `/submit`, `/status`, `/key`).
//! - `metrics`: Prometheus scrape endpoint.

pub mod canary;
pub mod metrics;
