//! Outbound client for the document service.
//!
//! Fetches full room snapshots over the service's REST API. A fetch
//! either returns the complete current snapshot or fails; retries are
//! the webhook sender's responsibility, not this crate's.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod client;
pub mod error;

pub use client::{ClientConfig, SnapshotClient};
pub use error::UpstreamError;
