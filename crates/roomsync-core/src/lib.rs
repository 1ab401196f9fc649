//! Core domain models, errors, and storage for roomsync.
//!
//! Provides strongly-typed domain primitives, the inbound webhook event
//! model, and the repository layer the HTTP surface persists through.
//! The API and upstream crates depend on these foundational types.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod events;
pub mod models;
pub mod storage;
pub mod time;

pub use error::{CoreError, Result};
pub use events::{InboundEvent, YdocUpdated};
pub use models::{DocumentRecord, RoomId};
pub use time::{Clock, RealClock, TestClock};
