//! Domain layer for the ModelDB syncer.
//!
//! This crate holds everything that does not touch the network or the
//! filesystem: wire records, frames, the identity registry, the wire
//! converter, recorded events and the buffer they wait in.

pub mod buffer;
pub mod client;
pub mod config;
pub mod context;
pub mod converter;
pub mod error;
pub mod estimator;
pub mod event;
pub mod frame;
pub mod handle;
pub mod registry;
pub mod wire;

// Re-export common error type
pub use error::{ModelDbError, Result};
pub use handle::{Handle, ObjectKind, Trackable};
