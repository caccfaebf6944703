//! Application layer for the ModelDB syncer.
//!
//! [`SyncSession`] coordinates the identity registry, the event buffer and
//! the metadata client. The `intercept` module wraps estimators so that
//! every fit/predict/transform call records an event into a session.

pub mod intercept;
pub mod session;
pub mod slot;

pub use intercept::{
    InterceptorTable, Intercepted, LABEL_COLUMN, Metric, Operation, PREDICTION_COLUMN, Syncable,
    SyncablePipeline, evaluate_sync, random_split_sync,
};
pub use session::SyncSession;
pub use slot::{SessionSlot, SlotGuard};
