//! Stable identity handles for tracked objects.
//!
//! Every frame, fitted model and parameter specification gets a `Handle`
//! the first time it is seen. The registry keys on handles instead of
//! memory addresses, so a dropped object can never alias a new one.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_HANDLE: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a tracked object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Handle(u64);

impl Handle {
    /// Mints a handle that has never been returned before in this process.
    pub fn next() -> Self {
        Self(NEXT_HANDLE.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Which wire record family a handle belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    DataFrame,
    Transformer,
    TransformerSpec,
}

/// Anything that carries a handle and can be tagged or resolved.
pub trait Trackable {
    fn handle(&self) -> Handle;
    fn kind(&self) -> ObjectKind;
}
