//! Process-wide session slot.
//!
//! At most one session is live per slot. Opening another session is
//! refused, whatever its configuration, until the holder has been dropped.

use modeldb_core::config::SyncerConfig;
use modeldb_core::error::{ModelDbError, Result};
use once_cell::sync::Lazy;
use std::sync::{Arc, Mutex, MutexGuard};

static GLOBAL_SLOT: Lazy<Arc<SessionSlot>> = Lazy::new(|| Arc::new(SessionSlot::new()));

#[derive(Debug, Default)]
pub struct SessionSlot {
    holder: Mutex<Option<SyncerConfig>>,
}

impl SessionSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// The slot shared by every session in this process.
    pub fn global() -> Arc<SessionSlot> {
        GLOBAL_SLOT.clone()
    }

    /// Claims the slot for `config`.
    ///
    /// # Errors
    ///
    /// `AlreadyInitialized` if a session already holds the slot.
    pub fn claim(self: &Arc<Self>, config: &SyncerConfig) -> Result<SlotGuard> {
        let mut holder = self.lock();
        if let Some(existing) = holder.as_ref() {
            if existing == config {
                tracing::warn!(
                    "[SessionSlot] refusing second session for {}; the live session must be reused",
                    config.address()
                );
            } else {
                tracing::warn!(
                    "[SessionSlot] refusing session for {} while one for {} is live",
                    config.address(),
                    existing.address()
                );
            }
            return Err(ModelDbError::AlreadyInitialized);
        }
        *holder = Some(config.clone());
        Ok(SlotGuard { slot: self.clone() })
    }

    /// Configuration of the session currently holding the slot.
    pub fn active_config(&self) -> Option<SyncerConfig> {
        self.lock().clone()
    }

    fn release(&self) {
        self.lock().take();
    }

    fn lock(&self) -> MutexGuard<'_, Option<SyncerConfig>> {
        self.holder.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Keeps the slot claimed while alive.
#[derive(Debug)]
pub struct SlotGuard {
    slot: Arc<SessionSlot>,
}

impl Drop for SlotGuard {
    fn drop(&mut self) {
        self.slot.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(port: u16) -> SyncerConfig {
        SyncerConfig {
            port,
            ..SyncerConfig::default()
        }
    }

    #[test]
    fn second_claim_is_refused_even_with_the_same_configuration() {
        let slot = Arc::new(SessionSlot::new());
        let _held = slot.claim(&config(1)).unwrap();

        let err = slot.claim(&config(1)).unwrap_err();
        assert!(matches!(err, ModelDbError::AlreadyInitialized));
        assert_eq!(slot.active_config(), Some(config(1)));
    }

    #[test]
    fn different_configuration_is_refused() {
        let slot = Arc::new(SessionSlot::new());
        let _held = slot.claim(&config(1)).unwrap();

        let err = slot.claim(&config(2)).unwrap_err();
        assert!(matches!(err, ModelDbError::AlreadyInitialized));
        assert_eq!(slot.active_config(), Some(config(1)));
    }

    #[test]
    fn slot_is_free_again_after_release() {
        let slot = Arc::new(SessionSlot::new());
        drop(slot.claim(&config(1)).unwrap());
        assert_eq!(slot.active_config(), None);

        assert!(slot.claim(&config(2)).is_ok());
    }
}
