//! Identity registry: handle → server id, handle → user tag.
//!
//! Entries are created by a successful sync response or by an explicit
//! tagging call and are never removed. An unknown handle resolves to id
//! `-1` and tag `""`.

use crate::handle::{Handle, ObjectKind};
use crate::wire::UNASSIGNED_ID;
use std::collections::HashMap;

/// Registry size at which a warning is first logged.
pub const DEFAULT_WARN_THRESHOLD: usize = 100_000;

#[derive(Debug, Clone, PartialEq)]
struct Entry {
    kind: ObjectKind,
    server_id: Option<i32>,
    tag: Option<String>,
}

#[derive(Debug)]
pub struct IdentityRegistry {
    entries: HashMap<Handle, Entry>,
    by_id: HashMap<(ObjectKind, i32), Handle>,
    by_tag: HashMap<String, Handle>,
    warn_threshold: usize,
    next_warning_at: usize,
}

impl Default for IdentityRegistry {
    fn default() -> Self {
        Self::with_warn_threshold(DEFAULT_WARN_THRESHOLD)
    }
}

impl IdentityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_warn_threshold(threshold: usize) -> Self {
        let threshold = threshold.max(1);
        Self {
            entries: HashMap::new(),
            by_id: HashMap::new(),
            by_tag: HashMap::new(),
            warn_threshold: threshold,
            next_warning_at: threshold,
        }
    }

    /// Server id for `handle`, or `-1` if it was never synced.
    pub fn resolve_id(&self, handle: Handle) -> i32 {
        self.entries
            .get(&handle)
            .and_then(|e| e.server_id)
            .unwrap_or(UNASSIGNED_ID)
    }

    /// User tag for `handle`, or `""` if it was never tagged.
    pub fn resolve_tag(&self, handle: Handle) -> String {
        self.entries
            .get(&handle)
            .and_then(|e| e.tag.clone())
            .unwrap_or_default()
    }

    /// Records the id the store assigned to `handle`.
    ///
    /// A negative id is the store echoing "unassigned" and is ignored.
    pub fn assign(&mut self, handle: Handle, kind: ObjectKind, server_id: i32) {
        if server_id < 0 {
            return;
        }
        let previous = self.entry(handle, kind).server_id.replace(server_id);
        if let Some(previous) = previous.filter(|id| *id != server_id) {
            self.forget_id(kind, previous, handle);
        }
        self.by_id.insert((kind, server_id), handle);
        tracing::debug!(
            "[IdentityRegistry] {:?} {} -> server id {}",
            kind,
            handle,
            server_id
        );
    }

    /// Records a user tag for `handle`, independent of any server id.
    pub fn tag(&mut self, handle: Handle, kind: ObjectKind, tag: impl Into<String>) {
        let tag = tag.into();
        let previous = self.entry(handle, kind).tag.replace(tag.clone());
        if let Some(previous) = previous.filter(|p| *p != tag) {
            if self.by_tag.get(&previous) == Some(&handle) {
                self.by_tag.remove(&previous);
            }
        }
        self.by_tag.insert(tag, handle);
    }

    fn forget_id(&mut self, kind: ObjectKind, server_id: i32, handle: Handle) {
        if self.by_id.get(&(kind, server_id)) == Some(&handle) {
            self.by_id.remove(&(kind, server_id));
        }
    }

    /// Reverse lookup of a server id.
    pub fn handle_for_id(&self, kind: ObjectKind, server_id: i32) -> Option<Handle> {
        self.by_id.get(&(kind, server_id)).copied()
    }

    /// Reverse lookup of a tag.
    pub fn handle_for_tag(&self, tag: &str) -> Option<Handle> {
        self.by_tag.get(tag).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn entry(&mut self, handle: Handle, kind: ObjectKind) -> &mut Entry {
        if !self.entries.contains_key(&handle) && self.entries.len() + 1 >= self.next_warning_at {
            tracing::warn!(
                "[IdentityRegistry] registry holds {} entries and never evicts",
                self.entries.len() + 1
            );
            self.next_warning_at = self.next_warning_at.saturating_add(self.warn_threshold);
        }
        self.entries.entry(handle).or_insert(Entry {
            kind,
            server_id: None,
            tag: None,
        })
    }
}
