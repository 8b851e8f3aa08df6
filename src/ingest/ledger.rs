//! Transient resource bookkeeping.
//!
//! Every attachment hands the preview host an object-URL style handle. The
//! ledger tracks which handles are live so they can be revoked explicitly
//! when an attachment is replaced, cleared, or its composition is dropped.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::model::{AttachmentId, Composition};

/// Shared registry of live transient resources, keyed by attachment.
#[derive(Debug, Clone, Default)]
pub struct ResourceLedger {
    live: Arc<Mutex<HashMap<AttachmentId, String>>>,
}

impl ResourceLedger {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<AttachmentId, String>> {
        // A poisoned ledger still holds consistent data: every operation is a
        // single map insert or remove.
        self.live.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Registers a resource for `id` and returns its handle.
    pub fn acquire(&self, id: &AttachmentId) -> String {
        let handle = format!("blob:pictrikit/{}", id);
        self.lock().insert(id.clone(), handle.clone());
        tracing::trace!(attachment = %id, "transient resource acquired");
        handle
    }

    /// Revokes the resource for `id`. Returns `false` if none was live.
    pub fn revoke(&self, id: &AttachmentId) -> bool {
        let removed = self.lock().remove(id).is_some();
        if removed {
            tracing::trace!(attachment = %id, "transient resource revoked");
        }
        removed
    }

    /// Revokes every resource held by `composition`'s attachments.
    pub fn revoke_composition(&self, composition: &Composition) -> usize {
        composition
            .attachments()
            .filter(|a| self.revoke(a.id()))
            .count()
    }

    /// Returns the live handle for `id`, if any.
    pub fn handle(&self, id: &AttachmentId) -> Option<String> {
        self.lock().get(id).cloned()
    }

    pub fn is_live(&self, id: &AttachmentId) -> bool {
        self.lock().contains_key(id)
    }

    pub fn live_count(&self) -> usize {
        self.lock().len()
    }
}
