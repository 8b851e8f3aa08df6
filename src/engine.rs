//! Layout engine.
//!
//! Turns catalog templates into compositions and applies the structural edits
//! the editor allows: growing linear layouts, deleting containers, selection,
//! zoom and visual properties. Every check-and-mutate runs inside one store
//! transaction.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::ingest::ResourceLedger;
use crate::layout::LayoutCatalog;
use crate::model::{Composition, CompositionId, ContainerId};
use crate::state::{clamp_zoom, CompositionStore, Properties, ZOOM_STEP};

#[derive(Debug, Clone)]
pub struct LayoutEngine {
    catalog: Arc<LayoutCatalog>,
    store: CompositionStore,
    ledger: ResourceLedger,
}

impl LayoutEngine {
    pub fn new(catalog: Arc<LayoutCatalog>, store: CompositionStore, ledger: ResourceLedger) -> Self {
        Self {
            catalog,
            store,
            ledger,
        }
    }

    pub fn catalog(&self) -> &LayoutCatalog {
        &self.catalog
    }

    /// Creates a composition from `template_id`, replacing the active one.
    ///
    /// Returns `None` for an unknown id, leaving state untouched. Resources of
    /// the replaced composition's attachments are revoked.
    pub async fn instantiate(&self, template_id: &str) -> Option<Composition> {
        let Some(template) = self.catalog.lookup(template_id) else {
            warn!(template_id, "unknown layout template");
            return None;
        };
        let composition = Composition::new(template);
        let ledger = self.ledger.clone();
        let created = composition.clone();
        self.store
            .update(true, move |state| {
                if let Some(previous) = state.composition.take() {
                    ledger.revoke_composition(&previous);
                }
                state.composition = Some(composition);
                state.selected_container = None;
            })
            .await;
        debug!(
            template_id,
            composition = %created.id,
            slots = created.slot_count(),
            "composition instantiated"
        );
        Some(created)
    }

    /// True if the active composition is `composition_id` and may gain a slot.
    pub async fn can_grow(&self, composition_id: &CompositionId) -> bool {
        self.store
            .get()
            .await
            .composition
            .as_ref()
            .is_some_and(|c| &c.id == composition_id && c.can_grow())
    }

    /// Appends one empty slot to a growable linear composition.
    pub async fn grow_by_one(&self, composition_id: &CompositionId) -> bool {
        let grown = self
            .store
            .try_update(true, |state| {
                let composition = state
                    .composition
                    .as_mut()
                    .filter(|c| &c.id == composition_id && c.can_grow())
                    .ok_or(())?;
                let container = composition.containers.first_mut().ok_or(())?;
                Ok(container.push_empty_slot().index)
            })
            .await;
        match grown {
            Ok(index) => {
                debug!(composition = %composition_id, index, "slot added");
                true
            }
            Err(()) => {
                debug!(composition = %composition_id, "slot add refused");
                false
            }
        }
    }

    /// Deletes a container. Deleting the sole container drops the whole
    /// composition and clears the selection.
    pub async fn delete_container(&self, container_id: &ContainerId) -> bool {
        let ledger = self.ledger.clone();
        let deleted = self
            .store
            .try_update(true, move |state| {
                let composition = state.composition.as_mut().ok_or(())?;
                let position = composition
                    .containers
                    .iter()
                    .position(|c| &c.id == container_id)
                    .ok_or(())?;
                if composition.containers.len() == 1 {
                    if let Some(previous) = state.composition.take() {
                        ledger.revoke_composition(&previous);
                    }
                    state.selected_container = None;
                } else {
                    let removed = composition.containers.remove(position);
                    for attachment in removed.slots.iter().filter_map(|s| s.image()) {
                        ledger.revoke(attachment.id());
                    }
                    if state.selected_container.as_ref() == Some(container_id) {
                        state.selected_container = None;
                    }
                }
                Ok::<(), ()>(())
            })
            .await
            .is_ok();
        if deleted {
            debug!(container = %container_id, "container deleted");
        } else {
            debug!(container = %container_id, "container delete ignored, not found");
        }
        deleted
    }

    /// Sets or clears the selected container. Not historized.
    pub async fn select_container(&self, container_id: Option<ContainerId>) {
        self.store
            .update(false, |state| state.selected_container = container_id)
            .await
    }

    /// Sets the zoom factor, clamped to the supported range. Not historized.
    pub async fn set_zoom(&self, zoom: f32) -> f32 {
        self.store
            .update(false, |state| {
                state.zoom = clamp_zoom(zoom);
                state.zoom
            })
            .await
    }

    pub async fn zoom_in(&self) -> f32 {
        self.step_zoom(ZOOM_STEP).await
    }

    pub async fn zoom_out(&self) -> f32 {
        self.step_zoom(-ZOOM_STEP).await
    }

    async fn step_zoom(&self, delta: f32) -> f32 {
        self.store
            .update(false, |state| {
                state.zoom = clamp_zoom(state.zoom + delta);
                state.zoom
            })
            .await
    }

    /// Replaces the visual properties. Historized.
    pub async fn set_properties(&self, properties: Properties) {
        self.store
            .update(true, |state| state.properties = properties)
            .await;
        debug!(?properties, "properties updated");
    }
}
