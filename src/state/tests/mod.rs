//! Tests for the CompositionStore module.
//!
//! Tests are organized into categories:
//! - `basic`: get/set/update semantics
//! - `history`: undo, redo, truncation and the history cap
//! - `subscriber`: broadcast channel and notifications

mod history;
mod subscriber;

use super::{CompositionStore, Properties, StatePatch};
use crate::layout::LayoutCatalog;
use crate::model::Composition;

/// Helper function to create a composition from a builtin template id.
pub(super) fn create_test_composition(template_id: &str) -> Composition {
    let catalog = LayoutCatalog::builtin();
    let template = catalog.lookup(template_id).expect("builtin template");
    Composition::new(template)
}

/// Helper returning a patch that changes only the padding.
pub(super) fn padding_patch(padding: u32) -> StatePatch {
    StatePatch::default().properties(Properties {
        padding,
        ..Properties::default()
    })
}

/// Helper creating a store with a small history cap.
pub(super) fn store_with_limit(limit: usize) -> CompositionStore {
    CompositionStore::with_options(Properties::default(), limit)
}
