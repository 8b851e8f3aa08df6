//! Layout catalog.
//!
//! Provides the built-in layout templates that a composition is instantiated
//! from. Templates are looked up by id (`grid-2x2`, `phone`, ...) and are
//! snapshotted into the composition, never live-linked.

mod presets;
mod template;

pub use presets::{LayoutCatalog, COMPARISON_TINTS};
pub use template::{
    Category, ContentFit, Direction, FrameKind, GridArea, GridSpec, LayoutTemplate, SlotRole,
    SlotSpec, TemplateShape,
};
