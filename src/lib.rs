//! PictriKit library
//!
//! Composes screenshots and images into a single picture from a catalog of
//! layout templates, previews the result on a fixed reference canvas, and
//! exports a PNG sized from the images' natural resolutions.

/// Service wiring and the compose/save flow used by the CLI.
pub mod app;

/// Hex colors and canvas backgrounds.
pub mod color;

/// Configuration file schema, loading and XDG path resolution.
pub mod config;

/// Template instantiation and structural edits.
pub mod engine;

/// PNG export: linear, device frame and structural fallback.
pub mod export;

/// Feedback submission, listing and admin moderation.
pub mod feedback;

/// File validation, decoding and attachment to slots.
pub mod ingest;

/// Layout templates and the built-in catalog.
pub mod layout;

/// Tracing subscriber setup.
pub mod logging;

/// Compositions, containers, slots and attachments.
pub mod model;

/// Box-tree preview renderer.
pub mod preview;

/// Composition state store with undo/redo history.
pub mod state;

pub use app::{App, AppError};
pub use config::Config;
