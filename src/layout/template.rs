//! Layout template definitions.
//!
//! A [`LayoutTemplate`] is an immutable catalog entry. Its [`TemplateShape`]
//! decides how slots are produced: linear templates only carry a direction
//! and a slot count, structural templates carry a weighted grid plus an
//! ordered slot list, and frame templates wrap a single content slot in
//! device chrome.

use std::fmt;

use serde::Serialize;

/// Broad grouping used for display and export strategy selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Linear,
    Structural,
    Frame,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Category::Linear => "linear",
            Category::Structural => "structural",
            Category::Frame => "frame",
        };
        write!(f, "{}", s)
    }
}

/// Main axis of a linear template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    Row,
    Column,
}

/// Device chrome drawn around a frame template's content slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FrameKind {
    Browser,
    Phone,
    Tablet,
}

impl fmt::Display for FrameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FrameKind::Browser => "browser",
            FrameKind::Phone => "phone",
            FrameKind::Tablet => "tablet",
        };
        write!(f, "{}", s)
    }
}

/// How an image is fitted into its slot in the preview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContentFit {
    /// Whole image visible, letterboxed, never upscaled.
    Contain,
    /// Slot fully covered, overflow cropped.
    Cover,
}

/// Semantic role of a slot within its template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SlotRole {
    Primary,
    Secondary,
    Equal,
    Before,
    After,
    Compare,
    Content,
}

/// Explicit grid placement, zero-based track indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct GridArea {
    pub row: u16,
    pub column: u16,
    pub row_span: u16,
    pub column_span: u16,
}

impl GridArea {
    pub const fn cell(row: u16, column: u16) -> Self {
        Self {
            row,
            column,
            row_span: 1,
            column_span: 1,
        }
    }

    pub const fn spanning(row: u16, column: u16, row_span: u16, column_span: u16) -> Self {
        Self {
            row,
            column,
            row_span,
            column_span,
        }
    }
}

/// One slot of a structural or frame template.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlotSpec {
    pub role: SlotRole,
    pub name: String,
    /// Relative size weight, used for documentation and hints only; the grid
    /// tracks decide the rendered size.
    pub weight: f32,
    pub area: Option<GridArea>,
    pub label: Option<String>,
}

impl SlotSpec {
    pub fn new(role: SlotRole, name: &str, weight: f32) -> Self {
        Self {
            role,
            name: name.to_string(),
            weight,
            area: None,
            label: None,
        }
    }

    /// Places the slot at an explicit grid area.
    pub fn at(mut self, area: GridArea) -> Self {
        self.area = Some(area);
        self
    }

    pub fn labeled(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }
}

/// Column and row track weights of a structural template.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridSpec {
    pub columns: Vec<f32>,
    pub rows: Vec<f32>,
}

impl GridSpec {
    pub fn new(columns: &[f32], rows: &[f32]) -> Self {
        Self {
            columns: columns.to_vec(),
            rows: rows.to_vec(),
        }
    }

    /// Auto-flow placement for the slot at `index`, row-major.
    pub fn auto_area(&self, index: usize) -> GridArea {
        let cols = self.columns.len().max(1);
        GridArea::cell((index / cols) as u16, (index % cols) as u16)
    }
}

/// Shape of a template; the variant decides which fields exist.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum TemplateShape {
    Linear {
        direction: Direction,
        initial_slots: usize,
        max_slots: Option<usize>,
    },
    Structural {
        grid: GridSpec,
        slots: Vec<SlotSpec>,
    },
    Framed {
        frame: FrameKind,
        slot: SlotSpec,
    },
}

/// An immutable layout catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutTemplate {
    pub id: String,
    pub name: String,
    pub shape: TemplateShape,
    pub fit: ContentFit,
    /// Render each slot's label as an overlay.
    pub show_labels: bool,
    /// Use per-index comparison tints instead of the surface color.
    pub tinted: bool,
}

impl LayoutTemplate {
    pub fn category(&self) -> Category {
        match self.shape {
            TemplateShape::Linear { .. } => Category::Linear,
            TemplateShape::Structural { .. } => Category::Structural,
            TemplateShape::Framed { .. } => Category::Frame,
        }
    }

    pub fn is_linear(&self) -> bool {
        matches!(self.shape, TemplateShape::Linear { .. })
    }

    pub fn initial_slot_count(&self) -> usize {
        match &self.shape {
            TemplateShape::Linear { initial_slots, .. } => *initial_slots,
            TemplateShape::Structural { slots, .. } => slots.len(),
            TemplateShape::Framed { .. } => 1,
        }
    }

    /// Upper bound on slots; `None` means unbounded (linear only).
    pub fn max_slot_count(&self) -> Option<usize> {
        match &self.shape {
            TemplateShape::Linear { max_slots, .. } => *max_slots,
            _ => Some(self.initial_slot_count()),
        }
    }

    pub fn direction(&self) -> Option<Direction> {
        match self.shape {
            TemplateShape::Linear { direction, .. } => Some(direction),
            _ => None,
        }
    }

    pub fn frame_kind(&self) -> Option<FrameKind> {
        match self.shape {
            TemplateShape::Framed { frame, .. } => Some(frame),
            _ => None,
        }
    }

    /// Ordered slot specs; empty for linear templates.
    pub fn slot_specs(&self) -> &[SlotSpec] {
        match &self.shape {
            TemplateShape::Linear { .. } => &[],
            TemplateShape::Structural { slots, .. } => slots,
            TemplateShape::Framed { slot, .. } => std::slice::from_ref(slot),
        }
    }

    pub fn slot_spec(&self, index: usize) -> Option<&SlotSpec> {
        self.slot_specs().get(index)
    }
}
