//! Preview renderer.
//!
//! Builds a [`PreviewTree`] approximating the on-screen preview on the fixed
//! 900×560 reference canvas. The tree is not pixel exact; the exporter only
//! uses it for the structural fallback. Colors that depend on the active theme
//! stay symbolic ([`Paint::Var`]) until export resolves them.

mod theme;
mod tree;

pub use theme::{Paint, Theme, ThemeVar};
pub use tree::{Border, BorderStyle, NodeKind, PreviewNode, PreviewTree, Radii, Rect};

use crate::color::Color;
use crate::layout::{
    ContentFit, Direction, FrameKind, GridSpec, LayoutTemplate, TemplateShape, COMPARISON_TINTS,
};
use crate::model::{Composition, Slot};
use crate::state::{CompositionState, Properties};

/// Reference canvas width in preview pixels.
pub const REFERENCE_WIDTH: f32 = 900.0;
/// Reference canvas height in preview pixels.
pub const REFERENCE_HEIGHT: f32 = 560.0;

const ADD_SLOT_SIZE: f32 = 44.0;
const DELETE_SIZE: f32 = 24.0;
const DELETE_INSET: f32 = 8.0;
const LABEL_INSET: f32 = 8.0;
const LABEL_HEIGHT: f32 = 20.0;

// ---------------------------------------------------------------------------
// Frame chrome
// ---------------------------------------------------------------------------

const BROWSER_HEADER: f32 = 32.0;
const BROWSER_DOT: f32 = 10.0;
const BROWSER_DOT_GAP: f32 = 6.0;
const BROWSER_DOT_PADDING: f32 = 12.0;
pub(crate) const BROWSER_DOT_COLORS: [Color; 3] = [
    Color::rgb(0xff, 0x5f, 0x57),
    Color::rgb(0xfe, 0xbc, 0x2e),
    Color::rgb(0x28, 0xc8, 0x40),
];

const PHONE_ASPECT: f32 = 9.0 / 19.5;
const PHONE_VERTICAL_MARGIN: f32 = 20.0;
const PHONE_RADIUS: f32 = 36.0;
const PHONE_PADDING: f32 = 8.0;
const PHONE_BAR: f32 = 24.0;
const PHONE_CHIN: f32 = 16.0;
const PHONE_INNER_RADIUS: f32 = 28.0;

const TABLET_INSET: f32 = 20.0;
const TABLET_RADIUS: f32 = 20.0;
const TABLET_PADDING: f32 = 10.0;
const TABLET_INNER_RADIUS: f32 = 12.0;

pub(crate) const DEVICE_BODY: Color = Color::rgb(0x1a, 0x1a, 0x1a);
const NOTCH_COLOR: Color = Color::rgb(0x33, 0x33, 0x33);
const LABEL_BACKGROUND: Color = Color::rgba(0x00, 0x00, 0x00, 0x99);

/// Renders the preview for `state`, or `None` when no composition exists.
pub fn render(state: &CompositionState) -> Option<PreviewTree> {
    let composition = state.composition.as_ref()?;
    Some(render_composition(composition, &state.properties))
}

/// Renders `composition` with `properties` on the reference canvas.
pub fn render_composition(composition: &Composition, properties: &Properties) -> PreviewTree {
    let bounds = Rect::new(0.0, 0.0, REFERENCE_WIDTH, REFERENCE_HEIGHT);
    let mut canvas = PreviewNode::new(NodeKind::Canvas, bounds)
        .rounded(properties.roundness as f32)
        .clipping();
    if let Some(fill) = properties.background.fill() {
        canvas = canvas.background(fill);
    }

    let content = bounds.inset(properties.padding as f32);
    let layout = Layout {
        template: &composition.template,
        properties,
    };
    let containers = composition.containers.iter().map(|container| {
        let children = match &composition.template.shape {
            TemplateShape::Linear { direction, .. } => {
                layout.linear(&container.slots, *direction, content, composition.can_grow())
            }
            TemplateShape::Structural { grid, .. } => layout.grid(&container.slots, grid, content),
            TemplateShape::Framed { frame, .. } => layout.frame(&container.slots, *frame, content),
        };
        PreviewNode::new(
            NodeKind::Container {
                container_id: container.id.to_string(),
            },
            content,
        )
        .with_children(children)
    });

    PreviewTree {
        width: REFERENCE_WIDTH,
        height: REFERENCE_HEIGHT,
        root: canvas.with_children(containers.collect::<Vec<_>>()),
    }
}

/// Places an image of natural size `width`×`height` inside `slot`.
///
/// Contain never upscales; cover fills the slot and relies on clipping.
pub fn fit_image(slot: Rect, width: u32, height: u32, fit: ContentFit) -> Rect {
    let (iw, ih) = (width.max(1) as f32, height.max(1) as f32);
    let scale = match fit {
        ContentFit::Contain => (slot.width / iw).min(slot.height / ih).min(1.0),
        ContentFit::Cover => (slot.width / iw).max(slot.height / ih),
    };
    let (w, h) = (iw * scale, ih * scale);
    Rect::new(
        slot.x + (slot.width - w) / 2.0,
        slot.y + (slot.height - h) / 2.0,
        w,
        h,
    )
}

/// Splits `length` starting at `start` into weighted tracks separated by
/// `gap`. Returns `(offset, size)` per track.
fn tracks(start: f32, length: f32, weights: &[f32], gap: f32) -> Vec<(f32, f32)> {
    if weights.is_empty() {
        return Vec::new();
    }
    let available = (length - gap * (weights.len() - 1) as f32).max(0.0);
    let total: f32 = weights.iter().sum();
    let mut offset = start;
    weights
        .iter()
        .map(|w| {
            let size = if total > 0.0 {
                available * w / total
            } else {
                0.0
            };
            let track = (offset, size);
            offset += size + gap;
            track
        })
        .collect()
}

struct Layout<'a> {
    template: &'a LayoutTemplate,
    properties: &'a Properties,
}

impl Layout<'_> {
    fn gap(&self) -> f32 {
        self.properties.gap as f32
    }

    fn roundness(&self) -> f32 {
        self.properties.roundness as f32
    }

    fn linear(
        &self,
        slots: &[Slot],
        direction: Direction,
        content: Rect,
        can_grow: bool,
    ) -> Vec<PreviewNode> {
        let gap = self.gap();
        let reserved = if can_grow { ADD_SLOT_SIZE + gap } else { 0.0 };
        let weights = vec![1.0; slots.len()];
        let mut nodes = Vec::with_capacity(slots.len() + 1);

        let (main_start, main_len) = match direction {
            Direction::Row => (content.x, (content.width - reserved).max(0.0)),
            Direction::Column => (content.y, (content.height - reserved).max(0.0)),
        };
        for (slot, (offset, size)) in slots.iter().zip(tracks(main_start, main_len, &weights, gap)) {
            let rect = match direction {
                Direction::Row => Rect::new(offset, content.y, size, content.height),
                Direction::Column => Rect::new(content.x, offset, content.width, size),
            };
            nodes.push(self.slot(slot, rect));
        }

        if can_grow {
            let rect = match direction {
                Direction::Row => Rect::new(
                    content.right() - ADD_SLOT_SIZE,
                    content.y,
                    ADD_SLOT_SIZE,
                    content.height,
                ),
                Direction::Column => Rect::new(
                    content.x,
                    content.bottom() - ADD_SLOT_SIZE,
                    content.width,
                    ADD_SLOT_SIZE,
                ),
            };
            nodes.push(
                PreviewNode::new(NodeKind::AddSlotButton, rect)
                    .rounded(self.roundness())
                    .border(dashed(ThemeVar::EmptyBorder))
                    .interactive(),
            );
        }
        nodes
    }

    fn grid(&self, slots: &[Slot], grid: &GridSpec, content: Rect) -> Vec<PreviewNode> {
        let gap = self.gap();
        let columns = tracks(content.x, content.width, &grid.columns, gap);
        let rows = tracks(content.y, content.height, &grid.rows, gap);
        let span = |list: &[(f32, f32)], start: u16, count: u16| -> Option<(f32, f32)> {
            let first = list.get(start as usize)?;
            let last = list.get((start + count.max(1) - 1) as usize)?;
            Some((first.0, last.0 + last.1 - first.0))
        };

        slots
            .iter()
            .filter_map(|slot| {
                let area = self
                    .template
                    .slot_spec(slot.index)
                    .and_then(|s| s.area)
                    .unwrap_or_else(|| grid.auto_area(slot.index));
                let (x, width) = span(&columns, area.column, area.column_span)?;
                let (y, height) = span(&rows, area.row, area.row_span)?;
                Some(self.slot(slot, Rect::new(x, y, width, height)))
            })
            .collect()
    }

    fn frame(&self, slots: &[Slot], kind: FrameKind, content: Rect) -> Vec<PreviewNode> {
        let Some(slot) = slots.first() else {
            return Vec::new();
        };
        let body = match kind {
            FrameKind::Browser => {
                let header = Rect::new(content.x, content.y, content.width, BROWSER_HEADER);
                let dots = BROWSER_DOT_COLORS.iter().enumerate().map(|(i, color)| {
                    let x = content.x + BROWSER_DOT_PADDING + i as f32 * (BROWSER_DOT + BROWSER_DOT_GAP);
                    let y = content.y + (BROWSER_HEADER - BROWSER_DOT) / 2.0;
                    PreviewNode::new(NodeKind::FrameDot, Rect::new(x, y, BROWSER_DOT, BROWSER_DOT))
                        .background(*color)
                        .rounded(BROWSER_DOT / 2.0)
                });
                let screen = Rect::new(
                    content.x,
                    content.y + BROWSER_HEADER,
                    content.width,
                    (content.height - BROWSER_HEADER).max(0.0),
                );
                PreviewNode::new(NodeKind::FrameBody, content)
                    .background(Color::WHITE)
                    .border(Border {
                        width: 1.0,
                        paint: Paint::Var(ThemeVar::BrowserBorder),
                        style: BorderStyle::Solid,
                    })
                    .rounded(self.roundness())
                    .clipping()
                    .child(
                        PreviewNode::new(NodeKind::FrameHeader, header)
                            .background(ThemeVar::BrowserChrome)
                            .radii(Radii::top(self.roundness()))
                            .with_children(dots.collect::<Vec<_>>()),
                    )
                    .child(self.frame_slot(slot, screen, 0.0))
            }
            FrameKind::Phone => {
                let height = (content.height - PHONE_VERTICAL_MARGIN).max(0.0);
                let width = height * PHONE_ASPECT;
                let body = Rect::new(
                    content.x + (content.width - width) / 2.0,
                    content.y + (content.height - height) / 2.0,
                    width,
                    height,
                );
                let inner = body.inset(PHONE_PADDING);
                let notch_width = (inner.width * 0.3).min(60.0);
                let notch = Rect::new(
                    inner.x + (inner.width - notch_width) / 2.0,
                    inner.y + (PHONE_BAR - 6.0) / 2.0,
                    notch_width,
                    6.0,
                );
                let screen = Rect::new(
                    inner.x,
                    inner.y + PHONE_BAR,
                    inner.width,
                    (inner.height - PHONE_BAR - PHONE_CHIN).max(0.0),
                );
                PreviewNode::new(NodeKind::FrameBody, body)
                    .background(DEVICE_BODY)
                    .rounded(PHONE_RADIUS)
                    .child(
                        PreviewNode::new(NodeKind::Notch, notch)
                            .background(NOTCH_COLOR)
                            .rounded(3.0),
                    )
                    .child(self.frame_slot(slot, screen, PHONE_INNER_RADIUS))
            }
            FrameKind::Tablet => {
                let body = content.inset(TABLET_INSET);
                let screen = body.inset(TABLET_PADDING);
                PreviewNode::new(NodeKind::FrameBody, body)
                    .background(DEVICE_BODY)
                    .rounded(TABLET_RADIUS)
                    .child(self.frame_slot(slot, screen, TABLET_INNER_RADIUS))
            }
        };
        vec![body]
    }

    fn frame_slot(&self, slot: &Slot, rect: Rect, radius: f32) -> PreviewNode {
        let node = slot_node(slot, rect).background(Color::WHITE).rounded(radius);
        self.fill_slot(node, slot, rect)
    }

    fn slot(&self, slot: &Slot, rect: Rect) -> PreviewNode {
        let background = if self.template.tinted {
            COMPARISON_TINTS
                .get(slot.index % COMPARISON_TINTS.len())
                .and_then(|hex| Color::from_hex(hex).ok())
                .map(Paint::Solid)
                .unwrap_or(Paint::Var(ThemeVar::Surface))
        } else {
            Paint::Var(ThemeVar::Surface)
        };
        let mut node = slot_node(slot, rect)
            .background(background)
            .rounded(self.roundness());
        if slot.is_empty() {
            node = node.border(dashed(ThemeVar::EmptyBorder));
        }
        node = self.fill_slot(node, slot, rect);

        if self.template.show_labels {
            if let Some(label) = self.template.slot_spec(slot.index).and_then(|s| s.label.as_deref()) {
                let width = 8.0 * label.chars().count() as f32 + 16.0;
                node = node.child(
                    PreviewNode::new(
                        NodeKind::Label {
                            text: label.to_string(),
                        },
                        Rect::new(rect.x + LABEL_INSET, rect.y + LABEL_INSET, width, LABEL_HEIGHT),
                    )
                    .background(LABEL_BACKGROUND)
                    .rounded(4.0),
                );
            }
        }
        node
    }

    /// Adds the image (or placeholder) and the delete affordance.
    fn fill_slot(&self, node: PreviewNode, slot: &Slot, rect: Rect) -> PreviewNode {
        match slot.image() {
            Some(attachment) => {
                let placed = fit_image(rect, attachment.width(), attachment.height(), self.template.fit);
                let mut image = PreviewNode::new(
                    NodeKind::Image {
                        attachment_id: attachment.id().to_string(),
                    },
                    placed,
                );
                image.pixels = Some(attachment.pixels().clone());
                let delete = Rect::new(
                    rect.right() - DELETE_INSET - DELETE_SIZE,
                    rect.y + DELETE_INSET,
                    DELETE_SIZE,
                    DELETE_SIZE,
                );
                node.child(image).child(
                    PreviewNode::new(NodeKind::DeleteButton, delete)
                        .background(ThemeVar::Control)
                        .rounded(DELETE_SIZE / 2.0)
                        .interactive(),
                )
            }
            None => node.child(
                PreviewNode::new(NodeKind::Placeholder, rect)
                    .background(ThemeVar::Placeholder)
                    .interactive(),
            ),
        }
    }
}

fn slot_node(slot: &Slot, rect: Rect) -> PreviewNode {
    PreviewNode::new(
        NodeKind::Slot {
            slot_id: slot.id.to_string(),
            index: slot.index,
            empty: slot.is_empty(),
        },
        rect,
    )
    .clipping()
}

fn dashed(var: ThemeVar) -> Border {
    Border {
        width: 2.0,
        paint: Paint::Var(var),
        style: BorderStyle::Dashed,
    }
}
