//! Preview box tree.

use serde::Serialize;

use super::theme::Paint;
use crate::model::PixelHandle;

/// Axis-aligned rectangle in preview (CSS pixel) coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Shrinks by `amount` on every side, never below zero size.
    pub fn inset(&self, amount: f32) -> Rect {
        let dx = amount.min(self.width / 2.0);
        let dy = amount.min(self.height / 2.0);
        Rect::new(
            self.x + dx,
            self.y + dy,
            self.width - 2.0 * dx,
            self.height - 2.0 * dy,
        )
    }

    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        (right > x && bottom > y).then(|| Rect::new(x, y, right - x, bottom - y))
    }

    pub fn scale(&self, factor: f32) -> Rect {
        Rect::new(
            self.x * factor,
            self.y * factor,
            self.width * factor,
            self.height * factor,
        )
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// Per-corner radii, clockwise from top-left.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Radii {
    pub top_left: f32,
    pub top_right: f32,
    pub bottom_right: f32,
    pub bottom_left: f32,
}

impl Radii {
    pub const ZERO: Radii = Radii::uniform(0.0);

    pub const fn uniform(r: f32) -> Self {
        Self {
            top_left: r,
            top_right: r,
            bottom_right: r,
            bottom_left: r,
        }
    }

    /// Rounds only the two top corners.
    pub const fn top(r: f32) -> Self {
        Self {
            top_left: r,
            top_right: r,
            bottom_right: 0.0,
            bottom_left: 0.0,
        }
    }

    pub fn scale(&self, factor: f32) -> Radii {
        Radii {
            top_left: self.top_left * factor,
            top_right: self.top_right * factor,
            bottom_right: self.bottom_right * factor,
            bottom_left: self.bottom_left * factor,
        }
    }

    pub fn is_zero(&self) -> bool {
        *self == Radii::ZERO
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BorderStyle {
    Solid,
    Dashed,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Border {
    pub width: f32,
    pub paint: Paint,
    pub style: BorderStyle,
}

/// What a node represents.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum NodeKind {
    Canvas,
    Container { container_id: String },
    Slot { slot_id: String, index: usize, empty: bool },
    Image { attachment_id: String },
    FrameBody,
    FrameHeader,
    FrameDot,
    Notch,
    Label { text: String },
    Placeholder,
    DeleteButton,
    AddSlotButton,
}

/// One box of the preview.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreviewNode {
    pub kind: NodeKind,
    pub rect: Rect,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<Paint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border: Option<Border>,
    #[serde(skip_serializing_if = "Radii::is_zero")]
    pub radii: Radii,
    /// Children are clipped to this node's rect.
    pub clips: bool,
    /// False for interactive affordances that must not appear in exports.
    pub exportable: bool,
    #[serde(skip)]
    pub pixels: Option<PixelHandle>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<PreviewNode>,
}

impl PreviewNode {
    pub fn new(kind: NodeKind, rect: Rect) -> Self {
        Self {
            kind,
            rect,
            background: None,
            border: None,
            radii: Radii::ZERO,
            clips: false,
            exportable: true,
            pixels: None,
            children: Vec::new(),
        }
    }

    pub fn background(mut self, paint: impl Into<Paint>) -> Self {
        self.background = Some(paint.into());
        self
    }

    pub fn border(mut self, border: Border) -> Self {
        self.border = Some(border);
        self
    }

    pub fn radii(mut self, radii: Radii) -> Self {
        self.radii = radii;
        self
    }

    pub fn rounded(self, r: f32) -> Self {
        self.radii(Radii::uniform(r))
    }

    pub fn clipping(mut self) -> Self {
        self.clips = true;
        self
    }

    /// Marks the node as an interactive affordance.
    pub fn interactive(mut self) -> Self {
        self.exportable = false;
        self
    }

    pub fn child(mut self, child: PreviewNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = PreviewNode>) -> Self {
        self.children.extend(children);
        self
    }

    /// Visits this node and its descendants depth-first, parents first.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a PreviewNode)) {
        visit(self);
        for child in &self.children {
            child.walk(visit);
        }
    }
}

/// The complete preview of one composition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreviewTree {
    pub width: f32,
    pub height: f32,
    pub root: PreviewNode,
}

impl PreviewTree {
    /// Bounding box of the whole preview.
    pub fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }

    /// All nodes in depth-first order.
    pub fn nodes(&self) -> Vec<&PreviewNode> {
        let mut out = Vec::new();
        self.root.walk(&mut |n| out.push(n));
        out
    }

    /// Nodes whose kind satisfies `pred`.
    pub fn find_all(&self, pred: impl Fn(&NodeKind) -> bool) -> Vec<&PreviewNode> {
        self.nodes()
            .into_iter()
            .filter(|n| pred(&n.kind))
            .collect()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
