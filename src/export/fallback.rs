//! Structural fallback: rasterize the preview box tree.
//!
//! Used for grid, focus and comparison templates, whose export is whatever
//! the preview shows at a higher pixel density. The tree is first prepared for
//! export: interactive affordances and empty slots are dropped and theme
//! variables are replaced with concrete colors, since the rasterizer only
//! understands concrete paint.

use image::RgbaImage;

use super::draw;
use crate::preview::{NodeKind, Paint, PreviewNode, PreviewTree, Rect, Theme};

/// Rasterizes a prepared preview tree.
pub trait PreviewRasterizer: Send + Sync {
    fn rasterize(&self, tree: &PreviewTree, density: f32) -> Result<RgbaImage, String>;
}

/// Returns a copy of `tree` fit for export.
///
/// Non-exportable nodes and empty slots are removed, and every themed paint is
/// resolved against `theme`. Unknown theme variables are dropped.
pub fn prepare_for_export(tree: &PreviewTree, theme: &Theme) -> PreviewTree {
    PreviewTree {
        width: tree.width,
        height: tree.height,
        root: prepare_node(&tree.root, theme),
    }
}

fn prepare_node(node: &PreviewNode, theme: &Theme) -> PreviewNode {
    let mut out = node.clone();
    out.background = node
        .background
        .and_then(|p| theme.resolve(p))
        .map(Paint::Solid);
    out.border = node.border.and_then(|mut border| {
        border.paint = Paint::Solid(theme.resolve(border.paint)?);
        Some(border)
    });
    out.children = node
        .children
        .iter()
        .filter(|child| child.exportable && !is_empty_slot(child))
        .map(|child| prepare_node(child, theme))
        .collect();
    out
}

fn is_empty_slot(node: &PreviewNode) -> bool {
    matches!(node.kind, NodeKind::Slot { empty: true, .. })
}

/// Built-in rasterizer painting backgrounds, borders and images box by box.
///
/// Labels are kept as plain badges; text is not rendered.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoxRasterizer;

impl PreviewRasterizer for BoxRasterizer {
    fn rasterize(&self, tree: &PreviewTree, density: f32) -> Result<RgbaImage, String> {
        if !(density.is_finite() && density > 0.0) {
            return Err(format!("invalid density {}", density));
        }
        let width = (tree.width * density).ceil() as u32;
        let height = (tree.height * density).ceil() as u32;
        if width == 0 || height == 0 {
            return Err("preview has no area".to_string());
        }
        let mut canvas = RgbaImage::new(width, height);
        // The canvas background covers the whole bounding box, rounded
        // corners included.
        if let Some(paint) = tree.root.background {
            draw::fill(&mut canvas, solid(paint)?);
        }
        let mut painter = Painter {
            canvas: &mut canvas,
            density,
        };
        for child in &tree.root.children {
            painter.paint(child, None)?;
        }
        Ok(canvas)
    }
}

fn solid(paint: Paint) -> Result<crate::color::Color, String> {
    match paint {
        Paint::Solid(c) => Ok(c),
        Paint::Var(v) => Err(format!("unresolved theme color {:?}", v)),
    }
}

struct Painter<'a> {
    canvas: &'a mut RgbaImage,
    density: f32,
}

impl Painter<'_> {
    fn paint(&mut self, node: &PreviewNode, clip: Option<Rect>) -> Result<(), String> {
        let rect = node.rect.scale(self.density);
        let radii = node.radii.scale(self.density);

        if let Some(paint) = node.background {
            draw::fill_rounded_rect(self.canvas, &rect, &radii, solid(paint)?, clip.as_ref());
        }
        if let Some(pixels) = &node.pixels {
            let clip_box = clip.map(|c| {
                let x = c.x.round() as i64;
                let y = c.y.round() as i64;
                (
                    x,
                    y,
                    (c.right().round() as i64 - x).max(0) as u32,
                    (c.bottom().round() as i64 - y).max(0) as u32,
                )
            });
            draw::draw_image(
                self.canvas,
                pixels.pixels(),
                rect.x.round() as i64,
                rect.y.round() as i64,
                rect.width.round().max(0.0) as u32,
                rect.height.round().max(0.0) as u32,
                clip_box,
            );
        }

        let child_clip = if node.clips {
            match clip {
                Some(c) => c.intersect(&rect),
                None => Some(rect),
            }
        } else {
            clip
        };
        // A clipping node with no visible area hides its subtree.
        if !(node.clips && child_clip.is_none()) {
            for child in &node.children {
                self.paint(child, child_clip)?;
            }
        }

        if let Some(border) = node.border {
            draw::stroke_rounded_rect(
                self.canvas,
                &rect,
                &radii,
                border.width * self.density,
                solid(border.paint)?,
                clip.as_ref(),
            );
        }
        Ok(())
    }
}
