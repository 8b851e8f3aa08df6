//! Linear-layout exporters.
//!
//! Both modes work from the images' natural sizes. Gap and padding are scaled
//! from the reference preview so the export keeps the proportions the user
//! saw on screen.

use image::RgbaImage;
use tracing::debug;

use super::{draw, ExportError};
use crate::color::Color;
use crate::layout::Direction;
use crate::model::PixelHandle;
use crate::preview::{REFERENCE_HEIGHT, REFERENCE_WIDTH};
use crate::state::LinearAlign;

/// Aspect ratios above this count as landscape for the original-scale hint.
const LANDSCAPE_ASPECT: f64 = 1.2;
/// Aspect ratios below this count as portrait for the original-scale hint.
const PORTRAIT_ASPECT: f64 = 0.8;
/// Max/min aspect spread above which original scale is suggested.
const ASPECT_SPREAD: f64 = 2.0;
/// Largest canvas a linear export may allocate (16384×16384).
pub const MAX_CANVAS_PIXELS: u64 = 1 << 28;

/// Where one image lands on the export canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Geometry of a linear export, computed before any pixels are touched.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearPlan {
    pub width: u32,
    pub height: u32,
    /// Largest cross-axis natural size.
    pub line: u32,
    pub scaled_gap: u32,
    pub scaled_padding: u32,
    pub placements: Vec<Placement>,
}

/// Ratio between export pixels and preview pixels for spacing.
///
/// `line` is the export's cross-axis content size; the reference content is
/// the preview canvas minus padding on that axis, clamped to at least 1.
pub fn spacing_scale(line: u32, direction: Direction, padding: u32) -> f64 {
    let reference = match direction {
        Direction::Row => REFERENCE_HEIGHT as f64,
        Direction::Column => REFERENCE_WIDTH as f64,
    };
    let content = (reference - 2.0 * padding as f64).max(1.0);
    line as f64 / content
}

fn scale_px(value: u32, factor: f64) -> u32 {
    (value as f64 * factor).round() as u32
}

fn cross_size(dims: (u32, u32), direction: Direction) -> u32 {
    match direction {
        Direction::Row => dims.1,
        Direction::Column => dims.0,
    }
}

/// Plans a uniform-scale export: every image is scaled to the largest
/// cross-axis size.
///
/// Fails before allocating anything when the canvas would exceed
/// [`MAX_CANVAS_PIXELS`].
pub fn plan_uniform(
    dims: &[(u32, u32)],
    direction: Direction,
    padding: u32,
    gap: u32,
) -> Result<LinearPlan, ExportError> {
    let line = dims
        .iter()
        .map(|d| cross_size(*d, direction))
        .max()
        .unwrap_or(0);
    let factor = spacing_scale(line, direction, padding);
    let scaled_gap = scale_px(gap, factor);
    let scaled_padding = scale_px(padding, factor);
    let lengths: Vec<u32> = dims
        .iter()
        .map(|&(w, h)| match direction {
            Direction::Row => (w as f64 * line as f64 / h.max(1) as f64).round() as u32,
            Direction::Column => (h as f64 * line as f64 / w.max(1) as f64).round() as u32,
        })
        .collect();
    let (width, height) = canvas_size(&lengths, line, direction, scaled_gap, scaled_padding)?;

    let mut cursor = scaled_padding;
    let mut placements = Vec::with_capacity(dims.len());
    for (i, &length) in lengths.iter().enumerate() {
        if i > 0 {
            cursor += scaled_gap;
        }
        placements.push(match direction {
            Direction::Row => Placement {
                x: cursor,
                y: scaled_padding,
                width: length,
                height: line,
            },
            Direction::Column => Placement {
                x: scaled_padding,
                y: cursor,
                width: line,
                height: length,
            },
        });
        cursor += length;
    }

    Ok(LinearPlan {
        width,
        height,
        line,
        scaled_gap,
        scaled_padding,
        placements,
    })
}

/// Plans an original-scale export: images keep their natural size and are
/// aligned on the cross axis.
pub fn plan_original(
    dims: &[(u32, u32)],
    direction: Direction,
    padding: u32,
    gap: u32,
    align: LinearAlign,
) -> Result<LinearPlan, ExportError> {
    let line = dims
        .iter()
        .map(|d| cross_size(*d, direction))
        .max()
        .unwrap_or(0);
    let factor = spacing_scale(line, direction, padding);
    let scaled_gap = scale_px(gap, factor);
    let scaled_padding = scale_px(padding, factor);
    let lengths: Vec<u32> = dims
        .iter()
        .map(|&(w, h)| match direction {
            Direction::Row => w,
            Direction::Column => h,
        })
        .collect();
    let (width, height) = canvas_size(&lengths, line, direction, scaled_gap, scaled_padding)?;

    let offset = |size: u32| -> u32 {
        match align {
            LinearAlign::Start => 0,
            LinearAlign::Center => (line - size) / 2,
            LinearAlign::End => line - size,
        }
    };

    let mut cursor = scaled_padding;
    let mut placements = Vec::with_capacity(dims.len());
    for (i, &(w, h)) in dims.iter().enumerate() {
        if i > 0 {
            cursor += scaled_gap;
        }
        let placement = match direction {
            Direction::Row => Placement {
                x: cursor,
                y: scaled_padding + offset(h),
                width: w,
                height: h,
            },
            Direction::Column => Placement {
                x: scaled_padding + offset(w),
                y: cursor,
                width: w,
                height: h,
            },
        };
        cursor += match direction {
            Direction::Row => w,
            Direction::Column => h,
        };
        placements.push(placement);
    }

    Ok(LinearPlan {
        width,
        height,
        line,
        scaled_gap,
        scaled_padding,
        placements,
    })
}

/// Canvas size for primary-axis `lengths`, checked against
/// [`MAX_CANVAS_PIXELS`].
fn canvas_size(
    lengths: &[u32],
    line: u32,
    direction: Direction,
    scaled_gap: u32,
    scaled_padding: u32,
) -> Result<(u32, u32), ExportError> {
    let gaps = lengths.len().saturating_sub(1) as u64 * scaled_gap as u64;
    let primary = lengths.iter().map(|&l| l as u64).sum::<u64>() + gaps + 2 * scaled_padding as u64;
    let cross = line as u64 + 2 * scaled_padding as u64;
    let (width, height) = match direction {
        Direction::Row => (primary, cross),
        Direction::Column => (cross, primary),
    };
    if width.saturating_mul(height) > MAX_CANVAS_PIXELS {
        return Err(ExportError::ExportFailed(format!(
            "canvas {}x{} exceeds the {} pixel limit",
            width, height, MAX_CANVAS_PIXELS
        )));
    }
    // Both sides fit in u32 once the area is within the limit.
    Ok((width as u32, height as u32))
}

/// Hint that original-scale export would look better than uniform.
///
/// True when the set mixes clear landscape and portrait images, or when the
/// aspect ratios differ by more than 2×. Never true for fewer than 2 images.
pub fn should_prefer_original_aspect(dims: &[(u32, u32)]) -> bool {
    if dims.len() < 2 {
        return false;
    }
    let aspects: Vec<f64> = dims
        .iter()
        .map(|&(w, h)| w as f64 / h.max(1) as f64)
        .collect();
    let has_landscape = aspects.iter().any(|&a| a > LANDSCAPE_ASPECT);
    let has_portrait = aspects.iter().any(|&a| a < PORTRAIT_ASPECT);
    if has_landscape && has_portrait {
        return true;
    }
    let max = aspects.iter().copied().fold(f64::MIN, f64::max);
    let min = aspects.iter().copied().fold(f64::MAX, f64::min);
    min > 0.0 && max / min > ASPECT_SPREAD
}

/// Rasterizes `plan` with `images` in placement order.
pub fn render(plan: &LinearPlan, images: &[PixelHandle], background: Option<Color>) -> RgbaImage {
    let mut canvas = RgbaImage::new(plan.width.max(1), plan.height.max(1));
    if let Some(color) = background {
        draw::fill(&mut canvas, color);
    }
    for (placement, image) in plan.placements.iter().zip(images) {
        draw::draw_image(
            &mut canvas,
            image.pixels(),
            placement.x as i64,
            placement.y as i64,
            placement.width,
            placement.height,
            None,
        );
    }
    debug!(
        width = plan.width,
        height = plan.height,
        images = images.len(),
        "linear export rendered"
    );
    canvas
}
