//! Raster drawing primitives over `image::RgbaImage`.
//!
//! Shapes are antialiased by per-pixel coverage against the pixel center and
//! composited source-over.

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};

use crate::color::Color;
use crate::preview::{Radii, Rect};

/// Filter used whenever an image is drawn at a size other than its own.
pub(crate) const RESAMPLE_FILTER: FilterType = FilterType::Lanczos3;

/// Fills every pixel with `color`, replacing what was there.
pub(crate) fn fill(canvas: &mut RgbaImage, color: Color) {
    let px = color.to_rgba();
    for pixel in canvas.pixels_mut() {
        *pixel = px;
    }
}

/// Source-over blend of `color` scaled by `coverage` into one pixel.
fn blend(dst: &mut Rgba<u8>, color: Color, coverage: f32) {
    let src_a = (color.a as f32 / 255.0) * coverage.clamp(0.0, 1.0);
    if src_a <= 0.0 {
        return;
    }
    let dst_a = dst.0[3] as f32 / 255.0;
    let out_a = src_a + dst_a * (1.0 - src_a);
    if out_a <= 0.0 {
        *dst = Rgba([0, 0, 0, 0]);
        return;
    }
    let src = [color.r, color.g, color.b];
    for (i, s) in src.iter().enumerate() {
        let s = *s as f32 / 255.0;
        let d = dst.0[i] as f32 / 255.0;
        let out = (s * src_a + d * dst_a * (1.0 - src_a)) / out_a;
        dst.0[i] = (out * 255.0).round().clamp(0.0, 255.0) as u8;
    }
    dst.0[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
}

/// Radii limited so opposite corners never overlap.
fn clamp_radii(rect: &Rect, radii: &Radii) -> Radii {
    let max = (rect.width.min(rect.height) / 2.0).max(0.0);
    Radii {
        top_left: radii.top_left.clamp(0.0, max),
        top_right: radii.top_right.clamp(0.0, max),
        bottom_right: radii.bottom_right.clamp(0.0, max),
        bottom_left: radii.bottom_left.clamp(0.0, max),
    }
}

/// Coverage of the point `(px, py)` by a rounded rectangle.
pub(crate) fn rounded_rect_coverage(rect: &Rect, radii: &Radii, px: f32, py: f32) -> f32 {
    if px < rect.x || px >= rect.right() || py < rect.y || py >= rect.bottom() {
        return 0.0;
    }
    let r = clamp_radii(rect, radii);
    let corner = if px < rect.x + r.top_left && py < rect.y + r.top_left {
        Some((r.top_left, rect.x + r.top_left, rect.y + r.top_left))
    } else if px > rect.right() - r.top_right && py < rect.y + r.top_right {
        Some((r.top_right, rect.right() - r.top_right, rect.y + r.top_right))
    } else if px > rect.right() - r.bottom_right && py > rect.bottom() - r.bottom_right {
        Some((
            r.bottom_right,
            rect.right() - r.bottom_right,
            rect.bottom() - r.bottom_right,
        ))
    } else if px < rect.x + r.bottom_left && py > rect.bottom() - r.bottom_left {
        Some((r.bottom_left, rect.x + r.bottom_left, rect.bottom() - r.bottom_left))
    } else {
        None
    };
    match corner {
        Some((radius, cx, cy)) => {
            let d = ((px - cx).powi(2) + (py - cy).powi(2)).sqrt();
            (radius - d + 0.5).clamp(0.0, 1.0)
        }
        None => 1.0,
    }
}

/// Pixel bounds of `rect` clipped to the canvas and optional `clip`.
fn pixel_bounds(canvas: &RgbaImage, rect: &Rect, clip: Option<&Rect>) -> Option<(u32, u32, u32, u32)> {
    let full = Rect::new(0.0, 0.0, canvas.width() as f32, canvas.height() as f32);
    let mut area = rect.intersect(&full)?;
    if let Some(clip) = clip {
        area = area.intersect(clip)?;
    }
    let x0 = area.x.floor().max(0.0) as u32;
    let y0 = area.y.floor().max(0.0) as u32;
    let x1 = (area.right().ceil() as u32).min(canvas.width());
    let y1 = (area.bottom().ceil() as u32).min(canvas.height());
    (x1 > x0 && y1 > y0).then_some((x0, y0, x1, y1))
}

fn clip_contains(clip: Option<&Rect>, px: f32, py: f32) -> bool {
    clip.map_or(true, |c| px >= c.x && px < c.right() && py >= c.y && py < c.bottom())
}

/// Fills a rounded rectangle.
pub(crate) fn fill_rounded_rect(
    canvas: &mut RgbaImage,
    rect: &Rect,
    radii: &Radii,
    color: Color,
    clip: Option<&Rect>,
) {
    let Some((x0, y0, x1, y1)) = pixel_bounds(canvas, rect, clip) else {
        return;
    };
    for y in y0..y1 {
        for x in x0..x1 {
            let (px, py) = (x as f32 + 0.5, y as f32 + 0.5);
            if !clip_contains(clip, px, py) {
                continue;
            }
            let coverage = rounded_rect_coverage(rect, radii, px, py);
            if coverage > 0.0 {
                blend(canvas.get_pixel_mut(x, y), color, coverage);
            }
        }
    }
}

/// Strokes the inside edge of a rounded rectangle with `width`.
pub(crate) fn stroke_rounded_rect(
    canvas: &mut RgbaImage,
    rect: &Rect,
    radii: &Radii,
    width: f32,
    color: Color,
    clip: Option<&Rect>,
) {
    let inner = rect.inset(width);
    let inner_radii = Radii {
        top_left: (radii.top_left - width).max(0.0),
        top_right: (radii.top_right - width).max(0.0),
        bottom_right: (radii.bottom_right - width).max(0.0),
        bottom_left: (radii.bottom_left - width).max(0.0),
    };
    let Some((x0, y0, x1, y1)) = pixel_bounds(canvas, rect, clip) else {
        return;
    };
    for y in y0..y1 {
        for x in x0..x1 {
            let (px, py) = (x as f32 + 0.5, y as f32 + 0.5);
            if !clip_contains(clip, px, py) {
                continue;
            }
            let outer = rounded_rect_coverage(rect, radii, px, py);
            let hole = if inner.is_empty() {
                0.0
            } else {
                rounded_rect_coverage(&inner, &inner_radii, px, py)
            };
            let coverage = (outer - hole).max(0.0);
            if coverage > 0.0 {
                blend(canvas.get_pixel_mut(x, y), color, coverage);
            }
        }
    }
}

/// Fills a circle centered at `(cx, cy)`.
pub(crate) fn fill_circle(canvas: &mut RgbaImage, cx: f32, cy: f32, radius: f32, color: Color) {
    let rect = Rect::new(cx - radius, cy - radius, radius * 2.0, radius * 2.0);
    fill_rounded_rect(canvas, &rect, &Radii::uniform(radius), color, None);
}

/// Draws `src` scaled to `width`×`height` with its top-left at `(x, y)`,
/// optionally clipped. Alpha is composited over the canvas.
pub(crate) fn draw_image(
    canvas: &mut RgbaImage,
    src: &RgbaImage,
    x: i64,
    y: i64,
    width: u32,
    height: u32,
    clip: Option<(i64, i64, u32, u32)>,
) {
    if width == 0 || height == 0 {
        return;
    }
    let resized;
    let scaled: &RgbaImage = if src.dimensions() == (width, height) {
        src
    } else {
        resized = imageops::resize(src, width, height, RESAMPLE_FILTER);
        &resized
    };

    let Some((cx, cy, cw, ch)) = clip else {
        imageops::overlay(canvas, scaled, x, y);
        return;
    };
    // Intersect the destination with the clip box, then crop the source.
    let left = x.max(cx);
    let top = y.max(cy);
    let right = (x + width as i64).min(cx + cw as i64);
    let bottom = (y + height as i64).min(cy + ch as i64);
    if right <= left || bottom <= top {
        return;
    }
    let cropped = imageops::crop_imm(
        scaled,
        (left - x) as u32,
        (top - y) as u32,
        (right - left) as u32,
        (bottom - top) as u32,
    )
    .to_image();
    imageops::overlay(canvas, &cropped, left, top);
}
