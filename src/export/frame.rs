//! Device-frame exporter.
//!
//! Wraps the first attached image, unscaled, in phone, tablet or browser
//! chrome. Pixels outside the rounded body stay transparent.

use image::RgbaImage;

use super::draw;
use crate::color::Color;
use crate::layout::FrameKind;
use crate::preview::{Radii, Rect, BROWSER_DOT_COLORS, DEVICE_BODY};

const BROWSER_HEADER_COLOR: Color = Color::rgb(0xf3, 0xf4, 0xf6);
const BROWSER_DOT_RADIUS: f32 = 10.0;
const BROWSER_DOT_XS: [f32; 3] = [24.0, 48.0, 72.0];

/// Chrome dimensions for one frame kind, in export pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameChrome {
    pub padding: u32,
    pub radius: f32,
    pub header: u32,
    /// Radius of the white screen area; `None` when the frame has none.
    pub inner_radius: Option<f32>,
}

impl FrameChrome {
    pub fn for_kind(kind: FrameKind) -> Self {
        match kind {
            FrameKind::Phone => Self {
                padding: 16,
                radius: 72.0,
                header: 48,
                inner_radius: Some(56.0),
            },
            FrameKind::Tablet => Self {
                padding: 20,
                radius: 40.0,
                header: 0,
                inner_radius: Some(24.0),
            },
            FrameKind::Browser => Self {
                padding: 0,
                radius: 16.0,
                header: 64,
                inner_radius: None,
            },
        }
    }

    /// Output canvas size for a `width`×`height` image.
    pub fn canvas_size(&self, width: u32, height: u32) -> (u32, u32) {
        (
            width + 2 * self.padding,
            height + 2 * self.padding + self.header,
        )
    }
}

/// Draws `image` inside `kind` chrome.
pub fn render(kind: FrameKind, image: &RgbaImage) -> RgbaImage {
    let chrome = FrameChrome::for_kind(kind);
    let (w, h) = image.dimensions();
    let (cw, ch) = chrome.canvas_size(w, h);
    let mut canvas = RgbaImage::new(cw, ch);
    let body = Rect::new(0.0, 0.0, cw as f32, ch as f32);
    let screen = Rect::new(
        chrome.padding as f32,
        (chrome.padding + chrome.header) as f32,
        w as f32,
        h as f32,
    );

    match kind {
        FrameKind::Phone | FrameKind::Tablet => {
            draw::fill_rounded_rect(
                &mut canvas,
                &body,
                &Radii::uniform(chrome.radius),
                DEVICE_BODY,
                None,
            );
            if let Some(inner) = chrome.inner_radius {
                draw::fill_rounded_rect(&mut canvas, &screen, &Radii::uniform(inner), Color::WHITE, None);
            }
        }
        FrameKind::Browser => {
            draw::fill_rounded_rect(
                &mut canvas,
                &body,
                &Radii::uniform(chrome.radius),
                Color::WHITE,
                None,
            );
            let header = Rect::new(0.0, 0.0, cw as f32, chrome.header as f32);
            draw::fill_rounded_rect(
                &mut canvas,
                &header,
                &Radii::top(chrome.radius),
                BROWSER_HEADER_COLOR,
                None,
            );
            let cy = chrome.header as f32 / 2.0;
            for (x, color) in BROWSER_DOT_XS.iter().zip(BROWSER_DOT_COLORS) {
                draw::fill_circle(&mut canvas, *x, cy, BROWSER_DOT_RADIUS, color);
            }
        }
    }

    draw::draw_image(
        &mut canvas,
        image,
        chrome.padding as i64,
        (chrome.padding + chrome.header) as i64,
        w,
        h,
        None,
    );
    canvas
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    const GREEN: Rgba<u8> = Rgba([0, 200, 0, 255]);

    fn shot(w: u32, h: u32) -> RgbaImage {
        RgbaImage::from_pixel(w, h, GREEN)
    }

    #[test]
    fn test_canvas_sizes() {
        assert_eq!(FrameChrome::for_kind(FrameKind::Phone).canvas_size(1170, 2532), (1202, 2612));
        assert_eq!(FrameChrome::for_kind(FrameKind::Tablet).canvas_size(100, 100), (140, 140));
        assert_eq!(FrameChrome::for_kind(FrameKind::Browser).canvas_size(1280, 720), (1280, 784));
    }

    #[test]
    fn test_phone_frame_pixels() {
        let out = render(FrameKind::Phone, &shot(200, 400));
        assert_eq!(out.dimensions(), (232, 480));
        // Corner outside the rounded body
        assert_eq!(out.get_pixel(0, 0).0[3], 0);
        // Bezel above the image
        assert_eq!(out.get_pixel(116, 30), &Rgba([0x1a, 0x1a, 0x1a, 255]));
        // Image placed at (pad, pad + header)
        assert_eq!(out.get_pixel(16, 64), &GREEN);
        assert_eq!(out.get_pixel(215, 463), &GREEN);
    }

    #[test]
    fn test_tablet_frame_has_no_header() {
        let out = render(FrameKind::Tablet, &shot(100, 100));
        assert_eq!(out.get_pixel(20, 20), &GREEN);
        assert_eq!(out.get_pixel(70, 10), &Rgba([0x1a, 0x1a, 0x1a, 255]));
    }

    #[test]
    fn test_browser_frame_header_and_dots() {
        let out = render(FrameKind::Browser, &shot(300, 100));
        assert_eq!(out.dimensions(), (300, 164));
        assert_eq!(out.get_pixel(24, 32), &Rgba([0xff, 0x5f, 0x57, 255]));
        assert_eq!(out.get_pixel(48, 32), &Rgba([0xfe, 0xbc, 0x2e, 255]));
        assert_eq!(out.get_pixel(72, 32), &Rgba([0x28, 0xc8, 0x40, 255]));
        assert_eq!(out.get_pixel(150, 10), &Rgba([0xf3, 0xf4, 0xf6, 255]));
        assert_eq!(out.get_pixel(0, 0).0[3], 0);
        assert_eq!(out.get_pixel(0, 64), &GREEN);
    }
}
