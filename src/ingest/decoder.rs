//! Pixel decoding behind a trait so hosts can swap the codec.

use std::fmt;
use std::path::Path;

use image::{ImageFormat, RgbaImage};

/// Accepted image MIME types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageMime {
    Png,
    Jpeg,
    Webp,
}

impl ImageMime {
    /// Parses a MIME type string. `image/jpg` is accepted as an alias.
    pub fn parse(mime: &str) -> Option<Self> {
        match mime.trim().to_ascii_lowercase().as_str() {
            "image/png" => Some(ImageMime::Png),
            "image/jpeg" | "image/jpg" => Some(ImageMime::Jpeg),
            "image/webp" => Some(ImageMime::Webp),
            _ => None,
        }
    }

    /// Infers the MIME type from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "png" => Some(ImageMime::Png),
            "jpg" | "jpeg" => Some(ImageMime::Jpeg),
            "webp" => Some(ImageMime::Webp),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ImageMime::Png => "image/png",
            ImageMime::Jpeg => "image/jpeg",
            ImageMime::Webp => "image/webp",
        }
    }

    pub fn format(&self) -> ImageFormat {
        match self {
            ImageMime::Png => ImageFormat::Png,
            ImageMime::Jpeg => ImageFormat::Jpeg,
            ImageMime::Webp => ImageFormat::WebP,
        }
    }
}

impl fmt::Display for ImageMime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Turns encoded bytes into RGBA pixels.
///
/// Called from a blocking worker thread.
pub trait PixelDecoder: Send + Sync {
    fn decode(&self, bytes: &[u8], mime: ImageMime) -> Result<RgbaImage, String>;
}

/// Default decoder backed by the `image` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageCrateDecoder;

impl PixelDecoder for ImageCrateDecoder {
    fn decode(&self, bytes: &[u8], mime: ImageMime) -> Result<RgbaImage, String> {
        let img = image::load_from_memory_with_format(bytes, mime.format())
            .map_err(|e| e.to_string())?;
        let rgba = img.into_rgba8();
        if rgba.width() == 0 || rgba.height() == 0 {
            return Err("image has zero width or height".to_string());
        }
        Ok(rgba)
    }
}
