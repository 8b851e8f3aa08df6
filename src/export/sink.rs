//! Destinations for exported PNGs: the clipboard and the filesystem.

use std::borrow::Cow;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{debug, warn};

use super::ExportError;

/// Receives an encoded PNG for the system clipboard.
pub trait ClipboardSink {
    /// Whether a clipboard is reachable at all.
    fn is_supported(&self) -> bool {
        true
    }

    fn write_png(&self, png: &[u8]) -> Result<(), ExportError>;
}

/// Clipboard sink backed by `arboard`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClipboard;

impl ClipboardSink for SystemClipboard {
    fn is_supported(&self) -> bool {
        arboard::Clipboard::new().is_ok()
    }

    fn write_png(&self, png: &[u8]) -> Result<(), ExportError> {
        let mut clipboard = arboard::Clipboard::new().map_err(|e| {
            warn!(error = %e, "clipboard unavailable");
            ExportError::ClipboardUnsupported
        })?;
        // The clipboard takes raw RGBA, not the encoded file.
        let rgba = image::load_from_memory_with_format(png, image::ImageFormat::Png)
            .map_err(|e| ExportError::ExportFailed(format!("re-decode for clipboard: {}", e)))?
            .into_rgba8();
        let (width, height) = rgba.dimensions();
        clipboard
            .set_image(arboard::ImageData {
                width: width as usize,
                height: height as usize,
                bytes: Cow::Owned(rgba.into_raw()),
            })
            .map_err(|e| ExportError::ExportFailed(format!("clipboard write: {}", e)))?;
        debug!(width, height, "PNG copied to clipboard");
        Ok(())
    }
}

/// Receives an encoded PNG to be saved under a file name.
pub trait DownloadSink {
    fn save(&self, png: &[u8], file_name: &str) -> Result<PathBuf, ExportError>;
}

/// Saves into a directory, atomically: the PNG is written to a hidden
/// `.part` sibling first and renamed into place.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl DownloadSink for DirectorySink {
    fn save(&self, png: &[u8], file_name: &str) -> Result<PathBuf, ExportError> {
        if file_name.is_empty() || file_name.contains(['/', '\\']) {
            return Err(ExportError::ExportFailed(format!(
                "invalid file name: {:?}",
                file_name
            )));
        }
        let io_err = |what: &str, path: &Path, e: std::io::Error| {
            ExportError::ExportFailed(format!("{} {}: {}", what, path.display(), e))
        };
        fs::create_dir_all(&self.dir).map_err(|e| io_err("create directory", &self.dir, e))?;

        let target = self.dir.join(file_name);
        let partial = self.dir.join(format!(".{}.part", file_name));
        let written = fs::File::create(&partial)
            .and_then(|mut f| {
                f.write_all(png)?;
                f.sync_all()
            })
            .and_then(|_| fs::rename(&partial, &target));
        if let Err(e) = written {
            let _ = fs::remove_file(&partial);
            return Err(io_err("write", &target, e));
        }
        debug!(path = %target.display(), bytes = png.len(), "PNG saved");
        Ok(target)
    }
}

/// Default download name: `<prefix>-<unix millis>.png`.
pub fn default_file_name(prefix: &str) -> String {
    format!("{}-{}.png", prefix, Utc::now().timestamp_millis())
}
