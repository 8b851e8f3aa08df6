//! Image ingestion.
//!
//! Validates incoming files, decodes them off the async runtime, and attaches
//! the result to a slot in the current composition. Validation order is fixed:
//! MIME type, then size, then decode.

mod decoder;
mod ledger;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, warn};

pub use decoder::{ImageCrateDecoder, ImageMime, PixelDecoder};
pub use ledger::ResourceLedger;

use crate::model::{AttachmentId, ImageAttachment, SlotId};
use crate::state::{CompositionState, CompositionStore};

/// Default maximum accepted file size (10 MiB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Reasons an attach or detach is rejected.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("unsupported image type: {0} (expected PNG, JPEG or WebP)")]
    UnsupportedType(String),

    #[error("file is {size} bytes, over the {limit} byte limit")]
    TooLarge { size: u64, limit: u64 },

    #[error("failed to decode image: {0}")]
    DecodeFailed(String),

    #[error("slot not found: {0}")]
    SlotNotFound(SlotId),

    #[error("slot {0} changed while its image was decoding")]
    Stale(SlotId),

    #[error("failed to read image file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl IngestError {
    /// Short machine-readable rejection reason.
    pub fn reason(&self) -> &'static str {
        match self {
            IngestError::UnsupportedType(_) => "unsupported-type",
            IngestError::TooLarge { .. } => "too-large",
            IngestError::DecodeFailed(_) => "decode-failed",
            IngestError::SlotNotFound(_) => "slot-not-found",
            IngestError::Stale(_) => "stale",
            IngestError::Read { .. } => "read-failed",
        }
    }
}

/// Attaches decoded images to slots in the store's composition.
#[derive(Clone)]
pub struct ImageIngestion {
    store: CompositionStore,
    ledger: ResourceLedger,
    decoder: Arc<dyn PixelDecoder>,
    max_file_size: u64,
}

impl std::fmt::Debug for ImageIngestion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageIngestion")
            .field("max_file_size", &self.max_file_size)
            .field("live_resources", &self.ledger.live_count())
            .finish_non_exhaustive()
    }
}

impl ImageIngestion {
    /// Creates an ingestion service using the `image` crate decoder.
    pub fn new(store: CompositionStore, ledger: ResourceLedger) -> Self {
        Self::with_decoder(store, ledger, Arc::new(ImageCrateDecoder))
    }

    pub fn with_decoder(
        store: CompositionStore,
        ledger: ResourceLedger,
        decoder: Arc<dyn PixelDecoder>,
    ) -> Self {
        Self {
            store,
            ledger,
            decoder,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }

    /// Overrides the size limit.
    pub fn with_max_file_size(mut self, limit: u64) -> Self {
        self.max_file_size = limit;
        self
    }

    pub fn max_file_size(&self) -> u64 {
        self.max_file_size
    }

    /// Validates, decodes and attaches an image to `slot_id`.
    ///
    /// Any prior attachment on the slot is replaced and its transient
    /// resource revoked. If the slot gains a different attachment or
    /// disappears while decoding, the result is discarded as [`IngestError::Stale`].
    pub async fn attach(
        &self,
        slot_id: &SlotId,
        bytes: Vec<u8>,
        mime: &str,
        size: u64,
        file_name: &str,
    ) -> Result<ImageAttachment, IngestError> {
        let mime = ImageMime::parse(mime).ok_or_else(|| {
            warn!(mime, file_name, "rejected image with unsupported type");
            IngestError::UnsupportedType(mime.to_string())
        })?;
        if size > self.max_file_size {
            warn!(size, limit = self.max_file_size, file_name, "rejected oversized image");
            return Err(IngestError::TooLarge {
                size,
                limit: self.max_file_size,
            });
        }

        let before = current_attachment(&self.store.get().await, slot_id)?;

        let decoder = Arc::clone(&self.decoder);
        let decoded = tokio::task::spawn_blocking(move || decoder.decode(&bytes, mime)).await;
        let pixels = match decoded {
            Ok(Ok(pixels)) => pixels,
            Ok(Err(e)) => {
                warn!(error = %e, file_name, "image decode failed");
                return Err(IngestError::DecodeFailed(e));
            }
            Err(e) => {
                warn!(error = %e, file_name, "image decode task panicked");
                return Err(IngestError::DecodeFailed(e.to_string()));
            }
        };

        let attachment = ImageAttachment::new(pixels, file_name);
        let ledger = self.ledger.clone();
        let committed = attachment.clone();
        self.store
            .try_update(true, move |state| {
                let slot = state
                    .composition
                    .as_mut()
                    .and_then(|c| c.find_slot_mut(slot_id))
                    .ok_or_else(|| IngestError::Stale(slot_id.clone()))?;
                if slot.image().map(|a| a.id()) != before.as_ref() {
                    return Err(IngestError::Stale(slot_id.clone()));
                }
                // Ledger and slot change under the same store lock.
                ledger.acquire(committed.id());
                if let Some(prior) = slot.replace_image(committed) {
                    ledger.revoke(prior.id());
                }
                Ok(())
            })
            .await
            .map_err(|e| {
                warn!(slot = %slot_id, "discarding decoded image for changed slot");
                e
            })?;

        debug!(
            slot = %slot_id,
            attachment = %attachment.id(),
            width = attachment.width(),
            height = attachment.height(),
            "image attached"
        );
        Ok(attachment)
    }

    /// Reads `path` from disk and attaches it, inferring the MIME type from
    /// the file extension.
    pub async fn attach_file(
        &self,
        slot_id: &SlotId,
        path: &Path,
    ) -> Result<ImageAttachment, IngestError> {
        let mime = ImageMime::from_path(path).ok_or_else(|| {
            let ext = path
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or("(none)");
            IngestError::UnsupportedType(format!("extension {}", ext))
        })?;
        let bytes = tokio::fs::read(path).await.map_err(|source| IngestError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let size = bytes.len() as u64;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.attach(slot_id, bytes, mime.as_str(), size, &file_name)
            .await
    }

    /// Clears `slot_id`, revoking its transient resource.
    ///
    /// Returns the removed attachment; `Ok(None)` if the slot was already
    /// empty, in which case nothing is recorded.
    pub async fn detach(&self, slot_id: &SlotId) -> Result<Option<ImageAttachment>, IngestError> {
        let ledger = self.ledger.clone();
        let outcome = self
            .store
            .try_update(true, |state| {
                let slot = state
                    .composition
                    .as_mut()
                    .and_then(|c| c.find_slot_mut(slot_id))
                    .ok_or_else(|| Some(IngestError::SlotNotFound(slot_id.clone())))?;
                let removed = slot.take_image().ok_or(None::<IngestError>)?;
                ledger.revoke(removed.id());
                Ok(removed)
            })
            .await;
        match outcome {
            Ok(removed) => {
                debug!(slot = %slot_id, attachment = %removed.id(), "image detached");
                Ok(Some(removed))
            }
            Err(None) => Ok(None),
            Err(Some(e)) => Err(e),
        }
    }
}

fn current_attachment(
    state: &CompositionState,
    slot_id: &SlotId,
) -> Result<Option<AttachmentId>, IngestError> {
    state
        .composition
        .as_ref()
        .and_then(|c| c.find_slot(slot_id))
        .map(|slot| slot.image().map(|a| a.id().clone()))
        .ok_or_else(|| IngestError::SlotNotFound(slot_id.clone()))
}
