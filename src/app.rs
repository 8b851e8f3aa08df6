//! Wires the services together from a [`Config`].

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info};

use crate::config::{Config, ConfigError};
use crate::engine::LayoutEngine;
use crate::export::{
    ClipboardSink, DirectorySink, ExportError, ExportedImage, Exporter,
};
use crate::feedback::{FeedbackService, MemoryListStore, RateLimiter};
use crate::ingest::{ImageIngestion, IngestError, ResourceLedger};
use crate::layout::LayoutCatalog;
use crate::model::SlotId;
use crate::preview::{self, PreviewTree};
use crate::state::{CompositionState, CompositionStore, Properties};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error("unknown layout '{0}' (run `pictrikit layouts` for the list)")]
    UnknownLayout(String),

    #[error("layout '{layout}' holds at most {max} images, got {given}")]
    TooManyImages {
        layout: String,
        max: usize,
        given: usize,
    },
}

/// One editing session with every service sharing the same store and ledger.
pub struct App {
    pub config: Config,
    pub catalog: Arc<LayoutCatalog>,
    pub store: CompositionStore,
    pub ledger: ResourceLedger,
    pub engine: LayoutEngine,
    pub ingestion: ImageIngestion,
    pub exporter: Exporter,
    pub feedback: FeedbackService,
}

impl App {
    pub fn new(config: Config) -> Result<Self, ConfigError> {
        config.validate()?;
        let catalog = Arc::new(LayoutCatalog::builtin());
        let store = CompositionStore::with_options(config.canvas, config.history.limit);
        let ledger = ResourceLedger::default();
        let engine = LayoutEngine::new(Arc::clone(&catalog), store.clone(), ledger.clone());
        let ingestion = ImageIngestion::new(store.clone(), ledger.clone())
            .with_max_file_size(config.ingest.max_file_size);
        let exporter = Exporter::new(config.export.options());
        let feedback = FeedbackService::new(
            Arc::new(MemoryListStore::new()),
            RateLimiter::new(config.feedback.rate_limit, config.feedback.rate_window()?),
            config.feedback.admin_token(),
        );
        debug!(templates = catalog.len(), "app initialized");
        Ok(Self {
            config,
            catalog,
            store,
            ledger,
            engine,
            ingestion,
            exporter,
            feedback,
        })
    }

    /// Starts a composition from `layout`, applies `properties`, and fills
    /// slots with `images` in order, growing linear layouts as needed.
    pub async fn compose(
        &self,
        layout: &str,
        properties: Properties,
        images: &[PathBuf],
    ) -> Result<CompositionState, AppError> {
        let template = self
            .catalog
            .lookup(layout)
            .ok_or_else(|| AppError::UnknownLayout(layout.to_string()))?;
        if let Some(max) = template.max_slot_count() {
            if images.len() > max {
                return Err(AppError::TooManyImages {
                    layout: layout.to_string(),
                    max,
                    given: images.len(),
                });
            }
        }

        let composition = self
            .engine
            .instantiate(layout)
            .await
            .ok_or_else(|| AppError::UnknownLayout(layout.to_string()))?;
        self.engine.set_properties(properties).await;

        for (index, path) in images.iter().enumerate() {
            let slot = match self.slot_at(index).await {
                Some(slot) => slot,
                None => {
                    self.engine.grow_by_one(&composition.id).await;
                    self.slot_at(index).await.ok_or_else(|| AppError::TooManyImages {
                        layout: layout.to_string(),
                        max: index,
                        given: images.len(),
                    })?
                }
            };
            self.ingestion.attach_file(&slot, path).await?;
        }
        info!(layout, images = images.len(), "composition ready");
        Ok(self.store.get().await)
    }

    async fn slot_at(&self, index: usize) -> Option<SlotId> {
        self.store
            .get()
            .await
            .composition
            .and_then(|c| c.slots().nth(index).map(|s| s.id.clone()))
    }

    /// Preview of the current state.
    pub async fn preview(&self) -> Option<PreviewTree> {
        preview::render(&self.store.get().await)
    }

    /// Exports and saves to `output`, or to the configured directory under a
    /// default name.
    pub async fn save(&self, output: Option<&Path>) -> Result<(PathBuf, ExportedImage), AppError> {
        let state = self.store.get().await;
        let (sink, name) = match output {
            Some(path) => {
                let dir = path
                    .parent()
                    .filter(|p| !p.as_os_str().is_empty())
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| PathBuf::from("."));
                let name = path.file_name().map(|n| n.to_string_lossy().into_owned());
                (DirectorySink::new(dir), name)
            }
            None => (DirectorySink::new(self.config.export.output_dir()), None),
        };
        Ok(self.exporter.download(&state, &sink, name.as_deref()).await?)
    }

    pub async fn copy(&self, clipboard: &dyn ClipboardSink) -> Result<ExportedImage, AppError> {
        let state = self.store.get().await;
        Ok(self.exporter.copy_to_clipboard(&state, clipboard).await?)
    }
}
