//! Pixel exporter.
//!
//! Produces a PNG whose size and content derive from the attached images'
//! natural resolutions rather than from the preview. The strategy depends on
//! the template:
//!
//! - linear templates: [`linear`] uniform or original scale
//! - frame templates: [`frame`] chrome around the first image
//! - everything else: [`fallback`] rasterization of the preview tree
//!
//! Compositing and encoding run on a blocking worker.

pub mod draw;
pub mod fallback;
pub mod frame;
pub mod linear;
pub mod sink;

use std::io::Cursor;
use std::path::PathBuf;
use std::sync::Arc;

use image::{ImageFormat, RgbaImage};
use serde::Serialize;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

pub use fallback::{prepare_for_export, BoxRasterizer, PreviewRasterizer};
pub use sink::{default_file_name, ClipboardSink, DirectorySink, DownloadSink, SystemClipboard};

use crate::layout::{Direction, LayoutTemplate, TemplateShape};
use crate::model::{Composition, PixelHandle};
use crate::preview::{self, Theme};
use crate::state::{CompositionState, Properties, ScaleMode};

/// Default density for the structural fallback.
pub const DEFAULT_FALLBACK_DENSITY: f32 = 2.0;
/// Default prefix for downloaded file names.
pub const DEFAULT_FILE_PREFIX: &str = "pictrikit";

/// Export failures.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("nothing to export: attach at least one image")]
    NoContent,

    #[error("clipboard is not available on this system")]
    ClipboardUnsupported,

    #[error("export failed: {0}")]
    ExportFailed(String),
}

/// Which exporter produced an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExportStrategy {
    LinearUniform,
    LinearOriginal,
    Frame,
    Fallback,
}

impl std::fmt::Display for ExportStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ExportStrategy::LinearUniform => "linear-uniform",
            ExportStrategy::LinearOriginal => "linear-original",
            ExportStrategy::Frame => "frame",
            ExportStrategy::Fallback => "fallback",
        };
        write!(f, "{}", s)
    }
}

/// Picks the exporter for `template` under `properties`.
pub fn select_strategy(template: &LayoutTemplate, properties: &Properties) -> ExportStrategy {
    match template.shape {
        TemplateShape::Linear { .. } => match properties.scale_mode {
            ScaleMode::Uniform => ExportStrategy::LinearUniform,
            ScaleMode::Original => ExportStrategy::LinearOriginal,
        },
        TemplateShape::Framed { .. } => ExportStrategy::Frame,
        TemplateShape::Structural { .. } => ExportStrategy::Fallback,
    }
}

/// An encoded export.
#[derive(Debug, Clone)]
pub struct ExportedImage {
    pub png: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub strategy: ExportStrategy,
}

#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Pixel density for the structural fallback.
    pub fallback_density: f32,
    /// Theme used to resolve symbolic preview colors.
    pub theme: Theme,
    /// Prefix for default download names.
    pub file_prefix: String,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            fallback_density: DEFAULT_FALLBACK_DENSITY,
            theme: Theme::default(),
            file_prefix: DEFAULT_FILE_PREFIX.to_string(),
        }
    }
}

type RasterizerFactory = Arc<dyn Fn() -> Arc<dyn PreviewRasterizer> + Send + Sync>;

/// Composes and encodes exports.
///
/// The fallback rasterizer is created on first use and reused afterwards.
#[derive(Clone)]
pub struct Exporter {
    options: ExportOptions,
    rasterizer: Arc<OnceCell<Arc<dyn PreviewRasterizer>>>,
    factory: RasterizerFactory,
}

impl std::fmt::Debug for Exporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Exporter")
            .field("options", &self.options)
            .field("rasterizer_loaded", &self.rasterizer_loaded())
            .finish()
    }
}

impl Exporter {
    pub fn new(options: ExportOptions) -> Self {
        Self::with_rasterizer_factory(options, || Arc::new(BoxRasterizer))
    }

    /// Uses `factory` to build the fallback rasterizer when first needed.
    pub fn with_rasterizer_factory(
        options: ExportOptions,
        factory: impl Fn() -> Arc<dyn PreviewRasterizer> + Send + Sync + 'static,
    ) -> Self {
        Self {
            options,
            rasterizer: Arc::new(OnceCell::new()),
            factory: Arc::new(factory),
        }
    }

    pub fn options(&self) -> &ExportOptions {
        &self.options
    }

    /// Whether the fallback rasterizer has been created yet.
    pub fn rasterizer_loaded(&self) -> bool {
        self.rasterizer.initialized()
    }

    /// Renders `state` to an encoded PNG.
    pub async fn export_png(&self, state: &CompositionState) -> Result<ExportedImage, ExportError> {
        let composition = state
            .composition
            .as_ref()
            .filter(|c| c.has_images())
            .ok_or(ExportError::NoContent)?;
        let strategy = select_strategy(&composition.template, &state.properties);
        debug!(%strategy, template = %composition.template.id, "export started");

        let job = match strategy {
            ExportStrategy::LinearUniform | ExportStrategy::LinearOriginal => {
                self.linear_job(composition, &state.properties, strategy)
            }
            ExportStrategy::Frame => frame_job(composition)?,
            ExportStrategy::Fallback => self.fallback_job(composition, &state.properties).await,
        };

        let exported = tokio::task::spawn_blocking(move || {
            let canvas = job()?;
            let png = encode_png(&canvas)?;
            Ok::<_, ExportError>(ExportedImage {
                png,
                width: canvas.width(),
                height: canvas.height(),
                strategy,
            })
        })
        .await
        .map_err(|e| {
            warn!(error = %e, "export task panicked");
            ExportError::ExportFailed(e.to_string())
        })??;

        info!(
            %strategy,
            width = exported.width,
            height = exported.height,
            bytes = exported.png.len(),
            "export complete"
        );
        Ok(exported)
    }

    /// Exports and saves through `sink`. Uses the default name when
    /// `file_name` is `None`.
    pub async fn download(
        &self,
        state: &CompositionState,
        sink: &dyn DownloadSink,
        file_name: Option<&str>,
    ) -> Result<(PathBuf, ExportedImage), ExportError> {
        let exported = self.export_png(state).await?;
        let name = file_name
            .map(str::to_string)
            .unwrap_or_else(|| default_file_name(&self.options.file_prefix));
        let path = sink.save(&exported.png, &name)?;
        info!(path = %path.display(), "export downloaded");
        Ok((path, exported))
    }

    /// Exports and writes to `sink`. Checks clipboard support before doing
    /// any work.
    pub async fn copy_to_clipboard(
        &self,
        state: &CompositionState,
        sink: &dyn ClipboardSink,
    ) -> Result<ExportedImage, ExportError> {
        if !state.has_images() {
            return Err(ExportError::NoContent);
        }
        if !sink.is_supported() {
            warn!("clipboard export requested but no clipboard is available");
            return Err(ExportError::ClipboardUnsupported);
        }
        let exported = self.export_png(state).await?;
        sink.write_png(&exported.png)?;
        info!("export copied to clipboard");
        Ok(exported)
    }

    fn linear_job(
        &self,
        composition: &Composition,
        properties: &Properties,
        strategy: ExportStrategy,
    ) -> RenderJob {
        let direction = composition.template.direction().unwrap_or(Direction::Row);
        let images: Vec<PixelHandle> = composition
            .attachments()
            .map(|a| a.pixels().clone())
            .collect();
        let dims: Vec<(u32, u32)> = composition
            .attachments()
            .map(|a| (a.width(), a.height()))
            .collect();
        if strategy == ExportStrategy::LinearUniform && linear::should_prefer_original_aspect(&dims) {
            debug!("mixed aspect ratios; original scale mode may suit this set better");
        }
        let props = *properties;
        Box::new(move || {
            let plan = match strategy {
                ExportStrategy::LinearOriginal => linear::plan_original(
                    &dims,
                    direction,
                    props.padding,
                    props.gap,
                    props.linear_align,
                ),
                _ => linear::plan_uniform(&dims, direction, props.padding, props.gap),
            }?;
            Ok(linear::render(&plan, &images, props.background.fill()))
        })
    }

    async fn fallback_job(&self, composition: &Composition, properties: &Properties) -> RenderJob {
        let rasterizer = self
            .rasterizer
            .get_or_init(|| async {
                info!("loading fallback rasterizer");
                (self.factory)()
            })
            .await
            .clone();
        let tree = preview::render_composition(composition, properties);
        let prepared = prepare_for_export(&tree, &self.options.theme);
        let density = self.options.fallback_density;
        Box::new(move || {
            rasterizer
                .rasterize(&prepared, density)
                .map_err(ExportError::ExportFailed)
        })
    }
}

type RenderJob = Box<dyn FnOnce() -> Result<RgbaImage, ExportError> + Send>;

fn frame_job(composition: &Composition) -> Result<RenderJob, ExportError> {
    let kind = composition
        .template
        .frame_kind()
        .ok_or_else(|| ExportError::ExportFailed("template has no frame".to_string()))?;
    let image = composition
        .attachments()
        .next()
        .map(|a| a.pixels().clone())
        .ok_or(ExportError::NoContent)?;
    Ok(Box::new(move || Ok(frame::render(kind, image.pixels()))))
}

/// Encodes RGBA pixels as PNG.
pub fn encode_png(canvas: &RgbaImage) -> Result<Vec<u8>, ExportError> {
    let mut png = Vec::new();
    canvas
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .map_err(|e| ExportError::ExportFailed(format!("PNG encode: {}", e)))?;
    Ok(png)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::LayoutCatalog;
    use crate::model::ImageAttachment;
    use image::Rgba;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    fn state_with(template: &str, images: &[(u32, u32)]) -> CompositionState {
        let catalog = LayoutCatalog::builtin();
        let mut comp = Composition::new(catalog.lookup(template).expect("template"));
        while comp.slot_count() < images.len() && comp.can_grow() {
            comp.containers[0].push_empty_slot();
        }
        for (slot, &(w, h)) in comp.containers[0].slots.iter_mut().zip(images) {
            slot.replace_image(ImageAttachment::new(
                RgbaImage::from_pixel(w, h, Rgba([30, 60, 90, 255])),
                "img.png",
            ));
        }
        CompositionState {
            composition: Some(comp),
            ..CompositionState::default()
        }
    }

    fn decode(png: &[u8]) -> RgbaImage {
        image::load_from_memory_with_format(png, ImageFormat::Png)
            .expect("decode")
            .into_rgba8()
    }

    #[test]
    fn test_select_strategy() {
        let catalog = LayoutCatalog::builtin();
        let props = Properties::default();
        let original = Properties {
            scale_mode: ScaleMode::Original,
            ..Properties::default()
        };
        let t = |id: &str| catalog.lookup(id).expect("template").clone();
        assert_eq!(select_strategy(&t("horizontal-stack"), &props), ExportStrategy::LinearUniform);
        assert_eq!(select_strategy(&t("vertical-stack"), &original), ExportStrategy::LinearOriginal);
        assert_eq!(select_strategy(&t("phone"), &original), ExportStrategy::Frame);
        assert_eq!(select_strategy(&t("grid-2x2"), &props), ExportStrategy::Fallback);
        assert_eq!(select_strategy(&t("before-after"), &props), ExportStrategy::Fallback);
    }

    #[tokio::test]
    async fn test_export_without_composition_is_no_content() {
        let exporter = Exporter::new(ExportOptions::default());
        let err = exporter
            .export_png(&CompositionState::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ExportError::NoContent));
    }

    #[tokio::test]
    async fn test_export_empty_slots_is_no_content() {
        let exporter = Exporter::new(ExportOptions::default());
        let err = exporter
            .export_png(&state_with("grid-2x2", &[]))
            .await
            .unwrap_err();
        assert!(matches!(err, ExportError::NoContent));
    }

    #[tokio::test]
    async fn test_linear_uniform_export_size() {
        let exporter = Exporter::new(ExportOptions::default());
        let out = exporter
            .export_png(&state_with("horizontal-stack", &[(1000, 500), (400, 800)]))
            .await
            .expect("export");
        assert_eq!(out.strategy, ExportStrategy::LinearUniform);
        assert_eq!((out.width, out.height), (2095, 876));
        let decoded = decode(&out.png);
        assert_eq!(decoded.dimensions(), (2095, 876));
        assert_eq!(decoded.get_pixel(0, 0), &Rgba([255, 255, 255, 255]));
    }

    #[tokio::test]
    async fn test_linear_original_export_size() {
        let mut state = state_with("horizontal-stack", &[(100, 50), (40, 80)]);
        state.properties.scale_mode = ScaleMode::Original;
        let out = Exporter::new(ExportOptions::default())
            .export_png(&state)
            .await
            .expect("export");
        assert_eq!(out.strategy, ExportStrategy::LinearOriginal);
        // M = 80, factor 80/512, gap round(1.875) = 2, padding round(3.75) = 4
        assert_eq!((out.width, out.height), (4 + 100 + 2 + 40 + 4, 88));
    }

    #[tokio::test]
    async fn test_oversized_linear_export_fails_cleanly() {
        let mut state = state_with("horizontal-stack", &[(800, 800), (800, 800)]);
        state.properties.padding = 279;
        let err = Exporter::new(ExportOptions::default())
            .export_png(&state)
            .await
            .unwrap_err();
        assert!(matches!(err, ExportError::ExportFailed(ref m) if m.contains("pixel limit")));
    }

    #[tokio::test]
    async fn test_frame_export_size() {
        let out = Exporter::new(ExportOptions::default())
            .export_png(&state_with("browser", &[(320, 200)]))
            .await
            .expect("export");
        assert_eq!(out.strategy, ExportStrategy::Frame);
        assert_eq!((out.width, out.height), (320, 264));
    }

    #[tokio::test]
    async fn test_fallback_export_is_lazy_and_2x() {
        let exporter = Exporter::new(ExportOptions::default());
        assert!(!exporter.rasterizer_loaded());

        exporter
            .export_png(&state_with("horizontal-stack", &[(10, 10)]))
            .await
            .expect("linear export");
        assert!(!exporter.rasterizer_loaded());

        let out = exporter
            .export_png(&state_with("grid-2x2", &[(20, 20), (20, 20), (20, 20), (20, 20)]))
            .await
            .expect("fallback export");
        assert!(exporter.rasterizer_loaded());
        assert_eq!(out.strategy, ExportStrategy::Fallback);
        assert_eq!((out.width, out.height), (1800, 1120));
    }

    #[tokio::test]
    async fn test_fallback_rasterizer_created_once() {
        let created = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&created);
        let exporter = Exporter::with_rasterizer_factory(ExportOptions::default(), move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Arc::new(BoxRasterizer)
        });
        let state = state_with("quad-compare", &[(8, 8)]);
        exporter.export_png(&state).await.expect("first");
        exporter.export_png(&state).await.expect("second");
        assert_eq!(created.load(Ordering::SeqCst), 1);
    }

    struct FailingRasterizer;

    impl PreviewRasterizer for FailingRasterizer {
        fn rasterize(&self, _: &preview::PreviewTree, _: f32) -> Result<RgbaImage, String> {
            Err("boom".to_string())
        }
    }

    #[tokio::test]
    async fn test_rasterizer_failure_is_export_failed() {
        let exporter =
            Exporter::with_rasterizer_factory(ExportOptions::default(), || Arc::new(FailingRasterizer));
        let err = exporter
            .export_png(&state_with("grid-1x3", &[(4, 4)]))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "export failed: boom");
    }

    #[tokio::test]
    async fn test_download_uses_default_name() {
        let dir = tempfile::TempDir::new().expect("tempdir");
        let exporter = Exporter::new(ExportOptions::default());
        let (path, exported) = exporter
            .download(&state_with("tablet", &[(30, 30)]), &DirectorySink::new(dir.path()), None)
            .await
            .expect("download");
        let name = path.file_name().and_then(|n| n.to_str()).expect("name");
        assert!(name.starts_with("pictrikit-") && name.ends_with(".png"));
        assert_eq!(std::fs::read(&path).expect("read"), exported.png);
    }

    #[tokio::test]
    async fn test_download_no_content_writes_nothing() {
        let dir = tempfile::TempDir::new().expect("tempdir");
        let exporter = Exporter::new(ExportOptions::default());
        let err = exporter
            .download(&state_with("tablet", &[]), &DirectorySink::new(dir.path()), Some("x.png"))
            .await
            .unwrap_err();
        assert!(matches!(err, ExportError::NoContent));
        assert_eq!(std::fs::read_dir(dir.path()).expect("ls").count(), 0);
    }

    #[derive(Default)]
    struct MemoryClipboard {
        supported: bool,
        written: Mutex<Vec<Vec<u8>>>,
    }

    impl ClipboardSink for MemoryClipboard {
        fn is_supported(&self) -> bool {
            self.supported
        }

        fn write_png(&self, png: &[u8]) -> Result<(), ExportError> {
            self.written.lock().expect("lock").push(png.to_vec());
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_copy_to_clipboard() {
        let clipboard = MemoryClipboard {
            supported: true,
            ..Default::default()
        };
        let exporter = Exporter::new(ExportOptions::default());
        let out = exporter
            .copy_to_clipboard(&state_with("phone", &[(12, 24)]), &clipboard)
            .await
            .expect("copy");
        let written = clipboard.written.lock().expect("lock");
        assert_eq!(written.len(), 1);
        assert_eq!(written[0], out.png);
    }

    #[tokio::test]
    async fn test_copy_to_unsupported_clipboard() {
        let clipboard = MemoryClipboard::default();
        let exporter = Exporter::new(ExportOptions::default());
        let err = exporter
            .copy_to_clipboard(&state_with("phone", &[(12, 24)]), &clipboard)
            .await
            .unwrap_err();
        assert!(matches!(err, ExportError::ClipboardUnsupported));
        assert!(clipboard.written.lock().expect("lock").is_empty());
    }

    #[test]
    fn test_encode_png_signature() {
        let png = encode_png(&RgbaImage::new(1, 1)).expect("encode");
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    }
}
