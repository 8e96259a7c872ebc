//! Conversion entry points.
//!
//! [`Converter`] runs the whole pipeline synchronously on the calling thread:
//!
//! ```text
//! validate ─▶ scratch ─▶ render ×N ─▶ deck ─▶ publish images ─▶ cleanup
//!   (0%)                 (10–50%)    (50–90%)     (90–100%)
//! ```
//!
//! The async [`convert`] moves that work onto a blocking worker thread so an
//! interactive caller's own thread stays free; progress events arrive on the
//! worker thread.

use crate::config::ConversionConfig;
use crate::error::{Pdf2PptxError, StageError};
use crate::output::{ConversionOutput, ConversionStats, DocumentInfo, PageInfo, RenderedPage};
use crate::pipeline::deck::Deck;
use crate::pipeline::input::ConversionJob;
use crate::pipeline::render::{PageRasterizer, PdfiumRasterizer};
use crate::pipeline::scale::plan_page;
use crate::pipeline::workspace::{self, Scratch};
use crate::pipeline::{encode, engine};
use crate::progress::{
    ConversionProgressCallback, ProgressCallback, ProgressReporter, Stage,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, error, info};

/// Converts PDF documents into picture-per-slide decks.
///
/// # Example
/// ```rust,no_run
/// use pdf2pptx::{ConversionConfig, Converter};
/// use std::path::Path;
///
/// let converter = Converter::new(ConversionConfig::default());
/// let output = converter.convert(Path::new("slides.pdf"), None, None)?;
/// println!("{} slides → {}", output.pages.len(), output.deck_path.display());
/// # Ok::<(), pdf2pptx::Pdf2PptxError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Converter {
    config: ConversionConfig,
}

impl Converter {
    pub fn new(config: ConversionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ConversionConfig {
        &self.config
    }

    /// Convert `input` with pdfium, writing `<stem>.pptx` and `<stem>_images/`
    /// into `output_dir` (default: the input's folder).
    ///
    /// # Errors
    /// [`Pdf2PptxError::FileNotFound`] / [`Pdf2PptxError::InvalidFormat`] are
    /// returned before anything is rendered or written. Every later failure
    /// is a [`Pdf2PptxError::ConversionFailed`] carrying the cause.
    pub fn convert(
        &self,
        input: &Path,
        output_dir: Option<&Path>,
        progress: Option<&dyn ConversionProgressCallback>,
    ) -> Result<ConversionOutput, Pdf2PptxError> {
        let job = ConversionJob::prepare(input, output_dir)?;
        let reporter = ProgressReporter::new(progress);

        self.execute(&job, &reporter, |scratch, reporter| {
            let pdfium = engine::bind_pdfium(self.config.pdfium_lib_path.as_deref())?;
            let mut rasterizer =
                PdfiumRasterizer::open(&pdfium, &job.input, self.config.password.as_deref())?;
            self.run(&job, scratch, &mut rasterizer, reporter)
        })
    }

    /// Same pipeline as [`Converter::convert`], with pages supplied by
    /// `rasterizer` instead of pdfium.
    pub fn convert_with<R: PageRasterizer + ?Sized>(
        &self,
        input: &Path,
        output_dir: Option<&Path>,
        rasterizer: &mut R,
        progress: Option<&dyn ConversionProgressCallback>,
    ) -> Result<ConversionOutput, Pdf2PptxError> {
        let job = ConversionJob::prepare(input, output_dir)?;
        let reporter = ProgressReporter::new(progress);

        self.execute(&job, &reporter, |scratch, reporter| {
            self.run(&job, scratch, rasterizer, reporter)
        })
    }

    /// Describe `input` and the render plan for each page without rendering
    /// or writing anything.
    pub fn inspect(
        &self,
        input: &Path,
        output_dir: Option<&Path>,
    ) -> Result<DocumentInfo, Pdf2PptxError> {
        let job = ConversionJob::prepare(input, output_dir)?;
        let wrap = |source: StageError| Pdf2PptxError::ConversionFailed {
            path: job.input.clone(),
            source,
        };

        let pdfium = engine::bind_pdfium(self.config.pdfium_lib_path.as_deref()).map_err(wrap)?;
        let rasterizer =
            PdfiumRasterizer::open(&pdfium, &job.input, self.config.password.as_deref())
                .map_err(wrap)?;

        let mut info = rasterizer.document_info(&job.input);
        info.pages = plan_pages(&rasterizer, &self.config).map_err(wrap)?;
        info.planned_deck_path = job.deck_path.clone();
        info.planned_images_dir = job.images_dir.clone();
        Ok(info)
    }

    /// Wrap a pipeline body with scratch setup, cleanup and failure reporting.
    fn execute(
        &self,
        job: &ConversionJob,
        reporter: &ProgressReporter<'_>,
        body: impl FnOnce(&Scratch, &ProgressReporter<'_>) -> Result<ConversionOutput, StageError>,
    ) -> Result<ConversionOutput, Pdf2PptxError> {
        info!("Starting conversion: {}", job.input.display());
        reporter.emit(
            Stage::Started,
            format!("Converting {}", display_name(&job.input)),
            Some(0.0),
        );

        let result = Scratch::create(self.config.scratch_root.as_deref()).and_then(|scratch| {
            let result = body(&scratch, reporter);
            scratch.cleanup();
            result
        });

        result.map_err(|source| {
            error!("Conversion of {} failed: {}", job.input.display(), source);
            reporter.emit(Stage::Failed, source.to_string(), None);
            Pdf2PptxError::ConversionFailed {
                path: job.input.clone(),
                source,
            }
        })
    }

    fn run<R: PageRasterizer + ?Sized>(
        &self,
        job: &ConversionJob,
        scratch: &Scratch,
        rasterizer: &mut R,
        reporter: &ProgressReporter<'_>,
    ) -> Result<ConversionOutput, StageError> {
        let total_start = Instant::now();
        let config = &self.config;
        let total = rasterizer.page_count();
        if total == 0 {
            return Err(StageError::EmptyDocument);
        }
        info!("PDF has {} pages", total);

        // ── Render ───────────────────────────────────────────────────────
        reporter.emit(
            Stage::Rendering,
            format!("Rendering {total} pages at {} DPI", config.dpi),
            Some(ProgressReporter::RENDER_START),
        );
        let render_start = Instant::now();
        let mut pages = Vec::with_capacity(total);
        for index in 0..total {
            let page_num = index + 1;
            let plan = plan_page(rasterizer.page_size(index)?, config.dpi, config.max_pixels);
            let image = rasterizer.render_page(index, &plan)?;
            let path = encode::write_page_image(
                &image,
                scratch.images_dir(),
                page_num,
                total,
                config.image_format,
                config.jpeg_quality,
            )?;
            pages.push(RenderedPage {
                page_num,
                path,
                width_px: image.width(),
                height_px: image.height(),
                zoom: plan.zoom,
            });
            reporter.step(
                Stage::Rendering,
                format!("Rendered page {page_num}/{total}"),
                ProgressReporter::RENDER_START,
                page_num,
                total,
            );
        }
        let render_duration_ms = render_start.elapsed().as_millis() as u64;
        info!("Rendered {} pages in {}ms", pages.len(), render_duration_ms);

        // ── Assemble ─────────────────────────────────────────────────────
        fs::create_dir_all(&job.output_dir).map_err(|e| {
            StageError::io(
                format!("Failed to create output folder '{}'", job.output_dir.display()),
                e,
            )
        })?;

        let assemble_start = Instant::now();
        let (slide_width_px, slide_height_px) = pages
            .first()
            .map(|p| (p.width_px, p.height_px))
            .ok_or(StageError::NoImages)?;
        reporter.emit(
            Stage::Assembling,
            format!("Building {total} slides ({slide_width_px}x{slide_height_px})"),
            Some(ProgressReporter::ASSEMBLE_START),
        );

        let mut deck = Deck::new(slide_width_px, slide_height_px).with_title(display_stem(&job.input));
        for page in &pages {
            deck.add_picture_slide(&page.path, config.image_format);
        }
        let deck_bytes = deck.save(&job.deck_path, |done, total| {
            reporter.step(
                Stage::Assembling,
                format!("Placed slide {done}/{total}"),
                ProgressReporter::ASSEMBLE_START,
                done,
                total,
            );
        })?;
        let assemble_duration_ms = assemble_start.elapsed().as_millis() as u64;

        // ── Publish images ───────────────────────────────────────────────
        reporter.emit(
            Stage::Saving,
            format!("Copying images to {}", job.images_dir.display()),
            Some(ProgressReporter::SAVE_START),
        );
        let copy_start = Instant::now();
        let copied = workspace::publish_images(scratch.images_dir(), &job.images_dir)?;
        debug!("Copied {} page images", copied.len());
        for page in &mut pages {
            if let Some(name) = page.path.file_name() {
                page.path = job.images_dir.join(name);
            }
        }
        let copy_duration_ms = copy_start.elapsed().as_millis() as u64;

        let stats = ConversionStats {
            total_pages: total,
            render_duration_ms,
            assemble_duration_ms,
            copy_duration_ms,
            total_duration_ms: total_start.elapsed().as_millis() as u64,
            deck_bytes,
        };
        info!(
            "Conversion complete: {} slides, {}ms total",
            total, stats.total_duration_ms
        );
        reporter.emit(
            Stage::Done,
            format!("Saved {}", job.deck_path.display()),
            Some(100.0),
        );

        Ok(ConversionOutput {
            deck_path: job.deck_path.clone(),
            images_dir: job.images_dir.clone(),
            pages,
            slide_width_px,
            slide_height_px,
            stats,
        })
    }
}

/// Convert a PDF on a blocking worker thread.
///
/// This is the entry point for async callers and UIs: the calling task only
/// awaits, while rendering and file I/O happen on tokio's blocking pool.
/// `progress` is invoked from that worker thread.
///
/// # Example
/// ```rust,no_run
/// use pdf2pptx::{convert, ConversionConfig, ProgressUpdate};
/// use std::sync::Arc;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let progress = Arc::new(|u: &ProgressUpdate| eprintln!("{}: {}", u.stage, u.message));
/// let output = convert("report.pdf", None, &ConversionConfig::default(), Some(progress)).await?;
/// println!("{}", output.deck_path.display());
/// # Ok(())
/// # }
/// ```
pub async fn convert(
    input: impl AsRef<Path>,
    output_dir: Option<PathBuf>,
    config: &ConversionConfig,
    progress: Option<ProgressCallback>,
) -> Result<ConversionOutput, Pdf2PptxError> {
    let input = input.as_ref().to_path_buf();
    let err_path = input.clone();
    let converter = Converter::new(config.clone());

    tokio::task::spawn_blocking(move || {
        converter.convert(&input, output_dir.as_deref(), progress.as_deref())
    })
    .await
    .map_err(|e| Pdf2PptxError::ConversionFailed {
        path: err_path,
        source: StageError::Internal(format!("Conversion worker failed: {e}")),
    })?
}

/// Synchronous wrapper around [`convert`].
///
/// Creates a temporary tokio runtime internally.
pub fn convert_sync(
    input: impl AsRef<Path>,
    output_dir: Option<PathBuf>,
    config: &ConversionConfig,
    progress: Option<ProgressCallback>,
) -> Result<ConversionOutput, Pdf2PptxError> {
    let input = input.as_ref().to_path_buf();
    tokio::runtime::Runtime::new()
        .map_err(|e| Pdf2PptxError::ConversionFailed {
            path: input.clone(),
            source: StageError::Internal(format!("Failed to create tokio runtime: {e}")),
        })?
        .block_on(convert(&input, output_dir, config, progress))
}

/// Extract PDF metadata and per-page render plans without converting.
pub async fn inspect(
    input: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<DocumentInfo, Pdf2PptxError> {
    let input = input.as_ref().to_path_buf();
    let err_path = input.clone();
    let converter = Converter::new(config.clone());

    tokio::task::spawn_blocking(move || converter.inspect(&input, None))
        .await
        .map_err(|e| Pdf2PptxError::ConversionFailed {
            path: err_path,
            source: StageError::Internal(format!("Inspect worker failed: {e}")),
        })?
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// Page geometry plus the zoom and pixel size the converter would use.
pub(crate) fn plan_pages<R: PageRasterizer + ?Sized>(
    rasterizer: &R,
    config: &ConversionConfig,
) -> Result<Vec<PageInfo>, StageError> {
    (0..rasterizer.page_count())
        .map(|index| {
            let size = rasterizer.page_size(index)?;
            let plan = plan_page(size, config.dpi, config.max_pixels);
            Ok(PageInfo {
                page_num: index + 1,
                width_pt: size.width,
                height_pt: size.height,
                zoom: plan.zoom,
                width_px: plan.width_px,
                height_px: plan.height_px,
            })
        })
        .collect()
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn display_stem(path: &Path) -> String {
    path.file_stem()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
