//! PDF rasterisation: page geometry and per-page bitmaps.
//!
//! The pipeline talks to the PDF engine only through [`PageRasterizer`], so
//! the rest of the conversion (scratch files, deck assembly, publishing) can
//! be driven by any source of page images. [`PdfiumRasterizer`] is the
//! production implementation.
//!
//! pdfium is not async-safe and uses thread-local state, so the async entry
//! point moves the whole pipeline onto `spawn_blocking` rather than rendering
//! here on an executor thread.

use crate::error::StageError;
use crate::output::DocumentInfo;
use crate::pipeline::scale::{PageSize, RenderPlan};
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::path::Path;
use tracing::{debug, info};

/// A source of rasterised pages.
pub trait PageRasterizer {
    /// Number of pages in the document.
    fn page_count(&self) -> usize;

    /// Size in points of the page at `index` (0-based).
    fn page_size(&self, index: usize) -> Result<PageSize, StageError>;

    /// Render the page at `index` (0-based) to exactly `plan.width_px` ×
    /// `plan.height_px` pixels.
    fn render_page(&mut self, index: usize, plan: &RenderPlan) -> Result<DynamicImage, StageError>;
}

/// [`PageRasterizer`] backed by an open pdfium document.
pub struct PdfiumRasterizer<'a> {
    document: PdfDocument<'a>,
}

impl<'a> PdfiumRasterizer<'a> {
    /// Open `pdf_path` with the bound `pdfium`.
    pub fn open(
        pdfium: &'a Pdfium,
        pdf_path: &Path,
        password: Option<&'a str>,
    ) -> Result<Self, StageError> {
        let document = pdfium
            .load_pdf_from_file(pdf_path, password)
            .map_err(|e| classify_load_error(e, password.is_some()))?;

        info!("PDF loaded: {} pages", document.pages().len());
        Ok(Self { document })
    }

    /// Document metadata plus page count; page plans are filled in by the caller.
    pub fn document_info(&self, pdf_path: &Path) -> DocumentInfo {
        let metadata = self.document.metadata();
        let get_meta = |tag: PdfDocumentMetadataTagType| -> Option<String> {
            metadata.get(tag).and_then(|t| {
                let v = t.value().to_string();
                if v.is_empty() {
                    None
                } else {
                    Some(v)
                }
            })
        };

        DocumentInfo {
            path: pdf_path.to_path_buf(),
            title: get_meta(PdfDocumentMetadataTagType::Title),
            author: get_meta(PdfDocumentMetadataTagType::Author),
            creator: get_meta(PdfDocumentMetadataTagType::Creator),
            producer: get_meta(PdfDocumentMetadataTagType::Producer),
            pdf_version: format!("{:?}", self.document.version()),
            page_count: self.page_count(),
            ..DocumentInfo::default()
        }
    }

    fn page(&self, index: usize) -> Result<PdfPage<'_>, StageError> {
        let index_u16 = u16::try_from(index).map_err(|_| StageError::RenderFailed {
            page: index + 1,
            detail: "page index exceeds pdfium's u16 range".into(),
        })?;
        self.document
            .pages()
            .get(index_u16)
            .map_err(|e| StageError::RenderFailed {
                page: index + 1,
                detail: format!("{:?}", e),
            })
    }
}

impl PageRasterizer for PdfiumRasterizer<'_> {
    fn page_count(&self) -> usize {
        self.document.pages().len() as usize
    }

    fn page_size(&self, index: usize) -> Result<PageSize, StageError> {
        let page = self.page(index)?;
        Ok(PageSize::new(page.width().value, page.height().value))
    }

    fn render_page(&mut self, index: usize, plan: &RenderPlan) -> Result<DynamicImage, StageError> {
        let page = self.page(index)?;

        let render_config = PdfRenderConfig::new()
            .set_target_size(plan.width_px as i32, plan.height_px as i32)
            .render_form_data(true);

        let bitmap = page
            .render_with_config(&render_config)
            .map_err(|e| StageError::RenderFailed {
                page: index + 1,
                detail: format!("{:?}", e),
            })?;

        let image = bitmap.as_image();
        debug!(
            "Rendered page {} → {}x{} px (zoom {:.3})",
            index + 1,
            image.width(),
            image.height(),
            plan.zoom
        );
        Ok(image)
    }
}

/// Map a pdfium load failure onto the password / corruption cases.
fn classify_load_error(e: PdfiumError, password_given: bool) -> StageError {
    let err_str = format!("{:?}", e);
    if err_str.contains("Password") || err_str.contains("password") {
        if password_given {
            StageError::WrongPassword
        } else {
            StageError::PasswordRequired
        }
    } else {
        StageError::CorruptPdf { detail: err_str }
    }
}
