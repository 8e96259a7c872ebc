//! Error types for the pdf2pptx library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`Pdf2PptxError`] — what callers of `convert*` see. Validation
//!   failures ([`Pdf2PptxError::FileNotFound`],
//!   [`Pdf2PptxError::InvalidFormat`]) are returned as-is, before any scratch
//!   space is created or any page is rendered, so a caller can tell "bad
//!   input" apart from "conversion broke".
//!
//! * [`StageError`] — **what broke inside the pipeline**: the engine could
//!   not be bound, a page failed to rasterise, the deck could not be written.
//!   Every such failure reaches the caller wrapped in
//!   [`Pdf2PptxError::ConversionFailed`], with the stage error available
//!   through [`std::error::Error::source`].

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the pdf2pptx library.
#[derive(Debug, Error)]
pub enum Pdf2PptxError {
    // ── Validation errors ─────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// The input does not carry a `.pdf` extension.
    #[error("'{path}' is not a PDF file (expected a .pdf extension)")]
    InvalidFormat { path: PathBuf },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Pipeline errors ───────────────────────────────────────────────────
    /// Rendering, assembly or publishing failed; `source` holds the cause.
    #[error("Conversion of '{path}' failed: {source}")]
    ConversionFailed {
        path: PathBuf,
        #[source]
        source: StageError,
    },
}

impl Pdf2PptxError {
    /// `true` for the errors raised before the pipeline starts.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Pdf2PptxError::FileNotFound { .. } | Pdf2PptxError::InvalidFormat { .. }
        )
    }

    /// The wrapped pipeline error, if this is a conversion failure.
    pub fn stage_error(&self) -> Option<&StageError> {
        match self {
            Pdf2PptxError::ConversionFailed { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// A failure inside one of the pipeline stages.
#[derive(Debug, Error)]
pub enum StageError {
    // ── Engine ────────────────────────────────────────────────────────────
    /// No pdfium library could be bound.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
Set PDFIUM_LIB_PATH=/path/to/libpdfium (or pass --pdfium-lib), or place the\n\
library next to the pdf2pptx executable.\n\
Pre-built libraries: https://github.com/bblanchon/pdfium-binaries/releases"
    )]
    EngineUnavailable(String),

    // ── PDF errors ────────────────────────────────────────────────────────
    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF is corrupt: {detail}")]
    CorruptPdf { detail: String },

    /// PDF requires a password but none was provided.
    #[error("PDF is encrypted and requires a password.\nProvide it with --password <PASSWORD>.")]
    PasswordRequired,

    /// A password was provided but it is wrong.
    #[error("Wrong password for encrypted PDF")]
    WrongPassword,

    /// The document opened but has no pages.
    #[error("PDF has no pages")]
    EmptyDocument,

    // ── Render errors ─────────────────────────────────────────────────────
    /// The engine returned an error for a specific page.
    #[error("Rasterisation failed for page {page}: {detail}")]
    RenderFailed { page: usize, detail: String },

    /// A rendered page could not be encoded or written to the scratch dir.
    #[error("Failed to write image for page {page}: {source}")]
    ImageWrite {
        page: usize,
        #[source]
        source: image::ImageError,
    },

    // ── Assembly errors ───────────────────────────────────────────────────
    /// Assembly was asked to build a deck from zero images.
    #[error("No page images were produced; nothing to place on slides")]
    NoImages,

    /// The PPTX archive could not be written.
    #[error("Failed to write deck '{path}': {source}")]
    DeckWrite {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Filesystem operation failed (scratch setup, copy, rename).
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error (e.g. the worker thread panicked).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl StageError {
    /// Attach a description to an I/O error.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        StageError::Io {
            context: context.into(),
            source,
        }
    }
}
