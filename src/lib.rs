//! # pdf2pptx
//!
//! Convert PDF documents into PowerPoint decks, one page per slide.
//!
//! Each page is rasterised with pdfium and placed as a single picture that
//! covers its slide. Nothing is extracted or re-flowed, so the deck looks
//! exactly like the PDF: fonts, vector art and annotations included. The
//! rendered page images are also kept in a folder beside the deck.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Input    existence + .pdf extension check
//!  ├─ 2. Scale    zoom = min(dpi/72, 0.9 × pixel-ceiling zoom)
//!  ├─ 3. Render   rasterise pages via pdfium into a scratch dir
//!  ├─ 4. Deck     <name>.pptx, slide size = first page in pixels
//!  ├─ 5. Publish  copy images to <name>_images/
//!  └─ 6. Cleanup  scratch dir removed on every path
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf2pptx::{convert, ConversionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConversionConfig::default();
//!     let output = convert("document.pdf", None, &config, None).await?;
//!     println!("{} ({} slides)", output.deck_path.display(), output.pages.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf2pptx` binary (clap + anyhow + indicatif + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! pdf2pptx = { version = "0.1", default-features = false }
//! ```
//!
//! ## The pdfium library
//!
//! pdfium is loaded at runtime. See [`pipeline::engine`] for the search
//! order; pre-built binaries are published at
//! <https://github.com/bblanchon/pdfium-binaries/releases>.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConversionConfig, ConversionConfigBuilder, ImageFormat};
pub use convert::{convert, convert_sync, inspect, Converter};
pub use error::{Pdf2PptxError, StageError};
pub use output::{ConversionOutput, ConversionStats, DocumentInfo, PageInfo, RenderedPage};
pub use pipeline::render::PageRasterizer;
pub use pipeline::scale::{PageSize, RenderPlan};
pub use progress::{
    ConversionProgressCallback, NoopProgressCallback, ProgressCallback, ProgressUpdate, Stage,
};
