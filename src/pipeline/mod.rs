//! Pipeline stages for PDF-to-PPTX conversion.
//!
//! Each submodule implements one step and is tested on its own; the
//! orchestration lives in [`crate::convert`].
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ scale ──▶ render ──▶ encode ──▶ deck ──▶ workspace
//! (checks)  (zoom)   (pdfium)  (jpg/png)  (pptx)   (publish)
//! ```
//!
//! 1. [`input`]  — existence and extension checks, output path planning
//! 2. [`scale`]  — per-page zoom: DPI target capped by the pixel ceiling
//! 3. [`render`] — rasterise pages through the [`render::PageRasterizer`] seam;
//!    [`engine`] locates and binds the pdfium library
//! 4. [`encode`] — write each bitmap to `page_NNN.{jpg,png}` in scratch space
//! 5. [`deck`]   — the PPTX package, one stretched picture per slide
//! 6. [`workspace`] — scratch lifetime and copying images beside the deck

pub mod deck;
pub mod encode;
pub mod engine;
pub mod input;
pub mod render;
pub mod scale;
pub mod workspace;
