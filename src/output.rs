//! Result types returned by conversion and inspection.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Everything a successful conversion produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionOutput {
    /// The written `.pptx` file.
    pub deck_path: PathBuf,
    /// The `<basename>_images` folder beside the deck.
    pub images_dir: PathBuf,
    /// One entry per page, in page order. Paths point into `images_dir`.
    pub pages: Vec<RenderedPage>,
    /// Slide width in pixels (= points); equals the first page's render width.
    pub slide_width_px: u32,
    /// Slide height in pixels (= points); equals the first page's render height.
    pub slide_height_px: u32,
    pub stats: ConversionStats,
}

/// A single rendered page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedPage {
    /// 1-indexed page number.
    pub page_num: usize,
    pub path: PathBuf,
    pub width_px: u32,
    pub height_px: u32,
    /// Zoom factor applied to the page's point size.
    pub zoom: f32,
}

/// Timings and counts for one conversion.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversionStats {
    pub total_pages: usize,
    pub render_duration_ms: u64,
    pub assemble_duration_ms: u64,
    pub copy_duration_ms: u64,
    pub total_duration_ms: u64,
    /// Size of the written deck in bytes.
    pub deck_bytes: u64,
}

/// Native page geometry plus the render plan the converter would apply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageInfo {
    /// 1-indexed page number.
    pub page_num: usize,
    pub width_pt: f32,
    pub height_pt: f32,
    pub zoom: f32,
    pub width_px: u32,
    pub height_px: u32,
}

/// Document-level facts reported by [`crate::inspect`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentInfo {
    pub path: PathBuf,
    pub title: Option<String>,
    pub author: Option<String>,
    pub creator: Option<String>,
    pub producer: Option<String>,
    pub pdf_version: String,
    pub page_count: usize,
    pub pages: Vec<PageInfo>,
    /// Where `convert` would write, given the same output folder.
    pub planned_deck_path: PathBuf,
    pub planned_images_dir: PathBuf,
}
