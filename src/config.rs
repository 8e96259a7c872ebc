//! Configuration types for PDF-to-PPTX conversion.
//!
//! All conversion behaviour is controlled through [`ConversionConfig`], built
//! via its [`ConversionConfigBuilder`]. One struct holding every knob keeps a
//! [`crate::Converter`] cheap to clone into a worker thread and lets the CLI
//! print the effective settings with `--verbose`.

use crate::error::Pdf2PptxError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Largest slide edge PowerPoint accepts: 56 inches at 72 points per inch.
///
/// Slides are sized one point per rendered pixel, so this doubles as the
/// pixel ceiling for rendered pages.
pub const POWERPOINT_MAX_PIXELS: u32 = 4032;

/// Default rendering resolution.
pub const DEFAULT_DPI: u32 = 300;

/// Configuration for a PDF-to-PPTX conversion.
///
/// Built via [`ConversionConfig::builder()`] or using
/// [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use pdf2pptx::{ConversionConfig, ImageFormat};
///
/// let config = ConversionConfig::builder()
///     .dpi(200)
///     .image_format(ImageFormat::Png)
///     .build()
///     .unwrap();
/// assert_eq!(config.dpi, 200);
/// ```
#[derive(Clone, Serialize, Deserialize)]
pub struct ConversionConfig {
    /// Target rendering DPI. Range: 72–600. Default: 300.
    ///
    /// Converted to a zoom factor of `dpi / 72` and then capped by
    /// [`ConversionConfig::max_pixels`], so large pages may come out at a
    /// lower effective resolution.
    pub dpi: u32,

    /// Maximum rendered width or height in pixels. Default: 4032.
    ///
    /// The cap is applied with a 10% safety margin, so in practice no page
    /// edge exceeds 90% of this value.
    pub max_pixels: u32,

    /// Encoding used for page images. Default: [`ImageFormat::Jpeg`].
    pub image_format: ImageFormat,

    /// JPEG quality, 1–100. Ignored for PNG. Default: 90.
    pub jpeg_quality: u8,

    /// PDF user password for encrypted documents.
    #[serde(skip_serializing, default)]
    pub password: Option<String>,

    /// Explicit path to the pdfium shared library. Takes precedence over
    /// `PDFIUM_LIB_PATH` and the default search locations.
    pub pdfium_lib_path: Option<PathBuf>,

    /// Parent directory for the per-conversion scratch folder.
    /// If None, uses the system temp dir.
    pub scratch_root: Option<PathBuf>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            dpi: DEFAULT_DPI,
            max_pixels: POWERPOINT_MAX_PIXELS,
            image_format: ImageFormat::default(),
            jpeg_quality: 90,
            password: None,
            pdfium_lib_path: None,
            scratch_root: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("dpi", &self.dpi)
            .field("max_pixels", &self.max_pixels)
            .field("image_format", &self.image_format)
            .field("jpeg_quality", &self.jpeg_quality)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("pdfium_lib_path", &self.pdfium_lib_path)
            .field("scratch_root", &self.scratch_root)
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn dpi(mut self, dpi: u32) -> Self {
        self.config.dpi = dpi.clamp(72, 600);
        self
    }

    pub fn max_pixels(mut self, px: u32) -> Self {
        self.config.max_pixels = px.max(100);
        self
    }

    pub fn image_format(mut self, format: ImageFormat) -> Self {
        self.config.image_format = format;
        self
    }

    pub fn jpeg_quality(mut self, quality: u8) -> Self {
        self.config.jpeg_quality = quality.clamp(1, 100);
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn pdfium_lib_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pdfium_lib_path = Some(path.into());
        self
    }

    pub fn scratch_root(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.scratch_root = Some(dir.into());
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, Pdf2PptxError> {
        let c = &self.config;
        if c.dpi < 72 || c.dpi > 600 {
            return Err(Pdf2PptxError::InvalidConfig(format!(
                "DPI must be 72–600, got {}",
                c.dpi
            )));
        }
        if c.max_pixels < 100 {
            return Err(Pdf2PptxError::InvalidConfig(format!(
                "Maximum pixel size must be ≥ 100, got {}",
                c.max_pixels
            )));
        }
        if let Some(ref root) = c.scratch_root {
            if !root.is_dir() {
                return Err(Pdf2PptxError::InvalidConfig(format!(
                    "Scratch root '{}' is not a directory",
                    root.display()
                )));
            }
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Encoding of the per-page images placed on slides.
///
/// JPEG keeps decks small for photo-heavy or scanned documents; PNG keeps
/// text and line art lossless at the cost of larger files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// Baseline JPEG, alpha flattened. (default)
    #[default]
    Jpeg,
    /// Lossless PNG.
    Png,
}

impl ImageFormat {
    /// File extension used for page images (`page_001.jpg`).
    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "jpg",
            ImageFormat::Png => "png",
        }
    }

    /// Extension and content type used for the media part inside the deck.
    pub fn media_extension(self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "jpeg",
            ImageFormat::Png => "png",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Png => "image/png",
        }
    }
}
