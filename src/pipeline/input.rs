//! Input validation and output path planning.
//!
//! Validation runs before any scratch space is created or the PDF engine is
//! bound, so a bad path never costs more than two `stat` calls. Only the
//! extension is checked here; content problems surface later as
//! [`crate::error::StageError::CorruptPdf`] from the engine.

use crate::error::Pdf2PptxError;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A validated input together with where its outputs will be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionJob {
    /// The source PDF.
    pub input: PathBuf,
    /// Folder receiving the deck and the images folder.
    pub output_dir: PathBuf,
    /// `<output_dir>/<stem>.pptx`
    pub deck_path: PathBuf,
    /// `<output_dir>/<stem>_images`
    pub images_dir: PathBuf,
}

impl ConversionJob {
    /// Validate `input` and derive output locations.
    ///
    /// `output_dir` defaults to the input file's directory.
    pub fn prepare(input: &Path, output_dir: Option<&Path>) -> Result<Self, Pdf2PptxError> {
        validate_input(input)?;

        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| Pdf2PptxError::InvalidFormat {
                path: input.to_path_buf(),
            })?;

        let output_dir = match output_dir {
            Some(dir) => dir.to_path_buf(),
            None => default_output_dir(input),
        };

        let job = Self {
            input: input.to_path_buf(),
            deck_path: output_dir.join(format!("{stem}.pptx")),
            images_dir: output_dir.join(format!("{stem}_images")),
            output_dir,
        };
        debug!(
            "Planned outputs: deck={} images={}",
            job.deck_path.display(),
            job.images_dir.display()
        );
        Ok(job)
    }
}

/// Check the input exists and carries a `.pdf` extension (any case).
pub fn validate_input(path: &Path) -> Result<(), Pdf2PptxError> {
    if !path.exists() {
        return Err(Pdf2PptxError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    if !has_pdf_extension(path) {
        return Err(Pdf2PptxError::InvalidFormat {
            path: path.to_path_buf(),
        });
    }
    if path.is_dir() {
        return Err(Pdf2PptxError::InvalidFormat {
            path: path.to_path_buf(),
        });
    }
    Ok(())
}

/// `true` if the path ends in `.pdf`, compared case-insensitively.
pub fn has_pdf_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
}

fn default_output_dir(input: &Path) -> PathBuf {
    match input.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
