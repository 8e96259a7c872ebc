//! Scratch space for one conversion, and publishing its images.
//!
//! Rendered pages are written to a private [`TempDir`] and only copied to the
//! user-visible `<basename>_images` folder once the deck has been written.
//! The `TempDir` is owned by [`Scratch`], so it is removed when the
//! conversion returns on any path: success, a pipeline error, or a panic
//! unwinding through the worker.

use crate::error::StageError;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, warn};

/// Prefix of every scratch directory name.
pub const SCRATCH_PREFIX: &str = "pdf2pptx_";

/// Per-conversion scratch directory.
pub struct Scratch {
    dir: TempDir,
    images: PathBuf,
}

impl Scratch {
    /// Create `<root>/pdf2pptx_XXXXXX/images`, with `root` defaulting to the
    /// system temp dir.
    pub fn create(root: Option<&Path>) -> Result<Self, StageError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(SCRATCH_PREFIX);
        let dir = match root {
            Some(root) => builder.tempdir_in(root),
            None => builder.tempdir(),
        }
        .map_err(|e| StageError::io("Failed to create scratch directory", e))?;

        let images = dir.path().join("images");
        fs::create_dir(&images)
            .map_err(|e| StageError::io("Failed to create scratch images directory", e))?;

        debug!("Scratch directory: {}", dir.path().display());
        Ok(Self { dir, images })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Where rendered pages are written.
    pub fn images_dir(&self) -> &Path {
        &self.images
    }

    /// Remove the scratch directory now, logging rather than failing.
    ///
    /// Dropping a `Scratch` does the same silently.
    pub fn cleanup(self) {
        let path = self.dir.path().to_path_buf();
        if let Err(e) = self.dir.close() {
            warn!("Failed to remove scratch directory {}: {}", path.display(), e);
        } else {
            debug!("Removed scratch directory {}", path.display());
        }
    }
}

/// Replace `dest` with a copy of every file in `src`.
///
/// Returns the copied paths in name order. Any existing `dest` (file or
/// folder) is removed first so stale pages from an earlier, longer document
/// cannot linger.
pub fn publish_images(src: &Path, dest: &Path) -> Result<Vec<PathBuf>, StageError> {
    if dest.is_dir() {
        warn!("Replacing existing images folder {}", dest.display());
        fs::remove_dir_all(dest).map_err(|e| {
            StageError::io(format!("Failed to remove '{}'", dest.display()), e)
        })?;
    } else if dest.exists() {
        fs::remove_file(dest).map_err(|e| {
            StageError::io(format!("Failed to remove '{}'", dest.display()), e)
        })?;
    }

    fs::create_dir_all(dest)
        .map_err(|e| StageError::io(format!("Failed to create '{}'", dest.display()), e))?;

    let mut entries: Vec<PathBuf> = fs::read_dir(src)
        .map_err(|e| StageError::io(format!("Failed to read '{}'", src.display()), e))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file())
        .collect();
    entries.sort();

    let mut copied = Vec::with_capacity(entries.len());
    for from in entries {
        let Some(name) = from.file_name() else {
            continue;
        };
        let to = dest.join(name);
        fs::copy(&from, &to).map_err(|e| {
            StageError::io(
                format!("Failed to copy '{}' to '{}'", from.display(), to.display()),
                e,
            )
        })?;
        copied.push(to);
    }

    debug!("Published {} images to {}", copied.len(), dest.display());
    Ok(copied)
}
