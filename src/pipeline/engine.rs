//! Locating and binding the pdfium shared library.
//!
//! pdfium-render loads pdfium dynamically at runtime. The library is looked
//! up in this order, first hit wins:
//!
//! 1. [`ConversionConfig::pdfium_lib_path`](crate::ConversionConfig::pdfium_lib_path)
//! 2. `PDFIUM_LIB_PATH`
//! 3. the per-user cache, e.g. `~/.cache/pdf2pptx/libpdfium.so`
//! 4. the directory containing the running executable
//! 5. the system library search path
//!
//! Each entry may name the library file itself or a directory holding it.

use crate::error::StageError;
use pdfium_render::prelude::Pdfium;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Platform file name of the pdfium shared library.
#[cfg(target_os = "macos")]
pub const PDFIUM_LIB_NAME: &str = "libpdfium.dylib";
#[cfg(target_os = "windows")]
pub const PDFIUM_LIB_NAME: &str = "pdfium.dll";
#[cfg(not(any(target_os = "macos", target_os = "windows")))]
pub const PDFIUM_LIB_NAME: &str = "libpdfium.so";

/// Environment variable naming an existing pdfium library (file or directory).
pub const PDFIUM_LIB_PATH_ENV: &str = "PDFIUM_LIB_PATH";

/// Returns the per-user directory searched for a dropped-in pdfium library.
///
/// - **macOS**: `~/Library/Caches/pdf2pptx/`
/// - **Linux**: `~/.cache/pdf2pptx/`
/// - **Windows**: `%LOCALAPPDATA%\pdf2pptx\`
pub fn pdfium_cache_dir() -> PathBuf {
    let base = dirs::cache_dir()
        .or_else(|| dirs::home_dir().map(|h| h.join(".cache")))
        .unwrap_or_else(std::env::temp_dir);
    base.join("pdf2pptx")
}

/// Candidate library paths, most specific first.
pub fn candidate_paths(explicit: Option<&Path>) -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    if let Some(p) = explicit {
        candidates.push(as_library_path(p));
    }
    if let Ok(env_path) = std::env::var(PDFIUM_LIB_PATH_ENV) {
        if !env_path.is_empty() {
            candidates.push(as_library_path(Path::new(&env_path)));
        }
    }
    candidates.push(pdfium_cache_dir().join(PDFIUM_LIB_NAME));
    if let Some(exe_dir) = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        candidates.push(exe_dir.join(PDFIUM_LIB_NAME));
    }

    candidates
}

/// Bind to pdfium, trying each candidate path and finally the system library.
pub fn bind_pdfium(explicit: Option<&Path>) -> Result<Pdfium, StageError> {
    let mut tried = Vec::new();

    for path in candidate_paths(explicit) {
        if !path.exists() {
            tried.push(format!("{} (missing)", path.display()));
            continue;
        }
        match Pdfium::bind_to_library(&path) {
            Ok(bindings) => {
                info!("Bound pdfium from {}", path.display());
                return Ok(Pdfium::new(bindings));
            }
            Err(e) => {
                debug!("pdfium bind failed for {}: {}", path.display(), e);
                tried.push(format!("{} ({e})", path.display()));
            }
        }
    }

    match Pdfium::bind_to_system_library() {
        Ok(bindings) => {
            info!("Bound system pdfium library");
            Ok(Pdfium::new(bindings))
        }
        Err(e) => {
            tried.push(format!("system library ({e})"));
            Err(StageError::EngineUnavailable(format!(
                "tried {}",
                tried.join("; ")
            )))
        }
    }
}

/// A directory is expanded to the platform library file inside it.
fn as_library_path(p: &Path) -> PathBuf {
    if p.is_dir() {
        p.join(PDFIUM_LIB_NAME)
    } else {
        p.to_path_buf()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_dir_is_deterministic() {
        let d1 = pdfium_cache_dir();
        let d2 = pdfium_cache_dir();
        assert_eq!(d1, d2);
        assert!(d1.ends_with("pdf2pptx"));
    }

    #[test]
    fn explicit_path_comes_first() {
        let explicit = Path::new("/opt/pdfium/lib/libpdfium.so");
        let candidates = candidate_paths(Some(explicit));
        assert_eq!(candidates[0], explicit);
    }

    #[test]
    fn explicit_directory_expands_to_library_name() {
        let dir = tempfile::TempDir::new().unwrap();
        let candidates = candidate_paths(Some(dir.path()));
        assert_eq!(candidates[0], dir.path().join(PDFIUM_LIB_NAME));
    }

    #[test]
    fn missing_explicit_library_is_engine_unavailable_or_system() {
        // With no pdfium anywhere this must be EngineUnavailable; on a machine
        // with a system pdfium it binds and that is fine too.
        match bind_pdfium(Some(Path::new("/definitely/not/libpdfium.so"))) {
            Ok(_) => {}
            Err(e) => assert!(matches!(e, StageError::EngineUnavailable(_))),
        }
    }
}
