//! Image encoding: `DynamicImage` → page image file.
//!
//! JPEG output drops the alpha channel first; pdfium bitmaps come back RGBA
//! and the JPEG encoder rejects four-channel input. Pages are rendered on a
//! white background, so flattening loses nothing visible.

use crate::config::ImageFormat;
use crate::error::StageError;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{DynamicImage, ImageEncoder};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::debug;

/// File name for a 1-indexed page: `page_001.jpg`.
///
/// Numbers are padded to at least three digits, and wider when the document
/// has more pages, so lexical order always matches page order.
pub fn page_file_name(page_num: usize, total_pages: usize, format: ImageFormat) -> String {
    let width = total_pages.to_string().len().max(3);
    format!("page_{:0width$}.{}", page_num, format.extension(), width = width)
}

/// Encode `img` into `dir`, returning the written path.
pub fn write_page_image(
    img: &DynamicImage,
    dir: &Path,
    page_num: usize,
    total_pages: usize,
    format: ImageFormat,
    jpeg_quality: u8,
) -> Result<PathBuf, StageError> {
    let path = dir.join(page_file_name(page_num, total_pages, format));
    let file = File::create(&path).map_err(|e| {
        StageError::io(format!("Failed to create '{}'", path.display()), e)
    })?;
    let mut writer = BufWriter::new(file);

    let result = match format {
        ImageFormat::Jpeg => {
            let rgb = img.to_rgb8();
            JpegEncoder::new_with_quality(&mut writer, jpeg_quality).write_image(
                rgb.as_raw(),
                rgb.width(),
                rgb.height(),
                image::ExtendedColorType::Rgb8,
            )
        }
        ImageFormat::Png => {
            let rgba = img.to_rgba8();
            PngEncoder::new(&mut writer).write_image(
                rgba.as_raw(),
                rgba.width(),
                rgba.height(),
                image::ExtendedColorType::Rgba8,
            )
        }
    };
    result.map_err(|source| StageError::ImageWrite {
        page: page_num,
        source,
    })?;

    writer.into_inner().map_err(|e| {
        StageError::io(
            format!("Failed to flush '{}'", path.display()),
            e.into_error(),
        )
    })?;

    debug!("Wrote {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use tempfile::TempDir;

    fn red(w: u32, h: u32) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(w, h, Rgba([255, 0, 0, 255])))
    }

    #[test]
    fn names_are_zero_padded() {
        assert_eq!(page_file_name(1, 12, ImageFormat::Jpeg), "page_001.jpg");
        assert_eq!(page_file_name(42, 120, ImageFormat::Png), "page_042.png");
        assert_eq!(page_file_name(7, 1500, ImageFormat::Jpeg), "page_0007.jpg");
    }

    #[test]
    fn jpeg_round_trip_keeps_dimensions() {
        let dir = TempDir::new().unwrap();
        let path = write_page_image(&red(31, 17), dir.path(), 1, 1, ImageFormat::Jpeg, 90).unwrap();
        assert!(path.ends_with("page_001.jpg"));
        assert_eq!(image::image_dimensions(&path).unwrap(), (31, 17));
    }

    #[test]
    fn png_is_written() {
        let dir = TempDir::new().unwrap();
        let path = write_page_image(&red(8, 8), dir.path(), 3, 9, ImageFormat::Png, 90).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[..4], b"\x89PNG");
    }

    #[test]
    fn missing_directory_is_io_error() {
        let err = write_page_image(
            &red(2, 2),
            Path::new("/definitely/not/a/dir"),
            1,
            1,
            ImageFormat::Jpeg,
            90,
        )
        .unwrap_err();
        assert!(matches!(err, StageError::Io { .. }));
    }
}
