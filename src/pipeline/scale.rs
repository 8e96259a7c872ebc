//! Render-size negotiation: DPI against the deck's pixel ceiling.
//!
//! A slide is sized one point per rendered pixel, and PowerPoint refuses
//! slides with an edge longer than 56 inches (4032 pt). The zoom for a page
//! is therefore the DPI-derived zoom, capped so both edges fit within the
//! ceiling, with a 10% margin taken off the capped value:
//!
//! ```text
//! max_zoom = min(max_px / w_pt, max_px / h_pt, dpi / 72)
//! zoom     = min(dpi / 72, max_zoom * 0.9)
//! ```
//!
//! Note that the margin applies even when the DPI zoom is the binding term,
//! so a 300-DPI render of a small page comes out at 270 effective DPI.

use serde::{Deserialize, Serialize};

/// Points per inch; PDF user space unit.
pub const POINTS_PER_INCH: f32 = 72.0;

/// Fraction of the capped zoom that is actually used.
pub const SAFETY_MARGIN: f32 = 0.9;

/// Page size in PDF points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageSize {
    pub width: f32,
    pub height: f32,
}

impl PageSize {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// The zoom and output pixel size chosen for one page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RenderPlan {
    pub zoom: f32,
    pub width_px: u32,
    pub height_px: u32,
}

/// Compute the zoom factor for a page of `size` points.
///
/// Degenerate sizes (zero, negative, non-finite) fall back to the DPI term
/// alone so they never produce an infinite zoom.
pub fn zoom_for(size: PageSize, dpi: u32, max_pixels: u32) -> f32 {
    let dpi_zoom = dpi as f32 / POINTS_PER_INCH;
    let max_px = max_pixels as f32;

    let mut max_zoom = dpi_zoom;
    if size.width.is_finite() && size.width > 0.0 {
        max_zoom = max_zoom.min(max_px / size.width);
    }
    if size.height.is_finite() && size.height > 0.0 {
        max_zoom = max_zoom.min(max_px / size.height);
    }

    let safe_zoom = max_zoom * SAFETY_MARGIN;
    dpi_zoom.min(safe_zoom)
}

/// Compute the full render plan for one page.
pub fn plan_page(size: PageSize, dpi: u32, max_pixels: u32) -> RenderPlan {
    let zoom = zoom_for(size, dpi, max_pixels);
    RenderPlan {
        zoom,
        width_px: to_pixels(size.width, zoom, max_pixels),
        height_px: to_pixels(size.height, zoom, max_pixels),
    }
}

fn to_pixels(points: f32, zoom: f32, max_pixels: u32) -> u32 {
    if !points.is_finite() || points <= 0.0 {
        return 1;
    }
    // A zero ceiling still yields a 1-pixel render.
    ((points * zoom).round() as u32).clamp(1, max_pixels.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    const A4: PageSize = PageSize {
        width: 595.0,
        height: 842.0,
    };

    #[test]
    fn a4_at_300_dpi_keeps_dpi_with_margin() {
        // 300/72 ≈ 4.1667; A4 height allows 4032/842 ≈ 4.789, so DPI binds.
        let plan = plan_page(A4, 300, 4032);
        let expected = 300.0 / 72.0 * 0.9;
        assert!((plan.zoom - expected).abs() < 1e-5, "zoom {}", plan.zoom);
        assert_eq!(plan.width_px, (595.0_f32 * expected).round() as u32);
        assert_eq!(plan.height_px, (842.0_f32 * expected).round() as u32);
    }

    #[test]
    fn large_page_is_capped_below_ceiling() {
        // A0 poster: 2384 x 3370 pt.
        let a0 = PageSize::new(2384.0, 3370.0);
        let plan = plan_page(a0, 300, 4032);
        assert!(plan.height_px <= 4032);
        assert!(plan.width_px <= 4032);
        // The margin leaves ~10% headroom on the binding edge.
        assert!(plan.height_px <= (4032.0_f32 * 0.9).round() as u32 + 1);
    }

    #[test]
    fn no_dimension_exceeds_bound_for_any_size() {
        let sizes = [
            (1.0, 1.0),
            (72.0, 72.0),
            (612.0, 792.0),
            (792.0, 612.0),
            (14_400.0, 14_400.0),
            (14_400.0, 10.0),
            (3.0, 20_000.0),
            (0.5, 0.5),
        ];
        for dpi in [72, 150, 300, 600] {
            for (w, h) in sizes {
                let plan = plan_page(PageSize::new(w, h), dpi, 4032);
                assert!(plan.width_px <= 4032, "{w}x{h}@{dpi}: {plan:?}");
                assert!(plan.height_px <= 4032, "{w}x{h}@{dpi}: {plan:?}");
                assert!(plan.width_px >= 1 && plan.height_px >= 1);
            }
        }
    }

    #[test]
    fn zoom_never_exceeds_dpi_zoom() {
        for dpi in [72, 96, 300] {
            let z = zoom_for(PageSize::new(100.0, 100.0), dpi, 4032);
            assert!(z <= dpi as f32 / 72.0);
        }
    }

    #[test]
    fn degenerate_size_uses_dpi_term() {
        let plan = plan_page(PageSize::new(0.0, f32::NAN), 144, 4032);
        assert!((plan.zoom - 2.0 * 0.9).abs() < 1e-5);
        assert_eq!(plan.width_px, 1);
        assert_eq!(plan.height_px, 1);
    }

    #[test]
    fn zero_ceiling_renders_one_pixel() {
        let plan = plan_page(A4, 300, 0);
        assert_eq!((plan.width_px, plan.height_px), (1, 1));
        assert!(plan.zoom.is_finite());
    }

    #[test]
    fn smaller_ceiling_is_respected() {
        let plan = plan_page(PageSize::new(612.0, 792.0), 300, 1000);
        assert!(plan.height_px <= 900);
        assert!(plan.width_px < plan.height_px);
    }
}
