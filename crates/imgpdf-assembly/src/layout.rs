//! Page geometry and fit math.
//!
//! Everything here is unit-agnostic except where named: page dimensions are
//! millimetres, image extents are pixels, and the fit treats both as the
//! same abstract unit the way a uniform scale allows.

use crate::types::{OrientationPolicy, PageSize};
use imgpdf_collection::Rotation;

/// Placement of a scaled image on a page, in page units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Resolve one page's dimensions from the preset, the orientation policy
/// and (under the adaptive policy) that image's rotation.
pub fn page_dimensions_mm(
    size: PageSize,
    policy: OrientationPolicy,
    rotation: Rotation,
) -> (f32, f32) {
    let (w, h) = size.dimensions_mm();
    let landscape = match policy {
        OrientationPolicy::Portrait => false,
        OrientationPolicy::Landscape => true,
        OrientationPolicy::Adaptive => rotation.swaps_axes(),
    };
    if landscape { (h, w) } else { (w, h) }
}

/// Uniform fit: scale by `min(page/image)` on both axes and center, leaving
/// equal margins on each axis.
pub fn fit_to_page(page_w: f32, page_h: f32, img_w: f32, img_h: f32) -> Placement {
    let scale = (page_w / img_w).min(page_h / img_h);
    let width = img_w * scale;
    let height = img_h * scale;
    Placement {
        x: (page_w - width) / 2.0,
        y: (page_h - height) / 2.0,
        width,
        height,
    }
}
