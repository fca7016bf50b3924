use crate::foundation::error::{StudioError, StudioResult};

/// Largest pixmap edge an SVG is rasterized to.
pub const MAX_SVG_RASTER_DIM: u32 = 16_384;

/// Pixel size for rasterizing an SVG drawn at `width` x `height` output pixels.
///
/// Rounds up so the raster is never upscaled when drawn.
pub fn svg_raster_size(width: f64, height: f64) -> StudioResult<(u32, u32)> {
    fn to_px(v: f64) -> StudioResult<u32> {
        if !v.is_finite() || v <= 0.0 {
            return Err(StudioError::render("svg target size must be finite and > 0"));
        }
        Ok((v.ceil() as u32).max(1))
    }

    let w = to_px(width)?;
    let h = to_px(height)?;

    // Avoid pathological allocations.
    if w > MAX_SVG_RASTER_DIM || h > MAX_SVG_RASTER_DIM {
        return Err(StudioError::render(format!(
            "svg raster size too large: {w}x{h} (max {MAX_SVG_RASTER_DIM}x{MAX_SVG_RASTER_DIM})"
        )));
    }
    Ok((w, h))
}

/// Rasterize `tree` stretched to exactly `width` x `height`, as premultiplied RGBA8.
pub fn rasterize_svg_to_premul_rgba8(
    tree: &usvg::Tree,
    width: u32,
    height: u32,
) -> StudioResult<Vec<u8>> {
    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| StudioError::render("failed to allocate svg pixmap"))?;

    let sx = (width as f32) / tree.size().width();
    let sy = (height as f32) / tree.size().height();
    let xform = resvg::tiny_skia::Transform::from_scale(sx, sy);

    resvg::render(tree, xform, &mut pixmap.as_mut());
    Ok(pixmap.data().to_vec())
}

#[cfg(test)]
#[path = "../../tests/unit/assets/svg_raster.rs"]
mod tests;
