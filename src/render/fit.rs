use crate::foundation::core::Rect;

/// Largest rectangle with the image's aspect ratio that fits inside `out_w` x `out_h`, centred on
/// the axis with slack (letterbox/pillarbox).
///
/// Degenerate inputs yield the full output rectangle.
pub fn contain_rect(image_w: f64, image_h: f64, out_w: f64, out_h: f64) -> Rect {
    if !(image_w > 0.0 && image_h > 0.0 && out_w > 0.0 && out_h > 0.0) {
        return Rect::new(0.0, 0.0, out_w.max(0.0), out_h.max(0.0));
    }
    let image_aspect = image_w / image_h;
    let output_aspect = out_w / out_h;
    if image_aspect > output_aspect {
        let h = out_w / image_aspect;
        let y = (out_h - h) / 2.0;
        Rect::new(0.0, y, out_w, y + h)
    } else {
        let w = out_h * image_aspect;
        let x = (out_w - w) / 2.0;
        Rect::new(x, 0.0, x + w, out_h)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/fit.rs"]
mod tests;
