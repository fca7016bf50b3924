use std::collections::HashMap;

use crate::assets::source::AssetRef;
use crate::document::layer::{Layer, LayerId, LayerStyle};
use crate::document::model::Document;
use crate::foundation::core::{Affine, Point, Size, Vec2};
use crate::interaction::viewport::Viewport;

/// Grab distance around a resize handle, in screen pixels.
pub const HANDLE_RADIUS_PX: f64 = 8.0;

/// Unrotated on-screen box of a layer at 100% zoom.
pub trait LayerExtents {
    fn extent(&self, layer: &Layer) -> Size;
}

/// Extents from font-size heuristics and known image aspect ratios.
///
/// Text is estimated at `0.6em` per character and `1.2em` tall. Images default to square until
/// their aspect ratio is recorded.
#[derive(Clone, Debug, Default)]
pub struct EstimatedExtents {
    aspects: HashMap<AssetRef, f64>,
}

impl EstimatedExtents {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `height / width` for `asset`.
    pub fn set_aspect(&mut self, asset: AssetRef, aspect: f64) {
        if aspect.is_finite() && aspect > 0.0 {
            self.aspects.insert(asset, aspect);
        }
    }

    pub fn aspect(&self, asset: &AssetRef) -> f64 {
        self.aspects.get(asset).copied().unwrap_or(1.0)
    }
}

impl LayerExtents for EstimatedExtents {
    fn extent(&self, layer: &Layer) -> Size {
        match &layer.style {
            LayerStyle::Text(s) => {
                let chars = s.content.chars().count() as f64;
                let gaps = (chars - 1.0).max(0.0);
                let w = chars * s.font_size_px * 0.6 + gaps * s.letter_spacing_px;
                Size::new(w.max(s.font_size_px * 0.6), s.font_size_px * 1.2)
            }
            LayerStyle::Logo(s) | LayerStyle::Sticker(s) => {
                Size::new(s.size_px, s.size_px * self.aspect(&s.content))
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Corner {
    Nw,
    Ne,
    Sw,
    Se,
}

impl Corner {
    pub const ALL: [Corner; 4] = [Corner::Nw, Corner::Ne, Corner::Sw, Corner::Se];

    pub fn is_west(self) -> bool {
        matches!(self, Corner::Nw | Corner::Sw)
    }

    pub fn is_north(self) -> bool {
        matches!(self, Corner::Nw | Corner::Ne)
    }
}

/// A layer's box in rendered-container coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayerFrame {
    pub center: Point,
    pub size: Size,
    pub rotation_deg: f64,
}

impl LayerFrame {
    pub fn of(layer: &Layer, extents: &dyn LayerExtents, viewport: &Viewport) -> Self {
        let rendered = viewport.rendered_size();
        Self {
            center: Point::new(
                layer.position.x / 100.0 * rendered.width,
                layer.position.y / 100.0 * rendered.height,
            ),
            size: extents.extent(layer) * viewport.zoom_factor(),
            rotation_deg: layer.style.rotation_deg(),
        }
    }

    fn local_to_container(&self) -> Affine {
        Affine::translate(self.center.to_vec2()) * Affine::rotate(self.rotation_deg.to_radians())
    }

    pub fn contains(&self, p: Point) -> bool {
        let local = self.local_to_container().inverse() * p;
        local.x.abs() <= self.size.width / 2.0 && local.y.abs() <= self.size.height / 2.0
    }

    pub fn corner(&self, corner: Corner) -> Point {
        let hx = self.size.width / 2.0;
        let hy = self.size.height / 2.0;
        let local = Vec2::new(
            if corner.is_west() { -hx } else { hx },
            if corner.is_north() { -hy } else { hy },
        );
        self.local_to_container() * local.to_point()
    }
}

/// Topmost visible layer under `p` (rendered-container coordinates).
pub fn hit_test(
    doc: &Document,
    extents: &dyn LayerExtents,
    viewport: &Viewport,
    p: Point,
) -> Option<LayerId> {
    doc.layers()
        .iter()
        .rev()
        .filter(|l| l.visible)
        .find(|l| LayerFrame::of(l, extents, viewport).contains(p))
        .map(|l| l.id)
}

/// Resize handle of the selected layer under `p`, if any.
pub fn hit_handle(
    doc: &Document,
    extents: &dyn LayerExtents,
    viewport: &Viewport,
    p: Point,
) -> Option<(LayerId, Corner)> {
    let layer = doc.selected_layer().filter(|l| l.visible)?;
    let frame = LayerFrame::of(layer, extents, viewport);
    Corner::ALL
        .into_iter()
        .find(|&c| frame.corner(c).distance(p) <= HANDLE_RADIUS_PX)
        .map(|c| (layer.id, c))
}

#[cfg(test)]
#[path = "../../tests/unit/interaction/hit.rs"]
mod tests;
