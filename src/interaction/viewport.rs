use crate::foundation::core::{Point, Size, Vec2};

pub const MIN_ZOOM_PERCENT: u32 = 50;
pub const MAX_ZOOM_PERCENT: u32 = 200;
pub const ZOOM_STEP_PERCENT: u32 = 25;

/// The on-screen frame showing the document.
///
/// `container` is the unzoomed container size in CSS pixels (export sizes derive from it).
/// Pointer positions are given in frame coordinates; the container is drawn scaled by the zoom
/// factor and shifted by `pan`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    container: Size,
    zoom_percent: u32,
    pan: Vec2,
}

impl Viewport {
    pub fn new(container: Size) -> Self {
        Self {
            container,
            zoom_percent: 100,
            pan: Vec2::ZERO,
        }
    }

    pub fn container_size(&self) -> Size {
        self.container
    }

    pub fn set_container_size(&mut self, size: Size) {
        self.container = size;
    }

    /// Container size as currently drawn on screen.
    pub fn rendered_size(&self) -> Size {
        self.container * self.zoom_factor()
    }

    pub fn zoom_percent(&self) -> u32 {
        self.zoom_percent
    }

    pub fn zoom_factor(&self) -> f64 {
        f64::from(self.zoom_percent) / 100.0
    }

    /// Snap to the 25% grid within [50, 200].
    pub fn set_zoom_percent(&mut self, percent: u32) {
        let snapped = (percent + ZOOM_STEP_PERCENT / 2) / ZOOM_STEP_PERCENT * ZOOM_STEP_PERCENT;
        self.zoom_percent = snapped.clamp(MIN_ZOOM_PERCENT, MAX_ZOOM_PERCENT);
    }

    pub fn zoom_in(&mut self) -> u32 {
        self.set_zoom_percent(self.zoom_percent + ZOOM_STEP_PERCENT);
        self.zoom_percent
    }

    pub fn zoom_out(&mut self) -> u32 {
        self.set_zoom_percent(self.zoom_percent.saturating_sub(ZOOM_STEP_PERCENT));
        self.zoom_percent
    }

    pub fn can_zoom_in(&self) -> bool {
        self.zoom_percent < MAX_ZOOM_PERCENT
    }

    pub fn can_zoom_out(&self) -> bool {
        self.zoom_percent > MIN_ZOOM_PERCENT
    }

    pub fn pan(&self) -> Vec2 {
        self.pan
    }

    pub fn set_pan(&mut self, pan: Vec2) {
        self.pan = pan;
    }

    /// Map a frame point into rendered-container coordinates.
    pub fn to_container(&self, frame_point: Point) -> Point {
        frame_point - self.pan
    }
}

#[cfg(test)]
#[path = "../../tests/unit/interaction/viewport.rs"]
mod tests;
