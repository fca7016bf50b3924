use crate::document::layer::{
    LayerId, LayerKind, LayerPatch, LayerStyle, MIN_FONT_SIZE_PX, MIN_IMAGE_SIZE_PX, Position,
};
use crate::document::model::Document;
use crate::foundation::core::{Point, Vec2};
use crate::interaction::hit::{Corner, LayerExtents, hit_handle, hit_test};
use crate::interaction::viewport::Viewport;

/// Damping applied to resize deltas for text layers.
pub const TEXT_RESIZE_DAMPING: f64 = 0.6;

/// A pointer event in viewport frame coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerEvent {
    pub point: Point,
    pub shift: bool,
}

impl PointerEvent {
    pub fn at(x: f64, y: f64) -> Self {
        Self {
            point: Point::new(x, y),
            shift: false,
        }
    }

    pub fn with_shift(mut self, shift: bool) -> Self {
        self.shift = shift;
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    Delete,
    Backspace,
    Escape,
    Other,
}

impl Key {
    /// Map a DOM-style key name.
    pub fn from_name(name: &str) -> Self {
        match name {
            "Delete" => Key::Delete,
            "Backspace" => Key::Backspace,
            "Escape" | "Esc" => Key::Escape,
            _ => Key::Other,
        }
    }
}

/// What an input event did to the document.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GestureOutcome {
    /// Nothing in the document changed.
    Ignored,
    /// The document changed transiently; no history entry is due.
    Updated,
    /// A gesture or discrete edit finished and changed the document.
    Commit,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GestureState {
    Idle,
    Dragging {
        layer: LayerId,
        offset: Vec2,
        moved: bool,
    },
    Resizing {
        layer: LayerId,
        corner: Corner,
        start: Point,
        start_value: f64,
        moved: bool,
    },
    Panning {
        start: Point,
        start_pan: Vec2,
    },
}

/// Pointer and keyboard state machine over one document.
///
/// The host forwards pointer moves and releases from anywhere on screen only while
/// [`Controller::wants_global_pointer_events`] is true.
#[derive(Clone, Debug)]
pub struct Controller {
    state: GestureState,
    pan_mode: bool,
}

impl Default for Controller {
    fn default() -> Self {
        Self::new()
    }
}

impl Controller {
    pub fn new() -> Self {
        Self {
            state: GestureState::Idle,
            pan_mode: false,
        }
    }

    pub fn state(&self) -> GestureState {
        self.state
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, GestureState::Idle)
    }

    pub fn wants_global_pointer_events(&self) -> bool {
        !self.is_idle()
    }

    /// In pan mode every pointer-down pans the viewport.
    pub fn set_pan_mode(&mut self, on: bool) {
        self.pan_mode = on;
    }

    pub fn pan_mode(&self) -> bool {
        self.pan_mode
    }

    /// Drop any active gesture without committing.
    pub fn cancel(&mut self) {
        self.state = GestureState::Idle;
    }

    pub fn pointer_down(
        &mut self,
        doc: &mut Document,
        extents: &dyn LayerExtents,
        viewport: &Viewport,
        ev: PointerEvent,
    ) -> GestureOutcome {
        if self.pan_mode || ev.shift {
            self.state = GestureState::Panning {
                start: ev.point,
                start_pan: viewport.pan(),
            };
            tracing::debug!("pan start");
            return GestureOutcome::Ignored;
        }

        let p = viewport.to_container(ev.point);

        if let Some((id, corner)) = hit_handle(doc, extents, viewport, p) {
            let start_value = match doc.layer(id).map(|l| &l.style) {
                Some(LayerStyle::Text(s)) => s.font_size_px,
                Some(LayerStyle::Logo(s) | LayerStyle::Sticker(s)) => s.size_px,
                None => return GestureOutcome::Ignored,
            };
            self.state = GestureState::Resizing {
                layer: id,
                corner,
                start: p,
                start_value,
                moved: false,
            };
            tracing::debug!(layer = %id, ?corner, "resize start");
            return GestureOutcome::Ignored;
        }

        match hit_test(doc, extents, viewport, p) {
            Some(id) => {
                let selected = doc.select_layer(Some(id));
                let anchor = match doc.layer(id) {
                    Some(l) => anchor_px(l.position, viewport),
                    None => return GestureOutcome::Ignored,
                };
                self.state = GestureState::Dragging {
                    layer: id,
                    offset: p - anchor,
                    moved: false,
                };
                tracing::debug!(layer = %id, "drag start");
                outcome(selected)
            }
            None => outcome(doc.select_layer(None)),
        }
    }

    pub fn pointer_move(
        &mut self,
        doc: &mut Document,
        viewport: &mut Viewport,
        ev: PointerEvent,
    ) -> GestureOutcome {
        match &mut self.state {
            GestureState::Idle => GestureOutcome::Ignored,
            GestureState::Dragging {
                layer,
                offset,
                moved,
            } => {
                let rendered = viewport.rendered_size();
                if rendered.width <= 0.0 || rendered.height <= 0.0 {
                    return GestureOutcome::Ignored;
                }
                let target = viewport.to_container(ev.point) - *offset;
                let pos = Position::new(
                    target.x / rendered.width * 100.0,
                    target.y / rendered.height * 100.0,
                );
                let changed = doc.update_layer(*layer, &LayerPatch::position(pos));
                *moved |= changed;
                outcome(changed)
            }
            GestureState::Resizing {
                layer,
                corner,
                start,
                start_value,
                moved,
            } => {
                let zoom = viewport.zoom_factor();
                let d = (viewport.to_container(ev.point) - *start) / zoom;
                let dx = if corner.is_west() { -d.x } else { d.x };
                let dy = if corner.is_north() { -d.y } else { d.y };
                let delta = (dx + dy) / 2.0;

                let patch = match doc.layer(*layer).map(|l| l.kind()) {
                    Some(LayerKind::Text) => LayerPatch::font_size(
                        (*start_value + delta * TEXT_RESIZE_DAMPING).max(MIN_FONT_SIZE_PX),
                    ),
                    Some(_) => {
                        LayerPatch::image_size((*start_value + delta).max(MIN_IMAGE_SIZE_PX))
                    }
                    None => return GestureOutcome::Ignored,
                };
                let changed = doc.update_layer(*layer, &patch);
                *moved |= changed;
                outcome(changed)
            }
            GestureState::Panning { start, start_pan } => {
                viewport.set_pan(*start_pan + (ev.point - *start));
                GestureOutcome::Ignored
            }
        }
    }

    /// End the active gesture; commits only when it changed the document.
    pub fn pointer_up(&mut self) -> GestureOutcome {
        let ended = std::mem::replace(&mut self.state, GestureState::Idle);
        match ended {
            GestureState::Dragging { layer, moved, .. }
            | GestureState::Resizing { layer, moved, .. } => {
                tracing::debug!(layer = %layer, moved, "gesture end");
                if moved {
                    GestureOutcome::Commit
                } else {
                    GestureOutcome::Ignored
                }
            }
            GestureState::Panning { .. } | GestureState::Idle => GestureOutcome::Ignored,
        }
    }

    /// `text_input_focused` suppresses deletion while the user types into a field.
    pub fn key_down(
        &mut self,
        doc: &mut Document,
        key: Key,
        text_input_focused: bool,
    ) -> GestureOutcome {
        match key {
            Key::Delete | Key::Backspace => {
                if text_input_focused {
                    return GestureOutcome::Ignored;
                }
                let Some(id) = doc.selected() else {
                    return GestureOutcome::Ignored;
                };
                if doc.delete_layer(id) {
                    self.state = GestureState::Idle;
                    GestureOutcome::Commit
                } else {
                    GestureOutcome::Ignored
                }
            }
            Key::Escape => outcome(doc.select_layer(None)),
            Key::Other => GestureOutcome::Ignored,
        }
    }
}

fn anchor_px(position: Position, viewport: &Viewport) -> Point {
    let rendered = viewport.rendered_size();
    Point::new(
        position.x / 100.0 * rendered.width,
        position.y / 100.0 * rendered.height,
    )
}

fn outcome(changed: bool) -> GestureOutcome {
    if changed {
        GestureOutcome::Updated
    } else {
        GestureOutcome::Ignored
    }
}

#[cfg(test)]
#[path = "../../tests/unit/interaction/controller.rs"]
mod tests;
