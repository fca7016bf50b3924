use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::assets::source::AssetRef;
use crate::document::layer::{
    ImageStyle, Layer, LayerId, LayerKind, LayerPatch, LayerStyle, Position, TextStyle,
};
use crate::foundation::color::Rgb8;
use crate::foundation::error::{StudioError, StudioResult};

/// Garment silhouette chosen from the catalog.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GarmentTemplate {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub category: String,
    pub asset: AssetRef,
}

impl GarmentTemplate {
    pub fn new(id: impl Into<String>, name: impl Into<String>, asset: AssetRef) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category: String::new(),
            asset,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }
}

/// Fabric pattern overlaid on the tinted garment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pattern {
    Stripe,
    Dot,
    Check,
}

/// Garment-level options.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Customization {
    /// Multiplicative tint; `#ffffff` leaves the garment untouched.
    pub tint: Rgb8,
    pub size: String,
    pub material: String,
    pub pattern: Option<Pattern>,
}

impl Default for Customization {
    fn default() -> Self {
        Self {
            tint: Rgb8::WHITE,
            size: "M".to_owned(),
            material: "cotton".to_owned(),
            pattern: None,
        }
    }
}

/// Partial update of [`Customization`]. `pattern: Some(None)` clears the pattern.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CustomizationPatch {
    pub tint: Option<Rgb8>,
    pub size: Option<String>,
    pub material: Option<String>,
    pub pattern: Option<Option<Pattern>>,
}

impl CustomizationPatch {
    pub fn tint(c: Rgb8) -> Self {
        Self {
            tint: Some(c),
            ..Self::default()
        }
    }

    pub fn pattern(p: Option<Pattern>) -> Self {
        Self {
            pattern: Some(p),
            ..Self::default()
        }
    }
}

/// Paint-order step used by [`Document::move_layer`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayerDirection {
    /// Toward the top of the paint order (later in the sequence).
    Up,
    /// Toward the bottom of the paint order.
    Down,
}

/// Complete state of one customization session.
///
/// Layer order is paint order: later layers are drawn on top.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub template: GarmentTemplate,
    #[serde(default)]
    pub customization: Customization,
    #[serde(default)]
    layers: Vec<Layer>,
    #[serde(default)]
    selected: Option<LayerId>,
    #[serde(default)]
    next_layer_id: u32,
}

impl Document {
    /// Fresh document for `template` with default customization and no layers.
    pub fn new(template: GarmentTemplate) -> Self {
        Self {
            template,
            customization: Customization::default(),
            layers: Vec::new(),
            selected: None,
            next_layer_id: 1,
        }
    }

    /// Fresh document for `template` whose layer ids continue after the ids `self` handed out.
    pub fn fresh_on(&self, template: GarmentTemplate) -> Self {
        Self {
            next_layer_id: self.next_layer_id,
            ..Self::new(template)
        }
    }

    /// Parse a JSON document, normalising styles and positions.
    ///
    /// Duplicate layer ids are rejected.
    pub fn from_json_str(s: &str) -> StudioResult<Self> {
        let doc: Self = serde_json::from_str(s).map_err(|e| StudioError::serde(e.to_string()))?;
        doc.validated()
    }

    pub fn to_json_string_pretty(&self) -> StudioResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| StudioError::serde(e.to_string()))
    }

    fn validated(mut self) -> StudioResult<Self> {
        let mut seen = HashSet::new();
        for layer in &mut self.layers {
            if !seen.insert(layer.id) {
                return Err(StudioError::validation(format!(
                    "duplicate layer id {}",
                    layer.id.0
                )));
            }
            layer.position = layer.position.clamped();
            layer.style = layer.style.clone().normalized();
        }
        let max_id = self.layers.iter().map(|l| l.id.0).max().unwrap_or(0);
        self.next_layer_id = self.next_layer_id.max(max_id.saturating_add(1)).max(1);
        if self.selected.is_some_and(|id| self.layer(id).is_none()) {
            self.selected = None;
        }
        Ok(self)
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layer(&self, id: LayerId) -> Option<&Layer> {
        self.layers.iter().find(|l| l.id == id)
    }

    pub fn index_of(&self, id: LayerId) -> Option<usize> {
        self.layers.iter().position(|l| l.id == id)
    }

    pub fn selected(&self) -> Option<LayerId> {
        self.selected
    }

    pub fn selected_layer(&self) -> Option<&Layer> {
        self.selected.and_then(|id| self.layer(id))
    }

    /// Append a layer at its default placement and select it.
    ///
    /// Text goes to `(50, 30 + 10n)`, logos and stickers to `(50, 70 + 10n)`, where `n` is the
    /// current layer count.
    pub fn add_layer(&mut self, style: LayerStyle) -> LayerId {
        let n = self.layers.len() as f64;
        let y = match style.kind() {
            LayerKind::Text => 30.0 + n * 10.0,
            LayerKind::Logo | LayerKind::Sticker => 70.0 + n * 10.0,
        };
        self.add_layer_at(style, Position::new(50.0, y))
    }

    /// Append a layer at `position` and select it.
    pub fn add_layer_at(&mut self, style: LayerStyle, position: Position) -> LayerId {
        let id = LayerId(self.next_layer_id);
        self.next_layer_id = self.next_layer_id.saturating_add(1);
        self.layers.push(Layer {
            id,
            position: position.clamped(),
            visible: true,
            style: style.normalized(),
        });
        self.selected = Some(id);
        tracing::debug!(layer = %id, "layer added");
        id
    }

    pub fn add_text(&mut self, style: TextStyle) -> LayerId {
        self.add_layer(LayerStyle::Text(style))
    }

    pub fn add_logo(&mut self, content: AssetRef) -> LayerId {
        self.add_layer(LayerStyle::Logo(ImageStyle::new(content)))
    }

    pub fn add_sticker(&mut self, content: AssetRef) -> LayerId {
        self.add_layer(LayerStyle::Sticker(ImageStyle::new(content)))
    }

    /// Apply `patch` to layer `id`. Unknown ids are a no-op; returns whether anything changed.
    pub fn update_layer(&mut self, id: LayerId, patch: &LayerPatch) -> bool {
        let Some(layer) = self.layers.iter_mut().find(|l| l.id == id) else {
            return false;
        };
        layer.apply(patch)
    }

    /// Remove layer `id`, clearing the selection if it pointed at it.
    pub fn delete_layer(&mut self, id: LayerId) -> bool {
        let Some(idx) = self.index_of(id) else {
            return false;
        };
        self.layers.remove(idx);
        if self.selected == Some(id) {
            self.selected = None;
        }
        tracing::debug!(layer = %id, "layer deleted");
        true
    }

    /// Swap layer `id` with its neighbour in paint order. No-op at either end.
    pub fn move_layer(&mut self, id: LayerId, direction: LayerDirection) -> bool {
        let Some(idx) = self.index_of(id) else {
            return false;
        };
        let target = match direction {
            LayerDirection::Up => idx + 1,
            LayerDirection::Down => match idx.checked_sub(1) {
                Some(t) => t,
                None => return false,
            },
        };
        if target >= self.layers.len() {
            return false;
        }
        self.layers.swap(idx, target);
        true
    }

    /// Merge `patch` into the customization. Returns whether anything changed.
    pub fn set_customization(&mut self, patch: &CustomizationPatch) -> bool {
        let before = self.customization.clone();
        let c = &mut self.customization;
        if let Some(v) = patch.tint {
            c.tint = v;
        }
        if let Some(v) = &patch.size {
            c.size.clone_from(v);
        }
        if let Some(v) = &patch.material {
            c.material.clone_from(v);
        }
        if let Some(v) = patch.pattern {
            c.pattern = v;
        }
        self.customization != before
    }

    /// Select `id`, or clear with `None`. Unknown ids leave the selection unchanged.
    pub fn select_layer(&mut self, id: Option<LayerId>) -> bool {
        match id {
            None => self.selected.take().is_some(),
            Some(id) if self.layer(id).is_some() => self.selected.replace(id) != Some(id),
            Some(_) => false,
        }
    }

    /// Drop all layers and restore default customization, keeping the template.
    pub fn reset(&mut self) {
        self.customization = Customization::default();
        self.layers.clear();
        self.selected = None;
    }

    /// Replace customization and layers with those of `snapshot`.
    ///
    /// The id counter only moves forward, so ids of layers removed by an undo are not handed
    /// out again. The selection survives when its layer still exists.
    pub fn restore_from(&mut self, snapshot: &Document) {
        self.template = snapshot.template.clone();
        self.customization = snapshot.customization.clone();
        self.layers = snapshot.layers.clone();
        self.next_layer_id = self.next_layer_id.max(snapshot.next_layer_id);
        if self.selected.is_some_and(|id| self.layer(id).is_none()) {
            self.selected = None;
        }
    }

    /// Whether `other` has the same template, customization and layers, ignoring selection.
    pub fn content_eq(&self, other: &Document) -> bool {
        self.template == other.template
            && self.customization == other.customization
            && self.layers == other.layers
    }
}

#[cfg(test)]
#[path = "../../tests/unit/document/model.rs"]
mod tests;
