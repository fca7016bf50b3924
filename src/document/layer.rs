use std::fmt;

use serde::{Deserialize, Serialize};

use crate::assets::source::AssetRef;
use crate::foundation::color::Rgb8;
use crate::foundation::math::clamp_f64;

/// Smallest font size a text layer may have, in CSS pixels.
pub const MIN_FONT_SIZE_PX: f64 = 8.0;
/// Smallest width a logo or sticker may have, in CSS pixels.
pub const MIN_IMAGE_SIZE_PX: f64 = 20.0;
/// Text rotation is limited to `[-MAX_TEXT_ROTATION_DEG, MAX_TEXT_ROTATION_DEG]`.
pub const MAX_TEXT_ROTATION_DEG: f64 = 90.0;
/// Width given to newly added logos and stickers.
pub const DEFAULT_IMAGE_SIZE_PX: f64 = 100.0;
/// Font size given to newly added text layers.
pub const DEFAULT_FONT_SIZE_PX: f64 = 16.0;

/// Session-unique layer identifier. Never reused after deletion.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct LayerId(pub u32);

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "layer#{}", self.0)
    }
}

/// Anchor point in percent of the display container, each axis in `[0, 100]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Horizontal percent.
    pub x: f64,
    /// Vertical percent.
    pub y: f64,
}

impl Position {
    /// Build a position, clamping both axes into `[0, 100]`.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }.clamped()
    }

    /// Return a copy with both axes clamped into `[0, 100]`.
    pub fn clamped(self) -> Self {
        Self {
            x: clamp_f64(self.x, 0.0, 100.0),
            y: clamp_f64(self.y, 0.0, 100.0),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    #[default]
    Normal,
    Bold,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
}

/// Style of a text layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextStyle {
    pub content: String,
    pub color: Rgb8,
    pub font_size_px: f64,
    pub font_family: String,
    pub font_weight: FontWeight,
    pub font_style: FontStyle,
    pub underline: bool,
    pub strike: bool,
    pub letter_spacing_px: f64,
    pub rotation_deg: f64,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            content: "New text".to_owned(),
            color: Rgb8::BLACK,
            font_size_px: DEFAULT_FONT_SIZE_PX,
            font_family: "Arial".to_owned(),
            font_weight: FontWeight::Normal,
            font_style: FontStyle::Normal,
            underline: false,
            strike: false,
            letter_spacing_px: 0.0,
            rotation_deg: 0.0,
        }
    }
}

impl TextStyle {
    /// Default style with the given content.
    pub fn with_content(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }

    /// Apply the font floor and rotation range.
    pub fn normalized(mut self) -> Self {
        self.font_size_px = floor_size(self.font_size_px, MIN_FONT_SIZE_PX);
        self.rotation_deg = clamp_f64(
            self.rotation_deg,
            -MAX_TEXT_ROTATION_DEG,
            MAX_TEXT_ROTATION_DEG,
        );
        if !self.letter_spacing_px.is_finite() {
            self.letter_spacing_px = 0.0;
        }
        self
    }
}

/// Style shared by logo and sticker layers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ImageStyle {
    /// Uploaded data URI or library asset path.
    pub content: AssetRef,
    /// Drawn width in CSS pixels; height follows the image's aspect ratio.
    #[serde(default = "default_image_size")]
    pub size_px: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation_deg: Option<f64>,
}

fn default_image_size() -> f64 {
    DEFAULT_IMAGE_SIZE_PX
}

impl ImageStyle {
    /// Default-sized, unrotated style for `content`.
    pub fn new(content: AssetRef) -> Self {
        Self {
            content,
            size_px: DEFAULT_IMAGE_SIZE_PX,
            rotation_deg: None,
        }
    }

    /// Apply the size floor and drop non-finite rotations.
    pub fn normalized(mut self) -> Self {
        self.size_px = floor_size(self.size_px, MIN_IMAGE_SIZE_PX);
        self.rotation_deg = self.rotation_deg.filter(|r| r.is_finite());
        self
    }
}

fn floor_size(v: f64, min: f64) -> f64 {
    if v.is_finite() { v.max(min) } else { min }
}

/// Discriminant of [`LayerStyle`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LayerKind {
    Text,
    Logo,
    Sticker,
}

/// Variant-specific layer payload, tagged by `type` in JSON.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LayerStyle {
    Text(TextStyle),
    Logo(ImageStyle),
    Sticker(ImageStyle),
}

impl LayerStyle {
    pub fn kind(&self) -> LayerKind {
        match self {
            Self::Text(_) => LayerKind::Text,
            Self::Logo(_) => LayerKind::Logo,
            Self::Sticker(_) => LayerKind::Sticker,
        }
    }

    pub fn normalized(self) -> Self {
        match self {
            Self::Text(s) => Self::Text(s.normalized()),
            Self::Logo(s) => Self::Logo(s.normalized()),
            Self::Sticker(s) => Self::Sticker(s.normalized()),
        }
    }

    /// Image payload for logos and stickers.
    pub fn image(&self) -> Option<&ImageStyle> {
        match self {
            Self::Text(_) => None,
            Self::Logo(s) | Self::Sticker(s) => Some(s),
        }
    }

    /// Rotation in degrees, `0.0` when unset.
    pub fn rotation_deg(&self) -> f64 {
        match self {
            Self::Text(s) => s.rotation_deg,
            Self::Logo(s) | Self::Sticker(s) => s.rotation_deg.unwrap_or(0.0),
        }
    }
}

/// One addressable element placed over the garment.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    pub id: LayerId,
    pub position: Position,
    #[serde(default = "visible_default")]
    pub visible: bool,
    pub style: LayerStyle,
}

fn visible_default() -> bool {
    true
}

impl Layer {
    pub fn kind(&self) -> LayerKind {
        self.style.kind()
    }

    /// Apply `patch`, normalising the result. Returns `true` when anything changed.
    ///
    /// A style patch for a different variant is ignored.
    pub fn apply(&mut self, patch: &LayerPatch) -> bool {
        let before = self.clone();
        if let Some(p) = patch.position {
            self.position = p.clamped();
        }
        if let Some(v) = patch.visible {
            self.visible = v;
        }
        match (&mut self.style, &patch.style) {
            (_, None) => {}
            (LayerStyle::Text(s), Some(StylePatch::Text(p))) => {
                p.apply_to(s);
                *s = s.clone().normalized();
            }
            (LayerStyle::Logo(s) | LayerStyle::Sticker(s), Some(StylePatch::Image(p))) => {
                p.apply_to(s);
                *s = s.clone().normalized();
            }
            (style, Some(_)) => {
                tracing::debug!(layer = %self.id, kind = ?style.kind(), "ignoring style patch for other layer kind");
            }
        }
        *self != before
    }
}

/// Partial update of a [`TextStyle`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TextStylePatch {
    pub content: Option<String>,
    pub color: Option<Rgb8>,
    pub font_size_px: Option<f64>,
    pub font_family: Option<String>,
    pub font_weight: Option<FontWeight>,
    pub font_style: Option<FontStyle>,
    pub underline: Option<bool>,
    pub strike: Option<bool>,
    pub letter_spacing_px: Option<f64>,
    pub rotation_deg: Option<f64>,
}

impl TextStylePatch {
    fn apply_to(&self, s: &mut TextStyle) {
        if let Some(v) = &self.content {
            s.content.clone_from(v);
        }
        if let Some(v) = self.color {
            s.color = v;
        }
        if let Some(v) = self.font_size_px {
            s.font_size_px = v;
        }
        if let Some(v) = &self.font_family {
            s.font_family.clone_from(v);
        }
        if let Some(v) = self.font_weight {
            s.font_weight = v;
        }
        if let Some(v) = self.font_style {
            s.font_style = v;
        }
        if let Some(v) = self.underline {
            s.underline = v;
        }
        if let Some(v) = self.strike {
            s.strike = v;
        }
        if let Some(v) = self.letter_spacing_px {
            s.letter_spacing_px = v;
        }
        if let Some(v) = self.rotation_deg {
            s.rotation_deg = v;
        }
    }
}

/// Partial update of an [`ImageStyle`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ImageStylePatch {
    pub content: Option<AssetRef>,
    pub size_px: Option<f64>,
    /// `Some(None)` removes the rotation.
    pub rotation_deg: Option<Option<f64>>,
}

impl ImageStylePatch {
    fn apply_to(&self, s: &mut ImageStyle) {
        if let Some(v) = &self.content {
            s.content = v.clone();
        }
        if let Some(v) = self.size_px {
            s.size_px = v;
        }
        if let Some(v) = self.rotation_deg {
            s.rotation_deg = v;
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum StylePatch {
    Text(TextStylePatch),
    Image(ImageStylePatch),
}

/// Partial update of a [`Layer`]: position, visibility and/or style.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LayerPatch {
    pub position: Option<Position>,
    pub visible: Option<bool>,
    pub style: Option<StylePatch>,
}

impl LayerPatch {
    pub fn position(p: Position) -> Self {
        Self {
            position: Some(p),
            ..Self::default()
        }
    }

    pub fn visible(v: bool) -> Self {
        Self {
            visible: Some(v),
            ..Self::default()
        }
    }

    pub fn text(p: TextStylePatch) -> Self {
        Self {
            style: Some(StylePatch::Text(p)),
            ..Self::default()
        }
    }

    pub fn image(p: ImageStylePatch) -> Self {
        Self {
            style: Some(StylePatch::Image(p)),
            ..Self::default()
        }
    }

    pub fn font_size(px: f64) -> Self {
        Self::text(TextStylePatch {
            font_size_px: Some(px),
            ..TextStylePatch::default()
        })
    }

    pub fn image_size(px: f64) -> Self {
        Self::image(ImageStylePatch {
            size_px: Some(px),
            ..ImageStylePatch::default()
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/document/layer.rs"]
mod tests;
