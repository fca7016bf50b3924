use std::borrow::Cow;

use crate::foundation::error::{StudioError, StudioResult};

/// Parley brush placeholder; colour is applied when glyphs are drawn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct TextBrush;

/// One positioned glyph. `x` runs from the start of the line, `y` is relative to the baseline.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct ShapedGlyph {
    pub(crate) id: u32,
    pub(crate) x: f32,
    pub(crate) y: f32,
}

/// Single shaped line with letter spacing applied per glyph.
#[derive(Clone, Debug)]
pub(crate) struct ShapedLine {
    pub(crate) glyphs: Vec<ShapedGlyph>,
    pub(crate) width: f32,
    pub(crate) ascent: f32,
    pub(crate) descent: f32,
    pub(crate) font_size: f32,
}

/// Stateful helper for shaping single-line text from raw font bytes.
pub(crate) struct TextEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrush>,
}

impl Default for TextEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TextEngine {
    pub(crate) fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
        }
    }

    /// Shape `text` on one line at `size_px`, adding `letter_spacing_px` after every glyph but
    /// the last.
    pub(crate) fn shape_line(
        &mut self,
        text: &str,
        font_bytes: &[u8],
        size_px: f32,
        letter_spacing_px: f32,
    ) -> StudioResult<ShapedLine> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(StudioError::validation(
                "text size_px must be finite and > 0",
            ));
        }
        let text: Cow<'_, str> = if text.contains(['\n', '\r']) {
            Cow::Owned(text.replace(['\n', '\r'], " "))
        } else {
            Cow::Borrowed(text)
        };

        let families = self
            .font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font_bytes.to_vec()), None);
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            StudioError::validation("no font families registered from font bytes")
        })?;

        let family_name = self
            .font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| StudioError::validation("registered font family has no name"))?
            .to_string();

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, &text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(Cow::Owned(family_name)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(TextBrush));

        let mut layout: parley::Layout<TextBrush> = builder.build(&text);
        layout.break_all_lines(None);

        let mut glyphs = Vec::new();
        let mut ascent = size_px * 0.8;
        let mut descent = size_px * 0.2;
        if let Some(line) = layout.lines().next() {
            let m = line.metrics();
            ascent = m.ascent;
            descent = m.descent;
            let baseline = m.baseline;
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                for g in run.positioned_glyphs() {
                    let i = glyphs.len() as f32;
                    glyphs.push(ShapedGlyph {
                        id: g.id,
                        x: g.x + i * letter_spacing_px,
                        y: g.y - baseline,
                    });
                }
            }
        }

        let spacing_total = letter_spacing_px * (glyphs.len().saturating_sub(1)) as f32;
        Ok(ShapedLine {
            width: (layout.width() + spacing_total).max(0.0),
            glyphs,
            ascent,
            descent,
            font_size: size_px,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/text.rs"]
mod tests;
