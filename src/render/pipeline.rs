//! The single rasterization entry point shared by preview checks and export.
//!
//! Drawing order:
//! 1. template, contain-fitted into the output
//! 2. multiply tint masked by the template's alpha (skipped for white)
//! 3. optional fabric pattern
//! 4. visible layers in paint order
//!
//! Vector work (template placement, glyphs, images, pattern) goes through `vello_cpu`; the tint
//! pass runs on the premultiplied bytes directly.

use std::sync::Arc;

use vello_cpu::kurbo::Shape as _;

use crate::assets::source::{AssetSource, FontQuery, PreparedAsset};
use crate::assets::svg_raster::{rasterize_svg_to_premul_rgba8, svg_raster_size};
use crate::assets::text::TextEngine;
use crate::document::layer::{FontStyle, FontWeight, ImageStyle, Layer, LayerStyle, TextStyle};
use crate::document::model::Document;
use crate::effects::composite::{multiply_tint_in_place, over_in_place};
use crate::effects::pattern::{
    MAX_PATTERN_SHAPES, PATTERN_ALPHA, PatternShape, pattern_shape_count, pattern_shapes,
};
use crate::foundation::core::{Affine, Point, Rect, Rgba8Premul, Size, Vec2};
use crate::foundation::error::{StudioError, StudioResult};
use crate::render::fit::contain_rect;
use crate::render::raster::Raster;

/// Underline centre, below the anchor, as a fraction of the font size.
const UNDERLINE_OFFSET_EM: f64 = 0.35;
/// Strike-through centre, above the anchor, as a fraction of the font size.
const STRIKE_OFFSET_EM: f64 = 0.05;
const DECORATION_THICKNESS_EM: f64 = 0.06;
/// Horizontal shear used when an italic face is not available.
const SYNTHETIC_ITALIC_SKEW: f64 = -0.2;
/// Offset of the second pass used when a bold face is not available.
const SYNTHETIC_BOLD_OFFSET_EM: f64 = 0.03;

/// Options for [`render_with_opts`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOpts {
    pub(crate) clear_rgba: Option<[u8; 4]>,
}

impl RenderOpts {
    /// Return options with a straight-alpha background colour drawn beneath the garment.
    pub fn with_clear_rgba(mut self, clear: Option<[u8; 4]>) -> Self {
        self.clear_rgba = clear;
        self
    }
}

/// Render `doc` into a `width` x `height` raster with a transparent background.
///
/// `resolution_scale` converts CSS pixels (font sizes, image widths, pattern geometry) into
/// output pixels. Any asset that fails to load aborts the render with
/// [`StudioError::AssetLoad`].
pub fn render(
    doc: &Document,
    width: u32,
    height: u32,
    resolution_scale: f64,
    source: &dyn AssetSource,
) -> StudioResult<Raster> {
    render_with_opts(
        doc,
        width,
        height,
        resolution_scale,
        source,
        &RenderOpts::default(),
    )
}

/// [`render`] with explicit [`RenderOpts`].
#[tracing::instrument(
    skip(doc, source, opts),
    fields(template = %doc.template.id, layers = doc.layers().len())
)]
pub fn render_with_opts(
    doc: &Document,
    width: u32,
    height: u32,
    resolution_scale: f64,
    source: &dyn AssetSource,
    opts: &RenderOpts,
) -> StudioResult<Raster> {
    let (w16, h16) = output_dims(width, height)?;
    if !resolution_scale.is_finite() || resolution_scale <= 0.0 {
        return Err(StudioError::validation(
            "resolution scale must be finite and > 0",
        ));
    }
    let out_size = Size::new(f64::from(width), f64::from(height));
    let container = Size::new(
        out_size.width / resolution_scale,
        out_size.height / resolution_scale,
    );
    if let Some(pattern) = doc.customization.pattern {
        let shapes = pattern_shape_count(pattern, container);
        if shapes > MAX_PATTERN_SHAPES {
            return Err(StudioError::validation(format!(
                "resolution scale {resolution_scale} expands the {pattern:?} pattern to {shapes} shapes (max {MAX_PATTERN_SHAPES})"
            )));
        }
    }

    let template = source.load_image(&doc.template.asset)?;
    let (tw, th) = template.intrinsic_size();
    let fit = contain_rect(tw, th, out_size.width, out_size.height);

    let mut ctx = vello_cpu::RenderContext::new(w16, h16);
    let mut garment = vello_cpu::Pixmap::new(w16, h16);
    draw_asset(&mut ctx, &template, Affine::translate(fit.origin().to_vec2()), fit.size())?;
    ctx.flush();
    ctx.render_to_pixmap(&mut garment);

    let mut out = match opts.clear_rgba {
        Some(rgba) => premul_rgba8(rgba).repeat(usize::from(w16) * usize::from(h16)),
        None => vec![0u8; usize::from(w16) * usize::from(h16) * 4],
    };
    over_in_place(&mut out, garment.data_as_u8_slice(), 1.0)?;

    let tint = doc.customization.tint.render_tint();
    if !tint.is_white() {
        multiply_tint_in_place(&mut out, garment.data_as_u8_slice(), [tint.r, tint.g, tint.b])?;
    }

    ctx.reset();
    if let Some(pattern) = doc.customization.pattern {
        draw_pattern(
            &mut ctx,
            &pattern_shapes(pattern, container),
            resolution_scale,
        );
    }

    let mut text_engine = TextEngine::new();
    for layer in doc.layers().iter().filter(|l| l.visible) {
        let anchor = layer_anchor(layer, out_size);
        match &layer.style {
            LayerStyle::Text(style) => draw_text(
                &mut ctx,
                &mut text_engine,
                source,
                style,
                anchor,
                resolution_scale,
            )?,
            LayerStyle::Logo(style) | LayerStyle::Sticker(style) => {
                draw_image_layer(&mut ctx, source, style, anchor, resolution_scale)?
            }
        }
    }

    let mut overlay = vello_cpu::Pixmap::new(w16, h16);
    ctx.flush();
    ctx.render_to_pixmap(&mut overlay);
    over_in_place(&mut out, overlay.data_as_u8_slice(), 1.0)?;

    Raster::from_premul(width, height, out)
}

/// Anchor of `layer` in output pixels.
pub fn layer_anchor(layer: &Layer, out_size: Size) -> Point {
    Point::new(
        layer.position.x / 100.0 * out_size.width,
        layer.position.y / 100.0 * out_size.height,
    )
}

fn output_dims(width: u32, height: u32) -> StudioResult<(u16, u16)> {
    if width == 0 || height == 0 {
        return Err(StudioError::validation("output size must be non-zero"));
    }
    let w: u16 = width
        .try_into()
        .map_err(|_| StudioError::render("output width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| StudioError::render("output height exceeds u16"))?;
    Ok((w, h))
}

/// Draw `asset` stretched to `size`, with its top-left corner at `transform`'s origin.
fn draw_asset(
    ctx: &mut vello_cpu::RenderContext,
    asset: &PreparedAsset,
    transform: Affine,
    size: Size,
) -> StudioResult<()> {
    if !(size.width > 0.0 && size.height > 0.0) {
        return Ok(());
    }
    let (paint, pw, ph) = match asset {
        PreparedAsset::Raster(img) => {
            let paint = rgba_premul_to_image(&img.rgba8_premul, img.width, img.height)?;
            (paint, img.width, img.height)
        }
        PreparedAsset::Vector(svg) => {
            let (rw, rh) = svg_raster_size(size.width, size.height)?;
            let rgba = rasterize_svg_to_premul_rgba8(&svg.tree, rw, rh)?;
            (rgba_premul_to_image(&rgba, rw, rh)?, rw, rh)
        }
    };
    let (pw, ph) = (f64::from(pw), f64::from(ph));
    let tr = transform * Affine::scale_non_uniform(size.width / pw, size.height / ph);

    ctx.set_blend_mode(vello_cpu::peniko::BlendMode::default());
    ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
    ctx.set_transform(affine_to_cpu(tr));
    ctx.set_paint(paint);
    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, pw, ph));
    Ok(())
}

fn draw_pattern(ctx: &mut vello_cpu::RenderContext, shapes: &[PatternShape], scale: f64) {
    ctx.set_blend_mode(vello_cpu::peniko::BlendMode::default());
    ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
    ctx.set_transform(affine_to_cpu(Affine::scale(scale)));
    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(0, 0, 0, PATTERN_ALPHA));
    for shape in shapes {
        match *shape {
            PatternShape::Rect(r) => ctx.fill_rect(&rect_to_cpu(r)),
            PatternShape::Circle { center, radius } => {
                let circle = vello_cpu::kurbo::Circle::new((center.x, center.y), radius);
                let mut p = vello_cpu::kurbo::BezPath::new();
                for el in circle.path_elements(0.1) {
                    p.push(el);
                }
                ctx.fill_path(&p);
            }
        }
    }
}

fn draw_text(
    ctx: &mut vello_cpu::RenderContext,
    engine: &mut TextEngine,
    source: &dyn AssetSource,
    style: &TextStyle,
    anchor: Point,
    scale: f64,
) -> StudioResult<()> {
    if style.content.is_empty() {
        return Ok(());
    }
    let want_bold = style.font_weight == FontWeight::Bold;
    let want_italic = style.font_style == FontStyle::Italic;
    let face = source.load_font(&FontQuery {
        family: style.font_family.clone(),
        bold: want_bold,
        italic: want_italic,
    })?;

    let fs = style.font_size_px * scale;
    let line = engine.shape_line(
        &style.content,
        &face.bytes,
        fs as f32,
        (style.letter_spacing_px * scale) as f32,
    )?;

    let half_w = f64::from(line.width) / 2.0;
    // put the middle of the ascent/descent box on the anchor
    let baseline_y = f64::from(line.ascent - line.descent) / 2.0;

    let mut tr = Affine::translate(anchor.to_vec2()) * Affine::rotate(style.rotation_deg.to_radians());
    if want_italic && !face.italic {
        tr *= Affine::skew(SYNTHETIC_ITALIC_SKEW, 0.0);
    }

    let font = vello_cpu::peniko::FontData::new(
        vello_cpu::peniko::Blob::from(face.bytes.as_ref().clone()),
        0,
    );
    let c = style.color;

    ctx.set_blend_mode(vello_cpu::peniko::BlendMode::default());
    ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
    ctx.set_transform(affine_to_cpu(tr));
    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, 255));

    let passes: &[f64] = if want_bold && !face.bold {
        &[0.0, SYNTHETIC_BOLD_OFFSET_EM * fs]
    } else {
        &[0.0]
    };
    for dx in passes {
        let glyphs = line.glyphs.iter().map(|g| vello_cpu::Glyph {
            id: g.id,
            x: (f64::from(g.x) - half_w + dx) as f32,
            y: (f64::from(g.y) + baseline_y) as f32,
        });
        ctx.glyph_run(&font).font_size(line.font_size).fill_glyphs(glyphs);
    }

    let thickness = (fs * DECORATION_THICKNESS_EM).max(1.0);
    let mut decorations = Vec::new();
    if style.underline {
        decorations.push(UNDERLINE_OFFSET_EM * fs);
    }
    if style.strike {
        decorations.push(-STRIKE_OFFSET_EM * fs);
    }
    for y in decorations {
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            -half_w,
            y - thickness / 2.0,
            half_w,
            y + thickness / 2.0,
        ));
    }
    Ok(())
}

fn draw_image_layer(
    ctx: &mut vello_cpu::RenderContext,
    source: &dyn AssetSource,
    style: &ImageStyle,
    anchor: Point,
    scale: f64,
) -> StudioResult<()> {
    let asset = source.load_image(&style.content)?;
    let w = style.size_px * scale;
    let h = w * asset.aspect_ratio();
    let tr = Affine::translate(anchor.to_vec2())
        * Affine::rotate(style.rotation_deg.unwrap_or(0.0).to_radians())
        * Affine::translate(Vec2::new(-w / 2.0, -h / 2.0));
    draw_asset(ctx, &asset, tr, Size::new(w, h))
}

fn premul_rgba8(rgba: [u8; 4]) -> [u8; 4] {
    let [r, g, b, a] = rgba;
    Rgba8Premul::from_straight_rgba(r, g, b, a).to_array()
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn rect_to_cpu(r: Rect) -> vello_cpu::kurbo::Rect {
    vello_cpu::kurbo::Rect::new(r.x0, r.y0, r.x1, r.y1)
}

fn pixmap_from_premul_bytes(
    bytes: &[u8],
    width: u32,
    height: u32,
) -> StudioResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| StudioError::render("pixmap width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| StudioError::render("pixmap height exceeds u16"))?;
    if bytes.len()
        != (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4)
    {
        return Err(StudioError::render("pixmap byte len mismatch"));
    }
    let pixels = bytes
        .chunks_exact(4)
        .map(|px| vello_cpu::peniko::color::PremulRgba8::from_u8_array([px[0], px[1], px[2], px[3]]))
        .collect::<Vec<_>>();
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels, w, h, true,
    ))
}

fn rgba_premul_to_image(
    bytes_premul: &[u8],
    width: u32,
    height: u32,
) -> StudioResult<vello_cpu::Image> {
    let pixmap = pixmap_from_premul_bytes(bytes_premul, width, height)?;
    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/render/pipeline.rs"]
mod tests;
