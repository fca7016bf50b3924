use crate::foundation::error::{StudioError, StudioResult};
use crate::foundation::math::{add_sat_u8, mul_div255_u8 as mul_div255};

pub type PremulRgba8 = [u8; 4];

/// Source-over of premultiplied `src` onto `dst` at `opacity`.
pub fn over(dst: PremulRgba8, src: PremulRgba8, opacity: f32) -> PremulRgba8 {
    let opacity = opacity.clamp(0.0, 1.0);
    if opacity <= 0.0 || src[3] == 0 {
        return dst;
    }

    let op = ((opacity * 255.0).round() as i32).clamp(0, 255) as u16;
    let sa = mul_div255(u16::from(src[3]), op);
    if sa == 0 {
        return dst;
    }

    let inv = 255u16 - u16::from(sa);

    let mut out = [0u8; 4];
    out[3] = add_sat_u8(sa, mul_div255(u16::from(dst[3]), inv));

    for i in 0..3 {
        let sc = mul_div255(u16::from(src[i]), op);
        let dc = mul_div255(u16::from(dst[i]), inv);
        out[i] = add_sat_u8(sc, dc);
    }
    out
}

/// Multiply blend of premultiplied `src` onto `dst`, composited source-over.
///
/// `co = cs*cd + cs*(1 - ad) + cd*(1 - as)`, `ao = as + ad*(1 - as)`.
pub fn multiply(dst: PremulRgba8, src: PremulRgba8) -> PremulRgba8 {
    if src[3] == 0 {
        return dst;
    }
    let sa = u16::from(src[3]);
    let da = u16::from(dst[3]);
    let inv_sa = 255 - sa;
    let inv_da = 255 - da;

    let mut out = [0u8; 4];
    out[3] = add_sat_u8(src[3], mul_div255(da, inv_sa));
    for i in 0..3 {
        let s = u16::from(src[i]);
        let d = u16::from(dst[i]);
        let c = add_sat_u8(
            add_sat_u8(mul_div255(s, d), mul_div255(s, inv_da)),
            mul_div255(d, inv_sa),
        );
        out[i] = c.min(out[3]);
    }
    out
}

fn check_rgba_lens(dst: &[u8], other: &[u8], what: &str) -> StudioResult<()> {
    if dst.len() != other.len() || !dst.len().is_multiple_of(4) {
        return Err(StudioError::render(format!(
            "{what} expects equal-length rgba8 buffers"
        )));
    }
    Ok(())
}

pub fn over_in_place(dst: &mut [u8], src: &[u8], opacity: f32) -> StudioResult<()> {
    check_rgba_lens(dst, src, "over_in_place")?;
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let out = over([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]], opacity);
        d.copy_from_slice(&out);
    }
    Ok(())
}

/// Multiply a flat `tint` onto `dst`, masked by the alpha channel of `mask`.
///
/// Pixels where `mask` is transparent are left untouched, so only the garment is coloured.
pub fn multiply_tint_in_place(dst: &mut [u8], mask: &[u8], tint: [u8; 3]) -> StudioResult<()> {
    check_rgba_lens(dst, mask, "multiply_tint_in_place")?;
    for (d, m) in dst.chunks_exact_mut(4).zip(mask.chunks_exact(4)) {
        let a = m[3];
        if a == 0 {
            continue;
        }
        let a16 = u16::from(a);
        let src = [
            mul_div255(u16::from(tint[0]), a16),
            mul_div255(u16::from(tint[1]), a16),
            mul_div255(u16::from(tint[2]), a16),
            a,
        ];
        let out = multiply([d[0], d[1], d[2], d[3]], src);
        d.copy_from_slice(&out);
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/effects/composite.rs"]
mod tests;
