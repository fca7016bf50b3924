use crate::document::model::Pattern;
use crate::foundation::core::{Point, Rect, Size};

/// Straight alpha of the black pattern ink (30%).
pub const PATTERN_ALPHA: u8 = 77;

/// Upper bound on the primitives one pattern overlay may expand to.
pub const MAX_PATTERN_SHAPES: u64 = 1 << 20;

/// One filled pattern primitive, in container units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PatternShape {
    Rect(Rect),
    Circle { center: Point, radius: f64 },
}

/// Shapes covering a `container`-sized area for `pattern`.
///
/// Stripes are 10 wide every 20. Dots have radius 5 on a 30 grid starting at (10, 10).
/// Checks are 40x40 squares where `col + row` is even.
pub fn pattern_shapes(pattern: Pattern, container: Size) -> Vec<PatternShape> {
    let (w, h) = (container.width, container.height);
    let mut out = Vec::new();
    if !(w > 0.0 && h > 0.0) {
        return out;
    }
    match pattern {
        Pattern::Stripe => {
            let mut x = 0.0;
            while x < w {
                out.push(PatternShape::Rect(Rect::new(x, 0.0, x + 10.0, h)));
                x += 20.0;
            }
        }
        Pattern::Dot => {
            let mut x = 10.0;
            while x < w {
                let mut y = 10.0;
                while y < h {
                    out.push(PatternShape::Circle {
                        center: Point::new(x, y),
                        radius: 5.0,
                    });
                    y += 30.0;
                }
                x += 30.0;
            }
        }
        Pattern::Check => {
            let mut col = 0u32;
            while f64::from(col) * 40.0 < w {
                let mut row = 0u32;
                while f64::from(row) * 40.0 < h {
                    if (col + row) % 2 == 0 {
                        let x = f64::from(col) * 40.0;
                        let y = f64::from(row) * 40.0;
                        out.push(PatternShape::Rect(Rect::new(x, y, x + 40.0, y + 40.0)));
                    }
                    row += 1;
                }
                col += 1;
            }
        }
    }
    out
}

/// Number of shapes [`pattern_shapes`] yields for `container`, computed without building them.
pub fn pattern_shape_count(pattern: Pattern, container: Size) -> u64 {
    let (w, h) = (container.width, container.height);
    if !(w > 0.0 && h > 0.0) {
        return 0;
    }
    match pattern {
        Pattern::Stripe => steps(w, 0.0, 20.0),
        Pattern::Dot => steps(w, 10.0, 30.0).saturating_mul(steps(h, 10.0, 30.0)),
        Pattern::Check => steps(w, 0.0, 40.0)
            .saturating_mul(steps(h, 0.0, 40.0))
            .div_ceil(2),
    }
}

fn steps(len: f64, start: f64, step: f64) -> u64 {
    if len <= start {
        0
    } else {
        ((len - start) / step).ceil() as u64
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/pattern.rs"]
mod tests;
