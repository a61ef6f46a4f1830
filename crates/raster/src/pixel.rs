//! Pure-computation RGBA pixel buffer with anti-aliased squares and lines.
//!
//! This module is always available (no feature gate) so that both the `png`
//! snapshot path and any in-memory consumer share the same rasterization.
//! Pixels are stored premultiplied in `f32` and composited source-over; they
//! are only quantized to 8 bits on export.

use canvas_nest_core::color::{clamp_alpha, ColorChannels};
use canvas_nest_core::DVec2;

/// A `width x height` RGBA buffer, initially fully transparent.
#[derive(Debug, Clone, PartialEq)]
pub struct Pixmap {
    width: usize,
    height: usize,
    data: Vec<[f32; 4]>,
}

impl Pixmap {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![[0.0; 4]; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Resets every pixel to transparent.
    pub fn clear(&mut self) {
        self.data.fill([0.0; 4]);
    }

    /// Straight-alpha RGBA8 value of one pixel.
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` is outside the buffer.
    pub fn pixel(&self, x: usize, y: usize) -> [u8; 4] {
        unpremultiply(self.data[y * self.width + x])
    }

    /// Composites `color` at `alpha * coverage` over one pixel.
    fn blend(&mut self, x: usize, y: usize, color: ColorChannels, alpha: f32) {
        if alpha <= 0.0 {
            return;
        }
        let a = alpha.min(1.0);
        let src = [
            f32::from(color.r) / 255.0 * a,
            f32::from(color.g) / 255.0 * a,
            f32::from(color.b) / 255.0 * a,
            a,
        ];
        let dst = &mut self.data[y * self.width + x];
        for (d, s) in dst.iter_mut().zip(src) {
            *d = s + *d * (1.0 - a);
        }
    }

    /// Fills the axis-aligned rectangle `[min, max)`, weighting edge pixels
    /// by their covered area.
    pub fn fill_rect(&mut self, min: DVec2, max: DVec2, color: ColorChannels, alpha: f64) {
        let alpha = clamp_alpha(alpha);
        let empty = min.x.is_nan() || min.y.is_nan() || min.x >= max.x || min.y >= max.y;
        if alpha == 0.0 || empty {
            return;
        }
        let (x0, x1) = pixel_span(min.x, max.x, self.width);
        let (y0, y1) = pixel_span(min.y, max.y, self.height);
        for y in y0..y1 {
            let cover_y = overlap(min.y, max.y, y as f64);
            for x in x0..x1 {
                let cover = overlap(min.x, max.x, x as f64) * cover_y;
                self.blend(x, y, color, (alpha * cover) as f32);
            }
        }
    }

    /// Strokes the segment `from..to` with round ends.
    ///
    /// Coverage falls off linearly over the outermost half pixel, and
    /// sub-pixel widths are drawn as proportionally fainter hairlines.
    pub fn stroke_segment(
        &mut self,
        from: DVec2,
        to: DVec2,
        width: f64,
        color: ColorChannels,
        alpha: f64,
    ) {
        let alpha = clamp_alpha(alpha);
        if alpha == 0.0 || width.is_nan() || width <= 0.0 || !from.is_finite() || !to.is_finite() {
            return;
        }
        let reach = width / 2.0 + 0.5;
        let (x0, x1) = pixel_span(from.x.min(to.x) - reach, from.x.max(to.x) + reach, self.width);
        let (y0, y1) = pixel_span(from.y.min(to.y) - reach, from.y.max(to.y) + reach, self.height);
        for y in y0..y1 {
            for x in x0..x1 {
                let center = DVec2::new(x as f64 + 0.5, y as f64 + 0.5);
                let d = distance_to_segment(center, from, to);
                let cover = (reach - d).clamp(0.0, 1.0).min(width);
                if cover > 0.0 {
                    self.blend(x, y, color, (alpha * cover) as f32);
                }
            }
        }
    }

    /// Exports straight-alpha RGBA8 bytes, row-major.
    ///
    /// The whole buffer is first scaled by `opacity`; with a `background`
    /// the result is composited onto that opaque color, otherwise it keeps
    /// its transparency.
    pub fn flatten(&self, background: Option<ColorChannels>, opacity: f64) -> Vec<u8> {
        let opacity = clamp_alpha(opacity) as f32;
        self.data
            .iter()
            .flat_map(|px| {
                let mut px = px.map(|c| c * opacity);
                if let Some(bg) = background {
                    let rest = 1.0 - px[3];
                    px[0] += f32::from(bg.r) / 255.0 * rest;
                    px[1] += f32::from(bg.g) / 255.0 * rest;
                    px[2] += f32::from(bg.b) / 255.0 * rest;
                    px[3] = 1.0;
                }
                unpremultiply(px)
            })
            .collect()
    }
}

fn unpremultiply(px: [f32; 4]) -> [u8; 4] {
    let a = px[3].clamp(0.0, 1.0);
    if a <= 0.0 {
        return [0, 0, 0, 0];
    }
    let channel = |c: f32| ((c / a).clamp(0.0, 1.0) * 255.0).round() as u8;
    [
        channel(px[0]),
        channel(px[1]),
        channel(px[2]),
        (a * 255.0).round() as u8,
    ]
}

/// Index range of the pixels touched by `[lo, hi)`, clamped to `0..len`.
fn pixel_span(lo: f64, hi: f64, len: usize) -> (usize, usize) {
    let start = lo.floor().max(0.0).min(len as f64) as usize;
    let end = hi.ceil().max(0.0).min(len as f64) as usize;
    (start, end.max(start))
}

/// Length of `[lo, hi)` inside the unit pixel starting at `p`.
fn overlap(lo: f64, hi: f64, p: f64) -> f64 {
    (hi.min(p + 1.0) - lo.max(p)).max(0.0)
}

fn distance_to_segment(p: DVec2, a: DVec2, b: DVec2) -> f64 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq == 0.0 {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}
