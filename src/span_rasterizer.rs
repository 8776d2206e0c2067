//! Half-space triangle rasterizer.
//!
//! Vertices are rounded to an 8-bit sub-pixel grid and every pixel whose
//! centre lies inside the three edge functions is handed to a
//! [`SpanShader`], one horizontal run at a time. Pixels lying exactly on an
//! edge follow the top-left rule, so triangles sharing an edge partition it:
//! each pixel of a mesh is shaded exactly once.
//!
//! The shader receives the (unnormalized) barycentric weights of the first
//! pixel of the run, their per-pixel increment and the doubled triangle
//! area in sub-pixel units. The weights are the edge functions themselves,
//! so they are exact integers that always sum to `area`.

use crate::basics::PointF;
use crate::canvas::{Canvas, ImageRef};
use crate::color::{Color, Rgb32};

const SUBPIXEL_SHIFT: u32 = 8;
const SUBPIXEL_SCALE: i64 = 1 << SUBPIXEL_SHIFT;
const SUBPIXEL_HALF: i64 = SUBPIXEL_SCALE / 2;

/// Triangles with a vertex farther than this (in pixels) are dropped; the
/// edge functions would no longer fit in 64 bits.
const COORD_LIMIT: f32 = (1 << 20) as f32;

// ============================================================================
// Shaders
// ============================================================================

/// Colors the runs of pixels produced by
/// [`Canvas::rasterize_triangle`].
pub trait SpanShader<C> {
    /// Shade `span`, the pixels `x..x + span.len()` of row `y`.
    ///
    /// `w` holds the weights of the three vertices at the first pixel and
    /// `dw` what is added to them for every step to the right. Weights are
    /// non-negative and sum to `area`.
    fn shade_span(&mut self, span: &mut [C], x: i32, y: i32, w: [i64; 3], dw: [i64; 3], area: i64);
}

#[inline]
fn step(w: &mut [i64; 3], dw: &[i64; 3]) {
    w[0] += dw[0];
    w[1] += dw[1];
    w[2] += dw[2];
}

/// Composite the premultiplied color `c` over `dst`, blending in the
/// destination encoding.
#[inline]
fn composite<C: Color>(dst: &mut C, c: Rgb32, op: i32) {
    if op < 0 {
        *dst = C::from(c);
        return;
    }
    if c.a == 0 {
        return;
    }
    if C::HAS_ALPHA || c.a == 255 {
        dst.blend256(C::from(c), op as u32);
        return;
    }
    // no alpha channel: straight color weighted by its coverage
    let a = c.a as u32;
    let straight = |v: u8| ((v as u32 * 255 + a / 2) / a).min(255) as u8;
    let s = Rgb32::opaque(straight(c.r), straight(c.g), straight(c.b));
    dst.blend256(C::from(s), (op as u32 * (a + (a > 127) as u32)) >> 8);
}

/// Barycentric interpolation of three vertex colors.
#[derive(Debug, Clone, Copy)]
pub struct GradientShader {
    colors: [Rgb32; 3],
    op: i32,
}

impl GradientShader {
    /// `op` is a fixed-point operator as returned by
    /// [`Opacity::op256`](crate::color::Opacity::op256).
    pub fn new(colors: [Rgb32; 3], op: i32) -> Self {
        Self { colors, op }
    }
}

impl<C: Color> SpanShader<C> for GradientShader {
    fn shade_span(&mut self, span: &mut [C], _x: i32, _y: i32, mut w: [i64; 3], dw: [i64; 3], area: i64) {
        let [c0, c1, c2] = self.colors;
        for d in span.iter_mut() {
            composite(d, Rgb32::interpolate3(c0, w[0], c1, w[1], c2, w[2], area), self.op);
            step(&mut w, &dw);
        }
    }
}

// ----------------------------------------------------------------------------
// Texture sampling
// ----------------------------------------------------------------------------

/// Texel indices and 8-bit weight of the second one for the sampler
/// coordinate `t` along an axis of `size` texels. Texel `i` is centred at
/// `i + 0.5`; indices are clamped to the texture.
#[inline]
pub(crate) fn texel_axis(t: f64, size: i32) -> (i32, i32, u32) {
    let f = ((t - 0.5) * 256.0).round().clamp(-1.0e12, 1.0e12) as i64;
    let i = (f >> 8).clamp(-1, size as i64) as i32;
    let max = size - 1;
    (i.clamp(0, max), (i + 1).clamp(0, max), (f & 255) as u32)
}

/// Bilinear fetch at the sampler coordinate `(u, v)`.
#[inline]
pub(crate) fn sample_bilinear<S: Color>(tex: &ImageRef<'_, S>, u: f64, v: f64) -> S {
    let (x0, x1, ax) = texel_axis(u, tex.width());
    let (y0, y1, ay) = texel_axis(v, tex.height());
    S::interpolate_bilinear(
        tex.pixel::<false>(x0, y0),
        tex.pixel::<false>(x1, y0),
        tex.pixel::<false>(x0, y1),
        tex.pixel::<false>(x1, y1),
        ax,
        ay,
    )
}

/// Bilinear fetch in 32-bit space where texels equal to `transparent`
/// count as fully transparent.
#[inline]
pub(crate) fn sample_bilinear_masked<S: Color>(
    tex: &ImageRef<'_, S>,
    u: f64,
    v: f64,
    transparent: Option<S>,
) -> Rgb32 {
    let (x0, x1, ax) = texel_axis(u, tex.width());
    let (y0, y1, ay) = texel_axis(v, tex.height());
    let fetch = |x: i32, y: i32| -> Rgb32 {
        let c = tex.pixel::<false>(x, y);
        if Some(c) == transparent {
            Rgb32::TRANSPARENT
        } else {
            c.into()
        }
    };
    Rgb32::interpolate_bilinear(fetch(x0, y0), fetch(x1, y0), fetch(x0, y1), fetch(x1, y1), ax, ay)
}

/// Texture coordinates (in texels) at the point with weights `w`.
#[inline]
fn uv_at(uv: &[PointF; 3], w: &[i64; 3], inv_area: f64) -> (f64, f64) {
    let (w0, w1, w2) = (w[0] as f64, w[1] as f64, w[2] as f64);
    (
        (w0 * uv[0].x as f64 + w1 * uv[1].x as f64 + w2 * uv[2].x as f64) * inv_area,
        (w0 * uv[0].y as f64 + w1 * uv[1].y as f64 + w2 * uv[2].y as f64) * inv_area,
    )
}

/// Maps a texture onto the triangle and hands every sampled texel to a
/// write function `write(dst, texel)`.
pub struct TextureShader<'a, S, F> {
    tex: ImageRef<'a, S>,
    uv: [PointF; 3],
    write: F,
}

impl<'a, S: Color, F> TextureShader<'a, S, F> {
    /// `uv` are the texel coordinates of the three vertices.
    pub fn new(tex: ImageRef<'a, S>, uv: [PointF; 3], write: F) -> Self {
        Self { tex, uv, write }
    }
}

impl<'a, C: Color, S: Color, F: FnMut(&mut C, S)> SpanShader<C> for TextureShader<'a, S, F> {
    fn shade_span(&mut self, span: &mut [C], _x: i32, _y: i32, mut w: [i64; 3], dw: [i64; 3], area: i64) {
        let inv_area = 1.0 / area as f64;
        for d in span.iter_mut() {
            let (u, v) = uv_at(&self.uv, &w, inv_area);
            (self.write)(d, sample_bilinear(&self.tex, u, v));
            step(&mut w, &dw);
        }
    }
}

/// Texture mapping in 32-bit space with an optional transparent key color
/// and an optional per-vertex tint that multiplies the texels.
pub struct MaskedTextureShader<'a, S> {
    tex: ImageRef<'a, S>,
    uv: [PointF; 3],
    transparent: Option<S>,
    tint: Option<[Rgb32; 3]>,
    op: i32,
}

impl<'a, S: Color> MaskedTextureShader<'a, S> {
    pub fn new(
        tex: ImageRef<'a, S>,
        uv: [PointF; 3],
        transparent: Option<S>,
        tint: Option<[Rgb32; 3]>,
        op: i32,
    ) -> Self {
        Self { tex, uv, transparent, tint, op }
    }
}

#[inline]
fn to256(v: u8) -> u32 {
    (v as u32 * 256 + 127) / 255
}

impl<'a, C: Color, S: Color> SpanShader<C> for MaskedTextureShader<'a, S> {
    fn shade_span(&mut self, span: &mut [C], _x: i32, _y: i32, mut w: [i64; 3], dw: [i64; 3], area: i64) {
        let inv_area = 1.0 / area as f64;
        for d in span.iter_mut() {
            let (u, v) = uv_at(&self.uv, &w, inv_area);
            let mut c = sample_bilinear_masked(&self.tex, u, v, self.transparent);
            if let Some([t0, t1, t2]) = self.tint {
                let t = Rgb32::interpolate3(t0, w[0], t1, w[1], t2, w[2], area);
                c.mult256(to256(t.r), to256(t.g), to256(t.b), to256(t.a));
            }
            composite(d, c, self.op);
            step(&mut w, &dw);
        }
    }
}

// ============================================================================
// Rasterizer
// ============================================================================

/// Edge function `xc * (x - ox) + yc * (y - oy)`, positive inside.
#[derive(Debug, Clone, Copy)]
struct Edge {
    xc: i64,
    yc: i64,
    ox: i64,
    oy: i64,
    /// `-1` on edges that do not own the pixels lying exactly on them.
    bias: i64,
}

impl Edge {
    fn new(a: (i64, i64), b: (i64, i64)) -> Self {
        let xc = a.1 - b.1;
        let yc = b.0 - a.0;
        let top_left = xc > 0 || (xc == 0 && yc > 0);
        Self {
            xc,
            yc,
            ox: a.0,
            oy: a.1,
            bias: if top_left { 0 } else { -1 },
        }
    }

    #[inline]
    fn at(&self, x: i64, y: i64) -> i64 {
        self.xc * (x - self.ox) + self.yc * (y - self.oy)
    }
}

#[inline]
fn snap(p: PointF) -> (i64, i64) {
    (
        (p.x * SUBPIXEL_SCALE as f32).round() as i64,
        (p.y * SUBPIXEL_SCALE as f32).round() as i64,
    )
}

impl<'a, C: Color> Canvas<'a, C> {
    /// Rasterize the triangle `tri` (pixel coordinates, any winding) and
    /// shade every covered pixel. Flat triangles and triangles with
    /// non-finite or very distant vertices draw nothing.
    pub fn rasterize_triangle<S: SpanShader<C> + ?Sized>(&mut self, tri: [PointF; 3], shader: &mut S) {
        if !self.is_valid() {
            return;
        }
        if tri.iter().any(|p| !(p.x.abs() <= COORD_LIMIT && p.y.abs() <= COORD_LIMIT)) {
            log::debug!("rasterize_triangle: vertex out of range {:?}", tri);
            return;
        }
        let mut p = [snap(tri[0]), snap(tri[1]), snap(tri[2])];
        let mut area = (p[1].0 - p[0].0) * (p[2].1 - p[0].1) - (p[1].1 - p[0].1) * (p[2].0 - p[0].0);
        if area == 0 {
            return;
        }
        // Vertex order used internally, as indices into `tri`.
        let mut order = [0usize, 1, 2];
        if area < 0 {
            p.swap(1, 2);
            order.swap(1, 2);
            area = -area;
        }

        // Edge `i` is opposite vertex `i`: its value is the weight of `i`.
        let edges = [Edge::new(p[1], p[2]), Edge::new(p[2], p[0]), Edge::new(p[0], p[1])];

        let min_x = p[0].0.min(p[1].0).min(p[2].0);
        let max_x = p[0].0.max(p[1].0).max(p[2].0);
        let min_y = p[0].1.min(p[1].1).min(p[2].1);
        let max_y = p[0].1.max(p[1].1).max(p[2].1);
        let to_pixel_lo = |v: i64| (v - SUBPIXEL_HALF + SUBPIXEL_SCALE - 1).div_euclid(SUBPIXEL_SCALE);
        let to_pixel_hi = |v: i64| (v - SUBPIXEL_HALF).div_euclid(SUBPIXEL_SCALE);
        let x_lo = to_pixel_lo(min_x).max(0);
        let x_hi = to_pixel_hi(max_x).min(self.width() as i64 - 1);
        let y_lo = to_pixel_lo(min_y).max(0);
        let y_hi = to_pixel_hi(max_y).min(self.height() as i64 - 1);
        if x_lo > x_hi || y_lo > y_hi {
            return;
        }

        let mut dw = [0i64; 3];
        for i in 0..3 {
            dw[order[i]] = edges[i].xc * SUBPIXEL_SCALE;
        }
        let px = x_lo * SUBPIXEL_SCALE + SUBPIXEL_HALF;
        for y in y_lo..=y_hi {
            let py = y * SUBPIXEL_SCALE + SUBPIXEL_HALF;
            let mut k_lo = 0i64;
            let mut k_hi = x_hi - x_lo;
            let mut e = [0i64; 3];
            for (i, edge) in edges.iter().enumerate() {
                e[i] = edge.at(px, py);
                let v = e[i] + edge.bias;
                let s = edge.xc * SUBPIXEL_SCALE;
                if s > 0 {
                    if v < 0 {
                        k_lo = k_lo.max((-v + s - 1) / s);
                    }
                } else if v < 0 {
                    k_hi = -1;
                } else if s < 0 {
                    k_hi = k_hi.min(v / -s);
                }
            }
            if k_lo > k_hi {
                continue;
            }
            let mut w = [0i64; 3];
            for i in 0..3 {
                w[order[i]] = e[i] + edges[i].xc * SUBPIXEL_SCALE * k_lo;
            }
            let x = (x_lo + k_lo) as i32;
            let span = self.span_mut(x, y as i32, (k_hi - k_lo + 1) as usize);
            shader.shade_span(span, x, y as i32, w, dw, area);
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{Rgb24, Rgbf};

    /// Counts how many times each pixel is shaded (in the red channel) and
    /// checks the weights.
    struct Tally;

    impl SpanShader<Rgb32> for Tally {
        fn shade_span(&mut self, span: &mut [Rgb32], _x: i32, _y: i32, mut w: [i64; 3], dw: [i64; 3], area: i64) {
            for d in span.iter_mut() {
                assert!(w.iter().all(|&v| v >= 0));
                assert_eq!(w[0] + w[1] + w[2], area);
                d.r += 1;
                step(&mut w, &dw);
            }
        }
    }

    fn pf(x: f32, y: f32) -> PointF {
        PointF::new(x, y)
    }

    #[test]
    fn test_two_triangles_partition_square() {
        let mut buf = vec![Rgb32::TRANSPARENT; 16 * 16];
        let mut c = Canvas::new(&mut buf, 16, 16);
        c.rasterize_triangle([pf(0.0, 0.0), pf(16.0, 0.0), pf(16.0, 16.0)], &mut Tally);
        c.rasterize_triangle([pf(0.0, 0.0), pf(16.0, 16.0), pf(0.0, 16.0)], &mut Tally);
        assert!(buf.iter().all(|p| p.r == 1));
    }

    #[test]
    fn test_fan_partitions_square() {
        let mut buf = vec![Rgb32::TRANSPARENT; 16 * 16];
        let mut c = Canvas::new(&mut buf, 16, 16);
        let m = pf(8.0, 8.0);
        let corners = [pf(0.0, 0.0), pf(16.0, 0.0), pf(16.0, 16.0), pf(0.0, 16.0)];
        for i in 0..4 {
            c.rasterize_triangle([m, corners[i], corners[(i + 1) % 4]], &mut Tally);
        }
        assert!(buf.iter().all(|p| p.r == 1));
    }

    #[test]
    fn test_fractional_mesh_partitions() {
        let mut buf = vec![Rgb32::TRANSPARENT; 20 * 20];
        let mut c = Canvas::new(&mut buf, 20, 20);
        let a = pf(1.3, 2.7);
        let b = pf(17.9, 0.4);
        let d = pf(3.1, 18.2);
        let e = pf(19.6, 15.5);
        c.rasterize_triangle([a, b, d], &mut Tally);
        c.rasterize_triangle([b, e, d], &mut Tally);
        assert!(buf.iter().all(|p| p.r <= 1));
    }

    #[test]
    fn test_winding_does_not_matter() {
        let mut b1 = vec![Rgb32::TRANSPARENT; 12 * 12];
        let mut b2 = vec![Rgb32::TRANSPARENT; 12 * 12];
        let t = [pf(1.2, 0.5), pf(10.7, 3.3), pf(4.4, 11.1)];
        Canvas::new(&mut b1, 12, 12).rasterize_triangle(t, &mut Tally);
        Canvas::new(&mut b2, 12, 12).rasterize_triangle([t[0], t[2], t[1]], &mut Tally);
        assert_eq!(b1, b2);
        assert!(b1.iter().any(|p| p.r == 1));
    }

    #[test]
    fn test_flat_triangle_draws_nothing() {
        let mut buf = vec![Rgb32::TRANSPARENT; 8 * 8];
        let mut c = Canvas::new(&mut buf, 8, 8);
        c.rasterize_triangle([pf(0.0, 0.0), pf(4.0, 4.0), pf(8.0, 8.0)], &mut Tally);
        assert!(buf.iter().all(|p| p.r == 0));
    }

    #[test]
    fn test_far_vertex_is_dropped() {
        let mut buf = vec![Rgb32::TRANSPARENT; 8 * 8];
        let mut c = Canvas::new(&mut buf, 8, 8);
        c.rasterize_triangle([pf(0.0, 0.0), pf(1.0e9, 0.0), pf(0.0, 8.0)], &mut Tally);
        c.rasterize_triangle([pf(0.0, 0.0), pf(f32::NAN, 0.0), pf(0.0, 8.0)], &mut Tally);
        assert!(buf.iter().all(|p| p.r == 0));
    }

    #[test]
    fn test_clipped_to_canvas() {
        let mut buf = vec![Rgb32::TRANSPARENT; 8 * 8];
        let mut c = Canvas::new(&mut buf, 8, 8);
        c.rasterize_triangle([pf(-20.0, -20.0), pf(40.0, -20.0), pf(-20.0, 40.0)], &mut Tally);
        assert!(buf.iter().all(|p| p.r == 1));
    }

    #[test]
    fn test_gradient_vertex_colors() {
        let mut buf = vec![Rgb32::BLACK; 32 * 32];
        let mut c = Canvas::new(&mut buf, 32, 32);
        let mut sh = GradientShader::new([Rgb32::RED, Rgb32::GREEN, Rgb32::BLUE], -1);
        c.rasterize_triangle([pf(0.0, 0.0), pf(32.0, 0.0), pf(0.0, 32.0)], &mut sh);
        let near_red = c.pixel::<true>(0, 0);
        assert!(near_red.r > 240 && near_red.g < 15 && near_red.b < 15);
        let near_green = c.pixel::<true>(30, 0);
        assert!(near_green.g > 220);
        let near_blue = c.pixel::<true>(0, 30);
        assert!(near_blue.b > 220);
    }

    #[test]
    fn test_gradient_blends_at_half() {
        let mut buf = vec![Rgb32::BLACK; 8 * 8];
        let mut c = Canvas::new(&mut buf, 8, 8);
        let mut sh = GradientShader::new([Rgb32::WHITE; 3], 128);
        c.rasterize_triangle([pf(0.0, 0.0), pf(8.0, 0.0), pf(0.0, 8.0)], &mut sh);
        let p = c.pixel::<true>(1, 1);
        assert!((p.r as i32 - 128).abs() <= 2);
    }

    #[test]
    fn test_gradient_keeps_float_destination() {
        let mut buf = vec![Rgbf::new(0.3012, 0.3012, 0.3012); 4 * 4];
        {
            let mut c = Canvas::new(&mut buf, 4, 4);
            let mut sh = GradientShader::new([Rgb32::WHITE; 3], 128);
            c.rasterize_triangle([pf(-1.0, -1.0), pf(20.0, -1.0), pf(-1.0, 20.0)], &mut sh);
        }
        assert!(buf.iter().all(|p| (p.r - 0.6506).abs() < 1e-4), "{:?}", buf[5]);
    }

    #[test]
    fn test_translucent_texel_without_alpha_channel() {
        let ghost = Rgb32::new(100, 0, 0, 200);
        let mut d = Rgb24::BLACK;
        composite(&mut d, ghost, 256);
        assert!((d.r as i32 - 100).abs() <= 1, "{:?}", d);

        let mut w = Rgb32::BLACK;
        composite(&mut w, ghost, 256);
        let mut f = Rgbf::new(0.0, 0.0, 0.0);
        composite(&mut f, ghost, 256);
        assert!((f.r * 255.0 - w.r as f32).abs() <= 1.5);

        let mut kept = Rgb24::WHITE;
        composite(&mut kept, Rgb32::TRANSPARENT, 256);
        assert_eq!(kept, Rgb24::WHITE);
    }

    #[test]
    fn test_texel_axis() {
        assert_eq!(texel_axis(0.5, 4), (0, 1, 0));
        assert_eq!(texel_axis(1.0, 4), (0, 1, 128));
        assert_eq!(texel_axis(2.5, 4), (2, 3, 0));
        assert_eq!(texel_axis(-3.0, 4), (0, 0, 128));
        assert_eq!(texel_axis(10.0, 4), (3, 3, 128));
    }

    #[test]
    fn test_masked_sample_hides_key_color() {
        let texels = [Rgb32::MAGENTA, Rgb32::WHITE];
        let tex = ImageRef::new(&texels, 2, 1);
        let c = sample_bilinear_masked(&tex, 0.5, 0.5, Some(Rgb32::MAGENTA));
        assert_eq!(c, Rgb32::TRANSPARENT);
        let c = sample_bilinear_masked(&tex, 1.5, 0.5, Some(Rgb32::MAGENTA));
        assert_eq!(c, Rgb32::WHITE);
        let plain = sample_bilinear(&tex, 1.5, 0.5);
        assert_eq!(plain, Rgb32::WHITE);
    }
}
