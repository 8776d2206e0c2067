//! Affine image sampling.
//!
//! Scaled and rotated blits, resizing copies and the textured / gradient
//! triangle primitives. Everything here goes through
//! [`Canvas::rasterize_triangle`], so adjacent triangles never write the
//! same pixel twice and partial opacity stays uniform across seams.
//!
//! Sampler coordinates are in source pixels, texel `(i, j)` being centred
//! at `(i + 0.5, j + 0.5)`. Fetches are bilinear with edge clamping.
//! Quads must be convex; they are split along the `p1`-`p3` diagonal.

use crate::basics::{deg2rad, PointF};
use crate::canvas::{Canvas, ImageRef};
use crate::color::{write_op, Color, Opacity, Rgb32};
use crate::config::BlitConfig;
use crate::span_rasterizer::{GradientShader, MaskedTextureShader, TextureShader};

const QUAD_SPLIT: [[usize; 3]; 2] = [[0, 1, 2], [0, 2, 3]];

#[inline]
fn pick<T: Copy>(v: &[T; 4], i: [usize; 3]) -> [T; 3] {
    [v[i[0]], v[i[1]], v[i[2]]]
}

/// Corners of a `w x h` box with its top-left corner at `(0, y)`.
#[inline]
fn band(w: f32, y1: f32, y2: f32) -> [PointF; 4] {
    [
        PointF::new(0.0, y1),
        PointF::new(w, y1),
        PointF::new(w, y2),
        PointF::new(0.0, y2),
    ]
}

// ============================================================================
// Affine slicing
// ============================================================================

/// Number of horizontal source slices drawn by an affine blit. Rotated
/// sources are cut so that each slice reads about `cache_size` bytes.
pub(crate) fn slice_count<S>(src: &ImageRef<'_, S>, angle_deg: f32, cache_size: usize) -> usize
where
    S: Copy,
{
    if angle_deg == 0.0 {
        return 1;
    }
    let bytes = src.stride() as usize * src.height() as usize * core::mem::size_of::<S>();
    bytes / cache_size.max(1) + 1
}

/// Call `f(src_quad, dst_quad)` for every slice of the source image scaled
/// by `scale` and rotated by `angle_deg` around `anchor_src`, which lands on
/// `anchor_dst`.
fn for_each_slice<S: Copy, F: FnMut([PointF; 4], [PointF; 4])>(
    src: &ImageRef<'_, S>,
    anchor_src: PointF,
    anchor_dst: PointF,
    scale: f32,
    angle_deg: f32,
    cache_size: usize,
    mut f: F,
) {
    let nb = slice_count(src, angle_deg, cache_size);
    log::debug!(
        "affine blit: {}x{} source, scale {}, angle {}, {} slice(s)",
        src.width(),
        src.height(),
        scale,
        angle_deg,
        nb
    );
    let tlx = src.width() as f32;
    let tly = src.height() as f32;
    let a = deg2rad(angle_deg);
    let (so, co) = a.sin_cos();
    let map = |p: PointF| -> PointF {
        let q = (p - anchor_src) * scale;
        PointF::new(q.x * co - q.y * so, q.y * co + q.x * so) + anchor_dst
    };
    let q = band(tlx, 0.0, tly).map(map);
    for n in 0..nb {
        let ma = n as f32 / nb as f32;
        let mb = (n + 1) as f32 / nb as f32;
        let lerp = |p: PointF, r: PointF, t: f32| p * (1.0 - t) + r * t;
        let dst = [
            lerp(q[0], q[3], ma),
            lerp(q[1], q[2], ma),
            lerp(q[1], q[2], mb),
            lerp(q[0], q[3], mb),
        ];
        let y1 = tly * n as f32 / nb as f32;
        let y2 = tly * (n + 1) as f32 / nb as f32;
        f(band(tlx, y1, y2), dst);
    }
}

impl<'a, C: Color> Canvas<'a, C> {
    // ------------------------------------------------------------------------
    // Shared quad drawing
    // ------------------------------------------------------------------------

    fn textured_quad_by<S: Color, F: FnMut(&mut C, S)>(
        &mut self,
        src: &ImageRef<'_, S>,
        uv: [PointF; 4],
        dst: [PointF; 4],
        write: &mut F,
    ) {
        for idx in QUAD_SPLIT {
            let mut sh = TextureShader::new(*src, pick(&uv, idx), &mut *write);
            self.rasterize_triangle(pick(&dst, idx), &mut sh);
        }
    }

    fn masked_quad<S: Color>(
        &mut self,
        src: &ImageRef<'_, S>,
        transparent: Option<S>,
        uv: [PointF; 4],
        dst: [PointF; 4],
        op: i32,
    ) {
        for idx in QUAD_SPLIT {
            let mut sh = MaskedTextureShader::new(*src, pick(&uv, idx), transparent, None, op);
            self.rasterize_triangle(pick(&dst, idx), &mut sh);
        }
    }

    fn sources_valid<S: Copy>(&self, src: &ImageRef<'_, S>, what: &str) -> bool {
        let ok = self.is_valid() && src.is_valid();
        if !ok {
            log::debug!("{}: invalid source or destination, nothing drawn", what);
        }
        ok
    }

    // ------------------------------------------------------------------------
    // Scaled / rotated blits
    // ------------------------------------------------------------------------

    /// Draw `src` scaled by `scale` and rotated by `angle_deg` (clockwise on
    /// screen) so that the source point `anchor_src` lands on `anchor_dst`.
    ///
    /// With scale 1 and angle 0 and integer-aligned anchors, the source
    /// pixels are copied exactly.
    pub fn blit_affine<S: Color>(
        &mut self,
        src: &ImageRef<'_, S>,
        anchor_src: PointF,
        anchor_dst: PointF,
        scale: f32,
        angle_deg: f32,
        opacity: Opacity,
    ) where
        C: From<S>,
    {
        self.blit_affine_with_config(src, anchor_src, anchor_dst, scale, angle_deg, opacity, &BlitConfig::default());
    }

    /// [`blit_affine`](Self::blit_affine) with an explicit slice budget.
    #[allow(clippy::too_many_arguments)]
    pub fn blit_affine_with_config<S: Color>(
        &mut self,
        src: &ImageRef<'_, S>,
        anchor_src: PointF,
        anchor_dst: PointF,
        scale: f32,
        angle_deg: f32,
        opacity: Opacity,
        config: &BlitConfig,
    ) where
        C: From<S>,
    {
        if !self.sources_valid(src, "blit_affine") {
            return;
        }
        let op = opacity.op256();
        let mut write = |d: &mut C, s: S| write_op(d, C::from(s), op);
        for_each_slice(src, anchor_src, anchor_dst, scale, angle_deg, config.cache_size(), |uv, dst| {
            self.textured_quad_by(src, uv, dst, &mut write)
        });
    }

    /// Scaled / rotated blit where source pixels equal to `transparent` are
    /// not drawn. Edges next to masked pixels fade out smoothly. Overwrite
    /// counts as full opacity.
    #[allow(clippy::too_many_arguments)]
    pub fn blit_affine_masked<S: Color>(
        &mut self,
        src: &ImageRef<'_, S>,
        transparent: S,
        anchor_src: PointF,
        anchor_dst: PointF,
        scale: f32,
        angle_deg: f32,
        opacity: Opacity,
    ) {
        self.blit_affine_masked_with_config(
            src,
            transparent,
            anchor_src,
            anchor_dst,
            scale,
            angle_deg,
            opacity,
            &BlitConfig::default(),
        );
    }

    #[allow(clippy::too_many_arguments)]
    pub fn blit_affine_masked_with_config<S: Color>(
        &mut self,
        src: &ImageRef<'_, S>,
        transparent: S,
        anchor_src: PointF,
        anchor_dst: PointF,
        scale: f32,
        angle_deg: f32,
        opacity: Opacity,
        config: &BlitConfig,
    ) {
        if !self.sources_valid(src, "blit_affine_masked") {
            return;
        }
        let op = opacity.aa_op();
        for_each_slice(src, anchor_src, anchor_dst, scale, angle_deg, config.cache_size(), |uv, dst| {
            self.masked_quad(src, Some(transparent), uv, dst, op)
        });
    }

    /// Scaled / rotated blit with a custom operator
    /// `blend(src, dst) -> new dst` applied to the interpolated source.
    pub fn blit_affine_with<S: Color, F: FnMut(S, C) -> C>(
        &mut self,
        src: &ImageRef<'_, S>,
        anchor_src: PointF,
        anchor_dst: PointF,
        scale: f32,
        angle_deg: f32,
        mut blend: F,
    ) {
        if !self.sources_valid(src, "blit_affine_with") {
            return;
        }
        let mut write = |d: &mut C, s: S| *d = blend(s, *d);
        let cache = BlitConfig::default().cache_size();
        for_each_slice(src, anchor_src, anchor_dst, scale, angle_deg, cache, |uv, dst| {
            self.textured_quad_by(src, uv, dst, &mut write)
        });
    }

    // ------------------------------------------------------------------------
    // Resizing copies
    // ------------------------------------------------------------------------

    /// Stretch the whole of `src` over the whole canvas, converting the
    /// pixel format on the way.
    ///
    /// `src` is a shared borrow and `self` an exclusive one, so the two can
    /// never overlap.
    pub fn copy_from<S: Color>(&mut self, src: &ImageRef<'_, S>, opacity: Opacity)
    where
        C: From<S>,
    {
        if !self.sources_valid(src, "copy_from") {
            return;
        }
        let op = opacity.op256();
        let mut write = |d: &mut C, s: S| write_op(d, C::from(s), op);
        let uv = band(src.width() as f32, 0.0, src.height() as f32);
        let dst = band(self.width() as f32, 0.0, self.height() as f32);
        self.textured_quad_by(src, uv, dst, &mut write);
    }

    /// [`copy_from`](Self::copy_from) with a custom operator
    /// `blend(src, dst) -> new dst`.
    pub fn copy_from_with<S: Color, F: FnMut(S, C) -> C>(&mut self, src: &ImageRef<'_, S>, mut blend: F) {
        if !self.sources_valid(src, "copy_from_with") {
            return;
        }
        let mut write = |d: &mut C, s: S| *d = blend(s, *d);
        let uv = band(src.width() as f32, 0.0, src.height() as f32);
        let dst = band(self.width() as f32, 0.0, self.height() as f32);
        self.textured_quad_by(src, uv, dst, &mut write);
    }

    // ------------------------------------------------------------------------
    // Textured and gradient primitives
    // ------------------------------------------------------------------------

    /// Map the triangle `src_pts` of `src` onto the triangle `dst_pts`.
    pub fn draw_textured_triangle<S: Color>(
        &mut self,
        src: &ImageRef<'_, S>,
        src_pts: [PointF; 3],
        dst_pts: [PointF; 3],
        opacity: Opacity,
    ) where
        C: From<S>,
    {
        if !self.sources_valid(src, "draw_textured_triangle") {
            return;
        }
        let op = opacity.op256();
        let mut sh = TextureShader::new(*src, src_pts, |d: &mut C, s: S| write_op(d, C::from(s), op));
        self.rasterize_triangle(dst_pts, &mut sh);
    }

    /// Textured triangle skipping texels equal to `transparent`.
    pub fn draw_textured_triangle_masked<S: Color>(
        &mut self,
        src: &ImageRef<'_, S>,
        transparent: S,
        src_pts: [PointF; 3],
        dst_pts: [PointF; 3],
        opacity: Opacity,
    ) {
        if !self.sources_valid(src, "draw_textured_triangle_masked") {
            return;
        }
        let mut sh = MaskedTextureShader::new(*src, src_pts, Some(transparent), None, opacity.aa_op());
        self.rasterize_triangle(dst_pts, &mut sh);
    }

    /// Textured triangle whose texels are multiplied by the colors
    /// interpolated between the vertices.
    pub fn draw_textured_gradient_triangle<S: Color>(
        &mut self,
        src: &ImageRef<'_, S>,
        src_pts: [PointF; 3],
        dst_pts: [PointF; 3],
        colors: [C; 3],
        opacity: Opacity,
    ) {
        if !self.sources_valid(src, "draw_textured_gradient_triangle") {
            return;
        }
        let tint = colors.map(Into::<Rgb32>::into);
        let mut sh = MaskedTextureShader::new(*src, src_pts, None, Some(tint), opacity.aa_op());
        self.rasterize_triangle(dst_pts, &mut sh);
    }

    /// Map the quad `src_pts` of `src` onto the quad `dst_pts`.
    pub fn draw_textured_quad<S: Color>(
        &mut self,
        src: &ImageRef<'_, S>,
        src_pts: [PointF; 4],
        dst_pts: [PointF; 4],
        opacity: Opacity,
    ) where
        C: From<S>,
    {
        if !self.sources_valid(src, "draw_textured_quad") {
            return;
        }
        let op = opacity.op256();
        let mut write = |d: &mut C, s: S| write_op(d, C::from(s), op);
        self.textured_quad_by(src, src_pts, dst_pts, &mut write);
    }

    pub fn draw_textured_quad_masked<S: Color>(
        &mut self,
        src: &ImageRef<'_, S>,
        transparent: S,
        src_pts: [PointF; 4],
        dst_pts: [PointF; 4],
        opacity: Opacity,
    ) {
        if !self.sources_valid(src, "draw_textured_quad_masked") {
            return;
        }
        self.masked_quad(src, Some(transparent), src_pts, dst_pts, opacity.aa_op());
    }

    /// Triangle with colors interpolated between its vertices.
    pub fn draw_gradient_triangle(&mut self, pts: [PointF; 3], colors: [C; 3], opacity: Opacity) {
        let mut sh = GradientShader::new(colors.map(Into::<Rgb32>::into), opacity.op256());
        self.rasterize_triangle(pts, &mut sh);
    }

    /// Quad with colors interpolated between its vertices (separately on
    /// each half).
    pub fn draw_gradient_quad(&mut self, pts: [PointF; 4], colors: [C; 4], opacity: Opacity) {
        let colors = colors.map(Into::<Rgb32>::into);
        let op = opacity.op256();
        for idx in QUAD_SPLIT {
            let mut sh = GradientShader::new(pick(&colors, idx), op);
            self.rasterize_triangle(pick(&pts, idx), &mut sh);
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgb565;

    fn pattern(w: i32, h: i32) -> Vec<Rgb32> {
        (0..w * h)
            .map(|i| Rgb32::opaque((i * 37 % 256) as u8, (i * 91 % 256) as u8, (i * 13 % 256) as u8))
            .collect()
    }

    fn pf(x: f32, y: f32) -> PointF {
        PointF::new(x, y)
    }

    #[test]
    fn test_slice_count() {
        let texels = vec![Rgb32::BLACK; 64 * 64];
        let src = ImageRef::new(&texels, 64, 64);
        assert_eq!(slice_count(&src, 0.0, 16), 1);
        assert_eq!(slice_count(&src, 30.0, 16384), 2);
        assert_eq!(slice_count(&src, 30.0, 1 << 20), 1);
    }

    #[test]
    fn test_affine_identity_reproduces_source() {
        let texels = pattern(8, 6);
        let src = ImageRef::new(&texels, 8, 6);
        let mut buf = vec![Rgb32::BLACK; 8 * 6];
        let mut c = Canvas::new(&mut buf, 8, 6);
        c.blit_affine(&src, pf(3.0, 2.0), pf(3.0, 2.0), 1.0, 0.0, Opacity::Overwrite);
        assert_eq!(buf, texels);
    }

    #[test]
    fn test_affine_identity_rgb565() {
        let texels: Vec<Rgb565> = pattern(5, 5).into_iter().map(Rgb565::from).collect();
        let src = ImageRef::new(&texels, 5, 5);
        let mut buf = vec![Rgb565::BLACK; 25];
        let mut c = Canvas::new(&mut buf, 5, 5);
        c.blit_affine(&src, pf(0.0, 0.0), pf(0.0, 0.0), 1.0, 0.0, Opacity::Overwrite);
        assert_eq!(buf, texels);
    }

    #[test]
    fn test_affine_translation() {
        let texels = pattern(4, 4);
        let src = ImageRef::new(&texels, 4, 4);
        let mut buf = vec![Rgb32::BLACK; 10 * 10];
        let mut c = Canvas::new(&mut buf, 10, 10);
        c.blit_affine(&src, pf(0.0, 0.0), pf(3.0, 2.0), 1.0, 0.0, Opacity::Overwrite);
        assert_eq!(c.pixel::<true>(3, 2), texels[0]);
        assert_eq!(c.pixel::<true>(6, 5), texels[15]);
        assert_eq!(c.pixel::<true>(2, 2), Rgb32::BLACK);
        assert_eq!(c.pixel::<true>(7, 2), Rgb32::BLACK);
    }

    #[test]
    fn test_affine_quarter_turn() {
        let texels = pattern(4, 4);
        let src = ImageRef::new(&texels, 4, 4);
        let mut buf = vec![Rgb32::BLACK; 16];
        let mut c = Canvas::new(&mut buf, 4, 4);
        c.blit_affine(&src, pf(2.0, 2.0), pf(2.0, 2.0), 1.0, 90.0, Opacity::Overwrite);
        for j in 0..4 {
            for i in 0..4 {
                assert_eq!(c.pixel::<true>(3 - j, i), texels[(i + j * 4) as usize]);
            }
        }
    }

    #[test]
    fn test_affine_scale_two() {
        let texels = pattern(2, 2);
        let src = ImageRef::new(&texels, 2, 2);
        let mut buf = vec![Rgb32::BLACK; 16];
        let mut c = Canvas::new(&mut buf, 4, 4);
        c.blit_affine(&src, pf(0.0, 0.0), pf(0.0, 0.0), 2.0, 0.0, Opacity::Overwrite);
        assert_eq!(c.pixel::<true>(0, 0), texels[0]);
        assert_eq!(c.pixel::<true>(3, 3), texels[3]);
    }

    #[test]
    fn test_slices_do_not_overlap() {
        let texels = vec![Rgb32::WHITE; 16 * 16];
        let src = ImageRef::new(&texels, 16, 16);
        let mut cfg = BlitConfig::new();
        cfg.set_cache_size(64);
        let mut buf = vec![Rgb32::BLACK; 32 * 32];
        let mut c = Canvas::new(&mut buf, 32, 32);
        c.blit_affine_with_config(&src, pf(8.0, 8.0), pf(16.0, 16.0), 1.3, 30.0, Opacity::Blend(0.5), &cfg);
        let written = buf.iter().filter(|p| p.r > 0).count();
        assert!(written > 300);
        assert!(buf.iter().all(|p| p.r <= 130));
    }

    #[test]
    fn test_affine_masked() {
        let mut texels = vec![Rgb32::WHITE; 16];
        texels[5] = Rgb32::MAGENTA;
        let src = ImageRef::new(&texels, 4, 4);
        let mut buf = vec![Rgb32::RED; 16];
        let mut c = Canvas::new(&mut buf, 4, 4);
        c.blit_affine_masked(&src, Rgb32::MAGENTA, pf(0.0, 0.0), pf(0.0, 0.0), 1.0, 0.0, Opacity::OPAQUE);
        assert_eq!(c.pixel::<true>(1, 1), Rgb32::RED);
        assert_eq!(c.pixel::<true>(0, 0), Rgb32::WHITE);
        assert_eq!(c.pixel::<true>(3, 3), Rgb32::WHITE);
    }

    #[test]
    fn test_affine_with_operator() {
        let texels = vec![Rgb32::opaque(10, 20, 30); 16];
        let src = ImageRef::new(&texels, 4, 4);
        let mut buf = vec![Rgb32::opaque(1, 1, 1); 16];
        let mut c = Canvas::new(&mut buf, 4, 4);
        c.blit_affine_with(&src, pf(0.0, 0.0), pf(0.0, 0.0), 1.0, 0.0, |s: Rgb32, d: Rgb32| {
            Rgb32::opaque(s.r + d.r, s.g + d.g, s.b + d.b)
        });
        assert!(buf.iter().all(|p| *p == Rgb32::opaque(11, 21, 31)));
    }

    #[test]
    fn test_copy_from_upscale() {
        let texels = [Rgb32::BLACK, Rgb32::WHITE, Rgb32::WHITE, Rgb32::BLACK];
        let src = ImageRef::new(&texels, 2, 2);
        let mut buf = vec![Rgb32::BLUE; 16];
        let mut c = Canvas::new(&mut buf, 4, 4);
        c.copy_from(&src, Opacity::Overwrite);
        assert_eq!(c.pixel::<true>(0, 0), Rgb32::BLACK);
        assert_eq!(c.pixel::<true>(3, 3), Rgb32::BLACK);
        assert_eq!(c.pixel::<true>(3, 0), Rgb32::WHITE);
        let p = c.pixel::<true>(1, 0);
        assert!((60..=68).contains(&p.r));
    }

    #[test]
    fn test_copy_from_converts_format() {
        let texels: Vec<Rgb565> = pattern(3, 3).into_iter().map(Rgb565::from).collect();
        let src = ImageRef::new(&texels, 3, 3);
        let mut buf = vec![Rgb32::BLACK; 9];
        let mut c = Canvas::new(&mut buf, 3, 3);
        c.copy_from(&src, Opacity::Overwrite);
        for (d, s) in buf.iter().zip(&texels) {
            assert_eq!(*d, Rgb32::from(*s));
        }
    }

    #[test]
    fn test_copy_from_with_operator() {
        let texels = [Rgb32::WHITE; 4];
        let src = ImageRef::new(&texels, 2, 2);
        let mut buf = vec![Rgb32::BLACK; 16];
        let mut c = Canvas::new(&mut buf, 4, 4);
        c.copy_from_with(&src, |_s: Rgb32, _d: Rgb32| Rgb32::GREEN);
        assert!(buf.iter().all(|p| *p == Rgb32::GREEN));
    }

    #[test]
    fn test_textured_triangle_covers_half() {
        let texels = vec![Rgb32::WHITE; 16];
        let src = ImageRef::new(&texels, 4, 4);
        let mut buf = vec![Rgb32::BLACK; 64];
        let mut c = Canvas::new(&mut buf, 8, 8);
        let uv = [pf(0.0, 0.0), pf(4.0, 0.0), pf(0.0, 4.0)];
        let dst = [pf(0.0, 0.0), pf(8.0, 0.0), pf(0.0, 8.0)];
        c.draw_textured_triangle(&src, uv, dst, Opacity::Overwrite);
        assert_eq!(c.pixel::<true>(0, 0), Rgb32::WHITE);
        assert_eq!(c.pixel::<true>(7, 7), Rgb32::BLACK);
        let written = buf.iter().filter(|p| **p == Rgb32::WHITE).count();
        assert_eq!(written, 28);
    }

    #[test]
    fn test_textured_triangle_masked() {
        let texels = vec![Rgb32::MAGENTA; 16];
        let src = ImageRef::new(&texels, 4, 4);
        let mut buf = vec![Rgb32::BLUE; 16];
        let mut c = Canvas::new(&mut buf, 4, 4);
        let t = [pf(0.0, 0.0), pf(4.0, 0.0), pf(0.0, 4.0)];
        c.draw_textured_triangle_masked(&src, Rgb32::MAGENTA, t, t, Opacity::OPAQUE);
        assert!(buf.iter().all(|p| *p == Rgb32::BLUE));
    }

    #[test]
    fn test_textured_quad() {
        let texels = pattern(4, 4);
        let src = ImageRef::new(&texels, 4, 4);
        let mut buf = vec![Rgb32::BLACK; 16];
        let mut c = Canvas::new(&mut buf, 4, 4);
        let q = band(4.0, 0.0, 4.0);
        c.draw_textured_quad(&src, q, q, Opacity::Overwrite);
        assert_eq!(buf, texels);
    }

    #[test]
    fn test_textured_quad_masked_blends() {
        let texels = vec![Rgb32::WHITE; 4];
        let src = ImageRef::new(&texels, 2, 2);
        let mut buf = vec![Rgb32::BLACK; 4];
        let mut c = Canvas::new(&mut buf, 2, 2);
        let q = band(2.0, 0.0, 2.0);
        c.draw_textured_quad_masked(&src, Rgb32::MAGENTA, q, q, Opacity::Blend(0.5));
        assert!(buf.iter().all(|p| (p.r as i32 - 128).abs() <= 2));
    }

    #[test]
    fn test_textured_gradient_triangle_tints() {
        let texels = vec![Rgb32::WHITE; 16];
        let src = ImageRef::new(&texels, 4, 4);
        let mut buf = vec![Rgb32::BLACK; 64];
        let mut c = Canvas::new(&mut buf, 8, 8);
        let uv = [pf(0.0, 0.0), pf(4.0, 0.0), pf(0.0, 4.0)];
        let dst = [pf(-1.0, -1.0), pf(20.0, -1.0), pf(-1.0, 20.0)];
        c.draw_textured_gradient_triangle(&src, uv, dst, [Rgb32::RED; 3], Opacity::OPAQUE);
        assert_eq!(c.pixel::<true>(1, 1), Rgb32::RED);
    }

    #[test]
    fn test_gradient_quad_uniform() {
        let mut buf = vec![Rgb565::BLACK; 64];
        let mut c = Canvas::new(&mut buf, 8, 8);
        c.draw_gradient_quad(band(8.0, 0.0, 8.0), [Rgb565::ORANGE; 4], Opacity::Overwrite);
        assert!(buf.iter().all(|p| *p == Rgb565::ORANGE));
    }

    #[test]
    fn test_gradient_triangle_endpoints() {
        let mut buf = vec![Rgb32::BLACK; 64 * 64];
        let mut c = Canvas::new(&mut buf, 64, 64);
        let pts = [pf(0.0, 0.0), pf(64.0, 0.0), pf(0.0, 64.0)];
        c.draw_gradient_triangle(pts, [Rgb32::WHITE, Rgb32::BLACK, Rgb32::BLACK], Opacity::Overwrite);
        assert!(c.pixel::<true>(0, 0).r > 245);
        assert!(c.pixel::<true>(60, 1).r < 20);
        assert_eq!(c.pixel::<true>(63, 63), Rgb32::BLACK);
    }

    #[test]
    fn test_invalid_source_is_noop() {
        let src: ImageRef<'_, Rgb32> = ImageRef::invalid();
        let mut buf = vec![Rgb32::BLACK; 16];
        let mut c = Canvas::new(&mut buf, 4, 4);
        c.blit_affine(&src, pf(0.0, 0.0), pf(0.0, 0.0), 1.0, 0.0, Opacity::Overwrite);
        c.copy_from(&src, Opacity::Overwrite);
        assert!(buf.iter().all(|p| *p == Rgb32::BLACK));
    }
}
