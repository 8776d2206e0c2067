//! Lines: thin, anti-aliased, thick and wedge-shaped, with end caps.
//!
//! Thin lines come straight from the [`ScanStepper`]. A thick line with
//! straight ends is a quad filled by the seam-free triangle rasterizer; as
//! soon as one end is rounded the line is rendered as a capsule instead,
//! every pixel weighted by its distance to the centre segment. Arrow heads
//! are extra triangles attached past the end point.

use crate::basics::{clip_segment, iceil, ifloor, PointF, PointI, Rect, RectI};
use crate::canvas::Canvas;
use crate::color::{Color, Opacity};
use crate::polygon::{PointSource, SlicePoints};
use crate::scan_stepper::{in_range, ScanStepper, COORD_LIMIT};

/// Coverage below which a capsule pixel is skipped.
const LO_ALPHA: f32 = 64.0 / 255.0;
/// Coverage above which a capsule pixel is written at full weight.
const HI_ALPHA: f32 = 1.0 - LO_ALPHA;

/// Pixels kept around the image when a segment is clipped.
const GUARD: f64 = 4.0;

#[inline]
fn xy(p: PointF) -> (f64, f64) {
    (p.x as f64, p.y as f64)
}

/// Point at parameter `t` of `a -> b`.
#[inline]
fn point_at(a: (f64, f64), b: (f64, f64), t: f64) -> PointF {
    PointF::new((a.0 + (b.0 - a.0) * t) as f32, (a.1 + (b.1 - a.1) * t) as f32)
}

// ============================================================================
// EndCap
// ============================================================================

/// Shape of a thick line extremity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EndCap {
    /// Cut perpendicular to the line at the end point.
    Straight,
    /// Half disc of the line radius.
    #[default]
    Rounded,
    /// Arrow head past the end point. The size (clamped to `1..=5`) is the
    /// head length in line widths.
    Arrow(u8),
    /// Arrow head with barbs swept back along the line.
    SkewedArrow(u8),
}

impl EndCap {
    #[inline]
    fn is_rounded(self) -> bool {
        matches!(self, EndCap::Rounded)
    }
}

/// Distance from `p` (relative to A) to the segment `A + t.ba`, reduced by
/// the radius change `dr` along the segment.
#[inline]
fn wedge_distance(p: PointF, ba: PointF, dr: f32) -> f32 {
    let h = (p.dot(ba) / ba.dot(ba)).clamp(0.0, 1.0);
    (p - ba * h).norm() + h * dr
}

impl<'a, C: Color> Canvas<'a, C> {
    // ------------------------------------------------------------------------
    // Far segments
    // ------------------------------------------------------------------------

    /// Parameters of the part of `a -> b` inside the image box grown by
    /// `margin` pixels, the box itself staying within [`COORD_LIMIT`].
    fn guard_clip(&self, a: (f64, f64), b: (f64, f64), margin: f64) -> Option<(f64, f64)> {
        let l = COORD_LIMIT as f64;
        let m = margin.min(l);
        let g = Rect::new(
            -m,
            -m,
            (self.width() as f64 + m).min(l),
            (self.height() as f64 + m).min(l),
        );
        clip_segment(a, b, &g)
    }

    /// The part of `a -> b` a stepper can walk: the segment itself when both
    /// ends are within [`COORD_LIMIT`], else what remains of it near the
    /// image. `None` when nothing of it can show.
    pub(crate) fn walkable(&self, a: (f64, f64), b: (f64, f64)) -> Option<(PointF, PointF)> {
        let l = COORD_LIMIT as f64;
        if [a.0, a.1, b.0, b.1].iter().all(|v| v.abs() <= l) {
            return Some((point_at(a, b, 0.0), point_at(a, b, 1.0)));
        }
        let (t0, t1) = self.guard_clip(a, b, GUARD)?;
        Some((point_at(a, b, t0), point_at(a, b, t1)))
    }

    /// Thin segment between pixel centres.
    pub(crate) fn segment_i(&mut self, p1: PointI, draw_p1: bool, p2: PointI, draw_p2: bool, c: C, op: i32) {
        let a = (p1.x as f64, p1.y as f64);
        let b = (p2.x as f64, p2.y as f64);
        if let Some((a, b)) = self.walkable(a, b) {
            self.seg_draw(ScanStepper::new(a.round(), b.round()), draw_p1, draw_p2, c, 0, op);
        }
    }

    /// Thin segment through the pixel centres nearest to `a` and `b`.
    pub(crate) fn segment_f(&mut self, a: PointF, draw_a: bool, b: PointF, draw_b: bool, c: C, op: i32) {
        if let Some((a, b)) = self.walkable(xy(a), xy(b)) {
            self.seg_draw(ScanStepper::new_f(a.round().into(), b.round().into()), draw_a, draw_b, c, 0, op);
        }
    }

    /// Anti-aliased segment.
    pub(crate) fn segment_aa(&mut self, a: PointF, draw_a: bool, b: PointF, draw_b: bool, c: C, op: i32) {
        if let Some((a, b)) = self.walkable(xy(a), xy(b)) {
            self.seg_draw_aa(ScanStepper::new_f(a, b), draw_a, draw_b, c, op);
        }
    }

    // ------------------------------------------------------------------------
    // Thin lines
    // ------------------------------------------------------------------------

    /// Bresenham line including both end points.
    pub fn draw_line(&mut self, p1: PointI, p2: PointI, c: C, opacity: Opacity) {
        self.draw_segment(p1, true, p2, true, c, opacity);
    }

    /// Bresenham segment; `draw_p1` / `draw_p2` select whether the end
    /// points are written, so that chained segments share their joints
    /// without writing them twice.
    ///
    /// A segment reaching beyond [`COORD_LIMIT`] is first clipped to the
    /// neighbourhood of the image.
    pub fn draw_segment(&mut self, p1: PointI, draw_p1: bool, p2: PointI, draw_p2: bool, c: C, opacity: Opacity) {
        if !self.is_valid() {
            return;
        }
        self.segment_i(p1, draw_p1, p2, draw_p2, c, opacity.op256());
    }

    /// One pixel wide anti-aliased line.
    pub fn draw_line_aa(&mut self, p1: PointF, p2: PointF, c: C, opacity: Opacity) {
        if !self.is_valid() {
            return;
        }
        self.segment_aa(p1, true, p2, true, c, opacity.aa_op());
    }

    // ------------------------------------------------------------------------
    // Thick lines
    // ------------------------------------------------------------------------

    /// Line of constant width.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_thick_line_aa(
        &mut self,
        p1: PointF,
        p2: PointF,
        width: f32,
        cap1: EndCap,
        cap2: EndCap,
        c: C,
        opacity: Opacity,
    ) {
        self.draw_wedge_line_aa(p1, p2, width, cap1, width, cap2, c, opacity);
    }

    /// Line whose width varies linearly from `w1` at `p1` to `w2` at `p2`.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_wedge_line_aa(
        &mut self,
        p1: PointF,
        p2: PointF,
        w1: f32,
        cap1: EndCap,
        w2: f32,
        cap2: EndCap,
        c: C,
        opacity: Opacity,
    ) {
        if !self.is_valid() || (w1 <= 0.0 && w2 <= 0.0) {
            return;
        }
        let (w1, w2) = (w1.max(0.0), w2.max(0.0));
        if !(in_range(p1) && in_range(p2)) {
            // keep the part near the image, cut ends lose their caps
            let (a, b) = (xy(p1), xy(p2));
            let Some((t0, t1)) = self.guard_clip(a, b, GUARD + w1.max(w2) as f64) else {
                return;
            };
            let w_at = |t: f64| (w1 as f64 + (w2 - w1) as f64 * t) as f32;
            let cap1 = if t0 > 0.0 { EndCap::Straight } else { cap1 };
            let cap2 = if t1 < 1.0 { EndCap::Straight } else { cap2 };
            let (q1, q2) = (point_at(a, b, t0), point_at(a, b, t1));
            self.draw_wedge_line_aa(q1, q2, w_at(t0), cap1, w_at(t1), cap2, c, opacity);
            return;
        }
        if cap1.is_rounded() || cap2.is_rounded() {
            self.capsule(p1, p2, w1, w2, cap1.is_rounded(), cap2.is_rounded(), c, opacity.aa_op());
        } else {
            let h = (p1 - p2).perp().normalized();
            let h1 = h * (w1 / 2.0);
            let h2 = h * (w2 / 2.0);
            self.fill_quad_aa(p1 + h1, p2 + h2, p2 - h2, p1 - h1, c, opacity);
        }
        self.arrow_head(p2, p1, w1, cap1, c, opacity);
        self.arrow_head(p1, p2, w2, cap2, c, opacity);
    }

    /// Arrow head of `cap` attached at `end`, pointing away from `from`.
    fn arrow_head(&mut self, from: PointF, end: PointF, width: f32, cap: EndCap, c: C, opacity: Opacity) {
        let (size, skewed) = match cap {
            EndCap::Arrow(k) => (k, false),
            EndCap::SkewedArrow(k) => (k, true),
            _ => return,
        };
        let k = size.clamp(1, 5) as f32;
        let d = (end - from).normalized();
        if d.x == 0.0 && d.y == 0.0 {
            return;
        }
        let n = d.perp();
        let tip = end + d * (k * width);
        let half = width * (1.0 + 0.5 * k) / 2.0;
        if skewed {
            let back = d * (k * width / 2.0);
            self.fill_quad_aa(tip, end + n * half - back, end, end - n * half - back, c, opacity);
        } else {
            self.fill_triangle_aa(tip, end + n * half, end - n * half, c, opacity);
        }
    }

    /// Distance-based rendering of a tapered line. Each end is a half disc
    /// when its `round` flag is set, a straight cut otherwise.
    #[allow(clippy::too_many_arguments)]
    fn capsule(&mut self, a: PointF, mut b: PointF, w1: f32, w2: f32, round1: bool, round2: bool, c: C, op: i32) {
        if (a.x - b.x).abs() < 0.01 && (a.y - b.y).abs() < 0.01 {
            b.x += 0.01;
        }
        let mut ar = w1 / 2.0;
        let br = w2 / 2.0;
        let mut bb = RectI::new(
            ifloor((a.x - ar).min(b.x - br)),
            ifloor((a.y - ar).min(b.y - br)),
            iceil((a.x + ar).max(b.x + br)),
            iceil((a.y + ar).max(b.y + br)),
        );
        if !bb.clip(&self.image_box()) {
            return;
        }
        let ba = b - a;
        let u = ba.normalized();
        let dr = ar - br;
        ar += 0.5;

        let alpha_at = |x: i32, y: i32| -> f32 {
            let p = PointF::new(x as f32, y as f32);
            let pa = p - a;
            let mut alpha = ar - wedge_distance(pa, ba, dr);
            if !round1 {
                alpha = alpha.min(0.5 + pa.dot(u));
            }
            if !round2 {
                alpha = alpha.min(0.5 - (p - b).dot(u));
            }
            alpha
        };

        // Rows are scanned away from the row of the leftmost extremity, so
        // that the left boundary only moves right and the next row can start
        // where the previous one entered the shape. A straight cut breaks
        // that property, in which case every row starts at the box edge.
        let track = round1 && round2;
        let ys = if (a.x - ar) > (b.x - br) { b.y as i32 } else { a.y as i32 };
        let ys = ys.clamp(bb.y1, bb.y2 + 1);
        let mut xs = bb.x1;
        for y in ys..=bb.y2 {
            let from = if track { xs } else { bb.x1 };
            if let Some(e) = self.capsule_row(y, from, bb.x2, &alpha_at, c, op) {
                xs = e;
            }
        }
        xs = bb.x1;
        for y in (bb.y1..ys).rev() {
            let from = if track { xs } else { bb.x1 };
            if let Some(e) = self.capsule_row(y, from, bb.x2, &alpha_at, c, op) {
                xs = e;
            }
        }
    }

    /// Writes one row of a capsule, stopping at the first pixel that falls
    /// outside after entering the shape. Returns the entry column.
    fn capsule_row<F: Fn(i32, i32) -> f32>(&mut self, y: i32, x1: i32, x2: i32, alpha_at: &F, c: C, op: i32) -> Option<i32> {
        let mut entry = None;
        for x in x1..=x2 {
            let alpha = alpha_at(x, y);
            if alpha <= LO_ALPHA {
                if entry.is_some() {
                    break;
                }
                continue;
            }
            if entry.is_none() {
                entry = Some(x);
            }
            let aa = if alpha > HI_ALPHA { 256 } else { (alpha * 256.0) as i32 };
            self.put_aa(x, y, c, aa, op);
        }
        entry
    }

    // ------------------------------------------------------------------------
    // Thick polylines
    // ------------------------------------------------------------------------

    /// Thick polyline with rounded joins.
    ///
    /// Consecutive segments overlap inside each join, so those pixels are
    /// composited twice when `opacity` is below one.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_thick_polyline_aa_from<S: PointSource + ?Sized>(
        &mut self,
        src: &mut S,
        thickness: f32,
        cap_first: EndCap,
        cap_last: EndCap,
        c: C,
        opacity: Opacity,
    ) {
        if !self.is_valid() {
            return;
        }
        let (mut a, mut more) = src.next_point();
        let mut first = true;
        while more {
            let (b, m) = src.next_point();
            more = m;
            let cap1 = if first { cap_first } else { EndCap::Straight };
            let cap2 = if more { EndCap::Rounded } else { cap_last };
            self.draw_wedge_line_aa(a, b, thickness, cap1, thickness, cap2, c, opacity);
            first = false;
            a = b;
        }
    }

    pub fn draw_thick_polyline_aa(
        &mut self,
        pts: &[PointF],
        thickness: f32,
        cap_first: EndCap,
        cap_last: EndCap,
        c: C,
        opacity: Opacity,
    ) {
        if pts.len() < 2 {
            return;
        }
        self.draw_thick_polyline_aa_from(&mut SlicePoints::new(pts), thickness, cap_first, cap_last, c, opacity);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{Rgb32, Rgbf};

    const W: i32 = 40;

    fn black() -> Vec<Rgbf> {
        vec![Rgbf::new(0.0, 0.0, 0.0); (W * W) as usize]
    }

    fn at(buf: &[Rgbf], x: i32, y: i32) -> f32 {
        buf[(y * W + x) as usize].r
    }

    fn white() -> Rgbf {
        Rgbf::new(1.0, 1.0, 1.0)
    }

    #[test]
    fn test_wedge_distance() {
        let ba = PointF::new(10.0, 0.0);
        assert!((wedge_distance(PointF::new(5.0, 3.0), ba, 0.0) - 3.0).abs() < 1e-5);
        assert!((wedge_distance(PointF::new(-4.0, 0.0), ba, 0.0) - 4.0).abs() < 1e-5);
        assert!((wedge_distance(PointF::new(13.0, 4.0), ba, 0.0) - 5.0).abs() < 1e-5);
        // radius shrinking by 2 along the segment
        assert!((wedge_distance(PointF::new(5.0, 3.0), ba, 2.0) - 4.0).abs() < 1e-5);
    }

    #[test]
    fn test_draw_line_endpoints() {
        let mut buf = vec![Rgb32::BLACK; (W * W) as usize];
        let mut cv = Canvas::new(&mut buf, W, W);
        cv.draw_line(PointI::new(2, 3), PointI::new(30, 17), Rgb32::RED, Opacity::Overwrite);
        assert_eq!(cv.read_pixel(PointI::new(2, 3)), Rgb32::RED);
        assert_eq!(cv.read_pixel(PointI::new(30, 17)), Rgb32::RED);
        assert_eq!(cv.read_pixel(PointI::new(16, 10)), Rgb32::RED);
    }

    #[test]
    fn test_draw_segment_skips_endpoints() {
        let mut buf = vec![Rgb32::BLACK; (W * W) as usize];
        let mut cv = Canvas::new(&mut buf, W, W);
        cv.draw_segment(PointI::new(2, 3), false, PointI::new(12, 3), false, Rgb32::RED, Opacity::Overwrite);
        assert_eq!(cv.read_pixel(PointI::new(2, 3)), Rgb32::BLACK);
        assert_eq!(cv.read_pixel(PointI::new(3, 3)), Rgb32::RED);
        assert_eq!(cv.read_pixel(PointI::new(11, 3)), Rgb32::RED);
        assert_eq!(cv.read_pixel(PointI::new(12, 3)), Rgb32::BLACK);
    }

    #[test]
    fn test_draw_line_offscreen() {
        let mut buf = vec![Rgb32::BLACK; (W * W) as usize];
        let mut cv = Canvas::new(&mut buf, W, W);
        cv.draw_line(PointI::new(-100, -5), PointI::new(-10, -50), Rgb32::RED, Opacity::Overwrite);
        cv.draw_line(PointI::new(-10, 5), PointI::new(100, 5), Rgb32::RED, Opacity::Overwrite);
        assert_eq!(cv.read_pixel(PointI::new(0, 5)), Rgb32::RED);
        assert_eq!(cv.read_pixel(PointI::new(W - 1, 5)), Rgb32::RED);
    }

    #[test]
    fn test_far_lines_are_clipped() {
        let far = 1 << 27;
        let mut buf = vec![Rgb32::BLACK; (W * W) as usize];
        {
            let mut cv = Canvas::new(&mut buf, W, W);
            cv.draw_line(PointI::new(-far, 5), PointI::new(far, 5), Rgb32::RED, Opacity::Overwrite);
            cv.draw_line(PointI::new(-far, -far), PointI::new(far, -far + 3), Rgb32::RED, Opacity::Overwrite);
            cv.draw_line(PointI::new(i32::MIN, 9), PointI::new(i32::MAX, 9), Rgb32::RED, Opacity::Overwrite);
        }
        for x in 0..W {
            assert_eq!(buf[(5 * W + x) as usize], Rgb32::RED, "x = {}", x);
            assert_eq!(buf[(9 * W + x) as usize], Rgb32::RED, "x = {}", x);
        }
        assert_eq!(buf.iter().filter(|&&p| p == Rgb32::RED).count(), 2 * W as usize);
    }

    #[test]
    fn test_far_aa_and_thick_lines() {
        let mut buf = black();
        {
            let mut cv = Canvas::new(&mut buf, W, W);
            cv.draw_line_aa(PointF::new(-1e7, 20.5), PointF::new(1e7, 20.5), white(), Opacity::OPAQUE);
            cv.draw_line_aa(PointF::new(3.0, 3.0), PointF::new(1e7, 1e7), white(), Opacity::OPAQUE);
            cv.draw_thick_line_aa(
                PointF::new(-1e7, 30.0),
                PointF::new(1e7, 30.0),
                4.0,
                EndCap::Rounded,
                EndCap::Arrow(2),
                white(),
                Opacity::OPAQUE,
            );
            cv.draw_line_aa(PointF::new(f32::NAN, 0.0), PointF::new(10.0, 10.0), white(), Opacity::OPAQUE);
        }
        assert!(at(&buf, 15, 20) > 0.4 && at(&buf, 15, 21) > 0.4);
        assert!(at(&buf, 20, 20) > 0.4);
        assert_eq!(at(&buf, 0, 30), 1.0);
        assert_eq!(at(&buf, W - 1, 30), 1.0);
        assert_eq!(at(&buf, 20, 34), 0.0);
    }

    #[test]
    fn test_draw_line_aa_symmetric_weights() {
        let mut buf = black();
        {
            let mut cv = Canvas::new(&mut buf, W, W);
            cv.draw_line_aa(PointF::new(2.0, 10.5), PointF::new(30.0, 10.5), white(), Opacity::OPAQUE);
        }
        let (up, down) = (at(&buf, 15, 10), at(&buf, 15, 11));
        assert!((up - down).abs() < 0.05, "{} {}", up, down);
        assert!(up + down > 0.95);
    }

    #[test]
    fn test_thick_line_straight() {
        let mut buf = black();
        {
            let mut cv = Canvas::new(&mut buf, W, W);
            cv.draw_thick_line_aa(
                PointF::new(5.0, 20.0),
                PointF::new(35.0, 20.0),
                6.0,
                EndCap::Straight,
                EndCap::Straight,
                white(),
                Opacity::OPAQUE,
            );
        }
        assert_eq!(at(&buf, 20, 20), 1.0);
        assert_eq!(at(&buf, 20, 18), 1.0);
        assert_eq!(at(&buf, 20, 25), 0.0);
        assert_eq!(at(&buf, 2, 20), 0.0);
    }

    #[test]
    fn test_thick_line_rounded_extends_past_ends() {
        let mut buf = black();
        {
            let mut cv = Canvas::new(&mut buf, W, W);
            cv.draw_thick_line_aa(
                PointF::new(10.0, 20.0),
                PointF::new(30.0, 20.0),
                8.0,
                EndCap::Rounded,
                EndCap::Rounded,
                white(),
                Opacity::OPAQUE,
            );
        }
        assert_eq!(at(&buf, 20, 20), 1.0);
        assert_eq!(at(&buf, 7, 20), 1.0);
        assert_eq!(at(&buf, 33, 20), 1.0);
        assert_eq!(at(&buf, 20, 26), 0.0);
        // corner of the bounding box is outside the disc
        assert_eq!(at(&buf, 6, 16), 0.0);
    }

    #[test]
    fn test_thick_line_mixed_caps() {
        let mut buf = black();
        {
            let mut cv = Canvas::new(&mut buf, W, W);
            cv.draw_thick_line_aa(
                PointF::new(10.0, 20.0),
                PointF::new(30.0, 20.0),
                8.0,
                EndCap::Straight,
                EndCap::Rounded,
                white(),
                Opacity::OPAQUE,
            );
        }
        assert_eq!(at(&buf, 7, 20), 0.0);
        assert_eq!(at(&buf, 11, 20), 1.0);
        assert_eq!(at(&buf, 33, 20), 1.0);
    }

    #[test]
    fn test_wedge_line_tapers() {
        let mut buf = black();
        {
            let mut cv = Canvas::new(&mut buf, W, W);
            cv.draw_wedge_line_aa(
                PointF::new(5.0, 20.0),
                PointF::new(35.0, 20.0),
                12.0,
                EndCap::Rounded,
                2.0,
                EndCap::Rounded,
                white(),
                Opacity::OPAQUE,
            );
        }
        assert_eq!(at(&buf, 8, 15), 1.0);
        assert_eq!(at(&buf, 32, 15), 0.0);
    }

    #[test]
    fn test_arrow_head() {
        let mut buf = black();
        {
            let mut cv = Canvas::new(&mut buf, W, W);
            cv.draw_thick_line_aa(
                PointF::new(4.0, 20.0),
                PointF::new(24.0, 20.0),
                2.0,
                EndCap::Straight,
                EndCap::Arrow(3),
                white(),
                Opacity::OPAQUE,
            );
        }
        // the head extends 6 pixels past the end and is 5 pixels wide
        assert!(at(&buf, 27, 20) > 0.9);
        assert!(at(&buf, 25, 21) > 0.9);
        assert_eq!(at(&buf, 33, 20), 0.0);
        assert_eq!(at(&buf, 20, 23), 0.0);
    }

    #[test]
    fn test_skewed_arrow_head() {
        let mut buf = black();
        {
            let mut cv = Canvas::new(&mut buf, W, W);
            cv.draw_thick_line_aa(
                PointF::new(4.0, 20.0),
                PointF::new(16.0, 20.0),
                4.0,
                EndCap::Straight,
                EndCap::SkewedArrow(4),
                white(),
                Opacity::OPAQUE,
            );
        }
        assert!(at(&buf, 26, 20) > 0.9);
        // barbs swept back behind the end point
        assert!(at(&buf, 12, 24) > 0.5);
        assert!(at(&buf, 12, 16) > 0.5);
        assert_eq!(at(&buf, 34, 20), 0.0);
    }

    #[test]
    fn test_thick_polyline() {
        let mut buf = black();
        {
            let mut cv = Canvas::new(&mut buf, W, W);
            let pts = [PointF::new(5.0, 5.0), PointF::new(30.0, 5.0), PointF::new(30.0, 30.0)];
            cv.draw_thick_polyline_aa(&pts, 4.0, EndCap::Straight, EndCap::Rounded, white(), Opacity::OPAQUE);
        }
        assert_eq!(at(&buf, 15, 5), 1.0);
        assert_eq!(at(&buf, 30, 5), 1.0);
        assert_eq!(at(&buf, 30, 20), 1.0);
        assert_eq!(at(&buf, 15, 20), 0.0);
    }
}
