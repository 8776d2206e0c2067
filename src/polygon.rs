//! Polygons and polylines.
//!
//! Vertices come from a [`PointSource`], a rewindable sequence of points,
//! so that shapes generated on the fly (regular polygons, curves) can be
//! drawn without first storing their vertices. Slices are adapted through
//! [`SlicePoints`]; every `*_from` method has a slice counterpart.
//!
//! Filled polygons are drawn as a fan of triangles around the vertex
//! centroid: the polygon must be star-shaped with respect to that point.
//! Other inputs are drawn, but the result is unspecified.

use crate::basics::{line_intersection, triangle_area2, PointF, PointI};
use crate::canvas::Canvas;
use crate::color::{Color, Opacity};
use crate::scan_stepper::{in_range, ScanStepper};
use crate::triangle::Edges;

// ============================================================================
// PointSource
// ============================================================================

/// A rewindable sequence of points.
///
/// `next_point` returns the next point and whether more points follow.
/// After the last point (flag `false`) the source must start over from the
/// first point, since filling consumes the sequence twice. A source yields
/// at least one point.
pub trait PointSource {
    fn next_point(&mut self) -> (PointF, bool);
}

impl<F: FnMut() -> (PointF, bool)> PointSource for F {
    #[inline]
    fn next_point(&mut self) -> (PointF, bool) {
        self()
    }
}

/// [`PointSource`] over a slice of points.
#[derive(Debug, Clone)]
pub struct SlicePoints<'a, P> {
    pts: &'a [P],
    idx: usize,
}

impl<'a, P: Copy + Into<PointF>> SlicePoints<'a, P> {
    pub fn new(pts: &'a [P]) -> Self {
        Self { pts, idx: 0 }
    }

    pub fn len(&self) -> usize {
        self.pts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pts.is_empty()
    }
}

impl<'a, P: Copy + Into<PointF>> PointSource for SlicePoints<'a, P> {
    fn next_point(&mut self) -> (PointF, bool) {
        let p = self.pts.get(self.idx).map(|&p| p.into()).unwrap_or_default();
        self.idx += 1;
        if self.idx >= self.pts.len() {
            self.idx = 0;
            (p, false)
        } else {
            (p, true)
        }
    }
}

/// Snaps the points of a source to the pixel grid.
struct Rounded<'s, S: ?Sized>(&'s mut S);

impl<'s, S: PointSource + ?Sized> PointSource for Rounded<'s, S> {
    fn next_point(&mut self) -> (PointF, bool) {
        let (p, more) = self.0.next_point();
        (p.round().into(), more)
    }
}

/// Vertex of the polygon shifted inward by `offset` along both adjacent
/// edges. Collinear neighbours fall back to the plain edge offset.
fn inner_vertex(p0: PointF, p1: PointF, p2: PointF, offset: f32) -> PointF {
    let h0 = (p1 - p0).perp().normalized() * offset;
    let h1 = (p2 - p1).perp().normalized() * offset;
    line_intersection(p0 + h0, p1 + h0, p1 + h1, p2 + h1).unwrap_or(p1 + h1)
}

/// Walk a source forward so that it sits on its first point again after
/// `pulled` points were read from a cycle of `n`.
fn skip_to_start<S: PointSource + ?Sized>(src: &mut S, pulled: usize, n: usize) {
    let mut k = pulled % n;
    while k != 0 {
        src.next_point();
        k = (k + 1) % n;
    }
}

/// The inner boundary of a thick polygon outline, as a point source.
/// Starts at the inset of the second vertex.
struct Inset<'s, S: ?Sized> {
    src: &'s mut S,
    n: usize,
    offset: f32,
    prev: PointF,
    cur: PointF,
    produced: usize,
    pulled: usize,
}

impl<'s, S: PointSource + ?Sized> Inset<'s, S> {
    fn new(src: &'s mut S, n: usize, offset: f32) -> Self {
        let mut s = Self {
            src,
            n,
            offset,
            prev: PointF::default(),
            cur: PointF::default(),
            produced: 0,
            pulled: 0,
        };
        s.prime();
        s
    }

    fn pull(&mut self) -> PointF {
        self.pulled += 1;
        self.src.next_point().0
    }

    fn prime(&mut self) {
        self.prev = self.pull();
        self.cur = self.pull();
        self.produced = 0;
    }
}

impl<'s, S: PointSource + ?Sized> PointSource for Inset<'s, S> {
    fn next_point(&mut self) -> (PointF, bool) {
        let next = self.pull();
        let p = inner_vertex(self.prev, self.cur, next, self.offset);
        self.prev = self.cur;
        self.cur = next;
        self.produced += 1;
        if self.produced < self.n {
            return (p, true);
        }
        skip_to_start(self.src, self.pulled, self.n);
        self.pulled = 0;
        self.prime();
        (p, false)
    }
}

// ============================================================================
// Survey pass
// ============================================================================

/// What one pass over a closed point sequence tells about the polygon.
#[derive(Debug, Clone, Copy, Default)]
struct Survey {
    n: usize,
    /// Mean of the vertices.
    centroid: PointF,
    /// Twice the signed area; positive for a clockwise contour on screen.
    area2: f32,
    /// Twice the area of the first non-flat triple of consecutive vertices.
    turn: f32,
    /// Every vertex is within reach of the stepper.
    near: bool,
}

fn survey<S: PointSource + ?Sized>(src: &mut S) -> Survey {
    let (first, mut more) = src.next_point();
    let mut sum = first;
    let mut s = Survey {
        n: 1,
        near: in_range(first),
        ..Survey::default()
    };
    let mut prev2: Option<PointF> = None;
    let mut prev = first;
    while more {
        let (p, m) = src.next_point();
        more = m;
        s.n += 1;
        s.near &= in_range(p);
        sum = sum + p;
        s.area2 += triangle_area2(first, prev, p);
        if let Some(q) = prev2 {
            if s.turn == 0.0 {
                s.turn = triangle_area2(q, prev, p);
            }
        }
        prev2 = Some(prev);
        prev = p;
    }
    s.centroid = sum * (1.0 / s.n as f32);
    s
}

#[inline]
fn sign(v: f32) -> i32 {
    if v > 0.0 {
        1
    } else if v < 0.0 {
        -1
    } else {
        0
    }
}

impl<'a, C: Color> Canvas<'a, C> {
    // ------------------------------------------------------------------------
    // Shared walkers
    // ------------------------------------------------------------------------

    /// Closed outline of `n >= 3` vertices, every pixel written once.
    fn outline_ring<S: PointSource + ?Sized>(&mut self, src: &mut S, n: usize, c: C, side: i32, op: i32) {
        let (p0, _) = src.next_point();
        let (p1, _) = src.next_point();
        let e0 = ScanStepper::new_f(p0, p1);
        self.seg_draw(e0, false, false, c, side, op);
        let mut prev = e0;
        let mut a = p1;
        for i in 1..n {
            let last = i + 1 == n;
            let b = if last { p0 } else { src.next_point().0 };
            let e = ScanStepper::new_f(a, b);
            if last {
                self.seg_avoid11(e, prev.reversed(), e0, true, true, true, true, c, side, op);
            } else {
                self.seg_avoid1(e, prev.reversed(), true, false, true, c, side, op);
            }
            prev = e;
            a = b;
        }
    }

    /// Fan fill around `sv.centroid`. Outer edges get coverage `side`, the
    /// spokes to the centre are written once at full weight.
    fn fill_fan<S: PointSource + ?Sized>(&mut self, src: &mut S, sv: &Survey, c: C, side: i32, op: i32) {
        let n = sv.n;
        let ctr = sv.centroid;
        let (p0, _) = src.next_point();
        let (p1, _) = src.next_point();
        let e0 = ScanStepper::new_f(p0, p1);
        self.fill_triangle_interior(&Edges::new_f(ctr, p0, p1), c, op);
        self.seg_draw(e0, false, false, c, side, op);

        let mut prev = e0;
        let mut first_spoke: Option<ScanStepper> = None;
        let mut prev_spoke: Option<ScanStepper> = None;
        let mut b = p1;
        for i in 1..n {
            let last = i + 1 == n;
            let nxt = if last { p0 } else { src.next_point().0 };
            self.fill_triangle_interior(&Edges::new_f(ctr, b, nxt), c, op);
            let e = ScanStepper::new_f(b, nxt);
            if last {
                self.seg_avoid11(e, prev.reversed(), e0, true, true, true, true, c, side, op);
            } else {
                self.seg_avoid1(e, prev.reversed(), true, false, true, c, side, op);
            }
            let spoke = ScanStepper::new_f(b, ctr);
            match prev_spoke {
                None => {
                    self.seg_avoid2(spoke, prev.reversed(), e, true, true, true, c, 0, op);
                    first_spoke = Some(spoke.reversed());
                }
                Some(sp) => self.seg_avoid21(spoke, prev.reversed(), e, sp, true, true, true, c, 0, op),
            }
            prev_spoke = Some(spoke.reversed());
            prev = e;
            b = nxt;
        }
        if let (Some(sp), Some(sf)) = (prev_spoke, first_spoke) {
            let spoke = ScanStepper::new_f(p0, ctr);
            self.seg_avoid22(spoke, prev.reversed(), e0, sp, sf, true, true, true, true, c, 0, op);
        }
    }

    // ------------------------------------------------------------------------
    // Polylines
    // ------------------------------------------------------------------------

    /// Connected segments through the points of `src` (not closed).
    pub fn draw_polyline_from<S: PointSource + ?Sized>(&mut self, src: &mut S, c: C, opacity: Opacity) {
        if !self.is_valid() {
            return;
        }
        let op = opacity.op256();
        let mut src = Rounded(src);
        let (mut a, mut more) = src.next_point();
        if !more {
            self.put_checked(a.x as i32, a.y as i32, c, op);
        }
        while more {
            let (b, m) = src.next_point();
            more = m;
            self.segment_f(a, true, b, !more, c, op);
            a = b;
        }
    }

    pub fn draw_polyline(&mut self, pts: &[PointI], c: C, opacity: Opacity) {
        if pts.is_empty() {
            return;
        }
        self.draw_polyline_from(&mut SlicePoints::new(pts), c, opacity);
    }

    /// Anti-aliased polyline.
    pub fn draw_polyline_aa_from<S: PointSource + ?Sized>(&mut self, src: &mut S, c: C, opacity: Opacity) {
        if !self.is_valid() {
            return;
        }
        let op = opacity.aa_op();
        let (mut a, mut more) = src.next_point();
        while more {
            let (b, m) = src.next_point();
            more = m;
            self.segment_aa(a, true, b, !more, c, op);
            a = b;
        }
    }

    pub fn draw_polyline_aa(&mut self, pts: &[PointF], c: C, opacity: Opacity) {
        if pts.len() < 2 {
            return;
        }
        self.draw_polyline_aa_from(&mut SlicePoints::new(pts), c, opacity);
    }

    // ------------------------------------------------------------------------
    // Polygon outlines
    // ------------------------------------------------------------------------

    /// Closed polygon outline.
    pub fn draw_polygon_from<S: PointSource + ?Sized>(&mut self, src: &mut S, c: C, opacity: Opacity) {
        if !self.is_valid() {
            return;
        }
        let op = opacity.op256();
        let sv = survey(src);
        let n = sv.n;
        let mut src = Rounded(src);
        if n < 3 {
            // a point or a single segment
            self.draw_polyline_from(&mut src, c, opacity);
            return;
        }
        if op >= 0 && sv.near {
            self.outline_ring(&mut src, n, c, 0, op);
            return;
        }
        let (p0, _) = src.next_point();
        let mut a = p0;
        for i in 0..n {
            let b = if i + 1 == n { p0 } else { src.next_point().0 };
            self.segment_f(a, true, b, false, c, op);
            a = b;
        }
    }

    pub fn draw_polygon(&mut self, pts: &[PointI], c: C, opacity: Opacity) {
        if pts.is_empty() {
            return;
        }
        self.draw_polygon_from(&mut SlicePoints::new(pts), c, opacity);
    }

    /// Anti-aliased closed polygon outline.
    pub fn draw_polygon_aa_from<S: PointSource + ?Sized>(&mut self, src: &mut S, c: C, opacity: Opacity) {
        if !self.is_valid() {
            return;
        }
        let op = opacity.aa_op();
        let (p0, mut more) = src.next_point();
        let mut a = p0;
        while more {
            let (b, m) = src.next_point();
            more = m;
            self.segment_aa(a, true, b, false, c, op);
            a = b;
        }
        self.segment_aa(a, true, p0, false, c, op);
    }

    pub fn draw_polygon_aa(&mut self, pts: &[PointF], c: C, opacity: Opacity) {
        if pts.len() < 2 {
            return;
        }
        self.draw_polygon_aa_from(&mut SlicePoints::new(pts), c, opacity);
    }

    // ------------------------------------------------------------------------
    // Filled polygons
    // ------------------------------------------------------------------------

    /// Filled polygon with vertices snapped to the pixel grid.
    pub fn fill_polygon_from<S: PointSource + ?Sized>(&mut self, src: &mut S, c: C, opacity: Opacity) {
        if !self.is_valid() {
            return;
        }
        let mut src = Rounded(src);
        let sv = survey(&mut src);
        if sv.n < 3 || sv.area2 == 0.0 {
            log::debug!("fill_polygon: degenerate polygon ({} vertices)", sv.n);
            return;
        }
        if !sv.near {
            log::debug!("fill_polygon: vertex out of range, nothing drawn");
            return;
        }
        self.fill_fan(&mut src, &sv, c, 0, opacity.op256());
    }

    pub fn fill_polygon(&mut self, pts: &[PointI], c: C, opacity: Opacity) {
        if pts.is_empty() {
            return;
        }
        self.fill_polygon_from(&mut SlicePoints::new(pts), c, opacity);
    }

    /// Anti-aliased filled polygon.
    pub fn fill_polygon_aa_from<S: PointSource + ?Sized>(&mut self, src: &mut S, c: C, opacity: Opacity) {
        if !self.is_valid() {
            return;
        }
        let sv = survey(src);
        let w = sign(sv.area2);
        if sv.n < 3 || w == 0 {
            log::debug!("fill_polygon_aa: degenerate polygon ({} vertices)", sv.n);
            return;
        }
        if !sv.near {
            log::debug!("fill_polygon_aa: vertex out of range, nothing drawn");
            return;
        }
        self.fill_fan(src, &sv, c, w, opacity.aa_op());
    }

    pub fn fill_polygon_aa(&mut self, pts: &[PointF], c: C, opacity: Opacity) {
        if pts.is_empty() {
            return;
        }
        self.fill_polygon_aa_from(&mut SlicePoints::new(pts), c, opacity);
    }

    // ------------------------------------------------------------------------
    // Thick outlines
    // ------------------------------------------------------------------------

    /// Band between the contour and its inset at distance `offset`, where
    /// the sign of `offset` points inward and `side` is the coverage side
    /// of the outer contour.
    fn thick_band<S: PointSource + ?Sized>(&mut self, src: &mut S, n: usize, offset: f32, side: i32, c: C, op: i32) {
        let mut pulled = 4;
        let mut p0 = src.next_point().0;
        let mut p1 = src.next_point().0;
        let mut p2 = src.next_point().0;
        let mut p3 = src.next_point().0;
        let mut i1 = inner_vertex(p0, p1, p2, offset);
        let mut i2 = inner_vertex(p1, p2, p3, offset);
        for _ in 0..n {
            p0 = p1;
            p1 = p2;
            p2 = p3;
            p3 = src.next_point().0;
            pulled += 1;
            let i0 = i1;
            i1 = i2;
            i2 = inner_vertex(p1, p2, p3, offset);

            let p0p1 = ScanStepper::new_f(p0, p1);
            let p1p0 = p0p1.reversed();
            let p1i1 = ScanStepper::new_f(p1, i1);
            let i1i0 = ScanStepper::new_f(i1, i0);
            let i0i1 = i1i0.reversed();
            let i0p0 = ScanStepper::new_f(i0, p0);
            let i0p1 = ScanStepper::new_f(i0, p1);
            let p1p2 = ScanStepper::new_f(p1, p2);
            let i1i2 = ScanStepper::new_f(i1, i2);
            self.fill_triangle_interior(&Edges::new_f(i0, p0, p1), c, op);
            self.fill_triangle_interior(&Edges::new_f(i0, p1, i1), c, op);
            self.seg_avoid1(p1p0, p1p2, true, false, true, c, side, op);
            self.seg_avoid1(i1i0, i1i2, true, false, true, c, -side, op);
            self.seg_avoid22(p1i1, p1p0, p1p2, i1i0, i1i2, true, true, true, true, c, 0, op);
            self.seg_avoid22(i0p1, i0p0, i0i1, p1p0, p1i1, true, true, true, true, c, 0, op);
        }
        skip_to_start(src, pulled, n);
    }

    /// Inward offset and outer coverage side for a contour of the given
    /// turn, `None` when the contour is flat.
    fn band_params(sv: &Survey, thickness: f32) -> Option<(f32, i32)> {
        if sv.turn < 0.0 {
            Some((-thickness, 1))
        } else if sv.turn > 0.0 {
            Some((thickness, -1))
        } else {
            None
        }
    }

    /// Polygon outline of the given thickness, grown toward the inside of
    /// the contour.
    pub fn draw_thick_polygon_aa_from<S: PointSource + ?Sized>(
        &mut self,
        src: &mut S,
        thickness: f32,
        c: C,
        opacity: Opacity,
    ) {
        if !self.is_valid() || thickness <= 0.0 {
            return;
        }
        let sv = survey(src);
        if sv.n < 3 || !sv.near {
            log::debug!("draw_thick_polygon_aa: {} vertices, all in range: {}", sv.n, sv.near);
            return;
        }
        if let Some((offset, side)) = Self::band_params(&sv, thickness) {
            self.thick_band(src, sv.n, offset, side, c, opacity.aa_op());
        }
    }

    pub fn draw_thick_polygon_aa(&mut self, pts: &[PointF], thickness: f32, c: C, opacity: Opacity) {
        if pts.len() < 3 {
            return;
        }
        self.draw_thick_polygon_aa_from(&mut SlicePoints::new(pts), thickness, c, opacity);
    }

    /// Filled polygon with a border of the given thickness drawn inside the
    /// contour.
    pub fn fill_thick_polygon_aa_from<S: PointSource + ?Sized>(
        &mut self,
        src: &mut S,
        thickness: f32,
        interior: C,
        border: C,
        opacity: Opacity,
    ) {
        if !self.is_valid() {
            return;
        }
        if thickness <= 0.0 {
            self.fill_polygon_aa_from(src, interior, opacity);
            return;
        }
        let sv = survey(src);
        let Some((offset, side)) = Self::band_params(&sv, thickness) else {
            return;
        };
        if sv.n < 3 || !sv.near {
            log::debug!("fill_thick_polygon_aa: {} vertices, all in range: {}", sv.n, sv.near);
            return;
        }
        let op = opacity.aa_op();
        let mut inset = Inset::new(&mut *src, sv.n, offset);
        let isv = survey(&mut inset);
        let w = sign(isv.area2);
        if w != 0 {
            self.fill_fan(&mut inset, &isv, interior, w, op);
        }
        drop(inset);
        self.thick_band(src, sv.n, offset, side, border, op);
    }

    #[allow(clippy::too_many_arguments)]
    pub fn fill_thick_polygon_aa(&mut self, pts: &[PointF], thickness: f32, interior: C, border: C, opacity: Opacity) {
        if pts.len() < 3 {
            return;
        }
        self.fill_thick_polygon_aa_from(&mut SlicePoints::new(pts), thickness, interior, border, opacity);
    }
}

// ============================================================================
// Tests
// ============================================================================
