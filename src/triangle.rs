//! Triangle and quad rasterization.
//!
//! A filled shape is drawn in two passes that never touch the same pixel:
//!
//! 1. the *interior*: for every row, the pixels strictly between the two
//!    Bresenham edges bounding the row;
//! 2. the *edges*: every edge pixel, through the seam-avoiding walkers of
//!    [`edge_aa`](crate::edge_aa). Outer edges carry anti-aliasing
//!    coverage, inner diagonals (shared by two triangles) are written once
//!    at full weight.
//!
//! Blending at partial opacity therefore produces a uniform result with no
//! darker seams along shared edges or vertices.

use crate::basics::{triangle_area2, PointF, PointI, RectF, RectI};
use crate::canvas::Canvas;
use crate::color::{Color, Opacity};
use crate::scan_stepper::{clamp_point, in_range, ScanStepper};

// ============================================================================
// Edges
// ============================================================================

/// The six oriented edges of a triangle. `seg(i, j)` walks from vertex `i`
/// to vertex `j`; `seg(j, i)` is its exact reverse.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Edges {
    pts: [PointF; 3],
    seg: [[ScanStepper; 3]; 3],
}

impl Edges {
    fn build(pts: [PointF; 3], make: impl Fn(usize, usize) -> ScanStepper) -> Self {
        let mut seg = [[ScanStepper::new(PointI::new(0, 0), PointI::new(0, 0)); 3]; 3];
        for (i, j) in [(0, 1), (0, 2), (1, 2)] {
            let s = make(i, j);
            seg[i][j] = s;
            seg[j][i] = s.reversed();
        }
        Self { pts, seg }
    }

    /// Edges with sub-pixel endpoints.
    pub(crate) fn new_f(p1: PointF, p2: PointF, p3: PointF) -> Self {
        let pts = [p1, p2, p3].map(clamp_point);
        Self::build(pts, |i, j| ScanStepper::new_f(pts[i], pts[j]))
    }

    /// Edges between pixel centres.
    pub(crate) fn new_i(p1: PointI, p2: PointI, p3: PointI) -> Self {
        let ip = [p1, p2, p3];
        Self::build(ip.map(|p| clamp_point(p.into())), |i, j| ScanStepper::new(ip[i], ip[j]))
    }

    #[inline]
    pub(crate) fn seg(&self, i: usize, j: usize) -> ScanStepper {
        self.seg[i][j]
    }
}

/// Orientation of the triangle as a coverage side: `1` clockwise on
/// screen, `-1` counter-clockwise, `0` when flat.
#[inline]
pub(crate) fn winding(p1: PointF, p2: PointF, p3: PointF) -> i32 {
    let a = triangle_area2(p1, p2, p3);
    if a > 0.0 {
        1
    } else if a < 0.0 {
        -1
    } else {
        0
    }
}

/// True when every vertex is within reach of the stepper. Filled shapes
/// with a farther vertex are dropped.
pub(crate) fn within_reach(pts: &[PointF], what: &str) -> bool {
    let ok = pts.iter().all(|&p| in_range(p));
    if !ok {
        log::debug!("{}: vertex out of range, nothing drawn", what);
    }
    ok
}

/// True when the four points form an axis-aligned rectangle.
fn is_box<T: Copy + PartialEq>(p: [(T, T); 4]) -> bool {
    let [(x1, y1), (x2, y2), (x3, y3), (x4, y4)] = p;
    (x1 == x2 && x3 == x4 && y2 == y3 && y1 == y4) || (x1 == x4 && x2 == x3 && y1 == y2 && y3 == y4)
}

impl<'a, C: Color> Canvas<'a, C> {
    // ------------------------------------------------------------------------
    // Interior spans
    // ------------------------------------------------------------------------

    /// Fill the rows strictly between `a` (left) and `b` (right) from row
    /// `y` (included) to `ytarget` (excluded), moving by `dir`.
    #[allow(clippy::too_many_arguments)]
    fn fill_angle_rows(
        &mut self,
        dir: i32,
        mut y: i32,
        mut ytarget: i32,
        mut a: ScanStepper,
        mut b: ScanStepper,
        c: C,
        op: i32,
    ) {
        let ly = self.height();
        if dir > 0 {
            ytarget = ytarget.min(ly);
            if ytarget <= 0 || y >= ytarget {
                return;
            }
            if y < 0 {
                a.advance_y_dir_by(-y);
                b.advance_y_dir_by(-y);
                y = 0;
            }
        } else {
            ytarget = ytarget.max(-1);
            if ytarget >= ly - 1 || y <= ytarget {
                return;
            }
            if y > ly - 1 {
                a.advance_y_dir_by(y - ly + 1);
                b.advance_y_dir_by(y - ly + 1);
                y = ly - 1;
            }
        }
        // An x-major edge covers several pixels per row: the span starts
        // after the last of them, reached by stepping to the next row first
        // when the edge runs toward the interior.
        let a_first = a.x_major() && a.step_x() > 0;
        let b_first = b.x_major() && b.step_x() < 0;
        while y != ytarget {
            if a_first {
                a.advance_y_dir();
            }
            if b_first {
                b.advance_y_dir();
            }
            let x1 = if a_first { a.x() } else { a.x() + 1 };
            let x2 = if b_first { b.x() } else { b.x() - 1 };
            if x1 <= x2 {
                self.hline_op(x1, x2, y, c, op);
            }
            if !a_first {
                a.advance_y_dir();
            }
            if !b_first {
                b.advance_y_dir();
            }
            y += dir;
        }
    }

    /// Fill the part of the angle at `p` (edges `seg1` toward `q1`, `seg2`
    /// toward `q2`) lying between row `p.y` and row `q1.y`.
    #[allow(clippy::too_many_arguments)]
    fn fill_interior_angle(
        &mut self,
        p: PointI,
        q1: PointI,
        q2: PointI,
        seg1: ScanStepper,
        seg2: ScanStepper,
        c: C,
        fill_last: bool,
        op: i32,
    ) {
        let dir = if p.y > q1.y { -1 } else { 1 };
        let ytarget = q1.y + if fill_last { dir } else { 0 };
        let lhs = (q1.x - p.x) as i64 * (q2.y - p.y).abs() as i64;
        let rhs = (q2.x - p.x) as i64 * (q1.y - p.y).abs() as i64;
        if lhs > rhs {
            self.fill_angle_rows(dir, p.y, ytarget, seg2, seg1, c, op);
        } else {
            self.fill_angle_rows(dir, p.y, ytarget, seg1, seg2, c, op);
        }
    }

    /// Fill the interior of a triangle, excluding its edge pixels.
    pub(crate) fn fill_triangle_interior(&mut self, e: &Edges, c: C, op: i32) {
        let mut o = [0usize, 1, 2];
        o.sort_by(|&i, &j| e.pts[i].y.total_cmp(&e.pts[j].y));
        let [u1, u2, u3] = o;
        let p1 = e.pts[u1].round();
        let p2 = e.pts[u2].round();
        let p3 = e.pts[u3].round();
        if p1.y == p3.y {
            return;
        }
        if p1.y == p2.y {
            self.fill_interior_angle(p3, p1, p2, e.seg(u3, u1), e.seg(u3, u2), c, false, op);
        } else if p2.y == p3.y {
            self.fill_interior_angle(p1, p2, p3, e.seg(u1, u2), e.seg(u1, u3), c, false, op);
        } else {
            // the middle row belongs to the half that sees it first
            let va = e.pts[u3] - e.pts[u1];
            let vb = e.pts[u2] - e.pts[u1];
            let det = va.x * vb.y - vb.x * va.y;
            let mut s23 = e.seg(u2, u3);
            let mut s21 = e.seg(u2, u1);
            s23.advance_y_dir();
            s21.advance_y_dir();
            let fl3 = if det < 0.0 { s23.x() < s21.x() } else { s23.x() > s21.x() };
            self.fill_interior_angle(p3, p2, p1, e.seg(u3, u2), e.seg(u3, u1), c, fl3, op);
            self.fill_interior_angle(p1, p2, p3, e.seg(u1, u2), e.seg(u1, u3), c, !fl3, op);
        }
    }

    /// Interior plus all three edges, each pixel written once.
    fn fill_triangle_edges(&mut self, e: &Edges, interior: C, outline: C, side: i32, op: i32) {
        self.fill_triangle_interior(e, interior, op);
        self.seg_draw(e.seg(0, 1), false, false, outline, side, op);
        self.seg_avoid1(e.seg(1, 2), e.seg(1, 0), true, false, true, outline, side, op);
        self.seg_avoid11(e.seg(2, 0), e.seg(2, 1), e.seg(0, 1), true, true, true, true, outline, side, op);
    }

    // ------------------------------------------------------------------------
    // Triangles
    // ------------------------------------------------------------------------

    /// Outline of a triangle with integer vertices.
    pub fn draw_triangle(&mut self, p1: PointI, p2: PointI, p3: PointI, c: C, opacity: Opacity) {
        if !self.is_valid() {
            return;
        }
        let op = opacity.op256();
        let near = [p1, p2, p3].iter().all(|&p| in_range(p.into()));
        if op < 0 || !near {
            // far outlines are clipped segment by segment
            self.segment_i(p1, true, p2, false, c, op);
            self.segment_i(p2, true, p3, false, c, op);
            self.segment_i(p3, true, p1, false, c, op);
            return;
        }
        let e = Edges::new_i(p1, p2, p3);
        self.seg_draw(e.seg(0, 1), false, false, c, 0, op);
        self.seg_avoid1(e.seg(1, 2), e.seg(1, 0), true, false, true, c, 0, op);
        self.seg_avoid11(e.seg(2, 0), e.seg(2, 1), e.seg(0, 1), true, true, true, true, c, 0, op);
    }

    /// Filled triangle with integer vertices; the edge pixels use
    /// `outline`.
    ///
    /// Each call writes every pixel once, but two triangles sharing an edge
    /// both write that edge: at partial opacity it is blended twice. Meshes
    /// that must stay seam-free use [`fill_triangle_aa`](Self::fill_triangle_aa)
    /// or [`draw_gradient_triangle`](Self::draw_gradient_triangle).
    pub fn fill_triangle(&mut self, p1: PointI, p2: PointI, p3: PointI, interior: C, outline: C, opacity: Opacity) {
        if !self.is_valid() {
            return;
        }
        if !within_reach(&[p1, p2, p3].map(PointF::from), "fill_triangle") {
            return;
        }
        let e = Edges::new_i(p1, p2, p3);
        self.fill_triangle_edges(&e, interior, outline, 0, opacity.op256());
    }

    /// Anti-aliased triangle outline.
    pub fn draw_triangle_aa(&mut self, p1: PointF, p2: PointF, p3: PointF, c: C, opacity: Opacity) {
        if !self.is_valid() {
            return;
        }
        let op = opacity.aa_op();
        self.segment_aa(p1, true, p2, false, c, op);
        self.segment_aa(p2, true, p3, false, c, op);
        self.segment_aa(p3, true, p1, false, c, op);
    }

    /// Anti-aliased filled triangle.
    pub fn fill_triangle_aa(&mut self, p1: PointF, p2: PointF, p3: PointF, c: C, opacity: Opacity) {
        if !self.is_valid() || !within_reach(&[p1, p2, p3], "fill_triangle_aa") {
            return;
        }
        let w = winding(p1, p2, p3);
        let e = Edges::new_f(p1, p2, p3);
        self.fill_triangle_edges(&e, c, c, w, opacity.aa_op());
    }

    /// Triangle outline of the given thickness, grown toward the inside.
    pub fn draw_thick_triangle_aa(&mut self, p1: PointF, p2: PointF, p3: PointF, thickness: f32, c: C, opacity: Opacity) {
        self.draw_thick_polygon_aa(&[p1, p2, p3], thickness, c, opacity);
    }

    /// Filled triangle with a border of the given thickness.
    #[allow(clippy::too_many_arguments)]
    pub fn fill_thick_triangle_aa(
        &mut self,
        p1: PointF,
        p2: PointF,
        p3: PointF,
        thickness: f32,
        interior: C,
        border: C,
        opacity: Opacity,
    ) {
        self.fill_thick_polygon_aa(&[p1, p2, p3], thickness, interior, border, opacity);
    }

    // ------------------------------------------------------------------------
    // Quads
    // ------------------------------------------------------------------------

    /// Filled quad (vertices in order around the contour, convex or
    /// star-shaped from `p1`).
    pub fn fill_quad(&mut self, p1: PointI, p2: PointI, p3: PointI, p4: PointI, c: C, opacity: Opacity) {
        if !self.is_valid() {
            return;
        }
        let op = opacity.op256();
        if is_box([(p1.x, p1.y), (p2.x, p2.y), (p3.x, p3.y), (p4.x, p4.y)]) {
            let b = RectI::new(p1.x.min(p3.x), p2.y.min(p4.y), p1.x.max(p3.x), p2.y.max(p4.y));
            self.fill_box_op(b, c, op);
            return;
        }
        if !within_reach(&[p1, p2, p3, p4].map(PointF::from), "fill_quad") {
            return;
        }
        let a = Edges::new_i(p1, p2, p3);
        let b = Edges::new_i(p1, p3, p4);
        self.fill_quad_edges(&a, &b, c, 0, op);
    }

    /// Shared body of the quad fillers: triangles `a = (P1, P2, P3)` and
    /// `b = (P1, P3, P4)`, outer edges with coverage `side`, diagonal once.
    fn fill_quad_edges(&mut self, a: &Edges, b: &Edges, c: C, side: i32, op: i32) {
        self.fill_triangle_interior(a, c, op);
        self.fill_triangle_interior(b, c, op);
        let s12 = a.seg(0, 1);
        let s21 = a.seg(1, 0);
        let s23 = a.seg(1, 2);
        let s32 = a.seg(2, 1);
        let s13 = a.seg(0, 2);
        let s34 = b.seg(1, 2);
        let s43 = b.seg(2, 1);
        let s41 = b.seg(2, 0);
        let s14 = b.seg(0, 2);
        self.seg_draw(s12, false, false, c, side, op);
        self.seg_draw(s34, false, false, c, side, op);
        self.seg_avoid11(s41, s43, s12, true, true, true, true, c, side, op);
        self.seg_avoid11(s23, s21, s34, true, true, true, true, c, side, op);
        self.seg_avoid22(s13, s12, s14, s32, s34, true, true, true, true, c, 0, op);
    }

    /// Anti-aliased filled quad.
    pub fn fill_quad_aa(&mut self, p1: PointF, p2: PointF, p3: PointF, p4: PointF, c: C, opacity: Opacity) {
        if !self.is_valid() {
            return;
        }
        if is_box([(p1.x, p1.y), (p2.x, p2.y), (p3.x, p3.y), (p4.x, p4.y)]) {
            let b = RectF::new(p1.x.min(p3.x), p2.y.min(p4.y), p1.x.max(p3.x), p2.y.max(p4.y));
            self.fill_rect_aa(b, c, opacity);
            return;
        }
        if !within_reach(&[p1, p2, p3, p4], "fill_quad_aa") {
            return;
        }
        let w = winding(p1, p2, p3);
        let a = Edges::new_f(p1, p2, p3);
        let b = Edges::new_f(p1, p3, p4);
        self.fill_quad_edges(&a, &b, c, w, opacity.aa_op());
    }

    /// Quad outline.
    pub fn draw_quad(&mut self, p1: PointI, p2: PointI, p3: PointI, p4: PointI, c: C, opacity: Opacity) {
        self.draw_polygon(&[p1, p2, p3, p4], c, opacity);
    }

    /// Anti-aliased quad outline.
    pub fn draw_quad_aa(&mut self, p1: PointF, p2: PointF, p3: PointF, p4: PointF, c: C, opacity: Opacity) {
        self.draw_polygon_aa(&[p1, p2, p3, p4], c, opacity);
    }

    /// Quad outline of the given thickness, grown toward the inside.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_thick_quad_aa(
        &mut self,
        p1: PointF,
        p2: PointF,
        p3: PointF,
        p4: PointF,
        thickness: f32,
        c: C,
        opacity: Opacity,
    ) {
        self.draw_thick_polygon_aa(&[p1, p2, p3, p4], thickness, c, opacity);
    }

    /// Filled quad with a border of the given thickness.
    #[allow(clippy::too_many_arguments)]
    pub fn fill_thick_quad_aa(
        &mut self,
        p1: PointF,
        p2: PointF,
        p3: PointF,
        p4: PointF,
        thickness: f32,
        interior: C,
        border: C,
        opacity: Opacity,
    ) {
        self.fill_thick_polygon_aa(&[p1, p2, p3, p4], thickness, interior, border, opacity);
    }
}

// ============================================================================
// Tests
// ============================================================================
