//! Circles, ellipses, arcs and pies.
//!
//! The integer variants are the classic midpoint algorithms. Every
//! anti-aliased round shape is described by a signed distance function
//! (negative inside) and rendered one quadrant at a time by
//! [`Canvas::shape_quadrant`]: each quadrant walks its rows from the centre
//! outwards and its columns from the outside in, skips the outer margin,
//! and either stops at the hole of an outline or fills the remaining span
//! in one go. The centre row and column belong to exactly one quadrant so
//! that no pixel is composited twice.
//!
//! Arcs and sectors restrict a circle to the angular wedge between two
//! half-planes through the centre.

use crate::basics::{deg2rad, iceil, ifloor, iround, PointF, PointI, RectI, PI};
use crate::canvas::Canvas;
use crate::color::{Color, Opacity};
use crate::scan_stepper::{in_range, COORD_LIMIT};

/// Extra margin (in pixels) around a shape's nominal extent scanned by the
/// quadrant walker.
const MARGIN: f32 = 1.5;

// ============================================================================
// Quadrant
// ============================================================================

/// One quarter of a shape: walking directions and ownership of the centre
/// column (`vline`) and centre row (`hline`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Quadrant {
    dir_x: i32,
    dir_y: i32,
    vline: bool,
    hline: bool,
}

impl Quadrant {
    /// Quadrant `q`: bit 0 set walks right-to-left (right half), bit 1 set
    /// walks upwards (top half).
    pub(crate) const fn new(q: u8, vline: bool, hline: bool) -> Self {
        Self {
            dir_x: if q & 1 != 0 { -1 } else { 1 },
            dir_y: if q & 2 != 0 { -1 } else { 1 },
            vline,
            hline,
        }
    }

    /// The four quadrants of a full shape, centre lines split so that each
    /// is owned once.
    pub(crate) const ALL: [Quadrant; 4] = [
        Quadrant::new(0, true, true),
        Quadrant::new(1, false, true),
        Quadrant::new(2, true, false),
        Quadrant::new(3, false, false),
    ];
}

// ============================================================================
// Ring
// ============================================================================

/// How a signed distance turns into color and coverage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Ring<C> {
    /// Solid shape, boundary at distance 0.
    Fill(C),
    /// One pixel wide outline centred on the boundary.
    Outline(C),
    /// Outline grown inwards to the given thickness.
    Thick(C, f32),
    /// Solid shape whose outer band of the given thickness uses `border`.
    FillThick { interior: C, border: C, thickness: f32 },
}

enum Class<C> {
    /// Beyond the outer edge, on the walking side.
    Outside,
    /// Inside the hole of an outline: nothing left on this row.
    Hole,
    /// Fully covered, and so is everything up to the centre column.
    Solid(C),
    Edge,
}

impl<C: Color> Ring<C> {
    fn classify(&self, sd: f32) -> Class<C> {
        match *self {
            Ring::Fill(c) => {
                if sd >= 0.5 {
                    Class::Outside
                } else if sd <= -0.5 {
                    Class::Solid(c)
                } else {
                    Class::Edge
                }
            }
            Ring::Outline(_) => {
                if sd >= 1.0 {
                    Class::Outside
                } else if sd <= -1.0 {
                    Class::Hole
                } else {
                    Class::Edge
                }
            }
            Ring::Thick(_, t) => {
                if sd >= 1.0 {
                    Class::Outside
                } else if sd + t <= 0.0 {
                    Class::Hole
                } else {
                    Class::Edge
                }
            }
            Ring::FillThick { interior, thickness, .. } => {
                if sd >= 0.5 {
                    Class::Outside
                } else if sd + thickness <= -0.5 {
                    Class::Solid(interior)
                } else {
                    Class::Edge
                }
            }
        }
    }

    /// Color and coverage (unclamped) at signed distance `sd`.
    fn shade(&self, sd: f32) -> (C, f32) {
        match *self {
            Ring::Fill(c) => (c, 0.5 - sd),
            Ring::Outline(c) => (c, 1.0 - sd.abs()),
            Ring::Thick(c, t) => {
                let outer = if sd > 0.0 { 1.0 - sd } else { 1.0 };
                let inner = (sd + t).min(1.0);
                (c, outer * inner)
            }
            Ring::FillThick { interior, border, thickness } => {
                let w = (sd + thickness + 0.5).clamp(0.0, 1.0);
                (C::lerp256(interior, border, (w * 256.0) as u32), 0.5 - sd)
            }
        }
    }

    fn is_solid(&self) -> bool {
        matches!(self, Ring::Fill(_) | Ring::FillThick { .. })
    }
}

// ============================================================================
// Wedge
// ============================================================================

/// Angular range swept clockwise from a start angle to an end angle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Sweep {
    Empty,
    Full,
    Wedge(Wedge),
}

/// Two half-planes through the centre: their intersection when the sweep
/// is at most a half turn, their union otherwise.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Wedge {
    n1: PointF,
    n2: PointF,
    union: bool,
}

impl Sweep {
    /// Angles in degrees, 0 at 12 o'clock, increasing clockwise.
    pub(crate) fn new(start: f32, end: f32) -> Self {
        let span = (end - start).rem_euclid(360.0);
        if span == 0.0 {
            return if end == start { Sweep::Empty } else { Sweep::Full };
        }
        let (a1, a2) = (deg2rad(start), deg2rad(end));
        Sweep::Wedge(Wedge {
            n1: PointF::new(a1.cos(), a1.sin()),
            n2: PointF::new(-a2.cos(), -a2.sin()),
            union: span > 180.0,
        })
    }
}

impl Wedge {
    /// Signed distance to the wedge (negative inside).
    #[inline]
    fn sd(&self, p: PointF) -> f32 {
        let (h1, h2) = (p.dot(self.n1), p.dot(self.n2));
        if self.union {
            -h1.max(h2)
        } else {
            -h1.min(h2)
        }
    }

    #[inline]
    fn coverage(&self, p: PointF) -> f32 {
        (0.5 - self.sd(p)).clamp(0.0, 1.0)
    }
}

// ============================================================================
// Distance functions
// ============================================================================

#[inline]
pub(crate) fn circle_sd(p: PointF, r: f32) -> f32 {
    p.norm() - r
}

/// Algebraic distance divided by its gradient norm: exact on the boundary,
/// good enough within a pixel of it.
#[inline]
pub(crate) fn ellipse_sd(p: PointF, rx: f32, ry: f32) -> f32 {
    let (ix2, iy2) = (1.0 / (rx * rx), 1.0 / (ry * ry));
    let e = p.x * p.x * ix2 + p.y * p.y * iy2 - 1.0;
    let g = 2.0 * ((p.x * ix2) * (p.x * ix2) + (p.y * iy2) * (p.y * iy2)).sqrt();
    if g < 1e-6 {
        -rx.min(ry)
    } else {
        e / g
    }
}

/// Box of half extents `ext` with corners rounded by `r`.
#[inline]
pub(crate) fn round_box_sd(p: PointF, ext: PointF, r: f32) -> f32 {
    let qx = p.x.abs() - (ext.x - r);
    let qy = p.y.abs() - (ext.y - r);
    let outside = PointF::new(qx.max(0.0), qy.max(0.0)).norm();
    outside + qx.max(qy).min(0.0) - r
}

impl<'a, C: Color> Canvas<'a, C> {
    // ------------------------------------------------------------------------
    // Shape walker
    // ------------------------------------------------------------------------

    /// Render one quadrant of the shape centred at `ctr` with half extents
    /// `ext` and signed distance `sd` (relative to the centre).
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn shape_quadrant<S: Fn(PointF) -> f32>(
        &mut self,
        ctr: PointF,
        ext: PointF,
        quad: Quadrant,
        ring: &Ring<C>,
        gate: Option<&Wedge>,
        op: i32,
        sd: &S,
    ) {
        let (cx, cy) = (iround(ctr.x), iround(ctr.y));
        let own_v = if quad.vline { 0 } else { 1 };
        let own_h = if quad.hline { 0 } else { 1 };
        let mut b = RectI::new(
            if quad.dir_x > 0 { ifloor(ctr.x - ext.x - MARGIN) } else { cx + own_v },
            if quad.dir_y > 0 { cy + own_h } else { ifloor(ctr.y - ext.y - MARGIN) },
            if quad.dir_x > 0 { cx - own_v } else { iceil(ctr.x + ext.x + MARGIN) },
            if quad.dir_y > 0 { iceil(ctr.y + ext.y + MARGIN) } else { cy - own_h },
        );
        if !b.is_valid() || !b.clip(&self.image_box()) {
            return;
        }
        let (x_outer, x_inner) = if quad.dir_x > 0 { (b.x1, b.x2) } else { (b.x2, b.x1) };
        let y_start = if quad.dir_y > 0 { b.y1 } else { b.y2 };
        let mut i_min = x_outer;
        for k in 0..b.height() {
            let j = y_start + k * quad.dir_y;
            let dy = j as f32 - ctr.y;
            let mut i = i_min;
            while (x_inner - i) * quad.dir_x >= 0 {
                let p = PointF::new(i as f32 - ctr.x, dy);
                let d = sd(p);
                match ring.classify(d) {
                    Class::Outside => {
                        i_min = i + quad.dir_x;
                        i += quad.dir_x;
                        continue;
                    }
                    Class::Hole => break,
                    Class::Solid(c) if gate.is_none() => {
                        self.hline_op(i, x_inner, j, c, op);
                        break;
                    }
                    _ => {}
                }
                let (c, alpha) = match gate {
                    None => ring.shade(d),
                    Some(w) if ring.is_solid() => ring.shade(d.max(w.sd(p))),
                    Some(w) => {
                        let (c, a) = ring.shade(d);
                        (c, a * w.coverage(p))
                    }
                };
                if alpha > 0.0 {
                    self.put_aa(i, j, c, (alpha.min(1.0) * 256.0) as i32, op);
                }
                i += quad.dir_x;
            }
        }
    }

    /// All four quadrants of a shape.
    pub(crate) fn shape<S: Fn(PointF) -> f32>(
        &mut self,
        ctr: PointF,
        ext: PointF,
        ring: Ring<C>,
        gate: Option<&Wedge>,
        op: i32,
        sd: S,
    ) {
        for quad in Quadrant::ALL {
            self.shape_quadrant(ctr, ext, quad, &ring, gate, op, &sd);
        }
    }

    fn circle_shape(&mut self, ctr: PointF, r: f32, ring: Ring<C>, sweep: Sweep, op: i32) {
        let gate = match sweep {
            Sweep::Empty => return,
            Sweep::Full => None,
            Sweep::Wedge(w) => Some(w),
        };
        self.shape(ctr, PointF::new(r, r), ring, gate.as_ref(), op, |p| circle_sd(p, r));
    }

    // ------------------------------------------------------------------------
    // Integer circles and ellipses
    // ------------------------------------------------------------------------

    fn midpoint_circle<const OUTLINE: bool, const FILL: bool>(&mut self, m: PointI, r: i32, outline: C, interior: C, op: i32) {
        if r < 0 || !self.is_valid() {
            return;
        }
        if r > COORD_LIMIT || !in_range(m.into()) {
            log::debug!("circle at {:?} radius {} out of range", m, r);
            return;
        }
        let (xm, ym) = (m.x, m.y);
        if r > 2 && (xm + r < 0 || xm - r >= self.width() || ym + r < 0 || ym - r >= self.height()) {
            return;
        }
        match r {
            0 => {
                let c = if OUTLINE { outline } else { interior };
                self.put_checked(xm, ym, c, op);
                return;
            }
            1 => {
                if FILL {
                    self.put_checked(xm, ym, interior, op);
                }
                self.put_checked(xm + 1, ym, outline, op);
                self.put_checked(xm - 1, ym, outline, op);
                self.put_checked(xm, ym - 1, outline, op);
                self.put_checked(xm, ym + 1, outline, op);
                return;
            }
            _ => {}
        }
        let (mut x, mut y, mut err) = (-r, 0, 2 - 2 * r);
        loop {
            if OUTLINE {
                self.put_checked(xm - x, ym + y, outline, op);
                self.put_checked(xm - y, ym - x, outline, op);
                self.put_checked(xm + x, ym - y, outline, op);
                self.put_checked(xm + y, ym + x, outline, op);
            }
            let e = err;
            if e <= y {
                if FILL {
                    self.run_op(xm, ym + y, -x, interior, op);
                    self.run_op(xm + x + 1, ym - y, -x - 1, interior, op);
                }
                y += 1;
                err += y * 2 + 1;
            }
            if e > x || err > y {
                x += 1;
                err += x * 2 + 1;
                if FILL && x != 0 {
                    self.run_op(xm - y + 1, ym - x, y - 1, interior, op);
                    self.run_op(xm, ym + x, y, interior, op);
                }
            }
            if x >= 0 {
                break;
            }
        }
    }

    /// Row run of `len` pixels from `x`; nothing when `len <= 0`.
    #[inline]
    pub(crate) fn run_op(&mut self, x: i32, y: i32, len: i32, c: C, op: i32) {
        if len > 0 {
            self.hline_op(x, x + len - 1, y, c, op);
        }
    }

    /// Midpoint circle outline.
    pub fn draw_circle(&mut self, center: PointI, r: i32, c: C, opacity: Opacity) {
        self.midpoint_circle::<true, false>(center, r, c, c, opacity.op256());
    }

    /// Midpoint disc with a one pixel outline of another color.
    pub fn fill_circle(&mut self, center: PointI, r: i32, interior: C, outline: C, opacity: Opacity) {
        self.midpoint_circle::<true, true>(center, r, outline, interior, opacity.op256());
    }

    #[allow(clippy::too_many_arguments)]
    fn midpoint_ellipse<const OUTLINE: bool, const FILL: bool>(
        &mut self,
        m: PointI,
        rx: i32,
        ry: i32,
        outline: C,
        interior: C,
        op: i32,
    ) {
        if !self.is_valid() {
            return;
        }
        if rx < 2 || ry < 2 {
            log::debug!("ellipse radii {}x{} below 2 ignored", rx, ry);
            return;
        }
        if rx.max(ry) > COORD_LIMIT || !in_range(m.into()) {
            log::debug!("ellipse at {:?} radii {}x{} out of range", m, rx, ry);
            return;
        }
        let (x0, y0) = (m.x, m.y);
        let (rx2, ry2) = (rx as i64 * rx as i64, ry as i64 * ry as i64);
        let (fx2, fy2) = (4 * rx2, 4 * ry2);

        let mut yt = ry;
        let (mut x, mut y) = (0i32, ry);
        let mut s = 2 * ry2 + rx2 * (1 - 2 * ry as i64);
        while ry2 * x as i64 <= rx2 * y as i64 {
            if OUTLINE {
                self.put_checked(x0 - x, y0 - y, outline, op);
                self.put_checked(x0 - x, y0 + y, outline, op);
                if x != 0 {
                    self.put_checked(x0 + x, y0 - y, outline, op);
                    self.put_checked(x0 + x, y0 + y, outline, op);
                }
            }
            if s >= 0 {
                s += fx2 * (1 - y as i64);
                y -= 1;
                if FILL && ry2 * x as i64 <= rx2 * y as i64 {
                    self.run_op(x0 - x, y0 - y, 2 * x + 1, interior, op);
                    self.run_op(x0 - x, y0 + y, 2 * x + 1, interior, op);
                    yt = y;
                }
            }
            s += ry2 * (4 * x as i64 + 6);
            x += 1;
        }

        let (mut x, mut y) = (rx, 0i32);
        let mut s = 2 * rx2 + ry2 * (1 - 2 * rx as i64);
        while rx2 * y as i64 <= ry2 * x as i64 {
            if OUTLINE {
                self.put_checked(x0 - x, y0 - y, outline, op);
                self.put_checked(x0 + x, y0 - y, outline, op);
                if y != 0 {
                    self.put_checked(x0 - x, y0 + y, outline, op);
                    self.put_checked(x0 + x, y0 + y, outline, op);
                }
            }
            if FILL && y != yt {
                if y != 0 {
                    self.run_op(x0 - x + 1, y0 - y, 2 * x - 1, interior, op);
                }
                self.run_op(x0 - x + 1, y0 + y, 2 * x - 1, interior, op);
            }
            if s >= 0 {
                s += fy2 * (1 - x as i64);
                x -= 1;
            }
            s += rx2 * (4 * y as i64 + 6);
            y += 1;
        }
    }

    /// Midpoint ellipse outline. Radii below 2 draw nothing.
    pub fn draw_ellipse(&mut self, center: PointI, radii: PointI, c: C, opacity: Opacity) {
        self.midpoint_ellipse::<true, false>(center, radii.x, radii.y, c, c, opacity.op256());
    }

    pub fn fill_ellipse(&mut self, center: PointI, radii: PointI, interior: C, outline: C, opacity: Opacity) {
        self.midpoint_ellipse::<true, true>(center, radii.x, radii.y, outline, interior, opacity.op256());
    }

    // ------------------------------------------------------------------------
    // Anti-aliased circles
    // ------------------------------------------------------------------------

    /// One pixel wide anti-aliased circle.
    pub fn draw_circle_aa(&mut self, center: PointF, r: f32, c: C, opacity: Opacity) {
        if !self.is_valid() || r <= 0.0 {
            return;
        }
        let mut op = opacity.aa_op();
        if r < 1.0 {
            op = (op as f32 * r) as i32;
        }
        self.circle_shape(center, r, Ring::Outline(c), Sweep::Full, op);
    }

    /// Circle outline of the given thickness, growing inwards from `r`.
    pub fn draw_thick_circle_aa(&mut self, center: PointF, r: f32, thickness: f32, c: C, opacity: Opacity) {
        if !self.is_valid() || r <= 0.0 || thickness <= 0.0 {
            return;
        }
        self.circle_shape(center, r, Ring::Thick(c, thickness.min(r + 0.5)), Sweep::Full, opacity.aa_op());
    }

    pub fn fill_circle_aa(&mut self, center: PointF, r: f32, c: C, opacity: Opacity) {
        if !self.is_valid() || r <= 0.0 {
            return;
        }
        if r < 0.5 {
            // below a pixel: one dot weighted by the disc area
            let aa = (PI * r * r * 256.0) as i32;
            self.put_aa_checked(iround(center.x), iround(center.y), c, aa, opacity.aa_op());
            return;
        }
        self.circle_shape(center, r, Ring::Fill(c), Sweep::Full, opacity.aa_op());
    }

    /// Disc whose outer band of width `thickness` is painted with `border`.
    pub fn fill_thick_circle_aa(&mut self, center: PointF, r: f32, thickness: f32, interior: C, border: C, opacity: Opacity) {
        if thickness <= 0.0 {
            self.fill_circle_aa(center, r, interior, opacity);
            return;
        }
        if !self.is_valid() || r <= 0.0 {
            return;
        }
        let ring = Ring::FillThick { interior, border, thickness: thickness.min(r) };
        self.circle_shape(center, r, ring, Sweep::Full, opacity.aa_op());
    }

    // ------------------------------------------------------------------------
    // Arcs and sectors
    // ------------------------------------------------------------------------

    /// Arc of the one pixel wide circle, clockwise from `angle_start` to
    /// `angle_end` (degrees, 0 at 12 o'clock).
    #[allow(clippy::too_many_arguments)]
    pub fn draw_circle_arc_aa(&mut self, center: PointF, r: f32, angle_start: f32, angle_end: f32, c: C, opacity: Opacity) {
        if !self.is_valid() || r <= 0.0 {
            return;
        }
        let sweep = Sweep::new(angle_start, angle_end);
        self.circle_shape(center, r, Ring::Outline(c), sweep, opacity.aa_op());
    }

    /// Thick arc, growing inwards from `r`, with straight radial ends.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_thick_circle_arc_aa(
        &mut self,
        center: PointF,
        r: f32,
        angle_start: f32,
        angle_end: f32,
        thickness: f32,
        c: C,
        opacity: Opacity,
    ) {
        if !self.is_valid() || r <= 0.0 || thickness <= 0.0 {
            return;
        }
        let sweep = Sweep::new(angle_start, angle_end);
        self.circle_shape(center, r, Ring::Thick(c, thickness.min(r + 0.5)), sweep, opacity.aa_op());
    }

    /// Pie slice.
    #[allow(clippy::too_many_arguments)]
    pub fn fill_circle_sector_aa(&mut self, center: PointF, r: f32, angle_start: f32, angle_end: f32, c: C, opacity: Opacity) {
        if !self.is_valid() || r <= 0.0 {
            return;
        }
        let sweep = Sweep::new(angle_start, angle_end);
        self.circle_shape(center, r, Ring::Fill(c), sweep, opacity.aa_op());
    }

    /// Pie slice with a border running along the arc and both radii.
    #[allow(clippy::too_many_arguments)]
    pub fn fill_thick_circle_sector_aa(
        &mut self,
        center: PointF,
        r: f32,
        angle_start: f32,
        angle_end: f32,
        thickness: f32,
        interior: C,
        border: C,
        opacity: Opacity,
    ) {
        if thickness <= 0.0 {
            self.fill_circle_sector_aa(center, r, angle_start, angle_end, interior, opacity);
            return;
        }
        if !self.is_valid() || r <= 0.0 {
            return;
        }
        let sweep = Sweep::new(angle_start, angle_end);
        let ring = Ring::FillThick { interior, border, thickness: thickness.min(r) };
        self.circle_shape(center, r, ring, sweep, opacity.aa_op());
    }

    // ------------------------------------------------------------------------
    // Anti-aliased ellipses
    // ------------------------------------------------------------------------

    fn ellipse_shape(&mut self, center: PointF, radii: PointF, ring: Ring<C>, op: i32) {
        if !self.is_valid() || radii.x <= 0.0 || radii.y <= 0.0 {
            return;
        }
        let (rx, ry) = (radii.x, radii.y);
        self.shape(center, radii, ring, None, op, |p| ellipse_sd(p, rx, ry));
    }

    pub fn draw_ellipse_aa(&mut self, center: PointF, radii: PointF, c: C, opacity: Opacity) {
        self.ellipse_shape(center, radii, Ring::Outline(c), opacity.aa_op());
    }

    /// Ellipse outline of the given thickness, growing inwards.
    pub fn draw_thick_ellipse_aa(&mut self, center: PointF, radii: PointF, thickness: f32, c: C, opacity: Opacity) {
        if thickness <= 0.0 {
            return;
        }
        let t = thickness.min(radii.x.min(radii.y) + 0.5);
        self.ellipse_shape(center, radii, Ring::Thick(c, t), opacity.aa_op());
    }

    pub fn fill_ellipse_aa(&mut self, center: PointF, radii: PointF, c: C, opacity: Opacity) {
        self.ellipse_shape(center, radii, Ring::Fill(c), opacity.aa_op());
    }

    pub fn fill_thick_ellipse_aa(
        &mut self,
        center: PointF,
        radii: PointF,
        thickness: f32,
        interior: C,
        border: C,
        opacity: Opacity,
    ) {
        if thickness <= 0.0 {
            self.fill_ellipse_aa(center, radii, interior, opacity);
            return;
        }
        let t = thickness.min(radii.x.min(radii.y));
        let ring = Ring::FillThick { interior, border, thickness: t };
        self.ellipse_shape(center, radii, ring, opacity.aa_op());
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

    fn white() -> Rgbf {
        Rgbf::new(1.0, 1.0, 1.0)
    }

    fn at(buf: &[Rgbf], x: i32, y: i32) -> f32 {
        buf[(y * W + x) as usize].r
    }

    fn pf(x: f32, y: f32) -> PointF {
        PointF::new(x, y)
    }

    #[test]
    fn test_fill_circle_radius_one() {
        let mut buf = vec![Rgb32::BLACK; 16];
        let mut cv = Canvas::new(&mut buf, 4, 4);
        cv.fill_circle(PointI::new(2, 2), 1, Rgb32::RED, Rgb32::RED, Opacity::Overwrite);
        assert_eq!(cv.read_pixel(PointI::new(2, 2)), Rgb32::RED);
        assert_eq!(cv.read_pixel(PointI::new(1, 2)), Rgb32::RED);
        assert_eq!(cv.read_pixel(PointI::new(2, 3)), Rgb32::RED);
        assert_eq!(cv.read_pixel(PointI::new(0, 0)), Rgb32::BLACK);
        assert_eq!(cv.read_pixel(PointI::new(1, 1)), Rgb32::BLACK);
    }

    #[test]
    fn test_draw_circle_axis_points() {
        let mut buf = vec![Rgb32::BLACK; (W * W) as usize];
        let mut cv = Canvas::new(&mut buf, W, W);
        cv.draw_circle(PointI::new(20, 20), 7, Rgb32::RED, Opacity::Overwrite);
        for p in [(27, 20), (13, 20), (20, 27), (20, 13)] {
            assert_eq!(cv.read_pixel(PointI::new(p.0, p.1)), Rgb32::RED, "{:?}", p);
        }
        assert_eq!(cv.read_pixel(PointI::new(20, 20)), Rgb32::BLACK);
        assert_eq!(cv.read_pixel(PointI::new(23, 23)), Rgb32::BLACK);
    }

    #[test]
    fn test_fill_circle_interior_and_outline() {
        let mut buf = vec![Rgb32::BLACK; (W * W) as usize];
        let mut cv = Canvas::new(&mut buf, W, W);
        cv.fill_circle(PointI::new(20, 20), 6, Rgb32::BLUE, Rgb32::RED, Opacity::Overwrite);
        assert_eq!(cv.read_pixel(PointI::new(20, 20)), Rgb32::BLUE);
        assert_eq!(cv.read_pixel(PointI::new(23, 22)), Rgb32::BLUE);
        assert_eq!(cv.read_pixel(PointI::new(26, 20)), Rgb32::RED);
        assert_eq!(cv.read_pixel(PointI::new(27, 20)), Rgb32::BLACK);
    }

    #[test]
    fn test_circle_partly_offscreen() {
        let mut buf = vec![Rgb32::BLACK; (W * W) as usize];
        let mut cv = Canvas::new(&mut buf, W, W);
        cv.fill_circle(PointI::new(0, 0), 10, Rgb32::BLUE, Rgb32::RED, Opacity::Overwrite);
        assert_eq!(cv.read_pixel(PointI::new(2, 2)), Rgb32::BLUE);
        cv.fill_circle(PointI::new(-100, 5), 10, Rgb32::GREEN, Rgb32::GREEN, Opacity::Overwrite);
    }

    #[test]
    fn test_far_circles_ignored() {
        let mut buf = vec![Rgb32::BLACK; (W * W) as usize];
        {
            let mut cv = Canvas::new(&mut buf, W, W);
            let red = Rgb32::RED;
            cv.fill_circle(PointI::new(i32::MAX, 5), 10, red, red, Opacity::Overwrite);
            cv.draw_circle(PointI::new(5, 5), i32::MAX, red, Opacity::Overwrite);
            cv.fill_ellipse(PointI::new(i32::MIN, 0), PointI::new(4, 1 << 27), red, red, Opacity::Overwrite);
        }
        assert!(buf.iter().all(|&p| p == Rgb32::BLACK));
    }

    #[test]
    fn test_draw_ellipse_extremes() {
        let mut buf = vec![Rgb32::BLACK; (W * W) as usize];
        let mut cv = Canvas::new(&mut buf, W, W);
        cv.draw_ellipse(PointI::new(20, 20), PointI::new(12, 5), Rgb32::RED, Opacity::Overwrite);
        assert_eq!(cv.read_pixel(PointI::new(32, 20)), Rgb32::RED);
        assert_eq!(cv.read_pixel(PointI::new(8, 20)), Rgb32::RED);
        assert_eq!(cv.read_pixel(PointI::new(20, 15)), Rgb32::RED);
        assert_eq!(cv.read_pixel(PointI::new(20, 25)), Rgb32::RED);
        assert_eq!(cv.read_pixel(PointI::new(20, 20)), Rgb32::BLACK);
    }

    #[test]
    fn test_fill_ellipse_and_tiny_radii() {
        let mut buf = vec![Rgb32::BLACK; (W * W) as usize];
        let mut cv = Canvas::new(&mut buf, W, W);
        cv.fill_ellipse(PointI::new(20, 20), PointI::new(12, 5), Rgb32::BLUE, Rgb32::RED, Opacity::Overwrite);
        assert_eq!(cv.read_pixel(PointI::new(20, 20)), Rgb32::BLUE);
        assert_eq!(cv.read_pixel(PointI::new(30, 20)), Rgb32::BLUE);
        cv.fill_ellipse(PointI::new(5, 5), PointI::new(1, 4), Rgb32::GREEN, Rgb32::GREEN, Opacity::Overwrite);
        assert_eq!(cv.read_pixel(PointI::new(5, 5)), Rgb32::BLACK);
    }

    #[test]
    fn test_sweep() {
        assert_eq!(Sweep::new(30.0, 30.0), Sweep::Empty);
        assert_eq!(Sweep::new(0.0, 360.0), Sweep::Full);
        let Sweep::Wedge(w) = Sweep::new(90.0, 180.0) else {
            panic!("expected a wedge");
        };
        // lower right quarter
        assert!(w.sd(pf(5.0, 5.0)) < 0.0);
        assert!(w.sd(pf(-5.0, 5.0)) > 0.0);
        assert!(w.sd(pf(5.0, -5.0)) > 0.0);
        let Sweep::Wedge(w) = Sweep::new(0.0, 270.0) else {
            panic!("expected a wedge");
        };
        assert!(w.sd(pf(-5.0, 5.0)) < 0.0);
        assert!(w.sd(pf(-5.0, -5.0)) > 0.0);
    }

    #[test]
    fn test_distance_functions() {
        assert!((circle_sd(pf(3.0, 4.0), 5.0)).abs() < 1e-6);
        assert!((ellipse_sd(pf(10.0, 0.0), 10.0, 4.0)).abs() < 1e-6);
        assert!((ellipse_sd(pf(11.0, 0.0), 10.0, 4.0) - 0.9545).abs() < 0.01);
        assert!(ellipse_sd(pf(0.0, 0.0), 10.0, 4.0) < -3.0);
        let ext = pf(10.0, 5.0);
        assert!((round_box_sd(pf(12.0, 0.0), ext, 2.0) - 2.0).abs() < 1e-6);
        assert!((round_box_sd(pf(0.0, -4.0), ext, 2.0) + 1.0).abs() < 1e-6);
        // corner is rounded
        let corner = round_box_sd(pf(10.0, 5.0), ext, 2.0);
        assert!((corner - (2.0f32.sqrt() * 2.0 - 2.0)).abs() < 1e-5);
    }

    #[test]
    fn test_fill_circle_aa_centre_lines_written_once() {
        let mut buf = black();
        {
            let mut cv = Canvas::new(&mut buf, W, W);
            cv.fill_circle_aa(pf(20.0, 20.0), 8.0, white(), Opacity::Blend(0.5));
        }
        assert!(buf.iter().all(|c| c.r <= 0.5 + 1e-6));
        for (x, y) in [(20, 20), (20, 14), (20, 26), (14, 20), (26, 20)] {
            assert_eq!(at(&buf, x, y), 0.5, "({}, {})", x, y);
        }
        assert_eq!(at(&buf, 20, 30), 0.0);
    }

    #[test]
    fn test_draw_circle_aa_ring() {
        let mut buf = black();
        {
            let mut cv = Canvas::new(&mut buf, W, W);
            cv.draw_circle_aa(pf(20.0, 20.0), 10.0, white(), Opacity::OPAQUE);
        }
        assert_eq!(at(&buf, 30, 20), 1.0);
        assert_eq!(at(&buf, 20, 10), 1.0);
        assert_eq!(at(&buf, 20, 20), 0.0);
        assert_eq!(at(&buf, 25, 20), 0.0);
        assert_eq!(at(&buf, 32, 20), 0.0);
    }

    #[test]
    fn test_thick_circle() {
        let mut buf = black();
        {
            let mut cv = Canvas::new(&mut buf, W, W);
            cv.draw_thick_circle_aa(pf(20.0, 20.0), 12.0, 4.0, white(), Opacity::OPAQUE);
        }
        assert_eq!(at(&buf, 30, 20), 1.0);
        assert_eq!(at(&buf, 20, 9), 1.0);
        assert_eq!(at(&buf, 20, 20), 0.0);
        assert_eq!(at(&buf, 26, 20), 0.0);
    }

    #[test]
    fn test_fill_thick_circle_colors() {
        let mut buf = vec![Rgb32::BLACK; (W * W) as usize];
        let mut cv = Canvas::new(&mut buf, W, W);
        cv.fill_thick_circle_aa(pf(20.0, 20.0), 10.0, 3.0, Rgb32::RED, Rgb32::BLUE, Opacity::OPAQUE);
        assert_eq!(cv.read_pixel(PointI::new(20, 20)), Rgb32::RED);
        assert_eq!(cv.read_pixel(PointI::new(24, 20)), Rgb32::RED);
        assert_eq!(cv.read_pixel(PointI::new(28, 20)), Rgb32::BLUE);
        assert_eq!(cv.read_pixel(PointI::new(20, 12)), Rgb32::BLUE);
        assert_eq!(cv.read_pixel(PointI::new(32, 20)), Rgb32::BLACK);
    }

    #[test]
    fn test_tiny_disc_is_one_dot() {
        let mut buf = black();
        {
            let mut cv = Canvas::new(&mut buf, W, W);
            cv.fill_circle_aa(pf(5.2, 5.1), 0.3, white(), Opacity::OPAQUE);
        }
        let v = at(&buf, 5, 5);
        assert!(v > 0.2 && v < 0.35, "{}", v);
        assert_eq!(buf.iter().filter(|c| c.r > 0.0).count(), 1);
    }

    #[test]
    fn test_circle_arc() {
        let mut buf = black();
        {
            let mut cv = Canvas::new(&mut buf, W, W);
            cv.draw_circle_arc_aa(pf(20.0, 20.0), 10.0, 0.0, 90.0, white(), Opacity::OPAQUE);
        }
        assert!(at(&buf, 27, 13) > 0.5);
        assert!((at(&buf, 30, 20) - 0.5).abs() < 0.01);
        assert_eq!(at(&buf, 20, 30), 0.0);
        assert_eq!(at(&buf, 10, 20), 0.0);
        assert_eq!(at(&buf, 13, 13), 0.0);
    }

    #[test]
    fn test_thick_arc_wraps_around_zero() {
        let mut buf = black();
        {
            let mut cv = Canvas::new(&mut buf, W, W);
            cv.draw_thick_circle_arc_aa(pf(20.0, 20.0), 12.0, 315.0, 45.0, 3.0, white(), Opacity::OPAQUE);
        }
        assert_eq!(at(&buf, 20, 9), 1.0);
        assert_eq!(at(&buf, 20, 31), 0.0);
        assert_eq!(at(&buf, 31, 20), 0.0);
    }

    #[test]
    fn test_fill_sector() {
        let mut buf = black();
        {
            let mut cv = Canvas::new(&mut buf, W, W);
            cv.fill_circle_sector_aa(pf(20.0, 20.0), 10.0, 90.0, 180.0, white(), Opacity::OPAQUE);
        }
        assert_eq!(at(&buf, 25, 25), 1.0);
        assert_eq!(at(&buf, 15, 15), 0.0);
        assert_eq!(at(&buf, 15, 25), 0.0);
        assert_eq!(at(&buf, 25, 15), 0.0);
    }

    #[test]
    fn test_fill_sector_reflex() {
        let mut buf = black();
        {
            let mut cv = Canvas::new(&mut buf, W, W);
            cv.fill_circle_sector_aa(pf(20.0, 20.0), 10.0, 0.0, 270.0, white(), Opacity::OPAQUE);
        }
        assert_eq!(at(&buf, 25, 25), 1.0);
        assert_eq!(at(&buf, 15, 25), 1.0);
        assert_eq!(at(&buf, 25, 15), 1.0);
        assert_eq!(at(&buf, 15, 15), 0.0);
    }

    #[test]
    fn test_fill_thick_sector_border_on_radius() {
        let mut buf = vec![Rgb32::BLACK; (W * W) as usize];
        let mut cv = Canvas::new(&mut buf, W, W);
        cv.fill_thick_circle_sector_aa(pf(20.0, 20.0), 15.0, 90.0, 180.0, 3.0, Rgb32::RED, Rgb32::BLUE, Opacity::OPAQUE);
        assert_eq!(cv.read_pixel(PointI::new(26, 26)), Rgb32::RED);
        // next to the horizontal radius
        assert_eq!(cv.read_pixel(PointI::new(28, 21)), Rgb32::BLUE);
        assert_eq!(cv.read_pixel(PointI::new(14, 26)), Rgb32::BLACK);
    }

    #[test]
    fn test_ellipse_aa() {
        let mut buf = black();
        {
            let mut cv = Canvas::new(&mut buf, W, W);
            cv.fill_ellipse_aa(pf(20.0, 20.0), pf(15.0, 6.0), white(), Opacity::OPAQUE);
        }
        assert_eq!(at(&buf, 20, 20), 1.0);
        assert_eq!(at(&buf, 33, 20), 1.0);
        assert_eq!(at(&buf, 20, 28), 0.0);
        assert_eq!(at(&buf, 37, 20), 0.0);

        let mut buf = black();
        {
            let mut cv = Canvas::new(&mut buf, W, W);
            cv.draw_ellipse_aa(pf(20.0, 20.0), pf(15.0, 6.0), white(), Opacity::OPAQUE);
        }
        assert_eq!(at(&buf, 35, 20), 1.0);
        assert_eq!(at(&buf, 20, 14), 1.0);
        assert_eq!(at(&buf, 20, 20), 0.0);
    }

    #[test]
    fn test_thick_ellipse() {
        let mut buf = vec![Rgb32::BLACK; (W * W) as usize];
        let mut cv = Canvas::new(&mut buf, W, W);
        cv.draw_thick_ellipse_aa(pf(20.0, 20.0), pf(15.0, 10.0), 3.0, Rgb32::WHITE, Opacity::OPAQUE);
        assert_eq!(cv.read_pixel(PointI::new(34, 20)), Rgb32::WHITE);
        assert_eq!(cv.read_pixel(PointI::new(20, 20)), Rgb32::BLACK);
        cv.fill_thick_ellipse_aa(pf(20.0, 20.0), pf(15.0, 10.0), 3.0, Rgb32::RED, Rgb32::BLUE, Opacity::OPAQUE);
        assert_eq!(cv.read_pixel(PointI::new(20, 20)), Rgb32::RED);
        assert_eq!(cv.read_pixel(PointI::new(20, 11)), Rgb32::BLUE);
    }

    #[test]
    fn test_invalid_canvas_noop() {
        let mut cv: Canvas<'_, Rgb32> = Canvas::invalid();
        cv.fill_circle(PointI::new(0, 0), 5, Rgb32::RED, Rgb32::RED, Opacity::Overwrite);
        cv.fill_circle_aa(pf(0.0, 0.0), 5.0, Rgb32::RED, Opacity::OPAQUE);
        cv.draw_ellipse_aa(pf(0.0, 0.0), pf(5.0, 3.0), Rgb32::RED, Opacity::OPAQUE);
    }
}
