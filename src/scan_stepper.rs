//! Bresenham scan stepper with anti-aliasing coverage.
//!
//! [`ScanStepper`] walks the pixels of a Bresenham approximation of a segment
//! and reports, for every pixel, how much of it lies on each side of the
//! exact (sub-pixel) line. Every smooth edge in the crate (AA lines, triangle
//! and polygon edges, thick line bodies) is drawn from this cursor.
//!
//! The error term is kept with extra fractional bits: 5 bits for integer
//! endpoints, and [`AA_PRECISION`](crate::config::AA_PRECISION) sub-pixel
//! steps for float endpoints, so that segments with fractional endpoints are
//! rendered at their true position while still visiting whole pixels.
//!
//! Endpoints live within [`COORD_LIMIT`] of the origin. The constructors
//! clamp anything farther; drawing code clips or drops such geometry
//! before it gets here.

use crate::basics::{iround, safe_mult_b, PointF, PointI, RectI, COVER_FULL, COVER_HALF};
use crate::config::AA_PRECISION;

/// Extra precision bits used for integer endpoints.
const INT_EXP: i32 = 5;

/// Largest endpoint coordinate, in pixels. The error term of a segment
/// spanning twice this range, at [`AA_PRECISION`], still fits an `i32`
/// with a factor two to spare.
pub const COORD_LIMIT: i32 = 1 << 19;

/// True when both coordinates of `p` are finite and within
/// [`COORD_LIMIT`].
#[inline]
pub fn in_range(p: PointF) -> bool {
    let l = COORD_LIMIT as f32;
    p.x.abs() <= l && p.y.abs() <= l
}

/// `p` pulled into the stepper range; NaN maps to 0.
#[inline]
pub fn clamp_point(p: PointF) -> PointF {
    let l = COORD_LIMIT as f32;
    let f = |v: f32| if v.is_nan() { 0.0 } else { v.clamp(-l, l) };
    PointF::new(f(p.x), f(p.y))
}

#[inline]
fn clamp_point_i(p: PointI) -> PointI {
    PointI::new(p.x.clamp(-COORD_LIMIT, COORD_LIMIT), p.y.clamp(-COORD_LIMIT, COORD_LIMIT))
}

// ============================================================================
// Saved state
// ============================================================================

/// Position snapshot of a [`ScanStepper`], see [`ScanStepper::save`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepperState {
    x: i32,
    y: i32,
    frac: i32,
    len: i32,
    stepx: i32,
    stepy: i32,
}

// ============================================================================
// ScanStepper
// ============================================================================

/// Cursor on a Bresenham segment.
///
/// `len` counts the pixels remaining before the end point: a freshly built
/// stepper sits on the first endpoint and reaches the second one after
/// exactly `len` calls to [`advance`](Self::advance).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanStepper {
    x: i32,
    y: i32,
    frac: i32,
    len: i32,
    dx: i32,
    dy: i32,
    stepx: i32,
    stepy: i32,
    rat: i32,
    /// `2^40 / major`, turns the error term into a coverage.
    amul: i64,
    x_major: bool,
}

impl ScanStepper {
    /// Degenerate one-point segment, treated as a horizontal line.
    fn single_point(p: PointI) -> Self {
        Self {
            x: p.x,
            y: p.y,
            frac: -2,
            len: 0,
            dx: 2,
            dy: 0,
            stepx: 1,
            stepy: 1,
            rat: 0,
            amul: (1 << 40) / 2,
            x_major: true,
        }
    }

    /// Segment between two integer positions.
    pub fn new(p1: PointI, p2: PointI) -> Self {
        let (p1, p2) = (clamp_point_i(p1), clamp_point_i(p2));
        if p1 == p2 {
            return Self::single_point(p1);
        }
        let (mut dx, stepx) = if p2.x < p1.x {
            (p1.x - p2.x, -1)
        } else {
            (p2.x - p1.x, 1)
        };
        let (mut dy, stepy) = if p2.y < p1.y {
            (p1.y - p2.y, -1)
        } else {
            (p2.y - p1.y, 1)
        };
        dx <<= INT_EXP;
        dy <<= INT_EXP;
        let x_major = dx >= dy;
        let rat = if x_major {
            if dy == 0 {
                0
            } else {
                dx / dy
            }
        } else if dx == 0 {
            0
        } else {
            dy / dx
        };
        // keeps [P1,P2] and [P2,P1] on the same pixels
        let flagdir = (p2.x > p1.x) as i32;
        let frac = if x_major {
            dy - (dx >> 1)
        } else {
            dx - (dy >> 1)
        } - flagdir;
        let major = if x_major { dx } else { dy };
        Self {
            x: p1.x,
            y: p1.y,
            frac,
            len: major >> INT_EXP,
            dx,
            dy,
            stepx,
            stepy,
            rat,
            amul: (1i64 << 40) / major as i64,
            x_major,
        }
    }

    /// Segment between two sub-pixel positions.
    ///
    /// The visited pixels are those of the rounded endpoints but the error
    /// term carries the sub-pixel offsets, so coverage values follow the
    /// exact line.
    pub fn new_f(pf1: PointF, pf2: PointF) -> Self {
        let (pf1, pf2) = (clamp_point(pf1), clamp_point(pf2));
        let sw = pf1.x > pf2.x || (pf1.x == pf2.x && pf1.y > pf2.y);
        let (pf1, pf2) = if sw { (pf2, pf1) } else { (pf1, pf2) };
        let p1 = PointI::new(iround(pf1.x), iround(pf1.y));
        let p2 = PointI::new(iround(pf2.x), iround(pf2.y));
        let adx = (p2.x - p1.x).abs();
        let ady = (p2.y - p1.y).abs();
        let fdx = pf2.x - pf1.x;
        let fdy = pf2.y - pf1.y;

        if adx == 0 && ady == 0 {
            return Self::single_point(if sw { p2 } else { p1 });
        }

        let clamp_off = |v: f32| -> i32 {
            let i = ((2 * AA_PRECISION) as f32 * v) as i32;
            if i <= -AA_PRECISION {
                -AA_PRECISION + 1
            } else if i >= AA_PRECISION {
                AA_PRECISION - 1
            } else {
                i
            }
        };

        let mut s = Self {
            x: p1.x,
            y: p1.y,
            frac: 0,
            len: adx.max(ady),
            dx: 0,
            dy: 0,
            stepx: if fdx < 0.0 { -1 } else { 1 },
            stepy: if fdy < 0.0 { -1 } else { 1 },
            rat: 0,
            amul: 0,
            x_major: false,
        };

        if adx > ady || (adx == ady && fdx.abs() > fdy.abs()) {
            s.x_major = true;
            let mul = fdy / fdx;
            // vertical offsets of the exact line at the rounded endpoints
            let mut if1 = clamp_off(mul * (p1.x as f32 - pf1.x) + pf1.y - p1.y as f32);
            let mut if2 = clamp_off(mul * (p2.x as f32 - pf2.x) + pf2.y - p2.y as f32);
            if fdy < 0.0 {
                if1 = -if1;
                if2 = -if2;
            }
            s.dx = adx * (2 * AA_PRECISION);
            s.dy = ady * (2 * AA_PRECISION) - if1 + if2;
            s.rat = if s.dy == 0 { 0 } else { s.dx / s.dy };
            s.amul = (1i64 << 40) / s.dx as i64;
            s.frac = (if1 - AA_PRECISION) * adx + s.dy;
        } else {
            s.x_major = false;
            let mul = fdx / fdy;
            let mut if1 = clamp_off(mul * (p1.y as f32 - pf1.y) + pf1.x - p1.x as f32);
            let mut if2 = clamp_off(mul * (p2.y as f32 - pf2.y) + pf2.x - p2.x as f32);
            if fdx < 0.0 {
                if1 = -if1;
                if2 = -if2;
            }
            s.dy = ady * (2 * AA_PRECISION);
            s.dx = adx * (2 * AA_PRECISION) - if1 + if2;
            s.rat = if s.dx == 0 { 0 } else { s.dy / s.dx };
            s.amul = (1i64 << 40) / s.dy as i64;
            s.frac = (if1 - AA_PRECISION) * ady + s.dx;
        }

        if sw {
            s.reverse();
        }
        s
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    #[inline]
    pub fn x(&self) -> i32 {
        self.x
    }

    #[inline]
    pub fn y(&self) -> i32 {
        self.y
    }

    /// Current pixel.
    #[inline]
    pub fn position(&self) -> PointI {
        PointI::new(self.x, self.y)
    }

    /// True when both steppers currently sit on the same pixel.
    #[inline]
    pub fn same_pos(&self, other: &Self) -> bool {
        self.x == other.x && self.y == other.y
    }

    /// Pixels remaining before the end point.
    #[inline]
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> i32 {
        self.len
    }

    #[inline]
    pub fn set_len(&mut self, len: i32) {
        self.len = len;
    }

    #[inline]
    pub fn inc_len(&mut self) {
        self.len += 1;
    }

    #[inline]
    pub fn dec_len(&mut self) {
        self.len -= 1;
    }

    #[inline]
    pub fn x_major(&self) -> bool {
        self.x_major
    }

    #[inline]
    pub fn step_x(&self) -> i32 {
        self.stepx
    }

    #[inline]
    pub fn step_y(&self) -> i32 {
        self.stepy
    }

    /// Unit direction vector of the segment.
    pub fn unit_vec(&self) -> PointF {
        PointF::new((self.dx * self.stepx) as f32, (self.dy * self.stepy) as f32).normalized()
    }

    pub fn save(&self) -> StepperState {
        StepperState {
            x: self.x,
            y: self.y,
            frac: self.frac,
            len: self.len,
            stepx: self.stepx,
            stepy: self.stepy,
        }
    }

    pub fn restore(&mut self, st: &StepperState) {
        self.x = st.x;
        self.y = st.y;
        self.frac = st.frac;
        self.len = st.len;
        self.stepx = st.stepx;
        self.stepy = st.stepy;
    }

    // ------------------------------------------------------------------------
    // Walking
    // ------------------------------------------------------------------------

    #[inline]
    fn step<const X_MAJOR: bool>(&mut self) {
        self.len -= 1;
        if X_MAJOR {
            if self.frac >= 0 {
                self.y += self.stepy;
                self.frac -= self.dx;
            }
            self.x += self.stepx;
            self.frac += self.dy;
        } else {
            if self.frac >= 0 {
                self.x += self.stepx;
                self.frac -= self.dy;
            }
            self.y += self.stepy;
            self.frac += self.dx;
        }
    }

    /// Move one pixel along the major axis.
    #[inline]
    pub fn advance(&mut self) {
        if self.x_major {
            self.step::<true>()
        } else {
            self.step::<false>()
        }
    }

    /// Move `total` pixels along the line in O(1). Long moves are chunked
    /// so that the error term keeps its headroom.
    pub fn advance_by(&mut self, mut total: i32) {
        self.len -= total;
        let mut n = safe_mult_b(self.dx.max(self.dy) << 1, total);
        loop {
            if self.x_major {
                if self.dx == 0 {
                    return;
                }
                self.x += self.stepx * n;
                self.frac += self.dy * n;
                let u = self.frac / self.dx;
                self.y += self.stepy * u;
                self.frac -= u * self.dx;
                if self.frac >= self.dy {
                    self.frac -= self.dx;
                    self.y += self.stepy;
                }
            } else {
                if self.dy == 0 {
                    return;
                }
                self.y += self.stepy * n;
                self.frac += self.dx * n;
                let u = self.frac / self.dy;
                self.x += self.stepx * u;
                self.frac -= u * self.dy;
                if self.frac >= self.dx {
                    self.frac -= self.dy;
                    self.x += self.stepx;
                }
            }
            total -= n;
            if total <= 0 {
                return;
            }
            if total < n {
                n = total;
            }
        }
    }

    fn x_dir_step<const X_MAJOR: bool>(&mut self) -> i32 {
        if X_MAJOR {
            if self.frac >= 0 {
                self.y += self.stepy;
                self.frac -= self.dx;
            }
            self.x += self.stepx;
            self.frac += self.dy;
            self.len -= 1;
            1
        } else {
            // just after a step the ratio is exact
            let mut r = if self.frac < (self.dx << 1) - self.dy {
                self.rat
            } else {
                (self.dx - self.frac) / self.dx
            };
            self.y += r * self.stepy;
            self.frac += r * self.dx;
            if self.frac < self.dx {
                self.y += self.stepy;
                self.frac += self.dx;
                r += 1;
            }
            self.frac -= self.dy;
            self.x += self.stepx;
            self.len -= r;
            r
        }
    }

    fn y_dir_step<const X_MAJOR: bool>(&mut self) -> i32 {
        if X_MAJOR {
            let mut r = if self.frac < (self.dy << 1) - self.dx {
                self.rat
            } else {
                (self.dy - self.frac) / self.dy
            };
            self.x += r * self.stepx;
            self.frac += r * self.dy;
            if self.frac < self.dy {
                self.x += self.stepx;
                self.frac += self.dy;
                r += 1;
            }
            self.frac -= self.dx;
            self.y += self.stepy;
            self.len -= r;
            r
        } else {
            if self.frac >= 0 {
                self.x += self.stepx;
                self.frac -= self.dy;
            }
            self.y += self.stepy;
            self.frac += self.dx;
            self.len -= 1;
            1
        }
    }

    /// Move until the x coordinate changes by one. Returns the number of
    /// pixels travelled along the line.
    #[inline]
    pub fn advance_x_dir(&mut self) -> i32 {
        if self.x_major {
            self.x_dir_step::<true>()
        } else {
            self.x_dir_step::<false>()
        }
    }

    /// Move until the y coordinate changes by one. Returns the number of
    /// pixels travelled along the line.
    #[inline]
    pub fn advance_y_dir(&mut self) -> i32 {
        if self.x_major {
            self.y_dir_step::<true>()
        } else {
            self.y_dir_step::<false>()
        }
    }

    /// Move until the x coordinate changed by `total`. Returns the number
    /// of pixels travelled, or 0 (without moving) when `total <= 0`.
    pub fn advance_x_dir_by(&mut self, mut total: i32) -> i32 {
        if total <= 0 {
            return 0;
        }
        let mut n = safe_mult_b(self.dx.max(self.dy) << 1, total);
        let mut res = 0;
        loop {
            if self.x_major {
                self.x += self.stepx * n;
                self.frac += self.dy * n;
                let u = self.frac / self.dx;
                self.y += self.stepy * u;
                self.frac -= u * self.dx;
                if self.frac >= self.dy {
                    self.frac -= self.dx;
                    self.y += self.stepy;
                }
                res += n;
            } else {
                let mut k = ((n - 1) * self.dy) / self.dx;
                self.frac += k * self.dx;
                self.y += k * self.stepy;
                let mut u = self.frac / self.dy;
                self.frac -= u * self.dy;
                if self.frac >= self.dx {
                    u += 1;
                    self.frac -= self.dy;
                }
                self.x += u * self.stepx;
                let saved_len = self.len;
                while u != n {
                    k += self.x_dir_step::<false>();
                    u += 1;
                }
                self.len = saved_len;
                res += k;
            }
            total -= n;
            if total <= 0 {
                self.len -= res;
                return res;
            }
            if total < n {
                n = total;
            }
        }
    }

    /// Move until the y coordinate changed by `total`. Returns the number
    /// of pixels travelled, or 0 (without moving) when `total <= 0`.
    pub fn advance_y_dir_by(&mut self, mut total: i32) -> i32 {
        if total <= 0 {
            return 0;
        }
        let mut n = safe_mult_b(self.dx.max(self.dy) << 1, total);
        let mut res = 0;
        loop {
            if self.x_major {
                let mut k = ((n - 1) * self.dx) / self.dy;
                self.frac += k * self.dy;
                self.x += k * self.stepx;
                let mut u = self.frac / self.dx;
                self.frac -= u * self.dx;
                if self.frac >= self.dy {
                    u += 1;
                    self.frac -= self.dx;
                }
                self.y += u * self.stepy;
                let saved_len = self.len;
                while u != n {
                    k += self.y_dir_step::<true>();
                    u += 1;
                }
                self.len = saved_len;
                res += k;
            } else {
                self.y += self.stepy * n;
                self.frac += self.dx * n;
                let u = self.frac / self.dy;
                self.x += self.stepx * u;
                self.frac -= u * self.dy;
                if self.frac >= self.dx {
                    self.frac -= self.dy;
                    self.x += self.stepx;
                }
                res += n;
            }
            total -= n;
            if total <= 0 {
                self.len -= res;
                return res;
            }
            if total < n {
                n = total;
            }
        }
    }

    /// Swap the endpoints: the cursor jumps to the far end and walks back.
    pub fn reverse(&mut self) {
        let len = self.len;
        if len > 0 {
            self.advance_by(len);
            self.len = len;
        }
        self.stepx = -self.stepx;
        self.stepy = -self.stepy;
        if self.x_major {
            self.frac = -self.dx - 1 - self.frac + 2 * self.dy;
        } else {
            self.frac = -self.dy - 1 - self.frac + 2 * self.dx;
        }
    }

    /// Reversed copy of this stepper.
    pub fn reversed(&self) -> Self {
        let mut s = *self;
        s.reverse();
        s
    }

    /// Walk until the cursor enters the closed box `b`.
    ///
    /// Returns the number of steps walked, or `None` if the line never
    /// enters the box (`len` is then set to -1).
    pub fn move_inside_box(&mut self, b: &RectI) -> Option<i32> {
        if !b.is_valid() {
            return None;
        }
        if b.hit_test(self.x, self.y) {
            return Some(0);
        }
        let mut tot = 0;
        if self.x < b.x1 {
            if self.stepx < 0 || self.dx == 0 {
                self.len = -1;
                return None;
            }
            tot += self.advance_x_dir_by(b.x1 - self.x);
        } else if self.x > b.x2 {
            if self.stepx > 0 || self.dx == 0 {
                self.len = -1;
                return None;
            }
            tot += self.advance_x_dir_by(self.x - b.x2);
        }
        if self.y < b.y1 {
            if self.stepy < 0 || self.dy == 0 {
                self.len = -1;
                return None;
            }
            tot += self.advance_y_dir_by(b.y1 - self.y);
        } else if self.y > b.y2 {
            if self.stepy > 0 || self.dy == 0 {
                self.len = -1;
                return None;
            }
            tot += self.advance_y_dir_by(self.y - b.y2);
        }
        if !b.hit_test(self.x, self.y) {
            self.len = -1;
            return None;
        }
        Some(tot)
    }

    /// Number of pixels (at least 1) drawn from the current position before
    /// the line leaves `b`; 0 when the cursor is outside.
    pub fn len_inside_box(&self, b: &RectI) -> i32 {
        if !b.hit_test(self.x, self.y) {
            return 0;
        }
        let hx = 1 + if self.stepx > 0 {
            b.x2 - self.x
        } else {
            self.x - b.x1
        };
        let hy = 1 + if self.stepy > 0 {
            b.y2 - self.y
        } else {
            self.y - b.y1
        };
        let nx = if self.dx != 0 {
            let mut t = *self;
            Some(t.advance_x_dir_by(hx))
        } else {
            None
        };
        let ny = if self.dy != 0 {
            let mut t = *self;
            Some(t.advance_y_dir_by(hy))
        } else {
            None
        };
        match (nx, ny) {
            (Some(a), Some(b)) => a.min(b),
            (Some(a), None) => a,
            (None, Some(b)) => b,
            (None, None) => -1,
        }
    }

    // ------------------------------------------------------------------------
    // Coverage
    // ------------------------------------------------------------------------

    #[inline]
    fn raw_coverage(&self) -> i32 {
        let d = if self.x_major { self.dy } else { self.dx };
        (((d - self.frac) as i64 * self.amul) >> 32) as i32
    }

    /// Coverage in `[0, 256]` of the current pixel by the half-plane on
    /// `side` of the oriented line (`side > 0`: right, `side < 0`: left,
    /// screen coordinates).
    #[inline]
    pub fn coverage(&self, side: i32) -> i32 {
        let a = self.raw_coverage();
        let same = self.stepx == self.stepy;
        let flip = match (self.x_major, side > 0) {
            (true, true) => !same,
            (true, false) => same,
            (false, true) => same,
            (false, false) => !same,
        };
        if flip {
            COVER_FULL - a
        } else {
            a
        }
    }

    /// Two-sided coverage for thin AA lines.
    ///
    /// Returns `(weight, dir)`: the current pixel gets `weight` in
    /// `[128, 256]` and the neighbour at `dir` (along the minor axis) gets
    /// `256 - weight`.
    #[inline]
    pub fn coverage_both(&self) -> (i32, i32) {
        let a = self.raw_coverage();
        let minor_step = if self.x_major { self.stepy } else { self.stepx };
        if a >= COVER_HALF {
            (COVER_FULL + COVER_HALF - a, -minor_step)
        } else {
            (a + COVER_HALF, minor_step)
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
