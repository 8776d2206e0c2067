//! Foundation types and helpers shared by every drawing module.
//!
//! Integer/float points, inclusive rectangles, rounding helpers and the
//! coverage constants used by the anti-aliased primitives.

use core::ops::{Add, Mul, Neg, Sub};

// ============================================================================
// Rounding and conversion functions
// ============================================================================

/// Round to the nearest integer (round half away from zero).
#[inline]
pub fn iround(v: f32) -> i32 {
    if v < 0.0 {
        (v - 0.5) as i32
    } else {
        (v + 0.5) as i32
    }
}

/// Floor toward negative infinity.
#[inline]
pub fn ifloor(v: f32) -> i32 {
    v.floor() as i32
}

/// Ceiling as a signed integer.
#[inline]
pub fn iceil(v: f32) -> i32 {
    v.ceil() as i32
}

/// Clamp `b` so that `a * b` cannot overflow an `i32`.
///
/// Returns `b` unchanged when either value is zero.
#[inline]
pub fn safe_mult_b(a: i32, b: i32) -> i32 {
    if a == 0 || b == 0 {
        return b;
    }
    let nb = i32::MAX / a.abs();
    if b <= nb {
        b
    } else {
        nb
    }
}

// ============================================================================
// Coverage constants
// ============================================================================

/// Anti-aliasing weights live in `[0, COVER_FULL]`.
pub const COVER_SHIFT: u32 = 8;
pub const COVER_FULL: i32 = 1 << COVER_SHIFT;
pub const COVER_HALF: i32 = COVER_FULL / 2;

// ============================================================================
// Mathematical constants
// ============================================================================

pub const PI: f32 = core::f32::consts::PI;

/// Convert degrees to radians.
#[inline]
pub fn deg2rad(deg: f32) -> f32 {
    deg * PI / 180.0
}

// ============================================================================
// Point
// ============================================================================

/// A 2D point / vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct PointBase<T: Copy> {
    pub x: T,
    pub y: T,
}

impl<T: Copy> PointBase<T> {
    pub const fn new(x: T, y: T) -> Self {
        Self { x, y }
    }
}

pub type PointI = PointBase<i32>;
pub type PointF = PointBase<f32>;

impl<T: Copy + Add<Output = T>> Add for PointBase<T> {
    type Output = Self;
    #[inline]
    fn add(self, o: Self) -> Self {
        Self::new(self.x + o.x, self.y + o.y)
    }
}

impl<T: Copy + Sub<Output = T>> Sub for PointBase<T> {
    type Output = Self;
    #[inline]
    fn sub(self, o: Self) -> Self {
        Self::new(self.x - o.x, self.y - o.y)
    }
}

impl<T: Copy + Neg<Output = T>> Neg for PointBase<T> {
    type Output = Self;
    #[inline]
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

impl Mul<f32> for PointF {
    type Output = Self;
    #[inline]
    fn mul(self, k: f32) -> Self {
        Self::new(self.x * k, self.y * k)
    }
}

impl PointF {
    #[inline]
    pub fn dot(self, o: Self) -> f32 {
        self.x * o.x + self.y * o.y
    }

    #[inline]
    pub fn norm2(self) -> f32 {
        self.dot(self)
    }

    #[inline]
    pub fn norm(self) -> f32 {
        self.norm2().sqrt()
    }

    /// Unit vector in the same direction, or zero for the zero vector.
    pub fn normalized(self) -> Self {
        let n = self.norm();
        if n > 0.0 {
            self * (1.0 / n)
        } else {
            self
        }
    }

    /// Counter-clockwise perpendicular in screen coordinates (y down).
    #[inline]
    pub fn perp(self) -> Self {
        Self::new(-self.y, self.x)
    }

    /// Nearest integer pixel.
    #[inline]
    pub fn round(self) -> PointI {
        PointI::new(iround(self.x), iround(self.y))
    }
}

impl From<PointI> for PointF {
    fn from(p: PointI) -> Self {
        Self::new(p.x as f32, p.y as f32)
    }
}

/// Twice the signed area of the triangle (p1, p2, p3).
///
/// Positive when the points turn clockwise on screen (y pointing down).
#[inline]
pub fn triangle_area2(p1: PointF, p2: PointF, p3: PointF) -> f32 {
    (p2.x - p1.x) * (p3.y - p1.y) - (p3.x - p1.x) * (p2.y - p1.y)
}

/// Intersection of the line through `a1`, `a2` with the line through `b1`,
/// `b2`. `None` when the lines are parallel.
///
/// Axis-aligned inputs take their coordinate directly from the input
/// points so that offset outlines of boxes stay exact.
pub fn line_intersection(a1: PointF, a2: PointF, b1: PointF, b2: PointF) -> Option<PointF> {
    let ka = a2.y - a1.y;
    let la = a1.x - a2.x;
    let kb = b2.y - b1.y;
    let lb = b1.x - b2.x;
    let delta = ka * lb - kb * la;
    if delta == 0.0 {
        return None;
    }
    let ca = a1.x * ka + a1.y * la;
    let cb = b1.x * kb + b1.y * lb;
    let x = if la == 0.0 {
        a1.x
    } else if lb == 0.0 {
        b1.x
    } else {
        (lb * ca - la * cb) / delta
    };
    let y = if ka == 0.0 {
        a1.y
    } else if kb == 0.0 {
        b1.y
    } else {
        (ka * cb - kb * ca) / delta
    };
    Some(PointF::new(x, y))
}

// ============================================================================
// Rect
// ============================================================================

/// An axis-aligned rectangle with inclusive bounds `[x1, x2] x [y1, y2]`.
///
/// A rectangle with `x2 < x1` or `y2 < y1` is empty.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect<T: Copy> {
    pub x1: T,
    pub y1: T,
    pub x2: T,
    pub y2: T,
}

impl<T: Copy + PartialOrd> Rect<T> {
    pub fn new(x1: T, y1: T, x2: T, y2: T) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Normalize so that x1 <= x2 and y1 <= y2, swapping if needed.
    pub fn normalize(&mut self) -> &Self {
        if self.x1 > self.x2 {
            core::mem::swap(&mut self.x1, &mut self.x2);
        }
        if self.y1 > self.y2 {
            core::mem::swap(&mut self.y1, &mut self.y2);
        }
        self
    }

    /// Clip this rectangle to the intersection with `r`.
    /// Returns `true` if the result is non-empty.
    pub fn clip(&mut self, r: &Self) -> bool {
        *self = intersect_rectangles(self, r);
        self.is_valid()
    }

    /// Returns `true` if the rectangle is non-empty.
    pub fn is_valid(&self) -> bool {
        self.x1 <= self.x2 && self.y1 <= self.y2
    }

    /// Returns `true` if the point (x, y) is inside the rectangle.
    pub fn hit_test(&self, x: T, y: T) -> bool {
        x >= self.x1 && x <= self.x2 && y >= self.y1 && y <= self.y2
    }

    /// Returns `true` if `r` lies entirely inside this rectangle.
    pub fn contains(&self, r: &Self) -> bool {
        r.x1 >= self.x1 && r.x2 <= self.x2 && r.y1 >= self.y1 && r.y2 <= self.y2
    }
}

impl Rect<i32> {
    /// Width (number of columns), zero when empty.
    pub fn width(&self) -> i32 {
        (self.x2 - self.x1 + 1).max(0)
    }

    /// Height (number of rows), zero when empty.
    pub fn height(&self) -> i32 {
        (self.y2 - self.y1 + 1).max(0)
    }

    pub fn contains_point(&self, p: PointI) -> bool {
        self.hit_test(p.x, p.y)
    }

    /// Rectangle translated by `d`.
    pub fn translated(&self, d: PointI) -> Self {
        Self::new(self.x1 + d.x, self.y1 + d.y, self.x2 + d.x, self.y2 + d.y)
    }
}

/// Compute the intersection of two rectangles.
pub fn intersect_rectangles<T: Copy + PartialOrd>(r1: &Rect<T>, r2: &Rect<T>) -> Rect<T> {
    let mut r = *r1;
    if r.x2 > r2.x2 {
        r.x2 = r2.x2;
    }
    if r.y2 > r2.y2 {
        r.y2 = r2.y2;
    }
    if r.x1 < r2.x1 {
        r.x1 = r2.x1;
    }
    if r.y1 < r2.y1 {
        r.y1 = r2.y1;
    }
    r
}

/// Rectangle with `i32` coordinates.
pub type RectI = Rect<i32>;
/// Rectangle with `f32` coordinates.
pub type RectF = Rect<f32>;

// ============================================================================
// Segment clipping
// ============================================================================

/// Liang-Barsky clipping of the segment `a -> b` against the closed box
/// `clip_box`.
///
/// Returns the parameters `(t0, t1)`, `0 <= t0 <= t1 <= 1`, of the visible
/// part `a + t (b - a)`, or `None` when the segment misses the box or has a
/// non-finite coordinate.
pub fn clip_segment(a: (f64, f64), b: (f64, f64), clip_box: &Rect<f64>) -> Option<(f64, f64)> {
    if ![a.0, a.1, b.0, b.1].iter().all(|v| v.is_finite()) {
        return None;
    }
    let dx = b.0 - a.0;
    let dy = b.1 - a.1;
    let mut t0 = 0.0;
    let mut t1 = 1.0;
    let sides = [
        (-dx, a.0 - clip_box.x1),
        (dx, clip_box.x2 - a.0),
        (-dy, a.1 - clip_box.y1),
        (dy, clip_box.y2 - a.1),
    ];
    for (p, q) in sides {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > t1 {
                return None;
            }
            t0 = r.max(t0);
        } else {
            if r < t0 {
                return None;
            }
            t1 = r.min(t1);
        }
    }
    Some((t0, t1))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iround() {
        assert_eq!(iround(0.5), 1);
        assert_eq!(iround(0.49), 0);
        assert_eq!(iround(-0.5), -1);
        assert_eq!(iround(-0.49), 0);
        assert_eq!(iround(1.5), 2);
        assert_eq!(iround(-1.5), -2);
    }

    #[test]
    fn test_ifloor_iceil() {
        assert_eq!(ifloor(1.7), 1);
        assert_eq!(ifloor(-1.7), -2);
        assert_eq!(ifloor(-1.0), -1);
        assert_eq!(iceil(1.1), 2);
        assert_eq!(iceil(-1.1), -1);
    }

    #[test]
    fn test_safe_mult_b() {
        assert_eq!(safe_mult_b(0, 7), 7);
        assert_eq!(safe_mult_b(10, 7), 7);
        assert_eq!(safe_mult_b(1 << 20, 1 << 20), i32::MAX / (1 << 20));
        assert_eq!(safe_mult_b(-(1 << 20), 1 << 20), i32::MAX / (1 << 20));
    }

    #[test]
    fn test_point_ops() {
        let a = PointF::new(1.0, 2.0);
        let b = PointF::new(3.0, -1.0);
        assert_eq!(a + b, PointF::new(4.0, 1.0));
        assert_eq!(a - b, PointF::new(-2.0, 3.0));
        assert_eq!(a.dot(b), 1.0);
        assert_eq!(PointF::new(3.0, 4.0).norm(), 5.0);
        assert_eq!(PointF::new(1.4, -2.6).round(), PointI::new(1, -3));
    }

    #[test]
    fn test_triangle_area_sign() {
        let p1 = PointF::new(0.0, 0.0);
        let p2 = PointF::new(10.0, 0.0);
        let p3 = PointF::new(0.0, 10.0);
        assert!(triangle_area2(p1, p2, p3) > 0.0);
        assert!(triangle_area2(p1, p3, p2) < 0.0);
    }

    #[test]
    fn test_line_intersection() {
        let p = line_intersection(
            PointF::new(0.0, 0.0),
            PointF::new(10.0, 10.0),
            PointF::new(0.0, 10.0),
            PointF::new(10.0, 0.0),
        )
        .unwrap();
        assert!((p.x - 5.0).abs() < 1e-5 && (p.y - 5.0).abs() < 1e-5);
        let q = line_intersection(
            PointF::new(1.5, 0.0),
            PointF::new(1.5, 7.0),
            PointF::new(0.0, 2.25),
            PointF::new(9.0, 2.25),
        )
        .unwrap();
        assert_eq!(q, PointF::new(1.5, 2.25));
        assert!(line_intersection(
            PointF::new(0.0, 0.0),
            PointF::new(1.0, 1.0),
            PointF::new(0.0, 1.0),
            PointF::new(1.0, 2.0)
        )
        .is_none());
    }

    #[test]
    fn test_rect_clip() {
        let mut r = RectI::new(-5, -5, 5, 5);
        assert!(r.clip(&RectI::new(0, 0, 9, 9)));
        assert_eq!(r, RectI::new(0, 0, 5, 5));
        assert_eq!(r.width(), 6);

        let mut e = RectI::new(20, 20, 30, 30);
        assert!(!e.clip(&RectI::new(0, 0, 9, 9)));
        assert_eq!(e.width(), 0);
    }

    #[test]
    fn test_clip_segment() {
        let b = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert_eq!(clip_segment((2.0, 2.0), (8.0, 5.0), &b), Some((0.0, 1.0)));
        assert_eq!(clip_segment((-10.0, 5.0), (20.0, 5.0), &b), Some((1.0 / 3.0, 2.0 / 3.0)));
        assert_eq!(clip_segment((-10.0, -1.0), (20.0, -1.0), &b), None);
        assert_eq!(clip_segment((-5.0, 20.0), (20.0, -5.0), &b).map(|(t0, _)| t0), Some(0.4));
        assert_eq!(clip_segment((12.0, 0.0), (30.0, 9.0), &b), None);
        assert_eq!(clip_segment((f64::NAN, 0.0), (3.0, 3.0), &b), None);

        let far = 2.0f64.powi(30);
        let (t0, t1) = clip_segment((-far, 5.0), (far, 5.0), &b).unwrap();
        assert!(((-far + 2.0 * far * t0) - 0.0).abs() < 1e-3);
        assert!(((-far + 2.0 * far * t1) - 10.0).abs() < 1e-3);
    }

    #[test]
    fn test_ifloor_saturates() {
        assert_eq!(ifloor(-1e10), i32::MIN);
        assert_eq!(ifloor(1e10), i32::MAX);
    }

    #[test]
    fn test_rect_contains() {
        let r = RectI::new(0, 0, 9, 9);
        assert!(r.contains(&RectI::new(2, 2, 9, 3)));
        assert!(!r.contains(&RectI::new(2, 2, 10, 3)));
        assert!(r.contains_point(PointI::new(9, 0)));
        assert!(!r.contains_point(PointI::new(-1, 0)));
    }
}
