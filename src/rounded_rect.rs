//! Rectangles with anti-aliased edges and rounded corners.
//!
//! Float boxes passed to the `_aa` methods describe a region of the plane:
//! pixel `(i, j)` covers `[i - 0.5, i + 0.5] x [j - 0.5, j + 0.5]`, so
//! `RectF::new(-0.5, -0.5, 9.5, 9.5)` covers the first 10x10 pixels
//! exactly. Every shape stays inside its box; outlines grow inwards.

use crate::basics::{iceil, ifloor, PointF, RectF, RectI};
use crate::canvas::Canvas;
use crate::color::{Color, Opacity};
use crate::ellipse::{round_box_sd, Ring};

impl<'a, C: Color> Canvas<'a, C> {
    // ------------------------------------------------------------------------
    // Integer rounded rectangles
    // ------------------------------------------------------------------------

    /// Quarter-circle outlines selected by `corners` (1: top left,
    /// 2: top right, 4: bottom right, 8: bottom left).
    fn corner_arcs(&mut self, x0: i32, y0: i32, r: i32, corners: u8, c: C, op: i32) {
        let mut f = 1 - r;
        let mut ddf_x = 1;
        let mut ddf_y = -2 * r;
        let (mut x, mut y) = (0, r);
        while x < y - 1 {
            if f >= 0 {
                y -= 1;
                ddf_y += 2;
                f += ddf_y;
            }
            x += 1;
            ddf_x += 2;
            f += ddf_x;
            if corners & 4 != 0 {
                self.put_checked(x0 + x, y0 + y, c, op);
                if x != y {
                    self.put_checked(x0 + y, y0 + x, c, op);
                }
            }
            if corners & 2 != 0 {
                self.put_checked(x0 + x, y0 - y, c, op);
                if x != y {
                    self.put_checked(x0 + y, y0 - x, c, op);
                }
            }
            if corners & 8 != 0 {
                self.put_checked(x0 - y, y0 + x, c, op);
                if x != y {
                    self.put_checked(x0 - x, y0 + y, c, op);
                }
            }
            if corners & 1 != 0 {
                self.put_checked(x0 - y, y0 - x, c, op);
                if x != y {
                    self.put_checked(x0 - x, y0 - y, c, op);
                }
            }
        }
    }

    /// Vertical spans of the right (`sides & 1`) and left (`sides & 2`)
    /// rounded caps, stretched by `delta` rows.
    #[allow(clippy::too_many_arguments)]
    fn corner_spans(&mut self, x0: i32, y0: i32, r: i32, sides: u8, delta: i32, c: C, op: i32) {
        let mut f = 1 - r;
        let mut ddf_x = 1;
        let mut ddf_y = -2 * r;
        let (mut x, mut y) = (0, r);
        let (mut px, mut py) = (x, y);
        let delta = delta + 1;
        while x < y {
            if f >= 0 {
                y -= 1;
                ddf_y += 2;
                f += ddf_y;
            }
            x += 1;
            ddf_x += 2;
            f += ddf_x;
            // skip spans already drawn so that blending stays single-write
            if x < y + 1 {
                if sides & 1 != 0 {
                    self.vrun_op(x0 + x, y0 - y, 2 * y + delta, c, op);
                }
                if sides & 2 != 0 {
                    self.vrun_op(x0 - x, y0 - y, 2 * y + delta, c, op);
                }
            }
            if y != py {
                if sides & 1 != 0 {
                    self.vrun_op(x0 + py, y0 - px, 2 * px + delta, c, op);
                }
                if sides & 2 != 0 {
                    self.vrun_op(x0 - py, y0 - px, 2 * px + delta, c, op);
                }
                py = y;
            }
            px = x;
        }
    }

    #[inline]
    fn vrun_op(&mut self, x: i32, y: i32, len: i32, c: C, op: i32) {
        if len > 0 {
            self.vline_op(x, y, y + len - 1, c, op);
        }
    }

    /// Rounded rectangle outline over the inclusive pixel box `b`.
    pub fn draw_round_rect(&mut self, b: RectI, r: i32, c: C, opacity: Opacity) {
        let (w, h) = (b.width(), b.height());
        if !self.is_valid() || w <= 0 || h <= 0 {
            return;
        }
        let (x, y) = (b.x1, b.y1);
        let r = r.clamp(0, w.min(h) / 2);
        let op = opacity.op256();
        self.run_op(x + r, y, w - 2 * r, c, op);
        self.run_op(x + r, y + h - 1, w - 2 * r, c, op);
        self.vrun_op(x, y + r, h - 2 * r, c, op);
        self.vrun_op(x + w - 1, y + r, h - 2 * r, c, op);
        self.corner_arcs(x + r, y + r, r, 1, c, op);
        self.corner_arcs(x + w - r - 1, y + r, r, 2, c, op);
        self.corner_arcs(x + w - r - 1, y + h - r - 1, r, 4, c, op);
        self.corner_arcs(x + r, y + h - r - 1, r, 8, c, op);
    }

    pub fn fill_round_rect(&mut self, b: RectI, r: i32, c: C, opacity: Opacity) {
        let (w, h) = (b.width(), b.height());
        if !self.is_valid() || w <= 0 || h <= 0 {
            return;
        }
        let (x, y) = (b.x1, b.y1);
        let r = r.clamp(0, w.min(h) / 2);
        let op = opacity.op256();
        self.fill_box_op(RectI::new(x + r, y, x + w - r - 1, y + h - 1), c, op);
        self.corner_spans(x + w - r - 1, y + r, r, 1, h - 2 * r - 1, c, op);
        self.corner_spans(x + r, y + r, r, 2, h - 2 * r - 1, c, op);
    }

    // ------------------------------------------------------------------------
    // Anti-aliased rectangles
    // ------------------------------------------------------------------------

    /// Rectangle with fractional edges: border pixels are weighted by the
    /// part of their area inside `b`.
    pub fn fill_rect_aa(&mut self, b: RectF, c: C, opacity: Opacity) {
        if !self.is_valid() || b.x2 <= b.x1 || b.y2 <= b.y1 {
            return;
        }
        let op = opacity.aa_op();
        let e = RectI::new(ifloor(b.x1 + 0.5), ifloor(b.y1 + 0.5), iceil(b.x2 - 0.5), iceil(b.y2 - 0.5));
        if !e.is_valid() {
            return;
        }
        let aa = |a: f32| (a.clamp(0.0, 1.0) * 256.0) as i32;
        let left = 0.5 + e.x1 as f32 - b.x1;
        let right = 0.5 + b.x2 - e.x2 as f32;
        let up = 0.5 + e.y1 as f32 - b.y1;
        let down = 0.5 + b.y2 - e.y2 as f32;
        if e.x1 == e.x2 && e.y1 == e.y2 {
            let area = (b.x2 - b.x1) * (b.y2 - b.y1);
            self.put_aa_checked(e.x1, e.y1, c, aa(area), op);
            return;
        }
        if e.x1 == e.x2 {
            let w = b.x2 - b.x1;
            self.put_aa_checked(e.x1, e.y1, c, aa(up * w), op);
            self.put_aa_checked(e.x1, e.y2, c, aa(down * w), op);
            self.vline_aa(e.x1, e.y1 + 1, e.y2 - 1, c, aa(w), op);
            return;
        }
        if e.y1 == e.y2 {
            let h = b.y2 - b.y1;
            self.put_aa_checked(e.x1, e.y1, c, aa(left * h), op);
            self.put_aa_checked(e.x2, e.y1, c, aa(right * h), op);
            self.hline_aa(e.x1 + 1, e.x2 - 1, e.y1, c, aa(h), op);
            return;
        }
        let inner = RectI::new(e.x1 + 1, e.y1 + 1, e.x2 - 1, e.y2 - 1);
        if inner.is_valid() {
            self.fill_box_op(inner, c, op);
        }
        self.put_aa_checked(e.x1, e.y1, c, aa(left * up), op);
        self.put_aa_checked(e.x1, e.y2, c, aa(left * down), op);
        self.put_aa_checked(e.x2, e.y1, c, aa(right * up), op);
        self.put_aa_checked(e.x2, e.y2, c, aa(right * down), op);
        self.hline_aa(e.x1 + 1, e.x2 - 1, e.y1, c, aa(up), op);
        self.hline_aa(e.x1 + 1, e.x2 - 1, e.y2, c, aa(down), op);
        self.vline_aa(e.x1, e.y1 + 1, e.y2 - 1, c, aa(left), op);
        self.vline_aa(e.x2, e.y1 + 1, e.y2 - 1, c, aa(right), op);
    }

    /// Row `[x1, x2]` at one AA weight; empty when `x2 < x1`.
    #[allow(clippy::too_many_arguments)]
    fn hline_aa(&mut self, x1: i32, x2: i32, y: i32, c: C, aa: i32, op: i32) {
        if x2 >= x1 {
            self.hline_op(x1, x2, y, c, if op < 0 { aa } else { (aa * op) >> 8 });
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn vline_aa(&mut self, x: i32, y1: i32, y2: i32, c: C, aa: i32, op: i32) {
        if y2 >= y1 {
            self.vline_op(x, y1, y2, c, if op < 0 { aa } else { (aa * op) >> 8 });
        }
    }

    /// Render `ring` over the rounded box `b`. `inset` pulls the shape
    /// boundary inwards so that outlines stay inside the box.
    fn round_box(&mut self, b: RectF, r: f32, ring: Ring<C>, inset: f32, op: i32) {
        if !self.is_valid() || b.x2 <= b.x1 || b.y2 <= b.y1 {
            return;
        }
        let ctr = PointF::new((b.x1 + b.x2) / 2.0, (b.y1 + b.y2) / 2.0);
        let ext = PointF::new(
            ((b.x2 - b.x1) / 2.0 - inset).max(0.0),
            ((b.y2 - b.y1) / 2.0 - inset).max(0.0),
        );
        let r = r.clamp(0.0, ext.x.min(ext.y));
        self.shape(ctr, ext, ring, None, op, |p| round_box_sd(p, ext, r));
    }

    /// One pixel wide outline along the inside of `b`.
    pub fn draw_round_rect_aa(&mut self, b: RectF, r: f32, c: C, opacity: Opacity) {
        self.round_box(b, r, Ring::Outline(c), 0.5, opacity.aa_op());
    }

    /// Outline of the given thickness along the inside of `b`.
    pub fn draw_thick_round_rect_aa(&mut self, b: RectF, r: f32, thickness: f32, c: C, opacity: Opacity) {
        if thickness <= 0.0 {
            return;
        }
        self.round_box(b, r, Ring::Thick(c, thickness), 0.5, opacity.aa_op());
    }

    pub fn fill_round_rect_aa(&mut self, b: RectF, r: f32, c: C, opacity: Opacity) {
        self.round_box(b, r, Ring::Fill(c), 0.0, opacity.aa_op());
    }

    #[allow(clippy::too_many_arguments)]
    pub fn fill_thick_round_rect_aa(
        &mut self,
        b: RectF,
        r: f32,
        thickness: f32,
        interior: C,
        border: C,
        opacity: Opacity,
    ) {
        let ring = if thickness <= 0.0 {
            Ring::Fill(interior)
        } else {
            Ring::FillThick { interior, border, thickness }
        };
        self.round_box(b, r, ring, 0.0, opacity.aa_op());
    }

    /// Rectangle outline of the given thickness along the inside of `b`.
    pub fn draw_thick_rect_aa(&mut self, b: RectF, thickness: f32, c: C, opacity: Opacity) {
        self.draw_thick_round_rect_aa(b, 0.0, thickness, c, opacity);
    }

    /// Rectangle whose border band of the given thickness uses `border`.
    pub fn fill_thick_rect_aa(&mut self, b: RectF, thickness: f32, interior: C, border: C, opacity: Opacity) {
        self.fill_thick_round_rect_aa(b, 0.0, thickness, interior, border, opacity);
    }
}

// ============================================================================
// Tests
// ============================================================================
