//! Canvas: a drawable view over a caller-owned pixel buffer.
//!
//! [`Canvas`] borrows a mutable slice of pixels and never allocates. A
//! canvas can be cropped into sub-views that alias the parent memory (with
//! the same stride), so drawing into a sub-view is immediately visible
//! through the parent. [`ImageRef`] is the read-only counterpart used as
//! the source of blits and textured primitives.
//!
//! An invalid canvas (see [`Canvas::invalid`]) has zero dimensions; every
//! drawing operation on it is a no-op.

use crate::basics::{iround, PointF, PointI, RectI};
use crate::color::{write_op, Color, Opacity};

#[inline]
fn layout_ok(len: usize, lx: i32, ly: i32, stride: i32) -> bool {
    lx > 0
        && ly > 0
        && stride >= lx
        && len >= (ly as usize - 1) * stride as usize + lx as usize
}

/// Clip the rectangle of a `w x h` source placed at `pos` against `bounds`.
#[inline]
fn placed_box(pos: PointI, w: i32, h: i32, bounds: &RectI) -> Option<RectI> {
    let mut b = RectI::new(pos.x, pos.y, pos.x + w - 1, pos.y + h - 1);
    if b.clip(bounds) {
        Some(b)
    } else {
        None
    }
}

// ============================================================================
// ImageRef
// ============================================================================

/// Read-only view of a pixel buffer.
#[derive(Debug, Clone, Copy)]
pub struct ImageRef<'a, C> {
    buf: &'a [C],
    lx: i32,
    ly: i32,
    stride: i32,
}

impl<'a, C: Copy> ImageRef<'a, C> {
    pub fn new(buf: &'a [C], lx: i32, ly: i32) -> Self {
        Self::with_stride(buf, lx, ly, lx)
    }

    /// View with an explicit stride (in pixels). Returns an invalid image if
    /// the slice is too short for the requested layout.
    pub fn with_stride(buf: &'a [C], lx: i32, ly: i32, stride: i32) -> Self {
        if !layout_ok(buf.len(), lx, ly, stride) {
            log::debug!("invalid image layout {}x{} (stride {}, {} pixels)", lx, ly, stride, buf.len());
            return Self::invalid();
        }
        Self { buf, lx, ly, stride }
    }

    pub fn invalid() -> Self {
        Self {
            buf: &[],
            lx: 0,
            ly: 0,
            stride: 0,
        }
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        self.lx > 0 && self.ly > 0 && !self.buf.is_empty()
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.lx
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.ly
    }

    #[inline]
    pub fn stride(&self) -> i32 {
        self.stride
    }

    pub fn dim(&self) -> PointI {
        PointI::new(self.lx, self.ly)
    }

    pub fn image_box(&self) -> RectI {
        RectI::new(0, 0, self.lx - 1, self.ly - 1)
    }

    /// Pixel at (x, y). With `CHECK` out-of-range reads return `C::default()`;
    /// without it the caller guarantees the position is inside.
    #[inline]
    pub fn pixel<const CHECK: bool>(&self, x: i32, y: i32) -> C
    where
        C: Default,
    {
        if CHECK && (x < 0 || y < 0 || x >= self.lx || y >= self.ly) {
            return C::default();
        }
        self.buf[x as usize + y as usize * self.stride as usize]
    }

    /// One row of pixels.
    #[inline]
    pub fn row(&self, y: i32) -> &'a [C] {
        let start = y as usize * self.stride as usize;
        &self.buf[start..start + self.lx as usize]
    }

    /// Sub-image restricted to `b` (clamped to the image).
    pub fn sub_image(&self, b: RectI) -> Self {
        let mut b = b;
        if !self.is_valid() || !b.clip(&self.image_box()) {
            return Self::invalid();
        }
        let off = b.x1 as usize + b.y1 as usize * self.stride as usize;
        Self {
            buf: &self.buf[off..],
            lx: b.width(),
            ly: b.height(),
            stride: self.stride,
        }
    }
}

// ============================================================================
// Canvas
// ============================================================================

/// Mutable view over a pixel buffer of `C` with a row stride.
///
/// `pixel(x, y)` lives at `buffer[x + y * stride]`.
#[derive(Debug)]
pub struct Canvas<'a, C> {
    buf: &'a mut [C],
    lx: i32,
    ly: i32,
    stride: i32,
}

impl<'a, C: Color> Canvas<'a, C> {
    // ------------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------------

    /// Canvas over a tightly packed `lx x ly` buffer.
    pub fn new(buf: &'a mut [C], lx: i32, ly: i32) -> Self {
        Self::with_stride(buf, lx, ly, lx)
    }

    /// Canvas with an explicit row stride (in pixels).
    ///
    /// Returns an invalid canvas when the dimensions are not positive, the
    /// stride is smaller than the width or the slice is too short.
    pub fn with_stride(buf: &'a mut [C], lx: i32, ly: i32, stride: i32) -> Self {
        if !layout_ok(buf.len(), lx, ly, stride) {
            log::debug!("invalid canvas layout {}x{} (stride {}, {} pixels)", lx, ly, stride, buf.len());
            return Self::invalid();
        }
        Self { buf, lx, ly, stride }
    }

    /// The empty canvas. Every operation on it is a no-op.
    pub fn invalid() -> Self {
        Self {
            buf: Default::default(),
            lx: 0,
            ly: 0,
            stride: 0,
        }
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        self.lx > 0 && self.ly > 0 && !self.buf.is_empty()
    }

    /// Detach from the buffer.
    pub fn set_invalid(&mut self) {
        self.buf = Default::default();
        self.lx = 0;
        self.ly = 0;
        self.stride = 0;
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.lx
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.ly
    }

    #[inline]
    pub fn stride(&self) -> i32 {
        self.stride
    }

    #[inline]
    pub fn dim(&self) -> PointI {
        PointI::new(self.lx, self.ly)
    }

    /// Inclusive box of the whole canvas.
    #[inline]
    pub fn image_box(&self) -> RectI {
        RectI::new(0, 0, self.lx - 1, self.ly - 1)
    }

    /// Underlying pixels (including the stride padding).
    pub fn buffer(&self) -> &[C] {
        &*self.buf
    }

    pub fn buffer_mut(&mut self) -> &mut [C] {
        &mut *self.buf
    }

    /// Read-only view of this canvas.
    pub fn as_image(&self) -> ImageRef<'_, C> {
        if !self.is_valid() {
            return ImageRef::invalid();
        }
        ImageRef {
            buf: &*self.buf,
            lx: self.lx,
            ly: self.ly,
            stride: self.stride,
        }
    }

    // ------------------------------------------------------------------------
    // Sub-views
    // ------------------------------------------------------------------------

    /// Sub-view over the box `b`, sharing this canvas' memory.
    ///
    /// With `clamp` the box is intersected with the canvas; without it a
    /// box that is not fully inside yields an invalid canvas.
    pub fn sub_view(&mut self, b: RectI, clamp: bool) -> Canvas<'_, C> {
        match self.sub_box(b, clamp) {
            Some(b) => {
                let off = self.offset(b.x1, b.y1);
                Canvas {
                    buf: &mut self.buf[off..],
                    lx: b.width(),
                    ly: b.height(),
                    stride: self.stride,
                }
            }
            None => Canvas::invalid(),
        }
    }

    /// Shrink this canvas in place to the box `b` (clamped).
    pub fn crop(&mut self, b: RectI) {
        match self.sub_box(b, true) {
            Some(b) => {
                let off = self.offset(b.x1, b.y1);
                let buf = core::mem::take(&mut self.buf);
                self.buf = &mut buf[off..];
                self.lx = b.width();
                self.ly = b.height();
            }
            None => self.set_invalid(),
        }
    }

    fn sub_box(&self, mut b: RectI, clamp: bool) -> Option<RectI> {
        if !self.is_valid() {
            return None;
        }
        let ib = self.image_box();
        if clamp {
            if b.clip(&ib) {
                Some(b)
            } else {
                None
            }
        } else if b.is_valid() && ib.contains(&b) {
            Some(b)
        } else {
            None
        }
    }

    // ------------------------------------------------------------------------
    // Pixel access
    // ------------------------------------------------------------------------

    #[inline]
    pub(crate) fn offset(&self, x: i32, y: i32) -> usize {
        x as usize + y as usize * self.stride as usize
    }

    /// Pixels `x..x + len` of row `y`. The caller guarantees the run is
    /// inside the canvas.
    #[inline]
    pub(crate) fn span_mut(&mut self, x: i32, y: i32, len: usize) -> &mut [C] {
        let o = self.offset(x, y);
        &mut self.buf[o..o + len]
    }

    #[inline]
    pub(crate) fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && x < self.lx && y < self.ly
    }

    /// Pixel at (x, y). With `CHECK`, out-of-range positions read as
    /// `C::default()`.
    #[inline]
    pub fn pixel<const CHECK: bool>(&self, x: i32, y: i32) -> C {
        if CHECK && !self.contains(x, y) {
            return C::default();
        }
        self.buf[self.offset(x, y)]
    }

    /// Overwrite the pixel at (x, y). With `CHECK`, out-of-range writes are
    /// dropped.
    #[inline]
    pub fn set_pixel<const CHECK: bool>(&mut self, x: i32, y: i32, c: C) {
        if CHECK && !self.contains(x, y) {
            return;
        }
        let o = self.offset(x, y);
        self.buf[o] = c;
    }

    /// Mutable reference to a pixel, `None` outside the canvas.
    pub fn pixel_mut(&mut self, x: i32, y: i32) -> Option<&mut C> {
        if !self.contains(x, y) {
            return None;
        }
        let o = self.offset(x, y);
        self.buf.get_mut(o)
    }

    /// Checked read.
    #[inline]
    pub fn read_pixel(&self, p: PointI) -> C {
        self.pixel::<true>(p.x, p.y)
    }

    /// Checked write with blending.
    #[inline]
    pub fn draw_pixel(&mut self, p: PointI, c: C, opacity: Opacity) {
        self.put_checked(p.x, p.y, c, opacity.op256());
    }

    /// Read the pixel nearest to a float position.
    pub fn read_pixel_f(&self, p: PointF) -> C {
        self.pixel::<true>(iround(p.x), iround(p.y))
    }

    /// Draw on the pixel nearest to a float position.
    pub fn draw_pixel_f(&mut self, p: PointF, c: C, opacity: Opacity) {
        self.put_checked(iround(p.x), iround(p.y), c, opacity.op256());
    }

    /// Unchecked write with a fixed-point operator (see [`Opacity::op256`]).
    #[inline]
    pub(crate) fn put(&mut self, x: i32, y: i32, c: C, op: i32) {
        let o = self.offset(x, y);
        write_op(&mut self.buf[o], c, op);
    }

    #[inline]
    pub(crate) fn put_checked(&mut self, x: i32, y: i32, c: C, op: i32) {
        if self.contains(x, y) {
            self.put(x, y, c, op);
        }
    }

    /// Unchecked blend with an AA weight in `[0, 256]` scaled by `op`.
    /// Overwrite (`op < 0`) counts as full opacity.
    #[inline]
    pub(crate) fn put_aa(&mut self, x: i32, y: i32, c: C, aa: i32, op: i32) {
        let w = if op < 0 { aa } else { (aa * op) >> 8 };
        let o = self.offset(x, y);
        self.buf[o].blend256(c, w.clamp(0, 256) as u32);
    }

    #[inline]
    pub(crate) fn put_aa_checked(&mut self, x: i32, y: i32, c: C, aa: i32, op: i32) {
        if self.contains(x, y) {
            self.put_aa(x, y, c, aa, op);
        }
    }

    /// Horizontal span `[x1, x2]` on row `y`, clipped.
    pub(crate) fn hline_op(&mut self, mut x1: i32, mut x2: i32, y: i32, c: C, op: i32) {
        if x1 > x2 {
            core::mem::swap(&mut x1, &mut x2);
        }
        if y < 0 || y >= self.ly || x2 < 0 || x1 >= self.lx {
            return;
        }
        let x1 = x1.max(0);
        let x2 = x2.min(self.lx - 1);
        let o = self.offset(x1, y);
        let row = &mut self.buf[o..o + (x2 - x1 + 1) as usize];
        if op < 0 {
            row.fill(c);
        } else {
            for p in row {
                p.blend256(c, op as u32);
            }
        }
    }

    /// Vertical span `[y1, y2]` on column `x`, clipped.
    pub(crate) fn vline_op(&mut self, x: i32, mut y1: i32, mut y2: i32, c: C, op: i32) {
        if y1 > y2 {
            core::mem::swap(&mut y1, &mut y2);
        }
        if x < 0 || x >= self.lx || y2 < 0 || y1 >= self.ly {
            return;
        }
        for y in y1.max(0)..=y2.min(self.ly - 1) {
            self.put(x, y, c, op);
        }
    }

    /// Fill the inclusive box `b`, clipped.
    pub(crate) fn fill_box_op(&mut self, mut b: RectI, c: C, op: i32) {
        b.normalize();
        if !self.is_valid() || !b.clip(&self.image_box()) {
            return;
        }
        for y in b.y1..=b.y2 {
            self.hline_op(b.x1, b.x2, y, c, op);
        }
    }

    // ------------------------------------------------------------------------
    // Iteration
    // ------------------------------------------------------------------------

    /// Call `f(x, y, &mut pixel)` on every pixel in row-major order until it
    /// returns `false`.
    pub fn iterate<F: FnMut(i32, i32, &mut C) -> bool>(&mut self, f: F) {
        let b = self.image_box();
        self.iterate_box(f, b);
    }

    /// Same as [`iterate`](Self::iterate) restricted to the box `b`.
    pub fn iterate_box<F: FnMut(i32, i32, &mut C) -> bool>(&mut self, mut f: F, mut b: RectI) {
        if !self.is_valid() || !b.clip(&self.image_box()) {
            return;
        }
        for y in b.y1..=b.y2 {
            for x in b.x1..=b.x2 {
                let o = self.offset(x, y);
                if !f(x, y, &mut self.buf[o]) {
                    return;
                }
            }
        }
    }

    /// Write a run of `len` pixels starting at (x, y), clipped to the canvas.
    pub fn write_run(&mut self, x: i32, y: i32, len: i32, c: C, opacity: Opacity) {
        if len <= 0 || !self.is_valid() {
            return;
        }
        self.hline_op(x, x.saturating_add(len - 1), y, c, opacity.op256());
    }

    // ------------------------------------------------------------------------
    // Screen fills
    // ------------------------------------------------------------------------

    pub fn fill_screen(&mut self, c: C) {
        if !self.is_valid() {
            return;
        }
        for y in 0..self.ly {
            self.hline_op(0, self.lx - 1, y, c, -1);
        }
    }

    /// Fill with `C::default()`.
    pub fn clear(&mut self) {
        self.fill_screen(C::default());
    }

    /// Horizontal gradient from `left` to `right` over the whole canvas.
    pub fn fill_screen_h_gradient(&mut self, left: C, right: C) {
        let b = self.image_box();
        self.fill_rect_h_gradient(b, left, right, Opacity::Overwrite);
    }

    /// Vertical gradient from `top` to `bottom` over the whole canvas.
    pub fn fill_screen_v_gradient(&mut self, top: C, bottom: C) {
        let b = self.image_box();
        self.fill_rect_v_gradient(b, top, bottom, Opacity::Overwrite);
    }

    // ------------------------------------------------------------------------
    // Lines and rectangles
    // ------------------------------------------------------------------------

    /// Horizontal line of `w` pixels starting at `p`.
    pub fn draw_fast_hline(&mut self, p: PointI, w: i32, c: C, opacity: Opacity) {
        if w > 0 && self.is_valid() {
            self.hline_op(p.x, p.x.saturating_add(w - 1), p.y, c, opacity.op256());
        }
    }

    /// Vertical line of `h` pixels starting at `p`.
    pub fn draw_fast_vline(&mut self, p: PointI, h: i32, c: C, opacity: Opacity) {
        if h > 0 && self.is_valid() {
            self.vline_op(p.x, p.y, p.y.saturating_add(h - 1), c, opacity.op256());
        }
    }

    /// One pixel wide outline of `b`.
    pub fn draw_rect(&mut self, b: RectI, c: C, opacity: Opacity) {
        self.draw_thick_rect(b, 1, c, opacity);
    }

    /// Outline of `b` growing inward by `thickness` pixels.
    pub fn draw_thick_rect(&mut self, mut b: RectI, thickness: i32, c: C, opacity: Opacity) {
        b.normalize();
        if !self.is_valid() || thickness <= 0 {
            return;
        }
        let op = opacity.op256();
        if 2 * thickness >= b.width().min(b.height()) {
            self.fill_box_op(b, c, op);
            return;
        }
        let t = thickness - 1;
        self.fill_box_op(RectI::new(b.x1, b.y1, b.x2, b.y1 + t), c, op);
        self.fill_box_op(RectI::new(b.x1, b.y2 - t, b.x2, b.y2), c, op);
        self.fill_box_op(RectI::new(b.x1, b.y1 + t + 1, b.x1 + t, b.y2 - t - 1), c, op);
        self.fill_box_op(RectI::new(b.x2 - t, b.y1 + t + 1, b.x2, b.y2 - t - 1), c, op);
    }

    pub fn fill_rect(&mut self, b: RectI, c: C, opacity: Opacity) {
        self.fill_box_op(b, c, opacity.op256());
    }

    /// Filled rectangle with a border of `thickness` pixels.
    pub fn fill_thick_rect(
        &mut self,
        mut b: RectI,
        thickness: i32,
        interior: C,
        border: C,
        opacity: Opacity,
    ) {
        b.normalize();
        self.draw_thick_rect(b, thickness, border, opacity);
        let t = thickness.max(0);
        let inner = RectI::new(b.x1 + t, b.y1 + t, b.x2 - t, b.y2 - t);
        if inner.is_valid() {
            self.fill_box_op(inner, interior, opacity.op256());
        }
    }

    /// Fill `b` with a gradient running from `left` to `right`.
    pub fn fill_rect_h_gradient(&mut self, mut b: RectI, left: C, right: C, opacity: Opacity) {
        b.normalize();
        let full = b;
        if !self.is_valid() || !b.clip(&self.image_box()) {
            return;
        }
        let op = opacity.op256();
        let span = (full.width() - 1).max(1);
        for x in b.x1..=b.x2 {
            let t = (((x - full.x1) * 256) / span) as u32;
            let c = C::lerp256(left, right, t);
            self.vline_op(x, b.y1, b.y2, c, op);
        }
    }

    /// Fill `b` with a gradient running from `top` to `bottom`.
    pub fn fill_rect_v_gradient(&mut self, mut b: RectI, top: C, bottom: C, opacity: Opacity) {
        b.normalize();
        let full = b;
        if !self.is_valid() || !b.clip(&self.image_box()) {
            return;
        }
        let op = opacity.op256();
        let span = (full.height() - 1).max(1);
        for y in b.y1..=b.y2 {
            let t = (((y - full.y1) * 256) / span) as u32;
            let c = C::lerp256(top, bottom, t);
            self.hline_op(b.x1, b.x2, y, c, op);
        }
    }

    // ------------------------------------------------------------------------
    // Blitting
    // ------------------------------------------------------------------------

    /// Core of every blit: `f(dst, src)` for each source pixel placed at
    /// `pos` that lands inside this canvas.
    pub(crate) fn blit_clipped<S: Copy, F: FnMut(&mut C, S)>(
        &mut self,
        src: &ImageRef<'_, S>,
        pos: PointI,
        mut f: F,
    ) {
        if !self.is_valid() || !src.is_valid() {
            return;
        }
        let b = match placed_box(pos, src.lx, src.ly, &self.image_box()) {
            Some(b) => b,
            None => return,
        };
        let w = b.width() as usize;
        for y in b.y1..=b.y2 {
            let srow = src.row(y - pos.y);
            let sx = (b.x1 - pos.x) as usize;
            let o = self.offset(b.x1, y);
            let drow = &mut self.buf[o..o + w];
            for (d, s) in drow.iter_mut().zip(&srow[sx..sx + w]) {
                f(d, *s);
            }
        }
    }

    /// Draw `src` with its top-left corner at `pos`.
    pub fn blit(&mut self, src: &ImageRef<'_, C>, pos: PointI, opacity: Opacity) {
        let op = opacity.op256();
        self.blit_clipped(src, pos, |d, s| write_op(d, s, op));
    }

    /// Like [`blit`](Self::blit) but source pixels equal to `transparent`
    /// are skipped.
    pub fn blit_masked(&mut self, src: &ImageRef<'_, C>, transparent: C, pos: PointI, opacity: Opacity) {
        let op = opacity.op256();
        self.blit_clipped(src, pos, |d, s| {
            if s != transparent {
                write_op(d, s, op);
            }
        });
    }

    /// Blit with a custom operator `blend(src, dst) -> new dst`.
    pub fn blit_with<S: Copy, F: FnMut(S, C) -> C>(&mut self, src: &ImageRef<'_, S>, pos: PointI, mut blend: F) {
        self.blit_clipped(src, pos, |d, s| *d = blend(s, *d));
    }

    /// Copy the region of this canvas starting at `pos` into `dst`
    /// (the reverse of [`blit`](Self::blit)).
    pub fn blit_backward(&self, dst: &mut Canvas<'_, C>, pos: PointI) {
        dst.blit_clipped(&self.as_image(), PointI::new(-pos.x, -pos.y), |d, s| *d = s);
    }

    /// Copy `src_box` of this canvas to `pos` in the same canvas. Source and
    /// destination may overlap.
    pub fn blit_within(&mut self, mut src_box: RectI, pos: PointI) {
        src_box.normalize();
        if !self.is_valid() || !src_box.clip(&self.image_box()) {
            return;
        }
        let delta = PointI::new(pos.x - src_box.x1, pos.y - src_box.y1);
        let mut dst_box = src_box.translated(delta);
        if !dst_box.clip(&self.image_box()) {
            return;
        }
        let src_box = dst_box.translated(PointI::new(-delta.x, -delta.y));
        let w = dst_box.width() as usize;
        let copy_row = |canvas: &mut Self, j: i32| {
            let s = canvas.offset(src_box.x1, src_box.y1 + j);
            let d = canvas.offset(dst_box.x1, dst_box.y1 + j);
            canvas.buf.copy_within(s..s + w, d);
        };
        let h = dst_box.height();
        if delta.y > 0 {
            for j in (0..h).rev() {
                copy_row(self, j);
            }
        } else {
            for j in 0..h {
                copy_row(self, j);
            }
        }
    }

    /// Blit `src` rotated clockwise by `quarter_turns * 90` degrees, with the
    /// top-left corner of the rotated image at `pos`.
    pub fn blit_rotated(&mut self, src: &ImageRef<'_, C>, pos: PointI, quarter_turns: i32, opacity: Opacity) {
        if !self.is_valid() || !src.is_valid() {
            return;
        }
        let (sw, sh) = (src.width(), src.height());
        let turns = quarter_turns.rem_euclid(4);
        let (rw, rh) = if turns % 2 == 1 { (sh, sw) } else { (sw, sh) };
        let b = match placed_box(pos, rw, rh, &self.image_box()) {
            Some(b) => b,
            None => return,
        };
        let op = opacity.op256();
        for y in b.y1..=b.y2 {
            for x in b.x1..=b.x2 {
                let (u, v) = (x - pos.x, y - pos.y);
                let (sx, sy) = match turns {
                    0 => (u, v),
                    1 => (v, sh - 1 - u),
                    2 => (sw - 1 - u, sh - 1 - v),
                    _ => (sw - 1 - v, u),
                };
                self.put(x, y, src.pixel::<false>(sx, sy), op);
            }
        }
    }

    // ------------------------------------------------------------------------
    // Downscaling
    // ------------------------------------------------------------------------

    /// Halve the canvas in place with a 2x2 box filter. The result occupies
    /// the top-left corner and is returned as a sub-view.
    pub fn reduce_half(&mut self) -> Canvas<'_, C> {
        if !self.is_valid() {
            return Canvas::invalid();
        }
        let (nx, ny) = ((self.lx / 2).max(1), (self.ly / 2).max(1));
        for j in 0..ny {
            for i in 0..nx {
                let c = self.half_sample(i, j);
                self.set_pixel::<false>(i, j, c);
            }
        }
        self.sub_view(RectI::new(0, 0, nx - 1, ny - 1), false)
    }

    // reads only pixels at or after (i, j) in row-major order
    fn half_sample(&self, i: i32, j: i32) -> C {
        let (x, y) = (2 * i, 2 * j);
        match (self.lx > 1, self.ly > 1) {
            (true, true) => C::mean4(
                self.pixel::<false>(x, y),
                self.pixel::<false>(x + 1, y),
                self.pixel::<false>(x, y + 1),
                self.pixel::<false>(x + 1, y + 1),
            ),
            (true, false) => C::mean2(self.pixel::<false>(x, y), self.pixel::<false>(x + 1, y)),
            (false, true) => C::mean2(self.pixel::<false>(x, y), self.pixel::<false>(x, y + 1)),
            (false, false) => self.pixel::<false>(x, y),
        }
    }

    /// Write a half-size copy of `src` into the top-left corner of this
    /// canvas.
    pub fn copy_reduce_half(&mut self, src: &ImageRef<'_, C>) {
        if !self.is_valid() || !src.is_valid() {
            return;
        }
        let nx = (src.width() / 2).max(1).min(self.lx);
        let ny = (src.height() / 2).max(1).min(self.ly);
        let (wide, tall) = (src.width() > 1, src.height() > 1);
        for j in 0..ny {
            for i in 0..nx {
                let (x, y) = (2 * i, 2 * j);
                let c = match (wide, tall) {
                    (true, true) => C::mean4(
                        src.pixel::<false>(x, y),
                        src.pixel::<false>(x + 1, y),
                        src.pixel::<false>(x, y + 1),
                        src.pixel::<false>(x + 1, y + 1),
                    ),
                    (true, false) => C::mean2(src.pixel::<false>(x, y), src.pixel::<false>(x + 1, y)),
                    (false, true) => C::mean2(src.pixel::<false>(x, y), src.pixel::<false>(x, y + 1)),
                    (false, false) => src.pixel::<false>(x, y),
                };
                self.set_pixel::<false>(i, j, c);
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{Rgb24, Rgb32, Rgb565, Rgb64, Rgbf};

    #[test]
    fn test_invalid_layouts() {
        let mut buf = vec![Rgb32::BLACK; 10];
        assert!(!Canvas::new(&mut buf, 4, 4).is_valid());
        assert!(!Canvas::new(&mut buf, 0, 1).is_valid());
        assert!(!Canvas::with_stride(&mut buf, 4, 2, 3).is_valid());
        // last row needs only `width` pixels
        assert!(Canvas::with_stride(&mut buf, 2, 2, 8).is_valid());
        let mut inv = Canvas::<Rgb32>::invalid();
        inv.fill_screen(Rgb32::RED);
        inv.draw_pixel(PointI::new(0, 0), Rgb32::RED, Opacity::Overwrite);
        assert_eq!(inv.read_pixel(PointI::new(0, 0)), Rgb32::default());
    }

    fn set_get<C: Color>(c: C) {
        let mut buf = vec![C::default(); 12];
        let mut im = Canvas::new(&mut buf, 4, 3);
        im.set_pixel::<true>(3, 2, c);
        assert_eq!(im.pixel::<true>(3, 2), c);
        im.draw_pixel(PointI::new(1, 1), c, Opacity::Overwrite);
        assert_eq!(im.read_pixel(PointI::new(1, 1)), c);
    }

    #[test]
    fn test_set_get_every_encoding() {
        set_get(Rgb565::ORANGE);
        set_get(Rgb24::SALMON);
        set_get(Rgb32::new(10, 20, 30, 40));
        set_get(Rgb64::new(1000, 2000, 3000, 4000));
        set_get(Rgbf::new(0.25, 0.5, 0.75));
    }

    #[test]
    fn test_out_of_range_is_noop() {
        let mut buf = vec![Rgb24::BLACK; 4];
        let mut im = Canvas::new(&mut buf, 2, 2);
        im.set_pixel::<true>(-1, 0, Rgb24::WHITE);
        im.set_pixel::<true>(2, 0, Rgb24::WHITE);
        im.draw_pixel(PointI::new(0, 5), Rgb24::WHITE, Opacity::OPAQUE);
        assert!(im.buffer().iter().all(|&c| c == Rgb24::BLACK));
        assert_eq!(im.pixel::<true>(9, 9), Rgb24::default());
    }

    #[test]
    fn test_sub_view_aliases_parent() {
        let mut buf = vec![Rgb32::BLACK; 100];
        let mut im = Canvas::new(&mut buf, 10, 10);
        {
            let mut sub = im.sub_view(RectI::new(2, 3, 5, 7), false);
            assert_eq!(sub.dim(), PointI::new(4, 5));
            assert_eq!(sub.stride(), 10);
            sub.set_pixel::<true>(1, 1, Rgb32::RED);
        }
        assert_eq!(im.pixel::<true>(3, 4), Rgb32::RED);
        im.set_pixel::<true>(5, 7, Rgb32::BLUE);
        let sub = im.sub_view(RectI::new(2, 3, 5, 7), false);
        assert_eq!(sub.pixel::<true>(3, 4), Rgb32::BLUE);
    }

    #[test]
    fn test_sub_view_clamp() {
        let mut buf = vec![Rgb32::BLACK; 100];
        let mut im = Canvas::new(&mut buf, 10, 10);
        assert!(!im.sub_view(RectI::new(5, 5, 12, 12), false).is_valid());
        assert_eq!(im.sub_view(RectI::new(5, 5, 12, 12), true).dim(), PointI::new(5, 5));
        assert!(!im.sub_view(RectI::new(20, 20, 30, 30), true).is_valid());
    }

    #[test]
    fn test_crop() {
        let mut buf = vec![Rgb32::BLACK; 100];
        let mut im = Canvas::new(&mut buf, 10, 10);
        im.crop(RectI::new(4, 4, 20, 5));
        assert_eq!(im.dim(), PointI::new(6, 2));
        im.fill_screen(Rgb32::GREEN);
        assert_eq!(buf[4 + 4 * 10], Rgb32::GREEN);
        assert_eq!(buf[3 + 4 * 10], Rgb32::BLACK);
        assert_eq!(buf[4 + 6 * 10], Rgb32::BLACK);
    }

    #[test]
    fn test_iterate_stops() {
        let mut buf = vec![Rgb24::BLACK; 9];
        let mut im = Canvas::new(&mut buf, 3, 3);
        let mut n = 0;
        im.iterate(|x, y, c| {
            *c = Rgb24::WHITE;
            n += 1;
            !(x == 1 && y == 1)
        });
        assert_eq!(n, 5);
        assert_eq!(im.pixel::<true>(2, 1), Rgb24::BLACK);
    }

    #[test]
    fn test_write_run_clipped() {
        let mut buf = vec![Rgb24::BLACK; 8];
        let mut im = Canvas::new(&mut buf, 4, 2);
        im.write_run(-2, 1, 4, Rgb24::WHITE, Opacity::Overwrite);
        assert_eq!(im.pixel::<true>(0, 1), Rgb24::WHITE);
        assert_eq!(im.pixel::<true>(1, 1), Rgb24::WHITE);
        assert_eq!(im.pixel::<true>(2, 1), Rgb24::BLACK);
        im.write_run(0, 5, 4, Rgb24::WHITE, Opacity::Overwrite);
    }

    #[test]
    fn test_runs_near_coordinate_limits() {
        let mut buf = vec![Rgb24::BLACK; 8];
        let mut im = Canvas::new(&mut buf, 4, 2);
        im.write_run(i32::MAX - 2, 1, 10, Rgb24::WHITE, Opacity::Overwrite);
        im.draw_fast_hline(PointI::new(i32::MAX - 1, 0), 5, Rgb24::WHITE, Opacity::Overwrite);
        im.draw_fast_vline(PointI::new(1, i32::MAX - 1), 5, Rgb24::WHITE, Opacity::Overwrite);
        im.write_run(i32::MIN, 0, i32::MAX, Rgb24::RED, Opacity::Overwrite);
        assert!(buf.iter().all(|&p| p == Rgb24::BLACK));
        let mut im = Canvas::new(&mut buf, 4, 2);
        im.draw_fast_hline(PointI::new(2, 1), i32::MAX, Rgb24::RED, Opacity::Overwrite);
        assert_eq!(&buf[4..], [Rgb24::BLACK, Rgb24::BLACK, Rgb24::RED, Rgb24::RED]);
    }

    #[test]
    fn test_thick_rect() {
        let mut buf = vec![Rgb24::BLACK; 100];
        let mut im = Canvas::new(&mut buf, 10, 10);
        im.fill_thick_rect(RectI::new(0, 0, 9, 9), 2, Rgb24::RED, Rgb24::WHITE, Opacity::Overwrite);
        assert_eq!(im.pixel::<true>(1, 5), Rgb24::WHITE);
        assert_eq!(im.pixel::<true>(2, 5), Rgb24::RED);
        assert_eq!(im.pixel::<true>(8, 8), Rgb24::WHITE);
        assert_eq!(im.pixel::<true>(7, 7), Rgb24::RED);
    }

    #[test]
    fn test_gradient_endpoints() {
        let mut buf = vec![Rgb24::BLACK; 50];
        let mut im = Canvas::new(&mut buf, 10, 5);
        im.fill_screen_h_gradient(Rgb24::BLACK, Rgb24::WHITE);
        assert_eq!(im.pixel::<true>(0, 2), Rgb24::BLACK);
        assert_eq!(im.pixel::<true>(9, 2), Rgb24::WHITE);
        im.fill_screen_v_gradient(Rgb24::RED, Rgb24::BLUE);
        assert_eq!(im.pixel::<true>(3, 0), Rgb24::RED);
        assert_eq!(im.pixel::<true>(3, 4), Rgb24::BLUE);
    }

    #[test]
    fn test_blit_and_mask() {
        let sprite = [Rgb24::RED, Rgb24::GREEN, Rgb24::GREEN, Rgb24::BLUE];
        let src = ImageRef::new(&sprite, 2, 2);
        let mut buf = vec![Rgb24::BLACK; 16];
        let mut im = Canvas::new(&mut buf, 4, 4);
        im.blit(&src, PointI::new(3, 3), Opacity::Overwrite);
        assert_eq!(im.pixel::<true>(3, 3), Rgb24::RED);
        im.blit_masked(&src, Rgb24::GREEN, PointI::new(0, 0), Opacity::Overwrite);
        assert_eq!(im.pixel::<true>(0, 0), Rgb24::RED);
        assert_eq!(im.pixel::<true>(1, 0), Rgb24::BLACK);
        assert_eq!(im.pixel::<true>(1, 1), Rgb24::BLUE);
    }

    #[test]
    fn test_blit_with_converts() {
        let sprite = [Rgb565::WHITE; 4];
        let src = ImageRef::new(&sprite, 2, 2);
        let mut buf = vec![Rgb32::BLACK; 4];
        let mut im = Canvas::new(&mut buf, 2, 2);
        im.blit_with(&src, PointI::new(0, 0), |s, _d| Rgb32::from(s));
        assert!(im.buffer().iter().all(|&c| c == Rgb32::WHITE));
    }

    #[test]
    fn test_blit_backward() {
        let mut buf = vec![Rgb24::BLACK; 16];
        let mut im = Canvas::new(&mut buf, 4, 4);
        im.set_pixel::<true>(2, 1, Rgb24::RED);
        let mut sbuf = vec![Rgb24::WHITE; 4];
        let mut sprite = Canvas::new(&mut sbuf, 2, 2);
        im.blit_backward(&mut sprite, PointI::new(1, 1));
        assert_eq!(sprite.pixel::<true>(1, 0), Rgb24::RED);
        assert_eq!(sprite.pixel::<true>(0, 0), Rgb24::BLACK);
    }

    #[test]
    fn test_blit_within_overlap() {
        let mut buf: Vec<Rgb24> = (0..5).map(|i| Rgb24::new(i, 0, 0)).collect();
        let mut im = Canvas::new(&mut buf, 5, 1);
        im.blit_within(RectI::new(0, 0, 3, 0), PointI::new(1, 0));
        let rs: Vec<u8> = im.buffer().iter().map(|c| c.r).collect();
        assert_eq!(rs, vec![0, 0, 1, 2, 3]);

        let mut col: Vec<Rgb24> = (0..4).map(|i| Rgb24::new(i, 0, 0)).collect();
        let mut v = Canvas::new(&mut col, 1, 4);
        v.blit_within(RectI::new(0, 0, 0, 2), PointI::new(0, 1));
        let rs: Vec<u8> = v.buffer().iter().map(|c| c.r).collect();
        assert_eq!(rs, vec![0, 0, 1, 2]);
    }

    #[test]
    fn test_blit_rotated() {
        // 2x1 sprite [A B] turned 90 degrees clockwise is a column [A; B]
        let sprite = [Rgb24::RED, Rgb24::BLUE];
        let src = ImageRef::new(&sprite, 2, 1);
        let mut buf = vec![Rgb24::BLACK; 4];
        let mut im = Canvas::new(&mut buf, 2, 2);
        im.blit_rotated(&src, PointI::new(0, 0), 1, Opacity::Overwrite);
        assert_eq!(im.pixel::<true>(0, 0), Rgb24::RED);
        assert_eq!(im.pixel::<true>(0, 1), Rgb24::BLUE);
        im.blit_rotated(&src, PointI::new(0, 1), 2, Opacity::Overwrite);
        assert_eq!(im.pixel::<true>(0, 1), Rgb24::BLUE);
        assert_eq!(im.pixel::<true>(1, 1), Rgb24::RED);
    }

    #[test]
    fn test_reduce_half() {
        let mut buf = vec![Rgb24::BLACK; 16];
        let mut im = Canvas::new(&mut buf, 4, 4);
        im.fill_rect(RectI::new(0, 0, 1, 1), Rgb24::WHITE, Opacity::Overwrite);
        im.set_pixel::<true>(2, 0, Rgb24::WHITE);
        im.set_pixel::<true>(3, 1, Rgb24::WHITE);
        let half = im.reduce_half();
        assert_eq!(half.dim(), PointI::new(2, 2));
        assert_eq!(half.pixel::<true>(0, 0), Rgb24::WHITE);
        assert_eq!(half.pixel::<true>(1, 0), Rgb24::new(127, 127, 127));
        assert_eq!(half.pixel::<true>(1, 1), Rgb24::BLACK);
    }

    #[test]
    fn test_copy_reduce_half() {
        let src_px = [Rgb24::WHITE, Rgb24::WHITE, Rgb24::BLACK, Rgb24::BLACK];
        let src = ImageRef::new(&src_px, 4, 1);
        let mut buf = vec![Rgb24::RED; 2];
        let mut im = Canvas::new(&mut buf, 2, 1);
        im.copy_reduce_half(&src);
        assert_eq!(im.pixel::<true>(0, 0), Rgb24::WHITE);
        assert_eq!(im.pixel::<true>(1, 0), Rgb24::BLACK);
    }

    #[test]
    fn test_image_ref_sub_image() {
        let px: Vec<Rgb24> = (0..12).map(|i| Rgb24::new(i, 0, 0)).collect();
        let im = ImageRef::new(&px, 4, 3);
        let s = im.sub_image(RectI::new(1, 1, 2, 2));
        assert_eq!(s.dim(), PointI::new(2, 2));
        assert_eq!(s.pixel::<true>(0, 0).r, 5);
        assert_eq!(s.pixel::<true>(1, 1).r, 10);
        assert_eq!(s.pixel::<true>(2, 0), Rgb24::default());
    }
}
