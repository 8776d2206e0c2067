//! Scanline seed fill with a bounded span stack.
//!
//! The classic "Graphics Gems" seed fill: every stack entry is a run of
//! already filled pixels together with the direction of the row that still
//! has to be scanned. Entries are packed in 6 bytes (`x1`, `x2`, `y << 1 |
//! dir` as little-endian `u16`) inside a byte array that lives on the call
//! stack, so the fill never allocates. Its size is the `STACK_BYTES` const
//! parameter; [`DEFAULT_FLOOD_STACK`](crate::config::DEFAULT_FLOOD_STACK) is
//! a reasonable choice for most shapes.

use crate::basics::PointI;
use crate::canvas::Canvas;
use crate::color::Color;
use crate::error::{FillError, Result};

const ENTRY_BYTES: usize = 6;

/// Largest canvas the packed entries can address.
const MAX_LX: i32 = u16::MAX as i32 + 1;
const MAX_LY: i32 = (u16::MAX >> 1) as i32;

/// Fixed-capacity stack of packed spans over a borrowed byte array.
struct SpanStack<'s> {
    mem: &'s mut [u8],
    len: usize,
    peak: usize,
    ly: i32,
}

impl<'s> SpanStack<'s> {
    fn new(mem: &'s mut [u8], ly: i32) -> Self {
        Self { mem, len: 0, peak: 0, ly }
    }

    fn capacity(&self) -> usize {
        self.mem.len() / ENTRY_BYTES
    }

    /// Record that `[x1, x2] x {y}` was filled and row `y + dy` must be
    /// scanned. Rows outside the canvas are dropped, but a full stack is an
    /// error either way.
    fn push(&mut self, x1: i32, x2: i32, y: i32, dy: i32) -> Result<()> {
        if self.len == self.capacity() {
            return Err(FillError::StackOverflow {
                capacity: self.mem.len(),
            });
        }
        if y + dy < 0 || y + dy >= self.ly {
            return Ok(());
        }
        let yd = ((y as u16) << 1) | (dy > 0) as u16;
        let o = self.len * ENTRY_BYTES;
        self.mem[o..o + 2].copy_from_slice(&(x1 as u16).to_le_bytes());
        self.mem[o + 2..o + 4].copy_from_slice(&(x2 as u16).to_le_bytes());
        self.mem[o + 4..o + 6].copy_from_slice(&yd.to_le_bytes());
        self.len += 1;
        self.peak = self.peak.max(self.len);
        Ok(())
    }

    /// Next `(x1, x2, y, dy)` where `y` is the row to scan.
    fn pop(&mut self) -> Option<(i32, i32, i32, i32)> {
        if self.len == 0 {
            return None;
        }
        self.len -= 1;
        let o = self.len * ENTRY_BYTES;
        let word = |i: usize| u16::from_le_bytes([self.mem[o + i], self.mem[o + i + 1]]);
        let yd = word(4);
        let dy = if yd & 1 == 1 { 1 } else { -1 };
        Some((word(0) as i32, word(2) as i32, (yd >> 1) as i32 + dy, dy))
    }

    fn peak_bytes(&self) -> usize {
        self.peak * ENTRY_BYTES
    }
}

impl<'a, C: Color> Canvas<'a, C> {
    /// Replace the 4-connected region of pixels with the color found at
    /// `pos` by `new_color`.
    ///
    /// Returns the peak number of stack bytes used. A seed outside the
    /// canvas, or one that already has `new_color`, does nothing and returns
    /// `Ok(0)`. When the region needs more than `STACK_BYTES` bytes of
    /// stack the fill stops with [`FillError::StackOverflow`], leaving the
    /// canvas partially filled.
    pub fn flood_fill<const STACK_BYTES: usize>(&mut self, pos: PointI, new_color: C) -> Result<usize> {
        if !self.contains(pos.x, pos.y) {
            return Ok(0);
        }
        let orig = self.pixel::<false>(pos.x, pos.y);
        if orig == new_color {
            return Ok(0);
        }
        self.scan_fill::<STACK_BYTES, _>(pos, new_color, |c| c == orig)
    }

    /// Fill the 4-connected region around `pos` bounded by pixels of color
    /// `border` (or already of `new_color`). Same contract as
    /// [`flood_fill`](Self::flood_fill).
    pub fn flood_fill_bordered<const STACK_BYTES: usize>(
        &mut self,
        pos: PointI,
        border: C,
        new_color: C,
    ) -> Result<usize> {
        if !self.contains(pos.x, pos.y) {
            return Ok(0);
        }
        self.scan_fill::<STACK_BYTES, _>(pos, new_color, |c| c != border && c != new_color)
    }

    fn scan_fill<const STACK_BYTES: usize, F: Fn(C) -> bool>(
        &mut self,
        pos: PointI,
        new_color: C,
        inside: F,
    ) -> Result<usize> {
        let (lx, ly) = (self.width(), self.height());
        if lx > MAX_LX || ly > MAX_LY {
            log::debug!("flood fill: {}x{} canvas too large, nothing filled", lx, ly);
            return Ok(0);
        }
        if !inside(self.pixel::<false>(pos.x, pos.y)) {
            return Ok(0);
        }
        let mut mem = [0u8; STACK_BYTES];
        let mut stack = SpanStack::new(&mut mem, ly);
        match self.scan_spans(&mut stack, pos, new_color, &inside) {
            Ok(()) => Ok(stack.peak_bytes()),
            Err(e) => {
                log::warn!("flood fill from ({}, {}) aborted: {}", pos.x, pos.y, e);
                Err(e)
            }
        }
    }

    fn scan_spans<F: Fn(C) -> bool>(
        &mut self,
        stack: &mut SpanStack<'_>,
        pos: PointI,
        new_color: C,
        inside: &F,
    ) -> Result<()> {
        let lx = self.width();
        stack.push(pos.x, pos.x, pos.y, 1)?;
        stack.push(pos.x, pos.x, pos.y + 1, -1)?;
        while let Some((x1, x2, y, dy)) = stack.pop() {
            // the run [x1, x2] of row y - dy is filled
            let mut x = x1;
            while x >= 0 && inside(self.pixel::<false>(x, y)) {
                self.set_pixel::<false>(x, y, new_color);
                x -= 1;
            }
            let mut skip = x >= x1;
            let mut start = x + 1;
            if !skip {
                if start < x1 {
                    stack.push(start, x1 - 1, y, -dy)?;
                }
                x = x1 + 1;
            }
            loop {
                if !skip {
                    while x < lx && inside(self.pixel::<false>(x, y)) {
                        self.set_pixel::<false>(x, y, new_color);
                        x += 1;
                    }
                    stack.push(start, x - 1, y, dy)?;
                    if x > x2 + 1 {
                        stack.push(x2 + 1, x - 1, y, -dy)?;
                    }
                }
                skip = false;
                x += 1;
                while x <= x2 && !inside(self.pixel::<false>(x, y)) {
                    x += 1;
                }
                start = x;
                if x > x2 {
                    break;
                }
            }
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
