//! Seam-free edge drawing on top of [`ScanStepper`].
//!
//! Polygons are drawn edge by edge. Where edges meet, the naive approach
//! writes the shared pixels once per edge, which shows up as darker seams
//! when blending. The `seg_avoid*` family draws an edge `PQ` while skipping
//! every pixel that also belongs to a neighbouring edge leaving `P`
//! ("start" neighbours) or arriving at `Q` ("end" neighbours); the
//! neighbour draws those pixels instead. Each shared vertex pixel is then
//! written exactly once, with the smallest of the converging coverages.
//!
//! Naming follows the number of neighbours at each end: `seg_avoid21` has
//! two neighbours at `P` and one at `Q`.
//!
//! `side` selects the coverage model: `0` writes whole pixels, `+1`/`-1`
//! weight each pixel by its coverage on that side of the oriented edge.

use crate::canvas::Canvas;
use crate::color::Color;
use crate::scan_stepper::ScanStepper;

/// A neighbouring edge walked in lockstep with the edge being drawn. The
/// current pixel of the main edge is skipped when it coincides with the
/// neighbour's pixel and the step index lies in `[lo, hi]`.
#[derive(Debug, Clone, Copy)]
struct Guard {
    seg: ScanStepper,
    lo: i32,
    hi: i32,
}

impl Guard {
    /// Neighbour leaving the same start point.
    fn start(mut seg: ScanStepper, closed: bool) -> Self {
        if closed {
            seg.inc_len();
        }
        Self {
            lo: 0,
            hi: seg.len() - 1,
            seg,
        }
    }

    /// Neighbour leaving the end point of `main`, re-oriented so that it
    /// arrives on the end point at the same step as `main`.
    fn end(main: &ScanStepper, mut seg: ScanStepper, closed: bool) -> Self {
        let dd = (main.len() - seg.len()) + if closed { 0 } else { 1 };
        seg.set_len(main.len());
        seg.reverse();
        Self {
            seg,
            lo: dd,
            hi: i32::MAX,
        }
    }

    #[inline]
    fn blocks(&self, l: i32, main: &ScanStepper) -> bool {
        l >= self.lo && l <= self.hi && main.same_pos(&self.seg)
    }
}

impl<'a, C: Color> Canvas<'a, C> {
    /// Write the current pixel of `seg`.
    #[inline]
    fn seg_update_pixel(&mut self, seg: &ScanStepper, c: C, side: i32, op: i32) {
        if side != 0 {
            self.put_aa_checked(seg.x(), seg.y(), c, seg.coverage(side), op);
        } else {
            self.put_checked(seg.x(), seg.y(), c, op);
        }
    }

    /// Write the current pixel of `seg` with an explicit coverage.
    #[inline]
    fn seg_update_pixel_aa(&mut self, seg: &ScanStepper, c: C, side: i32, aa: i32, op: i32) {
        if side != 0 {
            self.put_aa_checked(seg.x(), seg.y(), c, aa, op);
        } else {
            self.put_checked(seg.x(), seg.y(), c, op);
        }
    }

    /// Advance `seg` into the canvas and cut it where it leaves.
    /// Returns the number of steps skipped, `None` when nothing is left.
    fn seg_clip(&self, seg: &mut ScanStepper) -> Option<i32> {
        let b = self.image_box();
        let r = seg.move_inside_box(&b)?;
        if seg.len() <= 0 {
            return None;
        }
        let inside = seg.len_inside_box(&b);
        if inside < seg.len() {
            seg.set_len(inside);
        }
        Some(r)
    }

    /// Draw the segment. `draw_first`/`draw_last` choose whether the
    /// endpoints are written.
    pub(crate) fn seg_draw(
        &mut self,
        mut seg: ScanStepper,
        draw_first: bool,
        draw_last: bool,
        c: C,
        side: i32,
        op: i32,
    ) {
        if !draw_first {
            seg.advance();
        }
        if draw_last {
            seg.inc_len();
        }
        if self.seg_clip(&mut seg).is_none() {
            return;
        }
        while seg.len() > 0 {
            self.seg_update_pixel(&seg, c, side, op);
            seg.advance();
        }
    }

    /// Draw a thin anti-aliased segment: every step splits its weight
    /// between the current pixel and its neighbour across the line.
    pub(crate) fn seg_draw_aa(&mut self, mut seg: ScanStepper, draw_first: bool, draw_last: bool, c: C, op: i32) {
        if !draw_first {
            seg.advance();
        }
        if draw_last {
            seg.inc_len();
        }
        if self.seg_clip(&mut seg).is_none() {
            return;
        }
        let x_major = seg.x_major();
        while seg.len() > 0 {
            let (aa, dir) = seg.coverage_both();
            let (x, y) = (seg.x(), seg.y());
            self.put_aa_checked(x, y, c, aa, op);
            if x_major {
                self.put_aa_checked(x, y + dir, c, 256 - aa, op);
            } else {
                self.put_aa_checked(x + dir, y, c, 256 - aa, op);
            }
            seg.advance();
        }
    }

    /// Walk `main`, writing every pixel not claimed by one of `guards`.
    fn seg_avoid_walk(&mut self, mut main: ScanStepper, guards: &mut [Guard], c: C, side: i32, op: i32) {
        if let Some(r) = self.seg_clip(&mut main) {
            if r > 0 {
                for g in guards.iter_mut() {
                    g.seg.advance_by(r);
                    g.lo = g.lo.saturating_sub(r);
                    g.hi = g.hi.saturating_sub(r);
                }
            }
        } else {
            return;
        }
        let len = main.len();
        for l in 0..len {
            if !guards.iter().any(|g| g.blocks(l, &main)) {
                self.seg_update_pixel(&main, c, side, op);
            }
            main.advance();
            for g in guards.iter_mut() {
                g.seg.advance();
            }
        }
    }

    /// Draw `pq`, skipping the pixels of `pa` (which shares `P`).
    ///
    /// `draw_p` writes `P` itself with the minimum of both coverages.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn seg_avoid1(
        &mut self,
        mut pq: ScanStepper,
        pa: ScanStepper,
        draw_p: bool,
        draw_q: bool,
        closed_pa: bool,
        c: C,
        side: i32,
        op: i32,
    ) {
        if draw_p {
            let aa = if side == 0 {
                256
            } else {
                pq.coverage(side).min(pa.coverage(-side))
            };
            self.seg_update_pixel_aa(&pq, c, side, aa, op);
        }
        if draw_q {
            pq.inc_len();
        }
        let mut guards = [Guard::start(pa, closed_pa)];
        self.seg_avoid_walk(pq, &mut guards, c, side, op);
    }

    /// Draw `pq`, skipping the pixels of `pa` and `pb` (both sharing `P`).
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn seg_avoid2(
        &mut self,
        mut pq: ScanStepper,
        pa: ScanStepper,
        pb: ScanStepper,
        draw_q: bool,
        closed_pa: bool,
        closed_pb: bool,
        c: C,
        side: i32,
        op: i32,
    ) {
        if draw_q {
            pq.inc_len();
        }
        let mut guards = [Guard::start(pa, closed_pa), Guard::start(pb, closed_pb)];
        self.seg_avoid_walk(pq, &mut guards, c, side, op);
    }

    /// Draw `pq`, skipping the pixels of `pa` (sharing `P`) and `qb`
    /// (sharing `Q`). The endpoints are written with the minimum coverage of
    /// the converging edges when `draw_p` / `draw_q` are set.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn seg_avoid11(
        &mut self,
        pq: ScanStepper,
        pa: ScanStepper,
        qb: ScanStepper,
        draw_p: bool,
        draw_q: bool,
        closed_pa: bool,
        closed_qb: bool,
        c: C,
        side: i32,
        op: i32,
    ) {
        if draw_p {
            let aa = if side == 0 {
                256
            } else {
                pq.coverage(side).min(pa.coverage(-side))
            };
            self.seg_update_pixel_aa(&pq, c, side, aa, op);
        }
        if draw_q {
            let aa = if side == 0 {
                256
            } else {
                let mut at_q = pq;
                at_q.advance_by(pq.len());
                at_q.coverage(side).min(qb.coverage(side))
            };
            self.seg_update_pixel_aa(&qb, c, side, aa, op);
        }
        let mut guards = [Guard::start(pa, closed_pa), Guard::end(&pq, qb, closed_qb)];
        self.seg_avoid_walk(pq, &mut guards, c, side, op);
    }

    /// Draw `pq` avoiding `pa`, `pb` (at `P`) and `qc` (at `Q`).
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn seg_avoid21(
        &mut self,
        pq: ScanStepper,
        pa: ScanStepper,
        pb: ScanStepper,
        qc: ScanStepper,
        closed_pa: bool,
        closed_pb: bool,
        closed_qc: bool,
        c: C,
        side: i32,
        op: i32,
    ) {
        let mut guards = [
            Guard::start(pa, closed_pa),
            Guard::start(pb, closed_pb),
            Guard::end(&pq, qc, closed_qc),
        ];
        self.seg_avoid_walk(pq, &mut guards, c, side, op);
    }

    /// Draw `pq` avoiding `pa`, `pb` (at `P`) and `qc`, `qd` (at `Q`).
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn seg_avoid22(
        &mut self,
        pq: ScanStepper,
        pa: ScanStepper,
        pb: ScanStepper,
        qc: ScanStepper,
        qd: ScanStepper,
        closed_pa: bool,
        closed_pb: bool,
        closed_qc: bool,
        closed_qd: bool,
        c: C,
        side: i32,
        op: i32,
    ) {
        let mut guards = [
            Guard::start(pa, closed_pa),
            Guard::start(pb, closed_pb),
            Guard::end(&pq, qc, closed_qc),
            Guard::end(&pq, qd, closed_qd),
        ];
        self.seg_avoid_walk(pq, &mut guards, c, side, op);
    }
}

// ============================================================================
// Tests
// ============================================================================
