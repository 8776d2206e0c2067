//! Color types, blending and conversions.
//!
//! Pixel encodings supported by [`Canvas`](crate::canvas::Canvas):
//! - [`Rgb565`]: 16-bit packed RGB (5/6/5)
//! - [`Rgb24`]: 8 bits per channel, no alpha
//! - [`Rgb32`]: 8 bits per channel with premultiplied alpha
//! - [`Rgb64`]: 16 bits per channel with premultiplied alpha
//! - [`Rgbf`]: float channels in `[0, 1]`, no alpha
//!
//! [`Hsv`] is a value type only; it converts to and from the RGB types.
//!
//! All blending goes through [`Color::blend256`], with a weight in
//! `[0, 256]`. For alpha types the source is composited *over* the
//! destination (premultiplied), and the weight scales the source.

use core::fmt::Debug;

// ============================================================================
// Opacity
// ============================================================================

/// How a drawing operation combines its color with the destination.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Opacity {
    /// Write the source color as is, ignoring its alpha channel.
    Overwrite,
    /// Composite the source over the destination with this multiplier in
    /// `(0, 1]`.
    Blend(f32),
}

impl Opacity {
    /// Full-strength blending.
    pub const OPAQUE: Opacity = Opacity::Blend(1.0);

    /// Fixed-point operator: `-1` for overwrite, else the multiplier scaled
    /// to `[0, 256]`.
    #[inline]
    pub fn op256(self) -> i32 {
        match self {
            Opacity::Overwrite => -1,
            Opacity::Blend(a) => weight256(a) as i32,
        }
    }

    /// Operator for anti-aliased primitives, which always composite:
    /// overwrite counts as full opacity.
    #[inline]
    pub fn aa_op(self) -> i32 {
        match self {
            Opacity::Overwrite => 256,
            a => a.op256(),
        }
    }

    #[inline]
    pub fn is_overwrite(self) -> bool {
        matches!(self, Opacity::Overwrite)
    }
}

impl From<f32> for Opacity {
    /// Negative values mean overwrite.
    fn from(a: f32) -> Self {
        if a < 0.0 {
            Opacity::Overwrite
        } else {
            Opacity::Blend(a.min(1.0))
        }
    }
}

/// `a` in `[0, 1]` as a rounded weight in `[0, 256]`.
#[inline]
fn weight256(a: f32) -> u32 {
    ((a * 256.0 + 0.5) as i32).clamp(0, 256) as u32
}

/// Write `src` into `dst` using a fixed-point operator from
/// [`Opacity::op256`].
#[inline]
pub fn write_op<C: Color>(dst: &mut C, src: C, op: i32) {
    if op < 0 {
        *dst = src;
    } else {
        dst.blend256(src, op as u32);
    }
}

// ============================================================================
// Color trait
// ============================================================================

/// Common interface of every pixel encoding.
pub trait Color:
    Copy + PartialEq + Default + Debug + From<Rgb32> + Into<Rgb32> + From<Rgbf> + Into<Rgbf>
{
    /// True when the encoding carries a (premultiplied) alpha channel.
    const HAS_ALPHA: bool;

    /// Composite `fg` over `self` with weight `alpha` in `[0, 256]`.
    fn blend256(&mut self, fg: Self, alpha: u32);

    /// Float version of [`blend256`](Self::blend256).
    #[inline]
    fn blend(&mut self, fg: Self, alpha: f32) {
        self.blend256(fg, weight256(alpha));
    }

    /// Channel-wise linear interpolation (alpha included), `t` in `[0, 256]`.
    fn lerp256(a: Self, b: Self, t: u32) -> Self;

    #[inline]
    fn lerp(a: Self, b: Self, t: f32) -> Self {
        Self::lerp256(a, b, weight256(t))
    }

    /// Bilinear interpolation with 8-bit weights `ax`, `ay` in `[0, 256]`.
    fn interpolate_bilinear(c00: Self, c10: Self, c01: Self, c11: Self, ax: u32, ay: u32) -> Self;

    fn mean2(a: Self, b: Self) -> Self;

    fn mean4(a: Self, b: Self, c: Self, d: Self) -> Self;

    /// Alpha in `[0, 1]`, 1 for encodings without alpha.
    #[inline]
    fn opacity(&self) -> f32 {
        1.0
    }

    /// Multiply every channel by `op`; no-op without alpha.
    #[inline]
    fn mult_opacity(&mut self, _op: f32) {}

    /// Convert straight alpha to premultiplied alpha; no-op without alpha.
    #[inline]
    fn premultiply(&mut self) {}

    /// Gray level in `[0, 255]`.
    fn luminance(self) -> u8 {
        let c: Rgb32 = self.into();
        ((c.r as u32 * 77 + c.g as u32 * 151 + c.b as u32 * 28) >> 8) as u8
    }
}

// ============================================================================
// Rgb565
// ============================================================================

/// 16-bit color, red in the high bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
#[repr(transparent)]
pub struct Rgb565 {
    pub val: u16,
}

const SPREAD_565: u32 = 0x07E0_F81F;

impl Rgb565 {
    /// From 5/6/5-bit channels.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self {
            val: ((r as u16 & 31) << 11) | ((g as u16 & 63) << 5) | (b as u16 & 31),
        }
    }

    /// From 8-bit channels.
    pub const fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::new(r >> 3, g >> 2, b >> 3)
    }

    #[inline]
    pub fn r(self) -> u8 {
        (self.val >> 11) as u8
    }

    #[inline]
    pub fn g(self) -> u8 {
        ((self.val >> 5) & 63) as u8
    }

    #[inline]
    pub fn b(self) -> u8 {
        (self.val & 31) as u8
    }

    #[inline]
    fn spread(self) -> u32 {
        (self.val as u32 | ((self.val as u32) << 16)) & SPREAD_565
    }

    #[inline]
    fn contract(v: u32) -> Self {
        let v = v & SPREAD_565;
        Self {
            val: ((v >> 16) | v) as u16,
        }
    }

    pub const BLACK: Self = Self::from_rgb8(0, 0, 0);
    pub const WHITE: Self = Self::from_rgb8(255, 255, 255);
    pub const RED: Self = Self::from_rgb8(255, 0, 0);
    pub const GREEN: Self = Self::from_rgb8(0, 255, 0);
    pub const BLUE: Self = Self::from_rgb8(0, 0, 255);
    pub const PURPLE: Self = Self::from_rgb8(128, 0, 128);
    pub const ORANGE: Self = Self::from_rgb8(255, 135, 0);
    pub const CYAN: Self = Self::from_rgb8(0, 255, 255);
    pub const SALMON: Self = Self::from_rgb8(250, 128, 114);
    pub const MAROON: Self = Self::from_rgb8(128, 0, 0);
    pub const YELLOW: Self = Self::from_rgb8(255, 255, 0);
    pub const MAGENTA: Self = Self::from_rgb8(255, 0, 255);
    pub const OLIVE: Self = Self::from_rgb8(128, 128, 0);
    pub const TEAL: Self = Self::from_rgb8(0, 128, 128);
    pub const GRAY: Self = Self::from_rgb8(128, 128, 128);
    pub const SILVER: Self = Self::from_rgb8(192, 192, 192);
    pub const NAVY: Self = Self::from_rgb8(0, 0, 128);
}

impl Color for Rgb565 {
    const HAS_ALPHA: bool = false;

    #[inline]
    fn blend256(&mut self, fg: Self, alpha: u32) {
        let a = alpha >> 3;
        let bg = self.spread();
        let r = ((fg.spread().wrapping_sub(bg)).wrapping_mul(a) >> 5).wrapping_add(bg);
        *self = Self::contract(r);
    }

    #[inline]
    fn lerp256(a: Self, b: Self, t: u32) -> Self {
        let mut c = a;
        c.blend256(b, t);
        c
    }

    fn interpolate_bilinear(c00: Self, c10: Self, c01: Self, c11: Self, ax: u32, ay: u32) -> Self {
        // 5-bit weights keep the spread channels from overlapping
        let ax = ax >> 3;
        let ay = ay >> 3;
        let w00 = (32 - ax) * (32 - ay);
        let w10 = ax * (32 - ay);
        let w01 = (32 - ax) * ay;
        let w11 = ax * ay;
        let mix = |f: fn(Rgb565) -> u8| -> u8 {
            ((f(c00) as u32 * w00 + f(c10) as u32 * w10 + f(c01) as u32 * w01 + f(c11) as u32 * w11)
                >> 10) as u8
        };
        Self::new(mix(Rgb565::r), mix(Rgb565::g), mix(Rgb565::b))
    }

    fn mean2(a: Self, b: Self) -> Self {
        Self::new(
            ((a.r() as u16 + b.r() as u16) >> 1) as u8,
            ((a.g() as u16 + b.g() as u16) >> 1) as u8,
            ((a.b() as u16 + b.b() as u16) >> 1) as u8,
        )
    }

    fn mean4(a: Self, b: Self, c: Self, d: Self) -> Self {
        Self::new(
            ((a.r() as u16 + b.r() as u16 + c.r() as u16 + d.r() as u16) >> 2) as u8,
            ((a.g() as u16 + b.g() as u16 + c.g() as u16 + d.g() as u16) >> 2) as u8,
            ((a.b() as u16 + b.b() as u16 + c.b() as u16 + d.b() as u16) >> 2) as u8,
        )
    }
}

// ============================================================================
// Rgb24
// ============================================================================

/// 8 bits per channel, no alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
#[repr(C)]
pub struct Rgb24 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb24 {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const BLACK: Self = Self::new(0, 0, 0);
    pub const WHITE: Self = Self::new(255, 255, 255);
    pub const RED: Self = Self::new(255, 0, 0);
    pub const GREEN: Self = Self::new(0, 255, 0);
    pub const BLUE: Self = Self::new(0, 0, 255);
    pub const PURPLE: Self = Self::new(128, 0, 128);
    pub const ORANGE: Self = Self::new(255, 135, 0);
    pub const CYAN: Self = Self::new(0, 255, 255);
    pub const SALMON: Self = Self::new(250, 128, 114);
    pub const MAROON: Self = Self::new(128, 0, 0);
    pub const YELLOW: Self = Self::new(255, 255, 0);
    pub const MAGENTA: Self = Self::new(255, 0, 255);
    pub const OLIVE: Self = Self::new(128, 128, 0);
    pub const TEAL: Self = Self::new(0, 128, 128);
    pub const GRAY: Self = Self::new(128, 128, 128);
    pub const SILVER: Self = Self::new(192, 192, 192);
    pub const NAVY: Self = Self::new(0, 0, 128);
}

#[inline]
fn lerp8(a: u8, b: u8, t: u32) -> u8 {
    ((b as u32 * t + a as u32 * (256 - t)) >> 8) as u8
}

#[inline]
fn bilinear8(c00: u8, c10: u8, c01: u8, c11: u8, ax: u32, ay: u32) -> u8 {
    let bx = 256 - ax;
    let by = 256 - ay;
    ((c00 as u32 * bx * by + c10 as u32 * ax * by + c01 as u32 * bx * ay + c11 as u32 * ax * ay) >> 16)
        as u8
}

impl Color for Rgb24 {
    const HAS_ALPHA: bool = false;

    #[inline]
    fn blend256(&mut self, fg: Self, alpha: u32) {
        *self = Self::lerp256(*self, fg, alpha);
    }

    #[inline]
    fn lerp256(a: Self, b: Self, t: u32) -> Self {
        Self::new(lerp8(a.r, b.r, t), lerp8(a.g, b.g, t), lerp8(a.b, b.b, t))
    }

    fn interpolate_bilinear(c00: Self, c10: Self, c01: Self, c11: Self, ax: u32, ay: u32) -> Self {
        Self::new(
            bilinear8(c00.r, c10.r, c01.r, c11.r, ax, ay),
            bilinear8(c00.g, c10.g, c01.g, c11.g, ax, ay),
            bilinear8(c00.b, c10.b, c01.b, c11.b, ax, ay),
        )
    }

    fn mean2(a: Self, b: Self) -> Self {
        Self::new(
            ((a.r as u16 + b.r as u16) >> 1) as u8,
            ((a.g as u16 + b.g as u16) >> 1) as u8,
            ((a.b as u16 + b.b as u16) >> 1) as u8,
        )
    }

    fn mean4(a: Self, b: Self, c: Self, d: Self) -> Self {
        Self::new(
            ((a.r as u16 + b.r as u16 + c.r as u16 + d.r as u16) >> 2) as u8,
            ((a.g as u16 + b.g as u16 + c.g as u16 + d.g as u16) >> 2) as u8,
            ((a.b as u16 + b.b as u16 + c.b as u16 + d.b as u16) >> 2) as u8,
        )
    }
}

// ============================================================================
// Rgb32
// ============================================================================

/// 8 bits per channel with premultiplied alpha.
///
/// Laid out B, G, R, A in memory, which is `0xAARRGGBB` as a little-endian
/// word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
#[repr(C)]
pub struct Rgb32 {
    pub b: u8,
    pub g: u8,
    pub r: u8,
    pub a: u8,
}

impl Rgb32 {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { b, g, r, a }
    }

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// From a packed `0xAARRGGBB` word.
    pub const fn from_argb(v: u32) -> Self {
        Self::new((v >> 16) as u8, (v >> 8) as u8, v as u8, (v >> 24) as u8)
    }

    pub const fn to_argb(self) -> u32 {
        ((self.a as u32) << 24) | ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }

    /// Multiply each channel by a weight in `[0, 256]`.
    #[inline]
    pub fn mult256(&mut self, mr: u32, mg: u32, mb: u32, ma: u32) {
        self.r = ((self.r as u32 * mr) >> 8) as u8;
        self.g = ((self.g as u32 * mg) >> 8) as u8;
        self.b = ((self.b as u32 * mb) >> 8) as u8;
        self.a = ((self.a as u32 * ma) >> 8) as u8;
    }

    /// Weighted mean of three colors, weights summing to `tot`.
    pub fn interpolate3(c1: Self, w1: i64, c2: Self, w2: i64, c3: Self, w3: i64, tot: i64) -> Self {
        if tot == 0 {
            return c1;
        }
        let ch = |a: u8, b: u8, c: u8| -> u8 {
            ((a as i64 * w1 + b as i64 * w2 + c as i64 * w3) / tot).clamp(0, 255) as u8
        };
        Self::new(
            ch(c1.r, c2.r, c3.r),
            ch(c1.g, c2.g, c3.g),
            ch(c1.b, c2.b, c3.b),
            ch(c1.a, c2.a, c3.a),
        )
    }

    pub const BLACK: Self = Self::opaque(0, 0, 0);
    pub const WHITE: Self = Self::opaque(255, 255, 255);
    pub const RED: Self = Self::opaque(255, 0, 0);
    pub const GREEN: Self = Self::opaque(0, 255, 0);
    pub const BLUE: Self = Self::opaque(0, 0, 255);
    pub const PURPLE: Self = Self::opaque(128, 0, 128);
    pub const ORANGE: Self = Self::opaque(255, 135, 0);
    pub const CYAN: Self = Self::opaque(0, 255, 255);
    pub const SALMON: Self = Self::opaque(250, 128, 114);
    pub const MAROON: Self = Self::opaque(128, 0, 0);
    pub const YELLOW: Self = Self::opaque(255, 255, 0);
    pub const MAGENTA: Self = Self::opaque(255, 0, 255);
    pub const OLIVE: Self = Self::opaque(128, 128, 0);
    pub const TEAL: Self = Self::opaque(0, 128, 128);
    pub const GRAY: Self = Self::opaque(128, 128, 128);
    pub const SILVER: Self = Self::opaque(192, 192, 192);
    pub const NAVY: Self = Self::opaque(0, 0, 128);
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);
}

impl Color for Rgb32 {
    const HAS_ALPHA: bool = true;

    #[inline]
    fn blend256(&mut self, fg: Self, alpha: u32) {
        let fa = fg.a as u32;
        let inv = (65536 - alpha * (fa + (fa > 127) as u32)) >> 8;
        let ch = |f: u8, c: u8| (((f as u32 * alpha + c as u32 * inv) >> 8).min(255)) as u8;
        self.r = ch(fg.r, self.r);
        self.g = ch(fg.g, self.g);
        self.b = ch(fg.b, self.b);
        self.a = ch(fg.a, self.a);
    }

    #[inline]
    fn lerp256(a: Self, b: Self, t: u32) -> Self {
        Self::new(lerp8(a.r, b.r, t), lerp8(a.g, b.g, t), lerp8(a.b, b.b, t), lerp8(a.a, b.a, t))
    }

    fn interpolate_bilinear(c00: Self, c10: Self, c01: Self, c11: Self, ax: u32, ay: u32) -> Self {
        Self::new(
            bilinear8(c00.r, c10.r, c01.r, c11.r, ax, ay),
            bilinear8(c00.g, c10.g, c01.g, c11.g, ax, ay),
            bilinear8(c00.b, c10.b, c01.b, c11.b, ax, ay),
            bilinear8(c00.a, c10.a, c01.a, c11.a, ax, ay),
        )
    }

    fn mean2(a: Self, b: Self) -> Self {
        let m = |x: u8, y: u8| ((x as u16 + y as u16) >> 1) as u8;
        Self::new(m(a.r, b.r), m(a.g, b.g), m(a.b, b.b), m(a.a, b.a))
    }

    fn mean4(a: Self, b: Self, c: Self, d: Self) -> Self {
        let m = |x: u8, y: u8, z: u8, w: u8| ((x as u16 + y as u16 + z as u16 + w as u16) >> 2) as u8;
        Self::new(
            m(a.r, b.r, c.r, d.r),
            m(a.g, b.g, c.g, d.g),
            m(a.b, b.b, c.b, d.b),
            m(a.a, b.a, c.a, d.a),
        )
    }

    #[inline]
    fn opacity(&self) -> f32 {
        self.a as f32 / 255.0
    }

    fn mult_opacity(&mut self, op: f32) {
        let m = weight256(op);
        self.mult256(m, m, m, m);
    }

    fn premultiply(&mut self) {
        let a = self.a as u32;
        self.r = (self.r as u32 * a / 255) as u8;
        self.g = (self.g as u32 * a / 255) as u8;
        self.b = (self.b as u32 * a / 255) as u8;
    }
}

// ============================================================================
// Rgb64
// ============================================================================

/// 16 bits per channel with premultiplied alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
#[repr(C)]
pub struct Rgb64 {
    pub r: u16,
    pub g: u16,
    pub b: u16,
    pub a: u16,
}

impl Rgb64 {
    pub const fn new(r: u16, g: u16, b: u16, a: u16) -> Self {
        Self { r, g, b, a }
    }

    /// Composite with a weight in `[0, 65536]`.
    #[inline]
    pub fn blend65536(&mut self, fg: Self, alpha: u32) {
        let alpha = (alpha >> 1) as u64;
        let fa = fg.a as u64;
        let inv = ((1u64 << 31) - alpha * (fa + (fa > 32767) as u64)) >> 16;
        let ch = |f: u16, c: u16| (((f as u64 * alpha + c as u64 * inv) >> 15).min(65535)) as u16;
        self.r = ch(fg.r, self.r);
        self.g = ch(fg.g, self.g);
        self.b = ch(fg.b, self.b);
        self.a = ch(fg.a, self.a);
    }
}

#[inline]
fn lerp16(a: u16, b: u16, t: u32) -> u16 {
    ((b as u32 * t + a as u32 * (256 - t)) >> 8) as u16
}

#[inline]
fn bilinear16(c00: u16, c10: u16, c01: u16, c11: u16, ax: u32, ay: u32) -> u16 {
    let (ax, ay) = (ax as u64, ay as u64);
    let bx = 256 - ax;
    let by = 256 - ay;
    ((c00 as u64 * bx * by + c10 as u64 * ax * by + c01 as u64 * bx * ay + c11 as u64 * ax * ay) >> 16)
        as u16
}

impl Color for Rgb64 {
    const HAS_ALPHA: bool = true;

    #[inline]
    fn blend256(&mut self, fg: Self, alpha: u32) {
        self.blend65536(fg, alpha << 8);
    }

    #[inline]
    fn lerp256(a: Self, b: Self, t: u32) -> Self {
        Self::new(
            lerp16(a.r, b.r, t),
            lerp16(a.g, b.g, t),
            lerp16(a.b, b.b, t),
            lerp16(a.a, b.a, t),
        )
    }

    fn interpolate_bilinear(c00: Self, c10: Self, c01: Self, c11: Self, ax: u32, ay: u32) -> Self {
        Self::new(
            bilinear16(c00.r, c10.r, c01.r, c11.r, ax, ay),
            bilinear16(c00.g, c10.g, c01.g, c11.g, ax, ay),
            bilinear16(c00.b, c10.b, c01.b, c11.b, ax, ay),
            bilinear16(c00.a, c10.a, c01.a, c11.a, ax, ay),
        )
    }

    fn mean2(a: Self, b: Self) -> Self {
        let m = |x: u16, y: u16| ((x as u32 + y as u32) >> 1) as u16;
        Self::new(m(a.r, b.r), m(a.g, b.g), m(a.b, b.b), m(a.a, b.a))
    }

    fn mean4(a: Self, b: Self, c: Self, d: Self) -> Self {
        let m = |x: u16, y: u16, z: u16, w: u16| ((x as u32 + y as u32 + z as u32 + w as u32) >> 2) as u16;
        Self::new(
            m(a.r, b.r, c.r, d.r),
            m(a.g, b.g, c.g, d.g),
            m(a.b, b.b, c.b, d.b),
            m(a.a, b.a, c.a, d.a),
        )
    }

    #[inline]
    fn opacity(&self) -> f32 {
        self.a as f32 / 65535.0
    }

    fn mult_opacity(&mut self, op: f32) {
        let m = ((op * 65536.0 + 0.5) as i64).clamp(0, 65536) as u32;
        let f = |c: u16| ((c as u32 * m) >> 16) as u16;
        *self = Self::new(f(self.r), f(self.g), f(self.b), f(self.a));
    }

    fn premultiply(&mut self) {
        let a = self.a as u32;
        self.r = (self.r as u32 * a / 65535) as u16;
        self.g = (self.g as u32 * a / 65535) as u16;
        self.b = (self.b as u32 * a / 65535) as u16;
    }
}

// ============================================================================
// Rgbf
// ============================================================================

/// Float channels, nominally in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rgbf {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgbf {
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }
}

impl Color for Rgbf {
    const HAS_ALPHA: bool = false;

    #[inline]
    fn blend256(&mut self, fg: Self, alpha: u32) {
        self.blend(fg, alpha as f32 / 256.0);
    }

    #[inline]
    fn blend(&mut self, fg: Self, alpha: f32) {
        self.r += (fg.r - self.r) * alpha;
        self.g += (fg.g - self.g) * alpha;
        self.b += (fg.b - self.b) * alpha;
    }

    fn lerp256(a: Self, b: Self, t: u32) -> Self {
        let mut c = a;
        c.blend256(b, t);
        c
    }

    fn interpolate_bilinear(c00: Self, c10: Self, c01: Self, c11: Self, ax: u32, ay: u32) -> Self {
        let ax = ax as f32 / 256.0;
        let ay = ay as f32 / 256.0;
        let w00 = (1.0 - ax) * (1.0 - ay);
        let w10 = ax * (1.0 - ay);
        let w01 = (1.0 - ax) * ay;
        let w11 = ax * ay;
        Self::new(
            c00.r * w00 + c10.r * w10 + c01.r * w01 + c11.r * w11,
            c00.g * w00 + c10.g * w10 + c01.g * w01 + c11.g * w11,
            c00.b * w00 + c10.b * w10 + c01.b * w01 + c11.b * w11,
        )
    }

    fn mean2(a: Self, b: Self) -> Self {
        Self::new((a.r + b.r) * 0.5, (a.g + b.g) * 0.5, (a.b + b.b) * 0.5)
    }

    fn mean4(a: Self, b: Self, c: Self, d: Self) -> Self {
        Self::new(
            (a.r + b.r + c.r + d.r) * 0.25,
            (a.g + b.g + c.g + d.g) * 0.25,
            (a.b + b.b + c.b + d.b) * 0.25,
        )
    }
}

// ============================================================================
// Hsv
// ============================================================================

/// Hue, saturation, value, all in `[0, 1]` (hue wraps).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Hsv {
    pub h: f32,
    pub s: f32,
    pub v: f32,
}

impl Hsv {
    pub const fn new(h: f32, s: f32, v: f32) -> Self {
        Self { h, s, v }
    }
}

impl From<Rgbf> for Hsv {
    fn from(c: Rgbf) -> Self {
        let mn = c.r.min(c.g).min(c.b);
        let mx = c.r.max(c.g).max(c.b);
        let delta = mx - mn;
        if delta < 0.001 || mx <= 0.0 {
            // hue undefined
            return Self::new(0.0, 0.0, mx);
        }
        let s = delta / mx;
        let mut h = if c.r >= mx {
            (c.g - c.b) / delta
        } else if c.g >= mx {
            2.0 + (c.b - c.r) / delta
        } else {
            4.0 + (c.r - c.g) / delta
        };
        h /= 6.0;
        if h < 0.0 {
            h += 1.0;
        }
        Self::new(h, s, mx)
    }
}

impl From<Hsv> for Rgbf {
    fn from(c: Hsv) -> Self {
        if c.s <= 0.0 {
            return Self::new(c.v, c.v, c.v);
        }
        let hh = if c.h >= 1.0 { 0.0 } else { c.h } * 6.0;
        let i = hh as i32;
        let ff = hh - i as f32;
        let p = c.v * (1.0 - c.s);
        let q = c.v * (1.0 - c.s * ff);
        let t = c.v * (1.0 - c.s * (1.0 - ff));
        match i {
            0 => Self::new(c.v, t, p),
            1 => Self::new(q, c.v, p),
            2 => Self::new(p, c.v, t),
            3 => Self::new(p, q, c.v),
            4 => Self::new(t, p, c.v),
            _ => Self::new(c.v, p, q),
        }
    }
}

impl From<Rgb32> for Hsv {
    fn from(c: Rgb32) -> Self {
        Rgbf::from(c).into()
    }
}

impl From<Hsv> for Rgb32 {
    fn from(c: Hsv) -> Self {
        Rgbf::from(c).into()
    }
}

// ============================================================================
// Conversions
// ============================================================================

#[inline]
fn f2u8(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0 + 0.5) as u8
}

#[inline]
fn expand5(v: u8) -> u8 {
    (v << 3) | (v >> 2)
}

#[inline]
fn expand6(v: u8) -> u8 {
    (v << 2) | (v >> 4)
}

impl From<Rgb32> for Rgb565 {
    fn from(c: Rgb32) -> Self {
        Self::from_rgb8(c.r, c.g, c.b)
    }
}

impl From<Rgb565> for Rgb32 {
    fn from(c: Rgb565) -> Self {
        Self::opaque(expand5(c.r()), expand6(c.g()), expand5(c.b()))
    }
}

impl From<Rgbf> for Rgb565 {
    fn from(c: Rgbf) -> Self {
        let q = |v: f32, m: f32| (v.clamp(0.0, 1.0) * m + 0.5) as u8;
        Self::new(q(c.r, 31.0), q(c.g, 63.0), q(c.b, 31.0))
    }
}

impl From<Rgb565> for Rgbf {
    fn from(c: Rgb565) -> Self {
        Self::new(c.r() as f32 / 31.0, c.g() as f32 / 63.0, c.b() as f32 / 31.0)
    }
}

impl From<Rgb24> for Rgb565 {
    fn from(c: Rgb24) -> Self {
        Self::from_rgb8(c.r, c.g, c.b)
    }
}

impl From<Rgb32> for Rgb24 {
    fn from(c: Rgb32) -> Self {
        Self::new(c.r, c.g, c.b)
    }
}

impl From<Rgb24> for Rgb32 {
    fn from(c: Rgb24) -> Self {
        Self::opaque(c.r, c.g, c.b)
    }
}

impl From<Rgbf> for Rgb24 {
    fn from(c: Rgbf) -> Self {
        Self::new(f2u8(c.r), f2u8(c.g), f2u8(c.b))
    }
}

impl From<Rgb24> for Rgbf {
    fn from(c: Rgb24) -> Self {
        Self::new(c.r as f32 / 255.0, c.g as f32 / 255.0, c.b as f32 / 255.0)
    }
}

impl From<Rgbf> for Rgb32 {
    fn from(c: Rgbf) -> Self {
        Self::opaque(f2u8(c.r), f2u8(c.g), f2u8(c.b))
    }
}

impl From<Rgb32> for Rgbf {
    fn from(c: Rgb32) -> Self {
        Self::new(c.r as f32 / 255.0, c.g as f32 / 255.0, c.b as f32 / 255.0)
    }
}

impl From<Rgb64> for Rgb32 {
    fn from(c: Rgb64) -> Self {
        Self::new((c.r >> 8) as u8, (c.g >> 8) as u8, (c.b >> 8) as u8, (c.a >> 8) as u8)
    }
}

impl From<Rgb32> for Rgb64 {
    fn from(c: Rgb32) -> Self {
        let w = |v: u8| ((v as u16) << 8) | v as u16;
        Self::new(w(c.r), w(c.g), w(c.b), w(c.a))
    }
}

impl From<Rgb565> for Rgb24 {
    fn from(c: Rgb565) -> Self {
        Rgb32::from(c).into()
    }
}

impl From<Rgb565> for Rgb64 {
    fn from(c: Rgb565) -> Self {
        Rgb32::from(c).into()
    }
}

impl From<Rgb64> for Rgb565 {
    fn from(c: Rgb64) -> Self {
        Rgb32::from(c).into()
    }
}

impl From<Rgb24> for Rgb64 {
    fn from(c: Rgb24) -> Self {
        Rgb32::from(c).into()
    }
}

impl From<Rgb64> for Rgb24 {
    fn from(c: Rgb64) -> Self {
        Rgb32::from(c).into()
    }
}

impl From<Rgbf> for Rgb64 {
    fn from(c: Rgbf) -> Self {
        let q = |v: f32| (v.clamp(0.0, 1.0) * 65535.0 + 0.5) as u16;
        Self::new(q(c.r), q(c.g), q(c.b), 65535)
    }
}

impl From<Rgb64> for Rgbf {
    fn from(c: Rgb64) -> Self {
        Self::new(c.r as f32 / 65535.0, c.g as f32 / 65535.0, c.b as f32 / 65535.0)
    }
}

// ============================================================================
// Tests
// ============================================================================
