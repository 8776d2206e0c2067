//! # tinyraster
//!
//! An allocation-free 2D rasterizer that draws into pixel buffers owned by
//! the caller, sized for microcontrollers with a few hundred kilobytes of
//! RAM and equally at home on the desktop.
//!
//! It features:
//!
//! - Five pixel encodings (RGB565, RGB24, premultiplied RGBA32 and RGBA64,
//!   float RGB) behind one [`Color`] trait, plus an HSV value type
//! - Aliasing sub-views: cropping a [`Canvas`] shares the parent memory
//! - Bresenham lines, triangles, polygons, circles, ellipses and rounded
//!   rectangles, each in a plain and an anti-aliased flavour
//! - Thick lines with round, straight and arrow end caps
//! - Seam-free filling: pixels shared by adjacent edges or triangles are
//!   written exactly once, so partial opacity stays uniform
//! - Scaled and rotated blits with bilinear sampling, textured and
//!   gradient triangles
//! - Scanline flood fill with a fixed, caller-chosen stack budget
//!
//! ## Architecture
//!
//! Drawing is layered:
//!
//! 1. **Pixel access**: [`Canvas`] and [`ImageRef`] over borrowed slices
//! 2. **Blending**: [`Opacity`] turned into a fixed-point operator and
//!    applied through [`Color::blend256`]
//! 3. **Edge walking**: [`ScanStepper`] Bresenham segments with
//!    sub-pixel endpoints and per-pixel coverage
//! 4. **Coverage writers**: seam-avoiding edge drawing, the distance-field
//!    quadrant walker for round shapes and the half-space triangle
//!    rasterizer with its [`SpanShader`]s
//! 5. **Shape API**: the `draw_*` / `fill_*` methods on [`Canvas`]
//!
//! Every operation is infallible except [`Canvas::flood_fill`], which
//! reports exhausting its stack budget through [`FillError`].

// Foundation types
pub mod basics;
pub mod color;
pub mod config;
pub mod error;

// Pixel access and edge walking
pub mod canvas;
mod edge_aa;
pub mod scan_stepper;

// Shapes
pub mod ellipse;
pub mod line;
pub mod polygon;
pub mod rounded_rect;
pub mod triangle;

// Sampling and filling
pub mod flood_fill;
pub mod image_sampler;
pub mod span_rasterizer;

pub use basics::{PointF, PointI, RectF, RectI};
pub use canvas::{Canvas, ImageRef};
pub use color::{Color, Hsv, Opacity, Rgb24, Rgb32, Rgb565, Rgb64, Rgbf};
pub use config::BlitConfig;
pub use error::FillError;
pub use line::EndCap;
pub use polygon::{PointSource, SlicePoints};
pub use scan_stepper::ScanStepper;
pub use span_rasterizer::SpanShader;
