// Scene rendering and image comparison for tinyraster.
//
// Provides an RGBA frame type, BMP I/O and per-channel comparison.

use std::fs;
use std::io;
use std::path::Path;

use tinyraster::Rgb32;

pub mod scenes;

// ============================================================================
// Frame
// ============================================================================

/// A rendered image: straight RGBA bytes, row-major, top to bottom.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl Frame {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0u8; (width * height * 4) as usize],
        }
    }

    /// Copy a packed `Rgb32` pixel buffer.
    pub fn from_pixels(width: u32, height: u32, pixels: &[Rgb32]) -> Self {
        let mut data = Vec::with_capacity(pixels.len() * 4);
        for p in pixels {
            data.extend_from_slice(&[p.r, p.g, p.b, p.a]);
        }
        Self { width, height, data }
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = ((y * self.width + x) * 4) as usize;
        [self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3]]
    }
}

// ============================================================================
// Comparison
// ============================================================================

/// Outcome of [`compare_frames`].
#[derive(Debug, Clone)]
pub struct Comparison {
    pub total_pixels: u64,
    /// Pixels differing in at least one channel.
    pub different_pixels: u64,
    pub max_channel_diff: u8,
    /// First differing pixel in row-major order.
    pub first_diff: Option<(u32, u32)>,
}

impl Comparison {
    pub fn identical(&self) -> bool {
        self.different_pixels == 0
    }
}

impl std::fmt::Display for Comparison {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.identical() {
            return write!(f, "identical: {} pixels", self.total_pixels);
        }
        write!(
            f,
            "different: {}/{} pixels ({:.2}%), max channel diff {}",
            self.different_pixels,
            self.total_pixels,
            self.different_pixels as f64 * 100.0 / self.total_pixels as f64,
            self.max_channel_diff
        )?;
        if let Some((x, y)) = self.first_diff {
            write!(f, ", first at ({}, {})", x, y)?;
        }
        Ok(())
    }
}

/// Compare two frames channel by channel. `None` when the sizes differ.
pub fn compare_frames(a: &Frame, b: &Frame) -> Option<Comparison> {
    if a.width != b.width || a.height != b.height || a.data.len() != b.data.len() {
        return None;
    }
    let mut cmp = Comparison {
        total_pixels: a.width as u64 * a.height as u64,
        different_pixels: 0,
        max_channel_diff: 0,
        first_diff: None,
    };
    for (i, (pa, pb)) in a.data.chunks_exact(4).zip(b.data.chunks_exact(4)).enumerate() {
        let d = pa.iter().zip(pb).map(|(x, y)| x.abs_diff(*y)).max().unwrap_or(0);
        if d > 0 {
            cmp.different_pixels += 1;
            cmp.max_channel_diff = cmp.max_channel_diff.max(d);
            if cmp.first_diff.is_none() {
                let i = i as u32;
                cmp.first_diff = Some((i % a.width, i / a.width));
            }
        }
    }
    Some(cmp)
}

// ============================================================================
// BMP I/O (32-bit BGRA, top-down)
// ============================================================================

fn invalid(msg: &str) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, msg.to_string())
}

/// Encode a frame as a 32-bit top-down BMP.
pub fn encode_bmp(frame: &Frame) -> Vec<u8> {
    let image_size = frame.width * frame.height * 4;
    let mut out = Vec::with_capacity(54 + image_size as usize);
    out.extend_from_slice(b"BM");
    out.extend_from_slice(&(54 + image_size).to_le_bytes());
    out.extend_from_slice(&[0u8; 4]);
    out.extend_from_slice(&54u32.to_le_bytes());
    out.extend_from_slice(&40u32.to_le_bytes());
    out.extend_from_slice(&frame.width.to_le_bytes());
    out.extend_from_slice(&(-(frame.height as i32)).to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes());
    out.extend_from_slice(&32u16.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes());
    out.extend_from_slice(&image_size.to_le_bytes());
    out.extend_from_slice(&[0u8; 16]);
    for px in frame.data.chunks_exact(4) {
        out.extend_from_slice(&[px[2], px[1], px[0], px[3]]);
    }
    out
}

/// Decode a 24 or 32-bit uncompressed BMP (either row order).
pub fn decode_bmp(data: &[u8]) -> io::Result<Frame> {
    if data.len() < 54 || &data[0..2] != b"BM" {
        return Err(invalid("not a BMP file"));
    }
    let u32_at = |o: usize| u32::from_le_bytes([data[o], data[o + 1], data[o + 2], data[o + 3]]);
    let offset = u32_at(10) as usize;
    let w = u32_at(18) as i32;
    let h = u32_at(22) as i32;
    let bytes_pp = u16::from_le_bytes([data[28], data[29]]) as usize / 8;
    if w <= 0 || h == 0 || !(bytes_pp == 3 || bytes_pp == 4) {
        return Err(invalid("unsupported BMP layout"));
    }
    let (width, height) = (w as u32, h.unsigned_abs());
    let stride = (width as usize * bytes_pp + 3) / 4 * 4;
    if data.len() < offset + stride * height as usize {
        return Err(invalid("truncated BMP pixel data"));
    }
    let mut frame = Frame::new(width, height);
    for y in 0..height as usize {
        let src_y = if h < 0 { y } else { height as usize - 1 - y };
        let row = &data[offset + src_y * stride..];
        for x in 0..width as usize {
            let s = &row[x * bytes_pp..];
            let a = if bytes_pp == 4 { s[3] } else { 255 };
            let d = (y * width as usize + x) * 4;
            frame.data[d..d + 4].copy_from_slice(&[s[2], s[1], s[0], a]);
        }
    }
    Ok(frame)
}

pub fn save_bmp(path: &Path, frame: &Frame) -> io::Result<()> {
    fs::write(path, encode_bmp(frame))
}

pub fn load_bmp(path: &Path) -> io::Result<Frame> {
    decode_bmp(&fs::read(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bmp_round_trip() {
        let pixels = [Rgb32::RED, Rgb32::GREEN, Rgb32::BLUE, Rgb32::new(10, 20, 30, 40)];
        let frame = Frame::from_pixels(2, 2, &pixels);
        let decoded = decode_bmp(&encode_bmp(&frame)).unwrap();
        assert_eq!(decoded, frame);
        assert_eq!(decoded.pixel(1, 1), [10, 20, 30, 40]);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode_bmp(b"hello").is_err());
    }

    #[test]
    fn test_compare_frames() {
        let a = Frame::from_pixels(2, 1, &[Rgb32::BLACK, Rgb32::WHITE]);
        let mut b = a.clone();
        assert!(compare_frames(&a, &b).unwrap().identical());
        b.data[4] = 250;
        let c = compare_frames(&a, &b).unwrap();
        assert_eq!(c.different_pixels, 1);
        assert_eq!(c.max_channel_diff, 5);
        assert_eq!(c.first_diff, Some((1, 0)));
        assert!(compare_frames(&a, &Frame::new(1, 1)).is_none());
    }
}
