//! Compile-time tunables and per-call blit configuration.

/// Number of sub-pixel steps used by [`ScanStepper::new_f`](crate::scan_stepper::ScanStepper::new_f)
/// to fold fractional endpoints into the Bresenham error term.
pub const AA_PRECISION: i32 = 256;

/// Bytes of source image read per slice by the affine blitter.
///
/// Large on hosted targets; bare-metal targets read textures from flash
/// through a small cache and get a budget that fits in it.
#[cfg(not(target_os = "none"))]
pub const DEFAULT_CACHE_SIZE: usize = 262_144;
#[cfg(target_os = "none")]
pub const DEFAULT_CACHE_SIZE: usize = 8192;

/// Default span-stack size (in bytes) for [`Canvas::flood_fill`](crate::canvas::Canvas::flood_fill).
pub const DEFAULT_FLOOD_STACK: usize = 1024;

/// Options of the affine blitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlitConfig {
    cache_size: usize,
}

impl BlitConfig {
    pub fn new() -> Self {
        Self {
            cache_size: DEFAULT_CACHE_SIZE,
        }
    }

    /// Bytes of source data read per slice. Values below 1 are treated as 1.
    pub fn set_cache_size(&mut self, bytes: usize) -> &mut Self {
        self.cache_size = bytes.max(1);
        self
    }

    pub fn cache_size(&self) -> usize {
        self.cache_size
    }
}

impl Default for BlitConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blit_config_default() {
        assert_eq!(BlitConfig::default().cache_size(), DEFAULT_CACHE_SIZE);
    }

    #[test]
    fn test_blit_config_setter() {
        let mut c = BlitConfig::new();
        c.set_cache_size(0);
        assert_eq!(c.cache_size(), 1);
        c.set_cache_size(4096);
        assert_eq!(c.cache_size(), 4096);
    }
}
