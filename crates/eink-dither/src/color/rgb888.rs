//! Packed 8-bit RGB color.

use std::fmt;

/// Number of bytes one pixel occupies in an RGB888 buffer.
pub const BYTES_PER_PIXEL: usize = 3;

/// A color with 8 bits per channel.
///
/// This is the only color representation the crate uses: palette entries,
/// pixels read from an image buffer and dithered output all share it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgb888 {
    /// Red channel (0..=255)
    pub r: u8,
    /// Green channel (0..=255)
    pub g: u8,
    /// Blue channel (0..=255)
    pub b: u8,
}

impl Rgb888 {
    /// Create a color from its three channels.
    #[inline]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Create a color from a byte array `[R, G, B]`.
    ///
    /// # Example
    /// ```
    /// use eink_dither::Rgb888;
    /// let white = Rgb888::from_bytes([255, 255, 255]);
    /// assert_eq!(white.g, 255);
    /// ```
    #[inline]
    pub const fn from_bytes(bytes: [u8; 3]) -> Self {
        Self::new(bytes[0], bytes[1], bytes[2])
    }

    /// Read the pixel at `index` (in pixels, not bytes) from an RGB888 buffer.
    ///
    /// # Panics
    ///
    /// Panics if the pixel lies outside `buf`.
    #[inline]
    pub fn read(buf: &[u8], index: usize) -> Self {
        let o = index * BYTES_PER_PIXEL;
        Self::new(buf[o], buf[o + 1], buf[o + 2])
    }

    /// Write this color at pixel `index` of an RGB888 buffer.
    ///
    /// # Panics
    ///
    /// Panics if the pixel lies outside `buf`.
    #[inline]
    pub fn write(self, buf: &mut [u8], index: usize) {
        let o = index * BYTES_PER_PIXEL;
        buf[o] = self.r;
        buf[o + 1] = self.g;
        buf[o + 2] = self.b;
    }

    /// Convert to a byte array `[R, G, B]`.
    #[inline]
    pub const fn to_bytes(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    /// Squared Euclidean distance to `other` in RGB space.
    ///
    /// The largest possible value is `3 * 255²`, well inside `u32`.
    #[inline]
    pub fn distance_sq(self, other: Rgb888) -> u32 {
        let dr = self.r as i32 - other.r as i32;
        let dg = self.g as i32 - other.g as i32;
        let db = self.b as i32 - other.b as i32;
        (dr * dr + dg * dg + db * db) as u32
    }
}

impl From<[u8; 3]> for Rgb888 {
    fn from(bytes: [u8; 3]) -> Self {
        Self::from_bytes(bytes)
    }
}

impl fmt::Display for Rgb888 {
    /// Formats as an uppercase `#RRGGBB` hex string.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}
