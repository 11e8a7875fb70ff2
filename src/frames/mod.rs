pub mod assets;

pub use assets::{AssetFrames, FrameCache};

use crate::error::Result;

/// 1-bit image, packed MSB-first per row, rows padded to whole bytes.
/// Bit set = white (paper), bit clear = black (ink), matching the panel RAM.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonoBitmap {
    width: u32,
    height: u32,
    bits: Vec<u8>,
}

impl MonoBitmap {
    /// All-white canvas.
    pub fn blank(width: u32, height: u32) -> Self {
        let stride = Self::stride_for(width);
        Self {
            width,
            height,
            bits: vec![0xFF; stride * height as usize],
        }
    }

    fn stride_for(width: u32) -> usize {
        width.div_ceil(8) as usize
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Bytes per packed row.
    pub fn stride(&self) -> usize {
        Self::stride_for(self.width)
    }

    /// Packed rows, ready for a panel write.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bits
    }

    pub fn is_black(&self, x: u32, y: u32) -> bool {
        debug_assert!(x < self.width && y < self.height);
        let byte = self.bits[y as usize * self.stride() + (x / 8) as usize];
        byte & (0x80 >> (x % 8)) == 0
    }

    pub fn set_black(&mut self, x: u32, y: u32, black: bool) {
        debug_assert!(x < self.width && y < self.height);
        let idx = y as usize * self.stride() + (x / 8) as usize;
        let mask = 0x80 >> (x % 8);
        if black {
            self.bits[idx] &= !mask;
        } else {
            self.bits[idx] |= mask;
        }
    }

    /// Number of black pixels.
    pub fn ink(&self) -> usize {
        let mut n = 0;
        for y in 0..self.height {
            for x in 0..self.width {
                n += self.is_black(x, y) as usize;
            }
        }
        n
    }

    /// Paste `src` onto `self` with its top-left at `(ox, oy)`. Pixels falling
    /// outside the canvas are dropped.
    pub fn paste(&mut self, src: &MonoBitmap, ox: i64, oy: i64) {
        for sy in 0..src.height {
            let dy = oy + sy as i64;
            if dy < 0 || dy >= self.height as i64 {
                continue;
            }
            for sx in 0..src.width {
                let dx = ox + sx as i64;
                if dx < 0 || dx >= self.width as i64 {
                    continue;
                }
                self.set_black(dx as u32, dy as u32, src.is_black(sx, sy));
            }
        }
    }

    /// Paste `src` centered, `(W - w) / 2` rounding toward negative infinity.
    pub fn centered(width: u32, height: u32, src: &MonoBitmap) -> Self {
        let mut canvas = Self::blank(width, height);
        let ox = (width as i64 - src.width as i64).div_euclid(2);
        let oy = (height as i64 - src.height as i64).div_euclid(2);
        canvas.paste(src, ox, oy);
        canvas
    }

    /// Rotate 90 degrees counter-clockwise. A landscape canvas becomes the
    /// panel's native portrait orientation.
    pub fn rotated_ccw(&self) -> Self {
        let mut out = Self::blank(self.height, self.width);
        for y in 0..out.height {
            for x in 0..out.width {
                out.set_black(x, y, self.is_black(self.width - 1 - y, x));
            }
        }
        out
    }

    /// Expand to RGBA8 for the preview texture.
    pub fn to_rgba(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity((self.width * self.height * 4) as usize);
        for y in 0..self.height {
            for x in 0..self.width {
                let v = if self.is_black(x, y) { 0 } else { 255 };
                out.extend_from_slice(&[v, v, v, 255]);
            }
        }
        out
    }
}

/// Grayscale -> 1-bit mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Threshold {
    /// White iff luma > cutoff.
    Cutoff(u8),
    /// Black iff `low <= luma <= high`; everything else is white.
    Band { low: u8, high: u8 },
}

impl Threshold {
    pub fn is_black(self, luma: u8) -> bool {
        match self {
            Threshold::Cutoff(c) => luma <= c,
            Threshold::Band { low, high } => (low..=high).contains(&luma),
        }
    }
}

/// Produces centered, fixed-size 1-bit frames.
pub trait FrameSource {
    /// Must be deterministic: equal arguments, bit-identical output.
    fn load_frame(&self, clip: &str, index: u32) -> Result<MonoBitmap>;
}

impl<T: FrameSource + ?Sized> FrameSource for &T {
    fn load_frame(&self, clip: &str, index: u32) -> Result<MonoBitmap> {
        (**self).load_frame(clip, index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(n: u32) -> MonoBitmap {
        let mut b = MonoBitmap::blank(n, n);
        for y in 0..n {
            for x in 0..n {
                b.set_black(x, y, true);
            }
        }
        b
    }

    #[test]
    fn blank_is_white() {
        let b = MonoBitmap::blank(250, 122);
        assert_eq!(b.stride(), 32);
        assert_eq!(b.as_bytes().len(), 32 * 122);
        assert_eq!(b.ink(), 0);
    }

    #[test]
    fn set_and_read_back() {
        let mut b = MonoBitmap::blank(10, 2);
        b.set_black(9, 1, true);
        assert!(b.is_black(9, 1));
        assert!(!b.is_black(8, 1));
        assert_eq!(b.as_bytes()[3], 0b1011_1111);
        b.set_black(9, 1, false);
        assert_eq!(b.ink(), 0);
    }

    #[test]
    fn center_small_image() {
        let c = MonoBitmap::centered(10, 6, &square(4));
        assert_eq!(c.ink(), 16);
        assert!(c.is_black(3, 1));
        assert!(c.is_black(6, 4));
        assert!(!c.is_black(2, 1));
        assert!(!c.is_black(7, 4));
    }

    #[test]
    fn center_clips_oversized_image() {
        // Offset is (3 - 5) / 2 = -1 on both axes.
        let c = MonoBitmap::centered(3, 3, &square(5));
        assert_eq!(c.ink(), 9);
    }

    #[test]
    fn rotate_ccw_moves_top_right_to_top_left() {
        let mut b = MonoBitmap::blank(4, 2);
        b.set_black(3, 0, true);
        let r = b.rotated_ccw();
        assert_eq!((r.width(), r.height()), (2, 4));
        assert!(r.is_black(0, 0));
        assert_eq!(r.ink(), 1);
    }

    #[test]
    fn threshold_variants() {
        let cut = Threshold::Cutoff(128);
        assert!(cut.is_black(0));
        assert!(cut.is_black(128));
        assert!(!cut.is_black(129));

        let band = Threshold::Band { low: 40, high: 200 };
        assert!(!band.is_black(10));
        assert!(band.is_black(40));
        assert!(band.is_black(200));
        assert!(!band.is_black(250));
    }

    #[test]
    fn rgba_expansion() {
        let mut b = MonoBitmap::blank(2, 1);
        b.set_black(1, 0, true);
        assert_eq!(b.to_rgba(), vec![255, 255, 255, 255, 0, 0, 0, 255]);
    }
}
