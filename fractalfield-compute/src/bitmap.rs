//! Packed RGBA8 bitmap output.
//!
//! Pixels are `u32` in byte order R,G,B,A (little-endian `a<<24 | b<<16 |
//! g<<8 | r`), matching common canvas upload formats.

/// Solid black with full alpha, used for set-interior pixels.
pub const OPAQUE_BLACK: u32 = pack_rgba(0, 0, 0, 255);

/// Fill color applied on restart; intentionally loud so a frame that shades
/// before computing shows up immediately.
pub const RESTART_FILL: u32 = pack_rgba(0, 255, 0, 255);

/// Pack 8-bit channels into a pixel word.
#[inline]
pub const fn pack_rgba(r: u8, g: u8, b: u8, a: u8) -> u32 {
    (r as u32) | ((g as u32) << 8) | ((b as u32) << 16) | ((a as u32) << 24)
}

/// Dense row-major RGBA bitmap. Like the escape field, the backing store
/// only grows across resizes.
#[derive(Clone, Debug)]
pub struct Bitmap {
    pixels: Vec<u32>,
    width: usize,
    height: usize,
}

impl Bitmap {
    pub fn new() -> Self {
        Self {
            pixels: Vec::new(),
            width: 0,
            height: 0,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn set_dimensions(&mut self, w: usize, h: usize) {
        self.width = w;
        self.height = h;
        if self.pixels.len() < w * h {
            self.pixels.resize(w * h, RESTART_FILL);
        }
    }

    pub fn clear(&mut self, color: u32) {
        for p in &mut self.pixels[..self.width * self.height] {
            *p = color;
        }
    }

    #[inline]
    pub fn set_pixel(&mut self, x: usize, y: usize, color: u32) {
        self.pixels[y * self.width + x] = color;
    }

    #[inline]
    pub fn get_pixel(&self, x: usize, y: usize) -> u32 {
        self.pixels[y * self.width + x]
    }

    /// The active `w × h` window, row-major.
    pub fn pixels(&self) -> &[u32] {
        &self.pixels[..self.width * self.height]
    }
}

impl Default for Bitmap {
    fn default() -> Self {
        Self::new()
    }
}
