//! Escape-depth field storage.
//!
//! A field is the raw per-pixel result of the escape kernel for one
//! resolution phase, plus the min/max statistics produced by normalization.

/// Depth sentinel: the point never escaped within the iteration cap.
pub const INSIDE_SET: f64 = f64::MAX;

/// Depth sentinel: the point was classified interior by the cardioid/bulb
/// shortcut and the iteration loop was never entered. Numerically just below
/// `INSIDE_SET` so `depth >= INSIDE_SET_SKIPPED` covers the whole interior
/// family.
pub const INSIDE_SET_SKIPPED: f64 = f64::from_bits(0x7FEF_FFFF_FFFF_FFFE);

/// Depth sentinel: not yet computed.
pub const UNCOMPUTED: f64 = -1.0;

/// One cell of the escape field.
///
/// `depth`/`dist` are raw kernel outputs; `final_depth`/`final_dist` are
/// written by normalization and read by the color mapper.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FieldPixel {
    pub depth: f64,
    pub dist: f64,
    pub final_depth: f64,
    pub final_dist: f64,
}

impl FieldPixel {
    pub fn uncomputed() -> Self {
        Self {
            depth: UNCOMPUTED,
            dist: UNCOMPUTED,
            final_depth: 0.0,
            final_dist: 0.0,
        }
    }

    /// True for both interior sentinels.
    pub fn is_interior(&self) -> bool {
        self.depth >= INSIDE_SET_SKIPPED
    }

    /// True once the kernel (or forwarding) has produced a result.
    pub fn is_resolved(&self) -> bool {
        self.depth >= 0.0
    }
}

impl Default for FieldPixel {
    fn default() -> Self {
        Self::uncomputed()
    }
}

/// Dense row-major escape field for one resolution phase.
#[derive(Clone, Debug)]
pub struct EscapeField {
    pixels: Vec<FieldPixel>,
    width: usize,
    height: usize,
    phase: usize,

    /// Statistics; valid only after a completed normalization pass.
    pub min_depth: f64,
    pub max_depth: f64,
    pub min_dist: f64,
    pub max_dist: f64,
}

impl EscapeField {
    pub fn new(phase: usize) -> Self {
        Self {
            pixels: Vec::new(),
            width: 0,
            height: 0,
            phase,
            min_depth: 0.0,
            max_depth: 0.0,
            min_dist: 0.0,
            max_dist: 0.0,
        }
    }

    pub fn phase(&self) -> usize {
        self.phase
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Resize to `w × h`. The backing store only ever grows; shrinking a
    /// dimension reuses the existing allocation.
    pub fn set_dimensions(&mut self, w: usize, h: usize) {
        self.width = w;
        self.height = h;
        if self.pixels.len() < w * h {
            self.pixels.resize(w * h, FieldPixel::uncomputed());
        }
    }

    /// Reset every pixel's raw depth/dist to `value` (normally `UNCOMPUTED`).
    pub fn set_all_depth(&mut self, value: f64) {
        for p in &mut self.pixels[..self.width * self.height] {
            p.depth = value;
            p.dist = value;
        }
    }

    #[inline]
    pub fn at(&self, x: usize, y: usize) -> &FieldPixel {
        &self.pixels[y * self.width + x]
    }

    #[inline]
    pub fn at_mut(&mut self, x: usize, y: usize) -> &mut FieldPixel {
        &mut self.pixels[y * self.width + x]
    }

    /// Bounds-checked access for inspection overlays.
    pub fn get(&self, x: usize, y: usize) -> Option<&FieldPixel> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels.get(y * self.width + x)
    }

    /// The active `w × h` window of pixels, row-major.
    pub fn pixels(&self) -> &[FieldPixel] {
        &self.pixels[..self.width * self.height]
    }

    pub fn pixels_mut(&mut self) -> &mut [FieldPixel] {
        let len = self.width * self.height;
        &mut self.pixels[..len]
    }

    /// One row of pixels.
    pub fn row(&self, y: usize) -> &[FieldPixel] {
        let start = y * self.width;
        &self.pixels[start..start + self.width]
    }
}
