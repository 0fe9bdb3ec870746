//! Render settings shared by the compute and shading stages.
//!
//! Everything here is plain serializable data; the progressive renderer
//! snapshots the compute-relevant subset to decide when a full restart is
//! needed versus a color-only reshade.

use crate::gradient::Gradient;
use serde::{Deserialize, Serialize};

/// Iteration budget control.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Quality {
    /// Fraction of the zoom-derived iteration limit, normally in (0, 1].
    Dynamic(f64),
    /// Fixed iteration cap regardless of zoom.
    Fixed(u32),
}

impl Quality {
    /// The iteration cap this quality setting yields at `zoom`.
    pub fn iter_limit(self, zoom: f64) -> u32 {
        match self {
            Quality::Dynamic(fraction) => {
                let base = iteration_limit(zoom) as f64;
                (base * fraction).max(1.0) as u32
            }
            Quality::Fixed(n) => n.max(1),
        }
    }
}

impl Default for Quality {
    fn default() -> Self {
        Quality::Dynamic(0.5)
    }
}

/// Which smoothed quantity drives the gradient lookup.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Smoothing {
    /// Fractional escape iteration only.
    Iter,
    /// Distance estimate only.
    Dist,
    /// Blend of both, weighted by `iter_dist_mix`.
    Mix,
}

impl Smoothing {
    /// True when the kernel must co-iterate the derivative.
    pub fn needs_dist(self) -> bool {
        matches!(self, Smoothing::Dist | Smoothing::Mix)
    }

    pub fn needs_iter(self) -> bool {
        matches!(self, Smoothing::Iter | Smoothing::Mix)
    }
}

/// How many depth units one full gradient cycle spans.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum CycleLength {
    /// Fraction of an assumed iteration cap derived from the zoom, so the
    /// apparent banding stays stable while zooming.
    Dynamic(f64),
    /// Fixed number of depth units per cycle.
    Absolute(f64),
}

impl Default for CycleLength {
    fn default() -> Self {
        CycleLength::Dynamic(0.5)
    }
}

/// A monotone sampled curve remapping squared coordinate terms inside the
/// iteration loop. Samples span `[0, domain_max]` uniformly and are looked up
/// with linear interpolation; inputs outside the domain clamp to the ends.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WarpCurve {
    samples: Vec<f64>,
    domain_max: f64,
}

impl WarpCurve {
    /// Build a curve from uniform samples; needs at least two.
    pub fn new(samples: Vec<f64>, domain_max: f64) -> Result<Self, String> {
        if samples.len() < 2 {
            return Err(format!(
                "warp curve needs at least 2 samples, got {}",
                samples.len()
            ));
        }
        if !(domain_max > 0.0) {
            return Err(format!("warp curve domain must be positive, got {domain_max}"));
        }
        Ok(Self {
            samples,
            domain_max,
        })
    }

    /// Identity curve over `[0, domain_max]`.
    pub fn identity(domain_max: f64) -> Self {
        Self {
            samples: vec![0.0, domain_max],
            domain_max,
        }
    }

    /// Remap `v` through the curve.
    pub fn apply(&self, v: f64) -> f64 {
        let last = self.samples.len() - 1;
        let t = (v / self.domain_max).clamp(0.0, 1.0) * last as f64;
        let i = (t as usize).min(last - 1);
        let f = t - i as f64;
        let a = self.samples[i];
        let b = self.samples[i + 1];
        a + (b - a) * f
    }

    /// FNV-1a over the sample bit patterns, used for dirty tracking.
    pub fn content_hash(&self) -> u64 {
        let mut h: u64 = 0xcbf2_9ce4_8422_2325;
        let mut mix = |bits: u64| {
            for byte in bits.to_le_bytes() {
                h ^= byte as u64;
                h = h.wrapping_mul(0x0000_0100_0000_01b3);
            }
        };
        mix(self.domain_max.to_bits());
        for s in &self.samples {
            mix(s.to_bits());
        }
        h
    }
}

/// Per-axis warp curves applied to `x²` and `y²` during iteration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WarpSettings {
    pub x: WarpCurve,
    pub y: WarpCurve,
}

impl WarpSettings {
    /// Combined content hash of both axis curves.
    pub fn content_hash(&self) -> u64 {
        self.x.content_hash() ^ self.y.content_hash().rotate_left(17)
    }
}

/// Complete per-frame render configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RenderSettings {
    pub quality: Quality,
    pub smoothing: Smoothing,
    /// Blend weight in [0,1] when `smoothing` is `Mix`; 0 = iteration only.
    pub iter_dist_mix: f64,

    /// Rebase depths to the frame minimum before cycling.
    pub normalize_depth: bool,
    /// Weight in [0,1] blending linear depth toward log1p-compressed depth.
    pub log1p_weight: f64,

    pub cycle_depth: CycleLength,
    /// Depth units per gradient cycle for the distance channel.
    pub cycle_dist: f64,

    pub gradient: Gradient,
    /// Gradient position shift in cycles, wrapped into [0,1).
    pub gradient_shift: f64,
    /// Gradient hue rotation in degrees.
    pub hue_shift: f64,

    /// Alternate flattened-plane view. The flattened render path lives
    /// outside this engine; the flag only participates in dirty tracking so
    /// toggling it invalidates computed fields.
    pub flatten: bool,
    /// Optional coordinate warp; forces the f64 kernel path when set.
    pub warp: Option<WarpSettings>,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            quality: Quality::default(),
            smoothing: Smoothing::Iter,
            iter_dist_mix: 0.0,
            normalize_depth: true,
            log1p_weight: 0.0,
            cycle_depth: CycleLength::default(),
            cycle_dist: 0.5,
            gradient: Gradient::default(),
            gradient_shift: 0.0,
            hue_shift: 0.0,
            flatten: false,
            warp: None,
        }
    }
}

impl RenderSettings {
    /// The gradient with this frame's shift and hue rotation applied.
    pub fn active_gradient(&self) -> Gradient {
        self.gradient.shifted(self.gradient_shift, self.hue_shift)
    }
}

/// Empirical iteration limit for a given zoom.
///
/// Quadratic fit (in log10 of the scaled zoom) to hand-tuned limits that keep
/// detail visible from zoom 1 up past 1e16, tripled for headroom. Monotonic
/// over the whole usable range.
pub fn iteration_limit(zoom: f64) -> u32 {
    let l = (zoom * 400.0).log10();
    let curve = (-19.35 * l * l + 741.0 * l - 1841.0).floor();
    let base = 100.0 + curve.max(0.0);
    (base * 3.0) as u32
}
