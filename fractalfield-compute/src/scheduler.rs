//! Progressive multi-resolution render scheduler.
//!
//! Drives three escape fields at 1:3:9 resolution through a COARSE → MEDIUM
//! → FINE state machine. Each frame the caller hands in the current world
//! quad, viewport size, and live settings; the scheduler restarts from
//! COARSE when a compute input changed, otherwise resumes the pending
//! phase's scan inside its time budget. A completed phase is normalized,
//! shaded, published as the active (field, bitmap) pair, and forwarded into
//! the next phase so already-known pixels are never recomputed.
//!
//! Color-only parameter changes reshade the active bitmap without touching
//! any field.

use std::time::{Duration, Instant};

use fractalfield_core::{
    EscapeField, PrecisionTier, Quality, RenderSettings, Smoothing, WorldQuad, FieldPixel,
    UNCOMPUTED,
};

use crate::bitmap::{Bitmap, RESTART_FILL};
use crate::colorizer::shade;
use crate::normalizer::normalize;
use crate::walker::{default_worker_count, ScanParams, TileWalker};

/// World-space width of the whole-set view that defines zoom 1.
const REFERENCE_SPAN: f64 = 4.0;

/// Per-call scan budget for the incremental phases. COARSE always runs to
/// completion in a single call so something is on screen immediately.
const INCREMENTAL_BUDGET: Duration = Duration::from_millis(16);

/// Resolution phases, coarsest first.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Coarse,
    Medium,
    Fine,
}

impl Phase {
    pub const COUNT: usize = 3;

    pub fn index(self) -> usize {
        match self {
            Phase::Coarse => 0,
            Phase::Medium => 1,
            Phase::Fine => 2,
        }
    }

    /// Downscale factor relative to full viewport resolution.
    pub fn scale(self) -> usize {
        match self {
            Phase::Coarse => 9,
            Phase::Medium => 3,
            Phase::Fine => 1,
        }
    }

    fn next(self) -> Option<Phase> {
        match self {
            Phase::Coarse => Some(Phase::Medium),
            Phase::Medium => Some(Phase::Fine),
            Phase::Fine => None,
        }
    }
}

/// Per-frame input from the camera and viewport.
#[derive(Clone, Copy, Debug)]
pub struct FrameInput {
    pub quad: WorldQuad,
    /// Viewport pixel dimensions; rounded up to a multiple of 9 internally.
    pub width: usize,
    pub height: usize,
}

/// Compute-relevant inputs; any change restarts from COARSE.
#[derive(Clone, PartialEq)]
struct ComputeSnapshot {
    quad: WorldQuad,
    width: usize,
    height: usize,
    quality: Quality,
    iter_cap: u32,
    flatten: bool,
    warp_hash: Option<u64>,
}

/// Color-relevant inputs; any change reshades the active bitmap.
#[derive(Clone, PartialEq)]
struct ColorSnapshot {
    cycle_depth: fractalfield_core::CycleLength,
    cycle_dist: f64,
    log1p_weight: f64,
    normalize_depth: bool,
    smoothing: Smoothing,
    iter_dist_mix: f64,
    gradient: fractalfield_core::Gradient,
    gradient_shift: f64,
    hue_shift: f64,
}

impl ColorSnapshot {
    fn capture(settings: &RenderSettings) -> Self {
        Self {
            cycle_depth: settings.cycle_depth,
            cycle_dist: settings.cycle_dist,
            log1p_weight: settings.log1p_weight,
            normalize_depth: settings.normalize_depth,
            smoothing: settings.smoothing,
            iter_dist_mix: settings.iter_dist_mix,
            gradient: settings.gradient.clone(),
            gradient_shift: settings.gradient_shift,
            hue_shift: settings.hue_shift,
        }
    }
}

/// Moving average over a fixed window, for compute-time logging.
struct MovingAverage {
    samples: Vec<f64>,
    window: usize,
    next: usize,
}

impl MovingAverage {
    fn new(window: usize) -> Self {
        Self {
            samples: Vec::with_capacity(window),
            window,
            next: 0,
        }
    }

    fn push(&mut self, value: f64) -> f64 {
        if self.samples.len() < self.window {
            self.samples.push(value);
        } else {
            self.samples[self.next] = value;
            self.next = (self.next + 1) % self.window;
        }
        self.samples.iter().sum::<f64>() / self.samples.len() as f64
    }
}

/// One frame's outcome.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameReport {
    /// A phase finished its scan this frame.
    pub phase_completed: bool,
    /// The active bitmap changed content (new phase or reshade).
    pub bitmap_updated: bool,
    /// All three phases are complete and nothing is pending.
    pub idle: bool,
}

/// Raw and normalized values at one probed position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProbeSample {
    pub phase: Phase,
    pub pixel: FieldPixel,
}

pub struct ProgressiveRenderer {
    fields: [EscapeField; Phase::COUNT],
    bitmaps: [Bitmap; Phase::COUNT],
    walker: TileWalker,
    worker_count: usize,

    phase: Phase,
    active: Option<usize>,
    first_frame: bool,
    phase_just_advanced: bool,

    compute_snapshot: Option<ComputeSnapshot>,
    color_snapshot: Option<ColorSnapshot>,

    restart_time: Instant,
    compute_timer: MovingAverage,
}

impl ProgressiveRenderer {
    pub fn new() -> Self {
        Self::with_worker_count(default_worker_count())
    }

    pub fn with_worker_count(worker_count: usize) -> Self {
        Self {
            fields: [
                EscapeField::new(0),
                EscapeField::new(1),
                EscapeField::new(2),
            ],
            bitmaps: [Bitmap::new(), Bitmap::new(), Bitmap::new()],
            walker: TileWalker::new(worker_count),
            worker_count,
            phase: Phase::Coarse,
            active: None,
            first_frame: true,
            phase_just_advanced: false,
            compute_snapshot: None,
            color_snapshot: None,
            restart_time: Instant::now(),
            compute_timer: MovingAverage::new(10),
        }
    }

    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The most recently published bitmap, if any phase has completed since
    /// the last restart.
    pub fn active_bitmap(&self) -> Option<&Bitmap> {
        self.active.map(|i| &self.bitmaps[i])
    }

    pub fn active_field(&self) -> Option<&EscapeField> {
        self.active.map(|i| &self.fields[i])
    }

    /// The field backing a specific phase, complete or not.
    pub fn field(&self, phase: Phase) -> &EscapeField {
        &self.fields[phase.index()]
    }

    /// Inspect the active field at full-resolution pixel coordinates.
    pub fn probe(&self, x: usize, y: usize) -> Option<ProbeSample> {
        let idx = self.active?;
        let phase = match idx {
            0 => Phase::Coarse,
            1 => Phase::Medium,
            _ => Phase::Fine,
        };
        let scale = phase.scale();
        let pixel = *self.fields[idx].get(x / scale, y / scale)?;
        Some(ProbeSample { phase, pixel })
    }

    /// Zoom factor implied by the view quad, relative to the whole-set view.
    pub fn zoom_of(quad: &WorldQuad) -> f64 {
        let dx = quad.b.x - quad.a.x;
        let dy = quad.b.y - quad.a.y;
        let span = (dx * dx + dy * dy).sqrt();
        if span > 0.0 {
            REFERENCE_SPAN / span
        } else {
            1.0
        }
    }

    /// Advance the pipeline by one frame.
    pub fn process(&mut self, input: &FrameInput, settings: &RenderSettings) -> FrameReport {
        // Dimensions divisible by 9 give exact 3x forwarding between phases.
        let iw = input.width.div_ceil(9) * 9;
        let ih = input.height.div_ceil(9) * 9;

        let zoom = Self::zoom_of(&input.quad);
        let iter_cap = settings.quality.iter_limit(zoom);

        let compute_snapshot = ComputeSnapshot {
            quad: input.quad,
            width: iw,
            height: ih,
            quality: settings.quality,
            iter_cap,
            flatten: settings.flatten,
            warp_hash: settings.warp.as_ref().map(|w| w.content_hash()),
        };
        let dirty =
            self.first_frame || self.compute_snapshot.as_ref() != Some(&compute_snapshot);

        let color_snapshot = ColorSnapshot::capture(settings);
        let mut colors_updated =
            self.first_frame || self.color_snapshot.as_ref() != Some(&color_snapshot);

        if dirty {
            for bmp in &mut self.bitmaps {
                bmp.clear(RESTART_FILL);
            }
            self.phase = Phase::Coarse;
            self.walker.reset();
            self.active = None;
            self.restart_time = Instant::now();
        }

        for (i, scale) in [9usize, 3, 1].into_iter().enumerate() {
            self.fields[i].set_dimensions(iw / scale, ih / scale);
            self.bitmaps[i].set_dimensions(iw / scale, ih / scale);
        }
        if dirty {
            // Clearing after the resize covers newly exposed pixels too.
            for field in &mut self.fields {
                field.set_all_depth(UNCOMPUTED);
            }
        }

        let do_compute = dirty || self.phase_just_advanced || self.walker.cursor() != 0;
        self.phase_just_advanced = false;

        let mut report = FrameReport::default();

        if do_compute {
            let needs_dist = settings.smoothing.needs_dist() && settings.warp.is_none();
            let params = ScanParams {
                quad: &input.quad,
                tier: PrecisionTier::select(zoom, needs_dist),
                iter_cap,
                needs_dist,
                warp: settings.warp.as_ref(),
            };
            let budget = match self.phase {
                Phase::Coarse => None,
                Phase::Medium | Phase::Fine => Some(INCREMENTAL_BUDGET),
            };

            let idx = self.phase.index();
            let complete = self.walker.scan(&mut self.fields[idx], &params, budget);

            if complete {
                normalize(&mut self.fields[idx], settings);
                shade(&self.fields[idx], &mut self.bitmaps[idx], settings, zoom);
                // Publish only after every field write for this phase landed.
                self.active = Some(idx);
                report.phase_completed = true;
                report.bitmap_updated = true;
                // The shade above already used the latest color settings.
                colors_updated = false;

                match self.phase.next() {
                    Some(next) => {
                        self.forward_into(next);
                        self.phase = next;
                        self.phase_just_advanced = true;
                    }
                    None => {
                        let elapsed_ms =
                            self.restart_time.elapsed().as_secs_f64() * 1e3;
                        let avg = self.compute_timer.push(elapsed_ms);
                        log::debug!(
                            "full-resolution pass done in {:.1}ms (avg {:.1}ms)",
                            elapsed_ms,
                            avg
                        );
                    }
                }
            }
        }

        if colors_updated {
            if let Some(idx) = self.active {
                // Normalization is idempotent over raw data, so re-running it
                // here covers weight/toggle changes without a recompute.
                normalize(&mut self.fields[idx], settings);
                shade(&self.fields[idx], &mut self.bitmaps[idx], settings, zoom);
                report.bitmap_updated = true;
            }
        }

        report.idle = self.phase == Phase::Fine
            && !self.phase_just_advanced
            && self.walker.cursor() == 0
            && self.active == Some(Phase::Fine.index())
            && !report.phase_completed;

        self.first_frame = false;
        self.compute_snapshot = Some(compute_snapshot);
        self.color_snapshot = Some(color_snapshot);

        report
    }

    /// Copy every pixel of the just-finished phase into the center of its
    /// 3×3 block in the next field; the other eight cells stay uncomputed.
    fn forward_into(&mut self, next: Phase) {
        let cur = self.phase.index();
        let nxt = next.index();

        let (src, dst) = {
            // Phases are distinct, ordered indices into the same array.
            let (a, b) = self.fields.split_at_mut(nxt);
            (&a[cur], &mut b[0])
        };

        dst.set_all_depth(UNCOMPUTED);
        for y in 0..src.height() {
            for x in 0..src.width() {
                *dst.at_mut(x * 3 + 1, y * 3 + 1) = *src.at(x, y);
            }
        }
    }
}

impl Default for ProgressiveRenderer {
    fn default() -> Self {
        Self::new()
    }
}
