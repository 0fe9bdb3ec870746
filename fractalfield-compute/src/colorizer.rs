//! Field-to-bitmap shading.
//!
//! Maps normalized depth/distance channels through the cyclic gradient.
//! Shading never mutates the field, so it can be re-run on the active pair
//! whenever a color parameter changes without recomputing anything.

use fractalfield_core::{
    iteration_limit, linear_log1p_lerp, wrap, CycleLength, EscapeField, RenderSettings, Smoothing,
};

use crate::bitmap::{pack_rgba, Bitmap, OPAQUE_BLACK};

/// Gradient cycle length in depth units.
///
/// The dynamic form keys off an assumed iteration cap derived from the zoom
/// (half the empirical limit) so the apparent banding cadence holds steady
/// while zooming, instead of re-cycling every time the real cap changes.
/// Both forms pass through the same log1p blend as the depths they divide.
pub fn depth_cycle_length(settings: &RenderSettings, zoom: f64, min_depth: f64) -> f64 {
    let raw = match settings.cycle_depth {
        CycleLength::Absolute(value) => value,
        CycleLength::Dynamic(fraction) => {
            let assumed_cap = iteration_limit(zoom) as f64 * 0.5;
            let floor = if settings.normalize_depth {
                min_depth
            } else {
                0.0
            };
            fraction * (assumed_cap - floor)
        }
    };
    let cycle = linear_log1p_lerp(raw, settings.log1p_weight);
    if cycle.is_finite() && cycle > 0.0 {
        cycle
    } else {
        1.0
    }
}

/// Blend weight of the distance channel for the current smoothing mode.
fn dist_weight(settings: &RenderSettings) -> f64 {
    match settings.smoothing {
        Smoothing::Iter => 0.0,
        Smoothing::Dist => 1.0,
        Smoothing::Mix => settings.iter_dist_mix,
    }
}

/// Shade every resolved pixel of `field` into `bitmap` (same dimensions).
/// Unresolved pixels keep whatever the bitmap held, so partially scanned
/// phases show stale-but-valid colors instead of garbage.
pub fn shade(field: &EscapeField, bitmap: &mut Bitmap, settings: &RenderSettings, zoom: f64) {
    debug_assert_eq!(bitmap.width(), field.width());
    debug_assert_eq!(bitmap.height(), field.height());

    let gradient = settings.active_gradient();
    let cycle_depth = depth_cycle_length(settings, zoom, field.min_depth);
    let cycle_dist = if settings.cycle_dist > 0.0 {
        settings.cycle_dist
    } else {
        1.0
    };
    let dist_w = dist_weight(settings);
    let iter_w = 1.0 - dist_w;

    for y in 0..field.height() {
        for x in 0..field.width() {
            let pixel = field.at(x, y);
            if !pixel.is_resolved() {
                continue;
            }
            if pixel.is_interior() {
                bitmap.set_pixel(x, y, OPAQUE_BLACK);
                continue;
            }

            let iter_r = pixel.final_depth / cycle_depth;
            let dist_r = pixel.final_dist / cycle_dist;
            let combined_t = wrap(iter_r * iter_w + dist_r * dist_w, 0.0, 1.0);

            let [r, g, b, a] = gradient.sample(combined_t);
            bitmap.set_pixel(x, y, pack_rgba(r, g, b, a));
        }
    }
}
