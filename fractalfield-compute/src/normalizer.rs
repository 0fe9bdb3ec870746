//! Depth/distance normalization.
//!
//! Two passes over a fully scanned field: the first collects min/max bounds
//! from the raw values, the second rewrites the `final_*` channels the color
//! mapper reads. Both passes only consult raw values, so re-running the
//! normalizer is idempotent and safe after any settings change.

use fractalfield_core::{
    lerp_factor, linear_log1p_lerp, sanitize, EscapeField, RenderSettings, INSIDE_SET_SKIPPED,
};

/// Collect raw bounds and write the normalized channels.
///
/// Interior and uncomputed pixels contribute nothing to the bounds and keep
/// their `final_*` values untouched; the shader never reads them. Distance
/// bounds are taken over `−ln(dist)` so the later lerp works in the same
/// space the shader consumes.
///
/// A raw `dist` of 0 means the pixel was computed without the distance
/// channel (the kernel clamps real estimates to ≥ `f64::EPSILON`), which
/// happens when smoothing switched to a distance mode after the scan. Those
/// pixels are excluded from the bounds and get `final_dist = 0`, the same
/// value the inactive path writes.
pub fn normalize(field: &mut EscapeField, settings: &RenderSettings) {
    let needs_dist = settings.smoothing.needs_dist();

    // Pass 1: bounds.
    let mut min_depth = f64::MAX;
    let mut max_depth = f64::MIN;
    let mut min_dist = f64::MAX;
    let mut max_dist = f64::MIN;

    for pixel in field.pixels() {
        let depth = pixel.depth;
        if !(0.0..INSIDE_SET_SKIPPED).contains(&depth) {
            continue;
        }
        if depth < min_depth {
            min_depth = depth;
        }
        if depth > max_depth {
            max_depth = depth;
        }
        if needs_dist && pixel.dist > 0.0 {
            let log_dist = -pixel.dist.ln();
            if log_dist < min_dist {
                min_dist = log_dist;
            }
            if log_dist > max_dist {
                max_dist = log_dist;
            }
        }
    }

    // All-interior (or empty) field: leave a usable zero floor.
    if min_depth > max_depth {
        min_depth = 0.0;
        max_depth = 0.0;
    }
    if min_dist > max_dist {
        min_dist = 0.0;
        max_dist = 0.0;
    }

    field.min_depth = min_depth;
    field.max_depth = max_depth;
    field.min_dist = min_dist;
    field.max_dist = max_dist;

    // Pass 2: normalized channels.
    let floor_depth = if settings.normalize_depth {
        min_depth
    } else {
        0.0
    };
    let log1p_weight = settings.log1p_weight;

    for pixel in field.pixels_mut() {
        let depth = pixel.depth;
        if !(0.0..INSIDE_SET_SKIPPED).contains(&depth) {
            continue;
        }
        pixel.final_depth = sanitize(
            linear_log1p_lerp(depth - floor_depth, log1p_weight),
            0.0,
        );
        pixel.final_dist = if needs_dist && pixel.dist > 0.0 {
            sanitize(1.0 - lerp_factor(-pixel.dist.ln(), min_dist, max_dist), 0.0)
        } else {
            0.0
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fractalfield_core::{Smoothing, INSIDE_SET, UNCOMPUTED};

    fn field_with_depths(depths: &[f64]) -> EscapeField {
        let mut field = EscapeField::new(0);
        field.set_dimensions(depths.len(), 1);
        for (x, &d) in depths.iter().enumerate() {
            field.at_mut(x, 0).depth = d;
        }
        field
    }

    #[test]
    fn bounds_ignore_interior_and_uncomputed() {
        let mut field = field_with_depths(&[5.0, 20.0, INSIDE_SET, UNCOMPUTED, INSIDE_SET_SKIPPED]);
        normalize(&mut field, &RenderSettings::default());
        assert_eq!(field.min_depth, 5.0);
        assert_eq!(field.max_depth, 20.0);
    }

    #[test]
    fn all_interior_field_gets_zero_bounds() {
        let mut field = field_with_depths(&[INSIDE_SET, INSIDE_SET_SKIPPED]);
        normalize(&mut field, &RenderSettings::default());
        assert_eq!(field.min_depth, 0.0);
        assert_eq!(field.max_depth, 0.0);
    }

    #[test]
    fn normalize_rebases_to_minimum() {
        let settings = RenderSettings {
            normalize_depth: true,
            log1p_weight: 0.0,
            ..Default::default()
        };
        let mut field = field_with_depths(&[10.0, 14.0]);
        normalize(&mut field, &settings);
        assert_eq!(field.at(0, 0).final_depth, 0.0);
        assert_eq!(field.at(1, 0).final_depth, 4.0);
    }

    #[test]
    fn without_rebase_depths_stay_absolute() {
        let settings = RenderSettings {
            normalize_depth: false,
            log1p_weight: 0.0,
            ..Default::default()
        };
        let mut field = field_with_depths(&[10.0, 14.0]);
        normalize(&mut field, &settings);
        assert_eq!(field.at(0, 0).final_depth, 10.0);
        assert_eq!(field.at(1, 0).final_depth, 14.0);
    }

    #[test]
    fn log1p_weight_compresses_depth() {
        let settings = RenderSettings {
            normalize_depth: false,
            log1p_weight: 1.0,
            ..Default::default()
        };
        let mut field = field_with_depths(&[100.0]);
        normalize(&mut field, &settings);
        assert!((field.at(0, 0).final_depth - 101.0_f64.ln()).abs() < 1e-12);
    }

    #[test]
    fn distance_channel_orientation() {
        let settings = RenderSettings {
            smoothing: Smoothing::Dist,
            ..Default::default()
        };
        let mut field = field_with_depths(&[3.0, 4.0]);
        field.at_mut(0, 0).dist = 1e-9; // near the boundary
        field.at_mut(1, 0).dist = 0.5; // far away
        normalize(&mut field, &settings);
        // Near-boundary pixels sit at the max of the -ln(dist) axis and land
        // on 0; far pixels land on 1.
        assert_eq!(field.at(0, 0).final_dist, 0.0);
        assert_eq!(field.at(1, 0).final_dist, 1.0);
    }

    #[test]
    fn distance_channel_zero_when_inactive() {
        let settings = RenderSettings {
            smoothing: Smoothing::Iter,
            ..Default::default()
        };
        let mut field = field_with_depths(&[3.0]);
        field.at_mut(0, 0).dist = 0.5;
        normalize(&mut field, &settings);
        assert_eq!(field.at(0, 0).final_dist, 0.0);
    }

    #[test]
    fn stale_zero_distances_stay_out_of_the_bounds() {
        // Pixels scanned before a switch to distance smoothing carry dist 0;
        // feeding them through -ln would blow the bounds up to infinity.
        let settings = RenderSettings {
            smoothing: Smoothing::Dist,
            ..Default::default()
        };
        let mut field = field_with_depths(&[3.0, 4.0, 5.0]);
        field.at_mut(1, 0).dist = 1e-3;
        field.at_mut(2, 0).dist = 0.5;
        normalize(&mut field, &settings);

        assert!(field.max_dist.is_finite());
        assert_eq!(field.at(0, 0).final_dist, 0.0);
        assert!(field.at(1, 0).final_dist.is_finite());
        assert!(field.at(2, 0).final_dist.is_finite());
    }

    #[test]
    fn all_stale_distances_normalize_to_zero() {
        let settings = RenderSettings {
            smoothing: Smoothing::Dist,
            ..Default::default()
        };
        let mut field = field_with_depths(&[3.0, 4.0]);
        normalize(&mut field, &settings);
        assert_eq!(field.min_dist, 0.0);
        assert_eq!(field.max_dist, 0.0);
        assert!(field.pixels().iter().all(|p| p.final_dist == 0.0));
    }

    #[test]
    fn normalization_is_idempotent() {
        let settings = RenderSettings {
            smoothing: Smoothing::Mix,
            ..Default::default()
        };
        let mut field = field_with_depths(&[2.0, 7.5, 30.0, INSIDE_SET]);
        for p in field.pixels_mut() {
            p.dist = 0.01;
        }
        normalize(&mut field, &settings);
        let snapshot: Vec<_> = field.pixels().to_vec();
        normalize(&mut field, &settings);
        assert_eq!(field.pixels(), &snapshot[..]);
    }

    #[test]
    fn interior_finals_left_untouched() {
        let mut field = field_with_depths(&[INSIDE_SET, 5.0]);
        field.at_mut(0, 0).final_depth = 42.0;
        normalize(&mut field, &RenderSettings::default());
        assert_eq!(field.at(0, 0).final_depth, 42.0);
    }
}
