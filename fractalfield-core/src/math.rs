//! Small shared math helpers used by normalization and coloring.

/// Wrap `value` into the half-open range `[min, max)`.
pub fn wrap(value: f64, min: f64, max: f64) -> f64 {
    let range = max - min;
    let mut v = (value - min) % range;
    if v < 0.0 {
        v += range;
    }
    v + min
}

/// Where `value` sits between `min` and `max` (0 at min, 1 at max).
/// Returns 0 for a degenerate (empty) range.
pub fn lerp_factor(value: f64, min: f64, max: f64) -> f64 {
    let range = max - min;
    if range == 0.0 {
        return 0.0;
    }
    (value - min) / range
}

/// Linear interpolation between `a` and `b`.
pub fn lerp(a: f64, b: f64, f: f64) -> f64 {
    a + (b - a) * f
}

/// Blend a value toward its `ln(1 + a)` compression.
///
/// `weight = 0` leaves the value linear, `weight = 1` is fully logarithmic.
/// Used identically for depth normalization and color-cycle lengths so the
/// banding cadence stays stable when the weight changes.
pub fn linear_log1p_lerp(a: f64, weight: f64) -> f64 {
    a + ((1.0 + a).ln() - a) * weight
}

/// Replace a non-finite value with `fallback`.
///
/// Non-finite depth/dist values are invariant violations: trap in debug
/// builds, clamp silently in release.
#[inline]
pub fn sanitize(value: f64, fallback: f64) -> f64 {
    debug_assert!(value.is_finite(), "non-finite field value: {}", value);
    if value.is_finite() {
        value
    } else {
        fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_keeps_values_in_range() {
        assert!((wrap(1.25, 0.0, 1.0) - 0.25).abs() < 1e-12);
        assert!((wrap(-0.25, 0.0, 1.0) - 0.75).abs() < 1e-12);
        assert!((wrap(0.5, 0.0, 1.0) - 0.5).abs() < 1e-12);
        assert!((wrap(3.0, 0.0, 1.0) - 0.0).abs() < 1e-12);
    }

    #[test]
    fn lerp_factor_endpoints() {
        assert_eq!(lerp_factor(2.0, 2.0, 10.0), 0.0);
        assert_eq!(lerp_factor(10.0, 2.0, 10.0), 1.0);
        assert_eq!(lerp_factor(6.0, 2.0, 10.0), 0.5);
    }

    #[test]
    fn lerp_factor_degenerate_range_is_zero() {
        assert_eq!(lerp_factor(5.0, 3.0, 3.0), 0.0);
    }

    #[test]
    fn log1p_lerp_weight_zero_is_identity() {
        for v in [0.0, 1.0, 100.0, 12345.678] {
            assert_eq!(linear_log1p_lerp(v, 0.0), v);
        }
    }

    #[test]
    fn log1p_lerp_weight_one_is_log1p() {
        for v in [0.0, 1.0, 100.0] {
            assert!((linear_log1p_lerp(v, 1.0) - (1.0 + v).ln()).abs() < 1e-12);
        }
    }

    #[test]
    fn sanitize_passes_finite_values() {
        assert_eq!(sanitize(1.5, 0.0), 1.5);
        assert_eq!(sanitize(-3.0, 0.0), -3.0);
    }

    #[test]
    #[cfg(not(debug_assertions))]
    fn sanitize_clamps_non_finite_in_release() {
        assert_eq!(sanitize(f64::NAN, 7.0), 7.0);
        assert_eq!(sanitize(f64::INFINITY, 7.0), 7.0);
    }
}
