//! Numeric tier selection.
//!
//! Determines which representation the kernel iterates in for the current
//! zoom depth. Distance estimation consumes more precision headroom at the
//! same zoom (the derivative magnifies per-pixel deltas), so its tier
//! switches happen far earlier.

use serde::{Deserialize, Serialize};

/// Closed set of kernel iteration types. Selected per batch at the call
/// boundary so every tier stays independently testable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrecisionTier {
    /// f32: shallow zooms only.
    Single,
    /// f64: the common case.
    Double,
    /// Double-double (~106-bit significand): deepest zooms.
    Extended,
}

/// Zoom at which f32 runs out of pixel resolution.
const MAX_SINGLE_ZOOM_ITER: f64 = 10_000.0;
const MAX_SINGLE_ZOOM_DIST: f64 = 40.0;

/// Zoom at which f64 runs out of pixel resolution.
const MAX_DOUBLE_ZOOM_ITER: f64 = 2e12;
const MAX_DOUBLE_ZOOM_DIST: f64 = 2e10;

impl PrecisionTier {
    /// Pick the cheapest tier that is still accurate at `zoom`.
    ///
    /// `needs_dist` is true when the smoothing mode requests a
    /// derivative-based distance estimate.
    pub fn select(zoom: f64, needs_dist: bool) -> Self {
        let (max_single, max_double) = if needs_dist {
            (MAX_SINGLE_ZOOM_DIST, MAX_DOUBLE_ZOOM_DIST)
        } else {
            (MAX_SINGLE_ZOOM_ITER, MAX_DOUBLE_ZOOM_ITER)
        };

        if zoom < max_single {
            PrecisionTier::Single
        } else if zoom < max_double {
            PrecisionTier::Double
        } else {
            PrecisionTier::Extended
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shallow_zoom_uses_single() {
        assert_eq!(PrecisionTier::select(1.0, false), PrecisionTier::Single);
        assert_eq!(PrecisionTier::select(9_999.0, false), PrecisionTier::Single);
    }

    #[test]
    fn iteration_mode_thresholds() {
        assert_eq!(PrecisionTier::select(10_000.0, false), PrecisionTier::Double);
        assert_eq!(PrecisionTier::select(1e12, false), PrecisionTier::Double);
        assert_eq!(PrecisionTier::select(2e12, false), PrecisionTier::Extended);
    }

    #[test]
    fn distance_mode_switches_much_earlier() {
        assert_eq!(PrecisionTier::select(39.0, true), PrecisionTier::Single);
        assert_eq!(PrecisionTier::select(40.0, true), PrecisionTier::Double);
        assert_eq!(PrecisionTier::select(1e10, true), PrecisionTier::Double);
        assert_eq!(PrecisionTier::select(2e10, true), PrecisionTier::Extended);
    }

    #[test]
    fn distance_tier_never_cheaper_than_iteration_tier() {
        fn rank(t: PrecisionTier) -> u8 {
            match t {
                PrecisionTier::Single => 0,
                PrecisionTier::Double => 1,
                PrecisionTier::Extended => 2,
            }
        }

        for zoom in [1.0, 50.0, 1e4, 1e8, 1e10, 1e11, 1e13] {
            let iter_tier = PrecisionTier::select(zoom, false);
            let dist_tier = PrecisionTier::select(zoom, true);
            assert!(
                rank(dist_tier) >= rank(iter_tier),
                "zoom {}: {:?} < {:?}",
                zoom,
                dist_tier,
                iter_tier
            );
        }
    }
}
