//! Escape-time iteration kernel.
//!
//! The hot loop runs in a tier-selected numeric type; smoothing and the
//! distance estimate are finished in f64 after escape. Transcendentals go
//! through `libm` so depths are bit-identical across platforms.

use fractalfield_core::{sanitize, Real, WarpSettings, INSIDE_SET, INSIDE_SET_SKIPPED};

/// Squared escape threshold (radius 64) for iteration-only smoothing.
const ESCAPE_R2_ITER: f64 = 4096.0;

/// Squared escape threshold (radius 512) when a distance estimate is
/// co-iterated. The larger radius keeps the estimate accurate near the
/// boundary.
const ESCAPE_R2_DIST: f64 = 262_144.0;

/// Depth offset for a given squared threshold, `log2(log2(R²)) − 1`.
/// Subtracting it aligns banding across the two thresholds so toggling the
/// distance channel does not shift colors.
fn smoothing_offset(r2_limit: f64) -> f64 {
    libm::log2(libm::log2(r2_limit)) - 1.0
}

/// Cardioid / period-2 bulb test. True means the point is provably inside
/// the set and the iteration loop can be skipped entirely.
pub fn interior_check<T: Real>(x0: T, y0: T) -> bool {
    let a = T::from_f64(0.25);
    let b = T::from_f64(0.0625);

    let x_minus_a = x0 - a;
    let y2 = y0 * y0;
    let q = x_minus_a * x_minus_a + y2;

    // Main cardioid.
    if q * (q + x_minus_a) < a * y2 {
        return true;
    }

    // Period-2 bulb.
    let x_plus_1 = x0 + T::one();
    x_plus_1 * x_plus_1 + y2 < b
}

/// Iterate `z ← z² + c` from `c = (x0, y0)` and return `(depth, dist)`.
///
/// `depth` is the smoothed fractional escape iteration, `INSIDE_SET` when the
/// cap is reached, or `INSIDE_SET_SKIPPED` when the interior shortcut fires.
/// `dist` is the exterior distance estimate (≥ `f64::EPSILON`) when
/// `needs_dist`, else 0; the derivative `dz ← 2·z·dz + 1` is co-iterated only
/// in that case.
pub fn escape_kernel<T: Real>(x0: T, y0: T, iter_cap: u32, needs_dist: bool) -> (f64, f64) {
    if interior_check(x0, y0) {
        return (INSIDE_SET_SKIPPED, 0.0);
    }

    let r2_limit_f64 = if needs_dist {
        ESCAPE_R2_DIST
    } else {
        ESCAPE_R2_ITER
    };
    let r2_limit = T::from_f64(r2_limit_f64);

    let mut zx = T::zero();
    let mut zy = T::zero();
    let mut dzx = T::one();
    let mut dzy = T::zero();

    let mut iter = 0u32;
    let mut r2 = T::zero();

    while iter < iter_cap {
        // z ← z² + c
        let xx = zx * zx;
        let yy = zy * zy;
        let xy = zx * zy;
        zx = xx - yy + x0;
        zy = xy + xy + y0;

        // dz ← 2·z·dz + 1 against the stepped z
        if needs_dist {
            let zx_dzx = zx * dzx;
            let zy_dzy = zy * dzy;
            let zx_dzy = zx * dzy;
            let zy_dzx = zy * dzx;
            dzx = (zx_dzx - zy_dzy) + (zx_dzx - zy_dzy) + T::one();
            dzy = (zx_dzy + zy_dzx) + (zx_dzy + zy_dzx);
        }

        r2 = zx * zx + zy * zy;
        if r2 > r2_limit {
            break;
        }
        iter += 1;
    }

    let dist = if needs_dist {
        let r = r2.to_f64().sqrt();
        let dz_abs = (dzx * dzx + dzy * dzy).to_f64().sqrt();
        let d = if dz_abs == 0.0 {
            0.0
        } else {
            r * libm::log(r) / dz_abs
        };
        sanitize(d, f64::EPSILON).max(f64::EPSILON)
    } else {
        0.0
    };

    let depth = if iter == iter_cap {
        INSIDE_SET
    } else {
        let r2 = r2.to_f64();
        let s = libm::log2(libm::log2(r2) / 2.0);
        sanitize(
            iter as f64 + (1.0 - s) - smoothing_offset(r2_limit_f64),
            iter as f64,
        )
    };

    (depth, dist)
}

/// Warped variant: the squared coordinate terms are remapped through
/// per-axis sample curves every iteration, so the dynamics are no longer the
/// plain quadratic map and the interior shortcut does not apply. Runs in f64
/// only; deep-zoom tiers are pointless once the curves dominate the shape.
pub fn warped_kernel(x0: f64, y0: f64, iter_cap: u32, warp: &WarpSettings) -> f64 {
    let (mut x, mut y) = (0.0_f64, 0.0_f64);
    let (mut xx, mut yy) = (0.0_f64, 0.0_f64);
    let mut iter = 0u32;

    while xx + yy <= 4.0 && iter < iter_cap {
        y = 2.0 * x * y + y0;
        x = xx - yy + x0;
        xx = warp.x.apply(x * x);
        yy = warp.y.apply(y * y);
        iter += 1;
    }

    if iter == iter_cap {
        return INSIDE_SET;
    }

    let depth = iter as f64 + (1.0 - libm::log2(libm::log2(xx + yy) / 2.0));
    if depth.is_finite() {
        depth
    } else {
        // Curves can push r² non-positive at the escape step.
        iter_cap as f64
    }
}
