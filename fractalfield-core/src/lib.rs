pub mod doubledouble;
pub mod field;
pub mod gradient;
pub mod math;
pub mod numeric;
pub mod precision;
pub mod quad;
pub mod settings;

pub use doubledouble::DoubleDouble;
pub use field::{EscapeField, FieldPixel, INSIDE_SET, INSIDE_SET_SKIPPED, UNCOMPUTED};
pub use gradient::{ColorStop, Gradient};
pub use math::{lerp, lerp_factor, linear_log1p_lerp, sanitize, wrap};
pub use numeric::Real;
pub use precision::PrecisionTier;
pub use quad::{WorldPoint, WorldQuad};
pub use settings::{
    iteration_limit, CycleLength, Quality, RenderSettings, Smoothing, WarpCurve, WarpSettings,
};
