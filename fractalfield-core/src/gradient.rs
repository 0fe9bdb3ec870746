//! Cyclic color gradients.
//!
//! A gradient is a sorted list of positioned RGBA stops sampled cyclically:
//! `t` wraps at 1 → 0, and the span between the last and first stop
//! interpolates across the wrap point. A global position shift and hue
//! rotation produce the "shifted" gradient actually used for shading.

use crate::math::wrap;
use serde::{Deserialize, Serialize};

/// A color stop in the gradient.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ColorStop {
    pub position: f64,
    pub color: [u8; 4],
}

impl ColorStop {
    pub fn new(position: f64, r: u8, g: u8, b: u8) -> Self {
        Self {
            position,
            color: [r, g, b, 255],
        }
    }
}

/// Cyclic gradient with stops sorted by position.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawGradient")]
pub struct Gradient {
    stops: Vec<ColorStop>,
}

/// Unvalidated wire form; deserialization funnels through `TryFrom` so an
/// empty stop list is rejected instead of constructed.
#[derive(Deserialize)]
struct RawGradient {
    stops: Vec<ColorStop>,
}

impl TryFrom<RawGradient> for Gradient {
    type Error = String;

    fn try_from(raw: RawGradient) -> Result<Self, Self::Error> {
        if raw.stops.is_empty() {
            return Err("gradient needs at least one color stop".into());
        }
        Ok(Gradient::new(raw.stops))
    }
}

impl Gradient {
    /// Build a gradient from stops; sorts by position. Requires at least one
    /// stop.
    pub fn new(mut stops: Vec<ColorStop>) -> Self {
        assert!(!stops.is_empty(), "gradient needs at least one color stop");
        stops.sort_by(|a, b| {
            a.position
                .partial_cmp(&b.position)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        Self { stops }
    }

    pub fn stops(&self) -> &[ColorStop] {
        &self.stops
    }

    /// The classic blue/yellow/red Mandelbrot palette.
    pub fn classic() -> Self {
        Self::new(vec![
            ColorStop::new(0.0, 0, 0, 0),
            ColorStop::new(0.2, 39, 39, 214),
            ColorStop::new(0.4, 0, 143, 255),
            ColorStop::new(0.6, 255, 255, 68),
            ColorStop::new(0.8, 255, 30, 0),
        ])
    }

    /// Rainbow cycle built from phase-shifted sin² channels.
    pub fn sinusoidal_rainbow() -> Self {
        let stops = (0..20)
            .map(|i| {
                let t = i as f64 / 20.0;
                let a = t * std::f64::consts::PI;
                let channel = |phase: f64| {
                    let s = (a + phase).sin();
                    (s * s * 255.0) as u8
                };
                ColorStop::new(t, channel(0.0), channel(2.0944), channel(4.1888))
            })
            .collect();
        Self::new(stops)
    }

    /// High-contrast banding palette with a hard edge.
    pub fn waves() -> Self {
        Self::new(vec![
            ColorStop::new(0.0, 0, 0, 0),
            ColorStop::new(0.3, 73, 54, 254),
            ColorStop::new(0.47, 242, 22, 116),
            ColorStop::new(0.53, 255, 56, 41),
            ColorStop::new(0.62, 208, 171, 1),
            ColorStop::new(0.62001, 0, 0, 0),
        ])
    }

    /// Apply a global position shift (wrapped into [0,1)) and hue rotation
    /// (degrees), returning the gradient used for lookups.
    pub fn shifted(&self, position_shift: f64, hue_shift_degrees: f64) -> Self {
        let stops = self
            .stops
            .iter()
            .map(|stop| {
                let [r, g, b, a] = stop.color;
                let (r, g, b) = shift_hue(r, g, b, hue_shift_degrees);
                ColorStop {
                    position: wrap(stop.position + position_shift, 0.0, 1.0),
                    color: [r, g, b, a],
                }
            })
            .collect();
        Self::new(stops)
    }

    /// Sample the gradient at `t ∈ [0, 1)`, interpolating linearly between
    /// the bracketing stops and wrapping across 1 → 0.
    pub fn sample(&self, t: f64) -> [u8; 4] {
        let stops = &self.stops;
        if stops.len() == 1 {
            return stops[0].color;
        }

        let t = wrap(t, 0.0, 1.0);

        // Bracketing pair; before the first or after the last stop wraps
        // around through the 1 -> 0 seam.
        let idx = stops.partition_point(|s| s.position <= t);
        let (lo, hi, span_t) = if idx == 0 || idx == stops.len() {
            let last = stops[stops.len() - 1];
            let first = stops[0];
            let span = (1.0 - last.position) + first.position;
            let offset = if t >= last.position {
                t - last.position
            } else {
                (1.0 - last.position) + t
            };
            let f = if span > 0.0 { offset / span } else { 0.0 };
            (last, first, f)
        } else {
            let lo = stops[idx - 1];
            let hi = stops[idx];
            let span = hi.position - lo.position;
            let f = if span > 0.0 {
                (t - lo.position) / span
            } else {
                0.0
            };
            (lo, hi, f)
        };

        let mut color = [0u8; 4];
        for (i, c) in color.iter_mut().enumerate() {
            let a = lo.color[i] as f64;
            let b = hi.color[i] as f64;
            *c = (a + (b - a) * span_t).round().clamp(0.0, 255.0) as u8;
        }
        color
    }
}

impl Default for Gradient {
    fn default() -> Self {
        Self::classic()
    }
}

/// Rotate the hue of an RGB color by `degrees`, preserving saturation and
/// value.
fn shift_hue(r: u8, g: u8, b: u8, degrees: f64) -> (u8, u8, u8) {
    if degrees == 0.0 {
        return (r, g, b);
    }
    let (h, s, v) = rgb_to_hsv(r, g, b);
    let h = wrap(h + degrees, 0.0, 360.0);
    hsv_to_rgb(h, s, v)
}

fn rgb_to_hsv(r: u8, g: u8, b: u8) -> (f64, f64, f64) {
    let r = r as f64 / 255.0;
    let g = g as f64 / 255.0;
    let b = b as f64 / 255.0;
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let h = if delta == 0.0 {
        0.0
    } else if max == r {
        60.0 * (((g - b) / delta).rem_euclid(6.0))
    } else if max == g {
        60.0 * ((b - r) / delta + 2.0)
    } else {
        60.0 * ((r - g) / delta + 4.0)
    };
    let s = if max == 0.0 { 0.0 } else { delta / max };
    (h, s, max)
}

fn hsv_to_rgb(h: f64, s: f64, v: f64) -> (u8, u8, u8) {
    let c = v * s;
    let x = c * (1.0 - ((h / 60.0).rem_euclid(2.0) - 1.0).abs());
    let m = v - c;
    let (r, g, b) = match h {
        h if h < 60.0 => (c, x, 0.0),
        h if h < 120.0 => (x, c, 0.0),
        h if h < 180.0 => (0.0, c, x),
        h if h < 240.0 => (0.0, x, c),
        h if h < 300.0 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    (
        ((r + m) * 255.0).round() as u8,
        ((g + m) * 255.0).round() as u8,
        ((b + m) * 255.0).round() as u8,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_at_stop_returns_stop_color() {
        let g = Gradient::classic();
        assert_eq!(g.sample(0.2), [39, 39, 214, 255]);
        assert_eq!(g.sample(0.6), [255, 255, 68, 255]);
    }

    #[test]
    fn sample_between_stops_interpolates() {
        let g = Gradient::new(vec![
            ColorStop::new(0.0, 0, 0, 0),
            ColorStop::new(0.5, 100, 200, 50),
        ]);
        let c = g.sample(0.25);
        assert_eq!(c, [50, 100, 25, 255]);
    }

    #[test]
    fn sample_wraps_across_seam() {
        let g = Gradient::new(vec![
            ColorStop::new(0.25, 0, 0, 0),
            ColorStop::new(0.75, 200, 200, 200),
        ]);
        // Midway through the wrap span (0.75 -> 1.25), i.e. t = 0.0.
        let c = g.sample(0.0);
        assert_eq!(c, [100, 100, 100, 255]);
    }

    #[test]
    fn sample_out_of_range_wraps() {
        let g = Gradient::classic();
        assert_eq!(g.sample(1.2), g.sample(0.2));
        assert_eq!(g.sample(-0.8), g.sample(0.2));
    }

    #[test]
    fn single_stop_gradient_is_constant() {
        let g = Gradient::new(vec![ColorStop::new(0.3, 10, 20, 30)]);
        assert_eq!(g.sample(0.0), [10, 20, 30, 255]);
        assert_eq!(g.sample(0.9), [10, 20, 30, 255]);
    }

    #[test]
    fn position_shift_moves_stops_and_wraps() {
        let g = Gradient::classic();
        let shifted = g.shifted(0.5, 0.0);
        // The 0.8 stop wraps to 0.3.
        assert!(shifted
            .stops()
            .iter()
            .any(|s| (s.position - 0.3).abs() < 1e-12 && s.color == [255, 30, 0, 255]));
        // Stops stay sorted after shifting.
        let positions: Vec<f64> = shifted.stops().iter().map(|s| s.position).collect();
        let mut sorted = positions.clone();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(positions, sorted);
    }

    #[test]
    fn hue_shift_rotates_channels() {
        // Pure red rotated 120° becomes pure green.
        assert_eq!(shift_hue(255, 0, 0, 120.0), (0, 255, 0));
        // 360° is identity.
        assert_eq!(shift_hue(17, 130, 201, 360.0), (17, 130, 201));
    }

    #[test]
    fn hsv_roundtrip() {
        for (r, g, b) in [(255, 0, 0), (12, 200, 100), (0, 0, 0), (255, 255, 255)] {
            let (h, s, v) = rgb_to_hsv(r, g, b);
            assert_eq!(hsv_to_rgb(h, s, v), (r, g, b));
        }
    }

    #[test]
    fn serialization_roundtrip() {
        let g = Gradient::waves();
        let json = serde_json::to_string(&g).unwrap();
        let restored: Gradient = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, g);
    }

    #[test]
    fn deserializing_empty_stop_list_is_rejected() {
        let result: Result<Gradient, _> = serde_json::from_str(r#"{"stops":[]}"#);
        assert!(result.is_err());
    }
}
