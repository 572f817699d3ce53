//! Fade curve shapes for envelope interpolation
//!
//! A curve maps normalized progress through a segment (0.0 at the first
//! point, 1.0 at the second) onto normalized gain progress. Envelopes use
//! this to shape the volume between two adjacent points.

use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, PI};
use std::str::FromStr;

use crate::Error;

/// Fade curve types
///
/// - Linear: constant rate of change
/// - Exponential: slow start, fast finish (natural-sounding fade-in)
/// - Logarithmic: fast start, slow finish (natural-sounding fade-out)
/// - SCurve: smooth acceleration and deceleration
/// - EqualPower: constant perceived loudness across a crossfade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FadeCurve {
    /// v(t) = t
    #[default]
    Linear,

    /// v(t) = t²
    Exponential,

    /// v(t) = √t
    Logarithmic,

    /// v(t) = 0.5 × (1 - cos(π × t))
    SCurve,

    /// v(t) = sin(t × π/2)
    EqualPower,
}

impl FadeCurve {
    /// Rising shape at normalized position `t` (clamped to 0..1)
    pub fn fade_in(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);

        match self {
            FadeCurve::Linear => t,
            FadeCurve::Exponential => t * t,
            FadeCurve::Logarithmic => t.sqrt(),
            FadeCurve::SCurve => 0.5 * (1.0 - (PI * t).cos()),
            FadeCurve::EqualPower => (t * FRAC_PI_2).sin(),
        }
    }

    /// Falling shape at normalized position `t` (1.0 at start, 0.0 at end)
    pub fn fade_out(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);

        match self {
            FadeCurve::Linear => 1.0 - t,
            // Mirror images of the fade-in shapes
            FadeCurve::Exponential | FadeCurve::Logarithmic => {
                let inv = 1.0 - t;
                inv * inv
            }
            FadeCurve::SCurve => 0.5 * (1.0 + (PI * t).cos()),
            FadeCurve::EqualPower => (t * FRAC_PI_2).cos(),
        }
    }

    /// Interpolate between two gain values at normalized position `t`
    ///
    /// Rising segments use the fade-in shape, falling segments the
    /// fade-out shape, so a curve reads the same in both directions.
    pub fn interpolate(&self, from: f64, to: f64, t: f64) -> f64 {
        if to >= from {
            from + (to - from) * self.fade_in(t)
        } else {
            to + (from - to) * self.fade_out(t)
        }
    }

    /// Canonical lowercase name (same as the serialized form)
    pub fn as_str(&self) -> &'static str {
        match self {
            FadeCurve::Linear => "linear",
            FadeCurve::Exponential => "exponential",
            FadeCurve::Logarithmic => "logarithmic",
            FadeCurve::SCurve => "s_curve",
            FadeCurve::EqualPower => "equal_power",
        }
    }

    /// All curve variants
    pub fn all_variants() -> &'static [FadeCurve] {
        &[
            FadeCurve::Linear,
            FadeCurve::Exponential,
            FadeCurve::Logarithmic,
            FadeCurve::SCurve,
            FadeCurve::EqualPower,
        ]
    }
}

impl FromStr for FadeCurve {
    type Err = Error;

    /// Accepts the canonical names plus `cosine`, `scurve`, `s-curve`
    /// and `equalpower` aliases (case-insensitive)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "linear" => Ok(FadeCurve::Linear),
            "exponential" => Ok(FadeCurve::Exponential),
            "logarithmic" => Ok(FadeCurve::Logarithmic),
            "cosine" | "scurve" | "s-curve" | "s_curve" => Ok(FadeCurve::SCurve),
            "equal_power" | "equalpower" => Ok(FadeCurve::EqualPower),
            other => Err(Error::InvalidInput(format!("unknown fade curve '{}'", other))),
        }
    }
}

impl std::fmt::Display for FadeCurve {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fade_in_bounds() {
        for curve in FadeCurve::all_variants() {
            assert!(curve.fade_in(0.0).abs() < 1e-9, "{:?} fade-in at 0", curve);
            assert!((curve.fade_in(1.0) - 1.0).abs() < 1e-9, "{:?} fade-in at 1", curve);
        }
    }

    #[test]
    fn test_fade_out_bounds() {
        for curve in FadeCurve::all_variants() {
            assert!((curve.fade_out(0.0) - 1.0).abs() < 1e-9, "{:?} fade-out at 0", curve);
            assert!(curve.fade_out(1.0).abs() < 1e-9, "{:?} fade-out at 1", curve);
        }
    }

    #[test]
    fn test_fade_in_monotonic() {
        for curve in FadeCurve::all_variants() {
            let mut prev = curve.fade_in(0.0);
            for i in 1..=100 {
                let v = curve.fade_in(i as f64 / 100.0);
                assert!(v >= prev - 1e-12, "{:?} not monotonic at step {}", curve, i);
                prev = v;
            }
        }
    }

    #[test]
    fn test_out_of_range_positions_are_clamped() {
        assert_eq!(FadeCurve::Linear.fade_in(-1.0), 0.0);
        assert_eq!(FadeCurve::Linear.fade_in(2.0), 1.0);
        assert_eq!(FadeCurve::Linear.fade_out(2.0), 0.0);
    }

    #[test]
    fn test_interpolate_both_directions() {
        let linear = FadeCurve::Linear;
        assert!((linear.interpolate(0.0, 1.0, 0.25) - 0.25).abs() < 1e-12);
        assert!((linear.interpolate(1.0, 0.0, 0.25) - 0.75).abs() < 1e-12);
        assert!((linear.interpolate(0.4, 0.4, 0.5) - 0.4).abs() < 1e-12);

        // Endpoints are exact for every curve
        for curve in FadeCurve::all_variants() {
            assert!((curve.interpolate(0.2, 0.9, 0.0) - 0.2).abs() < 1e-9);
            assert!((curve.interpolate(0.2, 0.9, 1.0) - 0.9).abs() < 1e-9);
            assert!((curve.interpolate(0.9, 0.2, 1.0) - 0.2).abs() < 1e-9);
        }
    }

    #[test]
    fn test_parse_aliases() {
        assert_eq!("cosine".parse::<FadeCurve>().unwrap(), FadeCurve::SCurve);
        assert_eq!("S-Curve".parse::<FadeCurve>().unwrap(), FadeCurve::SCurve);
        assert_eq!("EqualPower".parse::<FadeCurve>().unwrap(), FadeCurve::EqualPower);
        assert!("bogus".parse::<FadeCurve>().is_err());

        for curve in FadeCurve::all_variants() {
            assert_eq!(curve.as_str().parse::<FadeCurve>().unwrap(), *curve);
        }
    }
}
