//! Shape controls of the parametric multi-point curve

use serde::{Deserialize, Serialize};

use crate::{clamp_frequency, clamp_gain, clamp_q};

/// Gaussian-like bump added on top of the interpolated curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Resonance {
    pub frequency: f64,
    #[serde(rename = "gain")]
    pub gain_db: f64,
    pub q: f64,
}

impl Resonance {
    pub fn new(frequency: f64, gain_db: f64, q: f64) -> Self {
        Self {
            frequency: clamp_frequency(frequency),
            gain_db: clamp_gain(gain_db),
            q: clamp_q(q),
        }
    }
}

/// Curve warp and resonance settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurveSettings {
    /// 0.0 = most concave, 0.5 = straight segments, 1.0 = most convex
    pub shape: f64,
    pub resonance: Option<Resonance>,
}

impl CurveSettings {
    pub const LINEAR_SHAPE: f64 = 0.5;

    pub fn new(shape: f64, resonance: Option<Resonance>) -> Self {
        Self {
            shape: if shape.is_nan() {
                Self::LINEAR_SHAPE
            } else {
                shape.clamp(0.0, 1.0)
            },
            resonance: resonance.map(|r| Resonance::new(r.frequency, r.gain_db, r.q)),
        }
    }

    /// Exponent applied to the log-domain interpolation parameter
    ///
    /// shape < 0.5 maps to 1..3, shape > 0.5 to 1..1/3.
    pub fn shape_exponent(&self) -> f64 {
        let shape = self.shape.clamp(0.0, 1.0);
        if shape < 0.5 {
            1.0 + 2.0 * (0.5 - shape) / 0.5
        } else if shape > 0.5 {
            1.0 / (1.0 + 2.0 * (shape - 0.5) / 0.5)
        } else {
            1.0
        }
    }
}

impl Default for CurveSettings {
    fn default() -> Self {
        Self {
            shape: Self::LINEAR_SHAPE,
            resonance: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_shape_exponent_range() {
        assert_relative_eq!(CurveSettings::new(0.0, None).shape_exponent(), 3.0);
        assert_relative_eq!(CurveSettings::new(0.25, None).shape_exponent(), 2.0);
        assert_relative_eq!(CurveSettings::new(0.5, None).shape_exponent(), 1.0);
        assert_relative_eq!(CurveSettings::new(1.0, None).shape_exponent(), 1.0 / 3.0);
    }

    #[test]
    fn test_new_clamps() {
        let settings = CurveSettings::new(4.0, Some(Resonance::new(5.0, 99.0, 0.0)));
        assert_eq!(settings.shape, 1.0);
        let res = settings.resonance.unwrap();
        assert_eq!(res.frequency, 20.0);
        assert_eq!(res.gain_db, 24.0);
        assert_eq!(res.q, 0.1);
    }
}
