//! Piecewise interpolation across control points
//!
//! Points are sorted by frequency and joined by straight segments in
//! log-frequency / linear-dB space. Outside the outermost points the curve
//! stays flat. The parametric curve variant warps the segment parameter with
//! an exponent and may add a resonance bump on top.

use ce_core::{Band, Resonance};

/// Spans narrower than this (in log2 units) are treated as flat
const MIN_SPAN: f64 = 1e-12;

/// Frequency/gain pair the interpolator passes through
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlPoint {
    pub frequency: f64,
    pub gain_db: f64,
}

impl ControlPoint {
    pub const fn new(frequency: f64, gain_db: f64) -> Self {
        Self { frequency, gain_db }
    }
}

impl From<&Band> for ControlPoint {
    fn from(band: &Band) -> Self {
        Self::new(band.frequency(), band.gain_db())
    }
}

/// Sorted control points with an optional shape exponent
#[derive(Debug, Clone)]
pub struct Interpolator {
    points: Vec<ControlPoint>,
    exponent: f64,
}

impl Interpolator {
    pub fn new(points: impl IntoIterator<Item = ControlPoint>) -> Self {
        let mut points: Vec<ControlPoint> = points.into_iter().collect();
        points.sort_by(|a, b| a.frequency.total_cmp(&b.frequency));
        Self {
            points,
            exponent: 1.0,
        }
    }

    /// Warp each segment parameter `t` to `t^exponent`
    pub fn with_exponent(mut self, exponent: f64) -> Self {
        self.exponent = if exponent.is_finite() && exponent > 0.0 {
            exponent
        } else {
            1.0
        };
        self
    }

    pub fn points(&self) -> &[ControlPoint] {
        &self.points
    }

    /// Interpolated gain (dB) at `freq`
    pub fn value_at(&self, freq: f64) -> f64 {
        let (first, last) = match (self.points.first(), self.points.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return 0.0,
        };
        if freq <= first.frequency {
            return first.gain_db;
        }
        if freq >= last.frequency {
            return last.gain_db;
        }

        let upper = self.points.partition_point(|p| p.frequency <= freq);
        let lo = self.points[upper - 1];
        let hi = self.points[upper];

        let span = (hi.frequency / lo.frequency).log2();
        if span.abs() < MIN_SPAN {
            return lo.gain_db;
        }

        let t = ((freq / lo.frequency).log2() / span).clamp(0.0, 1.0);
        let t = if self.exponent == 1.0 { t } else { t.powf(self.exponent) };
        lo.gain_db + t * (hi.gain_db - lo.gain_db)
    }

    pub fn evaluate(&self, freqs: &[f64]) -> Vec<f64> {
        freqs.iter().map(|&f| self.value_at(f)).collect()
    }
}

/// Gaussian bump in log-frequency: `gain * exp(-(log2(f / fr) * q)^2)`
pub fn resonance_db(resonance: &Resonance, freq: f64) -> f64 {
    let oct = (freq.max(f64::MIN_POSITIVE) / resonance.frequency).log2();
    let x = oct * resonance.q;
    resonance.gain_db * (-x * x).exp()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_empty_and_single() {
        assert_eq!(Interpolator::new(Vec::<ControlPoint>::new()).value_at(1000.0), 0.0);
        let single = Interpolator::new([ControlPoint::new(500.0, 4.0)]);
        assert_eq!(single.value_at(20.0), 4.0);
        assert_eq!(single.value_at(20000.0), 4.0);
    }

    #[test]
    fn test_unsorted_input_is_sorted() {
        let interp = Interpolator::new([
            ControlPoint::new(4000.0, -6.0),
            ControlPoint::new(250.0, 6.0),
            ControlPoint::new(1000.0, 0.0),
        ]);
        let freqs: Vec<f64> = interp.points().iter().map(|p| p.frequency).collect();
        assert_eq!(freqs, vec![250.0, 1000.0, 4000.0]);
        // Halfway between 250 and 1000 in log space
        assert_relative_eq!(interp.value_at(500.0), 3.0, epsilon = 1e-12);
        assert_relative_eq!(interp.value_at(2000.0), -3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_flat_extrapolation() {
        let interp = Interpolator::new([ControlPoint::new(100.0, 2.0), ControlPoint::new(1000.0, -2.0)]);
        assert_eq!(interp.value_at(20.0), 2.0);
        assert_eq!(interp.value_at(19000.0), -2.0);
    }

    #[test]
    fn test_duplicate_frequencies_are_flat() {
        let interp = Interpolator::new([
            ControlPoint::new(1000.0, 3.0),
            ControlPoint::new(1000.0, -3.0),
            ControlPoint::new(2000.0, 0.0),
        ]);
        assert_eq!(interp.value_at(20.0), 3.0);
        assert_eq!(interp.value_at(999.0), 3.0);
        assert_eq!(interp.value_at(1000.0), -3.0);
        assert_eq!(interp.value_at(2000.0), 0.0);

        // Span too narrow to divide by: flat at the lower point
        let narrow = Interpolator::new([
            ControlPoint::new(1000.0, 3.0),
            ControlPoint::new(1000.0 + 1e-10, -3.0),
        ]);
        assert_eq!(narrow.value_at(1000.0 + 5e-11), 3.0);
    }

    #[test]
    fn test_exponent_warps_segments() {
        let points = [ControlPoint::new(100.0, 0.0), ControlPoint::new(400.0, 12.0)];
        let linear = Interpolator::new(points);
        let warped = Interpolator::new(points).with_exponent(2.0);
        assert_relative_eq!(linear.value_at(200.0), 6.0, epsilon = 1e-12);
        assert_relative_eq!(warped.value_at(200.0), 3.0, epsilon = 1e-12);
        // Endpoints are unaffected
        assert_eq!(warped.value_at(100.0), 0.0);
        assert_eq!(warped.value_at(400.0), 12.0);
    }

    #[test]
    fn test_resonance_bump() {
        let res = Resonance::new(2000.0, 6.0, 1.0);
        assert_relative_eq!(resonance_db(&res, 2000.0), 6.0);
        assert_relative_eq!(resonance_db(&res, 4000.0), 6.0 * (-1.0_f64).exp(), epsilon = 1e-12);
        assert!(resonance_db(&res, 20.0).abs() < 1e-6);
    }
}
