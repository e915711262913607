//! Biquad coefficients and magnitude evaluation
//!
//! RBJ cookbook designs, normalized by a0. The response is evaluated directly
//! on the unit circle, which is what the reference oracle exposes.

use ce_core::BandKind;
use num_complex::Complex64;
use std::f64::consts::PI;

/// Floor applied to magnitudes before converting to dB
const MAGNITUDE_FLOOR: f64 = 1e-10;

/// Biquad coefficients
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BiquadCoeffs {
    pub b0: f64,
    pub b1: f64,
    pub b2: f64,
    pub a1: f64,
    pub a2: f64,
}

/// Shared trig terms of the cookbook formulas
struct Prewarp {
    cos_omega: f64,
    alpha: f64,
}

impl Prewarp {
    fn new(freq: f64, q: f64, sample_rate: f64) -> Self {
        let omega = 2.0 * PI * freq / sample_rate;
        Self {
            cos_omega: omega.cos(),
            alpha: omega.sin() / (2.0 * q),
        }
    }
}

impl BiquadCoeffs {
    fn normalized(b0: f64, b1: f64, b2: f64, a0: f64, a1: f64, a2: f64) -> Self {
        Self {
            b0: b0 / a0,
            b1: b1 / a0,
            b2: b2 / a0,
            a1: a1 / a0,
            a2: a2 / a0,
        }
    }

    /// Coefficients for a band kind, `None` for kinds without a filter shape
    pub fn for_kind(kind: BandKind, freq: f64, q: f64, gain_db: f64, sample_rate: f64) -> Option<Self> {
        let coeffs = match kind {
            BandKind::Peaking => Self::peaking(freq, q, gain_db, sample_rate),
            BandKind::LowShelf => Self::low_shelf(freq, q, gain_db, sample_rate),
            BandKind::HighShelf => Self::high_shelf(freq, q, gain_db, sample_rate),
            BandKind::Notch => Self::notch(freq, q, sample_rate),
            BandKind::Bandpass => Self::bandpass(freq, q, sample_rate),
            BandKind::LowPass => Self::lowpass(freq, q, sample_rate),
            BandKind::HighPass => Self::highpass(freq, q, sample_rate),
            BandKind::Point => return None,
        };
        Some(coeffs)
    }

    /// Calculate lowpass filter coefficients
    pub fn lowpass(freq: f64, q: f64, sample_rate: f64) -> Self {
        let Prewarp { cos_omega, alpha } = Prewarp::new(freq, q, sample_rate);
        Self::normalized(
            (1.0 - cos_omega) / 2.0,
            1.0 - cos_omega,
            (1.0 - cos_omega) / 2.0,
            1.0 + alpha,
            -2.0 * cos_omega,
            1.0 - alpha,
        )
    }

    /// Calculate highpass filter coefficients
    pub fn highpass(freq: f64, q: f64, sample_rate: f64) -> Self {
        let Prewarp { cos_omega, alpha } = Prewarp::new(freq, q, sample_rate);
        Self::normalized(
            (1.0 + cos_omega) / 2.0,
            -(1.0 + cos_omega),
            (1.0 + cos_omega) / 2.0,
            1.0 + alpha,
            -2.0 * cos_omega,
            1.0 - alpha,
        )
    }

    /// Calculate bandpass filter coefficients (constant 0 dB peak gain)
    pub fn bandpass(freq: f64, q: f64, sample_rate: f64) -> Self {
        let Prewarp { cos_omega, alpha } = Prewarp::new(freq, q, sample_rate);
        Self::normalized(alpha, 0.0, -alpha, 1.0 + alpha, -2.0 * cos_omega, 1.0 - alpha)
    }

    /// Calculate notch filter coefficients
    pub fn notch(freq: f64, q: f64, sample_rate: f64) -> Self {
        let Prewarp { cos_omega, alpha } = Prewarp::new(freq, q, sample_rate);
        Self::normalized(
            1.0,
            -2.0 * cos_omega,
            1.0,
            1.0 + alpha,
            -2.0 * cos_omega,
            1.0 - alpha,
        )
    }

    /// Calculate peaking EQ filter coefficients
    pub fn peaking(freq: f64, q: f64, gain_db: f64, sample_rate: f64) -> Self {
        let a = 10.0_f64.powf(gain_db / 40.0);
        let Prewarp { cos_omega, alpha } = Prewarp::new(freq, q, sample_rate);
        Self::normalized(
            1.0 + alpha * a,
            -2.0 * cos_omega,
            1.0 - alpha * a,
            1.0 + alpha / a,
            -2.0 * cos_omega,
            1.0 - alpha / a,
        )
    }

    /// Calculate low shelf filter coefficients
    pub fn low_shelf(freq: f64, q: f64, gain_db: f64, sample_rate: f64) -> Self {
        let a = 10.0_f64.powf(gain_db / 40.0);
        let Prewarp { cos_omega, alpha } = Prewarp::new(freq, q, sample_rate);
        let two_sqrt_a_alpha = 2.0 * a.sqrt() * alpha;

        Self::normalized(
            a * ((a + 1.0) - (a - 1.0) * cos_omega + two_sqrt_a_alpha),
            2.0 * a * ((a - 1.0) - (a + 1.0) * cos_omega),
            a * ((a + 1.0) - (a - 1.0) * cos_omega - two_sqrt_a_alpha),
            (a + 1.0) + (a - 1.0) * cos_omega + two_sqrt_a_alpha,
            -2.0 * ((a - 1.0) + (a + 1.0) * cos_omega),
            (a + 1.0) + (a - 1.0) * cos_omega - two_sqrt_a_alpha,
        )
    }

    /// Calculate high shelf filter coefficients
    pub fn high_shelf(freq: f64, q: f64, gain_db: f64, sample_rate: f64) -> Self {
        let a = 10.0_f64.powf(gain_db / 40.0);
        let Prewarp { cos_omega, alpha } = Prewarp::new(freq, q, sample_rate);
        let two_sqrt_a_alpha = 2.0 * a.sqrt() * alpha;

        Self::normalized(
            a * ((a + 1.0) + (a - 1.0) * cos_omega + two_sqrt_a_alpha),
            -2.0 * a * ((a - 1.0) + (a + 1.0) * cos_omega),
            a * ((a + 1.0) + (a - 1.0) * cos_omega - two_sqrt_a_alpha),
            (a + 1.0) - (a - 1.0) * cos_omega + two_sqrt_a_alpha,
            2.0 * ((a - 1.0) - (a + 1.0) * cos_omega),
            (a + 1.0) - (a - 1.0) * cos_omega - two_sqrt_a_alpha,
        )
    }

    /// Bypass (unity gain, no filtering)
    pub fn bypass() -> Self {
        Self {
            b0: 1.0,
            b1: 0.0,
            b2: 0.0,
            a1: 0.0,
            a2: 0.0,
        }
    }

    /// Magnitude of H(e^jω) at `freq` in dB
    pub fn magnitude_db(&self, freq: f64, sample_rate: f64) -> f64 {
        let omega = 2.0 * PI * freq / sample_rate;
        let z1 = Complex64::from_polar(1.0, -omega);
        let z2 = z1 * z1;

        let num = self.b0 + z1 * self.b1 + z2 * self.b2;
        let den = 1.0 + z1 * self.a1 + z2 * self.a2;

        let magnitude = num.norm() / den.norm().max(MAGNITUDE_FLOOR);
        20.0 * magnitude.max(MAGNITUDE_FLOOR).log10()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const SR: f64 = 48000.0;

    #[test]
    fn test_bypass_is_flat() {
        let coeffs = BiquadCoeffs::bypass();
        for freq in [20.0, 1000.0, 20000.0] {
            assert_abs_diff_eq!(coeffs.magnitude_db(freq, SR), 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_peaking_hits_gain_at_center() {
        for gain in [-12.0, -3.0, 6.0, 24.0] {
            let coeffs = BiquadCoeffs::peaking(1000.0, 1.0, gain, SR);
            assert_abs_diff_eq!(coeffs.magnitude_db(1000.0, SR), gain, epsilon = 1e-9);
            assert!(coeffs.magnitude_db(20.0, SR).abs() < 0.5);
        }
    }

    #[test]
    fn test_shelves_reach_gain_on_their_side() {
        let low = BiquadCoeffs::low_shelf(200.0, 0.707, 9.0, SR);
        assert_abs_diff_eq!(low.magnitude_db(20.0, SR), 9.0, epsilon = 0.5);
        assert!(low.magnitude_db(10000.0, SR).abs() < 0.1);

        let high = BiquadCoeffs::high_shelf(4000.0, 0.707, -6.0, SR);
        assert_abs_diff_eq!(high.magnitude_db(20000.0, SR), -6.0, epsilon = 0.5);
        assert!(high.magnitude_db(50.0, SR).abs() < 0.1);
    }

    #[test]
    fn test_pass_filters() {
        let lp = BiquadCoeffs::lowpass(1000.0, 0.707, SR);
        assert_abs_diff_eq!(lp.magnitude_db(20.0, SR), 0.0, epsilon = 0.01);
        assert!(lp.magnitude_db(8000.0, SR) < -30.0);

        let hp = BiquadCoeffs::highpass(1000.0, 0.707, SR);
        assert!(hp.magnitude_db(100.0, SR) < -30.0);
    }

    #[test]
    fn test_notch_cuts_center() {
        let notch = BiquadCoeffs::notch(1000.0, 2.0, SR);
        assert!(notch.magnitude_db(1000.0, SR) < -60.0);
        assert!(notch.magnitude_db(100.0, SR).abs() < 0.1);
    }

    #[test]
    fn test_point_has_no_filter() {
        assert!(BiquadCoeffs::for_kind(BandKind::Point, 1000.0, 1.0, 3.0, SR).is_none());
        assert!(BiquadCoeffs::for_kind(BandKind::Notch, 1000.0, 1.0, 3.0, SR).is_some());
    }
}
