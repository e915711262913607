//! Closed-form band shape approximations
//!
//! Used for any band the oracle cannot answer. These are visual shapes in the
//! log-frequency domain, not filter designs.

use ce_core::BandKind;

/// Octaves between `freq` and `center`, positive above the center
#[inline]
fn octaves(freq: f64, center: f64) -> f64 {
    (freq.max(f64::MIN_POSITIVE) / center.max(f64::MIN_POSITIVE)).log2()
}

/// Bell-shaped fall-off used by peaking and notch bands
#[inline]
fn bell(depth: f64, q: f64, oct: f64) -> f64 {
    depth / (1.0 + 4.0 * q * q * oct * oct)
}

/// Approximate magnitude (dB) of one band at `freq`
pub fn band_db(kind: BandKind, center: f64, q: f64, gain_db: f64, freq: f64) -> f64 {
    let oct = octaves(freq, center);
    match kind {
        BandKind::Peaking => bell(gain_db, q, oct),
        BandKind::Notch => bell(-24.0, q, oct),
        BandKind::Bandpass => -12.0 * q * oct.abs(),
        BandKind::LowShelf => {
            if oct < 0.0 {
                gain_db
            } else {
                gain_db / (1.0 + (q * oct).exp2())
            }
        }
        BandKind::HighShelf => {
            if oct > 0.0 {
                gain_db
            } else {
                gain_db / (1.0 + (-q * oct).exp2())
            }
        }
        // 12 dB/oct slopes past the cutoff
        BandKind::LowPass => {
            if oct > 0.0 {
                -12.0 * q * oct
            } else {
                0.0
            }
        }
        BandKind::HighPass => {
            if oct < 0.0 {
                12.0 * q * oct
            } else {
                0.0
            }
        }
        BandKind::Point => 0.0,
    }
}

/// Approximate magnitudes (dB) of one band over a set of frequencies
pub fn band_response(kind: BandKind, center: f64, q: f64, gain_db: f64, freqs: &[f64]) -> Vec<f64> {
    freqs
        .iter()
        .map(|&f| band_db(kind, center, q, gain_db, f))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_peaking_shape() {
        assert_relative_eq!(band_db(BandKind::Peaking, 1000.0, 1.0, 6.0, 1000.0), 6.0);
        // One octave away at Q 1: 6 / 5
        assert_relative_eq!(band_db(BandKind::Peaking, 1000.0, 1.0, 6.0, 2000.0), 1.2, epsilon = 1e-12);
        assert_relative_eq!(band_db(BandKind::Peaking, 1000.0, 1.0, 6.0, 500.0), 1.2, epsilon = 1e-12);
        assert!(band_db(BandKind::Peaking, 1000.0, 1.0, 6.0, 20.0).abs() < 0.25);
    }

    #[test]
    fn test_shelves_mirror() {
        assert_eq!(band_db(BandKind::LowShelf, 200.0, 1.0, 4.0, 50.0), 4.0);
        assert_relative_eq!(band_db(BandKind::LowShelf, 200.0, 1.0, 4.0, 400.0), 4.0 / 3.0, epsilon = 1e-12);
        assert_eq!(band_db(BandKind::HighShelf, 4000.0, 1.0, -3.0, 10000.0), -3.0);
        assert_relative_eq!(band_db(BandKind::HighShelf, 4000.0, 1.0, -3.0, 2000.0), -1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_pass_slopes_are_one_sided() {
        assert_eq!(band_db(BandKind::LowPass, 1000.0, 1.0, 0.0, 500.0), 0.0);
        assert_relative_eq!(band_db(BandKind::LowPass, 1000.0, 1.0, 0.0, 4000.0), -24.0, epsilon = 1e-12);
        assert_eq!(band_db(BandKind::HighPass, 1000.0, 1.0, 0.0, 2000.0), 0.0);
        assert_relative_eq!(band_db(BandKind::HighPass, 1000.0, 0.5, 0.0, 250.0), -12.0, epsilon = 1e-12);
    }

    #[test]
    fn test_notch_and_bandpass_ignore_gain() {
        assert_eq!(band_db(BandKind::Notch, 1000.0, 1.0, 12.0, 1000.0), -24.0);
        assert_eq!(band_db(BandKind::Bandpass, 1000.0, 1.0, 12.0, 1000.0), 0.0);
        assert_relative_eq!(band_db(BandKind::Bandpass, 1000.0, 1.0, 12.0, 2000.0), -12.0, epsilon = 1e-12);
    }

    #[test]
    fn test_point_is_flat() {
        let response = band_response(BandKind::Point, 1000.0, 1.0, 9.0, &[20.0, 1000.0, 20000.0]);
        assert_eq!(response, vec![0.0, 0.0, 0.0]);
    }
}
