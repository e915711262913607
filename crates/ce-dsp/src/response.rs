//! Frequency response synthesis
//!
//! Band mode sums per-band dB magnitudes over a fixed log-spaced grid. Point
//! modes interpolate between control points instead. Per-band magnitudes come
//! from the installed oracle when it answers and from the analytic shapes in
//! [`crate::analytic`] otherwise.

use std::sync::Arc;

use ce_core::{Band, BandKind, CurveSettings, EqVariant, FrequencyRange};

use crate::analytic;
use crate::interpolate::{ControlPoint, Interpolator, resonance_db};
use crate::oracle::{FilterResponseOracle, OracleError, validate_response};

/// Measured peaks smaller than this are not rescaled
const NORMALIZE_EPSILON: f64 = 1e-9;

/// One plotted point of the response curve
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResponseSample {
    pub frequency: f64,
    /// Magnitude in dB
    pub magnitude: f64,
}

/// Immutable, cheaply shared response snapshot
pub type ResponseCurve = Arc<[ResponseSample]>;

/// `points` log-spaced frequencies covering `range`, endpoints included
pub fn log_grid(range: FrequencyRange, points: usize) -> Vec<f64> {
    match points {
        0 => Vec::new(),
        1 => vec![range.min],
        _ => {
            let log_min = range.min.ln();
            let log_max = range.max.ln();
            let last = (points - 1) as f64;
            (0..points)
                .map(|i| {
                    if i == points - 1 {
                        range.max
                    } else {
                        (log_min + (i as f64 / last) * (log_max - log_min)).exp()
                    }
                })
                .collect()
        }
    }
}

/// Turns an entity list into a magnitude curve
pub struct ResponseModel {
    grid: Vec<f64>,
    oracle: Option<Box<dyn FilterResponseOracle>>,
}

impl ResponseModel {
    /// Model with a `points`-sample grid and no oracle
    pub fn new(range: FrequencyRange, points: usize) -> Self {
        Self {
            grid: log_grid(range, points),
            oracle: None,
        }
    }

    /// Install the exact-response oracle
    pub fn with_oracle(mut self, oracle: Box<dyn FilterResponseOracle>) -> Self {
        self.oracle = Some(oracle);
        self
    }

    pub fn set_oracle(&mut self, oracle: Option<Box<dyn FilterResponseOracle>>) {
        self.oracle = oracle;
    }

    pub fn has_oracle(&self) -> bool {
        self.oracle.is_some()
    }

    pub fn grid(&self) -> &[f64] {
        &self.grid
    }

    // ========================================================================
    // BAND COMBINATION
    // ========================================================================

    /// Magnitude (dB) of one band at each query frequency
    pub fn evaluate_band(&self, band: &Band, freqs: &[f64]) -> Vec<f64> {
        if band.kind() == BandKind::Point {
            return vec![0.0; freqs.len()];
        }

        if let Some(oracle) = &self.oracle {
            match self.oracle_response(oracle.as_ref(), band, freqs) {
                Ok(response) => return response,
                Err(e) => {
                    log::debug!("Oracle failed for band {}: {}, using analytic shape", band.id(), e);
                }
            }
        }

        analytic::band_response(band.kind(), band.frequency(), band.q(), band.gain_db(), freqs)
    }

    fn oracle_response(
        &self,
        oracle: &dyn FilterResponseOracle,
        band: &Band,
        freqs: &[f64],
    ) -> Result<Vec<f64>, OracleError> {
        let mut response = oracle.evaluate(band.kind(), band.frequency(), band.q(), band.gain_db(), freqs)?;
        validate_response(freqs, &response)?;

        if band.kind() == BandKind::Peaking {
            let measured = self.measured_peak(oracle, band, freqs, &response)?;
            if let Some(measured) = measured.filter(|m| m.abs() > NORMALIZE_EPSILON) {
                let scale = band.gain_db() / measured;
                for value in &mut response {
                    *value *= scale;
                }
            }
        }

        Ok(response)
    }

    /// Oracle value at the grid frequency closest (in log distance) to the band center
    ///
    /// `None` when the center lies more than half a grid step outside the grid,
    /// where the nearest sample only sees the band's skirt.
    fn measured_peak(
        &self,
        oracle: &dyn FilterResponseOracle,
        band: &Band,
        freqs: &[f64],
        response: &[f64],
    ) -> Result<Option<f64>, OracleError> {
        let Some(reference) = self.reference_frequency(band.frequency()) else {
            return Ok(None);
        };
        if let Some(i) = freqs.iter().position(|&f| f == reference) {
            return Ok(Some(response[i]));
        }

        let probe = [reference];
        let value = oracle.evaluate(band.kind(), band.frequency(), band.q(), band.gain_db(), &probe)?;
        validate_response(&probe, &value)?;
        Ok(Some(value[0]))
    }

    /// Nearest grid frequency within half a log step of `freq`
    fn reference_frequency(&self, freq: f64) -> Option<f64> {
        let (&first, &last) = (self.grid.first()?, self.grid.last()?);
        let target = freq.ln();
        let nearest = self
            .grid
            .iter()
            .copied()
            .min_by(|a, b| (a.ln() - target).abs().total_cmp(&(b.ln() - target).abs()))?;

        let steps = (self.grid.len() - 1).max(1) as f64;
        let half_step = (last.ln() - first.ln()) / steps / 2.0;
        ((nearest.ln() - target).abs() <= half_step * (1.0 + 1e-9)).then_some(nearest)
    }

    /// Per-sample dB sum of every band
    pub fn combine(&self, bands: &[Band], freqs: &[f64]) -> Vec<f64> {
        let mut total = vec![0.0; freqs.len()];
        for band in bands {
            for (sum, value) in total.iter_mut().zip(self.evaluate_band(band, freqs)) {
                *sum += value;
            }
        }
        total
    }

    /// Combined band response at one frequency, evaluated exactly
    pub fn response_at(&self, bands: &[Band], freq: f64) -> f64 {
        self.combine(bands, &[freq])[0]
    }

    /// One band's response over the grid
    pub fn isolated_response(&self, band: &Band) -> Vec<f64> {
        self.evaluate_band(band, &self.grid)
    }

    // ========================================================================
    // VARIANT DISPATCH
    // ========================================================================

    /// Curve value (dB) at each query frequency for a variant
    ///
    /// `anchor` only participates for [`EqVariant::Points`]; `curve` only for
    /// [`EqVariant::Curve`].
    pub fn evaluate(
        &self,
        variant: EqVariant,
        bands: &[Band],
        anchor: Option<ControlPoint>,
        curve: &CurveSettings,
        freqs: &[f64],
    ) -> Vec<f64> {
        match variant {
            EqVariant::Parametric => self.combine(bands, freqs),
            EqVariant::Points => {
                let points = bands.iter().map(ControlPoint::from).chain(anchor);
                Interpolator::new(points).evaluate(freqs)
            }
            EqVariant::Curve => {
                let interp = Interpolator::new(bands.iter().map(ControlPoint::from))
                    .with_exponent(curve.shape_exponent());
                freqs
                    .iter()
                    .map(|&f| {
                        let bump = curve.resonance.as_ref().map_or(0.0, |r| resonance_db(r, f));
                        interp.value_at(f) + bump
                    })
                    .collect()
            }
        }
    }

    /// Full plotted curve over the grid
    pub fn compute(
        &self,
        variant: EqVariant,
        bands: &[Band],
        anchor: Option<ControlPoint>,
        curve: &CurveSettings,
    ) -> ResponseCurve {
        let values = self.evaluate(variant, bands, anchor, curve, &self.grid);
        self.grid
            .iter()
            .zip(values)
            .map(|(&frequency, magnitude)| ResponseSample {
                frequency,
                magnitude,
            })
            .collect()
    }

    /// Curve value at a single frequency
    pub fn value_at(
        &self,
        variant: EqVariant,
        bands: &[Band],
        anchor: Option<ControlPoint>,
        curve: &CurveSettings,
        freq: f64,
    ) -> f64 {
        self.evaluate(variant, bands, anchor, curve, &[freq])[0]
    }
}

impl Default for ResponseModel {
    fn default() -> Self {
        Self::new(FrequencyRange::AUDIBLE, 500)
    }
}
