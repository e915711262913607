//! Exact filter-response oracle
//!
//! The response model asks an oracle for a band's exact magnitude response
//! and falls back to the analytic approximations when none is installed or
//! the oracle fails for a band.

use ce_core::BandKind;
use thiserror::Error;

use crate::biquad::BiquadCoeffs;

/// Oracle failures
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OracleError {
    #[error("Unsupported filter kind: {0:?}")]
    UnsupportedKind(BandKind),

    #[error("Invalid response: expected {expected} values, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("Non-finite magnitude at {0} Hz")]
    NonFinite(f64),

    #[error("Oracle unavailable: {0}")]
    Unavailable(String),
}

/// Source of exact per-band magnitude responses
pub trait FilterResponseOracle {
    /// Magnitude in dB at each query frequency
    fn evaluate(
        &self,
        kind: BandKind,
        frequency: f64,
        q: f64,
        gain_db: f64,
        query: &[f64],
    ) -> Result<Vec<f64>, OracleError>;
}

/// Reference oracle evaluating RBJ biquads on the unit circle
#[derive(Debug, Clone, Copy)]
pub struct BiquadOracle {
    sample_rate: f64,
}

impl BiquadOracle {
    pub fn new(sample_rate: f64) -> Self {
        Self { sample_rate }
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }
}

impl Default for BiquadOracle {
    fn default() -> Self {
        Self::new(48000.0)
    }
}

impl FilterResponseOracle for BiquadOracle {
    fn evaluate(
        &self,
        kind: BandKind,
        frequency: f64,
        q: f64,
        gain_db: f64,
        query: &[f64],
    ) -> Result<Vec<f64>, OracleError> {
        let coeffs = BiquadCoeffs::for_kind(kind, frequency, q, gain_db, self.sample_rate)
            .ok_or(OracleError::UnsupportedKind(kind))?;

        Ok(query
            .iter()
            .map(|&f| coeffs.magnitude_db(f, self.sample_rate))
            .collect())
    }
}

/// Check an oracle answer before it is trusted
pub(crate) fn validate_response(query: &[f64], response: &[f64]) -> Result<(), OracleError> {
    if response.len() != query.len() {
        return Err(OracleError::LengthMismatch {
            expected: query.len(),
            actual: response.len(),
        });
    }
    if let Some(i) = response.iter().position(|v| !v.is_finite()) {
        return Err(OracleError::NonFinite(query[i]));
    }
    Ok(())
}
