//! Calibration hints for an audio-feedback collaborator
//!
//! Best effort only: the engine never waits on or checks the sink.

use std::f64::consts::LN_2;

/// What the editor is currently pointing at
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CalibrationHint {
    /// Center frequency (Hz)
    pub frequency: Option<f64>,
    /// Bandwidth (octaves)
    pub bandwidth: Option<f64>,
}

impl CalibrationHint {
    pub fn frequency(frequency: f64) -> Self {
        Self {
            frequency: Some(frequency),
            bandwidth: None,
        }
    }

    pub fn band(frequency: f64, q: f64) -> Self {
        Self {
            frequency: Some(frequency),
            bandwidth: Some(q_to_bandwidth(q)),
        }
    }

    /// Nothing to preview (gesture ended)
    pub fn silence() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.frequency.is_none() && self.bandwidth.is_none()
    }
}

/// Bandwidth in octaves of a band with the given Q
pub fn q_to_bandwidth(q: f64) -> f64 {
    2.0 / LN_2 * (1.0 / (2.0 * q)).asinh()
}

/// Receiver of calibration hints
pub trait CalibrationSink {
    fn hint(&self, hint: CalibrationHint);
}

impl<F: Fn(CalibrationHint)> CalibrationSink for F {
    fn hint(&self, hint: CalibrationHint) {
        self(hint)
    }
}
