//! Editable curve entities
//!
//! A band (parametric mode) or point (point modes) is a frequency/gain/Q
//! triple with a stable id. The numeric fields are private so every write
//! goes through the clamping setters.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lowest editable frequency (Hz)
pub const MIN_FREQUENCY: f64 = 20.0;
/// Highest editable frequency (Hz)
pub const MAX_FREQUENCY: f64 = 20000.0;
/// Lowest editable gain (dB)
pub const MIN_GAIN_DB: f64 = -24.0;
/// Highest editable gain (dB)
pub const MAX_GAIN_DB: f64 = 24.0;
pub const MIN_Q: f64 = 0.1;
pub const MAX_Q: f64 = 10.0;

pub const DEFAULT_FREQUENCY: f64 = 1000.0;
pub const DEFAULT_GAIN_DB: f64 = 0.0;
pub const DEFAULT_Q: f64 = 1.0;

/// Clamp a frequency into [20, 20000] Hz. NaN falls back to 1 kHz.
#[inline]
pub fn clamp_frequency(freq: f64) -> f64 {
    if freq.is_nan() {
        DEFAULT_FREQUENCY
    } else {
        freq.clamp(MIN_FREQUENCY, MAX_FREQUENCY)
    }
}

/// Clamp a gain into [-24, 24] dB. NaN falls back to 0 dB.
#[inline]
pub fn clamp_gain(gain_db: f64) -> f64 {
    if gain_db.is_nan() {
        DEFAULT_GAIN_DB
    } else {
        gain_db.clamp(MIN_GAIN_DB, MAX_GAIN_DB)
    }
}

/// Clamp Q into [0.1, 10]. NaN falls back to 1.0.
#[inline]
pub fn clamp_q(q: f64) -> f64 {
    if q.is_nan() { DEFAULT_Q } else { q.clamp(MIN_Q, MAX_Q) }
}

/// Opaque, stable entity identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u64);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Filter shape of a band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BandKind {
    #[default]
    Peaking,
    LowShelf,
    HighShelf,
    Notch,
    Bandpass,
    LowPass,
    HighPass,
    /// Interpolation point without a filter shape (point modes)
    Point,
}

impl BandKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Peaking => "Bell",
            Self::LowShelf => "Low Shelf",
            Self::HighShelf => "High Shelf",
            Self::Notch => "Notch",
            Self::Bandpass => "Bandpass",
            Self::LowPass => "Low Pass",
            Self::HighPass => "High Pass",
            Self::Point => "Point",
        }
    }
}

/// Response strategy of an editor instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EqVariant {
    /// Parametric bands combined additively in dB
    #[default]
    Parametric,
    /// Sine-EQ points interpolated around the fixed 1 kHz reference anchor
    Points,
    /// Multi-point curve with shape warp and optional resonance bump
    Curve,
}

impl EqVariant {
    /// Point-based variants interpolate instead of summing filters
    pub fn is_point_based(&self) -> bool {
        !matches!(self, Self::Parametric)
    }

    /// Kind given to entities created by an insertion click
    pub fn default_kind(&self) -> BandKind {
        if self.is_point_based() {
            BandKind::Point
        } else {
            BandKind::Peaking
        }
    }
}

/// Frequency/gain/Q triple, always inside the editable domain
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandParams {
    pub frequency: f64,
    pub gain_db: f64,
    pub q: f64,
}

impl BandParams {
    pub fn new(frequency: f64, gain_db: f64, q: f64) -> Self {
        Self {
            frequency,
            gain_db,
            q,
        }
        .clamped()
    }

    pub fn clamped(self) -> Self {
        Self {
            frequency: clamp_frequency(self.frequency),
            gain_db: clamp_gain(self.gain_db),
            q: clamp_q(self.q),
        }
    }
}

impl Default for BandParams {
    fn default() -> Self {
        Self {
            frequency: DEFAULT_FREQUENCY,
            gain_db: DEFAULT_GAIN_DB,
            q: DEFAULT_Q,
        }
    }
}

/// Persisted form of an entity (ids are runtime-only)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandSettings {
    pub frequency: f64,
    #[serde(rename = "gain")]
    pub gain_db: f64,
    #[serde(default = "default_q")]
    pub q: f64,
    #[serde(default)]
    pub kind: BandKind,
}

fn default_q() -> f64 {
    DEFAULT_Q
}

impl BandSettings {
    pub fn new(frequency: f64, gain_db: f64, q: f64, kind: BandKind) -> Self {
        Self {
            frequency,
            gain_db,
            q,
            kind,
        }
    }
}

/// Editable band or point
#[derive(Debug, Clone, PartialEq)]
pub struct Band {
    id: EntityId,
    kind: BandKind,
    params: BandParams,
}

impl Band {
    pub fn new(id: EntityId, kind: BandKind, params: BandParams) -> Self {
        Self {
            id,
            kind,
            params: params.clamped(),
        }
    }

    pub fn from_settings(id: EntityId, settings: &BandSettings) -> Self {
        Self::new(
            id,
            settings.kind,
            BandParams {
                frequency: settings.frequency,
                gain_db: settings.gain_db,
                q: settings.q,
            },
        )
    }

    pub fn settings(&self) -> BandSettings {
        BandSettings::new(
            self.params.frequency,
            self.params.gain_db,
            self.params.q,
            self.kind,
        )
    }

    #[inline]
    pub fn id(&self) -> EntityId {
        self.id
    }

    #[inline]
    pub fn kind(&self) -> BandKind {
        self.kind
    }

    #[inline]
    pub fn frequency(&self) -> f64 {
        self.params.frequency
    }

    #[inline]
    pub fn gain_db(&self) -> f64 {
        self.params.gain_db
    }

    #[inline]
    pub fn q(&self) -> f64 {
        self.params.q
    }

    #[inline]
    pub fn params(&self) -> BandParams {
        self.params
    }

    pub fn set_kind(&mut self, kind: BandKind) {
        self.kind = kind;
    }

    pub fn set_frequency(&mut self, freq: f64) {
        self.params.frequency = clamp_frequency(freq);
    }

    pub fn set_gain(&mut self, gain_db: f64) {
        self.params.gain_db = clamp_gain(gain_db);
    }

    pub fn set_q(&mut self, q: f64) {
        self.params.q = clamp_q(q);
    }

    pub fn set_params(&mut self, params: BandParams) {
        self.params = params.clamped();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setters_clamp() {
        let mut band = Band::new(EntityId(1), BandKind::Peaking, BandParams::default());

        band.set_frequency(0.0);
        assert_eq!(band.frequency(), MIN_FREQUENCY);
        band.set_frequency(-100.0);
        assert_eq!(band.frequency(), MIN_FREQUENCY);
        band.set_frequency(96000.0);
        assert_eq!(band.frequency(), MAX_FREQUENCY);

        band.set_gain(40.0);
        assert_eq!(band.gain_db(), MAX_GAIN_DB);
        band.set_q(0.0);
        assert_eq!(band.q(), MIN_Q);
        band.set_q(f64::INFINITY);
        assert_eq!(band.q(), MAX_Q);
    }

    #[test]
    fn test_nan_falls_back_to_defaults() {
        let params = BandParams::new(f64::NAN, f64::NAN, f64::NAN);
        assert_eq!(params, BandParams::default());
    }

    #[test]
    fn test_settings_clamped_on_load() {
        let settings = BandSettings::new(5.0, -60.0, 50.0, BandKind::LowShelf);
        let band = Band::from_settings(EntityId(7), &settings);
        assert_eq!(band.frequency(), MIN_FREQUENCY);
        assert_eq!(band.gain_db(), MIN_GAIN_DB);
        assert_eq!(band.q(), MAX_Q);
        assert_eq!(band.kind(), BandKind::LowShelf);
    }

    #[test]
    fn test_settings_json_defaults() {
        let settings: BandSettings =
            serde_json::from_str(r#"{"frequency": 250.0, "gain": 3.0}"#).unwrap();
        assert_eq!(settings.q, DEFAULT_Q);
        assert_eq!(settings.kind, BandKind::Peaking);

        let shelf: BandSettings =
            serde_json::from_str(r#"{"frequency": 80.0, "gain": 2.0, "q": 0.7, "kind": "low-shelf"}"#)
                .unwrap();
        assert_eq!(shelf.kind, BandKind::LowShelf);
    }
}
