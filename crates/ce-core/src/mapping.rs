//! Frequency/gain ↔ pixel mapping
//!
//! Frequency is laid out logarithmically along x, gain linearly along y with
//! 0 dB on the vertical center. All functions are pure; `Viewport` only
//! bundles their arguments.

use serde::{Deserialize, Serialize};

use crate::{MAX_FREQUENCY, MAX_GAIN_DB, MIN_FREQUENCY, MIN_GAIN_DB};

// ============================================================================
// RANGES
// ============================================================================

/// Frequency span covered by the x axis (Hz)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrequencyRange {
    pub min: f64,
    pub max: f64,
}

impl FrequencyRange {
    pub const AUDIBLE: Self = Self {
        min: MIN_FREQUENCY,
        max: MAX_FREQUENCY,
    };

    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn is_valid(&self) -> bool {
        self.min > 0.0 && self.max > self.min && self.max.is_finite()
    }
}

impl Default for FrequencyRange {
    fn default() -> Self {
        Self::AUDIBLE
    }
}

/// Gain span covered by the y axis (dB)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AmplitudeRange {
    pub min: f64,
    pub max: f64,
}

impl AmplitudeRange {
    pub const FULL: Self = Self {
        min: MIN_GAIN_DB,
        max: MAX_GAIN_DB,
    };

    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Symmetric ±`limit` range
    pub fn symmetric(limit: f64) -> Self {
        Self {
            min: -limit.abs(),
            max: limit.abs(),
        }
    }

    #[inline]
    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    #[inline]
    pub fn center(&self) -> f64 {
        (self.max + self.min) * 0.5
    }

    pub fn clamp(&self, gain_db: f64) -> f64 {
        gain_db.clamp(self.min, self.max)
    }

    pub fn is_valid(&self) -> bool {
        self.max > self.min && self.min.is_finite() && self.max.is_finite()
    }
}

impl Default for AmplitudeRange {
    fn default() -> Self {
        Self::FULL
    }
}

// ============================================================================
// PIXEL GEOMETRY
// ============================================================================

/// Pixel position
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn distance(&self, other: Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Axis-aligned pixel rectangle with non-negative extent
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// Rectangle spanned by two corners, in either drag direction
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self {
            x: a.x.min(b.x),
            y: a.y.min(b.y),
            width: (b.x - a.x).abs(),
            height: (b.y - a.y).abs(),
        }
    }

    /// Inclusive containment
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.x + self.width && p.y >= self.y && p.y <= self.y + self.height
    }
}

// ============================================================================
// MAPPING FUNCTIONS
// ============================================================================

/// Map a frequency to an x position (log scale)
#[inline]
pub fn freq_to_x(freq: f64, width: f64, range: FrequencyRange) -> f64 {
    let log_min = range.min.log10();
    let log_max = range.max.log10();
    let log_f = freq.max(f64::MIN_POSITIVE).log10();
    width * (log_f - log_min) / (log_max - log_min)
}

/// Map an x position back to a frequency (inverse of `freq_to_x`)
#[inline]
pub fn x_to_freq(x: f64, width: f64, range: FrequencyRange) -> f64 {
    if width <= 0.0 {
        return range.min;
    }
    let log_min = range.min.log10();
    let log_max = range.max.log10();
    10.0_f64.powf(log_min + (x / width) * (log_max - log_min))
}

/// Map a gain to a y position (0 dB of a symmetric range lands on `height / 2`)
#[inline]
pub fn gain_to_y(gain_db: f64, height: f64, amplitude: AmplitudeRange) -> f64 {
    height * 0.5 - (gain_db - amplitude.center()) * height / amplitude.span()
}

/// Map a y position back to a gain (inverse of `gain_to_y`)
#[inline]
pub fn y_to_gain(y: f64, height: f64, amplitude: AmplitudeRange) -> f64 {
    if height <= 0.0 {
        return amplitude.center();
    }
    amplitude.center() + (height * 0.5 - y) * amplitude.span() / height
}

// ============================================================================
// VIEWPORT
// ============================================================================

/// Size and ranges of the editing surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub range: FrequencyRange,
    pub amplitude: AmplitudeRange,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            range: FrequencyRange::default(),
            amplitude: AmplitudeRange::default(),
        }
    }

    pub fn with_range(mut self, range: FrequencyRange) -> Self {
        self.range = range;
        self
    }

    pub fn with_amplitude(mut self, amplitude: AmplitudeRange) -> Self {
        self.amplitude = amplitude;
        self
    }

    #[inline]
    pub fn freq_to_x(&self, freq: f64) -> f64 {
        freq_to_x(freq, self.width, self.range)
    }

    #[inline]
    pub fn x_to_freq(&self, x: f64) -> f64 {
        x_to_freq(x, self.width, self.range)
    }

    #[inline]
    pub fn gain_to_y(&self, gain_db: f64) -> f64 {
        gain_to_y(gain_db, self.height, self.amplitude)
    }

    #[inline]
    pub fn y_to_gain(&self, y: f64) -> f64 {
        y_to_gain(y, self.height, self.amplitude)
    }

    /// Pixel position of a (frequency, gain) pair
    pub fn to_pixel(&self, freq: f64, gain_db: f64) -> Point {
        Point::new(self.freq_to_x(freq), self.gain_to_y(gain_db))
    }

    /// (frequency, gain) under a pixel position, unclamped
    pub fn from_pixel(&self, p: Point) -> (f64, f64) {
        (self.x_to_freq(p.x), self.y_to_gain(p.y))
    }

    /// y of the 0 dB line
    pub fn zero_line_y(&self) -> f64 {
        self.gain_to_y(0.0)
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= 0.0 && p.x <= self.width && p.y >= 0.0 && p.y <= self.height
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(800.0, 300.0)
    }
}
