//! Editor configuration
//!
//! Persistent tuning knobs for the editor:
//! - Axis ranges
//! - Pointer thresholds and gesture scaling
//! - Response grid resolution
//! - Commit debounce and history depth
//! - Defaults for newly created entities

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::{
    AmplitudeRange, BandKind, ContourError, ContourResult, DEFAULT_Q, EqVariant, FrequencyRange,
    MAX_GAIN_DB, MIN_GAIN_DB,
};

/// Complete editor configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Response strategy
    pub variant: EqVariant,
    /// Axis ranges
    pub viewport: ViewportConfig,
    /// Pointer thresholds
    pub interaction: InteractionConfig,
    /// Response computation
    pub response: ResponseConfig,
    /// Commit/debounce behaviour
    pub persistence: PersistenceConfig,
    /// New-entity defaults
    pub defaults: EntityDefaults,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            variant: EqVariant::default(),
            viewport: ViewportConfig::default(),
            interaction: InteractionConfig::default(),
            response: ResponseConfig::default(),
            persistence: PersistenceConfig::default(),
            defaults: EntityDefaults::default(),
        }
    }
}

/// Axis ranges
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    pub frequency_range: FrequencyRange,
    /// Vertical span; point variants commonly narrow this
    pub amplitude: AmplitudeRange,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            frequency_range: FrequencyRange::default(),
            amplitude: AmplitudeRange::default(),
        }
    }
}

/// Pointer thresholds and gesture scaling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    /// Entity hit radius (px)
    pub hit_radius: f64,
    /// Distance from the insertion line/curve that still counts as a hit (px)
    pub insertion_threshold: f64,
    /// Marquee drags shorter than this are clicks (px)
    pub marquee_click_threshold: f64,
    /// Q multiplier exponent per pixel of vertical drag
    pub q_drag_scale: f64,
    /// Minimum spacing between applied pointer moves (ms)
    pub move_interval_ms: u64,
    /// Width of the volume handle strip on the right edge (px)
    pub volume_strip_width: f64,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            hit_radius: 10.0,
            insertion_threshold: 8.0,
            marquee_click_threshold: 3.0,
            q_drag_scale: 0.01,
            move_interval_ms: 16, // ~60 updates/s
            volume_strip_width: 14.0,
        }
    }
}

/// Response computation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResponseConfig {
    /// Number of log-spaced grid points
    pub grid_points: usize,
    /// Sample rate handed to the biquad oracle (Hz)
    pub sample_rate: f64,
}

impl Default for ResponseConfig {
    fn default() -> Self {
        Self {
            grid_points: 500,
            sample_rate: 48000.0,
        }
    }
}

/// Commit/debounce behaviour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistenceConfig {
    /// Delay between the last change and the profile write (ms)
    pub commit_debounce_ms: u64,
    /// Undo steps kept
    pub history_depth: usize,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            commit_debounce_ms: 50,
            history_depth: 100,
        }
    }
}

/// Defaults for newly created entities
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntityDefaults {
    pub q: f64,
    /// Kind of bands created in parametric mode
    pub kind: BandKind,
    pub max_entities: usize,
}

impl Default for EntityDefaults {
    fn default() -> Self {
        Self {
            q: DEFAULT_Q,
            kind: BandKind::Peaking,
            max_entities: 64,
        }
    }
}

impl EditorConfig {
    /// Default configuration for a variant (point variants use ±12 dB)
    pub fn for_variant(variant: EqVariant) -> Self {
        let mut config = Self {
            variant,
            ..Self::default()
        };
        if variant.is_point_based() {
            config.viewport.amplitude = AmplitudeRange::symmetric(12.0);
        }
        config
    }

    /// Reject configurations the mapping and response code cannot work with
    pub fn validate(&self) -> ContourResult<()> {
        if !self.viewport.frequency_range.is_valid() {
            return Err(ContourError::InvalidParam(format!(
                "frequency range {:?}",
                self.viewport.frequency_range
            )));
        }
        let amp = self.viewport.amplitude;
        if !amp.is_valid() || amp.min < MIN_GAIN_DB || amp.max > MAX_GAIN_DB {
            return Err(ContourError::InvalidParam(format!("amplitude range {amp:?}")));
        }
        if self.response.grid_points < 2 {
            return Err(ContourError::InvalidParam(format!(
                "grid_points must be at least 2, got {}",
                self.response.grid_points
            )));
        }
        if self.response.sample_rate <= 2.0 * self.viewport.frequency_range.max {
            return Err(ContourError::InvalidParam(format!(
                "sample rate {} does not cover {} Hz",
                self.response.sample_rate, self.viewport.frequency_range.max
            )));
        }
        if self.interaction.hit_radius <= 0.0 {
            return Err(ContourError::InvalidParam("hit_radius must be positive".into()));
        }
        Ok(())
    }

    /// Load configuration from the standard location
    pub fn load() -> Self {
        Self::load_from(Self::default_path())
    }

    /// Load configuration from a path, falling back to defaults
    pub fn load_from<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(path.as_ref()) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(config) => config,
                Err(e) => {
                    log::warn!(
                        "Ignoring malformed editor config {}: {}",
                        path.as_ref().display(),
                        e
                    );
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }

    /// Save configuration to a path
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> ContourResult<()> {
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Standard configuration file path
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .map(|d| d.join("contour"))
            .unwrap_or_else(|| PathBuf::from("."))
            .join("editor.json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(EditorConfig::default().validate().is_ok());
        assert!(EditorConfig::for_variant(EqVariant::Points).validate().is_ok());
        assert!(EditorConfig::for_variant(EqVariant::Curve).validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_ranges() {
        let mut config = EditorConfig::default();
        config.viewport.frequency_range = FrequencyRange::new(0.0, 20000.0);
        assert!(config.validate().is_err());

        let mut config = EditorConfig::default();
        config.viewport.amplitude = AmplitudeRange::new(-48.0, 48.0);
        assert!(config.validate().is_err());

        let mut config = EditorConfig::default();
        config.response.grid_points = 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: EditorConfig =
            serde_json::from_str(r#"{"variant": "points", "interaction": {"hit_radius": 14.0}}"#)
                .unwrap();
        assert_eq!(config.variant, EqVariant::Points);
        assert_eq!(config.interaction.hit_radius, 14.0);
        assert_eq!(config.interaction.move_interval_ms, 16);
        assert_eq!(config.response.grid_points, 500);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("editor.json");

        let mut config = EditorConfig::for_variant(EqVariant::Curve);
        config.persistence.commit_debounce_ms = 120;
        config.save_to(&path).unwrap();

        let loaded = EditorConfig::load_from(&path);
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_malformed_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("editor.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert_eq!(EditorConfig::load_from(&path), EditorConfig::default());
    }
}
