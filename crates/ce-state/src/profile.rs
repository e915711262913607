//! Profiles and their repositories
//!
//! A profile is the persisted state of one editor: the entity list, the
//! output volume and the curve-variant settings. Ids are not persisted.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use ce_core::{BandSettings, CurveSettings};

/// Persisted editor state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileData {
    pub entities: Vec<BandSettings>,
    /// Output volume (dB)
    pub volume: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub curve: Option<CurveSettings>,
}

impl ProfileData {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Profile storage errors
#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid profile id: {0:?}")]
    InvalidId(String),

    #[error("Repository unavailable: {0}")]
    Unavailable(String),
}

/// Where profiles are read from and written to
pub trait ProfileRepository {
    /// `Ok(None)` when the profile does not exist
    fn load(&self, profile_id: &str) -> Result<Option<ProfileData>, ProfileError>;

    fn save(&self, profile_id: &str, data: &ProfileData) -> Result<(), ProfileError>;
}

// ============================================================================
// IN-MEMORY
// ============================================================================

/// Shared in-process repository; clones see the same profiles
#[derive(Debug, Clone, Default)]
pub struct InMemoryProfileRepository {
    profiles: Arc<RwLock<HashMap<String, ProfileData>>>,
    saves: Arc<AtomicUsize>,
    offline: Arc<AtomicBool>,
}

impl InMemoryProfileRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, profile_id: &str, data: ProfileData) {
        self.profiles.write().insert(profile_id.to_string(), data);
    }

    pub fn get(&self, profile_id: &str) -> Option<ProfileData> {
        self.profiles.read().get(profile_id).cloned()
    }

    pub fn len(&self) -> usize {
        self.profiles.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.read().is_empty()
    }

    /// Successful saves so far
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::Relaxed)
    }

    /// Make every call fail with `Unavailable`
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::Relaxed);
    }

    fn check_online(&self) -> Result<(), ProfileError> {
        if self.offline.load(Ordering::Relaxed) {
            Err(ProfileError::Unavailable("repository offline".into()))
        } else {
            Ok(())
        }
    }
}

impl ProfileRepository for InMemoryProfileRepository {
    fn load(&self, profile_id: &str) -> Result<Option<ProfileData>, ProfileError> {
        self.check_online()?;
        Ok(self.get(profile_id))
    }

    fn save(&self, profile_id: &str, data: &ProfileData) -> Result<(), ProfileError> {
        self.check_online()?;
        self.insert(profile_id, data.clone());
        self.saves.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

// ============================================================================
// JSON FILES
// ============================================================================

/// One `<id>.json` file per profile under a directory
#[derive(Debug, Clone)]
pub struct JsonProfileRepository {
    dir: PathBuf,
}

impl JsonProfileRepository {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    /// Standard profile directory
    pub fn default_dir() -> PathBuf {
        dirs::config_dir()
            .map(|d| d.join("contour"))
            .unwrap_or_else(|| PathBuf::from("."))
            .join("profiles")
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File backing `profile_id`; ids must be plain file stems
    pub fn path_for(&self, profile_id: &str) -> Result<PathBuf, ProfileError> {
        let valid = !profile_id.is_empty()
            && profile_id != "."
            && profile_id != ".."
            && !profile_id.contains(['/', '\\', '\0']);
        if !valid {
            return Err(ProfileError::InvalidId(profile_id.to_string()));
        }
        Ok(self.dir.join(format!("{profile_id}.json")))
    }
}

impl Default for JsonProfileRepository {
    fn default() -> Self {
        Self::new(Self::default_dir())
    }
}

impl ProfileRepository for JsonProfileRepository {
    fn load(&self, profile_id: &str) -> Result<Option<ProfileData>, ProfileError> {
        let path = self.path_for(profile_id)?;
        if !path.exists() {
            return Ok(None);
        }
        let json = std::fs::read_to_string(&path)?;
        Ok(Some(ProfileData::from_json(&json)?))
    }

    fn save(&self, profile_id: &str, data: &ProfileData) -> Result<(), ProfileError> {
        let path = self.path_for(profile_id)?;
        let json = data.to_json()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, json)?;
        log::debug!("Saved profile {} to {}", profile_id, path.display());
        Ok(())
    }
}
