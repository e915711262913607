//! Entity store
//!
//! Ordered list of bands/points with stable ids, plus the fixed reference
//! anchor used by the point variant. Ids are never reused within a store.

use ce_core::{Band, BandKind, BandParams, BandSettings, EntityId, EqVariant};

/// Frequency of the point-mode reference anchor (Hz)
pub const ANCHOR_FREQUENCY: f64 = 1000.0;
/// Gain of the point-mode reference anchor (dB)
pub const ANCHOR_GAIN_DB: f64 = 0.0;

/// Fixed interpolation point that can never be selected, moved or deleted
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReferenceAnchor {
    pub frequency: f64,
    pub gain_db: f64,
}

impl Default for ReferenceAnchor {
    fn default() -> Self {
        Self {
            frequency: ANCHOR_FREQUENCY,
            gain_db: ANCHOR_GAIN_DB,
        }
    }
}

/// Bands/points owned by the editor
#[derive(Debug, Clone)]
pub struct EntityStore {
    entities: Vec<Band>,
    next_id: u64,
    anchor: Option<ReferenceAnchor>,
    max_entities: usize,
    /// Bumped whenever the set of ids is replaced wholesale
    identity: u64,
}

impl EntityStore {
    pub fn new(variant: EqVariant, max_entities: usize) -> Self {
        Self {
            entities: Vec::new(),
            next_id: 1,
            anchor: (variant == EqVariant::Points).then(ReferenceAnchor::default),
            max_entities,
            identity: 0,
        }
    }

    pub fn anchor(&self) -> Option<ReferenceAnchor> {
        self.anchor
    }

    pub fn entities(&self) -> &[Band] {
        &self.entities
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.entities.len() >= self.max_entities
    }

    pub fn max_entities(&self) -> usize {
        self.max_entities
    }

    /// Generation of the id set; changes on `replace_all`
    pub fn identity(&self) -> u64 {
        self.identity
    }

    pub fn get(&self, id: EntityId) -> Option<&Band> {
        self.entities.iter().find(|b| b.id() == id)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.get(id).is_some()
    }

    pub fn ids(&self) -> Vec<EntityId> {
        self.entities.iter().map(Band::id).collect()
    }

    fn allocate_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Append a new entity; `None` once the store is full
    pub fn add(&mut self, kind: BandKind, params: BandParams) -> Option<EntityId> {
        if self.is_full() {
            log::debug!("Entity limit {} reached", self.max_entities);
            return None;
        }
        let id = self.allocate_id();
        self.entities.push(Band::new(id, kind, params));
        Some(id)
    }

    /// Apply `f` to one entity; false if the id is gone
    pub fn update(&mut self, id: EntityId, f: impl FnOnce(&mut Band)) -> bool {
        match self.entities.iter_mut().find(|b| b.id() == id) {
            Some(band) => {
                f(band);
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: EntityId) -> Option<Band> {
        let index = self.entities.iter().position(|b| b.id() == id)?;
        Some(self.entities.remove(index))
    }

    /// Remove every listed id that exists; returns how many went
    pub fn remove_many(&mut self, ids: &[EntityId]) -> usize {
        let before = self.entities.len();
        self.entities.retain(|b| !ids.contains(&b.id()));
        before - self.entities.len()
    }

    /// Replace the whole list from persisted settings with fresh ids
    pub fn replace_all(&mut self, settings: &[BandSettings]) {
        if settings.len() > self.max_entities {
            log::warn!(
                "Profile has {} entities, keeping the first {}",
                settings.len(),
                self.max_entities
            );
        }
        let mut entities = Vec::with_capacity(settings.len().min(self.max_entities));
        for s in settings.iter().take(self.max_entities) {
            let id = self.allocate_id();
            entities.push(Band::from_settings(id, s));
        }
        self.entities = entities;
        self.identity += 1;
    }

    /// Put back a snapshot taken from this store (undo/redo, cancelled drags)
    pub fn restore(&mut self, entities: Vec<Band>) {
        if let Some(max) = entities.iter().map(|b| b.id().0).max() {
            self.next_id = self.next_id.max(max + 1);
        }
        self.entities = entities;
    }

    pub fn snapshot(&self) -> Vec<Band> {
        self.entities.clone()
    }

    /// Persisted form, in list order
    pub fn settings(&self) -> Vec<BandSettings> {
        self.entities.iter().map(Band::settings).collect()
    }
}
