//! Selection, marquee and hit-testing

use std::collections::BTreeSet;

use ce_core::{Band, EntityId, Point, Rect, Viewport};

/// Nearest entity within `radius` pixels of `pos`
///
/// Ties keep the entity that comes first in list order.
pub fn hit_test(entities: &[Band], viewport: &Viewport, pos: Point, radius: f64) -> Option<EntityId> {
    let mut best: Option<(EntityId, f64)> = None;
    for band in entities {
        let distance = viewport.to_pixel(band.frequency(), band.gain_db()).distance(pos);
        if distance > radius {
            continue;
        }
        match best {
            Some((_, d)) if d <= distance => {}
            _ => best = Some((band.id(), distance)),
        }
    }
    best.map(|(id, _)| id)
}

/// Ids of entities whose pixel position lies inside `rect` (inclusive)
pub fn entities_in_rect(entities: &[Band], viewport: &Viewport, rect: Rect) -> Vec<EntityId> {
    entities
        .iter()
        .filter(|b| rect.contains(viewport.to_pixel(b.frequency(), b.gain_db())))
        .map(Band::id)
        .collect()
}

// ============================================================================
// SELECTION SET
// ============================================================================

/// Selected entity ids
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    ids: BTreeSet<EntityId>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.ids.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// More than one entity selected
    pub fn is_multi(&self) -> bool {
        self.ids.len() > 1
    }

    pub fn iter(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.ids.iter().copied()
    }

    pub fn ids(&self) -> Vec<EntityId> {
        self.iter().collect()
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Select exactly `id`
    pub fn set_single(&mut self, id: EntityId) {
        self.ids.clear();
        self.ids.insert(id);
    }

    pub fn insert(&mut self, id: EntityId) -> bool {
        self.ids.insert(id)
    }

    pub fn remove(&mut self, id: EntityId) -> bool {
        self.ids.remove(&id)
    }

    /// Flip membership; returns whether `id` is now selected
    pub fn toggle(&mut self, id: EntityId) -> bool {
        if self.ids.remove(&id) {
            false
        } else {
            self.ids.insert(id);
            true
        }
    }

    pub fn replace(&mut self, ids: impl IntoIterator<Item = EntityId>) {
        self.ids = ids.into_iter().collect();
    }

    pub fn extend(&mut self, ids: impl IntoIterator<Item = EntityId>) {
        self.ids.extend(ids);
    }

    /// Select every entity in the list
    pub fn select_all(&mut self, entities: &[Band]) {
        self.replace(entities.iter().map(Band::id));
    }

    /// Drop ids that no longer exist
    pub fn retain_existing(&mut self, entities: &[Band]) {
        self.ids.retain(|id| entities.iter().any(|b| b.id() == *id));
    }
}

// ============================================================================
// MARQUEE
// ============================================================================

/// Rectangle drag-select in progress
#[derive(Debug, Clone)]
pub struct Marquee {
    start: Point,
    end: Point,
    additive: bool,
    base: SelectionSet,
}

impl Marquee {
    /// Start at `start`; `additive` unions with `base` instead of replacing it
    pub fn new(start: Point, additive: bool, base: SelectionSet) -> Self {
        Self {
            start,
            end: start,
            additive,
            base,
        }
    }

    pub fn update(&mut self, end: Point) {
        self.end = end;
    }

    pub fn start(&self) -> Point {
        self.start
    }

    pub fn end(&self) -> Point {
        self.end
    }

    pub fn is_additive(&self) -> bool {
        self.additive
    }

    /// Selection from before the marquee started
    pub fn base(&self) -> &SelectionSet {
        &self.base
    }

    pub fn rect(&self) -> Rect {
        Rect::from_corners(self.start, self.end)
    }

    /// Pointer travel since the start (px)
    pub fn travel(&self) -> f64 {
        self.start.distance(self.end)
    }

    /// Short non-additive drags count as an empty-space click
    pub fn is_click(&self, threshold: f64) -> bool {
        !self.additive && self.travel() < threshold
    }

    /// Selection the marquee currently describes
    pub fn selection(&self, entities: &[Band], viewport: &Viewport) -> SelectionSet {
        let mut selection = if self.additive {
            self.base.clone()
        } else {
            SelectionSet::new()
        };
        selection.extend(entities_in_rect(entities, viewport, self.rect()));
        selection
    }
}
