//! Interaction engine
//!
//! Single-writer state machine over the entity store and selection. Pointer
//! moves pass through a rate limiter and profile writes through a debouncer;
//! both are advanced by the host calling [`InteractionEngine::tick`].
//!
//! Gesture priority on pointer-down:
//! 1. secondary button on an entity deletes it (or the multi-selection)
//! 2. primary button on an entity toggles, multi-drags or drags it
//! 3. the volume handle in the strip right of the plot
//! 4. the insertion line (band mode) or curve (point modes) creates an entity
//! 5. anything else starts a marquee

use std::collections::BTreeMap;

use ce_core::{
    Band, BandKind, BandParams, ContourResult, CurveSettings, EditorConfig, EntityId, EqVariant,
    Point, Viewport, clamp_frequency, clamp_gain,
};
use ce_dsp::{BiquadOracle, ControlPoint, FilterResponseOracle, ResponseCurve, ResponseModel};
use ce_state::{
    Clock, Debouncer, EntityStore, Marquee, ProfileData, ProfileRepository, RateLimiter,
    SelectionSet, SystemClock, UndoHistory, hit_test,
};

use crate::bundle::{GhostNode, InteractionState, RenderBundle};
use crate::calibration::{CalibrationHint, CalibrationSink};
use crate::input::{Key, Modifiers, MouseButton, PointerEvent};

/// Handle returned by [`InteractionEngine::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Observer = Box<dyn FnMut(&RenderBundle)>;

// ============================================================================
// GESTURES
// ============================================================================

/// Entity drag or Q adjustment in progress
#[derive(Debug, Clone)]
struct DragGesture {
    primary: EntityId,
    /// Parameters at drag start (or at the last modifier switch)
    snapshot: BTreeMap<EntityId, BandParams>,
    origin: Point,
    last: Point,
    multi: bool,
    adjusting_q: bool,
    /// Entity list before the gesture, for Escape and undo
    before: Vec<Band>,
}

impl DragGesture {
    fn state(&self) -> InteractionState {
        if self.adjusting_q {
            InteractionState::AdjustingQ {
                primary: self.primary,
                multi: self.multi,
            }
        } else if self.multi {
            InteractionState::DraggingMulti {
                primary: self.primary,
            }
        } else {
            InteractionState::DraggingSingle(self.primary)
        }
    }
}

#[derive(Debug, Clone, Default)]
enum Gesture {
    #[default]
    None,
    Drag(DragGesture),
    Marquee(Marquee),
    Volume {
        before: f64,
    },
}

// ============================================================================
// BUILDER
// ============================================================================

/// Wires collaborators into an [`InteractionEngine`]
pub struct EngineBuilder {
    config: EditorConfig,
    viewport_size: (f64, f64),
    repository: Option<Box<dyn ProfileRepository>>,
    oracle: Option<Box<dyn FilterResponseOracle>>,
    biquad_oracle: bool,
    clock: Option<Box<dyn Clock>>,
    calibration: Option<Box<dyn CalibrationSink>>,
    profile_id: Option<String>,
}

impl EngineBuilder {
    pub fn new(config: EditorConfig) -> Self {
        Self {
            config,
            viewport_size: (800.0, 300.0),
            repository: None,
            oracle: None,
            biquad_oracle: false,
            clock: None,
            calibration: None,
            profile_id: None,
        }
    }

    pub fn config(mut self, config: EditorConfig) -> Self {
        self.config = config;
        self
    }

    /// Viewport size in pixels
    pub fn size(mut self, width: f64, height: f64) -> Self {
        self.viewport_size = (width, height);
        self
    }

    pub fn repository(mut self, repository: impl ProfileRepository + 'static) -> Self {
        self.repository = Some(Box::new(repository));
        self
    }

    pub fn oracle(mut self, oracle: impl FilterResponseOracle + 'static) -> Self {
        self.oracle = Some(Box::new(oracle));
        self.biquad_oracle = false;
        self
    }

    /// Use the reference biquad oracle at the configured sample rate
    pub fn biquad_oracle(mut self) -> Self {
        self.oracle = None;
        self.biquad_oracle = true;
        self
    }

    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Some(Box::new(clock));
        self
    }

    pub fn calibration(mut self, sink: impl CalibrationSink + 'static) -> Self {
        self.calibration = Some(Box::new(sink));
        self
    }

    /// Profile loaded on build and written by commits
    pub fn profile(mut self, profile_id: impl Into<String>) -> Self {
        self.profile_id = Some(profile_id.into());
        self
    }

    pub fn build(self) -> ContourResult<InteractionEngine> {
        self.config.validate()?;

        let config = self.config;
        let (width, height) = self.viewport_size;
        let viewport = Viewport::new(width, height)
            .with_range(config.viewport.frequency_range)
            .with_amplitude(config.viewport.amplitude);

        let mut response = ResponseModel::new(config.viewport.frequency_range, config.response.grid_points);
        let oracle = if self.biquad_oracle {
            Some(Box::new(BiquadOracle::new(config.response.sample_rate)) as Box<dyn FilterResponseOracle>)
        } else {
            self.oracle
        };
        response.set_oracle(oracle);

        let store = EntityStore::new(config.variant, config.defaults.max_entities);
        let curve = CurveSettings::default();
        let response_curve = response.compute(config.variant, store.entities(), None, &curve);

        let mut engine = InteractionEngine {
            move_limiter: RateLimiter::from_millis(config.interaction.move_interval_ms),
            commit: Debouncer::from_millis(config.persistence.commit_debounce_ms),
            history: UndoHistory::new(config.persistence.history_depth),
            viewport,
            store,
            selection: SelectionSet::new(),
            response,
            response_curve,
            curve,
            volume: 0.0,
            state: InteractionState::Idle,
            gesture: Gesture::None,
            hovered: None,
            ghost: None,
            modifiers: Modifiers::NONE,
            dirty: false,
            repository: self.repository,
            profile_id: None,
            clock: self.clock.unwrap_or_else(|| Box::new(SystemClock::new())),
            calibration: self.calibration,
            observers: Vec::new(),
            next_subscription: 0,
            version: 0,
            shut_down: false,
            config,
        };
        engine.refresh_curve();

        if let Some(profile_id) = self.profile_id {
            engine.load_profile(&profile_id);
        }

        log::debug!(
            "Interaction engine ready ({:?}, {}x{}, {} response)",
            engine.config.variant,
            width,
            height,
            if engine.has_oracle() { "oracle" } else { "analytic" }
        );
        Ok(engine)
    }
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

// ============================================================================
// ENGINE
// ============================================================================

/// Pointer/keyboard state machine over the curve entities
pub struct InteractionEngine {
    config: EditorConfig,
    viewport: Viewport,
    store: EntityStore,
    selection: SelectionSet,
    response: ResponseModel,
    response_curve: ResponseCurve,
    curve: CurveSettings,
    /// Output volume (dB)
    volume: f64,
    state: InteractionState,
    gesture: Gesture,
    hovered: Option<EntityId>,
    ghost: Option<GhostNode>,
    modifiers: Modifiers,
    move_limiter: RateLimiter<(Point, Modifiers)>,
    commit: Debouncer,
    /// Changes not yet written to the repository
    dirty: bool,
    history: UndoHistory<Vec<Band>>,
    repository: Option<Box<dyn ProfileRepository>>,
    profile_id: Option<String>,
    clock: Box<dyn Clock>,
    calibration: Option<Box<dyn CalibrationSink>>,
    observers: Vec<(SubscriptionId, Observer)>,
    next_subscription: u64,
    version: u64,
    shut_down: bool,
}

impl InteractionEngine {
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn variant(&self) -> EqVariant {
        self.config.variant
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn entities(&self) -> &[Band] {
        self.store.entities()
    }

    pub fn entity(&self, id: EntityId) -> Option<&Band> {
        self.store.get(id)
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    pub fn state(&self) -> InteractionState {
        self.state
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }

    pub fn curve_settings(&self) -> &CurveSettings {
        &self.curve
    }

    pub fn response_curve(&self) -> ResponseCurve {
        self.response_curve.clone()
    }

    /// Curve value (dB) at `frequency` for the current variant
    pub fn response_at(&self, frequency: f64) -> f64 {
        self.response
            .value_at(self.variant(), self.store.entities(), self.anchor_point(), &self.curve, frequency)
    }

    /// Whether band magnitudes come from an oracle rather than the analytic shapes
    pub fn has_oracle(&self) -> bool {
        self.response.has_oracle()
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn profile_id(&self) -> Option<&str> {
        self.profile_id.as_deref()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Persisted form of the current state
    pub fn profile_data(&self) -> ProfileData {
        ProfileData {
            entities: self.store.settings(),
            volume: self.volume,
            curve: (self.variant() == EqVariant::Curve).then_some(self.curve),
        }
    }

    /// Snapshot for the painter
    pub fn render_bundle(&self) -> RenderBundle {
        RenderBundle {
            version: self.version,
            variant: self.variant(),
            entities: self.store.snapshot(),
            anchor: self.store.anchor(),
            response_curve: self.response_curve.clone(),
            selection: self.selection.ids(),
            hovered_id: self.hovered,
            dragging_id: self.state.dragging_id(),
            ghost_node: self.ghost,
            marquee_rect: match &self.gesture {
                Gesture::Marquee(marquee) => Some(marquee.rect()),
                _ => None,
            },
            volume: self.volume,
            state: self.state,
        }
    }

    // ========================================================================
    // OBSERVERS
    // ========================================================================

    /// Call `callback` with a fresh bundle after every change
    pub fn subscribe(&mut self, callback: impl FnMut(&RenderBundle) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.observers.push((id, Box::new(callback)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(sub, _)| *sub != id);
        self.observers.len() != before
    }

    fn publish(&mut self) {
        self.version += 1;
        if self.observers.is_empty() {
            return;
        }
        let bundle = self.render_bundle();
        for (_, observer) in &mut self.observers {
            observer(&bundle);
        }
    }

    // ========================================================================
    // POINTER INPUT
    // ========================================================================

    pub fn handle_pointer(&mut self, event: PointerEvent) {
        match event {
            PointerEvent::Down {
                position,
                button,
                modifiers,
            } => self.pointer_down(position, button, modifiers),
            PointerEvent::Move { position, modifiers } => self.pointer_move(position, modifiers),
            PointerEvent::Up {
                position,
                button,
                modifiers,
            } => self.pointer_up(position, button, modifiers),
            PointerEvent::Leave => self.pointer_leave(),
        }
    }

    pub fn pointer_down(&mut self, pos: Point, button: MouseButton, modifiers: Modifiers) {
        if self.shut_down || !matches!(self.gesture, Gesture::None) {
            return;
        }
        self.modifiers = modifiers;
        self.move_limiter.reset();

        let hit = hit_test(self.store.entities(), &self.viewport, pos, self.config.interaction.hit_radius);

        match button {
            MouseButton::Secondary => {
                if let Some(id) = hit {
                    if self.selection.is_multi() && self.selection.contains(id) {
                        self.delete_selection();
                    } else {
                        self.delete_entity(id);
                    }
                }
                return;
            }
            MouseButton::Middle => return,
            MouseButton::Primary => {}
        }

        if let Some(id) = hit {
            if modifiers.selection() {
                self.selection.toggle(id);
                self.hovered = Some(id);
                self.ghost = None;
                self.state = InteractionState::HoverEntity(id);
            } else {
                if !(self.selection.is_multi() && self.selection.contains(id)) {
                    self.selection.set_single(id);
                }
                let before = self.store.snapshot();
                self.begin_drag(id, pos, before);
            }
            self.publish();
            return;
        }

        if self.hits_volume_handle(pos) {
            self.gesture = Gesture::Volume { before: self.volume };
            self.state = InteractionState::DraggingVolume;
            self.hovered = None;
            self.ghost = None;
            self.publish();
            return;
        }

        if let Some(ghost) = self.insertion_target(pos) {
            let before = self.store.snapshot();
            let kind = self.insertion_kind();
            let params = BandParams::new(ghost.frequency, ghost.gain_db, self.config.defaults.q);
            if let Some(id) = self.store.add(kind, params) {
                log::debug!("Created {} {} at {:.1} Hz", kind.name(), id, params.frequency);
                self.selection.set_single(id);
                self.entities_changed();
                self.begin_drag(id, pos, before);
                self.publish();
                return;
            }
        }

        self.gesture = Gesture::Marquee(Marquee::new(pos, modifiers.selection(), self.selection.clone()));
        self.state = InteractionState::MarqueeSelecting;
        self.hovered = None;
        self.ghost = None;
        self.publish();
    }

    pub fn pointer_move(&mut self, pos: Point, modifiers: Modifiers) {
        if self.shut_down {
            return;
        }
        let now = self.clock.now();
        if let Some((pos, modifiers)) = self.move_limiter.submit(now, (pos, modifiers)) {
            self.apply_move(pos, modifiers);
        }
    }

    pub fn pointer_up(&mut self, pos: Point, button: MouseButton, modifiers: Modifiers) {
        if self.shut_down || button != MouseButton::Primary {
            return;
        }
        // The release position wins over any trailing move
        self.move_limiter.cancel();

        match std::mem::take(&mut self.gesture) {
            Gesture::None => {}
            Gesture::Drag(mut drag) => {
                self.switch_drag_mode(&mut drag, pos, modifiers);
                self.apply_drag(&mut drag, pos);
                if drag.before.as_slice() != self.store.entities() {
                    self.history.record(drag.before);
                }
                self.send_hint(CalibrationHint::silence());
                self.commit_now();
            }
            Gesture::Marquee(mut marquee) => {
                marquee.update(pos);
                if marquee.is_click(self.config.interaction.marquee_click_threshold) {
                    self.selection.clear();
                } else {
                    self.selection = marquee.selection(self.store.entities(), &self.viewport);
                }
            }
            Gesture::Volume { .. } => {
                self.drag_volume(pos);
                self.commit_now();
            }
        }

        self.modifiers = modifiers;
        self.update_hover(pos);
        self.publish();
    }

    pub fn pointer_leave(&mut self) {
        if self.shut_down || !matches!(self.gesture, Gesture::None) {
            return;
        }
        self.move_limiter.cancel();
        self.hovered = None;
        self.ghost = None;
        self.state = InteractionState::Idle;
        self.publish();
    }

    /// Modifier change without pointer movement
    pub fn set_modifiers(&mut self, modifiers: Modifiers) {
        if self.shut_down {
            return;
        }
        self.modifiers = modifiers;
        if !matches!(self.gesture, Gesture::Drag(_)) {
            return;
        }
        if let Gesture::Drag(mut drag) = std::mem::take(&mut self.gesture) {
            let pos = drag.last;
            let switched = self.switch_drag_mode(&mut drag, pos, modifiers);
            self.state = drag.state();
            self.gesture = Gesture::Drag(drag);
            if switched {
                self.publish();
            }
        }
    }

    fn apply_move(&mut self, pos: Point, modifiers: Modifiers) {
        self.modifiers = modifiers;
        match std::mem::take(&mut self.gesture) {
            Gesture::None => self.update_hover(pos),
            Gesture::Drag(mut drag) => {
                self.switch_drag_mode(&mut drag, pos, modifiers);
                self.apply_drag(&mut drag, pos);
                self.state = drag.state();
                self.gesture = Gesture::Drag(drag);
            }
            Gesture::Marquee(mut marquee) => {
                marquee.update(pos);
                self.selection = marquee.selection(self.store.entities(), &self.viewport);
                self.gesture = Gesture::Marquee(marquee);
            }
            Gesture::Volume { before } => {
                self.drag_volume(pos);
                self.gesture = Gesture::Volume { before };
            }
        }
        self.publish();
    }

    // ========================================================================
    // GESTURE HELPERS
    // ========================================================================

    fn begin_drag(&mut self, primary: EntityId, pos: Point, before: Vec<Band>) {
        let drag = DragGesture {
            primary,
            snapshot: self.capture(self.selection.iter().chain(std::iter::once(primary))),
            origin: pos,
            last: pos,
            multi: self.selection.is_multi(),
            adjusting_q: self.modifiers.shape(),
            before,
        };
        self.state = drag.state();
        self.hovered = Some(primary);
        self.ghost = None;
        if let Some(band) = self.store.get(primary) {
            let hint = if drag.adjusting_q {
                CalibrationHint::band(band.frequency(), band.q())
            } else {
                CalibrationHint::frequency(band.frequency())
            };
            self.send_hint(hint);
        }
        self.gesture = Gesture::Drag(drag);
    }

    fn capture(&self, ids: impl Iterator<Item = EntityId>) -> BTreeMap<EntityId, BandParams> {
        ids.filter_map(|id| self.store.get(id).map(|b| (id, b.params())))
            .collect()
    }

    /// Rebase the drag when the shape modifier flips; returns whether it did
    fn switch_drag_mode(&mut self, drag: &mut DragGesture, pos: Point, modifiers: Modifiers) -> bool {
        if modifiers.shape() == drag.adjusting_q {
            return false;
        }
        drag.snapshot = self.capture(drag.snapshot.keys().copied());
        drag.origin = pos;
        drag.last = pos;
        drag.adjusting_q = modifiers.shape();
        log::debug!(
            "Drag of {} switched to {}",
            drag.primary,
            if drag.adjusting_q { "Q adjust" } else { "move" }
        );
        true
    }

    fn apply_drag(&mut self, drag: &mut DragGesture, pos: Point) {
        let changed = if drag.adjusting_q {
            self.adjust_q(drag, pos)
        } else {
            self.move_entities(drag, pos)
        };
        drag.last = pos;
        if changed {
            self.entities_changed();
        }
    }

    /// Primary follows the pointer; the rest keep their log-frequency/dB offsets
    fn move_entities(&mut self, drag: &DragGesture, pos: Point) -> bool {
        let Some(start) = drag.snapshot.get(&drag.primary).copied() else {
            return false;
        };
        if !self.store.contains(drag.primary) {
            return false;
        }

        // Back at the grab point: exact snapshot values, no pixel round trip
        let (freq, gain) = if pos == drag.origin {
            (start.frequency, start.gain_db)
        } else {
            let grabbed = self.viewport.to_pixel(start.frequency, start.gain_db);
            let target = Point::new(
                grabbed.x + (pos.x - drag.origin.x),
                grabbed.y + (pos.y - drag.origin.y),
            );
            let (freq, gain) = self.viewport.from_pixel(target);
            (clamp_frequency(freq), clamp_gain(self.viewport.amplitude.clamp(gain)))
        };

        let ratio = freq / start.frequency;
        let delta_gain = gain - start.gain_db;
        let amplitude = self.viewport.amplitude;

        let mut changed = false;
        for (&id, params) in &drag.snapshot {
            changed |= self.store.update(id, |band| {
                band.set_frequency(params.frequency * ratio);
                band.set_gain(amplitude.clamp(params.gain_db + delta_gain));
            });
        }

        if let Some(band) = self.store.get(drag.primary) {
            self.send_hint(CalibrationHint::frequency(band.frequency()));
        }
        changed
    }

    /// Scale every dragged entity's Q by `exp(-dy * scale)`
    fn adjust_q(&mut self, drag: &DragGesture, pos: Point) -> bool {
        let dy = pos.y - drag.last.y;
        if dy == 0.0 {
            return false;
        }
        let multiplier = (-dy * self.config.interaction.q_drag_scale).exp();

        let mut changed = false;
        for &id in drag.snapshot.keys() {
            changed |= self.store.update(id, |band| band.set_q(band.q() * multiplier));
        }

        if let Some(band) = self.store.get(drag.primary) {
            self.send_hint(CalibrationHint::band(band.frequency(), band.q()));
        }
        changed
    }

    fn drag_volume(&mut self, pos: Point) {
        let volume = self.viewport.amplitude.clamp(self.viewport.y_to_gain(pos.y));
        if volume != self.volume {
            self.volume = volume;
            self.mark_dirty();
        }
    }

    fn hits_volume_handle(&self, pos: Point) -> bool {
        let strip = self.config.interaction.volume_strip_width;
        let handle_y = self.viewport.gain_to_y(self.volume);
        pos.x > self.viewport.width
            && pos.x <= self.viewport.width + strip
            && (pos.y - handle_y).abs() <= self.config.interaction.hit_radius
    }

    fn insertion_kind(&self) -> BandKind {
        if self.variant().is_point_based() {
            BandKind::Point
        } else {
            self.config.defaults.kind
        }
    }

    /// Ghost node under `pos` if it is close enough to the insertion line/curve
    fn insertion_target(&self, pos: Point) -> Option<GhostNode> {
        if !self.viewport.contains(pos) {
            return None;
        }
        let frequency = clamp_frequency(self.viewport.x_to_freq(pos.x));
        let gain_db = if self.variant().is_point_based() {
            clamp_gain(self.response_at(frequency))
        } else {
            0.0
        };
        let line_y = self.viewport.gain_to_y(gain_db);
        if (pos.y - line_y).abs() > self.config.interaction.insertion_threshold {
            return None;
        }
        Some(GhostNode {
            frequency,
            gain_db,
            position: Point::new(pos.x, line_y),
        })
    }

    fn update_hover(&mut self, pos: Point) {
        self.hovered = hit_test(
            self.store.entities(),
            &self.viewport,
            pos,
            self.config.interaction.hit_radius,
        );
        if let Some(id) = self.hovered {
            self.ghost = None;
            self.state = InteractionState::HoverEntity(id);
        } else if let Some(ghost) = self.insertion_target(pos) {
            self.ghost = Some(ghost);
            self.state = InteractionState::HoverInsertionLine;
        } else {
            self.ghost = None;
            self.state = InteractionState::Idle;
        }
    }

    fn send_hint(&self, hint: CalibrationHint) {
        if let Some(sink) = &self.calibration {
            sink.hint(hint);
        }
    }

    // ========================================================================
    // KEYBOARD
    // ========================================================================

    pub fn key(&mut self, key: Key) {
        if self.shut_down {
            return;
        }
        match key {
            Key::Delete | Key::Backspace => {
                if matches!(self.gesture, Gesture::None) {
                    self.delete_selection();
                }
            }
            Key::Escape => self.escape(),
            Key::SelectAll => self.select_all(),
            Key::Undo => {
                self.undo();
            }
            Key::Redo => {
                self.redo();
            }
        }
    }

    /// Cancel the active gesture, or clear the selection when idle
    fn escape(&mut self) {
        self.move_limiter.cancel();
        match std::mem::take(&mut self.gesture) {
            Gesture::None => {
                if self.selection.is_empty() {
                    return;
                }
                self.selection.clear();
            }
            Gesture::Drag(drag) => {
                if drag.before.as_slice() != self.store.entities() {
                    self.store.restore(drag.before);
                    self.selection.retain_existing(self.store.entities());
                    self.entities_changed();
                }
                self.send_hint(CalibrationHint::silence());
                self.state = InteractionState::Idle;
            }
            Gesture::Marquee(marquee) => {
                self.selection = marquee.base().clone();
                self.state = InteractionState::Idle;
            }
            Gesture::Volume { before } => {
                if before != self.volume {
                    self.volume = before;
                    self.mark_dirty();
                }
                self.state = InteractionState::Idle;
            }
        }
        self.hovered = None;
        self.ghost = None;
        self.publish();
    }

    // ========================================================================
    // ENTITY API
    // ========================================================================

    /// Add an entity; `kind` defaults per variant. `None` once the limit is reached.
    pub fn add_entity(&mut self, frequency: f64, gain_db: f64, q: f64, kind: Option<BandKind>) -> Option<EntityId> {
        if self.shut_down {
            return None;
        }
        let before = self.store.snapshot();
        let kind = kind.unwrap_or_else(|| self.insertion_kind());
        let id = self.store.add(kind, BandParams::new(frequency, gain_db, q))?;
        self.history.record(before);
        self.entities_changed();
        self.publish();
        Some(id)
    }

    pub fn delete_entity(&mut self, id: EntityId) -> bool {
        self.delete_entities(&[id]) > 0
    }

    /// Delete every listed id that exists; missing ids are ignored
    pub fn delete_entities(&mut self, ids: &[EntityId]) -> usize {
        if self.shut_down {
            return 0;
        }
        let before = self.store.snapshot();
        let removed = self.store.remove_many(ids);
        if removed == 0 {
            return 0;
        }
        log::debug!("Deleted {} entities", removed);
        self.history.record(before);
        self.selection.retain_existing(self.store.entities());
        if self.hovered.is_some_and(|id| !self.store.contains(id)) {
            self.hovered = None;
            self.state = InteractionState::Idle;
        }
        self.entities_changed();
        self.publish();
        removed
    }

    pub fn delete_selection(&mut self) -> usize {
        let ids = self.selection.ids();
        self.delete_entities(&ids)
    }

    /// Overwrite an entity's parameters (clamped)
    pub fn update_entity(&mut self, id: EntityId, params: BandParams) -> bool {
        self.edit_entity(id, |band| band.set_params(params))
    }

    pub fn set_kind(&mut self, id: EntityId, kind: BandKind) -> bool {
        self.edit_entity(id, |band| band.set_kind(kind))
    }

    fn edit_entity(&mut self, id: EntityId, f: impl FnOnce(&mut Band)) -> bool {
        if self.shut_down {
            return false;
        }
        let before = self.store.snapshot();
        if !self.store.update(id, f) || before.as_slice() == self.store.entities() {
            return false;
        }
        self.history.record(before);
        self.entities_changed();
        self.publish();
        true
    }

    pub fn set_curve_settings(&mut self, curve: CurveSettings) {
        if self.shut_down {
            return;
        }
        let curve = CurveSettings::new(curve.shape, curve.resonance);
        if curve == self.curve {
            return;
        }
        self.curve = curve;
        self.entities_changed();
        self.publish();
    }

    /// Set the output volume (dB, clamped to the amplitude range)
    pub fn set_volume(&mut self, volume: f64) {
        if self.shut_down {
            return;
        }
        let volume = self.viewport.amplitude.clamp(if volume.is_nan() { 0.0 } else { volume });
        if volume == self.volume {
            return;
        }
        self.volume = volume;
        self.mark_dirty();
        self.publish();
    }

    // ========================================================================
    // SELECTION API
    // ========================================================================

    pub fn select_all(&mut self) {
        if self.shut_down {
            return;
        }
        self.selection.select_all(self.store.entities());
        self.publish();
    }

    pub fn clear_selection(&mut self) {
        if self.shut_down || self.selection.is_empty() {
            return;
        }
        self.selection.clear();
        self.publish();
    }

    /// Replace the selection; ids that do not exist are dropped
    pub fn select(&mut self, ids: &[EntityId]) {
        if self.shut_down {
            return;
        }
        self.selection.replace(ids.iter().copied().filter(|id| self.store.contains(*id)));
        self.publish();
    }

    // ========================================================================
    // HISTORY
    // ========================================================================

    pub fn undo(&mut self) -> bool {
        if self.shut_down || !matches!(self.gesture, Gesture::None) {
            return false;
        }
        match self.history.undo(self.store.snapshot()) {
            Some(previous) => {
                self.restore_entities(previous);
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        if self.shut_down || !matches!(self.gesture, Gesture::None) {
            return false;
        }
        match self.history.redo(self.store.snapshot()) {
            Some(next) => {
                self.restore_entities(next);
                true
            }
            None => false,
        }
    }

    fn restore_entities(&mut self, entities: Vec<Band>) {
        self.store.restore(entities);
        self.selection.retain_existing(self.store.entities());
        if self.hovered.is_some_and(|id| !self.store.contains(id)) {
            self.hovered = None;
            self.state = InteractionState::Idle;
        }
        self.entities_changed();
        self.publish();
    }

    // ========================================================================
    // PROFILES & VIEWPORT
    // ========================================================================

    /// Switch to another profile; a missing or unreadable one starts empty
    pub fn load_profile(&mut self, profile_id: &str) {
        if self.shut_down {
            return;
        }
        self.commit_now();

        let data = match &self.repository {
            Some(repo) => match repo.load(profile_id) {
                Ok(Some(data)) => data,
                Ok(None) => {
                    log::warn!("Profile {} not found, starting empty", profile_id);
                    ProfileData::default()
                }
                Err(e) => {
                    log::warn!("Failed to load profile {}: {}, starting empty", profile_id, e);
                    ProfileData::default()
                }
            },
            None => {
                log::warn!("No profile repository, starting {} empty", profile_id);
                ProfileData::default()
            }
        };

        self.gesture = Gesture::None;
        self.move_limiter.reset();
        self.commit.cancel();
        self.dirty = false;
        self.history.clear();

        self.store.replace_all(&data.entities);
        self.selection.clear();
        self.hovered = None;
        self.ghost = None;
        self.state = InteractionState::Idle;
        self.volume = self.viewport.amplitude.clamp(if data.volume.is_nan() { 0.0 } else { data.volume });
        self.curve = data
            .curve
            .map(|c| CurveSettings::new(c.shape, c.resonance))
            .unwrap_or_default();
        self.profile_id = Some(profile_id.to_string());

        log::info!("Loaded profile {} ({} entities)", profile_id, self.store.len());
        self.refresh_curve();
        self.publish();
    }

    /// New viewport size in pixels
    pub fn resize(&mut self, width: f64, height: f64) {
        if self.shut_down {
            return;
        }
        self.viewport.width = width.max(0.0);
        self.viewport.height = height.max(0.0);
        self.ghost = None;
        self.publish();
    }

    // ========================================================================
    // TIMING & COMMIT
    // ========================================================================

    /// Apply a due trailing move and a due debounced commit
    pub fn tick(&mut self) {
        if self.shut_down {
            return;
        }
        let now = self.clock.now();
        if let Some((pos, modifiers)) = self.move_limiter.poll(now) {
            self.apply_move(pos, modifiers);
        }
        if self.commit.poll(now) {
            self.commit_profile();
        }
    }

    /// Write pending changes now instead of waiting for the debounce
    pub fn commit_now(&mut self) {
        self.commit.flush();
        self.commit_profile();
    }

    fn commit_profile(&mut self) {
        if !self.dirty {
            return;
        }
        let (Some(repo), Some(profile_id)) = (&self.repository, &self.profile_id) else {
            self.dirty = false;
            return;
        };
        match repo.save(profile_id, &self.profile_data()) {
            Ok(()) => {
                log::debug!("Committed profile {}", profile_id);
                self.dirty = false;
            }
            Err(e) => {
                log::warn!("Failed to save profile {}: {}", profile_id, e);
                // Retry after another debounce period
                self.commit.trigger(self.clock.now());
            }
        }
    }

    fn mark_dirty(&mut self) {
        self.dirty = true;
        self.commit.trigger(self.clock.now());
    }

    fn entities_changed(&mut self) {
        self.refresh_curve();
        self.mark_dirty();
    }

    fn anchor_point(&self) -> Option<ControlPoint> {
        self.store
            .anchor()
            .map(|a| ControlPoint::new(a.frequency, a.gain_db))
    }

    fn refresh_curve(&mut self) {
        self.response_curve = self.response.compute(
            self.config.variant,
            self.store.entities(),
            self.anchor_point(),
            &self.curve,
        );
    }

    /// Drop pending moves and writes and detach observers
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.shut_down = true;
        self.move_limiter.cancel();
        self.commit.cancel();
        self.gesture = Gesture::None;
        self.observers.clear();
        log::debug!("Interaction engine shut down");
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }
}

impl Drop for InteractionEngine {
    fn drop(&mut self) {
        self.shutdown();
    }
}
