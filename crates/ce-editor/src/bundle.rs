//! Render bundle handed to the painter

use ce_core::{Band, EntityId, EqVariant, Point, Rect};
use ce_dsp::ResponseCurve;
use ce_state::ReferenceAnchor;

/// Interaction state machine position
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum InteractionState {
    #[default]
    Idle,
    HoverEntity(EntityId),
    HoverInsertionLine,
    DraggingSingle(EntityId),
    DraggingMulti {
        primary: EntityId,
    },
    AdjustingQ {
        primary: EntityId,
        multi: bool,
    },
    MarqueeSelecting,
    DraggingVolume,
}

impl InteractionState {
    /// Entity under an active drag or Q adjustment
    pub fn dragging_id(&self) -> Option<EntityId> {
        match *self {
            Self::DraggingSingle(id) => Some(id),
            Self::DraggingMulti { primary } | Self::AdjustingQ { primary, .. } => Some(primary),
            _ => None,
        }
    }
}

/// Preview of the entity an insertion click would create
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GhostNode {
    pub frequency: f64,
    pub gain_db: f64,
    /// Pixel position on the insertion line or curve
    pub position: Point,
}

/// Everything the painter needs for one frame
#[derive(Debug, Clone)]
pub struct RenderBundle {
    /// Increases with every published change
    pub version: u64,
    pub variant: EqVariant,
    pub entities: Vec<Band>,
    pub anchor: Option<ReferenceAnchor>,
    pub response_curve: ResponseCurve,
    /// Selected ids in ascending order
    pub selection: Vec<EntityId>,
    pub hovered_id: Option<EntityId>,
    pub dragging_id: Option<EntityId>,
    pub ghost_node: Option<GhostNode>,
    pub marquee_rect: Option<Rect>,
    /// Output volume (dB)
    pub volume: f64,
    pub state: InteractionState,
}

impl RenderBundle {
    pub fn is_selected(&self, id: EntityId) -> bool {
        self.selection.binary_search(&id).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dragging_id() {
        let id = EntityId(4);
        assert_eq!(InteractionState::DraggingSingle(id).dragging_id(), Some(id));
        assert_eq!(
            InteractionState::AdjustingQ { primary: id, multi: true }.dragging_id(),
            Some(id)
        );
        assert_eq!(InteractionState::HoverEntity(id).dragging_id(), None);
    }
}
