//! Input events

use ce_core::Point;

/// Pointer button
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Primary,
    Secondary,
    Middle,
}

/// Keyboard modifier state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    pub const SHIFT: Self = Self {
        shift: true,
        ..Self::NONE
    };

    pub const CTRL: Self = Self {
        ctrl: true,
        ..Self::NONE
    };

    pub const META: Self = Self {
        meta: true,
        ..Self::NONE
    };

    /// Toggle-selection modifier (ctrl, or cmd on macOS)
    pub fn selection(&self) -> bool {
        self.ctrl || self.meta
    }

    /// Q-adjust modifier
    pub fn shape(&self) -> bool {
        self.shift
    }
}

/// Pointer input in viewport pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down {
        position: Point,
        button: MouseButton,
        modifiers: Modifiers,
    },
    Move {
        position: Point,
        modifiers: Modifiers,
    },
    Up {
        position: Point,
        button: MouseButton,
        modifiers: Modifiers,
    },
    Leave,
}

/// Keyboard commands the engine reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Delete,
    Backspace,
    Escape,
    SelectAll,
    Undo,
    Redo,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modifier_roles() {
        assert!(Modifiers::CTRL.selection());
        assert!(Modifiers::META.selection());
        assert!(!Modifiers::SHIFT.selection());
        assert!(Modifiers::SHIFT.shape());
        assert!(!Modifiers::NONE.shape());
        assert_eq!(Modifiers::default(), Modifiers::NONE);
    }
}
