//! Snapshot undo/redo
//!
//! Every recorded step stores the full state from before the change. States
//! here are small (a few dozen entities), so snapshots beat command objects.

use std::collections::VecDeque;

/// Undo/redo stacks of state snapshots
#[derive(Debug, Clone)]
pub struct UndoHistory<T> {
    undo_stack: VecDeque<T>,
    redo_stack: Vec<T>,
    max_history: usize,
}

impl<T> UndoHistory<T> {
    pub fn new(max_history: usize) -> Self {
        Self {
            undo_stack: VecDeque::with_capacity(max_history.min(256)),
            redo_stack: Vec::new(),
            max_history,
        }
    }

    /// Record the state from before a change
    pub fn record(&mut self, before: T) {
        if self.max_history == 0 {
            return;
        }

        // Enforce max history
        while self.undo_stack.len() >= self.max_history {
            self.undo_stack.pop_front();
        }

        self.undo_stack.push_back(before);
        self.redo_stack.clear();
    }

    /// Step back; `current` becomes the redo target
    pub fn undo(&mut self, current: T) -> Option<T> {
        let previous = self.undo_stack.pop_back()?;
        self.redo_stack.push(current);
        Some(previous)
    }

    /// Step forward; `current` becomes the undo target
    pub fn redo(&mut self, current: T) -> Option<T> {
        let next = self.redo_stack.pop()?;
        self.undo_stack.push_back(current);
        Some(next)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_undo_redo() {
        let mut history = UndoHistory::new(10);
        let mut value = 0;

        for next in 1..=3 {
            history.record(value);
            value = next;
        }
        assert_eq!(history.undo_count(), 3);

        value = history.undo(value).unwrap();
        assert_eq!(value, 2);
        value = history.undo(value).unwrap();
        assert_eq!(value, 1);
        assert!(history.can_redo());

        value = history.redo(value).unwrap();
        assert_eq!(value, 2);
        assert_eq!(history.redo_count(), 1);
    }

    #[test]
    fn test_record_clears_redo() {
        let mut history = UndoHistory::new(10);
        history.record(0);
        let value = history.undo(1).unwrap();
        assert!(history.can_redo());
        history.record(value);
        assert!(!history.can_redo());
    }

    #[test]
    fn test_max_history() {
        let mut history = UndoHistory::new(3);
        for v in 0..10 {
            history.record(v);
        }
        assert_eq!(history.undo_count(), 3);
        let mut current = 10;
        let mut seen = Vec::new();
        while let Some(prev) = history.undo(current) {
            seen.push(prev);
            current = prev;
        }
        assert_eq!(seen, vec![9, 8, 7]);
    }

    #[test]
    fn test_empty_stacks() {
        let mut history: UndoHistory<u8> = UndoHistory::new(5);
        assert_eq!(history.undo(1), None);
        assert_eq!(history.redo(1), None);
        assert_eq!(history.redo_count(), 0);
    }
}
