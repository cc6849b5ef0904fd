//! Drag-range selection.
//!
//! A pointer-down only records where the gesture started. The gesture turns
//! into a drag once the pointer has moved past the threshold; until then a
//! release is an ordinary click. Click and drag are told apart by distance,
//! not by event type.

use std::collections::HashSet;

use super::Modifiers;
use super::SelectionChange;
use super::SelectionMode;
use super::SelectionTracker;
use crate::identity::RowId;

/// Pointer distance (in logical units) before a press becomes a drag.
pub const DEFAULT_DRAG_THRESHOLD: f64 = 5.0;

/// A pointer position in render-surface coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PointerPosition {
    pub x: f64,
    pub y: f64,
}

impl PointerPosition {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    fn distance(&self, other: &PointerPosition) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// In-progress gesture, started by a pointer-down.
#[derive(Debug, Clone)]
pub(super) struct DragState {
    origin: RowId,
    origin_position: PointerPosition,
    modifiers: Modifiers,
    snapshot: HashSet<RowId>,
    pub(super) dragging: bool,
}

impl SelectionTracker {
    /// Starts a gesture on row `id`.
    ///
    /// Nothing is selected yet. Ignored when selection is disabled or `id`
    /// is not in the view.
    pub fn pointer_down(
        &mut self,
        id: &RowId,
        position: PointerPosition,
        modifiers: Modifiers,
        view: &[RowId],
    ) {
        if self.mode == SelectionMode::None || !view.contains(id) {
            self.drag = None;
            return;
        }
        self.drag = Some(DragState {
            origin: id.clone(),
            origin_position: position,
            modifiers,
            snapshot: self.selected.clone(),
            dragging: false,
        });
    }

    /// Moves the pointer over row `id`.
    ///
    /// Once past the threshold (multi mode only) the selection becomes the
    /// snapshot taken at pointer-down plus every row between the origin and
    /// `id`, recomputed on every move.
    pub fn pointer_move(
        &mut self,
        id: &RowId,
        position: PointerPosition,
        view: &[RowId],
    ) -> SelectionChange {
        let threshold = self.drag_threshold;
        let multi = self.mode == SelectionMode::Multi;
        let Some(drag) = self.drag.as_mut() else {
            return SelectionChange::default();
        };

        let mut anchor_changed = false;
        if !drag.dragging {
            if !multi || drag.origin_position.distance(&position) < threshold {
                return SelectionChange::default();
            }
            drag.dragging = true;
            log::trace!("drag selection started at row {}", drag.origin);
        }

        let origin_pos = view.iter().position(|r| *r == drag.origin);
        let current_pos = view.iter().position(|r| r == id);
        let (Some(a), Some(b)) = (origin_pos, current_pos) else {
            return SelectionChange::default();
        };

        let mut next = drag.snapshot.clone();
        next.extend(view[a.min(b)..=a.max(b)].iter().cloned());

        let origin = drag.origin.clone();
        if self.anchor.as_ref() != Some(&origin) {
            self.anchor = Some(origin);
            anchor_changed = true;
        }

        let mut change = self.replace_with(next);
        change.anchor_changed = anchor_changed;
        change
    }

    /// Ends the gesture.
    ///
    /// If it never became a drag, the press is handled as a click on the
    /// origin row with the modifiers held at pointer-down.
    pub fn pointer_up(&mut self, view: &[RowId]) -> SelectionChange {
        match self.drag.take() {
            Some(drag) if !drag.dragging => self.click(&drag.origin, drag.modifiers, view),
            _ => SelectionChange::default(),
        }
    }

    /// Abandons a gesture without applying a click.
    pub fn cancel_drag(&mut self) {
        self.drag = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view() -> Vec<RowId> {
        (1..=8).map(|i| RowId::new(i.to_string())).collect()
    }

    fn id(v: &str) -> RowId {
        RowId::from(v)
    }

    #[test]
    fn test_release_without_movement_is_click() {
        let mut sel = SelectionTracker::new(SelectionMode::Multi);
        let view = view();
        sel.pointer_down(&id("3"), PointerPosition::new(0.0, 60.0), Modifiers::NONE, &view);
        sel.pointer_move(&id("3"), PointerPosition::new(1.0, 62.0), &view);
        assert!(sel.is_empty());

        sel.pointer_up(&view);
        assert_eq!(sel.selected(), vec![id("3")]);
    }

    #[test]
    fn test_drag_unions_with_snapshot() {
        let mut sel = SelectionTracker::new(SelectionMode::Multi);
        let view = view();
        sel.click(&id("1"), Modifiers::NONE, &view);

        sel.pointer_down(&id("4"), PointerPosition::new(0.0, 100.0), Modifiers::NONE, &view);
        sel.pointer_move(&id("6"), PointerPosition::new(0.0, 150.0), &view);
        assert!(sel.is_dragging());
        assert_eq!(sel.selected(), vec![id("1"), id("4"), id("5"), id("6")]);

        // Moving back shrinks the range but keeps the snapshot
        let change = sel.pointer_move(&id("5"), PointerPosition::new(0.0, 125.0), &view);
        assert_eq!(change.removed, vec![id("6")]);
        assert_eq!(sel.selected(), vec![id("1"), id("4"), id("5")]);

        // Dragging upward past the origin
        sel.pointer_move(&id("2"), PointerPosition::new(0.0, 40.0), &view);
        assert_eq!(sel.selected(), vec![id("1"), id("2"), id("3"), id("4")]);

        assert!(sel.pointer_up(&view).is_empty());
        assert!(!sel.is_dragging());
        assert_eq!(sel.anchor(), Some(&id("4")));
    }

    #[test]
    fn test_single_mode_never_drags() {
        let mut sel = SelectionTracker::new(SelectionMode::Single);
        let view = view();
        sel.pointer_down(&id("2"), PointerPosition::new(0.0, 0.0), Modifiers::NONE, &view);
        sel.pointer_move(&id("5"), PointerPosition::new(0.0, 200.0), &view);
        assert!(!sel.is_dragging());
        sel.pointer_up(&view);
        assert_eq!(sel.selected(), vec![id("2")]);
    }

    #[test]
    fn test_reset_cancels_drag() {
        let mut sel = SelectionTracker::new(SelectionMode::Multi);
        let view = view();
        sel.pointer_down(&id("2"), PointerPosition::new(0.0, 0.0), Modifiers::NONE, &view);
        sel.pointer_move(&id("4"), PointerPosition::new(0.0, 90.0), &view);
        sel.reset();
        assert!(!sel.is_dragging());
        assert!(sel.pointer_up(&view).is_empty());
        assert!(sel.is_empty());
    }
}
