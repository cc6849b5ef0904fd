//! Row selection tracking.
//!
//! Selection is keyed by [`RowId`] only. Positional indices coming from the
//! render surface are translated to ids at the boundary and never stored, so
//! a selection survives re-sorting, re-filtering and re-paging of the same
//! logical records.

mod drag;

use std::collections::HashSet;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::identity::RowId;

pub use drag::PointerPosition;
pub use drag::DEFAULT_DRAG_THRESHOLD;

use drag::DragState;

/// Selection mode for the grid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum SelectionMode {
    /// No selection allowed
    #[default]
    None,
    /// Single row selection
    Single,
    /// Multiple rows (toggle-click, range-click, drag)
    Multi,
}

impl SelectionMode {
    /// Returns the canonical name of this mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            SelectionMode::None => "none",
            SelectionMode::Single => "single",
            SelectionMode::Multi => "multi",
        }
    }
}

impl FromStr for SelectionMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "" => Ok(SelectionMode::None),
            "single" => Ok(SelectionMode::Single),
            "multi" | "multiple" => Ok(SelectionMode::Multi),
            _ => Err(ConfigError::InvalidSelectionMode(s.to_string())),
        }
    }
}

impl TryFrom<String> for SelectionMode {
    type Error = ConfigError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Keyboard modifiers held during a click.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    /// Toggle membership (Ctrl/Cmd).
    pub toggle: bool,
    /// Extend from the anchor (Shift).
    pub range: bool,
}

impl Modifiers {
    /// No modifiers.
    pub const NONE: Modifiers = Modifiers {
        toggle: false,
        range: false,
    };

    /// Toggle modifier only.
    pub const TOGGLE: Modifiers = Modifiers {
        toggle: true,
        range: false,
    };

    /// Range modifier only.
    pub const RANGE: Modifiers = Modifiers {
        toggle: false,
        range: true,
    };
}

/// The effect of one selection mutation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionChange {
    /// Ids that became selected, sorted.
    pub added: Vec<RowId>,
    /// Ids that were deselected, sorted.
    pub removed: Vec<RowId>,
    /// Whether the anchor moved.
    pub anchor_changed: bool,
}

impl SelectionChange {
    /// Returns `true` if neither the set nor the anchor changed.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && !self.anchor_changed
    }

    fn sorted(mut added: Vec<RowId>, mut removed: Vec<RowId>, anchor_changed: bool) -> Self {
        added.sort();
        removed.sort();
        Self {
            added,
            removed,
            anchor_changed,
        }
    }
}

/// Owns the set of selected row ids and the range anchor.
///
/// Every operation takes the ordered ids of the full current view. Ids not in
/// that view, and any operation while the mode is [`SelectionMode::None`],
/// are silently ignored.
#[derive(Debug, Clone)]
pub struct SelectionTracker {
    mode: SelectionMode,
    selected: HashSet<RowId>,
    anchor: Option<RowId>,
    drag: Option<DragState>,
    drag_threshold: f64,
}

impl Default for SelectionTracker {
    fn default() -> Self {
        Self::new(SelectionMode::None)
    }
}

impl SelectionTracker {
    /// Creates an empty tracker in the given mode.
    pub fn new(mode: SelectionMode) -> Self {
        Self {
            mode,
            selected: HashSet::new(),
            anchor: None,
            drag: None,
            drag_threshold: DEFAULT_DRAG_THRESHOLD,
        }
    }

    /// Sets the pointer distance a drag must travel before it starts.
    pub fn with_drag_threshold(mut self, threshold: f64) -> Self {
        self.drag_threshold = threshold.max(0.0);
        self
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    /// Returns the selection mode.
    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    /// Returns all selected ids, sorted for deterministic ordering.
    pub fn selected(&self) -> Vec<RowId> {
        let mut ids: Vec<_> = self.selected.iter().cloned().collect();
        ids.sort();
        ids
    }

    /// Checks if an id is selected.
    pub fn is_selected(&self, id: &RowId) -> bool {
        self.selected.contains(id)
    }

    /// Returns the number of selected rows.
    pub fn len(&self) -> usize {
        self.selected.len()
    }

    /// Returns `true` if nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Returns the anchor used for range selection.
    pub fn anchor(&self) -> Option<&RowId> {
        self.anchor.as_ref()
    }

    /// Returns `true` while a drag gesture has passed its threshold.
    pub fn is_dragging(&self) -> bool {
        self.drag.as_ref().is_some_and(|d| d.dragging)
    }

    // -------------------------------------------------------------------------
    // Mutation
    // -------------------------------------------------------------------------

    /// Changes the selection mode, clearing the selection when it changes.
    pub fn set_mode(&mut self, mode: SelectionMode) -> SelectionChange {
        if mode == self.mode {
            return SelectionChange::default();
        }
        self.mode = mode;
        self.reset()
    }

    /// Clears the selection, the anchor and any drag in progress.
    ///
    /// Called when the dataset is replaced wholesale.
    pub fn reset(&mut self) -> SelectionChange {
        self.drag = None;
        let anchor_changed = self.anchor.take().is_some();
        let removed: Vec<_> = self.selected.drain().collect();
        SelectionChange::sorted(Vec::new(), removed, anchor_changed)
    }

    /// Clears the selection (user-initiated deselect all).
    pub fn clear(&mut self) -> SelectionChange {
        if self.mode == SelectionMode::None {
            return SelectionChange::default();
        }
        self.reset()
    }

    /// Handles a click on the row `id`.
    ///
    /// - Single mode: selects only `id`, or clears if `id` was the selection.
    /// - Multi mode, plain: selects only `id` and makes it the anchor.
    /// - Multi mode, toggle: flips `id`.
    /// - Multi mode, range: adds every id between the anchor and `id`
    ///   (inclusive, in view order) without moving the anchor. Without an
    ///   anchor this is a plain click.
    pub fn click(&mut self, id: &RowId, modifiers: Modifiers, view: &[RowId]) -> SelectionChange {
        if self.mode == SelectionMode::None || !view.contains(id) {
            return SelectionChange::default();
        }

        match self.mode {
            SelectionMode::None => SelectionChange::default(),
            SelectionMode::Single => {
                if self.selected.contains(id) {
                    self.reset()
                } else {
                    self.select_only(id)
                }
            }
            SelectionMode::Multi => {
                if modifiers.range && self.anchor.is_some() {
                    self.range_select(id, view)
                } else if modifiers.toggle {
                    self.toggle(id)
                } else {
                    self.select_only(id)
                }
            }
        }
    }

    /// Selects every id in the view (multi mode only).
    pub fn select_all(&mut self, view: &[RowId]) -> SelectionChange {
        if self.mode != SelectionMode::Multi {
            return SelectionChange::default();
        }
        let added: Vec<_> = view
            .iter()
            .filter(|id| self.selected.insert((*id).clone()))
            .cloned()
            .collect();
        SelectionChange::sorted(added, Vec::new(), false)
    }

    /// Drops selected ids that no longer appear in the view.
    ///
    /// Ids that merely moved to another position or page are kept. If the
    /// anchor vanished it is reassigned to a remaining member, or cleared.
    pub fn revalidate(&mut self, view: &[RowId]) -> SelectionChange {
        if self.selected.is_empty() && self.anchor.is_none() {
            return SelectionChange::default();
        }
        let present: HashSet<&RowId> = view.iter().collect();
        let removed: Vec<_> = self
            .selected
            .iter()
            .filter(|id| !present.contains(id))
            .cloned()
            .collect();
        for id in &removed {
            self.selected.remove(id);
        }

        let anchor_changed = match &self.anchor {
            Some(anchor) if !present.contains(anchor) => {
                self.anchor = self.fallback_anchor();
                true
            }
            _ => false,
        };

        if !removed.is_empty() {
            log::debug!("selection revalidated: dropped {} vanished rows", removed.len());
        }
        SelectionChange::sorted(Vec::new(), removed, anchor_changed)
    }

    fn select_only(&mut self, id: &RowId) -> SelectionChange {
        let removed: Vec<_> = self.selected.iter().filter(|&i| i != id).cloned().collect();
        let was_selected = self.selected.contains(id);
        self.selected.clear();
        self.selected.insert(id.clone());
        let anchor_changed = self.anchor.as_ref() != Some(id);
        self.anchor = Some(id.clone());
        let added = if was_selected { vec![] } else { vec![id.clone()] };
        SelectionChange::sorted(added, removed, anchor_changed)
    }

    fn toggle(&mut self, id: &RowId) -> SelectionChange {
        if self.selected.remove(id) {
            let anchor_changed = self.anchor.as_ref() == Some(id);
            if anchor_changed {
                self.anchor = self.fallback_anchor();
            }
            SelectionChange::sorted(vec![], vec![id.clone()], anchor_changed)
        } else {
            self.selected.insert(id.clone());
            let anchor_changed = self.anchor.as_ref() != Some(id);
            self.anchor = Some(id.clone());
            SelectionChange::sorted(vec![id.clone()], vec![], anchor_changed)
        }
    }

    fn range_select(&mut self, target: &RowId, view: &[RowId]) -> SelectionChange {
        let Some(anchor) = self.anchor.clone() else {
            return self.select_only(target);
        };
        let anchor_pos = view.iter().position(|id| *id == anchor);
        let target_pos = view.iter().position(|id| id == target);

        let (start, end) = match (anchor_pos, target_pos) {
            (Some(a), Some(t)) => (a.min(t), a.max(t)),
            // Anchor left the view; fall back to a plain click
            _ => return self.select_only(target),
        };

        let added: Vec<_> = view[start..=end]
            .iter()
            .filter(|id| self.selected.insert((*id).clone()))
            .cloned()
            .collect();
        SelectionChange::sorted(added, Vec::new(), false)
    }

    fn fallback_anchor(&self) -> Option<RowId> {
        self.selected.iter().min().cloned()
    }

    /// Replaces the set with `next`, reporting the difference.
    fn replace_with(&mut self, next: HashSet<RowId>) -> SelectionChange {
        let added: Vec<_> = next.difference(&self.selected).cloned().collect();
        let removed: Vec<_> = self.selected.difference(&next).cloned().collect();
        self.selected = next;
        SelectionChange::sorted(added, removed, false)
    }
}
