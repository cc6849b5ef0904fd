//! Render surface seam.

use crate::identity::RowId;
use crate::model::Record;

/// One row handed to the render surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderedRow<'a> {
    /// Position in the full current view, not in the rendered window.
    pub index: usize,
    /// Identity of the record.
    pub row_id: &'a RowId,
    /// The record itself.
    pub record: &'a Record,
    /// Whether the row is selected.
    pub selected: bool,
}

/// Whatever materializes rows (DOM, terminal, canvas).
///
/// The surface only receives the rendered window. It reports scroll, resize
/// and pointer input back through the grid.
pub trait RenderSurface {
    /// Measures the height of one rendered sample row.
    ///
    /// Returns `None` while nothing has been rendered yet. The renderer calls
    /// this until it gets a measurement and caches the first one it gets.
    fn measure_row_height(&self) -> Option<f64>;

    /// Materializes `rows`, the first of which sits at `range_start` in the
    /// full view. `spacer_before`/`spacer_after` size the placeholders that
    /// keep the scroll extent equal to the full dataset.
    fn render(&mut self, rows: &[RenderedRow<'_>], range_start: usize, spacer_before: f64, spacer_after: f64);
}
