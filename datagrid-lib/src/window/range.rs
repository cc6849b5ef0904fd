//! Viewport math.
//!
//! Pure functions over plain numbers: no render surface is involved, so the
//! whole windowing computation is testable on its own.

/// Scroll position and extent of the render surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportState {
    /// Distance scrolled from the top, in logical units.
    pub scroll_offset: f64,
    /// Height of the visible container, in logical units.
    pub container_height: f64,
    /// Row height used until a row has been measured.
    pub estimated_row_height: f64,
}

impl Default for ViewportState {
    fn default() -> Self {
        Self {
            scroll_offset: 0.0,
            container_height: 0.0,
            estimated_row_height: super::MIN_ROW_HEIGHT,
        }
    }
}

/// Indices into the current record view that are visible and rendered.
///
/// Always satisfies `rendered_start <= visible_start <= visible_end <=
/// rendered_end`. The visible part covers the viewport; the rendered part
/// adds `buffer` rows on both sides.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VisibleRange {
    pub rendered_start: usize,
    pub rendered_end: usize,
    pub visible_start: usize,
    pub visible_end: usize,
}

impl VisibleRange {
    /// Computes the range for `total_rows` rows of height `row_height`.
    ///
    /// An unusable container height or row height (zero, negative, NaN)
    /// degrades to the buffer-only window at index 0.
    pub fn compute(viewport: &ViewportState, row_height: f64, total_rows: usize, buffer: usize) -> Self {
        if total_rows == 0 {
            return Self::default();
        }

        let usable = row_height.is_finite()
            && row_height > 0.0
            && viewport.container_height.is_finite()
            && viewport.container_height > 0.0;
        if !usable {
            return Self {
                rendered_start: 0,
                rendered_end: buffer.min(total_rows),
                visible_start: 0,
                visible_end: 0,
            };
        }

        let offset = if viewport.scroll_offset.is_finite() {
            viewport.scroll_offset.max(0.0)
        } else {
            0.0
        };

        // Float-to-int casts saturate
        let visible_count = (viewport.container_height / row_height).ceil() as usize;
        let visible_start = ((offset / row_height).floor() as usize).min(total_rows - 1);
        let visible_end = visible_start.saturating_add(visible_count).min(total_rows);

        Self {
            rendered_start: visible_start.saturating_sub(buffer),
            rendered_end: visible_end.saturating_add(buffer).min(total_rows),
            visible_start,
            visible_end,
        }
    }

    /// Number of rows to materialize.
    pub fn rendered_len(&self) -> usize {
        self.rendered_end - self.rendered_start
    }

    /// Number of rows inside the viewport.
    pub fn visible_len(&self) -> usize {
        self.visible_end - self.visible_start
    }

    /// Returns `true` if nothing is rendered.
    pub fn is_empty(&self) -> bool {
        self.rendered_len() == 0
    }

    /// Returns `true` if `index` is materialized.
    pub fn contains(&self, index: usize) -> bool {
        index >= self.rendered_start && index < self.rendered_end
    }

    /// Height of the placeholder before the rendered rows.
    pub fn spacer_before(&self, row_height: f64) -> f64 {
        self.rendered_start as f64 * row_height
    }

    /// Height of the placeholder after the rendered rows.
    pub fn spacer_after(&self, row_height: f64, total_rows: usize) -> f64 {
        total_rows.saturating_sub(self.rendered_end) as f64 * row_height
    }
}
