//! Windowed (virtualized) rendering.
//!
//! Maps a record view of any length plus the viewport to the small range of
//! rows that actually has to be materialized. Rendered window size is
//! O(viewport), never O(data).

mod range;
mod schedule;
mod surface;

use std::time::Instant;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::identity::RowId;
use crate::model::Record;
use crate::selection::SelectionTracker;

pub use range::ViewportState;
pub use range::VisibleRange;
pub use schedule::FrameScheduler;
pub use schedule::ScheduleDecision;
pub use schedule::DEFAULT_VELOCITY_THRESHOLD;
pub use surface::RenderSurface;
pub use surface::RenderedRow;

/// Lower bound applied to measured row heights.
pub const MIN_ROW_HEIGHT: f64 = 25.0;

/// Default number of extra rows rendered on each side of the viewport.
pub const DEFAULT_BUFFER: usize = 5;

/// Configuration for the windowed renderer.
///
/// # Example
///
/// ```
/// use datagrid_lib::window::WindowConfig;
///
/// let config = WindowConfig::default()
///     .with_row_height(32.0)
///     .with_buffer(10);
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WindowConfig {
    /// Fixed row height. When unset, one rendered row is measured.
    pub row_height: Option<f64>,

    /// Extra rows rendered above and below the viewport.
    ///
    /// Default: 5
    pub buffer: usize,

    /// Scroll velocity (units/ms) above which updates skip the frame wait.
    ///
    /// Default: 2.0
    pub velocity_threshold: f64,

    /// Lower bound for measured row heights.
    ///
    /// Default: 25.0
    pub min_row_height: f64,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            row_height: None,
            buffer: DEFAULT_BUFFER,
            velocity_threshold: DEFAULT_VELOCITY_THRESHOLD,
            min_row_height: MIN_ROW_HEIGHT,
        }
    }
}

impl WindowConfig {
    /// Sets a fixed row height.
    pub fn with_row_height(mut self, height: f64) -> Self {
        self.row_height = Some(height);
        self
    }

    /// Sets the buffer row count.
    pub fn with_buffer(mut self, buffer: usize) -> Self {
        self.buffer = buffer;
        self
    }

    /// Sets the velocity threshold.
    pub fn with_velocity_threshold(mut self, threshold: f64) -> Self {
        self.velocity_threshold = threshold;
        self
    }

    /// Checks that all values are in range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(h) = self.row_height
            && !(h.is_finite() && h > 0.0)
        {
            return Err(ConfigError::InvalidWindow(format!("row height must be positive, got {}", h)));
        }
        if !(self.velocity_threshold.is_finite() && self.velocity_threshold > 0.0) {
            return Err(ConfigError::InvalidWindow(format!(
                "velocity threshold must be positive, got {}",
                self.velocity_threshold
            )));
        }
        if !(self.min_row_height.is_finite() && self.min_row_height > 0.0) {
            return Err(ConfigError::InvalidWindow(format!(
                "minimum row height must be positive, got {}",
                self.min_row_height
            )));
        }
        Ok(())
    }
}

/// Owns the viewport state and computes the rendered window.
#[derive(Debug, Clone)]
pub struct WindowedRenderer {
    config: WindowConfig,
    viewport: ViewportState,
    /// First successful measurement, never refreshed.
    measured_height: Option<f64>,
    range: VisibleRange,
    total_rows: usize,
    scheduler: FrameScheduler,
}

impl WindowedRenderer {
    /// Creates a renderer with an empty viewport.
    pub fn new(config: WindowConfig) -> Self {
        let viewport = ViewportState {
            estimated_row_height: config.row_height.unwrap_or(config.min_row_height),
            ..ViewportState::default()
        };
        Self {
            scheduler: FrameScheduler::new(config.velocity_threshold),
            config,
            viewport,
            measured_height: None,
            range: VisibleRange::default(),
            total_rows: 0,
        }
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn config(&self) -> &WindowConfig {
        &self.config
    }

    pub fn viewport(&self) -> &ViewportState {
        &self.viewport
    }

    /// The range computed by the last recompute.
    pub fn range(&self) -> VisibleRange {
        self.range
    }

    /// Row count used by the last recompute.
    pub fn total_rows(&self) -> usize {
        self.total_rows
    }

    /// Current row height: fixed, measured, or the estimate.
    pub fn row_height(&self) -> f64 {
        self.config
            .row_height
            .or(self.measured_height)
            .unwrap_or_else(|| self.viewport.estimated_row_height.max(self.config.min_row_height))
    }

    /// Heights of the placeholders around the rendered window.
    pub fn spacers(&self) -> (f64, f64) {
        let h = self.row_height();
        (
            self.range.spacer_before(h),
            self.range.spacer_after(h, self.total_rows),
        )
    }

    // -------------------------------------------------------------------------
    // Viewport signals
    // -------------------------------------------------------------------------

    /// Records a raw scroll signal.
    pub fn on_scroll(&mut self, offset: f64, now: Instant) -> ScheduleDecision {
        self.viewport.scroll_offset = if offset.is_finite() { offset.max(0.0) } else { 0.0 };
        self.scheduler.scroll(self.viewport.scroll_offset, now)
    }

    /// Records a container resize.
    pub fn on_resize(&mut self, container_height: f64) -> ScheduleDecision {
        self.viewport.container_height = container_height;
        self.scheduler.request()
    }

    /// Queues a recompute because the data changed.
    pub fn invalidate(&mut self) -> ScheduleDecision {
        self.scheduler.request()
    }

    /// Frame tick. Returns `true` if a recompute is due.
    pub fn take_frame(&mut self) -> bool {
        self.scheduler.on_frame()
    }

    /// Scrolls so that `index` is the first visible row. Returns the offset.
    pub fn scroll_to_index(&mut self, index: usize) -> f64 {
        let offset = index as f64 * self.row_height();
        self.viewport.scroll_offset = offset;
        self.scheduler.request();
        offset
    }

    /// Moves back to the top, e.g. after the dataset was replaced.
    pub fn reset_scroll(&mut self) {
        self.viewport.scroll_offset = 0.0;
        self.scheduler.request();
    }

    // -------------------------------------------------------------------------
    // Computation
    // -------------------------------------------------------------------------

    /// Resolves the row height, measuring a sample row once if needed.
    pub fn resolve_row_height(&mut self, surface: &dyn RenderSurface) -> f64 {
        if self.config.row_height.is_none()
            && self.measured_height.is_none()
            && let Some(measured) = surface.measure_row_height().filter(|h| h.is_finite())
        {
            let height = measured.max(self.config.min_row_height);
            log::debug!("measured row height {} (using {})", measured, height);
            self.measured_height = Some(height);
        }
        self.row_height()
    }

    /// Recomputes the visible range for `total_rows` rows.
    pub fn recompute(&mut self, total_rows: usize, surface: &dyn RenderSurface) -> VisibleRange {
        let row_height = self.resolve_row_height(surface);
        self.total_rows = total_rows;
        self.range = VisibleRange::compute(&self.viewport, row_height, total_rows, self.config.buffer);
        log::trace!(
            "window recomputed: rendered {}..{} visible {}..{} of {}",
            self.range.rendered_start,
            self.range.rendered_end,
            self.range.visible_start,
            self.range.visible_end,
            total_rows
        );
        self.range
    }

    /// Recomputes the window over `rows` and hands the rendered slice to the
    /// surface.
    ///
    /// `offset` is the position of `rows[0]` in the full view (non-zero when
    /// `rows` is one page of a larger view); every emitted row is tagged with
    /// `offset + local index`.
    pub fn render(
        &mut self,
        rows: &[(&RowId, &Record)],
        offset: usize,
        selection: &SelectionTracker,
        surface: &mut dyn RenderSurface,
    ) -> VisibleRange {
        let range = self.recompute(rows.len(), &*surface);
        let window: Vec<RenderedRow<'_>> = rows[range.rendered_start..range.rendered_end]
            .iter()
            .enumerate()
            .map(|(i, &(row_id, record))| RenderedRow {
                index: offset.saturating_add(range.rendered_start + i),
                row_id,
                record,
                selected: selection.is_selected(row_id),
            })
            .collect();
        let (before, after) = self.spacers();
        surface.render(&window, offset.saturating_add(range.rendered_start), before, after);
        range
    }
}
