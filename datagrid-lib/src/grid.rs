//! The grid facade
//!
//! [`Grid`] owns one of each component and is the only thing that mutates
//! them. Callers feed it actions, pointer input and viewport signals; it
//! keeps the buffer, selection and window consistent and reports what
//! changed through [`GridEvent`]s.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::broadcast;

use crate::buffer::DataBuffer;
use crate::buffer::PageSlice;
use crate::config::GridConfig;
use crate::coordinator::Mode;
use crate::coordinator::Outcome;
use crate::coordinator::PendingFetch;
use crate::coordinator::Prepared;
use crate::coordinator::RequestCoordinator;
use crate::error::ConfigError;
use crate::error::Error;
use crate::error::SourceError;
use crate::event::GridEvent;
use crate::identity::RowId;
use crate::model::Record;
use crate::query::Action;
use crate::query::OperationState;
use crate::selection::Modifiers;
use crate::selection::PointerPosition;
use crate::selection::SelectionChange;
use crate::selection::SelectionMode;
use crate::selection::SelectionTracker;
use crate::source::DataSource;
use crate::source::FetchResult;
use crate::transform::Transforms;
use crate::window::RenderSurface;
use crate::window::ScheduleDecision;
use crate::window::VisibleRange;
use crate::window::WindowedRenderer;

const EVENT_CAPACITY: usize = 64;

/// A headless data grid.
///
/// # Example
///
/// ```
/// use datagrid_lib::Grid;
/// use datagrid_lib::GridConfig;
/// use datagrid_lib::model::Record;
///
/// let mut grid = Grid::new(GridConfig::default().with_id_field("id").with_page_size(2)).unwrap();
/// grid.load((1..=5).map(|i| Record::new().set("id", i)).collect()).unwrap();
/// assert_eq!(grid.total_pages(), 3);
/// ```
pub struct Grid {
    config: GridConfig,
    buffer: DataBuffer,
    coordinator: RequestCoordinator,
    selection: SelectionTracker,
    renderer: WindowedRenderer,
    source: Option<Arc<dyn DataSource>>,
    events: broadcast::Sender<GridEvent>,
}

impl fmt::Debug for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Grid")
            .field("config", &self.config)
            .field("state", self.coordinator.state())
            .field("total_rows", &self.buffer.total_rows())
            .field("selected", &self.selection.len())
            .field("has_source", &self.source.is_some())
            .finish()
    }
}

impl Grid {
    /// Creates a local grid.
    ///
    /// Remote mode needs a source; use [`Grid::with_source`].
    pub fn new(config: GridConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        if config.mode == Mode::Remote {
            return Err(ConfigError::MissingSource);
        }
        Ok(Self::build(config, None))
    }

    /// Creates a grid backed by `source`.
    ///
    /// The source is only consulted in remote mode.
    pub fn with_source(config: GridConfig, source: Arc<dyn DataSource>) -> Result<Self, ConfigError> {
        config.validate()?;
        if config.mode == Mode::Local {
            log::warn!("data source ignored in local mode");
        }
        Ok(Self::build(config, Some(source)))
    }

    fn build(config: GridConfig, source: Option<Arc<dyn DataSource>>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            buffer: DataBuffer::new(config.id_field.clone()),
            coordinator: RequestCoordinator::new(config.mode, config.page_size)
                .with_search_columns(config.search_columns.clone()),
            selection: SelectionTracker::new(config.selection_mode).with_drag_threshold(config.drag_threshold),
            renderer: WindowedRenderer::new(config.window.clone()),
            source,
            events,
            config,
        }
    }

    /// Uses custom predicates and comparators for local filtering and sorting.
    pub fn with_transforms(mut self, transforms: Transforms) -> Self {
        self.coordinator.set_transforms(transforms);
        self
    }

    /// Subscribes to lifecycle events.
    pub fn subscribe(&self) -> broadcast::Receiver<GridEvent> {
        self.events.subscribe()
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn mode(&self) -> Mode {
        self.coordinator.mode()
    }

    /// The canonical page, sort, filters and search.
    pub fn state(&self) -> &OperationState {
        self.coordinator.state()
    }

    pub fn buffer(&self) -> &DataBuffer {
        &self.buffer
    }

    pub fn selection(&self) -> &SelectionTracker {
        &self.selection
    }

    pub fn window(&self) -> &WindowedRenderer {
        &self.renderer
    }

    /// Selected ids, sorted.
    pub fn selected(&self) -> Vec<RowId> {
        self.selection.selected()
    }

    /// Row count of the full current view.
    pub fn total_rows(&self) -> usize {
        self.buffer.total_rows()
    }

    pub fn total_pages(&self) -> usize {
        self.state().total_pages(self.total_rows())
    }

    /// Generation of the latest remote fetch.
    pub fn generation(&self) -> u64 {
        self.coordinator.generation()
    }

    /// Rows currently displayed: the current page, or the whole view when
    /// local pagination is off.
    pub fn page_rows(&self) -> PageSlice<'_> {
        self.buffer.page_slice(
            self.coordinator.state(),
            self.config.pagination,
            self.mode() == Mode::Remote,
        )
    }

    /// Row at full-view position `index`.
    pub fn record_at(&self, index: usize) -> Option<(&RowId, &Record)> {
        self.buffer.record_at(index)
    }

    // -------------------------------------------------------------------------
    // Data
    // -------------------------------------------------------------------------

    /// Replaces the local dataset.
    ///
    /// Keeps the current sort, filters and search, clears the selection and
    /// scrolls back to the top. Rejected in remote mode and when the
    /// identity field repeats; the previous data then stays.
    pub fn load(&mut self, records: Vec<Record>) -> Result<(), Error> {
        if self.mode() == Mode::Remote {
            let err = ConfigError::UnsupportedInMode {
                operation: "load",
                mode: Mode::Remote.as_str(),
            };
            log::warn!("{}", err);
            return Err(err.into());
        }

        self.buffer
            .load(records)
            .inspect_err(|e| log::warn!("load rejected: {}", e))?;
        self.coordinator.refresh_local(&mut self.buffer);

        let change = self.selection.reset();
        self.emit_selection(&change);
        self.emit(GridEvent::DataReplaced {
            total_rows: self.buffer.total_rows(),
        });
        self.view_changed();
        Ok(())
    }

    /// Re-runs the current operation state: recomputes locally, or refetches
    /// and replaces the remote dataset wholesale.
    pub async fn reload(&mut self) -> Result<Outcome, Error> {
        self.dispatch(Action::Reload).await
    }

    /// Applies a user action end to end.
    pub async fn dispatch(&mut self, action: Action) -> Result<Outcome, Error> {
        match self.prepare(&action)? {
            Prepared::Local { view_changed } => Ok(Outcome::Local { view_changed }),
            Prepared::Fetch(fetch) => {
                let source = self.source.clone().ok_or(ConfigError::MissingSource)?;
                let result = source.fetch(&fetch.params).await;
                self.complete(fetch, result)
            }
        }
    }

    /// First half of [`dispatch`](Grid::dispatch): updates the operation
    /// state and, in remote mode, returns the fetch to run.
    ///
    /// Useful when the caller runs fetches itself and several may be in
    /// flight; hand each result to [`complete`](Grid::complete).
    pub fn prepare(&mut self, action: &Action) -> Result<Prepared, Error> {
        let prepared = self.coordinator.prepare(action, &mut self.buffer)?;
        if let Prepared::Local { view_changed } = prepared {
            if view_changed {
                let change = self.selection.revalidate(self.buffer.view_ids());
                self.emit_selection(&change);
            }
            self.view_changed();
        }
        Ok(prepared)
    }

    /// Second half of [`dispatch`](Grid::dispatch): applies a fetch result.
    pub fn complete(&mut self, fetch: PendingFetch, result: Result<FetchResult, SourceError>) -> Result<Outcome, Error> {
        let generation = fetch.generation;
        let outcome = self.coordinator.complete(fetch, result, &mut self.buffer).inspect_err(|e| {
            self.emit(GridEvent::FetchFailed {
                generation,
                message: e.to_string(),
            });
        })?;

        if let Outcome::Fetched { reload, .. } = outcome {
            // Remote views only hold one page, so a page change must not
            // drop selections made on other pages.
            if reload {
                let change = self.selection.reset();
                self.emit_selection(&change);
            } else {
                self.selection.cancel_drag();
            }
            self.emit(GridEvent::DataReplaced {
                total_rows: self.buffer.total_rows(),
            });
            self.view_changed();
        }
        Ok(outcome)
    }

    fn view_changed(&mut self) {
        self.renderer.reset_scroll();
        self.emit(GridEvent::ViewUpdated {
            page: self.state().page(),
            total_pages: self.total_pages(),
            total_rows: self.total_rows(),
        });
    }

    // -------------------------------------------------------------------------
    // Selection
    // -------------------------------------------------------------------------

    /// Changes the selection mode; clears the selection if it differs.
    pub fn set_selection_mode(&mut self, mode: SelectionMode) -> SelectionChange {
        let change = self.selection.set_mode(mode);
        self.emit_selection(&change);
        change
    }

    /// Clicks the row at full-view position `index`. Positions not held by
    /// the buffer are ignored.
    pub fn click(&mut self, index: usize, modifiers: Modifiers) -> SelectionChange {
        match self.buffer.id_at(index).cloned() {
            Some(id) => self.click_id(&id, modifiers),
            None => SelectionChange::default(),
        }
    }

    /// Clicks the row with id `id`.
    pub fn click_id(&mut self, id: &RowId, modifiers: Modifiers) -> SelectionChange {
        let change = self.selection.click(id, modifiers, self.buffer.view_ids());
        self.emit_selection(&change);
        change
    }

    /// Selects every row of the current view.
    pub fn select_all(&mut self) -> SelectionChange {
        let change = self.selection.select_all(self.buffer.view_ids());
        self.emit_selection(&change);
        change
    }

    pub fn clear_selection(&mut self) -> SelectionChange {
        let change = self.selection.clear();
        self.emit_selection(&change);
        change
    }

    /// Pointer pressed on the row at full-view position `index`.
    pub fn pointer_down(&mut self, index: usize, position: PointerPosition, modifiers: Modifiers) {
        match self.buffer.id_at(index).cloned() {
            Some(id) => self
                .selection
                .pointer_down(&id, position, modifiers, self.buffer.view_ids()),
            None => self.selection.cancel_drag(),
        }
    }

    /// Pointer moved over the row at full-view position `index`.
    pub fn pointer_move(&mut self, index: usize, position: PointerPosition) -> SelectionChange {
        let Some(id) = self.buffer.id_at(index).cloned() else {
            return SelectionChange::default();
        };
        let change = self.selection.pointer_move(&id, position, self.buffer.view_ids());
        self.emit_selection(&change);
        change
    }

    /// Pointer released.
    pub fn pointer_up(&mut self) -> SelectionChange {
        let change = self.selection.pointer_up(self.buffer.view_ids());
        self.emit_selection(&change);
        change
    }

    fn emit_selection(&self, change: &SelectionChange) {
        if !change.is_empty() {
            self.emit(GridEvent::SelectionChanged(change.clone()));
        }
    }

    fn emit(&self, event: GridEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    // -------------------------------------------------------------------------
    // Viewport
    // -------------------------------------------------------------------------

    /// Raw scroll signal. On [`ScheduleDecision::Immediate`] call
    /// [`render`](Grid::render) now instead of waiting for the next frame.
    pub fn on_scroll(&mut self, offset: f64, now: Instant) -> ScheduleDecision {
        self.renderer.on_scroll(offset, now)
    }

    /// Container resized.
    pub fn on_resize(&mut self, container_height: f64) -> ScheduleDecision {
        self.renderer.on_resize(container_height)
    }

    /// Animation frame tick. Renders if a recompute is pending.
    pub fn frame(&mut self, surface: &mut dyn RenderSurface) -> Option<VisibleRange> {
        self.renderer.take_frame().then(|| self.render(surface))
    }

    /// Recomputes the window and renders it to `surface`.
    pub fn render(&mut self, surface: &mut dyn RenderSurface) -> VisibleRange {
        let slice = self.buffer.page_slice(
            self.coordinator.state(),
            self.config.pagination,
            self.coordinator.mode() == Mode::Remote,
        );
        self.renderer.render(&slice.rows, slice.offset, &self.selection, surface)
    }

    /// Scrolls so `id` is the first visible row, if it is on the displayed
    /// page. Returns the new scroll offset.
    pub fn scroll_to_row(&mut self, id: &RowId) -> Option<f64> {
        let position = self.buffer.position_of(id)?;
        let (offset, len) = {
            let slice = self.page_rows();
            (slice.offset, slice.len())
        };
        let local = position.checked_sub(offset).filter(|&i| i < len)?;
        Some(self.renderer.scroll_to_index(local))
    }
}
