//! Request coordination
//!
//! Turns every user action into exactly one view update: an in-memory
//! transform in local mode, or one fetch carrying the whole normalized
//! operation state in remote mode.
//!
//! Remote fetches are stamped with a generation number. Only the response to
//! the most recently issued fetch is applied; older ones are dropped when
//! they resolve, so the last action always wins regardless of response order.

use std::fmt;

use serde::Deserialize;

use crate::buffer::DataBuffer;
use crate::error::ConfigError;
use crate::error::Error;
use crate::error::SourceError;
use crate::query::Action;
use crate::query::Effect;
use crate::query::OperationState;
use crate::query::RequestParams;
use crate::source::DataSource;
use crate::source::FetchResult;
use crate::transform::apply_local;
use crate::transform::Transforms;

/// Where filtering, sorting and paging happen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// The whole dataset is held and transformed in memory.
    #[default]
    Local,
    /// A data source does the work and returns one page at a time.
    Remote,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Local => "local",
            Mode::Remote => "remote",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A remote fetch that has been issued but not applied.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingFetch {
    /// Generation this fetch was stamped with.
    pub generation: u64,
    /// Payload to send.
    pub params: RequestParams,
    /// Whether this fetch reloads the dataset wholesale.
    pub reload: bool,
}

/// Result of preparing an action.
#[derive(Debug, Clone, PartialEq)]
pub enum Prepared {
    /// Local mode: the view was already updated in place.
    Local {
        /// Filters, sort or search changed the view.
        view_changed: bool,
    },
    /// Remote mode: run this fetch and hand the result to `complete`.
    Fetch(PendingFetch),
}

/// What an action ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Applied in memory.
    Local { view_changed: bool },
    /// The fetch response replaced the buffer.
    Fetched { generation: u64, reload: bool },
    /// A newer fetch was issued meanwhile; this response was dropped.
    Stale { generation: u64 },
}

impl Outcome {
    /// Returns `true` if the buffer contents changed.
    pub fn replaced_data(&self) -> bool {
        matches!(self, Outcome::Fetched { .. } | Outcome::Local { view_changed: true })
    }
}

/// Owns the operation state and decides what each action does to the buffer.
#[derive(Debug, Clone)]
pub struct RequestCoordinator {
    mode: Mode,
    state: OperationState,
    transforms: Transforms,
    search_columns: Vec<String>,
    generation: u64,
    /// Total reported by the last successful fetch.
    known_total: Option<usize>,
}

impl RequestCoordinator {
    pub fn new(mode: Mode, page_size: usize) -> Self {
        Self {
            mode,
            state: OperationState::new(page_size),
            transforms: Transforms::default(),
            search_columns: Vec::new(),
            generation: 0,
            known_total: None,
        }
    }

    /// Restricts local search to these columns.
    pub fn with_search_columns(mut self, columns: Vec<String>) -> Self {
        self.search_columns = columns;
        self
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// The canonical operation state.
    pub fn state(&self) -> &OperationState {
        &self.state
    }

    pub fn transforms(&self) -> &Transforms {
        &self.transforms
    }

    /// Uses custom predicates and comparators for local transforms.
    pub(crate) fn set_transforms(&mut self, transforms: Transforms) {
        self.transforms = transforms;
    }

    /// Generation of the most recently issued fetch (0 before the first).
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Row count the page clamp works against.
    pub fn known_total(&self, buffer: &DataBuffer) -> Option<usize> {
        match self.mode {
            Mode::Local => Some(buffer.total_rows()),
            Mode::Remote => self.known_total,
        }
    }

    /// Applies `action` to the operation state.
    ///
    /// Local mode updates `buffer` right away. Remote mode returns the one
    /// fetch to run; the buffer is left alone until [`complete`] is called
    /// with the response.
    ///
    /// Invalid actions are rejected before anything changes.
    ///
    /// [`complete`]: RequestCoordinator::complete
    pub fn prepare(&mut self, action: &Action, buffer: &mut DataBuffer) -> Result<Prepared, ConfigError> {
        let known_total = self.known_total(buffer);
        let effect = self.state.apply(action, known_total).inspect_err(|e| {
            log::warn!("rejected {}: {}", action.name(), e);
        })?;

        match self.mode {
            Mode::Local => {
                let view_changed = effect != Effect::Page;
                if view_changed {
                    self.refresh_local(buffer);
                }
                log::debug!(
                    "{} applied locally: page {} of {}",
                    action.name(),
                    self.state.page(),
                    self.state.total_pages(buffer.total_rows())
                );
                Ok(Prepared::Local { view_changed })
            }
            Mode::Remote => {
                self.generation += 1;
                let fetch = PendingFetch {
                    generation: self.generation,
                    params: self.state.to_params(),
                    reload: effect == Effect::Reload,
                };
                log::debug!(
                    "{} issues fetch #{} for page {}",
                    action.name(),
                    fetch.generation,
                    fetch.params.page
                );
                Ok(Prepared::Fetch(fetch))
            }
        }
    }

    /// Applies the response to `fetch`.
    ///
    /// A response to anything but the latest fetch is discarded, whether it
    /// succeeded or not. A failed fetch leaves both the operation state and
    /// the buffer as they were.
    pub fn complete(
        &mut self,
        fetch: PendingFetch,
        result: Result<FetchResult, SourceError>,
        buffer: &mut DataBuffer,
    ) -> Result<Outcome, Error> {
        if fetch.generation != self.generation {
            log::debug!(
                "discarding response to fetch #{} (latest is #{})",
                fetch.generation,
                self.generation
            );
            return Ok(Outcome::Stale {
                generation: fetch.generation,
            });
        }

        let result = result.inspect_err(|e| {
            log::warn!("fetch #{} failed, keeping current data: {}", fetch.generation, e);
        })?;

        buffer.replace_remote(result.data, result.total_rows, fetch.params.offset())?;
        self.known_total = Some(result.total_rows);

        let total_pages = self.state.total_pages(result.total_rows);
        if self.state.page() > total_pages {
            log::warn!(
                "source returned {} rows; page {} is past the last page {}",
                result.total_rows,
                self.state.page(),
                total_pages
            );
        }

        Ok(Outcome::Fetched {
            generation: fetch.generation,
            reload: fetch.reload,
        })
    }

    /// Prepares `action`, runs its fetch against `source` if any, and
    /// completes it.
    pub async fn dispatch(
        &mut self,
        action: &Action,
        buffer: &mut DataBuffer,
        source: &dyn DataSource,
    ) -> Result<Outcome, Error> {
        match self.prepare(action, buffer)? {
            Prepared::Local { view_changed } => Ok(Outcome::Local { view_changed }),
            Prepared::Fetch(fetch) => {
                let result = source.fetch(&fetch.params).await;
                self.complete(fetch, result, buffer)
            }
        }
    }

    /// Recomputes the local view from the full dataset and clamps the page
    /// to the new total.
    pub(crate) fn refresh_local(&mut self, buffer: &mut DataBuffer) {
        let view = apply_local(
            buffer.records(),
            self.state.filters(),
            self.state.sort(),
            self.state.search(),
            &self.search_columns,
            &self.transforms,
        );
        buffer.set_view(view);
        if self.state.clamp_page(buffer.total_rows()) {
            log::debug!("page clamped to {}", self.state.page());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Record;
    use crate::query::FilterSpec;
    use crate::source::MemoryDataSource;

    fn numbers(n: i64) -> Vec<Record> {
        (1..=n).map(|i| Record::new().set("id", i)).collect()
    }

    fn local(n: i64, page_size: usize) -> (RequestCoordinator, DataBuffer) {
        let mut buffer = DataBuffer::new(Some("id".into()));
        buffer.load(numbers(n)).unwrap();
        (RequestCoordinator::new(Mode::Local, page_size), buffer)
    }

    #[test]
    fn test_local_filter_then_clear() {
        let (mut coordinator, mut buffer) = local(5, 2);
        coordinator
            .prepare(&Action::filter("id", FilterSpec::gt(100)), &mut buffer)
            .unwrap();
        assert_eq!(buffer.total_rows(), 0);
        assert_eq!(coordinator.state().page(), 1);
        assert_eq!(coordinator.state().total_pages(buffer.total_rows()), 1);

        coordinator.prepare(&Action::ClearFilters, &mut buffer).unwrap();
        assert_eq!(buffer.total_rows(), 5);
    }

    #[test]
    fn test_local_page_clamps_to_total() {
        let (mut coordinator, mut buffer) = local(5, 2);
        let prepared = coordinator.prepare(&Action::SetPage(4), &mut buffer).unwrap();
        assert_eq!(prepared, Prepared::Local { view_changed: false });
        assert_eq!(coordinator.state().page(), 3);
    }

    #[test]
    fn test_remote_prepare_stamps_generations() {
        let mut coordinator = RequestCoordinator::new(Mode::Remote, 10);
        let mut buffer = DataBuffer::new(None);

        let Prepared::Fetch(first) = coordinator.prepare(&Action::Reload, &mut buffer).unwrap() else {
            panic!("expected a fetch");
        };
        let Prepared::Fetch(second) = coordinator.prepare(&Action::NextPage, &mut buffer).unwrap() else {
            panic!("expected a fetch");
        };
        assert_eq!((first.generation, second.generation), (1, 2));
        assert!(first.reload);
        assert!(!second.reload);
        assert_eq!(second.params.page, 2);
    }

    #[test]
    fn test_stale_response_is_discarded() {
        let mut coordinator = RequestCoordinator::new(Mode::Remote, 2);
        let mut buffer = DataBuffer::new(Some("id".into()));

        let Prepared::Fetch(slow) = coordinator.prepare(&Action::Reload, &mut buffer).unwrap() else {
            panic!("expected a fetch");
        };
        let Prepared::Fetch(fast) = coordinator
            .prepare(&Action::sort("id", crate::query::Direction::Desc), &mut buffer)
            .unwrap()
        else {
            panic!("expected a fetch");
        };

        let newest = FetchResult {
            data: vec![Record::new().set("id", 9)],
            total_rows: 9,
        };
        let outdated = FetchResult {
            data: vec![Record::new().set("id", 1)],
            total_rows: 9,
        };

        let outcome = coordinator.complete(fast, Ok(newest), &mut buffer).unwrap();
        assert!(matches!(outcome, Outcome::Fetched { generation: 2, .. }));
        let outcome = coordinator.complete(slow, Ok(outdated), &mut buffer).unwrap();
        assert_eq!(outcome, Outcome::Stale { generation: 1 });
        assert_eq!(buffer.view_ids()[0].as_str(), "9");
    }

    #[test]
    fn test_failure_keeps_buffer_and_state() {
        let mut coordinator = RequestCoordinator::new(Mode::Remote, 2);
        let mut buffer = DataBuffer::new(Some("id".into()));
        buffer.replace_remote(numbers(2), 2, 0).unwrap();

        let Prepared::Fetch(fetch) = coordinator
            .prepare(&Action::search("x"), &mut buffer)
            .unwrap()
        else {
            panic!("expected a fetch");
        };
        let err = coordinator
            .complete(fetch, Err(SourceError::http(503, "down")), &mut buffer)
            .unwrap_err();

        assert!(err.is_source());
        assert_eq!(coordinator.state().search(), "x");
        assert_eq!(buffer.total_rows(), 2);
    }

    #[tokio::test]
    async fn test_dispatch_issues_one_fetch() {
        let source = MemoryDataSource::new(numbers(5));
        let mut coordinator = RequestCoordinator::new(Mode::Remote, 2);
        let mut buffer = DataBuffer::new(Some("id".into()));

        coordinator.dispatch(&Action::Reload, &mut buffer, &source).await.unwrap();
        coordinator
            .dispatch(&Action::SetPage(4), &mut buffer, &source)
            .await
            .unwrap();

        assert_eq!(source.fetch_count(), 2);
        assert_eq!(coordinator.state().page(), 3);
        assert_eq!(source.last_request().await.map(|p| p.page), Some(3));
    }
}
