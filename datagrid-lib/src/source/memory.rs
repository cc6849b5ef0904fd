//! In-process data source

use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::DataSource;
use super::FetchResult;
use crate::error::SourceError;
use crate::model::Record;
use crate::query::RequestParams;
use crate::transform::apply_local;
use crate::transform::Transforms;

/// Serves pages from a dataset held in memory, the way a server would.
///
/// Applies filters, search and sort with the local transforms, then cuts the
/// requested page. Every call is counted and its parameters recorded, so it
/// doubles as a test double for remote mode.
///
/// # Example
///
/// ```
/// use datagrid_lib::model::Record;
/// use datagrid_lib::source::MemoryDataSource;
///
/// let source = MemoryDataSource::new(vec![Record::new().set("id", 1)]);
/// assert_eq!(source.fetch_count(), 0);
/// ```
#[derive(Debug)]
pub struct MemoryDataSource {
    records: Vec<Record>,
    transforms: Transforms,
    search_columns: Vec<String>,
    latency: Option<Duration>,
    failing: AtomicBool,
    fetches: AtomicUsize,
    requests: Mutex<Vec<RequestParams>>,
}

impl MemoryDataSource {
    pub fn new(records: Vec<Record>) -> Self {
        Self {
            records,
            transforms: Transforms::default(),
            search_columns: Vec::new(),
            latency: None,
            failing: AtomicBool::new(false),
            fetches: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Uses custom predicates and comparators.
    pub fn with_transforms(mut self, transforms: Transforms) -> Self {
        self.transforms = transforms;
        self
    }

    /// Restricts search to these columns.
    pub fn with_search_columns(mut self, columns: Vec<String>) -> Self {
        self.search_columns = columns;
        self
    }

    /// Delays every response.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Makes subsequent fetches fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of fetches received so far, failed ones included.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    /// Parameters of every fetch received, oldest first.
    pub async fn requests(&self) -> Vec<RequestParams> {
        self.requests.lock().await.clone()
    }

    /// Parameters of the most recent fetch.
    pub async fn last_request(&self) -> Option<RequestParams> {
        self.requests.lock().await.last().cloned()
    }
}

#[async_trait]
impl DataSource for MemoryDataSource {
    async fn fetch(&self, params: &RequestParams) -> Result<FetchResult, SourceError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().await.push(params.clone());

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        if self.failing.load(Ordering::SeqCst) {
            return Err(SourceError::Unavailable("memory source set to fail".to_string()));
        }

        let view = apply_local(
            &self.records,
            &params.filters,
            params.sort.to_spec().as_ref(),
            &params.search,
            &self.search_columns,
            &self.transforms,
        );

        let data = view
            .iter()
            .skip(params.offset())
            .take(params.page_size)
            .map(|&i| self.records[i].clone())
            .collect();

        Ok(FetchResult {
            data,
            total_rows: view.len(),
        })
    }
}
