//! Remote data sources
//!
//! In remote mode the grid never filters, sorts or pages itself. It sends the
//! normalized [`RequestParams`] to a [`DataSource`] and shows what comes back.

mod http;
mod memory;

use async_trait::async_trait;
use serde::Deserialize;
use serde::Serialize;

use crate::error::SourceError;
use crate::model::Record;
use crate::query::RequestParams;

pub use http::HttpDataSource;
pub use memory::MemoryDataSource;

/// One page of rows plus the size of the full server-side view.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchResult {
    /// Rows of the requested page.
    #[serde(alias = "rows")]
    pub data: Vec<Record>,
    /// Row count of the whole filtered view.
    #[serde(alias = "total")]
    pub total_rows: usize,
}

/// A source of remote pages.
///
/// Implementations receive the whole operation state on every call and
/// must apply filters, search, sort and paging together.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Fetches one page for `params`.
    async fn fetch(&self, params: &RequestParams) -> Result<FetchResult, SourceError>;
}
