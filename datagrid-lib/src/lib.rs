//! Headless data grid core
//!
//! Pagination, sorting, filtering, search and row selection over local
//! datasets or datasets served page by page from a remote source, plus the
//! windowed rendering math that keeps only the rows near the viewport
//! materialized.
//!
//! Start with [`Grid`], which owns every component below:
//!
//! - [`identity`] - stable row ids
//! - [`selection`] - click, range and drag selection keyed by row id
//! - [`window`] - visible range, spacers and per-frame scheduling
//! - [`query`] - operation state, actions and the remote request payload
//! - [`coordinator`] - one transform or one fetch per action
//! - [`buffer`] - records and the current view

pub mod buffer;
pub mod coordinator;
pub mod error;
pub mod event;
pub mod identity;
pub mod model;
pub mod query;
pub mod selection;
pub mod source;
pub mod transform;
pub mod window;

mod config;
mod grid;

pub use config::GridConfig;
pub use coordinator::Mode;
pub use coordinator::Outcome;
pub use error::Error;
pub use event::GridEvent;
pub use grid::Grid;
