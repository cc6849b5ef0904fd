//! Operation state and the request shape derived from it.
//!
//! - [`OperationState`] - the one canonical copy of page, sort, filters and search
//! - [`Action`] - user actions that write through the operation state
//! - [`RequestParams`] - the normalized payload sent to a remote source
//! - [`FilterSpec`] / [`SortSpec`] - per-column filter and sort descriptions

mod action;
mod filter;
mod order;
mod params;
mod state;

pub use action::Action;
pub use filter::FilterSpec;
pub use order::Direction;
pub use order::SortSpec;
pub use params::RequestParams;
pub use params::SortParam;
pub use state::OperationState;
pub(crate) use state::Effect;
pub use state::DEFAULT_PAGE_SIZE;
