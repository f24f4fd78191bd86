//! Short-TTL read-through cache for feed first pages.
//!
//! Only the unparameterized first page of each (resource, sort, page size)
//! query is cached; cursor-bound pages always go to the backend. Writes
//! invalidate the whole resource at once.

mod key;
mod store;

pub use key::{FeedKey, Resource, SortDirection, SortField};
pub use store::{FeedCache, TtlCache};
