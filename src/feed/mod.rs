//! Keyset (cursor) pagination over sorted backend collections.
//!
//! Feeds (articles, projects, forum threads, replies) are walked page by page
//! using the sort-column value of the last item as the bound for the next
//! query, never numeric offsets. A cursor history stack makes backward
//! traversal re-derivable instead of cached.

mod pager;

pub use pager::{Cursor, FeedItem, Page, PageRequest, Pager};
