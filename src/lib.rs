//! Client-side data engine for the Agora social platform.
//!
//! Agora's UI layers (web, terminal) all talk to the backend row store through
//! this crate. It owns the pieces that are easy to get subtly wrong:
//!
//! - [`engagement`] — optimistic like counters: a per-view delta reconciler
//!   that shows counter changes immediately and folds them away once the
//!   authoritative row comes back, without letting a concurrent refetch erase
//!   an in-flight adjustment.
//! - [`feed`] — keyset (cursor) pagination over sorted collections, with a
//!   cursor history stack for stable forward/back traversal.
//! - [`cache`] — a short-TTL in-memory read-through cache for first pages,
//!   invalidated per resource after writes.
//! - [`realtime`] — the coarse change-feed contract: every event means
//!   "something changed under this scope, refetch it."
//! - [`api`] — the thin reqwest client and wire/domain types the above need.
//!
//! Everything is instance state owned by the caller (one controller or pager
//! per visible list); there are no process-wide registries.

pub mod api;
pub mod cache;
pub mod config;
pub mod engagement;
pub mod error;
pub mod feed;
pub mod realtime;

pub use api::cached_client::CachedClient;
pub use api::client::PlatformClient;
pub use cache::{FeedCache, FeedKey, Resource, SortDirection, SortField};
pub use config::Config;
pub use engagement::{
  DeltaReconciler, Direction, LikeController, LikeEvent, Likeable, ToggleOutcome,
};
pub use error::ApiError;
pub use feed::{Cursor, FeedItem, Page, PageRequest, Pager};
pub use realtime::{ChangeFeed, ChannelFeed, ScopeWatcher, Subscription};
