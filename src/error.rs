//! Typed errors for the network seam.
//!
//! Higher-level flows (config loading, client construction) use
//! `color_eyre::Result` for rich context; the fetch/mutation calls return
//! [`ApiError`] because callers need to branch on specific cases — most
//! importantly the vanished-cursor case during pagination.

use thiserror::Error;

/// Errors produced by calls against the Agora backend.
///
/// Nothing here is fatal to the process: every variant degrades to a stale or
/// slightly incorrect display at worst. Mutation failures are rolled back
/// locally and surfaced as notifications, never retried automatically.
#[derive(Debug, Error)]
pub enum ApiError {
  /// The row a pagination cursor pointed at no longer exists. The pager
  /// retries the fetch without the cursor bound.
  #[error("pagination cursor no longer exists on {resource}")]
  CursorGone { resource: String },

  /// Non-2xx response that isn't a recognized special case.
  #[error("request failed with status {status}: {message}")]
  Status { status: u16, message: String },

  /// Connection-level failure (DNS, TLS, timeout, ...).
  #[error("transport error: {0}")]
  Transport(#[from] reqwest::Error),

  /// The response body didn't match the expected shape.
  #[error("failed to decode response: {0}")]
  Decode(#[from] serde_json::Error),

  /// A request URL could not be built from the configured base.
  #[error("invalid request url: {0}")]
  Url(#[from] url::ParseError),
}

impl ApiError {
  /// Whether this error means the cursor bound should be dropped and the
  /// fetch retried unbounded.
  pub fn is_cursor_gone(&self) -> bool {
    matches!(self, ApiError::CursorGone { .. })
  }
}
