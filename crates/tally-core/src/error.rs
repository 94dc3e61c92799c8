//! Error types for `tally-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// A visit or report was requested with an empty tag string. Rejected
  /// before any storage work happens.
  #[error("tag must be a non-empty string")]
  EmptyTag,

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
