//! Error type for `tally-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  /// The schema on disk cannot be brought to the version this build
  /// expects. Fatal at open time; nothing touches the data afterwards.
  #[error("schema migration error: {0}")]
  Migration(String),

  #[error("date parse error: {0}")]
  DateParse(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
