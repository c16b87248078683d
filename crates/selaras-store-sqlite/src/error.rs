//! Error type for `selaras-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("unknown customer status: {0:?}")]
  UnknownStatus(String),

  /// Attempted to update a customer that was not found.
  #[error("customer not found: {0}")]
  CustomerNotFound(uuid::Uuid),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
