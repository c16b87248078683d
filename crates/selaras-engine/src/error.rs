//! Error taxonomy for the reconciliation engine.

use selaras_core::client::RemoteCall;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  /// The concentrator failed its liveness check or a list call errored.
  /// Sync operations abort on this with no writes; mapping degrades to
  /// offline defaults instead.
  #[error("concentrator unreachable during {0}")]
  RemoteUnreachable(RemoteCall),

  /// The referenced customer does not exist — fatal to the operation.
  #[error("customer not found: {0}")]
  CustomerNotFound(Uuid),

  #[error("account store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("customer directory error: {0}")]
  Directory(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub(crate) fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(e))
  }

  pub(crate) fn directory<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Directory(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
