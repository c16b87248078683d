//! The `ConcentratorClient` trait — the engine's view of the remote access
//! concentrator.
//!
//! The wire protocol to the router is somebody else's problem: the engine
//! only sees two structured list calls and a liveness probe, and every
//! transport-level failure collapses into a single "unreachable" condition
//! tagged with which call failed.

use std::future::Future;

use thiserror::Error;

use crate::remote::{RemoteAccountRecord, RemoteSessionRecord};

/// Which remote call failed — surfaced to operators for diagnosis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteCall {
  Liveness,
  Registry,
  ActiveSessions,
}

impl std::fmt::Display for RemoteCall {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let s = match self {
      Self::Liveness => "liveness check",
      Self::Registry => "account registry",
      Self::ActiveSessions => "active session list",
    };
    f.write_str(s)
  }
}

/// A failed call to the concentrator. The message is for humans; no
/// transport internals beyond it are carried upward.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct ClientError(pub String);

/// Read-only access to the concentrator's two data sources.
///
/// Implementations must answer [`is_reachable`](Self::is_reachable) cheaply;
/// the engine fails fast on it before pulling lists.
pub trait ConcentratorClient: Send + Sync {
  /// Whether the concentrator currently answers at all.
  fn is_reachable(&self) -> impl Future<Output = bool> + Send + '_;

  /// The configured account registry, independent of connection state.
  fn list_accounts(
    &self,
  ) -> impl Future<Output = Result<Vec<RemoteAccountRecord>, ClientError>> + Send + '_;

  /// The currently-connected sessions with their metrics.
  fn list_active_sessions(
    &self,
  ) -> impl Future<Output = Result<Vec<RemoteSessionRecord>, ClientError>> + Send + '_;
}
