//! The selaras reconciliation engine.
//!
//! Three write-side operations keep the local account store consistent with
//! the access concentrator — full sync, active-only sync, and
//! operator-initiated mapping — plus the read-only status projector that
//! serves monitoring views from the store alone.
//!
//! Every operation is a self-contained unit of work: pull from the remote
//! client, recompute the full merged record, write through the store's
//! per-key-atomic upsert. Nothing patches fields in place, so concurrent
//! operations degrade to per-username last-write-wins rather than torn
//! records.

pub mod error;
pub mod projector;
pub mod reconciler;

pub use error::{Error, Result};
pub use projector::StatusProjector;
pub use reconciler::{
  MapOutcome, MapRequest, Reconciler, RegistryRow, SyncSummary,
};
