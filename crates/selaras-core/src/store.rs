//! The `AccountStore` and `CustomerDirectory` traits.
//!
//! `AccountStore` is implemented by storage backends (e.g.
//! `selaras-store-sqlite`). Higher layers (`selaras-engine`, `selaras-api`)
//! depend on these abstractions, not on any concrete backend.
//!
//! There is deliberately no field-level patch API: every write is a full
//! merged-record replace keyed by `username`, which keeps the dynamic
//! session block coherent and makes per-key last-write-wins the whole
//! concurrency story.

use std::future::Future;

use uuid::Uuid;

use crate::{
  account::Account,
  customer::{Customer, CustomerStatus},
};

// ─── Account store ───────────────────────────────────────────────────────────

/// Abstraction over the authoritative local account table.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait AccountStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Insert-or-replace the full record keyed by `account.username`.
  /// Returns `true` if the record was newly created. The replace must be
  /// atomic per key.
  fn upsert(
    &self,
    account: Account,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Retrieve an account by username. Returns `None` if not found.
  fn find_by_username<'a>(
    &'a self,
    username: &'a str,
  ) -> impl Future<Output = Result<Option<Account>, Self::Error>> + Send + 'a;

  /// The account currently owned by `customer_id`, if any. Ownership is
  /// unique, so at most one row can match.
  fn find_by_customer(
    &self,
    customer_id: Uuid,
  ) -> impl Future<Output = Result<Option<Account>, Self::Error>> + Send + '_;

  /// Delete an account outright. Returns `true` if a row was removed.
  fn delete<'a>(
    &'a self,
    username: &'a str,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  /// Every local account.
  fn list_all(
    &self,
  ) -> impl Future<Output = Result<Vec<Account>, Self::Error>> + Send + '_;

  /// Accounts whose username is absent from `usernames` — used by the
  /// active-only sync to find rows that must be marked offline.
  fn list_where_username_not_in<'a>(
    &'a self,
    usernames: &'a [String],
  ) -> impl Future<Output = Result<Vec<Account>, Self::Error>> + Send + 'a;
}

// ─── Customer directory ──────────────────────────────────────────────────────

/// The engine's narrow window onto the customer table.
///
/// Reads plus exactly one permitted mutation: the status promotion after a
/// successful mapping. Nothing else about a customer may be written from
/// here.
pub trait CustomerDirectory: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn find_by_id(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Customer>, Self::Error>> + Send + '_;

  /// Look a customer up by subscriber number — the auto-link heuristic.
  fn find_by_number<'a>(
    &'a self,
    number: &'a str,
  ) -> impl Future<Output = Result<Option<Customer>, Self::Error>> + Send + 'a;

  fn set_status(
    &self,
    id: Uuid,
    status: CustomerStatus,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Customers with `status = active`, for the monitoring projection.
  fn list_active(
    &self,
  ) -> impl Future<Output = Result<Vec<Customer>, Self::Error>> + Send + '_;
}
