//! Handlers for the `/accounts` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/accounts` | Local accounts with their linked customer |
//! | `GET`  | `/accounts/registry` | Live registry annotated with link state |
//! | `POST` | `/accounts/sync` | Full sync; returns `{created, updated, total}` |
//! | `POST` | `/accounts/sync-active` | Active-only sync; returns `{online_count}` |
//! | `POST` | `/accounts/map` | Body: [`MapRequest`]; returns `{status, message}` |
//! | `GET`  | `/accounts/monitor` | Status projector output |

use axum::{Json, extract::State};
use serde::Serialize;
use selaras_core::{
  account::Account,
  client::ConcentratorClient,
  customer::Customer,
  store::{AccountStore, CustomerDirectory},
};
use selaras_engine::{
  MapRequest, RegistryRow, SyncSummary, projector::MonitorReport,
};

use crate::{AppState, error::ApiError};

// ─── List ─────────────────────────────────────────────────────────────────────

/// One local account with its linked customer resolved.
#[derive(Debug, Serialize)]
pub struct AccountListEntry {
  #[serde(flatten)]
  pub account:  Account,
  pub customer: Option<Customer>,
}

/// `GET /accounts`
pub async fn list<C, S, D>(
  State(state): State<AppState<C, S, D>>,
) -> Result<Json<Vec<AccountListEntry>>, ApiError>
where
  C: ConcentratorClient + 'static,
  S: AccountStore + 'static,
  D: CustomerDirectory + 'static,
{
  let accounts = state
    .store
    .list_all()
    .await
    .map_err(|e| ApiError::Internal(Box::new(e)))?;

  let mut entries = Vec::with_capacity(accounts.len());
  for account in accounts {
    let customer = match account.customer_id {
      Some(id) => state
        .customers
        .find_by_id(id)
        .await
        .map_err(|e| ApiError::Internal(Box::new(e)))?,
      // Dangling references are tolerated; the entry just shows unlinked.
      None => None,
    };
    entries.push(AccountListEntry { account, customer });
  }

  Ok(Json(entries))
}

// ─── Sync ─────────────────────────────────────────────────────────────────────

/// `POST /accounts/sync`
pub async fn sync<C, S, D>(
  State(state): State<AppState<C, S, D>>,
) -> Result<Json<SyncSummary>, ApiError>
where
  C: ConcentratorClient + 'static,
  S: AccountStore + 'static,
  D: CustomerDirectory + 'static,
{
  Ok(Json(state.engine.full_sync().await?))
}

#[derive(Debug, Serialize)]
pub struct ActiveSyncResponse {
  pub online_count: usize,
}

/// `POST /accounts/sync-active`
pub async fn sync_active<C, S, D>(
  State(state): State<AppState<C, S, D>>,
) -> Result<Json<ActiveSyncResponse>, ApiError>
where
  C: ConcentratorClient + 'static,
  S: AccountStore + 'static,
  D: CustomerDirectory + 'static,
{
  let online_count = state.engine.sync_active().await?;
  Ok(Json(ActiveSyncResponse { online_count }))
}

// ─── Mapping ──────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct MapResponse {
  pub status:  &'static str,
  pub message: String,
}

/// `POST /accounts/map` — body: [`MapRequest`].
pub async fn map<C, S, D>(
  State(state): State<AppState<C, S, D>>,
  Json(body): Json<MapRequest>,
) -> Result<Json<MapResponse>, ApiError>
where
  C: ConcentratorClient + 'static,
  S: AccountStore + 'static,
  D: CustomerDirectory + 'static,
{
  if body.username.trim().is_empty() {
    return Err(ApiError::BadRequest("username must not be empty".into()));
  }

  let outcome = state.engine.map_account(body).await?;
  let (status, message) = if outcome.online {
    (
      "online",
      format!("Linked {}. Connected, live data applied.", outcome.username),
    )
  } else {
    (
      "offline",
      format!("Linked {}. Saved, offline default state.", outcome.username),
    )
  };

  Ok(Json(MapResponse { status, message }))
}

// ─── Monitoring / registry views ──────────────────────────────────────────────

/// `GET /accounts/monitor`
pub async fn monitor<C, S, D>(
  State(state): State<AppState<C, S, D>>,
) -> Result<Json<MonitorReport>, ApiError>
where
  C: ConcentratorClient + 'static,
  S: AccountStore + 'static,
  D: CustomerDirectory + 'static,
{
  Ok(Json(state.projector.monitor().await?))
}

/// `GET /accounts/registry`
pub async fn registry<C, S, D>(
  State(state): State<AppState<C, S, D>>,
) -> Result<Json<Vec<RegistryRow>>, ApiError>
where
  C: ConcentratorClient + 'static,
  S: AccountStore + 'static,
  D: CustomerDirectory + 'static,
{
  Ok(Json(state.engine.registry_view().await?))
}
