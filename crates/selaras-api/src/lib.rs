//! JSON REST API for selaras.
//!
//! Exposes an axum [`Router`] backed by any combination of
//! [`ConcentratorClient`], [`AccountStore`] and [`CustomerDirectory`]
//! implementations. Auth, TLS, and transport concerns are the caller's
//! responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", selaras_api::router(state.clone()))
//! ```

pub mod accounts;
pub mod bridge;
pub mod error;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  routing::{get, post},
};
use serde::Deserialize;

use selaras_core::{
  client::ConcentratorClient,
  store::{AccountStore, CustomerDirectory},
};
use selaras_engine::{Reconciler, StatusProjector};

pub use error::ApiError;

// ─── Configuration ────────────────────────────────────────────────────────────

fn default_timeout_secs() -> u64 { 15 }

/// Runtime server configuration, deserialised from `config.toml`.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  pub host:             String,
  pub port:             u16,
  pub store_path:       PathBuf,
  /// Base URL of the concentrator bridge agent.
  pub concentrator_url: String,
  #[serde(default = "default_timeout_secs")]
  pub concentrator_timeout_secs: u64,
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<C, S, D> {
  pub engine:    Arc<Reconciler<C, S, D>>,
  pub projector: Arc<StatusProjector<S, D>>,
  pub store:     Arc<S>,
  pub customers: Arc<D>,
}

impl<C, S, D> Clone for AppState<C, S, D> {
  fn clone(&self) -> Self {
    Self {
      engine:    Arc::clone(&self.engine),
      projector: Arc::clone(&self.projector),
      store:     Arc::clone(&self.store),
      customers: Arc::clone(&self.customers),
    }
  }
}

impl<C, S, D> AppState<C, S, D>
where
  C: ConcentratorClient,
  S: AccountStore + Clone,
  D: CustomerDirectory + Clone,
{
  /// Wire the engine and projector around one client/store/directory set.
  pub fn new(client: C, store: S, customers: D) -> Self {
    Self {
      engine:    Arc::new(Reconciler::new(
        client,
        store.clone(),
        customers.clone(),
      )),
      projector: Arc::new(StatusProjector::new(store.clone(), customers.clone())),
      store:     Arc::new(store),
      customers: Arc::new(customers),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn router<C, S, D>(state: AppState<C, S, D>) -> Router
where
  C: ConcentratorClient + 'static,
  S: AccountStore + 'static,
  D: CustomerDirectory + 'static,
{
  Router::new()
    .route("/accounts", get(accounts::list::<C, S, D>))
    .route("/accounts/registry", get(accounts::registry::<C, S, D>))
    .route("/accounts/sync", post(accounts::sync::<C, S, D>))
    .route("/accounts/sync-active", post(accounts::sync_active::<C, S, D>))
    .route("/accounts/map", post(accounts::map::<C, S, D>))
    .route("/accounts/monitor", get(accounts::monitor::<C, S, D>))
    .with_state(state)
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use selaras_core::{
    account::Account,
    client::ClientError,
    customer::CustomerStatus,
    remote::{RemoteAccountRecord, RemoteSessionRecord},
    store::AccountStore as _,
  };
  use selaras_store_sqlite::SqliteStore;
  use serde_json::{Value, json};
  use tower::ServiceExt as _;
  use uuid::Uuid;

  // ── Fake concentrator ─────────────────────────────────────────────────────

  #[derive(Clone, Default)]
  struct FakeConcentrator {
    reachable: bool,
    accounts:  Vec<RemoteAccountRecord>,
    sessions:  Vec<RemoteSessionRecord>,
  }

  impl selaras_core::ConcentratorClient for FakeConcentrator {
    async fn is_reachable(&self) -> bool { self.reachable }

    async fn list_accounts(
      &self,
    ) -> Result<Vec<RemoteAccountRecord>, ClientError> {
      Ok(self.accounts.clone())
    }

    async fn list_active_sessions(
      &self,
    ) -> Result<Vec<RemoteSessionRecord>, ClientError> {
      Ok(self.sessions.clone())
    }
  }

  // ── Harness ───────────────────────────────────────────────────────────────

  async fn make_state(
    client: FakeConcentrator,
  ) -> (AppState<FakeConcentrator, SqliteStore, SqliteStore>, SqliteStore) {
    let store = SqliteStore::open_in_memory().await.unwrap();
    (AppState::new(client, store.clone(), store.clone()), store)
  }

  async fn request(
    state: AppState<FakeConcentrator, SqliteStore, SqliteStore>,
    method: &str,
    uri: &str,
    body: Option<Value>,
  ) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let req = match body {
      Some(v) => builder
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(v.to_string()))
        .unwrap(),
      None => builder.body(Body::empty()).unwrap(),
    };

    let resp = router(state).oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
      .await
      .unwrap();
    let value = if bytes.is_empty() {
      Value::Null
    } else {
      serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
  }

  fn secret(name: &str) -> RemoteAccountRecord {
    RemoteAccountRecord {
      name: Some(name.into()),
      profile: Some("10M".into()),
      ..Default::default()
    }
  }

  // ── Sync endpoints ────────────────────────────────────────────────────────

  #[tokio::test]
  async fn sync_returns_summary_counts() {
    let client = FakeConcentrator {
      reachable: true,
      accounts: vec![secret("alice"), secret("bob")],
      ..Default::default()
    };
    let (state, _store) = make_state(client).await;

    let (status, body) = request(state, "POST", "/accounts/sync", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["created"], 2);
    assert_eq!(body["updated"], 0);
    assert_eq!(body["total"], 2);
  }

  #[tokio::test]
  async fn sync_unreachable_returns_502() {
    let (state, store) = make_state(FakeConcentrator::default()).await;

    let (status, body) = request(state, "POST", "/accounts/sync", None).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    let message = body["error"].as_str().unwrap();
    assert!(message.contains("liveness"), "error: {message}");
    assert!(store.list_all().await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn sync_active_returns_online_count() {
    let client = FakeConcentrator {
      reachable: true,
      sessions: vec![RemoteSessionRecord {
        name: Some("alice".into()),
        uptime: Some("5m".into()),
        session_id: Some("s1".into()),
        ..Default::default()
      }],
      ..Default::default()
    };
    let (state, store) = make_state(client).await;
    store.upsert(Account::new("alice")).await.unwrap();

    let (status, body) =
      request(state, "POST", "/accounts/sync-active", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["online_count"], 1);
  }

  // ── Mapping ───────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn map_unknown_customer_returns_404() {
    let (state, _store) = make_state(FakeConcentrator::default()).await;

    let body = json!({ "customer_id": Uuid::new_v4(), "username": "alice" });
    let (status, _) = request(state, "POST", "/accounts/map", Some(body)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn map_blank_username_returns_400() {
    let (state, store) = make_state(FakeConcentrator::default()).await;
    let customer = store
      .add_customer("Wahyu", "1001", None, CustomerStatus::Active)
      .await
      .unwrap();

    let body = json!({ "customer_id": customer.id, "username": "  " });
    let (status, _) = request(state, "POST", "/accounts/map", Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn map_offline_reports_saved_state() {
    let (state, store) = make_state(FakeConcentrator::default()).await;
    let customer = store
      .add_customer("Wahyu", "1001", None, CustomerStatus::Pending)
      .await
      .unwrap();

    let body = json!({ "customer_id": customer.id, "username": "wahyu" });
    let (status, value) =
      request(state, "POST", "/accounts/map", Some(body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(value["status"], "offline");
    assert!(
      value["message"].as_str().unwrap().contains("offline default"),
      "message: {value}"
    );
  }

  #[tokio::test]
  async fn map_online_reports_live_state() {
    let client = FakeConcentrator {
      reachable: true,
      sessions: vec![RemoteSessionRecord {
        name: Some("wahyu".into()),
        uptime: Some("1h".into()),
        session_id: Some("s1".into()),
        ..Default::default()
      }],
      ..Default::default()
    };
    let (state, store) = make_state(client).await;
    let customer = store
      .add_customer("Wahyu", "1001", None, CustomerStatus::Active)
      .await
      .unwrap();

    let body = json!({ "customer_id": customer.id, "username": "wahyu" });
    let (status, value) =
      request(state, "POST", "/accounts/map", Some(body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(value["status"], "online");
  }

  // ── Listing and monitoring ────────────────────────────────────────────────

  #[tokio::test]
  async fn accounts_list_includes_linked_customer() {
    let (state, store) = make_state(FakeConcentrator::default()).await;
    let customer = store
      .add_customer("Wahyu", "1001", None, CustomerStatus::Active)
      .await
      .unwrap();
    let mut acc = Account::new("wahyu");
    acc.customer_id = Some(customer.id);
    store.upsert(acc).await.unwrap();
    store.upsert(Account::new("unlinked")).await.unwrap();

    let (status, body) = request(state, "GET", "/accounts", None).await;
    assert_eq!(status, StatusCode::OK);
    let entries = body.as_array().unwrap();
    assert_eq!(entries.len(), 2);

    let linked = entries
      .iter()
      .find(|e| e["username"] == "wahyu")
      .unwrap();
    assert_eq!(linked["customer"]["name"], "Wahyu");

    let unlinked = entries
      .iter()
      .find(|e| e["username"] == "unlinked")
      .unwrap();
    assert!(unlinked["customer"].is_null());
  }

  #[tokio::test]
  async fn monitor_reports_partitioned_stats() {
    let (state, store) = make_state(FakeConcentrator::default()).await;
    let customer = store
      .add_customer("Wahyu", "1001", Some("Fiber 50M"), CustomerStatus::Active)
      .await
      .unwrap();
    let mut acc = Account::new("wahyu");
    acc.customer_id = Some(customer.id);
    store.upsert(acc).await.unwrap();
    // Active but unlinked: excluded from the report entirely.
    store
      .add_customer("Loose", "1002", None, CustomerStatus::Active)
      .await
      .unwrap();

    let (status, body) = request(state, "GET", "/accounts/monitor", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["stats"]["total"], 1);
    assert_eq!(body["stats"]["online"], 0);
    assert_eq!(body["stats"]["offline"], 1);
    assert_eq!(body["data"][0]["pppoe_user"], "wahyu");
    assert_eq!(body["data"][0]["status"], "offline");
  }

  #[tokio::test]
  async fn registry_view_requires_reachable_concentrator() {
    let (state, _store) = make_state(FakeConcentrator::default()).await;
    let (status, _) = request(state, "GET", "/accounts/registry", None).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
  }

  #[tokio::test]
  async fn registry_view_lists_remote_records() {
    let client = FakeConcentrator {
      reachable: true,
      accounts: vec![secret("alice")],
      ..Default::default()
    };
    let (state, _store) = make_state(client).await;

    let (status, body) = request(state, "GET", "/accounts/registry", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["name"], "alice");
    assert_eq!(body[0]["synced"], false);
  }
}
