//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::Utc;
use selaras_core::{
  account::{Account, LiveSession, SessionState},
  customer::CustomerStatus,
  store::{AccountStore, CustomerDirectory},
};
use uuid::Uuid;

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn live_session(uptime: &str, session_id: &str) -> SessionState {
  SessionState::Live(LiveSession {
    service:         "pppoe".into(),
    uptime:          uptime.into(),
    session_id:      session_id.into(),
    encoding:        "MPPE128".into(),
    limit_bytes_in:  "0".into(),
    limit_bytes_out: "0".into(),
    radius:          false,
  })
}

// ─── Upsert ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn upsert_reports_created_then_updated() {
  let s = store().await;

  let created = s.upsert(Account::new("alice")).await.unwrap();
  assert!(created);

  let mut again = Account::new("alice");
  again.profile = Some("10M".into());
  let created = s.upsert(again).await.unwrap();
  assert!(!created);

  let fetched = s.find_by_username("alice").await.unwrap().unwrap();
  assert_eq!(fetched.profile.as_deref(), Some("10M"));
}

#[tokio::test]
async fn upsert_replaces_whole_row() {
  let s = store().await;

  let mut acc = Account::new("bob");
  acc.password = Some("hunter2".into());
  acc.remote_address = Some("10.0.0.5".into());
  acc.session = live_session("1h2m", "sess-1");
  acc.last_seen_at = Some(Utc::now());
  s.upsert(acc).await.unwrap();

  // A full replace with an offline record clears the session columns.
  let offline = Account::new("bob");
  s.upsert(offline.clone()).await.unwrap();

  let fetched = s.find_by_username("bob").await.unwrap().unwrap();
  assert_eq!(fetched, offline);
  assert!(!fetched.is_online());
}

#[tokio::test]
async fn session_block_roundtrips() {
  let s = store().await;

  let mut acc = Account::new("carol");
  acc.session = live_session("2h3m", "sess-9");
  acc.last_seen_at = Some(Utc::now());
  s.upsert(acc.clone()).await.unwrap();

  let fetched = s.find_by_username("carol").await.unwrap().unwrap();
  assert!(fetched.is_online());
  assert_eq!(fetched.session, acc.session);
  assert_eq!(fetched.last_seen_at, acc.last_seen_at);
}

#[tokio::test]
async fn find_missing_returns_none() {
  let s = store().await;
  assert!(s.find_by_username("nobody").await.unwrap().is_none());
}

// ─── Ownership ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn find_by_customer_returns_linked_account() {
  let s = store().await;
  let customer = s
    .add_customer("Wahyu", "1001", Some("Home 10M"), CustomerStatus::Active)
    .await
    .unwrap();

  let mut acc = Account::new("wahyu");
  acc.customer_id = Some(customer.id);
  s.upsert(acc).await.unwrap();

  let found = s.find_by_customer(customer.id).await.unwrap().unwrap();
  assert_eq!(found.username, "wahyu");

  assert!(s.find_by_customer(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn two_accounts_cannot_reference_one_customer() {
  let s = store().await;
  let customer = s
    .add_customer("Dani", "1002", None, CustomerStatus::Active)
    .await
    .unwrap();

  let mut first = Account::new("dani_a");
  first.customer_id = Some(customer.id);
  s.upsert(first).await.unwrap();

  let mut second = Account::new("dani_b");
  second.customer_id = Some(customer.id);
  let err = s.upsert(second).await;
  assert!(err.is_err(), "second link to one customer must be rejected");
}

// ─── Delete / listing ────────────────────────────────────────────────────────

#[tokio::test]
async fn delete_reports_whether_row_existed() {
  let s = store().await;
  s.upsert(Account::new("gone")).await.unwrap();

  assert!(s.delete("gone").await.unwrap());
  assert!(!s.delete("gone").await.unwrap());
  assert!(s.find_by_username("gone").await.unwrap().is_none());
}

#[tokio::test]
async fn list_all_is_sorted_by_username() {
  let s = store().await;
  s.upsert(Account::new("zeta")).await.unwrap();
  s.upsert(Account::new("alpha")).await.unwrap();

  let all = s.list_all().await.unwrap();
  let names: Vec<_> = all.iter().map(|a| a.username.as_str()).collect();
  assert_eq!(names, ["alpha", "zeta"]);
}

#[tokio::test]
async fn list_where_username_not_in_filters() {
  let s = store().await;
  s.upsert(Account::new("alice")).await.unwrap();
  s.upsert(Account::new("bob")).await.unwrap();
  s.upsert(Account::new("carol")).await.unwrap();

  let rest = s
    .list_where_username_not_in(&["alice".into(), "carol".into()])
    .await
    .unwrap();
  assert_eq!(rest.len(), 1);
  assert_eq!(rest[0].username, "bob");

  // Empty exclusion list returns everything.
  let all = s.list_where_username_not_in(&[]).await.unwrap();
  assert_eq!(all.len(), 3);
}

// ─── Customer directory ──────────────────────────────────────────────────────

#[tokio::test]
async fn customer_roundtrip_and_lookup_by_number() {
  let s = store().await;
  let customer = s
    .add_customer("Lusi", "2001", Some("Fiber 50M"), CustomerStatus::Pending)
    .await
    .unwrap();

  let by_id = s.find_by_id(customer.id).await.unwrap().unwrap();
  assert_eq!(by_id, customer);

  let by_number = s.find_by_number("2001").await.unwrap().unwrap();
  assert_eq!(by_number.id, customer.id);

  assert!(s.find_by_number("9999").await.unwrap().is_none());
}

#[tokio::test]
async fn set_status_promotes_pending_customer() {
  let s = store().await;
  let customer = s
    .add_customer("Sari", "2002", None, CustomerStatus::Pending)
    .await
    .unwrap();

  s.set_status(customer.id, CustomerStatus::Active)
    .await
    .unwrap();

  let fetched = s.find_by_id(customer.id).await.unwrap().unwrap();
  assert_eq!(fetched.status, CustomerStatus::Active);
}

#[tokio::test]
async fn set_status_unknown_customer_errors() {
  let s = store().await;
  let err = s
    .set_status(Uuid::new_v4(), CustomerStatus::Active)
    .await
    .unwrap_err();
  assert!(matches!(err, crate::Error::CustomerNotFound(_)));
}

#[tokio::test]
async fn list_active_filters_by_status() {
  let s = store().await;
  s.add_customer("A", "3001", None, CustomerStatus::Active)
    .await
    .unwrap();
  s.add_customer("B", "3002", None, CustomerStatus::Pending)
    .await
    .unwrap();
  s.add_customer("C", "3003", None, CustomerStatus::Suspended)
    .await
    .unwrap();

  let active = s.list_active().await.unwrap();
  assert_eq!(active.len(), 1);
  assert_eq!(active[0].name, "A");
}
