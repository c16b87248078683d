//! [`Reconciler`] — the three write-side reconciliation operations.
//!
//! | operation | remote pulls | creates rows | touches ownership |
//! |---|---|---|---|
//! | [`full_sync`](Reconciler::full_sync) | registry + sessions | yes | auto-link only |
//! | [`sync_active`](Reconciler::sync_active) | sessions | never | never |
//! | [`map_account`](Reconciler::map_account) | sessions (best-effort) | yes | yes |

use std::collections::HashMap;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use selaras_core::{
  account::{Account, LiveSession, SessionState},
  client::{ConcentratorClient, RemoteCall},
  customer::CustomerStatus,
  remote::{RemoteAccountRecord, RemoteSessionRecord, normalize_field},
  store::{AccountStore, CustomerDirectory},
};

use crate::{Error, Result};

// ─── Operation results ───────────────────────────────────────────────────────

/// Counts returned by a full sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SyncSummary {
  /// Accounts newly created this pass.
  pub created: usize,
  /// Accounts that already existed and were replaced.
  pub updated: usize,
  /// Registry records processed (nameless records are skipped and not
  /// counted).
  pub total:   usize,
}

/// Operator input to [`Reconciler::map_account`]. Optional fields equal to
/// the remote empty sentinel or blank are treated as absent.
#[derive(Debug, Clone, Deserialize)]
pub struct MapRequest {
  pub customer_id:    Uuid,
  pub username:       String,
  pub password:       Option<String>,
  pub profile:        Option<String>,
  pub local_address:  Option<String>,
  pub remote_address: Option<String>,
  pub caller_id:      Option<String>,
}

/// What a mapping resulted in, for operator display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MapOutcome {
  pub username: String,
  /// `true` when a live session was found and applied during the mapping.
  pub online:   bool,
}

/// One row of the live-registry view: a registry entry annotated with its
/// local link state.
#[derive(Debug, Clone, Serialize)]
pub struct RegistryRow {
  pub name:           String,
  pub password:       Option<String>,
  pub profile:        Option<String>,
  pub local_address:  Option<String>,
  pub remote_address: Option<String>,
  pub caller_id:      Option<String>,
  pub disabled:       bool,
  /// Whether a local account row exists for this username.
  pub synced:         bool,
  pub customer:       Option<LinkedCustomer>,
}

/// Identity of the customer a registry entry is linked to locally.
#[derive(Debug, Clone, Serialize)]
pub struct LinkedCustomer {
  pub id:              Uuid,
  pub name:            String,
  pub customer_number: String,
}

// ─── Merge helpers ───────────────────────────────────────────────────────────

/// Build the dynamic block from a session record, defaulting the fields the
/// concentrator omits.
fn live_session_from(record: &RemoteSessionRecord) -> LiveSession {
  LiveSession {
    service:         record
      .service
      .clone()
      .unwrap_or_else(|| "pppoe".to_owned()),
    uptime:          record.uptime.clone().unwrap_or_default(),
    session_id:      record.session_id.clone().unwrap_or_default(),
    encoding:        record.encoding.clone().unwrap_or_default(),
    limit_bytes_in:  record
      .limit_bytes_in
      .clone()
      .unwrap_or_else(|| "0".to_owned()),
    limit_bytes_out: record
      .limit_bytes_out
      .clone()
      .unwrap_or_else(|| "0".to_owned()),
    radius:          record.radius,
  }
}

/// Index session records by username, dropping nameless entries.
fn sessions_by_name(
  sessions: Vec<RemoteSessionRecord>,
) -> HashMap<String, RemoteSessionRecord> {
  sessions
    .into_iter()
    .filter_map(|s| {
      let name = s.name.clone().filter(|n| !n.trim().is_empty())?;
      Some((name, s))
    })
    .collect()
}

// ─── Reconciler ──────────────────────────────────────────────────────────────

/// The reconciliation engine, generic over its three collaborators.
pub struct Reconciler<C, S, D> {
  client:    C,
  store:     S,
  customers: D,
}

impl<C, S, D> Reconciler<C, S, D>
where
  C: ConcentratorClient,
  S: AccountStore,
  D: CustomerDirectory,
{
  pub fn new(client: C, store: S, customers: D) -> Self {
    Self { client, store, customers }
  }

  /// Fail fast unless the concentrator answers its liveness probe.
  async fn require_reachable(&self) -> Result<()> {
    if self.client.is_reachable().await {
      Ok(())
    } else {
      Err(Error::RemoteUnreachable(RemoteCall::Liveness))
    }
  }

  // ── Full sync ─────────────────────────────────────────────────────────────

  /// Merge the static registry and the active-session list into the local
  /// store, one full-record upsert per username.
  ///
  /// Performs no writes at all if any remote pull fails.
  pub async fn full_sync(&self) -> Result<SyncSummary> {
    self.require_reachable().await?;

    let records = self
      .client
      .list_accounts()
      .await
      .map_err(|_| Error::RemoteUnreachable(RemoteCall::Registry))?;
    let sessions = self
      .client
      .list_active_sessions()
      .await
      .map_err(|_| Error::RemoteUnreachable(RemoteCall::ActiveSessions))?;

    let active = sessions_by_name(sessions);

    let mut created = 0;
    let mut updated = 0;
    let mut total = 0;

    for record in records {
      let Some(name) = record
        .name
        .clone()
        .filter(|n| !n.trim().is_empty())
      else {
        debug!("skipping registry record with no name");
        continue;
      };
      total += 1;

      let existing = self
        .store
        .find_by_username(&name)
        .await
        .map_err(Error::store)?;

      let mut account =
        merged_account(&name, &record, active.get(&name), existing.as_ref());

      // Auto-link: a customer whose number equals the username claims an
      // unlinked account. An existing link is never overwritten, and a
      // customer already owning some other account is left alone —
      // ownership stays unique.
      if account.customer_id.is_none() {
        if let Some(customer) = self
          .customers
          .find_by_number(&name)
          .await
          .map_err(Error::directory)?
        {
          let already_owns = self
            .store
            .find_by_customer(customer.id)
            .await
            .map_err(Error::store)?
            .is_some();
          if !already_owns {
            debug!(username = %name, customer = %customer.id, "auto-linked by customer number");
            account.customer_id = Some(customer.id);
          }
        }
      }

      if self.store.upsert(account).await.map_err(Error::store)? {
        created += 1;
      } else {
        updated += 1;
      }
    }

    info!(created, updated, total, "full sync complete");
    Ok(SyncSummary { created, updated, total })
  }

  // ── Active-only sync ──────────────────────────────────────────────────────

  /// Cheap refresh of online/offline state from the active-session list
  /// alone. Never creates rows and never touches customer links; accounts
  /// absent from the pull get their session block cleared while their
  /// address history stays put.
  ///
  /// Returns the number of accounts currently online.
  pub async fn sync_active(&self) -> Result<usize> {
    self.require_reachable().await?;

    let sessions = self
      .client
      .list_active_sessions()
      .await
      .map_err(|_| Error::RemoteUnreachable(RemoteCall::ActiveSessions))?;

    let now = Utc::now();
    let mut online_names: Vec<String> = Vec::new();
    let mut online = 0;

    for (name, session) in sessions_by_name(sessions) {
      online_names.push(name.clone());

      let Some(mut account) = self
        .store
        .find_by_username(&name)
        .await
        .map_err(Error::store)?
      else {
        // Unknown to the local store; a later full sync will pick it up.
        continue;
      };

      account.remote_address =
        session.address.clone().or(account.remote_address);
      account.caller_id = session.caller_id.clone().or(account.caller_id);
      account.session = SessionState::Live(live_session_from(&session));
      account.last_seen_at = Some(now);

      self.store.upsert(account).await.map_err(Error::store)?;
      online += 1;
    }

    // Bulk mark-offline for everything the pull did not mention.
    let stale = self
      .store
      .list_where_username_not_in(&online_names)
      .await
      .map_err(Error::store)?;

    for mut account in stale {
      if account.session.is_live() {
        account.session = SessionState::Offline;
        self.store.upsert(account).await.map_err(Error::store)?;
      }
    }

    info!(online, "active-only sync complete");
    Ok(online)
  }

  // ── Mapping / rebinding ───────────────────────────────────────────────────

  /// Bind `request.customer_id` to the account `request.username`, evicting
  /// the customer's prior differently-named account and applying live
  /// session data when the concentrator answers.
  ///
  /// An unreachable concentrator is not fatal here — the mapping completes
  /// with offline defaults. Only an unknown customer aborts.
  pub async fn map_account(&self, request: MapRequest) -> Result<MapOutcome> {
    let customer = self
      .customers
      .find_by_id(request.customer_id)
      .await
      .map_err(Error::directory)?
      .ok_or(Error::CustomerNotFound(request.customer_id))?;

    let username = request.username.trim().to_owned();

    // Evict the prior binding: a customer's history follows their active
    // account, so a superseded account is deleted, not unlinked.
    if let Some(old) = self
      .store
      .find_by_customer(customer.id)
      .await
      .map_err(Error::store)?
    {
      if old.username != username {
        info!(
          customer = %customer.id,
          old = %old.username,
          new = %username,
          "evicting superseded account"
        );
        self
          .store
          .delete(&old.username)
          .await
          .map_err(Error::store)?;
      }
    }

    // Best-effort live lookup.
    let session = self.find_session(&username).await;

    // The existing row only contributes its registry-sourced disabled
    // flag; everything else is recomputed from operator input + session.
    let disabled = self
      .store
      .find_by_username(&username)
      .await
      .map_err(Error::store)?
      .map(|a| a.disabled)
      .unwrap_or(false);

    let now = Utc::now();
    let online = session.is_some();

    let account = Account {
      username:       username.clone(),
      customer_id:    Some(customer.id),
      password:       normalize_field(request.password),
      profile:        normalize_field(request.profile),
      local_address:  normalize_field(request.local_address),
      remote_address: session
        .as_ref()
        .and_then(|s| s.address.clone())
        .or_else(|| normalize_field(request.remote_address)),
      caller_id:      session
        .as_ref()
        .and_then(|s| s.caller_id.clone())
        .or_else(|| normalize_field(request.caller_id)),
      disabled,
      session:        match &session {
        Some(s) => SessionState::Live(live_session_from(s)),
        // `last_seen_at` still gets stamped: it marks the mapping action
        // itself when no session was observed.
        None => SessionState::Offline,
      },
      last_seen_at:   Some(now),
    };

    // One replace-by-key write covers create, update, and the implicit
    // last-write-wins takeover from a previous different owner.
    self.store.upsert(account).await.map_err(Error::store)?;

    if customer.status == CustomerStatus::Pending {
      self
        .customers
        .set_status(customer.id, CustomerStatus::Active)
        .await
        .map_err(Error::directory)?;
    }

    info!(customer = %customer.id, %username, online, "mapping complete");
    Ok(MapOutcome { username, online })
  }

  /// The live session for `username`, if the concentrator is reachable and
  /// reports one. Transport failures are logged and swallowed.
  async fn find_session(&self, username: &str) -> Option<RemoteSessionRecord> {
    if !self.client.is_reachable().await {
      warn!(%username, "concentrator unreachable; mapping with offline defaults");
      return None;
    }
    match self.client.list_active_sessions().await {
      Ok(sessions) => sessions
        .into_iter()
        .find(|s| s.name.as_deref() == Some(username)),
      Err(e) => {
        warn!(%username, error = %e, "session pull failed; mapping with offline defaults");
        None
      }
    }
  }

  // ── Registry view ─────────────────────────────────────────────────────────

  /// The concentrator's registry annotated per row with local link state —
  /// the operator's secrets-table view. Read-only on the store.
  pub async fn registry_view(&self) -> Result<Vec<RegistryRow>> {
    self.require_reachable().await?;

    let records = self
      .client
      .list_accounts()
      .await
      .map_err(|_| Error::RemoteUnreachable(RemoteCall::Registry))?;

    let mut rows = Vec::with_capacity(records.len());
    for record in records {
      let Some(name) = record
        .name
        .clone()
        .filter(|n| !n.trim().is_empty())
      else {
        continue;
      };

      let local = self
        .store
        .find_by_username(&name)
        .await
        .map_err(Error::store)?;

      let customer = match local.as_ref().and_then(|a| a.customer_id) {
        Some(id) => self
          .customers
          .find_by_id(id)
          .await
          .map_err(Error::directory)?
          .map(|c| LinkedCustomer {
            id:              c.id,
            name:            c.name,
            customer_number: c.customer_number,
          }),
        None => None,
      };

      rows.push(RegistryRow {
        name,
        password:       record.password.clone(),
        profile:        record.profile.clone(),
        local_address:  normalize_field(record.local_address.clone()),
        remote_address: normalize_field(record.remote_address.clone()),
        caller_id:      normalize_field(record.caller_id.clone()),
        disabled:       record.disabled,
        synced:         local.is_some(),
        customer,
      });
    }

    Ok(rows)
  }
}

/// Recompute the full merged record for one registry entry.
///
/// Static fields come from the registry (sentinels normalized); the session
/// overrides the two address/caller fields and supplies the dynamic block.
/// Only the customer link and — while offline — the last-seen timestamp
/// survive from the existing row.
fn merged_account(
  name: &str,
  record: &RemoteAccountRecord,
  session: Option<&RemoteSessionRecord>,
  existing: Option<&Account>,
) -> Account {
  let remote_address = normalize_field(record.remote_address.clone());
  let caller_id = normalize_field(record.caller_id.clone());

  let mut account = Account {
    username:       name.to_owned(),
    customer_id:    existing.and_then(|a| a.customer_id),
    password:       record.password.clone(),
    profile:        record.profile.clone(),
    local_address:  normalize_field(record.local_address.clone()),
    remote_address,
    caller_id,
    disabled:       record.disabled,
    session:        SessionState::Offline,
    // Offline accounts keep their history; a live session restamps below.
    last_seen_at:   existing.and_then(|a| a.last_seen_at),
  };

  if let Some(session) = session {
    account.remote_address =
      session.address.clone().or(account.remote_address);
    account.caller_id = session.caller_id.clone().or(account.caller_id);
    account.session = SessionState::Live(live_session_from(session));
    account.last_seen_at = Some(Utc::now());
  }

  account
}
