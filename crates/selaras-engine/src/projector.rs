//! [`StatusProjector`] — the read-only monitoring view.
//!
//! Derives online/offline purely from account store state, so dashboard
//! latency never depends on the concentrator. Holds no write capability by
//! construction: it only ever calls read methods on its collaborators.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use selaras_core::store::{AccountStore, CustomerDirectory};

use crate::{Error, Result};

// ─── Report types ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OnlineStatus {
  Online,
  Offline,
}

/// One monitored subscriber line.
#[derive(Debug, Clone, Serialize)]
pub struct MonitorEntry {
  pub customer_id:     Uuid,
  pub name:            String,
  pub customer_number: String,
  /// Package/plan label from the billing collaborator.
  pub package:         Option<String>,
  pub pppoe_user:      String,
  pub status:          OnlineStatus,
  pub remote_address:  Option<String>,
  pub uptime:          Option<String>,
  pub caller_id:       Option<String>,
  pub last_seen_at:    Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MonitorStats {
  pub total:   usize,
  pub online:  usize,
  pub offline: usize,
}

/// The full monitoring payload.
#[derive(Debug, Clone, Serialize)]
pub struct MonitorReport {
  pub stats: MonitorStats,
  pub data:  Vec<MonitorEntry>,
}

// ─── Projector ───────────────────────────────────────────────────────────────

/// Read-side projection over the account store and customer directory.
pub struct StatusProjector<S, D> {
  store:     S,
  customers: D,
}

impl<S, D> StatusProjector<S, D>
where
  S: AccountStore,
  D: CustomerDirectory,
{
  pub fn new(store: S, customers: D) -> Self {
    Self { store, customers }
  }

  /// Assemble the monitoring report: every active customer with a linked
  /// account, partitioned into online/offline. Customers without a linked
  /// account are excluded rather than failed on.
  pub async fn monitor(&self) -> Result<MonitorReport> {
    let customers = self
      .customers
      .list_active()
      .await
      .map_err(Error::directory)?;

    let mut data = Vec::with_capacity(customers.len());

    for customer in customers {
      let Some(account) = self
        .store
        .find_by_customer(customer.id)
        .await
        .map_err(Error::store)?
      else {
        continue;
      };

      let status = if account.is_online() {
        OnlineStatus::Online
      } else {
        OnlineStatus::Offline
      };

      data.push(MonitorEntry {
        customer_id:     customer.id,
        name:            customer.name,
        customer_number: customer.customer_number,
        package:         customer.package,
        pppoe_user:      account.username.clone(),
        status,
        remote_address:  account.remote_address.clone(),
        uptime:          account.session.live().map(|s| s.uptime.clone()),
        caller_id:       account.caller_id.clone(),
        last_seen_at:    account.last_seen_at,
      });
    }

    let online = data
      .iter()
      .filter(|e| e.status == OnlineStatus::Online)
      .count();
    let stats = MonitorStats {
      total: data.len(),
      online,
      offline: data.len() - online,
    };

    Ok(MonitorReport { stats, data })
  }
}
