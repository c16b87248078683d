//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings. UUIDs are stored as
//! hyphenated lowercase strings. The dynamic session block maps to seven
//! nullable columns that are written together or not at all.

use chrono::{DateTime, Utc};
use selaras_core::{
  account::{Account, LiveSession, SessionState},
  customer::{Customer, CustomerStatus},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── CustomerStatus ──────────────────────────────────────────────────────────

pub fn encode_status(s: CustomerStatus) -> &'static str {
  match s {
    CustomerStatus::Pending => "pending",
    CustomerStatus::Active => "active",
    CustomerStatus::Inactive => "inactive",
    CustomerStatus::Suspended => "suspended",
  }
}

pub fn decode_status(s: &str) -> Result<CustomerStatus> {
  match s {
    "pending" => Ok(CustomerStatus::Pending),
    "active" => Ok(CustomerStatus::Active),
    "inactive" => Ok(CustomerStatus::Inactive),
    "suspended" => Ok(CustomerStatus::Suspended),
    other => Err(Error::UnknownStatus(other.to_owned())),
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `pppoe_accounts` row.
pub struct RawAccount {
  pub username:        String,
  pub customer_id:     Option<String>,
  pub password:        Option<String>,
  pub profile:         Option<String>,
  pub local_address:   Option<String>,
  pub remote_address:  Option<String>,
  pub caller_id:       Option<String>,
  pub disabled:        bool,
  pub service:         Option<String>,
  pub uptime:          Option<String>,
  pub session_id:      Option<String>,
  pub encoding:        Option<String>,
  pub limit_bytes_in:  Option<String>,
  pub limit_bytes_out: Option<String>,
  pub radius:          Option<bool>,
  pub last_seen_at:    Option<String>,
}

/// Column list matching [`RawAccount`] field order; shared by every SELECT.
pub const ACCOUNT_COLUMNS: &str = "username, customer_id, password, profile, \
   local_address, remote_address, caller_id, disabled, service, uptime, \
   session_id, encoding, limit_bytes_in, limit_bytes_out, radius, last_seen_at";

impl RawAccount {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      username:        row.get(0)?,
      customer_id:     row.get(1)?,
      password:        row.get(2)?,
      profile:         row.get(3)?,
      local_address:   row.get(4)?,
      remote_address:  row.get(5)?,
      caller_id:       row.get(6)?,
      disabled:        row.get(7)?,
      service:         row.get(8)?,
      uptime:          row.get(9)?,
      session_id:      row.get(10)?,
      encoding:        row.get(11)?,
      limit_bytes_in:  row.get(12)?,
      limit_bytes_out: row.get(13)?,
      radius:          row.get(14)?,
      last_seen_at:    row.get(15)?,
    })
  }

  pub fn into_account(self) -> Result<Account> {
    let customer_id = self
      .customer_id
      .as_deref()
      .map(decode_uuid)
      .transpose()?;

    let last_seen_at = self
      .last_seen_at
      .as_deref()
      .map(decode_dt)
      .transpose()?;

    // An account is live iff both uptime and session_id were written; the
    // remaining session columns default when a backfilled row lacks them.
    let session = match (self.uptime, self.session_id) {
      (Some(uptime), Some(session_id)) => SessionState::Live(LiveSession {
        service: self.service.unwrap_or_else(|| "pppoe".to_owned()),
        uptime,
        session_id,
        encoding: self.encoding.unwrap_or_default(),
        limit_bytes_in: self.limit_bytes_in.unwrap_or_else(|| "0".to_owned()),
        limit_bytes_out: self.limit_bytes_out.unwrap_or_else(|| "0".to_owned()),
        radius: self.radius.unwrap_or(false),
      }),
      _ => SessionState::Offline,
    };

    Ok(Account {
      username: self.username,
      customer_id,
      password: self.password,
      profile: self.profile,
      local_address: self.local_address,
      remote_address: self.remote_address,
      caller_id: self.caller_id,
      disabled: self.disabled,
      session,
      last_seen_at,
    })
  }
}

/// The flattened column values for writing an [`Account`].
pub struct AccountColumns {
  pub username:        String,
  pub customer_id:     Option<String>,
  pub password:        Option<String>,
  pub profile:         Option<String>,
  pub local_address:   Option<String>,
  pub remote_address:  Option<String>,
  pub caller_id:       Option<String>,
  pub disabled:        bool,
  pub service:         Option<String>,
  pub uptime:          Option<String>,
  pub session_id:      Option<String>,
  pub encoding:        Option<String>,
  pub limit_bytes_in:  Option<String>,
  pub limit_bytes_out: Option<String>,
  pub radius:          Option<bool>,
  pub last_seen_at:    Option<String>,
}

impl AccountColumns {
  pub fn from_account(account: &Account) -> Self {
    let (service, uptime, session_id, encoding, lbi, lbo, radius) =
      match &account.session {
        SessionState::Live(s) => (
          Some(s.service.clone()),
          Some(s.uptime.clone()),
          Some(s.session_id.clone()),
          Some(s.encoding.clone()),
          Some(s.limit_bytes_in.clone()),
          Some(s.limit_bytes_out.clone()),
          Some(s.radius),
        ),
        SessionState::Offline => (None, None, None, None, None, None, None),
      };

    Self {
      username:        account.username.clone(),
      customer_id:     account.customer_id.map(encode_uuid),
      password:        account.password.clone(),
      profile:         account.profile.clone(),
      local_address:   account.local_address.clone(),
      remote_address:  account.remote_address.clone(),
      caller_id:       account.caller_id.clone(),
      disabled:        account.disabled,
      service,
      uptime,
      session_id,
      encoding,
      limit_bytes_in:  lbi,
      limit_bytes_out: lbo,
      radius,
      last_seen_at:    account.last_seen_at.map(encode_dt),
    }
  }
}

/// Raw strings read directly from a `customers` row.
pub struct RawCustomer {
  pub customer_id:     String,
  pub name:            String,
  pub customer_number: String,
  pub package:         Option<String>,
  pub status:          String,
}

impl RawCustomer {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      customer_id:     row.get(0)?,
      name:            row.get(1)?,
      customer_number: row.get(2)?,
      package:         row.get(3)?,
      status:          row.get(4)?,
    })
  }

  pub fn into_customer(self) -> Result<Customer> {
    Ok(Customer {
      id:              decode_uuid(&self.customer_id)?,
      name:            self.name,
      customer_number: self.customer_number,
      package:         self.package,
      status:          decode_status(&self.status)?,
    })
  }
}
