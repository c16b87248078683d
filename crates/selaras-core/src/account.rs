//! The local PPPoE account record — the authoritative row the engine
//! reconciles remote concentrator state into.
//!
//! An account is keyed by its `username`. Static fields come from the
//! concentrator's configured registry; the dynamic session block exists only
//! while the account has a live session and is modelled as a tagged union so
//! the fields can never be half-populated.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ─── Session block ───────────────────────────────────────────────────────────

/// Session metrics reported by the concentrator for a connected account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveSession {
  /// Tunnel service type; the concentrator omits it for plain links.
  pub service:         String,
  pub uptime:          String,
  pub session_id:      String,
  /// Link encryption; empty when the concentrator reports none.
  pub encoding:        String,
  /// Byte limits kept verbatim as the concentrator reports them.
  pub limit_bytes_in:  String,
  pub limit_bytes_out: String,
  /// Whether the session was authenticated via RADIUS.
  pub radius:          bool,
}

/// The dynamic half of an account: either fully populated (session active)
/// or fully cleared (session ended). There is no partially-populated state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SessionState {
  Offline,
  Live(LiveSession),
}

impl SessionState {
  pub fn is_live(&self) -> bool { matches!(self, Self::Live(_)) }

  /// The session the account currently has, if any.
  pub fn live(&self) -> Option<&LiveSession> {
    match self {
      Self::Live(s) => Some(s),
      Self::Offline => None,
    }
  }
}

// ─── Account ─────────────────────────────────────────────────────────────────

/// A local PPPoE account row.
///
/// Created by the first sync or mapping that observes a username; replaced
/// wholesale on every subsequent write. Absence from the remote registry
/// never deletes the row — it only clears the session block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
  /// Globally unique, immutable identity; primary key.
  pub username:       String,
  /// The owning customer, if the account has been linked. At most one
  /// account may reference a given customer at any time.
  pub customer_id:    Option<Uuid>,

  // Static fields, sourced from the registry (live session data overrides
  // the two address/caller fields while connected).
  pub password:       Option<String>,
  pub profile:        Option<String>,
  pub local_address:  Option<String>,
  pub remote_address: Option<String>,
  pub caller_id:      Option<String>,
  pub disabled:       bool,

  /// Dynamic session block; see [`SessionState`].
  pub session:        SessionState,
  /// When the account was last observed with a live session. Survives the
  /// session ending so operators keep "last seen" history.
  pub last_seen_at:   Option<DateTime<Utc>>,
}

impl Account {
  /// A fresh, unlinked, offline account for `username`.
  pub fn new(username: impl Into<String>) -> Self {
    Self {
      username:       username.into(),
      customer_id:    None,
      password:       None,
      profile:        None,
      local_address:  None,
      remote_address: None,
      caller_id:      None,
      disabled:       false,
      session:        SessionState::Offline,
      last_seen_at:   None,
    }
  }

  /// Derived online flag — never stored independently of the session block
  /// it derives from.
  pub fn is_online(&self) -> bool { self.session.is_live() }
}
