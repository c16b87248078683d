//! Transient record shapes pulled from the access concentrator, and the
//! boundary normalization that turns its duck-typed "empty" sentinels into
//! proper options before anything else sees them.

use serde::{Deserialize, Serialize};

/// The sentinel string the concentrator uses for "no value".
const EMPTY_SENTINEL: &str = "-";

/// Normalize a remote or operator-supplied field: the `"-"` sentinel and
/// blank strings become `None`, everything else is kept trimmed of nothing.
pub fn normalize_field(value: Option<String>) -> Option<String> {
  value.filter(|v| {
    let v = v.trim();
    !v.is_empty() && v != EMPTY_SENTINEL
  })
}

// ─── Static registry ─────────────────────────────────────────────────────────

/// One entry of the concentrator's configured account registry.
///
/// Field values may still carry the remote empty sentinel; callers normalize
/// with [`normalize_field`] before merging.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteAccountRecord {
  /// Maps to the local account `username`. Records without one are skipped.
  pub name:           Option<String>,
  pub password:       Option<String>,
  pub profile:        Option<String>,
  pub local_address:  Option<String>,
  pub remote_address: Option<String>,
  pub caller_id:      Option<String>,
  #[serde(default)]
  pub disabled:       bool,
}

// ─── Active-session list ─────────────────────────────────────────────────────

/// One entry of the concentrator's live session list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteSessionRecord {
  /// Maps to the local account `username`. Records without one are skipped.
  pub name:            Option<String>,
  pub service:         Option<String>,
  pub uptime:          Option<String>,
  pub session_id:      Option<String>,
  pub encoding:        Option<String>,
  pub limit_bytes_in:  Option<String>,
  pub limit_bytes_out: Option<String>,
  #[serde(default)]
  pub radius:          bool,
  /// The address the session is currently using; overrides the registry's
  /// `remote_address` while connected.
  pub address:         Option<String>,
  /// The caller's hardware address; overrides the registry's `caller_id`
  /// while connected.
  pub caller_id:       Option<String>,
}

#[cfg(test)]
mod tests {
  use super::normalize_field;

  #[test]
  fn sentinel_and_blank_become_none() {
    assert_eq!(normalize_field(Some("-".into())), None);
    assert_eq!(normalize_field(Some("".into())), None);
    assert_eq!(normalize_field(Some("   ".into())), None);
    assert_eq!(normalize_field(None), None);
  }

  #[test]
  fn real_values_pass_through() {
    assert_eq!(
      normalize_field(Some("10.0.0.7".into())),
      Some("10.0.0.7".into())
    );
  }
}
