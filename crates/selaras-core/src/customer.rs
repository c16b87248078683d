//! The billing customer as seen from the reconciliation engine.
//!
//! Customers are owned by the surrounding back-office application; the
//! engine only reads them, links accounts to them, and performs the single
//! pending → active promotion after a successful mapping.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Billing lifecycle state of a customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CustomerStatus {
  Pending,
  Active,
  Inactive,
  Suspended,
}

/// A customer record, referenced (never owned) by at most one account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
  pub id:              Uuid,
  pub name:            String,
  /// Back-office subscriber number; used by the auto-link heuristic when it
  /// matches a registry username.
  pub customer_number: String,
  /// Package/plan label supplied by the billing collaborator.
  pub package:         Option<String>,
  pub status:          CustomerStatus,
}
