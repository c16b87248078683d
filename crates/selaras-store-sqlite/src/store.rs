//! [`SqliteStore`] — the SQLite implementation of [`AccountStore`] and
//! [`CustomerDirectory`].

use std::path::Path;

use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use selaras_core::{
  account::Account,
  customer::{Customer, CustomerStatus},
  store::{AccountStore, CustomerDirectory},
};

use crate::{
  Error, Result,
  encode::{
    ACCOUNT_COLUMNS, AccountColumns, RawAccount, RawCustomer, encode_status,
    encode_uuid,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A selaras store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted. All calls
/// for one connection are serialised onto its worker thread, which is what
/// makes [`AccountStore::upsert`] atomic per key.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Insert a customer row. Customers are owned by the surrounding
  /// back-office application; this exists for seeding and tests.
  pub async fn add_customer(
    &self,
    name: &str,
    customer_number: &str,
    package: Option<&str>,
    status: CustomerStatus,
  ) -> Result<Customer> {
    let customer = Customer {
      id: Uuid::new_v4(),
      name: name.to_owned(),
      customer_number: customer_number.to_owned(),
      package: package.map(str::to_owned),
      status,
    };

    let id_str     = encode_uuid(customer.id);
    let name_owned = customer.name.clone();
    let number     = customer.customer_number.clone();
    let package    = customer.package.clone();
    let status_str = encode_status(customer.status).to_owned();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO customers (customer_id, name, customer_number, package, status)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![id_str, name_owned, number, package, status_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(customer)
  }
}

// ─── AccountStore impl ───────────────────────────────────────────────────────

impl AccountStore for SqliteStore {
  type Error = Error;

  async fn upsert(&self, account: Account) -> Result<bool> {
    let cols = AccountColumns::from_account(&account);

    // Existence probe + write happen inside one connection call, so the
    // pair is atomic with respect to every other store operation.
    let created: bool = self
      .conn
      .call(move |conn| {
        let exists: bool = conn
          .query_row(
            "SELECT 1 FROM pppoe_accounts WHERE username = ?1",
            rusqlite::params![cols.username],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);

        conn.execute(
          "INSERT INTO pppoe_accounts (
             username, customer_id, password, profile,
             local_address, remote_address, caller_id, disabled,
             service, uptime, session_id, encoding,
             limit_bytes_in, limit_bytes_out, radius, last_seen_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)
           ON CONFLICT(username) DO UPDATE SET
             customer_id     = excluded.customer_id,
             password        = excluded.password,
             profile         = excluded.profile,
             local_address   = excluded.local_address,
             remote_address  = excluded.remote_address,
             caller_id       = excluded.caller_id,
             disabled        = excluded.disabled,
             service         = excluded.service,
             uptime          = excluded.uptime,
             session_id      = excluded.session_id,
             encoding        = excluded.encoding,
             limit_bytes_in  = excluded.limit_bytes_in,
             limit_bytes_out = excluded.limit_bytes_out,
             radius          = excluded.radius,
             last_seen_at    = excluded.last_seen_at",
          rusqlite::params![
            cols.username,
            cols.customer_id,
            cols.password,
            cols.profile,
            cols.local_address,
            cols.remote_address,
            cols.caller_id,
            cols.disabled,
            cols.service,
            cols.uptime,
            cols.session_id,
            cols.encoding,
            cols.limit_bytes_in,
            cols.limit_bytes_out,
            cols.radius,
            cols.last_seen_at,
          ],
        )?;

        Ok(!exists)
      })
      .await?;

    Ok(created)
  }

  async fn find_by_username(&self, username: &str) -> Result<Option<Account>> {
    let username = username.to_owned();
    let sql = format!(
      "SELECT {ACCOUNT_COLUMNS} FROM pppoe_accounts WHERE username = ?1"
    );

    let raw: Option<RawAccount> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(&sql, rusqlite::params![username], RawAccount::from_row)
            .optional()?,
        )
      })
      .await?;

    raw.map(RawAccount::into_account).transpose()
  }

  async fn find_by_customer(&self, customer_id: Uuid) -> Result<Option<Account>> {
    let id_str = encode_uuid(customer_id);
    let sql = format!(
      "SELECT {ACCOUNT_COLUMNS} FROM pppoe_accounts WHERE customer_id = ?1"
    );

    let raw: Option<RawAccount> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(&sql, rusqlite::params![id_str], RawAccount::from_row)
            .optional()?,
        )
      })
      .await?;

    raw.map(RawAccount::into_account).transpose()
  }

  async fn delete(&self, username: &str) -> Result<bool> {
    let username = username.to_owned();

    let removed: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM pppoe_accounts WHERE username = ?1",
          rusqlite::params![username],
        )?)
      })
      .await?;

    Ok(removed > 0)
  }

  async fn list_all(&self) -> Result<Vec<Account>> {
    let sql = format!(
      "SELECT {ACCOUNT_COLUMNS} FROM pppoe_accounts ORDER BY username"
    );

    let raws: Vec<RawAccount> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map([], RawAccount::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawAccount::into_account).collect()
  }

  async fn list_where_username_not_in(
    &self,
    usernames: &[String],
  ) -> Result<Vec<Account>> {
    let usernames = usernames.to_vec();

    let raws: Vec<RawAccount> = self
      .conn
      .call(move |conn| {
        let sql = if usernames.is_empty() {
          format!("SELECT {ACCOUNT_COLUMNS} FROM pppoe_accounts")
        } else {
          let placeholders = (1..=usernames.len())
            .map(|i| format!("?{i}"))
            .collect::<Vec<_>>()
            .join(", ");
          format!(
            "SELECT {ACCOUNT_COLUMNS} FROM pppoe_accounts
             WHERE username NOT IN ({placeholders})"
          )
        };

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(
            rusqlite::params_from_iter(usernames.iter()),
            RawAccount::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawAccount::into_account).collect()
  }
}

// ─── CustomerDirectory impl ──────────────────────────────────────────────────

const CUSTOMER_COLUMNS: &str =
  "customer_id, name, customer_number, package, status";

impl CustomerDirectory for SqliteStore {
  type Error = Error;

  async fn find_by_id(&self, id: Uuid) -> Result<Option<Customer>> {
    let id_str = encode_uuid(id);
    let sql =
      format!("SELECT {CUSTOMER_COLUMNS} FROM customers WHERE customer_id = ?1");

    let raw: Option<RawCustomer> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(&sql, rusqlite::params![id_str], RawCustomer::from_row)
            .optional()?,
        )
      })
      .await?;

    raw.map(RawCustomer::into_customer).transpose()
  }

  async fn find_by_number(&self, number: &str) -> Result<Option<Customer>> {
    let number = number.to_owned();
    let sql = format!(
      "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE customer_number = ?1"
    );

    let raw: Option<RawCustomer> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(&sql, rusqlite::params![number], RawCustomer::from_row)
            .optional()?,
        )
      })
      .await?;

    raw.map(RawCustomer::into_customer).transpose()
  }

  async fn set_status(&self, id: Uuid, status: CustomerStatus) -> Result<()> {
    let id_str     = encode_uuid(id);
    let status_str = encode_status(status).to_owned();

    let updated: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE customers SET status = ?2 WHERE customer_id = ?1",
          rusqlite::params![id_str, status_str],
        )?)
      })
      .await?;

    if updated == 0 {
      return Err(Error::CustomerNotFound(id));
    }
    Ok(())
  }

  async fn list_active(&self) -> Result<Vec<Customer>> {
    let sql = format!(
      "SELECT {CUSTOMER_COLUMNS} FROM customers
       WHERE status = 'active' ORDER BY name"
    );

    let raws: Vec<RawCustomer> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map([], RawCustomer::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawCustomer::into_customer).collect()
  }
}
