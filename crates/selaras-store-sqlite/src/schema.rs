//! SQL schema for the selaras SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS customers (
    customer_id     TEXT PRIMARY KEY,
    name            TEXT NOT NULL,
    customer_number TEXT NOT NULL,
    package         TEXT,
    status          TEXT NOT NULL DEFAULT 'pending',  -- pending|active|inactive|suspended
    UNIQUE (customer_number)
);

-- One row per PPPoE account, keyed by username. Every write replaces the
-- whole row. The dynamic session columns are either all set or all NULL.
CREATE TABLE IF NOT EXISTS pppoe_accounts (
    username        TEXT PRIMARY KEY,
    customer_id     TEXT REFERENCES customers(customer_id),
    password        TEXT,
    profile         TEXT,
    local_address   TEXT,
    remote_address  TEXT,
    caller_id       TEXT,
    disabled        INTEGER NOT NULL DEFAULT 0,
    service         TEXT,
    uptime          TEXT,
    session_id      TEXT,
    encoding        TEXT,
    limit_bytes_in  TEXT,
    limit_bytes_out TEXT,
    radius          INTEGER,
    last_seen_at    TEXT,              -- ISO 8601 UTC
    UNIQUE (customer_id)               -- a customer owns at most one account
);

CREATE INDEX IF NOT EXISTS accounts_customer_idx ON pppoe_accounts(customer_id);
CREATE INDEX IF NOT EXISTS customers_status_idx  ON customers(status);

PRAGMA user_version = 1;
";
