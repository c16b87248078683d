//! Async HTTP client for the concentrator bridge agent.
//!
//! The agent fronts the access concentrator and exposes its two data sources
//! as plain JSON; the RouterOS wire protocol never reaches this codebase.
//! Every transport failure collapses into [`ClientError`], which the engine
//! treats as the single "unreachable" condition.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use selaras_core::{
  client::{ClientError, ConcentratorClient},
  remote::{RemoteAccountRecord, RemoteSessionRecord},
};

/// Connection settings for the bridge agent.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
  pub base_url:     String,
  pub timeout_secs: u64,
}

/// Async HTTP client implementing [`ConcentratorClient`] over the bridge.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct BridgeClient {
  client:   Client,
  base_url: String,
}

impl BridgeClient {
  pub fn new(config: &BridgeConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(config.timeout_secs))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self {
      client,
      base_url: config.base_url.trim_end_matches('/').to_owned(),
    })
  }

  fn url(&self, path: &str) -> String {
    format!("{}{path}", self.base_url)
  }

  async fn get_json<T: serde::de::DeserializeOwned>(
    &self,
    path: &str,
  ) -> Result<T, ClientError> {
    let resp = self
      .client
      .get(self.url(path))
      .send()
      .await
      .map_err(|e| ClientError(format!("GET {path} failed: {e}")))?;

    if !resp.status().is_success() {
      return Err(ClientError(format!("GET {path} → {}", resp.status())));
    }
    resp
      .json()
      .await
      .map_err(|e| ClientError(format!("deserialising {path}: {e}")))
  }
}

impl ConcentratorClient for BridgeClient {
  async fn is_reachable(&self) -> bool {
    match self.client.get(self.url("/health")).send().await {
      Ok(resp) => resp.status().is_success(),
      Err(_) => false,
    }
  }

  async fn list_accounts(&self) -> Result<Vec<RemoteAccountRecord>, ClientError> {
    self.get_json("/ppp/accounts").await
  }

  async fn list_active_sessions(
    &self,
  ) -> Result<Vec<RemoteSessionRecord>, ClientError> {
    self.get_json("/ppp/active").await
  }
}
