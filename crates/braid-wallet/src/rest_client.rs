use anyhow::{bail, Context};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use braid_core::transaction::TransactionCreate;
use braid_core::types::WalletId;

#[derive(Deserialize)]
struct Envelope<T> {
    #[allow(dead_code)]
    message: serde_json::Value,
    data: T,
}

/// Minimal REST client for a running braidnet node.
pub struct NodeClient {
    http: reqwest::Client,
    base_url: String,
    api_name: String,
}

impl NodeClient {
    pub fn new(base_url: &str, api_name: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_name: api_name.to_string(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/api/v1/{}/{}", self.base_url, self.api_name, path)
    }

    async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> anyhow::Result<T> {
        let response = self
            .http
            .post(self.endpoint(path))
            .json(body)
            .send()
            .await
            .with_context(|| format!("connecting to node at {}", self.base_url))?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response
                .json::<serde_json::Value>()
                .await
                .ok()
                .and_then(|v| v["detail"].as_str().map(String::from))
                .unwrap_or_else(|| "no detail".to_string());
            bail!("node rejected the request ({status}): {detail}");
        }

        let envelope: Envelope<T> = response.json().await.context("parsing node response")?;
        Ok(envelope.data)
    }

    /// Last admitted nonce for a wallet (0 when unseen). The next
    /// transaction should use this plus one.
    pub async fn get_nonce(&self, public_key: &WalletId) -> anyhow::Result<u64> {
        self.post_json(
            "wallets/nonce/",
            &serde_json::json!({ "public_key": public_key.as_str() }),
        )
        .await
    }

    /// Display balance for a wallet.
    pub async fn get_balance(&self, public_key: &WalletId) -> anyhow::Result<f64> {
        self.post_json(
            "wallets/balance/",
            &serde_json::json!({ "public_key": public_key.as_str() }),
        )
        .await
    }

    /// Submit a signed transaction; returns the admitted transaction as
    /// the node recorded it (timestamp attached).
    pub async fn post_transaction(
        &self,
        tx: &TransactionCreate,
    ) -> anyhow::Result<serde_json::Value> {
        let body = serde_json::to_value(tx).context("encoding transaction")?;
        self.post_json("transactions/post/", &body).await
    }
}
