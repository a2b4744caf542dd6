use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use braid_core::block::Block;
use braid_core::constants::PEER_TIMEOUT_SECS;
use braid_core::transaction::Transaction;
use braid_dag::NodeLinkDocument;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("peer request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("peer returned an unexpected payload: {0}")]
    UnexpectedPayload(String),
}

/// Success bodies from a peer all share the `{message, data}` envelope.
#[derive(Deserialize)]
struct Envelope<T> {
    #[allow(dead_code)]
    message: serde_json::Value,
    data: T,
}

/// HTTP client for talking to neighbor nodes.
///
/// Every call carries a bounded timeout; no retries, no backoff. Callers
/// hold no locks while these futures are in flight.
pub struct PeerClient {
    http: reqwest::Client,
    api_name: String,
}

impl PeerClient {
    pub fn new(api_name: impl Into<String>) -> Result<Self, SyncError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(PEER_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            http,
            api_name: api_name.into(),
        })
    }

    pub fn api_name(&self) -> &str {
        &self.api_name
    }

    fn endpoint(&self, base_url: &str, path: &str) -> String {
        format!(
            "{}/api/v1/{}/{}",
            base_url.trim_end_matches('/'),
            self.api_name,
            path
        )
    }

    async fn get_data<T: DeserializeOwned>(&self, url: &str) -> Result<T, SyncError> {
        let envelope: Envelope<T> = self
            .http
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .map_err(|e| SyncError::UnexpectedPayload(e.to_string()))?;
        Ok(envelope.data)
    }

    // ── Handshake ────────────────────────────────────────────────────────────

    /// Fetch a peer's full DAG in node-link form.
    pub async fn fetch_dag(&self, base_url: &str) -> Result<NodeLinkDocument, SyncError> {
        self.get_data(&self.endpoint(base_url, "dag/")).await
    }

    /// Fetch a peer's neighbor URL list.
    pub async fn fetch_neighbors(&self, base_url: &str) -> Result<Vec<String>, SyncError> {
        self.get_data(&self.endpoint(base_url, "nodes/neighbors/"))
            .await
    }

    /// Ask a peer to connect back to us.
    pub async fn send_connect(&self, base_url: &str, own_url: &str) -> Result<(), SyncError> {
        self.http
            .post(self.endpoint(base_url, "nodes/connect/"))
            .json(&serde_json::json!({ "address_url": own_url }))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    // ── Gossip ───────────────────────────────────────────────────────────────

    /// Relay one transaction to one neighbor.
    pub async fn send_transaction(
        &self,
        base_url: &str,
        tx: &Transaction,
    ) -> Result<(), SyncError> {
        self.http
            .post(self.endpoint(base_url, "nodes/transaction/"))
            .json(tx)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    /// Relay one block to one neighbor.
    pub async fn send_block(&self, base_url: &str, block: &Block) -> Result<(), SyncError> {
        self.http
            .post(self.endpoint(base_url, "nodes/block/"))
            .json(block)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    /// Fan a transaction out to every neighbor. Failures are logged and
    /// dropped; a slow or dead peer never blocks the others.
    pub async fn broadcast_transaction(&self, neighbors: &[String], tx: &Transaction) {
        for neighbor in neighbors {
            match self.send_transaction(neighbor, tx).await {
                Ok(()) => debug!(neighbor = %neighbor, "transaction relayed"),
                Err(e) => warn!(neighbor = %neighbor, error = %e, "transaction relay failed"),
            }
        }
    }

    /// Fan a confirmed block out to every neighbor.
    pub async fn broadcast_block(&self, neighbors: &[String], block: &Block) {
        for neighbor in neighbors {
            match self.send_block(neighbor, block).await {
                Ok(()) => debug!(neighbor = %neighbor, "block relayed"),
                Err(e) => warn!(neighbor = %neighbor, error = %e, "block relay failed"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_join_cleanly_with_and_without_trailing_slash() {
        let client = PeerClient::new("braidnet").unwrap();
        assert_eq!(
            client.endpoint("http://peer:8000/", "nodes/block/"),
            "http://peer:8000/api/v1/braidnet/nodes/block/"
        );
        assert_eq!(
            client.endpoint("http://peer:8000", "dag/"),
            "http://peer:8000/api/v1/braidnet/dag/"
        );
    }

    #[test]
    fn envelope_data_field_is_extracted() {
        let body = r#"{"message": "3 Neighbors.", "data": ["http://a/", "http://b/"]}"#;
        let envelope: Envelope<Vec<String>> = serde_json::from_str(body).unwrap();
        assert_eq!(envelope.data.len(), 2);
    }

    #[test]
    fn envelope_tolerates_structured_messages() {
        let body = r#"{"message": {"note": "ok"}, "data": 7}"#;
        let envelope: Envelope<u64> = serde_json::from_str(body).unwrap();
        assert_eq!(envelope.data, 7);
    }
}
