use std::sync::Arc;

use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Client,
};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::{config::LedgerConfig, data_objects::TxReceipt, LedgerApiError};

#[derive(Clone)]
pub struct LedgerApi {
    config: LedgerConfig,
    client: Arc<Client>,
}

impl LedgerApi {
    pub fn new(config: LedgerConfig) -> Result<Self, LedgerApiError> {
        let mut headers = HeaderMap::with_capacity(1);
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));
        let client =
            Client::builder().default_headers(headers).build().map_err(|e| LedgerApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub async fn rpc_call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T, LedgerApiError> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });
        trace!("Sending RPC call: {method}");
        let response = self
            .client
            .post(&self.config.rpc_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| LedgerApiError::RpcResponseError(e.to_string()))?;
        let result = response.json::<Value>().await.map_err(|e| LedgerApiError::JsonError(e.to_string()))?;
        if let Some(err) = result.get("error") {
            let code = err["code"].as_i64().unwrap_or(-1);
            let message = err["message"].as_str().unwrap_or("unknown RPC error").to_string();
            return Err(LedgerApiError::RpcError { code, message });
        }
        let data = result["result"].clone();
        trace!("RPC response for {method}: {data}");
        serde_json::from_value(data).map_err(|e| LedgerApiError::JsonError(e.to_string()))
    }

    /// Broadcasts one audit event as a `logEvent(eventType, entityId, userId, metadata)` call
    /// against the audit-trail contract and returns the transaction hash. The relay signs and
    /// submits the transaction; a returned hash means accepted-for-mining, not mined.
    pub async fn broadcast_event(
        &self,
        event_code: i64,
        entity_id: &str,
        user_id: &str,
        metadata_json: &str,
    ) -> Result<String, LedgerApiError> {
        if !self.config.enabled {
            return Err(LedgerApiError::Disabled);
        }
        let params = json!([{
            "to": self.config.contract_address,
            "call": "logEvent",
            "args": [event_code, entity_id, user_id, metadata_json],
            "gasPrice": self.config.gas_price,
            "gasLimit": self.config.gas_limit,
        }]);
        let tx_hash: String = self.rpc_call("audit_sendTransaction", params).await?;
        info!("Broadcast audit event {event_code} for entity {entity_id}. tx: {tx_hash}");
        Ok(tx_hash)
    }

    /// Fetches the receipt for a broadcast transaction. `None` means the transaction has not been
    /// mined yet.
    pub async fn get_receipt(&self, tx_hash: &str) -> Result<Option<TxReceipt>, LedgerApiError> {
        let receipt: Option<TxReceipt> = self.rpc_call("audit_getTransactionReceipt", json!([tx_hash])).await?;
        trace!("Receipt for {tx_hash}: {}", if receipt.is_some() { "present" } else { "absent" });
        Ok(receipt)
    }
}
