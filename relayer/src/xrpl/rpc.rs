use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::error::{Error, Result};
use crate::xrpl::types::{
    AccountInfoResponse, AccountLinesResponse, AccountTxResponse, ServerStateResponse,
    SubmitResponse,
};

/// Thin JSON-RPC client against one rippled/clio node.
#[derive(Debug, Clone)]
pub struct XrplRpcClient {
    http: reqwest::Client,
    url: String,
}

impl XrplRpcClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: url.into(),
        }
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T> {
        let body = json!({
            "method": method,
            "params": [params],
        });

        let response: Value = self
            .http
            .post(&self.url)
            .json(&body)
            .send()
            .await?
            .json()
            .await?;

        let result = response
            .get("result")
            .ok_or_else(|| Error::RpcResponse("missing result field".to_string()))?;

        if result.get("status").and_then(Value::as_str) == Some("error") {
            let message = result
                .get("error_message")
                .or_else(|| result.get("error"))
                .and_then(Value::as_str)
                .unwrap_or("unknown error");
            return Err(Error::RpcResponse(message.to_string()));
        }

        serde_json::from_value(result.to_owned()).map_err(|e| Error::RpcResponse(e.to_string()))
    }

    /// One page of the account's transaction history, oldest first. `-1` for
    /// either ledger bound means "as far as the node knows".
    pub async fn account_tx(
        &self,
        account: &str,
        ledger_index_min: i64,
        ledger_index_max: i64,
        marker: Option<Value>,
    ) -> Result<AccountTxResponse> {
        let mut params = json!({
            "account": account,
            "ledger_index_min": ledger_index_min,
            "ledger_index_max": ledger_index_max,
            "forward": true,
        });
        if let Some(marker) = marker {
            params["marker"] = marker;
        }

        self.call("account_tx", params).await
    }

    pub async fn account_info(&self, account: &str) -> Result<AccountInfoResponse> {
        self.call(
            "account_info",
            json!({ "account": account, "ledger_index": "validated" }),
        )
        .await
    }

    pub async fn account_lines(&self, account: &str) -> Result<AccountLinesResponse> {
        self.call(
            "account_lines",
            json!({ "account": account, "ledger_index": "validated" }),
        )
        .await
    }

    pub async fn server_state(&self) -> Result<ServerStateResponse> {
        self.call("server_state", json!({})).await
    }

    /// Broadcasts an assembled multisigned transaction as JSON.
    pub async fn submit_multisigned(&self, tx_json: Value) -> Result<SubmitResponse> {
        self.call("submit_multisigned", json!({ "tx_json": tx_json }))
            .await
    }
}

/// Parses the lower bound of a rippled `complete_ledgers` range such as
/// "32570-94329470" or "2-5,8-10". "empty" means the node has no history.
pub fn earliest_complete_ledger(complete_ledgers: &str) -> Option<u32> {
    complete_ledgers
        .split(',')
        .next()?
        .split('-')
        .next()?
        .trim()
        .parse()
        .ok()
}
