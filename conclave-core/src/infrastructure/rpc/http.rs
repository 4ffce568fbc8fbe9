use crate::foundation::util::encoding::parse_hex_bytes;
use crate::foundation::ConclaveError;
use crate::infrastructure::rpc::{abi, ChainRpc, ExecutionCall};
use alloy_primitives::{Address, B256};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

const RECEIPT_POLL_INTERVAL: Duration = Duration::from_secs(2);
const RECEIPT_POLL_ATTEMPTS: u32 = 90;

#[derive(Debug, Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct JsonRpcResponse {
    result: Option<Value>,
    error: Option<JsonRpcError>,
}

/// JSON-RPC client for an EVM-style node.
pub struct HttpChainRpc {
    client: reqwest::Client,
    url: String,
}

impl HttpChainRpc {
    pub fn new(url: impl Into<String>) -> Self {
        Self { client: reqwest::Client::new(), url: url.into() }
    }

    async fn call(&self, method: &str, params: Value) -> Result<Value, ConclaveError> {
        let body = json!({ "jsonrpc": "2.0", "id": 1, "method": method, "params": params });
        let response: JsonRpcResponse = self.client.post(&self.url).json(&body).send().await?.json().await?;
        if let Some(error) = response.error {
            return Err(ConclaveError::network_error(method, format!("rpc error {}: {}", error.code, error.message)));
        }
        response.result.ok_or_else(|| ConclaveError::network_error(method, "response carried neither result nor error"))
    }

    async fn eth_call(&self, account: Address, data: &[u8]) -> Result<Vec<u8>, ConclaveError> {
        let params = json!([{ "to": account, "data": format!("0x{}", hex::encode(data)) }, "latest"]);
        let result = self.call("eth_call", params).await?;
        let hex_output = result
            .as_str()
            .ok_or_else(|| ConclaveError::network_error("eth_call", "non-string call result"))?;
        parse_hex_bytes(hex_output)
    }
}

#[async_trait]
impl ChainRpc for HttpChainRpc {
    async fn fetch_owners(&self, account: Address) -> Result<Vec<Address>, ConclaveError> {
        let output = self.eth_call(account, &abi::encode_read_call(abi::GET_OWNERS_SIG)).await?;
        abi::decode_address_array(&output)
    }

    async fn fetch_threshold(&self, account: Address) -> Result<usize, ConclaveError> {
        let output = self.eth_call(account, &abi::encode_read_call(abi::GET_THRESHOLD_SIG)).await?;
        Ok(abi::decode_u64(&output)? as usize)
    }

    async fn fetch_nonce(&self, account: Address) -> Result<u64, ConclaveError> {
        let output = self.eth_call(account, &abi::encode_read_call(abi::NONCE_SIG)).await?;
        abi::decode_u64(&output)
    }

    async fn broadcast_and_confirm(&self, call: ExecutionCall) -> Result<B256, ConclaveError> {
        let params = json!([{
            "from": call.sender,
            "to": call.account,
            "data": format!("0x{}", hex::encode(&call.data)),
        }]);
        let result = self.call("eth_sendTransaction", params).await?;
        let tx_hash_hex = result
            .as_str()
            .ok_or_else(|| ConclaveError::network_error("eth_sendTransaction", "non-string tx hash"))?;
        let tx_hash: B256 = tx_hash_hex
            .parse()
            .map_err(|_| ConclaveError::network_error("eth_sendTransaction", format!("malformed tx hash {tx_hash_hex}")))?;

        for _ in 0..RECEIPT_POLL_ATTEMPTS {
            let receipt = self.call("eth_getTransactionReceipt", json!([tx_hash])).await?;
            if receipt.is_null() {
                tokio::time::sleep(RECEIPT_POLL_INTERVAL).await;
                continue;
            }
            let status = receipt.get("status").and_then(Value::as_str).unwrap_or("0x0");
            if status == "0x1" {
                log::info!("transaction {tx_hash} confirmed");
                return Ok(tx_hash);
            }
            return Err(ConclaveError::ExecutionFailed { tx_hash: tx_hash.to_string() });
        }
        Err(ConclaveError::network_error(
            "eth_getTransactionReceipt",
            format!("no receipt for {tx_hash} after {} attempts", RECEIPT_POLL_ATTEMPTS),
        ))
    }
}
