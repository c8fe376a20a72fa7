// RPC Client abstraction - allows both native and WASM implementations

use crate::error::CoreError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::rc::Rc;

/// Result type for RPC operations
pub type RpcResult<T> = Result<T, CoreError>;

/// Abstract node client trait that can be implemented for both native and WASM.
/// Only read-only contract calls are needed.
#[async_trait(?Send)]
pub trait RpcClient {
    /// Execute `eth_call` against `to` with hex calldata at the latest block,
    /// returning the hex-encoded return data
    async fn eth_call(&self, to: &str, data: &str) -> RpcResult<String>;
}

#[async_trait(?Send)]
impl<T: RpcClient + ?Sized> RpcClient for Rc<T> {
    async fn eth_call(&self, to: &str, data: &str) -> RpcResult<String> {
        (**self).eth_call(to, data).await
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct RpcRequest {
    pub jsonrpc: String,
    pub id: u64,
    pub method: String,
    pub params: serde_json::Value,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct RpcResponse<T> {
    pub jsonrpc: String,
    pub id: u64,
    pub result: Option<T>,
    pub error: Option<RpcError>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

impl RpcRequest {
    /// Build an `eth_call` request envelope
    pub fn eth_call(id: u64, to: &str, data: &str) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            method: "eth_call".to_string(),
            params: json!([{ "to": to, "data": data }, "latest"]),
        }
    }
}

/// Extract the hex result from an `eth_call` response body
pub fn parse_eth_call_response(body: &str) -> RpcResult<String> {
    let response: RpcResponse<String> = serde_json::from_str(body)
        .map_err(|e| CoreError::ReadFailure(format!("Malformed RPC response: {}", e)))?;

    if let Some(err) = response.error {
        return Err(CoreError::ReadFailure(format!(
            "RPC error {}: {}",
            err.code, err.message
        )));
    }

    response
        .result
        .ok_or_else(|| CoreError::ReadFailure("RPC response has no result".to_string()))
}
