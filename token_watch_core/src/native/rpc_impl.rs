// Native JSON-RPC client: eth_call over HTTP POST

use crate::error::{CoreError, CoreResult};
use crate::native::http::NativeHttpClient;
use crate::rpc_client::{parse_eth_call_response, RpcClient, RpcRequest, RpcResult};
use async_trait::async_trait;
use log::debug;
use std::cell::Cell;
use std::time::Duration;

/// JSON-RPC client for one node endpoint
pub struct NativeRpcClient {
    http: NativeHttpClient,
    endpoint: String,
    next_id: Cell<u64>,
}

impl NativeRpcClient {
    pub fn new(endpoint: String, timeout: Duration) -> CoreResult<Self> {
        Ok(Self {
            http: NativeHttpClient::new(timeout)?,
            endpoint,
            next_id: Cell::new(1),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait(?Send)]
impl RpcClient for NativeRpcClient {
    async fn eth_call(&self, to: &str, data: &str) -> RpcResult<String> {
        let id = self.next_id.get();
        self.next_id.set(id.wrapping_add(1));
        debug!("Native RPC #{}: eth_call to {} data {}", id, to, &data[..data.len().min(10)]);

        let request = RpcRequest::eth_call(id, to, data);
        let body = self
            .http
            .inner()
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| CoreError::ReadFailure(format!("eth_call request failed: {}", e)))?
            .text()
            .await
            .map_err(|e| CoreError::ReadFailure(format!("Failed to read RPC response: {}", e)))?;

        parse_eth_call_response(&body)
    }
}
