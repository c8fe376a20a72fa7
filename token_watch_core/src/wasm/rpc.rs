// WASM JSON-RPC client: eth_call over fetch POST

use crate::error::CoreError;
use crate::rpc_client::{parse_eth_call_response, RpcClient, RpcRequest, RpcResult};
use crate::wasm::http::{fetch_body, request_init};
use async_trait::async_trait;
use log::debug;
use std::cell::RefCell;
use wasm_bindgen::JsValue;
use web_sys::Request;

pub struct WasmRpcClient {
    http_endpoint: String,
    timeout_ms: u32,
    request_id: RefCell<u64>,
}

impl WasmRpcClient {
    pub fn new(endpoint: String, timeout_secs: u64) -> Self {
        Self {
            http_endpoint: endpoint,
            timeout_ms: u32::try_from(timeout_secs.saturating_mul(1000)).unwrap_or(u32::MAX),
            request_id: RefCell::new(0),
        }
    }

    fn next_id(&self) -> u64 {
        let mut id = self.request_id.borrow_mut();
        *id += 1;
        *id
    }
}

#[async_trait(?Send)]
impl RpcClient for WasmRpcClient {
    async fn eth_call(&self, to: &str, data: &str) -> RpcResult<String> {
        let request = RpcRequest::eth_call(self.next_id(), to, data);
        debug!("WASM RPC #{}: eth_call to {}", request.id, to);

        let body = serde_json::to_string(&request)?;
        let opts = request_init("POST", self.timeout_ms);
        opts.set_body(&JsValue::from_str(&body));

        let req = Request::new_with_str_and_init(&self.http_endpoint, &opts)
            .map_err(|e| CoreError::ReadFailure(format!("Failed to create request: {:?}", e)))?;
        req.headers()
            .set("Content-Type", "application/json")
            .map_err(|e| CoreError::ReadFailure(format!("Failed to set headers: {:?}", e)))?;

        let response = fetch_body(&req).await.map_err(CoreError::ReadFailure)?;
        parse_eth_call_response(&response)
    }
}
