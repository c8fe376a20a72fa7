// Scripted capabilities shared by the unit tests

use crate::abi::{BALANCE_OF_SELECTOR, SYMBOL_SELECTOR};
use crate::error::CoreError;
use crate::http_client::{HttpClient, HttpResult};
use crate::rpc_client::{RpcClient, RpcResult};
use crate::storage_trait::{StorageBackend, StorageResult};
use async_trait::async_trait;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use tokio::sync::oneshot;

/// ABI `uint256` return data
pub fn balance_word(raw: u128) -> String {
    format!("0x{:064x}", raw)
}

/// ABI dynamic `string` return data
pub fn string_return(value: &str) -> String {
    let encoded = hex::encode(value);
    let padded_len = encoded.len().div_ceil(64).max(1) * 64;
    format!(
        "0x{:064x}{:064x}{:0<width$}",
        32,
        value.len(),
        encoded,
        width = padded_len
    )
}

/// RPC double answering by call selector; unknown owners fail like a dead node
#[derive(Default)]
pub struct MockRpc {
    balances: HashMap<String, String>,
    symbol: Option<String>,
    calls: RefCell<Vec<String>>,
}

impl MockRpc {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_balance(mut self, owner: &str, data: String) -> Self {
        self.balances.insert(owner.to_lowercase(), data);
        self
    }

    pub fn with_symbol(mut self, data: String) -> Self {
        self.symbol = Some(data);
        self
    }

    pub fn calls_to(&self, selector: &str) -> usize {
        let prefix = format!("0x{}", selector);
        self.calls.borrow().iter().filter(|d| d.starts_with(&prefix)).count()
    }
}

#[async_trait(?Send)]
impl RpcClient for MockRpc {
    async fn eth_call(&self, _to: &str, data: &str) -> RpcResult<String> {
        self.calls.borrow_mut().push(data.to_string());

        if data.starts_with(&format!("0x{}", BALANCE_OF_SELECTOR)) {
            let owner = format!("0x{}", &data[data.len() - 40..]);
            return self
                .balances
                .get(&owner)
                .cloned()
                .ok_or_else(|| CoreError::ReadFailure("connection refused".to_string()));
        }
        if data == format!("0x{}", SYMBOL_SELECTOR) {
            return self
                .symbol
                .clone()
                .ok_or_else(|| CoreError::ReadFailure("execution reverted".to_string()));
        }
        Err(CoreError::ReadFailure(format!("unexpected call {}", data)))
    }
}

/// HTTP double serving canned bodies by exact URL and recording requests
#[derive(Default)]
pub struct MockHttp {
    responses: HashMap<String, String>,
    requests: RefCell<Vec<String>>,
}

impl MockHttp {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(mut self, url: &str, body: &str) -> Self {
        self.responses.insert(url.to_string(), body.to_string());
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }

    pub fn requested(&self, prefix: &str) -> bool {
        self.requests.borrow().iter().any(|u| u.starts_with(prefix))
    }
}

#[async_trait(?Send)]
impl HttpClient for MockHttp {
    async fn fetch_text(&self, url: &str) -> HttpResult<String> {
        self.requests.borrow_mut().push(url.to_string());
        self.responses
            .get(url)
            .cloned()
            .ok_or_else(|| CoreError::Http(format!("HTTP error: 404 for {}", url)))
    }
}

/// HTTP double whose first request waits until the returned sender fires
pub struct GatedHttp {
    inner: MockHttp,
    gate: RefCell<Option<oneshot::Receiver<()>>>,
}

impl GatedHttp {
    pub fn new(inner: MockHttp) -> (Self, oneshot::Sender<()>) {
        let (open, gate) = oneshot::channel();
        let http = Self {
            inner,
            gate: RefCell::new(Some(gate)),
        };
        (http, open)
    }
}

#[async_trait(?Send)]
impl HttpClient for GatedHttp {
    async fn fetch_text(&self, url: &str) -> HttpResult<String> {
        let gate = self.gate.borrow_mut().take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        self.inner.fetch_text(url).await
    }
}

/// In-memory storage that counts writes and can be told to reject them
#[derive(Default)]
pub struct MemoryStorage {
    items: RefCell<HashMap<String, String>>,
    writes: Cell<usize>,
    failing: Cell<bool>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn writes(&self) -> usize {
        self.writes.get()
    }

    pub fn fail_writes(&self, failing: bool) {
        self.failing.set(failing);
    }

    fn check_writable(&self) -> StorageResult<()> {
        if self.failing.get() {
            return Err(CoreError::Init("storage quota exceeded".to_string()));
        }
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }
}

impl StorageBackend for MemoryStorage {
    fn get_raw(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.items.borrow().get(key).cloned())
    }

    fn set_raw(&self, key: &str, value: &str) -> StorageResult<()> {
        self.check_writable()?;
        self.items.borrow_mut().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        self.check_writable()?;
        self.items.borrow_mut().remove(key);
        Ok(())
    }
}
