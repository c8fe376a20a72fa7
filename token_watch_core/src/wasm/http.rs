// WASM HTTP client implementation using fetch API

use crate::error::CoreError;
use crate::http_client::{HttpClient, HttpResult};
use async_trait::async_trait;
use log::debug;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{AbortSignal, Request, RequestInit, RequestMode, Response};

/// Build a CORS request that aborts after `timeout_ms`
pub(crate) fn request_init(method: &str, timeout_ms: u32) -> RequestInit {
    let opts = RequestInit::new();
    opts.set_method(method);
    opts.set_mode(RequestMode::Cors);
    opts.set_signal(Some(&AbortSignal::timeout_with_u32(timeout_ms)));
    opts
}

/// Run a prepared request and return the body of a 2xx response
pub(crate) async fn fetch_body(request: &Request) -> Result<String, String> {
    let window = web_sys::window().ok_or_else(|| "No window object available".to_string())?;

    let resp_value = JsFuture::from(window.fetch_with_request(request))
        .await
        .map_err(|e| format!("Fetch failed: {:?}", e))?;
    let resp: Response = resp_value
        .dyn_into()
        .map_err(|_| "Failed to cast response".to_string())?;

    if !resp.ok() {
        return Err(format!("HTTP error: {}", resp.status()));
    }

    let text_promise = resp.text().map_err(|e| format!("Failed to get text: {:?}", e))?;
    JsFuture::from(text_promise)
        .await
        .map_err(|e| format!("Failed to await text: {:?}", e))?
        .as_string()
        .ok_or_else(|| "Response text is not a string".to_string())
}

/// WASM HTTP client using browser fetch API
pub struct WasmHttpClient {
    timeout_ms: u32,
}

impl WasmHttpClient {
    pub fn new(timeout_secs: u64) -> Self {
        Self {
            timeout_ms: u32::try_from(timeout_secs.saturating_mul(1000)).unwrap_or(u32::MAX),
        }
    }
}

#[async_trait(?Send)]
impl HttpClient for WasmHttpClient {
    async fn fetch_text(&self, url: &str) -> HttpResult<String> {
        debug!("Fetching URL via WASM: {}", url);

        let opts = request_init("GET", self.timeout_ms);
        let request = Request::new_with_str_and_init(url, &opts)
            .map_err(|e| CoreError::Http(format!("Failed to create request: {:?}", e)))?;

        fetch_body(&request).await.map_err(CoreError::Http)
    }
}
