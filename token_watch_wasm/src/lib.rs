// Token Watch WASM Bindings
// Browser dashboard driven from a static host page
#![cfg(target_arch = "wasm32")]

use log::{info, warn};
use std::cell::RefCell;
use std::rc::Rc;
use token_watch_core::wasm::{LocalStorageBackend, WasmHttpClient, WasmRpcClient};
use token_watch_core::{CoreError, Dashboard, Settings, Tick};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{future_to_promise, spawn_local};

type BrowserDashboard = Dashboard<WasmRpcClient, WasmHttpClient, Rc<LocalStorageBackend>>;

// Initialize panic hook and logger for WASM
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
}

fn to_js(err: CoreError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn to_value<T: serde::Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

/// One-second `setInterval` driving the countdown
struct Ticker {
    handle: i32,
    _callback: Closure<dyn FnMut()>,
}

#[wasm_bindgen]
pub struct WalletDashboard {
    inner: Rc<BrowserDashboard>,
    ticker: RefCell<Option<Ticker>>,
}

fn spawn_cycle(dashboard: &Rc<BrowserDashboard>) {
    let dashboard = dashboard.clone();
    spawn_local(async move {
        dashboard.refresh().await;
    });
}

#[wasm_bindgen]
impl WalletDashboard {
    /// `settings_json` may be empty for defaults
    #[wasm_bindgen(constructor)]
    pub fn new(settings_json: &str) -> Result<WalletDashboard, JsValue> {
        let settings = Settings::from_json(settings_json).map_err(to_js)?;
        settings.validate().map_err(to_js)?;

        let rpc = WasmRpcClient::new(settings.rpc_url.clone(), settings.request_timeout_secs);
        let http = WasmHttpClient::new(settings.request_timeout_secs);
        let storage = Rc::new(LocalStorageBackend::default_instance());
        let inner = Dashboard::new(&settings, rpc, http, storage).map_err(to_js)?;
        info!("Dashboard ready with {} wallets", inner.wallets().len());

        Ok(Self {
            inner: Rc::new(inner),
            ticker: RefCell::new(None),
        })
    }

    /// Register `callback(snapshot)`, invoked after every state change
    #[wasm_bindgen(js_name = onChange)]
    pub fn on_change(&self, callback: js_sys::Function) {
        let dashboard = Rc::downgrade(&self.inner);
        self.inner.set_listener(Rc::new(move || {
            let Some(dashboard) = dashboard.upgrade() else {
                return;
            };
            match to_value(&dashboard.snapshot()) {
                Ok(snapshot) => {
                    if let Err(e) = callback.call1(&JsValue::NULL, &snapshot) {
                        warn!("onChange callback threw: {:?}", e);
                    }
                }
                Err(e) => warn!("Failed to serialize snapshot: {:?}", e),
            }
        }));
    }

    pub fn snapshot(&self) -> Result<JsValue, JsValue> {
        to_value(&self.inner.snapshot())
    }

    pub fn wallets(&self) -> Result<JsValue, JsValue> {
        to_value(&self.inner.wallets())
    }

    /// Run one cycle; resolves to the number of balances loaded
    pub fn refresh(&self) -> js_sys::Promise {
        let dashboard = self.inner.clone();
        future_to_promise(async move {
            let report = dashboard.refresh().await;
            Ok(JsValue::from_f64(report.loaded as f64))
        })
    }

    /// Resolves to the stored wallet, rejects with a message on invalid input
    #[wasm_bindgen(js_name = addWallet)]
    pub fn add_wallet(&self, name: String, address: String, cost: f64) -> js_sys::Promise {
        let dashboard = self.inner.clone();
        future_to_promise(async move {
            let wallet = dashboard.add_wallet(&name, &address, cost).await.map_err(to_js)?;
            to_value(&wallet)
        })
    }

    #[wasm_bindgen(js_name = removeWallet)]
    pub fn remove_wallet(&self, address: &str) -> Result<bool, JsValue> {
        self.inner.remove_wallet(address).map_err(to_js)
    }

    #[wasm_bindgen(js_name = clearWallets)]
    pub fn clear_wallets(&self) -> Result<(), JsValue> {
        self.inner.clear_wallets().map_err(to_js)
    }

    pub fn theme(&self) -> String {
        self.inner.theme().as_str().to_string()
    }

    #[wasm_bindgen(js_name = toggleTheme)]
    pub fn toggle_theme(&self) -> Result<String, JsValue> {
        let theme = self.inner.toggle_theme().map_err(to_js)?;
        Ok(theme.as_str().to_string())
    }

    /// Start the countdown and run the first cycle
    pub fn start(&self) -> Result<(), JsValue> {
        if self.ticker.borrow().is_some() {
            return Ok(());
        }
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("No window"))?;

        let dashboard = Rc::downgrade(&self.inner);
        let callback = Closure::<dyn FnMut()>::new(move || {
            if let Some(dashboard) = dashboard.upgrade() {
                if dashboard.tick() == Tick::Due {
                    spawn_cycle(&dashboard);
                }
            }
        });
        let handle = window.set_interval_with_callback_and_timeout_and_arguments_0(
            callback.as_ref().unchecked_ref(),
            1000,
        )?;

        self.inner.start();
        *self.ticker.borrow_mut() = Some(Ticker {
            handle,
            _callback: callback,
        });
        spawn_cycle(&self.inner);
        Ok(())
    }

    pub fn stop(&self) {
        if let Some(ticker) = self.ticker.borrow_mut().take() {
            if let Some(window) = web_sys::window() {
                window.clear_interval_with_handle(ticker.handle);
            }
        }
        self.inner.stop();
    }

    #[wasm_bindgen(js_name = isRunning)]
    pub fn is_running(&self) -> bool {
        self.inner.is_running()
    }
}

impl Drop for WalletDashboard {
    fn drop(&mut self) {
        self.stop();
    }
}
