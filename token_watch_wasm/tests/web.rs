#![cfg(target_arch = "wasm32")]

use token_watch_core::Wallet;
use token_watch_wasm::WalletDashboard;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn rejects_invalid_settings() {
    assert!(WalletDashboard::new(r#"{"refresh_interval_ms": 10}"#).is_err());
    assert!(WalletDashboard::new("{not json").is_err());
}

#[wasm_bindgen_test]
fn add_remove_and_theme() {
    let dashboard = WalletDashboard::new("").unwrap();
    dashboard.clear_wallets().unwrap();
    let wallets: Vec<Wallet> = serde_wasm_bindgen::from_value(dashboard.wallets().unwrap()).unwrap();
    assert!(wallets.is_empty());

    assert!(!dashboard.remove_wallet("0x06a9f861862e120d2fd03e9650f033c49afdd486").unwrap());

    let before = dashboard.theme();
    let after = dashboard.toggle_theme().unwrap();
    assert_ne!(before, after);
    assert_eq!(dashboard.theme(), after);
}
