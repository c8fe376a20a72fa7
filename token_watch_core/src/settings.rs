use crate::address::normalize_address;
use crate::error::CoreError;
use crate::models::Wallet;
use serde::{Deserialize, Serialize};

/// Environment variable prefix for overrides (`TOKEN_WATCH_RPC_URL`, ...)
pub const ENV_PREFIX: &str = "TOKEN_WATCH";
/// Seed wallet list as a JSON array of `{name, address, cost}`
pub const DEFAULT_WALLETS_ENV: &str = "TOKEN_WATCH_WALLETS_JSON";

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    #[serde(default = "default_rpc_url")]
    pub rpc_url: String,
    #[serde(default = "default_token_address")]
    pub token_address: String,
    #[serde(default = "default_token_decimals")]
    pub token_decimals: u8,
    #[serde(default = "default_refresh_interval_ms")]
    pub refresh_interval_ms: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Tier 1 market aggregator; the token address is appended
    #[serde(default = "default_aggregator_api_url")]
    pub aggregator_api_url: String,
    /// Tier 2 exchange ticker; `<SYMBOL>-<STABLECOIN>` is appended
    #[serde(default = "default_price_api_url")]
    pub price_api_url: String,
    #[serde(default = "default_preferred_dex_ids")]
    pub preferred_dex_ids: Vec<String>,
    #[serde(default = "default_stablecoin_symbol")]
    pub stablecoin_symbol: String,
    #[serde(default = "default_stablecoin_address")]
    pub stablecoin_address: String,
    #[serde(default = "default_wallets")]
    pub default_wallets: Vec<Wallet>,
    #[serde(default = "default_storage_dir")]
    pub storage_dir: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            rpc_url: default_rpc_url(),
            token_address: default_token_address(),
            token_decimals: default_token_decimals(),
            refresh_interval_ms: default_refresh_interval_ms(),
            request_timeout_secs: default_request_timeout_secs(),
            aggregator_api_url: default_aggregator_api_url(),
            price_api_url: default_price_api_url(),
            preferred_dex_ids: default_preferred_dex_ids(),
            stablecoin_symbol: default_stablecoin_symbol(),
            stablecoin_address: default_stablecoin_address(),
            default_wallets: default_wallets(),
            storage_dir: default_storage_dir(),
        }
    }
}

impl Settings {
    /// Load from an optional TOML file layered under `TOKEN_WATCH_*` variables
    #[cfg(feature = "native")]
    pub fn from_file(path: &str) -> Result<Self, CoreError> {
        let builder = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("preferred_dex_ids"),
            );
        let cfg = builder.build()?;
        let mut settings: Settings = cfg.try_deserialize()?;

        if let Ok(json) = std::env::var(DEFAULT_WALLETS_ENV) {
            settings.default_wallets = parse_wallet_seed(&json)?;
        }
        Ok(settings)
    }

    #[cfg(feature = "native")]
    pub fn save_to_file(&self, path: &str) -> Result<(), CoreError> {
        let toml_string = toml::to_string(self)?;
        std::fs::write(path, toml_string)?;
        Ok(())
    }

    /// Parse settings handed over as JSON (browser host page); empty means defaults
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        if json.trim().is_empty() {
            return Ok(Settings::default());
        }
        Ok(serde_json::from_str(json)?)
    }

    /// Whole seconds between refresh cycles, at least one
    pub fn refresh_interval_secs(&self) -> u64 {
        self.refresh_interval_ms.div_ceil(1000).max(1)
    }

    /// Validate settings ranges and constraints
    pub fn validate(&self) -> Result<(), CoreError> {
        normalize_address(&self.token_address)
            .map_err(|_| CoreError::Validation(format!("token_address is not a valid address: {}", self.token_address)))?;
        normalize_address(&self.stablecoin_address)
            .map_err(|_| CoreError::Validation(format!("stablecoin_address is not a valid address: {}", self.stablecoin_address)))?;
        url::Url::parse(&self.rpc_url)
            .map_err(|e| CoreError::Validation(format!("rpc_url is not a valid URL: {}", e)))?;
        if self.token_decimals > 77 {
            return Err(CoreError::Validation("token_decimals must be <= 77".to_string()));
        }
        if self.refresh_interval_ms < 1000 {
            return Err(CoreError::Validation("refresh_interval_ms must be >= 1000".to_string()));
        }
        if self.request_timeout_secs == 0 {
            return Err(CoreError::Validation("request_timeout_secs must be > 0".to_string()));
        }
        if self.stablecoin_symbol.trim().is_empty() {
            return Err(CoreError::Validation("stablecoin_symbol must not be empty".to_string()));
        }
        if self.aggregator_api_url.trim().is_empty() || self.price_api_url.trim().is_empty() {
            return Err(CoreError::Validation("price API URLs must not be empty".to_string()));
        }
        Ok(())
    }
}

/// Parse a seed wallet list from a JSON array of `{name, address, cost}`
pub fn parse_wallet_seed(json: &str) -> Result<Vec<Wallet>, CoreError> {
    serde_json::from_str(json)
        .map_err(|e| CoreError::Validation(format!("default wallet list is not a valid JSON array: {}", e)))
}

fn default_rpc_url() -> String { "https://bsc-dataseed1.binance.org/".to_string() }
fn default_token_address() -> String { "0x327753b71f11df3d6809b2436667475fab8c956e".to_string() }
fn default_token_decimals() -> u8 { 18 }
fn default_refresh_interval_ms() -> u64 { 30_000 }
fn default_request_timeout_secs() -> u64 { 10 }
fn default_aggregator_api_url() -> String { "https://api.dexscreener.com/latest/dex/tokens/".to_string() }
fn default_price_api_url() -> String { "https://www.okx.com/api/v5/market/ticker?instId=".to_string() }
fn default_preferred_dex_ids() -> Vec<String> { vec!["pancakeswap".to_string(), "pancakeswap_v2".to_string()] }
fn default_stablecoin_symbol() -> String { "USDT".to_string() }
fn default_stablecoin_address() -> String { "0x55d398326f99059ff775485246999027b3197955".to_string() }
fn default_storage_dir() -> String { ".token_watch".to_string() }

fn default_wallets() -> Vec<Wallet> {
    [
        ("G", "0x06a9f861862e120d2fd03E9650f033C49aFDD486"),
        ("S", "0xc20662c62CbdD15158017d83462486682033070A"),
        ("MT", "0x62490673B8D8f37162Cd1886bD499adbA8C1b4D7"),
        ("J", "0xE5F8b35bbD79251589517c41B5199C85f0Bf980d"),
        ("Jolly", "0x24dEA71Db19BA1483f3d074cD66a43DEfF6A4952"),
        ("Mela", "0x8143d908306fA7E64dD149c906e9fBA1efE76c01"),
        ("Meli", "0x0E428c6CcF9753BE30A66BaeBc1ECe2a04ed94d6"),
        ("D_2", "0x40f1a9E0840dcF069fd74FB83792F59849a30c3B"),
        ("D_3", "0x918fc14aFBEBBa1a0E9182d23971f5dD46873a9B"),
    ]
    .into_iter()
    .map(|(name, address)| Wallet {
        name: name.to_string(),
        address: address.to_string(),
        cost: 0.0,
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let s = Settings::default();
        assert!(s.validate().is_ok());
        assert_eq!(s.refresh_interval_secs(), 30);
        assert_eq!(s.default_wallets.len(), 9);
    }

    #[test]
    fn test_from_json_partial_and_empty() {
        let s = Settings::from_json("").unwrap();
        assert_eq!(s.token_decimals, 18);

        let s = Settings::from_json(r#"{"token_decimals": 9, "refresh_interval_ms": 1500}"#).unwrap();
        assert_eq!(s.token_decimals, 9);
        assert_eq!(s.refresh_interval_secs(), 2);
        assert_eq!(s.stablecoin_symbol, "USDT");
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut s = Settings::default();
        s.refresh_interval_ms = 500;
        assert!(s.validate().is_err());

        let mut s = Settings::default();
        s.token_address = "0x1234".to_string();
        assert!(s.validate().is_err());

        let mut s = Settings::default();
        s.rpc_url = "not a url".to_string();
        assert!(s.validate().is_err());
    }

    #[test]
    fn test_parse_wallet_seed() {
        let seed = parse_wallet_seed(
            r#"[{"name":"A","address":"0x06a9f861862e120d2fd03E9650f033C49aFDD486","cost":0.5},
                {"name":"B","address":"0xc20662c62CbdD15158017d83462486682033070A"}]"#,
        )
        .unwrap();
        assert_eq!(seed.len(), 2);
        assert_eq!(seed[0].cost, 0.5);
        assert_eq!(seed[1].cost, 0.0);
        assert!(parse_wallet_seed("{}").is_err());
    }

    #[cfg(feature = "native")]
    #[test]
    fn load_example_config() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../config.example.toml");
        let s = Settings::from_file(path).unwrap();
        assert_eq!(s.token_decimals, 18);
        assert_eq!(s.refresh_interval_ms, 30_000);
        assert_eq!(s.preferred_dex_ids, vec!["pancakeswap", "pancakeswap_v2"]);
        assert!(s.validate().is_ok());
    }
}
