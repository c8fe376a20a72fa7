// Token Watch Core Library
// Platform-agnostic wallet balance and price tracking

pub mod abi;
pub mod address;
pub mod balance_reader;
pub mod dashboard;
pub mod error;
pub mod formatter;
pub mod http_client;
pub mod models;
pub mod price_resolver;
pub mod rpc_client;
pub mod schedule;
pub mod settings;
pub mod storage_trait;
pub mod wallet_store;

#[cfg(feature = "native")]
pub mod native;

#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
pub mod wasm;

#[cfg(test)]
mod test_support;

// Re-exports
pub use address::{is_valid_address, normalize_address};
pub use balance_reader::BalanceReader;
pub use dashboard::{CycleReport, Dashboard};
pub use error::{CoreError, CoreResult};
pub use http_client::*;
pub use models::*;
pub use price_resolver::{PriceResolver, PriceSourceConfig};
pub use rpc_client::*;
pub use schedule::{RefreshSchedule, Tick};
pub use settings::Settings;
pub use storage_trait::*;
pub use wallet_store::WalletStore;
