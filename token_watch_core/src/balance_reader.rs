// Token balance / symbol reads against the configured ERC-20 contract

use crate::abi::{self, DECIMALS_SELECTOR, SYMBOL_SELECTOR};
use crate::error::{CoreError, CoreResult};
use crate::rpc_client::RpcClient;
use log::debug;

/// Wraps an [`RpcClient`] bound to one token contract.
///
/// Every failure (transport, RPC error, undecodable return data) is reported
/// as [`CoreError::ReadFailure`]; a zero balance is only ever returned when the
/// node actually says zero.
pub struct BalanceReader<R> {
    rpc: R,
    token_address: String,
    decimals: u8,
}

impl<R: RpcClient> BalanceReader<R> {
    pub fn new(rpc: R, token_address: String, decimals: u8) -> Self {
        Self {
            rpc,
            token_address,
            decimals,
        }
    }

    pub fn token_address(&self) -> &str {
        &self.token_address
    }

    pub fn decimals(&self) -> u8 {
        self.decimals
    }

    /// Human-scale token balance of `address`
    pub async fn get_balance(&self, address: &str) -> CoreResult<f64> {
        let data = abi::encode_balance_of(address)?;
        debug!("balanceOf({}) on {}", address, self.token_address);

        let result = self
            .rpc
            .eth_call(&self.token_address, &data)
            .await
            .map_err(into_read_failure)?;

        abi::decode_uint256_units(&result, self.decimals)
    }

    /// On-chain `symbol()` of the token
    pub async fn get_symbol(&self) -> CoreResult<String> {
        debug!("symbol() on {}", self.token_address);

        let result = self
            .rpc
            .eth_call(&self.token_address, &abi::encode_call(SYMBOL_SELECTOR))
            .await
            .map_err(into_read_failure)?;

        let symbol = abi::decode_string(&result)?;
        let symbol = symbol.trim();
        if symbol.is_empty() {
            return Err(CoreError::ReadFailure("token returned an empty symbol".to_string()));
        }
        Ok(symbol.to_string())
    }

    /// On-chain `decimals()` of the token, for cross-checking configuration
    pub async fn get_decimals(&self) -> CoreResult<u8> {
        let result = self
            .rpc
            .eth_call(&self.token_address, &abi::encode_call(DECIMALS_SELECTOR))
            .await
            .map_err(into_read_failure)?;

        abi::decode_uint8(&result)
    }
}

fn into_read_failure(err: CoreError) -> CoreError {
    match err {
        CoreError::ReadFailure(_) => err,
        other => CoreError::ReadFailure(other.to_string()),
    }
}
