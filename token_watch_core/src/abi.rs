// Minimal ERC-20 call encoding / return decoding for eth_call

use crate::address::parse_address;
use crate::error::{CoreError, CoreResult};
use alloy_primitives::utils::format_units;
use alloy_primitives::U256;

/// `balanceOf(address)`
pub const BALANCE_OF_SELECTOR: &str = "70a08231";
/// `symbol()`
pub const SYMBOL_SELECTOR: &str = "95d89b41";
/// `decimals()`
pub const DECIMALS_SELECTOR: &str = "313ce567";

const WORD: usize = 32;

/// Calldata for a zero-argument call
pub fn encode_call(selector: &str) -> String {
    format!("0x{}", selector)
}

/// Calldata for `balanceOf(owner)`
pub fn encode_balance_of(owner: &str) -> CoreResult<String> {
    let owner = parse_address(owner)?;
    Ok(format!("0x{}{:0>64}", BALANCE_OF_SELECTOR, hex::encode(owner)))
}

fn decode_hex(data: &str) -> CoreResult<Vec<u8>> {
    let digits = data.trim().strip_prefix("0x").unwrap_or(data.trim());
    hex::decode(digits).map_err(|e| CoreError::ReadFailure(format!("invalid hex return data: {}", e)))
}

fn first_word(bytes: &[u8]) -> CoreResult<&[u8]> {
    if bytes.len() < WORD {
        return Err(CoreError::ReadFailure(format!(
            "expected a 32-byte word, got {} bytes",
            bytes.len()
        )));
    }
    Ok(&bytes[..WORD])
}

fn word_to_usize(word: &[u8]) -> CoreResult<usize> {
    usize::try_from(U256::from_be_slice(word))
        .map_err(|_| CoreError::ReadFailure("ABI offset out of range".to_string()))
}

/// Scale a raw integer amount by `10^decimals` into token units
pub fn scale_units(raw: U256, decimals: u8) -> CoreResult<f64> {
    let text = format_units(raw, decimals)
        .map_err(|e| CoreError::ReadFailure(format!("cannot scale by {} decimals: {}", decimals, e)))?;
    text.parse::<f64>()
        .map_err(|e| CoreError::ReadFailure(format!("unreadable amount {}: {}", text, e)))
}

/// Decode a `uint256` return value and scale it into token units
pub fn decode_uint256_units(data: &str, decimals: u8) -> CoreResult<f64> {
    let bytes = decode_hex(data)?;
    let word = first_word(&bytes)?;
    scale_units(U256::from_be_slice(word), decimals)
}

/// Decode a `uint8` return value (e.g. `decimals()`)
pub fn decode_uint8(data: &str) -> CoreResult<u8> {
    let bytes = decode_hex(data)?;
    let word = first_word(&bytes)?;
    let value = U256::from_be_slice(word);
    u8::try_from(value).map_err(|_| CoreError::ReadFailure(format!("value {} does not fit in uint8", value)))
}

/// Decode a `string` return value. Legacy tokens that return a
/// NUL-padded `bytes32` instead are accepted too.
pub fn decode_string(data: &str) -> CoreResult<String> {
    let bytes = decode_hex(data)?;

    let raw = if bytes.len() == WORD {
        let end = bytes.iter().position(|b| *b == 0).unwrap_or(WORD);
        bytes[..end].to_vec()
    } else {
        let offset = word_to_usize(first_word(&bytes)?)?;
        let len_end = offset
            .checked_add(WORD)
            .filter(|end| *end <= bytes.len())
            .ok_or_else(|| CoreError::ReadFailure("string offset past end of data".to_string()))?;
        let len = word_to_usize(&bytes[offset..len_end])?;
        let end = len_end
            .checked_add(len)
            .filter(|end| *end <= bytes.len())
            .ok_or_else(|| CoreError::ReadFailure("string length past end of data".to_string()))?;
        bytes[len_end..end].to_vec()
    };

    String::from_utf8(raw).map_err(|e| CoreError::ReadFailure(format!("string is not UTF-8: {}", e)))
}
