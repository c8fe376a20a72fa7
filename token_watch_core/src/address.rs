// Wallet / contract address validation and canonical form

use crate::error::{CoreError, CoreResult};
use alloy_primitives::Address;
use std::str::FromStr;

/// Number of hex digits in a 20-byte address
pub const ADDRESS_HEX_LEN: usize = 40;

/// Parse an address; the `0x` prefix is optional and surrounding whitespace
/// is ignored. Mixed case is accepted without checksum verification.
pub fn parse_address(input: &str) -> CoreResult<Address> {
    let trimmed = input.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);

    if digits.len() != ADDRESS_HEX_LEN {
        return Err(CoreError::InvalidAddress(trimmed.to_string()));
    }
    Address::from_str(digits).map_err(|_| CoreError::InvalidAddress(trimmed.to_string()))
}

/// Canonical form: `0x` followed by 40 lowercase hex digits
pub fn normalize_address(input: &str) -> CoreResult<String> {
    parse_address(input).map(|address| format!("{:#x}", address))
}

pub fn is_valid_address(input: &str) -> bool {
    normalize_address(input).is_ok()
}
